use core::fmt::Display;
use std::time::{Duration, Instant};

use cubecl_common::future;
use cubecl_core::prelude::*;

use crate::ProfilingConfig;

/// Wraps kernel submissions and reports their device duration when profiling is enabled.
///
/// Timings come from the runtime profiler: the span covers the earliest start and the latest end
/// of the work submitted in the closure. Timestamps are nanoseconds since the profiler was
/// created. When the client can't time its work, the submission still runs and no line is
/// printed. Profiling never changes the computed values.
#[derive(Debug)]
pub struct ScanProfiler {
    config: ProfilingConfig,
    origin: Instant,
}

/// Timing of a single profiled submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub start: u64,
    pub end: u64,
    pub label: String,
}

impl ScanProfiler {
    pub fn new(config: ProfilingConfig) -> Self {
        Self {
            config,
            origin: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Run `submit` and, when profiling, print a `[profile]` line for it.
    pub fn submit<R: Runtime>(
        &self,
        client: &ComputeClient<R::Server, R::Channel>,
        label: &str,
        submit: impl FnOnce(),
    ) {
        if !self.is_enabled() {
            return submit();
        }

        match client.profile(submit, label) {
            Ok(duration) => {
                let ticks = future::block_on(duration.resolve());
                let record = ProfileRecord::new(
                    label,
                    ticks.start_duration_since(self.origin),
                    ticks.end_duration_since(self.origin),
                );
                println!("{record}");
            }
            Err(err) => log::debug!("No timing for {label}: {err:?}"),
        }
    }
}

impl ProfileRecord {
    /// Record spanning `start..end`, both relative to the profiler origin.
    pub fn new(label: &str, start: Duration, end: Duration) -> Self {
        Self {
            start: start.as_nanos() as u64,
            end: end.as_nanos() as u64,
            label: label.to_string(),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.end.saturating_sub(self.start) as f64 * 1e-6
    }
}

impl Display for ProfileRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[profile] {:8} {:8} {}: {:.3}ms",
            self.start,
            self.end,
            self.label,
            self.duration_ms()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_line_format() {
        let record = ProfileRecord::new(
            "hierarchical_inclusive_scan reduce 0",
            Duration::from_nanos(1_000),
            Duration::from_nanos(2_501_000),
        );

        assert_eq!(
            record.to_string(),
            "[profile]     1000  2501000 hierarchical_inclusive_scan reduce 0: 2.500ms"
        );
    }

    #[test]
    fn record_never_reports_negative_duration() {
        let record = ProfileRecord::new(
            "hierarchical_inclusive_scan expand 0",
            Duration::from_nanos(10),
            Duration::from_nanos(5),
        );

        assert_eq!(record.duration_ms(), 0.0);
    }

    #[test]
    fn disabled_by_default() {
        let profiler = ScanProfiler::new(ProfilingConfig::default());

        assert!(!profiler.is_enabled());
    }
}
