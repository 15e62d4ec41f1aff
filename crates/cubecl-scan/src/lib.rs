//! Hierarchical inclusive scan (prefix combination) over device buffers.
//!
//! A scan of a buffer whose length is a multiple of the granularity is computed in two sweeps.
//! The reduction sweep scans every block of `granularity` elements in place and stores the block
//! totals in the next, smaller level of a [cascade](Cascade). Once a level holds a single block,
//! the expansion sweep walks back down and folds the total of every preceding block into each
//! block.
//!
//! Within a block, a cube scans cooperatively: each plane scans its chunk with plane
//! instructions, plane totals are scanned recursively in shared memory, and the result is
//! broadcast back to every chunk.

mod cascade;
mod config;
mod cube;
mod error;
mod instructions;
mod launch;
mod partition;
mod plane;
mod profile;
mod strategy;

pub use cascade::*;
pub use config::*;
pub use cube::*;
pub use error::*;
pub use instructions::*;
pub use launch::*;
pub use partition::*;
pub use plane::*;
pub use profile::*;

#[cfg(feature = "export_tests")]
pub mod tests;

use cubecl_core::prelude::*;
use cubecl_runtime::server::Handle;

/// Entry point for the hierarchical inclusive scan.
///
/// Scans the first `len` elements of `buffer` in place with the instruction `I`. The cascade must
/// come from [allocate_cascade] for the same `len` and granularity; it can be reused across calls.
pub fn hierarchical_inclusive_scan<R: Runtime, N: Numeric, I: ScanInstruction>(
    client: &ComputeClient<R::Server, R::Channel>,
    buffer: &Handle,
    len: usize,
    cascade: &Cascade<R, N>,
    config: &ScanConfig,
) -> Result<(), ScanError> {
    let settings = ScanSettings::generate::<R>(client, config)?;
    validate_len(len, config.granularity)?;
    cascade.validate(len, config.granularity)?;

    let profiler = ScanProfiler::new(config.profiling);
    launch_hierarchical_inclusive_scan::<R, N, I>(
        client, buffer, len, cascade, settings, &profiler,
    );

    Ok(())
}

/// Inclusive prefix sum, the default instruction of [hierarchical_inclusive_scan].
pub fn hierarchical_inclusive_sum<R: Runtime, N: Numeric>(
    client: &ComputeClient<R::Server, R::Channel>,
    buffer: &Handle,
    len: usize,
    cascade: &Cascade<R, N>,
    config: &ScanConfig,
) -> Result<(), ScanError> {
    hierarchical_inclusive_scan::<R, N, Sum>(client, buffer, len, cascade, config)
}

/// Allocate the intermediate buffers needed to scan a buffer of `len` elements.
pub fn allocate_cascade<R: Runtime, N: Numeric>(
    client: &ComputeClient<R::Server, R::Channel>,
    len: usize,
    config: &ScanConfig,
) -> Result<Cascade<R, N>, ScanError> {
    validate_len(len, config.granularity)?;
    let layout = CascadeLayout::new(len, config.granularity as usize);
    log::trace!("Allocating scan cascade {layout:?}");

    Ok(Cascade::allocate(client, layout))
}

/// A granularity of one never shrinks the cascade, so blocks hold at least two elements.
pub(crate) fn validate_len(len: usize, granularity: u32) -> Result<(), ScanError> {
    if len == 0 || granularity < 2 || len % granularity as usize != 0 {
        return Err(ScanError::InvalidLength { len, granularity });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_must_be_whole_blocks() {
        assert!(validate_len(512, 512).is_ok());
        assert!(validate_len(1024, 512).is_ok());
        assert!(matches!(
            validate_len(0, 512),
            Err(ScanError::InvalidLength { len: 0, .. })
        ));
        assert!(validate_len(513, 512).is_err());
    }

    #[test]
    fn granularity_below_two_is_rejected() {
        assert!(matches!(
            validate_len(2, 1),
            Err(ScanError::InvalidLength {
                len: 2,
                granularity: 1
            })
        ));
        assert!(validate_len(2, 0).is_err());
    }
}
