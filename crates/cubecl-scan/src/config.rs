use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ScanError, ScratchLayout};

/// Number of elements scanned by a single cube during a reduction or expansion pass.
pub const DEFAULT_GRANULARITY: u32 = 512;
/// Number of units in a cube.
pub const DEFAULT_CUBE_DIM: u32 = 256;

/// User facing configuration of the hierarchical scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Block size handled by one cube. Buffers must have a length that is a multiple of it.
    #[serde(default = "default_granularity")]
    pub granularity: u32,

    /// Number of units per cube. Must be a multiple of the plane dimension.
    #[serde(default = "default_cube_dim")]
    pub cube_dim: u32,

    /// Kernel timing diagnostics.
    #[serde(default)]
    pub profiling: ProfilingConfig,
}

/// Controls the `[profile]` lines printed after each scan pass.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilingConfig {
    #[serde(default)]
    pub enabled: bool,
}

fn default_granularity() -> u32 {
    DEFAULT_GRANULARITY
}

fn default_cube_dim() -> u32 {
    DEFAULT_CUBE_DIM
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            granularity: DEFAULT_GRANULARITY,
            cube_dim: DEFAULT_CUBE_DIM,
            profiling: ProfilingConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Parse a configuration from a TOML document. Missing fields take their default value.
    pub fn from_toml_str(content: &str) -> Result<Self, ScanError> {
        toml::from_str(content).map_err(|err| ScanError::Config(err.to_string()))
    }

    /// Load a configuration from a TOML file.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|err| ScanError::Config(format!("{}: {err}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Overrides configuration fields based on environment variables.
    ///
    /// `CUBECL_SCAN_PROFILE=1` (or `true`) enables profiling, `0` (or `false`) disables it.
    pub fn override_from_env(self) -> Self {
        let value = std::env::var("CUBECL_SCAN_PROFILE").ok();
        self.override_profiling(value.as_deref())
    }

    fn override_profiling(mut self, value: Option<&str>) -> Self {
        match value {
            Some("1" | "true") => self.profiling.enabled = true,
            Some("0" | "false") => self.profiling.enabled = false,
            _ => {}
        }
        self
    }

    pub fn with_granularity(mut self, granularity: u32) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_cube_dim(mut self, cube_dim: u32) -> Self {
        self.cube_dim = cube_dim;
        self
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling.enabled = enabled;
        self
    }

    /// Check that the configuration can be used on a device with the given plane dimension.
    pub fn validate(&self, plane_dim: u32) -> Result<(), ScanError> {
        let invalid = |reason: String| Err(ScanError::InvalidConfig { reason });

        // The cube scan divides its range by the plane dimension at every recursion level.
        if plane_dim < 2 {
            return invalid(format!("the plane dimension {plane_dim} must be at least 2"));
        }
        if self.cube_dim == 0 || self.cube_dim % plane_dim != 0 {
            return invalid(format!(
                "cube dim {} must be a positive multiple of the plane dimension {plane_dim}",
                self.cube_dim
            ));
        }
        if self.granularity < 2 || self.granularity % plane_dim != 0 {
            return invalid(format!(
                "granularity {} must be a multiple of the plane dimension {plane_dim}, at least 2",
                self.granularity
            ));
        }

        Ok(())
    }
}

/// Comptime parameters shared by every scan kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanSettings {
    pub granularity: u32,
    pub cube_dim: u32,
    pub plane_dim: u32,
}

impl ScanSettings {
    /// Shared memory layout needed to scan one block.
    pub fn scratch(&self) -> ScratchLayout {
        ScratchLayout::new(self.granularity, self.plane_dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = ScanConfig::from_toml_str("").unwrap();

        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn parses_every_field() {
        let config = ScanConfig::from_toml_str(
            r#"
            granularity = 1024
            cube_dim = 128

            [profiling]
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.granularity, 1024);
        assert_eq!(config.cube_dim, 128);
        assert!(config.profiling.enabled);
    }

    #[test]
    fn rejects_malformed_toml() {
        let result = ScanConfig::from_toml_str("granularity = \"big\"");

        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[test]
    fn reports_missing_file() {
        let result = ScanConfig::from_file_path("/nonexistent/cubecl-scan.toml");

        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    #[test]
    fn profiling_override() {
        let config = ScanConfig::default();

        assert!(config.clone().override_profiling(Some("1")).profiling.enabled);
        assert!(config.clone().override_profiling(Some("true")).profiling.enabled);
        assert!(!config.clone().override_profiling(None).profiling.enabled);

        let enabled = config.with_profiling(true);
        assert!(!enabled.clone().override_profiling(Some("0")).profiling.enabled);
        assert!(enabled.override_profiling(Some("other")).profiling.enabled);
    }

    #[test]
    fn validate_against_plane_dim() {
        let config = ScanConfig::default();

        assert!(config.validate(32).is_ok());
        assert!(config.validate(0).is_err());
        assert!(config.clone().with_cube_dim(1).validate(1).is_err());
        assert!(config.clone().with_cube_dim(48).validate(32).is_err());
        assert!(config.clone().with_granularity(100).validate(32).is_err());
        assert!(config.clone().with_granularity(0).validate(32).is_err());
        assert!(config.with_granularity(1).validate(1).is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = ScanConfig::default().with_granularity(2048).with_profiling(true);
        let content = toml::to_string(&config).unwrap();

        assert_eq!(ScanConfig::from_toml_str(&content).unwrap(), config);
    }
}
