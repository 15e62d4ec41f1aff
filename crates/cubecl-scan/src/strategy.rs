use cubecl_core::{Feature, prelude::*};

use crate::{ScanConfig, ScanError, ScanSettings};

impl ScanSettings {
    /// Resolve the kernel settings of `config` for the device behind `client`.
    ///
    /// The scan relies on plane instructions and needs the plane dimension at kernel expansion
    /// time to size its shared memory, so the device must report a single plane dimension.
    pub fn generate<R: Runtime>(
        client: &ComputeClient<R::Server, R::Channel>,
        config: &ScanConfig,
    ) -> Result<Self, ScanError> {
        if !support_plane::<R>(client) {
            return Err(ScanError::PlanesUnavailable);
        }
        let plane_dim = precise_plane_dim::<R>(client).ok_or(ScanError::ImprecisePlaneDim)?;

        Self::from_config(config, plane_dim)
    }

    /// Settings for a known plane dimension.
    pub fn from_config(config: &ScanConfig, plane_dim: u32) -> Result<Self, ScanError> {
        config.validate(plane_dim)?;

        Ok(Self {
            granularity: config.granularity,
            cube_dim: config.cube_dim,
            plane_dim,
        })
    }
}

fn support_plane<R: Runtime>(client: &ComputeClient<R::Server, R::Channel>) -> bool {
    client.properties().feature_enabled(Feature::Plane)
}

fn precise_plane_dim<R: Runtime>(client: &ComputeClient<R::Server, R::Channel>) -> Option<u32> {
    let hw_props = &client.properties().hardware;
    (hw_props.plane_size_min == hw_props.plane_size_max).then_some(hw_props.plane_size_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let config = ScanConfig::default().with_granularity(1024).with_cube_dim(128);
        let settings = ScanSettings::from_config(&config, 32).unwrap();

        assert_eq!(
            settings,
            ScanSettings {
                granularity: 1024,
                cube_dim: 128,
                plane_dim: 32,
            }
        );
        assert_eq!(settings.scratch().levels(), &[32]);
    }

    #[test]
    fn settings_reject_misaligned_cube_dim() {
        let config = ScanConfig::default().with_cube_dim(100);

        assert!(matches!(
            ScanSettings::from_config(&config, 32),
            Err(ScanError::InvalidConfig { .. })
        ));
    }
}
