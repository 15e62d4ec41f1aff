use std::fmt::{Debug, Display};

/// Errors that can occur while preparing a scan.
///
/// Every precondition of the scan kernels is checked before launching. Once launched, a scan
/// either completes or the runtime reports the failure.
#[derive(Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The compute client doesn't support plane instructions.
    PlanesUnavailable,

    /// The plane dimension reported by the compute client isn't fixed, so the shared memory
    /// needed by the kernels can't be sized ahead of time.
    ImprecisePlaneDim,

    /// The configuration is rejected for the current device.
    InvalidConfig { reason: String },

    /// The buffer is empty, its length isn't a multiple of the granularity, or the granularity is
    /// below 2.
    InvalidLength { len: usize, granularity: u32 },

    /// The cascade was allocated for another buffer length or granularity.
    CascadeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// The configuration couldn't be read or parsed.
    Config(String),
}

impl Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::PlanesUnavailable => {
                write!(f, "Unable to launch scan because planes are unavailable")
            }
            ScanError::ImprecisePlaneDim => write!(
                f,
                "Unable to launch scan because the plane dimension of the device varies"
            ),
            ScanError::InvalidConfig { reason } => {
                write!(f, "Invalid scan configuration: {reason}")
            }
            ScanError::InvalidLength { len, granularity } => write!(
                f,
                "Unable to scan a buffer of {len} elements with granularity {granularity}, the length must be a non-zero multiple of a granularity of at least 2"
            ),
            ScanError::CascadeMismatch { expected, actual } => write!(
                f,
                "The cascade was allocated for {} elements with granularity {}, but the scan expects {} elements with granularity {}",
                actual.0, actual.1, expected.0, expected.1
            ),
            ScanError::Config(err) => write!(f, "Unable to load the scan configuration: {err}"),
        }
    }
}

impl std::error::Error for ScanError {}
