use thiserror::Error;

/// Error type for dive session configuration, computation and reporting.
#[derive(Error, Debug, Clone, PartialEq, uniffi::Error)]
#[uniffi(flat_error)]
pub enum DiveError {
    #[error("oxygen fraction must be in (0, 1], got {0}")]
    InvalidOxygenFraction(f64),

    #[error("ascent rate must be positive to compute a safe stop, got {rate}")]
    ZeroAscentRate { rate: f64 },

    #[error("empty profile")]
    EmptyProfile,

    #[error("profile parse error at position {position}: {message}")]
    ProfileParse { position: usize, message: String },

    #[error("ramp step must be positive, got {0}")]
    InvalidRampStep(f64),

    #[error("report sink failed: {0}")]
    Report(String),
}

impl From<std::io::Error> for DiveError {
    fn from(err: std::io::Error) -> Self {
        DiveError::Report(err.to_string())
    }
}
