//! Error types shared by every stage of the conditioning pipeline
//!
//! Nothing here is recovered locally: each variant is returned to the
//! immediate caller with the stage and the violated invariant in its message.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SonifyError>;

#[derive(Error, Debug)]
pub enum SonifyError {
    /// Paired buffers (strain vs. time axis, plus vs. cross, spectrum vs. n)
    /// disagree in length
    #[error("{context}: length mismatch (expected {expected}, got {actual})")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("noise PSD queried at {frequency} Hz, outside its domain [{min}, {max}] Hz")]
    PsdOutOfDomain { frequency: f64, min: f64, max: f64 },

    #[error("whitening: noise PSD is {value} at {frequency} Hz (must be > 0)")]
    NonPositivePsd { frequency: f64, value: f64 },

    #[error("degenerate input: {0}")]
    DegenerateSignal(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("spectral transform failed: {0}")]
    Transform(String),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("WAV I/O failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
