use thiserror::Error;

/// Failures raised by the DSP core. Nothing here is retried internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DspError {
    /// Sample data whose channel axis is not 1 or 2 wide.
    #[error("unsupported sample shape: {0}")]
    Shape(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A fixed-length table (e.g. temperament ratios) got the wrong size.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The phasor generator could not reproduce the last emitted sample at a
    /// frequency change, even after the half-turn retry.
    #[error(
        "phase continuity failure at frame {frame}: {from_hz} Hz -> {to_hz} Hz \
         (expected {expected}, got {actual})"
    )]
    ContinuityFailure {
        frame: usize,
        from_hz: f64,
        to_hz: f64,
        expected: f64,
        actual: f64,
    },
}

pub type Result<T> = std::result::Result<T, DspError>;
