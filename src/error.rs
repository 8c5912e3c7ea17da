use dsp::{bandpass, iir_int::CoefficientRange};

/// Invalid static parameters. Not retryable without reconfiguration.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("empty batch")]
    EmptyBatch,
    #[error("batch length {length} exceeds capacity {capacity}")]
    BatchTooLong { length: usize, capacity: usize },
    #[error("unsupported sample rate {0} Hz")]
    UnsupportedRate(u32),
    #[error("unsupported ADC channel {0}")]
    UnsupportedChannel(u8),
    #[error("no batches to average")]
    NoBatches,
    #[error("{settle} settling samples leave nothing of {length} samples")]
    Settling { length: usize, settle: usize },
    #[error("excitation at {frequency} Hz is above Nyquist at {rate} Hz")]
    AboveNyquist { frequency: f32, rate: u32 },
    #[error("invalid {0}")]
    Invalid(&'static str),
    #[error("bandpass coefficients: {0}")]
    Coefficient(#[from] CoefficientRange),
    #[error("bandpass: {0}")]
    Filter(#[from] bandpass::Error),
}

#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("configuration: {0}")]
    Configuration(#[from] ConfigError),
    /// The hardware is idle again and the capture may be retried.
    #[error("acquisition did not complete within {timeout_us} us")]
    AcquisitionTimeout { timeout_us: u64 },
    /// Degenerate peak-to-peak voltage. Indicates a wiring or front-end
    /// fault rather than a transient condition.
    #[error("peak-to-peak voltage {peak_to_peak} V out of range")]
    MeasurementOutOfRange { peak_to_peak: f32 },
}

impl From<bandpass::Error> for Error {
    fn from(e: bandpass::Error) -> Self {
        Self::Configuration(e.into())
    }
}
