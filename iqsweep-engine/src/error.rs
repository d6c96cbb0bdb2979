use thiserror::Error;

pub use iqsweep_messages::ConfigError;

use crate::assemble::StepResult;

/// A failed call on an [`IqDevice`](crate::sdr::IqDevice).
#[derive(Debug, Error)]
#[error("{operation} failed: {message}")]
pub struct DeviceError {
    /// What the device was asked to do, e.g. `set center frequency`
    pub operation: &'static str,
    pub message: String,
}

impl DeviceError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    /// Wrap an I/O error from a file or USB backend.
    pub fn io(operation: &'static str, err: &std::io::Error) -> Self {
        Self::new(operation, err.to_string())
    }
}

/// Degenerate input to the spectral estimator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("no samples to estimate from")]
    NoSamples,

    #[error("segment length must be positive")]
    ZeroSegment,

    #[error("segment length {segment} exceeds the {samples} samples available")]
    SegmentTooLong { segment: usize, samples: usize },

    #[error("sample rate must be positive and finite, got {0} Hz")]
    InvalidSampleRate(f64),
}

/// Why a sweep stopped early.
///
/// Every variant raised after the device was touched carries the step
/// results gathered before the failure, in plan order. The caller decides
/// whether partial data is usable.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid sweep configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("device error after {} completed steps: {source}", .partial.len())]
    Device {
        #[source]
        source: DeviceError,
        partial: Vec<StepResult>,
    },

    #[error("spectral estimation failed after {} completed steps: {source}", .partial.len())]
    Estimation {
        #[source]
        source: EstimationError,
        partial: Vec<StepResult>,
    },

    #[error("sweep cancelled after {} completed steps", .partial.len())]
    Cancelled { partial: Vec<StepResult> },
}

impl SweepError {
    /// Step results completed before the failure.
    pub fn partial_results(&self) -> &[StepResult] {
        match self {
            Self::Config(_) => &[],
            Self::Device { partial, .. }
            | Self::Estimation { partial, .. }
            | Self::Cancelled { partial } => partial,
        }
    }
}

/// Failure writing sweep artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed data file line {line}: {content:?}")]
    Parse { line: usize, content: String },

    #[error("nothing to plot: the spectrum is empty")]
    EmptyDataset,

    #[error("plot rendering failed: {0}")]
    Plot(String),
}
