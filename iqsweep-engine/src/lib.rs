//! Stepped-sweep spectrum acquisition.
//!
//! A sweep is planned from a [`SweepConfig`], executed step by step against
//! an [`IqDevice`] by a [`Sweeper`], and the per-step spectra are stitched
//! into one [`SpectrumDataset`] by [`assemble`].

mod assemble;
mod error;
mod plan;
pub mod psd;
pub mod sdr;
pub mod sinks;
mod sweeper;

pub use assemble::{SpectrumDataset, StepResult, assemble};
pub use error::{ConfigError, DeviceError, EstimationError, OutputError, SweepError};
pub use plan::{FrequencyPlan, plan};
pub use psd::{Psd, SpectralEstimator, Welch};
pub use sdr::IqDevice;
pub use sweeper::Sweeper;

use iqsweep_messages::SweepConfig;
use log::debug;

/// Plan, run and assemble a whole sweep (blocking).
///
/// The device is closed before this returns. Invalid parameters fail with
/// [`SweepError::Config`] before the device is touched, except a band with
/// `start >= stop`, which plans no steps and yields an empty dataset.
pub fn sweep<D, E>(
    device: D,
    estimator: E,
    config: SweepConfig,
) -> Result<SpectrumDataset, SweepError>
where
    D: IqDevice,
    E: SpectralEstimator,
{
    let plan = plan(&config);
    debug!("Planned {} steps", plan.len());
    let results = Sweeper::new(device, estimator, config).run(&plan)?;
    Ok(assemble(&results))
}
