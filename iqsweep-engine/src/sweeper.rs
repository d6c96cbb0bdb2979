use std::thread;

use flume::{Receiver, Sender};
use iqsweep_messages::{Command, ConfigError, Decibels, Event, Hertz, SweepConfig};
use log::{debug, info, warn};

use crate::assemble::StepResult;
use crate::error::{DeviceError, EstimationError, SweepError};
use crate::plan::FrequencyPlan;
use crate::psd::SpectralEstimator;
use crate::sdr::IqDevice;

/// Owns an open device and closes it exactly once, on whichever path the
/// sweep leaves by. Dropping an unclosed session (early return, panic)
/// still closes the device.
struct DeviceSession<D: IqDevice> {
    device: D,
    open: bool,
}

impl<D: IqDevice> DeviceSession<D> {
    fn new(device: D) -> Self {
        Self { device, open: true }
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.device.close()
    }
}

impl<D: IqDevice> Drop for DeviceSession<D> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Error closing device: {e}");
        }
    }
}

/// How a sweep left the acquisition loop.
enum Abort {
    Config(ConfigError),
    Device(DeviceError),
    Estimation(EstimationError),
    Cancelled,
}

impl From<DeviceError> for Abort {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

impl From<EstimationError> for Abort {
    fn from(e: EstimationError) -> Self {
        Self::Estimation(e)
    }
}

/// The sweep executor.
///
/// Owns the device for the duration of one sweep and walks a
/// [`FrequencyPlan`] strictly in order: retune, settle, acquire, estimate.
/// Progress events and a stop command channel are optional.
pub struct Sweeper<D: IqDevice, E: SpectralEstimator> {
    session: DeviceSession<D>,
    estimator: E,
    config: SweepConfig,
    cmd_rx: Option<Receiver<Command>>,
    event_tx: Option<Sender<Event>>,
}

impl<D: IqDevice, E: SpectralEstimator> Sweeper<D, E> {
    /// Create a new Sweeper. The device is closed when the sweep ends, or
    /// when the Sweeper is dropped without running.
    pub fn new(device: D, estimator: E, config: SweepConfig) -> Self {
        debug!("Constructing a new sweeper");
        Self {
            session: DeviceSession::new(device),
            estimator,
            config,
            cmd_rx: None,
            event_tx: None,
        }
    }

    /// Check for [`Command::Stop`] before each plan entry.
    pub fn with_commands(mut self, cmd_rx: Receiver<Command>) -> Self {
        self.cmd_rx = Some(cmd_rx);
        self
    }

    /// Report progress. Events are dropped rather than blocking the sweep
    /// when the channel is full or nobody is listening.
    pub fn with_events(mut self, event_tx: Sender<Event>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Run the sweep (blocking) and close the device.
    ///
    /// The config is validated before any device call. An empty band
    /// (`start >= stop`) is not an error here: the empty plan leaves the
    /// device untouched apart from closing it.
    /// On failure the error carries every step completed before it.
    pub fn run(mut self, plan: &FrequencyPlan) -> Result<Vec<StepResult>, SweepError> {
        let mut results = Vec::with_capacity(plan.len());
        let outcome = self.acquire(plan, &mut results);
        let closed = self.session.close();

        let err = match outcome {
            Ok(()) => {
                return match closed {
                    Ok(()) => {
                        self.emit(Event::SweepFinished {
                            steps: results.len(),
                        });
                        info!("Sweep finished: {} steps", results.len());
                        Ok(results)
                    }
                    Err(source) => Err(SweepError::Device {
                        source,
                        partial: results,
                    }),
                };
            }
            Err(abort) => abort,
        };

        if let Err(e) = closed {
            warn!("Error closing device after failed sweep: {e}");
        }
        Err(match err {
            Abort::Config(e) => SweepError::Config(e),
            Abort::Device(source) => SweepError::Device {
                source,
                partial: results,
            },
            Abort::Estimation(source) => SweepError::Estimation {
                source,
                partial: results,
            },
            Abort::Cancelled => SweepError::Cancelled { partial: results },
        })
    }

    fn acquire(
        &mut self,
        plan: &FrequencyPlan,
        results: &mut Vec<StepResult>,
    ) -> Result<(), Abort> {
        match self.config.validate() {
            Err(ConfigError::InvalidRange { .. }) if plan.is_empty() => {
                debug!("Empty frequency range, nothing to tune");
                return Ok(());
            }
            checked => checked.map_err(Abort::Config)?,
        }
        if plan.is_empty() {
            debug!("Empty frequency plan, nothing to tune");
            return Ok(());
        }

        let device = &mut self.session.device;
        device.set_sample_rate(self.config.sample_rate())?;
        device.set_gain(self.config.gain)?;

        info!(
            "Sweeping {} steps from {} at {} per step",
            plan.len(),
            Hertz(plan.centers()[0]),
            self.config.sample_rate()
        );
        self.emit(Event::SweepStarted {
            total_steps: plan.len(),
        });

        for (index, center) in plan.iter().enumerate() {
            if self.stop_requested() {
                info!("Sweep stopped before step {index} of {}", plan.len());
                return Err(Abort::Cancelled);
            }
            let step = self.step(center)?;
            debug!("Step {index}: {} bins at {}", step.len(), Hertz(center));
            results.push(step);
            self.emit(Event::StepCompleted {
                index,
                total: plan.len(),
                center_frequency: Hertz(center),
            });
        }
        Ok(())
    }

    /// Retune, settle, acquire and estimate one plan entry.
    fn step(&mut self, center_freq_hz: f64) -> Result<StepResult, Abort> {
        let sample_rate = self.config.sample_rate_hz;
        let device = &mut self.session.device;

        device.set_center_frequency(Hertz(center_freq_hz))?;
        // Local oscillator lock and AGC convergence take a variable time;
        // the fixed delay is an upper bound in practice, not a guarantee
        let settle = self.config.settle_time();
        if !settle.is_zero() {
            thread::sleep(settle);
        }
        let samples = device.read_samples(self.config.samples_per_step())?;
        let psd = self.estimator.estimate(
            &samples,
            sample_rate,
            self.config.segment_length as usize,
        )?;

        // Estimator offsets are in [0, fs) with DC at fs / 2
        let half_rate = sample_rate / 2.0;
        let (frequencies_hz, power_db) = psd
            .frequencies
            .iter()
            .zip(&psd.power)
            .map(|(&offset, &power)| {
                (
                    center_freq_hz + offset - half_rate,
                    Decibels::from_power_ratio(power).as_db(),
                )
            })
            .unzip();

        Ok(StepResult {
            center_freq_hz,
            frequencies_hz,
            power_db,
        })
    }

    fn stop_requested(&self) -> bool {
        self.cmd_rx
            .as_ref()
            .is_some_and(|rx| rx.try_iter().any(|cmd| cmd == Command::Stop))
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.try_send(event);
        }
    }
}
