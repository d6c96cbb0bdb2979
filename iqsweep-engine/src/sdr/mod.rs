//! Receiver sessions the sweep can drive.
//!
//! Every backend implements [`IqDevice`]: tune, read complex baseband
//! samples, close. The sweep owns the session exclusively, so none of
//! these need to be `Sync`.

mod file;
mod generator;
#[cfg(feature = "rtlsdr")]
mod rtlsdr;

pub use file::FileDevice;
pub use generator::SignalGenerator;
#[cfg(feature = "rtlsdr")]
pub use rtlsdr::RtlSdrDevice;

use iqsweep_messages::{GainMode, Hertz, SourceConfig};
use log::info;
use num_complex::Complex;

use crate::error::DeviceError;

/// A tunable receiver producing IQ samples.
pub trait IqDevice {
    fn set_sample_rate(&mut self, rate: Hertz) -> Result<(), DeviceError>;

    fn set_gain(&mut self, gain: GainMode) -> Result<(), DeviceError>;

    fn set_center_frequency(&mut self, freq: Hertz) -> Result<(), DeviceError>;

    /// Read exactly `count` samples, or fail.
    fn read_samples(&mut self, count: usize) -> Result<Vec<Complex<f32>>, DeviceError>;

    /// Release the hardware. Calls after a successful close may fail.
    fn close(&mut self) -> Result<(), DeviceError>;
}

impl<D: IqDevice + ?Sized> IqDevice for Box<D> {
    fn set_sample_rate(&mut self, rate: Hertz) -> Result<(), DeviceError> {
        (**self).set_sample_rate(rate)
    }

    fn set_gain(&mut self, gain: GainMode) -> Result<(), DeviceError> {
        (**self).set_gain(gain)
    }

    fn set_center_frequency(&mut self, freq: Hertz) -> Result<(), DeviceError> {
        (**self).set_center_frequency(freq)
    }

    fn read_samples(&mut self, count: usize) -> Result<Vec<Complex<f32>>, DeviceError> {
        (**self).read_samples(count)
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        (**self).close()
    }
}

/// Open the device described by `config`.
pub fn open(config: &SourceConfig) -> Result<Box<dyn IqDevice>, DeviceError> {
    info!("Opening IQ source {config:?}");
    match config {
        SourceConfig::SignalGenerator {
            tone,
            amplitude,
            noise,
        } => Ok(Box::new(SignalGenerator::new(*tone, *amplitude, *noise))),
        SourceConfig::File { path } => Ok(Box::new(FileDevice::open(path, true)?)),
        #[cfg(feature = "rtlsdr")]
        SourceConfig::RtlSdr { device_index } => Ok(Box::new(RtlSdrDevice::open(*device_index)?)),
        #[cfg(not(feature = "rtlsdr"))]
        SourceConfig::RtlSdr { .. } => Err(DeviceError::new(
            "open RTL-SDR",
            "RTL-SDR support not compiled (enable the 'rtlsdr' feature)",
        )),
    }
}
