use std::f64::consts::TAU;

use iqsweep_messages::{GainMode, Hertz};
use log::debug;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::IqDevice;
use crate::error::DeviceError;

const DEFAULT_SEED: u64 = 0x5eed;

/// Synthetic receiver: one complex tone at a fixed RF frequency over a
/// uniform noise floor.
///
/// The tone shows up at its true baseband offset whenever it falls inside
/// the tuned band, which makes this source handy for checking the
/// frequency bookkeeping of a sweep without hardware.
#[derive(Debug)]
pub struct SignalGenerator {
    tone: Hertz,
    amplitude: f64,
    noise: f64,
    sample_rate: Hertz,
    center: Hertz,
    rng: StdRng,
    /// Samples emitted since the last retune
    sample_index: u64,
    closed: bool,
}

impl SignalGenerator {
    pub fn new(tone: Hertz, amplitude: f64, noise: f64) -> Self {
        Self::with_seed(tone, amplitude, noise, DEFAULT_SEED)
    }

    /// Same as [`SignalGenerator::new`] with an explicit noise seed.
    pub fn with_seed(tone: Hertz, amplitude: f64, noise: f64, seed: u64) -> Self {
        Self {
            tone,
            amplitude,
            noise,
            sample_rate: Hertz(0.0),
            center: Hertz(0.0),
            rng: StdRng::seed_from_u64(seed),
            sample_index: 0,
            closed: false,
        }
    }

    fn check_open(&self, operation: &'static str) -> Result<(), DeviceError> {
        if self.closed {
            Err(DeviceError::new(operation, "device is closed"))
        } else {
            Ok(())
        }
    }

    /// Baseband offset of the tone, if it lies inside the tuned band.
    fn tone_offset(&self) -> Option<f64> {
        let fs = self.sample_rate.as_hz();
        let offset = self.tone.as_hz() - self.center.as_hz();
        (fs > 0.0 && offset >= -fs / 2.0 && offset < fs / 2.0).then_some(offset)
    }
}

impl IqDevice for SignalGenerator {
    fn set_sample_rate(&mut self, rate: Hertz) -> Result<(), DeviceError> {
        self.check_open("set sample rate")?;
        if !(rate.as_hz().is_finite() && rate.as_hz() > 0.0) {
            return Err(DeviceError::new(
                "set sample rate",
                format!("unsupported sample rate {rate}"),
            ));
        }
        self.sample_rate = rate;
        Ok(())
    }

    fn set_gain(&mut self, gain: GainMode) -> Result<(), DeviceError> {
        self.check_open("set gain")?;
        debug!("Signal generator ignores gain {gain}");
        Ok(())
    }

    fn set_center_frequency(&mut self, freq: Hertz) -> Result<(), DeviceError> {
        self.check_open("set center frequency")?;
        self.center = freq;
        self.sample_index = 0;
        Ok(())
    }

    fn read_samples(&mut self, count: usize) -> Result<Vec<Complex<f32>>, DeviceError> {
        self.check_open("read samples")?;
        if self.sample_rate.as_hz() <= 0.0 {
            return Err(DeviceError::new("read samples", "sample rate not set"));
        }

        let fs = self.sample_rate.as_hz();
        let tone = self.tone_offset();
        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            let mut sample = Complex::new(0.0, 0.0);
            if let Some(offset) = tone {
                let phase = TAU * offset * self.sample_index as f64 / fs;
                sample += Complex::from_polar(self.amplitude, phase);
            }
            if self.noise > 0.0 {
                sample += Complex::new(
                    self.rng.gen_range(-self.noise..self.noise),
                    self.rng.gen_range(-self.noise..self.noise),
                );
            }
            samples.push(Complex::new(sample.re as f32, sample.im as f32));
            self.sample_index += 1;
        }
        Ok(samples)
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        self.check_open("close")?;
        self.closed = true;
        Ok(())
    }
}
