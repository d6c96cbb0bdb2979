use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::Hertz;

/// Tuner gain setting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GainMode {
    /// Let the tuner's AGC pick the gain
    #[default]
    Auto,
    /// Fixed gain in dB
    Manual(f64),
}

impl std::str::FromStr for GainMode {
    type Err = String;

    /// Accepts `auto` (any case) or a number of dB.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<f64>()
            .ok()
            .filter(|db| db.is_finite())
            .map(Self::Manual)
            .ok_or_else(|| format!("invalid gain '{s}': expected 'auto' or a number of dB"))
    }
}

impl std::fmt::Display for GainMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Manual(db) => write!(f, "{db} dB"),
        }
    }
}

/// Problems with a [`SweepConfig`] found before any hardware is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("start frequency {start} Hz must be below stop frequency {stop} Hz")]
    InvalidRange { start: f64, stop: f64 },

    #[error("sample rate must be positive and finite, got {0} Hz")]
    InvalidSampleRate(f64),

    #[error("segment length must be positive")]
    InvalidSegmentLength,

    #[error("settle time must be non-negative and finite, got {0} s")]
    InvalidSettleTime(f64),

    #[error("oversample factor must be positive")]
    InvalidOversample,
}

/// Parameters of one stepped sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// First center frequency
    pub start_freq_hz: f64,
    /// Centers are planned while strictly below this
    pub stop_freq_hz: f64,
    /// Device sample rate, which is also the step between centers
    pub sample_rate_hz: f64,
    /// Samples per Welch segment
    pub segment_length: u32,
    pub gain: GainMode,
    /// Delay after each retune before samples are trusted
    pub settle_time_s: f64,
    /// Samples read per step = `segment_length * oversample_factor`
    pub oversample_factor: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_freq_hz: 1_200e6,
            stop_freq_hz: 1_500e6,
            // Max stable rate for R820T2 dongles
            sample_rate_hz: 2.56e6,
            segment_length: 1024,
            gain: GainMode::Auto,
            settle_time_s: 0.1,
            oversample_factor: 10,
        }
    }
}

impl SweepConfig {
    /// Check every invariant the sweep relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate_hz));
        }
        if self.segment_length == 0 {
            return Err(ConfigError::InvalidSegmentLength);
        }
        if !(self.settle_time_s.is_finite() && self.settle_time_s >= 0.0) {
            return Err(ConfigError::InvalidSettleTime(self.settle_time_s));
        }
        if self.oversample_factor == 0 {
            return Err(ConfigError::InvalidOversample);
        }
        // Checked last: `InvalidRange` implies every other field is sound
        if !(self.start_freq_hz < self.stop_freq_hz) {
            return Err(ConfigError::InvalidRange {
                start: self.start_freq_hz,
                stop: self.stop_freq_hz,
            });
        }
        Ok(())
    }

    /// Number of IQ samples acquired per step.
    pub fn samples_per_step(&self) -> usize {
        self.segment_length as usize * self.oversample_factor as usize
    }

    pub fn settle_time(&self) -> Duration {
        Duration::from_secs_f64(self.settle_time_s)
    }

    pub fn sample_rate(&self) -> Hertz {
        Hertz(self.sample_rate_hz)
    }
}

/// Where IQ samples come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    /// Synthetic complex tone plus noise at a fixed RF frequency.
    SignalGenerator {
        tone: Hertz,
        /// Linear amplitude of the tone
        amplitude: f64,
        /// Peak amplitude of the uniform noise floor
        noise: f64,
    },
    /// Replay interleaved little-endian f32 I/Q from a file.
    File { path: PathBuf },
    /// RTL2832U dongle by USB index.
    RtlSdr { device_index: u32 },
}

impl SourceConfig {
    /// Signal generator with the default tone level and noise floor.
    pub fn tone(tone: Hertz) -> Self {
        SourceConfig::SignalGenerator {
            tone,
            amplitude: 0.5,
            noise: 0.05,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        // Hydrogen line
        Self::tone(Hertz::mhz(1_420.405_751))
    }
}
