//! Argument parsing for running from the command line

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use iqsweep_messages::{GainMode, Hertz, SourceConfig, SweepConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "SDR spectrum analyzer: stepped sweep with Welch PSD", long_about = None)]
pub struct Args {
    /// Start frequency in MHz
    #[arg(long = "start-freq", visible_aliases = ["f1", "start_freq"], default_value_t = 1200.0)]
    pub start_freq: f64,
    /// Stop frequency in MHz
    #[arg(long = "stop-freq", visible_aliases = ["f2", "stop_freq"], default_value_t = 1500.0)]
    pub stop_freq: f64,
    /// Sample rate in MHz, also the sweep step
    #[arg(short, long, visible_alias = "sample_rate", default_value_t = 2.56)]
    pub sample_rate: f64,
    /// Tuner gain: "auto" or a number of dB
    #[arg(short, long, default_value = "auto")]
    pub gain: GainMode,
    /// Number of samples per Welch segment
    #[arg(short = 'n', long, default_value_t = 1024)]
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub nperseg: u32,
    /// Save plot and data under the output directory
    #[arg(long, visible_alias = "savedata")]
    pub save: bool,
    /// Directory receiving data/ and plots/
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,
    /// Delay after each retune, in milliseconds
    #[arg(long, default_value_t = 100)]
    pub settle_ms: u64,
    /// Samples read per step, as a multiple of the segment length
    #[arg(long, default_value_t = 10)]
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub oversample: u32,
    /// Where IQ samples come from
    #[arg(long, value_enum, default_value_t = Source::default())]
    pub source: Source,
    /// Recording to replay with `--source file`
    #[arg(long, required_if_eq("source", "file"))]
    pub iq_file: Option<PathBuf>,
    /// RTL-SDR device index
    #[arg(long, default_value_t = 0)]
    pub device_index: u32,
    /// Tone frequency in MHz for `--source generator`
    #[arg(long, default_value_t = 1420.405751)]
    pub tone_mhz: f64,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// RTL2832U USB dongle
    Rtlsdr,
    /// Interleaved little-endian f32 I/Q recording
    File,
    /// Synthetic tone over noise
    Generator,
}

impl Default for Source {
    fn default() -> Self {
        if cfg!(feature = "rtlsdr") {
            Source::Rtlsdr
        } else {
            Source::Generator
        }
    }
}

/// Single-dash long flags that clap would otherwise split into a short
/// flag plus a value (`-f1` is `-f 1`, `-save` is `-s ave`).
const SINGLE_DASH_FLAGS: [(&str, &str); 3] = [
    ("-f1", "--start-freq"),
    ("-f2", "--stop-freq"),
    ("-save", "--save"),
];

/// Rewrite `-f1`, `-f2` and `-save` (also in `-f1=1200` form) to the long
/// options before handing the arguments to clap.
pub fn expand_single_dash_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut after_separator = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if after_separator {
                return arg;
            }
            if arg == "--" {
                after_separator = true;
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            SINGLE_DASH_FLAGS
                .iter()
                .find_map(|&(short, long)| {
                    if text == short {
                        Some(OsString::from(long))
                    } else {
                        text.strip_prefix(short)
                            .and_then(|rest| rest.strip_prefix('='))
                            .map(|value| OsString::from(format!("{long}={value}")))
                    }
                })
                .unwrap_or(arg)
        })
        .collect()
}

impl Args {
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            start_freq_hz: self.start_freq * 1e6,
            stop_freq_hz: self.stop_freq * 1e6,
            sample_rate_hz: self.sample_rate * 1e6,
            segment_length: self.nperseg,
            gain: self.gain,
            settle_time_s: self.settle_ms as f64 / 1e3,
            oversample_factor: self.oversample,
        }
    }

    pub fn source_config(&self) -> SourceConfig {
        match self.source {
            Source::Rtlsdr => SourceConfig::RtlSdr {
                device_index: self.device_index,
            },
            Source::File => SourceConfig::File {
                // clap enforces the path when the source is a file
                path: self.iq_file.clone().unwrap_or_default(),
            },
            Source::Generator => SourceConfig::tone(Hertz::mhz(self.tone_mhz)),
        }
    }
}
