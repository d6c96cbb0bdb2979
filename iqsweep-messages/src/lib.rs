mod command;
mod config;
mod event;
mod units;

pub use command::Command;
pub use config::{ConfigError, GainMode, SourceConfig, SweepConfig};
pub use event::Event;
pub use units::{Decibels, Hertz};
