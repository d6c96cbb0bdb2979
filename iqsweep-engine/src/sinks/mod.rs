//! Sweep artifacts: a two-column data table and a PNG plot sharing one
//! base name.

mod plot;
mod spectrum;

pub use plot::render_png;
pub use spectrum::{read_dat, write_dat};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::info;

use crate::assemble::SpectrumDataset;
use crate::error::OutputError;

/// Paths written by [`save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedOutput {
    pub data: PathBuf,
    pub plot: PathBuf,
}

/// Base name for a sweep's artifacts:
/// `spectrum-<start>-<stop>-<YYYY-MM-DD_HHMMSS>`.
///
/// Start and stop are the band edges in MHz, always printed with a decimal
/// point (`1200.0`, `2.56`).
pub fn output_stem(start_mhz: f64, stop_mhz: f64, time: &NaiveDateTime) -> String {
    format!(
        "spectrum-{start_mhz:?}-{stop_mhz:?}-{}",
        time.format("%Y-%m-%d_%H%M%S")
    )
}

/// Plot title naming the band and the capture time.
pub fn plot_title(start_mhz: f64, stop_mhz: f64, time: &NaiveDateTime) -> String {
    format!(
        "Spectrum from {start_mhz:?} MHz to {stop_mhz:?} MHz at {}",
        time.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Write `<dir>/data/<stem>.dat` and `<dir>/plots/<stem>.png`, creating
/// the directories as needed.
pub fn save(
    dataset: &SpectrumDataset,
    output_dir: &Path,
    stem: &str,
    title: &str,
) -> Result<SavedOutput, OutputError> {
    let data_dir = output_dir.join("data");
    let plot_dir = output_dir.join("plots");
    fs::create_dir_all(&data_dir)?;
    fs::create_dir_all(&plot_dir)?;

    let data = data_dir.join(format!("{stem}.dat"));
    let mut writer = BufWriter::new(File::create(&data)?);
    write_dat(&mut writer, dataset)?;
    writer.flush()?;
    info!("Wrote {} points to {}", dataset.len(), data.display());

    let plot = plot_dir.join(format!("{stem}.png"));
    render_png(&plot, dataset, title)?;
    info!("Wrote plot to {}", plot.display());

    Ok(SavedOutput { data, plot })
}
