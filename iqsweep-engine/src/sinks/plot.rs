use std::path::Path;

use plotters::prelude::*;

use crate::assemble::SpectrumDataset;
use crate::error::OutputError;

const PLOT_SIZE: (u32, u32) = (1200, 600);

fn plot_err<E: std::fmt::Display>(e: E) -> OutputError {
    OutputError::Plot(e.to_string())
}

/// Axis bounds with a little padding, never a zero-width range.
fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if hi > lo {
        let margin = (hi - lo) * pad;
        (lo - margin, hi + margin)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

/// Render the spectrum as a line plot: frequency in MHz against power in dB.
pub fn render_png(
    path: &Path,
    dataset: &SpectrumDataset,
    title: &str,
) -> Result<(), OutputError> {
    if dataset.is_empty() {
        return Err(OutputError::EmptyDataset);
    }

    let (x_min, x_max) = padded_range(dataset.frequencies_hz.iter().map(|f| f / 1e6), 0.0);
    let (y_min, y_max) = padded_range(dataset.power_db.iter().copied(), 0.05);

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Frequency (MHz)")
        .y_desc("Power (dB)")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            dataset.iter().map(|(f, p)| (f / 1e6, p)),
            &BLUE,
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([1.0, 3.0, 2.0].into_iter(), 0.0), (1.0, 3.0));
        assert_eq!(padded_range([-10.0, -20.0].into_iter(), 0.5), (-25.0, -5.0));
        assert_eq!(padded_range([5.0].into_iter(), 0.5), (4.0, 6.0));
    }

    #[test]
    fn test_empty_dataset_is_not_plotted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let result = render_png(&path, &SpectrumDataset::default(), "");
        assert!(matches!(result, Err(OutputError::EmptyDataset)));
    }
}
