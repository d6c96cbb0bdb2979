use iqsweep_messages::{Decibels, Hertz};

/// Spectrum measured at one center frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub center_freq_hz: f64,
    /// Absolute RF frequency of each bin, ascending
    pub frequencies_hz: Vec<f64>,
    pub power_db: Vec<f64>,
}

impl StepResult {
    pub fn len(&self) -> usize {
        self.frequencies_hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies_hz.is_empty()
    }
}

/// The stitched spectrum of a whole sweep.
///
/// Frequencies ascend within each step's run of bins. Where adjacent steps
/// meet there may be a small overlap or gap; those are kept as measured.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectrumDataset {
    pub frequencies_hz: Vec<f64>,
    pub power_db: Vec<f64>,
}

impl SpectrumDataset {
    pub fn len(&self) -> usize {
        self.frequencies_hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies_hz.is_empty()
    }

    /// `(frequency Hz, power dB)` pairs in sweep order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies_hz
            .iter()
            .copied()
            .zip(self.power_db.iter().copied())
    }

    /// Strongest bin, if any.
    pub fn peak(&self) -> Option<(Hertz, Decibels)> {
        self.iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(f, p)| (Hertz(f), Decibels(p)))
    }
}

/// Concatenate step results, in the order given, into one dataset.
///
/// No sorting, deduplication or interpolation happens at step boundaries.
pub fn assemble<'a, I>(results: I) -> SpectrumDataset
where
    I: IntoIterator<Item = &'a StepResult>,
{
    results
        .into_iter()
        .fold(SpectrumDataset::default(), |mut dataset, step| {
            dataset.frequencies_hz.extend_from_slice(&step.frequencies_hz);
            dataset.power_db.extend_from_slice(&step.power_db);
            dataset
        })
}
