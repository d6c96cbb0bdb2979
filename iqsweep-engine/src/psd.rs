//! Power spectral density estimation.
//!
//! The sweep only needs a black box turning a block of complex baseband
//! samples into `(frequency offset, linear power)` bins. [`Welch`] is the
//! stock implementation.

use std::f64::consts::TAU;
use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::EstimationError;

/// Two-sided spectrum of a complex baseband block.
///
/// Bins run from the most negative baseband frequency to the most positive.
/// `frequencies` are labelled as offsets in `[0, sample_rate)`: a bin at
/// offset `f` holds power at baseband frequency `f - sample_rate / 2`,
/// so the DC bin sits at `sample_rate / 2`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Psd {
    pub frequencies: Vec<f64>,
    /// Linear power density, units²/Hz
    pub power: Vec<f64>,
}

/// Turns IQ samples into a two-sided PSD.
pub trait SpectralEstimator {
    fn estimate(
        &mut self,
        samples: &[Complex<f32>],
        sample_rate: f64,
        segment_length: usize,
    ) -> Result<Psd, EstimationError>;
}

/// Welch's averaged periodogram.
///
/// Periodic Hann window, 50% overlap, per-segment mean removal and density
/// scaling; the same defaults as `scipy.signal.welch` with a two-sided
/// output. Trailing samples that don't fill a whole segment are dropped.
pub struct Welch {
    planner: FftPlanner<f64>,
    /// FFT plan and window for the last segment length used
    cached: Option<(Arc<dyn Fft<f64>>, Vec<f64>)>,
}

impl std::fmt::Debug for Welch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Welch")
            .field("segment_length", &self.cached.as_ref().map(|(_, w)| w.len()))
            .finish()
    }
}

impl Default for Welch {
    fn default() -> Self {
        Self::new()
    }
}

impl Welch {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            cached: None,
        }
    }

    fn plan(&mut self, n: usize) -> (Arc<dyn Fft<f64>>, Vec<f64>) {
        match &self.cached {
            Some((fft, window)) if window.len() == n => (Arc::clone(fft), window.clone()),
            _ => {
                let fft = self.planner.plan_fft_forward(n);
                let window = hann(n);
                self.cached = Some((Arc::clone(&fft), window.clone()));
                (fft, window)
            }
        }
    }
}

/// Periodic Hann window, the spectral-analysis variant (`sym=False`).
pub fn hann(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (TAU * i as f64 / n as f64).cos())
        .collect()
}

/// Offset labels for an FFT-shifted spectrum of `n` bins.
fn shifted_offsets(n: usize, sample_rate: f64) -> Vec<f64> {
    let half = (n / 2) as f64;
    (0..n)
        .map(|k| (k as f64 - half) * sample_rate / n as f64 + sample_rate / 2.0)
        .collect()
}

impl SpectralEstimator for Welch {
    fn estimate(
        &mut self,
        samples: &[Complex<f32>],
        sample_rate: f64,
        segment_length: usize,
    ) -> Result<Psd, EstimationError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EstimationError::InvalidSampleRate(sample_rate));
        }
        if samples.is_empty() {
            return Err(EstimationError::NoSamples);
        }
        if segment_length == 0 {
            return Err(EstimationError::ZeroSegment);
        }
        if segment_length > samples.len() {
            return Err(EstimationError::SegmentTooLong {
                segment: segment_length,
                samples: samples.len(),
            });
        }

        let n = segment_length;
        let (fft, window) = self.plan(n);
        let step = n - n / 2;
        let segments = (samples.len() - n) / step + 1;
        let scale = 1.0 / (sample_rate * window.iter().map(|w| w * w).sum::<f64>());

        let mut power = vec![0.0; n];
        let mut buf = vec![Complex::<f64>::new(0.0, 0.0); n];
        for segment in samples.windows(n).step_by(step) {
            let mean = segment
                .iter()
                .map(|s| Complex::new(f64::from(s.re), f64::from(s.im)))
                .sum::<Complex<f64>>()
                / n as f64;
            for ((out, s), w) in buf.iter_mut().zip(segment).zip(&window) {
                *out = (Complex::new(f64::from(s.re), f64::from(s.im)) - mean) * *w;
            }
            fft.process(&mut buf);
            for (p, x) in power.iter_mut().zip(&buf) {
                *p += x.norm_sqr() * scale;
            }
        }
        for p in &mut power {
            *p /= segments as f64;
        }

        // FFT shift: [DC, positive, negative] -> [negative, DC, positive]
        power.rotate_right(n / 2);

        Ok(Psd {
            frequencies: shifted_offsets(n, sample_rate),
            power,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tone(freq: f64, sample_rate: f64, len: usize) -> Vec<Complex<f32>> {
        (0..len)
            .map(|i| {
                let phase = TAU * freq * i as f64 / sample_rate;
                Complex::new(phase.cos() as f32, phase.sin() as f32)
            })
            .collect()
    }

    fn argmax(values: &[f64]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_hann_window() {
        let w = hann(4);
        let expected = [0.0, 0.5, 1.0, 0.5];
        for (a, b) in w.iter().zip(expected) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_offsets_span_sample_rate() {
        let offsets = shifted_offsets(4, 4.0);
        assert_eq!(offsets, vec![0.0, 1.0, 2.0, 3.0]);

        // Odd lengths put DC at the middle bin too
        let offsets = shifted_offsets(5, 5.0);
        assert!((offsets[2] - 2.5).abs() < 1e-12);
        assert!(offsets.iter().all(|&f| (0.0..5.0).contains(&f)));
    }

    #[test]
    fn test_positive_tone_lands_above_dc() {
        let fs = 1.0e6;
        let n = 64;
        let samples = tone(fs / 8.0, fs, n * 10);
        let psd = Welch::new().estimate(&samples, fs, n).unwrap();

        assert_eq!(psd.frequencies.len(), n);
        assert_eq!(psd.power.len(), n);
        let peak = argmax(&psd.power);
        assert_eq!(peak, n / 2 + n / 8);
        assert!((psd.frequencies[peak] - fs / 2.0 - fs / 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_negative_tone_lands_below_dc() {
        let fs = 2.56e6;
        let n = 128;
        let samples = tone(-fs / 4.0, fs, n * 10);
        let psd = Welch::new().estimate(&samples, fs, n).unwrap();

        let peak = argmax(&psd.power);
        assert_eq!(peak, n / 4);
        assert!((psd.frequencies[peak] - fs / 2.0 + fs / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_tone_power_is_preserved() {
        // Density integrated over the band gives back the signal power
        let fs = 1.0e6;
        let n = 64;
        let samples = tone(fs / 8.0, fs, n * 10);
        let psd = Welch::new().estimate(&samples, fs, n).unwrap();

        let total: f64 = psd.power.iter().sum::<f64>() * fs / n as f64;
        assert!((total - 1.0).abs() < 1e-6, "total power {total}");
    }

    #[test]
    fn test_white_noise_is_flat_and_preserves_power() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<Complex<f32>> = (0..1024 * 64)
            .map(|_| Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect();
        let fs = 2.0e6;
        let n = 256;
        let psd = Welch::new().estimate(&samples, fs, n).unwrap();

        // Uniform on [-1, 1) has variance 1/3 per component
        let expected = 2.0 / 3.0;
        let mean: f64 = psd.power.iter().sum::<f64>() / n as f64;
        assert!((mean * fs - expected).abs() / expected < 0.05, "{}", mean * fs);
        // DC is removed by detrending, everything else stays near the mean
        let flat = psd
            .power
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != n / 2)
            .all(|(_, &p)| p > mean * 0.5 && p < mean * 1.5);
        assert!(flat);
    }

    #[test]
    fn test_constant_input_detrends_to_nothing() {
        let samples = vec![Complex::new(0.25f32, -0.5); 4096];
        let psd = Welch::new().estimate(&samples, 1e6, 512).unwrap();
        assert!(psd.power.iter().all(|&p| p < 1e-20));
    }

    #[test]
    fn test_identical_input_gives_identical_output() {
        let samples = tone(3e5, 2.56e6, 4096);
        let mut welch = Welch::new();
        let a = welch.estimate(&samples, 2.56e6, 256).unwrap();
        let b = welch.estimate(&samples, 2.56e6, 256).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_segment_equal_to_input() {
        let samples = tone(1e3, 8e3, 8);
        let psd = Welch::new().estimate(&samples, 8e3, 8).unwrap();
        assert_eq!(psd.power.len(), 8);
    }

    #[test]
    fn test_degenerate_input() {
        let mut welch = Welch::new();
        let samples = tone(1e3, 8e3, 16);
        assert_eq!(
            welch.estimate(&[], 8e3, 8),
            Err(EstimationError::NoSamples)
        );
        assert_eq!(
            welch.estimate(&samples, 8e3, 0),
            Err(EstimationError::ZeroSegment)
        );
        assert_eq!(
            welch.estimate(&samples, 8e3, 32),
            Err(EstimationError::SegmentTooLong {
                segment: 32,
                samples: 16
            })
        );
        assert_eq!(
            welch.estimate(&samples, 0.0, 8),
            Err(EstimationError::InvalidSampleRate(0.0))
        );
    }
}
