use iqsweep_messages::SweepConfig;

/// Ordered center frequencies for one sweep.
///
/// `f_0 = start`, `f_{i+1} = f_i + sample_rate`, continuing while
/// `f_i < stop`. Adjacent steps are assumed contiguous: there is no
/// overlap or guard band.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrequencyPlan {
    centers_hz: Vec<f64>,
}

impl FrequencyPlan {
    pub fn centers(&self) -> &[f64] {
        &self.centers_hz
    }

    pub fn len(&self) -> usize {
        self.centers_hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers_hz.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.centers_hz.iter().copied()
    }
}

/// Compute the center frequencies covering `[start, stop)`.
///
/// Empty when `start >= stop`, or when the sample rate cannot step forward
/// (zero, negative or not finite); [`SweepConfig::validate`] reports those.
pub fn plan(config: &SweepConfig) -> FrequencyPlan {
    let start = config.start_freq_hz;
    let stop = config.stop_freq_hz;
    let step = config.sample_rate_hz;
    if !(step.is_finite() && step > 0.0) || !(start < stop) {
        return FrequencyPlan::default();
    }

    // Multiply rather than accumulate so long sweeps don't drift
    let centers_hz = (0u64..)
        .map(|i| start + i as f64 * step)
        .take_while(|&f| f < stop)
        .collect();
    FrequencyPlan { centers_hz }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(start: f64, stop: f64, rate: f64) -> SweepConfig {
        SweepConfig {
            start_freq_hz: start,
            stop_freq_hz: stop,
            sample_rate_hz: rate,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_step_plan() {
        let plan = plan(&config(1200e6, 1205e6, 2.56e6));
        assert_eq!(plan.centers(), &[1200e6, 1202.56e6]);
    }

    #[test]
    fn test_plan_length_is_ceiling() {
        for (start, stop, rate) in [
            (1200e6, 1500e6, 2.56e6),
            (100e6, 101e6, 0.25e6),
            (88e6, 108e6, 2.4e6),
            (0.0, 1.0, 3.0),
        ] {
            let plan = plan(&config(start, stop, rate));
            let expected = ((stop - start) / rate).ceil() as usize;
            assert_eq!(plan.len(), expected, "{start}..{stop} step {rate}");
            assert_eq!(plan.centers()[0], start);
        }
    }

    #[test]
    fn test_exact_multiple_excludes_stop() {
        let plan = plan(&config(100e6, 110e6, 2.5e6));
        assert_eq!(plan.centers(), &[100e6, 102.5e6, 105e6, 107.5e6]);
    }

    #[test]
    fn test_empty_range() {
        assert!(plan(&config(1500e6, 1200e6, 2.56e6)).is_empty());
        assert!(plan(&config(1200e6, 1200e6, 2.56e6)).is_empty());
    }

    #[test]
    fn test_bad_step_yields_empty_plan() {
        assert!(plan(&config(1200e6, 1500e6, 0.0)).is_empty());
        assert!(plan(&config(1200e6, 1500e6, -1.0)).is_empty());
        assert!(plan(&config(1200e6, 1500e6, f64::NAN)).is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let config = SweepConfig::default();
        assert_eq!(plan(&config), plan(&config));
    }

    #[test]
    fn test_centers_strictly_increase() {
        let plan = plan(&SweepConfig::default());
        assert!(plan.centers().windows(2).all(|w| w[0] < w[1]));
        assert!(plan.iter().all(|f| f < 1500e6));
    }
}
