/// Frequency in Hertz.
///
/// Sweep bookkeeping offsets bins by fractions of the sample rate, so this
/// wraps an `f64` rather than an integer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Hertz(pub f64);

impl std::fmt::Display for Hertz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.abs() >= 1e6 {
            write!(f, "{:.3} MHz", self.as_mhz())
        } else {
            write!(f, "{} Hz", self.0)
        }
    }
}

impl Hertz {
    pub const fn mhz(mhz: f64) -> Self {
        Self(mhz * 1e6)
    }

    pub const fn as_hz(self) -> f64 {
        self.0
    }

    pub const fn as_mhz(self) -> f64 {
        self.0 / 1e6
    }
}

impl From<f64> for Hertz {
    fn from(hz: f64) -> Self {
        Self(hz)
    }
}

impl From<Hertz> for f64 {
    fn from(hz: Hertz) -> Self {
        hz.0
    }
}

/// Power level in Decibels (dB).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Decibels(pub f64);

impl std::fmt::Display for Decibels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} dB", self.0)
    }
}

impl Decibels {
    /// Lowest level a power ratio converts to. Zero, negative and NaN power
    /// all land here instead of producing `-inf` or `NaN`.
    pub const FLOOR: Self = Self(-300.0);

    /// Convert a linear power ratio to decibels: dB = 10 * log10(p)
    pub fn from_power_ratio(power: f64) -> Self {
        if power.is_nan() || power <= 0.0 {
            return Self::FLOOR;
        }
        let db = 10.0 * power.log10();
        if db.is_finite() {
            Self(db.max(Self::FLOOR.0))
        } else {
            // +inf power
            Self(f64::MAX)
        }
    }

    pub const fn as_db(self) -> f64 {
        self.0
    }
}

impl From<f64> for Decibels {
    fn from(db: f64) -> Self {
        Self(db)
    }
}

impl From<Decibels> for f64 {
    fn from(db: Decibels) -> Self {
        db.0
    }
}
