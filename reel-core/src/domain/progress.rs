//! Progress normalization
//!
//! The service reports job progress either as a fraction in [0, 1] or as a
//! percentage in [0, 100], without saying which. Values are normalized onto a
//! single 0-100 scale by range: anything inside the fractional range is
//! multiplied by 100, anything else is taken as a percentage already.
//!
//! The value exactly `1.0` is ambiguous: it is either a finished fraction or
//! one percent. [`UnitBoundary`] makes that choice explicit.

/// How to read a raw progress value of exactly `1.0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitBoundary {
    /// `1.0` is a fraction: 100%
    #[default]
    Fraction,
    /// `1.0` is a percentage: 1%
    Percent,
}

impl UnitBoundary {
    /// Normalize a raw progress value onto the 0-100 scale
    pub fn normalize(self, raw: f64) -> f64 {
        let fractional = match self {
            UnitBoundary::Fraction => (0.0..=1.0).contains(&raw),
            UnitBoundary::Percent => (0.0..1.0).contains(&raw),
        };

        if fractional { raw * 100.0 } else { raw }
    }
}

/// Normalize with the default boundary policy ([`UnitBoundary::Fraction`])
pub fn normalize_progress(raw: f64) -> f64 {
    UnitBoundary::default().normalize(raw)
}
