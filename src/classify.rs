// Trend classification.
//
// The per-metric thresholds are fixed domain constants; rendering code
// maps the band to a color but never re-derives it.
use serde::Serialize;

/// Qualitative risk band for one metric's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Band {
    Good,
    Warning,
    Critical,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    ReproductionNumber,
    PositivityRate,
    FatalityRate,
}

/// Trailing points inspected for the reproduction-number band.
pub const RT_HISTORY_LEN: usize = 14;

/// Assign a risk band to a metric's current value.
///
/// An unresolved current value is always `Unknown`. `history` is only
/// consulted for the reproduction number: a current value at or below 1
/// is still `Warning` if any of the trailing
/// [`RT_HISTORY_LEN`] points exceeded 1.
/// Positivity and fatality rates band on the 5% / 10% thresholds alone.
pub fn classify(kind: MetricKind, current: Option<f64>, history: &[f64]) -> Band {
    let Some(current) = current else {
        return Band::Unknown;
    };
    match kind {
        MetricKind::ReproductionNumber => {
            if current > 1.0 {
                Band::Critical
            } else if history.iter().any(|v| *v > 1.0) {
                Band::Warning
            } else {
                Band::Good
            }
        }
        MetricKind::PositivityRate | MetricKind::FatalityRate => {
            if current > 10.0 {
                Band::Critical
            } else if current > 5.0 {
                Band::Warning
            } else {
                Band::Good
            }
        }
    }
}
