// Sparse series resolution.
//
// Every feed series may have runs of missing values at either end
// (insufficient history at the start, reporting lag at the end). All
// "what is the latest known value" questions across the engine go through
// `resolve_latest` instead of each metric re-implementing the reverse
// scan.

/// A borrowed view over one metric's parallel `dates`/`values` arrays.
///
/// Index `i` in both slices refers to the same date.
#[derive(Debug, Clone, Copy)]
pub struct MetricSeries<'a> {
    pub dates: &'a [String],
    pub values: &'a [Option<f64>],
}

impl<'a> MetricSeries<'a> {
    pub fn new(dates: &'a [String], values: &'a [Option<f64>]) -> Self {
        Self { dates, values }
    }
}

/// Result of resolving a sparse series.
///
/// All fields are unresolved for an empty or entirely-missing series;
/// that is a normal outcome, never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved {
    /// Most recent populated value.
    pub value: Option<f64>,
    /// Date label the value was observed on.
    pub date: Option<String>,
    /// Position of the value in the series.
    pub index: Option<usize>,
    /// Value exactly `lookback` positions before `index`. Missing if that
    /// slot is itself missing; no further search is performed there.
    pub previous: Option<f64>,
}

fn populated(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Scan from the end of the series for the first populated entry.
///
/// With `lookback > 0`, also report the value `lookback` positions before
/// the resolved index (used for the fixed-offset week-over-week
/// comparison). Values are returned unrounded.
pub fn resolve_latest(series: &MetricSeries<'_>, lookback: usize) -> Resolved {
    let found = series
        .values
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, v)| populated(*v).map(|x| (i, x)));
    let Some((index, value)) = found else {
        return Resolved::default();
    };
    let previous = if lookback > 0 {
        index
            .checked_sub(lookback)
            .and_then(|i| populated(series.values[i]))
    } else {
        None
    };
    Resolved {
        value: Some(value),
        date: series.dates.get(index).cloned(),
        index: Some(index),
        previous,
    }
}

/// Collect up to `len` consecutive populated points ending at `end`.
///
/// When fewer than `len` points of history exist the window is simply
/// shorter; missing entries inside the range are skipped.
pub fn trailing_window(series: &MetricSeries<'_>, end: usize, len: usize) -> Vec<f64> {
    if series.values.is_empty() || len == 0 {
        return Vec::new();
    }
    let end = end.min(series.values.len() - 1);
    let start = (end + 1).saturating_sub(len);
    series.values[start..=end]
        .iter()
        .filter_map(|v| populated(*v))
        .collect()
}
