// Windowed, aligned chart views over the raw feed series.
//
// `build_window` does the alignment; the per-metric assemblers below add
// the threshold lines, milestone markers and display bounds each chart
// needs. Everything here is recomputed on each region selection and never
// cached.
use serde::Serialize;

use crate::regions;
use crate::types::{CfrSeries, Feeds, MobilitySeries, RtSeries, TestingSeries};
use crate::util::parse_date_label;

/// First date shown in every chart.
pub const CHART_START_DATE: &str = "22 March";

/// Policy milestones drawn as labelled vertical markers.
pub const MILESTONES: &[(&str, &str)] = &[
    ("Lockdown 1", "25 March"),
    ("Lockdown 2", "15 April"),
    ("Lockdown 3", "04 May"),
    ("Lockdown 4", "18 May"),
    ("Unlock 1", "08 June"),
];

/// One chart series, aligned to the window's date labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// A named vertical marker at one date inside the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub label: String,
    pub date: String,
}

/// The windowed view handed to chart-rendering collaborators.
///
/// Every series in `series` has exactly `labels.len()` values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartWindow {
    pub labels: Vec<String>,
    pub series: Vec<AlignedSeries>,
    pub markers: Vec<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,
}

/// Slice `dates` and every supplied series from `start_date` to the end.
///
/// If `start_date` is not present in `dates` the whole history is shown
/// rather than failing. Series shorter or longer than the date axis are
/// padded with missing values / truncated so all outputs share one
/// length.
pub fn build_window(
    dates: &[String],
    series: &[(&str, &[Option<f64>])],
    start_date: &str,
) -> ChartWindow {
    let start = dates.iter().position(|d| d == start_date).unwrap_or(0);
    let labels: Vec<String> = dates[start..].to_vec();
    let series = series
        .iter()
        .map(|(label, values)| {
            let mut values: Vec<Option<f64>> =
                values.get(start..).unwrap_or_default().to_vec();
            values.truncate(labels.len());
            values.resize(labels.len(), None);
            AlignedSeries {
                label: (*label).to_string(),
                values,
            }
        })
        .collect();
    ChartWindow {
        labels,
        series,
        markers: Vec::new(),
        y_min: None,
        y_max: None,
    }
}

impl ChartWindow {
    /// Append a flat reference line at `value` spanning the whole window.
    pub fn push_threshold(&mut self, label: &str, value: f64) {
        self.series.push(AlignedSeries {
            label: label.to_string(),
            values: vec![Some(value); self.labels.len()],
        });
    }

    /// Add the milestone markers whose date falls inside the window.
    ///
    /// Dates are compared as parsed day-month labels; a label that does
    /// not parse falls back to membership in the window's label list.
    pub fn add_milestone_markers(&mut self) {
        let (Some(first), Some(last)) = (self.labels.first(), self.labels.last()) else {
            return;
        };
        let bounds = (parse_date_label(first), parse_date_label(last));
        for (label, date) in MILESTONES {
            let inside = match (bounds.0, bounds.1, parse_date_label(date)) {
                (Some(lo), Some(hi), Some(d)) => lo <= d && d <= hi,
                _ => self.labels.iter().any(|l| l == date),
            };
            if inside {
                self.markers.push(Marker {
                    label: (*label).to_string(),
                    date: (*date).to_string(),
                });
            }
        }
    }
}

/// Lower axis bound for a windowed series: the floor of the window
/// minimum, never above `ceiling` so short or noisy windows keep a sane
/// scale. An all-missing window yields `ceiling`.
pub fn lower_display_bound(values: &[Option<f64>], ceiling: f64) -> f64 {
    let min = values
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .fold(f64::INFINITY, f64::min);
    if min.is_finite() {
        min.floor().min(ceiling)
    } else {
        ceiling
    }
}

/// Upper axis bound: the ceiling of the window maximum clamped into
/// `[floor, ceiling]`. An all-missing window yields `floor`.
pub fn upper_display_bound(values: &[Option<f64>], floor: f64, ceiling: f64) -> f64 {
    let max = values
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() {
        max.ceil().clamp(floor, ceiling)
    } else {
        floor
    }
}

/// Reproduction-number chart: central estimate with 50%/95% bands, the
/// epidemic threshold at 1, and a lower axis bound never above 0.5.
pub fn rt_window(series: &RtSeries, start_date: &str) -> ChartWindow {
    let mut w = build_window(
        &series.dates,
        &[
            ("Rt l95", &series.rt_l95),
            ("Rt l50", &series.rt_l50),
            ("Rt", &series.rt_point),
            ("Rt u50", &series.rt_u50),
            ("Rt u95", &series.rt_u95),
        ],
        start_date,
    );
    w.y_min = Some(lower_display_bound(&w.series[0].values, 0.5));
    w.push_threshold("Epidemic threshold", 1.0);
    w.add_milestone_markers();
    w
}

/// Corrected-fatality-rate chart: 5% / 10% guide lines and an upper axis
/// bound kept between 10 and 20.
pub fn fatality_window(series: &CfrSeries, start_date: &str) -> ChartWindow {
    let mut w = build_window(&series.dates, &[("CFR", &series.cfr3_point)], start_date);
    w.y_max = Some(upper_display_bound(&w.series[0].values, 10.0, 20.0));
    w.push_threshold("Upper limit", 10.0);
    w.push_threshold("Lower limit", 5.0);
    w.add_milestone_markers();
    w
}

/// Positivity-rate chart with the same 5% / 10% guide lines.
pub fn positivity_window(series: &TestingSeries, start_date: &str) -> ChartWindow {
    let mut w = build_window(
        &series.dates,
        &[("Positivity Rate", &series.daily_positivity_rate_ma)],
        start_date,
    );
    w.push_threshold("Upper limit", 10.0);
    w.push_threshold("Lower limit", 5.0);
    w.add_milestone_markers();
    w
}

/// Daily new cases plus their 7-day moving average.
pub fn daily_cases_window(series: &TestingSeries, start_date: &str) -> ChartWindow {
    let mut w = build_window(
        &series.dates,
        &[
            ("Daily Cases", &series.daily_positive_cases),
            ("Daily Cases Moving Average", &series.daily_positive_cases_ma),
        ],
        start_date,
    );
    w.add_milestone_markers();
    w
}

/// Daily tests performed.
pub fn daily_tests_window(series: &TestingSeries, start_date: &str) -> ChartWindow {
    let mut w = build_window(
        &series.dates,
        &[("Daily Tests", &series.daily_tests)],
        start_date,
    );
    w.add_milestone_markers();
    w
}

/// Mobility chart: the average plus the six category series, with the
/// pre-pandemic baseline at 0.
pub fn mobility_window(series: &MobilitySeries, start_date: &str) -> ChartWindow {
    let mut w = build_window(
        &series.dates,
        &[
            ("Mobility Average", &series.average_mobility),
            ("Grocery and Pharmacy", &series.grocery),
            ("Parks", &series.parks),
            ("Residential", &series.residential),
            ("Retail and Recreation", &series.retail),
            ("Transit Stations", &series.transit),
            ("Workplace", &series.workplace),
        ],
        start_date,
    );
    w.push_threshold("Baseline", 0.0);
    w.add_milestone_markers();
    w
}

/// All six chart windows for one region, keyed the way the feeds key it.
///
/// Charts whose feed (or region entry) is unavailable are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionCharts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rt: Option<ChartWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatality: Option<ChartWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positivity: Option<ChartWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_cases: Option<ChartWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_tests: Option<ChartWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobility: Option<ChartWindow>,
}

/// Assemble every chart window for one region.
///
/// `key` is a state code or the national `IN`; the name-keyed feeds are
/// looked up through the region table.
pub fn region_charts(key: &str, feeds: &Feeds, start_date: &str) -> RegionCharts {
    let name = regions::display_name(key).unwrap_or(key);
    RegionCharts {
        rt: feeds
            .rt
            .as_ref()
            .and_then(|m| m.get(key))
            .map(|s| rt_window(s, start_date)),
        fatality: feeds
            .cfr
            .as_ref()
            .and_then(|m| m.get(name))
            .map(|s| fatality_window(s, start_date)),
        positivity: feeds
            .testing
            .as_ref()
            .and_then(|f| f.regions.get(name))
            .map(|s| positivity_window(s, start_date)),
        daily_cases: feeds
            .testing
            .as_ref()
            .and_then(|f| f.regions.get(name))
            .map(|s| daily_cases_window(s, start_date)),
        daily_tests: feeds
            .testing
            .as_ref()
            .and_then(|f| f.regions.get(name))
            .map(|s| daily_tests_window(s, start_date)),
        mobility: feeds
            .mobility
            .as_ref()
            .and_then(|m| m.get(name))
            .map(|s| mobility_window(s, start_date)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn april(n: usize) -> Vec<String> {
        (1..=n).map(|d| format!("{:02} April", d)).collect()
    }

    #[test]
    fn window_is_a_contiguous_suffix_with_equal_lengths() {
        let dates = april(10);
        let a: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        let b = vec![None; 10];
        let w = build_window(&dates, &[("a", &a), ("b", &b)], "04 April");
        assert_eq!(w.labels, &dates[3..]);
        for s in &w.series {
            assert_eq!(s.values.len(), w.labels.len());
        }
        assert_eq!(w.series[0].values[0], Some(3.0));
    }

    #[test]
    fn absent_start_date_shows_the_whole_history() {
        let dates = april(5);
        let a = vec![Some(1.0); 5];
        let w = build_window(&dates, &[("a", &a)], "01 January");
        assert_eq!(w.labels.len(), 5);
    }

    #[test]
    fn ragged_series_are_padded_and_truncated() {
        let dates = april(6);
        let short = vec![Some(1.0); 2];
        let long = vec![Some(2.0); 9];
        let w = build_window(&dates, &[("short", &short), ("long", &long)], "03 April");
        assert_eq!(w.labels.len(), 4);
        assert_eq!(w.series[0].values, vec![None; 4]);
        assert_eq!(w.series[1].values.len(), 4);
    }

    #[test]
    fn thresholds_span_the_window() {
        let dates = april(4);
        let a = vec![Some(1.0); 4];
        let mut w = build_window(&dates, &[("a", &a)], "02 April");
        w.push_threshold("limit", 5.0);
        let t = w.series.last().unwrap();
        assert_eq!(t.values, vec![Some(5.0); 3]);
    }

    #[test]
    fn markers_are_restricted_to_the_window() {
        let dates: Vec<String> = vec![
            "01 May".into(),
            "04 May".into(),
            "18 May".into(),
            "20 May".into(),
        ];
        let a = vec![Some(1.0); 4];
        let mut w = build_window(&dates, &[("a", &a)], "01 May");
        w.add_milestone_markers();
        let labels: Vec<&str> = w.markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Lockdown 3", "Lockdown 4"]);
    }

    #[test]
    fn display_bounds_are_clamped() {
        let v = vec![Some(1.8), Some(2.4), None];
        assert_eq!(lower_display_bound(&v, 0.5), 0.5);
        let low = vec![Some(-1.7)];
        assert_eq!(lower_display_bound(&low, 0.5), -2.0);
        assert_eq!(lower_display_bound(&[None], 0.5), 0.5);

        let cfr = vec![Some(3.2), Some(4.0)];
        assert_eq!(upper_display_bound(&cfr, 10.0, 20.0), 10.0);
        let spike = vec![Some(34.0)];
        assert_eq!(upper_display_bound(&spike, 10.0, 20.0), 20.0);
        assert_eq!(upper_display_bound(&[Some(12.3)], 10.0, 20.0), 13.0);
        assert_eq!(upper_display_bound(&[], 10.0, 20.0), 10.0);
    }

    #[test]
    fn rt_window_carries_bands_threshold_and_bound() {
        let s = RtSeries {
            dates: april(3),
            rt_point: vec![Some(1.1), Some(1.0), Some(0.9)],
            rt_l50: vec![Some(1.0), Some(0.9), Some(0.8)],
            rt_u50: vec![Some(1.2), Some(1.1), Some(1.0)],
            rt_l95: vec![Some(0.9), Some(0.8), Some(0.7)],
            rt_u95: vec![Some(1.3), Some(1.2), Some(1.1)],
        };
        let w = rt_window(&s, "01 April");
        assert_eq!(w.series.len(), 6);
        assert_eq!(w.series[0].label, "Rt l95");
        assert_eq!(w.series.last().unwrap().values[0], Some(1.0));
        assert_eq!(w.y_min, Some(0.0));
    }
}
