use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabled::Tabled;

use crate::classify::Band;
use crate::util::{fmt_count, fmt_rate, sparse_series};

/// One region's block in the reproduction-number feed.
///
/// The feed is keyed by lowercase state code plus the national `IN` key.
/// All five series share the `dates` axis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RtSeries {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub rt_point: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub rt_l50: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub rt_u50: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub rt_l95: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub rt_u95: Vec<Option<f64>>,
}

/// One region's block in the corrected-fatality-rate feed (keyed by
/// display name, not state code).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CfrSeries {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub cfr3_point: Vec<Option<f64>>,
}

/// One region's block in the testing/positivity feed (keyed by display
/// name). Missing entries are common at the start of every series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestingSeries {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub daily_positive_cases: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub daily_positive_cases_ma: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub cum_positive_cases: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub daily_tests: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub daily_positivity_rate_ma: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub cum_positivity_rate: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub test_per_million: Vec<Option<f64>>,
}

/// The testing feed document: region blocks plus one top-level feed
/// timestamp living alongside them.
#[derive(Debug, Clone, Default)]
pub struct TestingFeed {
    pub last_updated: Option<String>,
    pub regions: HashMap<String, TestingSeries>,
}

/// One region's block in the mobility feed (keyed by display name).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MobilitySeries {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub average_mobility: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub grocery: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub parks: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub residential: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub retail: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub transit: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "sparse_series")]
    pub workplace: Vec<Option<f64>>,
}

/// The roster document; only used to enumerate which region codes exist.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub statewise: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterEntry {
    pub statecode: String,
    #[serde(default)]
    pub state: String,
}

/// All feeds the engine consumes, fully materialized.
///
/// A feed that failed to load or parse is `None`; every metric it backs
/// then degrades to unresolved without affecting the other feeds.
#[derive(Debug, Clone, Default)]
pub struct Feeds {
    pub rt: Option<HashMap<String, RtSeries>>,
    pub cfr: Option<HashMap<String, CfrSeries>>,
    pub testing: Option<TestingFeed>,
    pub mobility: Option<HashMap<String, MobilitySeries>>,
    pub roster: Option<Roster>,
}

/// Latest resolved value of one metric for one region.
///
/// `previous` is the value exactly seven positions earlier in the series,
/// used for week-over-week trend arrows; `date` is the label the current
/// value was observed on. Values stay unrounded until display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub date: Option<String>,
}

/// Latest reproduction-number estimate with its 95% interval and the
/// trailing history used for trend classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RtSnapshot {
    pub point: Option<f64>,
    pub lower95: Option<f64>,
    pub upper95: Option<f64>,
    pub date: Option<String>,
    pub history: Vec<f64>,
}

/// One row of the indicator table, fully resolved for one region.
///
/// Rebuilt from the feeds on every load; never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSnapshot {
    pub key: String,
    pub name: String,
    pub rt: RtSnapshot,
    pub cumulative_cases: MetricSnapshot,
    pub daily_cases: MetricSnapshot,
    pub positivity_rate: MetricSnapshot,
    pub cumulative_positivity_rate: MetricSnapshot,
    pub fatality_rate: MetricSnapshot,
    pub tests_per_million: MetricSnapshot,
    pub rt_band: Band,
    pub positivity_band: Band,
    pub fatality_band: Band,
}

/// Every region snapshot plus the national one, which is always pinned
/// first rather than sorted into the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotCollection {
    pub national: RegionSnapshot,
    pub regions: Vec<RegionSnapshot>,
}

/// Presentation row for the console table and CSV export.
///
/// All rounding happens here and only here: rates get two decimals,
/// counts are floored with thousands separators, unresolved values render
/// as `NA`/`-`.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct SnapshotRow {
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub state: String,
    #[serde(rename = "Rt")]
    #[tabled(rename = "Rt")]
    pub rt: String,
    #[serde(rename = "CumulativeCases")]
    #[tabled(rename = "CumulativeCases")]
    pub cumulative_cases: String,
    #[serde(rename = "DailyCases")]
    #[tabled(rename = "DailyCases")]
    pub daily_cases: String,
    #[serde(rename = "PositivityRate")]
    #[tabled(rename = "PositivityRate")]
    pub positivity_rate: String,
    #[serde(rename = "CumPositivityRate")]
    #[tabled(rename = "CumPositivityRate")]
    pub cumulative_positivity_rate: String,
    #[serde(rename = "CCFR")]
    #[tabled(rename = "CCFR")]
    pub fatality_rate: String,
    #[serde(rename = "TestsPerMillion")]
    #[tabled(rename = "TestsPerMillion")]
    pub tests_per_million: String,
}

impl From<&RegionSnapshot> for SnapshotRow {
    fn from(s: &RegionSnapshot) -> Self {
        let rt = match s.rt.point {
            Some(p) => format!(
                "{:.2} ({}-{})",
                p,
                fmt_rate(s.rt.lower95),
                fmt_rate(s.rt.upper95)
            ),
            None => "NA".to_string(),
        };
        SnapshotRow {
            state: s.name.clone(),
            rt,
            cumulative_cases: fmt_count(s.cumulative_cases.current),
            daily_cases: fmt_count(s.daily_cases.current),
            positivity_rate: fmt_rate(s.positivity_rate.current),
            cumulative_positivity_rate: fmt_rate(s.cumulative_positivity_rate.current),
            fatality_rate: fmt_rate(s.fatality_rate.current),
            tests_per_million: fmt_count(s.tests_per_million.current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rt_series_tolerates_missing_entries_and_fields() {
        let s: RtSeries = serde_json::from_value(json!({
            "dates": ["20 April", "21 April"],
            "rt_point": [1.1, ""],
            "rt_l95": ["0.9", null]
        }))
        .unwrap();
        assert_eq!(s.rt_point, vec![Some(1.1), None]);
        assert_eq!(s.rt_l95, vec![Some(0.9), None]);
        assert!(s.rt_u95.is_empty());
    }

    #[test]
    fn snapshot_row_formats_at_the_presentation_boundary() {
        let mut snap = RegionSnapshot {
            key: "mh".into(),
            name: "Maharashtra".into(),
            rt: RtSnapshot {
                point: Some(1.024),
                lower95: Some(0.951),
                upper95: Some(1.103),
                date: Some("20 June".into()),
                history: vec![],
            },
            cumulative_cases: MetricSnapshot {
                current: Some(120504.7),
                previous: None,
                date: Some("20 June".into()),
            },
            daily_cases: MetricSnapshot::default(),
            positivity_rate: MetricSnapshot::default(),
            cumulative_positivity_rate: MetricSnapshot::default(),
            fatality_rate: MetricSnapshot::default(),
            tests_per_million: MetricSnapshot::default(),
            rt_band: Band::Critical,
            positivity_band: Band::Unknown,
            fatality_band: Band::Unknown,
        };
        let row = SnapshotRow::from(&snap);
        assert_eq!(row.rt, "1.02 (0.95-1.10)");
        assert_eq!(row.cumulative_cases, "120,504");
        assert_eq!(row.positivity_rate, "NA");
        assert_eq!(row.daily_cases, "-");

        snap.rt.point = None;
        assert_eq!(SnapshotRow::from(&snap).rt, "NA");
    }
}
