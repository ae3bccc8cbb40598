// Per-region snapshot construction and collection ordering.
//
// Snapshots are pure functions of the feed bundle: the same feeds always
// produce the same collection, and a missing region or feed degrades to
// unresolved markers instead of failing the build.
use std::cmp::Ordering;

use crate::classify::{classify, MetricKind, RT_HISTORY_LEN};
use crate::regions;
use crate::resolve::{resolve_latest, trailing_window, MetricSeries};
use crate::types::{
    Feeds, MetricSnapshot, RegionSnapshot, RtSnapshot, SnapshotCollection, TestingSeries,
};

/// Position offset for week-over-week comparisons. The offset is into the
/// series, not 7 calendar days; gaps or duplicate dates would shift the
/// comparison point.
const WEEK_LOOKBACK: usize = 7;

fn metric(dates: &[String], values: &[Option<f64>], lookback: usize) -> MetricSnapshot {
    let r = resolve_latest(&MetricSeries::new(dates, values), lookback);
    MetricSnapshot {
        current: r.value,
        previous: r.previous,
        date: r.date,
    }
}

fn rt_snapshot(feeds: &Feeds, key: &str) -> RtSnapshot {
    let Some(series) = feeds.rt.as_ref().and_then(|m| m.get(key)) else {
        return RtSnapshot::default();
    };
    let point = resolve_latest(&MetricSeries::new(&series.dates, &series.rt_point), 0);
    let Some(index) = point.index else {
        return RtSnapshot::default();
    };
    // Interval bounds are read at the same resolved index as the point
    // estimate so the three numbers describe one observation.
    let at = |values: &[Option<f64>]| {
        values
            .get(index)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    };
    let history = trailing_window(
        &MetricSeries::new(&series.dates, &series.rt_point),
        index,
        RT_HISTORY_LEN,
    );
    RtSnapshot {
        point: point.value,
        lower95: at(&series.rt_l95),
        upper95: at(&series.rt_u95),
        date: point.date,
        history,
    }
}

/// Build the snapshot row for one region.
///
/// `key` is a lowercase state code or the national `IN`. The Rt feed is
/// looked up by code, the other feeds by display name; a region present
/// in the roster but absent from a feed still gets a snapshot, with that
/// feed's metrics unresolved.
pub fn build_snapshot(key: &str, feeds: &Feeds) -> RegionSnapshot {
    let name = regions::display_name(key).unwrap_or(key).to_string();

    let rt = rt_snapshot(feeds, key);

    let fatality_rate = feeds
        .cfr
        .as_ref()
        .and_then(|m| m.get(&name))
        .map(|s| metric(&s.dates, &s.cfr3_point, WEEK_LOOKBACK))
        .unwrap_or_default();

    let testing: Option<&TestingSeries> = feeds
        .testing
        .as_ref()
        .and_then(|f| f.regions.get(&name));
    let (cumulative_cases, daily_cases, positivity_rate, cumulative_positivity_rate, tests_per_million) =
        match testing {
            Some(s) => (
                metric(&s.dates, &s.cum_positive_cases, 0),
                metric(&s.dates, &s.daily_positive_cases_ma, WEEK_LOOKBACK),
                metric(&s.dates, &s.daily_positivity_rate_ma, WEEK_LOOKBACK),
                metric(&s.dates, &s.cum_positivity_rate, 0),
                metric(&s.dates, &s.test_per_million, 0),
            ),
            None => Default::default(),
        };

    let rt_band = classify(MetricKind::ReproductionNumber, rt.point, &rt.history);
    let positivity_band = classify(MetricKind::PositivityRate, positivity_rate.current, &[]);
    let fatality_band = classify(MetricKind::FatalityRate, fatality_rate.current, &[]);

    RegionSnapshot {
        key: key.to_string(),
        name,
        rt,
        cumulative_cases,
        daily_cases,
        positivity_rate,
        cumulative_positivity_rate,
        fatality_rate,
        tests_per_million,
        rt_band,
        positivity_band,
        fatality_band,
    }
}

fn sort_value(s: &RegionSnapshot) -> f64 {
    // Unresolved cumulative cases sort below every real count.
    s.cumulative_cases.current.unwrap_or(f64::NEG_INFINITY)
}

/// Build the full collection: one snapshot per roster region plus the
/// pinned national snapshot.
///
/// Pseudo-region codes are dropped, the rest keep roster order as the
/// tiebreak under a stable descending sort by cumulative cases.
pub fn build_collection(feeds: &Feeds) -> SnapshotCollection {
    let codes: Vec<String> = feeds
        .roster
        .as_ref()
        .map(|r| {
            r.statewise
                .iter()
                .map(|e| e.statecode.to_lowercase())
                .filter(|c| !regions::EXCLUDED_CODES.contains(&c.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let mut snapshots: Vec<RegionSnapshot> =
        codes.iter().map(|c| build_snapshot(c, feeds)).collect();
    snapshots.sort_by(|a, b| {
        sort_value(b)
            .partial_cmp(&sort_value(a))
            .unwrap_or(Ordering::Equal)
    });

    SnapshotCollection {
        national: build_snapshot(regions::NATIONAL_CODE, feeds),
        regions: snapshots,
    }
}
