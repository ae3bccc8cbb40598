// Feed file loading.
//
// Each of the five documents loads and parses independently: a malformed
// or missing document marks that feed absent (every metric it backs then
// resolves to nothing) and is recorded in the load report, without
// touching the other feeds.
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::{CfrSeries, Feeds, MobilitySeries, Roster, RtSeries, TestingFeed};

pub const RT_FILE: &str = "rt.json";
pub const CFR_FILE: &str = "cfr.json";
pub const TESTING_FILE: &str = "positivity_rate.json";
pub const MOBILITY_FILE: &str = "mobility.json";
pub const ROSTER_FILE: &str = "national.json";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed feed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What happened while loading the feed directory.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<&'static str>,
    pub failed: Vec<(&'static str, FeedError)>,
}

fn read_feed<T: DeserializeOwned>(path: &Path) -> Result<T, FeedError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn load_into<T: DeserializeOwned>(
    dir: &Path,
    file: &'static str,
    report: &mut LoadReport,
) -> Option<T> {
    match read_feed(&dir.join(file)) {
        Ok(v) => {
            report.loaded.push(file);
            Some(v)
        }
        Err(e) => {
            report.failed.push((file, e));
            None
        }
    }
}

/// Parse the testing feed document, whose top level mixes region blocks
/// with one `datetime` timestamp string.
pub fn parse_testing_feed(value: Value) -> Result<TestingFeed, serde_json::Error> {
    let map: HashMap<String, Value> = serde_json::from_value(value)?;
    let mut feed = TestingFeed::default();
    for (key, entry) in map {
        if key == "datetime" {
            feed.last_updated = serde_json::from_value(entry).ok();
            continue;
        }
        feed.regions.insert(key, serde_json::from_value(entry)?);
    }
    Ok(feed)
}

/// Load every feed from `dir`, fail-closed per feed.
pub fn load_feeds(dir: &Path) -> (Feeds, LoadReport) {
    let mut report = LoadReport::default();
    let mut feeds = Feeds {
        rt: load_into::<HashMap<String, RtSeries>>(dir, RT_FILE, &mut report),
        cfr: load_into::<HashMap<String, CfrSeries>>(dir, CFR_FILE, &mut report),
        testing: None,
        mobility: load_into::<HashMap<String, MobilitySeries>>(dir, MOBILITY_FILE, &mut report),
        roster: load_into::<Roster>(dir, ROSTER_FILE, &mut report),
    };
    match read_feed::<Value>(&dir.join(TESTING_FILE))
        .and_then(|v| parse_testing_feed(v).map_err(FeedError::from))
    {
        Ok(f) => {
            report.loaded.push(TESTING_FILE);
            feeds.testing = Some(f);
        }
        Err(e) => report.failed.push((TESTING_FILE, e)),
    }
    (feeds, report)
}
