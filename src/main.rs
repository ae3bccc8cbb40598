// Entry point and high-level CLI flow.
//
// The binary is a thin exercise harness over the snapshot engine:
// - Option [1] loads the five feed documents, printing what loaded.
// - Option [2] builds the indicator table, previews it and exports
//   CSV/JSON.
// - Option [3] exports the chart windows for one region.
// All computation lives in the engine modules; this file only moves data
// between them and the console/files.
mod classify;
mod loader;
mod output;
mod regions;
mod resolve;
mod snapshot;
mod types;
mod util;
mod window;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use types::{Feeds, SnapshotRow};

/// Directory the feed documents are read from.
const FEED_DIR: &str = "data";

// Simple in-memory app state so we only load the feeds once but can
// rebuild snapshots and chart exports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { feeds: None }));

struct AppState {
    feeds: Option<Feeds>,
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Handle option [1]: load the feed documents.
///
/// Every feed loads independently; failures are reported per file and the
/// remaining feeds stay usable.
fn handle_load() {
    let (feeds, report) = loader::load_feeds(Path::new(FEED_DIR));
    println!(
        "Loaded {} of {} feeds.",
        report.loaded.len(),
        report.loaded.len() + report.failed.len()
    );
    for (file, err) in &report.failed {
        eprintln!("Feed {} unavailable: {}", file, err);
    }
    if let Some(stamp) = feeds
        .testing
        .as_ref()
        .and_then(|t| t.last_updated.as_deref())
    {
        // Truncate the feed timestamp to minutes, e.g. "21 June, 10:30".
        let stamp = stamp.split(':').take(2).collect::<Vec<_>>().join(":");
        println!("Data last updated: {}", stamp);
    }
    println!();
    let mut state = APP_STATE.lock().unwrap();
    state.feeds = Some(feeds);
}

/// Handle option [2]: build and export the per-state indicator table.
fn handle_snapshot_table() {
    let feeds = {
        let state = APP_STATE.lock().unwrap();
        state.feeds.clone()
    };
    let Some(feeds) = feeds else {
        println!("Error: No feeds loaded. Please load the feeds first (option 1).\n");
        return;
    };

    let collection = snapshot::build_collection(&feeds);
    let national_row = SnapshotRow::from(&collection.national);
    let rows: Vec<SnapshotRow> = collection.regions.iter().map(SnapshotRow::from).collect();

    println!("State Indicator Summary");
    println!("(India pinned first, states by descending cumulative cases)\n");
    output::preview_pinned_table(&national_row, &rows, 5);

    let csv_file = "state_indicators.csv";
    let mut all_rows = vec![national_row];
    all_rows.extend(rows);
    if let Err(e) = output::write_csv(csv_file, &all_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("(Full table exported to {})", csv_file);

    let json_file = "snapshots.json";
    if let Err(e) = output::write_json(json_file, &collection) {
        eprintln!("Write error: {}", e);
    }
    println!("(Snapshot collection exported to {})\n", json_file);
}

/// Handle option [3]: export all chart windows for one region.
fn handle_chart_export() {
    let feeds = {
        let state = APP_STATE.lock().unwrap();
        state.feeds.clone()
    };
    let Some(feeds) = feeds else {
        println!("Error: No feeds loaded. Please load the feeds first (option 1).\n");
        return;
    };

    print!("State code or name (e.g. mh, or IN for India): ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    let input = buf.trim();
    let key = if regions::display_name(input).is_some() {
        input.to_lowercase()
    } else if let Some(code) = regions::code_for_name(input) {
        code.to_string()
    } else {
        println!("Unknown region: {}\n", input);
        return;
    };
    // The Rt feed keys the national series as "IN", not "in".
    let key = if key == "in" {
        regions::NATIONAL_CODE.to_string()
    } else {
        key
    };

    let charts = window::region_charts(&key, &feeds, window::CHART_START_DATE);
    let file = format!("charts_{}.json", key.to_lowercase());
    if let Err(e) = output::write_json(&file, &charts) {
        eprintln!("Write error: {}", e);
        return;
    }
    println!("(Chart windows exported to {})\n", file);
}

/// Ask the user whether to go back to the selection menu.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn main() {
    loop {
        println!("COVID-19 State Indicators");
        println!("[1] Load the feeds");
        println!("[2] Generate indicator table");
        println!("[3] Export chart windows for a region\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_snapshot_table();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                handle_chart_export();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
}
