use serde::Serialize;
use std::error::Error;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Print the indicator table as markdown, the pinned row first.
///
/// `max_rows` limits the region rows shown in the console preview; the
/// full table goes to the CSV export instead.
pub fn preview_pinned_table<T>(pinned: &T, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let mut slice: Vec<T> = Vec::with_capacity(max_rows + 1);
    slice.push(pinned.clone());
    slice.extend(rows.iter().cloned().take(max_rows));
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
