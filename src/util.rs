// Utility helpers for sparse-value parsing and display formatting.
//
// This module centralizes all the "dirty" JSON/number/date handling so the
// rest of the code can assume clean, typed values. Feed arrays mix numbers,
// numeric strings and empty-string sentinels; everything that is not a
// finite number becomes `None` here and stays `None` through the engine.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Year the feed date labels (e.g. `"22 March"`) implicitly belong to.
pub const REFERENCE_YEAR: i32 = 2020;

/// Convert one raw feed entry into an optional finite number.
///
/// - Numbers are kept unless they are NaN/infinite.
/// - Numeric strings (after trimming) are parsed; the empty string is the
///   feeds' missing-value sentinel and maps to `None`.
/// - Anything else (null, objects, arrays) maps to `None`.
pub fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|x| x.is_finite())
        }
        _ => None,
    }
}

/// Deserialize a sparse numeric array into `Vec<Option<f64>>`.
///
/// Used with `#[serde(deserialize_with = "...")]` on every series field so
/// the missing-value policy is applied exactly once, at the feed boundary.
pub fn sparse_series<'de, D>(de: D) -> Result<Vec<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(de)?;
    Ok(raw.iter().map(value_to_f64).collect())
}

/// Parse a day-month date label like `"22 March"`.
///
/// The feeds omit the year from their date axes, so labels are anchored to
/// [`REFERENCE_YEAR`]. Returns `None` for labels that do not parse.
pub fn parse_date_label(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{} {}", s, REFERENCE_YEAR), "%d %B %Y").ok()
}

/// Format a rate for display: fixed two decimal places, `"NA"` if missing.
pub fn fmt_rate(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{:.2}", x),
        None => "NA".to_string(),
    }
}

/// Format a count for display: integer floor with thousands separators,
/// `"-"` if missing.
pub fn fmt_count(v: Option<f64>) -> String {
    match v {
        Some(x) => format_int(x.floor() as i64),
        None => "-".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in table cells and console messages (e.g. `9,855`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_parse() {
        assert_eq!(value_to_f64(&json!(3.25)), Some(3.25));
        assert_eq!(value_to_f64(&json!("412")), Some(412.0));
        assert_eq!(value_to_f64(&json!(" 1.5 ")), Some(1.5));
    }

    #[test]
    fn missing_sentinels_map_to_none() {
        assert_eq!(value_to_f64(&json!("")), None);
        assert_eq!(value_to_f64(&json!(null)), None);
        assert_eq!(value_to_f64(&json!("n/a")), None);
        assert_eq!(value_to_f64(&json!({"x": 1})), None);
    }

    #[test]
    fn nan_is_treated_as_missing() {
        // serde_json cannot represent NaN as a number; a feed that smuggles
        // one in as a string must still resolve to missing.
        assert_eq!(value_to_f64(&json!("NaN")), None);
    }

    #[test]
    fn sparse_array_round_trips_through_serde() {
        #[derive(serde::Deserialize)]
        struct Wrap {
            #[serde(deserialize_with = "sparse_series")]
            xs: Vec<Option<f64>>,
        }
        let w: Wrap = serde_json::from_value(json!({"xs": ["", 1.0, "2", null]})).unwrap();
        assert_eq!(w.xs, vec![None, Some(1.0), Some(2.0), None]);
    }

    #[test]
    fn date_labels_parse_against_reference_year() {
        let d = parse_date_label("22 March").unwrap();
        assert_eq!(d.format("%Y-%m-%d").to_string(), "2020-03-22");
        assert_eq!(parse_date_label("not a date"), None);
        assert_eq!(parse_date_label(""), None);
    }

    #[test]
    fn display_formatting() {
        assert_eq!(fmt_rate(Some(7.236)), "7.24");
        assert_eq!(fmt_rate(None), "NA");
        assert_eq!(fmt_count(Some(12345.9)), "12,345");
        assert_eq!(fmt_count(None), "-");
    }
}
