// Static region code <-> display-name table.
//
// The reproduction-number feed keys regions by lowercase state code while
// the other feeds key them by full display name, so every cross-feed
// lookup funnels through this table.
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Distinguished national key, present in every feed (`IN` in the Rt feed,
/// `India` in the name-keyed feeds).
pub const NATIONAL_CODE: &str = "IN";

/// Roster codes that never become table rows: the all-India total (`tt`),
/// cases not assigned to any state (`un`), and Lakshadweep (`ld`), which
/// none of the metric feeds cover.
pub const EXCLUDED_CODES: &[&str] = &["tt", "un", "ld"];

static STATE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("in", "India"),
        ("an", "Andaman and Nicobar Islands"),
        ("ap", "Andhra Pradesh"),
        ("ar", "Arunachal Pradesh"),
        ("as", "Assam"),
        ("br", "Bihar"),
        ("ch", "Chandigarh"),
        ("ct", "Chhattisgarh"),
        ("dd", "Daman and Diu"),
        ("dl", "Delhi"),
        ("dn", "Dadra and Nagar Haveli"),
        ("ga", "Goa"),
        ("gj", "Gujarat"),
        ("hp", "Himachal Pradesh"),
        ("hr", "Haryana"),
        ("jh", "Jharkhand"),
        ("jk", "Jammu and Kashmir"),
        ("ka", "Karnataka"),
        ("kl", "Kerala"),
        ("la", "Ladakh"),
        ("ld", "Lakshadweep"),
        ("mh", "Maharashtra"),
        ("ml", "Meghalaya"),
        ("mn", "Manipur"),
        ("mp", "Madhya Pradesh"),
        ("mz", "Mizoram"),
        ("nl", "Nagaland"),
        ("or", "Odisha"),
        ("pb", "Punjab"),
        ("py", "Puducherry"),
        ("rj", "Rajasthan"),
        ("sk", "Sikkim"),
        ("tg", "Telangana"),
        ("tn", "Tamil Nadu"),
        ("tr", "Tripura"),
        ("up", "Uttar Pradesh"),
        ("ut", "Uttarakhand"),
        ("wb", "West Bengal"),
    ])
});

/// Look up the display name for a state code, case-insensitively.
pub fn display_name(code: &str) -> Option<&'static str> {
    STATE_NAMES.get(code.to_lowercase().as_str()).copied()
}

/// Reverse lookup: find the lowercase code for a display name.
pub fn code_for_name(name: &str) -> Option<&'static str> {
    STATE_NAMES
        .iter()
        .find(|(_, v)| v.eq_ignore_ascii_case(name))
        .map(|(k, _)| *k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_bidirectional() {
        assert_eq!(display_name("mh"), Some("Maharashtra"));
        assert_eq!(display_name("MH"), Some("Maharashtra"));
        assert_eq!(display_name(NATIONAL_CODE), Some("India"));
        assert_eq!(code_for_name("maharashtra"), Some("mh"));
        assert_eq!(code_for_name("India"), Some("in"));
        assert_eq!(display_name("zz"), None);
    }
}
