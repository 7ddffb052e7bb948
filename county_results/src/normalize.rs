// Canonical forms for the free-text fields found in the extracts.

use std::collections::{HashMap, HashSet};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::OfficeType;

/// The contests kept by the pipeline, in office rank order.
pub const ALLOWED_CONTESTS: [&str; 5] = [
    "President",
    "U.S. Senate",
    "Governor",
    "Lieutenant Governor",
    "Attorney General",
];

/// Localities that were absorbed into, or renamed as, a current locality.
pub const HISTORICAL_TO_CURRENT: [(&str, &str); 5] = [
    ("BEDFORD CITY", "BEDFORD COUNTY"),
    ("CLIFTON FORGE CITY", "ALLEGHANY COUNTY"),
    ("S BOSTON CITY", "HALIFAX COUNTY"),
    ("SOUTH BOSTON CITY", "HALIFAX COUNTY"),
    ("MANASSAS COUNTY", "MANASSAS CITY"),
];

/// Transcription variants of candidate names found in the older extracts.
pub const CANDIDATE_NAME_OVERRIDES: [(&str, &str); 22] = [
    ("A. Donald McEachin", "Aston Donald McEachin"),
    ("C. S. Robb", "Charles S. Robb"),
    ("Charies S. Robb", "Charles S. Robb"),
    ("D. S. Beyer, Jr", "Donald S. Beyer, Jr"),
    ("G. F. Allen", "George F. Allen"),
    ("J. H. Hager", "John H. Hager"),
    ("J. H. Webb, Jr", "James H. Webb, Jr"),
    ("J. K. Katzen", "Jay K. Katzen"),
    ("J. Marshall Coleman", "John Marshall Coleman"),
    ("J. S. Gilmore, III", "James S. Gilmore, III"),
    ("J. W. Kilgore", "Jerry W. Kilgore"),
    ("James Jim S. Gilmore, III", "James S. Gilmore, III"),
    ("J. W. Warner", "John W. Warner"),
    ("L. F. Payne, Jr", "Lewis F. Payne, Jr"),
    ("L. L. Byrne", "Leslie L. Byrne"),
    ("M. L. Earley", "Mark L. Earley"),
    ("M. R. Warner", "Mark R. Warner"),
    ("T. M. Kaine", "Timothy M. Kaine"),
    ("W. B. Redpath", "William B. Redpath"),
    ("W. R. O'Brien", "William R. O'Brien"),
    ("W. T. Bolling", "William T. Bolling"),
    ("William Bill T. Bolling", "William T. Bolling"),
];

const PARTY_CODES: [(&str, &str); 10] = [
    ("DEMOCRATIC", "DEM"),
    ("REPUBLICAN", "REP"),
    ("LIBERTARIAN", "LIB"),
    ("GREEN", "GRN"),
    ("INDEPENDENT", "IND"),
    ("FORWARD", "FWD"),
    ("OTHER", "OTH"),
    ("WRITE-IN", "WRI"),
    ("WRITE IN", "WRI"),
    ("", "OTH"),
];

pub const DEFAULT_STATE_NAME: &str = "Virginia";

static DISTRICT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\(CD\s*0*\d+\)\s*$").unwrap());

/// Canonical comparison key of a locality name.
///
/// Trims, uppercases, spells out `&`, removes periods and collapses runs of
/// whitespace. Applying it twice gives the same result as applying it once.
pub fn normalize_locality(name: &str) -> String {
    let s = name.trim().to_uppercase().replace('&', "AND").replace('.', "");
    s.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Removes a trailing congressional district tag, such as `Fairfax County (CD 08)`.
pub fn strip_district_suffix(name: &str) -> String {
    DISTRICT_SUFFIX.replace(name.trim(), "").to_string()
}

/// The key used to look a raw locality up, before the alias table.
pub fn locality_key(raw: &str) -> String {
    normalize_locality(&strip_district_suffix(raw))
}

/// Maps a contest label to its canonical spelling, if it is one of the kept contests.
pub fn canonical_contest(contest: &str) -> Option<&'static str> {
    let c = contest.trim();
    if c.is_empty() {
        return None;
    }
    let lower = c.to_lowercase();
    if lower == "us senate" {
        return Some("U.S. Senate");
    }
    ALLOWED_CONTESTS
        .iter()
        .find(|allowed| allowed.to_lowercase() == lower)
        .copied()
}

/// Short party code, as used for the `all_parties` breakdown.
pub fn party_code(party_name: &str) -> String {
    let p = party_name.trim().to_uppercase();
    match PARTY_CODES.iter().find(|(name, _)| *name == p) {
        Some((_, code)) => code.to_string(),
        None => p.chars().take(3).collect(),
    }
}

pub fn office_type(contest: &str) -> OfficeType {
    let c = contest.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| c.contains(w));
    if has_any(&[
        "president",
        "senate",
        "house of representatives",
        "u.s.",
        "us senate",
        "congress",
    ]) {
        OfficeType::Federal
    } else if has_any(&["judge", "judicial", "justice"]) {
        OfficeType::Judicial
    } else if has_any(&[
        "governor",
        "attorney general",
        "lieutenant governor",
        "house of delegates",
    ]) {
        OfficeType::State
    } else {
        OfficeType::Other
    }
}

/// Rank of a contest for display and analysis. Unranked contests get 99.
pub fn office_rank(contest: &str) -> u32 {
    match contest.to_lowercase().as_str() {
        "president" => 1,
        "u.s. senate" | "us senate" => 2,
        "governor" => 3,
        "lieutenant governor" => 4,
        "attorney general" => 5,
        _ => 99,
    }
}

/// Parses a vote count as written in the extracts.
///
/// Thousand separators are ignored and decimal counts are truncated, so that
/// `"1,234.0"` and `"1234"` both give 1234. Anything that does not parse, as
/// well as negative counts, gives 0.
pub fn parse_votes(text: &str) -> u64 {
    let s = text.replace(',', "");
    let s = s.trim();
    if s.is_empty() {
        return 0;
    }
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() && x > 0.0 => x.trunc() as u64,
        Ok(_) => 0,
        Err(_) => {
            debug!("parse_votes: could not parse {:?}, counting 0", text);
            0
        }
    }
}

/// The static lookup tables used while loading and aggregating.
///
/// They are built once at startup and are not modified afterwards.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LookupTables {
    aliases: HashMap<String, String>,
    candidate_overrides: HashMap<String, String>,
    statewide_markers: HashSet<String>,
}

impl LookupTables {
    pub fn new(state_name: &str) -> LookupTables {
        let state = normalize_locality(state_name);
        let statewide_markers: HashSet<String> = [
            "TOTAL".to_string(),
            "TOTALS".to_string(),
            format!("COMMONWEALTH OF {}", state),
            format!("STATE OF {}", state),
            state,
        ]
        .into_iter()
        .collect();
        LookupTables {
            aliases: HISTORICAL_TO_CURRENT
                .iter()
                .map(|(old, new)| (old.to_string(), new.to_string()))
                .collect(),
            candidate_overrides: CANDIDATE_NAME_OVERRIDES
                .iter()
                .map(|(variant, name)| (variant.to_string(), name.to_string()))
                .collect(),
            statewide_markers,
        }
    }

    /// Adds locality aliases. Both sides are normalized.
    pub fn with_aliases<'a>(
        mut self,
        aliases: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> LookupTables {
        for (old, new) in aliases {
            self.aliases
                .insert(normalize_locality(old), normalize_locality(new));
        }
        self
    }

    pub fn with_candidate_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> LookupTables {
        for (variant, name) in overrides {
            self.candidate_overrides
                .insert(variant.trim().to_string(), name.trim().to_string());
        }
        self
    }

    /// The current key for a normalized locality key.
    pub fn current_locality<'a>(&'a self, key: &'a str) -> &'a str {
        self.aliases.get(key).map(|s| s.as_str()).unwrap_or(key)
    }

    pub fn canonical_candidate(&self, name: &str) -> String {
        let n = name.trim();
        self.candidate_overrides
            .get(n)
            .cloned()
            .unwrap_or_else(|| n.to_string())
    }

    /// True for the rows that report the statewide total rather than a locality.
    pub fn is_statewide(&self, key: &str) -> bool {
        self.statewide_markers.contains(key)
    }
}

impl Default for LookupTables {
    fn default() -> LookupTables {
        LookupTables::new(DEFAULT_STATE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_locality_names() {
        assert_eq!(normalize_locality("  Fairfax   county "), "FAIRFAX COUNTY");
        assert_eq!(normalize_locality("King & Queen County"), "KING AND QUEEN COUNTY");
        assert_eq!(normalize_locality("St. Mary's"), "ST MARY'S");
        assert_eq!(normalize_locality(""), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        for s in [
            " Isle of  Wight County",
            "S. Boston City",
            "King &  Queen",
            "Norfolk City (CD 03)",
        ] {
            let once = normalize_locality(s);
            assert_eq!(normalize_locality(&once), once);
        }
    }

    #[test]
    fn strips_district_suffix() {
        assert_eq!(strip_district_suffix("Henrico County (CD 05)"), "Henrico County");
        assert_eq!(strip_district_suffix("Henrico County (cd5)"), "Henrico County");
        assert_eq!(strip_district_suffix("Henrico County(CD 011) "), "Henrico County");
        assert_eq!(strip_district_suffix("Henrico (County)"), "Henrico (County)");
        assert_eq!(locality_key("Bedford City (CD 06)"), "BEDFORD CITY");
    }

    #[test]
    fn canonical_contests() {
        assert_eq!(canonical_contest("US Senate"), Some("U.S. Senate"));
        assert_eq!(canonical_contest("us senate "), Some("U.S. Senate"));
        assert_eq!(canonical_contest("U.S. Senate"), Some("U.S. Senate"));
        assert_eq!(canonical_contest("president"), Some("President"));
        assert_eq!(canonical_contest("House of Delegates"), None);
        assert_eq!(canonical_contest(""), None);
    }

    #[test]
    fn party_codes() {
        assert_eq!(party_code("Democratic"), "DEM");
        assert_eq!(party_code(" republican"), "REP");
        assert_eq!(party_code("Write-In"), "WRI");
        assert_eq!(party_code(""), "OTH");
        assert_eq!(party_code("Constitution"), "CON");
        assert_eq!(party_code("IG"), "IG");
    }

    #[test]
    fn office_types_and_ranks() {
        assert_eq!(office_type("President"), OfficeType::Federal);
        assert_eq!(office_type("U.S. Senate"), OfficeType::Federal);
        assert_eq!(office_type("Lieutenant Governor"), OfficeType::State);
        assert_eq!(office_type("Supreme Court Justice"), OfficeType::Judicial);
        assert_eq!(office_type("Mayor"), OfficeType::Other);
        assert_eq!(office_rank("Governor"), 3);
        assert_eq!(office_rank("U.S. Senate"), 2);
        assert_eq!(office_rank("Mayor"), 99);
    }

    #[test]
    fn vote_text() {
        assert_eq!(parse_votes("12,345"), 12345);
        assert_eq!(parse_votes(""), 0);
        assert_eq!(parse_votes("1,234.0"), 1234);
        assert_eq!(parse_votes("1234"), 1234);
        assert_eq!(parse_votes(" 77 "), 77);
        assert_eq!(parse_votes("n/a"), 0);
        assert_eq!(parse_votes("-5"), 0);
    }

    #[test]
    fn lookup_tables() {
        let t = LookupTables::default().with_aliases([("Old Town City", "new town county")]);
        assert_eq!(t.current_locality("BEDFORD CITY"), "BEDFORD COUNTY");
        assert_eq!(t.current_locality("OLD TOWN CITY"), "NEW TOWN COUNTY");
        assert_eq!(t.current_locality("FAIRFAX COUNTY"), "FAIRFAX COUNTY");
        assert_eq!(t.canonical_candidate(" T. M. Kaine "), "Timothy M. Kaine");
        assert_eq!(t.canonical_candidate("Glenn Youngkin"), "Glenn Youngkin");
        assert!(t.is_statewide("TOTALS"));
        assert!(t.is_statewide("VIRGINIA"));
        assert!(t.is_statewide("COMMONWEALTH OF VIRGINIA"));
        assert!(!t.is_statewide("RICHMOND CITY"));
    }
}
