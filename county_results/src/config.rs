// ********* Input data structures ***********

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::Display;

use crate::classify::Competitiveness;

/// Year label of an extract. Files without a leading date are tagged `unknown`.
pub type Year = String;
/// Canonical contest name, one of [`crate::ALLOWED_CONTESTS`].
pub type Contest = String;
/// Stable locality identifier from the boundary source (a FIPS code).
pub type LocalityId = String;

pub const UNKNOWN_YEAR: &str = "unknown";

/// One vote line, as produced by the record readers.
///
/// Raw records only live between loading and aggregation. The locality key
/// has already gone through the district suffix stripping and normalization,
/// but not through the historical alias table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawRecord {
    pub year: Year,
    pub contest: Contest,
    pub locality_raw: String,
    pub locality_key: String,
    pub candidate: String,
    pub party_code: String,
    pub votes: u64,
    pub source_file: String,
}

/// A locality as known by the registry.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CanonicalLocality {
    pub id: LocalityId,
    pub display_name: String,
    pub key: String,
}

// ******** Output data structures *********

/// The aggregated result of one contest in one locality for one year.
#[derive(PartialEq, Debug, Clone)]
pub struct CountyResult {
    pub county: String,
    pub county_fips: LocalityId,
    pub contest: Contest,
    pub year: Year,
    pub office_type: OfficeType,
    pub office_rank: u32,
    pub dem_candidate: String,
    pub rep_candidate: String,
    pub dem_votes: u64,
    pub rep_votes: u64,
    pub dem_pct: f64,
    pub rep_pct: f64,
    pub other_votes: u64,
    pub total_votes: u64,
    pub two_party_total: u64,
    pub margin: u64,
    /// Margin over all the votes cast, formatted with two decimals.
    /// This is not the ratio used for the competitiveness rating.
    pub margin_pct: String,
    pub winner: String,
    pub competitiveness: Competitiveness,
    pub all_parties: BTreeMap<String, u64>,
}

pub type ContestResults = BTreeMap<LocalityId, CountyResult>;
pub type YearResults = BTreeMap<Contest, ContestResults>;
pub type ResultsByYear = BTreeMap<Year, YearResults>;

/// Everything produced by one aggregation pass.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Aggregation {
    pub results: ResultsByYear,
    /// The raw locality strings that could not be resolved, per year.
    pub unmatched: BTreeMap<Year, BTreeSet<String>>,
}

impl Aggregation {
    pub fn total_county_results(&self) -> usize {
        self.results
            .values()
            .flat_map(|contests| contests.values())
            .map(|counties| counties.len())
            .sum()
    }

    /// The years with at least one result, without the `unknown` tag.
    pub fn years_covered(&self) -> Vec<Year> {
        self.results
            .keys()
            .filter(|y| y.as_str() != UNKNOWN_YEAR)
            .cloned()
            .collect()
    }

    pub fn contests(&self) -> BTreeSet<Contest> {
        self.results
            .values()
            .flat_map(|contests| contests.keys().cloned())
            .collect()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum OfficeType {
    Federal,
    State,
    Judicial,
    Other,
}

impl OfficeType {
    pub const ALL: [OfficeType; 4] = [
        OfficeType::Federal,
        OfficeType::State,
        OfficeType::Judicial,
        OfficeType::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OfficeType::Federal => "Federal",
            OfficeType::State => "State",
            OfficeType::Judicial => "Judicial",
            OfficeType::Other => "Other",
        }
    }
}

/// Errors that prevent the locality registry from being built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RegistryError {
    Empty,
    /// Two localities normalize to the same lookup key.
    DuplicateKey {
        key: String,
        first: LocalityId,
        second: LocalityId,
    },
    DuplicateId(LocalityId),
}

impl Error for RegistryError {}

impl Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Empty => write!(f, "the boundary source contains no locality"),
            RegistryError::DuplicateKey { key, first, second } => write!(
                f,
                "localities {} and {} share the normalized name {:?}",
                first, second, key
            ),
            RegistryError::DuplicateId(id) => write!(f, "locality id {} appears twice", id),
        }
    }
}
