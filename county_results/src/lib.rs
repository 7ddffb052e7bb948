mod classify;
mod config;
mod normalize;
mod registry;

use log::{debug, info, warn};

use std::collections::BTreeMap;

pub use crate::classify::*;
pub use crate::config::*;
pub use crate::normalize::*;
pub use crate::registry::*;

// **** Private structures ****

type GroupKey = (Year, Contest, LocalityId);

/// Sums of votes per name, in order of first appearance.
///
/// The order of first appearance is what breaks ties between equal sums.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
struct OrderedTally {
    entries: Vec<(String, u64)>,
}

impl OrderedTally {
    fn add(&mut self, name: &str, votes: u64) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, total)) => *total = total.saturating_add(votes),
            None => self.entries.push((name.to_string(), votes)),
        }
    }

    /// The entry with the largest sum. Among equal sums, the first one seen wins.
    fn leader(&self) -> Option<&(String, u64)> {
        let mut best: Option<&(String, u64)> = None;
        for e in self.entries.iter() {
            match best {
                Some(b) if b.1 >= e.1 => {}
                _ => best = Some(e),
            }
        }
        best
    }

    /// The two largest sums, in decreasing order. Missing entries count as 0.
    fn top_two(&self) -> (u64, u64) {
        let mut counts: Vec<u64> = self.entries.iter().map(|(_, c)| *c).collect();
        counts.sort_unstable_by(|a, b| b.cmp(a));
        (
            counts.first().cloned().unwrap_or(0),
            counts.get(1).cloned().unwrap_or(0),
        )
    }
}

/// Sums vote counts, stopping at `u64::MAX`.
pub fn saturating_sum(counts: impl IntoIterator<Item = u64>) -> u64 {
    counts.into_iter().fold(0u64, |acc, c| acc.saturating_add(c))
}

/// Rounds to two decimals, the same way the value is printed.
fn round2(x: f64) -> f64 {
    format!("{:.2}", x).parse::<f64>().unwrap_or(x)
}

fn pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}

/// Groups the records by year, contest and canonical locality and builds the
/// result of each group.
///
/// Records whose locality cannot be resolved, even after the historical alias
/// table, are left out of the results and reported in
/// [`Aggregation::unmatched`] under their year.
pub fn aggregate(
    records: &[RawRecord],
    registry: &LocalityRegistry,
    tables: &LookupTables,
) -> Aggregation {
    info!(
        "Aggregating {:?} records over {:?} localities",
        records.len(),
        registry.len()
    );
    let mut groups: BTreeMap<GroupKey, Vec<&RawRecord>> = BTreeMap::new();
    let mut res = Aggregation::default();

    for r in records.iter() {
        match registry.resolve_current(&r.locality_key, tables) {
            Some(id) => {
                groups
                    .entry((r.year.clone(), r.contest.clone(), id.clone()))
                    .or_default()
                    .push(r);
            }
            None => {
                debug!(
                    "aggregate: {}: no locality for {:?} (key {:?})",
                    r.source_file, r.locality_raw, r.locality_key
                );
                res.unmatched
                    .entry(r.year.clone())
                    .or_default()
                    .insert(r.locality_raw.clone());
            }
        }
    }

    for ((year, contest, id), rows) in groups.into_iter() {
        let Some(locality) = registry.get(&id) else {
            continue;
        };
        let cr = build_county_result(&year, &contest, locality, &rows);
        debug!(
            "aggregate: {} {} {}: {:?}",
            year, contest, locality.display_name, cr.competitiveness.code
        );
        res.results
            .entry(year)
            .or_default()
            .entry(contest)
            .or_default()
            .insert(id, cr);
    }

    for (year, names) in res.unmatched.iter() {
        warn!("{}: {} unmatched localities: {:?}", year, names.len(), names);
    }
    info!(
        "Aggregated {:?} county results",
        res.total_county_results()
    );
    res
}

/// Builds the result of one (year, contest, locality) group.
pub fn build_county_result(
    year: &str,
    contest: &str,
    locality: &CanonicalLocality,
    rows: &[&RawRecord],
) -> CountyResult {
    let mut dem = OrderedTally::default();
    let mut rep = OrderedTally::default();
    let mut candidates = OrderedTally::default();
    let mut parties = OrderedTally::default();
    for r in rows.iter() {
        match r.party_code.as_str() {
            "DEM" => dem.add(&r.candidate, r.votes),
            "REP" => rep.add(&r.candidate, r.votes),
            _ => {}
        }
        candidates.add(&r.candidate, r.votes);
        parties.add(&r.party_code, r.votes);
    }

    let dem_votes = saturating_sum(dem.entries.iter().map(|(_, c)| *c));
    let rep_votes = saturating_sum(rep.entries.iter().map(|(_, c)| *c));
    let total_votes = saturating_sum(rows.iter().map(|r| r.votes));
    let two_party_total = dem_votes.saturating_add(rep_votes);

    let (margin, margin_pct) = if total_votes > 0 {
        let margin = dem_votes.abs_diff(rep_votes);
        (
            margin,
            format!("{:.2}", margin as f64 / total_votes as f64 * 100.0),
        )
    } else if !rows.is_empty() {
        // No votes at all: fall back on the gap between the two leading
        // candidates of any party. This is not the margin that is rated.
        let (first, second) = candidates.top_two();
        (first.abs_diff(second), "0.00".to_string())
    } else {
        (0, "0.00".to_string())
    };

    let winner = if dem_votes > rep_votes {
        "DEM".to_string()
    } else if rep_votes > dem_votes {
        "REP".to_string()
    } else {
        parties
            .leader()
            .map(|(code, _)| code.clone())
            .unwrap_or_else(|| "TIE".to_string())
    };

    let competitiveness = classify(signed_two_party_margin(dem_votes, rep_votes));

    CountyResult {
        county: locality.display_name.clone(),
        county_fips: locality.id.clone(),
        contest: contest.to_string(),
        year: year.to_string(),
        office_type: office_type(contest),
        office_rank: office_rank(contest),
        dem_candidate: dem.leader().map(|(n, _)| n.clone()).unwrap_or_default(),
        rep_candidate: rep.leader().map(|(n, _)| n.clone()).unwrap_or_default(),
        dem_votes,
        rep_votes,
        dem_pct: pct(dem_votes, total_votes),
        rep_pct: pct(rep_votes, total_votes),
        other_votes: total_votes.saturating_sub(two_party_total),
        total_votes,
        two_party_total,
        margin,
        margin_pct,
        winner,
        competitiveness,
        all_parties: parties.entries.into_iter().collect(),
    }
}
