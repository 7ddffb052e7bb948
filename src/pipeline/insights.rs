// Trends between the last two elections of a results document.

use serde_json::json;
use serde_json::Map as JSMap;

use crate::pipeline::store::read_count;
use crate::pipeline::*;

pub const KEY_RACES: [&str; 3] = ["President", "Governor", "U.S. Senate"];

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn margin_of(record: Option<&JSValue>) -> f64 {
    match record {
        Some(r) => signed_two_party_margin(
            read_count(r.get("dem_votes")),
            read_count(r.get("rep_votes")),
        ),
        None => 0.0,
    }
}

fn race_of<'a>(
    by_year: &'a JSMap<String, JSValue>,
    year: &str,
    race: &str,
) -> Option<&'a JSMap<String, JSValue>> {
    by_year
        .get(year)
        .and_then(|c| c.get(race))
        .and_then(|c| c.as_object())
}

fn side(margin: f64) -> &'static str {
    if margin > 0.0 {
        "Dem"
    } else {
        "Rep"
    }
}

fn county_margin(found: Option<(&String, f64)>, field: &str) -> JSValue {
    match found {
        Some((county, m)) => json!({"county": county, field: round2(m)}),
        None => JSValue::Null,
    }
}

/// Compares the two most recent years of the document, for each of the key
/// races. Returns an empty object when fewer than two years are covered.
pub fn scan_trends(doc: &JSValue) -> JSValue {
    let empty = JSMap::new();
    let by_year = doc
        .get("results_by_year")
        .and_then(|r| r.as_object())
        .unwrap_or(&empty);
    let years: Vec<&String> = by_year.keys().filter(|y| *y != UNKNOWN_YEAR).collect();
    if years.len() < 2 {
        debug!("scan_trends: {} years, nothing to compare", years.len());
        return JSValue::Object(JSMap::new());
    }
    let last_year = years[years.len() - 1];
    let prev_year = years[years.len() - 2];

    let mut largest_margins = JSMap::new();
    let mut biggest_swings = JSMap::new();
    let mut statewide_margins = JSMap::new();
    let mut flips = JSMap::new();
    for race in KEY_RACES {
        let last = race_of(by_year, last_year, race).unwrap_or(&empty);
        let prev = race_of(by_year, prev_year, race).unwrap_or(&empty);

        let mut max_dem: Option<(&String, f64)> = None;
        let mut max_rep: Option<(&String, f64)> = None;
        let mut swing: Option<(&String, f64)> = None;
        let mut race_flips: Vec<JSValue> = Vec::new();
        for (county, record) in last.iter() {
            let m_last = margin_of(Some(record));
            let m_prev = margin_of(prev.get(county));
            if max_dem.map_or(true, |(_, m)| m_last > m) {
                max_dem = Some((county, m_last));
            }
            if max_rep.map_or(true, |(_, m)| m_last < m) {
                max_rep = Some((county, m_last));
            }
            let s = m_last - m_prev;
            if s.abs() > swing.map_or(0.0, |(_, x)| x.abs()) {
                swing = Some((county, s));
            }
            if m_last * m_prev < 0.0 {
                race_flips.push(json!({"county": county, "from": side(m_prev), "to": side(m_last)}));
            }
        }

        let margins: Vec<JSValue> = years
            .iter()
            .map(|year| {
                let rows = race_of(by_year, year, race).unwrap_or(&empty);
                let dem = saturating_sum(rows.values().map(|r| read_count(r.get("dem_votes"))));
                let rep = saturating_sum(rows.values().map(|r| read_count(r.get("rep_votes"))));
                json!({"year": year, "margin": round2(signed_two_party_margin(dem, rep))})
            })
            .collect();

        largest_margins.insert(
            race.to_string(),
            json!({
                "year": last_year,
                "max_dem": county_margin(max_dem, "margin"),
                "max_rep": county_margin(max_rep, "margin"),
            }),
        );
        biggest_swings.insert(
            race.to_string(),
            json!({"year": last_year, "biggest_swing": county_margin(swing, "swing")}),
        );
        statewide_margins.insert(race.to_string(), JSValue::Array(margins));
        flips.insert(
            race.to_string(),
            json!({"year": last_year, "flips": race_flips}),
        );
    }

    json!({
        "years": [prev_year, last_year],
        "largest_margins": largest_margins,
        "biggest_swings": biggest_swings,
        "statewide_margins": statewide_margins,
        "flips": flips,
    })
}
