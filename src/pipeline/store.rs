// Assembly of the results document.

use serde_json::json;
use serde_json::Map as JSMap;

use crate::pipeline::config_reader::RunSettings;
use crate::pipeline::*;

pub const ENHANCED_FEATURES: [&str; 4] = [
    "Competitiveness categorization for each county",
    "Contest type classification (Federal/State/Judicial)",
    "Office ranking system for analysis prioritization",
    "Color coding compatible with political geography visualization",
];

pub fn competitiveness_to_json(c: &Competitiveness) -> JSValue {
    json!({
        "category": c.category.name(),
        "party": c.party.name(),
        "code": c.code,
        "color": c.color,
    })
}

/// The rating scale, grouped by party side.
pub fn scale_to_json() -> JSValue {
    let mut by_side: JSMap<String, JSValue> = JSMap::new();
    for entry in competitiveness_scale() {
        let line = json!({
            "category": entry.category.name(),
            "range": entry.range,
            "color": entry.color,
        });
        if let Some(lines) = by_side
            .entry(entry.party.name())
            .or_insert_with(|| JSValue::Array(Vec::new()))
            .as_array_mut()
        {
            lines.push(line);
        }
    }
    JSValue::Object(by_side)
}

pub fn county_result_to_json(cr: &CountyResult) -> JSValue {
    json!({
        "county": cr.county,
        "county_fips": cr.county_fips,
        "contest": cr.contest,
        "year": cr.year,
        "office_type": cr.office_type.name(),
        "office_rank": cr.office_rank,
        "dem_candidate": cr.dem_candidate,
        "rep_candidate": cr.rep_candidate,
        "dem_votes": cr.dem_votes,
        "rep_votes": cr.rep_votes,
        "dem_pct": cr.dem_pct,
        "rep_pct": cr.rep_pct,
        "other_votes": cr.other_votes,
        "total_votes": cr.total_votes,
        "two_party_total": cr.two_party_total,
        "margin": cr.margin,
        "margin_pct": cr.margin_pct,
        "winner": cr.winner,
        "competitiveness": competitiveness_to_json(&cr.competitiveness),
        "all_parties": cr.all_parties,
    })
}

/// Re-keys the results by locality display name.
fn results_to_json(results: &ResultsByYear) -> JSValue {
    let mut years: JSMap<String, JSValue> = JSMap::new();
    for (year, contests) in results.iter() {
        let mut contests_js: JSMap<String, JSValue> = JSMap::new();
        for (contest, counties) in contests.iter() {
            let counties_js: JSMap<String, JSValue> = counties
                .values()
                .map(|cr| (cr.county.clone(), county_result_to_json(cr)))
                .collect();
            contests_js.insert(contest.clone(), JSValue::Object(counties_js));
        }
        years.insert(year.clone(), JSValue::Object(contests_js));
    }
    JSValue::Object(years)
}

/// Builds the whole results document.
pub fn assemble(
    aggregation: &Aggregation,
    source_files: &[String],
    settings: &RunSettings,
) -> JSValue {
    let years_covered = aggregation.years_covered();
    let contests = aggregation.contests();
    let unmatched: JSMap<String, JSValue> = aggregation
        .unmatched
        .iter()
        .map(|(year, names)| (year.clone(), json!(names)))
        .collect();
    let office_types: Vec<&str> = OfficeType::ALL.iter().map(|o| o.name()).collect();

    let mut doc = json!({
        "focus": settings.focus,
        "processed_date": settings.processed_date.format("%Y-%m-%d").to_string(),
        "categorization_system": {
            "competitiveness_scale": scale_to_json(),
            "office_types": office_types,
            "enhanced_features": ENHANCED_FEATURES,
        },
        "summary": {
            "total_years": years_covered.len(),
            "total_contests": contests.len(),
            "total_county_results": aggregation.total_county_results(),
            "years_covered": years_covered,
        },
        "unmatched_counties": unmatched,
        "results_by_year": results_to_json(&aggregation.results),
    });
    doc[format!("source_{}_files", settings.source_label)] = json!(source_files);
    doc
}

/// Pretty prints a document, with a final newline.
pub fn to_pretty_json(doc: &JSValue) -> PipelineResult<String> {
    let mut s = serde_json::to_string_pretty(doc).context(ParsingJsonSnafu {})?;
    s.push('\n');
    Ok(s)
}

pub fn read_document(path: &Path) -> PipelineResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.display().to_string(),
    })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu {})
}

/// Reads a persisted vote count. Missing or unreadable counts are 0.
pub fn read_count(v: Option<&JSValue>) -> u64 {
    match v {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|x| *x > 0.0).map(|x| x.trunc() as u64))
            .unwrap_or(0),
        Some(JSValue::String(s)) => parse_votes(s),
        _ => 0,
    }
}
