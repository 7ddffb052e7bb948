// Integrity check of a results document.
//
// Every county result carries its own vote counts, so its competitiveness
// rating can be derived again with the classifier and compared with the one
// that was persisted. Mismatches can be reported, or fixed in place.

use serde_json::Map as JSMap;

use crate::args::ValidateArgs;

use crate::pipeline::store::{competitiveness_to_json, read_count, scale_to_json};
use crate::pipeline::*;

const RATING_FIELDS: [&str; 4] = ["category", "party", "code", "color"];

/// One field of a rating that differs from the expected value.
#[derive(PartialEq, Debug, Clone)]
pub struct FieldDiff {
    pub field: &'static str,
    /// None when the field, or the whole rating, is missing.
    pub actual: Option<JSValue>,
    pub expected: JSValue,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Mismatch {
    pub year: String,
    pub contest: String,
    pub county: String,
    pub diffs: Vec<FieldDiff>,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct ValidationReport {
    pub checked: usize,
    pub mismatches: Vec<Mismatch>,
    /// The embedded rating scale differs from the current palette.
    pub scale_drift: bool,
    /// The mismatches were corrected and the document rewritten.
    pub fixed: bool,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty() && !self.scale_drift
    }

    /// 0 when the document is clean or was fixed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() || self.fixed {
            0
        } else {
            1
        }
    }

    /// The lines of the report, with at most `max_print` mismatches detailed.
    pub fn lines(&self, path: &str, max_print: usize) -> Vec<String> {
        let mut res = vec![format!("Checked {} county results in {}", self.checked, path)];
        if self.is_clean() {
            res.push(
                "OK: all competitiveness ratings have the expected category/code/color."
                    .to_string(),
            );
            return res;
        }
        let mode = if self.fixed { "FIXED" } else { "FOUND" };
        if self.scale_drift {
            res.push(format!(
                "{}: the competitiveness scale differs from the current palette.",
                mode
            ));
        }
        if self.mismatches.is_empty() {
            return res;
        }
        res.push(format!("{}: {} mismatches.", mode, self.mismatches.len()));
        for m in self.mismatches.iter().take(max_print) {
            res.push(format!("- {}", m));
        }
        if self.mismatches.len() > max_print {
            res.push(format!("... and {} more", self.mismatches.len() - max_print));
        }
        res
    }

    pub fn print(&self, path: &str, max_print: usize) {
        for line in self.lines(path, max_print) {
            println!("{}", line);
        }
    }
}

fn show(v: &Option<JSValue>) -> String {
    match v {
        Some(x) => x.to_string(),
        None => "None".to_string(),
    }
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let details: Vec<String> = self
            .diffs
            .iter()
            .map(|d| format!("{}: {} -> {}", d.field, show(&d.actual), d.expected))
            .collect();
        write!(
            f,
            "{} | {} | {}: {}",
            self.year,
            self.contest,
            self.county,
            details.join("; ")
        )
    }
}

/// The rating a county result should carry, given its own vote counts.
pub fn expected_competitiveness(record: &JSValue) -> Competitiveness {
    classify_votes(
        read_count(record.get("dem_votes")),
        read_count(record.get("rep_votes")),
    )
}

fn rating_diffs(actual: Option<&JSValue>, expected: &JSValue) -> Vec<FieldDiff> {
    RATING_FIELDS
        .iter()
        .filter_map(|&field| {
            let a = actual.and_then(|x| x.get(field)).cloned();
            let e = expected[field].clone();
            if a.as_ref() == Some(&e) {
                None
            } else {
                Some(FieldDiff {
                    field,
                    actual: a,
                    expected: e,
                })
            }
        })
        .collect()
}

fn check_vote_sum(year: &str, contest: &str, county: &str, record: &JSValue) {
    let dem = read_count(record.get("dem_votes"));
    let rep = read_count(record.get("rep_votes"));
    let other = read_count(record.get("other_votes"));
    let total = read_count(record.get("total_votes"));
    if saturating_sum([dem, rep, other]) != total {
        warn!(
            "{} | {} | {}: dem {} + rep {} + other {} != total {}",
            year, contest, county, dem, rep, other, total
        );
    }
}

/// Checks every rating of a document. With `fix`, the mismatched ratings and
/// the scale are replaced in the document.
pub fn check_document(doc: &mut JSValue, path: &str, fix: bool) -> PipelineResult<ValidationReport> {
    let mut report = ValidationReport::default();

    let expected_scale = scale_to_json();
    let scale = doc
        .get("categorization_system")
        .and_then(|c| c.get("competitiveness_scale"));
    if scale != Some(&expected_scale) {
        warn!("{}: the competitiveness scale differs from the current palette", path);
        report.scale_drift = true;
        if fix {
            if let Some(o) = doc.as_object_mut() {
                let system = o
                    .entry("categorization_system")
                    .or_insert_with(|| JSValue::Object(JSMap::new()));
                if !system.is_object() {
                    warn!("{}: categorization_system is not an object, replacing it", path);
                    *system = JSValue::Object(JSMap::new());
                }
                if let Some(system) = system.as_object_mut() {
                    system.insert("competitiveness_scale".to_string(), expected_scale);
                }
            }
        }
    }

    let results = doc
        .get_mut("results_by_year")
        .and_then(|r| r.as_object_mut())
        .context(MissingKeySnafu {
            key: "results_by_year",
            path,
        })?;

    for (year, contests) in results.iter_mut() {
        let contests = match contests.as_object_mut() {
            Some(c) => c,
            None => {
                warn!("{}: results of {} are not an object, skipping them", path, year);
                continue;
            }
        };
        for (contest, counties) in contests.iter_mut() {
            let counties = match counties.as_object_mut() {
                Some(c) => c,
                None => {
                    warn!("{}: {} | {} is not an object, skipping it", path, year, contest);
                    continue;
                }
            };
            for (county, record) in counties.iter_mut() {
                let record = match record.as_object_mut() {
                    Some(r) => r,
                    None => {
                        warn!("{}: {} | {} | {} is not an object, skipping it", path, year, contest, county);
                        continue;
                    }
                };
                report.checked += 1;
                let record_js = JSValue::Object(record.clone());
                check_vote_sum(year, contest, county, &record_js);
                let expected = competitiveness_to_json(&expected_competitiveness(&record_js));
                let diffs = rating_diffs(record.get("competitiveness"), &expected);
                if diffs.is_empty() {
                    continue;
                }
                debug!("{} | {} | {}: {:?}", year, contest, county, diffs);
                if fix {
                    record.insert("competitiveness".to_string(), expected);
                }
                report.mismatches.push(Mismatch {
                    year: year.clone(),
                    contest: contest.clone(),
                    county: county.clone(),
                    diffs,
                });
            }
        }
    }
    Ok(report)
}

/// Checks a document file. With `fix`, a document with mismatches is rewritten as a whole.
pub fn validate_file(path: &Path, fix: bool) -> PipelineResult<ValidationReport> {
    let path_s = path.display().to_string();
    let mut doc = store::read_document(path)?;
    let mut report = check_document(&mut doc, &path_s, fix)?;
    if fix && !report.is_clean() {
        let pretty = store::to_pretty_json(&doc)?;
        io_common::write_atomic(path, pretty.as_bytes())
            .context(WritingOutputSnafu { path: path_s.clone() })?;
        info!("Rewrote {}", path_s);
        report.fixed = true;
    }
    info!(
        "Checked {} county results, {} mismatches",
        report.checked,
        report.mismatches.len()
    );
    Ok(report)
}

/// Runs the validator as invoked from the command line, and returns the exit code:
/// 0 clean or fixed, 1 mismatches, 2 missing file, 3 unreadable document.
pub fn run_validate(args: &ValidateArgs) -> i32 {
    let path = Path::new(&args.file);
    if !path.exists() {
        println!("File not found: {}", args.file);
        return 2;
    }
    match validate_file(path, args.fix) {
        Ok(report) => {
            report.print(&args.file, args.max_print);
            report.exit_code()
        }
        Err(e) => {
            eprintln!("Could not check {}: {}", args.file, e);
            3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::{settings, write_inputs};
    use serde_json::json;
    use tempfile::tempdir;

    fn fresh_document(root: &Path) -> PathBuf {
        write_inputs(root);
        let s = settings(root);
        run_pipeline(&s).unwrap();
        PathBuf::from(s.out.unwrap())
    }

    #[test]
    fn fresh_document_has_no_mismatch() {
        let dir = tempdir().unwrap();
        let path = fresh_document(dir.path());
        let report = validate_file(&path, false).unwrap();
        assert_eq!(report.checked, 6);
        assert!(report.is_clean());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn reports_drifted_ratings() {
        let dir = tempdir().unwrap();
        let path = fresh_document(dir.path());
        let before = fs::read_to_string(&path).unwrap();
        let mut doc: JSValue = serde_json::from_str(&before).unwrap();
        doc["results_by_year"]["2020"]["President"]["Hanover County"]["competitiveness"]["category"] =
            json!("Safe");
        doc["results_by_year"]["2020"]["President"]["Richmond city"]
            .as_object_mut()
            .unwrap()
            .remove("competitiveness");
        let corrupted = store::to_pretty_json(&doc).unwrap();
        fs::write(&path, &corrupted).unwrap();

        let report = validate_file(&path, false).unwrap();
        assert_eq!(report.mismatches.len(), 2);
        assert_eq!(report.exit_code(), 1);
        assert!(!report.fixed);
        // Report mode leaves the file alone.
        assert_eq!(fs::read_to_string(&path).unwrap(), corrupted);

        let hanover = report
            .mismatches
            .iter()
            .find(|m| m.county == "Hanover County")
            .unwrap();
        assert_eq!(
            hanover.diffs,
            vec![FieldDiff {
                field: "category",
                actual: Some(json!("Safe")),
                expected: json!("Stronghold"),
            }]
        );
        assert_eq!(
            hanover.to_string(),
            "2020 | President | Hanover County: category: \"Safe\" -> \"Stronghold\""
        );
        let richmond = report
            .mismatches
            .iter()
            .find(|m| m.county == "Richmond city")
            .unwrap();
        assert_eq!(richmond.diffs.len(), 4);
        assert!(richmond.diffs.iter().all(|d| d.actual.is_none()));
    }

    #[test]
    fn fix_restores_the_fresh_document() {
        let dir = tempdir().unwrap();
        let path = fresh_document(dir.path());
        let fresh = fs::read_to_string(&path).unwrap();
        let mut doc: JSValue = serde_json::from_str(&fresh).unwrap();
        doc["results_by_year"]["1996"]["President"]["Bedford County"]["competitiveness"] =
            json!({"category": "Lean"});
        doc["categorization_system"]["competitiveness_scale"]["Tossup"][0]["color"] =
            json!("#ffffff");
        fs::write(&path, store::to_pretty_json(&doc).unwrap()).unwrap();

        let report = validate_file(&path, true).unwrap();
        assert!(report.fixed);
        assert!(report.scale_drift);
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), fresh);

        let again = validate_file(&path, false).unwrap();
        assert!(again.is_clean());
    }

    #[test]
    fn missing_results_are_fatal() {
        let mut doc = json!({"focus": "x"});
        let res = check_document(&mut doc, "doc.json", false);
        assert!(matches!(res, Err(PipelineError::MissingKey { .. })));
    }

    #[test]
    fn counts_are_read_leniently() {
        let record = json!({"dem_votes": "1,020", "rep_votes": 980.0});
        assert_eq!(expected_competitiveness(&record).code, "D_LEAN");
        let record = json!({"dem_votes": null});
        assert_eq!(expected_competitiveness(&record).code, "TOSSUP");
        assert_eq!(read_count(Some(&json!(-4))), 0);
    }

    #[test]
    fn oversized_counts_do_not_overflow() {
        let mut doc = json!({"results_by_year": {"2020": {"President": {"Hanover County": {
            "dem_votes": u64::MAX,
            "rep_votes": 1,
            "other_votes": u64::MAX,
            "total_votes": 3
        }}}}});
        let report = check_document(&mut doc, "doc.json", false).unwrap();
        assert_eq!(report.checked, 1);
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].diffs[2].expected, json!("D_ANNIHILATION"));
    }

    #[test]
    fn scale_replaces_a_malformed_system_block() {
        let mut doc = json!({"categorization_system": "legacy", "results_by_year": {}});
        let report = check_document(&mut doc, "doc.json", true).unwrap();
        assert!(report.scale_drift);
        assert_eq!(
            doc["categorization_system"]["competitiveness_scale"],
            scale_to_json()
        );
    }

    fn validate_args(file: &Path, max_print: usize) -> ValidateArgs {
        ValidateArgs {
            fix: false,
            file: file.display().to_string(),
            max_print,
            verbose: false,
        }
    }

    #[test]
    fn exit_codes_of_unusable_files() {
        let dir = tempdir().unwrap();
        assert_eq!(run_validate(&validate_args(&dir.path().join("none.json"), 25)), 2);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{\"results_by_year\": ").unwrap();
        assert_eq!(run_validate(&validate_args(&broken, 25)), 3);

        let no_results = dir.path().join("no_results.json");
        fs::write(&no_results, "{\"focus\": \"x\"}").unwrap();
        assert_eq!(run_validate(&validate_args(&no_results, 25)), 3);
    }

    #[test]
    fn printed_mismatches_are_capped() {
        let dir = tempdir().unwrap();
        let path = fresh_document(dir.path());
        assert_eq!(run_validate(&validate_args(&path, 25)), 0);

        let mut doc = store::read_document(&path).unwrap();
        for county in ["Bedford County", "Hanover County", "Richmond city"] {
            doc["results_by_year"]["2020"]["President"][county]["competitiveness"]["color"] =
                json!("#000000");
        }
        fs::write(&path, store::to_pretty_json(&doc).unwrap()).unwrap();

        let report = validate_file(&path, false).unwrap();
        let path_s = path.display().to_string();
        let lines = report.lines(&path_s, 1);
        assert_eq!(
            lines,
            vec![
                format!("Checked 6 county results in {}", path_s),
                "FOUND: 3 mismatches.".to_string(),
                format!(
                    "- {}",
                    "2020 | President | Bedford County: color: \"#000000\" -> \"#67000d\""
                ),
                "... and 2 more".to_string(),
            ]
        );
        assert_eq!(report.lines(&path_s, 25).len(), 5);
        assert_eq!(run_validate(&validate_args(&path, 1)), 1);
    }
}
