use log::{debug, info, warn};

use county_results::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
#[cfg(test)]
mod fixtures;
pub mod insights;
mod io_boundary;
mod io_common;
mod io_csv;
mod io_excel;
pub mod store;
pub mod validate;

use crate::pipeline::config_reader::RunSettings;

#[derive(Debug, Snafu)]
pub enum PipelineError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error listing the extracts in {path}"))]
    ReadingDirectory {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening the CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading the header of {path}"))]
    CsvHeader { source: csv::Error, path: String },
    #[snafu(display("Error opening the Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The boundary source {path} does not exist"))]
    MissingBoundary { path: String },
    #[snafu(display("Feature {index} of {path} has no usable {property:?} property"))]
    BoundaryProperty {
        path: String,
        index: usize,
        property: String,
    },
    #[snafu(display("Cannot build the localities from {path}"))]
    InvalidBoundary {
        source: RegistryError,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The document {path} has no {key:?} entry"))]
    MissingKey { key: String, path: String },
    #[snafu(display("Invalid processed date {value:?}, expected YYYY-MM-DD"))]
    InvalidDate {
        source: chrono::ParseError,
        value: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// The columns every extract must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = ["county", "office", "party", "candidate", "votes"];

/// A vote line, as read from an extract.
/// This is before applying the row rules (contest filter, statewide rows, etc.)
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedRow {
    pub lineno: usize,
    pub county: String,
    pub office: String,
    pub party: String,
    pub candidate: String,
    pub votes: String,
}

/// The content of all the extracts of a directory.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LoadedExtracts {
    pub records: Vec<RawRecord>,
    /// The files that contributed at least one record, in processing order.
    pub source_files: Vec<String>,
}

fn read_extract(path: &Path) -> PipelineResult<Option<Vec<ParsedRow>>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("csv") => io_csv::read_csv_rows(path),
        Some("xlsx") => io_excel::read_excel_rows(path),
        _ => Ok(None),
    }
}

/// Applies the row rules to the lines of one extract.
fn validate_rows(
    rows: &[ParsedRow],
    year: &str,
    source_file: &str,
    tables: &LookupTables,
) -> Vec<RawRecord> {
    let mut res: Vec<RawRecord> = Vec::new();
    for row in rows.iter() {
        let county = row.county.trim();
        if county.is_empty() {
            continue;
        }
        let key = locality_key(county);
        // Statewide totals would be counted twice.
        if tables.is_statewide(&key) {
            debug!("{}:{}: skipping total row {:?}", source_file, row.lineno, county);
            continue;
        }
        let contest = match canonical_contest(&row.office) {
            Some(c) => c,
            None => continue,
        };
        res.push(RawRecord {
            year: year.to_string(),
            contest: contest.to_string(),
            locality_raw: county.to_string(),
            locality_key: key,
            candidate: tables.canonical_candidate(&row.candidate),
            party_code: party_code(&row.party),
            votes: parse_votes(&row.votes),
            source_file: source_file.to_string(),
        });
    }
    res
}

/// Reads all the extracts of a directory, in file name order.
///
/// Files that lack one of the required columns are skipped. Files that do not
/// start with a date are kept, under the `unknown` year.
pub fn read_extracts(dir: &Path, tables: &LookupTables) -> PipelineResult<LoadedExtracts> {
    let dir_s = dir.display().to_string();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .context(ReadingDirectorySnafu {
            path: dir_s.clone(),
        })?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut res = LoadedExtracts::default();
    for p in paths.iter() {
        let file_name = io_common::simplify_file_name(p);
        let rows = match read_extract(p)? {
            Some(rows) => rows,
            None => {
                debug!("read_extracts: skipping {:?}", file_name);
                continue;
            }
        };
        let year = io_common::year_from_filename(&file_name);
        if year == UNKNOWN_YEAR {
            warn!("{}: no leading date in the file name, year is unknown", file_name);
        }
        let mut records = validate_rows(&rows, &year, &file_name, tables);
        info!(
            "{}: {} lines, {} records for {}",
            file_name,
            rows.len(),
            records.len(),
            year
        );
        if !records.is_empty() {
            res.source_files.push(file_name);
            res.records.append(&mut records);
        }
    }
    info!(
        "Read {} records from {} files in {}",
        res.records.len(),
        res.source_files.len(),
        dir_s
    );
    Ok(res)
}

/// Builds the results document from the inputs described by the settings.
pub fn build_document(settings: &RunSettings) -> PipelineResult<JSValue> {
    let tables = settings.lookup_tables();
    let registry = io_boundary::read_registry(
        &settings.boundary_file,
        &settings.id_property,
        &settings.name_property,
    )?;
    let extracts = read_extracts(&settings.input_dir, &tables)?;
    let aggregation = aggregate(&extracts.records, &registry, &tables);
    Ok(store::assemble(&aggregation, &extracts.source_files, settings))
}

pub fn run_pipeline(settings: &RunSettings) -> PipelineResult<()> {
    info!("settings: {:?}", settings);
    let doc = build_document(settings)?;
    let pretty = store::to_pretty_json(&doc)?;

    // The reference document, if provided for comparison
    if let Some(reference_p) = &settings.reference {
        let reference = store::read_document(Path::new(reference_p))?;
        let pretty_reference = store::to_pretty_json(&reference)?;
        if pretty_reference != pretty {
            warn!("Found differences with the reference document");
            print_diff(pretty_reference.as_str(), pretty.as_str(), "\n");
            whatever!("Difference detected between the built document and the reference document")
        }
        info!("The built document matches {}", reference_p);
    }

    match settings.out.as_deref() {
        None => {}
        Some("stdout") => print!("{}", pretty),
        Some(path) => {
            io_common::write_atomic(Path::new(path), pretty.as_bytes())
                .context(WritingOutputSnafu { path })?;
            info!("Wrote {}", path);
        }
    }

    if settings.insights {
        let found = insights::scan_trends(&doc);
        println!("{}", store::to_pretty_json(&found)?);
    }

    if let Some(summary) = doc.get("summary") {
        info!("summary: {}", summary);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(county: &str, office: &str, party: &str, candidate: &str, votes: &str) -> ParsedRow {
        ParsedRow {
            lineno: 1,
            county: county.to_string(),
            office: office.to_string(),
            party: party.to_string(),
            candidate: candidate.to_string(),
            votes: votes.to_string(),
        }
    }

    #[test]
    fn row_rules() {
        let tables = LookupTables::default();
        let rows = vec![
            row("", "President", "Democratic", "A", "1"),
            row("Total", "President", "Democratic", "A", "1"),
            row("Virginia", "President", "Democratic", "A", "1"),
            row("Richmond City", "House of Delegates", "Democratic", "A", "1"),
            row("Richmond City", "US Senate", "Democratic", "M. R. Warner", "1,234.0"),
            row("Henrico County (CD 04)", "Governor", "", "X", ""),
        ];
        let records = validate_rows(&rows, "2008", "20081104__va__general.csv", &tables);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].contest, "U.S. Senate");
        assert_eq!(records[0].candidate, "Mark R. Warner");
        assert_eq!(records[0].party_code, "DEM");
        assert_eq!(records[0].votes, 1234);
        assert_eq!(records[0].locality_key, "RICHMOND CITY");
        assert_eq!(records[1].locality_key, "HENRICO COUNTY");
        assert_eq!(records[1].locality_raw, "Henrico County (CD 04)");
        assert_eq!(records[1].party_code, "OTH");
        assert_eq!(records[1].votes, 0);
    }

    #[test]
    fn reads_a_directory_of_extracts() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("20201103__va__general__county.csv"),
            "county,office,district,party,candidate,votes\n\
             Richmond City,President,,Democratic,Joe,\"12,345\"\n\
             Richmond City,President,,Republican,Don,100\n\
             Totals,President,,Democratic,Joe,999999\n",
        )
        .unwrap();
        // Missing the votes column: skipped as a whole.
        fs::write(
            dir.path().join("20161108__va__general__county.csv"),
            "county,office,party,candidate\nRichmond City,President,Democratic,Hillary\n",
        )
        .unwrap();
        // Only disallowed contests: read but not listed.
        fs::write(
            dir.path().join("20191105__va__general__county.csv"),
            "county,office,party,candidate,votes\nRichmond City,State Senate,Democratic,Jen,10\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("governor_extra.csv"),
            "county,office,party,candidate,votes\nRichmond City,Governor,Democratic,Terry,10\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "nothing to see").unwrap();

        let res = read_extracts(dir.path(), &LookupTables::default()).unwrap();
        assert_eq!(
            res.source_files,
            vec![
                "20201103__va__general__county.csv".to_string(),
                "governor_extra.csv".to_string()
            ]
        );
        assert_eq!(res.records.len(), 3);
        assert_eq!(res.records[0].year, "2020");
        assert_eq!(res.records[0].votes, 12345);
        assert_eq!(res.records[2].year, UNKNOWN_YEAR);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let res = read_extracts(&dir.path().join("nope"), &LookupTables::default());
        assert!(matches!(res, Err(PipelineError::ReadingDirectory { .. })));
    }
}
