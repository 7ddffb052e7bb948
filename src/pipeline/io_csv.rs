// Primitives for reading CSV extracts.

use std::path::Path;

use crate::pipeline::{io_common::required_column_indexes, *};

/// Reads the vote lines of a CSV extract.
///
/// Returns None when the header lacks one of the required columns.
pub fn read_csv_rows(path: &Path) -> PipelineResult<Option<Vec<ParsedRow>>> {
    let path_s = path.display().to_string();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path_s.clone(),
        })?;
    let header = rdr
        .headers()
        .context(CsvHeaderSnafu {
            path: path_s.clone(),
        })?
        .clone();
    debug!("read_csv_rows: {}: header: {:?}", path_s, header);
    let [county, office, party, candidate, votes] = match required_column_indexes(header.iter())
    {
        Some(idxs) => idxs,
        None => {
            warn!(
                "{}: missing one of the columns {:?}, skipping the file",
                path_s, REQUIRED_COLUMNS
            );
            return Ok(None);
        }
    };

    let mut res: Vec<ParsedRow> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = match line_r {
            Ok(line) => line,
            Err(e) => {
                warn!("{}:{}: unreadable line, skipping it: {}", path_s, lineno, e);
                continue;
            }
        };
        let field = |i: usize| line.get(i).unwrap_or("").to_string();
        res.push(ParsedRow {
            lineno,
            county: field(county),
            office: field(office),
            party: field(party),
            candidate: field(candidate),
            votes: field(votes),
        });
    }
    Ok(Some(res))
}
