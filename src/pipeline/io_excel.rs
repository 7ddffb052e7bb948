// Reading the extracts distributed as Excel workbooks. Only the first worksheet is used.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use std::path::Path;

use crate::pipeline::{io_common::required_column_indexes, *};

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::Empty => "".to_string(),
        _ => {
            debug!("cell_text: could not understand cell {:?}", cell);
            "".to_string()
        }
    }
}

pub fn read_excel_rows(path: &Path) -> PipelineResult<Option<Vec<ParsedRow>>> {
    let path_s = path.display().to_string();
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu {
        path: path_s.clone(),
    })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu {
            path: path_s.clone(),
        })?
        .context(OpeningExcelSnafu {
            path: path_s.clone(),
        })?;

    let mut iter = wrange.rows();
    let header: Vec<String> = match iter.next() {
        Some(h) => h.iter().map(cell_text).collect(),
        None => {
            warn!("{}: empty worksheet, skipping the file", path_s);
            return Ok(None);
        }
    };
    debug!("read_excel_rows: {}: header: {:?}", path_s, header);
    let [county, office, party, candidate, votes] =
        match required_column_indexes(header.iter().map(|s| s.as_str())) {
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
    for (idx, row) in iter.enumerate() {
        let field = |i: usize| row.get(i).map(cell_text).unwrap_or_default();
        res.push(ParsedRow {
            lineno: idx + 2,
            county: field(county),
            office: field(office),
            party: field(party),
            candidate: field(candidate),
            votes: field(votes),
        });
    }
    Ok(Some(res))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_values_as_text() {
        assert_eq!(cell_text(&DataType::Float(1234.0)), "1234");
        assert_eq!(cell_text(&DataType::Float(12.5)), "12.5");
        assert_eq!(cell_text(&DataType::Int(77)), "77");
        assert_eq!(cell_text(&DataType::String("Hanover".to_string())), "Hanover");
        assert_eq!(cell_text(&DataType::Empty), "");
    }

    #[test]
    fn unreadable_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20201103__va.xlsx");
        fs::write(&path, "not a zip archive").unwrap();
        assert!(matches!(
            read_excel_rows(&path),
            Err(PipelineError::OpeningExcel { .. })
        ));
    }
}
