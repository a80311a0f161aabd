use super::tabular::ColumnMap;
use crate::error::{FormatError, FormatErrorKind};
use crate::task::{Cell, RawRecords};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RawRecords, FormatError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| FormatError::new(path, err))?;
    read_csv(file).map_err(|kind| FormatError::new(path, kind))
}

/// Reads CSV from any source. The header row is required and is checked
/// against the known schemas before the first data row is parsed.
pub fn read_csv<R: Read>(reader: R) -> Result<RawRecords, FormatErrorKind> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let columns = ColumnMap::resolve(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::text).collect::<Vec<_>>());
    }
    Ok(columns.collect(rows))
}
