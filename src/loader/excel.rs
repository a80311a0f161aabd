use super::SheetSelector;
use super::tabular::ColumnMap;
use crate::error::{FormatError, FormatErrorKind};
use crate::task::{Cell, RawRecords};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

pub fn load_excel<P: AsRef<Path>>(path: P, sheet: &SheetSelector) -> Result<RawRecords, FormatError> {
    let path = path.as_ref();
    let fail = |kind: FormatErrorKind| FormatError::new(path, kind);

    let mut workbook = open_workbook_auto(path).map_err(|err| fail(err.into()))?;
    let sheet_names = workbook.sheet_names();
    debug!(sheets = ?sheet_names, %sheet, "opened workbook");

    let name = resolve_sheet(&sheet_names, sheet)
        .ok_or_else(|| fail(FormatErrorKind::SheetNotFound(sheet.to_string())))?;
    let range = workbook
        .worksheet_range(&name)
        .map_err(|err| fail(err.into()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|c| cell_from_data(c).as_text()).collect())
        .unwrap_or_default();
    let columns = ColumnMap::resolve(&headers).map_err(fail)?;

    let body = rows.map(|row| row.iter().map(cell_from_data).collect::<Vec<_>>());
    Ok(columns.collect(body))
}

/// An index past the last sheet falls back to a sheet named by those digits,
/// so `-s 2024` still finds a sheet called "2024".
fn resolve_sheet(sheet_names: &[String], sheet: &SheetSelector) -> Option<String> {
    match sheet {
        SheetSelector::Index(idx) => sheet_names.get(*idx).cloned().or_else(|| {
            let digits = idx.to_string();
            sheet_names.iter().find(|name| **name == digits).cloned()
        }),
        SheetSelector::Name(name) => sheet_names.iter().find(|n| *n == name).cloned(),
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(v) => Cell::Integer(*v),
        Data::Float(v) => Cell::Float(*v),
        Data::String(s) => Cell::text(s.clone()),
        Data::Empty => Cell::Empty,
        other => Cell::text(other.to_string()),
    }
}
