use crate::error::{Field, RecordKind, Result, ValidationError};
use crate::task::{Cell, RawMilestone, RawRecords, RawTask, split_label};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

pub mod delimited;
#[cfg(feature = "excel")]
pub mod excel;
pub(crate) mod tabular;
#[cfg(feature = "yaml")]
pub mod yaml;

pub use delimited::{load_csv, read_csv};

/// Excel worksheet selection: zero-based position or sheet name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl FromStr for SheetSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<usize>() {
            Ok(idx) => SheetSelector::Index(idx),
            Err(_) => SheetSelector::Name(s.to_string()),
        })
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(idx) => write!(f, "#{idx}"),
            SheetSelector::Name(name) => write!(f, "'{name}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Excel(SheetSelector),
    Yaml,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Csv => write!(f, "CSV"),
            InputFormat::Excel(sheet) => write!(f, "Excel (sheet {sheet})"),
            InputFormat::Yaml => write!(f, "YAML"),
        }
    }
}

/// Reads `path` in the declared format into untyped records.
pub fn load_records<P: AsRef<Path>>(path: P, format: &InputFormat) -> Result<RawRecords> {
    let path = path.as_ref();
    info!(path = %path.display(), %format, "loading schedule records");
    let records = match format {
        InputFormat::Csv => load_csv(path)?,
        InputFormat::Excel(sheet) => load_excel(path, sheet)?,
        InputFormat::Yaml => load_yaml(path)?,
    };
    debug!(
        tasks = records.tasks.len(),
        milestones = records.milestones.len(),
        rejected = records.rejected.len(),
        "records loaded"
    );
    Ok(records)
}

#[cfg(feature = "excel")]
fn load_excel(path: &Path, sheet: &SheetSelector) -> Result<RawRecords> {
    Ok(excel::load_excel(path, sheet)?)
}

#[cfg(not(feature = "excel"))]
fn load_excel(_path: &Path, _sheet: &SheetSelector) -> Result<RawRecords> {
    Err(crate::error::MissingDependencyError::new(crate::error::Capability::Excel).into())
}

#[cfg(feature = "yaml")]
fn load_yaml(path: &Path) -> Result<RawRecords> {
    Ok(yaml::load_yaml(path)?)
}

#[cfg(not(feature = "yaml"))]
fn load_yaml(_path: &Path) -> Result<RawRecords> {
    Err(crate::error::MissingDependencyError::new(crate::error::Capability::Yaml).into())
}

/// One row of the flat `Task / Work Package / Start / End / Type` schema,
/// shared by YAML documents and tabular files using those columns.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlatRecord {
    pub row: usize,
    pub label: String,
    pub work_package: String,
    pub start: Cell,
    pub end: Cell,
    pub kind: String,
    pub related: Vec<String>,
}

impl FlatRecord {
    pub fn push_into(self, records: &mut RawRecords) {
        let (id, name) = split_label(&self.label);
        match self.kind.trim().to_ascii_lowercase().as_str() {
            "task" => records.tasks.push(RawTask {
                row: self.row,
                id,
                name,
                start: self.start,
                end: self.end,
                work_package: self.work_package.trim().to_string(),
            }),
            "milestone" => {
                let due = if self.start.is_empty() {
                    self.end
                } else {
                    self.start
                };
                records.milestones.push(RawMilestone {
                    row: self.row,
                    id,
                    name,
                    due,
                    related: self.related,
                });
            }
            "" => records.rejected.push(ValidationError::new(
                RecordKind::Record,
                self.row,
                Field::Type,
                "missing value",
            )),
            other => records.rejected.push(ValidationError::new(
                RecordKind::Record,
                self.row,
                Field::Type,
                format!("unknown type '{other}' (expected Task or Milestone)"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_selector_parses_index_or_name() {
        assert_eq!("0".parse::<SheetSelector>().unwrap(), SheetSelector::Index(0));
        assert_eq!(" 2 ".parse::<SheetSelector>().unwrap(), SheetSelector::Index(2));
        assert_eq!(
            "Sheet2".parse::<SheetSelector>().unwrap(),
            SheetSelector::Name("Sheet2".into())
        );
    }

    #[test]
    fn flat_milestone_falls_back_to_end_month() {
        let mut records = RawRecords::default();
        FlatRecord {
            row: 4,
            label: "M1 - Kickoff".into(),
            work_package: "Milestones".into(),
            start: Cell::Empty,
            end: Cell::Integer(2),
            kind: "Milestone".into(),
            related: vec![],
        }
        .push_into(&mut records);
        assert_eq!(records.milestones.len(), 1);
        assert_eq!(records.milestones[0].id, "M1");
        assert_eq!(records.milestones[0].due, Cell::Integer(2));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut records = RawRecords::default();
        FlatRecord {
            row: 1,
            label: "Oops".into(),
            work_package: "WP1".into(),
            start: Cell::Integer(1),
            end: Cell::Integer(2),
            kind: "Phase".into(),
            related: vec![],
        }
        .push_into(&mut records);
        assert!(records.tasks.is_empty());
        assert_eq!(records.rejected.len(), 1);
        assert_eq!(records.rejected[0].field, Field::Type);
    }
}
