use crate::error::ValidationError;
use serde::Deserialize;
use std::fmt;

/// A single input value as it appeared in the source, before any typing.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Text(String),
    #[default]
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual form; whole floats print without a fraction.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Integer(v) => v.to_string(),
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", *v as i64),
            Cell::Float(v) => v.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawTask {
    pub row: usize,
    pub id: String,
    pub name: String,
    pub start: Cell,
    pub end: Cell,
    pub work_package: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawMilestone {
    pub row: usize,
    pub id: String,
    pub name: String,
    pub due: Cell,
    pub related: Vec<String>,
}

/// Untyped output of the loader. `rejected` holds records the loader could
/// not even classify (e.g. an unknown `Type`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecords {
    pub tasks: Vec<RawTask>,
    pub milestones: Vec<RawMilestone>,
    pub rejected: Vec<ValidationError>,
}

impl RawRecords {
    pub fn extend(&mut self, other: RawRecords) {
        self.tasks.extend(other.tasks);
        self.milestones.extend(other.milestones);
        self.rejected.extend(other.rejected);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub start_month: u32,
    pub end_month: u32,
    pub work_package: String,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_month: u32,
        end_month: u32,
        work_package: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_month,
            end_month,
            work_package: work_package.into(),
        }
    }

    pub fn label(&self) -> String {
        join_label(&self.id, &self.name)
    }

    pub fn duration_months(&self) -> u32 {
        self.end_month - self.start_month
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub due_month: u32,
    pub related_work_packages: Vec<String>,
}

impl Milestone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, due_month: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            due_month,
            related_work_packages: Vec::new(),
        }
    }

    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_work_packages = related.into_iter().map(Into::into).collect();
        self
    }

    pub fn label(&self) -> String {
        join_label(&self.id, &self.name)
    }
}

const LABEL_SEPARATOR: &str = " - ";

fn join_label(id: &str, name: &str) -> String {
    if id == name {
        id.to_string()
    } else {
        format!("{id}{LABEL_SEPARATOR}{name}")
    }
}

/// Splits a combined `"<id> - <name>"` label at the first separator. A label
/// without separator is used for both parts.
pub fn split_label(label: &str) -> (String, String) {
    let label = label.trim();
    match label.split_once(LABEL_SEPARATOR) {
        Some((id, name)) if !id.trim().is_empty() && !name.trim().is_empty() => {
            (id.trim().to_string(), name.trim().to_string())
        }
        _ => (label.to_string(), label.to_string()),
    }
}

/// Splits a comma-separated work package list, dropping blanks.
pub fn split_related(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
