use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An input file could not be read structurally, or an output could not be written.
#[derive(Debug, Error)]
#[error("{}: {kind}", .path.display())]
pub struct FormatError {
    pub path: PathBuf,
    pub kind: FormatErrorKind,
}

impl FormatError {
    pub fn new(path: impl AsRef<Path>, kind: impl Into<FormatErrorKind>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatErrorKind {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "yaml")]
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[cfg(feature = "excel")]
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),
    #[error("missing required columns: {} (available: {})", .missing.join(", "), .available.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },
    #[error("sheet {0} not found")]
    SheetNotFound(String),
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
    #[error("unsupported output format '{0}' (expected .svg or .png)")]
    UnsupportedOutput(String),
    #[error("image rendering failed: {0}")]
    Render(String),
}

/// Optional format support that was compiled out of this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Yaml,
    Excel,
    Png,
}

impl Capability {
    pub fn feature(&self) -> &'static str {
        match self {
            Capability::Yaml => "yaml",
            Capability::Excel => "excel",
            Capability::Png => "png",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Yaml => write!(f, "YAML input/output"),
            Capability::Excel => write!(f, "Excel input"),
            Capability::Png => write!(f, "PNG output"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{capability} is not available in this build; rebuild with `--features {}`", .capability.feature())]
pub struct MissingDependencyError {
    pub capability: Capability,
}

impl MissingDependencyError {
    pub fn new(capability: Capability) -> Self {
        Self { capability }
    }
}

/// Which kind of record a [`ValidationError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Task,
    Milestone,
    Record,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Task => write!(f, "task"),
            RecordKind::Milestone => write!(f, "milestone"),
            RecordKind::Record => write!(f, "record"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Name,
    Start,
    End,
    WorkPackage,
    Due,
    RelatedWorkPackages,
    Type,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Id => "identifier",
            Field::Name => "name",
            Field::Start => "start month",
            Field::End => "end month",
            Field::WorkPackage => "work package",
            Field::Due => "due month",
            Field::RelatedWorkPackages => "related work packages",
            Field::Type => "type",
        };
        f.write_str(name)
    }
}

/// A per-record field problem. Never fatal on its own; the record is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} row {row}: {field}: {reason}")]
pub struct ValidationError {
    pub kind: RecordKind,
    /// 1-based data row (header excluded) within its source.
    pub row: usize,
    pub field: Field,
    pub reason: String,
}

impl ValidationError {
    pub fn new(kind: RecordKind, row: usize, field: Field, reason: impl Into<String>) -> Self {
        Self {
            kind,
            row,
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    MissingDependency(#[from] MissingDependencyError),
}

pub type Result<T> = std::result::Result<T, Error>;
