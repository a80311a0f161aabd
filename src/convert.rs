use crate::error::{FormatError, FormatErrorKind, Result};
use crate::schedule::Schedule;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::info;

/// Work package written for every milestone entry.
pub const MILESTONE_WORK_PACKAGE: &str = "Milestones";

/// Whether this build can write YAML documents.
pub const YAML_AVAILABLE: bool = cfg!(feature = "yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryType {
    Task,
    Milestone,
}

/// One item of the flat record schema, as written to YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEntry {
    #[serde(rename = "Task")]
    pub task: String,
    #[serde(rename = "Work Package")]
    pub work_package: String,
    #[serde(rename = "Start")]
    pub start: u32,
    #[serde(rename = "End")]
    pub end: u32,
    #[serde(rename = "Type")]
    pub kind: EntryType,
    #[serde(rename = "Related WPs", skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleDocument {
    pub tasks: Vec<DocumentEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub entries: usize,
    pub work_packages: Vec<String>,
    pub months: Option<(u32, u32)>,
}

impl ConversionSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = vec![
            format!("entries={}", self.entries),
            format!("work_packages={}", self.work_packages.join(", ")),
        ];
        if let Some((first, last)) = self.months {
            parts.push(format!("months={first}..{last}"));
        }
        parts.join("; ")
    }
}

impl ScheduleDocument {
    pub fn summary(&self) -> ConversionSummary {
        let work_packages: BTreeSet<&str> =
            self.tasks.iter().map(|e| e.work_package.as_str()).collect();
        let first = self.tasks.iter().map(|e| e.start).min();
        let last = self.tasks.iter().map(|e| e.end).max();
        ConversionSummary {
            entries: self.tasks.len(),
            work_packages: work_packages.into_iter().map(str::to_string).collect(),
            months: first.zip(last),
        }
    }
}

/// Tasks in input order, followed by milestones.
pub fn convert(schedule: &Schedule) -> ScheduleDocument {
    let tasks = schedule.tasks().iter().map(|task| DocumentEntry {
        task: task.label(),
        work_package: task.work_package.clone(),
        start: task.start_month,
        end: task.end_month,
        kind: EntryType::Task,
        related: Vec::new(),
    });
    let milestones = schedule.milestones().iter().map(|milestone| DocumentEntry {
        task: milestone.label(),
        work_package: MILESTONE_WORK_PACKAGE.to_string(),
        start: milestone.due_month,
        end: milestone.due_month,
        kind: EntryType::Milestone,
        related: milestone.related_work_packages.clone(),
    });
    ScheduleDocument {
        tasks: tasks.chain(milestones).collect(),
    }
}

#[cfg(feature = "yaml")]
pub fn to_yaml_string(document: &ScheduleDocument) -> std::result::Result<String, FormatErrorKind> {
    Ok(serde_yaml::to_string(document)?)
}

pub fn to_json_string(document: &ScheduleDocument) -> std::result::Result<String, FormatErrorKind> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    Ok(text)
}

pub fn write_document<P: AsRef<Path>>(
    document: &ScheduleDocument,
    path: P,
    format: DocumentFormat,
) -> Result<()> {
    let path = path.as_ref();
    let text = match format {
        DocumentFormat::Yaml => yaml_text(document, path)?,
        DocumentFormat::Json => {
            to_json_string(document).map_err(|kind| FormatError::new(path, kind))?
        }
    };
    fs::write(path, text).map_err(|err| FormatError::new(path, err))?;
    info!(path = %path.display(), entries = document.tasks.len(), ?format, "document written");
    Ok(())
}

#[cfg(feature = "yaml")]
fn yaml_text(document: &ScheduleDocument, path: &Path) -> Result<String> {
    Ok(to_yaml_string(document).map_err(|kind| FormatError::new(path, kind))?)
}

#[cfg(not(feature = "yaml"))]
fn yaml_text(_document: &ScheduleDocument, _path: &Path) -> Result<String> {
    use crate::error::{Capability, MissingDependencyError};
    Err(MissingDependencyError::new(Capability::Yaml).into())
}
