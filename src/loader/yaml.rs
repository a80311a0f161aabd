use super::FlatRecord;
use crate::error::{FormatError, FormatErrorKind};
use crate::task::{Cell, RawRecords, split_related};
use serde::Deserialize;
use serde_yaml::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedField {
    List(Vec<String>),
    Text(String),
}

impl RelatedField {
    fn into_list(self) -> Vec<String> {
        match self {
            RelatedField::List(items) => items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            RelatedField::Text(text) => split_related(&text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YamlRecord {
    #[serde(rename = "Task", default)]
    task: Cell,
    #[serde(rename = "Work Package", default)]
    work_package: Cell,
    #[serde(rename = "Start", default)]
    start: Cell,
    #[serde(rename = "End", default)]
    end: Cell,
    #[serde(rename = "Type", default)]
    kind: Cell,
    #[serde(rename = "Related WPs", alias = "Related WP(s)", default)]
    related: Option<RelatedField>,
}

pub fn load_yaml<P: AsRef<Path>>(path: P) -> Result<RawRecords, FormatError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| FormatError::new(path, err))?;
    read_yaml(file).map_err(|kind| FormatError::new(path, kind))
}

/// Accepts either a top-level list of records or a mapping with a `tasks` list.
pub fn read_yaml<R: Read>(reader: R) -> Result<RawRecords, FormatErrorKind> {
    let document: Value = serde_yaml::from_reader(reader)?;
    let items = match document {
        Value::Sequence(items) => items,
        Value::Mapping(mut map) => match map.remove("tasks") {
            Some(Value::Sequence(items)) => items,
            _ => {
                return Err(FormatErrorKind::InvalidStructure(
                    "expected a `tasks` key holding a list of records".into(),
                ));
            }
        },
        _ => {
            return Err(FormatErrorKind::InvalidStructure(
                "expected a list of records or a `tasks` key with a list".into(),
            ));
        }
    };

    let mut records = RawRecords::default();
    for (idx, item) in items.into_iter().enumerate() {
        if !item.is_mapping() {
            return Err(FormatErrorKind::InvalidStructure(format!(
                "record {} is not a mapping",
                idx + 1
            )));
        }
        let record: YamlRecord = serde_yaml::from_value(item)?;
        FlatRecord {
            row: idx + 1,
            label: record.task.as_text(),
            work_package: record.work_package.as_text(),
            start: record.start,
            end: record.end,
            kind: record.kind.as_text(),
            related: record.related.map(RelatedField::into_list).unwrap_or_default(),
        }
        .push_into(&mut records);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_wrapped_and_bare_lists() {
        let wrapped = "tasks:\n  - Task: T1 - Design\n    Work Package: WP1\n    Start: 1\n    End: 2\n    Type: Task\n";
        let bare = "- Task: T1 - Design\n  Work Package: WP1\n  Start: 1\n  End: 2\n  Type: Task\n";
        let a = read_yaml(wrapped.as_bytes()).unwrap();
        let b = read_yaml(bare.as_bytes()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.tasks[0].id, "T1");
        assert_eq!(a.tasks[0].start, Cell::Integer(1));
    }

    #[test]
    fn related_accepts_list_or_text() {
        let input = "- Task: M1 - Review\n  Work Package: Milestones\n  Start: 4\n  End: 4\n  Type: Milestone\n  Related WPs: [WP1, WP2]\n\
                     - Task: M2 - Ship\n  Work Package: Milestones\n  Start: 9\n  End: 9\n  Type: Milestone\n  Related WPs: WP2, WP3\n";
        let records = read_yaml(input.as_bytes()).unwrap();
        assert_eq!(records.milestones[0].related, vec!["WP1", "WP2"]);
        assert_eq!(records.milestones[1].related, vec!["WP2", "WP3"]);
    }

    #[test]
    fn list_items_keep_their_commas() {
        let input = "- Task: M1 - Review\n  Work Package: Milestones\n  Start: 4\n  End: 4\n  Type: Milestone\n  Related WPs:\n    - 'WP1: Design, Build'\n    - ' '\n";
        let records = read_yaml(input.as_bytes()).unwrap();
        assert_eq!(records.milestones[0].related, vec!["WP1: Design, Build"]);
    }

    #[test]
    fn scalar_document_is_rejected() {
        let err = read_yaml("just a string".as_bytes()).unwrap_err();
        assert!(matches!(err, FormatErrorKind::InvalidStructure(_)));
    }

    #[test]
    fn missing_fields_become_empty_cells() {
        let records = read_yaml("- Task: T9\n  Type: Task\n".as_bytes()).unwrap();
        assert_eq!(records.tasks[0].start, Cell::Empty);
        assert_eq!(records.tasks[0].work_package, "");
    }
}
