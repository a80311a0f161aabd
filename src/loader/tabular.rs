use super::FlatRecord;
use crate::error::FormatErrorKind;
use crate::task::{Cell, RawMilestone, RawRecords, RawTask, split_related};
use tracing::debug;

const TASK_COLUMNS: [&str; 5] = [
    "Task Number",
    "Task Name",
    "Task Start Month",
    "Task End Month",
    "Work Package",
];
const MILESTONE_COLUMNS: [&str; 3] = ["Milestone number", "Milestone name", "Due date (in month)"];
const RECORD_COLUMNS: [&str; 5] = ["Task", "Work Package", "Start", "End", "Type"];
const RELATED_COLUMNS: [&str; 2] = ["Related WP(s)", "Related WPs"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TaskColumns {
    number: usize,
    name: usize,
    start: usize,
    end: usize,
    work_package: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MilestoneColumns {
    number: usize,
    name: usize,
    due: usize,
    related: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecordColumns {
    task: usize,
    work_package: usize,
    start: usize,
    end: usize,
    kind: usize,
    related: Option<usize>,
}

/// Header positions of one of the accepted tabular schemas, resolved once
/// before any row is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnMap {
    Tasks(TaskColumns),
    Milestones(MilestoneColumns),
    Records(RecordColumns),
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn find_related(headers: &[String]) -> Option<usize> {
    RELATED_COLUMNS
        .iter()
        .find_map(|name| find_column(headers, name))
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Result<Self, FormatErrorKind> {
        let schemas: [&[&str]; 3] = [&TASK_COLUMNS, &MILESTONE_COLUMNS, &RECORD_COLUMNS];
        let mut best = 0;
        let mut best_matches = 0;
        for (idx, columns) in schemas.iter().enumerate() {
            let matches = columns
                .iter()
                .filter(|name| find_column(headers, name).is_some())
                .count();
            if matches > best_matches {
                best = idx;
                best_matches = matches;
            }
        }

        let missing: Vec<String> = schemas[best]
            .iter()
            .filter(|name| find_column(headers, name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(FormatErrorKind::MissingColumns {
                missing,
                available: headers.iter().map(|h| h.trim().to_string()).collect(),
            });
        }

        // every lookup below succeeds, the schema was checked above
        let col = |name: &str| find_column(headers, name).unwrap_or_default();
        let map = match best {
            0 => ColumnMap::Tasks(TaskColumns {
                number: col(TASK_COLUMNS[0]),
                name: col(TASK_COLUMNS[1]),
                start: col(TASK_COLUMNS[2]),
                end: col(TASK_COLUMNS[3]),
                work_package: col(TASK_COLUMNS[4]),
            }),
            1 => ColumnMap::Milestones(MilestoneColumns {
                number: col(MILESTONE_COLUMNS[0]),
                name: col(MILESTONE_COLUMNS[1]),
                due: col(MILESTONE_COLUMNS[2]),
                related: find_related(headers),
            }),
            _ => ColumnMap::Records(RecordColumns {
                task: col(RECORD_COLUMNS[0]),
                work_package: col(RECORD_COLUMNS[1]),
                start: col(RECORD_COLUMNS[2]),
                end: col(RECORD_COLUMNS[3]),
                kind: col(RECORD_COLUMNS[4]),
                related: find_related(headers),
            }),
        };
        debug!(schema = map.schema_name(), "resolved tabular schema");
        Ok(map)
    }

    pub fn schema_name(&self) -> &'static str {
        match self {
            ColumnMap::Tasks(_) => "tasks",
            ColumnMap::Milestones(_) => "milestones",
            ColumnMap::Records(_) => "records",
        }
    }

    /// Converts data rows (header excluded) into raw records. Rows where
    /// every cell is blank are skipped but still counted for numbering.
    pub fn collect<I>(&self, rows: I) -> RawRecords
    where
        I: IntoIterator<Item = Vec<Cell>>,
    {
        let mut records = RawRecords::default();
        for (idx, cells) in rows.into_iter().enumerate() {
            if cells.iter().all(Cell::is_empty) {
                continue;
            }
            let row = idx + 1;
            let cell = |pos: usize| cells.get(pos).cloned().unwrap_or_default();
            let text = |pos: usize| cell(pos).as_text();
            match self {
                ColumnMap::Tasks(c) => records.tasks.push(RawTask {
                    row,
                    id: text(c.number),
                    name: text(c.name),
                    start: cell(c.start),
                    end: cell(c.end),
                    work_package: text(c.work_package),
                }),
                ColumnMap::Milestones(c) => records.milestones.push(RawMilestone {
                    row,
                    id: text(c.number),
                    name: text(c.name),
                    due: cell(c.due),
                    related: c.related.map(|pos| split_related(&text(pos))).unwrap_or_default(),
                }),
                ColumnMap::Records(c) => FlatRecord {
                    row,
                    label: text(c.task),
                    work_package: text(c.work_package),
                    start: cell(c.start),
                    end: cell(c.end),
                    kind: text(c.kind),
                    related: c.related.map(|pos| split_related(&text(pos))).unwrap_or_default(),
                }
                .push_into(&mut records),
            }
        }
        records
    }
}
