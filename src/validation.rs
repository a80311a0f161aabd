use crate::error::{Field, RecordKind, ValidationError};
use crate::schedule::Schedule;
use crate::task::{Cell, Milestone, RawMilestone, RawRecords, RawTask, Task};
use std::collections::HashMap;
use tracing::debug;

/// Milestones must fall inside months `1..=TIMELINE_MONTHS`.
pub const TIMELINE_MONTHS: u32 = 36;

/// Task months may run past the timeline, but not beyond this horizon.
pub const MAX_TASK_MONTH: u32 = 120;

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub schedule: Schedule,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Converts a month cell into an integer. Accepts integers, whole floats and
/// numeric text; everything else is reported, never rounded.
pub fn parse_month(cell: &Cell) -> Result<i64, String> {
    match cell {
        Cell::Empty => Err("missing value".into()),
        Cell::Integer(v) => Ok(*v),
        Cell::Float(v) => whole_number(*v).ok_or_else(|| format!("'{v}' is not a whole month")),
        Cell::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err("missing value".into());
            }
            if let Ok(v) = text.parse::<i64>() {
                return Ok(v);
            }
            text.parse::<f64>()
                .ok()
                .and_then(whole_number)
                .ok_or_else(|| format!("'{text}' is not an integer month"))
        }
    }
}

fn whole_number(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

struct Checker {
    kind: RecordKind,
    row: usize,
    errors: Vec<ValidationError>,
}

impl Checker {
    fn new(kind: RecordKind, row: usize) -> Self {
        Self {
            kind,
            row,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, field: Field, reason: impl Into<String>) {
        self.errors
            .push(ValidationError::new(self.kind, self.row, field, reason));
    }

    fn required(&mut self, field: Field, value: &str) {
        if value.trim().is_empty() {
            self.fail(field, "missing value");
        }
    }

    fn month(&mut self, field: Field, cell: &Cell, min: u32, max: u32) -> Option<u32> {
        let value = match parse_month(cell) {
            Ok(v) => v,
            Err(reason) => {
                self.fail(field, reason);
                return None;
            }
        };
        if value < min as i64 {
            self.fail(field, format!("month {value} must be at least {min}"));
            return None;
        }
        if value > max as i64 {
            self.fail(field, format!("month {value} is outside {min}..={max}"));
            return None;
        }
        u32::try_from(value).ok()
    }
}

fn validate_task(raw: &RawTask) -> Result<Task, Vec<ValidationError>> {
    let mut check = Checker::new(RecordKind::Task, raw.row);
    check.required(Field::Id, &raw.id);
    check.required(Field::Name, &raw.name);
    check.required(Field::WorkPackage, &raw.work_package);
    let start = check.month(Field::Start, &raw.start, 1, MAX_TASK_MONTH);
    let end = check.month(Field::End, &raw.end, 1, MAX_TASK_MONTH);
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            check.fail(
                Field::End,
                format!("end month {end} precedes start month {start}"),
            );
        }
    }

    match (start, end) {
        (Some(start), Some(end)) if check.errors.is_empty() => Ok(Task::new(
            raw.id.trim(),
            raw.name.trim(),
            start,
            end,
            raw.work_package.trim(),
        )),
        _ => Err(check.errors),
    }
}

fn validate_milestone(
    raw: &RawMilestone,
    schedule: &Schedule,
) -> (Option<Milestone>, Vec<ValidationError>) {
    let mut check = Checker::new(RecordKind::Milestone, raw.row);
    check.required(Field::Id, &raw.id);
    check.required(Field::Name, &raw.name);
    let due = check.month(Field::Due, &raw.due, 1, TIMELINE_MONTHS);
    let due = match due {
        Some(due) if check.errors.is_empty() => due,
        _ => return (None, check.errors),
    };

    let mut related: Vec<String> = Vec::with_capacity(raw.related.len());
    for reference in &raw.related {
        match schedule.find_work_package(reference) {
            Some(wp) => {
                if !related.contains(&wp.name) {
                    related.push(wp.name.clone());
                }
            }
            None => check.fail(
                Field::RelatedWorkPackages,
                format!("unknown work package '{reference}', relation dropped"),
            ),
        }
    }

    let milestone = Milestone::new(raw.id.trim(), raw.name.trim(), due).with_related(related);
    (Some(milestone), check.errors)
}

/// Validates loaded records. Invalid records are excluded from the returned
/// schedule and described in `errors`; nothing is ever corrected silently.
pub fn validate_records(raw: RawRecords) -> ValidationReport {
    let mut errors = raw.rejected;
    let mut tasks = Vec::with_capacity(raw.tasks.len());
    let mut first_rows: HashMap<String, usize> = HashMap::with_capacity(raw.tasks.len());

    for record in &raw.tasks {
        match validate_task(record) {
            Ok(task) => {
                if let Some(first) = first_rows.get(&task.id) {
                    errors.push(ValidationError::new(
                        RecordKind::Task,
                        record.row,
                        Field::Id,
                        format!("duplicate task identifier '{}' (first seen in row {first})", task.id),
                    ));
                    continue;
                }
                first_rows.insert(task.id.clone(), record.row);
                tasks.push(task);
            }
            Err(mut task_errors) => errors.append(&mut task_errors),
        }
    }

    let task_only = Schedule::new(tasks, Vec::new());
    let mut milestones = Vec::with_capacity(raw.milestones.len());
    for record in &raw.milestones {
        let (milestone, mut milestone_errors) = validate_milestone(record, &task_only);
        errors.append(&mut milestone_errors);
        if let Some(milestone) = milestone {
            milestones.push(milestone);
        }
    }

    debug!(
        tasks = task_only.tasks().len(),
        milestones = milestones.len(),
        errors = errors.len(),
        "validation finished"
    );
    ValidationReport {
        schedule: task_only.with_milestones(milestones),
        errors,
    }
}
