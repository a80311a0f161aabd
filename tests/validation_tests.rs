use gantt_tool::error::{Field, RecordKind};
use gantt_tool::loader::read_csv;
use gantt_tool::task::RawRecords;
use gantt_tool::validate_records;
use gantt_tool::validation::MAX_TASK_MONTH;

fn tasks_csv(rows: &str) -> RawRecords {
    let text = format!(
        "Task Number,Task Name,Task Start Month,Task End Month,Work Package\n{rows}"
    );
    read_csv(text.as_bytes()).unwrap()
}

fn milestones_csv(rows: &str) -> RawRecords {
    let text = format!("Milestone number,Milestone name,Due date (in month),Related WP(s)\n{rows}");
    read_csv(text.as_bytes()).unwrap()
}

#[test]
fn invalid_rows_are_reported_and_excluded() {
    let report = validate_records(tasks_csv(
        "T1,Design,1,3,WP1\n\
         T2,Build,5,4,WP1\n\
         T3,,2,2,WP2\n\
         T4,Test,0,2,WP2\n\
         T5,Ship,3.5,4,WP2\n",
    ));
    let ids: Vec<&str> = report.schedule.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["T1"]);

    let found: Vec<(usize, Field)> = report.errors.iter().map(|e| (e.row, e.field)).collect();
    assert_eq!(
        found,
        vec![
            (2, Field::End),
            (3, Field::Name),
            (4, Field::Start),
            (5, Field::Start),
        ]
    );
    assert!(report.errors.iter().all(|e| e.kind == RecordKind::Task));
}

#[test]
fn task_months_past_the_horizon_are_rejected() {
    let report = validate_records(tasks_csv(
        "T1,Long,1,200000,WP1\n\
         T2,Later,130,140,WP1\n\
         T3,Edge,100,120,WP1\n",
    ));
    let ids: Vec<&str> = report.schedule.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["T3"]);

    let found: Vec<(usize, Field)> = report.errors.iter().map(|e| (e.row, e.field)).collect();
    assert_eq!(found, vec![(1, Field::End), (2, Field::Start), (2, Field::End)]);
    assert_eq!(
        report.errors[0].to_string(),
        format!("task row 1: end month: month 200000 is outside 1..={MAX_TASK_MONTH}")
    );
}

#[test]
fn whole_float_months_are_accepted() {
    let report = validate_records(tasks_csv("T1,Design,2.0,4,WP1\n"));
    assert!(report.is_clean());
    assert_eq!(report.schedule.tasks()[0].start_month, 2);
}

#[test]
fn zero_length_task_is_valid() {
    let report = validate_records(tasks_csv("T1,Review,3,3,WP1\n"));
    assert!(report.is_clean());
    assert_eq!(report.schedule.tasks()[0].duration_months(), 0);
}

#[test]
fn duplicate_task_ids_keep_the_first() {
    let report = validate_records(tasks_csv("T1,Design,1,3,WP1\nT1,Again,2,4,WP2\n"));
    assert_eq!(report.schedule.tasks().len(), 1);
    assert_eq!(report.schedule.tasks()[0].name, "Design");
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].reason.contains("first seen in row 1"));
}

#[test]
fn milestone_due_month_must_fit_the_timeline() {
    let mut records = tasks_csv("T1,Design,1,3,WP1: Design\n");
    records.extend(milestones_csv("M1,Review,3,WP1\nM2,Late,37,\nM3,Early,0,\n"));
    let report = validate_records(records);
    let ids: Vec<&str> = report
        .schedule
        .milestones()
        .iter()
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(ids, vec!["M1"]);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().all(|e| e.field == Field::Due));
}

#[test]
fn unknown_relation_is_dropped_but_milestone_kept() {
    let mut records = tasks_csv("T1,Design,1,3,WP1: Design\nT2,Build,2,5,WP2: Build\n");
    records.extend(milestones_csv("M1,Review,4,\"wp2, WP9\"\n"));
    let report = validate_records(records);

    let milestone = &report.schedule.milestones()[0];
    assert_eq!(milestone.related_work_packages, vec!["WP2: Build"]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].field, Field::RelatedWorkPackages);
    assert!(report.errors[0].reason.contains("WP9"));
}

#[test]
fn error_message_names_row_and_field() {
    let report = validate_records(tasks_csv("T1,Design,x,3,WP1\n"));
    assert_eq!(
        report.errors[0].to_string(),
        "task row 1: start month: 'x' is not an integer month"
    );
}
