use gantt_tool::error::{Error, FormatErrorKind};
use gantt_tool::loader::{InputFormat, SheetSelector, load_csv, load_records};
use gantt_tool::task::Cell;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn task_csv_keeps_cells_untyped() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tasks.csv",
        "Task Number,Task Name,Task Start Month,Task End Month,Work Package\n\
         T1,Design,1,3,WP1: Design\n\
         T2,Build,soon,6,WP2: Build\n",
    );
    let records = load_records(&path, &InputFormat::Csv).unwrap();
    assert_eq!(records.tasks.len(), 2);
    assert_eq!(records.tasks[0].id, "T1");
    assert_eq!(records.tasks[0].work_package, "WP1: Design");
    assert_eq!(records.tasks[1].start, Cell::Text("soon".into()));
    assert_eq!(records.tasks[1].row, 2);
}

#[test]
fn missing_required_column_fails_before_rows() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tasks.csv",
        "Task Number,Task Name,Task Start Month,Work Package\nT1,Design,1,WP1\n",
    );
    let err = load_records(&path, &InputFormat::Csv).unwrap_err();
    let Error::Format(err) = err else {
        panic!("expected a format error");
    };
    assert_eq!(err.path, path);
    match err.kind {
        FormatErrorKind::MissingColumns { missing, available } => {
            assert_eq!(missing, vec!["Task End Month"]);
            assert!(available.contains(&"Task Name".to_string()));
        }
        other => panic!("unexpected error kind {other:?}"),
    }
}

#[test]
fn milestone_csv_splits_related_work_packages() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "milestones.csv",
        "Milestone number,Milestone name,Due date (in month),Related WP(s)\n\
         M1,Review,6,\"WP1, WP2\"\n\
         M2,Launch,12,\n",
    );
    let records = load_csv(&path).unwrap();
    assert!(records.tasks.is_empty());
    assert_eq!(records.milestones.len(), 2);
    assert_eq!(records.milestones[0].related, vec!["WP1", "WP2"]);
    assert!(records.milestones[1].related.is_empty());
}

#[test]
fn headers_match_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tasks.csv",
        " task number ,TASK NAME,task start month,Task End Month,work package\nT1,Design,1,2,WP1\n",
    );
    let records = load_csv(&path).unwrap();
    assert_eq!(records.tasks.len(), 1);
}

#[test]
fn flat_record_csv_yields_tasks_and_milestones() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "records.csv",
        "Task,Work Package,Start,End,Type,Related WPs\n\
         T1 - Design,WP1,1,3,Task,\n\
         M1 - Review,Milestones,3,3,Milestone,WP1\n\
         X1 - Odd,WP1,1,2,Phase,\n",
    );
    let records = load_csv(&path).unwrap();
    assert_eq!(records.tasks.len(), 1);
    assert_eq!(records.tasks[0].name, "Design");
    assert_eq!(records.milestones[0].due, Cell::Text("3".into()));
    assert_eq!(records.milestones[0].related, vec!["WP1"]);
    assert_eq!(records.rejected.len(), 1);
    assert_eq!(records.rejected[0].row, 3);
}

#[test]
fn unreadable_file_is_a_format_error() {
    let dir = TempDir::new().unwrap();
    let err = load_records(dir.path().join("absent.csv"), &InputFormat::Csv).unwrap_err();
    assert!(matches!(err, Error::Format(ref e) if matches!(e.kind, FormatErrorKind::Io(_))));
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_records_load_through_the_same_entry_point() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "plan.yaml",
        "tasks:\n  - Task: T1 - Design\n    Work Package: 'WP1: Design'\n    Start: 1\n    End: 2\n    Type: Task\n",
    );
    let records = load_records(&path, &InputFormat::Yaml).unwrap();
    assert_eq!(records.tasks.len(), 1);
    assert_eq!(records.tasks[0].work_package, "WP1: Design");
}

#[cfg(feature = "yaml")]
#[test]
fn malformed_yaml_is_a_format_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.yaml", "tasks: [unclosed\n");
    let err = load_records(&path, &InputFormat::Yaml).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
}

#[cfg(feature = "excel")]
#[test]
fn missing_workbook_reports_its_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.xlsx");
    let err = load_records(&path, &InputFormat::Excel(SheetSelector::Name("Plan".into())))
        .unwrap_err();
    let Error::Format(err) = err else {
        panic!("expected a format error");
    };
    assert_eq!(err.path, path);
}

/// Workbook with a notes sheet, a task sheet and a milestone sheet named "2024".
#[cfg(feature = "excel")]
fn workbook(dir: &TempDir) -> PathBuf {
    use rust_xlsxwriter::Workbook;

    let path = dir.path().join("plan.xlsx");
    let mut book = Workbook::new();

    let notes = book.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "Draft plan, see the Plan sheet").unwrap();

    let plan = book.add_worksheet();
    plan.set_name("Plan").unwrap();
    for (col, header) in [
        "Task Number",
        "Task Name",
        "Task Start Month",
        "Task End Month",
        "Work Package",
    ]
    .into_iter()
    .enumerate()
    {
        plan.write_string(0, col as u16, header).unwrap();
    }
    for (row, (id, name, start, end, wp)) in [
        ("T1", "Design", 1.0, 3.0, "WP1: Design"),
        ("T2", "Build", 3.0, 6.0, "WP2: Build"),
    ]
    .into_iter()
    .enumerate()
    {
        let row = row as u32 + 1;
        plan.write_string(row, 0, id).unwrap();
        plan.write_string(row, 1, name).unwrap();
        plan.write_number(row, 2, start).unwrap();
        plan.write_number(row, 3, end).unwrap();
        plan.write_string(row, 4, wp).unwrap();
    }

    let year = book.add_worksheet();
    year.set_name("2024").unwrap();
    for (col, header) in [
        "Milestone number",
        "Milestone name",
        "Due date (in month)",
        "Related WP(s)",
    ]
    .into_iter()
    .enumerate()
    {
        year.write_string(0, col as u16, header).unwrap();
    }
    year.write_string(1, 0, "M1").unwrap();
    year.write_string(1, 1, "Review").unwrap();
    year.write_number(1, 2, 6.0).unwrap();
    year.write_string(1, 3, "WP1, WP2").unwrap();

    book.save(&path).unwrap();
    path
}

#[cfg(feature = "excel")]
fn sheet_not_found(err: Error) -> String {
    match err {
        Error::Format(err) => match err.kind {
            FormatErrorKind::SheetNotFound(sheet) => sheet,
            other => panic!("unexpected error kind {other:?}"),
        },
        other => panic!("unexpected error {other:?}"),
    }
}

#[cfg(feature = "excel")]
#[test]
fn workbook_sheet_selected_by_index() {
    let dir = TempDir::new().unwrap();
    let path = workbook(&dir);
    let records = load_records(&path, &InputFormat::Excel(SheetSelector::Index(1))).unwrap();
    assert_eq!(records.tasks.len(), 2);
    assert_eq!(records.tasks[0].id, "T1");
    assert_eq!(records.tasks[1].work_package, "WP2: Build");
    assert_eq!(records.tasks[1].start, Cell::Float(3.0));
    assert_eq!(records.tasks[1].row, 2);
}

#[cfg(feature = "excel")]
#[test]
fn workbook_sheet_selected_by_name() {
    let dir = TempDir::new().unwrap();
    let path = workbook(&dir);
    let by_name =
        load_records(&path, &InputFormat::Excel(SheetSelector::Name("Plan".into()))).unwrap();
    let by_index = load_records(&path, &InputFormat::Excel(SheetSelector::Index(1))).unwrap();
    assert_eq!(by_name, by_index);

    let report = gantt_tool::validate_records(by_name);
    assert!(report.is_clean(), "{:?}", report.errors);
    assert_eq!(report.schedule.tasks()[1].end_month, 6);
}

#[cfg(feature = "excel")]
#[test]
fn absent_sheet_name_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = workbook(&dir);
    let err = load_records(&path, &InputFormat::Excel(SheetSelector::Name("Budget".into())))
        .unwrap_err();
    assert_eq!(sheet_not_found(err), "'Budget'");
}

#[cfg(feature = "excel")]
#[test]
fn out_of_range_sheet_index_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = workbook(&dir);
    let err = load_records(&path, &InputFormat::Excel(SheetSelector::Index(9))).unwrap_err();
    assert_eq!(sheet_not_found(err), "#9");
}

#[cfg(feature = "excel")]
#[test]
fn digit_sheet_name_is_found_through_the_index_fallback() {
    let dir = TempDir::new().unwrap();
    let path = workbook(&dir);
    let selector: SheetSelector = "2024".parse().unwrap();
    assert_eq!(selector, SheetSelector::Index(2024));

    let records = load_records(&path, &InputFormat::Excel(selector)).unwrap();
    assert!(records.tasks.is_empty());
    assert_eq!(records.milestones.len(), 1);
    assert_eq!(records.milestones[0].due, Cell::Float(6.0));
    assert_eq!(records.milestones[0].related, vec!["WP1", "WP2"]);
}

#[cfg(feature = "excel")]
#[test]
fn sheet_without_known_columns_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = workbook(&dir);
    let err = load_records(&path, &InputFormat::Excel(SheetSelector::Index(0))).unwrap_err();
    assert!(matches!(
        err,
        Error::Format(ref e) if matches!(e.kind, FormatErrorKind::MissingColumns { .. })
    ));
}

#[cfg(not(feature = "excel"))]
#[test]
fn excel_without_feature_names_the_capability() {
    let err = load_records("plan.xlsx", &InputFormat::Excel(SheetSelector::default())).unwrap_err();
    assert!(matches!(err, Error::MissingDependency(_)));
}

#[cfg(feature = "yaml")]
#[test]
fn bundled_yaml_demo_loads_cleanly() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/sample_schedule.yaml");
    let records = load_records(&path, &InputFormat::Yaml).unwrap();
    assert_eq!(records.tasks.len(), 4);
    assert_eq!(records.milestones.len(), 2);
    assert!(records.rejected.is_empty());
    assert_eq!(records.milestones[1].related, vec!["WP1", "WP2"]);
}
