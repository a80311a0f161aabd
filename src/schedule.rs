use crate::task::{Milestone, Task};
use polars::prelude::*;
use std::fmt;

/// A named group of tasks. `order` is the first-seen position among work
/// packages and drives both row grouping and color assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPackage {
    pub name: String,
    pub order: usize,
    pub task_ids: Vec<String>,
}

impl WorkPackage {
    /// The identifier part of `"WP1: System Design"`, i.e. `"WP1"`.
    pub fn code(&self) -> &str {
        work_package_code(&self.name)
    }

    /// Whether a milestone relation like `"wp1"` refers to this package.
    pub fn matches(&self, reference: &str) -> bool {
        let reference = reference.trim();
        self.name.eq_ignore_ascii_case(reference) || self.code().eq_ignore_ascii_case(reference)
    }
}

pub fn work_package_code(name: &str) -> &str {
    name.split_once(':').map(|(code, _)| code).unwrap_or(name).trim()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    pub first_month: u32,
    pub last_month: u32,
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.first_month, self.last_month)
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleSummary {
    pub task_count: usize,
    pub milestone_count: usize,
    pub work_package_count: usize,
    pub timeline: Option<Timeline>,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("milestones={}", self.milestone_count));
        parts.push(format!("work_packages={}", self.work_package_count));
        if let Some(timeline) = self.timeline {
            parts.push(format!("months={}", timeline));
        }
        parts.join(", ")
    }
}

/// Validated tasks and milestones. Built by the validator; nothing mutates
/// it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    tasks: Vec<Task>,
    milestones: Vec<Milestone>,
    work_packages: Vec<WorkPackage>,
}

impl Schedule {
    /// Assembles a schedule from records that already passed validation.
    pub fn new(tasks: Vec<Task>, milestones: Vec<Milestone>) -> Self {
        let mut work_packages: Vec<WorkPackage> = Vec::new();
        for task in &tasks {
            match work_packages.iter_mut().find(|wp| wp.name == task.work_package) {
                Some(wp) => wp.task_ids.push(task.id.clone()),
                None => {
                    let order = work_packages.len();
                    work_packages.push(WorkPackage {
                        name: task.work_package.clone(),
                        order,
                        task_ids: vec![task.id.clone()],
                    });
                }
            }
        }
        Self {
            tasks,
            milestones,
            work_packages,
        }
    }

    pub(crate) fn with_milestones(mut self, milestones: Vec<Milestone>) -> Self {
        self.milestones = milestones;
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Work packages in first-seen order.
    pub fn work_packages(&self) -> &[WorkPackage] {
        &self.work_packages
    }

    pub fn find_work_package(&self, reference: &str) -> Option<&WorkPackage> {
        self.work_packages.iter().find(|wp| wp.matches(reference))
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.milestones.is_empty()
    }

    pub fn timeline(&self) -> Option<Timeline> {
        let months = self
            .tasks
            .iter()
            .flat_map(|t| [t.start_month, t.end_month])
            .chain(self.milestones.iter().map(|m| m.due_month));
        months.fold(None, |acc: Option<Timeline>, month| {
            Some(match acc {
                None => Timeline {
                    first_month: month,
                    last_month: month,
                },
                Some(t) => Timeline {
                    first_month: t.first_month.min(month),
                    last_month: t.last_month.max(month),
                },
            })
        })
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            task_count: self.tasks.len(),
            milestone_count: self.milestones.len(),
            work_package_count: self.work_packages.len(),
            timeline: self.timeline(),
        }
    }

    pub fn task_frame(&self) -> PolarsResult<DataFrame> {
        let ids: Vec<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        let names: Vec<&str> = self.tasks.iter().map(|t| t.name.as_str()).collect();
        let work_packages: Vec<&str> = self.tasks.iter().map(|t| t.work_package.as_str()).collect();
        let starts: Vec<i64> = self.tasks.iter().map(|t| t.start_month as i64).collect();
        let ends: Vec<i64> = self.tasks.iter().map(|t| t.end_month as i64).collect();

        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("id"), ids).into_column(),
            Series::new(PlSmallStr::from_static("name"), names).into_column(),
            Series::new(PlSmallStr::from_static("work_package"), work_packages).into_column(),
            Series::new(PlSmallStr::from_static("start_month"), starts).into_column(),
            Series::new(PlSmallStr::from_static("end_month"), ends).into_column(),
        ])
    }

    pub fn milestone_frame(&self) -> PolarsResult<DataFrame> {
        let ids: Vec<&str> = self.milestones.iter().map(|m| m.id.as_str()).collect();
        let names: Vec<&str> = self.milestones.iter().map(|m| m.name.as_str()).collect();
        let due: Vec<i64> = self.milestones.iter().map(|m| m.due_month as i64).collect();
        let related: Vec<String> = self
            .milestones
            .iter()
            .map(|m| m.related_work_packages.join(", "))
            .collect();
        let related: Vec<&str> = related.iter().map(String::as_str).collect();

        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("id"), ids).into_column(),
            Series::new(PlSmallStr::from_static("name"), names).into_column(),
            Series::new(PlSmallStr::from_static("due_month"), due).into_column(),
            Series::new(PlSmallStr::from_static("related_work_packages"), related).into_column(),
        ])
    }
}
