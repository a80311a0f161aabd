//! Chart geometry computed from a validated schedule.
//!
//! Everything here is in chart units: x in months, y in row indices. A
//! drawing surface converts those to pixels, so a layout can be checked
//! without rendering anything.

use crate::config::ChartConfig;
use crate::schedule::Schedule;
use crate::task::Milestone;
use tracing::debug;

/// Bars narrower than this many months get their label outside the bar.
pub const MIN_INSIDE_LABEL_MONTHS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPlacement {
    Inside,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLabel {
    pub text: String,
    pub placement: LabelPlacement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub task_id: String,
    pub row: usize,
    pub start_month: f64,
    pub end_month: f64,
    pub color: String,
    pub label: BarLabel,
}

impl Bar {
    pub fn width_months(&self) -> f64 {
        self.end_month - self.start_month
    }
}

/// Rows occupied by one work package, used for the bracket on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkPackageBand {
    pub name: String,
    pub color: String,
    pub first_row: usize,
    pub last_row: usize,
    pub label_lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSpan {
    /// Whole chart height.
    All,
    Rows { first: usize, last: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerStyle {
    Solid(String),
    /// Alternating segments, one color per related work package.
    Striped(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneMarker {
    pub milestone_id: String,
    pub month: f64,
    pub span: RowSpan,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneLabel {
    pub milestone_id: String,
    pub month: f64,
    pub lane: usize,
    pub lines: Vec<String>,
}

/// Most tick marks drawn on one axis.
pub const MAX_TICKS: u32 = 40;

/// Horizontal extent of the chart. Ticks sit on whole months, every month
/// for short axes and on a coarser step once there would be more than
/// `MAX_TICKS` of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axis {
    pub first_month: u32,
    pub last_month: u32,
}

impl Axis {
    pub fn months(&self) -> u32 {
        self.last_month - self.first_month
    }

    pub fn tick_step(&self) -> u32 {
        let step = self.months().div_ceil(MAX_TICKS).max(1);
        [1, 2, 3, 6, 12]
            .into_iter()
            .find(|&nice| nice >= step)
            .unwrap_or_else(|| step.div_ceil(12) * 12)
    }

    pub fn ticks(&self) -> impl Iterator<Item = u32> {
        let step = self.tick_step();
        (self.first_month..=self.last_month).filter(move |month| month % step == 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub axis: Axis,
    pub row_count: usize,
    pub lane_count: usize,
    pub bars: Vec<Bar>,
    pub bands: Vec<WorkPackageBand>,
    pub markers: Vec<MilestoneMarker>,
    pub labels: Vec<MilestoneLabel>,
}

impl Layout {
    pub fn bar(&self, task_id: &str) -> Option<&Bar> {
        self.bars.iter().find(|bar| bar.task_id == task_id)
    }

    pub fn band(&self, name: &str) -> Option<&WorkPackageBand> {
        self.bands.iter().find(|band| band.name == name)
    }
}

pub fn color_for(config: &ChartConfig, order: usize) -> &str {
    if config.palette.is_empty() {
        return config.milestone_color.as_str();
    }
    config.palette[order % config.palette.len()].as_str()
}

/// Minimum distance in months between two labels sharing a lane.
pub fn min_label_spacing(config: &ChartConfig, axis: Axis) -> f64 {
    let months = axis.months().max(1) as f64;
    let px_per_month = config.plot_width_px() / months;
    if px_per_month <= 0.0 {
        return f64::INFINITY;
    }
    config.label_width_px() / px_per_month
}

/// Greedy word wrap. Words longer than `width` get a line of their own
/// rather than being split.
pub fn wrap_label(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// `"WP1: System Design"` becomes `["WP1", "System Design"]`; the part
/// after the colon is wrapped.
pub fn format_work_package_label(name: &str, width: usize) -> Vec<String> {
    match name.split_once(':') {
        Some((code, rest)) if !rest.trim().is_empty() => {
            let mut lines = vec![code.trim().to_string()];
            lines.extend(wrap_label(rest.trim(), width));
            lines
        }
        _ => wrap_label(name, width),
    }
}

/// Assigns each month a label lane. Labels are visited in (month, index)
/// order so the earlier month always takes the lower lane.
pub fn assign_lanes(months: &[f64], min_spacing: f64, max_lanes: usize) -> Vec<usize> {
    let max_lanes = max_lanes.max(1);
    let mut order: Vec<usize> = (0..months.len()).collect();
    order.sort_by(|&a, &b| months[a].total_cmp(&months[b]).then(a.cmp(&b)));

    let mut last_in_lane: Vec<Option<f64>> = vec![None; max_lanes];
    let mut lanes = vec![0; months.len()];
    for idx in order {
        let month = months[idx];
        let free = last_in_lane
            .iter()
            .position(|last| last.is_none_or(|last| month - last >= min_spacing));
        let lane = free.unwrap_or_else(|| {
            // Every lane conflicts: reuse the one whose last label is farthest.
            let mut best = 0;
            let mut best_gap = f64::NEG_INFINITY;
            for (lane, last) in last_in_lane.iter().enumerate() {
                let gap = last.map_or(f64::INFINITY, |last| month - last);
                if gap > best_gap {
                    best = lane;
                    best_gap = gap;
                }
            }
            best
        });
        last_in_lane[lane] = Some(month);
        lanes[idx] = lane;
    }
    lanes
}

pub fn compute_layout(schedule: &Schedule, config: &ChartConfig) -> Layout {
    let last_month = schedule
        .timeline()
        .map_or(config.timeline_months, |t| t.last_month.max(config.timeline_months));
    let axis = Axis {
        first_month: 0,
        last_month,
    };

    let mut bars = Vec::with_capacity(schedule.tasks().len());
    let mut bands = Vec::with_capacity(schedule.work_packages().len());
    for wp in schedule.work_packages() {
        let color = color_for(config, wp.order).to_string();
        let first_row = bars.len();
        for task in schedule
            .tasks()
            .iter()
            .filter(|task| task.work_package == wp.name)
        {
            let start_month = task.start_month as f64;
            let end_month = task.end_month as f64;
            let placement = if end_month - start_month < MIN_INSIDE_LABEL_MONTHS {
                LabelPlacement::Right
            } else {
                LabelPlacement::Inside
            };
            bars.push(Bar {
                task_id: task.id.clone(),
                row: bars.len(),
                start_month,
                end_month,
                color: color.clone(),
                label: BarLabel {
                    text: task.label(),
                    placement,
                },
            });
        }
        if bars.len() == first_row {
            continue;
        }
        bands.push(WorkPackageBand {
            name: wp.name.clone(),
            color,
            first_row,
            last_row: bars.len() - 1,
            label_lines: format_work_package_label(&wp.name, config.wrap_chars),
        });
    }

    let markers: Vec<MilestoneMarker> = schedule
        .milestones()
        .iter()
        .map(|milestone| marker_for(milestone, &bands, config))
        .collect();

    let spacing = min_label_spacing(config, axis);
    let months: Vec<f64> = markers.iter().map(|m| m.month).collect();
    let lanes = assign_lanes(&months, spacing, config.max_label_lanes);
    let labels: Vec<MilestoneLabel> = schedule
        .milestones()
        .iter()
        .zip(&lanes)
        .map(|(milestone, &lane)| MilestoneLabel {
            milestone_id: milestone.id.clone(),
            month: milestone.due_month as f64,
            lane,
            lines: wrap_label(&milestone.label(), config.wrap_chars),
        })
        .collect();
    let lane_count = lanes.iter().max().map_or(0, |max| max + 1);

    debug!(
        rows = bars.len(),
        bands = bands.len(),
        milestones = markers.len(),
        lanes = lane_count,
        spacing_months = spacing,
        "layout computed"
    );

    Layout {
        axis,
        row_count: bars.len(),
        lane_count,
        bars,
        bands,
        markers,
        labels,
    }
}

fn marker_for(milestone: &Milestone, bands: &[WorkPackageBand], config: &ChartConfig) -> MilestoneMarker {
    let related: Vec<&WorkPackageBand> = milestone
        .related_work_packages
        .iter()
        .filter_map(|name| bands.iter().find(|band| &band.name == name))
        .collect();

    let (span, style) = match related.as_slice() {
        [] => (
            RowSpan::All,
            MarkerStyle::Solid(config.milestone_color.clone()),
        ),
        bands => {
            let first = bands.iter().map(|b| b.first_row).min().unwrap_or(0);
            let last = bands.iter().map(|b| b.last_row).max().unwrap_or(first);
            let style = match bands {
                [only] => MarkerStyle::Solid(only.color.clone()),
                many => MarkerStyle::Striped(many.iter().map(|b| b.color.clone()).collect()),
            };
            (RowSpan::Rows { first, last }, style)
        }
    };

    MilestoneMarker {
        milestone_id: milestone.id.clone(),
        month: milestone.due_month as f64,
        span,
        style,
    }
}
