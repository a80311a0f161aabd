use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};
use gantt_tool::loader::{InputFormat, SheetSelector, load_csv, load_records, read_csv};
use gantt_tool::render::{DrawingSurface, ImageFormat, SvgSurface, draw_chart};
use gantt_tool::table::render_frame;
use gantt_tool::task::RawRecords;
use gantt_tool::{ChartConfig, compute_layout, validate_records};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SAMPLE_TASKS: &str = include_str!("../../demos/sample_tasks.csv");
const SAMPLE_MILESTONES: &str = include_str!("../../demos/sample_milestones.csv");

/// Generate a Gantt chart from project data.
#[derive(Debug, Parser)]
#[command(name = "gantt", version, about)]
#[command(group(ArgGroup::new("input").args(["csv", "excel", "yaml"])))]
struct Args {
    /// CSV file with tasks (or flat records)
    #[arg(short = 'c', long)]
    csv: Option<PathBuf>,
    /// Excel workbook with tasks
    #[arg(short = 'x', long)]
    excel: Option<PathBuf>,
    /// YAML file with a list of records
    #[arg(short = 'y', long)]
    yaml: Option<PathBuf>,
    /// Excel sheet name or zero-based index
    #[arg(short = 's', long, default_value = "0")]
    sheet: SheetSelector,
    #[arg(short = 't', long, default_value = "")]
    title: String,
    /// Where to save the chart (.svg or .png)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
    /// Don't open the chart in the system viewer
    #[arg(long)]
    no_display: bool,
    #[arg(long, default_value_t = 300)]
    dpi: u32,
    /// Additional milestone CSV
    #[arg(short = 'm', long)]
    milestones: Option<PathBuf>,
    /// JSON chart configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the validated tasks and milestones as tables
    #[arg(long)]
    table: bool,
}

impl Args {
    fn input(&self) -> Option<(&PathBuf, InputFormat)> {
        if let Some(path) = &self.csv {
            return Some((path, InputFormat::Csv));
        }
        if let Some(path) = &self.excel {
            return Some((path, InputFormat::Excel(self.sheet.clone())));
        }
        self.yaml.as_ref().map(|path| (path, InputFormat::Yaml))
    }
}

fn sample_records(with_milestones: bool) -> Result<RawRecords> {
    let mut records = read_csv(SAMPLE_TASKS.as_bytes()).context("built-in sample tasks")?;
    if with_milestones {
        records.extend(read_csv(SAMPLE_MILESTONES.as_bytes()).context("built-in sample milestones")?);
    }
    Ok(records)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ChartConfig::from_json_file(path)?,
        None => ChartConfig::default(),
    };

    let mut records = match args.input() {
        Some((path, format)) => load_records(path, &format)?,
        None => {
            println!("No input file given, using the built-in sample schedule");
            sample_records(args.milestones.is_none())?
        }
    };
    if let Some(path) = &args.milestones {
        records.extend(load_csv(path)?);
    }

    let report = validate_records(records);
    for error in &report.errors {
        eprintln!("warning: {error}");
    }
    let schedule = report.schedule;
    if schedule.tasks().is_empty() {
        bail!("no valid tasks to chart");
    }

    if args.table {
        println!("{}", render_frame(&schedule.task_frame()?));
        if !schedule.milestones().is_empty() {
            println!("{}", render_frame(&schedule.milestone_frame()?));
        }
    }

    let layout = compute_layout(&schedule, &config);
    let mut surface = SvgSurface::new(config, args.title.clone());
    draw_chart(&layout, &mut surface);

    if let Some(output) = &args.output {
        let format = ImageFormat::from_path(output)?;
        println!("Saving chart to: {}", output.display());
        surface.save(output, args.dpi, format)?;
        println!("Chart saved successfully!");
    }
    if !args.no_display {
        if let Err(err) = surface.show() {
            eprintln!("warning: could not open the chart viewer: {err}");
        }
    }

    let summary = schedule.summary();
    info!(summary = %summary.to_cli_summary(), "chart generated");
    println!();
    println!("{}", "=".repeat(50));
    println!("Gantt chart generated successfully!");
    println!("Title: {}", args.title);
    if let Some(timeline) = summary.timeline {
        println!(
            "Project spans from month {} to month {}",
            timeline.first_month, timeline.last_month
        );
    }
    println!("Total tasks: {}", summary.task_count);
    println!("Total milestones: {}", summary.milestone_count);
    println!("{}", "=".repeat(50));
    Ok(())
}
