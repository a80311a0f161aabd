use anyhow::{Result, bail};
use clap::Parser;
use gantt_tool::convert::{DocumentFormat, YAML_AVAILABLE, convert, write_document};
use gantt_tool::loader::load_csv;
use gantt_tool::validate_records;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Convert CSV task data to the YAML format read by `gantt -y`.
#[derive(Debug, Parser)]
#[command(name = "csv-to-yaml", version, about)]
struct Args {
    /// CSV file with task data
    csv: PathBuf,
    /// Output path (default: <input stem>.yaml in the current directory)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
    /// Milestone CSV to merge into the document
    #[arg(short = 'm', long)]
    milestones: Option<PathBuf>,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tasks".to_string());
    PathBuf::from(format!("{stem}.yaml"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut records = load_csv(&args.csv)?;
    if let Some(path) = &args.milestones {
        println!("Loading milestones from: {}", path.display());
        records.extend(load_csv(path)?);
    }

    let report = validate_records(records);
    for error in &report.errors {
        eprintln!("warning: {error}");
    }
    let schedule = report.schedule;
    if schedule.is_empty() {
        bail!("no valid records in {}", args.csv.display());
    }
    if args.milestones.is_some() {
        println!("Added {} milestones", schedule.milestones().len());
    }

    let document = convert(&schedule);
    let requested = args.output.clone().unwrap_or_else(|| default_output(&args.csv));
    let (output, format) = if YAML_AVAILABLE {
        (requested, DocumentFormat::Yaml)
    } else {
        warn!("built without YAML support, writing JSON instead");
        (requested.with_extension("json"), DocumentFormat::Json)
    };
    write_document(&document, &output, format)?;
    println!(
        "Successfully converted {} entries to {}",
        document.tasks.len(),
        output.display()
    );

    let summary = document.summary();
    println!();
    println!("Conversion Summary:");
    println!("  Input file: {}", args.csv.display());
    println!("  Output file: {}", output.display());
    println!("  Total entries: {}", summary.entries);
    println!("  Work packages: {}", summary.work_packages.join(", "));
    if let Some((first, last)) = summary.months {
        println!("  Month range: {first} to {last}");
    }
    Ok(())
}
