use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use eegtrials::{DatasetMetadata, LocatorConfig, Partition, TrialLocator};

#[derive(Debug, Parser)]
#[command(name = "load_trial", version, about = "Load one trial of an EEG dataset and print a summary")]
struct Args {
    /// Dataset root (holds train.csv, validation.csv, test.csv and the task directories).
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    /// Metadata table to pick the row from.
    #[arg(long, default_value = "train")]
    split: Partition,

    /// Row of the metadata table (0-based, file order).
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Number of leading sample rows to print.
    #[arg(long, default_value_t = 5)]
    rows: usize,

    /// Return the available rows when a trial runs past the end of its recording.
    #[arg(long)]
    allow_short_trial: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let metadata = DatasetMetadata::load(&args.base_path)
        .with_context(|| format!("loading metadata from {}", args.base_path.display()))?;
    let table = metadata.table(args.split);
    let descriptor = table.get(args.index).with_context(|| {
        format!(
            "{} table has {} rows, no row {}",
            args.split,
            table.len(),
            args.index
        )
    })?;

    let locator = TrialLocator::with_config(
        &args.base_path,
        LocatorConfig {
            allow_short_trial: args.allow_short_trial,
            ..LocatorConfig::default()
        },
    );
    let trial = locator
        .locate(descriptor)
        .with_context(|| format!("loading trial id {}", descriptor.id()))?;

    println!("{}", descriptor);
    if let Some(label) = descriptor.label() {
        println!("Label: {}", label);
    }
    let (n_rows, n_cols) = trial.shape();
    println!("Data shape: ({}, {})", n_rows, n_cols);
    println!(
        "Rows {} of {} (onset {:.3} s{})",
        trial.range(),
        trial.source().display(),
        trial.onset().num_milliseconds() as f64 / 1000.0,
        if trial.is_truncated() { ", truncated" } else { "" }
    );

    println!("First {} rows of trial data:", args.rows.min(n_rows));
    println!("{}", trial.columns().join("\t"));
    for row in trial.head(args.rows) {
        let cells: Vec<String> = row.iter().map(|v| format!("{:.3}", v)).collect();
        println!("{}", cells.join("\t"));
    }

    Ok(())
}
