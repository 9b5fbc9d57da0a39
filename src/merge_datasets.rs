/*
cargo run --release --bin merge_datasets -- \
    data/liar_new/base.jsonl \
    data/liar_new/merged.jsonl \
    data/liar_new/annotations_pass1.jsonl \
    data/liar_new/annotations_pass2.jsonl

cargo run --release --bin merge_datasets -- \
    --key claim_id \
    --test-size 0.2 \
    data/claims/base.jsonl \
    data/claims/merged.jsonl \
    data/claims/features.jsonl
*/

use std::fs::{create_dir_all, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use dataset_merge::config::{DEFAULT_KEY_FIELD, DEFAULT_SPLIT_SEED, DEFAULT_TEST_SIZE};
use dataset_merge::{pipeline, MergeConfig};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use simplelog::{
    ColorChoice, CombinedLogger, Config as LogConfig, LevelFilter, TermLogger, TerminalMode,
    WriteLogger,
};

// Merge extra JSONL datasets into a base dataset by a shared key column.
// Base fields win on conflict; keys missing from the base are dropped.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    // Base JSONL dataset; fixes the set of keys in the output
    base_dataset: PathBuf,

    // Merged JSONL output; the split is saved next to it without the extension
    output: PathBuf,

    // Extra JSONL datasets, folded in the given order
    #[arg(required = true)]
    extra_datasets: Vec<PathBuf>,

    // Identifier column shared by all datasets
    #[arg(long, default_value = DEFAULT_KEY_FIELD)]
    key: String,

    // Fraction of merged records held out as the test split
    #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
    test_size: f64,

    // Shuffle seed for the train/test split
    #[arg(long, default_value_t = DEFAULT_SPLIT_SEED)]
    seed: u64,

    // Directory for the timestamped run log
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    // Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logging setup
    create_dir_all(&cli.log_dir)
        .with_context(|| format!("could not create {}", cli.log_dir.display()))?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = cli.log_dir.join(format!("merge_datasets_{ts}.log"));
    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Warn,
            LogConfig::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Info,
            LogConfig::default(),
            File::create(&log_path)
                .with_context(|| format!("could not create {}", log_path.display()))?,
        ),
    ])?;
    info!("Starting dataset merge");

    let config = MergeConfig {
        base_path: cli.base_dataset,
        output_path: cli.output,
        extra_paths: cli.extra_datasets,
        key_field: cli.key,
        test_size: cli.test_size,
        seed: cli.seed,
    };

    // progress bar
    let bar = if cli.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(config.extra_paths.len() as u64)
    };
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let report = pipeline::run(&config, &bar).context("dataset merge failed")?;

    for (field, source) in &report.provenance {
        println!("{field}: {source}");
    }
    println!("Written jsonl output to {}", report.output_path.display());
    println!("{}", report.split);
    println!("DatasetDict saved to {}", report.dataset_dir.display());

    info!(
        "Done: {} merged records, train={} test={}, {} empty dataset(s) skipped",
        report.merged_records,
        report.split.sizes().train,
        report.split.sizes().test,
        report.skipped().count()
    );
    Ok(())
}
