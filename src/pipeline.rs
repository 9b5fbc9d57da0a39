//! End-to-end merge run: load, index, fold, write JSONL, persist split.
//!
//! Nothing is written until every dataset has been merged, so a failing run
//! leaves no partial output behind.

use std::path::PathBuf;

use indicatif::ProgressBar;
use log::{info, warn};

use crate::config::MergeConfig;
use crate::dataset::DatasetDict;
use crate::error::MergeError;
use crate::index::build_index;
use crate::jsonl::{load_records, write_records};
use crate::merge::{FieldProvenance, FoldOutcome, Merger, Supplement};
use crate::record::representative_fields;

/// Per-input summary, in argument order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub path: PathBuf,
    pub records_loaded: usize,
    pub keys_indexed: usize,
    pub outcome: FoldOutcome,
}

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub provenance: FieldProvenance,
    pub base_records: usize,
    pub merged_records: usize,
    pub datasets: Vec<DatasetSummary>,
    pub output_path: PathBuf,
    pub dataset_dir: PathBuf,
    pub split: DatasetDict,
}

impl MergeReport {
    pub fn skipped(&self) -> impl Iterator<Item = &PathBuf> {
        self.datasets
            .iter()
            .filter(|d| d.outcome == FoldOutcome::Skipped)
            .map(|d| &d.path)
    }
}

/// Run a full merge described by `config`.
///
/// `progress` ticks once per extra dataset.
pub fn run(config: &MergeConfig, progress: &ProgressBar) -> Result<MergeReport, MergeError> {
    config.validate()?;

    let base_label = config.base_path.display().to_string();
    let base_records = load_records(&config.base_path)?;
    if base_records.is_empty() {
        return Err(MergeError::EmptyBase(config.base_path.clone()));
    }
    let base_index = build_index(&base_records, &config.key_field);
    info!(
        "Loaded {} records from base {} ({} keyed by {})",
        base_records.len(),
        base_label,
        base_index.len(),
        config.key_field
    );

    let mut merger = Merger::new(
        base_index,
        representative_fields(&base_records),
        &base_label,
    );
    let base_count = base_records.len();
    drop(base_records);

    let mut datasets = Vec::with_capacity(config.extra_paths.len());
    for path in &config.extra_paths {
        let label = path.display().to_string();
        progress.set_message(label.clone());

        let records = load_records(path)?;
        let supplement = Supplement::from_records(label.as_str(), &records, &config.key_field);
        info!(
            "Loaded {} records from {} ({} keyed)",
            records.len(),
            label,
            supplement.index.len()
        );

        let outcome = merger.fold(&supplement)?;
        if outcome == FoldOutcome::Skipped {
            progress.suspend(|| warn!("Skipping empty dataset: {label}"));
        }

        datasets.push(DatasetSummary {
            path: path.clone(),
            records_loaded: supplement.record_count,
            keys_indexed: supplement.index.len(),
            outcome,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    let (merged, provenance) = merger.finish();
    let merged_records = merged.into_records();
    if merged_records.is_empty() {
        warn!(
            "No base record carries a non-null {}; output will be empty",
            config.key_field
        );
    }

    write_records(&config.output_path, &merged_records)?;
    info!(
        "Written {} records to {}",
        merged_records.len(),
        config.output_path.display()
    );

    let merged_count = merged_records.len();
    let dataset_dir = config.dataset_dir();
    let dict = DatasetDict::train_test_split(merged_records, config.test_size, config.seed)?;
    dict.save_to_disk(&dataset_dir)?;

    Ok(MergeReport {
        provenance,
        base_records: base_count,
        merged_records: merged_count,
        datasets,
        output_path: config.output_path.clone(),
        dataset_dir,
        split: dict,
    })
}
