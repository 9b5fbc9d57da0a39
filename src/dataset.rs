//! Train/test split of the merged records and its on-disk layout.
//!
//! ```text
//! <dir>/dataset_dict.json        {"splits": ["train", "test"]}
//! <dir>/train/data.jsonl
//! <dir>/train/dataset_info.json
//! <dir>/test/data.jsonl
//! <dir>/test/dataset_info.json
//! ```

use std::fmt;
use std::fs::{self, create_dir_all};
use std::io;
use std::path::Path;

use indexmap::IndexSet;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::MergeError;
use crate::jsonl::write_records;
use crate::record::Record;

pub const TRAIN_SPLIT: &str = "train";
pub const TEST_SPLIT: &str = "test";

#[derive(Debug, Serialize)]
struct DictManifest<'a> {
    splits: [&'a str; 2],
}

#[derive(Debug, Serialize)]
struct SplitInfo<'a> {
    split: &'a str,
    num_rows: usize,
    features: Vec<&'a str>,
    seed: u64,
    test_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSizes {
    pub train: usize,
    pub test: usize,
}

/// Merged records split into train and test parts.
#[derive(Debug, Clone)]
pub struct DatasetDict {
    train: Vec<Record>,
    test: Vec<Record>,
    test_size: f64,
    seed: u64,
}

impl DatasetDict {
    /// Shuffle `records` with a seeded RNG and cut off `ceil(test_size * n)`
    /// of them as the test split; the remainder is the train split.
    pub fn train_test_split(
        records: Vec<Record>,
        test_size: f64,
        seed: u64,
    ) -> Result<Self, MergeError> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(MergeError::Configuration(format!(
                "test size must be between 0 and 1, got {test_size}"
            )));
        }

        let total = records.len();
        let n_test = ((total as f64) * test_size).ceil() as usize;

        let mut order: Vec<usize> = (0..total).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let mut slots: Vec<Option<Record>> = records.into_iter().map(Some).collect();
        let mut take = |positions: &[usize]| -> Vec<Record> {
            positions.iter().filter_map(|&i| slots[i].take()).collect()
        };
        let test = take(&order[..n_test.min(total)]);
        let train = take(&order[n_test.min(total)..]);

        info!(
            "Split {} records: train={} test={} (seed {})",
            total,
            train.len(),
            test.len(),
            seed
        );

        Ok(Self {
            train,
            test,
            test_size,
            seed,
        })
    }

    pub fn train(&self) -> &[Record] {
        &self.train
    }

    pub fn test(&self) -> &[Record] {
        &self.test
    }

    pub fn sizes(&self) -> SplitSizes {
        SplitSizes {
            train: self.train.len(),
            test: self.test.len(),
        }
    }

    fn splits(&self) -> [(&'static str, &[Record]); 2] {
        [
            (TRAIN_SPLIT, self.train.as_slice()),
            (TEST_SPLIT, self.test.as_slice()),
        ]
    }

    /// Write both splits under `dir`, creating it if needed.
    pub fn save_to_disk(&self, dir: &Path) -> Result<(), MergeError> {
        create_dir_all(dir).map_err(write_err(dir))?;

        let manifest_path = dir.join("dataset_dict.json");
        let manifest = serde_json::to_string_pretty(&DictManifest {
            splits: [TRAIN_SPLIT, TEST_SPLIT],
        })?;
        fs::write(&manifest_path, manifest).map_err(write_err(&manifest_path))?;

        for (name, records) in self.splits() {
            let split_dir = dir.join(name);
            create_dir_all(&split_dir).map_err(write_err(&split_dir))?;

            write_records(&split_dir.join("data.jsonl"), records)?;

            let info_path = split_dir.join("dataset_info.json");
            let info = serde_json::to_string_pretty(&SplitInfo {
                split: name,
                num_rows: records.len(),
                features: features(records),
                seed: self.seed,
                test_size: self.test_size,
            })?;
            fs::write(&info_path, info).map_err(write_err(&info_path))?;
        }

        info!("DatasetDict saved to {}", dir.display());
        Ok(())
    }
}

fn write_err(path: &Path) -> impl FnOnce(io::Error) -> MergeError {
    let path = path.to_path_buf();
    move |source| MergeError::Write { path, source }
}

// Column names in first-seen order across all records
fn features(records: &[Record]) -> Vec<&str> {
    let mut seen = IndexSet::new();
    for record in records {
        for key in record.keys() {
            seen.insert(key.as_str());
        }
    }
    seen.into_iter().collect()
}

impl fmt::Display for DatasetDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DatasetDict({{")?;
        for (name, records) in self.splits() {
            writeln!(f, "    {name}: Dataset({{")?;
            writeln!(f, "        features: {:?},", features(records))?;
            writeln!(f, "        num_rows: {}", records.len())?;
            writeln!(f, "    }})")?;
        }
        write!(f, "}})")
    }
}
