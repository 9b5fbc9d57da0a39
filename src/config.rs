use std::path::PathBuf;

use crate::error::MergeError;

pub const DEFAULT_KEY_FIELD: &str = "example_id";
pub const DEFAULT_TEST_SIZE: f64 = 0.3;
pub const DEFAULT_SPLIT_SEED: u64 = 325;

// Appended when the output file has no extension to strip
const DATASET_DIR_SUFFIX: &str = "_dataset";

/// Parameters for one merge run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub base_path: PathBuf,
    pub output_path: PathBuf,
    pub extra_paths: Vec<PathBuf>,
    pub key_field: String,
    pub test_size: f64,
    pub seed: u64,
}

impl MergeConfig {
    /// Config with the default key, test size and seed.
    pub fn new(base_path: PathBuf, output_path: PathBuf, extra_paths: Vec<PathBuf>) -> Self {
        Self {
            base_path,
            output_path,
            extra_paths,
            key_field: DEFAULT_KEY_FIELD.to_string(),
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SPLIT_SEED,
        }
    }

    pub fn validate(&self) -> Result<(), MergeError> {
        if self.key_field.trim().is_empty() {
            return Err(MergeError::Configuration("key field must not be empty".into()));
        }
        if self.extra_paths.is_empty() {
            return Err(MergeError::Configuration(
                "at least one extra dataset is required".into(),
            ));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(MergeError::Configuration(format!(
                "test size must be between 0 and 1, got {}",
                self.test_size
            )));
        }
        if self.output_path.file_name().is_none() {
            return Err(MergeError::Configuration(format!(
                "output path {} does not name a file",
                self.output_path.display()
            )));
        }
        Ok(())
    }

    /// Sibling directory for the persisted split: the output path without
    /// its extension (`out/merged.jsonl` ➜ `out/merged`).
    pub fn dataset_dir(&self) -> PathBuf {
        if self.output_path.extension().is_some() {
            return self.output_path.with_extension("");
        }
        let mut name = self.output_path.file_name().unwrap_or_default().to_os_string();
        name.push(DATASET_DIR_SUFFIX);
        self.output_path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(output: &str) -> MergeConfig {
        MergeConfig::new(
            PathBuf::from("base.jsonl"),
            PathBuf::from(output),
            vec![PathBuf::from("extra.jsonl")],
        )
    }

    #[test]
    fn defaults() {
        let cfg = config("out.jsonl");
        assert_eq!(cfg.key_field, "example_id");
        assert_eq!(cfg.test_size, 0.3);
        assert_eq!(cfg.seed, 325);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn dataset_dir_strips_extension() {
        assert_eq!(config("data/merged.jsonl").dataset_dir(), PathBuf::from("data/merged"));
        assert_eq!(config("merged.v2.jsonl").dataset_dir(), PathBuf::from("merged.v2"));
    }

    #[test]
    fn dataset_dir_without_extension_gets_suffix() {
        assert_eq!(config("data/merged").dataset_dir(), PathBuf::from("data/merged_dataset"));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut cfg = config("out.jsonl");
        cfg.key_field = " ".into();
        assert!(matches!(cfg.validate(), Err(MergeError::Configuration(_))));

        let mut cfg = config("out.jsonl");
        cfg.extra_paths.clear();
        assert!(matches!(cfg.validate(), Err(MergeError::Configuration(_))));

        let mut cfg = config("out.jsonl");
        cfg.test_size = 1.0;
        assert!(matches!(cfg.validate(), Err(MergeError::Configuration(_))));

        assert!(matches!(config("..").validate(), Err(MergeError::Configuration(_))));
    }
}
