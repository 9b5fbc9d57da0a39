//! Merge line-delimited JSON datasets that share an identifier column.
//!
//! The base dataset owns the key set and wins every field conflict;
//! supplementary datasets only fill in fields the base does not have.

pub mod config;
pub mod dataset;
pub mod error;
pub mod index;
pub mod jsonl;
pub mod merge;
pub mod pipeline;
pub mod record;

pub use config::MergeConfig;
pub use dataset::{DatasetDict, SplitSizes};
pub use error::MergeError;
pub use index::{build_index, RecordIndex};
pub use jsonl::{load_records, parse_records, write_records};
pub use merge::{merge, FieldProvenance, FoldOutcome, Merger, Supplement};
pub use pipeline::{run, DatasetSummary, MergeReport};
pub use record::{representative_fields, Identifier, Record};
