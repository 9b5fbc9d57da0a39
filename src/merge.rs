//! Base-priority merge of identifier-keyed datasets.
//!
//! The base index fixes the key set for the whole run. Each supplementary
//! dataset is folded in turn: for every base identifier it also contains,
//! the supplementary record is overlaid by the current record, so existing
//! fields always win and the supplement only fills gaps. Identifiers found
//! only in a supplement are dropped.

use indexmap::IndexMap;
use log::{debug, info};

use crate::error::MergeError;
use crate::index::{build_index, RecordIndex};
use crate::record::{representative_fields, Record};

/// Field name ➜ label of the dataset that first introduced it.
pub type FieldProvenance = IndexMap<String, String>;

/// One supplementary dataset, ready to fold.
#[derive(Debug, Clone)]
pub struct Supplement {
    pub label: String,
    pub index: RecordIndex,
    // from the first loaded record only
    pub field_names: Vec<String>,
    pub record_count: usize,
}

impl Supplement {
    pub fn from_records(label: impl Into<String>, records: &[Record], key_field: &str) -> Self {
        Self {
            label: label.into(),
            index: build_index(records, key_field),
            field_names: representative_fields(records),
            record_count: records.len(),
        }
    }
}

/// What a single fold did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldOutcome {
    /// Dataset had no records; nothing merged or attributed.
    Skipped,
    Folded {
        matched: usize,
        new_fields: Vec<String>,
    },
}

/// Running merge state: the merged index plus field provenance.
#[derive(Debug, Clone)]
pub struct Merger {
    merged: RecordIndex,
    provenance: FieldProvenance,
}

impl Merger {
    /// Start from `base`; its fields are attributed to `base_label`.
    pub fn new<I, S>(base: RecordIndex, base_field_names: I, base_label: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut provenance = FieldProvenance::new();
        for name in base_field_names {
            provenance
                .entry(name.into())
                .or_insert_with(|| base_label.to_string());
        }
        Self {
            merged: base,
            provenance,
        }
    }

    pub fn merged(&self) -> &RecordIndex {
        &self.merged
    }

    pub fn provenance(&self) -> &FieldProvenance {
        &self.provenance
    }

    /// Fold one supplementary dataset into the running merge.
    pub fn fold(&mut self, supplement: &Supplement) -> Result<FoldOutcome, MergeError> {
        if supplement.record_count == 0 {
            info!("No records in {}, nothing to fold", supplement.label);
            return Ok(FoldOutcome::Skipped);
        }

        let mut new_fields = Vec::new();
        for name in &supplement.field_names {
            if !self.provenance.contains_key(name) {
                self.provenance.insert(name.clone(), supplement.label.clone());
                new_fields.push(name.clone());
            }
        }

        let mut matched = 0usize;
        let mut updated = IndexMap::with_capacity(self.merged.len());
        for (id, current) in self.merged.iter() {
            let entry = match supplement.index.get(id) {
                Some(extra) => {
                    matched += 1;
                    overlay(extra, current)
                }
                None => current.clone(),
            };
            updated.insert(id.clone(), entry);
        }

        let updated = RecordIndex::from_entries(self.merged.key_field(), updated);
        if !self.merged.same_keys(&updated) {
            return Err(MergeError::KeySetChanged {
                label: supplement.label.clone(),
                before: self.merged.len(),
                after: updated.len(),
            });
        }
        self.merged = updated;

        info!(
            "Folded {}: {}/{} keys matched, {} new field(s)",
            supplement.label,
            matched,
            self.merged.len(),
            new_fields.len()
        );
        for name in &new_fields {
            debug!(" -> field {name} from {}", supplement.label);
        }

        Ok(FoldOutcome::Folded {
            matched,
            new_fields,
        })
    }

    pub fn finish(self) -> (RecordIndex, FieldProvenance) {
        (self.merged, self.provenance)
    }
}

/// `{**extra, **current}`: start from `extra`, then let `current` overwrite.
///
/// Overwritten fields keep their position; fields only in `current` are
/// appended after the supplementary ones.
pub fn overlay(extra: &Record, current: &Record) -> Record {
    let mut out = extra.clone();
    for (k, v) in current {
        out.insert(k.clone(), v.clone());
    }
    out
}

/// Fold every supplement into `base`, in order.
pub fn merge<I, S>(
    base: RecordIndex,
    base_field_names: I,
    base_label: &str,
    supplements: &[Supplement],
) -> Result<(RecordIndex, FieldProvenance), MergeError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut merger = Merger::new(base, base_field_names, base_label);
    for supplement in supplements {
        merger.fold(supplement)?;
    }
    Ok(merger.finish())
}
