use indexmap::IndexMap;

use crate::record::{Identifier, Record};

/// Identifier ➜ record lookup for one dataset.
///
/// Iterates in first-insertion order of each identifier; a later record with
/// the same identifier replaces the value but keeps that position.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordIndex {
    key_field: String,
    entries: IndexMap<Identifier, Record>,
}

/// Index `records` by `key_field`.
///
/// Records without the key (or with a null key) are skipped silently.
/// Duplicate identifiers keep the last record seen.
pub fn build_index<'a, I>(records: I, key_field: &str) -> RecordIndex
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut entries = IndexMap::new();
    for record in records {
        if let Some(id) = Identifier::of(record, key_field) {
            entries.insert(id, record.clone());
        }
    }
    RecordIndex {
        key_field: key_field.to_string(),
        entries,
    }
}

impl RecordIndex {
    pub(crate) fn from_entries(key_field: &str, entries: IndexMap<Identifier, Record>) -> Self {
        Self {
            key_field: key_field.to_string(),
            entries,
        }
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &Identifier) -> Option<&Record> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.entries.contains_key(id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Identifier> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Record)> {
        self.entries.iter()
    }

    /// Same identifiers in the same order.
    pub fn same_keys(&self, other: &RecordIndex) -> bool {
        self.len() == other.len() && self.keys().eq(other.keys())
    }

    /// Records in iteration order.
    pub fn into_records(self) -> Vec<Record> {
        self.entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn recs(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn id(v: Value) -> Identifier {
        Identifier::from_value(&v).unwrap()
    }

    #[test]
    fn indexes_every_keyed_record() {
        let records = recs(vec![
            json!({"example_index": 1, "example_value": "1"}),
            json!({"example_index": 0, "example_value": "0"}),
        ]);
        let index = build_index(&records, "example_index");

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&id(json!(1))), Some(&records[0]));
        assert_eq!(index.get(&id(json!(0))), Some(&records[1]));
        assert_eq!(index.key_field(), "example_index");
    }

    #[test]
    fn skips_records_without_key() {
        let records = recs(vec![
            json!({"example_id": 1}),
            json!({"other": true}),
            json!({"example_id": null}),
        ]);
        let index = build_index(&records, "example_id");
        assert_eq!(index.len(), 1);
        assert!(index.contains(&id(json!(1))));
    }

    #[test]
    fn last_duplicate_wins_at_first_position() {
        let records = recs(vec![
            json!({"example_id": "a", "v": 1}),
            json!({"example_id": "b", "v": 2}),
            json!({"example_id": "a", "v": 3}),
        ]);
        let index = build_index(&records, "example_id");

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&id(json!("a"))).unwrap()["v"], json!(3));
        let order: Vec<String> = index.keys().map(|k| k.to_string()).collect();
        assert_eq!(order, ["\"a\"", "\"b\""]);
    }

    #[test]
    fn large_integer_ids_stay_distinct() {
        let records = crate::jsonl::parse_records(
            "{\"example_id\": 18446744073709551616, \"v\": 1}\n\
             {\"example_id\": 18446744073709551617, \"v\": 2}",
            "mem",
        )
        .unwrap();
        let index = build_index(&records, "example_id");

        assert_eq!(index.len(), 2);
        let order: Vec<String> = index.keys().map(|k| k.to_string()).collect();
        assert_eq!(order, ["18446744073709551616", "18446744073709551617"]);
    }

    #[test]
    fn empty_input_gives_empty_index() {
        let index = build_index(&Vec::<Record>::new(), "example_id");
        assert!(index.is_empty());
        assert!(index.into_records().is_empty());
    }

    #[test]
    fn same_keys_respects_order() {
        let a = build_index(&recs(vec![json!({"k": 1}), json!({"k": 2})]), "k");
        let b = build_index(&recs(vec![json!({"k": 2}), json!({"k": 1})]), "k");
        assert!(a.same_keys(&a.clone()));
        assert!(!a.same_keys(&b));
    }
}
