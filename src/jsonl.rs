//! JSONL reading and writing.
//!
//! Reading is strict: every non-blank line must be one JSON object, and the
//! first bad line aborts the load. Writing joins one compact object per line
//! with `\n` and leaves no trailing newline.

use std::fs;
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::error::MergeError;
use crate::record::Record;

// Longest slice of a bad line echoed back in errors
const CONTENT_PREVIEW_CHARS: usize = 120;

/// Read and parse the JSONL file at `path`.
pub fn load_records(path: &Path) -> Result<Vec<Record>, MergeError> {
    let text = fs::read_to_string(path).map_err(|source| MergeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&text, &path.display().to_string())?;
    debug!("Parsed {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse JSONL `text`; `source_label` names the input in error messages.
pub fn parse_records(text: &str, source_label: &str) -> Result<Vec<Record>, MergeError> {
    let mut records = Vec::new();

    for (idx, line) in split_lines(text).enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line).map_err(|source| MergeError::Parse {
            source_label: source_label.to_string(),
            line: idx + 1,
            content: preview(line),
            source,
        })?;

        match value {
            Value::Object(map) => records.push(map),
            other => {
                return Err(MergeError::NotAnObject {
                    source_label: source_label.to_string(),
                    line: idx + 1,
                    found: kind_name(&other),
                })
            }
        }
    }

    Ok(records)
}

/// Serialize `records` as JSONL text (no trailing newline).
pub fn to_jsonl<'a, I>(records: I) -> Result<String, MergeError>
where
    I: IntoIterator<Item = &'a Record>,
{
    let lines = records
        .into_iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Write `records` to `path` as JSONL, overwriting any existing file.
pub fn write_records(path: &Path, records: &[Record]) -> Result<(), MergeError> {
    let text = to_jsonl(records)?;
    fs::write(path, text).map_err(|source| MergeError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// Breaks on `\n`, `\r\n` and a lone `\r`
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(|c: char| c == '\n' || c == '\r') {
            Some(pos) => {
                let skip = if current[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[pos + skip..]).filter(|r| !r.is_empty());
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

fn preview(line: &str) -> String {
    if line.chars().count() <= CONTENT_PREVIEW_CHARS {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(CONTENT_PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn skips_blank_and_whitespace_lines() {
        let text = "\n  {\"example_id\": 1}  \n\t\n{\"example_id\": 2, \"a\": \"x\"}\n\n";
        let records = parse_records(text, "mem").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["example_id"], json!(1));
        assert_eq!(records[1]["a"], json!("x"));
    }

    #[test]
    fn empty_text_gives_no_records() {
        assert!(parse_records("", "mem").unwrap().is_empty());
        assert!(parse_records(" \n \n", "mem").unwrap().is_empty());
    }

    #[test]
    fn bad_line_reports_position_and_content() {
        let text = "{\"example_id\": 1}\n\n{\"example_id\": 2,}\n";
        let err = parse_records(text, "extra.jsonl").unwrap_err();
        match &err {
            MergeError::Parse { source_label, line, content, .. } => {
                assert_eq!(source_label, "extra.jsonl");
                assert_eq!(*line, 3);
                assert_eq!(content, "{\"example_id\": 2,}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("extra.jsonl:3:"));
    }

    #[test]
    fn carriage_returns_end_lines() {
        let text = "{\"a\": 1}\r{\"a\": 2}\r\n\r\n{\"a\": 3}\n";
        let records = parse_records(text, "mem").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2]["a"], json!(3));

        let err = parse_records("{\"a\": 1}\r\r{oops}", "mem").unwrap_err();
        assert!(matches!(err, MergeError::Parse { line: 3, .. }));
    }

    #[test]
    fn non_object_line_is_rejected() {
        let err = parse_records("{\"a\": 1}\n[1, 2]", "mem").unwrap_err();
        assert!(matches!(
            err,
            MergeError::NotAnObject { line: 2, found: "an array", .. }
        ));
    }

    #[test]
    fn field_order_survives_round_trip() {
        let records = parse_records("{\"z\": 1, \"a\": 2, \"m\": 3}", "mem").unwrap();
        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(to_jsonl(&records).unwrap(), "{\"z\":1,\"a\":2,\"m\":3}");
    }

    #[test]
    fn numbers_are_written_back_verbatim() {
        let line = "{\"example_id\":18446744073709551617,\"n\":123456789012345678901234567890,\"f\":1.0,\"g\":0.1}";
        let records = parse_records(line, "mem").unwrap();
        assert_eq!(to_jsonl(&records).unwrap(), line);
    }

    #[test]
    fn jsonl_output_has_no_trailing_newline() {
        let records = parse_records("{\"a\": 1}\n{\"a\": 2}", "mem").unwrap();
        assert_eq!(to_jsonl(&records).unwrap(), "{\"a\":1}\n{\"a\":2}");
        assert_eq!(to_jsonl(&Vec::<Record>::new()).unwrap(), "");
    }

    #[test]
    fn long_lines_are_truncated_in_errors() {
        let line = format!("{{\"a\": \"{}\"", "x".repeat(500));
        match parse_records(&line, "mem").unwrap_err() {
            MergeError::Parse { content, .. } => {
                assert_eq!(content.chars().count(), CONTENT_PREVIEW_CHARS + 1);
                assert!(content.ends_with('…'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(&dir.path().join("absent.jsonl")).unwrap_err();
        assert!(matches!(err, MergeError::Read { .. }));
    }
}
