use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::io::format::{csv, json, jsonl, yaml};
use crate::io::{Format, IoError};

/// Reads one document. JSON and YAML yield their root value; JSONL and CSV
/// yield an array of rows.
pub fn read_document<R: Read>(reader: R, format: Format) -> Result<Value, IoError> {
    match format {
        Format::Json => json::read_json(reader),
        Format::Yaml => yaml::read_yaml(reader),
        Format::Csv => csv::read_csv(reader).map(Value::Array),
        Format::Jsonl => jsonl::read_jsonl(reader).map(Value::Array),
    }
}

/// Opens `path` and reads it as a `kind` document (`source`, `target`, `mapping`).
pub fn read_document_path(path: &Path, format: Format, kind: &'static str) -> Result<Value, IoError> {
    let file = File::open(path).map_err(|source| IoError::Open {
        kind,
        path: path.display().to_string(),
        source,
    })?;
    read_document(file, format)
}
