use std::io::{BufRead, BufReader, Read};

use serde_json::Value;

use crate::io::IoError;

/// One value per non-blank line.
pub fn read_jsonl<R: Read>(reader: R) -> Result<Vec<Value>, IoError> {
    let mut rows = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str(&line)?);
    }
    Ok(rows)
}
