use std::io::Read;

use serde_json::{Map, Value};

use crate::io::IoError;

/// Rows become objects keyed by header, in header order; every cell is a string.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Value>, IoError> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let headers: Vec<String> = csv_reader.headers()?.iter().map(ToOwned::to_owned).collect();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|cell| Value::String(cell.to_string())))
            .collect();
        rows.push(Value::Object(row));
    }
    Ok(rows)
}
