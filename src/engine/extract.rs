use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::domain::address::{Address, AddressKind};
use crate::domain::error::RuleEngineError;
use crate::domain::mapping::TransformChain;
use crate::engine::jsonpath::{self, JsonPathError};
use crate::engine::transform;
use crate::util::text::json_type_name;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{source}")]
    Query {
        #[source]
        source: JsonPathError,
    },

    #[error("`{selector}|path` addressing expects an array document, got {actual}")]
    NotASequence {
        selector: String,
        actual: &'static str,
    },

    #[error("element #{index} is {actual}, not an object; cannot read `{field}`")]
    NotAnObject {
        field: String,
        index: usize,
        actual: &'static str,
    },

    #[error("element #{index} has no field `{field}`")]
    MissingField { field: String, index: usize },
}

/// Resolves `address` against `document`.
///
/// `jsonpath` addresses return every match of the query over the whole document.
/// `path` addresses read the named field from each element of an array document,
/// passing each value through `transforms` when given. Extraction done on behalf
/// of a transform passes `None` so it never re-enters the chain. Unrecognized
/// address kinds resolve to an empty sequence.
pub fn get_path_value(
    address: &Address,
    transforms: Option<&TransformChain>,
    document: &Value,
) -> Result<Vec<Value>, RuleEngineError> {
    match address.kind() {
        AddressKind::JsonPath => {
            let query = jsonpath::parse(address.selector())
                .map_err(|source| ExtractionError::Query { source })?;
            Ok(query.query_owned(document))
        }
        AddressKind::Path => {
            let Value::Array(elements) = document else {
                return Err(ExtractionError::NotASequence {
                    selector: address.selector().to_string(),
                    actual: json_type_name(document),
                }
                .into());
            };
            let mut values = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                let value = field_value(element, address.selector(), index)?.clone();
                let value = match transforms {
                    Some(chain) if !chain.is_empty() => {
                        transform::transform_data(chain, value, element)?
                    }
                    _ => value,
                };
                values.push(value);
            }
            Ok(values)
        }
        AddressKind::Unrecognized(suffix) => {
            warn!(address = %address, suffix = %suffix, "unrecognized address kind; nothing extracted");
            Ok(Vec::new())
        }
    }
}

/// Reads `field` from one element of a `path`-addressed document.
pub fn read_field<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    record.as_object()?.get(field)
}

fn field_value<'a>(
    element: &'a Value,
    field: &str,
    index: usize,
) -> Result<&'a Value, ExtractionError> {
    if !element.is_object() {
        return Err(ExtractionError::NotAnObject {
            field: field.to_string(),
            index,
            actual: json_type_name(element),
        });
    }
    read_field(element, field).ok_or_else(|| ExtractionError::MissingField {
        field: field.to_string(),
        index,
    })
}
