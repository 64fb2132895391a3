//! JSONPath subset used by `|jsonpath` addresses.
//!
//! Supported:
//! - `$.store.book` / `$['store']["book"]`: child access
//! - `$.book[0]`, `$.book[-1]`: index, negative from the end
//! - `$.book[1:3]`, `$.book[:2]`: slice
//! - `$.book[*]`, `$.store.*`: wildcard
//! - `$.book[0,2]`, `$['a','b']`: union
//! - `$..price`, `$..*`: recursive descent
//! - `$.stores[?(@.open)]`, `$.stores[?(@.address.city == 'Austin')]`: filter on
//!   one member path, either existence or a comparison (`==`, `!=`, `<`, `<=`,
//!   `>`, `>=`) against a string, number, boolean or `null` literal
//!
//! Script expressions (`[(@.length-1)]`) and compound filters (`&&`, `||`,
//! functions) are rejected.

mod evaluator;
mod parser;

use serde_json::Value;
use thiserror::Error;

pub use parser::parse;

/// Compiled path query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Child(Selector),
    Descendant(Selector),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Name(String),
    Wildcard,
    Index(i64),
    Slice { start: Option<i64>, end: Option<i64> },
    Union(Vec<Selector>),
    Filter(Filter),
}

/// `?(@<field> [<op> <literal>])` applied to each child of the current node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: Vec<String>,
    pub test: FilterTest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTest {
    Exists,
    Compare(Comparison, Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid path query `{input}` at byte {offset}: {reason}")]
pub struct JsonPathError {
    input: String,
    offset: usize,
    reason: String,
}

impl JsonPathError {
    fn new(input: &str, offset: usize, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}
