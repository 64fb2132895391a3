use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between selector and addressing kind (`$.items[*].sku|jsonpath`).
pub const ADDRESS_SEPARATOR: char = '|';

/// How the selector of an [`Address`] is resolved against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressKind {
    /// Path query over the whole document.
    JsonPath,
    /// Direct property read from each element of an array document.
    Path,
    /// Missing or unknown suffix; resolves to an empty sequence.
    Unrecognized(String),
}

impl AddressKind {
    fn from_suffix(suffix: &str) -> Self {
        match suffix {
            "jsonpath" => Self::JsonPath,
            "path" => Self::Path,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::JsonPath => "jsonpath",
            Self::Path => "path",
            Self::Unrecognized(suffix) => suffix,
        }
    }
}

/// Parsed address string `<selector>|<kind>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address {
    selector: String,
    kind: AddressKind,
}

impl Address {
    /// Splits on the separator; the selector is the first field and the kind the second.
    /// Anything after a second separator is ignored.
    pub fn parse(input: &str) -> Self {
        let mut fields = input.split(ADDRESS_SEPARATOR);
        let selector = fields.next().unwrap_or_default().to_string();
        let kind = match fields.next() {
            Some(suffix) => AddressKind::from_suffix(suffix),
            None => AddressKind::Unrecognized(String::new()),
        };
        Self { selector, kind }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn kind(&self) -> &AddressKind {
        &self.kind
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AddressKind::Unrecognized(suffix) if suffix.is_empty() => f.write_str(&self.selector),
            kind => write!(f, "{}{ADDRESS_SEPARATOR}{}", self.selector, kind.as_str()),
        }
    }
}
