use std::fmt;

/// Own key of a compared collection: an array index or an object field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// Canonical single-segment path, `$[3]` or `$["storeId"]`.
    pub fn to_canonical(&self) -> String {
        format!("${self}")
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => {
                let encoded = serde_json::to_string(key).map_err(|_| fmt::Error)?;
                write!(formatter, "[{encoded}]")
            }
            Self::Index(index) => write!(formatter, "[{index}]"),
        }
    }
}
