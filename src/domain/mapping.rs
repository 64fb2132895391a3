use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::address::Address;
use crate::domain::error::ConfigurationError;

/// Resolves the mapping specification for a pipeline key.
///
/// Implementations must read fresh on every call; nothing is cached across runs.
pub trait MappingSource {
    fn load(&self, pipeline: &str) -> Result<MappingSpecification, ConfigurationError>;
}

/// Rules mapping document: `{"mapping": {"<pipeline>": [directive, ...]}}`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MappingSpecification {
    #[serde(default)]
    pub mapping: BTreeMap<String, Vec<ComparisonDirective>>,
}

impl MappingSpecification {
    pub fn directives(&self, pipeline: &str) -> Option<&[ComparisonDirective]> {
        self.mapping.get(pipeline).map(Vec::as_slice)
    }
}

impl MappingSource for MappingSpecification {
    fn load(&self, pipeline: &str) -> Result<MappingSpecification, ConfigurationError> {
        if self.mapping.contains_key(pipeline) {
            Ok(self.clone())
        } else {
            Err(ConfigurationError::MissingPipeline {
                pipeline: pipeline.to_string(),
            })
        }
    }
}

/// One comparison unit of a pipeline mapping.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ComparisonDirective {
    pub method: CompareMethod,
    #[serde(default)]
    pub source_path: Option<Address>,
    #[serde(default)]
    pub target_path: Option<Address>,
    #[serde(default)]
    pub rules: RuleSet,
    #[serde(default)]
    pub transformation_rules: TransformChain,
}

/// Extraction strategy of a directive.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum CompareMethod {
    #[serde(rename = "pathbasedcompare", alias = "pathBasedCompare")]
    PathBasedCompare,
    #[serde(rename = "sameFile")]
    SameFile,
    #[serde(other)]
    Unsupported,
}

impl CompareMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PathBasedCompare => "pathbasedcompare",
            Self::SameFile => "sameFile",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Comparison rule name. Unknown names are kept so they can be reported at run time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RuleName {
    EqualValue,
    EqualValueAfterStripSpaces,
    Unrecognized(String),
}

impl RuleName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::EqualValue => "equalValue",
            Self::EqualValueAfterStripSpaces => "equalValueAfterStripSpaces",
            Self::Unrecognized(name) => name,
        }
    }
}

impl From<String> for RuleName {
    fn from(value: String) -> Self {
        match value.as_str() {
            "equalValue" => Self::EqualValue,
            "equalValueAfterStripSpaces" => Self::EqualValueAfterStripSpaces,
            _ => Self::Unrecognized(value),
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleSpec {
    #[serde(rename = "ruleName")]
    pub rule_name: RuleName,
}

/// `rules` is a sequence for `pathbasedcompare` and a single object for `sameFile`.
/// Either shape is accepted for either method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleSet {
    Sequence(Vec<RuleSpec>),
    Single(RuleSpec),
}

impl RuleSet {
    pub fn as_slice(&self) -> &[RuleSpec] {
        match self {
            Self::Sequence(rules) => rules,
            Self::Single(rule) => std::slice::from_ref(rule),
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::Sequence(Vec::new())
    }
}

/// Named time-format transform selected by `timeFormatChange`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    StoreHours,
    Other(String),
}

/// One value-rewriting step of a transformation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformStep {
    RemovePreText(Address),
    TimeFormatChange(TimeFormat),
    Unrecognized(String),
}

impl TransformStep {
    pub fn name(&self) -> &str {
        match self {
            Self::RemovePreText(_) => "removePreText",
            Self::TimeFormatChange(_) => "timeFormatChange",
            Self::Unrecognized(name) => name,
        }
    }
}

/// Ordered transformation chain, in the key order of `transformation_rules`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformChain {
    steps: Vec<TransformStep>,
}

impl TransformChain {
    pub fn new(steps: Vec<TransformStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<'de> Deserialize<'de> for TransformChain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        let mut steps = Vec::with_capacity(raw.len());
        for (key, parameter) in raw {
            let step = match key.as_str() {
                "removePreText" => {
                    TransformStep::RemovePreText(Address::parse(string_parameter(&key, &parameter)?))
                }
                "timeFormatChange" => TransformStep::TimeFormatChange(match &parameter {
                    Value::String(name) if name == "storeHoursTransformation" => TimeFormat::StoreHours,
                    Value::String(name) => TimeFormat::Other(name.clone()),
                    other => TimeFormat::Other(other.to_string()),
                }),
                _ => TransformStep::Unrecognized(key),
            };
            steps.push(step);
        }
        Ok(Self { steps })
    }
}

fn string_parameter<'a, E: de::Error>(key: &str, parameter: &'a Value) -> Result<&'a str, E> {
    parameter
        .as_str()
        .ok_or_else(|| E::custom(format!("transformation rule `{key}` expects a string parameter")))
}
