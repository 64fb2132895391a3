use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::error::ConfigurationError;
use crate::domain::mapping::{MappingSource, MappingSpecification};
use crate::io::{self, reader};

/// Directory searched when no mapping location is given.
pub const DEFAULT_MAPPING_DIR: &str = "tests/rules-mapping";

/// Pipeline key to rules mapping file name.
pub const MAPPING_FILES: [(&str, &str); 4] = [
    ("pricebook", "pricebook_rules_mapping.json"),
    ("storelist", "storelist_rules_mapping.json"),
    ("inventoryList", "inventory_rules_mapping.json"),
    (
        "autoreservationallocation",
        "autoreservationallocation_rules_mapping.json",
    ),
];

pub fn mapping_file_name(pipeline: &str) -> Option<&'static str> {
    MAPPING_FILES
        .iter()
        .find(|(key, _)| *key == pipeline)
        .map(|(_, file)| *file)
}

/// Mapping files looked up by pipeline key inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingDir {
    root: PathBuf,
}

impl MappingDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, pipeline: &str) -> Result<PathBuf, ConfigurationError> {
        mapping_file_name(pipeline)
            .map(|file| self.root.join(file))
            .ok_or_else(|| ConfigurationError::UnknownPipeline {
                pipeline: pipeline.to_string(),
            })
    }
}

impl Default for MappingDir {
    fn default() -> Self {
        Self::new(DEFAULT_MAPPING_DIR)
    }
}

impl MappingSource for MappingDir {
    fn load(&self, pipeline: &str) -> Result<MappingSpecification, ConfigurationError> {
        read_mapping_file(&self.path_for(pipeline)?)
    }
}

/// A single mapping file serving every pipeline it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingFile {
    path: PathBuf,
}

impl MappingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MappingSource for MappingFile {
    fn load(&self, _pipeline: &str) -> Result<MappingSpecification, ConfigurationError> {
        read_mapping_file(&self.path)
    }
}

/// Reads a mapping document (JSON or YAML by extension).
pub fn read_mapping_file(path: &Path) -> Result<MappingSpecification, ConfigurationError> {
    let shown = path.display().to_string();
    debug!(path = %shown, "reading rules mapping");
    let read_error = |source| ConfigurationError::ReadMapping {
        path: shown.clone(),
        source,
    };
    let format = io::resolve_document_format(None, path, "mapping").map_err(read_error)?;
    let value = reader::read_document_path(path, format, "mapping").map_err(read_error)?;
    serde_json::from_value(value).map_err(|source| ConfigurationError::InvalidMapping {
        path: shown.clone(),
        source,
    })
}
