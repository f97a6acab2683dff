//! Serializable datasource definitions.
//!
//! A configuration layer deserializes these and hands them to
//! [`ContextConfig::build`]. Rules are compiled here, at load time, so a
//! malformed rule fails before anything is drawn.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::{Context, ContextOptions};
use crate::datasource::{Datasource, EnumeratedDatasource, FileFormat, SampleFile};
use crate::error::{Error, Result};

/// One datasource as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceDefinition {
    pub name: String,
    /// Inline values. Mutually exclusive with `file`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Sample file, relative to the configuration directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Overrides the format inferred from the file extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FileFormat>,
    /// Raw generation rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,
}

impl DatasourceDefinition {
    pub fn build(&self, base_dir: &Path) -> Result<EnumeratedDatasource> {
        let datasource = match (&self.file, self.values.is_empty()) {
            (Some(_), false) => {
                return Err(Error::InvalidDefinition {
                    datasource: self.name.clone(),
                    message: "'values' and 'file' cannot both be set".to_string(),
                });
            }
            (Some(file), true) => {
                let path = base_dir.join(file);
                let format = self.format.unwrap_or_else(|| FileFormat::infer(&path));
                EnumeratedDatasource::from_file(&self.name, SampleFile::new(path, format))
            }
            (None, _) => {
                if self.format.is_some() {
                    return Err(Error::InvalidDefinition {
                        datasource: self.name.clone(),
                        message: "'format' requires 'file'".to_string(),
                    });
                }
                EnumeratedDatasource::from_values(&self.name, self.values.iter().cloned())
            }
        };
        datasource.with_rules(&self.rules)
    }
}

/// A whole context as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub options: ContextOptions,
    #[serde(default, rename = "datasource")]
    pub datasources: Vec<DatasourceDefinition>,
}

impl ContextConfig {
    pub fn build(&self, base_dir: &Path) -> Result<Context> {
        let datasources = self
            .datasources
            .iter()
            .map(|definition| {
                definition
                    .build(base_dir)
                    .map(|datasource| Box::new(datasource) as Box<dyn Datasource>)
            })
            .collect::<Result<Vec<_>>>()?;
        Context::with_options(datasources, self.options.clone())
    }
}
