use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Format of a sample file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// One value per line; lines are trimmed and blank lines skipped.
    Text,
    /// A JSON array of strings.
    Json,
}

impl FileFormat {
    /// `.json` files are JSON, everything else is plain text.
    pub fn infer(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Text,
        }
    }
}

/// A file backing an enumerated datasource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFile {
    pub path: PathBuf,
    pub format: FileFormat,
}

impl SampleFile {
    pub fn new(path: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Reads the file. `datasource` only labels errors.
    pub fn load(&self, datasource: &str) -> Result<Vec<String>> {
        match self.format {
            FileFormat::Text => read_lines(datasource, &self.path),
            FileFormat::Json => read_json_strings(datasource, &self.path),
        }
    }
}

fn read_lines(datasource: &str, path: &Path) -> Result<Vec<String>> {
    let contents = fs::read(path).map_err(|source| Error::Io {
        datasource: datasource.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    let mut values = Vec::new();
    for (index, line) in contents.split(|byte| *byte == b'\n').enumerate() {
        let line = std::str::from_utf8(line).map_err(|_| Error::InvalidLine {
            datasource: datasource.to_string(),
            path: path.to_path_buf(),
            line: index + 1,
        })?;
        let line = line.trim();
        if !line.is_empty() {
            values.push(line.to_string());
        }
    }
    Ok(values)
}

fn read_json_strings(datasource: &str, path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        datasource: datasource.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    let elements: Vec<Value> = serde_json::from_str(&contents).map_err(|source| Error::Json {
        datasource: datasource.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| match element {
            Value::String(value) => Ok(value),
            _ => Err(Error::NonStringElement {
                datasource: datasource.to_string(),
                path: path.to_path_buf(),
                index,
            }),
        })
        .collect()
}
