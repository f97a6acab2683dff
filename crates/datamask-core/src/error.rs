use std::path::PathBuf;

use thiserror::Error;

/// Error type shared by the tokenizer, datasources and context.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed range or reference syntax in a generation rule.
    #[error(
        "datasource '{datasource}', expression #{expression}, offset {offset}: parse error: {message}"
    )]
    Parse {
        datasource: String,
        expression: usize,
        offset: usize,
        message: String,
    },
    /// The context has no datasource registered under this name.
    #[error("datasource '{name}' does not exist")]
    UnknownDatasource { name: String },
    /// A reference token could not be resolved at execution time.
    #[error(
        "datasource '{datasource}', expression #{expression}, offset {offset}: resolution error: {message}"
    )]
    Resolution {
        datasource: String,
        expression: usize,
        offset: usize,
        message: String,
    },
    /// The backing file could not be read.
    #[error("datasource '{datasource}': cannot read '{}': {source}", .path.display())]
    Io {
        datasource: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The backing file is not a valid JSON array of strings.
    #[error("datasource '{datasource}': invalid json in '{}': {source}", .path.display())]
    Json {
        datasource: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A JSON sample array holds something other than a string.
    #[error(
        "datasource '{datasource}': element {index} of '{}' is not a string",
        .path.display()
    )]
    NonStringElement {
        datasource: String,
        path: PathBuf,
        index: usize,
    },
    /// A plain-text sample line is not valid UTF-8.
    #[error("datasource '{datasource}': line {line} of '{}' is not valid utf-8", .path.display())]
    InvalidLine {
        datasource: String,
        path: PathBuf,
        line: usize,
    },
    /// A draw was requested from a datasource without samples.
    #[error("datasource '{datasource}' has no values to draw from")]
    EmptyDatasource { datasource: String },
    /// Following a reference would nest draws deeper than the configured bound.
    #[error(
        "datasource '{datasource}', expression #{expression}, offset {offset}: reference to '{target}' exceeds depth limit of {limit} (reference cycle?)"
    )]
    RecursionLimit {
        datasource: String,
        expression: usize,
        offset: usize,
        target: String,
        limit: usize,
    },
    /// A datasource definition or context registration is invalid.
    #[error("datasource '{datasource}': invalid definition: {message}")]
    InvalidDefinition { datasource: String, message: String },
    /// Context options are out of range.
    #[error("invalid context options: {0}")]
    InvalidOptions(String),
}

/// Convenience alias for results returned by datamask crates.
pub type Result<T> = std::result::Result<T, Error>;
