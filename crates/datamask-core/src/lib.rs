//! Synthetic value engine for datamask.
//!
//! Datasources are named pools of candidate values. A datasource may carry
//! generation rules written in a small pattern language (`[min,max]` ranges,
//! `{{name}}` references to other datasources, literal text); rules are
//! compiled once into [`Expression`]s and executed against a [`Context`].

pub mod context;
pub mod datasource;
pub mod definition;
pub mod error;
pub mod expression;

pub use context::{Context, ContextOptions, Resolver};
pub use datasource::{Datasource, EnumeratedDatasource, FileFormat, SampleFile, Values};
pub use definition::{ContextConfig, DatasourceDefinition};
pub use error::{Error, Result};
pub use expression::{Expression, Location, Token, TokenKind};
