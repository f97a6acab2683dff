//! Named providers of candidate values.

pub mod enumerated;
pub mod source;

use std::fmt;

use crate::context::{Context, Resolver};
use crate::error::Result;

pub use enumerated::EnumeratedDatasource;
pub use source::{FileFormat, SampleFile};

/// Lazy, finite sequence of raw values.
pub type Values = Box<dyn Iterator<Item = String> + Send>;

/// A named provider of values registered in a [`Context`].
pub trait Datasource: fmt::Debug + Send + Sync {
    /// Name, unique within a context.
    fn name(&self) -> &str;

    /// Draws one value, executing generation rules when the datasource has any.
    fn random(&self, resolver: &mut Resolver<'_>) -> Result<String>;

    /// Walks every raw value. Calling again restarts the walk.
    fn iterate(&self, context: &Context) -> Result<Values>;

    /// Downcast used by self-references, which need direct list access.
    fn as_enumerated(&self) -> Option<&EnumeratedDatasource> {
        None
    }
}
