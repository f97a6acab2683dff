use rand::Rng;
use tracing::trace;

use crate::context::Resolver;
use crate::datasource::Datasource;
use crate::error::{Error, Result};

/// Where a token was compiled from. Used for error messages only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Name of the datasource owning the expression.
    pub datasource: String,
    /// Position of the expression in the datasource's rule list.
    pub expression: usize,
    /// Character offset of the token in the raw rule string.
    pub offset: usize,
}

/// Compiled instruction variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal fragment, emitted as-is.
    Text(String),
    /// Inclusive integer range; `min <= max` always holds.
    Range { min: i64, max: i64 },
    /// Late-bound pointer to another datasource, by name.
    Reference(String),
}

/// One compiled instruction inside an [`Expression`](super::Expression).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    location: Location,
}

impl Token {
    pub fn text(value: impl Into<String>, location: Location) -> Self {
        Self {
            kind: TokenKind::Text(value.into()),
            location,
        }
    }

    /// Builds a range token, swapping out-of-order bounds.
    pub fn range(min: i64, max: i64, location: Location) -> Self {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        Self {
            kind: TokenKind::Range { min, max },
            location,
        }
    }

    pub fn reference(target: impl Into<String>, location: Location) -> Self {
        Self {
            kind: TokenKind::Reference(target.into()),
            location,
        }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Produces this token's string for one execution.
    pub fn execute(&self, resolver: &mut Resolver<'_>) -> Result<String> {
        match &self.kind {
            TokenKind::Text(value) => Ok(value.clone()),
            TokenKind::Range { min, max } => {
                Ok(resolver.rng().random_range(*min..=*max).to_string())
            }
            TokenKind::Reference(target) => self.resolve_reference(target, resolver),
        }
    }

    fn resolve_reference(&self, target: &str, resolver: &mut Resolver<'_>) -> Result<String> {
        let context = resolver.context();
        let datasource = context
            .get(target)
            .map_err(|err| self.resolution_error(err.to_string()))?;

        if target == self.location.datasource {
            return self.draw_from_self(datasource, resolver);
        }

        if resolver.at_depth_limit() {
            return Err(Error::RecursionLimit {
                datasource: self.location.datasource.clone(),
                expression: self.location.expression,
                offset: self.location.offset,
                target: target.to_string(),
                limit: context.options().max_depth,
            });
        }

        trace!(
            datasource = %self.location.datasource,
            target = %target,
            depth = resolver.depth(),
            "resolving reference"
        );
        match resolver.descend(datasource) {
            Err(Error::EmptyDatasource { datasource }) if datasource == target => Err(self
                .resolution_error(format!(
                    "referenced datasource '{target}' has no values to draw from"
                ))),
            result => result,
        }
    }

    // A self-reference never goes through `random()`: the owner's own rules
    // would recurse forever, so it samples the raw list instead.
    fn draw_from_self(
        &self,
        datasource: &dyn Datasource,
        resolver: &mut Resolver<'_>,
    ) -> Result<String> {
        let Some(enumerated) = datasource.as_enumerated() else {
            return Err(self.resolution_error(format!(
                "self reference to '{}' requires an enumerated datasource",
                self.location.datasource
            )));
        };
        if enumerated.count()? == 0 {
            return Err(self.resolution_error(format!(
                "self reference to '{}' requires a non-empty value list",
                self.location.datasource
            )));
        }
        enumerated.raw_random(resolver.rng())
    }

    fn resolution_error(&self, message: String) -> Error {
        Error::Resolution {
            datasource: self.location.datasource.clone(),
            expression: self.location.expression,
            offset: self.location.offset,
            message,
        }
    }
}
