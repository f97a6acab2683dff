//! Compiled generation rules.

pub mod token;
pub mod tokenizer;

use tracing::debug;

use crate::context::Resolver;
use crate::error::Result;

pub use token::{Location, Token, TokenKind};
pub use tokenizer::tokenize;

/// An immutable token sequence compiled once from a raw rule string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    raw: String,
    owner: String,
    index: usize,
    tokens: Vec<Token>,
}

impl Expression {
    /// Compiles `raw` for the datasource `owner`, where `index` is the rule's
    /// position in that datasource's rule list.
    pub fn compile(raw: impl Into<String>, owner: &str, index: usize) -> Result<Self> {
        let raw = raw.into();
        let tokens = tokenize(&raw, owner, index)?;
        debug!(
            datasource = %owner,
            expression = index,
            tokens = tokens.len(),
            "expression compiled"
        );
        Ok(Self {
            raw,
            owner: owner.to_string(),
            index,
            tokens,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Executes every token in order and concatenates the results.
    pub fn execute(&self, resolver: &mut Resolver<'_>) -> Result<String> {
        let mut output = String::new();
        for token in &self.tokens {
            output.push_str(&token.execute(resolver)?);
        }
        Ok(output)
    }
}
