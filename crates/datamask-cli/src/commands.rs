use std::fmt;

use datamask_core::{Context, TokenKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::CliError;

/// Per-datasource line of the `check` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceSummary {
    pub name: String,
    pub values: usize,
    pub rules: usize,
}

impl fmt::Display for DatasourceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\tvalues={}\trules={}", self.name, self.values, self.rules)
    }
}

/// A reference whose target is not registered in the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub datasource: String,
    pub expression: usize,
    pub offset: usize,
    pub target: String,
}

/// Draws `count` values from `name` with a generator seeded from `seed`.
pub fn draw_values(
    context: &Context,
    name: &str,
    count: usize,
    seed: u64,
) -> Result<Vec<String>, CliError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| context.random(name, &mut rng).map_err(CliError::from))
        .collect()
}

/// Materializes every datasource, in name order.
pub fn summarize(context: &Context) -> Result<Vec<DatasourceSummary>, CliError> {
    context
        .names()
        .into_iter()
        .map(|name| {
            let datasource = context.get(name)?;
            let values = datasource.iterate(context)?.count();
            let rules = datasource
                .as_enumerated()
                .map(|enumerated| enumerated.rules().len())
                .unwrap_or(0);
            Ok(DatasourceSummary {
                name: name.to_string(),
                values,
                rules,
            })
        })
        .collect()
}

pub fn dangling_references(context: &Context) -> Vec<DanglingReference> {
    let mut dangling = Vec::new();
    for name in context.names() {
        let Some(enumerated) = context
            .get(name)
            .ok()
            .and_then(|datasource| datasource.as_enumerated())
        else {
            continue;
        };
        for rule in enumerated.rules() {
            for token in rule.tokens() {
                if let TokenKind::Reference(target) = token.kind()
                    && !context.has(target)
                {
                    dangling.push(DanglingReference {
                        datasource: name.to_string(),
                        expression: rule.index(),
                        offset: token.location().offset,
                        target: target.clone(),
                    });
                }
            }
        }
    }
    dangling
}
