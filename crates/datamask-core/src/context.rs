use std::collections::HashMap;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::datasource::{Datasource, Values};
use crate::error::{Error, Result};

/// Options for a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextOptions {
    /// Maximum number of nested datasource draws in one execution, at least 1.
    /// Reference cycles across datasources fail once this is exceeded.
    pub max_depth: usize,
    /// Reject duplicate datasource names instead of keeping the last one.
    pub unique_names: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            unique_names: false,
        }
    }
}

/// Registry of datasources by name, immutable once built.
#[derive(Debug)]
pub struct Context {
    datasources: HashMap<String, Box<dyn Datasource>>,
    options: ContextOptions,
}

impl Context {
    pub fn new<I>(datasources: I) -> Result<Self>
    where
        I: IntoIterator<Item = Box<dyn Datasource>>,
    {
        Self::with_options(datasources, ContextOptions::default())
    }

    /// Builds the registry. Any invalid entry fails the whole context.
    pub fn with_options<I>(datasources: I, options: ContextOptions) -> Result<Self>
    where
        I: IntoIterator<Item = Box<dyn Datasource>>,
    {
        if options.max_depth == 0 {
            return Err(Error::InvalidOptions(
                "max_depth must be at least 1".to_string(),
            ));
        }

        let mut registry: HashMap<String, Box<dyn Datasource>> = HashMap::new();
        for datasource in datasources {
            let name = datasource.name().to_string();
            if name.trim().is_empty() {
                return Err(Error::InvalidDefinition {
                    datasource: name,
                    message: "datasource name must not be empty".to_string(),
                });
            }
            if registry.contains_key(&name) {
                if options.unique_names {
                    return Err(Error::InvalidDefinition {
                        datasource: name,
                        message: "datasource is defined more than once".to_string(),
                    });
                }
                warn!(datasource = %name, "duplicate datasource replaces earlier definition");
            }
            registry.insert(name, datasource);
        }

        Ok(Self {
            datasources: registry,
            options,
        })
    }

    pub fn get(&self, name: &str) -> Result<&dyn Datasource> {
        self.datasources
            .get(name)
            .map(|datasource| datasource.as_ref())
            .ok_or_else(|| Error::UnknownDatasource {
                name: name.to_string(),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.datasources.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.datasources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.datasources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasources.is_empty()
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    pub fn resolver<'a>(&'a self, rng: &'a mut dyn RngCore) -> Resolver<'a> {
        Resolver {
            context: self,
            rng,
            depth: 0,
        }
    }

    /// Draws one value from the datasource `name`.
    pub fn random(&self, name: &str, rng: &mut dyn RngCore) -> Result<String> {
        let datasource = self.get(name)?;
        self.resolver(rng).descend(datasource)
    }

    /// Same as [`Context::random`] with the thread-local generator.
    pub fn sample(&self, name: &str) -> Result<String> {
        let mut rng = rand::rng();
        self.random(name, &mut rng)
    }

    /// Walks the raw values of the datasource `name`.
    pub fn iterate(&self, name: &str) -> Result<Values> {
        self.get(name)?.iterate(self)
    }
}

/// Execution state threaded through one draw: the context, the random
/// source and the current reference depth.
pub struct Resolver<'a> {
    context: &'a Context,
    rng: &'a mut dyn RngCore,
    depth: usize,
}

impl<'a> Resolver<'a> {
    pub fn context(&self) -> &'a Context {
        self.context
    }

    pub fn rng(&mut self) -> &mut (dyn RngCore + 'a) {
        &mut *self.rng
    }

    /// Number of datasource draws currently on the stack.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether another nested draw would exceed `ContextOptions::max_depth`.
    pub fn at_depth_limit(&self) -> bool {
        self.depth >= self.context.options.max_depth
    }

    /// Draws from `datasource` one level deeper. Callers check
    /// [`Resolver::at_depth_limit`] first so the error can name their location.
    pub(crate) fn descend(&mut self, datasource: &dyn Datasource) -> Result<String> {
        self.depth += 1;
        let result = datasource.random(self);
        self.depth -= 1;
        result
    }
}
