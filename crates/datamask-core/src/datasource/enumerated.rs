use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use rand::{Rng, RngCore};
use tracing::info;

use crate::context::{Context, Resolver};
use crate::datasource::source::{FileFormat, SampleFile};
use crate::datasource::{Datasource, Values};
use crate::error::{Error, Result};
use crate::expression::Expression;

#[derive(Debug)]
enum Materialized {
    NotLoaded,
    Loaded(Arc<[String]>),
}

/// A datasource backed by a list of values, optionally with generation rules.
///
/// File-backed lists are read on first access and cached. The write lock is
/// held while loading, so concurrent first accesses read the file once.
#[derive(Debug)]
pub struct EnumeratedDatasource {
    name: String,
    file: Option<SampleFile>,
    samples: RwLock<Materialized>,
    rules: Vec<Expression>,
}

impl EnumeratedDatasource {
    pub fn from_values<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        Self {
            name: name.into(),
            file: None,
            samples: RwLock::new(Materialized::Loaded(values.into())),
            rules: Vec::new(),
        }
    }

    /// Plain-text file, one value per line. Nothing is read until first use.
    pub fn from_text_file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::from_file(name, SampleFile::new(path, FileFormat::Text))
    }

    /// JSON array of strings. Nothing is read until first use.
    pub fn from_json_file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::from_file(name, SampleFile::new(path, FileFormat::Json))
    }

    pub fn from_file(name: impl Into<String>, file: SampleFile) -> Self {
        Self {
            name: name.into(),
            file: Some(file),
            samples: RwLock::new(Materialized::NotLoaded),
            rules: Vec::new(),
        }
    }

    /// Compiles `rules` and attaches them. Any parse error aborts the whole set.
    pub fn with_rules<I, S>(mut self, rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Expression::compile(raw.as_ref(), &self.name, index))
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    pub fn rules(&self) -> &[Expression] {
        &self.rules
    }

    pub fn file(&self) -> Option<&SampleFile> {
        self.file.as_ref()
    }

    /// Number of raw values, materializing them if needed.
    pub fn count(&self) -> Result<usize> {
        Ok(self.samples()?.len())
    }

    /// Raw value at `index`, in source order.
    pub fn raw_at(&self, index: usize) -> Result<Option<String>> {
        Ok(self.samples()?.get(index).cloned())
    }

    /// Uniform draw from the raw list, ignoring generation rules.
    pub fn raw_random(&self, rng: &mut dyn RngCore) -> Result<String> {
        let samples = self.samples()?;
        if samples.is_empty() {
            return Err(Error::EmptyDatasource {
                datasource: self.name.clone(),
            });
        }
        let index = rng.random_range(0..samples.len());
        Ok(samples[index].clone())
    }

    fn samples(&self) -> Result<Arc<[String]>> {
        if let Materialized::Loaded(values) =
            &*self.samples.read().unwrap_or_else(PoisonError::into_inner)
        {
            return Ok(Arc::clone(values));
        }

        let mut state = self.samples.write().unwrap_or_else(PoisonError::into_inner);
        if let Materialized::Loaded(values) = &*state {
            return Ok(Arc::clone(values));
        }

        let values: Arc<[String]> = match &self.file {
            Some(file) => {
                let values: Arc<[String]> = file.load(&self.name)?.into();
                info!(
                    datasource = %self.name,
                    path = %file.path.display(),
                    count = values.len(),
                    "datasource materialized"
                );
                values
            }
            None => Arc::from(Vec::new()),
        };
        *state = Materialized::Loaded(Arc::clone(&values));
        Ok(values)
    }
}

impl Datasource for EnumeratedDatasource {
    fn name(&self) -> &str {
        &self.name
    }

    fn random(&self, resolver: &mut Resolver<'_>) -> Result<String> {
        if self.rules.is_empty() {
            return self.raw_random(resolver.rng());
        }
        let index = resolver.rng().random_range(0..self.rules.len());
        self.rules[index].execute(resolver)
    }

    fn iterate(&self, _context: &Context) -> Result<Values> {
        let samples = self.samples()?;
        Ok(Box::new(
            (0..samples.len()).map(move |index| samples[index].clone()),
        ))
    }

    fn as_enumerated(&self) -> Option<&EnumeratedDatasource> {
        Some(self)
    }
}
