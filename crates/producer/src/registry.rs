//! Producer factory registry: by-name lookup.
//!
//! The shell registers one factory per producer kind at startup
//! (`"file"`, `"scene"`, ...) and resolves control-protocol commands
//! through [`create`](ProducerRegistry::create). The core ships factories
//! for its own producers only.

use std::collections::HashMap;

use tracing::info;

use fc_common::{FormatDesc, ProducerError};

use crate::color::ColorProducer;
use crate::empty::EmptyProducer;
use crate::producer::BoxedProducer;

/// A producer factory: builds a producer for a channel format from an
/// already-tokenized parameter list.
pub type ProducerFactoryFn =
    Box<dyn Fn(&FormatDesc, &[String]) -> Result<BoxedProducer, ProducerError> + Send + Sync>;

/// Registry holding producer factories for lookup by short name.
pub struct ProducerRegistry {
    factories: HashMap<String, ProducerFactoryFn>,
}

impl ProducerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with the in-core producers registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("empty", |format, _params| {
            Ok(EmptyProducer::boxed(format.clone()))
        });
        registry.register("color", |format, params| {
            let spec = params.first().ok_or_else(|| {
                ProducerError::invalid_argument("color producer requires a color parameter")
            })?;
            Ok(Box::new(ColorProducer::new(format.clone(), spec)?))
        });

        info!(count = registry.len(), "Registered built-in producers");

        registry
    }

    /// Register a factory. Overwrites any previous factory with the same name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&FormatDesc, &[String]) -> Result<BoxedProducer, ProducerError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Try to register a factory, failing if the name is taken.
    pub fn try_register<F>(&mut self, name: &str, factory: F) -> Result<(), ProducerError>
    where
        F: Fn(&FormatDesc, &[String]) -> Result<BoxedProducer, ProducerError>
            + Send
            + Sync
            + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(ProducerError::AlreadyRegistered {
                name: name.to_string(),
            });
        }
        self.register(name, factory);
        Ok(())
    }

    /// Build a producer by factory name.
    pub fn create(
        &self,
        name: &str,
        format: &FormatDesc,
        params: &[String],
    ) -> Result<BoxedProducer, ProducerError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ProducerError::UnknownProducer {
                name: name.to_string(),
            })?;
        factory(format, params)
    }

    /// Registered factory names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for ProducerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
