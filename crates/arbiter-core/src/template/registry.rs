//! The fixed map from template id to its implementation.

use std::collections::HashMap;
use std::sync::Arc;

use super::chess::ChessTemplate;
use super::rps::RpsTemplate;
use super::Template;
use crate::error::ArbiterError;

/// An immutable lookup table from `template_id` to the template that
/// implements it.
///
/// Built once at startup via [`TemplateRegistry::with_defaults`] (or
/// assembled by hand with [`TemplateRegistry::builder`] for tests that want
/// a narrower set); never mutated afterwards. Mirrors how the teacher crate
/// wires its oracle implementations into the runtime at construction time
/// rather than resolving them dynamically per call.
#[derive(Clone)]
pub struct TemplateRegistry {
    templates: HashMap<&'static str, Arc<dyn Template>>,
}

impl TemplateRegistry {
    /// An empty registry; templates are added with [`TemplateRegistry::register`].
    pub fn builder() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// The registry populated with every template this crate ships.
    pub fn with_defaults() -> Self {
        let mut registry = Self::builder();
        registry.register(Arc::new(RpsTemplate));
        registry.register(Arc::new(ChessTemplate));
        registry
    }

    pub fn register(&mut self, template: Arc<dyn Template>) {
        self.templates.insert(template.template_id(), template);
    }

    pub fn get(&self, template_id: &str) -> Result<Arc<dyn Template>, ArbiterError> {
        self.templates
            .get(template_id)
            .cloned()
            .ok_or_else(|| ArbiterError::UnknownTemplate(template_id.to_string()))
    }

    pub fn template_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.keys().copied()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_both_shipped_templates() {
        let registry = TemplateRegistry::with_defaults();
        assert!(registry.get("rps.v1").is_ok());
        assert!(registry.get("chess.v1").is_ok());
    }

    #[test]
    fn unknown_template_is_an_error() {
        let registry = TemplateRegistry::with_defaults();
        assert!(registry.get("go.v1").is_err());
    }
}
