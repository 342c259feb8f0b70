//! The prompt and resource registry.
//!
//! A registry is assembled once through [`RegistryBuilder`] and then frozen
//! with [`RegistryBuilder::build`]. The frozen [`Registry`] exposes only
//! read and render operations, so it can be shared behind an `Arc` by any
//! number of concurrent request handlers without locking.

use crate::error::{Error, Result};
use crate::render;
use crate::store::{NameSource, ResourceStore, TemplateStore};
use crate::types::{PromptTemplate, Resource};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Prompt listing entry for transports that describe prompts separately
/// from tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptDescriptor {
    /// Template name
    pub name: String,

    /// Template description
    pub description: String,

    /// Required variable names, in first-occurrence order
    pub arguments: Vec<String>,
}

/// Mutable loading phase of a [`Registry`].
///
/// # Examples
///
/// ```no_run
/// use mcp_insight_core::{NameSource, Registry};
///
/// # fn example() -> mcp_insight_core::Result<()> {
/// let mut builder = Registry::builder().name_source(NameSource::FileStem);
/// builder.load_resources("static/insights")?;
/// builder.load_templates("static/prompts")?;
/// let registry = builder.build();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    templates: TemplateStore,
    resources: ResourceStore,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how templates loaded afterwards are named.
    ///
    /// Templates already in the builder keep their names.
    #[must_use]
    pub fn name_source(mut self, name_source: NameSource) -> Self {
        let mut templates = TemplateStore::with_name_source(name_source);
        for template in self.templates.iter() {
            templates.insert(template.clone());
        }
        self.templates = templates;
        self
    }

    /// Loads prompt templates from `dir`. See [`TemplateStore::load`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoadFailed`] on I/O failure; no template from this
    /// call is kept.
    pub fn load_templates(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        self.templates.load(dir)
    }

    /// Loads text resources from `dir`. See [`ResourceStore::load`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoadFailed`] on I/O failure; no resource from this
    /// call is kept.
    pub fn load_resources(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        self.resources.load(dir)
    }

    /// Registers a template directly.
    pub fn insert_template(&mut self, template: PromptTemplate) -> &mut Self {
        tracing::debug!(prompt = template.name(), "Registered prompt");
        self.templates.insert(template);
        self
    }

    /// Registers a resource directly.
    pub fn insert_resource(&mut self, resource: Resource) -> &mut Self {
        self.resources.insert(resource);
        self
    }

    /// Freezes the builder into a read-only registry.
    #[must_use]
    pub fn build(self) -> Registry {
        tracing::info!(
            prompts = self.templates.len(),
            resources = self.resources.len(),
            "Registry ready"
        );
        Registry {
            templates: self.templates,
            resources: self.resources,
        }
    }
}

/// Read-only registry of prompt templates and resources.
///
/// # Examples
///
/// ```
/// use mcp_insight_core::{PromptTemplate, Registry};
/// use std::collections::HashMap;
///
/// let mut builder = Registry::builder();
/// builder.insert_template(PromptTemplate::new("greet", "Says hello", "Hello {{name}}!"));
/// let registry = builder.build();
///
/// let vars = HashMap::from([("name".to_string(), "World".to_string())]);
/// assert_eq!(registry.render("greet", &vars).unwrap(), "Hello World!");
///
/// let err = registry.render("greet", &HashMap::new()).unwrap_err();
/// assert!(err.is_missing_variable());
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    templates: TemplateStore,
    resources: ResourceStore,
}

impl Registry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up a template by name.
    #[must_use]
    pub fn get_template(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    /// Looks up a resource by name.
    #[must_use]
    pub fn get_resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// All templates, in name order.
    pub fn templates(&self) -> impl Iterator<Item = &PromptTemplate> {
        self.templates.iter()
    }

    /// All resources, in name order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Number of registered templates.
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Number of registered resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Describes every template for prompt listings.
    #[must_use]
    pub fn prompt_descriptors(&self) -> Vec<PromptDescriptor> {
        self.templates
            .iter()
            .map(|t| PromptDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
                arguments: t.variables().to_vec(),
            })
            .collect()
    }

    /// Renders the named template.
    ///
    /// Resource embeds are resolved first, then caller variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] for an unknown name and
    /// [`Error::MissingVariable`] when a declared variable placeholder is
    /// still present after substitution.
    pub fn render(&self, name: &str, vars: &HashMap<String, String>) -> Result<String> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| Error::TemplateNotFound {
                name: name.to_string(),
            })?;
        self.render_template(template, vars)
    }

    /// Renders a template that is not necessarily registered, using this
    /// registry's resources for embeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingVariable`] when a declared variable placeholder
    /// is still present after substitution.
    pub fn render_template(
        &self,
        template: &PromptTemplate,
        vars: &HashMap<String, String>,
    ) -> Result<String> {
        render::render(template, &self.resources, vars)
    }
}
