//! Domain types held by the registry.

use crate::placeholder::extract_variables;
use serde::Serialize;

/// A named block of reference text that templates can embed.
///
/// # Examples
///
/// ```
/// use mcp_insight_core::Resource;
///
/// let resource = Resource::new("model", "field docs");
/// assert_eq!(resource.name, "model");
/// assert_eq!(resource.content, "field docs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Resource name (file stem of the source file)
    pub name: String,

    /// Full text content
    pub content: String,
}

impl Resource {
    /// Creates a resource.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A prompt template together with the variables it requires.
///
/// `variables` is always derived from `template`, so the two can never
/// disagree. Fields are read-only from outside the crate.
///
/// # Examples
///
/// ```
/// use mcp_insight_core::PromptTemplate;
///
/// let template = PromptTemplate::new(
///     "review",
///     "Review code",
///     "Review {{code}} using {{@style}} for {{audience}} ({{code}})",
/// );
/// assert_eq!(template.variables(), ["code", "audience"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptTemplate {
    name: String,
    description: String,
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Creates a template and scans its body for declared variables.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            name: name.into(),
            description: description.into(),
            template,
            variables,
        }
    }

    /// Template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Raw template body.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Declared variables in first-occurrence order.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_variables_derived_from_body() {
        let template = PromptTemplate::new("t", "d", "{{b}}{{a}}{{b}}");
        assert_eq!(template.variables(), ["b", "a"]);
        assert_eq!(template.name(), "t");
        assert_eq!(template.description(), "d");
        assert_eq!(template.template(), "{{b}}{{a}}{{b}}");
    }

    #[test]
    fn test_template_without_placeholders() {
        let template = PromptTemplate::new("plain", "No vars", "Just text");
        assert!(template.variables().is_empty());
    }

    #[test]
    fn test_embeds_are_not_variables() {
        let template = PromptTemplate::new("t", "d", "{{@docs}} {{ question }}");
        assert_eq!(template.variables(), ["question"]);
    }
}
