//! Two-phase template rendering.
//!
//! Phase one replaces every `{{@name}}` embed with the content of the named
//! resource. It searches for embed markers directly, so an embed is found
//! even when it follows an unclosed `{{`. Phase two replaces every
//! `{{name}}` variable the caller supplied. Each phase is one forward pass
//! into a fresh buffer, so text spliced in by a phase is never scanned again
//! by that phase: resources cannot embed other resources, and variable
//! values are inserted verbatim. Variables that appear inside embedded
//! resource text are substituted by phase two like any other.
//!
//! A render succeeds only if no declared variable placeholder is left in the
//! output, including placeholders that arrived inside a supplied value.

use crate::error::{Error, Result};
use crate::placeholder::{CLOSE, EMBED_PREFIX, OPEN, Segment, segments};
use crate::store::ResourceStore;
use crate::types::PromptTemplate;
use std::collections::{HashMap, HashSet};

/// Text spliced in place of an embed placeholder with an empty name.
pub const INVALID_EMBED_MARKER: &str = "[Invalid resource syntax]";

/// Text spliced in place of an embed whose resource is not loaded.
///
/// # Examples
///
/// ```
/// use mcp_insight_core::missing_resource_marker;
///
/// assert_eq!(missing_resource_marker("model"), "[Resource 'model' not found]");
/// ```
#[must_use]
pub fn missing_resource_marker(name: &str) -> String {
    format!("[Resource '{name}' not found]")
}

/// Resolves resource embeds.
///
/// Embed misses are not errors; they leave a visible marker in the output.
/// An embed marker with no closing `}}` ends the scan and the rest of the
/// body is copied verbatim.
fn resolve_embeds(template: &PromptTemplate, resources: &ResourceStore) -> String {
    let body = template.template();
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(marker) = after_open.trim_start().strip_prefix(EMBED_PREFIX) else {
            // Not an embed: keep one brace and look again from the next one
            out.push_str(&rest[..=start]);
            rest = &rest[start + 1..];
            continue;
        };
        let Some(end) = marker.find(CLOSE) else {
            break;
        };

        out.push_str(&rest[..start]);
        let name = marker[..end].trim();
        if name.is_empty() {
            out.push_str(INVALID_EMBED_MARKER);
        } else if let Some(resource) = resources.get(name) {
            out.push_str(&resource.content);
            tracing::debug!(
                prompt = template.name(),
                resource = name,
                "Embedded resource into prompt"
            );
        } else {
            out.push_str(&missing_resource_marker(name));
            tracing::warn!(
                prompt = template.name(),
                resource = name,
                "Resource not found for embedding"
            );
        }
        rest = &marker[end + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// Substitutes caller variables into `text`.
///
/// Returns the substituted text and the names of variable placeholders that
/// had no value and were kept verbatim.
fn substitute_variables<'t>(
    text: &'t str,
    vars: &HashMap<String, String>,
) -> (String, HashSet<&'t str>) {
    let mut out = String::with_capacity(text.len());
    let mut unresolved = HashSet::new();

    for segment in segments(text) {
        match segment {
            Segment::Variable { name, raw } => match vars.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    unresolved.insert(name);
                    out.push_str(raw);
                }
            },
            other => out.push_str(other.raw()),
        }
    }

    (out, unresolved)
}

/// Names of the variable placeholders present in `text`.
fn remaining_variables(text: &str) -> HashSet<&str> {
    segments(text)
        .filter_map(|segment| match segment {
            Segment::Variable { name, .. } => Some(name),
            _ => None,
        })
        .collect()
}

/// Renders `template` against `resources` and caller `vars`.
///
/// Extra entries in `vars` that the template does not declare are ignored.
///
/// # Errors
///
/// Returns [`Error::MissingVariable`] naming the first declared variable
/// (in declaration order) whose placeholder is still present in the output,
/// whether it was never supplied or a supplied value reintroduced it.
pub(crate) fn render(
    template: &PromptTemplate,
    resources: &ResourceStore,
    vars: &HashMap<String, String>,
) -> Result<String> {
    let embedded = resolve_embeds(template, resources);
    let (rendered, unresolved) = substitute_variables(&embedded, vars);

    let missing = {
        let remaining = remaining_variables(&rendered);
        template
            .variables()
            .iter()
            .find(|v| unresolved.contains(v.as_str()) || remaining.contains(v.as_str()))
            .cloned()
    };

    if let Some(variable) = missing {
        return Err(Error::MissingVariable {
            variable,
            template: template.name().to_string(),
        });
    }

    Ok(rendered)
}
