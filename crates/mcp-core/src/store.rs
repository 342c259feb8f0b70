//! Template and resource stores populated from directories of `.txt` files.
//!
//! Both stores walk their directory recursively in file-name order, so when
//! two files share a stem the one visited last wins deterministically.
//!
//! Loading is staged: every file of a walk is read and parsed before any
//! entry is committed. If reading a file or traversing a directory fails,
//! the load returns the error and the store keeps the entries it had before
//! the call. Loading another directory into the same store adds to (and may
//! overwrite) existing entries; it never clears them.
//!
//! # Template File Format
//!
//! ```text
//! greet                  <- line 1: name (used with NameSource::FirstLine)
//! Says hello             <- line 2: description
//! Hello {{name}}!        <- line 3..: template body
//! ```
//!
//! Files with fewer than three lines are skipped with a warning.

use crate::error::{Error, Result};
use crate::types::{PromptTemplate, Resource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

const TEXT_EXTENSION: &str = "txt";

/// Where a template takes its name from.
///
/// The default is [`NameSource::FileStem`]: `greet.txt` is registered as
/// `greet` and line 1 of the file is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// File name without extension
    #[default]
    FileStem,
    /// Trimmed first line of the file
    FirstLine,
}

/// Parses a template file.
///
/// Returns `None` when the file has fewer than three lines, or when the
/// name comes from an empty first line.
///
/// # Examples
///
/// ```
/// use mcp_insight_core::{NameSource, parse_template_file};
///
/// let content = "Greeter\nSays hello\nHello {{name}}!";
///
/// let by_stem = parse_template_file("greet", content, NameSource::FileStem).unwrap();
/// assert_eq!(by_stem.name(), "greet");
///
/// let by_line = parse_template_file("greet", content, NameSource::FirstLine).unwrap();
/// assert_eq!(by_line.name(), "Greeter");
/// assert_eq!(by_line.description(), "Says hello");
/// assert_eq!(by_line.variables(), ["name"]);
///
/// assert!(parse_template_file("short", "one\ntwo", NameSource::FileStem).is_none());
/// ```
#[must_use]
pub fn parse_template_file(
    file_stem: &str,
    content: &str,
    name_source: NameSource,
) -> Option<PromptTemplate> {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() < 3 {
        return None;
    }

    let name = match name_source {
        NameSource::FileStem => file_stem.trim(),
        NameSource::FirstLine => lines[0].trim(),
    };
    if name.is_empty() {
        return None;
    }

    Some(PromptTemplate::new(
        name,
        lines[1].trim(),
        lines[2..].join("\n"),
    ))
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TEXT_EXTENSION))
}

/// Calls `visit` with `(file_stem, path, content)` for every `.txt` file
/// under `dir`, in file-name order. Stops at the first I/O error.
fn visit_text_files(dir: &Path, mut visit: impl FnMut(&str, &Path, String)) -> Result<()> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            tracing::error!(path = %path.display(), "Error accessing path: {e}");
            Error::load(path, e.into())
        })?;

        let path = entry.path();
        if entry.file_type().is_dir() || !is_text_file(path) {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!("Skipping file with non UTF-8 name: {}", path.display());
            continue;
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            tracing::error!(file = %path.display(), "Failed to read file: {e}");
            Error::load(path, e)
        })?;

        visit(stem, path, content);
    }

    Ok(())
}

/// In-memory store of named text resources.
///
/// # Examples
///
/// ```
/// use mcp_insight_core::{Resource, ResourceStore};
///
/// let mut store = ResourceStore::new();
/// store.insert(Resource::new("model", "field docs"));
///
/// assert_eq!(store.get("model").map(|r| r.content.as_str()), Some("field docs"));
/// assert!(store.get("missing").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    resources: BTreeMap<String, Resource>,
}

impl ResourceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `.txt` file under `dir` as a resource named by its file stem.
    ///
    /// Returns the number of distinct names committed; files sharing a stem
    /// count once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoadFailed`] if the directory cannot be traversed or
    /// a file cannot be read as UTF-8. The store is left unchanged.
    pub fn load(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        tracing::debug!("Loading resources from {}", dir.display());

        let mut staged = BTreeMap::new();
        visit_text_files(dir, |stem, _, content| {
            tracing::debug!(resource = stem, size = content.len(), "Loaded resource");
            staged.insert(stem.to_string(), Resource::new(stem, content));
        })?;

        let count = staged.len();
        self.resources.extend(staged);
        Ok(count)
    }

    /// Inserts a resource, returning the one it replaced.
    pub fn insert(&mut self, resource: Resource) -> Option<Resource> {
        self.resources.insert(resource.name.clone(), resource)
    }

    /// Looks up a resource by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Iterates over resources in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if the store holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// In-memory store of prompt templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: BTreeMap<String, PromptTemplate>,
    name_source: NameSource,
}

impl TemplateStore {
    /// Creates an empty store that names templates by file stem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given naming rule.
    #[must_use]
    pub fn with_name_source(name_source: NameSource) -> Self {
        Self {
            templates: BTreeMap::new(),
            name_source,
        }
    }

    /// Naming rule used by [`TemplateStore::load`].
    #[must_use]
    pub const fn name_source(&self) -> NameSource {
        self.name_source
    }

    /// Loads every `.txt` file under `dir` as a prompt template.
    ///
    /// Malformed files are skipped with a warning. Returns the number of
    /// distinct template names committed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoadFailed`] if the directory cannot be traversed or
    /// a file cannot be read as UTF-8. The store is left unchanged.
    pub fn load(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        tracing::debug!("Loading prompts from {}", dir.display());

        let name_source = self.name_source;
        let mut staged = BTreeMap::new();
        visit_text_files(dir, |stem, path, content| {
            let Some(template) = parse_template_file(stem, &content, name_source) else {
                tracing::warn!(
                    file = %path.display(),
                    "Prompt file has invalid format (needs at least 3 lines and a name)"
                );
                return;
            };
            tracing::debug!(
                prompt = template.name(),
                vars = template.variables().len(),
                "Loaded prompt template"
            );
            staged.insert(template.name().to_string(), template);
        })?;

        let count = staged.len();
        self.templates.extend(staged);
        Ok(count)
    }

    /// Inserts a template, returning the one it replaced.
    pub fn insert(&mut self, template: PromptTemplate) -> Option<PromptTemplate> {
        self.templates.insert(template.name().to_string(), template)
    }

    /// Looks up a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    /// Iterates over templates in name order.
    pub fn iter(&self) -> impl Iterator<Item = &PromptTemplate> {
        self.templates.values()
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` if the store holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
