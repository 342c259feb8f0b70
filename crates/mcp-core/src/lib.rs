//! Core registry and template engine for the MCP insight server.
//!
//! This crate loads prompt templates and text resources from directories,
//! resolves placeholders inside templates, and tracks which variables each
//! template requires.
//!
//! # Architecture
//!
//! The core consists of:
//! - A placeholder lexer shared by the scanner and the renderer
//! - Template and resource stores populated from `.txt` files
//! - A two-phase renderer (resource embeds first, then caller variables)
//! - An immutable [`Registry`] built once through [`RegistryBuilder`]
//!
//! # Placeholder Syntax
//!
//! - `{{name}}` is replaced with a caller-supplied value
//! - `{{@name}}` is replaced with the content of resource `name`
//!
//! # Examples
//!
//! ```
//! use mcp_insight_core::{PromptTemplate, Registry, Resource};
//! use std::collections::HashMap;
//!
//! let mut builder = Registry::builder();
//! builder.insert_resource(Resource::new("model", "field docs"));
//! builder.insert_template(PromptTemplate::new(
//!     "greet",
//!     "Says hello",
//!     "Hello {{name}}! {{@model}}",
//! ));
//! let registry = builder.build();
//!
//! let vars = HashMap::from([("name".to_string(), "World".to_string())]);
//! let text = registry.render("greet", &vars).unwrap();
//! assert_eq!(text, "Hello World! field docs");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;
mod placeholder;
mod registry;
mod render;
mod store;
mod types;

pub use error::{Error, Result};
pub use placeholder::{Segment, Segments, extract_variables, segments};
pub use registry::{PromptDescriptor, Registry, RegistryBuilder};
pub use render::{INVALID_EMBED_MARKER, missing_resource_marker};
pub use store::{NameSource, ResourceStore, TemplateStore, parse_template_file};
pub use types::{PromptTemplate, Resource};
