//! Error types for the insight registry.
//!
//! Only load failures and render failures are errors. A resource embed that
//! points at an unknown resource is not an error: the renderer splices a
//! visible diagnostic into the output instead. Template files with fewer
//! than three lines are skipped with a warning.
//!
//! # Examples
//!
//! ```
//! use mcp_insight_core::{Error, Registry};
//! use std::collections::HashMap;
//!
//! let registry = Registry::builder().build();
//! let err = registry.render("missing", &HashMap::new()).unwrap_err();
//! assert!(err.is_not_found());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for registry loading and rendering.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading a file or traversing a directory failed.
    ///
    /// Aborts the load call that encountered it. Entries staged by that
    /// call are discarded.
    #[error("failed to load '{}': {source}", path.display())]
    LoadFailed {
        /// Path of the file or directory that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Render was requested for a template name that is not registered.
    #[error("prompt '{name}' not found")]
    TemplateNotFound {
        /// Requested template name
        name: String,
    },

    /// A declared template variable was not supplied by the caller.
    #[error("variable '{variable}' not provided for prompt '{template}'")]
    MissingVariable {
        /// The first declared variable still present after substitution
        variable: String,
        /// Template being rendered
        template: String,
    },
}

impl Error {
    /// Returns `true` if this is a load error.
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_insight_core::Error;
    /// use std::io;
    ///
    /// let err = Error::LoadFailed {
    ///     path: "static/prompts".into(),
    ///     source: io::Error::from(io::ErrorKind::NotFound),
    /// };
    /// assert!(err.is_load_error());
    /// ```
    #[must_use]
    pub const fn is_load_error(&self) -> bool {
        matches!(self, Self::LoadFailed { .. })
    }

    /// Returns `true` if the requested template does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::TemplateNotFound { .. })
    }

    /// Returns `true` if a declared variable was not supplied.
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_insight_core::Error;
    ///
    /// let err = Error::MissingVariable {
    ///     variable: "name".to_string(),
    ///     template: "greet".to_string(),
    /// };
    /// assert!(err.is_missing_variable());
    /// assert_eq!(err.to_string(), "variable 'name' not provided for prompt 'greet'");
    /// ```
    #[must_use]
    pub const fn is_missing_variable(&self) -> bool {
        matches!(self, Self::MissingVariable { .. })
    }

    pub(crate) fn load(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LoadFailed {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_load_error_detection() {
        let err = Error::load("prompts/a.txt", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(err.is_load_error());
        assert!(!err.is_not_found());
        assert!(!err.is_missing_variable());
    }

    #[test]
    fn test_not_found_error_detection() {
        let err = Error::TemplateNotFound {
            name: "ghost".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_load_error());
    }

    #[test]
    fn test_error_display() {
        let err = Error::TemplateNotFound {
            name: "ghost".to_string(),
        };
        assert_eq!(format!("{err}"), "prompt 'ghost' not found");

        let err = Error::load("static/insights", io::Error::other("boom"));
        let display = format!("{err}");
        assert!(display.contains("static/insights"));
        assert!(display.contains("boom"));
    }

    #[test]
    fn test_load_error_keeps_source() {
        use std::error::Error as _;

        let err = Error::load("x.txt", io::Error::other("disk gone"));
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("disk gone"));
    }
}
