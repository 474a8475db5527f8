//! Schema document loading.
//!
//! The schema lives in three JSON documents next to the service
//! configuration. [`SchemaFiles`] reads them and builds the
//! [`SchemaRegistry`] the dispatcher runs against.

use crate::{ConfigError, SchemaSection};
use heron_core::SchemaRegistry;
use std::fs;
use std::path::{Path, PathBuf};

const EMPTY_DOCUMENT: &str = "{}";

/// Locations of the routes, codes and messages documents.
///
/// # Example
///
/// ```no_run
/// use heron_config::SchemaFiles;
///
/// # fn main() -> Result<(), heron_config::ConfigError> {
/// let registry = SchemaFiles::new("schema/routes.json")
///     .codes("schema/codes.json")
///     .messages("schema/messages.json")
///     .load()?;
/// println!("{} resources", registry.resource_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFiles {
    routes: PathBuf,
    codes: Option<PathBuf>,
    messages: Option<PathBuf>,
}

impl SchemaFiles {
    /// Starts from a routes document; codes and messages default to empty.
    #[must_use]
    pub fn new(routes: impl Into<PathBuf>) -> Self {
        Self {
            routes: routes.into(),
            codes: None,
            messages: None,
        }
    }

    /// Takes the locations from a configuration section.
    #[must_use]
    pub fn from_section(section: &SchemaSection) -> Self {
        Self {
            routes: section.routes.clone(),
            codes: section.codes.clone(),
            messages: section.messages.clone(),
        }
    }

    /// Sets the codes document.
    #[must_use]
    pub fn codes(mut self, path: impl Into<PathBuf>) -> Self {
        self.codes = Some(path.into());
        self
    }

    /// Sets the messages document.
    #[must_use]
    pub fn messages(mut self, path: impl Into<PathBuf>) -> Self {
        self.messages = Some(path.into());
        self
    }

    /// Resolves relative paths against `base`.
    ///
    /// Typically the directory of the configuration file.
    #[must_use]
    pub fn relative_to(self, base: &Path) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        Self {
            routes: resolve(self.routes),
            codes: self.codes.map(resolve),
            messages: self.messages.map(resolve),
        }
    }

    /// Returns the routes document path.
    #[must_use]
    pub fn routes_path(&self) -> &Path {
        &self.routes
    }

    /// Reads every document and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::FileNotFound` or `ConfigError::ReadError` for an
    /// unreadable document and `ConfigError::Schema` if the documents do not
    /// form a valid schema.
    pub fn load(&self) -> Result<SchemaRegistry, ConfigError> {
        let routes = read(&self.routes)?;
        let codes = self.codes.as_deref().map(read).transpose()?;
        let messages = self.messages.as_deref().map(read).transpose()?;

        let registry = SchemaRegistry::from_json(
            &routes,
            codes.as_deref().unwrap_or(EMPTY_DOCUMENT),
            messages.as_deref().unwrap_or(EMPTY_DOCUMENT),
        )?;

        tracing::info!(
            routes = %self.routes.display(),
            resources = registry.resource_count(),
            codes = registry.code_count(),
            messages = registry.message_count(),
            "schema loaded"
        );

        Ok(registry)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::file_not_found(path));
    }
    fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))
}
