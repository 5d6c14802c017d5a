//! Response fixtures: selection by outcome and resolution by name.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Pick the fixture for a validation outcome.
pub fn select<'a>(passed: bool, success: &'a str, fail: &'a str) -> &'a str {
    if passed {
        success
    } else {
        fail
    }
}

/// Read-only source of fixture content, shared across requests.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Fetch the raw text of a fixture by logical name.
    async fn fetch(&self, name: &str) -> Result<String, TemplateError>;
}

/// Fetch a fixture and parse it as JSON.
pub async fn load(store: &dyn TemplateStore, name: &str) -> Result<JsonValue, TemplateError> {
    let content = store.fetch(name).await?;
    serde_json::from_str(&content).map_err(|source| TemplateError::Malformed {
        name: name.to_string(),
        source,
    })
}

/// Fixtures stored as files under one directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a fixture name to a path inside the root directory.
    fn resolve(&self, name: &str) -> Result<PathBuf, TemplateError> {
        let relative = Path::new(name);
        let escapes = name.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if escapes {
            return Err(TemplateError::InvalidName(name.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl TemplateStore for DirectoryStore {
    async fn fetch(&self, name: &str) -> Result<String, TemplateError> {
        let path = self.resolve(name)?;
        debug!(template = name, path = %path.display(), "Loading fixture");

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::NotFound(name.to_string()))
            }
            Err(source) => Err(TemplateError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }
}

/// Fixtures held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    templates: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fixture.
    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.templates.insert(name.into(), content.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.templates.insert(name.into(), content.into());
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn fetch(&self, name: &str) -> Result<String, TemplateError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }
}

/// Errors that can occur while resolving a fixture.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Invalid template name '{0}'")]
    InvalidName(String),

    #[error("Failed to read template '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template '{name}' is not valid JSON: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}
