//! Where schema configurations come from

use async_trait::async_trait;
use magic_core::ConfigError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Supplies the schema JSON for a culture such as `en-US`
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn fetch(&self, culture: &str) -> Result<String, ConfigError>;
}

/// Reads `<dir>/<culture>.json`
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, culture: &str) -> PathBuf {
        self.dir.join(format!("{}.json", culture))
    }
}

#[async_trait]
impl SchemaSource for FileSource {
    async fn fetch(&self, culture: &str) -> Result<String, ConfigError> {
        let path = self.path_for(culture);
        tracing::debug!(path = %path.display(), "fetching schema");
        tokio::fs::read_to_string(&path).await.map_err(|e| ConfigError::Fetch {
            culture: culture.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}

/// In-memory schemas keyed by culture
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    schemas: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, culture: &str, json: impl Into<String>) -> Self {
        self.schemas.insert(culture.to_string(), json.into());
        self
    }
}

#[async_trait]
impl SchemaSource for StaticSource {
    async fn fetch(&self, culture: &str) -> Result<String, ConfigError> {
        self.schemas.get(culture).cloned().ok_or_else(|| ConfigError::Fetch {
            culture: culture.to_string(),
            reason: "no schema for this culture".to_string(),
        })
    }
}
