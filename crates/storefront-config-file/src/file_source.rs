//! File-based ConfigSource implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use storefront_core::{
    ConfigSource, Error, Result, TenantConfig, TenantConfigPatch, TenantSlug,
};

/// Extensions probed for a tenant file, in order of preference
const EXTENSIONS: [&str; 3] = ["yaml", "yml", "toml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Self {
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            Format::Toml
        } else {
            Format::Yaml
        }
    }
}

/// File-based configuration source
///
/// Each tenant lives in `<directory>/<slug>.yaml` (or `.yml` / `.toml`).
/// Persisting a patch rewrites the tenant's file in its own format.
#[derive(Debug)]
pub struct FileConfigSource {
    /// Directory holding one file per tenant
    directory: PathBuf,
    /// Write counter (incremented on each successful write)
    version: Arc<AtomicU32>,
    /// Serializes read-merge-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileConfigSource {
    /// Create a new file-based configuration source
    ///
    /// # Arguments
    /// * `directory` - Directory containing tenant files (`~` is expanded)
    ///
    /// # Errors
    /// - `Error::Config` if the directory doesn't exist
    pub async fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();

        // Expand tilde if present
        let directory = match directory.strip_prefix("~") {
            Ok(rest) => dirs::home_dir()
                .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?
                .join(rest),
            Err(_) => directory.clone(),
        };

        if !directory.is_dir() {
            return Err(Error::Config(format!(
                "Tenant config directory not found: {}",
                directory.display()
            )));
        }

        info!("Initialized FileConfigSource for {:?}", directory);

        Ok(Self {
            directory,
            version: Arc::new(AtomicU32::new(0)),
            write_lock: Mutex::new(()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of writes performed through this source
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    /// Path of an existing file for the slug
    fn find_file(&self, slug: &TenantSlug) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.directory.join(format!("{}.{}", slug, ext)))
            .find(|path| path.is_file())
    }

    /// Read and parse a tenant file
    async fn read_config_file(&self, path: &Path) -> Result<TenantConfig> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            error!("Failed to read tenant file {:?}: {}", path, e);
            Error::Io(e)
        })?;

        let value: serde_json::Value = match Format::of(path) {
            Format::Toml => {
                let toml_value: toml::Value = toml::from_str(&contents).map_err(|e| {
                    error!("Failed to parse TOML tenant file: {}", e);
                    Error::Config(format!("Invalid TOML: {}", e))
                })?;
                serde_json::to_value(toml_value).map_err(|e| {
                    error!("Failed to convert TOML to JSON: {}", e);
                    Error::Config(format!("TOML conversion error: {}", e))
                })?
            }
            Format::Yaml => serde_yaml::from_str(&contents).map_err(|e| {
                error!("Failed to parse YAML tenant file: {}", e);
                Error::Config(format!("Invalid YAML: {}", e))
            })?,
        };

        debug!("Successfully read tenant file {:?}", path);
        TenantConfig::from_json(value)
    }

    /// Write a tenant file in the format implied by its extension
    async fn write_config_file(&self, path: &Path, config: &TenantConfig) -> Result<()> {
        let contents = match Format::of(path) {
            Format::Toml => toml::to_string_pretty(config).map_err(|e| {
                error!("Failed to serialize TOML: {}", e);
                Error::Config(format!("TOML serialization error: {}", e))
            })?,
            Format::Yaml => serde_yaml::to_string(config).map_err(|e| {
                error!("Failed to serialize YAML: {}", e);
                Error::Config(format!("YAML serialization error: {}", e))
            })?,
        };

        tokio::fs::write(path, contents).await.map_err(|e| {
            error!("Failed to write tenant file {:?}: {}", path, e);
            Error::Io(e)
        })?;

        self.version.fetch_add(1, Ordering::SeqCst);

        info!("Successfully wrote tenant file {:?}", path);
        Ok(())
    }

    /// Write a complete tenant config, creating `<slug>.yaml` if the tenant
    /// has no file yet
    pub async fn save(&self, config: &TenantConfig) -> Result<PathBuf> {
        config.validate()?;
        let _guard = self.write_lock.lock().await;
        let path = self
            .find_file(&config.slug)
            .unwrap_or_else(|| self.directory.join(format!("{}.yaml", config.slug)));
        self.write_config_file(&path, config).await?;
        Ok(path)
    }

    /// Slugs of all tenant files in the directory, sorted
    pub async fn list_tenants(&self) -> Result<Vec<TenantSlug>> {
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        let mut slugs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let known_ext = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext));
            if !known_ext {
                continue;
            }
            if let Some(slug) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| TenantSlug::parse(s).ok())
            {
                slugs.push(slug);
            }
        }
        slugs.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        slugs.dedup();
        Ok(slugs)
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn resolve(&self, slug: &TenantSlug) -> Result<TenantConfig> {
        let path = self
            .find_file(slug)
            .ok_or_else(|| Error::TenantNotFound(slug.to_string()))?;

        let config = self.read_config_file(&path).await?;
        if &config.slug != slug {
            return Err(Error::Config(format!(
                "Tenant file {:?} declares slug '{}'",
                path, config.slug
            )));
        }
        Ok(config)
    }

    async fn persist(&self, slug: &TenantSlug, patch: &TenantConfigPatch) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let path = self
            .find_file(slug)
            .ok_or_else(|| Error::TenantNotFound(slug.to_string()))?;

        let mut config = self.read_config_file(&path).await?;
        config.apply(patch);
        config.validate()?;
        config.updated_at = chrono::Utc::now();

        self.write_config_file(&path, &config).await
    }
}
