//! Shared fixtures for the cross-crate storefront tests

use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use storefront_config_file::FileConfigSource;
use storefront_core::theme::RecordingEnvironment;
use storefront_core::{TenantConfig, TenantId, TenantSlug};
use storefront_store::ConfigStore;

/// Demo config re-keyed to `slug` with its own business name
pub fn tenant(slug: &str, name: &str) -> TenantConfig {
    let slug = TenantSlug::parse(slug).unwrap();
    let mut config = TenantConfig::demo_for(slug, TenantId::new());
    config.business.name = name.to_string();
    config
}

/// Write tenant files into `dir` as YAML
pub fn write_tenants(dir: &Path, configs: &[TenantConfig]) {
    for config in configs {
        let path = dir.join(format!("{}.yaml", config.slug));
        std::fs::write(path, serde_yaml::to_string(config).unwrap()).unwrap();
    }
}

/// Temporary tenant directory with a file source over it
pub async fn file_source(configs: &[TenantConfig]) -> (TempDir, Arc<FileConfigSource>) {
    let dir = TempDir::new().unwrap();
    write_tenants(dir.path(), configs);
    let source = FileConfigSource::new(dir.path()).await.unwrap();
    (dir, Arc::new(source))
}

/// Store for `slug` over `source` recording theme writes
pub fn store_for(
    slug: &str,
    source: Arc<FileConfigSource>,
) -> (ConfigStore, Arc<RecordingEnvironment>) {
    let env = Arc::new(RecordingEnvironment::new());
    let store = ConfigStore::new(TenantSlug::parse(slug).unwrap(), source, env.clone());
    (store, env)
}
