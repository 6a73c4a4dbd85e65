//! In-memory ConfigSource with latency and failure injection

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use storefront_core::{ConfigSource, Error, Result, TenantConfig, TenantConfigPatch, TenantSlug};

/// Backend stand-in seeded with the demo tenant.
///
/// Unknown slugs fail with `TenantNotFound`. Persisting a patch merges it
/// into the stored config, so a later resolve observes the write.
#[derive(Debug, Default)]
pub struct SimulatedSource {
    tenants: RwLock<HashMap<TenantSlug, TenantConfig>>,
    resolve_latency: Duration,
    persist_latency: Duration,
    failing_slugs: RwLock<HashSet<TenantSlug>>,
    fail_persist: AtomicBool,
    resolve_calls: AtomicUsize,
    persist_calls: AtomicUsize,
}

impl SimulatedSource {
    pub fn new() -> Self {
        let demo = TenantConfig::demo();
        let mut tenants = HashMap::new();
        tenants.insert(demo.slug.clone(), demo);
        Self {
            tenants: RwLock::new(tenants),
            ..Self::default()
        }
    }

    pub fn with_resolve_latency(mut self, latency: Duration) -> Self {
        self.resolve_latency = latency;
        self
    }

    pub fn with_persist_latency(mut self, latency: Duration) -> Self {
        self.persist_latency = latency;
        self
    }

    /// Apply the same latency to resolve and persist
    pub fn with_latency(self, latency: Duration) -> Self {
        self.with_resolve_latency(latency)
            .with_persist_latency(latency)
    }

    /// Add or replace a tenant
    pub async fn insert(&self, config: TenantConfig) {
        self.tenants
            .write()
            .await
            .insert(config.slug.clone(), config);
    }

    pub async fn get(&self, slug: &TenantSlug) -> Option<TenantConfig> {
        self.tenants.read().await.get(slug).cloned()
    }

    /// Make every resolution of `slug` fail
    pub async fn fail_resolution_for(&self, slug: TenantSlug) {
        self.failing_slugs.write().await.insert(slug);
    }

    pub fn set_fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }
}

async fn delay(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl ConfigSource for SimulatedSource {
    async fn resolve(&self, slug: &TenantSlug) -> Result<TenantConfig> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        delay(self.resolve_latency).await;

        if self.failing_slugs.read().await.contains(slug) {
            return Err(Error::Resolution(format!(
                "simulated failure resolving '{}'",
                slug
            )));
        }

        let config = self
            .tenants
            .read()
            .await
            .get(slug)
            .cloned()
            .ok_or_else(|| Error::TenantNotFound(slug.to_string()))?;
        debug!(slug = %slug, "Simulated resolve");
        Ok(config)
    }

    async fn persist(&self, slug: &TenantSlug, patch: &TenantConfigPatch) -> Result<()> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        delay(self.persist_latency).await;

        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(Error::Update(format!(
                "simulated failure persisting '{}'",
                slug
            )));
        }

        let mut tenants = self.tenants.write().await;
        let config = tenants
            .get_mut(slug)
            .ok_or_else(|| Error::TenantNotFound(slug.to_string()))?;
        let merged = config.merge(patch);
        merged.validate()?;
        *config = merged;
        debug!(slug = %slug, "Simulated persist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_seeded_with_demo() {
        let source = SimulatedSource::new();
        let config = source.resolve(&TenantSlug::demo()).await.unwrap();
        assert_eq!(config, TenantConfig::demo());
        assert_eq!(source.resolve_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_slug_not_found() {
        let source = SimulatedSource::new();
        let result = source.resolve(&TenantSlug::parse("ghost").unwrap()).await;
        assert!(matches!(result, Err(Error::TenantNotFound(_))));
    }

    #[tokio::test]
    async fn test_injected_resolution_failure() {
        let source = SimulatedSource::new();
        source.fail_resolution_for(TenantSlug::demo()).await;
        let result = source.resolve(&TenantSlug::demo()).await;
        assert!(matches!(result, Err(Error::Resolution(_))));
    }

    #[tokio::test]
    async fn test_persist_merges_into_stored_config() {
        let source = SimulatedSource::new();
        let patch =
            TenantConfigPatch::from_json(json!({"business": {"currency": "USD"}})).unwrap();
        source.persist(&TenantSlug::demo(), &patch).await.unwrap();

        let stored = source.get(&TenantSlug::demo()).await.unwrap();
        assert_eq!(stored.business.currency, "USD");
        assert_eq!(stored.business.language, "es");
        assert_eq!(source.persist_calls(), 1);
    }

    #[tokio::test]
    async fn test_persist_failure_leaves_config() {
        let source = SimulatedSource::new();
        source.set_fail_persist(true);
        let patch =
            TenantConfigPatch::from_json(json!({"business": {"currency": "USD"}})).unwrap();
        assert!(source.persist(&TenantSlug::demo(), &patch).await.is_err());
        assert_eq!(
            source.get(&TenantSlug::demo()).await.unwrap().business.currency,
            "CLP"
        );
    }
}
