//! Configuration source trait for tenant resolution
//!
//! The `ConfigSource` trait abstracts over where tenant configurations live,
//! allowing a file-per-tenant directory for local development and a
//! database-backed table for hosted deployments.

use async_trait::async_trait;

use crate::{config::TenantConfig, patch::TenantConfigPatch, tenant::TenantSlug, Result};

/// Backend that resolves and persists tenant configurations
///
/// Implementations:
/// - `SimulatedSource`: in-memory map with artificial latency
/// - `FileConfigSource`: one YAML/TOML file per tenant
/// - `PostgresConfigSource`: JSONB table keyed by slug
///
/// # Example
/// ```no_run
/// # use storefront_core::config_source::ConfigSource;
/// # use storefront_core::tenant::TenantSlug;
/// # async fn example(source: &dyn ConfigSource) -> storefront_core::Result<()> {
/// let slug = TenantSlug::parse("acme-outdoor")?;
/// let config = source.resolve(&slug).await?;
/// println!("{}", config.business.name);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Load the complete configuration of a tenant
    ///
    /// Resolution has no side effects on in-memory state and no retry
    /// policy; a failed attempt is final and the caller must call again.
    ///
    /// # Errors
    /// - `Error::TenantNotFound` if no tenant has this slug
    /// - `Error::ConfigValidation` if the stored config is malformed
    /// - `Error::Database` / `Error::Io` for backend failures
    async fn resolve(&self, slug: &TenantSlug) -> Result<TenantConfig>;

    /// Persist a partial update for a tenant
    ///
    /// The backend merges the patch into its stored config; concurrent
    /// writers resolve as last-write-wins.
    ///
    /// # Errors
    /// - `Error::TenantNotFound` if no tenant has this slug
    /// - `Error::ConfigValidation` if the merged config is invalid
    /// - `Error::Database` / `Error::Io` for backend failures
    async fn persist(&self, slug: &TenantSlug, patch: &TenantConfigPatch) -> Result<()>;
}
