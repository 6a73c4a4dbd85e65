//! PostgreSQL-backed tenant configuration for hosted storefront deployments
//!
//! This crate implements the `ConfigSource` trait using PostgreSQL, storing
//! each tenant's complete configuration as JSONB keyed by tenant id and
//! looked up by slug.
//!
//! # Features
//! - JSONB column holding the full tenant config
//! - Version tracking on every write
//! - Audit history for all config changes
//! - Row locking so concurrent patches apply one at a time
//! - Automatic schema migrations
//!
//! # Example
//! ```no_run
//! # use storefront_config_postgres::PostgresConfigSource;
//! # use storefront_core::{ConfigSource, TenantSlug};
//! # async fn example() -> storefront_core::Result<()> {
//! let source = PostgresConfigSource::new("postgres://localhost/storefront").await?;
//! let config = source.resolve(&TenantSlug::parse("acme")?).await?;
//! # Ok(())
//! # }
//! ```

mod postgres_config_source;

pub use postgres_config_source::PostgresConfigSource;
