//! File-based tenant configuration for local storefront deployments
//!
//! This crate implements the `ConfigSource` trait over a directory holding
//! one YAML or TOML file per tenant. It's designed for development and
//! small self-hosted deployments where tenants are edited by hand.
//!
//! # Features
//! - One file per tenant, looked up by slug
//! - YAML and TOML support, chosen by file extension
//! - Partial updates merged and written back in place
//! - Validation on every read and write
//!
//! # Example
//! ```no_run
//! # use storefront_config_file::FileConfigSource;
//! # use storefront_core::{ConfigSource, TenantSlug};
//! # async fn example() -> storefront_core::Result<()> {
//! let source = FileConfigSource::new("~/.storefront/tenants").await?;
//! let config = source.resolve(&TenantSlug::parse("acme")?).await?;
//! # Ok(())
//! # }
//! ```

mod file_source;

pub use file_source::FileConfigSource;
