//! Storefront Core Types and Traits
//!
//! This crate provides the fundamental types shared by every storefront crate:
//! - The tenant configuration model and its partial-update merge
//! - The `ConfigSource` backend abstraction
//! - Theme derivation and the render-environment seam
//! - Price formatting and the product data collaborator
//! - Core error types

pub mod config;
pub mod config_source;
pub mod error;
pub mod patch;
pub mod pricing;
pub mod product;
pub mod tenant;
pub mod theme;
pub mod validate;

pub use config::{Feature, Features, TenantConfig};
pub use config_source::ConfigSource;
pub use error::{Error, Result};
pub use patch::TenantConfigPatch;
pub use tenant::{TenantContext, TenantId, TenantSlug};
