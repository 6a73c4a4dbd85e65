//! Error types for Storefront Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Store-boundary errors
    #[error("Tenant config resolution failed: {0}")]
    Resolution(String),

    #[error("Tenant config update failed: {0}")]
    Update(String),

    #[error("No tenant configuration is available")]
    NotConfigured,

    // Multi-tenancy errors
    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    #[error("Tenant required: {0}")]
    TenantRequired(String),

    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    // Product data errors
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error came from the backend rather than from the caller's input
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Io(_) | Error::Resolution(_) | Error::Update(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_displayable() {
        let err = Error::TenantNotFound("broken-tenant".to_string());
        assert_eq!(err.to_string(), "Tenant not found: broken-tenant");

        let err = Error::ConfigValidation("branding.primaryColor: not a hex color".to_string());
        assert!(err.to_string().contains("primaryColor"));
    }

    #[test]
    fn test_is_backend() {
        assert!(Error::Database("down".to_string()).is_backend());
        assert!(!Error::ConfigValidation("bad".to_string()).is_backend());
        assert!(!Error::NotConfigured.is_backend());
    }
}
