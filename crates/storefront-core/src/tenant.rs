//! Tenant identifiers and request context

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{Error, Result};

/// Internal identifier for a tenant.
///
/// Product data and persisted configuration are keyed by this value; the
/// [`TenantSlug`] is only used to look a tenant up from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Identifier of the built-in demo tenant
    pub const DEMO: TenantId = TenantId(Uuid::from_u128(0x5f0e_3c1a_9d2b_4e7f_8a61_0c4d_2b9e_7a13));

    /// Create a new random tenant ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a tenant ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse a tenant ID from a string
    pub fn from_string(s: &str) -> Result<Self> {
        let uuid = Uuid::parse_str(s)
            .map_err(|e| Error::InvalidTenant(format!("Invalid tenant ID format: {}", e)))?;
        Ok(Self(uuid))
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

const MAX_SLUG_LEN: usize = 63;

/// External lookup key for a tenant, e.g. `acme-outdoor`.
///
/// Slugs are DNS-label shaped so they can double as a subdomain:
/// lowercase ASCII letters, digits and `-`, at most 63 characters, and
/// never starting or ending with `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantSlug(String);

impl TenantSlug {
    /// Parse and validate a slug
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() || s.len() > MAX_SLUG_LEN {
            return Err(Error::InvalidTenant(format!(
                "Slug must be 1-{} characters, got {}",
                MAX_SLUG_LEN,
                s.len()
            )));
        }
        if s.starts_with('-') || s.ends_with('-') {
            return Err(Error::InvalidTenant(format!(
                "Slug '{}' cannot start or end with '-'",
                s
            )));
        }
        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(Error::InvalidTenant(format!(
                "Slug '{}' contains invalid character '{}'",
                s, c
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Slug of the built-in demo tenant
    pub fn demo() -> Self {
        Self("demo".to_string())
    }

    /// Derive the slug from a request host such as `acme.shop.example.com:8080`.
    ///
    /// The first DNS label is the slug; hosts with a single label (e.g.
    /// `localhost`) carry no tenant and are rejected.
    pub fn from_host(host: &str) -> Result<Self> {
        let host = host.split(':').next().unwrap_or_default();
        let mut labels = host.split('.');
        let first = labels.next().unwrap_or_default();
        if labels.next().is_none() {
            return Err(Error::InvalidTenant(format!(
                "Host '{}' has no tenant subdomain",
                host
            )));
        }
        Self::parse(&first.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantSlug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TenantSlug {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TenantSlug> for String {
    fn from(slug: TenantSlug) -> Self {
        slug.0
    }
}

/// Tenant context carried by callers of tenant-scoped services.
///
/// The slug is known as soon as a request is routed; the id only once the
/// tenant's configuration has been resolved. Operations against product data
/// must go through [`TenantContext::require_tenant`] so they are never issued
/// without a resolved tenant id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// Lookup key the context was created from
    pub slug: TenantSlug,

    /// Internal id (None until resolution completes)
    pub tenant_id: Option<TenantId>,
}

impl TenantContext {
    /// Context for a slug whose tenant has not been resolved yet
    pub fn unresolved(slug: TenantSlug) -> Self {
        Self {
            slug,
            tenant_id: None,
        }
    }

    /// Context for a resolved tenant
    pub fn resolved(slug: TenantSlug, tenant_id: TenantId) -> Self {
        Self {
            slug,
            tenant_id: Some(tenant_id),
        }
    }

    /// Check if the tenant id is known
    pub fn is_resolved(&self) -> bool {
        self.tenant_id.is_some()
    }

    /// Get the tenant ID, returning an error if resolution has not completed
    pub fn require_tenant(&self) -> Result<TenantId> {
        self.tenant_id.ok_or_else(|| {
            Error::TenantRequired(format!(
                "Operation requires a resolved tenant id for '{}'",
                self.slug
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_creation() {
        let id1 = TenantId::new();
        let id2 = TenantId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_tenant_id_from_string() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let tenant_id = TenantId::from_string(uuid_str).unwrap();
        assert_eq!(tenant_id.to_string(), uuid_str);
    }

    #[test]
    fn test_tenant_id_invalid_string() {
        let result = TenantId::from_string("not-a-uuid");
        assert!(result.is_err());
    }

    #[test]
    fn test_slug_validation() {
        assert!(TenantSlug::parse("acme-outdoor").is_ok());
        assert!(TenantSlug::parse("shop42").is_ok());

        assert!(TenantSlug::parse("").is_err());
        assert!(TenantSlug::parse("-acme").is_err());
        assert!(TenantSlug::parse("acme-").is_err());
        assert!(TenantSlug::parse("Acme").is_err());
        assert!(TenantSlug::parse("acme_outdoor").is_err());
        assert!(TenantSlug::parse(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_slug_from_host() {
        let slug = TenantSlug::from_host("Acme.shop.example.com:8080").unwrap();
        assert_eq!(slug.as_str(), "acme");

        assert!(TenantSlug::from_host("localhost").is_err());
        assert!(TenantSlug::from_host("localhost:3000").is_err());
    }

    #[test]
    fn test_slug_serde_rejects_invalid() {
        let ok: TenantSlug = serde_json::from_str("\"demo\"").unwrap();
        assert_eq!(ok, TenantSlug::demo());

        let bad: std::result::Result<TenantSlug, _> = serde_json::from_str("\"Not Valid\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_context_requires_resolution() {
        let ctx = TenantContext::unresolved(TenantSlug::demo());
        assert!(!ctx.is_resolved());
        assert!(matches!(ctx.require_tenant(), Err(Error::TenantRequired(_))));

        let ctx = TenantContext::resolved(TenantSlug::demo(), TenantId::DEMO);
        assert_eq!(ctx.require_tenant().unwrap(), TenantId::DEMO);
    }
}
