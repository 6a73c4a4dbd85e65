//! Semantic validation of tenant configurations
//!
//! Deserialization already guarantees shape (all sections present, closed
//! feature set, allowed page sizes). These checks cover values serde cannot
//! express.

use std::collections::HashSet;

use crate::config::TenantConfig;
use crate::{Error, Result};

/// `#rgb` or `#rrggbb`
pub fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_currency_code(value: &str) -> bool {
    value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase())
}

fn is_language_code(value: &str) -> bool {
    value.len() == 2 && value.chars().all(|c| c.is_ascii_lowercase())
}

fn invalid(field: &str, reason: impl std::fmt::Display) -> Error {
    Error::ConfigValidation(format!("{}: {}", field, reason))
}

impl TenantConfig {
    /// Check value-level constraints, returning the first violation found
    pub fn validate(&self) -> Result<()> {
        for (field, color) in [
            ("branding.primaryColor", &self.branding.primary_color),
            ("branding.secondaryColor", &self.branding.secondary_color),
            ("branding.accentColor", &self.branding.accent_color),
        ] {
            if !is_hex_color(color) {
                return Err(invalid(field, format!("'{}' is not a hex color", color)));
            }
        }

        if self.branding.font_family.trim().is_empty() {
            return Err(invalid("branding.fontFamily", "must not be empty"));
        }

        if self.business.name.trim().is_empty() {
            return Err(invalid("business.name", "must not be empty"));
        }

        if !is_currency_code(&self.business.currency) {
            return Err(invalid(
                "business.currency",
                format!("'{}' is not an ISO 4217 code", self.business.currency),
            ));
        }

        if !is_language_code(&self.business.language) {
            return Err(invalid(
                "business.language",
                format!("'{}' is not an ISO 639-1 code", self.business.language),
            ));
        }

        if let Some(code) = self.payment.currencies.iter().find(|c| !is_currency_code(c)) {
            return Err(invalid(
                "payment.currencies",
                format!("'{}' is not an ISO 4217 code", code),
            ));
        }

        let rate = self.payment.tax_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(invalid(
                "payment.taxRate",
                format!("{} is outside [0, 1]", rate),
            ));
        }

        for (field, amount) in [
            ("payment.shippingCost", self.payment.shipping_cost),
            (
                "payment.freeShippingThreshold",
                self.payment.free_shipping_threshold,
            ),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(invalid(field, format!("{} must be a non-negative amount", amount)));
            }
        }

        let mut seen = HashSet::new();
        for field in &self.product.custom_fields {
            if field.id.trim().is_empty() {
                return Err(invalid("product.customFields", "field id must not be empty"));
            }
            if !seen.insert(field.id.as_str()) {
                return Err(invalid(
                    "product.customFields",
                    format!("duplicate field id '{}'", field.id),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CustomField, CustomFieldType};

    fn message(config: &TenantConfig) -> String {
        match config.validate() {
            Err(Error::ConfigValidation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#1e40af"));
        assert!(is_hex_color("#FFF"));
        assert!(!is_hex_color("1e40af"));
        assert!(!is_hex_color("#1e40a"));
        assert!(!is_hex_color("#gggggg"));
        assert!(!is_hex_color("red"));
    }

    #[test]
    fn test_rejects_bad_color() {
        let mut config = TenantConfig::demo();
        config.branding.accent_color = "orange".to_string();
        assert!(message(&config).starts_with("branding.accentColor"));
    }

    #[test]
    fn test_rejects_bad_codes() {
        let mut config = TenantConfig::demo();
        config.business.currency = "clp".to_string();
        assert!(message(&config).starts_with("business.currency"));

        let mut config = TenantConfig::demo();
        config.business.language = "spa".to_string();
        assert!(message(&config).starts_with("business.language"));

        let mut config = TenantConfig::demo();
        config.payment.currencies.push("US".to_string());
        assert!(message(&config).starts_with("payment.currencies"));
    }

    #[test]
    fn test_rejects_out_of_range_amounts() {
        let mut config = TenantConfig::demo();
        config.payment.tax_rate = 19.0;
        assert!(message(&config).starts_with("payment.taxRate"));

        let mut config = TenantConfig::demo();
        config.payment.shipping_cost = -1.0;
        assert!(message(&config).starts_with("payment.shippingCost"));

        let mut config = TenantConfig::demo();
        config.payment.free_shipping_threshold = f64::NAN;
        assert!(message(&config).starts_with("payment.freeShippingThreshold"));
    }

    #[test]
    fn test_rejects_duplicate_custom_fields() {
        let mut config = TenantConfig::demo();
        let field = CustomField {
            id: "size".to_string(),
            name: "Size".to_string(),
            field_type: CustomFieldType::Select,
            required: true,
        };
        config.product.custom_fields = vec![field.clone(), field];
        assert!(message(&config).contains("duplicate field id 'size'"));
    }

    #[test]
    fn test_rejects_empty_business_name() {
        let mut config = TenantConfig::demo();
        config.business.name = "  ".to_string();
        assert!(message(&config).starts_with("business.name"));
    }
}
