//! Tenant configuration data model
//!
//! A [`TenantConfig`] fully describes one storefront: branding, business
//! details, feature flags, payment rules, product taxonomy and layout. The
//! serialized form uses camelCase keys to match the hosted backend's JSON.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tenant::{TenantId, TenantSlug};
use crate::{Error, Result};

/// Lifecycle status of a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    /// Any value this build does not know about
    #[serde(other)]
    Unknown,
}

/// Pricing tier (informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Basic,
    Premium,
    Enterprise,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub logo_url: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    pub name: String,
    pub industry: String,
    pub description: String,
    /// ISO 4217 code, e.g. `CLP`
    pub currency: String,
    /// ISO 639-1 code, e.g. `es`
    pub language: String,
    pub timezone: String,
    pub contact_info: ContactInfo,
}

/// Named feature flags.
///
/// The set is closed: every tenant config carries a value for each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Wishlist,
    Filters,
    MultiCurrency,
    Reviews,
    InventoryTracking,
    DiscountCodes,
    GuestCheckout,
    SocialLogin,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Wishlist,
        Feature::Filters,
        Feature::MultiCurrency,
        Feature::Reviews,
        Feature::InventoryTracking,
        Feature::DiscountCodes,
        Feature::GuestCheckout,
        Feature::SocialLogin,
    ];

    /// Key used in serialized configs
    pub fn key(&self) -> &'static str {
        match self {
            Feature::Wishlist => "wishlist",
            Feature::Filters => "filters",
            Feature::MultiCurrency => "multiCurrency",
            Feature::Reviews => "reviews",
            Feature::InventoryTracking => "inventoryTracking",
            Feature::DiscountCodes => "discountCodes",
            Feature::GuestCheckout => "guestCheckout",
            Feature::SocialLogin => "socialLogin",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Feature::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| Error::Config(format!("Unknown feature '{}'", s)))
    }
}

/// Feature flag values. A key absent from serialized input reads as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    #[serde(default)]
    pub wishlist: bool,
    #[serde(default)]
    pub filters: bool,
    #[serde(default)]
    pub multi_currency: bool,
    #[serde(default)]
    pub reviews: bool,
    #[serde(default)]
    pub inventory_tracking: bool,
    #[serde(default)]
    pub discount_codes: bool,
    #[serde(default)]
    pub guest_checkout: bool,
    #[serde(default)]
    pub social_login: bool,
}

impl Features {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Wishlist => self.wishlist,
            Feature::Filters => self.filters,
            Feature::MultiCurrency => self.multi_currency,
            Feature::Reviews => self.reviews,
            Feature::InventoryTracking => self.inventory_tracking,
            Feature::DiscountCodes => self.discount_codes,
            Feature::GuestCheckout => self.guest_checkout,
            Feature::SocialLogin => self.social_login,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::Wishlist => &mut self.wishlist,
            Feature::Filters => &mut self.filters,
            Feature::MultiCurrency => &mut self.multi_currency,
            Feature::Reviews => &mut self.reviews,
            Feature::InventoryTracking => &mut self.inventory_tracking,
            Feature::DiscountCodes => &mut self.discount_codes,
            Feature::GuestCheckout => &mut self.guest_checkout,
            Feature::SocialLogin => &mut self.social_login,
        };
        *slot = enabled;
    }

    /// All flags with their values, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, bool)> + '_ {
        Feature::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    /// Flags that are switched on
    pub fn enabled(&self) -> Vec<Feature> {
        self.iter().filter(|(_, on)| *on).map(|(f, _)| f).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettings {
    pub methods: Vec<String>,
    pub currencies: Vec<String>,
    /// Fraction in `[0, 1]`, e.g. `0.19`
    pub tax_rate: f64,
    pub shipping_cost: f64,
    pub free_shipping_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldType {
    Text,
    Number,
    Select,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSettings {
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    pub placeholder_image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    #[default]
    Classic,
    Centered,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FooterStyle {
    #[default]
    Simple,
    Detailed,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductGrid {
    #[default]
    Grid,
    List,
}

/// Page size for product listings, restricted to a fixed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ProductsPerPage(u32);

impl ProductsPerPage {
    pub const ALLOWED: [u32; 4] = [6, 12, 24, 48];

    pub fn new(value: u32) -> Result<Self> {
        if Self::ALLOWED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::ConfigValidation(format!(
                "layout.productsPerPage must be one of {:?}, got {}",
                Self::ALLOWED,
                value
            )))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for ProductsPerPage {
    fn default() -> Self {
        Self(12)
    }
}

impl TryFrom<u32> for ProductsPerPage {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ProductsPerPage> for u32 {
    fn from(value: ProductsPerPage) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
    #[serde(default)]
    pub header_style: HeaderStyle,
    #[serde(default)]
    pub footer_style: FooterStyle,
    #[serde(default)]
    pub product_grid: ProductGrid,
    #[serde(default)]
    pub products_per_page: ProductsPerPage,
    #[serde(default)]
    pub show_product_code: bool,
    #[serde(default)]
    pub show_stock: bool,
    #[serde(default)]
    pub show_discount_badge: bool,
}

/// Full configuration record of one tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub id: TenantId,
    pub slug: TenantSlug,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub status: TenantStatus,
    #[serde(default)]
    pub plan: PlanTier,
    pub branding: Branding,
    pub business: BusinessInfo,
    #[serde(default)]
    pub features: Features,
    pub payment: PaymentSettings,
    pub product: ProductSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: String,
}

/// 2024-01-01T00:00:00Z
const DEMO_CREATED_AT: i64 = 1_704_067_200;

static DEMO_CONFIG: Lazy<TenantConfig> = Lazy::new(|| {
    let created_at = DateTime::from_timestamp(DEMO_CREATED_AT, 0).unwrap_or_default();
    TenantConfig {
        id: TenantId::DEMO,
        slug: TenantSlug::demo(),
        domain: None,
        status: TenantStatus::Active,
        plan: PlanTier::Premium,
        branding: Branding {
            logo_url: "/images/demo-logo.svg".to_string(),
            primary_color: "#1e40af".to_string(),
            secondary_color: "#64748b".to_string(),
            accent_color: "#f59e0b".to_string(),
            font_family: "Inter, sans-serif".to_string(),
            favicon: None,
        },
        business: BusinessInfo {
            name: "Demo Store".to_string(),
            industry: "retail".to_string(),
            description: "Demonstration storefront".to_string(),
            currency: "CLP".to_string(),
            language: "es".to_string(),
            timezone: "America/Santiago".to_string(),
            contact_info: ContactInfo {
                phone: "+56 2 2345 6789".to_string(),
                email: "contacto@demo.store".to_string(),
                address: "Av. Providencia 1234".to_string(),
                city: "Santiago".to_string(),
                region: "Región Metropolitana".to_string(),
                whatsapp: Some("+56912345678".to_string()),
            },
        },
        features: Features {
            wishlist: true,
            filters: true,
            multi_currency: false,
            reviews: true,
            inventory_tracking: true,
            discount_codes: true,
            guest_checkout: true,
            social_login: false,
        },
        payment: PaymentSettings {
            methods: vec!["webpay".to_string(), "transfer".to_string()],
            currencies: vec!["CLP".to_string()],
            tax_rate: 0.19,
            shipping_cost: 3990.0,
            free_shipping_threshold: 50000.0,
        },
        product: ProductSettings {
            custom_fields: vec![CustomField {
                id: "warranty".to_string(),
                name: "Garantía".to_string(),
                field_type: CustomFieldType::Text,
                required: false,
            }],
            categories: vec![
                "Electrónica".to_string(),
                "Hogar".to_string(),
                "Deportes".to_string(),
            ],
            conditions: vec!["Nuevo".to_string(), "Usado".to_string()],
            brands: Vec::new(),
            placeholder_image: "/images/placeholder.png".to_string(),
        },
        layout: LayoutSettings {
            header_style: HeaderStyle::Classic,
            footer_style: FooterStyle::Detailed,
            product_grid: ProductGrid::Grid,
            products_per_page: ProductsPerPage::default(),
            show_product_code: true,
            show_stock: true,
            show_discount_badge: true,
        },
        created_at,
        updated_at: created_at,
        owner_id: "demo-owner".to_string(),
    }
});

impl TenantConfig {
    /// The demo tenant used before resolution completes and when it fails
    pub fn demo() -> Self {
        DEMO_CONFIG.clone()
    }

    /// The demo config re-keyed to another tenant, useful for seeding backends
    pub fn demo_for(slug: TenantSlug, id: TenantId) -> Self {
        let mut config = Self::demo();
        config.slug = slug;
        config.id = id;
        config
    }

    /// Parse a config from JSON and validate it
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let config: TenantConfig = serde_json::from_value(value)
            .map_err(|e| Error::ConfigValidation(format!("Invalid tenant config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_config_is_valid() {
        let config = TenantConfig::demo();
        assert!(config.validate().is_ok());
        assert_eq!(config.branding.primary_color, "#1e40af");
        assert_eq!(config.business.currency, "CLP");
        assert_eq!(config.slug, TenantSlug::demo());
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_value(TenantConfig::demo()).unwrap();
        assert_eq!(json["branding"]["primaryColor"], "#1e40af");
        assert_eq!(json["layout"]["productsPerPage"], 12);
        assert_eq!(json["business"]["contactInfo"]["city"], "Santiago");
        assert_eq!(json["product"]["customFields"][0]["type"], "text");
    }

    #[test]
    fn test_missing_feature_keys_default_to_false() {
        let mut json = serde_json::to_value(TenantConfig::demo()).unwrap();
        json["features"] = serde_json::json!({ "wishlist": true });

        let config: TenantConfig = serde_json::from_value(json).unwrap();
        assert!(config.features.wishlist);
        for feature in Feature::ALL.into_iter().filter(|f| *f != Feature::Wishlist) {
            assert!(!config.features.get(feature), "{} should be off", feature);
        }
    }

    #[test]
    fn test_products_per_page_rejects_unknown_sizes() {
        assert!(ProductsPerPage::new(6).is_ok());
        assert!(ProductsPerPage::new(48).is_ok());
        assert!(ProductsPerPage::new(0).is_err());
        assert!(ProductsPerPage::new(10).is_err());

        let mut json = serde_json::to_value(TenantConfig::demo()).unwrap();
        json["layout"]["productsPerPage"] = serde_json::json!(7);
        assert!(serde_json::from_value::<TenantConfig>(json).is_err());
    }

    #[test]
    fn test_unknown_status_and_plan_are_opaque() {
        let mut json = serde_json::to_value(TenantConfig::demo()).unwrap();
        json["status"] = serde_json::json!("archived");
        json["plan"] = serde_json::json!("platinum");

        let config: TenantConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.status, TenantStatus::Unknown);
        assert_eq!(config.plan, PlanTier::Unknown);
    }

    #[test]
    fn test_feature_keys_round_trip_through_from_str() {
        for feature in Feature::ALL {
            assert_eq!(feature.key().parse::<Feature>().unwrap(), feature);
        }
        assert!("darkMode".parse::<Feature>().is_err());
    }

    #[test]
    fn test_features_set_and_enabled() {
        let mut features = Features::default();
        assert!(features.enabled().is_empty());

        features.set(Feature::Reviews, true);
        features.set(Feature::SocialLogin, true);
        assert_eq!(
            features.enabled(),
            vec![Feature::Reviews, Feature::SocialLogin]
        );
        assert_eq!(features.iter().count(), 8);
    }

    #[test]
    fn test_yaml_config_parses() {
        let yaml = serde_yaml::to_string(&TenantConfig::demo()).unwrap();
        let parsed: TenantConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, TenantConfig::demo());
    }
}
