//! Partial updates to a tenant configuration
//!
//! A [`TenantConfigPatch`] mirrors [`TenantConfig`] with every field optional.
//! Merging is a deep merge per top-level section: only the fields a patch
//! names change, everything else is carried over, so a merged config is
//! always complete.
//!
//! Fields that are themselves optional in the config (`domain`, `favicon`,
//! `whatsapp`) use `Option<Option<_>>`: absent leaves the value alone, `null`
//! clears it.

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{
    Branding, BusinessInfo, ContactInfo, CustomField, Feature, Features, FooterStyle, HeaderStyle,
    LayoutSettings, PaymentSettings, PlanTier, ProductGrid, ProductSettings, ProductsPerPage,
    TenantConfig, TenantStatus,
};
use crate::{Error, Result};

fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Copy every `Some` field of a patch onto the target
macro_rules! apply_fields {
    ($target:expr, $patch:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $target.$field = value.clone();
            }
        )+
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrandingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub favicon: Option<Option<String>>,
}

impl Branding {
    pub fn apply(&mut self, patch: &BrandingPatch) {
        apply_fields!(
            self,
            patch,
            logo_url,
            primary_color,
            secondary_color,
            accent_color,
            font_family,
            favicon,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactInfoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub whatsapp: Option<Option<String>>,
}

impl ContactInfo {
    pub fn apply(&mut self, patch: &ContactInfoPatch) {
        apply_fields!(self, patch, phone, email, address, city, region, whatsapp);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfoPatch>,
}

impl BusinessInfo {
    pub fn apply(&mut self, patch: &BusinessPatch) {
        apply_fields!(
            self,
            patch,
            name,
            industry,
            description,
            currency,
            language,
            timezone,
        );
        if let Some(contact) = &patch.contact_info {
            self.contact_info.apply(contact);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeaturesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wishlist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_currency: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_codes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_checkout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_login: Option<bool>,
}

impl FeaturesPatch {
    pub fn get(&self, feature: Feature) -> Option<bool> {
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
        *slot = Some(enabled);
    }
}

impl Features {
    pub fn apply(&mut self, patch: &FeaturesPatch) {
        for feature in Feature::ALL {
            if let Some(enabled) = patch.get(feature) {
                self.set(feature, enabled);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currencies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_shipping_threshold: Option<f64>,
}

impl PaymentSettings {
    pub fn apply(&mut self, patch: &PaymentPatch) {
        apply_fields!(
            self,
            patch,
            methods,
            currencies,
            tax_rate,
            shipping_cost,
            free_shipping_threshold,
        );
    }
}

/// List-valued fields are replaced as a whole, not appended to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductSettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<CustomField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brands: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_image: Option<String>,
}

impl ProductSettings {
    pub fn apply(&mut self, patch: &ProductSettingsPatch) {
        apply_fields!(
            self,
            patch,
            custom_fields,
            categories,
            conditions,
            brands,
            placeholder_image,
        );
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_style: Option<HeaderStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_style: Option<FooterStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_grid: Option<ProductGrid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_per_page: Option<ProductsPerPage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_product_code: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_discount_badge: Option<bool>,
}

impl LayoutSettings {
    pub fn apply(&mut self, patch: &LayoutPatch) {
        apply_fields!(
            self,
            patch,
            header_style,
            footer_style,
            product_grid,
            products_per_page,
            show_product_code,
            show_stock,
            show_discount_badge,
        );
    }
}

/// Sparse update to a [`TenantConfig`].
///
/// Identity fields (`id`, `slug`, `createdAt`, `ownerId`) cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TenantConfigPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub domain: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TenantStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<BrandingPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeaturesPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSettingsPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutPatch>,
}

fn section_is_empty<T: Default + PartialEq>(section: &Option<T>) -> bool {
    section.as_ref().is_none_or(|s| *s == T::default())
}

impl TenantConfigPatch {
    /// Parse a patch from sparse JSON such as `{"branding":{"primaryColor":"#dc2626"}}`.
    ///
    /// Unknown keys are ignored; a malformed value is a validation error.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::ConfigValidation(format!("Invalid config patch: {}", e)))
    }

    pub fn branding(patch: BrandingPatch) -> Self {
        Self {
            branding: Some(patch),
            ..Self::default()
        }
    }

    pub fn business(patch: BusinessPatch) -> Self {
        Self {
            business: Some(patch),
            ..Self::default()
        }
    }

    pub fn features(patch: FeaturesPatch) -> Self {
        Self {
            features: Some(patch),
            ..Self::default()
        }
    }

    pub fn layout(patch: LayoutPatch) -> Self {
        Self {
            layout: Some(patch),
            ..Self::default()
        }
    }

    /// True when merging this patch cannot change any config
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.status.is_none()
            && self.plan.is_none()
            && section_is_empty(&self.branding)
            && section_is_empty(&self.business)
            && section_is_empty(&self.features)
            && section_is_empty(&self.payment)
            && section_is_empty(&self.product)
            && section_is_empty(&self.layout)
    }
}

impl TenantConfig {
    /// Deep-merge a patch into a copy of this config
    pub fn merge(&self, patch: &TenantConfigPatch) -> TenantConfig {
        let mut merged = self.clone();
        merged.apply(patch);
        merged
    }

    /// Deep-merge a patch in place
    pub fn apply(&mut self, patch: &TenantConfigPatch) {
        apply_fields!(self, patch, domain, status, plan);
        if let Some(branding) = &patch.branding {
            self.branding.apply(branding);
        }
        if let Some(business) = &patch.business {
            self.business.apply(business);
        }
        if let Some(features) = &patch.features {
            self.features.apply(features);
        }
        if let Some(payment) = &patch.payment {
            self.payment.apply(payment);
        }
        if let Some(product) = &patch.product {
            self.product.apply(product);
        }
        if let Some(layout) = &patch.layout {
            self.layout.apply(layout);
        }
    }
}
