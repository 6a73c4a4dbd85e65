//! Read-only projections over a config snapshot

use std::sync::Arc;

use storefront_core::config::{
    Branding, BusinessInfo, ContactInfo, Feature, Features, LayoutSettings, PaymentSettings,
    ProductSettings,
};
use storefront_core::pricing::PriceFormatter;
use storefront_core::theme::ThemeVariables;
use storefront_core::{Error, Result, TenantConfig};

/// Consumer-facing accessors for one config snapshot.
///
/// Holds no state beyond the snapshot; take a new view after the store
/// publishes a change.
#[derive(Debug, Clone)]
pub struct TenantView {
    config: Arc<TenantConfig>,
}

impl TenantView {
    pub fn new(config: Arc<TenantConfig>) -> Self {
        Self { config }
    }

    /// View over a config that may not exist yet, e.g. one read from a cache
    /// outside any store
    pub fn try_new(config: Option<Arc<TenantConfig>>) -> Result<Self> {
        config.map(Self::new).ok_or(Error::NotConfigured)
    }

    pub fn config(&self) -> &TenantConfig {
        &self.config
    }

    pub fn branding(&self) -> &Branding {
        &self.config.branding
    }

    pub fn business(&self) -> &BusinessInfo {
        &self.config.business
    }

    pub fn contact_info(&self) -> &ContactInfo {
        &self.config.business.contact_info
    }

    pub fn features(&self) -> &Features {
        &self.config.features
    }

    pub fn payment(&self) -> &PaymentSettings {
        &self.config.payment
    }

    pub fn product(&self) -> &ProductSettings {
        &self.config.product
    }

    pub fn layout(&self) -> &LayoutSettings {
        &self.config.layout
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.config.features.get(feature)
    }

    pub fn products_per_page(&self) -> u32 {
        self.config.layout.products_per_page.get()
    }

    /// Pages needed to show `total` products
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.products_per_page() as usize)
    }

    pub fn price_formatter(&self) -> PriceFormatter {
        PriceFormatter::for_business(&self.config.business)
    }

    /// Format an amount in the tenant's currency and language
    pub fn format_price(&self, amount: f64) -> String {
        self.price_formatter().format(amount)
    }

    /// Shipping charged for an order subtotal.
    ///
    /// Free at or above the threshold; a threshold of zero disables free
    /// shipping.
    pub fn shipping_for(&self, subtotal: f64) -> f64 {
        let payment = &self.config.payment;
        if payment.free_shipping_threshold > 0.0 && subtotal >= payment.free_shipping_threshold {
            0.0
        } else {
            payment.shipping_cost
        }
    }

    pub fn tax_for(&self, subtotal: f64) -> f64 {
        subtotal * self.config.payment.tax_rate
    }

    /// Subtotal plus tax and shipping
    pub fn total_for(&self, subtotal: f64) -> f64 {
        subtotal + self.tax_for(subtotal) + self.shipping_for(subtotal)
    }

    pub fn theme(&self) -> ThemeVariables {
        ThemeVariables::from_config(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_view() -> TenantView {
        TenantView::new(Arc::new(TenantConfig::demo()))
    }

    #[test]
    fn test_projections() {
        let view = demo_view();
        assert_eq!(view.branding().primary_color, "#1e40af");
        assert_eq!(view.business().currency, "CLP");
        assert_eq!(view.contact_info().city, "Santiago");
        assert!(view.is_enabled(Feature::Wishlist));
        assert!(!view.is_enabled(Feature::SocialLogin));
        assert_eq!(view.products_per_page(), 12);
        assert_eq!(view.theme().title, "Demo Store");
    }

    #[test]
    fn test_format_price_clp() {
        assert_eq!(demo_view().format_price(150000.0), "$150.000");
    }

    #[test]
    fn test_shipping_threshold() {
        let view = demo_view();
        assert_eq!(view.shipping_for(49999.0), 3990.0);
        assert_eq!(view.shipping_for(50000.0), 0.0);

        let mut config = TenantConfig::demo();
        config.payment.free_shipping_threshold = 0.0;
        let view = TenantView::new(Arc::new(config));
        assert_eq!(view.shipping_for(1_000_000.0), 3990.0);
    }

    #[test]
    fn test_tax_and_total() {
        let view = demo_view();
        assert_eq!(view.tax_for(10000.0), 1900.0);
        assert_eq!(view.total_for(10000.0), 10000.0 + 1900.0 + 3990.0);
    }

    #[test]
    fn test_missing_config_is_not_configured() {
        assert!(matches!(TenantView::try_new(None), Err(Error::NotConfigured)));
        assert!(TenantView::try_new(Some(Arc::new(TenantConfig::demo()))).is_ok());
    }

    #[test]
    fn test_page_count() {
        let view = demo_view();
        assert_eq!(view.page_count(0), 0);
        assert_eq!(view.page_count(12), 1);
        assert_eq!(view.page_count(13), 2);
    }
}
