//! Admin editing surface over a [`ConfigStore`]

use tracing::info;

use storefront_core::config::{Feature, ProductGrid, ProductsPerPage};
use storefront_core::patch::{BrandingPatch, BusinessPatch, LayoutPatch};
use storefront_core::validate::is_hex_color;
use storefront_core::{Error, Result, TenantConfig, TenantConfigPatch};

use crate::store::ConfigStore;

/// Outcome of submitting the draft, shown inline to the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminNotice {
    Saved,
    Rejected(String),
    /// Another operation is in flight
    Busy,
    NothingToSave,
}

/// Accumulates edits into a draft patch and submits them through the store.
///
/// Submission is refused while the store is loading, so edits from one panel
/// reach the backend one at a time.
#[derive(Debug)]
pub struct AdminPanel {
    store: ConfigStore,
    draft: TenantConfigPatch,
}

impl AdminPanel {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            draft: TenantConfigPatch::default(),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn draft(&self) -> &TenantConfigPatch {
        &self.draft
    }

    /// The current config with the draft applied
    pub fn preview(&self) -> TenantConfig {
        self.store.current().merge(&self.draft)
    }

    pub fn discard(&mut self) {
        self.draft = TenantConfigPatch::default();
    }

    fn branding(&mut self) -> &mut BrandingPatch {
        self.draft.branding.get_or_insert_with(BrandingPatch::default)
    }

    fn business(&mut self) -> &mut BusinessPatch {
        self.draft.business.get_or_insert_with(BusinessPatch::default)
    }

    fn layout(&mut self) -> &mut LayoutPatch {
        self.draft.layout.get_or_insert_with(LayoutPatch::default)
    }

    pub fn set_primary_color(&mut self, color: &str) -> Result<()> {
        let color = checked_color("branding.primaryColor", color)?;
        self.branding().primary_color = Some(color);
        Ok(())
    }

    pub fn set_secondary_color(&mut self, color: &str) -> Result<()> {
        let color = checked_color("branding.secondaryColor", color)?;
        self.branding().secondary_color = Some(color);
        Ok(())
    }

    pub fn set_accent_color(&mut self, color: &str) -> Result<()> {
        let color = checked_color("branding.accentColor", color)?;
        self.branding().accent_color = Some(color);
        Ok(())
    }

    pub fn set_font_family(&mut self, font: &str) {
        self.branding().font_family = Some(font.trim().to_string());
    }

    pub fn set_business_name(&mut self, name: &str) {
        self.business().name = Some(name.trim().to_string());
    }

    /// Flip a feature relative to what the preview shows; returns the new value
    pub fn toggle_feature(&mut self, feature: Feature) -> bool {
        let enabled = !self.preview().features.get(feature);
        self.draft
            .features
            .get_or_insert_with(Default::default)
            .set(feature, enabled);
        enabled
    }

    pub fn set_products_per_page(&mut self, value: u32) -> Result<()> {
        let per_page = ProductsPerPage::new(value)?;
        self.layout().products_per_page = Some(per_page);
        Ok(())
    }

    pub fn set_product_grid(&mut self, grid: ProductGrid) {
        self.layout().product_grid = Some(grid);
    }

    pub fn can_submit(&self) -> bool {
        !self.store.is_loading() && !self.draft.is_empty()
    }

    /// Send the draft through the store. The draft is cleared on success and
    /// kept on failure so the editor can retry.
    pub async fn submit(&mut self) -> AdminNotice {
        if self.draft.is_empty() {
            return AdminNotice::NothingToSave;
        }
        if self.store.is_loading() {
            return AdminNotice::Busy;
        }

        match self.store.update(self.draft.clone()).await {
            Ok(_) => {
                info!(slug = %self.store.slug(), "Saved admin changes");
                self.discard();
                AdminNotice::Saved
            }
            Err(e) => AdminNotice::Rejected(e.to_string()),
        }
    }

    /// Inline error text for the last failed operation
    pub fn error_message(&self) -> Option<String> {
        self.store.last_error()
    }
}

fn checked_color(field: &str, color: &str) -> Result<String> {
    let color = color.trim();
    if is_hex_color(color) {
        Ok(color.to_string())
    } else {
        Err(Error::ConfigValidation(format!(
            "{}: '{}' is not a hex color",
            field, color
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedSource;
    use std::sync::Arc;
    use std::time::Duration;
    use storefront_core::TenantSlug;
    use storefront_core::theme::NoopEnvironment;

    fn panel(source: Arc<SimulatedSource>) -> AdminPanel {
        let store = ConfigStore::new(TenantSlug::demo(), source, Arc::new(NoopEnvironment));
        AdminPanel::new(store)
    }

    #[tokio::test]
    async fn test_submit_saves_and_clears_draft() {
        let source = Arc::new(SimulatedSource::new());
        let mut panel = panel(source.clone());

        panel.set_primary_color("#dc2626").unwrap();
        panel.set_business_name("  Tienda Roja ");
        assert!(panel.can_submit());

        assert_eq!(panel.submit().await, AdminNotice::Saved);
        assert!(panel.draft().is_empty());
        assert!(!panel.can_submit());

        let current = panel.store().current();
        assert_eq!(current.branding.primary_color, "#dc2626");
        assert_eq!(current.business.name, "Tienda Roja");
        let stored = source.get(&TenantSlug::demo()).await.unwrap();
        assert_eq!(stored.business.name, "Tienda Roja");
    }

    #[tokio::test]
    async fn test_invalid_color_never_enters_draft() {
        let mut panel = panel(Arc::new(SimulatedSource::new()));
        let result = panel.set_accent_color("orange");
        assert!(matches!(result, Err(Error::ConfigValidation(_))));
        assert!(panel.draft().is_empty());
        assert!(matches!(
            panel.set_products_per_page(10),
            Err(Error::ConfigValidation(_))
        ));
    }

    #[tokio::test]
    async fn test_nothing_to_save() {
        let mut panel = panel(Arc::new(SimulatedSource::new()));
        assert!(!panel.can_submit());
        assert_eq!(panel.submit().await, AdminNotice::NothingToSave);
    }

    #[tokio::test]
    async fn test_failure_keeps_draft_and_surfaces_error() {
        let source = Arc::new(SimulatedSource::new());
        source.set_fail_persist(true);
        let mut panel = panel(source.clone());

        panel.set_products_per_page(24).unwrap();
        let notice = panel.submit().await;

        assert!(matches!(notice, AdminNotice::Rejected(_)));
        assert!(!panel.draft().is_empty());
        assert!(panel.error_message().is_some());
        assert_eq!(panel.store().current().layout.products_per_page.get(), 12);

        // Editing continues and a retry succeeds once the backend recovers
        panel.set_product_grid(ProductGrid::List);
        source.set_fail_persist(false);
        assert_eq!(panel.submit().await, AdminNotice::Saved);
        assert_eq!(panel.store().current().layout.products_per_page.get(), 24);
        assert!(panel.error_message().is_none());
    }

    #[tokio::test]
    async fn test_toggle_feature_flips_preview() {
        let mut panel = panel(Arc::new(SimulatedSource::new()));
        assert!(panel.toggle_feature(Feature::SocialLogin));
        assert!(!panel.toggle_feature(Feature::SocialLogin));
        assert!(!panel.preview().features.social_login);
        assert!(!panel.toggle_feature(Feature::Wishlist));
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_while_store_loading() {
        let source = Arc::new(SimulatedSource::new().with_resolve_latency(Duration::from_millis(200)));
        let mut panel = panel(source);
        panel.set_font_family("Roboto, sans-serif");

        let store = panel.store().clone();
        let handle = tokio::spawn(async move { store.resolve().await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!panel.can_submit());
        assert_eq!(panel.submit().await, AdminNotice::Busy);

        handle.await.unwrap().unwrap();
        assert!(panel.can_submit());
        assert_eq!(panel.submit().await, AdminNotice::Saved);
    }
}
