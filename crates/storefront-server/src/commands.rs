//! Output of the CLI subcommands
//!
//! Each command renders from a [`TenantView`] so the binary only wires the
//! store up and prints.

use clap::ValueEnum;
use std::path::{Path, PathBuf};

use storefront_config_file::FileConfigSource;
use storefront_core::config::Feature;
use storefront_core::{Error, Result, TenantConfig, TenantId, TenantSlug};
use storefront_store::TenantView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

pub fn show(view: &TenantView, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view.config())?),
        OutputFormat::Yaml => serde_yaml::to_string(view.config())
            .map_err(|e| Error::Config(format!("YAML serialization error: {}", e))),
    }
}

pub fn theme(view: &TenantView) -> String {
    view.theme().to_css()
}

/// Price breakdown for an order subtotal
pub fn price(view: &TenantView, amount: f64) -> String {
    let rows = [
        ("Subtotal", view.format_price(amount)),
        ("Tax", view.format_price(view.tax_for(amount))),
        ("Shipping", view.format_price(view.shipping_for(amount))),
        ("Total", view.format_price(view.total_for(amount))),
    ];
    rows.iter()
        .map(|(label, value)| format!("{:<10}{}\n", label, value))
        .collect()
}

pub fn features(view: &TenantView) -> String {
    Feature::ALL
        .into_iter()
        .map(|feature| {
            let state = if view.is_enabled(feature) { "on" } else { "off" };
            format!("{:<20}{}\n", feature.key(), state)
        })
        .collect()
}

/// Write a demo config for `slug` into the tenant directory
pub async fn init(directory: &Path, slug: &str) -> Result<PathBuf> {
    let slug = TenantSlug::parse(slug)?;
    tokio::fs::create_dir_all(directory).await?;
    let source = FileConfigSource::new(directory).await?;

    let mut config = TenantConfig::demo_for(slug.clone(), TenantId::new());
    config.owner_id = format!("{}-owner", slug);
    source.save(&config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storefront_core::ConfigSource;

    fn demo_view() -> TenantView {
        TenantView::new(Arc::new(TenantConfig::demo()))
    }

    #[test]
    fn test_show_formats() {
        let view = demo_view();
        let yaml = show(&view, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("primaryColor: '#1e40af'"));

        let json = show(&view, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["business"]["currency"], "CLP");
    }

    #[test]
    fn test_theme_css() {
        let css = theme(&demo_view());
        assert!(css.starts_with(":root {"));
        assert!(css.contains("--primary-color: #1e40af;"));
    }

    #[test]
    fn test_price_breakdown() {
        let out = price(&demo_view(), 150000.0);
        assert!(out.contains("Subtotal  $150.000"));
        assert!(out.contains("Shipping  $0"));
        assert!(out.contains("Total     $178.500"));
        assert_eq!(out.lines().count(), 4);
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_features_listing() {
        let out = features(&demo_view());
        assert_eq!(out.lines().count(), 8);
        assert!(out.contains("socialLogin         off"));
        assert!(out.contains("wishlist            on"));
    }

    #[tokio::test]
    async fn test_init_writes_resolvable_tenant() {
        let dir = tempfile::TempDir::new().unwrap();
        let tenants = dir.path().join("tenants");

        let path = init(&tenants, "acme").await.unwrap();
        assert!(path.ends_with("acme.yaml"));

        let source = FileConfigSource::new(&tenants).await.unwrap();
        let config = source
            .resolve(&TenantSlug::parse("acme").unwrap())
            .await
            .unwrap();
        assert_eq!(config.owner_id, "acme-owner");
        assert!(init(&tenants, "Not A Slug").await.is_err());
    }
}
