//! Product data collaborator
//!
//! The storefront reads catalog data through [`ProductRepository`]. Every
//! operation is scoped by [`TenantId`]; a product owned by another tenant is
//! reported as not found. Deletion is soft: the product is marked inactive
//! and disappears from listings, but `get_by_id` still returns it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{tenant::TenantId, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<f64>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    /// Values for the tenant's custom fields, keyed by field id
    #[serde(default)]
    pub custom_fields: HashMap<String, serde_json::Value>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Percentage off the compare-at price, if the product is discounted
    pub fn discount_percent(&self) -> Option<u32> {
        let compare = self.compare_at_price?;
        if compare <= self.price || compare <= 0.0 {
            return None;
        }
        Some(((compare - self.price) / compare * 100.0).round() as u32)
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.code.to_lowercase().contains(needle)
    }
}

/// Fields supplied when creating a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    pub category: String,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub stock: u32,
    pub images: Vec<String>,
    pub custom_fields: HashMap<String, serde_json::Value>,
}

/// Partial product update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub compare_at_price: Option<Option<f64>>,
    pub category: Option<String>,
    pub brand: Option<Option<String>>,
    pub condition: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub custom_fields: Option<HashMap<String, serde_json::Value>>,
}

impl Product {
    fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(compare) = patch.compare_at_price {
            self.compare_at_price = compare;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(brand) = patch.brand {
            self.brand = brand;
        }
        if let Some(condition) = patch.condition {
            self.condition = condition;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(fields) = patch.custom_fields {
            self.custom_fields = fields;
        }
    }
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::ConfigValidation(format!(
            "price must be a non-negative amount, got {}",
            price
        )));
    }
    Ok(())
}

/// Tenant-scoped catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Active products of a tenant, newest first
    async fn list(&self, tenant_id: TenantId) -> Result<Vec<Product>>;

    /// Any product of the tenant, including soft-deleted ones
    async fn get_by_id(&self, tenant_id: TenantId, id: Uuid) -> Result<Product>;

    /// Case-insensitive match on name, description or code
    async fn search(&self, tenant_id: TenantId, query: &str) -> Result<Vec<Product>>;

    async fn list_by_category(&self, tenant_id: TenantId, category: &str) -> Result<Vec<Product>>;

    async fn create(&self, tenant_id: TenantId, data: NewProduct) -> Result<Product>;

    async fn update(&self, tenant_id: TenantId, id: Uuid, patch: ProductPatch) -> Result<Product>;

    /// Soft delete: marks the product inactive
    async fn delete(&self, tenant_id: TenantId, id: Uuid) -> Result<()>;

    async fn set_stock(&self, tenant_id: TenantId, id: Uuid, quantity: u32) -> Result<Product>;
}

/// In-process catalog used by tests and demos
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn active_where<F>(&self, tenant_id: TenantId, predicate: F) -> Vec<Product>
    where
        F: Fn(&Product) -> bool,
    {
        let products = self.products.read().await;
        let mut found: Vec<Product> = products
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.active && predicate(p))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.name.cmp(&b.name)));
        found
    }

    async fn modify<F>(&self, tenant_id: TenantId, id: Uuid, change: F) -> Result<Product>
    where
        F: FnOnce(&mut Product),
    {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .filter(|p| p.tenant_id == tenant_id)
            .ok_or_else(|| Error::ProductNotFound(id.to_string()))?;
        change(product);
        product.updated_at = Utc::now();
        Ok(product.clone())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, tenant_id: TenantId) -> Result<Vec<Product>> {
        Ok(self.active_where(tenant_id, |_| true).await)
    }

    async fn get_by_id(&self, tenant_id: TenantId, id: Uuid) -> Result<Product> {
        self.products
            .read()
            .await
            .get(&id)
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| Error::ProductNotFound(id.to_string()))
    }

    async fn search(&self, tenant_id: TenantId, query: &str) -> Result<Vec<Product>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list(tenant_id).await;
        }
        Ok(self.active_where(tenant_id, |p| p.matches(&needle)).await)
    }

    async fn list_by_category(&self, tenant_id: TenantId, category: &str) -> Result<Vec<Product>> {
        Ok(self
            .active_where(tenant_id, |p| p.category.eq_ignore_ascii_case(category))
            .await)
    }

    async fn create(&self, tenant_id: TenantId, data: NewProduct) -> Result<Product> {
        validate_price(data.price)?;
        if data.name.trim().is_empty() {
            return Err(Error::ConfigValidation("product name must not be empty".to_string()));
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            tenant_id,
            code: data.code,
            name: data.name,
            description: data.description,
            price: data.price,
            compare_at_price: data.compare_at_price,
            category: data.category,
            brand: data.brand,
            condition: data.condition,
            stock: data.stock,
            images: data.images,
            custom_fields: data.custom_fields,
            active: true,
            created_at: now,
            updated_at: now,
        };

        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        tracing::debug!(tenant = %tenant_id, product = %product.id, "Created product");
        Ok(product)
    }

    async fn update(&self, tenant_id: TenantId, id: Uuid, patch: ProductPatch) -> Result<Product> {
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        self.modify(tenant_id, id, |p| p.apply(patch)).await
    }

    async fn delete(&self, tenant_id: TenantId, id: Uuid) -> Result<()> {
        self.modify(tenant_id, id, |p| p.active = false).await?;
        tracing::debug!(tenant = %tenant_id, product = %id, "Deactivated product");
        Ok(())
    }

    async fn set_stock(&self, tenant_id: TenantId, id: Uuid, quantity: u32) -> Result<Product> {
        self.modify(tenant_id, id, |p| p.stock = quantity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, category: &str, price: f64) -> NewProduct {
        NewProduct {
            code: format!("SKU-{}", name.to_uppercase()),
            name: name.to_string(),
            description: format!("{} for everyday use", name),
            price,
            category: category.to_string(),
            stock: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_list_scoped_by_tenant() {
        let repo = InMemoryProductRepository::new();
        let tenant = TenantId::new();
        let other = TenantId::new();

        repo.create(tenant, item("Tent", "Camping", 120000.0)).await.unwrap();
        repo.create(other, item("Kettle", "Hogar", 15000.0)).await.unwrap();

        let listed = repo.list(tenant).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Tent");
    }

    #[tokio::test]
    async fn test_other_tenant_cannot_read_or_modify() {
        let repo = InMemoryProductRepository::new();
        let tenant = TenantId::new();
        let product = repo.create(tenant, item("Tent", "Camping", 1.0)).await.unwrap();

        let intruder = TenantId::new();
        assert!(matches!(
            repo.get_by_id(intruder, product.id).await,
            Err(Error::ProductNotFound(_))
        ));
        assert!(repo.set_stock(intruder, product.id, 0).await.is_err());
        assert!(repo.delete(intruder, product.id).await.is_err());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_listings() {
        let repo = InMemoryProductRepository::new();
        let tenant = TenantId::new();
        let product = repo.create(tenant, item("Tent", "Camping", 1.0)).await.unwrap();

        repo.delete(tenant, product.id).await.unwrap();

        assert!(repo.list(tenant).await.unwrap().is_empty());
        assert!(repo.list_by_category(tenant, "Camping").await.unwrap().is_empty());
        let fetched = repo.get_by_id(tenant, product.id).await.unwrap();
        assert!(!fetched.active);
    }

    #[tokio::test]
    async fn test_search_and_category() {
        let repo = InMemoryProductRepository::new();
        let tenant = TenantId::new();
        repo.create(tenant, item("Tent", "Camping", 1.0)).await.unwrap();
        repo.create(tenant, item("Lantern", "camping", 1.0)).await.unwrap();
        repo.create(tenant, item("Blender", "Hogar", 1.0)).await.unwrap();

        assert_eq!(repo.search(tenant, "LANT").await.unwrap().len(), 1);
        assert_eq!(repo.search(tenant, "sku-blender").await.unwrap().len(), 1);
        assert_eq!(repo.search(tenant, "everyday").await.unwrap().len(), 3);
        assert_eq!(repo.search(tenant, "  ").await.unwrap().len(), 3);
        assert_eq!(repo.list_by_category(tenant, "Camping").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_set_stock() {
        let repo = InMemoryProductRepository::new();
        let tenant = TenantId::new();
        let product = repo.create(tenant, item("Tent", "Camping", 100.0)).await.unwrap();

        let updated = repo
            .update(
                tenant,
                product.id,
                ProductPatch {
                    price: Some(80.0),
                    compare_at_price: Some(Some(100.0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 80.0);
        assert_eq!(updated.name, "Tent");
        assert_eq!(updated.discount_percent(), Some(20));

        let stocked = repo.set_stock(tenant, product.id, 42).await.unwrap();
        assert_eq!(stocked.stock, 42);
    }

    #[tokio::test]
    async fn test_rejects_negative_price() {
        let repo = InMemoryProductRepository::new();
        let tenant = TenantId::new();
        assert!(repo.create(tenant, item("Tent", "Camping", -1.0)).await.is_err());

        let product = repo.create(tenant, item("Tent", "Camping", 1.0)).await.unwrap();
        let patch = ProductPatch {
            price: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(repo.update(tenant, product.id, patch).await.is_err());
    }
}
