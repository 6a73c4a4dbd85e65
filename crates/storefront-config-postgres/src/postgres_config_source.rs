//! PostgresConfigSource - ConfigSource trait implementation for hosted tenant storage

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{debug, info};

use storefront_core::{
    ConfigSource, Error, Result, TenantConfig, TenantConfigPatch, TenantId, TenantSlug,
};

/// PostgreSQL-backed configuration source
///
/// Stores tenant configurations in a PostgreSQL database with:
/// - JSONB column holding the full `TenantConfig`
/// - Unique slug column for lookups from the storefront
/// - Version counter bumped on every write
/// - Audit history of every persisted config
#[derive(Clone)]
pub struct PostgresConfigSource {
    /// PostgreSQL connection pool
    pool: Arc<PgPool>,
}

fn db_error(context: &str) -> impl Fn(sqlx::Error) -> Error + '_ {
    move |e| Error::Database(format!("{}: {}", context, e))
}

/// Decode the JSONB column into a validated config
fn config_from_value(slug: &TenantSlug, value: serde_json::Value) -> Result<TenantConfig> {
    let config = TenantConfig::from_json(value)?;
    if &config.slug != slug {
        return Err(Error::Config(format!(
            "Stored config for '{}' declares slug '{}'",
            slug, config.slug
        )));
    }
    Ok(config)
}

impl PostgresConfigSource {
    /// Create a new PostgreSQL configuration source
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    ///
    /// # Errors
    /// - `Error::Database` if connection fails or schema migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(db_error("Failed to connect to PostgreSQL"))?;

        let source = Self {
            pool: Arc::new(pool),
        };

        // Run schema migrations
        source.run_migrations().await?;

        info!("Initialized PostgresConfigSource");
        Ok(source)
    }

    /// Create from an existing pool (useful for testing)
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Run database schema migrations
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tenant_configs (
                tenant_id UUID PRIMARY KEY,
                slug TEXT NOT NULL UNIQUE,
                config JSONB NOT NULL,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW(),
                version INT NOT NULL DEFAULT 1,
                CONSTRAINT valid_config CHECK (jsonb_typeof(config) = 'object')
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to create tenant_configs table"))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tenant_config_history (
                id BIGSERIAL PRIMARY KEY,
                tenant_id UUID NOT NULL,
                config JSONB NOT NULL,
                version INT NOT NULL,
                changed_at TIMESTAMPTZ DEFAULT NOW(),
                FOREIGN KEY (tenant_id) REFERENCES tenant_configs(tenant_id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to create tenant_config_history table"))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_tenant_config_history_tenant
            ON tenant_config_history(tenant_id, changed_at DESC)
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(db_error("Failed to create history index"))?;

        Ok(())
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert or replace a tenant's complete config
    ///
    /// Returns the new version number.
    pub async fn save_config(&self, config: &TenantConfig) -> Result<i32> {
        config.validate()?;
        let value = serde_json::to_value(config)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let row = sqlx::query(
            r#"
            INSERT INTO tenant_configs (tenant_id, slug, config, version)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (tenant_id) DO UPDATE
            SET slug = $2,
                config = $3,
                version = tenant_configs.version + 1,
                updated_at = NOW()
            RETURNING version
            "#,
        )
        .bind(config.id.as_uuid())
        .bind(config.slug.as_str())
        .bind(&value)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to save config"))?;

        let version: i32 = row
            .try_get("version")
            .map_err(db_error("Failed to get version"))?;

        Self::record_history(&mut tx, config.id, &value, version).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!(tenant = %config.slug, version, "Saved tenant config");
        Ok(version)
    }

    async fn record_history(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant_id: TenantId,
        value: &serde_json::Value,
        version: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tenant_config_history (tenant_id, config, version)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(value)
        .bind(version)
        .execute(&mut **tx)
        .await
        .map_err(db_error("Failed to record config history"))?;
        Ok(())
    }

    /// Current version number of a tenant's config
    pub async fn version(&self, slug: &TenantSlug) -> Result<i32> {
        let row = sqlx::query("SELECT version FROM tenant_configs WHERE slug = $1")
            .bind(slug.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to query version"))?
            .ok_or_else(|| Error::TenantNotFound(slug.to_string()))?;

        row.try_get("version")
            .map_err(db_error("Failed to extract version"))
    }

    /// Slugs of all tenants, oldest first
    pub async fn list_tenants(&self) -> Result<Vec<TenantSlug>> {
        let rows = sqlx::query("SELECT slug FROM tenant_configs ORDER BY created_at ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error("Failed to list tenants"))?;

        let slugs = rows
            .into_iter()
            .filter_map(|row| {
                row.try_get::<String, _>("slug")
                    .ok()
                    .and_then(|s| TenantSlug::parse(&s).ok())
            })
            .collect();

        Ok(slugs)
    }

    /// Delete a tenant's config and its history
    pub async fn delete_config(&self, slug: &TenantSlug) -> Result<()> {
        let result = sqlx::query("DELETE FROM tenant_configs WHERE slug = $1")
            .bind(slug.as_str())
            .execute(&*self.pool)
            .await
            .map_err(db_error("Failed to delete config"))?;

        if result.rows_affected() == 0 {
            return Err(Error::TenantNotFound(slug.to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl ConfigSource for PostgresConfigSource {
    async fn resolve(&self, slug: &TenantSlug) -> Result<TenantConfig> {
        let row = sqlx::query("SELECT config FROM tenant_configs WHERE slug = $1")
            .bind(slug.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to query config"))?;

        match row {
            Some(row) => {
                let value: serde_json::Value = row
                    .try_get("config")
                    .map_err(db_error("Failed to extract config"))?;
                debug!(tenant = %slug, "Resolved tenant config from database");
                config_from_value(slug, value)
            }
            None => Err(Error::TenantNotFound(slug.to_string())),
        }
    }

    async fn persist(&self, slug: &TenantSlug, patch: &TenantConfigPatch) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        // Lock the row so concurrent writers apply their patches one at a time
        let row = sqlx::query("SELECT config FROM tenant_configs WHERE slug = $1 FOR UPDATE")
            .bind(slug.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to query config"))?
            .ok_or_else(|| Error::TenantNotFound(slug.to_string()))?;

        let value: serde_json::Value = row
            .try_get("config")
            .map_err(db_error("Failed to extract config"))?;

        let mut config = config_from_value(slug, value)?;
        config.apply(patch);
        config.validate()?;
        config.updated_at = chrono::Utc::now();
        let value = serde_json::to_value(&config)?;

        let row = sqlx::query(
            r#"
            UPDATE tenant_configs
            SET config = $2,
                version = version + 1,
                updated_at = NOW()
            WHERE slug = $1
            RETURNING version
            "#,
        )
        .bind(slug.as_str())
        .bind(&value)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update config"))?;

        let version: i32 = row
            .try_get("version")
            .map_err(db_error("Failed to get version"))?;

        Self::record_history(&mut tx, config.id, &value, version).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!(tenant = %slug, version, "Persisted tenant config patch");
        Ok(())
    }
}
