//! Config source factory
//!
//! Builds the `ConfigSource` selected by the bootstrap configuration.

use std::sync::Arc;
use std::time::Duration;

use storefront_config_file::FileConfigSource;
use storefront_core::{ConfigSource, Error, Result};
use storefront_store::SimulatedSource;

use crate::bootstrap::{BootstrapConfig, SourceKind};

/// Create a config source based on bootstrap configuration
///
/// # Errors
/// - `Error::Config` if the file directory is missing or database support
///   was not compiled in
/// - `Error::Database` if the database connection fails
pub async fn create_config_source(config: &BootstrapConfig) -> Result<Arc<dyn ConfigSource>> {
    match config.source {
        SourceKind::Simulated => {
            tracing::info!(
                latency_ms = config.simulated_latency_ms,
                "Using simulated config source"
            );
            let source = SimulatedSource::new()
                .with_latency(Duration::from_millis(config.simulated_latency_ms));
            Ok(Arc::new(source))
        }
        SourceKind::File => {
            let directory = config
                .expanded_directory()
                .ok_or_else(|| Error::Config("directory is required for file mode".to_string()))?;
            tracing::info!("Using file config source at {:?}", directory);
            Ok(Arc::new(FileConfigSource::new(directory).await?))
        }
        SourceKind::Database => create_database_source(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn create_database_source(config: &BootstrapConfig) -> Result<Arc<dyn ConfigSource>> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| Error::Config("database_url is required for database mode".to_string()))?;
    tracing::info!("Using PostgreSQL config source");
    let source = storefront_config_postgres::PostgresConfigSource::new(url).await?;
    Ok(Arc::new(source))
}

#[cfg(not(feature = "postgres"))]
async fn create_database_source(_config: &BootstrapConfig) -> Result<Arc<dyn ConfigSource>> {
    Err(Error::Config(
        "database source requires the 'postgres' feature".to_string(),
    ))
}
