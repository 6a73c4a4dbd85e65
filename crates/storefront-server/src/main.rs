//! Storefront tenant configuration CLI
//!
//! Resolves a tenant's configuration from the configured backend and prints
//! what a storefront would render with it.
//!
//! Usage:
//! ```bash
//! # Demo tenant from the simulated backend
//! storefront show
//!
//! # A tenant from a directory of YAML/TOML files
//! STOREFRONT_CONFIG_DIR=~/.storefront/tenants storefront --tenant acme theme
//!
//! # Price breakdown in the tenant's currency
//! storefront price 150000
//!
//! # Create a tenant file from the demo config
//! storefront init acme --directory ./tenants
//! ```

mod bootstrap;
mod commands;
mod source_factory;

use bootstrap::BootstrapConfig;
use clap::{Parser, Subcommand};
use commands::OutputFormat;
use std::path::PathBuf;
use std::sync::Arc;
use storefront_core::TenantSlug;
use storefront_core::theme::RecordingEnvironment;
use storefront_store::ConfigStore;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Storefront - per-tenant branding, business and feature configuration
#[derive(Parser)]
#[command(name = "storefront", version)]
#[command(about = "Inspect and initialize storefront tenant configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to bootstrap configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "STOREFRONT_BOOTSTRAP",
        global = true
    )]
    config: Option<String>,

    /// Tenant slug (overrides bootstrap and environment)
    #[arg(short, long, value_name = "SLUG", global = true)]
    tenant: Option<String>,

    /// Output format for `show`
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml, global = true)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved tenant configuration
    Show,
    /// Print the theme as CSS custom properties
    Theme,
    /// Format an amount with tax and shipping in the tenant's currency
    Price {
        /// Order subtotal
        amount: f64,
    },
    /// List feature flags
    Features,
    /// Write the demo configuration as a new tenant file
    Init {
        /// Slug of the new tenant
        slug: String,

        /// Tenant directory (defaults to the bootstrap directory)
        #[arg(long)]
        directory: Option<PathBuf>,
    },
}

fn init_tracing(config: &BootstrapConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::new(format!("{}", log_level));

    // sqlx logs every query at info; keep it quiet unless asked
    if !config.logging.log_sql_queries {
        match "sqlx=warn".parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => tracing::warn!("Failed to set sqlx log filter: {}", e),
        }
    }

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Bootstrap file, then environment, then flags
    let mut config = match &cli.config {
        Some(path) => BootstrapConfig::from_file(path)?,
        None => BootstrapConfig::load_default()?,
    };
    config.merge_env();
    if let Some(tenant) = &cli.tenant {
        config.tenant = tenant.clone();
    }
    config.validate()?;

    init_tracing(&config)?;

    if let Commands::Init { slug, directory } = &cli.command {
        let directory = directory
            .clone()
            .or_else(|| config.expanded_directory())
            .ok_or("no tenant directory: pass --directory or set STOREFRONT_CONFIG_DIR")?;
        let path = commands::init(&directory, slug).await?;
        println!("Created {}", path.display());
        return Ok(());
    }

    let slug = TenantSlug::parse(&config.tenant)?;
    let source = source_factory::create_config_source(&config).await?;
    let env = Arc::new(RecordingEnvironment::new());
    let store = ConfigStore::new(slug, source, env.clone());

    // The demo config stays active if resolution fails
    if let Err(e) = store.resolve().await {
        warn!("Using default configuration: {}", e);
    }
    let view = store.view();
    info!(
        tenant = %store.slug(),
        version = store.version(),
        title = %env.title().unwrap_or_default(),
        "Tenant configuration ready"
    );

    let output = match cli.command {
        Commands::Show => commands::show(&view, cli.format)?,
        Commands::Theme => commands::theme(&view),
        Commands::Price { amount } => commands::price(&view, amount),
        Commands::Features => commands::features(&view),
        Commands::Init { .. } => String::new(),
    };
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    store.teardown();
    Ok(())
}
