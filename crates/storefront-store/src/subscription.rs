//! Scoped subscriptions to config changes

use futures::stream::{self, BoxStream};
use std::sync::Arc;
use tokio::sync::watch;

use storefront_core::TenantConfig;

/// One published config value
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Increments once per distinct config applied by the store
    pub version: u64,
    pub config: Arc<TenantConfig>,
}

/// Receiver half held by a consumer.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct ConfigSubscription {
    rx: watch::Receiver<ConfigSnapshot>,
}

impl ConfigSubscription {
    pub(crate) fn new(rx: watch::Receiver<ConfigSnapshot>) -> Self {
        Self { rx }
    }

    /// Latest snapshot, marking it as seen
    pub fn current(&mut self) -> ConfigSnapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Whether a snapshot newer than the last seen one is available
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next snapshot. Returns `None` once the store is gone.
    ///
    /// Intermediate values published while the consumer was busy are
    /// skipped; only the latest is delivered.
    pub async fn changed(&mut self) -> Option<ConfigSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Convert into a stream of snapshots, ending when the store is dropped
    pub fn into_stream(self) -> BoxStream<'static, ConfigSnapshot> {
        Box::pin(stream::unfold(self, |mut sub| async move {
            sub.changed().await.map(|snapshot| (snapshot, sub))
        }))
    }
}
