//! Reactive holder of the active tenant configuration
//!
//! [`ConfigStore`] owns the single current [`TenantConfig`] for one tenant and
//! publishes every distinct change to its subscribers. Updates are applied
//! optimistically and confirmed or rolled back when the backend answers.
//!
//! Ordering: when several operations are in flight, each applies its result
//! when it completes, so the one that resolves last wins. A failed persist
//! rebuilds the config from the last confirmed value plus the patches that are
//! still pending, which removes only the failed patch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use storefront_core::theme::RenderEnvironment;
use storefront_core::{
    ConfigSource, Error, Result, TenantConfig, TenantConfigPatch, TenantContext, TenantSlug,
};

use crate::subscription::{ConfigSnapshot, ConfigSubscription};
use crate::theme_effect::ThemeEffect;
use crate::view::TenantView;

/// Coarse lifecycle of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// No resolution or update has completed yet
    Uninitialized,
    Resolving,
    Updating,
    Ready,
    /// The last completed operation failed; `last_error` holds the message
    Error,
}

struct State {
    current: Arc<TenantConfig>,
    /// Last config known to match the backend
    confirmed: Arc<TenantConfig>,
    /// Optimistic patches awaiting persistence, keyed by call order
    pending: BTreeMap<u64, TenantConfigPatch>,
    next_ticket: u64,
    resolving: usize,
    updating: usize,
    initialized: bool,
    resolved: bool,
    last_error: Option<String>,
    version: u64,
    closed: bool,
}

struct Inner {
    slug: TenantSlug,
    source: Arc<dyn ConfigSource>,
    state: Mutex<State>,
    theme: ThemeEffect,
    sender: watch::Sender<ConfigSnapshot>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `config` current if it differs and notify subscribers. Called
    /// with the state lock held; the returned snapshot goes to [`render`]
    /// once the lock is released.
    ///
    /// [`render`]: Inner::render
    fn publish(&self, state: &mut State, config: Arc<TenantConfig>) -> Option<ConfigSnapshot> {
        if *state.current == *config {
            return None;
        }

        state.version += 1;
        state.current = config;
        let snapshot = ConfigSnapshot {
            version: state.version,
            config: Arc::clone(&state.current),
        };
        self.sender.send_replace(snapshot.clone());
        Some(snapshot)
    }

    /// Push a published snapshot into the render environment. Must not be
    /// called with the state lock held.
    fn render(&self, published: Option<ConfigSnapshot>) {
        if let Some(snapshot) = published {
            self.theme.apply(snapshot.version, &snapshot.config);
        }
    }

    fn complete_resolve(&self, result: Result<TenantConfig>) -> Result<Arc<TenantConfig>> {
        let mut state = self.lock();
        state.resolving = state.resolving.saturating_sub(1);

        if state.closed {
            debug!(slug = %self.slug, "Discarding resolution result after teardown");
            return Err(Error::Resolution(
                "store was torn down before resolution completed".to_string(),
            ));
        }
        state.initialized = true;

        match result {
            Ok(config) => {
                info!(slug = %self.slug, tenant_id = %config.id, "Resolved tenant config");
                let config = Arc::new(config);
                state.confirmed = Arc::clone(&config);
                state.resolved = true;
                let published = self.publish(&mut state, config);
                let current = Arc::clone(&state.current);
                drop(state);
                self.render(published);
                Ok(current)
            }
            Err(e) => {
                let message = failure_message(e);
                warn!(slug = %self.slug, "Tenant config resolution failed: {}", message);
                state.last_error = Some(message.clone());
                Err(Error::Resolution(message))
            }
        }
    }

    fn complete_update(&self, ticket: u64, result: Result<()>) -> Result<Arc<TenantConfig>> {
        let mut state = self.lock();
        state.updating = state.updating.saturating_sub(1);
        let patch = state.pending.remove(&ticket);

        if state.closed {
            debug!(slug = %self.slug, ticket, "Discarding update result after teardown");
            return Err(Error::Update(
                "store was torn down before the update completed".to_string(),
            ));
        }
        state.initialized = true;

        let Some(patch) = patch else {
            return Err(Error::Update(format!("unknown update ticket {}", ticket)));
        };

        match result {
            Ok(()) => {
                info!(slug = %self.slug, ticket, "Persisted tenant config update");
                state.confirmed = Arc::new(state.confirmed.merge(&patch));
                let next = Arc::new(state.current.merge(&patch));
                let published = self.publish(&mut state, next);
                let current = Arc::clone(&state.current);
                drop(state);
                self.render(published);
                Ok(current)
            }
            Err(e) => {
                let message = failure_message(e);
                warn!(
                    slug = %self.slug,
                    ticket,
                    pending = state.pending.len(),
                    "Rolling back failed update: {}",
                    message
                );
                let mut rebuilt = (*state.confirmed).clone();
                for pending in state.pending.values() {
                    rebuilt.apply(pending);
                }
                let published = self.publish(&mut state, Arc::new(rebuilt));
                state.last_error = Some(message.clone());
                drop(state);
                self.render(published);
                Err(Error::Update(message))
            }
        }
    }

    fn abandon(&self, kind: Operation, ticket: Option<u64>, message: String) -> Error {
        let mut state = self.lock();
        match kind {
            Operation::Resolve => state.resolving = state.resolving.saturating_sub(1),
            Operation::Update => {
                state.updating = state.updating.saturating_sub(1);
                if let Some(ticket) = ticket {
                    state.pending.remove(&ticket);
                }
            }
        }
        warn!(slug = %self.slug, "Config operation aborted: {}", message);
        if !state.closed {
            state.initialized = true;
            state.last_error = Some(message.clone());
        }
        match kind {
            Operation::Resolve => Error::Resolution(message),
            Operation::Update => Error::Update(message),
        }
    }
}

/// Message of a failed backend call, without the prefix of a store-boundary
/// error the source already returned
fn failure_message(error: Error) -> String {
    match error {
        Error::Resolution(message) | Error::Update(message) => message,
        other => other.to_string(),
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Resolve,
    Update,
}

/// Shared handle to one tenant's configuration state.
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<Inner>,
}

impl ConfigStore {
    /// Create a store that starts from the demo config
    pub fn new(
        slug: TenantSlug,
        source: Arc<dyn ConfigSource>,
        env: Arc<dyn RenderEnvironment>,
    ) -> Self {
        Self::with_initial(slug, source, env, TenantConfig::demo())
    }

    /// Create a store with an explicit initial config.
    ///
    /// The theme for the initial config is applied immediately.
    pub fn with_initial(
        slug: TenantSlug,
        source: Arc<dyn ConfigSource>,
        env: Arc<dyn RenderEnvironment>,
        initial: TenantConfig,
    ) -> Self {
        let initial = Arc::new(initial);
        let theme = ThemeEffect::new(env);
        theme.apply(1, &initial);

        let (sender, _) = watch::channel(ConfigSnapshot {
            version: 1,
            config: Arc::clone(&initial),
        });

        let state = State {
            current: Arc::clone(&initial),
            confirmed: initial,
            pending: BTreeMap::new(),
            next_ticket: 0,
            resolving: 0,
            updating: 0,
            initialized: false,
            resolved: false,
            last_error: None,
            version: 1,
            closed: false,
        };

        Self {
            inner: Arc::new(Inner {
                slug,
                source,
                state: Mutex::new(state),
                theme,
                sender,
            }),
        }
    }

    pub fn slug(&self) -> &TenantSlug {
        &self.inner.slug
    }

    /// The active config; always defined
    pub fn current(&self) -> Arc<TenantConfig> {
        Arc::clone(&self.inner.lock().current)
    }

    /// Projection helpers over the current config
    pub fn view(&self) -> TenantView {
        TenantView::new(self.current())
    }

    /// Tenant context for downstream collaborators, resolved once the
    /// backend has supplied this tenant's config
    pub fn context(&self) -> TenantContext {
        let state = self.inner.lock();
        if state.resolved {
            TenantContext::resolved(self.inner.slug.clone(), state.confirmed.id)
        } else {
            TenantContext::unresolved(self.inner.slug.clone())
        }
    }

    pub fn is_loading(&self) -> bool {
        let state = self.inner.lock();
        state.resolving + state.updating > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    pub fn status(&self) -> StoreStatus {
        let state = self.inner.lock();
        if state.resolving > 0 {
            StoreStatus::Resolving
        } else if state.updating > 0 {
            StoreStatus::Updating
        } else if !state.initialized {
            StoreStatus::Uninitialized
        } else if state.last_error.is_some() {
            StoreStatus::Error
        } else {
            StoreStatus::Ready
        }
    }

    /// Number of distinct configs applied so far, starting at 1
    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    /// Whether the backend has supplied this tenant's config at least once
    pub fn is_resolved(&self) -> bool {
        self.inner.lock().resolved
    }

    /// How many times the theme has been pushed to the render environment
    pub fn theme_applications(&self) -> usize {
        self.inner.theme.applications()
    }

    pub fn subscribe(&self) -> ConfigSubscription {
        ConfigSubscription::new(self.inner.sender.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }

    /// Stop applying results. Operations still in flight complete against
    /// the backend but their outcome is discarded.
    pub fn teardown(&self) {
        let mut state = self.inner.lock();
        if !state.closed {
            state.closed = true;
            info!(slug = %self.inner.slug, "Config store torn down");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Fetch the tenant's config from the source and replace the current one.
    ///
    /// On failure the current config is kept and the message is recorded.
    pub async fn resolve(&self) -> Result<Arc<TenantConfig>> {
        {
            let mut state = self.inner.lock();
            if state.closed {
                return Err(Error::Resolution("store has been torn down".to_string()));
            }
            state.last_error = None;
            state.resolving += 1;
        }
        debug!(slug = %self.inner.slug, "Resolving tenant config");

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let result = inner.source.resolve(&inner.slug).await;
            inner.complete_resolve(result)
        });

        match task.await {
            Ok(result) => result,
            Err(e) => Err(self.inner.abandon(
                Operation::Resolve,
                None,
                format!("resolution task failed: {}", e),
            )),
        }
    }

    /// Re-resolve after the initial resolution
    pub async fn refresh(&self) -> Result<Arc<TenantConfig>> {
        self.resolve().await
    }

    /// Apply a partial update optimistically and persist it.
    ///
    /// A patch whose merge fails validation is rejected before anything
    /// changes. An empty patch is a no-op.
    pub async fn update(&self, patch: TenantConfigPatch) -> Result<Arc<TenantConfig>> {
        let (ticket, published) = {
            let mut state = self.inner.lock();
            if state.closed {
                return Err(Error::Update("store has been torn down".to_string()));
            }
            if patch.is_empty() {
                return Ok(Arc::clone(&state.current));
            }

            state.last_error = None;
            let merged = state.current.merge(&patch);
            if let Err(e) = merged.validate() {
                warn!(slug = %self.inner.slug, "Rejected config update: {}", e);
                state.initialized = true;
                state.last_error = Some(e.to_string());
                return Err(e);
            }

            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.pending.insert(ticket, patch.clone());
            state.updating += 1;
            let published = self.inner.publish(&mut state, Arc::new(merged));
            (ticket, published)
        };
        self.inner.render(published);
        debug!(slug = %self.inner.slug, ticket, "Persisting config update");

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let result = inner.source.persist(&inner.slug, &patch).await;
            inner.complete_update(ticket, result)
        });

        match task.await {
            Ok(result) => result,
            Err(e) => Err(self.inner.abandon(
                Operation::Update,
                Some(ticket),
                format!("update task failed: {}", e),
            )),
        }
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("ConfigStore")
            .field("slug", &self.inner.slug)
            .field("version", &state.version)
            .field("pending", &state.pending.len())
            .field("last_error", &state.last_error)
            .field("closed", &state.closed)
            .finish()
    }
}
