//! Storefront Config Store
//!
//! Reactive, optimistic holder of the active tenant configuration:
//! - `ConfigStore`: resolution, partial updates with rollback, subscriptions
//! - `TenantView`: read-only projections used by rendering code
//! - `AdminPanel`: draft editing and submission
//! - `SimulatedSource`: in-memory backend for demos and tests

pub mod admin;
pub mod simulated;
pub mod store;
pub mod subscription;
pub mod theme_effect;
pub mod view;

pub use admin::{AdminNotice, AdminPanel};
pub use simulated::SimulatedSource;
pub use store::{ConfigStore, StoreStatus};
pub use subscription::{ConfigSnapshot, ConfigSubscription};
pub use view::TenantView;
