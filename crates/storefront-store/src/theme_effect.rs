//! Theme side effect keyed on config version

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use storefront_core::TenantConfig;
use storefront_core::theme::{RenderEnvironment, ThemeVariables};

/// Pushes theme variables and the title into a render environment, at most
/// once per config version.
///
/// Versions only move forward: a version at or below the last applied one is
/// skipped, so a stale config never overwrites a newer theme.
pub struct ThemeEffect {
    env: Arc<dyn RenderEnvironment>,
    last_applied: Mutex<Option<u64>>,
    applications: AtomicUsize,
}

impl ThemeEffect {
    pub fn new(env: Arc<dyn RenderEnvironment>) -> Self {
        Self {
            env,
            last_applied: Mutex::new(None),
            applications: AtomicUsize::new(0),
        }
    }

    /// Apply the theme for `version`; returns false if it or a later version
    /// was already applied
    pub fn apply(&self, version: u64, config: &TenantConfig) -> bool {
        let mut last = self
            .last_applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last.is_some_and(|applied| applied >= version) {
            return false;
        }

        let vars = ThemeVariables::from_config(config);
        vars.apply_to(self.env.as_ref());
        *last = Some(version);
        self.applications.fetch_add(1, Ordering::Relaxed);

        debug!(
            version,
            primary = %vars.primary_color,
            title = %vars.title,
            "Applied tenant theme"
        );
        true
    }

    /// Version whose theme is currently in the environment
    pub fn last_applied(&self) -> Option<u64> {
        *self
            .last_applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// How many times the theme has been written
    pub fn applications(&self) -> usize {
        self.applications.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::theme::{PRIMARY_COLOR_VAR, RecordingEnvironment};

    #[test]
    fn test_applies_once_per_version() {
        let env = Arc::new(RecordingEnvironment::new());
        let effect = ThemeEffect::new(env.clone());
        let config = TenantConfig::demo();

        assert!(effect.apply(1, &config));
        assert!(!effect.apply(1, &config));
        assert_eq!(effect.applications(), 1);
        assert_eq!(env.write_count(), 5);

        let mut changed = config.clone();
        changed.branding.primary_color = "#dc2626".to_string();
        assert!(effect.apply(2, &changed));
        assert_eq!(effect.last_applied(), Some(2));
        assert_eq!(env.property(PRIMARY_COLOR_VAR).as_deref(), Some("#dc2626"));
    }

    #[test]
    fn test_stale_version_is_skipped() {
        let env = Arc::new(RecordingEnvironment::new());
        let effect = ThemeEffect::new(env.clone());

        let mut newer = TenantConfig::demo();
        newer.branding.primary_color = "#dc2626".to_string();
        assert!(effect.apply(3, &newer));
        assert!(!effect.apply(2, &TenantConfig::demo()));

        assert_eq!(effect.last_applied(), Some(3));
        assert_eq!(effect.applications(), 1);
        assert_eq!(env.property(PRIMARY_COLOR_VAR).as_deref(), Some("#dc2626"));
    }
}
