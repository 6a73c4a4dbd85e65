//! Theme derivation and the rendering-environment side channel
//!
//! A tenant's branding is pushed into the page as four global CSS custom
//! properties plus the document title. [`RenderEnvironment`] is the seam the
//! store writes through; [`RecordingEnvironment`] keeps the writes in memory.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::config::TenantConfig;

pub const PRIMARY_COLOR_VAR: &str = "--primary-color";
pub const SECONDARY_COLOR_VAR: &str = "--secondary-color";
pub const ACCENT_COLOR_VAR: &str = "--accent-color";
pub const FONT_FAMILY_VAR: &str = "--font-family";

/// Values derived from a config that the render environment receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeVariables {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub title: String,
}

impl ThemeVariables {
    pub fn from_config(config: &TenantConfig) -> Self {
        Self {
            primary_color: config.branding.primary_color.clone(),
            secondary_color: config.branding.secondary_color.clone(),
            accent_color: config.branding.accent_color.clone(),
            font_family: config.branding.font_family.clone(),
            title: config.business.name.clone(),
        }
    }

    /// Custom properties as `(name, value)` pairs
    pub fn properties(&self) -> [(&'static str, &str); 4] {
        [
            (PRIMARY_COLOR_VAR, self.primary_color.as_str()),
            (SECONDARY_COLOR_VAR, self.secondary_color.as_str()),
            (ACCENT_COLOR_VAR, self.accent_color.as_str()),
            (FONT_FAMILY_VAR, self.font_family.as_str()),
        ]
    }

    /// Render the properties as a `:root` stylesheet block
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in self.properties() {
            css.push_str(&format!("  {}: {};\n", name, value));
        }
        css.push('}');
        css
    }

    /// Write every property and the title to an environment
    pub fn apply_to(&self, env: &dyn RenderEnvironment) {
        for (name, value) in self.properties() {
            env.set_style_property(name, value);
        }
        env.set_title(&self.title);
    }
}

/// Global style scope and window title of the page being rendered.
///
/// The store writes to it after releasing its own state, so an
/// implementation may read the store back from these calls.
pub trait RenderEnvironment: Send + Sync {
    fn set_style_property(&self, name: &str, value: &str);

    fn set_title(&self, title: &str);
}

/// Environment that discards all writes
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEnvironment;

impl RenderEnvironment for NoopEnvironment {
    fn set_style_property(&self, _name: &str, _value: &str) {}

    fn set_title(&self, _title: &str) {}
}

#[derive(Debug, Default)]
struct Recorded {
    properties: BTreeMap<String, String>,
    title: Option<String>,
    writes: usize,
}

/// Environment that keeps the latest values and counts writes
#[derive(Debug, Default)]
pub struct RecordingEnvironment {
    inner: Mutex<Recorded>,
}

impl RecordingEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(&self, name: &str) -> Option<String> {
        self.lock().properties.get(name).cloned()
    }

    pub fn properties(&self) -> BTreeMap<String, String> {
        self.lock().properties.clone()
    }

    pub fn title(&self) -> Option<String> {
        self.lock().title.clone()
    }

    /// Number of individual writes (properties and title) received
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderEnvironment for RecordingEnvironment {
    fn set_style_property(&self, name: &str, value: &str) {
        let mut inner = self.lock();
        inner.properties.insert(name.to_string(), value.to_string());
        inner.writes += 1;
    }

    fn set_title(&self, title: &str) {
        let mut inner = self.lock();
        inner.title = Some(title.to_string());
        inner.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_from_demo() {
        let vars = ThemeVariables::from_config(&TenantConfig::demo());
        assert_eq!(vars.primary_color, "#1e40af");
        assert_eq!(vars.title, "Demo Store");
    }

    #[test]
    fn test_css_block() {
        let vars = ThemeVariables::from_config(&TenantConfig::demo());
        let css = vars.to_css();
        assert!(css.starts_with(":root {"));
        assert!(css.contains("  --primary-color: #1e40af;\n"));
        assert!(css.contains("  --font-family: Inter, sans-serif;\n"));
        assert!(css.ends_with('}'));
    }

    #[test]
    fn test_apply_writes_five_values() {
        let env = RecordingEnvironment::new();
        ThemeVariables::from_config(&TenantConfig::demo()).apply_to(&env);

        assert_eq!(env.write_count(), 5);
        assert_eq!(env.property(ACCENT_COLOR_VAR).as_deref(), Some("#f59e0b"));
        assert_eq!(env.title().as_deref(), Some("Demo Store"));
        assert_eq!(env.properties().len(), 4);
    }
}
