//! Light/dark preference and the toggle that flips it.

use crate::ports::ViewPorts;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Key the preference is stored under.
pub const THEME_STORAGE_KEY: &str = "theme";
/// Root class present while the light theme is active.
pub const LIGHT_THEME_CLASS: &str = "light-theme";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// Anything other than the literal `"light"` falls back to dark.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Toggle label, naming the theme the button switches *to*.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Modo oscuro",
            Theme::Dark => "Modo claro",
        }
    }

    /// `aria-pressed` of the toggle while this theme is active.
    pub fn toggle_pressed(self) -> bool {
        matches!(self, Theme::Light)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PreferenceError {
    /// No storage backend exists.
    Unavailable,
    /// The backend refused the access.
    Denied(String),
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceError::Unavailable => write!(f, "preference storage unavailable"),
            PreferenceError::Denied(reason) => write!(f, "preference access denied: {reason}"),
        }
    }
}

impl std::error::Error for PreferenceError {}

/// Durable key-value storage for user preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Two stores kept in step.
///
/// Reads prefer `primary` and fall back to `secondary` when it has no value
/// or fails. Writes go to both and succeed when either one accepts.
#[derive(Debug, Clone, Default)]
pub struct MirroredPreferenceStore<A, B> {
    primary: A,
    secondary: B,
}

impl<A: PreferenceStore, B: PreferenceStore> MirroredPreferenceStore<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<A: PreferenceStore, B: PreferenceStore> PreferenceStore for MirroredPreferenceStore<A, B> {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        match self.primary.get(key) {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => self.secondary.get(key).or(Ok(None)),
            Err(err) => self.secondary.get(key).map_err(|_| err),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let primary = self.primary.set(key, value);
        let secondary = self.secondary.set(key, value);
        primary.or(secondary)
    }
}

/// Wraps a store so that read and write failures degrade to defaults.
pub struct SafePreferences<P> {
    store: P,
}

impl<P: PreferenceStore> SafePreferences<P> {
    pub fn new(store: P) -> Self {
        Self { store }
    }

    pub fn load_theme(&self) -> Theme {
        match self.store.get(THEME_STORAGE_KEY) {
            Ok(value) => Theme::from_stored(value.as_deref()),
            Err(err) => {
                debug!(%err, "theme preference unreadable, using dark");
                Theme::Dark
            }
        }
    }

    /// Returns whether the value reached the store.
    pub fn save_theme(&mut self, theme: Theme) -> bool {
        match self.store.set(THEME_STORAGE_KEY, theme.as_str()) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, %theme, "theme preference not persisted");
                false
            }
        }
    }

    pub fn into_inner(self) -> P {
        self.store
    }
}

/// In-memory store. Clones share the same values, and either direction can
/// be made to fail to stand in for disabled storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: Rc<RefCell<HashMap<String, String>>>,
    deny_reads: bool,
    deny_writes: bool,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// A store whose reads and writes both fail.
    pub fn denied() -> Self {
        Self {
            deny_reads: true,
            deny_writes: true,
            ..Self::default()
        }
    }

    pub fn deny_writes(mut self) -> Self {
        self.deny_writes = true;
        self
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        if self.deny_reads {
            return Err(PreferenceError::Denied("reads disabled".to_string()));
        }
        Ok(self.value(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        if self.deny_writes {
            return Err(PreferenceError::Denied("writes disabled".to_string()));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Current theme plus the store it is persisted to.
pub struct ThemeController<P: PreferenceStore> {
    prefs: SafePreferences<P>,
    theme: Theme,
}

impl<P: PreferenceStore> ThemeController<P> {
    /// Reads the stored theme, applies it, and writes the normalized value
    /// back.
    pub fn init(store: P, ports: &mut ViewPorts) -> Self {
        let mut prefs = SafePreferences::new(store);
        let theme = prefs.load_theme();
        apply_theme(theme, ports);
        prefs.save_theme(theme);
        Self { prefs, theme }
    }

    pub fn toggle(&mut self, ports: &mut ViewPorts) -> Theme {
        self.theme = self.theme.toggled();
        apply_theme(self.theme, ports);
        self.prefs.save_theme(self.theme);
        self.theme
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn into_store(self) -> P {
        self.prefs.into_inner()
    }
}

fn apply_theme(theme: Theme, ports: &mut ViewPorts) {
    if let Some(root) = ports.root.as_mut() {
        root.set_class(LIGHT_THEME_CLASS, theme == Theme::Light);
    }
    if let Some(toggle) = ports.theme_toggle.as_mut() {
        toggle.set_label(theme.toggle_label());
        toggle.set_pressed(theme.toggle_pressed());
    }
}
