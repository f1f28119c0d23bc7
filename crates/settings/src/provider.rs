use std::collections::HashMap;

use tracing::warn;

/// Key holding the default case sensitivity for new searches.
pub const CASE_SENSITIVE_KEY: &str = "caseSensitive";
/// Key controlling soft wrapping of long lines.
pub const WORD_WRAP_KEY: &str = "wordWrap";
/// Key holding the editor font size in pixels.
pub const FONT_SIZE_KEY: &str = "fontSize";

pub const DEFAULT_FONT_SIZE: u32 = 14;
pub const MIN_FONT_SIZE: u32 = 10;
pub const MAX_FONT_SIZE: u32 = 24;

/// Read-only access to persisted string settings.
///
/// A missing key means "use the built-in default" and is never an error.
pub trait SettingsProvider {
    fn get(&self, key: &str) -> Option<String>;
}

impl<T: SettingsProvider + ?Sized> SettingsProvider for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Provider that never has a value; every lookup falls back to defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSettings;

impl SettingsProvider for DefaultSettings {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory provider, handy for tests and for hosts that keep settings elsewhere.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

impl SettingsProvider for MapSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Editor options resolved from a [`SettingsProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSettings {
    pub case_sensitive: bool,
    pub word_wrap: bool,
    pub font_size: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            word_wrap: true,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl EditorSettings {
    pub fn from_provider(provider: &dyn SettingsProvider) -> Self {
        let defaults = Self::default();
        Self {
            case_sensitive: read_bool(provider, CASE_SENSITIVE_KEY, defaults.case_sensitive),
            word_wrap: read_bool(provider, WORD_WRAP_KEY, defaults.word_wrap),
            font_size: read_font_size(provider),
        }
    }
}

fn read_bool(provider: &dyn SettingsProvider, key: &str, default: bool) -> bool {
    let Some(raw) = provider.get(key) else {
        return default;
    };
    match raw.trim() {
        "true" => true,
        "false" => false,
        other => {
            warn!(key, value = other, "ignoring unparseable boolean setting");
            default
        }
    }
}

fn read_font_size(provider: &dyn SettingsProvider) -> u32 {
    let Some(raw) = provider.get(FONT_SIZE_KEY) else {
        return DEFAULT_FONT_SIZE;
    };
    match raw.trim().parse::<u32>() {
        Ok(size) => size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE),
        Err(err) => {
            warn!(key = FONT_SIZE_KEY, value = %raw, error = %err, "ignoring unparseable font size");
            DEFAULT_FONT_SIZE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let settings = EditorSettings::from_provider(&DefaultSettings);
        assert_eq!(settings, EditorSettings::default());
        assert!(!settings.case_sensitive);
        assert!(settings.word_wrap);
        assert_eq!(settings.font_size, 14);
    }

    #[test]
    fn recognised_keys_are_parsed() {
        let provider = MapSettings::new()
            .with(CASE_SENSITIVE_KEY, "true")
            .with(WORD_WRAP_KEY, "false")
            .with(FONT_SIZE_KEY, "18");
        let settings = EditorSettings::from_provider(&provider);
        assert!(settings.case_sensitive);
        assert!(!settings.word_wrap);
        assert_eq!(settings.font_size, 18);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let provider = MapSettings::new()
            .with(CASE_SENSITIVE_KEY, "yes please")
            .with(FONT_SIZE_KEY, "huge");
        let settings = EditorSettings::from_provider(&provider);
        assert!(!settings.case_sensitive);
        assert_eq!(settings.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn font_size_is_clamped() {
        let small = MapSettings::new().with(FONT_SIZE_KEY, "2");
        assert_eq!(EditorSettings::from_provider(&small).font_size, MIN_FONT_SIZE);
        let large = MapSettings::new().with(FONT_SIZE_KEY, "99");
        assert_eq!(EditorSettings::from_provider(&large).font_size, MAX_FONT_SIZE);
    }
}
