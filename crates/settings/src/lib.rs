pub mod preferences;
pub mod provider;
pub mod recent;

pub use preferences::{
    EditorPreferences, Preferences, PreferencesError, PreferencesStore, UiPreferences,
};
pub use provider::{
    DefaultSettings, EditorSettings, MapSettings, SettingsProvider, CASE_SENSITIVE_KEY,
    FONT_SIZE_KEY, WORD_WRAP_KEY,
};
pub use recent::{
    RecentFile, RecentFiles, RecentFilesError, RecentFilesStore, DEFAULT_RECENT_CAPACITY,
};
