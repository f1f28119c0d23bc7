use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::provider::{
    SettingsProvider, CASE_SENSITIVE_KEY, DEFAULT_FONT_SIZE, FONT_SIZE_KEY, MAX_FONT_SIZE,
    MIN_FONT_SIZE, WORD_WRAP_KEY,
};

const PREFERENCES_VERSION: u32 = 1;
const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 30_000;
const MIN_AUTO_SAVE_INTERVAL_MS: u64 = 1_000;
const MAX_AUTO_SAVE_INTERVAL_MS: u64 = 3_600_000;
const KNOWN_THEMES: [&str; 3] = ["dark", "light", "highContrast"];

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize preferences {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub editor: EditorPreferences,
    #[serde(default)]
    pub ui: UiPreferences,
}

fn default_version() -> u32 {
    PREFERENCES_VERSION
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            editor: EditorPreferences::default(),
            ui: UiPreferences::default(),
        }
    }
}

impl Preferences {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = PREFERENCES_VERSION;
        }
        self.editor.sanitize();
        self.ui.sanitize();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorPreferences {
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_true")]
    pub word_wrap: bool,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_true")]
    pub show_line_numbers: bool,
    /// Held for the host editor, which owns the save timer; the toolkit itself
    /// only persists and exposes this value.
    #[serde(default)]
    pub auto_save: bool,
    /// Auto-save period used by the host editor, clamped to 1s..=1h.
    #[serde(default = "default_auto_save_interval")]
    pub auto_save_interval_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_auto_save_interval() -> u64 {
    DEFAULT_AUTO_SAVE_INTERVAL_MS
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            word_wrap: true,
            font_size: DEFAULT_FONT_SIZE,
            show_line_numbers: true,
            auto_save: false,
            auto_save_interval_ms: DEFAULT_AUTO_SAVE_INTERVAL_MS,
        }
    }
}

impl EditorPreferences {
    fn sanitize(&mut self) {
        if self.font_size == 0 {
            self.font_size = DEFAULT_FONT_SIZE;
        }
        self.font_size = self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        if self.auto_save_interval_ms == 0 {
            self.auto_save_interval_ms = DEFAULT_AUTO_SAVE_INTERVAL_MS;
        }
        self.auto_save_interval_ms = self
            .auto_save_interval_ms
            .clamp(MIN_AUTO_SAVE_INTERVAL_MS, MAX_AUTO_SAVE_INTERVAL_MS);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPreferences {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_theme() -> String {
    "dark".to_string()
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            theme: default_theme(),
        }
    }
}

impl UiPreferences {
    fn sanitize(&mut self) {
        if self.locale.trim().is_empty() {
            self.locale = default_locale();
        }
        if !KNOWN_THEMES.contains(&self.theme.as_str()) {
            self.theme = default_theme();
        }
    }
}

/// Preferences persisted as pretty-printed JSON on disk.
#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    data: Preferences,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>, preferences: Preferences) -> Self {
        Self {
            path: path.into(),
            data: preferences,
        }
    }

    /// Loads preferences from `path`, returning defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "preferences file missing, using defaults");
            let mut data = Preferences::default();
            data.sanitize();
            return Ok(Self { path, data });
        }
        let data = read_preferences(&path)?;
        Ok(Self { path, data })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.data
    }

    pub fn update<F>(&mut self, op: F) -> Result<(), PreferencesError>
    where
        F: FnOnce(&mut Preferences),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn overwrite(&mut self, preferences: Preferences) -> Result<(), PreferencesError> {
        self.data = preferences;
        self.data.sanitize();
        self.save()
    }

    /// Writes through a temporary file so readers never observe a partial document.
    pub fn save(&self) -> Result<(), PreferencesError> {
        let tmp_path = self.path.with_extension("tmp");
        write_preferences(&tmp_path, &self.data)?;
        fs::rename(&tmp_path, &self.path).map_err(|source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<(), PreferencesError> {
        write_preferences(path.as_ref(), &self.data)
    }

    /// Replaces the current preferences with the contents of `source`.
    ///
    /// The previous file, if any, is kept alongside as `<name>.bak`.
    pub fn import_from(&mut self, source: impl AsRef<Path>) -> Result<(), PreferencesError> {
        let data = read_preferences(source.as_ref())?;
        self.backup_existing()?;
        self.data = data;
        self.save()
    }

    fn backup_existing(&self) -> Result<(), PreferencesError> {
        if !self.path.exists() {
            return Ok(());
        }
        let backup = self.path.with_extension("bak");
        fs::copy(&self.path, &backup).map_err(|source| PreferencesError::Write {
            path: backup,
            source,
        })?;
        Ok(())
    }
}

impl SettingsProvider for PreferencesStore {
    fn get(&self, key: &str) -> Option<String> {
        let editor = &self.data.editor;
        let value = match key {
            CASE_SENSITIVE_KEY => editor.case_sensitive.to_string(),
            WORD_WRAP_KEY => editor.word_wrap.to_string(),
            FONT_SIZE_KEY => editor.font_size.to_string(),
            "showLineNumbers" => editor.show_line_numbers.to_string(),
            "autoSave" => editor.auto_save.to_string(),
            "autoSaveInterval" => editor.auto_save_interval_ms.to_string(),
            "locale" => self.data.ui.locale.clone(),
            "theme" => self.data.ui.theme.clone(),
            _ => return None,
        };
        Some(value)
    }
}

fn read_preferences(path: &Path) -> Result<Preferences, PreferencesError> {
    let contents = fs::read_to_string(path).map_err(|source| PreferencesError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut data: Preferences =
        serde_json::from_str(&contents).map_err(|source| PreferencesError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    data.sanitize();
    Ok(data)
}

fn write_preferences(path: &Path, data: &Preferences) -> Result<(), PreferencesError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PreferencesError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let payload =
        serde_json::to_string_pretty(data).map_err(|source| PreferencesError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, payload.as_bytes()).map_err(|source| PreferencesError::Write {
        path: path.to_path_buf(),
        source,
    })
}
