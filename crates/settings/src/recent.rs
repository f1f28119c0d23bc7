use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Number of entries kept when no capacity has been persisted yet.
pub const DEFAULT_RECENT_CAPACITY: usize = 10;

#[derive(Debug, Error)]
pub enum RecentFilesError {
    #[error("failed to read recent files {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse recent files {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize recent files {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write recent files {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 最近開啟的檔案。 / A file shown in the recent-files list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFile {
    pub name: String,
    pub path: PathBuf,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub last_opened: u64,
}

impl RecentFile {
    /// 以目前時間建立紀錄。 / Creates an entry for `path` stamped with the current time.
    pub fn opened_now(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let last_opened = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        Self {
            name,
            path,
            last_opened,
        }
    }
}

/// 管理最近開啟檔案的清單。 / Bounded, newest-first list of recently opened files.
///
/// Entries are keyed by file name: opening a file whose name is already listed
/// replaces the old entry and moves it to the front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFiles {
    capacity: usize,
    entries: VecDeque<RecentFile>,
}

impl Default for RecentFiles {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

impl RecentFiles {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// 依序列化資料還原清單。 / Rebuilds the list from persisted entries, newest first.
    ///
    /// Later duplicates of a name are dropped and the tail is trimmed to `capacity`.
    pub fn with_entries(capacity: usize, entries: Vec<RecentFile>) -> Self {
        let mut list = Self::new(capacity);
        for entry in entries {
            if list.entries.len() == list.capacity {
                break;
            }
            if !list.contains(&entry.name) {
                list.entries.push_back(entry);
            }
        }
        list
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 調整容量並修剪超出的紀錄。 / Adjusts capacity and trims the oldest entries.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.entries.truncate(self.capacity);
    }

    /// 加入或提升紀錄至清單頂端。 / Inserts or promotes an entry to the front of the list.
    pub fn add(&mut self, entry: RecentFile) {
        self.entries.retain(|existing| existing.name != entry.name);
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Removes the entry with the given file name; returns `true` if it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let initial_len = self.entries.len();
        self.entries.retain(|existing| existing.name != name);
        initial_len != self.entries.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentFile> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Serialize, Deserialize)]
struct RecentFilesFile {
    #[serde(default = "default_capacity")]
    capacity: usize,
    #[serde(default)]
    entries: Vec<RecentFile>,
}

fn default_capacity() -> usize {
    DEFAULT_RECENT_CAPACITY
}

/// 管理最近檔案清單的持久化儲存。 / Recent-files history persisted as JSON; every change is written back.
#[derive(Debug)]
pub struct RecentFilesStore {
    path: PathBuf,
    history: RecentFiles,
}

impl RecentFilesStore {
    /// Loads history from `path`, returning an empty list when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecentFilesError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "recent files missing, starting empty");
            return Ok(Self {
                path,
                history: RecentFiles::default(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| RecentFilesError::Read {
            path: path.clone(),
            source,
        })?;
        let stored: RecentFilesFile =
            serde_json::from_str(&contents).map_err(|source| RecentFilesError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            history: RecentFiles::with_entries(stored.capacity, stored.entries),
        })
    }

    pub fn history(&self) -> &RecentFiles {
        &self.history
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 記錄開啟的檔案並寫回。 / Records `path` as just opened and persists the list.
    pub fn record(&mut self, path: impl Into<PathBuf>) -> Result<(), RecentFilesError> {
        self.history.add(RecentFile::opened_now(path));
        self.persist()
    }

    pub fn remove(&mut self, name: &str) -> Result<bool, RecentFilesError> {
        let removed = self.history.remove(name);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), RecentFilesError> {
        self.history.clear();
        self.persist()
    }

    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), RecentFilesError> {
        self.history.set_capacity(capacity);
        self.persist()
    }

    fn persist(&self) -> Result<(), RecentFilesError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RecentFilesError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let stored = RecentFilesFile {
            capacity: self.history.capacity(),
            entries: self.history.iter().cloned().collect(),
        };
        let payload =
            serde_json::to_string_pretty(&stored).map_err(|source| RecentFilesError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| RecentFilesError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| RecentFilesError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), entries = stored.entries.len(), "recent files saved");
        Ok(())
    }
}
