use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::{ConfigPaths, StoreOptions};
use crate::diary::DiaryEntry;

const DIARY_TMP_EXTENSION: &str = "json.tmp";

/// Store failures a caller may want to branch on rather than just report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("reading or writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("diary file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no diary entry with id {id}")]
    UnknownEntry { id: String },
}

/// Handle to the diary file. Cheap to clone; every operation reads the
/// full file and rewrites it atomically, so concurrent handles never
/// observe a half-written diary.
#[derive(Debug, Clone)]
pub struct DiaryStore {
    path: Arc<PathBuf>,
}

impl DiaryStore {
    pub fn diary_path(&self) -> &Path {
        &self.path
    }

    /// Reads every entry in file order. A missing file reads as an
    /// empty diary; a file that is not valid JSON surfaces as
    /// [`StoreError::Malformed`], any other read failure as
    /// [`StoreError::Io`].
    pub fn fetch_all(&self) -> Result<Vec<DiaryEntry>> {
        let raw = match fs::read(&*self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.to_path_buf(),
                    source,
                }
                .into())
            }
        };
        let entries: Vec<DiaryEntry> =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Malformed {
                path: self.path.to_path_buf(),
                source,
            })?;
        tracing::debug!(count = entries.len(), "loaded diary entries");
        Ok(entries)
    }

    /// Appends `entry` and persists the whole diary.
    pub fn append_entry(&self, entry: DiaryEntry) -> Result<()> {
        if entry.title.trim().is_empty() {
            bail!("diary title cannot be empty");
        }
        if entry.emotion.trim().is_empty() {
            bail!("emotion cannot be empty");
        }
        let mut entries = self.fetch_all()?;
        if entries.iter().any(|existing| existing.id == entry.id) {
            bail!("diary entry id {} already exists", entry.id);
        }
        let id = entry.id.clone();
        entries.push(entry);
        self.write_all(&entries)?;
        tracing::debug!(%id, "appended diary entry");
        Ok(())
    }

    /// Builds a new entry with a fresh id and persists it.
    pub fn create_entry(
        &self,
        title: &str,
        emotion: &str,
        date: &str,
        content: &str,
        images: Vec<String>,
    ) -> Result<DiaryEntry> {
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| date.to_string());
        let entry = DiaryEntry {
            id: Uuid::new_v4().to_string(),
            date: Some(date.trim().to_string()),
            emotion: emotion.trim().to_string(),
            title: title.trim().to_string(),
            content: content.to_string(),
            images,
            created_at: Some(created_at),
        };
        self.append_entry(entry.clone())?;
        Ok(entry)
    }

    /// Removes the entry with `id` and returns it. Unknown ids surface
    /// as [`StoreError::UnknownEntry`].
    pub fn delete_entry(&self, id: &str) -> Result<DiaryEntry> {
        let mut entries = self.fetch_all()?;
        let position = entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| StoreError::UnknownEntry { id: id.to_string() })?;
        let removed = entries.remove(position);
        self.write_all(&entries)?;
        tracing::debug!(%id, "deleted diary entry");
        Ok(removed)
    }

    /// Replaces the stored entry carrying `updated`'s id and persists
    /// the whole diary, keeping the entry's position in file order.
    /// Unknown ids surface as [`StoreError::UnknownEntry`].
    pub fn update_entry(&self, updated: DiaryEntry) -> Result<DiaryEntry> {
        if updated.title.trim().is_empty() {
            bail!("diary title cannot be empty");
        }
        if updated.emotion.trim().is_empty() {
            bail!("emotion cannot be empty");
        }
        let mut entries = self.fetch_all()?;
        let position = entries
            .iter()
            .position(|entry| entry.id == updated.id)
            .ok_or_else(|| StoreError::UnknownEntry {
                id: updated.id.clone(),
            })?;
        entries[position] = updated.clone();
        self.write_all(&entries)?;
        tracing::debug!(id = %updated.id, "updated diary entry");
        Ok(updated)
    }

    fn write_all(&self, entries: &[DiaryEntry]) -> Result<()> {
        let json = serde_json::to_vec_pretty(entries).context("serialising diary entries")?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let tmp_path = self.path.with_extension(DIARY_TMP_EXTENSION);
        fs::write(&tmp_path, &json).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &*self.path).map_err(|source| StoreError::Io {
            path: self.path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}


pub fn init(paths: &ConfigPaths, store: &StoreOptions) -> Result<DiaryStore> {
    let diary_path = if store.diary_path.as_os_str().is_empty() {
        paths.diary_path.clone()
    } else {
        store.diary_path.clone()
    };
    if let Some(parent) = diary_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    let store = DiaryStore {
        path: Arc::new(diary_path),
    };
    if !store.path.exists() {
        tracing::info!(path = %store.path.display(), "creating empty diary file");
        store.write_all(&[])?;
    }
    Ok(store)
}
