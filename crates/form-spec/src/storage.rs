//! Persistence of the `{forms, responses, previewMode}` slice in a flat keyed store.
//!
//! The whole slice lives under one namespace key as a JSON envelope
//! `{"state": {...}, "version": 0}`. Session history is never written.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::responses::ResponseLog;
use crate::spec::{Form, FormResponse, PreviewMode};
use crate::store::FormStore;

pub const DEFAULT_NAMESPACE: &str = "form-builder-storage";
pub const STATE_VERSION: u32 = 0;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid stored json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported state version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Flat string-keyed store, the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Keeps every key in a single JSON object file. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;
        let contents = serde_json::to_string_pretty(entries)?;
        let mut staged = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;
        staged
            .write_all(contents.as_bytes())
            .map_err(|source| self.io_error(source))?;
        staged
            .persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value);
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Persisted slice of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub forms: Vec<Form>,
    #[serde(default)]
    pub responses: Vec<FormResponse>,
    #[serde(default)]
    pub preview_mode: PreviewMode,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

impl PersistedState {
    pub fn capture(store: &FormStore) -> Self {
        Self {
            forms: store.forms().to_vec(),
            responses: store.responses().all().to_vec(),
            preview_mode: store.preview_mode(),
        }
    }

    pub fn into_store(self) -> FormStore {
        FormStore::from_parts(
            self.forms,
            ResponseLog::from_responses(self.responses),
            self.preview_mode,
        )
    }
}

pub fn save_state(
    store: &FormStore,
    kv: &mut impl KeyValueStore,
    namespace: &str,
) -> Result<(), StorageError> {
    let envelope = Envelope {
        state: PersistedState::capture(store),
        version: STATE_VERSION,
    };
    kv.set(namespace, serde_json::to_string(&envelope)?)?;
    tracing::debug!(
        namespace,
        forms = envelope.state.forms.len(),
        responses = envelope.state.responses.len(),
        "state saved"
    );
    Ok(())
}

/// Restores the persisted slice; an absent namespace yields an empty store.
pub fn load_state(kv: &impl KeyValueStore, namespace: &str) -> Result<FormStore, StorageError> {
    let Some(raw) = kv.get(namespace)? else {
        tracing::debug!(namespace, "no stored state, starting empty");
        return Ok(FormStore::new());
    };
    let envelope: Envelope = serde_json::from_str(&raw)?;
    if envelope.version != STATE_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: envelope.version,
            expected: STATE_VERSION,
        });
    }
    Ok(envelope.state.into_store())
}
