//! Whole-document persistence for the statistics files.
//!
//! Every operation re-reads the document, mutates it and writes it back; there is no
//! in-memory cache, so the backing document is the source of truth. A document that
//! cannot be parsed is replaced by its empty form rather than failing the request.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{StatsError, StatsResult};

/// Bounds shared by every persisted document type.
pub trait Document: Serialize + DeserializeOwned + Default + Clone + Send + 'static {}

impl<T> Document for T where T: Serialize + DeserializeOwned + Default + Clone + Send + 'static {}

/// Storage for one whole document.
pub trait DocumentStore<T: Document>: Send + Sync {
    /// Read the document. Missing or unparsable documents load as `T::default()`.
    fn load(&self) -> StatsResult<T>;

    fn save(&self, doc: &T) -> StatsResult<()>;

    fn exists(&self) -> bool;

    /// One read-modify-write cycle. `apply` returns whether the document changed;
    /// the document is written only when it did. Returns that flag.
    fn update(&self, apply: &mut dyn FnMut(&mut T) -> StatsResult<bool>) -> StatsResult<bool> {
        let mut doc = self.load()?;
        let changed = apply(&mut doc)?;
        if changed {
            self.save(&doc)?;
        }
        Ok(changed)
    }

    /// Write `initial` unless a document already exists. Returns true if it was written.
    fn create_if_missing(&self, initial: &T) -> StatsResult<bool> {
        if self.exists() {
            return Ok(false);
        }
        self.save(initial)?;
        Ok(true)
    }
}

/// A document persisted as a pretty-printed JSON file.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: String) -> StatsError {
        StatsError::StorageCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

impl<T: Document> DocumentStore<T> for JsonFileStore<T> {
    fn load(&self) -> StatsResult<T> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "document missing, starting empty");
                return Ok(T::default());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!("{}, treating as empty", self.corrupt(e.to_string()));
                return Ok(T::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!("{}, treating as empty", self.corrupt(e.to_string()));
                Ok(T::default())
            }
        }
    }

    fn save(&self, doc: &T) -> StatsResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(doc)?;
        let temp_file = self.path.with_extension("json.tmp");
        fs::write(&temp_file, json)?;
        fs::rename(&temp_file, &self.path)?;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// In-process document. `update` holds the lock for the whole cycle.
pub struct MemoryStore<T> {
    doc: Mutex<Option<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            doc: Mutex::new(None),
        }
    }

    pub fn with_document(doc: T) -> Self {
        Self {
            doc: Mutex::new(Some(doc)),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> DocumentStore<T> for MemoryStore<T> {
    fn load(&self) -> StatsResult<T> {
        Ok(self.doc.lock().clone().unwrap_or_default())
    }

    fn save(&self, doc: &T) -> StatsResult<()> {
        *self.doc.lock() = Some(doc.clone());
        Ok(())
    }

    fn exists(&self) -> bool {
        self.doc.lock().is_some()
    }

    fn update(&self, apply: &mut dyn FnMut(&mut T) -> StatsResult<bool>) -> StatsResult<bool> {
        let mut guard = self.doc.lock();
        let mut doc = guard.clone().unwrap_or_default();
        let changed = apply(&mut doc)?;
        if changed {
            *guard = Some(doc);
        }
        Ok(changed)
    }
}
