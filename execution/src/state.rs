//! Session store backends.
//!
//! Every value is text keyed by [Key]. Writes are synchronous: a call returns
//! only once the backend has accepted (or refused) the change.

use dicehouse_types::{
    casino::CodecError,
    execution::{Key, Value},
};
use std::{
    collections::HashMap,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {key}: {source}")]
    Io {
        key: Key,
        #[source]
        source: std::io::Error,
    },
    #[error("storage directory {path:?} is not usable: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored {key} is corrupt: {reason}")]
    Corrupt { key: Key, reason: String },
    #[error("could not encode {key}: {source}")]
    Encode {
        key: Key,
        #[source]
        source: CodecError,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait State {
    fn get(&self, key: &Key) -> Result<Option<Value>, PersistenceError>;
    fn insert(&mut self, key: Key, value: Value) -> Result<(), PersistenceError>;
    fn delete(&mut self, key: &Key) -> Result<(), PersistenceError>;

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> Result<(), PersistenceError> {
        for (key, status) in changes {
            match status {
                Status::Update(value) => self.insert(key, value)?,
                Status::Delete => self.delete(&key)?,
            }
        }
        Ok(())
    }

    /// Remove every session key.
    fn clear(&mut self) -> Result<(), PersistenceError> {
        for key in Key::ALL {
            self.delete(&key)?;
        }
        Ok(())
    }
}

impl<S: State + ?Sized> State for &mut S {
    fn get(&self, key: &Key) -> Result<Option<Value>, PersistenceError> {
        (**self).get(key)
    }

    fn insert(&mut self, key: Key, value: Value) -> Result<(), PersistenceError> {
        (**self).insert(key, value)
    }

    fn delete(&mut self, key: &Key) -> Result<(), PersistenceError> {
        (**self).delete(key)
    }

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> Result<(), PersistenceError> {
        (**self).apply(changes)
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Update(Value),
    Delete,
}

#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

impl Memory {
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

impl State for Memory {
    fn get(&self, key: &Key) -> Result<Option<Value>, PersistenceError> {
        Ok(self.state.get(key).cloned())
    }

    fn insert(&mut self, key: Key, value: Value) -> Result<(), PersistenceError> {
        self.state.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> Result<(), PersistenceError> {
        self.state.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        self.state.clear();
        Ok(())
    }
}

/// One file per key inside a directory.
///
/// Writes go to `<key>.tmp`, are synced, then renamed over `<key>`, so a crash
/// mid-write leaves the previous value in place. A batch writes every temp
/// file before renaming any of them, so a failed write leaves the whole
/// previous session in place.
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Create or open a store at the given directory.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory).map_err(|source| PersistenceError::Directory {
            path: directory.clone(),
            source,
        })?;
        debug!(?directory, "opened session store");
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path(&self, key: &Key) -> PathBuf {
        self.directory.join(key.as_str())
    }

    fn temp_path(path: &Path) -> PathBuf {
        path.with_extension("tmp")
    }

    /// Write and sync the temp file next to `path`.
    fn write_temp(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = std::fs::File::create(Self::temp_path(path))?;
        file.write_all(data)?;
        file.sync_all()
    }

    /// Atomically write data to a file using write-rename pattern.
    fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
        Self::write_temp(path, data)?;
        std::fs::rename(Self::temp_path(path), path)
    }
}

impl State for FileStore {
    fn get(&self, key: &Key) -> Result<Option<Value>, PersistenceError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { key: *key, source }),
        }
    }

    fn insert(&mut self, key: Key, value: Value) -> Result<(), PersistenceError> {
        Self::atomic_write(&self.path(&key), value.as_bytes())
            .map_err(|source| PersistenceError::Io { key, source })
    }

    fn delete(&mut self, key: &Key) -> Result<(), PersistenceError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io { key: *key, source }),
        }
    }

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> Result<(), PersistenceError> {
        // Stage every update before any live file changes
        let mut staged: Vec<PathBuf> = Vec::with_capacity(changes.len());
        for (key, status) in &changes {
            let Status::Update(value) = status else {
                continue;
            };
            let path = self.path(key);
            if let Err(source) = Self::write_temp(&path, value.as_bytes()) {
                for path in staged.iter().chain(std::iter::once(&path)) {
                    let _ = std::fs::remove_file(Self::temp_path(path));
                }
                debug!(%key, error = %source, "discarded staged session batch");
                return Err(PersistenceError::Io { key: *key, source });
            }
            staged.push(path);
        }

        for (key, status) in changes {
            match status {
                Status::Update(_) => {
                    let path = self.path(&key);
                    std::fs::rename(Self::temp_path(&path), &path)
                        .map_err(|source| PersistenceError::Io { key, source })?;
                }
                Status::Delete => self.delete(&key)?,
            }
        }
        Ok(())
    }
}
