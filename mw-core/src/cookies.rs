//! Cookie storage shared by every request of a client.
//!
//! A [`CookieJar`] is either purely in-memory or backed by a file. The
//! file-backed variant is flushed after each response so that a crash never
//! loses a freshly issued session cookie.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{CookieError, MwResult};

/// Cookie store handle with optional on-disk persistence.
///
/// Cloning a jar shares the underlying store; both clones see the same
/// cookies.
#[derive(Clone)]
pub struct CookieJar {
    store: Arc<CookieStoreMutex>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieJar")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl CookieJar {
    /// Create an empty jar that lives only in memory.
    pub fn in_memory() -> Self {
        Self::from_store(CookieStore::default())
    }

    /// Wrap an existing cookie store.
    pub fn from_store(store: CookieStore) -> Self {
        Self {
            store: Arc::new(CookieStoreMutex::new(store)),
            path: None,
        }
    }

    /// Open a file-backed jar.
    ///
    /// A missing file is not an error: an empty store is created and written
    /// out immediately so the path exists from then on. A file that exists
    /// but cannot be parsed fails with [`CookieError::Load`].
    pub fn load(path: impl AsRef<Path>) -> MwResult<Self> {
        let path = path.as_ref().to_path_buf();

        let store = match File::open(&path) {
            Ok(file) => cookie_store::serde::json::load(BufReader::new(file)).map_err(|e| {
                CookieError::Load {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Cookie file {} does not exist yet, creating it", path.display());
                let jar = Self {
                    store: Arc::new(CookieStoreMutex::new(CookieStore::default())),
                    path: Some(path),
                };
                jar.save()?;
                return Ok(jar);
            }
            Err(e) => {
                return Err(CookieError::Load {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .into())
            }
        };

        debug!("Loaded cookies from {}", path.display());

        Ok(Self {
            store: Arc::new(CookieStoreMutex::new(store)),
            path: Some(path),
        })
    }

    /// Whether this jar persists to a file.
    pub fn is_file_backed(&self) -> bool {
        self.path.is_some()
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of unexpired cookies currently held.
    pub fn cookie_count(&self) -> MwResult<usize> {
        let store = self.store.lock().map_err(|_| CookieError::Poisoned)?;
        Ok(store.iter_unexpired().count())
    }

    /// Write persistent cookies to the backing file.
    ///
    /// No-op for in-memory jars.
    pub fn save(&self) -> MwResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let save_error = |reason: String| CookieError::Save {
            path: path.display().to_string(),
            reason,
        };

        let store = self.store.lock().map_err(|_| CookieError::Poisoned)?;

        // Write beside the target, then rename over it
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| save_error(e.to_string()))?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            cookie_store::serde::json::save(&store, &mut writer)
                .map_err(|e| save_error(e.to_string()))?;
            writer.flush().map_err(|e| save_error(e.to_string()))?;
        }
        temp.persist(path)
            .map_err(|e| save_error(e.error.to_string()))?;

        debug!("Saved cookies to {}", path.display());
        Ok(())
    }

    /// Shared store for plugging into an HTTP client as its cookie provider.
    pub fn provider(&self) -> Arc<CookieStoreMutex> {
        Arc::clone(&self.store)
    }
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::in_memory()
    }
}
