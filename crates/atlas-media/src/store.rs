use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Who may read an uploaded object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// Anyone with the URL.
    PublicRead,
    /// Only the operator.
    Private,
}

/// Object storage for processed images.
///
/// Writes are not retried: a failure is returned to the caller, which aborts
/// the step that issued it.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` at `path` and return the URL it is served from.
    ///
    /// Storing to an existing path overwrites the object.
    async fn store(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        visibility: Visibility,
    ) -> MediaResult<String>;
}

/// An object held by [`InMemoryMediaStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub visibility: Visibility,
}

/// In-memory object store for tests and embedding.
///
/// Counts every write, including overwrites, so tests can assert that a
/// re-run uploaded nothing.
pub struct InMemoryMediaStore {
    base_url: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    writes: AtomicUsize,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::with_base_url("memory://media")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(BTreeMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Total number of `store` calls that succeeded.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of distinct objects held.
    pub fn len(&self) -> usize {
        self.objects.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.lock().expect("lock poisoned").get(path).cloned()
    }

    /// Stored paths in sorted order.
    pub fn paths(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl Default for InMemoryMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn store(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        visibility: Visibility,
    ) -> MediaResult<String> {
        let object = StoredObject {
            bytes,
            content_type: content_type.to_string(),
            visibility,
        };
        self.objects
            .lock()
            .expect("lock poisoned")
            .insert(path.to_string(), object);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}/{}", self.base_url, path))
    }
}

impl std::fmt::Debug for InMemoryMediaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMediaStore")
            .field("base_url", &self.base_url)
            .field("object_count", &self.len())
            .field("write_count", &self.write_count())
            .finish()
    }
}

/// Object store backed by a local directory.
///
/// Public objects are addressed as `<base_url>/<path>`, so the directory can
/// be synced to or served by any static host. Private objects are addressed
/// by their local file path.
#[derive(Clone, Debug)]
pub struct DirectoryMediaStore {
    root: PathBuf,
    base_url: String,
}

impl DirectoryMediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn local_path(&self, path: &str) -> MediaResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(MediaError::Upload {
                path: path.to_string(),
                reason: "object path must be relative and stay inside the media root".into(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for DirectoryMediaStore {
    async fn store(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        visibility: Visibility,
    ) -> MediaResult<String> {
        let target = self.local_path(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let size = bytes.len();
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| MediaError::Upload {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        debug!(path, size, content_type, ?visibility, "object written");

        let url = match visibility {
            Visibility::PublicRead => format!("{}/{}", self.base_url, path),
            Visibility::Private => target.display().to_string(),
        };
        info!(%url, "stored object");
        Ok(url)
    }
}
