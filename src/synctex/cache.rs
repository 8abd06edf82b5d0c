//! Parsed-model cache
//!
//! Parsing a large sync file for every click is wasteful. [`ModelCache`] keeps
//! recently parsed models keyed by the sync file's canonical path, together with
//! a change token (modification time and length). A lookup whose token no longer
//! matches the file on disk re-parses and replaces the entry.
//!
//! Published models are shared as `Arc<SyncModel>` and never mutated, so callers
//! may hold on to them across threads while the cache moves on.

use lru::LruCache;
use parking_lot::RwLock;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use super::config::CacheConfig;
use super::loader::{locate, LoaderError, SyncLoader};
use super::model::SyncModel;

/// Identifies one version of a file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeToken {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl ChangeToken {
    pub fn of(path: &Path) -> Result<Self, LoaderError> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

type Entries = LruCache<PathBuf, (ChangeToken, Arc<SyncModel>)>;

/// Bounded cache of parsed sync files, oldest entry evicted first
///
/// Lookups use `peek`, so a hit never refreshes an entry's position and
/// eviction follows insertion order.
pub struct ModelCache {
    /// `None` when caching is disabled
    inner: Option<RwLock<Entries>>,
}

impl ModelCache {
    /// A cache holding at most `capacity` models; zero disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|cap| RwLock::new(LruCache::new(cap))),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity)
    }

    pub fn capacity(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |entries| entries.read().cap().get())
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |entries| entries.read().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the model for the sync file behind `path`, parsing it if needed.
    ///
    /// `path` is resolved the same way as [`SyncLoader::from_path`].
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Result<Arc<SyncModel>, LoaderError> {
        let sync_path = locate(path.as_ref())?;
        let key = fs::canonicalize(&sync_path)?;
        let token = ChangeToken::of(&key)?;

        let Some(entries) = &self.inner else {
            return Ok(Arc::new(SyncLoader::from_path(&key)?.parse()?));
        };

        if let Some((cached, model)) = entries.read().peek(&key) {
            if *cached == token {
                debug!(path = %key.display(), "sync model cache hit");
                return Ok(Arc::clone(model));
            }
        }

        let model = Arc::new(SyncLoader::from_path(&key)?.parse()?);
        let mut entries = entries.write();
        // a replaced entry counts as newly inserted
        entries.pop(&key);
        if let Some((evicted, _)) = entries.push(key.clone(), (token, Arc::clone(&model))) {
            debug!(path = %evicted.display(), "sync model evicted");
        }
        debug!(path = %key.display(), "sync model cached");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: &str = "SyncTeX Version:1\nInput:1:/doc/a.tex\n";
    const V2: &str = "SyncTeX Version:1\nInput:1:/doc/a.tex\nInput:2:/doc/chapter-two.tex\n";

    #[test]
    fn reuses_model_while_file_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let sync = dir.path().join("a.synctex");
        fs::write(&sync, V1).unwrap();

        let cache = ModelCache::new(2);
        let first = cache.get(&sync).unwrap();
        let second = cache.get(dir.path().join("a.pdf")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reparses_after_change() {
        let dir = tempfile::tempdir().unwrap();
        let sync = dir.path().join("a.synctex");
        fs::write(&sync, V1).unwrap();

        let cache = ModelCache::new(2);
        let first = cache.get(&sync).unwrap();
        fs::write(&sync, V2).unwrap();
        let second = cache.get(&sync).unwrap();

        assert_eq!(first.files.len(), 1);
        assert_eq!(second.files.len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_oldest_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::new(1);
        for name in ["a.synctex", "b.synctex"] {
            let path = dir.path().join(name);
            fs::write(&path, V1).unwrap();
            cache.get(&path).unwrap();
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn hits_do_not_protect_the_oldest_entry() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = ["a.synctex", "b.synctex", "c.synctex"]
            .iter()
            .map(|name| dir.path().join(name))
            .collect();
        for path in &paths {
            fs::write(path, V1).unwrap();
        }

        let cache = ModelCache::new(2);
        let first = cache.get(&paths[0]).unwrap();
        cache.get(&paths[1]).unwrap();
        assert!(Arc::ptr_eq(&first, &cache.get(&paths[0]).unwrap()));

        cache.get(&paths[2]).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(!Arc::ptr_eq(&first, &cache.get(&paths[0]).unwrap()));
    }

    #[test]
    fn capacity_comes_from_config() {
        let config = crate::synctex::config::load_defaults().unwrap();
        assert_eq!(ModelCache::from_config(&config.cache).capacity(), 8);
    }

    #[test]
    fn zero_capacity_never_stores() {
        let dir = tempfile::tempdir().unwrap();
        let sync = dir.path().join("a.synctex");
        fs::write(&sync, V1).unwrap();

        let cache = ModelCache::new(0);
        let first = cache.get(&sync).unwrap();
        assert!(!Arc::ptr_eq(&first, &cache.get(&sync).unwrap()));
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 0);
    }
}
