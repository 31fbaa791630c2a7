//! A bounded, approximate-LRU pool of open file handles, for document
//! families where each document corresponds to a seekable file read
//! lazily (e.g. an indexed multi-FASTA). Scoped and separately
//! ownable — not a process-wide singleton — so its lifetime can be
//! bound to one construction or query session.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ahash::AHashMap as HashMap;

use crate::error::Error;

struct Inner {
    /// Most-recently-used entries at the back; eviction pops the front.
    order: Vec<PathBuf>,
    handles: HashMap<PathBuf, Arc<File>>,
}

/// A bounded LRU cache of read-only file handles keyed by path.
pub struct HandlePool {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl HandlePool {
    pub fn new(capacity: usize) -> HandlePool {
        HandlePool {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                order: Vec::new(),
                handles: HashMap::new(),
            }),
        }
    }

    /// `4 * hardware_parallelism`, the default capacity for this pool.
    pub fn with_default_capacity() -> HandlePool {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        HandlePool::new(4 * parallelism)
    }

    /// Returns a shared handle for `path`, opening and caching it if
    /// necessary. Open handles are read-only; positioned reads
    /// (`FileExt::read_at` on Unix) let multiple callers share one
    /// handle safely across threads.
    pub fn get_or_open(&self, path: &Path) -> Result<Arc<File>, Error> {
        let mut inner = self.inner.lock().expect("handle pool mutex poisoned");

        if let Some(handle) = inner.handles.get(path).cloned() {
            touch(&mut inner.order, path);
            return Ok(handle);
        }

        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let handle = Arc::new(file);
        if inner.handles.len() >= self.capacity {
            evict_one(&mut inner);
        }
        inner.handles.insert(path.to_path_buf(), handle.clone());
        inner.order.push(path.to_path_buf());
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("handle pool mutex poisoned").handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn touch(order: &mut Vec<PathBuf>, path: &Path) {
    if let Some(pos) = order.iter().position(|p| p == path) {
        let entry = order.remove(pos);
        order.push(entry);
    }
}

fn evict_one(inner: &mut Inner) {
    if !inner.order.is_empty() {
        let victim = inner.order.remove(0);
        inner.handles.remove(&victim);
    }
}
