//! Process-wide settings threaded explicitly into construction and search:
//! a plain struct with a `Default` impl, never a global.

/// Settings recognized by construction and search entry points.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Worker thread count for `rayon`-driven parallel regions.
    pub threads: usize,
    /// If true, page in the whole mapping eagerly on open rather than
    /// relying on lazy page faults.
    pub load_complete_index: bool,
    /// If true, skip the LRU handle cache and open files directly.
    pub disable_cache: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            load_complete_index: false,
            disable_cache: false,
        }
    }
}

impl Settings {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_load_complete_index(mut self, load_complete_index: bool) -> Self {
        self.load_complete_index = load_complete_index;
        self
    }

    pub fn with_disable_cache(mut self, disable_cache: bool) -> Self {
        self.disable_cache = disable_cache;
        self
    }
}
