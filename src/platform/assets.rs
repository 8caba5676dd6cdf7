//! Sprite load tracking with a generation counter
//!
//! Every reconcile starts a new epoch. Load completions carry the epoch they
//! were started in; completions from an older epoch are dropped so a slow
//! load from a previous profile list can never mutate current state.

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct AssetEpoch {
    generation: u64,
    pending: HashSet<String>,
    loaded: HashSet<String>,
    failed: HashSet<String>,
}

impl AssetEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new epoch waiting on `urls`. Already-loaded URLs are not
    /// waited on again. Returns the new generation.
    pub fn begin<I>(&mut self, urls: I) -> u64
    where
        I: IntoIterator<Item = String>,
    {
        self.generation += 1;
        self.pending = urls
            .into_iter()
            .filter(|u| !self.loaded.contains(u))
            .collect();
        self.generation
    }

    /// Forget everything loaded so far (sprite cache invalidation)
    pub fn invalidate(&mut self) {
        self.loaded.clear();
        self.failed.clear();
        self.pending.clear();
        self.generation += 1;
    }

    /// Record a load result. Returns false (and changes nothing) when the
    /// completion belongs to a stale epoch.
    pub fn complete(&mut self, generation: u64, url: &str, ok: bool) -> bool {
        if generation != self.generation {
            log::debug!(
                "Dropping stale sprite load {} (epoch {}, current {})",
                url,
                generation,
                self.generation
            );
            return false;
        }
        self.pending.remove(url);
        if ok {
            self.failed.remove(url);
            self.loaded.insert(url.to_string());
        } else {
            log::warn!("Sprite failed to load: {}", url);
            self.failed.insert(url.to_string());
        }
        true
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.loaded.contains(url)
    }

    pub fn has_failed(&self, url: &str) -> bool {
        self.failed.contains(url)
    }

    /// URLs still waited on in this epoch
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Nothing left to wait for
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }
}
