// EN: src/state.rs

use crate::models::{ActionConfig, Grimoire};
use std::sync::{Arc, PoisonError, RwLock};

/// The active grimoire, published as an immutable snapshot.
///
/// Readers clone the current `Arc` under a short read lock and then work on their own
/// snapshot; a reload builds the new map off-lock and swaps the pointer under the write
/// lock. No lock is ever held while an action runs.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    current: RwLock<Arc<Grimoire>>,
}

impl ActionRegistry {
    /// Creates a registry publishing `grimoire` as its first generation.
    pub fn new(grimoire: Grimoire) -> Self {
        Self {
            current: RwLock::new(Arc::new(grimoire)),
        }
    }

    /// Returns the generation visible right now.
    pub fn snapshot(&self) -> Arc<Grimoire> {
        // A poisoned lock still guards a complete Arc: the swap is a single store.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publishes a new generation, replacing the old one wholesale.
    pub fn replace(&self, grimoire: Grimoire) {
        let next = Arc::new(grimoire);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }

    /// Looks up a single action in the current generation.
    pub fn get(&self, name: &str) -> Option<ActionConfig> {
        self.snapshot().get(name).cloned()
    }

    /// All spell names of the current generation, sorted.
    pub fn names(&self) -> Vec<String> {
        sorted_names(&self.snapshot())
    }
}

/// Sorted key list of a grimoire.
pub fn sorted_names(grimoire: &Grimoire) -> Vec<String> {
    let mut names: Vec<String> = grimoire.keys().cloned().collect();
    names.sort();
    names
}
