//! In-memory avatar cache.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::Avatar;

/// Avatar storage keyed by account id.
///
/// Implementations must tolerate concurrent `get`/`put`; last writer wins.
pub trait AvatarCache: Send + Sync {
    /// Cached avatar of `id`, if any.
    fn get(&self, id: &str) -> Option<Avatar>;

    /// Store the avatar of `id`.
    fn put(&self, id: &str, avatar: Avatar);
}

/// Unbounded cache backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryAvatarCache {
    entries: RwLock<HashMap<String, Avatar>>,
}

impl MemoryAvatarCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached avatars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached avatar.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl AvatarCache for MemoryAvatarCache {
    fn get(&self, id: &str) -> Option<Avatar> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn put(&self, id: &str, avatar: Avatar) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), avatar);
    }
}
