//! Avatar resolution for a single account.

use std::sync::Arc;

use super::{Avatar, AvatarCache, AvatarDecoder, ImageDecoder, PrivilegedCopier};
use crate::account::{Account, AvatarState};

/// Resolves account avatars: cache, then backup copy, then decode.
///
/// ```text
/// known absent ──────────────────────────────────────────────▶ None
/// cache hit ─────────────────────────────────────────────────▶ avatar
/// cache miss ─▶ backup missing? copy ─▶ decode ─┬─ ok ─▶ cache put ─▶ avatar
///                                               └─ err ─▶ known absent ─▶ None
/// ```
///
/// Each call blocks on at most one copy and one decode. Run it off latency
/// sensitive threads; see [`super::resolve_all`].
#[derive(Clone)]
pub struct AvatarResolver {
    cache: Arc<dyn AvatarCache>,
    copier: Arc<dyn PrivilegedCopier>,
    decoder: Arc<dyn AvatarDecoder>,
}

impl AvatarResolver {
    /// Create a resolver decoding with [`ImageDecoder`].
    #[must_use]
    pub fn new(cache: Arc<dyn AvatarCache>, copier: Arc<dyn PrivilegedCopier>) -> Self {
        Self {
            cache,
            copier,
            decoder: Arc::new(ImageDecoder),
        }
    }

    /// Replace the decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn AvatarDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Resolve the avatar of `account`.
    ///
    /// Returns `None` when the account has no id yet, when an earlier attempt already
    /// failed, or when the backup cannot be decoded. The last case marks the account
    /// so later calls return immediately.
    #[must_use]
    pub fn resolve(&self, account: &Account) -> Option<Avatar> {
        if account.avatar_state() == AvatarState::KnownAbsent {
            return None;
        }

        let (Some(id), Some(paths)) = (account.id(), account.avatar_paths()) else {
            tracing::debug!("Avatar requested for an account without id");
            return None;
        };

        if let Some(avatar) = self.cache.get(id) {
            return Some(avatar);
        }

        if !paths.backup.exists() {
            tracing::debug!("Copying avatar of {id} from {:?}", paths.original);
            self.copier
                .copy_ignoring_errors(&paths.original, &paths.backup);
        }

        match self.decoder.decode_file(&paths.backup) {
            Some(avatar) => {
                account.mark_avatar_resolved();
                self.cache.put(id, Arc::clone(&avatar));
                Some(avatar)
            }
            None => {
                tracing::debug!("No local avatar for {id}");
                account.mark_avatar_absent();
                None
            }
        }
    }
}

impl std::fmt::Debug for AvatarResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarResolver").finish_non_exhaustive()
    }
}
