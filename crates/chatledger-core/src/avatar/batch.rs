//! Concurrent resolution of many avatars.

use std::sync::Arc;

use tokio::task::JoinSet;

use super::{Avatar, AvatarResolver};
use crate::account::Account;

/// Resolve the avatars of `accounts` on tokio's blocking pool.
///
/// Results are returned in input order. A task that panics yields `None`.
pub async fn resolve_all(
    resolver: &AvatarResolver,
    accounts: &[Arc<Account>],
) -> Vec<Option<Avatar>> {
    let mut tasks = JoinSet::new();
    for (index, account) in accounts.iter().enumerate() {
        let resolver = resolver.clone();
        let account = Arc::clone(account);
        tasks.spawn_blocking(move || (index, resolver.resolve(&account)));
    }

    let mut results = vec![None; accounts.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, avatar)) => results[index] = avatar,
            Err(e) => tracing::warn!("Avatar task failed: {e}"),
        }
    }
    results
}
