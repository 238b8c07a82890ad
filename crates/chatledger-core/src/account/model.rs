//! Account model types.

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

use super::identity::{self, AccountKind};
use super::paths::{self, AvatarPaths};
use super::validation::{validate_id, validate_owner_uin};
use crate::avatar::{Avatar, AvatarResolver};
use crate::config::StorageRoots;
use crate::Result;

/// Name returned when an account has no nickname, alias or id.
pub const UNKNOWN_NAME: &str = "<unknown>";

/// What is known about an account's local avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvatarState {
    /// No decode has been attempted yet.
    #[default]
    Unknown,
    /// The avatar was decoded at least once.
    Resolved,
    /// Decoding failed; the account is treated as having no avatar from now on.
    KnownAbsent,
}

impl AvatarState {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Resolved => 1,
            Self::KnownAbsent => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Unknown,
            1 => Self::Resolved,
            _ => Self::KnownAbsent,
        }
    }
}

/// Avatar state shared by concurrent resolutions of the same account.
///
/// Transitions are monotonic: `KnownAbsent` is never left.
#[derive(Debug, Default)]
struct AvatarStateCell(AtomicU8);

impl AvatarStateCell {
    fn load(&self) -> AvatarState {
        AvatarState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn mark_resolved(&self) {
        // Only Unknown moves to Resolved; a concurrent KnownAbsent must stick.
        let _ = self.0.compare_exchange(
            AvatarState::Unknown.to_u8(),
            AvatarState::Resolved.to_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    fn mark_absent(&self) {
        self.0.store(AvatarState::KnownAbsent.to_u8(), Ordering::Release);
    }
}

/// An account (personal user, group chat or official account) in one local
/// user's data store.
///
/// Equality and hashing only consider the id.
#[derive(Debug)]
pub struct Account {
    /// Nickname chosen by the account holder.
    pub nickname: Option<String>,
    /// Optional public handle.
    pub alias: Option<String>,
    id: Option<String>,
    owner_uin: String,
    path_identifier: String,
    owner_dir_path: PathBuf,
    avatar_backup_root: PathBuf,
    avatar_paths: Option<AvatarPaths>,
    avatar_state: AvatarStateCell,
}

impl Account {
    /// Create an account in the data store of `owner_uin`.
    ///
    /// The UIN is not validated; see [`Account::try_new`].
    #[must_use]
    pub fn new(roots: &impl StorageRoots, owner_uin: impl Into<String>) -> Self {
        let owner_uin = owner_uin.into();
        let path_identifier = paths::path_identifier(&owner_uin);
        let owner_dir_path = paths::derive_owner_dir_path(roots.base_storage_path(), &owner_uin);
        Self {
            nickname: None,
            alias: None,
            id: None,
            owner_uin,
            path_identifier,
            owner_dir_path,
            avatar_backup_root: roots.avatar_backup_root().to_path_buf(),
            avatar_paths: None,
            avatar_state: AvatarStateCell::default(),
        }
    }

    /// Create an account after checking that `owner_uin` is not blank.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the UIN is blank.
    pub fn try_new(roots: &impl StorageRoots, owner_uin: impl Into<String>) -> Result<Self> {
        let owner_uin = owner_uin.into();
        validate_owner_uin(&owner_uin)?;
        Ok(Self::new(roots, owner_uin))
    }

    /// Create an account and endow it with `id` in one step.
    #[must_use]
    pub fn with_identity(
        roots: &impl StorageRoots,
        owner_uin: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        let mut account = Self::new(roots, owner_uin);
        account.endow_identity(id);
        account
    }

    /// Set the nickname.
    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Set the alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Assign the account id and derive its avatar paths.
    ///
    /// Rebinding is allowed and recomputes the paths. A known-absent avatar stays
    /// known-absent.
    pub fn endow_identity(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.avatar_paths = Some(paths::derive_avatar_paths(
            &self.owner_dir_path,
            &self.avatar_backup_root,
            &id,
        ));
        self.id = Some(id);
    }

    /// Like [`Account::endow_identity`], rejecting blank ids.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the id is blank. The account is left unchanged.
    pub fn try_endow_identity(&mut self, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        validate_id(&id)?;
        self.endow_identity(id);
        Ok(())
    }

    /// Display name: nickname, then alias, then id, then [`UNKNOWN_NAME`].
    #[must_use]
    pub fn name(&self) -> &str {
        [&self.nickname, &self.alias, &self.id]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_NAME)
    }

    /// Account id, once endowed.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// UIN of the local user owning this account's data store.
    #[must_use]
    pub fn owner_uin(&self) -> &str {
        &self.owner_uin
    }

    /// Hashed name of the owner directory.
    #[must_use]
    pub fn path_identifier(&self) -> &str {
        &self.path_identifier
    }

    /// Owner directory inside the storage root.
    #[must_use]
    pub fn owner_dir_path(&self) -> &Path {
        &self.owner_dir_path
    }

    /// Derived avatar paths, once endowed.
    #[must_use]
    pub const fn avatar_paths(&self) -> Option<&AvatarPaths> {
        self.avatar_paths.as_ref()
    }

    /// Avatar inside the application's store, once endowed.
    #[must_use]
    pub fn original_avatar_path(&self) -> Option<&Path> {
        self.avatar_paths.as_ref().map(|p| p.original.as_path())
    }

    /// Local backup copy of the avatar, once endowed.
    #[must_use]
    pub fn backup_avatar_path(&self) -> Option<&Path> {
        self.avatar_paths.as_ref().map(|p| p.backup.as_path())
    }

    /// Kind of account, once endowed.
    #[must_use]
    pub fn kind(&self) -> Option<AccountKind> {
        self.id.as_deref().map(AccountKind::classify)
    }

    /// Whether this is an official account.
    #[must_use]
    pub fn is_official_account(&self) -> bool {
        self.id.as_deref().is_some_and(identity::is_official_account)
    }

    /// Whether this is a group chat.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.id.as_deref().is_some_and(identity::is_group)
    }

    /// Whether this is a personal user.
    #[must_use]
    pub fn is_personal_user(&self) -> bool {
        self.id.as_deref().is_some_and(identity::is_personal_user)
    }

    /// Prefix-only personal user check. See [`identity::is_personal_user_likely`].
    #[must_use]
    pub fn is_personal_user_likely(&self) -> bool {
        self.id.as_deref().is_some_and(identity::is_personal_user_likely)
    }

    /// Current avatar state.
    #[must_use]
    pub fn avatar_state(&self) -> AvatarState {
        self.avatar_state.load()
    }

    /// `false` once a decode attempt has failed.
    #[must_use]
    pub fn has_local_avatar(&self) -> bool {
        self.avatar_state() != AvatarState::KnownAbsent
    }

    /// Resolve the avatar through `resolver`.
    #[must_use]
    pub fn avatar(&self, resolver: &AvatarResolver) -> Option<Avatar> {
        resolver.resolve(self)
    }

    pub(crate) fn mark_avatar_resolved(&self) {
        self.avatar_state.mark_resolved();
    }

    pub(crate) fn mark_avatar_absent(&self) {
        self.avatar_state.mark_absent();
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Account{{nickname='{}', alias='{}', id='{}'}}",
            self.nickname.as_deref().unwrap_or("null"),
            self.alias.as_deref().unwrap_or("null"),
            self.id.as_deref().unwrap_or("null"),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use std::collections::hash_map::DefaultHasher;

    fn roots() -> StorageConfig {
        StorageConfig::new("/data/MicroMsg", "/backup")
    }

    fn hash_of(account: &Account) -> u64 {
        let mut hasher = DefaultHasher::new();
        account.hash(&mut hasher);
        hasher.finish()
    }

    mod name_tests {
        use super::*;

        #[test]
        fn nickname_first() {
            let account = Account::with_identity(&roots(), "1", "wxid_1")
                .with_nickname("Alice")
                .with_alias("a1");
            assert_eq!(account.name(), "Alice");
        }

        #[test]
        fn empty_nickname_falls_back_to_alias() {
            let account = Account::with_identity(&roots(), "1", "wxid_1")
                .with_nickname("")
                .with_alias("a1");
            assert_eq!(account.name(), "a1");
        }

        #[test]
        fn falls_back_to_id() {
            let account = Account::with_identity(&roots(), "1", "wxid_1")
                .with_nickname("")
                .with_alias("");
            assert_eq!(account.name(), "wxid_1");
        }

        #[test]
        fn unknown_when_all_empty() {
            let account = Account::with_identity(&roots(), "1", "")
                .with_nickname("")
                .with_alias("");
            assert_eq!(account.name(), UNKNOWN_NAME);
            assert_eq!(Account::new(&roots(), "1").name(), "<unknown>");
        }
    }

    mod identity_tests {
        use super::*;

        #[test]
        fn owner_paths_fixed_at_construction() {
            let account = Account::new(&roots(), "42");
            assert_eq!(
                account.owner_dir_path(),
                paths::derive_owner_dir_path(Path::new("/data/MicroMsg"), "42")
            );
            assert_eq!(account.owner_uin(), "42");
            assert_eq!(account.path_identifier(), paths::path_identifier("42"));
            assert_eq!(
                account.owner_dir_path(),
                Path::new("/data/MicroMsg").join(paths::path_identifier("42"))
            );
        }

        #[test]
        fn avatar_paths_only_after_endowment() {
            let mut account = Account::new(&roots(), "42");
            assert!(account.avatar_paths().is_none());
            assert!(account.original_avatar_path().is_none());
            assert!(account.backup_avatar_path().is_none());
            assert!(account.kind().is_none());

            account.endow_identity("wxid_a");
            let expected = paths::derive_avatar_paths(
                account.owner_dir_path(),
                Path::new("/backup"),
                "wxid_a",
            );
            assert_eq!(account.avatar_paths(), Some(&expected));
        }

        #[test]
        fn rebinding_recomputes_paths() {
            let mut account = Account::with_identity(&roots(), "42", "wxid_a");
            let first = account.avatar_paths().cloned().unwrap();
            account.endow_identity("wxid_b");
            assert_eq!(account.id(), Some("wxid_b"));
            assert_ne!(account.avatar_paths().unwrap(), &first);
            assert_eq!(account.path_identifier(), paths::path_identifier("42"));
        }

        #[test]
        fn try_variants_reject_blank_input() {
            assert!(matches!(
                Account::try_new(&roots(), " "),
                Err(crate::Error::Validation(_))
            ));
            let mut account = Account::try_new(&roots(), "42").unwrap();
            assert!(account.try_endow_identity("").is_err());
            assert!(account.id().is_none());
            account.try_endow_identity("gh_x").unwrap();
            assert_eq!(account.kind(), Some(AccountKind::OfficialAccount));
        }

        #[test]
        fn classification_helpers() {
            let group = Account::with_identity(&roots(), "1", "12345@chatroom");
            assert!(group.is_group());
            assert!(!group.is_personal_user());

            let legacy = Account::with_identity(&roots(), "1", "oldname");
            assert!(legacy.is_personal_user());
            assert!(!legacy.is_personal_user_likely());

            let unbound = Account::new(&roots(), "1");
            assert!(!unbound.is_personal_user());
        }
    }

    mod equality_tests {
        use super::*;

        #[test]
        fn equal_by_id_only() {
            let a = Account::with_identity(&roots(), "1", "wxid_same").with_nickname("A");
            let other_roots = StorageConfig::new("/elsewhere", "/tmp");
            let b = Account::with_identity(&other_roots, "2", "wxid_same").with_alias("b");
            assert_eq!(a, b);
            assert_eq!(hash_of(&a), hash_of(&b));
        }

        #[test]
        fn different_ids_differ() {
            let a = Account::with_identity(&roots(), "1", "wxid_a");
            let b = Account::with_identity(&roots(), "1", "wxid_b");
            assert_ne!(a, b);
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn defaults_to_unknown() {
            let account = Account::new(&roots(), "1");
            assert_eq!(account.avatar_state(), AvatarState::Unknown);
            assert!(account.has_local_avatar());
        }

        #[test]
        fn known_absent_is_terminal() {
            let mut account = Account::with_identity(&roots(), "1", "wxid_a");
            account.mark_avatar_resolved();
            assert_eq!(account.avatar_state(), AvatarState::Resolved);
            account.mark_avatar_absent();
            account.mark_avatar_resolved();
            assert_eq!(account.avatar_state(), AvatarState::KnownAbsent);
            account.endow_identity("wxid_b");
            assert!(!account.has_local_avatar());
        }
    }

    #[test]
    fn display() {
        let account = Account::with_identity(&roots(), "1", "wxid_1").with_nickname("Alice");
        assert_eq!(
            account.to_string(),
            "Account{nickname='Alice', alias='null', id='wxid_1'}"
        );
        assert_eq!(
            Account::new(&roots(), "1").to_string(),
            "Account{nickname='null', alias='null', id='null'}"
        );
    }
}
