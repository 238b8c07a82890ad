//! Account kind classification from id patterns.

/// Id prefix of official (publisher) accounts.
pub const OFFICIAL_ACCOUNT_PREFIX: &str = "gh_";
/// Id prefix carried by most, but not all, personal users.
pub const PERSONAL_USER_PREFIX: &str = "wxid_";
/// Id suffix of group chats.
pub const GROUP_SUFFIX: &str = "@chatroom";

/// Whether `id` belongs to an official account.
#[must_use]
pub fn is_official_account(id: &str) -> bool {
    id.starts_with(OFFICIAL_ACCOUNT_PREFIX)
}

/// Whether `id` belongs to a group chat.
#[must_use]
pub fn is_group(id: &str) -> bool {
    id.ends_with(GROUP_SUFFIX)
}

/// Quick check for personal users by the `wxid_` prefix.
///
/// A `true` answer is reliable, a `false` one is not: older personal accounts have
/// ids without the prefix. Use [`is_personal_user`] when the answer has to be exact.
#[must_use]
pub fn is_personal_user_likely(id: &str) -> bool {
    id.starts_with(PERSONAL_USER_PREFIX)
}

/// Whether `id` belongs to a personal user: anything that is neither an
/// official account nor a group.
#[must_use]
pub fn is_personal_user(id: &str) -> bool {
    !is_official_account(id) && !is_group(id)
}

/// Kind of an account, derived from its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// A person.
    PersonalUser,
    /// A group chat.
    Group,
    /// An official (publisher) account.
    OfficialAccount,
}

impl AccountKind {
    /// Classifies `id`. Official accounts take precedence over groups.
    #[must_use]
    pub fn classify(id: &str) -> Self {
        if is_official_account(id) {
            Self::OfficialAccount
        } else if is_group(id) {
            Self::Group
        } else {
            Self::PersonalUser
        }
    }

    /// Get display name for the kind.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::PersonalUser => "Personal user",
            Self::Group => "Group chat",
            Self::OfficialAccount => "Official account",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
