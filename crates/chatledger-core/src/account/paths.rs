//! Path derivation for the on-device data store.
//!
//! The chat application keeps one directory per local user, named after the MD5 of
//! `"mm" + uin`, and stores avatars two levels deep, sharded by the first four hex
//! characters of the MD5 of the account id:
//!
//! ```text
//! <storage root>/<md5("mm" + uin)>/avatar/<h[0..2]>/<h[2..4]>/user_<h>.png
//! ```
//!
//! The layout is dictated by the application and must be reproduced exactly.
//! Nothing here validates input or touches the filesystem.

use std::path::{Path, PathBuf};

/// Salt prepended to the owner UIN before hashing.
const OWNER_SALT: &str = "mm";
/// Directory holding avatars inside an owner directory.
pub const AVATAR_DIR: &str = "avatar";
const AVATAR_FILE_PREFIX: &str = "user_";
const AVATAR_FILE_EXTENSION: &str = "png";

/// Lowercase hex MD5 digest of `input`.
#[must_use]
pub fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Name of the owner directory for `owner_uin`.
#[must_use]
pub fn path_identifier(owner_uin: &str) -> String {
    md5_hex(&format!("{OWNER_SALT}{owner_uin}"))
}

/// Directory holding all data of the local user `owner_uin`.
#[must_use]
pub fn derive_owner_dir_path(storage_root: &Path, owner_uin: &str) -> PathBuf {
    storage_root.join(path_identifier(owner_uin))
}

/// Avatar locations derived from an account id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AvatarPaths {
    /// Avatar inside the application's store. Usually only readable with elevated privileges.
    pub original: PathBuf,
    /// Locally writable copy of the original.
    pub backup: PathBuf,
}

/// Derives the original and backup avatar paths for `id`.
#[must_use]
pub fn derive_avatar_paths(owner_dir: &Path, backup_root: &Path, id: &str) -> AvatarPaths {
    let hash = md5_hex(id);
    let original = owner_dir
        .join(AVATAR_DIR)
        .join(&hash[0..2])
        .join(&hash[2..4])
        .join(format!("{AVATAR_FILE_PREFIX}{hash}.{AVATAR_FILE_EXTENSION}"));
    let backup = backup_root.join(&hash);
    AvatarPaths { original, backup }
}
