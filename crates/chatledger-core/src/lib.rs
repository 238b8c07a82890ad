//! # chatledger-core
//!
//! Core logic for `ChatLedger`, a reader for a chat application's on-device data store.
//!
//! This crate provides:
//! - **Account model** - identity fields, display name and id-based equality
//! - **Path derivation** - per-owner directories and the sharded avatar layout
//! - **Identity classification** - personal user, group or official account
//! - **Avatar resolution** - cache lookup with a backup-copy and decode fallback
//! - **Storage configuration** - where the data store and backup copies live

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod avatar;
pub mod config;
mod error;

pub use account::{
    Account, AccountKind, AvatarPaths, AvatarState, ValidationError, ValidationResult,
    validate_identity,
};
pub use avatar::{
    Avatar, AvatarCache, AvatarDecoder, AvatarResolver, FsCopier, ImageDecoder,
    MemoryAvatarCache, PrivilegedCopier, ShellCopier, resolve_all,
};
pub use config::{CopyMode, StorageConfig, StorageRoots};
pub use error::{Error, Result};
