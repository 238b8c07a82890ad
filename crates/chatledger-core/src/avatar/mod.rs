//! Avatar resolution.
//!
//! Avatars live in the application's private store, which this process usually cannot
//! read. The resolver copies them to a writable backup directory with a
//! [`PrivilegedCopier`], decodes the copy and keeps the result in an [`AvatarCache`].

use std::sync::Arc;

mod batch;
mod cache;
mod copier;
mod decoder;
mod resolver;

pub use batch::resolve_all;
pub use cache::{AvatarCache, MemoryAvatarCache};
pub use copier::{FsCopier, PrivilegedCopier, ShellCopier};
pub use decoder::{AvatarDecoder, ImageDecoder};
pub use resolver::AvatarResolver;

/// A decoded avatar, shared between the cache and callers.
pub type Avatar = Arc<image::DynamicImage>;
