//! Account module.
//!
//! Provides the account model, identity classification, on-device path
//! derivation and identity validation.

pub mod identity;
mod model;
pub mod paths;
mod validation;

pub use identity::AccountKind;
pub use model::{Account, AvatarState, UNKNOWN_NAME};
pub use paths::AvatarPaths;
pub use validation::{
    ValidationError, ValidationResult, validate_id, validate_identity, validate_owner_uin,
};
