//! Identity validation.
//!
//! Path derivation accepts any string. These checks are the boundary where callers
//! reject empty identifiers before constructing or endowing an account.

/// Validation error for account identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Owner UIN is empty.
    EmptyOwnerUin,
    /// Account id is empty.
    EmptyId,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyOwnerUin => "Owner UIN is required",
            Self::EmptyId => "Account id is required",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyOwnerUin => "owner_uin",
            Self::EmptyId => "id",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating an identity.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate an owner UIN.
///
/// # Errors
///
/// Returns `EmptyOwnerUin` if the UIN is blank.
pub fn validate_owner_uin(owner_uin: &str) -> ValidationResult {
    if owner_uin.trim().is_empty() {
        Err(vec![ValidationError::EmptyOwnerUin])
    } else {
        Ok(())
    }
}

/// Validate an account id.
///
/// # Errors
///
/// Returns `EmptyId` if the id is blank.
pub fn validate_id(id: &str) -> ValidationResult {
    if id.trim().is_empty() {
        Err(vec![ValidationError::EmptyId])
    } else {
        Ok(())
    }
}

/// Validate an owner UIN and account id together.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any field is invalid.
pub fn validate_identity(owner_uin: &str, id: &str) -> ValidationResult {
    let mut errors = Vec::new();

    if let Err(mut e) = validate_owner_uin(owner_uin) {
        errors.append(&mut e);
    }
    if let Err(mut e) = validate_id(id) {
        errors.append(&mut e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
