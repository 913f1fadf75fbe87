//! Error types for datahub operations and schema definitions.
//!
//! Data-content problems never surface here: unparseable text degrades to
//! zero and unsubscribing a stale token is a no-op. Errors are reserved for
//! identity violations (tokens, names, paths) and for writes that fall
//! outside a field's coercion table.

use crate::token::ElementToken;
use crate::value::ScalarKind;

/// Failure of an operation on a live scope, value or collection.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataHubError {
    /// The collection holds no element under this token.
    #[error("no element {token} in collection")]
    UnknownToken { token: ElementToken },

    /// A requested token lies beyond the range a collection will create.
    #[error("element token {token} is out of range")]
    TokenOutOfRange { token: ElementToken },

    /// The `UNASSIGNED` sentinel was used where a real token is required.
    #[error("the unassigned element token cannot address an element")]
    UnassignedToken,

    /// No field with this name exists in the record.
    #[error("unknown field `{name}`")]
    UnknownField { name: String },

    /// The field exists but holds a different kind of node.
    #[error("field `{name}` is a {found}, not a {expected}")]
    WrongFieldType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A value of `value` kind cannot be written into a `field` kind field.
    #[error("cannot assign a {value} value to a {field} field")]
    IncompatibleAssignment { field: ScalarKind, value: ScalarKind },

    /// A field path could not be parsed or walked.
    #[error("invalid field path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A scope with this name is already registered.
    #[error("scope `{name}` is already registered")]
    DuplicateScope { name: String },

    /// No scope with this name is registered.
    #[error("unknown scope `{name}`")]
    UnknownScope { name: String },
}

impl DataHubError {
    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownToken { .. } => "unknown_token",
            Self::TokenOutOfRange { .. } => "token_out_of_range",
            Self::UnassignedToken => "unassigned_token",
            Self::UnknownField { .. } => "unknown_field",
            Self::WrongFieldType { .. } => "wrong_field_type",
            Self::IncompatibleAssignment { .. } => "incompatible_assignment",
            Self::InvalidPath { .. } => "invalid_path",
            Self::DuplicateScope { .. } => "duplicate_scope",
            Self::UnknownScope { .. } => "unknown_scope",
        }
    }

    /// Returns true if the error means the caller used an identifier the
    /// hub never issued or already retired.
    pub const fn is_stale_identity(&self) -> bool {
        matches!(
            self,
            Self::UnknownToken { .. }
                | Self::TokenOutOfRange { .. }
                | Self::UnassignedToken
                | Self::UnknownScope { .. }
        )
    }
}

/// Mistake in a schema definition, reported before any scope is instantiated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Field and scope names must not be empty.
    #[error("field names must not be empty")]
    EmptyName,

    /// Paths trim their segments, so padded names could never be addressed.
    #[error("name `{name}` has leading or trailing whitespace")]
    SurroundingWhitespace { name: String },

    /// Names must not contain characters reserved by field paths.
    #[error("name `{name}` contains reserved path character `{character}`")]
    ReservedCharacter { name: String, character: char },

    /// Two fields of the same record share a name.
    #[error("duplicate field `{name}`")]
    DuplicateField { name: String },
}

impl SchemaError {
    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::SurroundingWhitespace { .. } => "surrounding_whitespace",
            Self::ReservedCharacter { .. } => "reserved_character",
            Self::DuplicateField { .. } => "duplicate_field",
        }
    }
}

pub type Result<T> = std::result::Result<T, DataHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_identity() {
        let err = DataHubError::UnknownToken {
            token: ElementToken::from_raw(7),
        };
        assert_eq!(err.to_string(), "no element #7 in collection");
        assert_eq!(err.error_code(), "unknown_token");
        assert!(err.is_stale_identity());

        let err = DataHubError::IncompatibleAssignment {
            field: ScalarKind::Number,
            value: ScalarKind::Boolean,
        };
        assert_eq!(err.to_string(), "cannot assign a boolean value to a number field");
        assert!(!err.is_stale_identity());
    }
}
