//! Scalar representations and the observable value built on them.
//!
//! A field holds exactly one of three representation kinds (see
//! [`ScalarKind`]), fixed when the field is defined. Reads and writes across
//! kinds go through the single coercion table in [`scalar`]; the
//! human-readable text boundary lives in [`format`].

pub mod format;
pub mod observable;
pub mod scalar;

pub use format::{format_general, parse_lenient};
pub use observable::ObservableValue;
pub use scalar::{FromScalar, Scalar, ScalarKind};
