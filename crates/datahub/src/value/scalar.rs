//! Scalar representation kinds and the coercion table between them.
//!
//! | field kind | accepts writes of   | readable as                      |
//! |------------|---------------------|----------------------------------|
//! | `number`   | number, text        | number, integer, boolean, text   |
//! | `boolean`  | boolean, text       | boolean, number, text            |
//! | `text`     | text, number, bool  | text, boolean, number            |
//!
//! Every row of the table is expressed once, in [`ScalarKind::accepts`] and
//! [`Scalar::coerce_into`].

use crate::config::HubConfig;
use crate::error::{DataHubError, Result};
use crate::value::format::{format_general, parse_lenient};

/// Representation kind of a field, fixed at definition time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScalarKind {
    /// Floating-point magnitude.
    Number,
    /// Single bit.
    Boolean,
    /// Owned string.
    Text,
}

impl ScalarKind {
    /// Returns true if a field of this kind accepts writes of `source` kind.
    pub const fn accepts(self, source: ScalarKind) -> bool {
        matches!(
            (self, source),
            (ScalarKind::Number, ScalarKind::Number | ScalarKind::Text)
                | (ScalarKind::Boolean, ScalarKind::Boolean | ScalarKind::Text)
                | (ScalarKind::Text, _)
        )
    }
}

/// Content of a field in one of the three representations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Scalar {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl Scalar {
    /// Representation kind of this content.
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Number(_) => ScalarKind::Number,
            Scalar::Boolean(_) => ScalarKind::Boolean,
            Scalar::Text(_) => ScalarKind::Text,
        }
    }

    /// Converts this content to the native representation of a `kind` field.
    ///
    /// Fails when the coercion table has no entry for the pair.
    pub fn coerce_into(self, kind: ScalarKind) -> Result<Scalar> {
        let source = self.kind();
        if !kind.accepts(source) {
            return Err(DataHubError::IncompatibleAssignment {
                field: kind,
                value: source,
            });
        }

        let coerced = match (kind, self) {
            (ScalarKind::Number, Scalar::Text(text)) => Scalar::Number(parse_lenient(&text)),
            (ScalarKind::Boolean, Scalar::Text(text)) => Scalar::Boolean(text_is_true(&text)),
            (ScalarKind::Text, Scalar::Number(number)) => Scalar::Text(format_general(number)),
            (ScalarKind::Text, Scalar::Boolean(flag)) => Scalar::Text(bool_text(flag).to_owned()),
            (_, same) => same,
        };
        Ok(coerced)
    }

    /// Reads the content as a floating-point number.
    ///
    /// Booleans read as `1` or `0`; text is parsed leniently.
    pub fn as_f64(&self) -> f64 {
        match self {
            Scalar::Number(number) => *number,
            Scalar::Boolean(flag) => f64::from(u8::from(*flag)),
            Scalar::Text(text) => parse_lenient(text),
        }
    }

    /// Reads the content as an integer, truncating toward zero.
    ///
    /// Values outside the `i64` range saturate and NaN reads as zero.
    pub fn as_i64(&self) -> i64 {
        self.as_f64() as i64
    }

    /// Reads the content as a boolean.
    ///
    /// Numbers are true iff non-zero; text is true iff it equals `"true"`
    /// ignoring ASCII case.
    pub fn as_bool(&self) -> bool {
        match self {
            Scalar::Number(number) => *number != 0.0,
            Scalar::Boolean(flag) => *flag,
            Scalar::Text(text) => text_is_true(text),
        }
    }

    /// Renders the content in its human-readable text form.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Number(number) => format_general(*number),
            Scalar::Boolean(flag) => bool_text(*flag).to_owned(),
            Scalar::Text(text) => text.clone(),
        }
    }

    /// Compares `other` against this content using the rules of this
    /// content's kind.
    ///
    /// Numbers compare within `f64::EPSILON`, text compares exactly unless
    /// the other side is a number or boolean, in which case the text is read
    /// in that representation first.
    pub fn loosely_equals(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Text(lhs), Scalar::Text(rhs)) => lhs == rhs,
            (Scalar::Boolean(_), _) | (_, Scalar::Boolean(_)) => self.as_bool() == other.as_bool(),
            _ => (self.as_f64() - other.as_f64()).abs() < f64::EPSILON,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn text_is_true(text: &str) -> bool {
    text.eq_ignore_ascii_case(HubConfig::TRUE_TEXT)
}

const fn bool_text(flag: bool) -> &'static str {
    if flag {
        HubConfig::TRUE_TEXT
    } else {
        HubConfig::FALSE_TEXT
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::Number(value as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Scalar::Text(value.clone())
    }
}

/// Types a field's content can be read as.
pub trait FromScalar: Sized {
    fn from_scalar(scalar: &Scalar) -> Self;
}

macro_rules! impl_from_scalar_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromScalar for $ty {
                fn from_scalar(scalar: &Scalar) -> Self {
                    // Float-to-int `as` truncates toward zero and saturates.
                    scalar.as_f64() as $ty
                }
            }
        )*
    };
}

impl_from_scalar_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromScalar for f64 {
    fn from_scalar(scalar: &Scalar) -> Self {
        scalar.as_f64()
    }
}

impl FromScalar for f32 {
    fn from_scalar(scalar: &Scalar) -> Self {
        scalar.as_f64() as f32
    }
}

impl FromScalar for bool {
    fn from_scalar(scalar: &Scalar) -> Self {
        scalar.as_bool()
    }
}

impl FromScalar for String {
    fn from_scalar(scalar: &Scalar) -> Self {
        scalar.to_text()
    }
}

impl FromScalar for Scalar {
    fn from_scalar(scalar: &Scalar) -> Self {
        scalar.clone()
    }
}
