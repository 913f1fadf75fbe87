//! Stable, caller-visible addresses of fields.
//!
//! A path names fields by their schema name and collection elements by
//! their token: `audio.volume`, `enemies[3].health`.

use core::fmt;
use core::str::FromStr;

use crate::error::DataHubError;
use crate::token::ElementToken;

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Field of a record, by name.
    Field(String),
    /// Element of a collection, by token.
    Element(ElementToken),
}

/// Parsed field address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Path to a field directly under the root.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Extends the path with a nested field.
    #[must_use]
    pub fn then_field(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Field(name.into()));
        self
    }

    /// Extends the path with a collection element.
    #[must_use]
    pub fn then_element(mut self, token: ElementToken) -> Self {
        self.segments.push(PathSegment::Element(token));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub(crate) fn invalid(&self, reason: &'static str) -> DataHubError {
        DataHubError::InvalidPath {
            path: self.to_string(),
            reason,
        }
    }
}

impl FromStr for FieldPath {
    type Err = DataHubError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| DataHubError::InvalidPath {
            path: path.to_owned(),
            reason,
        };

        let mut rest = path.trim();
        if rest.is_empty() {
            return Err(invalid("path is empty"));
        }

        let mut segments = Vec::new();
        let mut expect_name = true;
        loop {
            if expect_name {
                let end = rest.find(['.', '[', ']']).unwrap_or(rest.len());
                let name = rest[..end].trim();
                if name.is_empty() {
                    return Err(invalid("expected a field name"));
                }
                segments.push(PathSegment::Field(name.to_owned()));
                rest = &rest[end..];
                expect_name = false;
            }

            match rest.chars().next() {
                None => break,
                Some('.') => {
                    rest = &rest[1..];
                    expect_name = true;
                }
                Some('[') => {
                    let close = rest.find(']').ok_or_else(|| invalid("unclosed `[`"))?;
                    let token = rest[1..close]
                        .parse::<ElementToken>()
                        .map_err(|_| invalid("element token is not a number"))?;
                    segments.push(PathSegment::Element(token));
                    rest = &rest[close + 1..];
                }
                Some(_) => return Err(invalid("expected `.` or `[`")),
            }
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if index == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Element(token) => write!(f, "[{}]", token.get())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_tokens() {
        let path: FieldPath = "enemies[3].stats.health".parse().unwrap();
        assert_eq!(
            path.segments(),
            [
                PathSegment::Field("enemies".to_owned()),
                PathSegment::Element(ElementToken::from_raw(3)),
                PathSegment::Field("stats".to_owned()),
                PathSegment::Field("health".to_owned()),
            ]
        );
        assert_eq!(path.to_string(), "enemies[3].stats.health");
    }

    #[test]
    fn builder_form_matches_parsed_form() {
        let built = FieldPath::field("testarray")
            .then_element(ElementToken::from_raw(1))
            .then_field("teststring");
        assert_eq!(built, "testarray[#1].teststring".parse::<FieldPath>().unwrap());
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "a..b", ".a", "a[", "a[x]", "a]", "a.[1]"] {
            let err = bad.parse::<FieldPath>().unwrap_err();
            assert_eq!(err.error_code(), "invalid_path", "path {bad:?}");
        }
    }
}
