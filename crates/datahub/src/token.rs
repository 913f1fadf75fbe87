//! Opaque identifiers handed out by dispatchers and collections.
//!
//! Tokens are plain counters scoped to the instance that issued them. They
//! carry no meaning outside that instance and are never reused while it lives.
use core::fmt;
use core::str::FromStr;

/// Identifies one callback registered on an [`EventHandler`](crate::EventHandler).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventToken(u64);

impl EventToken {
    /// Sentinel that is never issued by a dispatcher.
    pub const UNASSIGNED: Self = Self(0);

    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw counter value, useful for diagnostics only.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one element of an [`ObservableCollection`](crate::ObservableCollection)
/// for the element's entire lifetime.
///
/// Issued tokens are strictly increasing, so ordering tokens orders elements
/// by insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementToken(u64);

impl ElementToken {
    /// Sentinel that is never issued by a collection.
    pub const UNASSIGNED: Self = Self(0);

    /// Wraps a raw counter value.
    ///
    /// Tooling uses this to address elements by the number it displayed;
    /// a token built this way is only meaningful if the collection issued it.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw counter value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns true for the [`UNASSIGNED`](Self::UNASSIGNED) sentinel.
    #[inline]
    pub const fn is_unassigned(self) -> bool {
        self.0 == Self::UNASSIGNED.0
    }

    /// Successor of this token.
    ///
    /// Collections never move their counter above
    /// [`HubConfig::MAX_REQUESTED_TOKEN`](crate::HubConfig::MAX_REQUESTED_TOKEN)
    /// on request, so the remaining half of the range is left for `add`.
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for ElementToken {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

impl fmt::Display for ElementToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for ElementToken {
    type Err = core::num::ParseIntError;

    /// Accepts both `"3"` and the displayed form `"#3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        digits.parse().map(Self)
    }
}
