//! Part identity and part-quantity multisets.

use std::{collections::BTreeMap, fmt, str::FromStr};

/// The identity of a primitive part: its colour id and its part filename.
///
/// Two placements of the same part in the same colour are the same `PartKey`
/// regardless of where they sit in the model. The textual form is
/// `colour:filename`, e.g. `4:3001.dat`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartKey {
    colour: String,
    part: String,
}

impl PartKey {
    /// Creates a key from a colour id and a part filename.
    #[must_use]
    pub fn new(colour: impl Into<String>, part: impl Into<String>) -> Self {
        Self {
            colour: colour.into(),
            part: part.into(),
        }
    }

    /// The colour id, as it appeared in the source document.
    #[must_use]
    pub fn colour(&self) -> &str {
        &self.colour
    }

    /// The part filename, e.g. `3001.dat`.
    #[must_use]
    pub fn part(&self) -> &str {
        &self.part
    }
}

impl fmt::Display for PartKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.colour, self.part)
    }
}

/// Error returned when parsing a `colour:filename` key fails.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid part key '{0}': expected 'colour:filename'")]
pub struct InvalidPartKeyError(String);

impl FromStr for PartKey {
    type Err = InvalidPartKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (colour, part) = s
            .split_once(':')
            .ok_or_else(|| InvalidPartKeyError(s.to_string()))?;
        if colour.is_empty() || part.is_empty() {
            return Err(InvalidPartKeyError(s.to_string()));
        }
        Ok(Self::new(colour, part))
    }
}

/// A multiset of parts: each [`PartKey`] maps to a strictly positive count.
///
/// A key whose count would reach zero is never stored, so iteration only ever
/// yields parts that are actually present. Every derived partlist (merge,
/// scale, diff) is a fresh value; partlists are never shared mutably.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partlist(BTreeMap<PartKey, usize>);

impl Partlist {
    /// Creates an empty partlist.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds `amount` units of `key`. Adding zero units is a no-op.
    pub fn add(&mut self, key: PartKey, amount: usize) {
        if amount > 0 {
            *self.0.entry(key).or_insert(0) += amount;
        }
    }

    /// The count for `key`, or zero if absent.
    #[must_use]
    pub fn count(&self, key: &PartKey) -> usize {
        self.0.get(key).copied().unwrap_or(0)
    }

    /// `true` if no parts are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of distinct part keys.
    #[must_use]
    pub fn unique(&self) -> usize {
        self.0.len()
    }

    /// The total number of placed parts (sum of all counts).
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Merges `other` into `self` by key-wise count addition.
    pub fn merge(&mut self, other: &Self) {
        for (key, count) in other.iter() {
            self.add(key.clone(), count);
        }
    }

    /// Returns a copy with every count multiplied by `factor`.
    ///
    /// A factor of zero yields an empty partlist.
    #[must_use]
    pub fn scaled(&self, factor: usize) -> Self {
        let mut scaled = Self::new();
        for (key, count) in self.iter() {
            scaled.add(key.clone(), count * factor);
        }
        scaled
    }

    /// Iterates over `(key, count)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PartKey, usize)> {
        self.0.iter().map(|(key, count)| (key, *count))
    }
}

impl fmt::Display for Partlist {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unique: {}, Total: {}", self.unique(), self.total())
    }
}

impl FromIterator<(PartKey, usize)> for Partlist {
    fn from_iter<I: IntoIterator<Item = (PartKey, usize)>>(iter: I) -> Self {
        let mut partlist = Self::new();
        for (key, count) in iter {
            partlist.add(key, count);
        }
        partlist
    }
}
