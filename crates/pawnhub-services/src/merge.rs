//! Partial-update merge rules.
//!
//! A partial payload marks each field as supplied (`Some`) or not (`None`).
//! Unsupplied fields always keep their current value. What happens to a
//! supplied but blank value (empty string, zero) depends on the policy.

use std::str::FromStr;

use pawnhub_types::models::{ProductCategory, ProductCondition, StoreHours, UnknownVariant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Blank supplied values fall back to the current value.
    #[default]
    SkipBlank,
    /// Supplied values always win; a blank value clears an optional field.
    Explicit,
}

impl MergePolicy {
    /// Merge a required field.
    pub fn field<T: Blank>(self, current: T, supplied: Option<T>) -> T {
        match supplied {
            Some(value) if self == Self::Explicit || !value.is_blank() => value,
            _ => current,
        }
    }

    /// Merge an optional field.
    pub fn optional<T: Blank>(self, current: Option<T>, supplied: Option<T>) -> Option<T> {
        match supplied {
            None => current,
            Some(value) if !value.is_blank() => Some(value),
            Some(_) => match self {
                Self::SkipBlank => current,
                Self::Explicit => None,
            },
        }
    }
}

impl FromStr for MergePolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip-blank" => Ok(Self::SkipBlank),
            "explicit" => Ok(Self::Explicit),
            _ => Err(UnknownVariant {
                kind: "merge policy",
                value: s.to_string(),
            }),
        }
    }
}

/// Whether a supplied value counts as "empty" for merging purposes.
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for f64 {
    fn is_blank(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

// Lists, enums and nested records are never blank, even when empty.

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for ProductCategory {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for ProductCondition {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for StoreHours {
    fn is_blank(&self) -> bool {
        false
    }
}
