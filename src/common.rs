use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

pub use vec1::vec1;

pub type Int = i64;
pub type UInt = u32;
pub type NonZeroUInt = NonZeroU32;

pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Whether a single-die roll is taken twice and one candidate kept.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvType {
    #[default]
    None,
    Advantage,
    Disadvantage,
}

impl AdvType {
    /// Number of base dice rolled before selection, or `None` for a plain roll.
    pub(crate) const fn candidates(self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::Advantage | Self::Disadvantage => Some(2),
        }
    }
}

impl fmt::Display for AdvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Advantage => f.write_str("advantage"),
            Self::Disadvantage => f.write_str("disadvantage"),
        }
    }
}
