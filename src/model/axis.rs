//! The declared axes of a spatiotemporal box.
//!
//! Axis names are resolved once, at construction time, into this enum so
//! that predicates and accessors never dispatch on strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StalgebraError;

/// One of the three declared axes, in declaration order.
///
/// `T` is the primary axis: intervals are sorted by it first and the join
/// window is measured along it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    T,
    X,
    Y,
}

impl Axis {
    /// All axes in declaration order.
    pub const ALL: [Axis; 3] = [Axis::T, Axis::X, Axis::Y];

    /// Returns the lowercase axis name.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Axis::T => "t",
            Axis::X => "x",
            Axis::Y => "y",
        }
    }

    /// Returns true for the primary (sort and window) axis.
    #[inline]
    pub fn is_primary(self) -> bool {
        self == Axis::T
    }
}

impl fmt::Debug for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Axis({})", self.name())
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = StalgebraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "t" => Ok(Axis::T),
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            other => Err(StalgebraError::UnknownAxis(other.to_string())),
        }
    }
}
