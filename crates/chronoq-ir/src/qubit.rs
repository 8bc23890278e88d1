//! Qubit and classical-bit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat, zero-based index into the engine's qubit space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("QubitId overflow: exceeds u32::MAX"))
    }
}

impl QubitId {
    /// Index into a flat amplitude/density-matrix array.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Flat, zero-based index into the engine's classical-bit space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

impl From<usize> for ClbitId {
    fn from(id: usize) -> Self {
        ClbitId(u32::try_from(id).expect("ClbitId overflow: exceeds u32::MAX"))
    }
}

/// A reference to a single element of a register, e.g. `q[0]`.
///
/// Produced by the preprocessor once a bare register name (`q`) has been
/// expanded against its declared size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterRef {
    /// Register name as written in source.
    pub name: String,
    /// Index within the register.
    pub index: u32,
}

impl RegisterRef {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for RegisterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qubit_display() {
        assert_eq!(format!("{}", QubitId(3)), "q3");
    }

    #[test]
    fn register_ref_display() {
        assert_eq!(format!("{}", RegisterRef::new("q", 2)), "q[2]");
    }
}
