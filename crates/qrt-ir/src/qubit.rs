//! Qubit and classical bit types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The qubit index as a `usize`, for addressing state vectors.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

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

/// Index of a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl ClbitId {
    /// The bit index as a `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

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

/// A quantum bit with optional register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The unique identifier.
    pub id: QubitId,
    /// The name of the register this qubit belongs to, if any.
    pub register: Option<String>,
}

impl Qubit {
    /// Create a new qubit with just an id.
    pub fn new(id: QubitId) -> Self {
        Self { id, register: None }
    }

    /// Create a new qubit that belongs to a named register.
    pub fn with_register(id: QubitId, register: impl Into<String>) -> Self {
        Self {
            id,
            register: Some(register.into()),
        }
    }
}

/// A classical bit with optional register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clbit {
    /// The unique identifier.
    pub id: ClbitId,
    /// The name of the register this bit belongs to, if any.
    pub register: Option<String>,
}

impl Clbit {
    /// Create a new classical bit with just an id.
    pub fn new(id: ClbitId) -> Self {
        Self { id, register: None }
    }

    /// Create a new classical bit that belongs to a named register.
    pub fn with_register(id: ClbitId, register: impl Into<String>) -> Self {
        Self {
            id,
            register: Some(register.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(QubitId(3).to_string(), "q3");
        assert_eq!(ClbitId(1).to_string(), "c1");
    }

    #[test]
    fn test_register_membership() {
        let q = Qubit::with_register(QubitId(0), "meas");
        assert_eq!(q.register.as_deref(), Some("meas"));
        assert!(Clbit::new(ClbitId(0)).register.is_none());
    }
}
