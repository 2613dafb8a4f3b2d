//! Mode identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An independent quantum degree of freedom (e.g. a cavity field).
///
/// Modes are value-carried: every operator holds its own `Mode`, and two
/// modes are the same degree of freedom exactly when they compare equal.
/// There is no global mode registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mode {
    /// Mode label, e.g. `"cav"`.
    pub label: String,
    /// Optional Hilbert-space dimension metadata. `None` leaves the
    /// truncation to be chosen at compile time.
    pub dim: Option<u32>,
}

impl Mode {
    /// A mode with no dimension metadata.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            dim: None,
        }
    }

    /// A mode with declared dimension metadata.
    pub fn with_dim(label: impl Into<String>, dim: u32) -> Self {
        Self {
            label: label.into(),
            dim: Some(dim),
        }
    }

    /// Two modes are compatible unless they share a label but disagree on
    /// dimension metadata.
    pub fn compatible_with(&self, other: &Mode) -> bool {
        self.label != other.label || self.dim == other.dim
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatibility() {
        let a = Mode::new("cav");
        let b = Mode::new("cav");
        let c = Mode::with_dim("cav", 10);
        let d = Mode::with_dim("cav", 12);
        let e = Mode::with_dim("out", 12);

        assert!(a.compatible_with(&b));
        assert!(!a.compatible_with(&c));
        assert!(!c.compatible_with(&d));
        assert!(c.compatible_with(&e));
    }

    #[test]
    fn test_display() {
        assert_eq!(Mode::with_dim("cav", 10).to_string(), "cav");
    }
}
