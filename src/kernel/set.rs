//! Ordered kernel collections.
//!
//! Function genes in a chromosome index into a [`KernelSet`], so the order
//! kernels were added in is part of the encoding.

use crate::kernel::basis::Kernel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered collection of kernels available to expression nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSet {
    kernels: Vec<Kernel>,
}

impl KernelSet {
    /// Build a kernel set from wire names, in order.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::Unknown`] for any name not in the basis.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, KernelError> {
        let mut set = Self::default();
        for name in names {
            set.push(name.as_ref())?;
        }
        Ok(set)
    }

    /// Append a kernel by wire name.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::Unknown`] if the name is not in the basis.
    pub fn push(&mut self, name: &str) -> Result<(), KernelError> {
        let kernel =
            Kernel::parse(name).ok_or_else(|| KernelError::Unknown(name.to_string()))?;
        self.kernels.push(kernel);
        Ok(())
    }

    /// The kernels in insertion order.
    #[must_use]
    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    /// Number of kernels in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Wire names of the kernels, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.kernels.iter().map(|k| k.name()).collect()
    }
}

/// Error raised when resolving kernel names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// The name does not match any kernel in the basis.
    Unknown(String),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Unknown(name) => write!(f, "unknown kernel: {name}"),
        }
    }
}

impl std::error::Error for KernelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_preserves_order() {
        let set = KernelSet::new(&["sum", "diff", "mul", "div", "log", "exp"]).unwrap();
        assert_eq!(set.len(), 6);
        assert_eq!(set.names(), vec!["sum", "diff", "mul", "div", "log", "exp"]);
        assert_eq!(set.kernels()[4], Kernel::Log);
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let err = KernelSet::new(&["sum", "nope"]).unwrap_err();
        assert_eq!(err, KernelError::Unknown("nope".to_string()));
    }

    #[test]
    fn test_duplicates_are_allowed() {
        let set = KernelSet::new(&["sum", "sum"]).unwrap();
        assert_eq!(set.len(), 2);
    }
}
