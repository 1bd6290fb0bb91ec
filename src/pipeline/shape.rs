//! Array-shape metadata carried by every block.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered dimension sizes of the data flowing between blocks.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape(pub Vec<usize>);

impl Shape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self(dims.into())
    }

    /// Input shape of a source block: `[0]`, meaning "no input".
    pub fn source() -> Self {
        Self(vec![0])
    }

    pub fn is_source_sentinel(&self) -> bool {
        self.0.as_slice() == [0]
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn last_dim(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Replace the last dimension. No-op on an empty shape.
    pub fn with_last_dim(mut self, value: usize) -> Self {
        if let Some(last) = self.0.last_mut() {
            *last = value;
        }
        self
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.0.iter().fold(1, |acc, d| acc.saturating_mul(*d))
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape{}", self)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", dim)?;
        }
        f.write_str("]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(value: Vec<usize>) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(value: [usize; N]) -> Self {
        Self(value.to_vec())
    }
}
