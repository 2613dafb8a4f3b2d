//! Channel permutations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CircuitError, CircuitResult};

/// A bijection over the channel indices `{0..n-1}`.
///
/// Stored as an explicit image sequence: channel `i` maps to `image[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelPermutation {
    image: Vec<usize>,
}

impl ChannelPermutation {
    /// Validate and build a permutation from its image sequence.
    pub fn new(image: Vec<usize>) -> CircuitResult<Self> {
        let n = image.len();
        let mut seen = vec![false; n];
        for &target in &image {
            if target >= n || seen[target] {
                return Err(CircuitError::InvalidPermutation { image });
            }
            seen[target] = true;
        }
        Ok(Self { image })
    }

    /// The identity permutation on `n` channels.
    pub fn identity(n: usize) -> Self {
        Self {
            image: (0..n).collect(),
        }
    }

    /// The block swap moving the first `n1` channels past the next `n2`.
    ///
    /// Sends `[0..n1)` to `[n2..n2+n1)` and `[n1..n1+n2)` to `[0..n2)`.
    pub fn swap_blocks(n1: usize, n2: usize) -> Self {
        let image = (0..n1 + n2)
            .map(|i| if i < n1 { i + n2 } else { i - n1 })
            .collect();
        Self { image }
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.image.len()
    }

    /// True for the zero-channel permutation.
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// True if every channel maps to itself.
    pub fn is_identity(&self) -> bool {
        self.image.iter().enumerate().all(|(i, &target)| i == target)
    }

    /// The image of channel `i`.
    pub fn apply(&self, i: usize) -> usize {
        self.image[i]
    }

    /// The raw image sequence.
    pub fn image(&self) -> &[usize] {
        &self.image
    }

    /// Function composition `other ∘ self`: apply `self` first, then `other`.
    pub fn then(&self, other: &ChannelPermutation) -> CircuitResult<ChannelPermutation> {
        if self.len() != other.len() {
            return Err(CircuitError::ChannelMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        let image = self.image.iter().map(|&mid| other.image[mid]).collect();
        Ok(Self { image })
    }

    /// The inverse permutation.
    pub fn inverse(&self) -> ChannelPermutation {
        let mut image = vec![0; self.image.len()];
        for (i, &target) in self.image.iter().enumerate() {
            image[target] = i;
        }
        Self { image }
    }

    /// Decompose along consecutive blocks of the given sizes.
    ///
    /// Returns the per-block sub-permutations if every block maps into
    /// itself, `None` otherwise (including when the sizes do not cover the
    /// channel set).
    pub fn block_split(&self, sizes: &[usize]) -> Option<Vec<ChannelPermutation>> {
        if sizes.iter().sum::<usize>() != self.len() {
            return None;
        }
        let mut parts = Vec::with_capacity(sizes.len());
        let mut offset = 0;
        for &size in sizes {
            let block = &self.image[offset..offset + size];
            if block
                .iter()
                .any(|&target| target < offset || target >= offset + size)
            {
                return None;
            }
            parts.push(Self {
                image: block.iter().map(|&target| target - offset).collect(),
            });
            offset += size;
        }
        Some(parts)
    }
}

impl fmt::Display for ChannelPermutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.image.iter().map(|i| i.to_string()).collect();
        write!(f, "σ({})", parts.join(","))
    }
}
