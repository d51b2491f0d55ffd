//! The latent embedding type.
//!
//! Fonts are represented by fixed-length `f32` vectors produced by an
//! autoencoder trained outside this crate. Embeddings are immutable and
//! cheap to clone (`Arc` internally), so the catalog, the per-metric
//! indexes, and in-flight queries can all share the same data.

use crate::error::{FontscapeError, FontscapeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A latent-space embedding of a single font.
///
/// # Example
///
/// ```ignore
/// let a = Embedding::new(vec![0.1, 0.2, 0.3])?;
/// let b = Embedding::new(vec![0.3, 0.2, 0.1])?;
/// let midpoint = a.lerp(&b, 0.5)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    data: Arc<[f32]>,
}

impl Serialize for Embedding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.data.iter())
    }
}

impl<'de> Deserialize<'de> for Embedding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = Vec::<f32>::deserialize(deserializer)?;
        Embedding::new(data).map_err(serde::de::Error::custom)
    }
}

impl Embedding {
    /// Create a new embedding from raw components.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if `data` is empty.
    pub fn new(data: Vec<f32>) -> FontscapeResult<Self> {
        if data.is_empty() {
            return Err(FontscapeError::InvalidData {
                reason: "embedding data cannot be empty".to_string(),
            });
        }
        Ok(Self {
            data: Arc::from(data.into_boxed_slice()),
        })
    }

    /// Get the embedding components as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Get the number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.data.len()
    }

    /// L2 norm of the embedding.
    pub fn magnitude(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Linearly interpolate between `self` (t = 0) and `other` (t = 1).
    ///
    /// The fraction is clamped to `[0, 1]`, matching how the interpolation
    /// endpoint treats out-of-range requests.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the embeddings have different lengths.
    pub fn lerp(&self, other: &Embedding, t: f32) -> FontscapeResult<Embedding> {
        if self.dimensions() != other.dimensions() {
            return Err(FontscapeError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other.dimensions(),
            });
        }
        let t = t.clamp(0.0, 1.0);
        let data: Vec<f32> = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a + (b - a) * t)
            .collect();
        Embedding::new(data)
    }
}

impl fmt::Display for Embedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Embedding(dims={})", self.dimensions())
    }
}
