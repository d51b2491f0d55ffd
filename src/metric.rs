//! Distance metrics for font embeddings.
//!
//! The service exposes the same metric vocabulary the original index was
//! built with: angular, euclidean, manhattan, hamming, and dot. All of them
//! are *distances* here, so smaller is always nearer and the per-metric
//! indexes can share one ordering rule.
//!
//! Mismatched dimensions yield `f32::INFINITY`, so such pairs are never
//! selected as nearest neighbors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance metric for dense embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Angular distance sqrt(2·(1 − cos(a,b))).
    Angular,
    /// Euclidean (L2) distance.
    Euclidean,
    /// Manhattan (L1) distance.
    Manhattan,
    /// Hamming distance over thresholded bits: components count as set
    /// when > 0.5.
    Hamming,
    /// Dot-product distance −⟨a,b⟩ (for maximum inner product search).
    Dot,
}

impl Metric {
    /// All metrics the service knows about.
    pub const ALL: [Metric; 5] = [
        Metric::Angular,
        Metric::Euclidean,
        Metric::Manhattan,
        Metric::Hamming,
        Metric::Dot,
    ];

    /// Compute the distance between two vectors under this metric.
    #[inline]
    #[must_use]
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Angular => angular_distance(a, b),
            Metric::Euclidean => euclidean_distance(a, b),
            Metric::Manhattan => manhattan_distance(a, b),
            Metric::Hamming => hamming_distance(a, b),
            Metric::Dot => dot_distance(a, b),
        }
    }

    /// Canonical lowercase name, as used in config and the JSON API.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Angular => "angular",
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
            Metric::Hamming => "hamming",
            Metric::Dot => "dot",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "angular" => Ok(Metric::Angular),
            "euclidean" => Ok(Metric::Euclidean),
            "manhattan" => Ok(Metric::Manhattan),
            "hamming" => Ok(Metric::Hamming),
            "dot" => Ok(Metric::Dot),
            other => Err(format!("unknown metric '{}'", other)),
        }
    }
}

/// Cosine similarity, computing norms as needed.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Angular distance sqrt(2·(1 − cos(a,b))), in `[0, 2]`.
#[inline]
#[must_use]
pub fn angular_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    (2.0 * (1.0 - cosine_similarity(a, b))).max(0.0).sqrt()
}

/// L2 (Euclidean) distance.
#[inline]
#[must_use]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// L1 (Manhattan) distance.
#[inline]
#[must_use]
pub fn manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// Hamming distance over thresholded bits (> 0.5 counts as set).
#[inline]
#[must_use]
pub fn hamming_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .filter(|(x, y)| (**x > 0.5) != (**y > 0.5))
        .count() as f32
}

/// Dot-product distance (negative inner product).
#[inline]
#[must_use]
pub fn dot_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    -a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f32>()
}
