//! Multi-metric nearest-neighbor database over font embeddings.
//!
//! One index is built per configured [`Metric`], each holding every catalog
//! embedding under its integer font index. Queries name a metric and get
//! back font indices ordered nearest-first.
//!
//! The index behind each metric is an exact flat scan. The [`NeighborIndex`]
//! trait is the seam where an approximate backend could be swapped in
//! without touching callers; building one is explicitly out of scope here.

use crate::catalog::FontCatalog;
use crate::embedding::Embedding;
use crate::error::{FontscapeError, FontscapeResult};
use crate::metric::Metric;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// A nearest-neighbor index over integer-keyed embeddings.
///
/// Abstracts over index strategies so the database can swap backends per
/// dataset size without changing query code.
pub trait NeighborIndex: Send + Sync {
    /// Insert an embedding under a key, replacing any previous entry.
    fn add(&self, key: usize, embedding: Embedding);

    /// Return up to `k` (key, distance) pairs ordered nearest-first.
    fn nearest(&self, query: &[f32], k: usize) -> Vec<(usize, f32)>;

    /// Number of embeddings in the index.
    fn len(&self) -> usize;

    /// Whether the index holds no embeddings.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An exact flat-scan index for a single metric.
///
/// Compares the query against every stored embedding. O(n) per query, which
/// is fine for catalog-sized datasets; ties break on key so results are
/// deterministic.
#[derive(Debug)]
pub struct FlatIndex {
    metric: Metric,
    vectors: DashMap<usize, Embedding>,
}

impl FlatIndex {
    /// Create an empty flat index for the given metric.
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            vectors: DashMap::new(),
        }
    }

    /// The metric this index orders by.
    pub fn metric(&self) -> Metric {
        self.metric
    }
}

impl NeighborIndex for FlatIndex {
    fn add(&self, key: usize, embedding: Embedding) {
        self.vectors.insert(key, embedding);
    }

    fn nearest(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .map(|entry| (*entry.key(), self.metric.distance(query, entry.value().as_slice())))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }
}

/// Nearest-neighbor database with one index per configured metric.
///
/// # Example
///
/// ```ignore
/// let db = MultiMetricDatabase::new(9, &[Metric::Euclidean, Metric::Angular])?;
/// db.index_catalog(&catalog)?;
/// let neighbors = db.nearest_neighbors(query.as_slice(), Metric::Euclidean, 10)?;
/// ```
pub struct MultiMetricDatabase {
    dimensions: usize,
    databases: HashMap<Metric, Arc<dyn NeighborIndex>>,
}

impl std::fmt::Debug for MultiMetricDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiMetricDatabase")
            .field("dimensions", &self.dimensions)
            .field("metrics", &self.metrics())
            .field("len", &self.len())
            .finish()
    }
}

impl MultiMetricDatabase {
    /// Create a database with an empty flat index per metric.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if `metrics` is empty or `dimensions` is zero.
    pub fn new(dimensions: usize, metrics: &[Metric]) -> FontscapeResult<Self> {
        if metrics.is_empty() {
            return Err(FontscapeError::InvalidData {
                reason: "at least one metric is required".to_string(),
            });
        }
        if dimensions == 0 {
            return Err(FontscapeError::InvalidData {
                reason: "dimensions must be nonzero".to_string(),
            });
        }

        let mut databases: HashMap<Metric, Arc<dyn NeighborIndex>> = HashMap::new();
        for &metric in metrics {
            databases
                .entry(metric)
                .or_insert_with(|| Arc::new(FlatIndex::new(metric)));
        }

        Ok(Self {
            dimensions,
            databases,
        })
    }

    /// The embedding dimensionality this database validates against.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Configured metrics, in canonical declaration order.
    pub fn metrics(&self) -> Vec<Metric> {
        Metric::ALL
            .iter()
            .copied()
            .filter(|m| self.databases.contains_key(m))
            .collect()
    }

    /// Number of embeddings held per index.
    pub fn len(&self) -> usize {
        self.databases.values().next().map_or(0, |idx| idx.len())
    }

    /// Whether the database has no embeddings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert one embedding under a font index, into every per-metric index.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the embedding's length differs from
    /// the database's.
    pub fn insert(&self, key: usize, embedding: &Embedding) -> FontscapeResult<()> {
        if embedding.dimensions() != self.dimensions {
            return Err(FontscapeError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.dimensions(),
            });
        }
        for index in self.databases.values() {
            index.add(key, embedding.clone());
        }
        Ok(())
    }

    /// Index every font in a catalog under its catalog index.
    pub fn index_catalog(&self, catalog: &FontCatalog) -> FontscapeResult<()> {
        if catalog.dimensions() != self.dimensions {
            return Err(FontscapeError::DimensionMismatch {
                expected: self.dimensions,
                actual: catalog.dimensions(),
            });
        }
        for (index, entry) in catalog.entries() {
            self.insert(index, &entry.embedding)?;
        }
        Ok(())
    }

    /// Query the `metric` index for the `k` nearest font indices.
    pub fn nearest_neighbors(
        &self,
        query: &[f32],
        metric: Metric,
        k: usize,
    ) -> FontscapeResult<Vec<usize>> {
        Ok(self
            .nearest_with_distances(query, metric, k)?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    /// Like [`nearest_neighbors`](Self::nearest_neighbors), keeping the
    /// per-result distances.
    pub fn nearest_with_distances(
        &self,
        query: &[f32],
        metric: Metric,
        k: usize,
    ) -> FontscapeResult<Vec<(usize, f32)>> {
        if query.len() != self.dimensions {
            return Err(FontscapeError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        let index = self
            .databases
            .get(&metric)
            .ok_or_else(|| FontscapeError::UnsupportedMetric {
                metric: metric.to_string(),
                available: self
                    .metrics()
                    .iter()
                    .map(|m| m.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        Ok(index.nearest(query, k))
    }
}
