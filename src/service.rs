//! Core fontscape service.
//!
//! [`FontScape`] is the composition root: the font catalog, the per-metric
//! nearest-neighbor database built from it, and (optionally) the glyph
//! decoder model. All operations the HTTP layer and CLI expose live here.
//!
//! The service is read-only once built and cheap to clone (`Arc` fields),
//! so one instance is shared across all HTTP handlers.

use crate::catalog::FontCatalog;
use crate::db::MultiMetricDatabase;
use crate::error::{FontscapeError, FontscapeResult};
use crate::graph::{self, GraphNode};
use crate::metric::Metric;
use crate::model::{GlyphDecoder, InterpolatedGlyphs, interpolate_glyphs};
use crate::reduce::{Reduction, reduce_to_2d};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Service configuration. Everything has a sensible default; the CLI maps
/// its flags onto this.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Metrics to build indexes for
    pub metrics: Vec<Metric>,
    /// Metric used when a query names none
    pub default_metric: Metric,
    /// Neighbor count used when a query names none
    pub default_k: usize,
    /// Root of the data directory (specimen images live under it)
    pub data_dir: PathBuf,
    /// Half-width of the map canvas coordinates
    pub map_extent: f32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            metrics: vec![Metric::Euclidean],
            default_metric: Metric::Euclidean,
            default_k: 10,
            data_dir: PathBuf::from("./data"),
            map_extent: 500.0,
        }
    }
}

/// A font reference as the API returns it: the integer index the widget
/// submits back, plus the display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRecord {
    /// Font index
    pub value: usize,
    /// Font label
    pub name: String,
}

/// Service statistics for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    /// Number of fonts in the catalog
    pub font_count: usize,
    /// Embedding dimensionality
    pub dimensions: usize,
    /// Configured metrics
    pub metrics: Vec<Metric>,
    /// Whether a decoder model is attached
    pub model_attached: bool,
    /// When this service instance was built
    pub started_at: DateTime<Utc>,
}

/// The font-similarity exploration service.
#[derive(Clone)]
pub struct FontScape {
    catalog: Arc<FontCatalog>,
    database: Arc<MultiMetricDatabase>,
    decoder: Option<Arc<dyn GlyphDecoder>>,
    config: Arc<ServiceConfig>,
    started_at: DateTime<Utc>,
}

impl std::fmt::Debug for FontScape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontScape")
            .field("fonts", &self.catalog.len())
            .field("dimensions", &self.catalog.dimensions())
            .field("metrics", &self.database.metrics())
            .field("model_attached", &self.decoder.is_some())
            .finish()
    }
}

impl FontScape {
    /// Build the service: one index per configured metric, filled from the
    /// catalog.
    pub fn build(catalog: FontCatalog, config: ServiceConfig) -> FontscapeResult<Self> {
        let database = MultiMetricDatabase::new(catalog.dimensions(), &config.metrics)?;
        database.index_catalog(&catalog)?;

        info!(
            fonts = catalog.len(),
            dimensions = catalog.dimensions(),
            metrics = ?database.metrics(),
            "indexed font catalog"
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            database: Arc::new(database),
            decoder: None,
            config: Arc::new(config),
            started_at: Utc::now(),
        })
    }

    /// Attach a glyph decoder model, enabling interpolation.
    pub fn with_decoder(mut self, decoder: Arc<dyn GlyphDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &FontCatalog {
        &self.catalog
    }

    /// The service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// All fonts, in index order.
    pub fn fonts(&self) -> Vec<FontRecord> {
        self.catalog
            .entries()
            .map(|(value, entry)| FontRecord {
                value,
                name: entry.label.clone(),
            })
            .collect()
    }

    /// The fonts nearest to `font_index` under `metric`.
    ///
    /// The queried font is typically its own nearest neighbor and is kept
    /// in the results; callers that want it gone filter by index.
    pub fn similar_fonts(
        &self,
        font_index: usize,
        metric: Option<Metric>,
        k: Option<usize>,
    ) -> FontscapeResult<Vec<FontRecord>> {
        let metric = metric.unwrap_or(self.config.default_metric);
        let k = k.unwrap_or(self.config.default_k);

        let query = self.catalog.embedding(font_index)?;
        let neighbors = self
            .database
            .nearest_neighbors(query.as_slice(), metric, k)?;

        neighbors
            .into_iter()
            .map(|index| {
                Ok(FontRecord {
                    value: index,
                    name: self.catalog.label_of(index)?.to_string(),
                })
            })
            .collect()
    }

    /// Like [`similar_fonts`](Self::similar_fonts), addressed by label.
    pub fn similar_fonts_by_label(
        &self,
        label: &str,
        metric: Option<Metric>,
        k: Option<usize>,
    ) -> FontscapeResult<Vec<FontRecord>> {
        let index = self.catalog.index_of(label)?;
        self.similar_fonts(index, metric, k)
    }

    /// Interpolate between two fonts in latent space and decode all three
    /// glyph images.
    ///
    /// # Errors
    ///
    /// `ModelUnavailable` when no decoder is attached; `FontNotFound` for
    /// unknown indices.
    pub fn interpolation(
        &self,
        font_1_index: usize,
        font_2_index: usize,
        fraction: f32,
    ) -> FontscapeResult<InterpolatedGlyphs> {
        let decoder = self
            .decoder
            .as_deref()
            .ok_or(FontscapeError::ModelUnavailable)?;

        let font_1 = self.catalog.embedding(font_1_index)?;
        let font_2 = self.catalog.embedding(font_2_index)?;
        interpolate_glyphs(decoder, font_1, font_2, fraction)
    }

    /// Project a subset of fonts (or the whole catalog) to 2D and shape
    /// the result into graph nodes, scaled to the configured canvas.
    pub fn map(
        &self,
        font_indices: Option<Vec<usize>>,
        method: Reduction,
        extent: Option<f32>,
    ) -> FontscapeResult<Vec<GraphNode>> {
        let indices = match font_indices {
            Some(indices) if indices.is_empty() => {
                return Err(FontscapeError::InvalidData {
                    reason: "font_indices must not be empty".to_string(),
                });
            }
            Some(indices) => indices,
            None => (0..self.catalog.len()).collect(),
        };

        let embeddings = indices
            .iter()
            .map(|&i| self.catalog.embedding(i).cloned())
            .collect::<FontscapeResult<Vec<_>>>()?;

        let mut coords = reduce_to_2d(&embeddings, method)?;
        graph::scale_coordinates(&mut coords, extent.unwrap_or(self.config.map_extent));
        graph::nodes_from_projection(&indices, &coords, &self.catalog, &self.config.data_dir)
    }

    /// Service statistics.
    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            font_count: self.catalog.len(),
            dimensions: self.catalog.dimensions(),
            metrics: self.database.metrics(),
            model_attached: self.decoder.is_some(),
            started_at: self.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedding;

    fn embedding(data: &[f32]) -> Embedding {
        Embedding::new(data.to_vec()).unwrap()
    }

    fn test_service(metrics: &[Metric]) -> FontScape {
        let catalog = FontCatalog::from_pairs(vec![
            ("Garamond".to_string(), embedding(&[1.0, 0.0, 0.0])),
            ("Bembo".to_string(), embedding(&[0.95, 0.05, 0.0])),
            ("Helvetica".to_string(), embedding(&[0.0, 1.0, 0.0])),
            ("Univers".to_string(), embedding(&[0.05, 0.95, 0.0])),
            ("Courier".to_string(), embedding(&[0.0, 0.0, 1.0])),
        ])
        .unwrap();

        FontScape::build(
            catalog,
            ServiceConfig {
                metrics: metrics.to_vec(),
                ..ServiceConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_fonts_listing() {
        let service = test_service(&[Metric::Euclidean]);
        let fonts = service.fonts();
        assert_eq!(fonts.len(), 5);
        assert_eq!(fonts[0].value, 0);
        assert_eq!(fonts[0].name, "Garamond");
        assert_eq!(fonts[4].name, "Courier");
    }

    #[test]
    fn test_similar_fonts_ranks_serif_cousins_first() {
        let service = test_service(&[Metric::Euclidean]);
        let similar = service.similar_fonts(0, None, Some(3)).unwrap();

        // The font itself first, then the nearby serif.
        assert_eq!(similar[0].name, "Garamond");
        assert_eq!(similar[1].name, "Bembo");
    }

    #[test]
    fn test_similar_fonts_by_label() {
        let service = test_service(&[Metric::Euclidean]);
        let similar = service
            .similar_fonts_by_label("Helvetica", None, Some(2))
            .unwrap();
        assert_eq!(similar[0].name, "Helvetica");
        assert_eq!(similar[1].name, "Univers");
    }

    #[test]
    fn test_unknown_font_index() {
        let service = test_service(&[Metric::Euclidean]);
        assert!(matches!(
            service.similar_fonts(42, None, None),
            Err(FontscapeError::FontNotFound { .. })
        ));
    }

    #[test]
    fn test_unconfigured_metric_rejected() {
        let service = test_service(&[Metric::Euclidean]);
        assert!(matches!(
            service.similar_fonts(0, Some(Metric::Hamming), None),
            Err(FontscapeError::UnsupportedMetric { .. })
        ));
    }

    #[test]
    fn test_interpolation_without_model() {
        let service = test_service(&[Metric::Euclidean]);
        assert!(matches!(
            service.interpolation(0, 1, 0.5),
            Err(FontscapeError::ModelUnavailable)
        ));
    }

    #[test]
    fn test_interpolation_with_stub_decoder() {
        struct FixedDecoder;
        impl GlyphDecoder for FixedDecoder {
            fn decode(&self, embedding: &Embedding) -> FontscapeResult<Vec<u8>> {
                Ok(embedding.as_slice().iter().map(|f| *f as u8).collect())
            }
        }

        let service = test_service(&[Metric::Euclidean])
            .with_decoder(Arc::new(FixedDecoder));
        let glyphs = service.interpolation(0, 2, 0.5).unwrap();
        assert!(!glyphs.interpolated_image.is_empty());
    }

    #[test]
    fn test_map_over_whole_catalog() {
        let service = test_service(&[Metric::Euclidean]);
        let nodes = service.map(None, Reduction::Pca, Some(100.0)).unwrap();
        assert_eq!(nodes.len(), 5);

        // Coordinates are scaled into the requested extent.
        for node in &nodes {
            assert!(node.x.abs() <= 100.0 + 1e-3);
            assert!(node.y.abs() <= 100.0 + 1e-3);
        }
        assert!(nodes.iter().any(|n| n.x.abs() > 1.0 || n.y.abs() > 1.0));
    }

    #[test]
    fn test_map_over_subset() {
        let service = test_service(&[Metric::Euclidean]);
        let nodes = service
            .map(Some(vec![0, 1, 2, 3]), Reduction::Tsne, None)
            .unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].id, 0);
        assert_eq!(nodes[3].label, "Univers");
    }

    #[test]
    fn test_map_rejects_empty_subset() {
        let service = test_service(&[Metric::Euclidean]);
        assert!(service.map(Some(vec![]), Reduction::Pca, None).is_err());
    }

    #[test]
    fn test_stats() {
        let service = test_service(&[Metric::Euclidean, Metric::Angular]);
        let stats = service.stats();
        assert_eq!(stats.font_count, 5);
        assert_eq!(stats.dimensions, 3);
        assert_eq!(stats.metrics, vec![Metric::Angular, Metric::Euclidean]);
        assert!(!stats.model_attached);
    }
}
