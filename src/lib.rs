//! # fontscape — Latent-Space Font Exploration
//!
//! fontscape serves a catalog of fonts embedded in the latent space of a
//! variational autoencoder, and lets clients explore that space three ways:
//! - **Similarity** - exact nearest-neighbor queries under several distance
//!   metrics at once
//! - **Interpolation** - glyph images along the line between two fonts,
//!   rendered by an external decoder
//! - **Mapping** - the whole catalog projected to 2D (PCA or t-SNE) and
//!   shaped into pinned graph nodes for a vis.js-style widget
//!
//! ## Quick Start
//!
//! ```ignore
//! use fontscape::{FontCatalog, FontScape, ServiceConfig};
//!
//! let catalog = FontCatalog::load("fonts.bin")?;
//! let service = FontScape::build(catalog, ServiceConfig::default())?;
//!
//! let records = service.similar_fonts(3, None, Some(5))?;
//! for record in records {
//!     println!("{}: {}", record.value, record.name);
//! }
//! ```
//!
//! ## Architecture
//!
//! The crate is built in three layers:
//!
//! 1. **FontScape API** (`service`) - User-facing interface
//! 2. **Multi-metric search** (`db`) - One exact index per configured metric
//! 3. **Catalog** (`catalog`) - Labeled embeddings with persistence
//!
//! Around that core sit the projection pipeline (`reduce`, `graph`) and the
//! model boundary (`model`). The HTTP surface (`http`, behind the `http`
//! feature) exposes it all as a JSON API.
//!
//! ## Thread Safety
//!
//! A built [`FontScape`] is immutable and cheap to clone; clones share the
//! catalog and indexes through `Arc`.

// Core modules
pub mod catalog;
pub mod db;
pub mod embedding;
pub mod error;
pub mod metric;

// Projection and presentation
pub mod graph;
pub mod reduce;

// Model boundary
pub mod model;

// Service layer
pub mod service;

// HTTP API (requires http feature)
#[cfg(feature = "http")]
pub mod http;

// Public API exports
pub use catalog::{FontCatalog, FontEntry};
pub use db::{FlatIndex, MultiMetricDatabase, NeighborIndex};
pub use embedding::Embedding;
pub use error::{FontscapeError, FontscapeResult};
pub use graph::{FixedAxes, GraphNode};
pub use metric::Metric;
pub use model::{GlyphDecoder, InterpolatedGlyphs};
pub use reduce::{Pca, Reduction, Tsne};
pub use service::{FontRecord, FontScape, ServiceConfig, ServiceStats};

/// Prelude module for convenient imports.
///
/// Import everything you need with:
/// ```ignore
/// use fontscape::prelude::*;
/// ```
pub mod prelude {
    pub use crate::catalog::{FontCatalog, FontEntry};
    pub use crate::db::{FlatIndex, MultiMetricDatabase, NeighborIndex};
    pub use crate::embedding::Embedding;
    pub use crate::error::{FontscapeError, FontscapeResult};
    pub use crate::graph::{FixedAxes, GraphNode};
    pub use crate::metric::Metric;
    pub use crate::model::{GlyphDecoder, InterpolatedGlyphs};
    pub use crate::reduce::{Pca, Reduction, Tsne};
    pub use crate::service::{FontRecord, FontScape, ServiceConfig, ServiceStats};
}
