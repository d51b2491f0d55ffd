//! The font catalog: labels, integer indices, and their embeddings.
//!
//! The catalog is the read-only ground truth the rest of the service is
//! built from. Fonts are addressed two ways: by stable integer index (the
//! keys stored in the per-metric indexes) and by label (what users see).
//!
//! # Snapshot format
//!
//! Catalogs persist as a versioned snapshot, written atomically (temp file
//! then rename). The canonical store is bincode; files ending in `.json`
//! are read and written as JSON for hand-authoring and interop.

use crate::embedding::Embedding;
use crate::error::{FontscapeError, FontscapeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const SNAPSHOT_VERSION: u32 = 1;

/// One font entry: a label and its latent embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Human-readable font name
    pub label: String,
    /// Latent embedding produced by the (external) autoencoder
    pub embedding: Embedding,
}

/// Serializable snapshot of a catalog.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogSnapshot {
    /// Format version for future compatibility
    version: u32,
    fonts: Vec<FontEntry>,
}

/// The font catalog.
///
/// Holds every font's label and embedding, with constant-time lookup in
/// both directions. Font indices are dense: `0..len()`.
#[derive(Debug, Clone)]
pub struct FontCatalog {
    fonts: Vec<FontEntry>,
    label_to_index: HashMap<String, usize>,
    dimensions: usize,
}

impl FontCatalog {
    /// Build a catalog from ordered (label, embedding) pairs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if the pairs are empty, a label repeats, or
    /// embeddings disagree on dimensionality.
    pub fn from_pairs(pairs: Vec<(String, Embedding)>) -> FontscapeResult<Self> {
        if pairs.is_empty() {
            return Err(FontscapeError::InvalidData {
                reason: "catalog cannot be empty".to_string(),
            });
        }

        let dimensions = pairs[0].1.dimensions();
        let mut fonts = Vec::with_capacity(pairs.len());
        let mut label_to_index = HashMap::with_capacity(pairs.len());

        for (label, embedding) in pairs {
            if embedding.dimensions() != dimensions {
                return Err(FontscapeError::DimensionMismatch {
                    expected: dimensions,
                    actual: embedding.dimensions(),
                });
            }
            if label_to_index.insert(label.clone(), fonts.len()).is_some() {
                return Err(FontscapeError::InvalidData {
                    reason: format!("duplicate font label '{}'", label),
                });
            }
            fonts.push(FontEntry { label, embedding });
        }

        Ok(Self {
            fonts,
            label_to_index,
            dimensions,
        })
    }

    /// Build a catalog from an embedding array plus a label→index map.
    ///
    /// This mirrors how catalogs are authored: a dense array of vectors and
    /// a separate name dictionary. Labels whose index has no backing vector
    /// are dropped; vectors no label points at are dropped too. Surviving
    /// fonts are re-keyed densely in original index order.
    pub fn from_labeled_vectors(
        embeddings: Vec<Embedding>,
        label_to_index: &HashMap<String, usize>,
    ) -> FontscapeResult<Self> {
        let mut kept: Vec<(usize, String)> = label_to_index
            .iter()
            .filter(|&(_, &idx)| idx < embeddings.len())
            .map(|(label, &idx)| (idx, label.clone()))
            .collect();
        kept.sort_by_key(|(idx, _)| *idx);

        let pairs: Vec<(String, Embedding)> = kept
            .into_iter()
            .map(|(idx, label)| (label, embeddings[idx].clone()))
            .collect();

        Self::from_pairs(pairs)
    }

    /// Number of fonts in the catalog.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether the catalog has no fonts. Always false for a built catalog.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Shared embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Iterate over all entries in index order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &FontEntry)> {
        self.fonts.iter().enumerate()
    }

    /// Look up a font's index by label.
    pub fn index_of(&self, label: &str) -> FontscapeResult<usize> {
        self.label_to_index
            .get(label)
            .copied()
            .ok_or_else(|| FontscapeError::LabelNotFound {
                label: label.to_string(),
            })
    }

    /// Look up a font's label by index.
    pub fn label_of(&self, index: usize) -> FontscapeResult<&str> {
        self.fonts
            .get(index)
            .map(|f| f.label.as_str())
            .ok_or(FontscapeError::FontNotFound {
                index,
                count: self.fonts.len(),
            })
    }

    /// Get a font's embedding by index.
    pub fn embedding(&self, index: usize) -> FontscapeResult<&Embedding> {
        self.fonts
            .get(index)
            .map(|f| &f.embedding)
            .ok_or(FontscapeError::FontNotFound {
                index,
                count: self.fonts.len(),
            })
    }

    /// Conventional path of the rendered "Aa" specimen for a font.
    ///
    /// The visualization widget loads node images from here; the files
    /// themselves are produced by the rendering pipeline, not this crate.
    pub fn image_path(&self, data_dir: &Path, index: usize) -> FontscapeResult<PathBuf> {
        let label = self.label_of(index)?;
        Ok(data_dir.join("glyphs").join(format!("{}_Aa.png", label)))
    }

    /// Save the catalog to disk, atomically.
    ///
    /// Files ending in `.json` are written as JSON, anything else as
    /// bincode. The snapshot is written to a temp path and renamed into
    /// place so readers never observe a half-written file.
    pub fn save(&self, path: &Path) -> FontscapeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    FontscapeError::StorageError(format!("failed to create directory: {}", e))
                })?;
            }
        }

        let snapshot = CatalogSnapshot {
            version: SNAPSHOT_VERSION,
            fonts: self.fonts.clone(),
        };

        let bytes = if is_json_path(path) {
            serde_json::to_vec_pretty(&snapshot)?
        } else {
            bincode::serialize(&snapshot).map_err(|e| {
                FontscapeError::StorageError(format!("failed to serialize catalog: {}", e))
            })?
        };

        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, &bytes).map_err(|e| {
            FontscapeError::StorageError(format!("failed to write temporary file: {}", e))
        })?;
        std::fs::rename(&temp_path, path)
            .map_err(|e| FontscapeError::StorageError(format!("failed to rename file: {}", e)))?;

        Ok(())
    }

    /// Load a catalog snapshot from disk.
    pub fn load(path: &Path) -> FontscapeResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            FontscapeError::StorageError(format!("failed to read {}: {}", path.display(), e))
        })?;

        let snapshot: CatalogSnapshot = if is_json_path(path) {
            serde_json::from_slice(&bytes)?
        } else {
            bincode::deserialize(&bytes).map_err(|e| {
                FontscapeError::StorageError(format!("failed to deserialize catalog: {}", e))
            })?
        };

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(FontscapeError::StorageError(format!(
                "unsupported catalog version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let pairs = snapshot
            .fonts
            .into_iter()
            .map(|f| (f.label, f.embedding))
            .collect();
        Self::from_pairs(pairs)
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
