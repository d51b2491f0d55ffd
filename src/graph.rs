//! Shaping projected coordinates into graph-widget records.
//!
//! The exploration frontend renders fonts as a fixed-position node graph
//! (vis.js). Each node carries the font's index, label, specimen image
//! path, and pinned 2D coordinates. This module turns a reduction's output
//! into those records and rescales coordinates to the widget's canvas.

use crate::catalog::FontCatalog;
use crate::error::{FontscapeError, FontscapeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which axes of a node are pinned. The map pins both: layout comes from
/// the reduction, not from the widget's physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAxes {
    /// Pin the x coordinate
    pub x: bool,
    /// Pin the y coordinate
    pub y: bool,
}

/// One node record for the graph widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Font index (doubles as the widget's node id)
    pub id: usize,
    /// Font label shown under the node
    pub label: String,
    /// Node shape; always "circularImage" so the specimen renders inside
    pub shape: String,
    /// Path to the font's "Aa" specimen image
    pub image: String,
    /// Projected x coordinate
    pub x: f32,
    /// Projected y coordinate
    pub y: f32,
    /// Both axes pinned
    pub fixed: FixedAxes,
}

/// Uniformly rescale coordinates so the largest absolute value maps to
/// `extent`, preserving aspect ratio. A degenerate projection (all points
/// at the origin) is left untouched.
pub fn scale_coordinates(coords: &mut [[f32; 2]], extent: f32) {
    let max_abs = coords
        .iter()
        .flat_map(|c| c.iter())
        .map(|v| v.abs())
        .fold(0.0f32, f32::max);
    if max_abs <= f32::EPSILON {
        return;
    }
    let factor = extent / max_abs;
    for c in coords.iter_mut() {
        c[0] *= factor;
        c[1] *= factor;
    }
}

/// Zip font indices and projected coordinates into graph nodes.
///
/// # Errors
///
/// Returns `InvalidData` if `indices` and `coords` disagree in length, or
/// `FontNotFound` for an index outside the catalog.
pub fn nodes_from_projection(
    indices: &[usize],
    coords: &[[f32; 2]],
    catalog: &FontCatalog,
    data_dir: &Path,
) -> FontscapeResult<Vec<GraphNode>> {
    if indices.len() != coords.len() {
        return Err(FontscapeError::InvalidData {
            reason: format!(
                "{} font indices but {} projected points",
                indices.len(),
                coords.len()
            ),
        });
    }

    indices
        .iter()
        .zip(coords)
        .map(|(&index, &[x, y])| {
            let label = catalog.label_of(index)?.to_string();
            let image = catalog
                .image_path(data_dir, index)?
                .to_string_lossy()
                .into_owned();
            Ok(GraphNode {
                id: index,
                label,
                shape: "circularImage".to_string(),
                image,
                x,
                y,
                fixed: FixedAxes { x: true, y: true },
            })
        })
        .collect()
}
