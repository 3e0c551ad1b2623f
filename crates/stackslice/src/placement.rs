//! Bed placement of a stack of objects.
//!
//! Placement is two-phase. The first object in processing order is the
//! anchor: its bounding-box center is moved onto the bed center and its
//! lowest point onto the base height, which fixes a [`PlacementDelta`].
//! Every object, the anchor included, is then shifted by that same delta.
//! Objects are expected to be pre-aligned to each other in source
//! coordinates, so only the stack as a whole is moved into bed space.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bounds::{compute_bounding_box, BoundingBox};
use crate::error::{Result, StackError};
use crate::mesh::MeshReader;

/// Point on the print bed that the anchor object is centered on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BedCenter {
    /// X coordinate (mm).
    pub center_x: f64,
    /// Y coordinate (mm).
    pub center_y: f64,
}

impl Default for BedCenter {
    fn default() -> Self {
        Self {
            center_x: 185.0,
            center_y: 208.0,
        }
    }
}

/// Translation shared by every object of a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementDelta {
    /// Shift along X.
    pub dx: f64,
    /// Shift along Y.
    pub dy: f64,
    /// Shift along Z.
    pub dz: f64,
}

impl PlacementDelta {
    /// Delta that centers `anchor` on the bed and drops it to `base_height`.
    pub fn from_anchor(anchor: &BoundingBox, bed: BedCenter, base_height: f64) -> Self {
        Self {
            dx: bed.center_x - anchor.center_x(),
            dy: bed.center_y - anchor.center_y(),
            dz: base_height - anchor.min_z,
        }
    }
}

/// Bed-space position of one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Bounding-box center X on the bed.
    pub x_center: f64,
    /// Bounding-box center Y on the bed.
    pub y_center: f64,
    /// Height of the object's lowest point.
    pub z_offset: f64,
}

/// Apply `delta` to a bounding box, rounding to two decimals.
pub fn place(bb: &BoundingBox, delta: &PlacementDelta) -> Placement {
    Placement {
        x_center: round2(bb.center_x() + delta.dx),
        y_center: round2(bb.center_y() + delta.dy),
        z_offset: round2(bb.min_z + delta.dz),
    }
}

/// Round to two decimals, ties to even. Negative zero becomes zero.
///
/// Rounding goes through the decimal formatter, which rounds the exact
/// binary value: `2.675` is stored just below the tie and gives `2.67`.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse::<f64>().unwrap_or(value) + 0.0
}

/// Placement and slicer overrides for one mesh file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Mesh file name.
    pub source_name: String,
    /// Bounding-box center X on the bed.
    pub x_center: f64,
    /// Bounding-box center Y on the bed.
    pub y_center: f64,
    /// Height of the object's lowest point.
    pub z_offset: f64,
    /// Extrusion multiplier, substituted verbatim into the slicer config.
    pub extrusion_multiplier: String,
}

impl ObjectMetadata {
    /// `--center` argument for the slicer, e.g. `185.0,208.0`.
    pub fn center_arg(&self) -> String {
        format!(
            "{},{}",
            format_coord(self.x_center),
            format_coord(self.y_center)
        )
    }

    /// Value written to the `z_offset` config key.
    pub fn z_offset_value(&self) -> String {
        format_coord(self.z_offset)
    }
}

/// Decimal text for a coordinate. Whole numbers keep one decimal (`20.0`).
pub fn format_coord(value: f64) -> String {
    let text = format!("{}", value);
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Build metadata for `files`, in order.
///
/// `files` are paths of mesh files; the lookup key into `multipliers` is the
/// file name. The first file is the placement anchor. Any missing multiplier
/// or unreadable mesh aborts the whole batch.
pub fn build_metadata<P, R>(
    files: &[P],
    multipliers: &HashMap<String, String>,
    bed: BedCenter,
    base_height: f64,
    reader: &R,
) -> Result<Vec<ObjectMetadata>>
where
    P: AsRef<Path>,
    R: MeshReader + ?Sized,
{
    // Phase 1: bounding boxes and multipliers, in order.
    let mut measured = Vec::with_capacity(files.len());
    for file in files {
        let path = file.as_ref();
        let name = file_name(path);

        let multiplier = multipliers
            .get(&name)
            .ok_or_else(|| StackError::MissingConfiguration(name.clone()))?;

        let points = reader.read_points(path)?;
        let bb = compute_bounding_box(&points)
            .map_err(|e| StackError::mesh_read(path, e))?;
        debug!(file = %name, ?bb, size = ?bb.size(), "bounding box");

        measured.push((name, bb, multiplier.clone()));
    }

    let Some((anchor_name, anchor, _)) = measured.first() else {
        return Ok(Vec::new());
    };
    let delta = PlacementDelta::from_anchor(anchor, bed, base_height);
    debug!(anchor = %anchor_name, dx = delta.dx, dy = delta.dy, dz = delta.dz, "placement delta");

    // Phase 2: every object, anchor included, shifted by the same delta.
    Ok(measured
        .into_iter()
        .map(|(name, bb, multiplier)| {
            let placed = place(&bb, &delta);
            ObjectMetadata {
                source_name: name,
                x_center: placed.x_center,
                y_center: placed.y_center,
                z_offset: placed.z_offset,
                extrusion_multiplier: multiplier,
            }
        })
        .collect())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
