#![warn(missing_docs)]

//! Stacked bed placement and per-object slicer configuration for batches of
//! STL files.
//!
//! A batch is a directory of numbered STL files (`1.stl`, `2.stl`, ...).
//! The first file anchors the stack: its bounding box is centered on the bed
//! and dropped to the base height, and every other file is moved by the same
//! offset. Each object is then sliced by an external PrusaSlicer-compatible
//! CLI with a copy of a config template whose `z_offset` and
//! `extrusion_multiplier` keys are patched for that object.
//!
//! # Example
//!
//! ```no_run
//! use stackslice::{run_batch, JobSettings, PrusaSlicer, StlReader};
//!
//! let settings = JobSettings::load("job.toml")?;
//! let slicer = PrusaSlicer::from(&settings.slicer);
//! let report = run_batch(&settings, &StlReader, &slicer)?;
//!
//! for object in &report.objects {
//!     println!("{} at {}", object.source_name, object.center_arg());
//! }
//! # Ok::<(), stackslice::StackError>(())
//! ```

pub mod batch;
pub mod bounds;
pub mod error;
pub mod ini;
pub mod input;
pub mod mesh;
pub mod placement;
pub mod settings;
pub mod slicer;

pub use batch::{plan_batch, run_batch, BatchReport};
pub use bounds::{compute_bounding_box, BoundingBox};
pub use error::{Result, StackError};
pub use ini::{patch_config, patch_str, Patched, EXTRUSION_MULTIPLIER_KEY, Z_OFFSET_KEY};
pub use input::{discover_meshes, sort_by_numeric_prefix, MeshFile};
pub use mesh::{MeshReader, StlReader};
pub use placement::{build_metadata, place, BedCenter, ObjectMetadata, Placement, PlacementDelta};
pub use settings::{JobSettings, Multiplier, ObjectSettings, SlicerSettings};
pub use slicer::{PrusaSlicer, SliceJob, Slicer, SlicerOutput};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;
