//! Mesh vertex loading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, StackError};
use crate::Point3;

/// Source of mesh vertex positions.
///
/// Only vertex positions are needed for placement; faces and normals are
/// ignored.
pub trait MeshReader {
    /// Read all vertex positions of the mesh at `path`.
    fn read_points(&self, path: &Path) -> Result<Vec<Point3>>;
}

/// Reads binary and ASCII STL files.
#[derive(Debug, Clone, Copy, Default)]
pub struct StlReader;

impl MeshReader for StlReader {
    fn read_points(&self, path: &Path) -> Result<Vec<Point3>> {
        let file = File::open(path).map_err(|e| StackError::mesh_read(path, e))?;
        let mut reader = BufReader::new(file);

        let stl = stl_io::read_stl(&mut reader).map_err(|e| StackError::mesh_read(path, e))?;

        debug!(
            path = %path.display(),
            vertices = stl.vertices.len(),
            triangles = stl.faces.len(),
            "read STL"
        );

        Ok(stl
            .vertices
            .iter()
            .map(|v| Point3::new(v.0[0] as f64, v.0[1] as f64, v.0[2] as f64))
            .collect())
    }
}
