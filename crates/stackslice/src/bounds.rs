//! Axis-aligned bounding boxes of mesh vertex sets.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StackError};
use crate::Point3;

/// Axis-aligned bounding box.
///
/// For any box produced by [`compute_bounding_box`], `min <= max` on every
/// axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum X.
    pub min_x: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum Y.
    pub max_y: f64,
    /// Minimum Z.
    pub min_z: f64,
    /// Maximum Z.
    pub max_z: f64,
}

impl BoundingBox {
    /// Box spanning two corners, given as `min` and `max`.
    pub fn from_corners(min: [f64; 3], max: [f64; 3]) -> Self {
        Self {
            min_x: min[0],
            max_x: max[0],
            min_y: min[1],
            max_y: max[1],
            min_z: min[2],
            max_z: max[2],
        }
    }

    /// X coordinate of the box center.
    pub fn center_x(&self) -> f64 {
        self.min_x + (self.max_x - self.min_x) / 2.0
    }

    /// Y coordinate of the box center.
    pub fn center_y(&self) -> f64 {
        self.min_y + (self.max_y - self.min_y) / 2.0
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3<f64> {
        Vector3::new(
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        )
    }
}

/// Compute the bounding box of a point set in a single pass.
///
/// Fails with [`StackError::EmptyMesh`] when there are no points.
pub fn compute_bounding_box<'a, I>(points: I) -> Result<BoundingBox>
where
    I: IntoIterator<Item = &'a Point3>,
{
    let mut points = points.into_iter();
    let first = points.next().ok_or(StackError::EmptyMesh)?;

    let mut min = [first.x, first.y, first.z];
    let mut max = min;

    for p in points {
        min[0] = min[0].min(p.x);
        min[1] = min[1].min(p.y);
        min[2] = min[2].min(p.z);
        max[0] = max[0].max(p.x);
        max[1] = max[1].max(p.y);
        max[2] = max[2].max(p.z);
    }

    Ok(BoundingBox::from_corners(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube_corners(size: f64) -> Vec<Point3> {
        let mut pts = Vec::new();
        for &x in &[0.0, size] {
            for &y in &[0.0, size] {
                for &z in &[0.0, size] {
                    pts.push(Point3::new(x, y, z));
                }
            }
        }
        pts
    }

    #[test]
    fn test_cube_bounds() {
        let bb = compute_bounding_box(&cube_corners(10.0)).unwrap();
        assert_relative_eq!(bb.min_x, 0.0);
        assert_relative_eq!(bb.min_y, 0.0);
        assert_relative_eq!(bb.min_z, 0.0);
        assert_relative_eq!(bb.max_x, 10.0);
        assert_relative_eq!(bb.max_y, 10.0);
        assert_relative_eq!(bb.max_z, 10.0);
        assert_relative_eq!(bb.center_x(), 5.0);
        assert_relative_eq!(bb.center_y(), 5.0);
    }

    #[test]
    fn test_bounds_are_extremal() {
        let pts = vec![
            Point3::new(3.5, -2.0, 7.0),
            Point3::new(-1.25, 4.0, 7.0),
            Point3::new(3.5, -2.0, 7.0),
            Point3::new(0.0, 0.0, -9.5),
        ];
        let bb = compute_bounding_box(&pts).unwrap();

        assert_eq!(bb.min_x, -1.25);
        assert_eq!(bb.max_x, 3.5);
        assert_eq!(bb.min_y, -2.0);
        assert_eq!(bb.max_y, 4.0);
        assert_eq!(bb.min_z, -9.5);
        assert_eq!(bb.max_z, 7.0);

        for p in &pts {
            assert!(bb.min_x <= p.x && p.x <= bb.max_x);
            assert!(bb.min_y <= p.y && p.y <= bb.max_y);
            assert!(bb.min_z <= p.z && p.z <= bb.max_z);
        }
    }

    #[test]
    fn test_single_point() {
        let bb = compute_bounding_box(&[Point3::new(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(bb, BoundingBox::from_corners([1.0, 2.0, 3.0], [1.0, 2.0, 3.0]));
        assert_eq!(bb.size(), Vector3::zeros());
    }

    #[test]
    fn test_empty_mesh() {
        let pts: Vec<Point3> = Vec::new();
        assert!(matches!(
            compute_bounding_box(&pts),
            Err(StackError::EmptyMesh)
        ));
    }
}
