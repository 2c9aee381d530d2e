//! Regular grid regions that fields are sampled on.

use crate::geometry::{
    Dim3::{self, X, Y, Z},
    Idx3, In3D, Point3, Vec3,
};

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Floating-point precision to use for grids.
#[allow(non_camel_case_types)]
pub type fgr = f64;

/// Immutable description of a regular 3D grid region.
///
/// The region spans `lower_bounds..=upper_bounds` along each dimension and is
/// divided into `shape` cells of equal extent. Field values are located at the
/// cell centers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct GridRegion3 {
    shape: In3D<usize>,
    lower_bounds: Vec3<fgr>,
    upper_bounds: Vec3<fgr>,
    extents: Vec3<fgr>,
    cell_extents: Vec3<fgr>,
}

impl GridRegion3 {
    /// Creates a new grid region given the shape, the lower corner and the
    /// extent of a grid cell along each dimension.
    ///
    /// # Panics
    ///
    /// If the shape is zero or a cell extent is not strictly positive and finite
    /// along any dimension.
    pub fn new(shape: In3D<usize>, origin: Point3<fgr>, cell_extents: Vec3<fgr>) -> Self {
        for dim in Dim3::slice() {
            assert_ne!(
                shape[dim], 0,
                "Cannot create grid region with size zero along any dimension."
            );
            assert!(
                cell_extents[dim] > 0.0 && cell_extents[dim].is_finite(),
                "Grid cell extents must be finite and larger than zero."
            );
            assert!(
                origin[dim].is_finite(),
                "Grid region origin must have finite coordinates."
            );
        }
        let lower_bounds = origin.to_vec3();
        let extents =
            Vec3::with_each_component(|dim| cell_extents[dim] * (shape[dim] as fgr));
        let upper_bounds = &lower_bounds + &extents;
        Self {
            shape,
            lower_bounds,
            upper_bounds,
            extents,
            cell_extents,
        }
    }

    /// Creates a new grid region given the shape and bounds.
    ///
    /// # Panics
    ///
    /// If the shape is zero or the upper bound does not exceed the lower bound
    /// along any dimension.
    pub fn from_bounds(
        shape: In3D<usize>,
        lower_bounds: Vec3<fgr>,
        upper_bounds: Vec3<fgr>,
    ) -> Self {
        for dim in Dim3::slice() {
            assert_ne!(
                shape[dim], 0,
                "Cannot create grid region with size zero along any dimension."
            );
            assert!(
                upper_bounds[dim] > lower_bounds[dim],
                "Upper grid bounds must be larger than lower grid bounds."
            );
        }
        let cell_extents = Vec3::with_each_component(|dim| {
            (upper_bounds[dim] - lower_bounds[dim]) / (shape[dim] as fgr)
        });
        Self::new(shape, lower_bounds.to_point3(), cell_extents)
    }

    /// Returns the number of grid cells along each dimension.
    pub fn shape(&self) -> &In3D<usize> {
        &self.shape
    }

    /// Returns the total number of grid cells.
    pub fn number_of_cells(&self) -> usize {
        self.shape[X] * self.shape[Y] * self.shape[Z]
    }

    /// Returns the lower corner of the region.
    pub fn origin(&self) -> Point3<fgr> {
        self.lower_bounds.to_point3()
    }

    /// Returns a reference to the lower bounds of the region.
    pub fn lower_bounds(&self) -> &Vec3<fgr> {
        &self.lower_bounds
    }

    /// Returns a reference to the upper bounds of the region.
    pub fn upper_bounds(&self) -> &Vec3<fgr> {
        &self.upper_bounds
    }

    /// Returns a reference to the extents of the region.
    pub fn extents(&self) -> &Vec3<fgr> {
        &self.extents
    }

    /// Returns a reference to the extent of a grid cell in each dimension.
    pub fn cell_extents(&self) -> &Vec3<fgr> {
        &self.cell_extents
    }

    /// Returns the smallest extent of a grid cell across all dimensions.
    pub fn min_cell_extent(&self) -> fgr {
        fgr::min(
            self.cell_extents[X],
            fgr::min(self.cell_extents[Y], self.cell_extents[Z]),
        )
    }

    /// Whether the given point lies within the bounds of the region
    /// (inclusive).
    pub fn contains(&self, point: &Point3<fgr>) -> bool {
        Dim3::slice().iter().all(|&dim| {
            point[dim] >= self.lower_bounds[dim] && point[dim] <= self.upper_bounds[dim]
        })
    }

    /// Whether the given point lies strictly inside the region, away from
    /// every face.
    pub fn contains_strictly(&self, point: &Point3<fgr>) -> bool {
        Dim3::slice().iter().all(|&dim| {
            point[dim] > self.lower_bounds[dim] && point[dim] < self.upper_bounds[dim]
        })
    }

    /// Finds the index of the grid cell containing the given point,
    /// or returns `None` if the point is outside the region.
    ///
    /// Points on an upper bound belong to the last cell.
    pub fn find_grid_cell(&self, point: &Point3<fgr>) -> Option<Idx3<usize>> {
        if self.contains(point) {
            Some(Idx3::with_each_component(|dim| {
                let offset = (point[dim] - self.lower_bounds[dim]) / self.cell_extents[dim];
                usize::min(offset.floor() as usize, self.shape[dim] - 1)
            }))
        } else {
            None
        }
    }

    /// Returns the center of the grid cell with the given indices.
    pub fn cell_center(&self, indices: &Idx3<usize>) -> Point3<fgr> {
        Point3::with_each_component(|dim| {
            self.lower_bounds[dim] + ((indices[dim] as fgr) + 0.5) * self.cell_extents[dim]
        })
    }

    /// Computes the position of the given coordinate along the given dimension
    /// measured in cells relative to the center of the first cell.
    pub fn cell_center_offset(&self, dim: Dim3, coord: fgr) -> fgr {
        (coord - self.lower_bounds[dim]) / self.cell_extents[dim] - 0.5
    }
}
