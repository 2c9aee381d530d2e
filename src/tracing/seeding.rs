//! Generation of seed points for flow line tracing.

use super::ftr;
use crate::{
    geometry::{
        Dim3::{X, Y, Z},
        Idx3, In3D, Point3,
    },
    grid::GridRegion3,
};
use rayon::prelude::*;

/// Defines the properties of a 3D seed point generator.
pub trait Seeder3:
    IntoIterator<Item = Point3<ftr>> + IntoParallelIterator<Item = Point3<ftr>>
{
    /// Returns the number of seed points that will be produced by the seeder.
    fn number_of_points(&self) -> usize;

    /// Filters the seed points using the given predicate.
    fn retain_points<P>(&mut self, predicate: P)
    where
        P: FnMut(&Point3<ftr>) -> bool;

    /// Looks up the grid cell containing each seed point, skipping seed points
    /// outside the given region.
    fn to_cell_indices(&self, region: &GridRegion3) -> Vec<Idx3<usize>>;
}

// Let a vector of points work as a seeder.
impl Seeder3 for Vec<Point3<ftr>> {
    fn number_of_points(&self) -> usize {
        self.len()
    }

    fn retain_points<P>(&mut self, predicate: P)
    where
        P: FnMut(&Point3<ftr>) -> bool,
    {
        self.retain(predicate);
    }

    fn to_cell_indices(&self, region: &GridRegion3) -> Vec<Idx3<usize>> {
        self.iter()
            .filter_map(|point| region.find_grid_cell(point))
            .collect()
    }
}

/// Generator for seed points at the centers of regularly spaced grid cells.
#[derive(Clone, Debug)]
pub struct RegularSeeder3 {
    seed_points: Vec<Point3<ftr>>,
}

impl RegularSeeder3 {
    /// Creates a new seeder producing the center of every `skip`-th grid cell
    /// along each dimension, starting with the first cell.
    ///
    /// # Panics
    ///
    /// If any component of `skip` is zero.
    pub fn from_cell_centers(region: &GridRegion3, skip: &In3D<usize>) -> Self {
        assert!(
            skip.iter().all(|&n| n > 0),
            "Seed cell spacing must be at least one."
        );
        let shape = region.shape();
        let mut seed_points = Vec::with_capacity(
            ((shape[X] + skip[X] - 1) / skip[X])
                * ((shape[Y] + skip[Y] - 1) / skip[Y])
                * ((shape[Z] + skip[Z] - 1) / skip[Z]),
        );
        // Seeds are ordered with x varying slowest
        for i in (0..shape[X]).step_by(skip[X]) {
            for j in (0..shape[Y]).step_by(skip[Y]) {
                for k in (0..shape[Z]).step_by(skip[Z]) {
                    seed_points.push(region.cell_center(&Idx3::new(i, j, k)));
                }
            }
        }
        Self { seed_points }
    }

    /// Returns a reference to the seed points.
    pub fn seed_points(&self) -> &[Point3<ftr>] {
        &self.seed_points
    }
}

impl IntoIterator for RegularSeeder3 {
    type Item = Point3<ftr>;
    type IntoIter = ::std::vec::IntoIter<Point3<ftr>>;

    fn into_iter(self) -> Self::IntoIter {
        self.seed_points.into_iter()
    }
}

impl IntoParallelIterator for RegularSeeder3 {
    type Item = Point3<ftr>;
    type Iter = rayon::vec::IntoIter<Point3<ftr>>;

    fn into_par_iter(self) -> Self::Iter {
        self.seed_points.into_par_iter()
    }
}

impl Seeder3 for RegularSeeder3 {
    fn number_of_points(&self) -> usize {
        self.seed_points.len()
    }

    fn retain_points<P>(&mut self, predicate: P)
    where
        P: FnMut(&Point3<ftr>) -> bool,
    {
        self.seed_points.retain(predicate);
    }

    fn to_cell_indices(&self, region: &GridRegion3) -> Vec<Idx3<usize>> {
        self.seed_points.to_cell_indices(region)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::geometry::Vec3;

    fn region() -> GridRegion3 {
        GridRegion3::new(
            In3D::new(5, 4, 3),
            Point3::new(0.0, 0.0, -1.0),
            Vec3::new(2.0, 1.0, 1.0),
        )
    }

    #[test]
    fn every_cell_is_seeded_without_skipping() {
        let seeder = RegularSeeder3::from_cell_centers(&region(), &In3D::same(1));
        assert_eq!(seeder.number_of_points(), 60);
        assert_eq!(seeder.seed_points()[0], Point3::new(1.0, 0.5, -0.5));
        assert_eq!(seeder.seed_points()[59], Point3::new(9.0, 3.5, 1.5));
    }

    #[test]
    fn skip_is_honoured() {
        let seeder = RegularSeeder3::from_cell_centers(&region(), &In3D::new(2, 3, 1));
        // Cells 0, 2, 4 along x, 0, 3 along y and all three along z
        assert_eq!(seeder.number_of_points(), 18);
        assert_eq!(seeder.seed_points()[3], Point3::new(1.0, 3.5, -0.5));
        let indices = seeder.to_cell_indices(&region());
        assert!(indices.iter().all(|idx| idx[X] % 2 == 0 && idx[Y] % 3 == 0));
    }

    #[test]
    fn seed_points_can_be_filtered() {
        let mut seeder = RegularSeeder3::from_cell_centers(&region(), &In3D::same(1));
        seeder.retain_points(|point| point[Z] > 0.0);
        assert_eq!(seeder.number_of_points(), 40);
    }

    #[test]
    fn points_outside_region_have_no_cell() {
        let seeds = vec![Point3::new(1.0, 1.0, 0.0), Point3::new(-1.0, 1.0, 0.0)];
        assert_eq!(seeds.to_cell_indices(&region()), vec![Idx3::new(0, 1, 1)]);
    }

    #[test]
    #[should_panic]
    fn zero_skip_is_rejected() {
        RegularSeeder3::from_cell_centers(&region(), &In3D::new(1, 0, 1));
    }
}
