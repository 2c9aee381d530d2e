//! Trilinear interpolation between the centers of the eight surrounding grid cells.

use super::{FieldQuery3, Interpolator3};
use crate::{
    field::{ScalarField3, VectorFieldStore3},
    geometry::{
        Dim3::{self, X, Y, Z},
        Idx3, Point3, Vec3,
    },
    grid::{fgr, GridRegion3},
    num::{self, BFloat},
};

/// Interpolator using trilinear interpolation.
///
/// Within half a grid cell of a region face the stencil collapses onto the
/// edge cells, so values are held constant up to the face. Nothing is ever
/// interpolated across cells without data.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrilinearInterpolator3;

/// Indices of the two grid cells bracketing a coordinate along each dimension,
/// together with the interpolation weight of the upper cell.
#[derive(Clone, Debug, PartialEq)]
struct TrilinearStencil3 {
    lower: Idx3<usize>,
    upper: Idx3<usize>,
    weights: Vec3<fgr>,
}

impl TrilinearStencil3 {
    fn new(region: &GridRegion3, point: &Point3<fgr>) -> Option<Self> {
        if !region.contains(point) {
            return None;
        }
        let (x_lower, x_upper, x_weight) = Self::bracket(region, X, point[X]);
        let (y_lower, y_upper, y_weight) = Self::bracket(region, Y, point[Y]);
        let (z_lower, z_upper, z_weight) = Self::bracket(region, Z, point[Z]);
        Some(Self {
            lower: Idx3::new(x_lower, y_lower, z_lower),
            upper: Idx3::new(x_upper, y_upper, z_upper),
            weights: Vec3::new(x_weight, y_weight, z_weight),
        })
    }

    fn bracket(region: &GridRegion3, dim: Dim3, coord: fgr) -> (usize, usize, fgr) {
        let last = region.shape()[dim] - 1;
        let offset = region.cell_center_offset(dim, coord);
        if offset <= 0.0 {
            (0, 0, 0.0)
        } else if offset >= last as fgr {
            (last, last, 0.0)
        } else {
            let lower = offset.floor();
            (lower as usize, lower as usize + 1, offset - lower)
        }
    }

    fn corner(&self, upper_x: bool, upper_y: bool, upper_z: bool) -> Idx3<usize> {
        Idx3::new(
            if upper_x { self.upper[X] } else { self.lower[X] },
            if upper_y { self.upper[Y] } else { self.lower[Y] },
            if upper_z { self.upper[Z] } else { self.lower[Z] },
        )
    }

    /// Returns the indices of the eight cells at the corners of the stencil.
    fn corners(&self) -> impl Iterator<Item = Idx3<usize>> + '_ {
        (0..8).map(move |n| self.corner(n & 1 != 0, n & 2 != 0, n & 4 != 0))
    }

    /// Interpolates the values returned by `value_at`, or returns `None` if
    /// any of the eight corner values is not a valid number.
    fn interpolate<F, V>(&self, value_at: V) -> Option<fgr>
    where
        F: BFloat,
        V: Fn(&Idx3<usize>) -> F,
    {
        let mut corner_values = [0.0; 8];
        for (corner_value, corner) in corner_values.iter_mut().zip(self.corners()) {
            let value: fgr = num::cast_float(value_at(&corner));
            if !value.is_finite() {
                return None;
            }
            *corner_value = value;
        }
        let (wx, wy, wz) = (self.weights[X], self.weights[Y], self.weights[Z]);

        let c00 = corner_values[0] * (1.0 - wx) + corner_values[1] * wx;
        let c10 = corner_values[2] * (1.0 - wx) + corner_values[3] * wx;
        let c01 = corner_values[4] * (1.0 - wx) + corner_values[5] * wx;
        let c11 = corner_values[6] * (1.0 - wx) + corner_values[7] * wx;

        let c0 = c00 * (1.0 - wy) + c10 * wy;
        let c1 = c01 * (1.0 - wy) + c11 * wy;

        Some(c0 * (1.0 - wz) + c1 * wz)
    }
}

impl Interpolator3 for TrilinearInterpolator3 {
    fn interp_scalar_field<F>(
        &self,
        field: &ScalarField3<F>,
        interp_point: &Point3<fgr>,
    ) -> FieldQuery3<fgr>
    where
        F: BFloat,
    {
        match TrilinearStencil3::new(field.region(), interp_point) {
            Some(stencil) => match stencil.interpolate(|indices| field.value(indices)) {
                Some(value) => FieldQuery3::Inside(value),
                None => FieldQuery3::NoData,
            },
            None => FieldQuery3::Outside,
        }
    }

    fn interp_vector_field<F, S>(
        &self,
        field: &S,
        interp_point: &Point3<fgr>,
    ) -> FieldQuery3<Vec3<fgr>>
    where
        F: BFloat,
        S: VectorFieldStore3<F>,
    {
        let stencil = match TrilinearStencil3::new(field.region(), interp_point) {
            Some(stencil) => stencil,
            None => return FieldQuery3::Outside,
        };
        if stencil.corners().any(|corner| field.is_no_data(&corner)) {
            return FieldQuery3::NoData;
        }
        let mut vector = Vec3::zero();
        for dim in Dim3::slice() {
            match stencil.interpolate(|indices| field.component_value(dim, indices)) {
                Some(value) => vector[dim] = value,
                None => return FieldQuery3::NoData,
            }
        }
        FieldQuery3::Inside(vector)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{field::VectorField3, geometry::In3D};
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    fn region() -> Arc<GridRegion3> {
        Arc::new(GridRegion3::new(
            In3D::new(6, 5, 4),
            Point3::new(-1.0, 0.0, 2.0),
            Vec3::new(0.5, 1.0, 2.0),
        ))
    }

    fn linear_vector(point: &Point3<fgr>) -> Vec3<fgr> {
        Vec3::new(
            2.0 * point[X] - point[Y] + 0.5 * point[Z],
            -point[X] + 3.0,
            point[Y] * 0.25 - point[Z],
        )
    }

    #[test]
    fn trilinear_interpolation_reproduces_linear_fields() {
        let field = VectorField3::from_fn("u".to_string(), region(), linear_vector);
        let interpolator = TrilinearInterpolator3;
        for point in [
            Point3::new(-0.5, 0.5, 3.0),
            Point3::new(0.13, 2.71, 5.9),
            Point3::new(1.24, 4.49, 8.99),
        ] {
            let interpolated = interpolator
                .interp_vector_field(&field, &point)
                .inside()
                .unwrap();
            let exact = linear_vector(&point);
            for dim in Dim3::slice() {
                assert_abs_diff_eq!(interpolated[dim], exact[dim], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn values_are_held_constant_near_faces() {
        let field = VectorField3::from_fn("u".to_string(), region(), linear_vector);
        let interpolator = TrilinearInterpolator3;
        let on_face = interpolator
            .interp_scalar_field(field.component(Y), &Point3::new(-1.0, 2.5, 5.0))
            .inside()
            .unwrap();
        let at_first_center = interpolator
            .interp_scalar_field(field.component(Y), &Point3::new(-0.75, 2.5, 5.0))
            .inside()
            .unwrap();
        assert_abs_diff_eq!(on_face, at_first_center, epsilon = 1e-12);
    }

    #[test]
    fn points_outside_region_are_reported() {
        let field = VectorField3::from_fn("u".to_string(), region(), linear_vector);
        let interpolator = TrilinearInterpolator3;
        assert_eq!(
            interpolator.interp_vector_field(&field, &Point3::new(-1.01, 1.0, 3.0)),
            FieldQuery3::Outside
        );
        assert_eq!(
            interpolator.interp_vector_field(&field, &Point3::new(0.0, f64::NAN, 3.0)),
            FieldQuery3::Outside
        );
    }

    #[test]
    fn no_data_in_any_surrounding_cell_is_reported() {
        let mut field = VectorField3::from_fn("u".to_string(), region(), linear_vector);
        field.set_no_data(&Idx3::new(2, 2, 1));
        let interpolator = TrilinearInterpolator3;

        // Cell centers of (2, 2, 1) and (3, 3, 2) bracket this point
        assert_eq!(
            interpolator.interp_vector_field(&field, &Point3::new(0.4, 2.9, 5.5)),
            FieldQuery3::NoData
        );
        // Only valid cells are needed here
        assert!(interpolator
            .interp_vector_field(&field, &Point3::new(1.1, 0.7, 2.5))
            .is_inside());
    }

    /// Store with finite sentinel values in the cells it reports as holding no data.
    struct SentinelStore {
        field: VectorField3<f64>,
    }

    impl SentinelStore {
        const SENTINEL: f64 = -9999.0;

        fn is_sentinel_cell(indices: &Idx3<usize>) -> bool {
            indices[X] == 4
        }
    }

    impl VectorFieldStore3<f64> for SentinelStore {
        fn region(&self) -> &GridRegion3 {
            VectorFieldStore3::region(&self.field)
        }

        fn component_value(&self, dim: Dim3, indices: &Idx3<usize>) -> f64 {
            if Self::is_sentinel_cell(indices) {
                Self::SENTINEL
            } else {
                self.field.component_value(dim, indices)
            }
        }

        fn is_no_data(&self, indices: &Idx3<usize>) -> bool {
            Self::is_sentinel_cell(indices)
        }
    }

    #[test]
    fn cells_flagged_by_store_are_not_interpolated() {
        let store = SentinelStore {
            field: VectorField3::from_fn("u".to_string(), region(), linear_vector),
        };
        let interpolator = TrilinearInterpolator3;

        // Cell centers of (3, _, _) and (4, _, _) bracket this point
        assert_eq!(
            interpolator.interp_vector_field(&store, &Point3::new(0.9, 2.5, 5.0)),
            FieldQuery3::NoData
        );
        assert_eq!(
            interpolator.interp_vector_field(&store, &Point3::new(1.25, 2.5, 5.0)),
            FieldQuery3::NoData
        );
        assert!(interpolator
            .interp_vector_field(&store, &Point3::new(-0.5, 2.5, 5.0))
            .is_inside());
    }
}
