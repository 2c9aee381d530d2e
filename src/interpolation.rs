//! Interpolation of scalar and vector fields.

pub mod trilinear;

use crate::{
    field::{ScalarField3, VectorFieldStore3},
    geometry::{Point3, Vec3},
    grid::fgr,
    num::BFloat,
};

/// Result of querying a field at an arbitrary coordinate.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldQuery3<T> {
    /// The coordinate was inside the region and all required values were valid.
    Inside(T),
    /// A grid cell required for the interpolation holds no valid data.
    NoData,
    /// The coordinate was outside the region.
    Outside,
}

impl<T> FieldQuery3<T> {
    /// Returns the contained value if the query succeeded.
    pub fn inside(self) -> Option<T> {
        match self {
            Self::Inside(value) => Some(value),
            Self::NoData | Self::Outside => None,
        }
    }

    /// Whether the query succeeded.
    pub fn is_inside(&self) -> bool {
        matches!(self, Self::Inside(_))
    }
}

/// Defines the properties of a 3D interpolator.
pub trait Interpolator3: Clone + Sync + Send {
    /// Computes the interpolated value of a scalar field at the given coordinate.
    ///
    /// # Parameters
    ///
    /// - `field`: Scalar field to interpolate.
    /// - `interp_point`: Coordinate where the interpolated value should be computed.
    ///
    /// # Returns
    ///
    /// A `FieldQuery3<fgr>` which is either:
    ///
    /// - `Inside`: Contains the interpolated field value.
    /// - `NoData`: A grid cell needed for the interpolation holds no data.
    /// - `Outside`: The interpolation point was outside the grid region.
    ///
    /// # Type parameters
    ///
    /// - `F`: Floating point type of the field data.
    fn interp_scalar_field<F>(
        &self,
        field: &ScalarField3<F>,
        interp_point: &Point3<fgr>,
    ) -> FieldQuery3<fgr>
    where
        F: BFloat;

    /// Computes the interpolated vector of a vector field at the given coordinate.
    ///
    /// # Parameters
    ///
    /// - `field`: Vector field store to interpolate.
    /// - `interp_point`: Coordinate where the interpolated vector should be computed.
    ///
    /// # Returns
    ///
    /// A `FieldQuery3<Vec3<fgr>>` which is either:
    ///
    /// - `Inside`: Contains the interpolated field vector.
    /// - `NoData`: A grid cell needed for the interpolation of any component holds no data.
    /// - `Outside`: The interpolation point was outside the grid region.
    ///
    /// # Type parameters
    ///
    /// - `F`: Floating point type of the field data.
    /// - `S`: Type of vector field store.
    fn interp_vector_field<F, S>(
        &self,
        field: &S,
        interp_point: &Point3<fgr>,
    ) -> FieldQuery3<Vec3<fgr>>
    where
        F: BFloat,
        S: VectorFieldStore3<F>;
}
