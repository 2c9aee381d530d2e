//! Scalar and vector fields sampled on a regular grid region.

use crate::{
    geometry::{
        Dim3::{self, X, Y, Z},
        Idx3, In3D, Point3, Vec3,
    },
    grid::{fgr, GridRegion3},
    num::BFloat,
};
use ndarray::prelude::*;
use std::sync::Arc;

/// Defines read access to a stored 3D vector field.
///
/// Values are addressed by the index of the grid cell they belong to. A store
/// must be safe to read from several threads at once, since independent flow
/// lines may be traced in parallel through the same field.
pub trait VectorFieldStore3<F: BFloat>: Sync {
    /// Returns a reference to the grid region the field is sampled on.
    fn region(&self) -> &GridRegion3;

    /// Returns the value of the given component in the given grid cell.
    fn component_value(&self, dim: Dim3, indices: &Idx3<usize>) -> F;

    /// Whether the given grid cell holds no valid data for any component.
    fn is_no_data(&self, indices: &Idx3<usize>) -> bool {
        Dim3::slice()
            .iter()
            .any(|&dim| self.component_value(dim, indices).is_nan())
    }
}

/// A 3D scalar field.
///
/// Values are defined at the centers of the grid cells. Cells without valid
/// data are marked with NaN.
#[derive(Clone, Debug)]
pub struct ScalarField3<F> {
    name: String,
    region: Arc<GridRegion3>,
    values: Array3<F>,
}

impl<F: BFloat> ScalarField3<F> {
    /// Creates a new scalar field given a name, a grid region and the values.
    ///
    /// # Panics
    ///
    /// If the shape of the value array does not match the shape of the region.
    pub fn new(name: String, region: Arc<GridRegion3>, values: Array3<F>) -> Self {
        let region_shape = region.shape();
        let values_shape = values.shape();
        assert!(
            region_shape[X] == values_shape[0]
                && region_shape[Y] == values_shape[1]
                && region_shape[Z] == values_shape[2],
            "Shape of grid region does not match shape of array of values."
        );
        Self {
            name,
            region,
            values,
        }
    }

    /// Creates a new scalar field where every value equal to the given
    /// no-data value is marked as holding no data.
    pub fn with_no_data_value(
        name: String,
        region: Arc<GridRegion3>,
        mut values: Array3<F>,
        no_data_value: F,
    ) -> Self {
        values.mapv_inplace(|value| {
            if value == no_data_value {
                F::nan()
            } else {
                value
            }
        });
        Self::new(name, region, values)
    }

    /// Creates a new scalar field by evaluating the given function at the
    /// center of each grid cell.
    pub fn from_fn<C>(name: String, region: Arc<GridRegion3>, compute_value: C) -> Self
    where
        C: Fn(&Point3<fgr>) -> F,
    {
        let values = Array3::from_shape_fn(region.shape().to_tuple().f(), |(i, j, k)| {
            compute_value(&region.cell_center(&Idx3::new(i, j, k)))
        });
        Self::new(name, region, values)
    }

    /// Returns a reference to the name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a reference to the grid region.
    pub fn region(&self) -> &GridRegion3 {
        self.region.as_ref()
    }

    /// Returns a new atomic reference counted pointer to the grid region.
    pub fn arc_with_region(&self) -> Arc<GridRegion3> {
        Arc::clone(&self.region)
    }

    /// Returns a reference to the 3D array of field values.
    pub fn values(&self) -> &Array3<F> {
        &self.values
    }

    /// Returns the field value in the grid cell with the given indices.
    pub fn value(&self, indices: &Idx3<usize>) -> F {
        self.values[indices.to_tuple()]
    }

    /// Whether the grid cell with the given indices holds no valid data.
    pub fn is_no_data(&self, indices: &Idx3<usize>) -> bool {
        self.value(indices).is_nan()
    }

    /// Returns the number of grid cells holding no valid data.
    pub fn count_no_data(&self) -> usize {
        self.values.iter().filter(|value| value.is_nan()).count()
    }
}

/// A 3D vector field.
///
/// The three components are stored as independent scalar fields sharing
/// the same grid region.
#[derive(Clone, Debug)]
pub struct VectorField3<F> {
    name: String,
    region: Arc<GridRegion3>,
    components: In3D<ScalarField3<F>>,
}

impl<F: BFloat> VectorField3<F> {
    /// Creates a new vector field given a name, a grid region, and the scalar fields
    /// representing the component values.
    ///
    /// # Panics
    ///
    /// If any of the components is defined on a different grid region.
    pub fn new(name: String, region: Arc<GridRegion3>, components: In3D<ScalarField3<F>>) -> Self {
        for dim in Dim3::slice() {
            assert!(
                components[dim].region() == region.as_ref(),
                "Vector field components must share the grid region of the vector field."
            );
        }
        Self {
            name,
            region,
            components,
        }
    }

    /// Creates a new vector field from three arrays of component values.
    pub fn from_arrays(name: String, region: Arc<GridRegion3>, arrays: In3D<Array3<F>>) -> Self {
        let [x_values, y_values, z_values] = arrays.into_array();
        let components = In3D::new(
            ScalarField3::new(format!("{}x", name), Arc::clone(&region), x_values),
            ScalarField3::new(format!("{}y", name), Arc::clone(&region), y_values),
            ScalarField3::new(format!("{}z", name), Arc::clone(&region), z_values),
        );
        Self::new(name, region, components)
    }

    /// Creates a new vector field by evaluating the given function at the
    /// center of each grid cell.
    pub fn from_fn<C>(name: String, region: Arc<GridRegion3>, compute_vector: C) -> Self
    where
        C: Fn(&Point3<fgr>) -> Vec3<F>,
    {
        let components = In3D::with_each_component(|dim| {
            ScalarField3::from_fn(format!("{}{}", name, dim), Arc::clone(&region), |point| {
                compute_vector(point)[dim]
            })
        });
        Self::new(name, region, components)
    }

    /// Returns a reference to the name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a new atomic reference counted pointer to the grid region.
    pub fn arc_with_region(&self) -> Arc<GridRegion3> {
        Arc::clone(&self.region)
    }

    /// Returns a reference to the scalar field representing the specified
    /// vector field component.
    pub fn component(&self, dim: Dim3) -> &ScalarField3<F> {
        &self.components[dim]
    }

    /// Returns a reference to the 3D array of field values for the
    /// specified component.
    pub fn values(&self, dim: Dim3) -> &Array3<F> {
        self.components[dim].values()
    }

    /// Returns the field vector in the grid cell with the given indices.
    pub fn vector(&self, indices: &Idx3<usize>) -> Vec3<F> {
        Vec3::with_each_component(|dim| self.components[dim].value(indices))
    }

    /// Marks the grid cell with the given indices as holding no valid data.
    pub fn set_no_data(&mut self, indices: &Idx3<usize>) {
        for dim in Dim3::slice() {
            self.components[dim].values[indices.to_tuple()] = F::nan();
        }
    }
}

impl<F: BFloat> VectorFieldStore3<F> for VectorField3<F> {
    fn region(&self) -> &GridRegion3 {
        self.region.as_ref()
    }

    fn component_value(&self, dim: Dim3, indices: &Idx3<usize>) -> F {
        self.components[dim].value(indices)
    }
}
