//! Accumulation of flow lines onto the grid they were traced through.

use crate::{
    field::ScalarField3,
    geometry::{Idx3, Point3},
    grid::GridRegion3,
    num::BFloat,
    tracing::{
        flow_line::{FlowLineData3, FlowLineSink3},
        ftr,
    },
};
use ndarray::prelude::*;
use std::sync::Arc;

/// Number of flow lines passing through each grid cell.
///
/// A flow line is counted once for each cell it enters, so a flow line
/// leaving a cell and later returning to it is counted twice there.
#[derive(Clone, Debug)]
pub struct FlowAccumulation3 {
    region: Arc<GridRegion3>,
    counts: Array3<u32>,
}

impl FlowAccumulation3 {
    /// Creates a new accumulation with zero counts over the given region.
    pub fn new(region: Arc<GridRegion3>) -> Self {
        let counts = Array3::zeros(region.shape().to_tuple().f());
        Self { region, counts }
    }

    /// Returns a reference to the grid region.
    pub fn region(&self) -> &GridRegion3 {
        self.region.as_ref()
    }

    /// Returns a reference to the 3D array of counts.
    pub fn counts(&self) -> &Array3<u32> {
        &self.counts
    }

    pub fn count(&self, indices: &Idx3<usize>) -> u32 {
        self.counts[indices.to_tuple()]
    }

    /// Returns the sum of the counts over all grid cells.
    pub fn total_count(&self) -> u64 {
        self.counts.iter().map(|&count| u64::from(count)).sum()
    }

    /// Adds the cells entered by the given path.
    pub fn add_path(&mut self, positions: &[Point3<ftr>]) {
        let mut previous_indices: Option<Idx3<usize>> = None;
        for position in positions {
            if let Some(indices) = self.region.find_grid_cell(position) {
                if previous_indices.as_ref() != Some(&indices) {
                    self.counts[indices.to_tuple()] += 1;
                }
                previous_indices = Some(indices);
            } else {
                previous_indices = None;
            }
        }
    }

    /// Converts the counts into a scalar field on the same region.
    pub fn to_scalar_field<F: BFloat>(&self, name: String) -> ScalarField3<F> {
        let values = self
            .counts
            .mapv(|count| F::from_u32(count).unwrap_or_else(F::nan));
        ScalarField3::new(name, Arc::clone(&self.region), values)
    }
}

impl FlowLineSink3 for FlowAccumulation3 {
    fn accept(&mut self, flow_line: &FlowLineData3) {
        self.add_path(flow_line.positions());
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{
        field::VectorField3,
        geometry::{In3D, Vec3},
        interpolation::trilinear::TrilinearInterpolator3,
        tracing::flow_line::tracer::{FlowLineTracer3, FlowLineTracerConfig},
    };

    fn region() -> Arc<GridRegion3> {
        Arc::new(GridRegion3::new(
            In3D::new(6, 3, 3),
            Point3::origin(),
            Vec3::new(1.0, 1.0, 1.0),
        ))
    }

    #[test]
    fn each_entered_cell_is_counted_once() {
        let mut accumulation = FlowAccumulation3::new(region());
        accumulation.add_path(&[
            Point3::new(0.2, 0.5, 0.5),
            Point3::new(0.7, 0.5, 0.5),
            Point3::new(1.3, 0.5, 0.5),
            Point3::new(1.9, 0.5, 0.5),
            Point3::new(2.4, 1.5, 0.5),
        ]);
        assert_eq!(accumulation.count(&Idx3::new(0, 0, 0)), 1);
        assert_eq!(accumulation.count(&Idx3::new(1, 0, 0)), 1);
        assert_eq!(accumulation.count(&Idx3::new(2, 1, 0)), 1);
        assert_eq!(accumulation.total_count(), 3);
    }

    #[test]
    fn reentered_cells_are_counted_again() {
        let mut accumulation = FlowAccumulation3::new(region());
        accumulation.add_path(&[
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(1.5, 0.5, 0.5),
            Point3::new(0.5, 0.5, 0.5),
        ]);
        assert_eq!(accumulation.count(&Idx3::new(0, 0, 0)), 2);
    }

    #[test]
    fn traced_flow_lines_accumulate() {
        let field =
            VectorField3::from_fn("u".to_string(), region(), |_| Vec3::new(1.0_f64, 0.0, 0.0));
        let tracer = FlowLineTracer3::new(FlowLineTracerConfig {
            nominal_step: 0.5,
            ..FlowLineTracerConfig::default()
        });
        let mut accumulation = FlowAccumulation3::new(field.arc_with_region());
        for y in &[0.5, 1.5] {
            tracer.trace_into(
                &field,
                &TrilinearInterpolator3,
                &Point3::new(0.5, *y, 0.5),
                &mut accumulation,
            );
        }
        // Both lines run along x until they leave the region
        for i in 0..5 {
            assert_eq!(accumulation.count(&Idx3::new(i, 0, 0)), 1);
            assert_eq!(accumulation.count(&Idx3::new(i, 1, 0)), 1);
        }
        assert_eq!(accumulation.count(&Idx3::new(0, 2, 0)), 0);

        let field = accumulation.to_scalar_field::<f32>("acc".to_string());
        assert_eq!(field.value(&Idx3::new(2, 1, 0)), 1.0);
    }
}
