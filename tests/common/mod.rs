#![allow(dead_code)]

use flowtrace::{
    field::VectorField3,
    geometry::{
        Dim3::{X, Y},
        In3D, Point3, Vec3,
    },
    grid::{fgr, GridRegion3},
    tracing::{
        flow_line::tracer::{FlowLineDirection, FlowLineTracer3, FlowLineTracerConfig},
        stepping::StepUnit,
    },
};
use std::sync::Arc;

/// Region spanning `[0, 10]` along every axis with unit cells.
pub fn cube_region() -> Arc<GridRegion3> {
    Arc::new(GridRegion3::new(
        In3D::same(10),
        Point3::origin(),
        Vec3::new(1.0, 1.0, 1.0),
    ))
}

pub fn uniform_field(velocity: Vec3<fgr>) -> VectorField3<fgr> {
    VectorField3::from_fn("u".to_string(), cube_region(), move |_| velocity.clone())
}

/// Rigid rotation with unit angular speed about the vertical line through the
/// center of the cube.
pub fn rotating_field() -> VectorField3<fgr> {
    rotating_field_with_speed(1.0)
}

pub fn rotating_field_with_speed(angular_speed: fgr) -> VectorField3<fgr> {
    VectorField3::from_fn("u".to_string(), cube_region(), move |point| {
        Vec3::new(
            -angular_speed * (point[Y] - 5.0),
            angular_speed * (point[X] - 5.0),
            0.0,
        )
    })
}

pub fn tracer(step_unit: StepUnit, nominal_step: fgr, max_steps: usize) -> FlowLineTracer3 {
    FlowLineTracer3::new(FlowLineTracerConfig {
        step_unit,
        nominal_step,
        max_steps,
        direction: FlowLineDirection::Downstream,
    })
}
