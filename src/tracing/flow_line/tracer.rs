//! Tracing of individual flow lines.

use super::{FlowLineData3, FlowLineSink3};
use crate::{
    field::VectorFieldStore3,
    geometry::Point3,
    interpolation::Interpolator3,
    num::BFloat,
    tracing::{
        self, ftr,
        stepping::{cash_karp::CashKarpStep3, StepUnit},
        TracingSense,
    },
};
use std::{fmt, str::FromStr};

/// Direction(s) to trace flow lines in relative to the field direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowLineDirection {
    Downstream,
    Upstream,
    Both,
}

impl FlowLineDirection {
    /// Returns the tracing senses to trace each flow line with.
    pub fn senses(&self) -> &'static [TracingSense] {
        match self {
            Self::Downstream => &[TracingSense::Downstream],
            Self::Upstream => &[TracingSense::Upstream],
            Self::Both => &[TracingSense::Downstream, TracingSense::Upstream],
        }
    }
}

impl FromStr for FlowLineDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "down" | "downstream" => Ok(Self::Downstream),
            "up" | "upstream" => Ok(Self::Upstream),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "Invalid flow line direction {} (valid directions are up, down and both)",
                other
            )),
        }
    }
}

impl fmt::Display for FlowLineDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Downstream => "down",
                Self::Upstream => "up",
                Self::Both => "both",
            }
        )
    }
}

/// Configuration parameters for the flow line tracer.
#[derive(Clone, Debug)]
pub struct FlowLineTracerConfig {
    /// Unit that the nominal step is given in.
    pub step_unit: StepUnit,
    /// Size of the first step of each flow line.
    pub nominal_step: ftr,
    /// Flow lines are terminated after this many accepted steps.
    pub max_steps: usize,
    /// Direction(s) to trace flow lines in relative to the field direction.
    pub direction: FlowLineDirection,
}

/// A tracer of flow lines through 3D vector fields using adaptive
/// Cash-Karp steps.
#[derive(Clone, Debug)]
pub struct FlowLineTracer3 {
    config: FlowLineTracerConfig,
}

impl FlowLineTracer3 {
    /// Creates a new flow line tracer.
    ///
    /// # Panics
    ///
    /// If the configuration is invalid.
    pub fn new(config: FlowLineTracerConfig) -> Self {
        config.validate();
        Self { config }
    }

    pub fn config(&self) -> &FlowLineTracerConfig {
        &self.config
    }

    /// Traces a single flow line with the given sense.
    ///
    /// # Parameters
    ///
    /// - `field`: Vector field to trace.
    /// - `interpolator`: Interpolator to use.
    /// - `start_position`: Position where the tracing should start.
    /// - `sense`: Whether to trace along or against the field.
    ///
    /// # Returns
    ///
    /// The traced flow line. Its positions always begin with `start_position`,
    /// also when tracing stops immediately.
    ///
    /// # Type parameters
    ///
    /// - `F`: Floating point type of the field data.
    /// - `S`: Type of vector field store.
    /// - `I`: Type of interpolator.
    pub fn trace<F, S, I>(
        &self,
        field: &S,
        interpolator: &I,
        start_position: &Point3<ftr>,
        sense: TracingSense,
    ) -> FlowLineData3
    where
        F: BFloat,
        S: VectorFieldStore3<F>,
        I: Interpolator3,
    {
        let mut positions = Vec::new();
        let mut callback =
            |position: &Point3<ftr>, _: Option<&CashKarpStep3>| positions.push(position.clone());

        let result = tracing::trace_3d_flow_line(
            field,
            interpolator,
            start_position,
            sense,
            self.config.step_unit,
            self.config.nominal_step,
            self.config.max_steps,
            &mut callback,
        );

        FlowLineData3::new(
            positions,
            sense,
            result.stopping_cause,
            result.elapsed_time,
            result.n_steps,
        )
    }

    /// Traces one flow line for each sense given by the configured direction.
    pub fn trace_in_configured_directions<F, S, I>(
        &self,
        field: &S,
        interpolator: &I,
        start_position: &Point3<ftr>,
    ) -> Vec<FlowLineData3>
    where
        F: BFloat,
        S: VectorFieldStore3<F>,
        I: Interpolator3,
    {
        self.config
            .direction
            .senses()
            .iter()
            .map(|&sense| self.trace(field, interpolator, start_position, sense))
            .collect()
    }

    /// Traces flow lines from the given position in the configured directions
    /// and hands each of them to the given sink.
    pub fn trace_into<F, S, I, K>(
        &self,
        field: &S,
        interpolator: &I,
        start_position: &Point3<ftr>,
        sink: &mut K,
    ) where
        F: BFloat,
        S: VectorFieldStore3<F>,
        I: Interpolator3,
        K: FlowLineSink3,
    {
        for flow_line in self.trace_in_configured_directions(field, interpolator, start_position) {
            sink.accept(&flow_line);
        }
    }
}

impl FlowLineTracerConfig {
    pub const DEFAULT_STEP_UNIT: StepUnit = StepUnit::CellMultiple;
    pub const DEFAULT_NOMINAL_STEP: ftr = 0.25;
    pub const DEFAULT_MAX_STEPS: usize = 2000;
    pub const DEFAULT_DIRECTION: FlowLineDirection = FlowLineDirection::Downstream;

    /// Panics if any of the configuration parameter values are invalid.
    pub fn validate(&self) {
        assert!(
            self.nominal_step > 0.0 && self.nominal_step.is_finite(),
            "Nominal step must be larger than zero and finite."
        );
    }
}

impl Default for FlowLineTracerConfig {
    fn default() -> Self {
        Self {
            step_unit: Self::DEFAULT_STEP_UNIT,
            nominal_step: Self::DEFAULT_NOMINAL_STEP,
            max_steps: Self::DEFAULT_MAX_STEPS,
            direction: Self::DEFAULT_DIRECTION,
        }
    }
}
