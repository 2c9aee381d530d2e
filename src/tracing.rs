//! Tracing flow lines of a vector field.

pub mod flow_line;
pub mod seeding;
pub mod stepping;

use self::stepping::{
    cash_karp::{CashKarpStep3, CashKarpStepper3},
    compute_time_step, StepState3, StepUnit, MIN_STEP,
};
use crate::{
    field::VectorFieldStore3,
    geometry::Point3,
    interpolation::{FieldQuery3, Interpolator3},
    num::BFloat,
};
use std::fmt;

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Floating-point precision to use for tracing.
#[allow(non_camel_case_types)]
pub type ftr = f64;

/// Largest number of attempts at a single step before tracing is given up.
pub const MAX_STEP_ATTEMPTS: u32 = 16;

/// An accepted step shorter than this fraction of the cell size is taken to
/// mean the flow line has reached a stationary point.
pub const STALL_DISTANCE_FRACTION: ftr = 1e-9;

/// Tracing along the flow line in the same direction as the field or opposite.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub enum TracingSense {
    Downstream,
    Upstream,
}

/// Reason for terminating tracing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub enum StoppingCause {
    /// A sampled point had no valid field data.
    NoData,
    /// The next position would not have been strictly inside the grid region.
    OutOfBounds,
    /// The largest allowed number of steps was taken.
    MaxSteps,
    /// No acceptable step could be found, or the flow line stopped moving.
    Stalled,
}

impl StoppingCause {
    /// Returns every stopping cause.
    pub fn all() -> [Self; 4] {
        [Self::NoData, Self::OutOfBounds, Self::MaxSteps, Self::Stalled]
    }
}

impl fmt::Display for StoppingCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::NoData => "no data",
                Self::OutOfBounds => "out of bounds",
                Self::MaxSteps => "max steps",
                Self::Stalled => "stalled",
            }
        )
    }
}

/// A stepper result which is either OK (with an an abitrary value) or stopped (with a cause).
#[derive(Clone, Debug, PartialEq)]
pub enum StepperResult<T> {
    Ok(T),
    Stopped(StoppingCause),
}

/// Summary of a finished trace.
#[derive(Clone, Debug, PartialEq)]
pub struct TracerResult {
    pub stopping_cause: StoppingCause,
    pub elapsed_time: ftr,
    pub n_steps: usize,
}

impl TracerResult {
    fn from_state(stopping_cause: StoppingCause, state: &StepState3) -> Self {
        Self {
            stopping_cause,
            elapsed_time: state.elapsed_time(),
            n_steps: state.n_steps(),
        }
    }
}

/// Traces a flow line through a 3D vector field.
///
/// # Parameters
///
/// - `field`: Vector field to trace.
/// - `interpolator`: Interpolator to use.
/// - `start_position`: Position where the tracing should start.
/// - `sense`: Whether the flow line should be traced along or against the field.
/// - `step_unit`: Unit of `nominal_step`.
/// - `nominal_step`: Size of the initial step, in units of `step_unit`.
/// - `max_steps`: Largest number of accepted steps to take.
/// - `callback`: Closure that will be called with the start position and with
///   each new accepted position, in order. The accepted step leading to the
///   position is passed along with it, or `None` for the start position.
///
/// # Returns
///
/// A `TracerResult` holding the reason tracing terminated together with the
/// elapsed integration time and the number of accepted steps.
///
/// # Type parameters
///
/// - `F`: Floating point type of the field data.
/// - `S`: Type of vector field store.
/// - `I`: Type of interpolator.
/// - `C`: Mutable function type taking a reference to a position and the step that reached it.
#[allow(clippy::too_many_arguments)]
pub fn trace_3d_flow_line<F, S, I, C>(
    field: &S,
    interpolator: &I,
    start_position: &Point3<ftr>,
    sense: TracingSense,
    step_unit: StepUnit,
    nominal_step: ftr,
    max_steps: usize,
    callback: &mut C,
) -> TracerResult
where
    F: BFloat,
    S: VectorFieldStore3<F>,
    I: Interpolator3,
    C: FnMut(&Point3<ftr>, Option<&CashKarpStep3>),
{
    let region = field.region();
    let cell_size = region.min_cell_extent();

    callback(start_position, None);

    let start_speed = match interpolator.interp_vector_field(field, start_position) {
        FieldQuery3::Inside(velocity) => velocity.length(),
        FieldQuery3::NoData | FieldQuery3::Outside => {
            return TracerResult::from_state(
                StoppingCause::NoData,
                &StepState3::new(start_position.clone(), MIN_STEP),
            )
        }
    };

    let mut state = StepState3::new(
        start_position.clone(),
        compute_time_step(step_unit, nominal_step, start_speed, cell_size),
    );

    if max_steps == 0 {
        return TracerResult::from_state(StoppingCause::MaxSteps, &state);
    }

    loop {
        if !interpolator
            .interp_vector_field(field, state.position())
            .is_inside()
        {
            return TracerResult::from_state(StoppingCause::NoData, &state);
        }

        let (step, attempts) = match take_accepted_step(
            field,
            interpolator,
            sense,
            &mut state,
            MAX_STEP_ATTEMPTS,
        ) {
            StepperResult::Ok(outcome) => outcome,
            StepperResult::Stopped(cause) => return TracerResult::from_state(cause, &state),
        };

        if !region.contains_strictly(&step.next_position) {
            return TracerResult::from_state(StoppingCause::OutOfBounds, &state);
        }

        let displacement = (&step.next_position - state.position()).length();
        if displacement < STALL_DISTANCE_FRACTION * cell_size {
            return TracerResult::from_state(StoppingCause::Stalled, &state);
        }

        // The step that follows a rejection must not grow past the one that was accepted
        let next_time_step = if attempts > 1 {
            ftr::min(step.suggested_time_step, step.time_step)
        } else {
            step.suggested_time_step
        };
        state.advance(step.next_position.clone(), step.time_step, next_time_step);
        callback(state.position(), Some(&step));

        if state.n_steps() >= max_steps {
            return TracerResult::from_state(StoppingCause::MaxSteps, &state);
        }
    }
}

/// Attempts steps from the current state until one is accepted, shrinking the
/// time step of the state after each rejection.
///
/// Returns the accepted step together with the number of attempts it took.
/// Tracing has stalled if a step is rejected at `MIN_STEP` or if `max_attempts`
/// attempts are rejected.
fn take_accepted_step<F, S, I>(
    field: &S,
    interpolator: &I,
    sense: TracingSense,
    state: &mut StepState3,
    max_attempts: u32,
) -> StepperResult<(CashKarpStep3, u32)>
where
    F: BFloat,
    S: VectorFieldStore3<F>,
    I: Interpolator3,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        let step = match CashKarpStepper3::step(
            field,
            interpolator,
            sense,
            state.position(),
            state.time_step(),
        ) {
            StepperResult::Ok(step) => step,
            StepperResult::Stopped(cause) => return StepperResult::Stopped(cause),
        };
        if step.accepted {
            return StepperResult::Ok((step, attempts));
        }
        if state.time_step() <= MIN_STEP || attempts >= max_attempts {
            return StepperResult::Stopped(StoppingCause::Stalled);
        }
        state.set_time_step(step.suggested_time_step);
    }
}
