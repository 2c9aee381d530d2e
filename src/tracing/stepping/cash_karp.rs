//! Stepping using the Cash-Karp scheme, a fifth-order Runge-Kutta method
//! with error estimation through an embedded fourth-order step.

use super::{MAX_ERROR, MAX_STEP, MIN_STEP};
use crate::{
    field::VectorFieldStore3,
    geometry::{Point3, Vec3},
    interpolation::{FieldQuery3, Interpolator3},
    num::{self, BFloat},
    tracing::{ftr, StepperResult, StoppingCause, TracingSense},
};

const N_STAGES: usize = 6;

/// Coefficients for computing the positions of stages 2 to 6.
const B: [[ftr; N_STAGES - 1]; N_STAGES - 1] = [
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [3.0 / 10.0, -9.0 / 10.0, 6.0 / 5.0, 0.0, 0.0],
    [-11.0 / 54.0, 5.0 / 2.0, -70.0 / 27.0, 35.0 / 27.0, 0.0],
    [
        1631.0 / 55_296.0,
        175.0 / 512.0,
        575.0 / 13_824.0,
        44_275.0 / 110_592.0,
        253.0 / 4096.0,
    ],
];

/// Weights of the fifth-order solution.
const C: [ftr; N_STAGES] = [
    37.0 / 378.0,
    0.0,
    250.0 / 621.0,
    125.0 / 594.0,
    0.0,
    512.0 / 1771.0,
];

/// Differences between the fifth- and fourth-order weights.
const DC: [ftr; N_STAGES] = [
    37.0 / 378.0 - 2825.0 / 27_648.0,
    0.0,
    250.0 / 621.0 - 18_575.0 / 48_384.0,
    125.0 / 594.0 - 13_525.0 / 55_296.0,
    -277.0 / 14_336.0,
    512.0 / 1771.0 - 1.0 / 4.0,
];

const SAFETY_FACTOR: ftr = 0.9;
const MIN_STEP_SCALE: ftr = 0.2;
const MAX_STEP_SCALE: ftr = 5.0;
const ACCEPTED_ERROR_EXPONENT: ftr = 1.0 / 5.0;
const REJECTED_ERROR_EXPONENT: ftr = 1.0 / 4.0;

/// Outcome of a single step attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct CashKarpStep3 {
    /// Position reached by the fifth-order solution.
    pub next_position: Point3<ftr>,
    /// Norm of the estimated local truncation error.
    pub error: ftr,
    /// Time step the attempt was made with.
    pub time_step: ftr,
    /// Time step to use for the next attempt.
    pub suggested_time_step: ftr,
    /// Whether the error is within `MAX_ERROR`.
    pub accepted: bool,
}

/// A stepper using the Cash-Karp embedded Runge-Kutta pair.
///
/// The stepper holds no state. It performs single step attempts and leaves
/// it to the caller to retry rejected steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct CashKarpStepper3;

impl CashKarpStepper3 {
    /// Attempts a step of duration `time_step` from the given position.
    ///
    /// # Returns
    ///
    /// A `StepperResult<CashKarpStep3>` which is either:
    ///
    /// - `Ok`: Contains the candidate position, the error estimate and the
    ///   suggested next time step, whether or not the step was accepted.
    /// - `Stopped`: Contains a `StoppingCause` indicating why a stage could not
    ///   be evaluated.
    ///
    /// # Type parameters
    ///
    /// - `F`: Floating point type of the field data.
    /// - `S`: Type of vector field store.
    /// - `I`: Type of interpolator.
    pub fn step<F, S, I>(
        field: &S,
        interpolator: &I,
        sense: TracingSense,
        position: &Point3<ftr>,
        time_step: ftr,
    ) -> StepperResult<CashKarpStep3>
    where
        F: BFloat,
        S: VectorFieldStore3<F>,
        I: Interpolator3,
    {
        let velocities =
            match Self::compute_stage_velocities(field, interpolator, sense, position, time_step) {
                Ok(velocities) => velocities,
                Err(cause) => return StepperResult::Stopped(cause),
            };

        let displacement = weighted_sum(&velocities, &C) * time_step;
        let error = (weighted_sum(&velocities, &DC) * time_step).length();
        let accepted = error <= MAX_ERROR;

        StepperResult::Ok(CashKarpStep3 {
            next_position: position + displacement,
            error,
            time_step,
            suggested_time_step: compute_suggested_time_step(time_step, error, accepted),
            accepted,
        })
    }

    fn compute_stage_velocities<F, S, I>(
        field: &S,
        interpolator: &I,
        sense: TracingSense,
        position: &Point3<ftr>,
        time_step: ftr,
    ) -> Result<Vec<Vec3<ftr>>, StoppingCause>
    where
        F: BFloat,
        S: VectorFieldStore3<F>,
        I: Interpolator3,
    {
        let mut velocities = Vec::with_capacity(N_STAGES);
        velocities.push(compute_velocity(field, interpolator, sense, position)?);
        for coefficients in &B {
            let stage_position = position + weighted_sum(&velocities, coefficients) * time_step;
            velocities.push(compute_velocity(
                field,
                interpolator,
                sense,
                &stage_position,
            )?);
        }
        Ok(velocities)
    }
}

fn compute_velocity<F, S, I>(
    field: &S,
    interpolator: &I,
    sense: TracingSense,
    position: &Point3<ftr>,
) -> Result<Vec3<ftr>, StoppingCause>
where
    F: BFloat,
    S: VectorFieldStore3<F>,
    I: Interpolator3,
{
    match interpolator.interp_vector_field(field, position) {
        FieldQuery3::Inside(mut velocity) => {
            if sense == TracingSense::Upstream {
                velocity.reverse();
            }
            Ok(velocity)
        }
        FieldQuery3::NoData => Err(StoppingCause::NoData),
        FieldQuery3::Outside => Err(StoppingCause::OutOfBounds),
    }
}

/// Sums the given vectors weighted by the corresponding coefficients.
/// Surplus coefficients are ignored.
fn weighted_sum(vectors: &[Vec3<ftr>], coefficients: &[ftr]) -> Vec3<ftr> {
    vectors
        .iter()
        .zip(coefficients)
        .fold(Vec3::zero(), |sum, (vector, &coefficient)| {
            sum + vector * coefficient
        })
}

fn compute_suggested_time_step(time_step: ftr, error: ftr, accepted: bool) -> ftr {
    let step_scale = if error == 0.0 {
        MAX_STEP_SCALE
    } else {
        let exponent = if accepted {
            ACCEPTED_ERROR_EXPONENT
        } else {
            REJECTED_ERROR_EXPONENT
        };
        SAFETY_FACTOR * (MAX_ERROR / error).powf(exponent)
    };
    let mut step_scale = num::clamp_to_range(step_scale, MIN_STEP_SCALE, MAX_STEP_SCALE);
    if !accepted {
        step_scale = ftr::min(step_scale, 1.0);
    }
    num::clamp_to_range(time_step * step_scale, MIN_STEP, MAX_STEP)
}
