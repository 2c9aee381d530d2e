//! Stepping along flow lines of a vector field.

pub mod cash_karp;

use super::ftr;
use crate::{geometry::Point3, num};
use std::{fmt, str::FromStr};

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Largest accepted norm of the local truncation error of a step.
pub const MAX_ERROR: ftr = 1e-6;

/// Smallest allowed time step.
pub const MIN_STEP: ftr = 0.01;

/// Largest allowed time step.
pub const MAX_STEP: ftr = 1.0;

/// Unit that a nominal step size is given in.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub enum StepUnit {
    /// The step is an integration time increment.
    Time,
    /// The step is a distance in the units of the grid coordinates.
    Length,
    /// The step is a multiple of the grid cell size.
    CellMultiple,
}

impl FromStr for StepUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "length" => Ok(Self::Length),
            "cell" => Ok(Self::CellMultiple),
            other => Err(format!(
                "Invalid step unit {} (valid units are time, length and cell)",
                other
            )),
        }
    }
}

impl fmt::Display for StepUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Time => "time",
                Self::Length => "length",
                Self::CellMultiple => "cell",
            }
        )
    }
}

/// Converts a nominal step size into an integration time step.
///
/// Spatial steps are divided by the local speed. When the speed is zero
/// there is no meaningful conversion and the largest time step is used, so
/// that the tracer can find out that the flow line no longer moves.
///
/// The result always lies in `[MIN_STEP, MAX_STEP]`.
pub fn compute_time_step(unit: StepUnit, nominal_step: ftr, speed: ftr, cell_size: ftr) -> ftr {
    let time_step = match unit {
        StepUnit::Time => nominal_step,
        StepUnit::Length if speed > 0.0 => nominal_step / speed,
        StepUnit::CellMultiple if speed > 0.0 => nominal_step * cell_size / speed,
        StepUnit::Length | StepUnit::CellMultiple => MAX_STEP,
    };
    num::clamp_to_range(time_step, MIN_STEP, MAX_STEP)
}

/// Mutable state of a single trace.
#[derive(Clone, Debug, PartialEq)]
pub struct StepState3 {
    position: Point3<ftr>,
    time_step: ftr,
    elapsed_time: ftr,
    n_steps: usize,
}

impl StepState3 {
    /// Creates a new state at the given position with no steps taken.
    pub fn new(position: Point3<ftr>, time_step: ftr) -> Self {
        Self {
            position,
            time_step,
            elapsed_time: 0.0,
            n_steps: 0,
        }
    }

    pub fn position(&self) -> &Point3<ftr> {
        &self.position
    }

    /// Returns the time step to use for the next step attempt.
    pub fn time_step(&self) -> ftr {
        self.time_step
    }

    pub fn elapsed_time(&self) -> ftr {
        self.elapsed_time
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Replaces the time step without moving, as after a rejected step.
    pub fn set_time_step(&mut self, time_step: ftr) {
        self.time_step = time_step;
    }

    /// Moves to the position reached by an accepted step of duration `time_step`.
    pub fn advance(&mut self, position: Point3<ftr>, time_step: ftr, next_time_step: ftr) {
        self.position = position;
        self.elapsed_time += time_step;
        self.n_steps += 1;
        self.time_step = next_time_step;
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn time_steps_pass_through_within_bounds() {
        assert_eq!(compute_time_step(StepUnit::Time, 0.3, 2.0, 1.0), 0.3);
        assert_eq!(compute_time_step(StepUnit::Time, 7.0, 2.0, 1.0), MAX_STEP);
        assert_eq!(compute_time_step(StepUnit::Time, 1e-5, 2.0, 1.0), MIN_STEP);
    }

    #[test]
    fn spatial_steps_are_divided_by_speed() {
        assert_eq!(compute_time_step(StepUnit::CellMultiple, 0.5, 2.0, 0.5), 0.125);
        assert_eq!(compute_time_step(StepUnit::Length, 0.5, 4.0, 0.5), 0.125);
    }

    #[test]
    fn translated_steps_are_always_bounded() {
        for &unit in &[StepUnit::Time, StepUnit::Length, StepUnit::CellMultiple] {
            for &speed in &[0.0, 1e-300, 1e-3, 1.0, 1e3, 1e300, ftr::INFINITY] {
                for &nominal_step in &[0.0, 1e-3, 0.25, 1.0, 1e6] {
                    let time_step = compute_time_step(unit, nominal_step, speed, 1.0);
                    assert!(
                        (MIN_STEP..=MAX_STEP).contains(&time_step),
                        "{} step {} at speed {} gave {}",
                        unit,
                        nominal_step,
                        speed,
                        time_step
                    );
                }
            }
        }
    }

    #[test]
    fn zero_speed_gives_largest_step() {
        assert_eq!(compute_time_step(StepUnit::CellMultiple, 0.25, 0.0, 1.0), MAX_STEP);
        assert_eq!(compute_time_step(StepUnit::Length, 0.25, 0.0, 1.0), MAX_STEP);
    }

    #[test]
    fn step_units_parse() {
        assert_eq!("time".parse::<StepUnit>(), Ok(StepUnit::Time));
        assert_eq!("Length".parse::<StepUnit>(), Ok(StepUnit::Length));
        assert_eq!(" cell".parse::<StepUnit>(), Ok(StepUnit::CellMultiple));
        assert!("meters".parse::<StepUnit>().is_err());
    }

    #[test]
    fn advancing_updates_state() {
        let mut state = StepState3::new(Point3::origin(), 0.5);
        state.advance(Point3::new(1.0, 0.0, 0.0), 0.5, 0.7);
        state.advance(Point3::new(2.0, 0.0, 0.0), 0.7, 0.9);
        assert_eq!(state.position(), &Point3::new(2.0, 0.0, 0.0));
        assert_eq!(state.n_steps(), 2);
        assert_eq!(state.elapsed_time(), 1.2);
        assert_eq!(state.time_step(), 0.9);
    }
}
