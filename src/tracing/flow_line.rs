//! Flow lines in 3D vector fields.

pub mod tracer;

use self::tracer::FlowLineTracer3;
use super::{ftr, seeding::Seeder3, StoppingCause, TracingSense};
use crate::{
    field::VectorFieldStore3, geometry::Point3, interpolation::Interpolator3, io::Verbosity,
    num::BFloat,
};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use std::collections::HashMap;

#[cfg(feature = "serialization")]
use serde::Serialize;
#[cfg(any(feature = "pickle", feature = "json"))]
use {crate::io::utils, std::io, std::path::Path};

/// Data associated with a traced 3D flow line.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct FlowLineData3 {
    positions: Vec<Point3<ftr>>,
    sense: TracingSense,
    stopping_cause: StoppingCause,
    elapsed_time: ftr,
    n_steps: usize,
}

impl FlowLineData3 {
    pub(crate) fn new(
        positions: Vec<Point3<ftr>>,
        sense: TracingSense,
        stopping_cause: StoppingCause,
        elapsed_time: ftr,
        n_steps: usize,
    ) -> Self {
        Self {
            positions,
            sense,
            stopping_cause,
            elapsed_time,
            n_steps,
        }
    }

    /// Returns a reference to the positions making up the flow line,
    /// starting with the seed point.
    pub fn positions(&self) -> &[Point3<ftr>] {
        &self.positions
    }

    /// Returns the number of points making up the flow line.
    pub fn number_of_points(&self) -> usize {
        self.positions.len()
    }

    pub fn start_position(&self) -> &Point3<ftr> {
        &self.positions[0]
    }

    pub fn end_position(&self) -> &Point3<ftr> {
        &self.positions[self.positions.len() - 1]
    }

    pub fn sense(&self) -> TracingSense {
        self.sense
    }

    /// Returns the reason tracing of the flow line was terminated.
    pub fn stopping_cause(&self) -> StoppingCause {
        self.stopping_cause
    }

    /// Returns the total integration time along the flow line.
    pub fn elapsed_time(&self) -> ftr {
        self.elapsed_time
    }

    /// Returns the number of accepted steps.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }
}

/// Defines a receiver of traced flow lines.
pub trait FlowLineSink3 {
    /// Accepts a finished flow line.
    fn accept(&mut self, flow_line: &FlowLineData3);
}

impl FlowLineSink3 for Vec<FlowLineData3> {
    fn accept(&mut self, flow_line: &FlowLineData3) {
        self.push(flow_line.clone());
    }
}

/// Collection of 3D flow lines traced from a set of seed points.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize))]
pub struct FlowLineSet3 {
    flow_lines: Vec<FlowLineData3>,
}

impl FlowLineSet3 {
    /// Traces all the flow lines in the set from positions generated by the given seeder.
    ///
    /// The seed points are traced in parallel, but the resulting flow lines
    /// are kept in the order of the seed points.
    ///
    /// # Parameters
    ///
    /// - `seeder`: Seeder to use for generating start positions.
    /// - `tracer`: Flow line tracer to use.
    /// - `field`: Vector field to trace.
    /// - `interpolator`: Interpolator to use.
    /// - `verbosity`: Whether and how to print status messages.
    ///
    /// # Returns
    ///
    /// A new `FlowLineSet3` with traced flow lines.
    ///
    /// # Type parameters
    ///
    /// - `Sd`: Type of seeder.
    /// - `F`: Floating point type of the field data.
    /// - `S`: Type of vector field store.
    /// - `I`: Type of interpolator.
    pub fn trace<Sd, F, S, I>(
        seeder: Sd,
        tracer: &FlowLineTracer3,
        field: &S,
        interpolator: &I,
        verbosity: &Verbosity,
    ) -> Self
    where
        Sd: Seeder3,
        F: BFloat,
        S: VectorFieldStore3<F>,
        I: Interpolator3,
    {
        let n_seeds = seeder.number_of_points();
        if verbosity.print_messages() {
            println!("Found {} start positions", n_seeds);
        }

        let flow_lines: Vec<FlowLineData3> = seeder
            .into_par_iter()
            .progress_with(verbosity.create_progress_bar(n_seeds))
            .flat_map_iter(|start_position| {
                tracer.trace_in_configured_directions(field, interpolator, &start_position)
            })
            .collect();

        let flow_line_set = Self { flow_lines };

        if verbosity.print_messages() {
            println!(
                "Successfully traced {} flow lines",
                flow_line_set.number_of_flow_lines()
            );
            let counts = flow_line_set.count_stopping_causes();
            for cause in StoppingCause::all() {
                if let Some(count) = counts.get(&cause) {
                    println!("{:>8} stopped by {}", count, cause);
                }
            }
        }
        flow_line_set
    }

    /// Creates a set from flow lines that have already been traced.
    pub fn from_flow_lines(flow_lines: Vec<FlowLineData3>) -> Self {
        Self { flow_lines }
    }

    /// Returns the number of flow lines in the set.
    pub fn number_of_flow_lines(&self) -> usize {
        self.flow_lines.len()
    }

    /// Returns a reference to the flow lines in the set.
    pub fn flow_lines(&self) -> &[FlowLineData3] {
        &self.flow_lines
    }

    pub fn into_flow_lines(self) -> Vec<FlowLineData3> {
        self.flow_lines
    }

    /// Counts how many flow lines were terminated for each stopping cause.
    pub fn count_stopping_causes(&self) -> HashMap<StoppingCause, usize> {
        let mut counts = HashMap::new();
        for flow_line in &self.flow_lines {
            *counts.entry(flow_line.stopping_cause()).or_insert(0) += 1;
        }
        counts
    }

    /// Hands every flow line in the set to the given sink, in order.
    pub fn send_to<K: FlowLineSink3>(&self, sink: &mut K) {
        for flow_line in &self.flow_lines {
            sink.accept(flow_line);
        }
    }

    /// Serializes the flow line data into pickle format and saves at the given path.
    #[cfg(feature = "pickle")]
    pub fn save_as_pickle<P: AsRef<Path>>(&self, file_path: P) -> io::Result<()> {
        utils::save_data_as_pickle(file_path, &self.flow_lines)
    }

    /// Serializes the flow line data into JSON format and saves at the given path.
    #[cfg(feature = "json")]
    pub fn save_as_json<P: AsRef<Path>>(&self, file_path: P) -> io::Result<()> {
        utils::save_data_as_json(file_path, &self.flow_lines)
    }
}

#[cfg(test)]
mod tests {

    use super::{tracer::FlowLineTracerConfig, *};
    use crate::{
        field::VectorField3,
        geometry::{
            Dim3::{X, Y},
            In3D, Vec3,
        },
        grid::GridRegion3,
        interpolation::trilinear::TrilinearInterpolator3,
        tracing::seeding::RegularSeeder3,
    };
    use std::sync::Arc;

    fn swirling_field() -> VectorField3<f64> {
        let region = Arc::new(GridRegion3::new(
            In3D::same(8),
            Point3::origin(),
            Vec3::new(1.0, 1.0, 1.0),
        ));
        VectorField3::from_fn("u".to_string(), region, |point| {
            Vec3::new(-(point[Y] - 4.0), point[X] - 4.0, 0.3)
        })
    }

    #[test]
    fn parallel_tracing_matches_sequential_tracing() {
        let field = swirling_field();
        let tracer = FlowLineTracer3::new(FlowLineTracerConfig {
            max_steps: 50,
            ..FlowLineTracerConfig::default()
        });
        let seeder = RegularSeeder3::from_cell_centers(field.region(), &In3D::same(3));
        let seed_points = seeder.seed_points().to_vec();

        let flow_line_set = FlowLineSet3::trace(
            seeder,
            &tracer,
            &field,
            &TrilinearInterpolator3,
            &Verbosity::Quiet,
        );

        assert_eq!(flow_line_set.number_of_flow_lines(), seed_points.len());
        for (flow_line, seed_point) in flow_line_set.flow_lines().iter().zip(seed_points.iter()) {
            let sequential = tracer.trace(
                &field,
                &TrilinearInterpolator3,
                seed_point,
                TracingSense::Downstream,
            );
            assert_eq!(flow_line, &sequential);
        }
    }

    #[test]
    fn flow_lines_are_sent_to_sinks_in_order() {
        let field = swirling_field();
        let tracer = FlowLineTracer3::new(FlowLineTracerConfig::default());
        let seeds = vec![Point3::new(6.0, 4.0, 1.0), Point3::new(2.0, 4.0, 1.0)];
        let flow_line_set =
            FlowLineSet3::trace(seeds, &tracer, &field, &TrilinearInterpolator3, &Verbosity::Quiet);

        let mut received = Vec::new();
        flow_line_set.send_to(&mut received);
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].start_position(), &Point3::new(6.0, 4.0, 1.0));
        assert_eq!(received[1].start_position(), &Point3::new(2.0, 4.0, 1.0));

        let counts = flow_line_set.count_stopping_causes();
        assert_eq!(counts.values().sum::<usize>(), 2);
    }

    #[cfg(feature = "json")]
    #[test]
    fn flow_line_sets_can_be_saved_as_json() {
        let field = swirling_field();
        let tracer = FlowLineTracer3::new(FlowLineTracerConfig::default());
        let flow_line_set = FlowLineSet3::trace(
            vec![Point3::new(6.0, 4.0, 1.0)],
            &tracer,
            &field,
            &TrilinearInterpolator3,
            &Verbosity::Quiet,
        );
        let directory = tempfile::tempdir().unwrap();
        let file_path = directory.path().join("flow_lines.json");
        flow_line_set.save_as_json(&file_path).unwrap();

        let text = std::fs::read_to_string(&file_path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert!(parsed[0]["positions"].is_array());
    }
}
