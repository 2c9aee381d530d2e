//! The `flowtrace` crate traces flow lines through gridded 3D vector fields
//! using adaptive Cash-Karp integration.
pub mod accumulation;
pub mod field;
pub mod geometry;
pub mod grid;
pub mod interpolation;
pub mod io;
pub mod num;
pub mod tracing;
