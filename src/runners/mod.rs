//! Contains the orchestrators of the harness: they sequence the [crate::conformance] checks and the
//! [crate::complexity] estimations over a container, aggregating both into a [crate::report::TestResult]

pub mod adt;
pub use adt::*;
