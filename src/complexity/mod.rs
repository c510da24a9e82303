//! Empirical time complexity estimation for container operations.
//!
//! The [ComplexityEstimator] produces [ComplexitySample]s for increasing input sizes; [classify()] fits them to a
//! [ComplexityClass]:
//! ```
//! use adt_conformance::complexity::{classify, ComplexityClass};
//! let linear = [(10.0, 1.0), (100.0, 10.0), (1000.0, 100.0)];
//! assert_eq!(classify(&linear, 0.5), ComplexityClass::ON);
//! ```

mod types;
pub use types::*;

mod analysis;
pub use analysis::*;

mod estimator;
pub use estimator::*;
