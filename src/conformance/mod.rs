//! Behavioral conformance of containers to their declared [OrderingPolicy].
//!
//! The [ConformanceChecker] drives a fresh container instance through its whole state cycle, asserting, at each step,
//! what the policy and the uniform error codes dictate. Example:
//! ```
//! use adt_conformance::{
//!     adapter::{OperationTable, containers::QueueArray},
//!     configs::{TestOptions, TestOptionsOverrides},
//!     conformance::{ConformanceChecker, OrderingPolicy},
//!     lifecycle::LifecycleCounters,
//! };
//! let options = TestOptions::resolve(TestOptionsOverrides { policy: Some(OrderingPolicy::Fifo), ..Default::default() }).unwrap();
//! let mut queue = OperationTable::<QueueArray>::for_container("QueueArray");
//! let report = ConformanceChecker::new(&options, LifecycleCounters::new())
//!     .run_with_values(&mut queue, &[3, 1, 2]);
//! assert!(report.passed());
//! assert_eq!(&report.removed[..3], &[3, 1, 2]);
//! ```

mod types;
pub use types::*;

mod checker;
pub use checker::*;
