//! Object lifecycle instrumentation: a [TrackedValue] notifies every construction, copy, relocation, destruction and comparison
//! to the [LifecycleCounters] of the run it belongs to, allowing the harness to detect hidden copies, leaks & double releases
//! inside containers it knows nothing about.
//!
//! Usage example:
//! ```rust
//!     use adt_conformance::lifecycle::{LifecycleCounters, TrackedValue};
//!     let counters = LifecycleCounters::new();
//!     let original = TrackedValue::new(42, 0, &counters);
//!     let copy = original.clone();
//!     drop((original, copy));
//!     let snapshot = counters.snapshot();
//!     assert_eq!(snapshot.copies(), 1);
//!     assert_eq!(snapshot.live(), 0);
//! ```

mod counters;
pub use counters::*;
mod tracked_value;
pub use tracked_value::*;
