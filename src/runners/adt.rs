//! Runs containers through the whole harness: the conformance checks first, then the complexity estimations.\
//! See `tests/std_containers.rs` for examples.

use crate::{
    adapter::AdtOperations,
    complexity::ComplexityEstimator,
    configs::{TestOptions, TestOptionsOverrides, Verbosity},
    conformance::ConformanceChecker,
    features::OUTPUT,
    lifecycle::LifecycleCounters,
    report::TestResult,
};
use std::sync::Arc;
use tracing::{debug, warn};


/// Runs [analyse_adt()] with the default [TestOptions] plus `overrides`, panicking if anything went wrong
/// -- so it may be used inside `#[test]`s.\
/// Complexity mismatches are retried as configured before being considered failures.
/// In case of rejection, a detailed run log with every failed assertion, measurement & lifecycle counter is issued.
pub fn test_adt<Ops: AdtOperations + ?Sized>(ops: &mut Ops, overrides: TestOptionsOverrides) -> TestResult {
    let options = match TestOptions::resolve(overrides) {
        Ok(options) => options,
        Err(error) => panic!("Invalid options for testing '{}': {}", ops.name(), error),
    };
    let result = analyse_adt(ops, &options);
    if !result.passed() {
        panic!("\n{}", result.render(Verbosity::Detailed));
    }
    result
}

/// Drives the container behind `ops` through the conformance checks and, if enabled, the complexity estimations,
/// reporting through [OUTPUT] as told by [TestOptions::verbosity].\
/// Each phase creates & destroys its own container instances and gets its lifecycle counters reset, so a failure in
/// one phase doesn't spoil the other.
pub fn analyse_adt<Ops: AdtOperations + ?Sized>(ops: &mut Ops, options: &TestOptions) -> TestResult {
    let container = ops.name().to_string();
    debug!(container = container.as_str(), ?options, "harness run started");
    if options.verbosity >= Verbosity::Summary {
        OUTPUT(&format!("Running '{}' through the {} conformance checks{}:\n",
                        container, options.policy, if options.estimate_complexity { " & complexity estimations" } else { "" }));
    }

    let counters = LifecycleCounters::new();
    let conformance = ConformanceChecker::new(options, Arc::clone(&counters)).run(ops);
    let complexity = options.estimate_complexity
        .then(|| ComplexityEstimator::new(options, Arc::clone(&counters)).estimate_all(ops));
    let result = TestResult { container, options: options.clone(), conformance, complexity };

    let failures = result.failures();
    if failures.is_empty() {
        debug!(container = result.container.as_str(), "harness run passed");
    } else {
        warn!(container = result.container.as_str(), failures = failures.len(), "harness run failed");
    }
    let rendering = result.render(options.verbosity);
    if !rendering.is_empty() {
        OUTPUT(&rendering);
        OUTPUT("\n");
    }
    result
}
