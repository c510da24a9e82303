//! Times container operations over the configured sweep of input sizes -- see [ComplexityEstimator].

use super::{
    analysis::classify_samples,
    types::*,
};
use crate::{
    adapter::{AdtError, AdtOperations, ScopedHandle},
    configs::TestOptions,
    lifecycle::{LifecycleCounters, TrackedValue},
};
use keen_retry::{ResolvedResult, RetryProducerResult, RetryResult};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    cell::Cell,
    hint::black_box,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, trace, warn};


/// Estimates the time complexity of `insert()`, `peek()` & `remove()` of any [AdtOperations].
///
/// For each input size `n`, a fresh container is filled with `n` elements and the operation is timed in batches of
/// [TestOptions::operations_per_repetition] (capped by `n`), for [TestOptions::repetitions] times. Elements are put back
/// (or taken out) between repetitions, out of the clock, so every batch sees a container of size `n`.
/// The median batch time becomes the [ComplexitySample] for `n`.
///
/// When an estimation contradicts the expectation declared in [TestOptions::expected], it is redone, up to
/// [TestOptions::retry_attempts] times, waiting [TestOptions::retry_delay] before each new attempt.
pub struct ComplexityEstimator<'a> {
    options:      &'a TestOptions,
    counters:     Arc<LifecycleCounters>,
    values_built: Cell<u64>,
}

impl<'a> ComplexityEstimator<'a> {

    pub fn new(options: &'a TestOptions, counters: Arc<LifecycleCounters>) -> Self {
        Self { options, counters, values_built: Cell::new(0) }
    }

    /// Estimates every [OperationKind], judging the lifecycle of all tracked values built in the process
    pub fn estimate_all<Ops: AdtOperations + ?Sized>(&self, ops: &mut Ops) -> ComplexityReport {
        let container = ops.name().to_string();
        debug!(container = container.as_str(), input_sizes = ?self.options.input_sizes, "complexity estimation started");
        self.counters.reset();
        self.values_built.set(0);
        let estimates = OperationKind::ALL.iter()
            .map(|operation| self.estimate(ops, *operation))
            .collect();
        let lifecycle = self.counters.snapshot();
        let lifecycle_anomalies = lifecycle.anomalies(self.values_built.get(), self.options.copy_budget_per_item);
        debug!(container = container.as_str(), %lifecycle, "complexity estimation finished");
        ComplexityReport { container, estimates, lifecycle, lifecycle_anomalies }
    }

    /// Estimates the complexity of `operation`, retrying on mismatches with the declared expectation
    pub fn estimate<Ops: AdtOperations + ?Sized>(&self, ops: &mut Ops, operation: OperationKind) -> ComplexityEstimate {
        let attempts = Cell::new(0);
        let resolved = self.attempt(ops, operation, &attempts)
            .retry_with(|_| self.attempt(ops, operation, &attempts))
            .with_delays((0..self.options.retry_attempts).map(|_| self.options.retry_delay));
        match resolved {
            ResolvedResult::Ok { output, .. } => output,
            ResolvedResult::Recovered { output, .. } => output,
            ResolvedResult::Fatal { error, .. } => error,
            ResolvedResult::GivenUp { fatal_error, .. } => fatal_error,
            ResolvedResult::Unrecoverable { fatal_error, .. } => fatal_error,
        }
    }

    /// One sweep over all input sizes. Mismatches are transient -- worth another attempt -- unless there was not enough
    /// data to decide, in which case retrying won't help
    fn attempt<Ops: AdtOperations + ?Sized>(&self, ops: &mut Ops, operation: OperationKind, attempts: &Cell<u32>)
                                           -> RetryProducerResult<ComplexityEstimate, ComplexityEstimate> {
        attempts.set(attempts.get() + 1);
        let estimate = self.sweep(ops, operation, attempts.get());
        match (estimate.expected, estimate.class) {
            (Some(expected), observed) if expected != observed => {
                warn!(container = ops.name(), %operation, %expected, %observed, attempt = estimate.attempts, "complexity mismatch");
                if observed == ComplexityClass::InsufficientData {
                    RetryResult::Fatal { input: (), error: estimate }
                } else {
                    RetryResult::Transient { input: (), error: estimate }
                }
            },
            _ => RetryResult::Ok { reported_input: (), output: estimate },
        }
    }

    fn sweep<Ops: AdtOperations + ?Sized>(&self, ops: &mut Ops, operation: OperationKind, attempt: u32) -> ComplexityEstimate {
        let mut samples = Vec::with_capacity(self.options.input_sizes.len());
        let mut failures = Vec::new();
        for &input_size in &self.options.input_sizes {
            match self.measure(ops, operation, input_size) {
                Ok(sample) => {
                    trace!(container = ops.name(), %sample, "measured");
                    samples.push(sample);
                },
                Err(error) => {
                    warn!(container = ops.name(), %operation, input_size, %error, "could not measure");
                    failures.push((input_size, error));
                },
            }
        }
        let class = classify_samples(&samples, self.options.tolerance);
        debug!(container = ops.name(), %operation, %class, attempt, "complexity estimated");
        ComplexityEstimate {
            operation,
            class,
            expected: self.options.expected.for_operation(operation),
            samples,
            failures,
            attempts: attempt,
        }
    }

    /// Times `operation` on a fresh container filled with `input_size` elements.\
    /// Any failing capability call aborts the measurement -- the container is still destroyed.
    fn measure<Ops: AdtOperations + ?Sized>(&self, ops: &mut Ops, operation: OperationKind, input_size: usize) -> Result<ComplexitySample, AdtError> {
        let mut rng = StdRng::seed_from_u64(self.options.seed ^ input_size as u64);
        let mut scoped = ScopedHandle::open(ops)?;
        for _ in 0..input_size {
            scoped.insert(self.tracked(&mut rng))?;
        }
        let batch = (self.options.operations_per_repetition as usize).min(input_size);
        let mut timings = Vec::with_capacity(self.options.repetitions as usize);
        for _ in 0..self.options.repetitions {
            let elapsed = match operation {
                OperationKind::Insert => {
                    let values = (0..batch).map(|_| self.tracked(&mut rng)).collect::<Vec<_>>();
                    let start = Instant::now();
                    for value in values {
                        scoped.insert(black_box(value))?;
                    }
                    let elapsed = start.elapsed();
                    for _ in 0..batch {
                        drop(scoped.remove()?);
                    }
                    elapsed
                },
                OperationKind::Remove => {
                    let mut removed = Vec::with_capacity(batch);
                    let start = Instant::now();
                    for _ in 0..batch {
                        removed.push(black_box(scoped.remove()?));
                    }
                    let elapsed = start.elapsed();
                    for value in removed {
                        scoped.insert(value)?;
                    }
                    elapsed
                },
                OperationKind::Peek => {
                    let mut checksum = 0;
                    let start = Instant::now();
                    for _ in 0..batch {
                        checksum ^= black_box(scoped.peek()?.value());
                    }
                    let elapsed = start.elapsed();
                    black_box(checksum);
                    elapsed
                },
            };
            timings.push(elapsed);
        }
        scoped.close()?;
        timings.sort_unstable();
        Ok(ComplexitySample {
            operation,
            input_size,
            elapsed:    timings.get(timings.len() / 2).copied().unwrap_or(Duration::ZERO),
            operations: batch as u32,
        })
    }

    fn tracked(&self, rng: &mut StdRng) -> TrackedValue {
        let order = self.values_built.get();
        self.values_built.set(order + 1);
        TrackedValue::new(rng.gen_range(0..i32::MAX), order as i32, &self.counters)
    }
}


#[cfg(test)]
mod tests {

    //! Unit tests for the [ComplexityEstimator](super::ComplexityEstimator) -- all timing dependent, hence `serial`.\
    //! Containers here simulate their costs with `spin_sleep`, so results don't depend on how fast the machine is.

    use super::*;
    use crate::{
        adapter::{Container, OperationTable},
        configs::TestOptionsOverrides,
    };
    use serial_test::serial;
    use std::collections::VecDeque;

    /// a queue whose operations cost a fixed time -- or a time proportional to its length, if `LINEAR`
    struct SimulatedCost<const LINEAR: bool> {
        items: VecDeque<TrackedValue>,
    }

    impl<const LINEAR: bool> SimulatedCost<LINEAR> {
        fn pay(&self) {
            let cost = if LINEAR { Duration::from_nanos(250 * self.items.len() as u64) } else { Duration::from_micros(40) };
            spin_sleep::sleep(cost);
        }
    }

    impl<const LINEAR: bool> Container for SimulatedCost<LINEAR> {
        fn try_new() -> Result<Self, AdtError> {
            Ok(Self { items: VecDeque::new() })
        }
        fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
            self.pay();
            self.items.push_back(value);
            Ok(())
        }
        fn remove(&mut self) -> Option<TrackedValue> {
            self.pay();
            self.items.pop_front()
        }
        fn peek(&self) -> Option<&TrackedValue> {
            self.pay();
            self.items.front()
        }
        fn len(&self) -> usize {
            self.items.len()
        }
    }

    /// fails to grow past 300 elements
    struct Bounded(Vec<TrackedValue>);
    impl Container for Bounded {
        fn try_new() -> Result<Self, AdtError> { Ok(Self(Vec::new())) }
        fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
            if self.0.len() >= 300 {
                return Err(AdtError::Allocation)
            }
            self.0.push(value);
            Ok(())
        }
        fn remove(&mut self) -> Option<TrackedValue> { self.0.pop() }
        fn peek(&self) -> Option<&TrackedValue> { self.0.last() }
        fn len(&self) -> usize { self.0.len() }
    }

    /// quick sweeps over `overrides`
    fn test_options(overrides: TestOptionsOverrides) -> TestOptions {
        TestOptions::resolve(TestOptionsOverrides {
            input_sizes:               overrides.input_sizes.clone().or(Some(vec![200, 400, 800])),
            repetitions:               overrides.repetitions.or(Some(5)),
            operations_per_repetition: overrides.operations_per_repetition.or(Some(8)),
            retry_delay:               overrides.retry_delay.or(Some(Duration::from_millis(1))),
            ..overrides
        }).expect("valid options")
    }

    #[test]
    #[serial]
    fn constant_and_linear_costs() {
        let options = test_options(TestOptionsOverrides {
            expected_insert: Some(ComplexityClass::O1),
            ..TestOptionsOverrides::default()
        });
        let estimator = ComplexityEstimator::new(&options, LifecycleCounters::new());
        let mut constant = OperationTable::<SimulatedCost<false>>::for_container("constant cost");
        let estimate = estimator.estimate(&mut constant, OperationKind::Insert);
        assert_eq!(estimate.class, ComplexityClass::O1, "{}", estimate);
        assert_eq!(estimate.matches_expectation(), Some(true));

        let mut linear = OperationTable::<SimulatedCost<true>>::for_container("linear cost");
        let options = test_options(TestOptionsOverrides {
            expected_remove: Some(ComplexityClass::ON),
            ..TestOptionsOverrides::default()
        });
        let estimator = ComplexityEstimator::new(&options, LifecycleCounters::new());
        let estimate = estimator.estimate(&mut linear, OperationKind::Remove);
        assert_eq!(estimate.class, ComplexityClass::ON, "{}", estimate);
        assert_eq!(estimate.samples.len(), 3);
        assert!(estimate.samples.iter().all(|sample| sample.operations == 8));
        assert_eq!(linear.live_instances(), 0);
    }

    #[test]
    #[serial]
    fn mismatches_are_retried_then_reported() {
        let options = test_options(TestOptionsOverrides {
            expected_peek:  Some(ComplexityClass::O1),
            retry_attempts: Some(2),
            ..TestOptionsOverrides::default()
        });
        let estimator = ComplexityEstimator::new(&options, LifecycleCounters::new());
        let mut linear = OperationTable::<SimulatedCost<true>>::for_container("linear cost");
        let estimate = estimator.estimate(&mut linear, OperationKind::Peek);
        assert_ne!(estimate.class, ComplexityClass::O1, "{}", estimate);
        assert_eq!(estimate.matches_expectation(), Some(false));
        assert_eq!(estimate.attempts, 3, "1 attempt + 2 retries");
    }

    #[test]
    #[serial]
    fn failing_sizes_leave_insufficient_data() {
        let options = test_options(TestOptionsOverrides {
            expected_insert: Some(ComplexityClass::O1),
            ..TestOptionsOverrides::default()
        });
        let estimator = ComplexityEstimator::new(&options, LifecycleCounters::new());
        let mut bounded = OperationTable::<Bounded>::for_container("bounded");
        let estimate = estimator.estimate(&mut bounded, OperationKind::Insert);
        assert_eq!(estimate.class, ComplexityClass::InsufficientData);
        assert_eq!(estimate.failures, vec![(400, AdtError::Allocation), (800, AdtError::Allocation)]);
        assert_eq!(estimate.attempts, 1, "retrying can't produce more data");
        assert_eq!(bounded.live_instances(), 0, "containers must be destroyed even when measurements fail");
    }

    #[test]
    #[serial]
    fn estimating_everything_keeps_the_lifecycle_balanced() {
        let options = test_options(TestOptionsOverrides {
            input_sizes: Some(vec![10, 20, 40]),
            ..TestOptionsOverrides::default()
        });
        let counters = LifecycleCounters::new();
        let estimator = ComplexityEstimator::new(&options, Arc::clone(&counters));
        let mut queue = OperationTable::<crate::adapter::containers::QueueArray>::for_container("QueueArray");
        let report = estimator.estimate_all(&mut queue);
        assert_eq!(report.estimates.iter().map(|estimate| estimate.operation).collect::<Vec<_>>(), OperationKind::ALL.to_vec());
        assert!(report.lifecycle_anomalies.is_empty(), "{}", report);
        assert_eq!(report.lifecycle.live(), 0);
        assert_eq!(report.lifecycle.copies(), 0);
        // 3 sizes for each of the 3 operations, plus the insert batches
        let prefilled = 3 * (10 + 20 + 40);
        let insert_batches = 5 * (8 + 8 + 8);
        assert_eq!(report.lifecycle.constructions(), (prefilled + insert_batches) as u64);
    }
}
