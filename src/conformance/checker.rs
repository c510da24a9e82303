//! Drives a container through the `Empty → Populated → Draining → Empty` cycle, asserting its observable
//! behavior matches the declared [OrderingPolicy] -- see [ConformanceChecker].

use super::types::*;
use crate::{
    adapter::{AdtError, AdtOperations, ScopedHandle},
    configs::TestOptions,
    lifecycle::{LifecycleCounters, TrackedValue},
};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, warn};


/// Runs the conformance phase over any [AdtOperations].\
/// The phase creates its own container instance and always destroys it -- even when a check fails, which aborts the
/// remaining checks. Lifecycle counters are reset when the phase starts and judged after the container is destroyed.
pub struct ConformanceChecker<'a> {
    options:  &'a TestOptions,
    counters: Arc<LifecycleCounters>,
}

impl<'a> ConformanceChecker<'a> {

    pub fn new(options: &'a TestOptions, counters: Arc<LifecycleCounters>) -> Self {
        Self { options, counters }
    }

    /// runs the phase with [Self::generate_values()]
    pub fn run<Ops: AdtOperations + ?Sized>(&self, ops: &mut Ops) -> ConformanceReport {
        let values = self.generate_values();
        self.run_with_values(ops, &values)
    }

    /// Seeded test data: distinct, shuffled values for the `FIFO`, `LIFO` & `Unordered` policies;
    /// values with repetitions for `Sorted`, so ties are exercised.
    pub fn generate_values(&self) -> Vec<i32> {
        let size = self.options.conformance_sample_size;
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        match self.options.policy {
            OrderingPolicy::Sorted(_) => {
                let distinct_values = (size / 2).max(1) as i32;
                (0..size).map(|_| rng.gen_range(0..distinct_values)).collect()
            },
            _ => {
                let mut values = (0..size as i32).collect::<Vec<_>>();
                values.shuffle(&mut rng);
                values
            },
        }
    }

    /// runs the phase inserting `values`, in order
    pub fn run_with_values<Ops: AdtOperations + ?Sized>(&self, ops: &mut Ops, values: &[i32]) -> ConformanceReport {
        let policy = self.options.policy;
        let mut report = ConformanceReport {
            container:           ops.name().to_string(),
            policy,
            inserted:            values.to_vec(),
            removed:             Vec::with_capacity(values.len()),
            checks:              Vec::with_capacity(ConformanceCheck::ALL.len()),
            lifecycle:           Default::default(),
            lifecycle_anomalies: Vec::new(),
            setup_error:         None,
            teardown_error:      None,
        };
        debug!(container = report.container.as_str(), %policy, values = values.len(), "conformance phase started");
        self.counters.reset();

        let mut values_built = 0;
        let mut steps = 0;
        match ScopedHandle::open(ops) {
            Err(error) => {
                warn!(container = report.container.as_str(), %error, "could not create the container");
                report.setup_error = Some(error);
            },
            Ok(mut scoped) => {
                let mut driver = Driver::new(&mut scoped, &self.counters, policy);
                let mut aborted = false;
                for check in ConformanceCheck::ALL.into_iter().filter(|check| *check != ConformanceCheck::LifecycleBalance) {
                    if aborted {
                        report.checks.push((check, CheckOutcome::Skipped));
                        continue;
                    }
                    let outcome = match check {
                        ConformanceCheck::EmptyBoundary    => driver.empty_boundary(),
                        ConformanceCheck::Population       => driver.populate(values),
                        ConformanceCheck::DrainOrder       => driver.drain(values),
                        ConformanceCheck::DrainedEmptiness => driver.drained_emptiness(),
                        ConformanceCheck::ReuseAfterDrain  => driver.reuse(values),
                        ConformanceCheck::LifecycleBalance => Ok(()),
                    };
                    match outcome {
                        Ok(()) => report.checks.push((check, CheckOutcome::Passed)),
                        Err(violation) => {
                            warn!(container = report.container.as_str(), check = check.as_str(), %violation, "conformance violation");
                            report.checks.push((check, CheckOutcome::Failed(violation)));
                            aborted = true;
                        },
                    }
                }
                values_built = driver.values_built;
                steps = driver.step;
                report.removed = std::mem::take(&mut driver.removed);
                if let Err(error) = scoped.close() {
                    warn!(container = report.container.as_str(), %error, "could not destroy the container");
                    report.teardown_error = Some(error);
                }
            },
        }

        report.lifecycle = self.counters.snapshot();
        report.lifecycle_anomalies = report.lifecycle.anomalies(values_built, self.options.copy_budget_per_item);
        let lifecycle_outcome = if report.setup_error.is_some() {
            CheckOutcome::Skipped
        } else if report.lifecycle_anomalies.is_empty() {
            CheckOutcome::Passed
        } else {
            CheckOutcome::Failed(ConformanceViolation {
                step:      steps + 1,
                operation: "destroy",
                state:     ContainerState::Empty,
                assertion: String::from("every tracked value must be released exactly once, without excess copies"),
                expected:  String::from("no lifecycle anomalies"),
                observed:  report.lifecycle_anomalies.iter().map(|anomaly| anomaly.to_string()).collect::<Vec<_>>().join("; "),
            })
        };
        if report.setup_error.is_some() {
            report.checks = ConformanceCheck::ALL.iter().map(|check| (*check, CheckOutcome::Skipped)).collect();
        } else {
            report.checks.push((ConformanceCheck::LifecycleBalance, lifecycle_outcome));
        }
        debug!(container = report.container.as_str(), passed = report.passed(), lifecycle = %report.lifecycle, "conformance phase finished");
        report
    }
}

/// Issues capability calls on behalf of the checks, counting steps & tracking the container state
struct Driver<'d, 'h, Ops: AdtOperations + ?Sized> {
    scoped:       &'d mut ScopedHandle<'h, Ops>,
    counters:     &'d Arc<LifecycleCounters>,
    policy:       OrderingPolicy,
    step:         usize,
    state:        ContainerState,
    values_built: u64,
    removed:      Vec<i32>,
}

impl<'d, 'h, Ops: AdtOperations + ?Sized> Driver<'d, 'h, Ops> {

    fn new(scoped: &'d mut ScopedHandle<'h, Ops>, counters: &'d Arc<LifecycleCounters>, policy: OrderingPolicy) -> Self {
        Self { scoped, counters, policy, step: 0, state: ContainerState::Empty, values_built: 0, removed: Vec::new() }
    }

    fn empty_boundary(&mut self) -> Result<(), ConformanceViolation> {
        self.expect_size(0)?;
        self.expect_empty("a fresh container has nothing to give")
    }

    fn populate(&mut self, values: &[i32]) -> Result<(), ConformanceViolation> {
        for (order, value) in values.iter().enumerate() {
            self.insert(*value, order as i32)?;
            self.expect_size(order + 1)?;
            let peeked = self.peek()?;
            let inserted = &values[..=order];
            match expected_front(self.policy, inserted) {
                Some(front) if front != peeked =>
                    return Err(self.violation("peek", format!("{} front after inserting {:?}", self.policy, inserted), front, peeked)),
                None if !inserted.contains(&peeked) =>
                    return Err(self.violation("peek", "peek shows an inserted value", format!("one of {:?}", inserted), peeked)),
                _ => {},
            }
        }
        Ok(())
    }

    fn drain(&mut self, values: &[i32]) -> Result<(), ConformanceViolation> {
        let mut remaining = values.to_vec();
        let mut previous: Option<i32> = None;
        for k in 0..values.len() {
            let peeked = self.peek()?;
            let removed = self.remove()?;
            self.state = if k + 1 == values.len() { ContainerState::Empty } else { ContainerState::Draining };
            if removed != peeked {
                return Err(self.violation("remove", "remove gives back what peek showed", peeked, removed));
            }
            match remaining.iter().position(|value| *value == removed) {
                Some(position) => { remaining.remove(position); },
                None => return Err(self.violation("remove", "removed values were inserted and not yet removed",
                                                  format!("one of the {} values still inside", remaining.len()), removed)),
            }
            match self.policy {
                OrderingPolicy::Fifo if removed != values[k] =>
                    return Err(self.violation("remove", format!("FIFO removal #{}", k + 1), values[k], removed)),
                OrderingPolicy::Lifo if removed != values[values.len() - 1 - k] =>
                    return Err(self.violation("remove", format!("LIFO removal #{}", k + 1), values[values.len() - 1 - k], removed)),
                OrderingPolicy::Sorted(direction) => {
                    if let Some(previous) = previous {
                        let in_order = match direction {
                            SortDirection::Ascending  => previous <= removed,
                            SortDirection::Descending => previous >= removed,
                        };
                        if !in_order {
                            let relation = if direction == SortDirection::Ascending { ">=" } else { "<=" };
                            return Err(self.violation("remove", format!("{} removal #{}", self.policy, k + 1),
                                                      format!("a value {} {}", relation, previous), removed));
                        }
                    }
                },
                _ => {},
            }
            previous = Some(removed);
            self.expect_size(values.len() - k - 1)?;
        }
        Ok(())
    }

    fn drained_emptiness(&mut self) -> Result<(), ConformanceViolation> {
        self.expect_size(0)?;
        self.expect_empty("a drained container has nothing to give")?;
        self.expect_empty("emptiness is repeatable until the next insert")
    }

    fn reuse(&mut self, values: &[i32]) -> Result<(), ConformanceViolation> {
        let value = values.first().copied().unwrap_or_default();
        self.insert(value, values.len() as i32)?;
        let peeked = self.peek()?;
        if peeked != value {
            return Err(self.violation("peek", "the only element is in front", value, peeked));
        }
        let removed = self.remove()?;
        self.state = ContainerState::Empty;
        if removed != value {
            return Err(self.violation("remove", "the only element is removed", value, removed));
        }
        self.expect_empty("emptied again after reuse")
    }

    fn insert(&mut self, value: i32, order: i32) -> Result<(), ConformanceViolation> {
        self.step += 1;
        self.values_built += 1;
        let tracked = TrackedValue::new(value, order, self.counters);
        match self.scoped.insert(tracked) {
            Ok(()) => {
                if self.state == ContainerState::Empty {
                    self.state = ContainerState::Populated;
                }
                Ok(())
            },
            Err(error) => Err(self.violation("insert", format!("inserting {} succeeds", value), "ok", error)),
        }
    }

    fn peek(&mut self) -> Result<i32, ConformanceViolation> {
        self.step += 1;
        let peeked = self.scoped.peek().map(TrackedValue::value);
        peeked.map_err(|error| self.violation("peek", "peeking a non-empty container succeeds", "a value", error))
    }

    fn remove(&mut self) -> Result<i32, ConformanceViolation> {
        self.step += 1;
        match self.scoped.remove() {
            Ok(tracked) => {
                let value = tracked.value();
                self.removed.push(value);
                Ok(value)
            },
            Err(error) => Err(self.violation("remove", "removing from a non-empty container succeeds", "a value", error)),
        }
    }

    /// both `remove()` & `peek()` must fail with [AdtError::Empty]
    fn expect_empty(&mut self, assertion: &str) -> Result<(), ConformanceViolation> {
        self.step += 1;
        match self.scoped.remove() {
            Err(AdtError::Empty) => {},
            Ok(tracked) => {
                let value = tracked.value();
                self.removed.push(value);
                return Err(self.violation("remove", assertion, AdtError::Empty, format!("value {}", value)));
            },
            Err(error) => return Err(self.violation("remove", assertion, AdtError::Empty, error)),
        }
        self.step += 1;
        let peeked = self.scoped.peek().map(TrackedValue::value);
        match peeked {
            Err(AdtError::Empty) => Ok(()),
            Ok(value)            => Err(self.violation("peek", assertion, AdtError::Empty, format!("value {}", value))),
            Err(error)           => Err(self.violation("peek", assertion, AdtError::Empty, error)),
        }
    }

    /// verifies the size bookkeeping, for containers that report their sizes
    fn expect_size(&mut self, expected: usize) -> Result<(), ConformanceViolation> {
        self.step += 1;
        match self.scoped.size() {
            Ok(None) => Ok(()),
            Ok(Some(size)) if size == expected => Ok(()),
            Ok(Some(size)) => Err(self.violation("size", "size bookkeeping", expected, size)),
            Err(error) => Err(self.violation("size", "size bookkeeping", expected, error)),
        }
    }

    fn violation(&self, operation: &'static str, assertion: impl Into<String>, expected: impl ToString, observed: impl ToString) -> ConformanceViolation {
        ConformanceViolation {
            step:      self.step,
            operation,
            state:     self.state,
            assertion: assertion.into(),
            expected:  expected.to_string(),
            observed:  observed.to_string(),
        }
    }
}

/// the value the policy puts in front, after `inserted` -- `None` if the policy doesn't say
fn expected_front(policy: OrderingPolicy, inserted: &[i32]) -> Option<i32> {
    match policy {
        OrderingPolicy::Unordered                       => None,
        OrderingPolicy::Fifo                            => inserted.first().copied(),
        OrderingPolicy::Lifo                            => inserted.last().copied(),
        OrderingPolicy::Sorted(SortDirection::Ascending)  => inserted.iter().min().copied(),
        OrderingPolicy::Sorted(SortDirection::Descending) => inserted.iter().max().copied(),
    }
}
