//! Applies the harness to containers built over Rust's std lib collections -- well behaved and otherwise

use adt_conformance::{
    adapter::containers::*,
    conformance::{CheckOutcome, ConformanceCheck},
    lifecycle::LifecycleAnomaly,
    *,
};
use ctor::ctor;
use serial_test::serial;
use std::collections::VecDeque;
use tracing_subscriber::EnvFilter;


/// Sets up the ENV, affecting the Rust's test runner, and the `tracing` subscriber (filtered by `RUST_LOG`)
#[ctor]
fn setup_env() {
    // cause tests to run serially -- `#[serial]` is also used, for the benefit of the unit tests
    std::env::set_var("RUST_TEST_THREADS", "1");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// quick sweeps, for the containers whose complexities are not under scrutiny
fn overrides(policy: OrderingPolicy) -> TestOptionsOverrides {
    TestOptionsOverrides {
        policy:                    Some(policy),
        input_sizes:               Some(vec![500, 1_000, 2_000]),
        repetitions:               Some(7),
        operations_per_repetition: Some(32),
        copy_budget_per_item:      Some(0),
        ..TestOptionsOverrides::default()
    }
}

/// Attests the std based stacks: `Vec` & `LinkedList`
#[test]
#[serial]
fn stacks() {
    test_adt(&mut OperationTable::<StackArray>::for_container("Vec stack"), overrides(OrderingPolicy::Lifo));
    test_adt(&mut OperationTable::<StackLinkedList>::for_container("LinkedList stack"), overrides(OrderingPolicy::Lifo));
}

/// Attests the std based queues: `VecDeque`, `LinkedList` & the queue made of two `Vec` stacks
#[test]
#[serial]
fn queues() {
    test_adt(&mut OperationTable::<QueueArray>::for_container("VecDeque queue"), overrides(OrderingPolicy::Fifo));
    test_adt(&mut OperationTable::<QueueLinkedList>::for_container("LinkedList queue"), overrides(OrderingPolicy::Fifo));
    test_adt(&mut OperationTable::<QueueStacks>::for_container("two stacks queue"), overrides(OrderingPolicy::Fifo));
}

/// Attests the `BinaryHeap` based priority queues, in both directions
#[test]
#[serial]
fn priority_queues() {
    let result = test_adt(&mut OperationTable::<MinPriorityQueue>::for_container("BinaryHeap min queue"),
                          overrides(OrderingPolicy::Sorted(SortDirection::Ascending)));
    assert!(result.conformance.lifecycle.comparisons() > 0, "heaps compare their elements");
    test_adt(&mut OperationTable::<MaxPriorityQueue>::for_container("BinaryHeap max queue"),
             overrides(OrderingPolicy::Sorted(SortDirection::Descending)));
}

/// Every container satisfies the `Unordered` policy
#[test]
#[serial]
fn unordered() {
    let unordered = || TestOptionsOverrides { estimate_complexity: Some(false), ..overrides(OrderingPolicy::Unordered) };
    test_adt(&mut OperationTable::<StackArray>::for_container("Vec stack"), unordered());
    test_adt(&mut OperationTable::<QueueStacks>::for_container("two stacks queue"), unordered());
    test_adt(&mut OperationTable::<MaxPriorityQueue>::for_container("BinaryHeap max queue"), unordered());
}


/// A priority queue kept as a sorted `Vec` -- the greatest at the end: `O(n)` inserts, `O(1)` removals
struct SortedVec(Vec<TrackedValue>);
impl Container for SortedVec {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self(Vec::new()))
    }
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        let position = self.0.iter().position(|element| element > &value).unwrap_or(self.0.len());
        self.0.insert(position, value);
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        self.0.pop()
    }
    fn peek(&self) -> Option<&TrackedValue> {
        self.0.last()
    }
    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Linear scans are measured as such
#[test]
#[serial]
fn sorted_vec_inserts_are_linear() {
    let result = test_adt(&mut OperationTable::<SortedVec>::for_container("sorted Vec"), TestOptionsOverrides {
        policy:                    Some(OrderingPolicy::Sorted(SortDirection::Descending)),
        operations_per_repetition: Some(16),
        expected_insert:           Some(ComplexityClass::ON),
        ..TestOptionsOverrides::default()
    });
    assert_eq!(result.complexity_of(OperationKind::Insert), Some(ComplexityClass::ON));
}


/// A queue that stores copies of what it receives
struct CopyingQueue(VecDeque<TrackedValue>);
impl Container for CopyingQueue {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self(VecDeque::new()))
    }
    #[allow(clippy::redundant_clone)]
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        self.0.push_back(value.clone());
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        self.0.pop_front()
    }
    fn peek(&self) -> Option<&TrackedValue> {
        self.0.front()
    }
    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Hidden copies go unnoticed by the ordering checks, but not by the copy budget
#[test]
#[serial]
fn hidden_copies_are_caught() {
    let options = TestOptions::resolve(TestOptionsOverrides {
        estimate_complexity: Some(false),
        verbosity:           Some(Verbosity::Quiet),
        ..overrides(OrderingPolicy::Fifo)
    }).expect("valid options");
    let result = analyse_adt(&mut OperationTable::<CopyingQueue>::for_container("copying queue"), &options);
    assert!(!result.passed());
    for check in [ConformanceCheck::EmptyBoundary, ConformanceCheck::Population, ConformanceCheck::DrainOrder] {
        assert_eq!(result.conformance.outcome(check), Some(&CheckOutcome::Passed));
    }
    assert!(matches!(result.conformance.outcome(ConformanceCheck::LifecycleBalance), Some(CheckOutcome::Failed(_))));
    let values = options.conformance_sample_size as u64 + 1;
    assert_eq!(result.conformance.lifecycle_anomalies, vec![LifecycleAnomaly::CopyBudgetExceeded { items: values, copies: values, budget: 0 }]);
    assert_eq!(result.lifecycle_anomalies(), 1);
}


/// A stack that forgets to release whatever is left inside when destroyed
struct LeakyStack(Vec<TrackedValue>);
impl Drop for LeakyStack {
    fn drop(&mut self) {
        for value in self.0.drain(..) {
            std::mem::forget(value);
        }
    }
}
impl Container for LeakyStack {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self(Vec::new()))
    }
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        self.0.push(value);
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        self.0.pop()
    }
    fn peek(&self) -> Option<&TrackedValue> {
        self.0.last()
    }
    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Leaks are only visible after the container is destroyed -- here, after the ordering checks fail
#[test]
#[serial]
fn leaks_are_caught() {
    let options = TestOptions::resolve(TestOptionsOverrides {
        estimate_complexity: Some(false),
        verbosity:           Some(Verbosity::Quiet),
        ..overrides(OrderingPolicy::Fifo)
    }).expect("valid options");
    let mut table = OperationTable::<LeakyStack>::for_container("leaky stack");
    let result = analyse_adt(&mut table, &options);
    let failures = result.failures();
    assert_eq!(failures.len(), 2, "{}", result.render(Verbosity::Detailed));
    assert!(matches!(&failures[0], FailedAssertion::Conformance { check: ConformanceCheck::Population, .. }));
    // the population check fails on the 2nd insert, leaving 2 elements inside
    assert!(matches!(&failures[1], FailedAssertion::Conformance { check: ConformanceCheck::LifecycleBalance, .. }));
    assert!(result.conformance.lifecycle_anomalies.contains(&LifecycleAnomaly::Leaked { live: 2 }));
    assert_eq!(table.live_instances(), 0, "the handle is destroyed even if the container misbehaves");
}

/// Panics inside the container are reported as failed assertions
#[test]
#[serial]
fn panicking_containers_are_contained() {
    let mut table = OperationTable::<StackArray>::builder("stack with an unfinished peek")
        .create(StackArray::try_new)
        .destroy(drop)
        .insert(StackArray::insert)
        .remove(StackArray::remove)
        .peek(|_| unimplemented!("peek"))
        .build()
        .expect("all capabilities were given");
    let options = TestOptions::resolve(TestOptionsOverrides {
        estimate_complexity: Some(false),
        verbosity:           Some(Verbosity::Quiet),
        ..overrides(OrderingPolicy::Lifo)
    }).expect("valid options");
    let result = analyse_adt(&mut table, &options);
    let (check, violation) = result.conformance.violations().next().expect("the peek panic must be reported");
    assert_eq!(check, ConformanceCheck::EmptyBoundary);
    assert_eq!(violation.operation, "peek");
    assert!(violation.observed.contains("peek"), "{}", violation);
    assert_eq!(AdtError::ContainerPanicked(String::new()).status_code(), -4);
    assert_eq!(table.live_instances(), 0);
}
