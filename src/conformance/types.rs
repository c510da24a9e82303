//! Defines the ordering policies containers are checked against and the reports the checks produce.

use crate::{
    adapter::AdtError,
    lifecycle::{LifecycleAnomaly, LifecycleSnapshot},
};
use std::fmt::{Display, Formatter};


/// Direction of a [OrderingPolicy::Sorted] container
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum SortDirection {
    /// smallest values are removed first -- a min priority queue
    Ascending,
    /// greatest values are removed first -- a max priority queue
    Descending,
}

/// The removal order a container declares to follow
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum OrderingPolicy {
    /// no ordering assertion -- only structural checks (emptiness, sizes, error codes, removing what was inserted)
    Unordered,
    /// removals follow the insertion order -- queues
    Fifo,
    /// removals follow the reverse of the insertion order -- stacks
    Lifo,
    /// removals are non-decreasing (or non-increasing) -- priority queues & heaps.
    /// Equal values may come out in any relative order.
    Sorted(SortDirection),
}

impl Display for OrderingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unordered                          => f.write_str("Unordered"),
            Self::Fifo                               => f.write_str("FIFO"),
            Self::Lifo                               => f.write_str("LIFO"),
            Self::Sorted(SortDirection::Ascending)   => f.write_str("Sorted (ascending)"),
            Self::Sorted(SortDirection::Descending)  => f.write_str("Sorted (descending)"),
        }
    }
}

/// Observable state of the container while it is driven:
/// `Empty → Populated → Draining → Empty`
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ContainerState {
    Empty,
    Populated,
    Draining,
}

impl Display for ContainerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty     => f.write_str("empty"),
            Self::Populated => f.write_str("populated"),
            Self::Draining  => f.write_str("draining"),
        }
    }
}

/// The groups of assertions the conformance phase is made of, in the order they run
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConformanceCheck {
    /// a fresh container refuses `remove()` & `peek()` with [AdtError::Empty]
    EmptyBoundary,
    /// every `insert()` succeeds and `peek()` shows the element the policy puts in front
    Population,
    /// `remove()`s follow the policy, agree with `peek()` and give back exactly what was inserted
    DrainOrder,
    /// once drained, `remove()` & `peek()` fail with [AdtError::Empty] -- repeatably
    DrainedEmptiness,
    /// the drained container is still usable
    ReuseAfterDrain,
    /// constructions & destructions balance once the container is destroyed -- see [LifecycleAnomaly]
    LifecycleBalance,
}

impl ConformanceCheck {
    pub const ALL: [ConformanceCheck; 6] = [
        Self::EmptyBoundary, Self::Population, Self::DrainOrder, Self::DrainedEmptiness, Self::ReuseAfterDrain, Self::LifecycleBalance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyBoundary    => "empty boundary",
            Self::Population       => "population",
            Self::DrainOrder       => "drain order",
            Self::DrainedEmptiness => "drained emptiness",
            Self::ReuseAfterDrain  => "reuse after drain",
            Self::LifecycleBalance => "lifecycle balance",
        }
    }
}

/// The first assertion that failed within the conformance phase -- which aborts the phase
#[derive(Debug, PartialEq, Clone)]
pub struct ConformanceViolation {
    /// 1-based count of capability calls made on the container when the assertion failed
    pub step:      usize,
    /// the capability whose outcome was asserted
    pub operation: &'static str,
    pub state:     ContainerState,
    /// what was being asserted
    pub assertion: String,
    pub expected:  String,
    pub observed:  String,
}

impl Display for ConformanceViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {} ('{}' on a {} container): {} -- expected {}, observed {}",
               self.step, self.operation, self.state, self.assertion, self.expected, self.observed)
    }
}

/// Outcome of each [ConformanceCheck]
#[derive(Debug, PartialEq, Clone)]
pub enum CheckOutcome {
    Passed,
    Failed(ConformanceViolation),
    /// not run, as an earlier check failed
    Skipped,
}

/// Everything observed during the conformance phase
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub container:           String,
    pub policy:              OrderingPolicy,
    /// values, in insertion order, driven through the container
    pub inserted:            Vec<i32>,
    /// values, in removal order, given back by the container
    pub removed:             Vec<i32>,
    pub checks:              Vec<(ConformanceCheck, CheckOutcome)>,
    /// lifecycle counters, read after the container was destroyed
    pub lifecycle:           LifecycleSnapshot,
    pub lifecycle_anomalies: Vec<LifecycleAnomaly>,
    /// the container could not be created -- no check ran
    pub setup_error:         Option<AdtError>,
    /// the container could not be destroyed
    pub teardown_error:      Option<AdtError>,
}

impl ConformanceReport {

    /// `true` if every check passed and the container was created & destroyed without errors
    pub fn passed(&self) -> bool {
        self.setup_error.is_none() &&
        self.teardown_error.is_none() &&
        self.checks.iter().all(|(_, outcome)| *outcome == CheckOutcome::Passed)
    }

    pub fn violations(&self) -> impl Iterator<Item=(ConformanceCheck, &ConformanceViolation)> {
        self.checks.iter()
            .filter_map(|(check, outcome)| match outcome {
                CheckOutcome::Failed(violation) => Some((*check, violation)),
                _ => None,
            })
    }

    pub fn outcome(&self, check: ConformanceCheck) -> Option<&CheckOutcome> {
        self.checks.iter()
            .find(|(checked, _)| *checked == check)
            .map(|(_, outcome)| outcome)
    }
}

impl Display for ConformanceReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "'{}' conformance to the {} policy, with {} values:", self.container, self.policy, self.inserted.len())?;
        if let Some(error) = &self.setup_error {
            writeln!(f, "  ** could not create the container: {}", error)?;
        }
        for (check, outcome) in &self.checks {
            match outcome {
                CheckOutcome::Passed             => writeln!(f, "  {:<18} passed", check.as_str())?,
                CheckOutcome::Skipped            => writeln!(f, "  {:<18} skipped", check.as_str())?,
                CheckOutcome::Failed(violation)  => writeln!(f, "  {:<18} FAILED at {}", check.as_str(), violation)?,
            }
        }
        for anomaly in &self.lifecycle_anomalies {
            writeln!(f, "  ** lifecycle anomaly: {}", anomaly)?;
        }
        if let Some(error) = &self.teardown_error {
            writeln!(f, "  ** could not destroy the container: {}", error)?;
        }
        Ok(())
    }
}
