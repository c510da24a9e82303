//! Run-scoped lifecycle event counters -- see [LifecycleCounters].

use std::{
    fmt::{Display, Formatter},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};


/// Every observable event in the life of a [super::TrackedValue].\
/// Each variant is a bucket in [LifecycleCounters].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum LifecycleEvent {
    DefaultConstruct,
    ValueConstruct,
    CopyConstruct,
    CopyAssign,
    MoveConstruct,
    MoveAssign,
    Destruct,
    CompareEq,
    CompareNeq,
    CompareLt,
    CompareLte,
    CompareGt,
    CompareGte,
    /// `cmp()` / `partial_cmp()` -- the way Rust's ordered collections compare
    ThreeWayCompare,
}

impl LifecycleEvent {

    /// number of event buckets
    pub const COUNT: usize = 14;

    /// all events, in bucket order
    pub const ALL: [LifecycleEvent; Self::COUNT] = [
        Self::DefaultConstruct, Self::ValueConstruct, Self::CopyConstruct, Self::CopyAssign,
        Self::MoveConstruct,    Self::MoveAssign,     Self::Destruct,
        Self::CompareEq,        Self::CompareNeq,     Self::CompareLt,     Self::CompareLte,
        Self::CompareGt,        Self::CompareGte,     Self::ThreeWayCompare,
    ];

    /// short label, used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultConstruct => "default-construct",
            Self::ValueConstruct   => "value-construct",
            Self::CopyConstruct    => "copy-construct",
            Self::CopyAssign       => "copy-assign",
            Self::MoveConstruct    => "move-construct",
            Self::MoveAssign       => "move-assign",
            Self::Destruct         => "destruct",
            Self::CompareEq        => "==",
            Self::CompareNeq       => "!=",
            Self::CompareLt        => "<",
            Self::CompareLte       => "<=",
            Self::CompareGt        => ">",
            Self::CompareGte       => ">=",
            Self::ThreeWayCompare  => "cmp",
        }
    }

    /// `true` for the events that bring a new value into existence
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::DefaultConstruct | Self::ValueConstruct | Self::CopyConstruct | Self::MoveConstruct)
    }

    /// `true` for relational comparisons
    pub fn is_comparison(&self) -> bool {
        matches!(self, Self::CompareEq | Self::CompareNeq | Self::CompareLt | Self::CompareLte |
                       Self::CompareGt | Self::CompareGte | Self::ThreeWayCompare)
    }

    fn bucket(&self) -> usize {
        *self as usize
    }
}

/// Counters for every [LifecycleEvent], shared (through an `Arc`) by all [super::TrackedValue]s of a test run.\
/// Counters are reset explicitly at phase boundaries -- see [Self::reset()] -- and read through [Self::snapshot()].
///
/// The harness is single threaded, but atomics keep tracked values `Send + Sync`, so containers requiring
/// those bounds may still be tested.
pub struct LifecycleCounters {
    counts: [AtomicU64; LifecycleEvent::COUNT],
}

impl LifecycleCounters {

    /// creates a zeroed set of counters, ready to be shared by the tracked values of a run
    pub fn new() -> Arc<Self> {
        #[allow(clippy::declare_interior_mutable_const)]
        const ZERO: AtomicU64 = AtomicU64::new(0);
        Arc::new(Self { counts: [ZERO; LifecycleEvent::COUNT] })
    }

    /// registers one occurrence of `event`
    #[inline]
    pub fn notify(&self, event: LifecycleEvent) {
        self.counts[event.bucket()].fetch_add(1, Ordering::Relaxed);
    }

    /// current count for `event`
    pub fn count(&self, event: LifecycleEvent) -> u64 {
        self.counts[event.bucket()].load(Ordering::Relaxed)
    }

    /// zeroes all buckets -- to be called at the start of each measured phase
    pub fn reset(&self) {
        for counter in &self.counts {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// an immutable copy of all buckets, as of now
    pub fn snapshot(&self) -> LifecycleSnapshot {
        let mut counts = [0u64; LifecycleEvent::COUNT];
        for (count, counter) in counts.iter_mut().zip(&self.counts) {
            *count = counter.load(Ordering::Relaxed);
        }
        LifecycleSnapshot { counts }
    }
}

/// A frozen view of [LifecycleCounters], from which the lifecycle balance of a phase is judged
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct LifecycleSnapshot {
    counts: [u64; LifecycleEvent::COUNT],
}

impl LifecycleSnapshot {

    pub fn count(&self, event: LifecycleEvent) -> u64 {
        self.counts[event.bucket()]
    }

    /// sum of default, value, copy & move constructions
    pub fn constructions(&self) -> u64 {
        LifecycleEvent::ALL.iter()
            .filter(|event| event.is_construction())
            .map(|event| self.count(*event))
            .sum()
    }

    pub fn destructions(&self) -> u64 {
        self.count(LifecycleEvent::Destruct)
    }

    /// copy constructions + copy assignments
    pub fn copies(&self) -> u64 {
        self.count(LifecycleEvent::CopyConstruct) + self.count(LifecycleEvent::CopyAssign)
    }

    /// move constructions + move assignments
    pub fn moves(&self) -> u64 {
        self.count(LifecycleEvent::MoveConstruct) + self.count(LifecycleEvent::MoveAssign)
    }

    pub fn comparisons(&self) -> u64 {
        LifecycleEvent::ALL.iter()
            .filter(|event| event.is_comparison())
            .map(|event| self.count(*event))
            .sum()
    }

    /// values constructed but not yet destructed -- negative if more destructions than constructions were seen
    pub fn live(&self) -> i64 {
        self.constructions() as i64 - self.destructions() as i64
    }

    /// Judges the phase this snapshot closes, provided no tracked values of the phase are still held by anyone:
    ///   - `expected_value_constructs` is the number of values the harness itself built;
    ///   - `copy_budget_per_item`, if given, limits how many copies each of those values may cause.
    pub fn anomalies(&self, expected_value_constructs: u64, copy_budget_per_item: Option<u32>) -> Vec<LifecycleAnomaly> {
        let mut anomalies = Vec::new();
        let live = self.live();
        if live > 0 {
            anomalies.push(LifecycleAnomaly::Leaked { live: live as u64 });
        } else if live < 0 {
            anomalies.push(LifecycleAnomaly::DoubleRelease { excess: live.unsigned_abs() });
        }
        let value_constructs = self.count(LifecycleEvent::ValueConstruct);
        if value_constructs != expected_value_constructs {
            anomalies.push(LifecycleAnomaly::UnexpectedValueConstructs { expected: expected_value_constructs, observed: value_constructs });
        }
        if let Some(budget) = copy_budget_per_item {
            let copies = self.copies();
            if copies > expected_value_constructs * budget as u64 {
                anomalies.push(LifecycleAnomaly::CopyBudgetExceeded { items: expected_value_constructs, copies, budget });
            }
        }
        anomalies
    }
}

impl Display for LifecycleSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let buckets = LifecycleEvent::ALL.iter()
            .filter(|event| self.count(**event) > 0)
            .map(|event| format!("{}: {}", event.as_str(), self.count(*event)))
            .collect::<Vec<_>>();
        write!(f, "constructed: {}, destructed: {}, live: {}; copies: {}, moves: {}, comparisons: {}",
               self.constructions(), self.destructions(), self.live(), self.copies(), self.moves(), self.comparisons())?;
        if !buckets.is_empty() {
            write!(f, " [{}]", buckets.join(", "))?;
        }
        Ok(())
    }
}

/// An irregularity in the lifecycle of the tracked values of a phase
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LifecycleAnomaly {
    /// more constructions than destructions -- values were leaked or are still held
    Leaked { live: u64 },
    /// more destructions than constructions
    DoubleRelease { excess: u64 },
    /// the container built values of its own, or lost some of ours before they got to it
    UnexpectedValueConstructs { expected: u64, observed: u64 },
    /// copies went above `budget` per harness-built value
    CopyBudgetExceeded { items: u64, copies: u64, budget: u32 },
}

impl Display for LifecycleAnomaly {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaked { live }                                 => write!(f, "{} tracked value(s) were never destructed", live),
            Self::DoubleRelease { excess }                        => write!(f, "{} more destruction(s) than construction(s)", excess),
            Self::UnexpectedValueConstructs { expected, observed } => write!(f, "expected {} value construction(s), observed {}", expected, observed),
            Self::CopyBudgetExceeded { items, copies, budget }    => write!(f, "{} copies for {} item(s) -- over the budget of {} per item", copies, items, budget),
        }
    }
}
