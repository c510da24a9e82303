//! Defines the enums & structs produced by the complexity estimation.

use crate::{
    adapter::AdtError,
    lifecycle::{LifecycleAnomaly, LifecycleSnapshot},
};
use std::{
    fmt::{Display, Formatter},
    time::Duration,
};


/// Possible time complexity estimation results, in big-O notation, for a single operation on a container holding `n` elements
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ComplexityClass {
    O1,
    ON,
    ONLogN,
    ON2,
    /// no candidate class fitted a majority of the measurements
    Undetermined,
    /// less than 3 usable measurements
    InsufficientData,
}

impl ComplexityClass {

    /// the classes measurements are fitted against, from the cheapest to the most expensive
    pub const CANDIDATES: [ComplexityClass; 4] = [Self::O1, Self::ON, Self::ONLogN, Self::ON2];

    /// the growth function for this class, evaluated at `n` -- `None` for the non-fittable results
    pub fn growth(&self, n: f64) -> Option<f64> {
        match self {
            Self::O1               => Some(1.0),
            Self::ON               => Some(n),
            Self::ONLogN           => Some(n * n.max(2.0).log2()),
            Self::ON2              => Some(n * n),
            Self::Undetermined |
            Self::InsufficientData => None,
        }
    }

    /// verbose description for each enum element
    pub fn as_pretty_str(&self) -> &'static str {
        match self {
            Self::O1               => "O(1)",
            Self::ON               => "O(n)",
            Self::ONLogN           => "O(n.log(n))",
            Self::ON2              => "O(n²)",
            Self::Undetermined     => "Undetermined",
            Self::InsufficientData => "Insufficient data",
        }
    }

    /// same as [Self::as_pretty_str()], with additional info for time analysis
    pub fn as_time_pretty_str(&self) -> &'static str {
        match self {
            Self::Undetermined     => "Undetermined -- no class fitted the time growth: are the machines idle? too short execution times?",
            Self::InsufficientData => "Insufficient data -- less than 3 input sizes could be measured",
            _ => self.as_pretty_str(),
        }
    }
}

impl Display for ComplexityClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_pretty_str())
    }
}

/// The container capabilities whose complexities are estimated
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum OperationKind {
    Insert,
    Peek,
    Remove,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [Self::Insert, Self::Peek, Self::Remove];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Peek   => "peek",
            Self::Remove => "remove",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measurement: the median time it took to run `operations` consecutive `operation`s on a container of `input_size` elements
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ComplexitySample {
    pub operation:  OperationKind,
    pub input_size: usize,
    /// median, across repetitions, of the time each batch of `operations` took
    pub elapsed:    Duration,
    /// batch size -- operations timed together in each repetition
    pub operations: u32,
}

impl ComplexitySample {
    /// the time for a single operation, in nanoseconds
    pub fn nanos_per_operation(&self) -> f64 {
        self.elapsed.as_nanos() as f64 / self.operations.max(1) as f64
    }
}

impl Display for ComplexitySample {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "n={:>10}  Δt={:>12?}  Σops={:>6}  t⁻={:>12.3}ns",
               self.input_size, self.elapsed, self.operations, self.nanos_per_operation())
    }
}

/// How well a candidate class explains a series of samples -- see [super::fit()]
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ClassFit {
    pub class:         ComplexityClass,
    /// sum, over consecutive sample pairs, of |ln(observed ratio / predicted ratio)|
    pub total_error:   f64,
    /// consecutive pairs whose predicted/observed ratio fell within the tolerance band
    pub fitting_pairs: usize,
    pub pairs:         usize,
}

/// The estimated complexity of an operation, with the measurements it came from
#[derive(Debug, Clone)]
pub struct ComplexityEstimate {
    pub operation: OperationKind,
    pub class:     ComplexityClass,
    /// the class declared in the options, if any
    pub expected:  Option<ComplexityClass>,
    pub samples:   Vec<ComplexitySample>,
    /// input sizes that could not be measured, with the reason
    pub failures:  Vec<(usize, AdtError)>,
    /// number of sweeps it took -- more than 1 if mismatches were retried
    pub attempts:  u32,
}

impl ComplexityEstimate {
    /// `None` if nothing was expected, otherwise whether the estimation confirmed the expectation
    pub fn matches_expectation(&self) -> Option<bool> {
        self.expected.map(|expected| expected == self.class)
    }
}

impl Display for ComplexityEstimate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "--> '{}' time complexity: {}", self.operation, self.class.as_time_pretty_str())?;
        match self.expected {
            Some(expected) if expected == self.class => write!(f, " (as expected)")?,
            Some(expected) => write!(f, " (expected {})", expected)?,
            None => {},
        }
        if self.attempts > 1 {
            write!(f, " after {} attempts", self.attempts)?;
        }
        Ok(())
    }
}

/// Everything observed during the complexity estimation phase of a container
#[derive(Debug, Clone)]
pub struct ComplexityReport {
    pub container:           String,
    /// one estimate per [OperationKind], in [OperationKind::ALL] order
    pub estimates:           Vec<ComplexityEstimate>,
    /// lifecycle counters, read after every measured container was destroyed
    pub lifecycle:           LifecycleSnapshot,
    pub lifecycle_anomalies: Vec<LifecycleAnomaly>,
}

impl ComplexityReport {
    pub fn estimate(&self, operation: OperationKind) -> Option<&ComplexityEstimate> {
        self.estimates.iter().find(|estimate| estimate.operation == operation)
    }

    /// the estimates that contradict a declared expectation
    pub fn mismatches(&self) -> impl Iterator<Item=&ComplexityEstimate> {
        self.estimates.iter().filter(|estimate| estimate.matches_expectation() == Some(false))
    }
}

impl Display for ComplexityReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "'{}' complexity estimation:", self.container)?;
        for estimate in &self.estimates {
            writeln!(f, "  {}", estimate)?;
            for (input_size, error) in &estimate.failures {
                writeln!(f, "      ** n={} could not be measured: {}", input_size, error)?;
            }
        }
        for anomaly in &self.lifecycle_anomalies {
            writeln!(f, "  ** lifecycle anomaly: {}", anomaly)?;
        }
        Ok(())
    }
}
