//! The aggregated outcome of a harness run -- [TestResult] -- and its renderings.

use crate::{
    adapter::AdtError,
    complexity::{ComplexityClass, ComplexityReport, OperationKind},
    configs::{TestOptions, Verbosity},
    conformance::{ConformanceCheck, ConformanceReport, ConformanceViolation},
    lifecycle::LifecycleAnomaly,
};
use std::fmt::{Display, Formatter, Write};


/// The phases of a run
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Phase {
    Conformance,
    ComplexityEstimation,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conformance          => f.write_str("conformance"),
            Self::ComplexityEstimation => f.write_str("complexity estimation"),
        }
    }
}

/// Each individual thing that went wrong in a run
#[derive(Debug, PartialEq, Clone)]
pub enum FailedAssertion {
    /// the container could not be created for the conformance phase
    Setup { error: AdtError },
    Conformance { check: ConformanceCheck, violation: ConformanceViolation },
    /// the container could not be destroyed at the end of the conformance phase
    Teardown { error: AdtError },
    /// lifecycle irregularities of the tracked values used for the complexity estimations --
    /// the conformance ones are reported as a [ConformanceCheck::LifecycleBalance] violation
    Lifecycle { phase: Phase, anomaly: LifecycleAnomaly },
    /// an input size that could not be measured
    Measurement { operation: OperationKind, input_size: usize, error: AdtError },
    ComplexityMismatch { operation: OperationKind, expected: ComplexityClass, observed: ComplexityClass, attempts: u32 },
}

impl Display for FailedAssertion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup { error } =>
                write!(f, "could not create the container: {}", error),
            Self::Conformance { check, violation } =>
                write!(f, "{} check failed at {}", check.as_str(), violation),
            Self::Teardown { error } =>
                write!(f, "could not destroy the container: {}", error),
            Self::Lifecycle { phase, anomaly } =>
                write!(f, "lifecycle anomaly during {}: {}", phase, anomaly),
            Self::Measurement { operation, input_size, error } =>
                write!(f, "'{}' could not be measured for n={}: {}", operation, input_size, error),
            Self::ComplexityMismatch { operation, expected, observed, attempts } =>
                write!(f, "'{}' complexity mismatch: expected {}, observed {} (after {} attempt(s))", operation, expected, observed, attempts),
        }
    }
}

/// Aggregate outcome of a run over one container: produced by [crate::runners::analyse_adt()], immutable
#[derive(Debug, Clone)]
pub struct TestResult {
    pub container:   String,
    pub options:     TestOptions,
    pub conformance: ConformanceReport,
    /// `None` if the estimation was disabled
    pub complexity:  Option<ComplexityReport>,
}

impl TestResult {

    /// `true` if nothing went wrong -- see [Self::failures()]
    pub fn passed(&self) -> bool {
        self.failures().is_empty()
    }

    /// every failed assertion of the run, in the order they happened
    pub fn failures(&self) -> Vec<FailedAssertion> {
        let mut failures = Vec::new();
        if let Some(error) = &self.conformance.setup_error {
            failures.push(FailedAssertion::Setup { error: error.clone() });
        }
        failures.extend(self.conformance.violations()
            .map(|(check, violation)| FailedAssertion::Conformance { check, violation: violation.clone() }));
        if let Some(error) = &self.conformance.teardown_error {
            failures.push(FailedAssertion::Teardown { error: error.clone() });
        }
        if let Some(complexity) = &self.complexity {
            for estimate in &complexity.estimates {
                failures.extend(estimate.failures.iter()
                    .map(|(input_size, error)| FailedAssertion::Measurement { operation: estimate.operation, input_size: *input_size, error: error.clone() }));
                if let Some(expected) = estimate.expected.filter(|expected| *expected != estimate.class) {
                    failures.push(FailedAssertion::ComplexityMismatch { operation: estimate.operation, expected, observed: estimate.class, attempts: estimate.attempts });
                }
            }
            failures.extend(complexity.lifecycle_anomalies.iter()
                .map(|anomaly| FailedAssertion::Lifecycle { phase: Phase::ComplexityEstimation, anomaly: anomaly.clone() }));
        }
        failures
    }

    /// `true` if every conformance check passed, regardless of the complexity estimations
    pub fn conformance_passed(&self) -> bool {
        self.conformance.passed()
    }

    /// the estimated complexity of `operation` -- `None` if the estimation was disabled
    pub fn complexity_of(&self, operation: OperationKind) -> Option<ComplexityClass> {
        self.complexity.as_ref()
            .and_then(|complexity| complexity.estimate(operation))
            .map(|estimate| estimate.class)
    }

    /// number of lifecycle anomalies observed across both phases
    pub fn lifecycle_anomalies(&self) -> usize {
        self.conformance.lifecycle_anomalies.len() +
        self.complexity.as_ref().map_or(0, |complexity| complexity.lifecycle_anomalies.len())
    }

    /// Renders this result with the amount of detail given by `verbosity`:
    ///   - [Verbosity::Quiet]: only the failures, if any;
    ///   - [Verbosity::Summary]: one line per check & per estimated operation, plus the failures;
    ///   - [Verbosity::Detailed]: also the values driven through the container, every measurement & the lifecycle counters.
    pub fn render(&self, verbosity: Verbosity) -> String {
        let mut text = String::new();
        // writing to a String never fails
        let _ = self.write_to(&mut text, verbosity);
        text
    }

    fn write_to(&self, text: &mut String, verbosity: Verbosity) -> std::fmt::Result {
        let failures = self.failures();
        if verbosity >= Verbosity::Summary {
            writeln!(text, "{}", self.conformance)?;
            if verbosity >= Verbosity::Detailed {
                writeln!(text, "  inserted:  {:?}", self.conformance.inserted)?;
                writeln!(text, "  removed:   {:?}", self.conformance.removed)?;
                writeln!(text, "  lifecycle: {}", self.conformance.lifecycle)?;
                writeln!(text)?;
            }
            if let Some(complexity) = &self.complexity {
                writeln!(text, "{}", complexity)?;
                if verbosity >= Verbosity::Detailed {
                    for estimate in &complexity.estimates {
                        writeln!(text, "  '{}' measurements:", estimate.operation)?;
                        for sample in &estimate.samples {
                            writeln!(text, "    {}", sample)?;
                        }
                    }
                    writeln!(text, "  lifecycle: {}", complexity.lifecycle)?;
                    writeln!(text)?;
                }
            }
        }
        if failures.is_empty() {
            if verbosity >= Verbosity::Summary {
                writeln!(text, "'{}' PASSED", self.container)?;
            }
        } else {
            writeln!(text, "'{}' FAILED with {} failed assertion(s):", self.container, failures.len())?;
            for (i, failure) in failures.iter().enumerate() {
                writeln!(text, "  {:>2}. {}", i + 1, failure)?;
            }
        }
        Ok(())
    }
}

impl Display for TestResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render(Verbosity::Summary))
    }
}
