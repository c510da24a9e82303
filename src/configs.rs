//! Contains the run options -- [TestOptions] -- their defaults & validation.\
//! Options are resolved once per run, from the defaults documented here plus any [TestOptionsOverrides], and are read-only thereafter.

use crate::{
    complexity::{ComplexityClass, OperationKind},
    conformance::OrderingPolicy,
    features::PERCENT_TOLERANCE,
};
use std::time::Duration;
use thiserror::Error;


/// default input sizes swept by the complexity estimation
pub const DEFAULT_INPUT_SIZES: [usize; 3] = [1_000, 4_000, 16_000];

/// default number of timed repetitions, per operation & input size -- the median of them is taken
pub const DEFAULT_REPETITIONS: u32 = 15;

/// default number of operations timed together in each repetition (capped by the input size)
pub const DEFAULT_OPERATIONS_PER_REPETITION: u32 = 64;

/// default number of values driven through containers by the conformance checks
pub const DEFAULT_CONFORMANCE_SAMPLE_SIZE: usize = 32;

/// default seed for generating the conformance values
pub const DEFAULT_SEED: u64 = 0x5EED;

/// default number of re-estimations when a complexity mismatches its expectation
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// default pause before each re-estimation
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);


/// How much is reported through [crate::features::OUTPUT]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Verbosity {
    /// nothing, unless the run fails
    Quiet,
    /// one line per conformance check & per estimated operation
    Summary,
    /// [Self::Summary] plus every measurement and lifecycle counter
    Detailed,
}

/// The complexities a container is expected to show -- `None` slots are not verified
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct ExpectedComplexities {
    pub insert: Option<ComplexityClass>,
    pub peek:   Option<ComplexityClass>,
    pub remove: Option<ComplexityClass>,
}

impl ExpectedComplexities {

    /// the same expectation for all operations
    pub fn all(class: ComplexityClass) -> Self {
        Self { insert: Some(class), peek: Some(class), remove: Some(class) }
    }

    pub fn for_operation(&self, operation: OperationKind) -> Option<ComplexityClass> {
        match operation {
            OperationKind::Insert => self.insert,
            OperationKind::Peek   => self.peek,
            OperationKind::Remove => self.remove,
        }
    }
}

/// Options for a harness run. See [Self::default()] for the documented defaults & [Self::resolve()] to apply overrides.
#[derive(Debug, PartialEq, Clone)]
pub struct TestOptions {
    /// the removal order the container is declared to follow
    pub policy:                  OrderingPolicy,
    pub verbosity:               Verbosity,
    /// input sizes for the complexity estimation -- at least 3, strictly increasing & positive
    pub input_sizes:             Vec<usize>,
    pub estimate_complexity:     bool,
    pub expected:                ExpectedComplexities,
    /// timed repetitions per operation & input size
    pub repetitions:             u32,
    /// operations timed together on each repetition
    pub operations_per_repetition: u32,
    /// accepted deviation of the predicted from the observed time growth, in (0, 1]
    pub tolerance:               f64,
    /// number of values driven through the container by the conformance checks
    pub conformance_sample_size: usize,
    /// seed for generating the conformance values
    pub seed:                    u64,
    /// if given, containers causing more copies than this per inserted value are flagged
    pub copy_budget_per_item:    Option<u32>,
    /// re-estimations when a complexity mismatches its expectation
    pub retry_attempts:          u32,
    pub retry_delay:             Duration,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            policy:                    OrderingPolicy::Unordered,
            verbosity:                 Verbosity::Summary,
            input_sizes:               DEFAULT_INPUT_SIZES.to_vec(),
            estimate_complexity:       true,
            expected:                  ExpectedComplexities::default(),
            repetitions:               DEFAULT_REPETITIONS,
            operations_per_repetition: DEFAULT_OPERATIONS_PER_REPETITION,
            tolerance:                 PERCENT_TOLERANCE,
            conformance_sample_size:   DEFAULT_CONFORMANCE_SAMPLE_SIZE,
            seed:                      DEFAULT_SEED,
            copy_budget_per_item:      None,
            retry_attempts:            DEFAULT_RETRY_ATTEMPTS,
            retry_delay:               DEFAULT_RETRY_DELAY,
        }
    }
}

impl TestOptions {

    /// the defaults, with `overrides` applied on top of them -- validated
    pub fn resolve(overrides: TestOptionsOverrides) -> Result<Self, OptionsError> {
        let defaults = Self::default();
        let options = Self {
            policy:                    overrides.policy.unwrap_or(defaults.policy),
            verbosity:                 overrides.verbosity.unwrap_or(defaults.verbosity),
            input_sizes:               overrides.input_sizes.unwrap_or(defaults.input_sizes),
            estimate_complexity:       overrides.estimate_complexity.unwrap_or(defaults.estimate_complexity),
            expected: ExpectedComplexities {
                insert: overrides.expected_insert.or(defaults.expected.insert),
                peek:   overrides.expected_peek.or(defaults.expected.peek),
                remove: overrides.expected_remove.or(defaults.expected.remove),
            },
            repetitions:               overrides.repetitions.unwrap_or(defaults.repetitions),
            operations_per_repetition: overrides.operations_per_repetition.unwrap_or(defaults.operations_per_repetition),
            tolerance:                 overrides.tolerance.unwrap_or(defaults.tolerance),
            conformance_sample_size:   overrides.conformance_sample_size.unwrap_or(defaults.conformance_sample_size),
            seed:                      overrides.seed.unwrap_or(defaults.seed),
            copy_budget_per_item:      overrides.copy_budget_per_item.or(defaults.copy_budget_per_item),
            retry_attempts:            overrides.retry_attempts.unwrap_or(defaults.retry_attempts),
            retry_delay:               overrides.retry_delay.unwrap_or(defaults.retry_delay),
        };
        options.validate()?;
        Ok(options)
    }

    /// checks the invariants documented on each field
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.estimate_complexity {
            if self.input_sizes.len() < 3 {
                return Err(OptionsError::TooFewInputSizes { given: self.input_sizes.len() });
            }
            if self.input_sizes.contains(&0) {
                return Err(OptionsError::ZeroInputSize);
            }
            if let Some(pair) = self.input_sizes.windows(2).find(|pair| pair[0] >= pair[1]) {
                return Err(OptionsError::InputSizesNotIncreasing { previous: pair[0], next: pair[1] });
            }
            if self.repetitions == 0 {
                return Err(OptionsError::ZeroRepetitions);
            }
            if self.operations_per_repetition == 0 {
                return Err(OptionsError::ZeroOperationsPerRepetition);
            }
        }
        if !(self.tolerance > 0.0 && self.tolerance <= 1.0) {
            return Err(OptionsError::ToleranceOutOfRange(self.tolerance));
        }
        if self.conformance_sample_size == 0 {
            return Err(OptionsError::EmptyConformanceSample);
        }
        Ok(())
    }
}

/// Per-field overrides for [TestOptions] -- `None` keeps the default
#[derive(Debug, PartialEq, Clone, Default)]
pub struct TestOptionsOverrides {
    pub policy:                    Option<OrderingPolicy>,
    pub verbosity:                 Option<Verbosity>,
    pub input_sizes:               Option<Vec<usize>>,
    pub estimate_complexity:       Option<bool>,
    pub expected_insert:           Option<ComplexityClass>,
    pub expected_peek:             Option<ComplexityClass>,
    pub expected_remove:           Option<ComplexityClass>,
    pub repetitions:               Option<u32>,
    pub operations_per_repetition: Option<u32>,
    pub tolerance:                 Option<f64>,
    pub conformance_sample_size:   Option<usize>,
    pub seed:                      Option<u64>,
    pub copy_budget_per_item:      Option<u32>,
    pub retry_attempts:            Option<u32>,
    pub retry_delay:               Option<Duration>,
}

/// Rejections of invalid [TestOptions]
#[derive(Debug, Error, PartialEq, Clone)]
pub enum OptionsError {
    #[error("complexity estimation needs at least 3 input sizes -- {given} given")]
    TooFewInputSizes { given: usize },
    #[error("input sizes must be strictly increasing: {previous} is followed by {next}")]
    InputSizesNotIncreasing { previous: usize, next: usize },
    #[error("input sizes must be positive")]
    ZeroInputSize,
    #[error("at least 1 repetition is needed")]
    ZeroRepetitions,
    #[error("at least 1 operation per repetition is needed")]
    ZeroOperationsPerRepetition,
    #[error("tolerance must be in (0, 1] -- {0} given")]
    ToleranceOutOfRange(f64),
    #[error("the conformance checks need at least 1 value")]
    EmptyConformanceSample,
}


#[cfg(test)]
mod tests {

    //! Unit tests for the [configs](super) module

    use super::*;
    use crate::conformance::SortDirection;

    #[test]
    fn defaults_are_valid() {
        let options = TestOptions::default();
        assert_eq!(options.validate(), Ok(()));
        assert_eq!(TestOptions::resolve(TestOptionsOverrides::default()), Ok(options));
    }

    #[test]
    fn overrides_win_over_defaults() {
        let options = TestOptions::resolve(TestOptionsOverrides {
            policy:          Some(OrderingPolicy::Sorted(SortDirection::Ascending)),
            input_sizes:     Some(vec![10, 100, 1000]),
            expected_remove: Some(ComplexityClass::ON),
            seed:            Some(42),
            ..TestOptionsOverrides::default()
        }).expect("valid overrides");
        assert_eq!(options.policy, OrderingPolicy::Sorted(SortDirection::Ascending));
        assert_eq!(options.input_sizes, vec![10, 100, 1000]);
        assert_eq!(options.expected.for_operation(OperationKind::Remove), Some(ComplexityClass::ON));
        assert_eq!(options.expected.for_operation(OperationKind::Insert), None);
        assert_eq!(options.seed, 42);
        assert_eq!(options.repetitions, DEFAULT_REPETITIONS);
        assert_eq!(options.verbosity, Verbosity::Summary);
    }

    #[test]
    fn input_size_invariants() {
        let resolve = |input_sizes: Vec<usize>| TestOptions::resolve(TestOptionsOverrides { input_sizes: Some(input_sizes), ..TestOptionsOverrides::default() });
        assert_eq!(resolve(vec![10, 100]),        Err(OptionsError::TooFewInputSizes { given: 2 }));
        assert_eq!(resolve(vec![10, 100, 100]),   Err(OptionsError::InputSizesNotIncreasing { previous: 100, next: 100 }));
        assert_eq!(resolve(vec![100, 10, 1000]),  Err(OptionsError::InputSizesNotIncreasing { previous: 100, next: 10 }));
        assert_eq!(resolve(vec![0, 10, 100]),     Err(OptionsError::ZeroInputSize));
        assert!(resolve(vec![1, 2, 3]).is_ok());
    }

    #[test]
    fn input_sizes_are_free_when_not_estimating() {
        let options = TestOptions::resolve(TestOptionsOverrides {
            estimate_complexity: Some(false),
            input_sizes:         Some(vec![]),
            ..TestOptionsOverrides::default()
        });
        assert!(options.is_ok());
    }

    #[test]
    fn other_invariants() {
        assert_eq!(TestOptions::resolve(TestOptionsOverrides { tolerance: Some(0.0), ..TestOptionsOverrides::default() }),
                   Err(OptionsError::ToleranceOutOfRange(0.0)));
        assert_eq!(TestOptions::resolve(TestOptionsOverrides { repetitions: Some(0), ..TestOptionsOverrides::default() }),
                   Err(OptionsError::ZeroRepetitions));
        assert_eq!(TestOptions::resolve(TestOptionsOverrides { conformance_sample_size: Some(0), ..TestOptionsOverrides::default() }),
                   Err(OptionsError::EmptyConformanceSample));
    }

    #[test]
    fn expectations_for_all_operations() {
        let expected = ExpectedComplexities::all(ComplexityClass::O1);
        for operation in OperationKind::ALL {
            assert_eq!(expected.for_operation(operation), Some(ComplexityClass::O1));
        }
    }
}
