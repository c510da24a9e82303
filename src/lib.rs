#![doc = include_str!("../README.md")]

pub mod features;
pub mod configs;
pub mod lifecycle;
pub mod adapter;
pub mod conformance;
pub mod complexity;
pub mod runners;
pub mod report;


// exported symbols
pub use {
    features::{OUTPUT, PERCENT_TOLERANCE},
    configs::{TestOptions, TestOptionsOverrides, Verbosity, ExpectedComplexities},
    lifecycle::{LifecycleCounters, TrackedValue},
    adapter::{AdtOperations, AdtHandle, AdtError, Container, OperationTable, ScopedHandle},
    conformance::{OrderingPolicy, SortDirection},
    complexity::{ComplexityClass, OperationKind},
    runners::{analyse_adt, test_adt},
    report::{TestResult, FailedAssertion},
};
