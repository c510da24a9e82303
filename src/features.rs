//! Contains code for handling the Cargo features used to compile this crate.
#![allow(dead_code)]

use std::io::{stdout,stderr,Write};

#[cfg(any(feature = "tolerance_50_percent", not(any(feature = "tolerance_25_percent"))))]
/// acceptable proportional variance (acceptable measurement errors) between the observed and the predicted
/// time growth ratios when fitting complexity classes
pub const PERCENT_TOLERANCE: f64 = 0.50;

#[cfg(all(feature = "tolerance_25_percent", not(feature = "tolerance_50_percent")))]
/// acceptable proportional variance (acceptable measurement errors) between the observed and the predicted
/// time growth ratios when fitting complexity classes
pub const PERCENT_TOLERANCE: f64 = 0.25;

#[cfg(feature = "report_stdout")]
/// Function to output an `&str` -- used to sink harness reports -- controlled by the crate's features (stdout, stderr, no_output)
pub const OUTPUT: fn(&str) = stdout_write;

#[cfg(all(feature = "report_stderr", not(feature = "report_stdout")))]
/// Function to output an `&str` -- used to sink harness reports -- controlled by the crate's features (stdout, stderr, no_output)
pub const OUTPUT: fn(&str) = stderr_write;

#[cfg(not(any(feature = "report_stdout", feature = "report_stderr")))]
/// Function to output an `&str` -- used to sink harness reports -- controlled by the crate's features (stdout, stderr, no_output)
pub const OUTPUT: fn(&str) = null_write;


fn stdout_write(buf: &str) {
    sync_outputs();
    print!("{}", buf);
    sync_outputs();
}

fn stderr_write(buf: &str) {
    sync_outputs();
    eprint!("{}", buf);
    sync_outputs();
}

/// Flushes both stdout and stderr so the next output will be in sync with everything that came before
fn sync_outputs() {
    _ = stdout().flush();
    _ = stderr().flush();
}

fn null_write(_buf: &str) {
    // release compilations will optimize out this call for '_buf' is not used
}
