//! Contains the math to infer a [ComplexityClass] from time measurements taken at increasing input sizes.
//!
//! For every pair of consecutive samples `(n1, t1)`, `(n2, t2)`, the observed growth `t2 / t1` is compared to the growth
//! each candidate class predicts, `f(n2) / f(n1)`. Only candidates whose predictions stay within the tolerance band for a
//! majority of the pairs are eligible; among those, the one with the smallest accumulated error wins. If no candidate is
//! eligible, the result is [ComplexityClass::Undetermined].

use super::types::{ClassFit, ComplexityClass, ComplexitySample};


/// minimum number of usable samples to discriminate between the candidate classes
pub const MIN_SAMPLES: usize = 3;

/// Fits each of the [ComplexityClass::CANDIDATES] to `points` -- `(n, t)` pairs, with strictly increasing `n`s.\
/// Points with non-positive (or non-finite) `n` or `t` are ignored.
pub fn fit(points: &[(f64, f64)], tolerance: f64) -> Vec<ClassFit> {
    let usable = usable_points(points);
    ComplexityClass::CANDIDATES.iter()
        .map(|class| {
            let mut total_error = 0.0;
            let mut fitting_pairs = 0;
            for pair in usable.windows(2) {
                let (n1, t1) = pair[0];
                let (n2, t2) = pair[1];
                let observed = t2 / t1;
                let predicted = predicted_ratio(*class, n1, n2);
                total_error += (observed / predicted).ln().abs();
                if ((predicted / observed) - 1.0).abs() <= tolerance {
                    fitting_pairs += 1;
                }
            }
            ClassFit { class: *class, total_error, fitting_pairs, pairs: usable.len().saturating_sub(1) }
        })
        .collect()
}

/// Infers the complexity class of `points` -- see the module docs.
pub fn classify(points: &[(f64, f64)], tolerance: f64) -> ComplexityClass {
    if usable_points(points).len() < MIN_SAMPLES {
        return ComplexityClass::InsufficientData;
    }
    fit(points, tolerance).into_iter()
        .filter(|candidate| candidate.fitting_pairs * 2 > candidate.pairs)
        .fold(None, |best: Option<ClassFit>, candidate| match best {
            Some(best) if best.total_error <= candidate.total_error => Some(best),
            _ => Some(candidate),
        })
        .map_or(ComplexityClass::Undetermined, |best| best.class)
}

/// [classify()] applied to the per-operation times of `samples`
pub fn classify_samples(samples: &[ComplexitySample], tolerance: f64) -> ComplexityClass {
    classify(&as_points(samples), tolerance)
}

/// `(n, nanoseconds per operation)` for each sample
pub fn as_points(samples: &[ComplexitySample]) -> Vec<(f64, f64)> {
    samples.iter()
        .map(|sample| (sample.input_size as f64, sample.nanos_per_operation()))
        .collect()
}

fn usable_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points.iter()
        .copied()
        .filter(|(n, t)| n.is_finite() && t.is_finite() && *n > 0.0 && *t > 0.0)
        .collect()
}

fn predicted_ratio(class: ComplexityClass, n1: f64, n2: f64) -> f64 {
    match (class.growth(n1), class.growth(n2)) {
        (Some(f1), Some(f2)) => f2 / f1,
        _ => 1.0,
    }
}
