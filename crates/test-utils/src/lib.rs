//! Shared test utilities for the seismic attribute workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic cube generators with known analytic properties
//! - Common axis and cube fixtures
//! - Approximate-equality assertion macros
//! - Tracing setup for tests
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, generators};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber for tests, once per process.
///
/// Honours `RUST_LOG`; defaults to `warn` so test output stays quiet.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro asserting every element of an array is within `epsilon` of a value.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_all_approx;
///
/// let zeros = ndarray::Array3::<f32>::zeros((2, 2, 2));
/// assert_all_approx!(zeros, 0.0, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_all_approx {
    ($array:expr, $value:expr, $epsilon:expr) => {{
        let value: f64 = $value as f64;
        let epsilon: f64 = $epsilon as f64;
        for (index, v) in $array.indexed_iter() {
            let v: f64 = *v as f64;
            if !((v - value).abs() <= epsilon) {
                panic!(
                    "assertion failed: element {:?} = `{:?}` differs from `{:?}` by more than `{:?}`",
                    index, v, value, epsilon
                );
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_all_approx_passes() {
        let cube = ndarray::Array3::<f32>::from_elem((2, 3, 4), 2.5);
        assert_all_approx!(cube, 2.5, 1e-6);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_all_approx_catches_nan() {
        let mut cube = ndarray::Array3::<f32>::zeros((2, 2, 2));
        cube[[1, 1, 1]] = f32::NAN;
        assert_all_approx!(cube, 0.0, 1e-6);
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
