//! Assertion primitives.
//!
//! Assertions record results; they do not panic and they do not halt the
//! test body. A failed check marks the owning case for `Fail` at
//! finalization and execution continues, so one test can report several
//! mismatches at once. Every primitive returns whether it passed for
//! callers that want to bail out early.

use std::fmt;

use conforma_core::{AssertionResult, SameValue};

use crate::harness::TestHandle;

impl TestHandle {
    /// Assert that `actual` is the same value as `expected`.
    ///
    /// Equality follows the [`SameValue`] contract: numeric equality for
    /// integers, NaN-equals-NaN with distinct signed zeros for floats,
    /// code-point equality for strings, element-wise for sequences. On
    /// failure both values' `Debug` renderings are recorded.
    pub fn assert_equals<T>(&self, actual: &T, expected: &T, description: &str) -> bool
    where
        T: SameValue + fmt::Debug + ?Sized,
    {
        let passed = actual.same_value(expected);
        self.record(comparison(passed, description, actual, expected))
    }

    /// Assert that `actual` is not the same value as `expected`.
    pub fn assert_not_equals<T>(&self, actual: &T, expected: &T, description: &str) -> bool
    where
        T: SameValue + fmt::Debug + ?Sized,
    {
        let passed = !actual.same_value(expected);
        if passed {
            self.record(AssertionResult::pass(description))
        } else {
            self.record(AssertionResult::fail(
                format!("{description}: both sides are {expected:?}"),
                Some(format!("{actual:?}")),
                Some(format!("anything but {expected:?}")),
            ))
        }
    }

    /// Assert that `value` is exactly `true`.
    ///
    /// The parameter type is `bool`, so there is no truthy coercion to
    /// perform; anything that is not a boolean does not get here.
    pub fn assert_true(&self, value: bool, description: &str) -> bool {
        self.record(comparison(value, description, &value, &true))
    }

    /// Assert that `value` is exactly `false`.
    pub fn assert_false(&self, value: bool, description: &str) -> bool {
        self.record(comparison(!value, description, &value, &false))
    }

    /// Assert that `actual` is within `epsilon` of `expected`.
    ///
    /// Fails when either operand is NaN; an approximate comparison against
    /// NaN has no meaningful tolerance.
    pub fn assert_approx_equals(
        &self,
        actual: f64,
        expected: f64,
        epsilon: f64,
        description: &str,
    ) -> bool {
        let passed = (actual - expected).abs() <= epsilon;
        if passed {
            self.record(AssertionResult::pass(description))
        } else {
            self.record(AssertionResult::fail(
                format!("{description}: not within {epsilon} of expected"),
                Some(format!("{actual:?}")),
                Some(format!("{expected:?} \u{00b1} {epsilon:?}")),
            ))
        }
    }

    /// Record a failure marking code that must never run (e.g. an event
    /// callback that should not fire). Always fails.
    pub fn assert_unreached(&self, description: &str) -> bool {
        self.record(AssertionResult::fail(
            format!("reached code marked unreachable: {description}"),
            None,
            None,
        ))
    }
}

fn comparison<A: fmt::Debug + ?Sized, B: fmt::Debug + ?Sized>(
    passed: bool,
    description: &str,
    actual: &A,
    expected: &B,
) -> AssertionResult {
    if passed {
        AssertionResult::pass(description)
    } else {
        AssertionResult::fail(
            description,
            Some(format!("{actual:?}")),
            Some(format!("{expected:?}")),
        )
    }
}
