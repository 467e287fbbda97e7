// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Algebra Errors
//!
//! Every fallible operation of the curve algebra reports an `AlgebraError`.
//! Arithmetic failures on `Rational` values (indeterminate forms, division
//! by zero) are wrapped transparently, so `?` works across the numeric and
//! structural layers.

use thiserror::Error;
use tropic_core::num::{error::ArithmeticError, rational::Rational};

/// The error type of the curve algebra.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgebraError {
    /// A sequence or curve was built from elements that violate its
    /// structural invariants (gaps, overlaps, non-alternating kinds).
    #[error("invalid structure: {0}")]
    Structure(String),
    /// An operation was applied to an operand outside its domain of
    /// definition, e.g. the pseudo-inverse of a decreasing function.
    #[error("precondition violated: {0}")]
    Precondition(String),
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    /// Two operands do not have the shape an operation requires, e.g. the
    /// sum of two segments over different domains.
    #[error("argument shape mismatch: {0}")]
    ArgumentShape(String),
    /// A query was made at an instant outside the domain.
    #[error("time {time} is outside the domain")]
    OutOfDomain { time: Rational },
    #[error("could not parse '{input}': {reason}")]
    Parse { input: String, reason: String },
}

/// Shorthand for results of the curve algebra.
pub type AlgebraResult<T> = Result<T, AlgebraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_errors_convert() {
        fn fails() -> AlgebraResult<Rational> {
            Ok(Rational::PLUS_INFINITY.checked_add(&Rational::MINUS_INFINITY)?)
        }
        assert!(matches!(fails(), Err(AlgebraError::Arithmetic(_))));
    }

    #[test]
    fn test_display_messages() {
        let err = AlgebraError::OutOfDomain {
            time: Rational::new(7, 2),
        };
        assert_eq!(err.to_string(), "time 7/2 is outside the domain");

        let err = AlgebraError::Parse {
            input: "Point(1".to_string(),
            reason: "missing ')'".to_string(),
        };
        assert_eq!(err.to_string(), "could not parse 'Point(1': missing ')'");
    }
}
