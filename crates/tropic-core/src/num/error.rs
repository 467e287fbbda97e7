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


use thiserror::Error;

/// The error type for checked operations on [`Rational`](super::rational::Rational).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// The operation has no defined result, e.g. `+∞ + -∞` or `0 · ∞`.
    #[error("indeterminate form: {0}")]
    Indeterminate(&'static str),
    /// A finite or infinite value was divided by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// The operation is only defined for finite operands.
    #[error("operation requires a finite value, got {0}")]
    NotFinite(String),
    /// The operation is only defined for strictly positive operands.
    #[error("operation requires a strictly positive value, got {0}")]
    NotPositive(String),
    /// A textual rational could not be parsed.
    #[error("could not parse '{0}' as a rational")]
    Parse(String),
}
