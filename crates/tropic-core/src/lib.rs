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


//! # Tropic Core
//!
//! Numeric foundations for the tropic curve algebra. Everything in the
//! min-plus and max-plus kernels is computed in exact arithmetic, so this
//! crate provides the number type and the interval bookkeeping the kernels
//! are built on.
//!
//! ## Modules
//!
//! - `num`: The exact `Rational` type (arbitrary precision fractions extended
//!   with `+∞` and `-∞`), its total order, checked arithmetic and the
//!   `ArithmeticError` reported for indeterminate forms.
//! - `math`: `TimeInterval`, an interval over rationals with independent
//!   open/closed bounds, used to describe element domains and cut windows.
//!
//! Refer to each module for detailed APIs and examples.

pub mod math;
pub mod num;
