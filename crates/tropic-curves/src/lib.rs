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

//! # Tropic Curves
//!
//! Exact min-plus and max-plus algebra over piecewise-affine functions of
//! time. Values live in the rationals extended with `+∞` and `-∞`; nothing
//! is ever rounded.
//!
//! ## Modules
//!
//! - `element`: `Point` and `Segment`, the atoms every function is built
//!   from, and their pairwise operations.
//! - `envelope`: Lower and upper envelopes of overlapping elements.
//! - `sequence`: `Sequence`, a gap-free run of elements on a bounded
//!   interval, with lookups, cuts and pointwise operations.
//! - `inverse`: Lower and upper pseudo-inverses of sequences.
//! - `convolution`: Min-plus and max-plus convolution of sequences, with
//!   optional output bounds and parallel fan-out.
//! - `isomorphism`: The pseudo-inverse isomorphism used to speed up
//!   convolutions of non-decreasing operands.
//! - `curve`: `Curve`, an ultimately pseudo-periodic function on
//!   `[0, +∞)`, closed under all operations above.
//! - `breakpoints`: Lazy enumeration of a curve's breakpoints.
//! - `staircase`: Builders for common curve families.
//! - `code`: The textual format every type prints to and parses from.
//! - `settings`: `ComputationSettings`, which select between equivalent
//!   computation paths.
//! - `error`: `AlgebraError` and the `AlgebraResult` alias.
//!
//! Refer to each module for detailed APIs and examples.

pub mod breakpoints;
pub mod code;
pub mod convolution;
pub mod curve;
pub mod element;
pub mod envelope;
pub mod error;
pub mod inverse;
pub mod isomorphism;
pub mod sequence;
pub mod settings;
pub mod staircase;
