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

//! # Convolution Isomorphism
//!
//! For non-decreasing, finite functions the min-plus convolution is
//! isomorphic to the max-plus convolution of their pseudo-inverses:
//!
//! ```text
//! f ⊗ g  = lower_pi( upper_pi(f) ⊗̄ upper_pi(g) )     (left-continuous f, g)
//! f ⊗̄ g = upper_pi( lower_pi(f) ⊗  lower_pi(g) )     (right-continuous f, g)
//! ```
//!
//! Inverting swaps the roles of time and value. When a function climbs
//! quickly (few breakpoints per value unit) its inverse is shorter, and
//! the convolution on the inverted side touches fewer element pairs.
//!
//! ## Highlights
//!
//! - **By-sequence**: applied to two finite sequences when the requested
//!   output window lies inside the prefix on which the result is exact.
//!   A flat start (min-plus) or flat end (max-plus) of an operand is lost
//!   by the inversion and is restored explicitly.
//! - **By-curve**: applied to two ultimately pseudo-periodic curves with
//!   `f(0) = 0` and a positive period height, when the period arithmetic of
//!   the inverted curves is not more expensive than the direct one.
//!
//! Both substitutions produce results equivalent to the direct path. The
//! inner convolutions always run with the substitutions disabled.

use crate::{
    convolution::{ConvolutionBounds, Semiring, truncate_at_ceiling},
    curve::Curve,
    element::Element,
    envelope::upper_envelope,
    error::{AlgebraError, AlgebraResult},
    sequence::Sequence,
    settings::ComputationSettings,
};
use tracing::debug;
use tropic_core::num::rational::Rational;

/// Returns `true` if the by-sequence isomorphism may replace the direct
/// convolution of `f` and `g` under `bounds`.
pub(crate) fn by_sequence_applies(
    f: &Sequence,
    g: &Sequence,
    settings: &ComputationSettings,
    bounds: &ConvolutionBounds,
    semiring: Semiring,
) -> bool {
    if !settings.use_by_sequence_convolution_isomorphism_optimization()
        || f.len() * g.len() < settings.by_sequence_isomorphism_threshold()
    {
        return false;
    }

    let qualifies = |s: &Sequence| {
        s.is_left_closed()
            && s.is_right_open()
            && s.is_finite()
            && s.is_non_decreasing()
            && match semiring {
                Semiring::MinPlus => s.is_left_continuous(),
                Semiring::MaxPlus => s.is_right_continuous(),
            }
    };
    if !qualifies(f) || !qualifies(g) {
        return false;
    }

    let Some(end) = bounds.end() else {
        return false;
    };
    let start = f.defined_from() + g.defined_from();
    let shortest = (f.defined_until() - f.defined_from()).min(g.defined_until() - g.defined_from());
    let valid_end = &start + shortest;
    &start < end
        && bounds.start().is_none_or(|s| s < end)
        && (*end < valid_end || (*end == valid_end && !bounds.is_end_included()))
}

/// Min-plus convolution of two sequences through the max-plus convolution
/// of their upper pseudo-inverses.
pub(crate) fn by_sequence_min_plus(
    f: &Sequence,
    g: &Sequence,
    settings: &ComputationSettings,
    bounds: &ConvolutionBounds,
) -> AlgebraResult<Sequence> {
    // A flat start stored as several collinear pieces becomes one segment.
    let (f, g) = (&f.optimize(), &g.optimize());
    let inner = settings.without_isomorphisms();
    let start = f.defined_from() + g.defined_from();

    let raw = Sequence::max_plus_convolution(
        &f.upper_pseudo_inverse(false)?,
        &g.upper_pseudo_inverse(false)?,
        &inner,
        &ConvolutionBounds::unbounded(),
    )?
    .lower_pseudo_inverse(false)?;

    // The inversion collapses a flat start into a single instant.
    let flat_f = end_of_flat_start(f)?;
    let flat_g = end_of_flat_start(g)?;
    let raw = if &flat_f > f.defined_from() || &flat_g > g.defined_from() {
        let value = f.first().first_value().checked_add(g.first().first_value())?;
        let flat = Sequence::constant(value, start.clone(), &flat_f + &flat_g);
        Sequence::minimum(&flat, &raw, false)?
    } else {
        raw
    };

    debug!(elements = raw.len(), "min-plus isomorphism result");
    restrict_to_bounds(raw, &start, bounds)
}

/// Max-plus convolution of two sequences through the min-plus convolution
/// of their lower pseudo-inverses.
pub(crate) fn by_sequence_max_plus(
    f: &Sequence,
    g: &Sequence,
    settings: &ComputationSettings,
    bounds: &ConvolutionBounds,
) -> AlgebraResult<Sequence> {
    // A flat end stored as several collinear pieces becomes one segment.
    let (f, g) = (&f.optimize(), &g.optimize());
    let inner = settings.without_isomorphisms();
    let start = f.defined_from() + g.defined_from();

    let raw = Sequence::convolution(
        &f.lower_pseudo_inverse(false)?,
        &g.lower_pseudo_inverse(false)?,
        &inner,
        &ConvolutionBounds::unbounded(),
    )?
    .upper_pseudo_inverse(false)?;

    // The inversion collapses a flat end into a single instant; the pairs
    // involving it are convolved directly.
    let mut missing = Vec::new();
    let tail_f = start_of_flat_end(f)?;
    if &tail_f < f.defined_until() {
        flat_end_pieces(f, &tail_f, g, &mut missing)?;
    }
    let tail_g = start_of_flat_end(g)?;
    if &tail_g < g.defined_until() {
        flat_end_pieces(g, &tail_g, f, &mut missing)?;
    }

    let raw = if missing.is_empty() {
        raw
    } else {
        let envelope = upper_envelope(&missing);
        let from = envelope[0].start_time().clone();
        let to = envelope[envelope.len() - 1].end_time().clone();
        let tail = Sequence::fill(envelope, from, to, Rational::MINUS_INFINITY)?;
        Sequence::maximum(&tail, &raw, false)?
    };

    debug!(elements = raw.len(), "max-plus isomorphism result");
    restrict_to_bounds(raw, &start, bounds)
}

/// The end of the constant run `f` starts with, or its start time if it
/// does not start flat.
fn end_of_flat_start(f: &Sequence) -> AlgebraResult<Rational> {
    let start = f.defined_from();
    let after = f.segment_after(start)?;
    if after.is_constant() && f.is_right_continuous_at(start)? {
        Ok(after.end_time().clone())
    } else {
        Ok(start.clone())
    }
}

/// The start of the constant run `f` ends with, or its end time if it does
/// not end flat.
fn start_of_flat_end(f: &Sequence) -> AlgebraResult<Rational> {
    let end = f.defined_until();
    let before = f.segment_before(end)?;
    if before.is_constant() {
        Ok(before.start_time().clone())
    } else {
        Ok(end.clone())
    }
}

fn flat_end_pieces(
    flat: &Sequence,
    tail: &Rational,
    other: &Sequence,
    out: &mut Vec<Element>,
) -> AlgebraResult<()> {
    let point = flat.element_at(tail)?.clone();
    let segment = Element::Segment(flat.segment_after(tail)?.clone());
    for element in other.elements() {
        out.extend(point.max_plus_convolution(element));
        out.extend(segment.max_plus_convolution(element));
    }
    Ok(())
}

fn restrict_to_bounds(
    raw: Sequence,
    start: &Rational,
    bounds: &ConvolutionBounds,
) -> AlgebraResult<Sequence> {
    let end = bounds.end().ok_or_else(|| {
        AlgebraError::Precondition("the isomorphism needs an output end".to_string())
    })?;
    let (from, from_included) = match bounds.start() {
        Some(s) if s >= start => (s, bounds.is_start_included()),
        _ => (start, true),
    };
    let cut = raw.cut(from, end, from_included, bounds.is_end_included())?;
    match bounds.ceiling() {
        Some(ceiling) => truncate_at_ceiling(cut, ceiling, bounds.is_ceiling_included()),
        None => Ok(cut),
    }
}

/// Returns `true` if the curve isomorphism may replace the direct
/// convolution of `f` and `g`.
pub(crate) fn by_curve_applies(
    f: &Curve,
    g: &Curve,
    settings: &ComputationSettings,
    semiring: Semiring,
) -> bool {
    if !settings.use_convolution_isomorphism_optimization() {
        return false;
    }
    let qualifies = |c: &Curve| {
        c.is_finite()
            && c.is_non_decreasing()
            && c.is_zero_at_zero()
            && c.pseudo_period_height().is_positive()
            && match semiring {
                Semiring::MinPlus => c.is_left_continuous(),
                Semiring::MaxPlus => c.is_right_continuous(),
            }
    };
    qualifies(f) && qualifies(g) && inverted_is_not_costlier(f, g)
}

/// Compares how many periods of each operand the direct and the inverted
/// convolution have to unroll. Inverting a curve swaps its period length
/// and height.
fn inverted_is_not_costlier(f: &Curve, g: &Curve) -> bool {
    let unrolled = |a: &Rational, b: &Rational| -> Option<Rational> {
        let lcm = a.lcm(b).ok()?;
        Some((&lcm / a) * (&lcm / b))
    };
    let direct = unrolled(f.pseudo_period_length(), g.pseudo_period_length());
    let inverted = unrolled(f.pseudo_period_height(), g.pseudo_period_height());
    match (direct, inverted) {
        (Some(direct), Some(inverted)) => inverted <= direct,
        _ => false,
    }
}

/// Min-plus convolution of two curves through their upper pseudo-inverses.
pub(crate) fn by_curve_min_plus(
    f: &Curve,
    g: &Curve,
    settings: &ComputationSettings,
) -> AlgebraResult<Curve> {
    let inner = settings.without_isomorphisms();
    Curve::max_plus_convolution(&f.upper_pseudo_inverse()?, &g.upper_pseudo_inverse()?, &inner)?
        .lower_pseudo_inverse()
}

/// Max-plus convolution of two curves through their lower pseudo-inverses.
pub(crate) fn by_curve_max_plus(
    f: &Curve,
    g: &Curve,
    settings: &ComputationSettings,
) -> AlgebraResult<Curve> {
    let inner = settings.without_isomorphisms();
    Curve::convolution(&f.lower_pseudo_inverse()?, &g.lower_pseudo_inverse()?, &inner)?
        .upper_pseudo_inverse()
}
