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

//! # Pseudo-Inverses
//!
//! For a non-decreasing, finite sequence `f`:
//!
//! - the lower pseudo-inverse is `f↓(v) = inf { t : f(t) >= v }`,
//! - the upper pseudo-inverse is `f↑(v) = sup { t : f(t) <= v }`.
//!
//! Both are non-decreasing functions of the value `v`. Jumps of `f` become
//! flat stretches of the inverse and flat stretches of `f` become jumps.
//! The inverse is built over the value breakpoints of `f` (point values and
//! segment limits): between two consecutive value breakpoints it is either
//! constant or affine with slope `1 / s`.
//!
//! Pointwise evaluation uses a binary search over the elements, which is
//! valid because the predicates "reaches `v`" and "stays below `v`" are
//! monotone along a non-decreasing sequence.

use crate::{
    element::{Element, Point, Segment},
    error::{AlgebraError, AlgebraResult},
    sequence::{Sequence, merge_collinear},
};
use num_traits::{One, Zero};
use tropic_core::num::rational::Rational;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inverse {
    Lower,
    Upper,
}

impl Sequence {
    /// Computes the lower pseudo-inverse `inf { t : f(t) >= v }`.
    ///
    /// Without `start_from_zero` the result is defined from the first value
    /// of `f`. With it the result starts at `0`: a first value above zero is
    /// preceded by the constant `defined_from()`, a first value below zero
    /// is clipped.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if the sequence is not finite and
    /// non-decreasing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::element::{Point, Segment};
    /// # use tropic_curves::sequence::Sequence;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// // f(t) = 2t on [0, 2)
    /// let f = Sequence::new(vec![
    ///     Point::new(Rational::from(0), Rational::from(0)).into(),
    ///     Segment::new(Rational::from(0), Rational::from(2), Rational::from(0), Rational::from(2)).into(),
    /// ]);
    /// let inverse = f.lower_pseudo_inverse(false).unwrap();
    /// assert_eq!(inverse.value_at(&Rational::from(3)).unwrap(), Rational::new(3, 2));
    /// ```
    pub fn lower_pseudo_inverse(&self, start_from_zero: bool) -> AlgebraResult<Sequence> {
        pseudo_inverse(self, Inverse::Lower, start_from_zero)
    }

    /// Computes the upper pseudo-inverse `sup { t : f(t) <= v }`.
    ///
    /// See [`Sequence::lower_pseudo_inverse`] for the meaning of
    /// `start_from_zero` and the errors.
    pub fn upper_pseudo_inverse(&self, start_from_zero: bool) -> AlgebraResult<Sequence> {
        pseudo_inverse(self, Inverse::Upper, start_from_zero)
    }
}

fn pseudo_inverse(f: &Sequence, kind: Inverse, start_from_zero: bool) -> AlgebraResult<Sequence> {
    if !f.is_finite() {
        return Err(AlgebraError::Precondition(
            "pseudo-inverse requires a finite sequence".to_string(),
        ));
    }
    if !f.is_non_decreasing() {
        return Err(AlgebraError::Precondition(
            "pseudo-inverse requires a non-decreasing sequence".to_string(),
        ));
    }

    let mut from = f.first().first_value().clone();
    let mut from_included = f.is_left_closed();
    let to = f.last().last_value();
    // A flat end attains its value without closing the domain.
    let to_included = f.is_right_closed() || f.last().as_segment().is_some_and(Segment::is_constant);
    let mut elements = Vec::new();

    if start_from_zero {
        if from.is_positive() {
            elements = Sequence::constant(f.defined_from().clone(), Rational::zero(), from.clone())
                .into_elements();
        } else if from.is_negative() {
            from = Rational::zero();
        }
        from_included = true;
        if from > to {
            return Err(AlgebraError::Precondition(format!(
                "sequence values end at {}, below zero",
                to
            )));
        }
    }

    if from == to {
        elements.push(Element::Point(Point::new(from.clone(), evaluate(f, kind, &from))));
        return Sequence::try_new(elements);
    }

    let mut values = value_breakpoints(f);
    values.retain(|v| &from < v && v < &to);
    values.insert(0, from);
    values.push(to);

    let last = values.len() - 1;
    for (i, value) in values.iter().enumerate() {
        let keep_point = (i > 0 && i < last) || (i == 0 && from_included) || (i == last && to_included);
        if keep_point {
            elements.push(Element::Point(Point::new(value.clone(), evaluate(f, kind, value))));
        }
        if let Some(next) = values.get(i + 1) {
            elements.push(Element::Segment(piece(f, kind, value, next)));
        }
    }

    Sequence::try_new(merge_collinear(elements))
}

/// Point values and segment limits of `f`, sorted and deduplicated.
fn value_breakpoints(f: &Sequence) -> Vec<Rational> {
    let mut values: Vec<Rational> = Vec::with_capacity(f.len() * 2);
    for element in f.elements() {
        match element {
            Element::Point(p) => values.push(p.value().clone()),
            Element::Segment(s) => {
                values.push(s.right_limit_at_start_time().clone());
                values.push(s.left_limit_at_end_time());
            }
        }
    }
    values.sort_unstable();
    values.dedup();
    values
}

/// Returns `true` if the element attains a value `>= v`.
fn reaches(element: &Element, v: &Rational) -> bool {
    match element {
        Element::Point(p) => p.value() >= v,
        Element::Segment(s) => s.right_limit_at_start_time() >= v || &s.left_limit_at_end_time() > v,
    }
}

/// Returns `true` if the element attains a value `<= v`.
fn stays_below(element: &Element, v: &Rational) -> bool {
    match element {
        Element::Point(p) => p.value() <= v,
        Element::Segment(s) => s.right_limit_at_start_time() < v || &s.left_limit_at_end_time() <= v,
    }
}

/// The element deciding the inverse at `v`: the first one reaching `v`
/// for the lower inverse, the last one staying below `v` for the upper.
fn deciding_element<'a>(f: &'a Sequence, kind: Inverse, v: &Rational) -> Option<&'a Element> {
    let elements = f.elements();
    match kind {
        Inverse::Lower => elements.get(elements.partition_point(|e| !reaches(e, v))),
        Inverse::Upper => {
            let idx = elements.partition_point(|e| stays_below(e, v));
            idx.checked_sub(1).map(|i| &elements[i])
        }
    }
}

/// The segment of `f` on which the inverse at `v` is affine, if any.
fn affine_segment<'a>(f: &'a Sequence, kind: Inverse, v: &Rational) -> Option<&'a Segment> {
    match (kind, deciding_element(f, kind, v)) {
        (Inverse::Lower, Some(Element::Segment(s))) if s.right_limit_at_start_time() < v => Some(s),
        (Inverse::Upper, Some(Element::Segment(s))) if &s.left_limit_at_end_time() > v => Some(s),
        _ => None,
    }
}

fn evaluate(f: &Sequence, kind: Inverse, v: &Rational) -> Rational {
    if let Some(s) = affine_segment(f, kind, v) {
        return s.start_time() + (v - s.right_limit_at_start_time()) / s.slope();
    }
    match (kind, deciding_element(f, kind, v)) {
        (_, Some(Element::Point(p))) => p.time().clone(),
        (Inverse::Lower, Some(Element::Segment(s))) => s.start_time().clone(),
        (Inverse::Upper, Some(Element::Segment(s))) => s.end_time().clone(),
        (Inverse::Lower, None) => f.defined_until().clone(),
        (Inverse::Upper, None) => f.defined_from().clone(),
    }
}

/// The inverse on the open value interval `(lo, hi)`, which contains no
/// value breakpoint of `f`.
fn piece(f: &Sequence, kind: Inverse, lo: &Rational, hi: &Rational) -> Segment {
    let middle = (lo + hi) / Rational::from(2);
    match affine_segment(f, kind, &middle) {
        Some(s) => Segment::new(
            lo.clone(),
            hi.clone(),
            s.start_time() + (lo - s.right_limit_at_start_time()) / s.slope(),
            Rational::one() / s.slope(),
        ),
        None => Segment::constant(lo.clone(), hi.clone(), evaluate(f, kind, &middle)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(v: i64) -> Rational {
        Rational::from(v)
    }

    fn seg(a: i64, b: i64, r: i64, s: i64) -> Element {
        Segment::new(q(a), q(b), q(r), q(s)).into()
    }

    fn pt(t: i64, v: i64) -> Element {
        Point::new(q(t), q(v)).into()
    }

    #[test]
    fn test_identity_is_self_inverse() {
        let f = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 1)]);
        assert_eq!(f.lower_pseudo_inverse(false).unwrap(), f);
        assert_eq!(f.upper_pseudo_inverse(false).unwrap(), f);
    }

    #[test]
    fn test_slope_is_inverted() {
        let f = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 2)]);
        let expected = Sequence::new(vec![
            pt(0, 0),
            Segment::new(q(0), q(4), q(0), Rational::new(1, 2)).into(),
        ]);
        assert_eq!(f.upper_pseudo_inverse(false).unwrap(), expected);
    }

    #[test]
    fn test_step_becomes_flat() {
        // 0 on [0, 1), 1 on [1, 2)
        let f = Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 0), pt(1, 1), seg(1, 2, 1, 0)]);

        let lower = f.lower_pseudo_inverse(false).unwrap();
        assert_eq!(lower.elements(), &[pt(0, 0), seg(0, 1, 1, 0), pt(1, 1)]);

        let upper = f.upper_pseudo_inverse(false).unwrap();
        assert_eq!(upper.elements(), &[pt(0, 1), seg(0, 1, 1, 0), pt(1, 2)]);
    }

    #[test]
    fn test_constant_collapses_to_point() {
        let f = Sequence::constant(q(3), q(0), q(2));
        assert_eq!(f.lower_pseudo_inverse(false).unwrap().elements(), &[pt(3, 0)]);
        assert_eq!(f.upper_pseudo_inverse(false).unwrap().elements(), &[pt(3, 2)]);
    }

    #[test]
    fn test_start_from_zero_prepends_constant() {
        // t + 1 on [1, 3)
        let f = Sequence::new(vec![pt(1, 2), seg(1, 3, 2, 1)]);
        let inverse = f.lower_pseudo_inverse(true).unwrap();
        assert_eq!(inverse.defined_from(), &q(0));
        assert_eq!(inverse.value_at(&q(1)).unwrap(), q(1));
        assert_eq!(inverse.value_at(&q(2)).unwrap(), q(1));
        assert_eq!(inverse.value_at(&q(3)).unwrap(), q(2));
        assert_eq!(inverse.defined_until(), &q(4));
    }

    #[test]
    fn test_start_from_zero_clips_negative_values() {
        // t - 1 on [0, 3)
        let f = Sequence::new(vec![pt(0, -1), seg(0, 3, -1, 1)]);
        let inverse = f.upper_pseudo_inverse(true).unwrap();
        assert_eq!(inverse.elements(), &[pt(0, 1), seg(0, 2, 1, 1)]);

        let below = Sequence::new(vec![pt(0, -3), seg(0, 1, -3, 1)]);
        assert!(matches!(
            below.upper_pseudo_inverse(true),
            Err(AlgebraError::Precondition(_))
        ));
    }

    #[test]
    fn test_inverse_of_inverse() {
        let f = Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 2), pt(1, 2), seg(1, 3, 2, 1)]);
        let upper = f.upper_pseudo_inverse(false).unwrap();
        assert_eq!(
            upper.elements(),
            &[
                pt(0, 0),
                Segment::new(q(0), q(2), q(0), Rational::new(1, 2)).into(),
                pt(2, 1),
                seg(2, 4, 1, 1),
            ]
        );
        let back = upper.lower_pseudo_inverse(false).unwrap();
        assert!(Sequence::equivalent(&back, &f));
    }

    #[test]
    fn test_left_open_sequence() {
        let f = Sequence::new(vec![seg(0, 2, 1, 1), pt(2, 3)]);
        let inverse = f.lower_pseudo_inverse(false).unwrap();
        assert!(inverse.is_left_open());
        assert!(inverse.is_right_closed());
        assert_eq!(inverse.elements(), &[seg(1, 3, 0, 1), pt(3, 2)]);
    }

    #[test]
    fn test_preconditions() {
        let decreasing = Sequence::new(vec![pt(0, 0), seg(0, 1, 0, -1)]);
        assert!(matches!(
            decreasing.lower_pseudo_inverse(false),
            Err(AlgebraError::Precondition(_))
        ));
        let infinite = Sequence::new(vec![
            pt(0, 0),
            Segment::constant(q(0), q(1), Rational::PLUS_INFINITY).into(),
        ]);
        assert!(matches!(
            infinite.upper_pseudo_inverse(false),
            Err(AlgebraError::Precondition(_))
        ));
    }
}
