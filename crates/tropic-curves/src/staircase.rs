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

//! # Staircase Curves
//!
//! Builders for the curve families used by tests and benchmarks: plain
//! stairs, rate-latency curves and two staircases with affine treads.
//! All of them are non-decreasing and start at `0`.

use crate::{
    curve::Curve,
    element::{Element, Point, Segment},
    sequence::Sequence,
};
use num_traits::Zero;
use tropic_core::num::rational::Rational;

/// A stair of width `width` and height `height`: `0` at `0`, then
/// `height · ceil(t / width)`.
///
/// # Panics
///
/// Panics unless `width` is positive and `height` is finite.
///
/// # Examples
///
/// ```rust
/// # use tropic_curves::staircase::stair;
/// # use tropic_core::num::rational::Rational;
///
/// let f = stair(Rational::from(2), Rational::from(3));
/// assert_eq!(f.value_at(&Rational::from(1)).unwrap(), Rational::from(3));
/// assert_eq!(f.value_at(&Rational::from(5)).unwrap(), Rational::from(9));
/// ```
pub fn stair(width: Rational, height: Rational) -> Curve {
    let zero = Rational::zero();
    Curve::new(
        Sequence::new(vec![
            Point::origin().into(),
            Segment::constant(zero.clone(), width.clone(), height.clone()).into(),
        ]),
        zero,
        width,
        height,
    )
}

/// `rate · max(0, t - latency)`.
///
/// # Panics
///
/// Panics unless `rate` is finite and `latency` is finite and non-negative.
pub fn rate_latency(rate: Rational, latency: Rational) -> Curve {
    let zero = Rational::zero();
    let one = Rational::from(1);
    let mut elements: Vec<Element> = vec![Point::origin().into()];
    if latency.is_positive() {
        elements.push(Segment::constant(zero.clone(), latency.clone(), zero.clone()).into());
        elements.push(Point::new(latency.clone(), zero.clone()).into());
    }
    let end = &latency + &one;
    elements.push(Segment::new(latency.clone(), end, zero, rate.clone()).into());
    Curve::new(Sequence::new(elements), latency, one, rate)
}

/// A staircase whose treads alternate between slope `rate_a` over `a`,
/// a flat run of `gap_a`, slope `rate_b` over `b` and a flat run of `gap_b`.
///
/// The function is continuous, so every repetition adds
/// `a · rate_a + b · rate_b`.
///
/// # Panics
///
/// Panics unless all lengths are positive and all rates finite.
pub fn horizontal_staircase(
    a: Rational,
    rate_a: Rational,
    gap_a: Rational,
    b: Rational,
    rate_b: Rational,
    gap_b: Rational,
) -> Curve {
    let zero = Rational::zero();
    let first = &a * &rate_a;
    let second = &first + &(&b * &rate_b);
    let t1 = a.clone();
    let t2 = &t1 + &gap_a;
    let t3 = &t2 + &b;
    let t4 = &t3 + &gap_b;

    let elements: Vec<Element> = vec![
        Point::origin().into(),
        Segment::new(zero.clone(), t1.clone(), zero.clone(), rate_a).into(),
        Point::new(t1.clone(), first.clone()).into(),
        Segment::constant(t1, t2.clone(), first.clone()).into(),
        Point::new(t2.clone(), first.clone()).into(),
        Segment::new(t2, t3.clone(), first, rate_b).into(),
        Point::new(t3.clone(), second.clone()).into(),
        Segment::constant(t3, t4.clone(), second.clone()).into(),
    ];
    Curve::new(Sequence::new(elements), zero, t4, second)
}

/// A staircase with vertical risers: a transient ramp of slope `rate_a`
/// over `a`, then periodically a jump of `jump_a`, slope `rate_b` over
/// `b`, a jump of `jump_b` and slope `rate_c` over `c`.
///
/// The function is left-continuous and pseudo-periodic from `a`.
///
/// # Panics
///
/// Panics unless all lengths are positive and all rates and jumps finite.
#[allow(clippy::too_many_arguments)]
pub fn vertical_staircase(
    a: Rational,
    rate_a: Rational,
    jump_a: Rational,
    b: Rational,
    rate_b: Rational,
    jump_b: Rational,
    c: Rational,
    rate_c: Rational,
) -> Curve {
    let zero = Rational::zero();
    let v1 = &a * &rate_a;
    let v2 = &v1 + &jump_a;
    let v3 = &v2 + &(&b * &rate_b);
    let v4 = &v3 + &jump_b;
    let t1 = a.clone();
    let t2 = &t1 + &b;
    let t3 = &t2 + &c;

    let length = &b + &c;
    let height = &(&(&jump_a + &(&b * &rate_b)) + &jump_b) + &(&c * &rate_c);
    let elements: Vec<Element> = vec![
        Point::origin().into(),
        Segment::new(zero, t1.clone(), Rational::zero(), rate_a).into(),
        Point::new(t1.clone(), v1).into(),
        Segment::new(t1, t2.clone(), v2, rate_b).into(),
        Point::new(t2.clone(), v3).into(),
        Segment::new(t2, t3, v4, rate_c).into(),
    ];
    Curve::new(Sequence::new(elements), a, length, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(v: i64) -> Rational {
        Rational::from(v)
    }

    #[test]
    fn test_stair() {
        let f = stair(q(1), q(2));
        assert_eq!(f.value_at(&q(0)).unwrap(), q(0));
        assert_eq!(f.value_at(&Rational::new(1, 3)).unwrap(), q(2));
        assert_eq!(f.value_at(&q(3)).unwrap(), q(6));
        assert!(f.is_left_continuous());
        assert!(f.is_non_decreasing());
    }

    #[test]
    fn test_rate_latency() {
        let f = rate_latency(q(3), q(2));
        assert_eq!(f.value_at(&q(1)).unwrap(), q(0));
        assert_eq!(f.value_at(&q(2)).unwrap(), q(0));
        assert_eq!(f.value_at(&q(5)).unwrap(), q(9));
        assert!(f.is_left_continuous());
        assert!(f.is_right_continuous());

        let g = rate_latency(q(3), q(0));
        assert_eq!(g.value_at(&q(4)).unwrap(), q(12));
    }

    #[test]
    fn test_horizontal_staircase() {
        // slope 1 on [0, 2), flat on [2, 3), slope 2 on [3, 4), flat on [4, 6)
        let f = horizontal_staircase(q(2), q(1), q(1), q(1), q(2), q(2));
        assert_eq!(f.pseudo_period_length(), &q(6));
        assert_eq!(f.pseudo_period_height(), &q(4));
        assert_eq!(f.value_at(&q(3)).unwrap(), q(2));
        assert_eq!(f.value_at(&q(5)).unwrap(), q(4));
        assert_eq!(f.value_at(&q(7)).unwrap(), q(5));
        assert!(f.is_left_continuous() && f.is_right_continuous());
    }

    #[test]
    fn test_vertical_staircase() {
        let f = vertical_staircase(q(1), q(1), q(2), q(1), q(1), q(3), q(2), q(0));
        assert_eq!(f.pseudo_periodic_start_time(), &q(1));
        assert_eq!(f.pseudo_period_length(), &q(3));
        assert_eq!(f.pseudo_period_height(), &q(6));
        assert_eq!(f.value_at(&q(1)).unwrap(), q(1));
        assert_eq!(f.right_limit_at(&q(1)).unwrap(), q(3));
        assert_eq!(f.value_at(&q(2)).unwrap(), q(4));
        assert_eq!(f.right_limit_at(&q(2)).unwrap(), q(7));
        assert_eq!(f.value_at(&q(4)).unwrap(), q(7));
        assert_eq!(f.right_limit_at(&q(4)).unwrap(), q(9));
        assert!(f.is_left_continuous());
        assert!(f.is_non_decreasing());
    }
}
