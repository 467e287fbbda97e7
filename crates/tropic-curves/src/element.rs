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

//! # Elements
//!
//! The building blocks of every piecewise-linear function in this crate.
//! An `Element` is either a `Point`, the value of a function at a single
//! instant, or a `Segment`, an affine piece on an open time interval. A
//! `Sequence` alternates the two kinds so that discontinuities are
//! represented exactly: the value at a breakpoint lives in its own point,
//! the one-sided limits live in the neighbouring segments.
//!
//! ## Operations
//!
//! - `addition`, `minimum`, `maximum` over a shared domain.
//! - `convolution` (min-plus) and `max_plus_convolution` of two elements,
//!   which yield at most three elements. Results are returned in a
//!   `SmallVec` so the hot path of a sequence convolution does not allocate.
//!
//! ## Infinite values
//!
//! A segment whose value is `+∞` or `-∞` is constant, its slope is forced to
//! zero on construction. In the min-plus convolution `+∞` absorbs every
//! other value; in the max-plus convolution `-∞` does.

use crate::error::{AlgebraError, AlgebraResult};
use num_traits::Zero;
use smallvec::{SmallVec, smallvec};
use tropic_core::{math::interval::TimeInterval, num::rational::Rational};

/// The value of a function at a single instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    time: Rational,
    value: Rational,
}

impl Point {
    /// Creates a new `Point`.
    ///
    /// # Panics
    ///
    /// Panics if `time` is not finite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::element::Point;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let p = Point::new(Rational::from(2), Rational::from(5));
    /// assert_eq!(p.time(), &Rational::from(2));
    /// ```
    #[inline]
    pub fn new(time: Rational, value: Rational) -> Self {
        assert!(time.is_finite(), "Invalid point: time must be finite");
        Self { time, value }
    }

    /// Creates a new `Point` if `time` is finite.
    pub fn try_new(time: Rational, value: Rational) -> AlgebraResult<Self> {
        if !time.is_finite() {
            return Err(AlgebraError::Structure(format!(
                "point time must be finite, got {}",
                time
            )));
        }
        Ok(Self { time, value })
    }

    /// The point `(0, 0)`.
    #[inline]
    pub fn origin() -> Self {
        Self::new(Rational::zero(), Rational::zero())
    }

    #[inline]
    pub fn time(&self) -> &Rational {
        &self.time
    }

    #[inline]
    pub fn value(&self) -> &Rational {
        &self.value
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }

    #[inline]
    pub fn negate(&self) -> Self {
        Self {
            time: self.time.clone(),
            value: -&self.value,
        }
    }
}

/// An affine piece of a function on the open interval `(start_time, end_time)`.
///
/// The segment stores the right limit at its start and its slope; the left
/// limit at its end is derived. Neither endpoint belongs to the segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    start_time: Rational,
    end_time: Rational,
    right_limit_at_start_time: Rational,
    slope: Rational,
}

impl Segment {
    /// Creates a new `Segment`.
    ///
    /// If `right_limit_at_start_time` is infinite the slope is set to zero.
    ///
    /// # Panics
    ///
    /// Panics if the times are not finite, if `start_time >= end_time`, or
    /// if the slope is not finite.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::element::Segment;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let s = Segment::new(Rational::from(0), Rational::from(2), Rational::from(1), Rational::from(3));
    /// assert_eq!(s.left_limit_at_end_time(), Rational::from(7));
    /// ```
    #[inline]
    pub fn new(
        start_time: Rational,
        end_time: Rational,
        right_limit_at_start_time: Rational,
        slope: Rational,
    ) -> Self {
        match Self::try_new(start_time, end_time, right_limit_at_start_time, slope) {
            Ok(segment) => segment,
            Err(e) => panic!("Invalid segment: {}", e),
        }
    }

    /// Creates a new `Segment`, validating its bounds and slope.
    pub fn try_new(
        start_time: Rational,
        end_time: Rational,
        right_limit_at_start_time: Rational,
        slope: Rational,
    ) -> AlgebraResult<Self> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(AlgebraError::Structure(format!(
                "segment bounds must be finite, got ({}, {})",
                start_time, end_time
            )));
        }
        if start_time >= end_time {
            return Err(AlgebraError::Structure(format!(
                "segment start {} must precede its end {}",
                start_time, end_time
            )));
        }
        if !slope.is_finite() {
            return Err(AlgebraError::Structure(format!(
                "segment slope must be finite, got {}",
                slope
            )));
        }
        let slope = if right_limit_at_start_time.is_finite() {
            slope
        } else {
            Rational::zero()
        };
        Ok(Self {
            start_time,
            end_time,
            right_limit_at_start_time,
            slope,
        })
    }

    /// Creates a constant segment.
    #[inline]
    pub fn constant(start_time: Rational, end_time: Rational, value: Rational) -> Self {
        Self::new(start_time, end_time, value, Rational::zero())
    }

    #[inline]
    pub fn start_time(&self) -> &Rational {
        &self.start_time
    }

    #[inline]
    pub fn end_time(&self) -> &Rational {
        &self.end_time
    }

    #[inline]
    pub fn right_limit_at_start_time(&self) -> &Rational {
        &self.right_limit_at_start_time
    }

    #[inline]
    pub fn slope(&self) -> &Rational {
        &self.slope
    }

    #[inline]
    pub fn length(&self) -> Rational {
        &self.end_time - &self.start_time
    }

    #[inline]
    pub fn left_limit_at_end_time(&self) -> Rational {
        self.extrapolate(&self.end_time)
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.slope.is_zero()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.right_limit_at_start_time.is_finite()
    }

    /// Evaluates the supporting line of the segment at `time`, which may lie
    /// outside the open domain. Used for limits at the endpoints.
    pub fn extrapolate(&self, time: &Rational) -> Rational {
        if !self.right_limit_at_start_time.is_finite() {
            return self.right_limit_at_start_time.clone();
        }
        &self.right_limit_at_start_time + &self.slope * (time - &self.start_time)
    }

    /// Returns the value at `time` if it lies strictly inside the segment.
    pub fn value_at(&self, time: &Rational) -> Option<Rational> {
        if &self.start_time < time && time < &self.end_time {
            Some(self.extrapolate(time))
        } else {
            None
        }
    }

    #[inline]
    pub fn negate(&self) -> Self {
        Self {
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            right_limit_at_start_time: -&self.right_limit_at_start_time,
            slope: -&self.slope,
        }
    }

    /// Restricts the segment to the open interval `(start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `(start, end)` is not a non-empty sub-interval of the domain.
    pub fn restrict(&self, start: &Rational, end: &Rational) -> Self {
        assert!(
            &self.start_time <= start && end <= &self.end_time,
            "Invalid restriction: ({}, {}) is not inside ({}, {})",
            start,
            end,
            self.start_time,
            self.end_time
        );
        Self::new(
            start.clone(),
            end.clone(),
            self.extrapolate(start),
            self.slope.clone(),
        )
    }
}

/// A point or a segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    Point(Point),
    Segment(Segment),
}

impl From<Point> for Element {
    #[inline]
    fn from(point: Point) -> Self {
        Element::Point(point)
    }
}

impl From<Segment> for Element {
    #[inline]
    fn from(segment: Segment) -> Self {
        Element::Segment(segment)
    }
}

impl Element {
    #[inline]
    pub fn start_time(&self) -> &Rational {
        match self {
            Element::Point(p) => &p.time,
            Element::Segment(s) => &s.start_time,
        }
    }

    #[inline]
    pub fn end_time(&self) -> &Rational {
        match self {
            Element::Point(p) => &p.time,
            Element::Segment(s) => &s.end_time,
        }
    }

    /// The domain of the element: `[t, t]` for a point, `(a, b)` for a segment.
    pub fn domain(&self) -> TimeInterval {
        match self {
            Element::Point(p) => TimeInterval::point(p.time.clone()),
            Element::Segment(s) => TimeInterval::open(s.start_time.clone(), s.end_time.clone()),
        }
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        matches!(self, Element::Point(_))
    }

    #[inline]
    pub fn is_segment(&self) -> bool {
        matches!(self, Element::Segment(_))
    }

    #[inline]
    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Element::Point(p) => Some(p),
            Element::Segment(_) => None,
        }
    }

    #[inline]
    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Element::Segment(s) => Some(s),
            Element::Point(_) => None,
        }
    }

    /// The value at a point, or the right limit at the start of a segment.
    #[inline]
    pub fn first_value(&self) -> &Rational {
        match self {
            Element::Point(p) => &p.value,
            Element::Segment(s) => &s.right_limit_at_start_time,
        }
    }

    /// The value at a point, or the left limit at the end of a segment.
    #[inline]
    pub fn last_value(&self) -> Rational {
        match self {
            Element::Point(p) => p.value.clone(),
            Element::Segment(s) => s.left_limit_at_end_time(),
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.first_value().is_finite()
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.first_value().is_infinite()
    }

    #[inline]
    pub fn is_plus_infinite(&self) -> bool {
        self.first_value().is_plus_infinite()
    }

    #[inline]
    pub fn is_minus_infinite(&self) -> bool {
        self.first_value().is_minus_infinite()
    }

    /// Returns the value at `time`, or `None` if `time` is outside the domain.
    pub fn value_at(&self, time: &Rational) -> Option<Rational> {
        match self {
            Element::Point(p) if &p.time == time => Some(p.value.clone()),
            Element::Point(_) => None,
            Element::Segment(s) => s.value_at(time),
        }
    }

    pub fn negate(&self) -> Element {
        match self {
            Element::Point(p) => Element::Point(p.negate()),
            Element::Segment(s) => Element::Segment(s.negate()),
        }
    }

    /// Shifts the element by `dt` in time and `dv` in value.
    ///
    /// # Panics
    ///
    /// Panics if `dt` or `dv` is not finite.
    pub fn translate(&self, dt: &Rational, dv: &Rational) -> Element {
        assert!(
            dt.is_finite() && dv.is_finite(),
            "Invalid translation: ({}, {}) must be finite",
            dt,
            dv
        );
        match self {
            Element::Point(p) => Element::Point(Point::new(&p.time + dt, &p.value + dv)),
            Element::Segment(s) => Element::Segment(Segment::new(
                &s.start_time + dt,
                &s.end_time + dt,
                &s.right_limit_at_start_time + dv,
                s.slope.clone(),
            )),
        }
    }

    /// Pointwise sum of two elements over the same domain.
    ///
    /// A point may be added to a segment that contains its time; the result
    /// is a point. Two segments must span the same interval.
    pub fn addition(&self, other: &Element) -> AlgebraResult<Element> {
        match (self, other) {
            (Element::Point(a), Element::Point(b)) if a.time == b.time => Ok(Element::Point(
                Point::new(a.time.clone(), a.value.checked_add(&b.value)?),
            )),
            (Element::Point(p), Element::Segment(s)) | (Element::Segment(s), Element::Point(p)) => {
                let value = s.value_at(&p.time).ok_or_else(|| {
                    AlgebraError::ArgumentShape(format!(
                        "point at {} is outside segment ({}, {})",
                        p.time, s.start_time, s.end_time
                    ))
                })?;
                Ok(Element::Point(Point::new(
                    p.time.clone(),
                    p.value.checked_add(&value)?,
                )))
            }
            (Element::Segment(a), Element::Segment(b))
                if a.start_time == b.start_time && a.end_time == b.end_time =>
            {
                let value = a
                    .right_limit_at_start_time
                    .checked_add(&b.right_limit_at_start_time)?;
                Ok(Element::Segment(Segment::new(
                    a.start_time.clone(),
                    a.end_time.clone(),
                    value,
                    &a.slope + &b.slope,
                )))
            }
            _ => Err(AlgebraError::ArgumentShape(format!(
                "cannot add elements over different domains {} and {}",
                self.domain(),
                other.domain()
            ))),
        }
    }

    /// Pointwise minimum of two elements over the same domain.
    ///
    /// Two crossing segments are split at the exact crossing time, giving
    /// a segment, a point and a segment.
    pub fn minimum(&self, other: &Element) -> AlgebraResult<SmallVec<Element, 3>> {
        match (self, other) {
            (Element::Point(a), Element::Point(b)) if a.time == b.time => {
                Ok(smallvec![Element::Point(Point::new(
                    a.time.clone(),
                    a.value.min_ref(&b.value).clone(),
                ))])
            }
            (Element::Point(p), Element::Segment(s)) | (Element::Segment(s), Element::Point(p)) => {
                let value = s.value_at(&p.time).ok_or_else(|| {
                    AlgebraError::ArgumentShape(format!(
                        "point at {} is outside segment ({}, {})",
                        p.time, s.start_time, s.end_time
                    ))
                })?;
                Ok(smallvec![Element::Point(Point::new(
                    p.time.clone(),
                    p.value.min_ref(&value).clone(),
                ))])
            }
            (Element::Segment(a), Element::Segment(b))
                if a.start_time == b.start_time && a.end_time == b.end_time =>
            {
                Ok(segment_minimum(a, b))
            }
            _ => Err(AlgebraError::ArgumentShape(format!(
                "cannot compare elements over different domains {} and {}",
                self.domain(),
                other.domain()
            ))),
        }
    }

    /// Pointwise maximum of two elements over the same domain.
    pub fn maximum(&self, other: &Element) -> AlgebraResult<SmallVec<Element, 3>> {
        let negated = self.negate().minimum(&other.negate())?;
        Ok(negated.iter().map(Element::negate).collect())
    }

    /// Min-plus convolution of two elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::element::{Element, Segment};
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let a: Element = Segment::new(Rational::from(0), Rational::from(1), Rational::from(0), Rational::from(1)).into();
    /// let b: Element = Segment::new(Rational::from(0), Rational::from(2), Rational::from(0), Rational::from(3)).into();
    /// // smaller slope first, then the larger one
    /// assert_eq!(a.convolution(&b).len(), 3);
    /// ```
    pub fn convolution(&self, other: &Element) -> SmallVec<Element, 3> {
        if self.is_plus_infinite() || other.is_plus_infinite() {
            return smallvec![minkowski_constant(self, other, Rational::PLUS_INFINITY)];
        }
        if self.is_minus_infinite() || other.is_minus_infinite() {
            return smallvec![minkowski_constant(self, other, Rational::MINUS_INFINITY)];
        }

        match (self, other) {
            (Element::Point(a), Element::Point(b)) => smallvec![Element::Point(Point::new(
                &a.time + &b.time,
                &a.value + &b.value,
            ))],
            (Element::Point(p), Element::Segment(s)) | (Element::Segment(s), Element::Point(p)) => {
                smallvec![Element::Segment(Segment::new(
                    &s.start_time + &p.time,
                    &s.end_time + &p.time,
                    &s.right_limit_at_start_time + &p.value,
                    s.slope.clone(),
                ))]
            }
            (Element::Segment(a), Element::Segment(b)) => {
                let (first, second) = if a.slope <= b.slope { (a, b) } else { (b, a) };
                let start = &first.start_time + &second.start_time;
                let end = &first.end_time + &second.end_time;
                let value = &first.right_limit_at_start_time + &second.right_limit_at_start_time;
                if first.slope == second.slope {
                    return smallvec![Element::Segment(Segment::new(
                        start,
                        end,
                        value,
                        first.slope.clone(),
                    ))];
                }
                let knee_time = &first.end_time + &second.start_time;
                let knee_value = first.left_limit_at_end_time() + &second.right_limit_at_start_time;
                smallvec![
                    Element::Segment(Segment::new(
                        start,
                        knee_time.clone(),
                        value,
                        first.slope.clone(),
                    )),
                    Element::Point(Point::new(knee_time.clone(), knee_value.clone())),
                    Element::Segment(Segment::new(knee_time, end, knee_value, second.slope.clone())),
                ]
            }
        }
    }

    /// Max-plus convolution of two elements: the larger slope comes first
    /// and `-∞` absorbs.
    pub fn max_plus_convolution(&self, other: &Element) -> SmallVec<Element, 3> {
        self.negate()
            .convolution(&other.negate())
            .iter()
            .map(Element::negate)
            .collect()
    }
}

/// A constant piece over the Minkowski sum of the two domains.
fn minkowski_constant(a: &Element, b: &Element, value: Rational) -> Element {
    let start = a.start_time() + b.start_time();
    let end = a.end_time() + b.end_time();
    if start == end {
        Element::Point(Point::new(start, value))
    } else {
        Element::Segment(Segment::constant(start, end, value))
    }
}

fn segment_minimum(a: &Segment, b: &Segment) -> SmallVec<Element, 3> {
    if !a.is_finite() || !b.is_finite() {
        let lower = if a.right_limit_at_start_time <= b.right_limit_at_start_time {
            a
        } else {
            b
        };
        return smallvec![Element::Segment(lower.clone())];
    }

    let start_diff = &a.right_limit_at_start_time - &b.right_limit_at_start_time;
    let end_diff = a.left_limit_at_end_time() - b.left_limit_at_end_time();
    let crosses = (start_diff.is_negative() && end_diff.is_positive())
        || (start_diff.is_positive() && end_diff.is_negative());
    if !crosses {
        let a_is_lower = start_diff.is_negative()
            || end_diff.is_negative()
            || (start_diff.is_zero() && end_diff.is_zero());
        return smallvec![Element::Segment(if a_is_lower { a } else { b }.clone())];
    }

    let crossing = &a.start_time
        + (&b.right_limit_at_start_time - &a.right_limit_at_start_time) / (&a.slope - &b.slope);
    let (before, after) = if start_diff.is_negative() { (a, b) } else { (b, a) };
    let value = before.extrapolate(&crossing);
    smallvec![
        Element::Segment(before.restrict(&before.start_time, &crossing)),
        Element::Point(Point::new(crossing.clone(), value)),
        Element::Segment(after.restrict(&crossing, &after.end_time)),
    ]
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
    fn test_segment_limits() {
        let s = Segment::new(q(1), q(3), q(2), Rational::new(1, 2));
        assert_eq!(s.left_limit_at_end_time(), q(3));
        assert_eq!(s.value_at(&q(2)), Some(Rational::new(5, 2)));
        assert_eq!(s.value_at(&q(1)), None);
        assert_eq!(s.value_at(&q(3)), None);
        assert_eq!(s.length(), q(2));
    }

    #[test]
    #[should_panic(expected = "Invalid segment")]
    fn test_segment_requires_positive_length() {
        Segment::new(q(2), q(2), q(0), q(0));
    }

    #[test]
    fn test_infinite_segment_is_constant() {
        let s = Segment::new(q(0), q(1), Rational::PLUS_INFINITY, q(5));
        assert!(s.is_constant());
        assert_eq!(s.left_limit_at_end_time(), Rational::PLUS_INFINITY);
    }

    #[test]
    fn test_point_try_new_rejects_infinite_time() {
        assert!(Point::try_new(Rational::PLUS_INFINITY, q(0)).is_err());
    }

    #[test]
    fn test_addition() {
        assert_eq!(seg(0, 2, 1, 1).addition(&seg(0, 2, 3, -2)).unwrap(), seg(0, 2, 4, -1));
        assert_eq!(pt(1, 2).addition(&seg(0, 2, 0, 3)).unwrap(), pt(1, 5));
        assert!(matches!(
            seg(0, 2, 1, 1).addition(&seg(0, 3, 1, 1)),
            Err(AlgebraError::ArgumentShape(_))
        ));
        let inf = Element::from(Segment::constant(q(0), q(2), Rational::PLUS_INFINITY));
        let minus_inf = Element::from(Segment::constant(q(0), q(2), Rational::MINUS_INFINITY));
        assert!(matches!(
            inf.addition(&minus_inf),
            Err(AlgebraError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_minimum_splits_at_crossing() {
        // t against 4 - t on (0, 4): they cross at t = 2
        let result = seg(0, 4, 0, 1).minimum(&seg(0, 4, 4, -1)).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[0], seg(0, 2, 0, 1));
        assert_eq!(result[1], pt(2, 2));
        assert_eq!(result[2], seg(2, 4, 2, -1));
    }

    #[test]
    fn test_minimum_touching_lines_do_not_split() {
        let result = seg(0, 4, 0, 1).minimum(&seg(0, 4, 0, 2)).unwrap();
        assert_eq!(result.as_slice(), &[seg(0, 4, 0, 1)]);
    }

    #[test]
    fn test_maximum_is_dual() {
        let result = seg(0, 4, 0, 1).maximum(&seg(0, 4, 4, -1)).unwrap();
        assert_eq!(result[0], seg(0, 2, 4, -1));
        assert_eq!(result[1], pt(2, 2));
        assert_eq!(result[2], seg(2, 4, 2, 1));
    }

    #[test]
    fn test_point_convolutions() {
        assert_eq!(pt(1, 2).convolution(&pt(3, 4)).as_slice(), &[pt(4, 6)]);
        assert_eq!(
            pt(1, 2).convolution(&seg(0, 3, 1, 5)).as_slice(),
            &[seg(1, 4, 3, 5)]
        );
    }

    #[test]
    fn test_segment_convolution_orders_slopes() {
        let steep = seg(0, 1, 0, 3);
        let flat = seg(0, 2, 1, 1);
        let expected = [seg(0, 2, 1, 1), pt(2, 3), seg(2, 3, 3, 3)];
        assert_eq!(steep.convolution(&flat).as_slice(), &expected);
        assert_eq!(flat.convolution(&steep).as_slice(), &expected);
    }

    #[test]
    fn test_segment_convolution_equal_slopes() {
        assert_eq!(
            seg(0, 1, 0, 2).convolution(&seg(1, 3, 1, 2)).as_slice(),
            &[seg(1, 4, 1, 2)]
        );
    }

    #[test]
    fn test_max_plus_segment_convolution_orders_slopes() {
        let steep = seg(0, 1, 0, 3);
        let flat = seg(0, 2, 1, 1);
        let expected = [seg(0, 1, 1, 3), pt(1, 4), seg(1, 3, 4, 1)];
        assert_eq!(steep.max_plus_convolution(&flat).as_slice(), &expected);
    }

    #[test]
    fn test_infinite_operands_absorb() {
        let inf: Element = Segment::constant(q(0), q(2), Rational::PLUS_INFINITY).into();
        let minus_inf: Element = Segment::constant(q(0), q(2), Rational::MINUS_INFINITY).into();
        let finite = seg(1, 2, 0, 1);

        let r = inf.convolution(&finite);
        assert_eq!(r.as_slice(), &[Element::from(Segment::constant(q(1), q(4), Rational::PLUS_INFINITY))]);

        let r = inf.convolution(&minus_inf);
        assert!(r[0].is_plus_infinite());

        let r = inf.max_plus_convolution(&minus_inf);
        assert!(r[0].is_minus_infinite());

        let p: Element = Point::new(q(1), Rational::MINUS_INFINITY).into();
        let r = p.convolution(&pt(2, 0));
        assert_eq!(r.as_slice(), &[Element::from(Point::new(q(3), Rational::MINUS_INFINITY))]);
    }

    #[test]
    fn test_translate_and_negate() {
        assert_eq!(seg(0, 1, 2, 3).translate(&q(2), &q(-1)), seg(2, 3, 1, 3));
        assert_eq!(seg(0, 1, 2, 3).negate(), seg(0, 1, -2, -3));
        assert_eq!(pt(1, 1).negate(), pt(1, -1));
    }

    #[test]
    fn test_domain() {
        assert!(seg(0, 1, 0, 0).domain().contains(&Rational::new(1, 2)));
        assert!(!seg(0, 1, 0, 0).domain().contains(&q(0)));
        assert!(pt(3, 0).domain().is_point());
    }
}
