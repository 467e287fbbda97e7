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

//! # Sequences
//!
//! A `Sequence` is a piecewise-linear function on a bounded interval,
//! stored as an ordered run of elements that alternate between points and
//! segments without gaps. The first and last elements decide whether the
//! domain is closed or open at either end.
//!
//! ## Invariants
//!
//! - The element list is non-empty.
//! - Consecutive elements alternate kind (point, segment, point, ...).
//! - `elements[i].end_time() == elements[i + 1].start_time()`.
//!
//! ## Highlights
//!
//! - Queries: `value_at`, one-sided limits and continuity, `element_at`,
//!   `segment_after`, `segment_before`, all answered by binary search.
//! - Reshaping: `cut` to a sub-window, `fill` gaps between sparse
//!   elements, `optimize` to merge collinear neighbours.
//! - Pointwise algebra: `minimum`, `maximum`, `addition`, `negate`.
//! - `equivalent`, which compares functions rather than element lists.
//!
//! Convolutions live in [`crate::convolution`], pseudo-inverses in
//! [`crate::inverse`].

use crate::{
    element::{Element, Point, Segment},
    envelope::{lower_envelope, upper_envelope},
    error::{AlgebraError, AlgebraResult},
};
use tropic_core::{math::interval::TimeInterval, num::rational::Rational};

/// A gap-free, alternating run of elements on a bounded interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    elements: Vec<Element>,
}

impl Sequence {
    /// Creates a new `Sequence`.
    ///
    /// # Panics
    ///
    /// Panics if the elements do not form a valid sequence.
    #[inline]
    pub fn new(elements: Vec<Element>) -> Self {
        match Self::try_new(elements) {
            Ok(sequence) => sequence,
            Err(e) => panic!("Invalid sequence: {}", e),
        }
    }

    /// Creates a new `Sequence`, validating its structure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::element::{Element, Point, Segment};
    /// # use tropic_curves::sequence::Sequence;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let ok = Sequence::try_new(vec![
    ///     Point::new(Rational::from(0), Rational::from(0)).into(),
    ///     Segment::new(Rational::from(0), Rational::from(2), Rational::from(0), Rational::from(1)).into(),
    /// ]);
    /// assert!(ok.is_ok());
    ///
    /// let gap = Sequence::try_new(vec![
    ///     Point::new(Rational::from(0), Rational::from(0)).into(),
    ///     Segment::new(Rational::from(1), Rational::from(2), Rational::from(0), Rational::from(1)).into(),
    /// ]);
    /// assert!(gap.is_err());
    /// ```
    pub fn try_new(elements: Vec<Element>) -> AlgebraResult<Self> {
        if elements.is_empty() {
            return Err(AlgebraError::Structure(
                "a sequence needs at least one element".to_string(),
            ));
        }
        for (i, pair) in elements.windows(2).enumerate() {
            if pair[0].is_point() == pair[1].is_point() {
                return Err(AlgebraError::Structure(format!(
                    "elements {} and {} do not alternate between points and segments",
                    i,
                    i + 1
                )));
            }
            if pair[0].end_time() != pair[1].start_time() {
                return Err(AlgebraError::Structure(format!(
                    "element {} ends at {} but element {} starts at {}",
                    i,
                    pair[0].end_time(),
                    i + 1,
                    pair[1].start_time()
                )));
            }
        }
        Ok(Self { elements })
    }

    /// Creates the constant `value` on `[from, to)`.
    ///
    /// # Panics
    ///
    /// Panics if `from >= to`.
    pub fn constant(value: Rational, from: Rational, to: Rational) -> Self {
        Self {
            elements: vec![
                Element::Point(Point::new(from.clone(), value.clone())),
                Element::Segment(Segment::constant(from, to, value)),
            ],
        }
    }

    /// Builds a sequence on `[from, to)` from sorted, non-overlapping
    /// elements, filling every gap with the constant `fill_with`.
    ///
    /// The result is right-closed only if the last element is a point at `to`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::element::{Element, Point};
    /// # use tropic_curves::sequence::Sequence;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let s = Sequence::fill(
    ///     vec![Point::new(Rational::from(1), Rational::from(5)).into()],
    ///     Rational::from(0),
    ///     Rational::from(3),
    ///     Rational::PLUS_INFINITY,
    /// )
    /// .unwrap();
    /// assert_eq!(s.value_at(&Rational::from(1)).unwrap(), Rational::from(5));
    /// assert_eq!(s.value_at(&Rational::from(2)).unwrap(), Rational::PLUS_INFINITY);
    /// ```
    pub fn fill(
        elements: Vec<Element>,
        from: Rational,
        to: Rational,
        fill_with: Rational,
    ) -> AlgebraResult<Self> {
        if from > to {
            return Err(AlgebraError::ArgumentShape(format!(
                "fill interval [{}, {}) is reversed",
                from, to
            )));
        }
        let mut out = Vec::with_capacity(elements.len() + 4);
        let mut cursor = from;
        let mut cursor_covered = false;

        for element in elements {
            if element.start_time() < &cursor {
                return Err(AlgebraError::Structure(format!(
                    "element starting at {} overlaps the filled prefix ending at {}",
                    element.start_time(),
                    cursor
                )));
            }
            if element.start_time() > &cursor {
                if !cursor_covered {
                    out.push(Element::Point(Point::new(cursor.clone(), fill_with.clone())));
                }
                out.push(Element::Segment(Segment::constant(
                    cursor,
                    element.start_time().clone(),
                    fill_with.clone(),
                )));
                cursor = element.start_time().clone();
                cursor_covered = false;
            }
            if element.is_segment() && !cursor_covered {
                out.push(Element::Point(Point::new(cursor.clone(), fill_with.clone())));
            }
            cursor = element.end_time().clone();
            cursor_covered = element.is_point();
            out.push(element);
        }

        if cursor > to {
            return Err(AlgebraError::ArgumentShape(format!(
                "elements extend to {}, past the fill end {}",
                cursor, to
            )));
        }
        if cursor < to {
            if !cursor_covered {
                out.push(Element::Point(Point::new(cursor.clone(), fill_with.clone())));
            }
            out.push(Element::Segment(Segment::constant(cursor, to, fill_with)));
        }

        Self::try_new(out)
    }

    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[inline]
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn first(&self) -> &Element {
        &self.elements[0]
    }

    #[inline]
    pub fn last(&self) -> &Element {
        &self.elements[self.elements.len() - 1]
    }

    #[inline]
    pub fn defined_from(&self) -> &Rational {
        self.first().start_time()
    }

    #[inline]
    pub fn defined_until(&self) -> &Rational {
        self.last().end_time()
    }

    #[inline]
    pub fn is_left_closed(&self) -> bool {
        self.first().is_point()
    }

    #[inline]
    pub fn is_left_open(&self) -> bool {
        !self.is_left_closed()
    }

    #[inline]
    pub fn is_right_closed(&self) -> bool {
        self.last().is_point()
    }

    #[inline]
    pub fn is_right_open(&self) -> bool {
        !self.is_right_closed()
    }

    /// The domain of the sequence.
    pub fn domain(&self) -> TimeInterval {
        TimeInterval::new(
            self.defined_from().clone(),
            self.defined_until().clone(),
            self.is_left_closed(),
            self.is_right_closed(),
        )
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.elements.iter().all(Element::is_finite)
    }

    /// Returns `true` if every point and every segment is non-decreasing
    /// and no jump goes down.
    pub fn is_non_decreasing(&self) -> bool {
        let slopes_ok = self
            .elements
            .iter()
            .filter_map(Element::as_segment)
            .all(|s| !s.slope().is_negative());
        slopes_ok
            && self
                .elements
                .windows(2)
                .all(|pair| pair[0].last_value() <= *pair[1].first_value())
    }

    /// Returns `true` if every point preceded by a segment equals that
    /// segment's left limit.
    pub fn is_left_continuous(&self) -> bool {
        self.elements.windows(2).all(|pair| match (&pair[0], &pair[1]) {
            (Element::Segment(s), Element::Point(p)) => s.left_limit_at_end_time() == *p.value(),
            _ => true,
        })
    }

    /// Returns `true` if every point followed by a segment equals that
    /// segment's right limit.
    pub fn is_right_continuous(&self) -> bool {
        self.elements.windows(2).all(|pair| match (&pair[0], &pair[1]) {
            (Element::Point(p), Element::Segment(s)) => p.value() == s.right_limit_at_start_time(),
            _ => true,
        })
    }

    /// The sorted start and end times of all elements, without duplicates.
    pub fn breakpoint_times(&self) -> Vec<Rational> {
        let mut times: Vec<Rational> = Vec::with_capacity(self.elements.len() / 2 + 2);
        for element in &self.elements {
            if times.last() != Some(element.start_time()) {
                times.push(element.start_time().clone());
            }
            if times.last() != Some(element.end_time()) {
                times.push(element.end_time().clone());
            }
        }
        times
    }

    /// Returns the element whose domain contains `time`.
    pub fn element_at(&self, time: &Rational) -> AlgebraResult<&Element> {
        let idx = self.elements.partition_point(|e| e.end_time() < time);
        self.elements[idx..]
            .iter()
            .take(2)
            .find(|e| match e {
                Element::Point(p) => p.time() == time,
                Element::Segment(s) => s.start_time() < time && time < s.end_time(),
            })
            .ok_or_else(|| AlgebraError::OutOfDomain { time: time.clone() })
    }

    /// Returns the segment on which the function is defined just after `time`.
    pub fn segment_after(&self, time: &Rational) -> AlgebraResult<&Segment> {
        let idx = self.elements.partition_point(|e| e.end_time() <= time);
        match self.elements.get(idx) {
            Some(Element::Segment(s)) if s.start_time() <= time => Ok(s),
            _ => Err(AlgebraError::OutOfDomain { time: time.clone() }),
        }
    }

    /// Returns the segment on which the function is defined just before `time`.
    pub fn segment_before(&self, time: &Rational) -> AlgebraResult<&Segment> {
        let idx = self.elements.partition_point(|e| e.end_time() < time);
        if let Some(Element::Segment(s)) = self.elements.get(idx)
            && s.start_time() < time
        {
            return Ok(s);
        }
        if idx > 0
            && let Element::Segment(s) = &self.elements[idx - 1]
            && s.end_time() == time
        {
            return Ok(s);
        }
        Err(AlgebraError::OutOfDomain { time: time.clone() })
    }

    /// Returns the value at `time`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::sequence::Sequence;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let s = Sequence::constant(Rational::from(3), Rational::from(0), Rational::from(2));
    /// assert_eq!(s.value_at(&Rational::from(1)).unwrap(), Rational::from(3));
    /// assert!(s.value_at(&Rational::from(2)).is_err());
    /// ```
    pub fn value_at(&self, time: &Rational) -> AlgebraResult<Rational> {
        Ok(match self.element_at(time)? {
            Element::Point(p) => p.value().clone(),
            Element::Segment(s) => s.extrapolate(time),
        })
    }

    pub fn left_limit_at(&self, time: &Rational) -> AlgebraResult<Rational> {
        Ok(self.segment_before(time)?.extrapolate(time))
    }

    pub fn right_limit_at(&self, time: &Rational) -> AlgebraResult<Rational> {
        Ok(self.segment_after(time)?.extrapolate(time))
    }

    pub fn is_left_continuous_at(&self, time: &Rational) -> AlgebraResult<bool> {
        Ok(self.left_limit_at(time)? == self.value_at(time)?)
    }

    pub fn is_right_continuous_at(&self, time: &Rational) -> AlgebraResult<bool> {
        Ok(self.right_limit_at(time)? == self.value_at(time)?)
    }

    /// Restricts the sequence to the window from `start` to `end`.
    ///
    /// Cutting is idempotent: cutting again with the same window returns an
    /// equal sequence.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentShape` for a reversed or empty window and
    /// `OutOfDomain` if the window is not inside the domain.
    pub fn cut(
        &self,
        start: &Rational,
        end: &Rational,
        include_start: bool,
        include_end: bool,
    ) -> AlgebraResult<Sequence> {
        let window = TimeInterval::try_new(start.clone(), end.clone(), include_start, include_end)
            .filter(|w| !w.is_empty())
            .ok_or_else(|| {
                AlgebraError::ArgumentShape(format!(
                    "cannot cut to an empty window from {} to {}",
                    start, end
                ))
            })?;
        let domain = self.domain();
        if !domain.contains_interval(&window) {
            let time = if window.start() < domain.start()
                || (window.start() == domain.start()
                    && window.is_start_included()
                    && !domain.is_start_included())
            {
                start.clone()
            } else {
                end.clone()
            };
            return Err(AlgebraError::OutOfDomain { time });
        }

        let mut out = Vec::new();
        for element in &self.elements {
            match element {
                Element::Point(p) => {
                    if window.contains(p.time()) {
                        out.push(element.clone());
                    }
                }
                Element::Segment(s) => {
                    if window.is_point() {
                        if let Some(value) = s.value_at(start) {
                            out.push(Element::Point(Point::new(start.clone(), value)));
                        }
                        continue;
                    }
                    let a = s.start_time().max_ref(start);
                    let b = s.end_time().min_ref(end);
                    if a >= b {
                        continue;
                    }
                    if include_start && a == start && s.start_time() < start {
                        out.push(Element::Point(Point::new(start.clone(), s.extrapolate(start))));
                    }
                    out.push(Element::Segment(s.restrict(a, b)));
                    if include_end && b == end && end < s.end_time() {
                        out.push(Element::Point(Point::new(end.clone(), s.extrapolate(end))));
                    }
                }
            }
        }

        Self::try_new(out)
    }

    /// Shorthand for `cut(start, end, true, false)`.
    #[inline]
    pub fn cut_closed_open(&self, start: &Rational, end: &Rational) -> AlgebraResult<Sequence> {
        self.cut(start, end, true, false)
    }

    /// Merges neighbouring segments that lie on the same line and are joined
    /// by a point on that line.
    pub fn optimize(&self) -> Sequence {
        Self {
            elements: merge_collinear(self.elements.clone()),
        }
    }

    pub fn negate(&self) -> Sequence {
        Self {
            elements: self.elements.iter().map(Element::negate).collect(),
        }
    }

    /// Shifts the sequence by `dt` in time and `dv` in value.
    pub fn translate(&self, dt: &Rational, dv: &Rational) -> Sequence {
        Self {
            elements: self.elements.iter().map(|e| e.translate(dt, dv)).collect(),
        }
    }

    /// Pointwise minimum of two sequences.
    ///
    /// With `cut_to_overlap` the result is restricted to the intersection of
    /// the two domains; otherwise it spans their union, which must be
    /// gap-free.
    pub fn minimum(a: &Sequence, b: &Sequence, cut_to_overlap: bool) -> AlgebraResult<Sequence> {
        let elements = pointwise_operands(a, b, cut_to_overlap)?;
        Self::try_new(merge_collinear(lower_envelope(&elements)))
    }

    /// Pointwise maximum of two sequences, the dual of [`Sequence::minimum`].
    pub fn maximum(a: &Sequence, b: &Sequence, cut_to_overlap: bool) -> AlgebraResult<Sequence> {
        let elements = pointwise_operands(a, b, cut_to_overlap)?;
        Self::try_new(merge_collinear(upper_envelope(&elements)))
    }

    /// Pointwise sum of two sequences over the intersection of their domains.
    pub fn addition(a: &Sequence, b: &Sequence) -> AlgebraResult<Sequence> {
        let overlap = overlap(a, b)?;
        let a = a.cut(overlap.start(), overlap.end(), overlap.is_start_included(), overlap.is_end_included())?;
        let b = b.cut(overlap.start(), overlap.end(), overlap.is_start_included(), overlap.is_end_included())?;

        let times = merged_breakpoints(&a, &b);
        let mut out = Vec::with_capacity(times.len() * 2);
        for (i, time) in times.iter().enumerate() {
            if overlap.contains(time) {
                let value = a.value_at(time)?.checked_add(&b.value_at(time)?)?;
                out.push(Element::Point(Point::new(time.clone(), value)));
            }
            if let Some(next) = times.get(i + 1) {
                let sa = a.segment_after(time)?;
                let sb = b.segment_after(time)?;
                let value = sa.extrapolate(time).checked_add(&sb.extrapolate(time))?;
                out.push(Element::Segment(Segment::new(
                    time.clone(),
                    next.clone(),
                    value,
                    sa.slope() + sb.slope(),
                )));
            }
        }
        Self::try_new(merge_collinear(out))
    }

    /// Returns `true` if both sequences describe the same function: same
    /// domain, and equal values and one-sided limits at every instant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::element::{Element, Point, Segment};
    /// # use tropic_curves::sequence::Sequence;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let one = Sequence::constant(Rational::from(1), Rational::from(0), Rational::from(2));
    /// let split = Sequence::new(vec![
    ///     Point::new(Rational::from(0), Rational::from(1)).into(),
    ///     Segment::constant(Rational::from(0), Rational::from(1), Rational::from(1)).into(),
    ///     Point::new(Rational::from(1), Rational::from(1)).into(),
    ///     Segment::constant(Rational::from(1), Rational::from(2), Rational::from(1)).into(),
    /// ]);
    /// assert!(Sequence::equivalent(&one, &split));
    /// assert_ne!(one, split);
    /// ```
    pub fn equivalent(a: &Sequence, b: &Sequence) -> bool {
        let domain = a.domain();
        if domain != b.domain() {
            return false;
        }
        merged_breakpoints(a, b).iter().all(|time| {
            let values_agree = !domain.contains(time) || a.value_at(time).ok() == b.value_at(time).ok();
            let right_agree = time >= domain.end() || a.right_limit_at(time).ok() == b.right_limit_at(time).ok();
            let left_agree = time <= domain.start() || a.left_limit_at(time).ok() == b.left_limit_at(time).ok();
            values_agree && right_agree && left_agree
        })
    }
}

/// Merges collinear neighbours in a valid run of elements.
pub(crate) fn merge_collinear(elements: Vec<Element>) -> Vec<Element> {
    let mut out: Vec<Element> = Vec::with_capacity(elements.len());
    for element in elements {
        if let Element::Segment(next) = &element
            && out.len() >= 2
            && let (Element::Segment(prev), Element::Point(joint)) =
                (&out[out.len() - 2], &out[out.len() - 1])
            && prev.end_time() == next.start_time()
            && prev.slope() == next.slope()
            && prev.left_limit_at_end_time() == *joint.value()
            && joint.value() == next.right_limit_at_start_time()
        {
            let merged = Segment::new(
                prev.start_time().clone(),
                next.end_time().clone(),
                prev.right_limit_at_start_time().clone(),
                prev.slope().clone(),
            );
            out.truncate(out.len() - 2);
            out.push(Element::Segment(merged));
            continue;
        }
        out.push(element);
    }
    out
}

fn overlap(a: &Sequence, b: &Sequence) -> AlgebraResult<TimeInterval> {
    a.domain().intersection(&b.domain()).ok_or_else(|| {
        AlgebraError::ArgumentShape(format!(
            "domains {} and {} do not overlap",
            a.domain(),
            b.domain()
        ))
    })
}

fn pointwise_operands(a: &Sequence, b: &Sequence, cut_to_overlap: bool) -> AlgebraResult<Vec<Element>> {
    if cut_to_overlap {
        let overlap = overlap(a, b)?;
        let a = a.cut(overlap.start(), overlap.end(), overlap.is_start_included(), overlap.is_end_included())?;
        let b = b.cut(overlap.start(), overlap.end(), overlap.is_start_included(), overlap.is_end_included())?;
        Ok(a.elements.into_iter().chain(b.elements).collect())
    } else {
        Ok(a.elements.iter().chain(b.elements.iter()).cloned().collect())
    }
}

fn merged_breakpoints(a: &Sequence, b: &Sequence) -> Vec<Rational> {
    let mut times = a.breakpoint_times();
    times.extend(b.breakpoint_times());
    times.sort_unstable();
    times.dedup();
    times
}
