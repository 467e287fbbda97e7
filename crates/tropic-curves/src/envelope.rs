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

//! # Envelopes
//!
//! The lower envelope of a set of possibly overlapping elements is the
//! pointwise minimum over every element defined at each instant. It is the
//! reduction step of a sequence convolution: every pair of elements is
//! convolved independently and the envelope merges the pieces.
//!
//! The envelope is computed by a sweep over the sorted start and end
//! times. At every breakpoint the instant value is the minimum of the
//! points at that time and of the segments strictly containing it; on
//! every open interval between two breakpoints the active segments are
//! plain lines, whose lower envelope is traced by following the earliest
//! crossing with a line of smaller slope.
//!
//! A sweep costs the number of breakpoints times the number of segments
//! active at each of them. Large inputs are therefore split in halves whose
//! envelopes are computed first; the two partial envelopes do not overlap
//! themselves, so the final sweep over them never has more than two active
//! segments at a time.
//!
//! The result is sorted and non-overlapping, but may contain gaps where no
//! input element is defined. Its value at any instant does not depend on
//! the order of the input.

use crate::element::{Element, Point, Segment};
use tropic_core::num::rational::Rational;

/// Computes the lower envelope of `elements`.
///
/// # Examples
///
/// ```rust
/// # use tropic_curves::element::{Element, Segment};
/// # use tropic_curves::envelope::lower_envelope;
/// # use tropic_core::num::rational::Rational;
///
/// let a: Element = Segment::new(Rational::from(0), Rational::from(4), Rational::from(0), Rational::from(1)).into();
/// let b: Element = Segment::new(Rational::from(0), Rational::from(4), Rational::from(4), Rational::from(-1)).into();
/// let envelope = lower_envelope(&[a, b]);
/// assert_eq!(envelope.len(), 3);
/// ```
pub fn lower_envelope(elements: &[Element]) -> Vec<Element> {
    if elements.len() <= SWEEP_LIMIT {
        return sweep(elements);
    }
    let (left, right) = elements.split_at(elements.len() / 2);
    let mut halves = lower_envelope(left);
    halves.extend(lower_envelope(right));
    sweep(&halves)
}

/// Inputs up to this size are swept directly.
const SWEEP_LIMIT: usize = 32;

fn sweep(elements: &[Element]) -> Vec<Element> {
    if elements.is_empty() {
        return Vec::new();
    }

    let mut times: Vec<Rational> = elements
        .iter()
        .flat_map(|e| [e.start_time().clone(), e.end_time().clone()])
        .collect();
    times.sort_unstable();
    times.dedup();

    let mut points: Vec<&Point> = elements.iter().filter_map(Element::as_point).collect();
    points.sort_by(|a, b| a.time().cmp(b.time()));
    let mut segments: Vec<&Segment> = elements.iter().filter_map(Element::as_segment).collect();
    segments.sort_by(|a, b| a.start_time().cmp(b.start_time()));

    let mut result = Vec::with_capacity(times.len() * 2);
    let mut active: Vec<&Segment> = Vec::new();
    let mut next_point = 0;
    let mut next_segment = 0;

    for (i, time) in times.iter().enumerate() {
        active.retain(|s| s.end_time() > time);

        // Active segments here all started before `time`.
        let mut value: Option<Rational> = None;
        for segment in &active {
            keep_min(&mut value, segment.extrapolate(time));
        }
        while next_point < points.len() && points[next_point].time() == time {
            keep_min(&mut value, points[next_point].value().clone());
            next_point += 1;
        }
        if let Some(value) = value {
            result.push(Element::Point(Point::new(time.clone(), value)));
        }

        while next_segment < segments.len() && segments[next_segment].start_time() == time {
            active.push(segments[next_segment]);
            next_segment += 1;
        }

        if let Some(next_time) = times.get(i + 1)
            && !active.is_empty()
        {
            envelope_of_lines(&active, time, next_time, &mut result);
        }
    }

    result
}

/// Computes the upper envelope of `elements`, the dual of [`lower_envelope`].
pub fn upper_envelope(elements: &[Element]) -> Vec<Element> {
    let negated: Vec<Element> = elements.iter().map(Element::negate).collect();
    lower_envelope(&negated)
        .iter()
        .map(Element::negate)
        .collect()
}

#[inline]
fn keep_min(slot: &mut Option<Rational>, candidate: Rational) {
    match slot {
        Some(current) if *current <= candidate => {}
        _ => *slot = Some(candidate),
    }
}

/// Traces the lower envelope of lines over the open interval `(start, end)`.
///
/// Every line in `lines` must span the whole interval.
fn envelope_of_lines(lines: &[&Segment], start: &Rational, end: &Rational, out: &mut Vec<Element>) {
    if lines.iter().any(|s| s.right_limit_at_start_time().is_minus_infinite()) {
        out.push(Element::Segment(Segment::constant(
            start.clone(),
            end.clone(),
            Rational::MINUS_INFINITY,
        )));
        return;
    }

    let finite: Vec<&Segment> = lines.iter().copied().filter(|s| s.is_finite()).collect();
    if finite.is_empty() {
        out.push(Element::Segment(Segment::constant(
            start.clone(),
            end.clone(),
            Rational::PLUS_INFINITY,
        )));
        return;
    }

    let mut cursor = start.clone();
    let mut current = 0;
    for j in 1..finite.len() {
        let candidate = finite[j].extrapolate(&cursor);
        let best = finite[current].extrapolate(&cursor);
        if candidate < best || (candidate == best && finite[j].slope() < finite[current].slope()) {
            current = j;
        }
    }

    loop {
        let current_value = finite[current].extrapolate(&cursor);
        let mut next: Option<(Rational, usize)> = None;
        for (j, line) in finite.iter().enumerate() {
            if line.slope() >= finite[current].slope() {
                continue;
            }
            let gap = line.extrapolate(&cursor) - &current_value;
            let crossing = &cursor + gap / (finite[current].slope() - line.slope());
            if crossing <= cursor || &crossing >= end {
                continue;
            }
            match &next {
                Some((t, k)) if *t < crossing || (*t == crossing && finite[*k].slope() <= line.slope()) => {}
                _ => next = Some((crossing, j)),
            }
        }

        match next {
            Some((crossing, j)) => {
                let value = finite[current].extrapolate(&crossing);
                out.push(Element::Segment(Segment::new(
                    cursor.clone(),
                    crossing.clone(),
                    current_value,
                    finite[current].slope().clone(),
                )));
                out.push(Element::Point(Point::new(crossing.clone(), value)));
                cursor = crossing;
                current = j;
            }
            None => {
                out.push(Element::Segment(Segment::new(
                    cursor,
                    end.clone(),
                    current_value,
                    finite[current].slope().clone(),
                )));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::merge_collinear;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

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
    fn test_empty() {
        assert!(lower_envelope(&[]).is_empty());
    }

    #[test]
    fn test_crossing_lines() {
        let envelope = lower_envelope(&[seg(0, 4, 0, 1), seg(0, 4, 4, -1)]);
        assert_eq!(envelope, vec![seg(0, 2, 0, 1), pt(2, 2), seg(2, 4, 2, -1)]);
    }

    #[test]
    fn test_point_below_segment() {
        let envelope = lower_envelope(&[seg(0, 4, 2, 0), pt(1, 0), pt(4, 5)]);
        assert_eq!(
            envelope,
            vec![seg(0, 1, 2, 0), pt(1, 0), seg(1, 4, 2, 0), pt(4, 5)]
        );
    }

    #[test]
    fn test_segment_below_point() {
        // The point at 2 lies above the segment covering it.
        let envelope = lower_envelope(&[seg(0, 4, 0, 0), pt(2, 1)]);
        assert_eq!(envelope, vec![seg(0, 2, 0, 0), pt(2, 0), seg(2, 4, 0, 0)]);
    }

    #[test]
    fn test_gaps_are_preserved() {
        let envelope = lower_envelope(&[seg(0, 1, 0, 0), seg(2, 3, 0, 0)]);
        assert_eq!(envelope, vec![seg(0, 1, 0, 0), seg(2, 3, 0, 0)]);
    }

    #[test]
    fn test_three_lines_two_crossings() {
        // t, then the constant 4, then 19 - 3t
        let envelope = lower_envelope(&[seg(0, 6, 19, -3), seg(0, 6, 4, 0), seg(0, 6, 0, 1)]);
        assert_eq!(
            envelope,
            vec![
                seg(0, 4, 0, 1),
                pt(4, 4),
                seg(4, 5, 4, 0),
                pt(5, 4),
                seg(5, 6, 4, -3),
            ]
        );
    }

    #[test]
    fn test_steeper_line_skips_the_middle_one() {
        let envelope = lower_envelope(&[seg(0, 6, 10, -2), seg(0, 6, 4, 0), seg(0, 6, 0, 1)]);
        let knee = Rational::new(10, 3);
        assert_eq!(
            envelope,
            vec![
                Segment::new(q(0), knee.clone(), q(0), q(1)).into(),
                Point::new(knee.clone(), knee.clone()).into(),
                Segment::new(knee.clone(), q(6), knee, q(-2)).into(),
            ]
        );
    }

    #[test]
    fn test_infinite_values() {
        let plus = Element::from(Segment::constant(q(0), q(2), Rational::PLUS_INFINITY));
        let minus = Element::from(Segment::constant(q(1), q(2), Rational::MINUS_INFINITY));
        let envelope = lower_envelope(&[plus.clone(), seg(1, 2, 0, 1)]);
        assert_eq!(envelope[0], plus_segment(0, 1));
        assert_eq!(envelope[1], Element::from(Point::new(q(1), Rational::PLUS_INFINITY)));
        assert_eq!(envelope[2], seg(1, 2, 0, 1));

        let envelope = lower_envelope(&[plus, minus, seg(1, 2, 0, 1)]);
        assert_eq!(envelope[1], Element::from(Point::new(q(1), Rational::PLUS_INFINITY)));
        assert!(envelope[2].is_minus_infinite());
    }

    fn plus_segment(a: i64, b: i64) -> Element {
        Segment::constant(q(a), q(b), Rational::PLUS_INFINITY).into()
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut elements = vec![seg(0, 4, 0, 1), pt(2, 1), seg(1, 3, 3, -1), seg(0, 4, 4, -1)];
        let forward = lower_envelope(&elements);
        elements.reverse();
        assert_eq!(forward, lower_envelope(&elements));
    }

    #[test]
    fn test_upper_envelope() {
        let envelope = upper_envelope(&[seg(0, 4, 0, 1), seg(0, 4, 4, -1)]);
        assert_eq!(envelope, vec![seg(0, 2, 4, -1), pt(2, 2), seg(2, 4, 2, 1)]);
    }

    #[test]
    fn test_split_sweep_matches_single_sweep() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let elements: Vec<Element> = (0..rng.random_range(33..200))
                .map(|_| {
                    let start = rng.random_range(0..20);
                    if rng.random_bool(0.2) {
                        pt(start, rng.random_range(-10..10))
                    } else {
                        let length = rng.random_range(1..8);
                        seg(start, start + length, rng.random_range(-10..10), rng.random_range(-3..=3))
                    }
                })
                .collect();
            let split = lower_envelope(&elements);
            assert!(split.windows(2).all(|w| w[0].end_time() <= w[1].start_time()));
            assert_eq!(merge_collinear(split), merge_collinear(sweep(&elements)));
        }
    }
}
