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

//! # Sequence Convolution
//!
//! Min-plus convolution `(f ⊗ g)(t) = inf { f(s) + g(t - s) }` and max-plus
//! convolution `(f ⊗̄ g)(t) = sup { f(s) + g(t - s) }` of two sequences.
//!
//! Both are computed the same way: every pair of elements is convolved on
//! its own (at most three result pieces per pair), then the lower (upper)
//! envelope of all pieces is taken. The pair fan-out is embarrassingly
//! parallel and runs on the `rayon` pool when the settings allow it and the
//! number of pairs reaches the threshold. Since the envelope does not depend
//! on the order of its input, the result is identical either way.
//!
//! `ConvolutionBounds` limit the output. Pairs whose earliest instant lies
//! beyond `end`, or whose latest instant lies before `start`, cannot
//! contribute and are skipped; the envelope is then cut to the window. A
//! ceiling ends the output at the instant its value reaches the ceiling,
//! which is how callers bound the value range of a result they are about
//! to invert.
//!
//! When both operands qualify, the min-plus (max-plus) convolution may be
//! computed through the isomorphism with the max-plus (min-plus)
//! convolution of pseudo-inverses, see [`crate::isomorphism`].

use crate::{
    element::{Element, Point},
    envelope::{lower_envelope, upper_envelope},
    error::{AlgebraError, AlgebraResult},
    isomorphism,
    sequence::{Sequence, merge_collinear},
    settings::ComputationSettings,
};
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::{debug, trace};
use tropic_core::num::rational::Rational;

/// Limits on the output of a sequence convolution.
///
/// # Examples
///
/// ```rust
/// # use tropic_curves::convolution::ConvolutionBounds;
/// # use tropic_core::num::rational::Rational;
///
/// let bounds = ConvolutionBounds::unbounded()
///     .with_start(Rational::from(2), true)
///     .with_end(Rational::from(10), false);
/// assert_eq!(bounds.start(), Some(&Rational::from(2)));
/// assert_eq!(bounds.end(), Some(&Rational::from(10)));
/// assert!(bounds.ceiling().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ConvolutionBounds {
    start: Option<Rational>,
    end: Option<Rational>,
    ceiling: Option<Rational>,
    start_included: bool,
    end_included: bool,
    ceiling_included: bool,
}

impl ConvolutionBounds {
    /// No limit: the full Minkowski envelope is returned.
    #[inline]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Limits the output to instants after `start` (or at `start` if
    /// `included`).
    #[inline]
    pub fn with_start(mut self, start: Rational, included: bool) -> Self {
        self.start = Some(start);
        self.start_included = included;
        self
    }

    /// Limits the output to instants before `end` (or at `end` if `included`).
    #[inline]
    pub fn with_end(mut self, end: Rational, included: bool) -> Self {
        self.end = Some(end);
        self.end_included = included;
        self
    }

    /// Ends the output at the first instant its value exceeds `ceiling` (or
    /// reaches it if not `included`).
    #[inline]
    pub fn with_ceiling(mut self, ceiling: Rational, included: bool) -> Self {
        self.ceiling = Some(ceiling);
        self.ceiling_included = included;
        self
    }

    #[inline]
    pub fn start(&self) -> Option<&Rational> {
        self.start.as_ref()
    }

    #[inline]
    pub fn end(&self) -> Option<&Rational> {
        self.end.as_ref()
    }

    #[inline]
    pub fn ceiling(&self) -> Option<&Rational> {
        self.ceiling.as_ref()
    }

    #[inline]
    pub fn is_start_included(&self) -> bool {
        self.start_included
    }

    #[inline]
    pub fn is_end_included(&self) -> bool {
        self.end_included
    }

    #[inline]
    pub fn is_ceiling_included(&self) -> bool {
        self.ceiling_included
    }

    /// Returns `true` if a pair spanning `[first, last]` can contribute to
    /// the output.
    #[inline]
    fn admits(&self, first: &Rational, last: &Rational) -> bool {
        let after_start = self.start.as_ref().is_none_or(|start| last >= start);
        let before_end = match &self.end {
            None => true,
            Some(end) => first < end || (first == end && self.end_included),
        };
        after_start && before_end
    }
}

/// The semiring in which a convolution is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Semiring {
    MinPlus,
    MaxPlus,
}

impl Semiring {
    #[inline]
    fn convolve(self, a: &Element, b: &Element) -> SmallVec<Element, 3> {
        match self {
            Semiring::MinPlus => a.convolution(b),
            Semiring::MaxPlus => a.max_plus_convolution(b),
        }
    }

    #[inline]
    fn envelope(self, elements: &[Element]) -> Vec<Element> {
        match self {
            Semiring::MinPlus => lower_envelope(elements),
            Semiring::MaxPlus => upper_envelope(elements),
        }
    }
}

impl Sequence {
    /// Min-plus convolution of two sequences.
    ///
    /// The result is exact on the Minkowski sum of the two domains, limited
    /// by `bounds`. Note that a by-sequence result is only a valid prefix of
    /// the convolution of the functions the sequences were cut from on
    /// `[ta_f + ta_g, ta_f + ta_g + min(len_f, len_g)]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::convolution::ConvolutionBounds;
    /// # use tropic_curves::element::{Point, Segment};
    /// # use tropic_curves::sequence::Sequence;
    /// # use tropic_curves::settings::ComputationSettings;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let f = Sequence::new(vec![
    ///     Point::new(Rational::from(0), Rational::from(0)).into(),
    ///     Segment::new(Rational::from(0), Rational::from(2), Rational::from(0), Rational::from(1)).into(),
    /// ]);
    /// let h = Sequence::convolution(
    ///     &f,
    ///     &f,
    ///     &ComputationSettings::default(),
    ///     &ConvolutionBounds::unbounded(),
    /// )
    /// .unwrap();
    /// assert_eq!(h.defined_until(), &Rational::from(4));
    /// ```
    pub fn convolution(
        f: &Sequence,
        g: &Sequence,
        settings: &ComputationSettings,
        bounds: &ConvolutionBounds,
    ) -> AlgebraResult<Sequence> {
        if isomorphism::by_sequence_applies(f, g, settings, bounds, Semiring::MinPlus) {
            debug!(
                f_elements = f.len(),
                g_elements = g.len(),
                "min-plus sequence convolution via isomorphism"
            );
            return isomorphism::by_sequence_min_plus(f, g, settings, bounds);
        }
        convolve_direct(f, g, settings, bounds, Semiring::MinPlus)
    }

    /// Max-plus convolution of two sequences. See [`Sequence::convolution`].
    pub fn max_plus_convolution(
        f: &Sequence,
        g: &Sequence,
        settings: &ComputationSettings,
        bounds: &ConvolutionBounds,
    ) -> AlgebraResult<Sequence> {
        if isomorphism::by_sequence_applies(f, g, settings, bounds, Semiring::MaxPlus) {
            debug!(
                f_elements = f.len(),
                g_elements = g.len(),
                "max-plus sequence convolution via isomorphism"
            );
            return isomorphism::by_sequence_max_plus(f, g, settings, bounds);
        }
        convolve_direct(f, g, settings, bounds, Semiring::MaxPlus)
    }
}

/// Convolution by pairwise element convolution and envelope.
pub(crate) fn convolve_direct(
    f: &Sequence,
    g: &Sequence,
    settings: &ComputationSettings,
    bounds: &ConvolutionBounds,
    semiring: Semiring,
) -> AlgebraResult<Sequence> {
    let pairs = f.len() * g.len();
    let parallel = settings.is_parallel_for(pairs);
    debug!(
        f_elements = f.len(),
        g_elements = g.len(),
        pairs,
        parallel,
        ?semiring,
        "direct sequence convolution"
    );

    let row = |ef: &Element| -> Vec<Element> {
        g.elements()
            .iter()
            .filter(|eg| {
                bounds.admits(
                    &(ef.start_time() + eg.start_time()),
                    &(ef.end_time() + eg.end_time()),
                )
            })
            .flat_map(|eg| semiring.convolve(ef, eg))
            .collect()
    };
    let pieces: Vec<Element> = if parallel {
        f.elements().par_iter().flat_map_iter(row).collect()
    } else {
        f.elements().iter().flat_map(row).collect()
    };
    trace!(pieces = pieces.len(), "element pairs convolved");

    let mut envelope = semiring.envelope(&pieces);
    if let Some(start) = bounds.start() {
        envelope = truncate_at_start(envelope, start, bounds.is_start_included());
    }
    if let Some(end) = bounds.end() {
        envelope = truncate_at_end(envelope, end, bounds.is_end_included());
    }
    if envelope.is_empty() {
        return Err(AlgebraError::ArgumentShape(format!(
            "convolution window [{:?}, {:?}] misses the result on [{}, {}]",
            bounds.start(),
            bounds.end(),
            f.defined_from() + g.defined_from(),
            f.defined_until() + g.defined_until()
        )));
    }

    let result = Sequence::try_new(merge_collinear(envelope))?;
    match bounds.ceiling() {
        Some(ceiling) => truncate_at_ceiling(result, ceiling, bounds.is_ceiling_included()),
        None => Ok(result),
    }
}

/// Drops everything before `start` from a sorted run of elements.
fn truncate_at_start(elements: Vec<Element>, start: &Rational, included: bool) -> Vec<Element> {
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        match &element {
            Element::Point(p) => {
                if p.time() > start || (p.time() == start && included) {
                    out.push(element);
                }
            }
            Element::Segment(s) => {
                if s.end_time() <= start {
                    continue;
                }
                if s.start_time() >= start {
                    out.push(element);
                } else {
                    if included {
                        out.push(Element::Point(Point::new(start.clone(), s.extrapolate(start))));
                    }
                    out.push(Element::Segment(s.restrict(start, s.end_time())));
                }
            }
        }
    }
    out
}

/// Drops everything after `end` from a sorted run of elements.
fn truncate_at_end(elements: Vec<Element>, end: &Rational, included: bool) -> Vec<Element> {
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        match &element {
            Element::Point(p) => {
                if p.time() < end || (p.time() == end && included) {
                    out.push(element);
                } else {
                    break;
                }
            }
            Element::Segment(s) => {
                if s.start_time() >= end {
                    break;
                }
                if s.end_time() <= end {
                    out.push(element);
                } else {
                    out.push(Element::Segment(s.restrict(s.start_time(), end)));
                    if included {
                        out.push(Element::Point(Point::new(end.clone(), s.extrapolate(end))));
                    }
                    break;
                }
            }
        }
    }
    out
}

/// Ends `sequence` at the first instant its value passes `ceiling`.
///
/// A segment rising through the ceiling is cut where it reaches it, with a
/// closing point at the ceiling if `included`. A point above the ceiling is
/// kept as the last element. A segment that jumps past the ceiling right
/// after its start has no instant at the ceiling and is kept whole, so the
/// values up to the ceiling remain covered.
pub(crate) fn truncate_at_ceiling(
    sequence: Sequence,
    ceiling: &Rational,
    included: bool,
) -> AlgebraResult<Sequence> {
    let passes = |v: &Rational| if included { v > ceiling } else { v >= ceiling };
    let mut elements = Vec::with_capacity(sequence.len());
    for element in sequence.into_elements() {
        let segment = match element {
            Element::Point(p) => {
                let over = passes(p.value());
                elements.push(Element::Point(p));
                if over {
                    break;
                }
                continue;
            }
            Element::Segment(s) => s,
        };
        if !passes(segment.right_limit_at_start_time()) && !passes(&segment.left_limit_at_end_time()) {
            elements.push(Element::Segment(segment));
            continue;
        }

        let start = segment.start_time();
        let crossing = if passes(segment.right_limit_at_start_time()) {
            start.clone()
        } else {
            // Finite and rising, since it starts below the ceiling.
            start + &((ceiling - segment.right_limit_at_start_time()) / segment.slope())
        };
        if &crossing > start {
            let cut = segment.restrict(start, &crossing);
            elements.push(Element::Segment(cut));
            if included {
                elements.push(Element::Point(Point::new(crossing, ceiling.clone())));
            }
        } else if elements
            .last()
            .and_then(Element::as_point)
            .is_none_or(|p| p.value() != ceiling)
        {
            elements.push(Element::Segment(segment));
        }
        break;
    }
    Sequence::try_new(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Segment;

    fn q(v: i64) -> Rational {
        Rational::from(v)
    }

    fn seg(a: i64, b: i64, r: i64, s: i64) -> Element {
        Segment::new(q(a), q(b), q(r), q(s)).into()
    }

    fn pt(t: i64, v: i64) -> Element {
        Point::new(q(t), q(v)).into()
    }

    fn direct() -> ComputationSettings {
        ComputationSettings::direct()
    }

    #[test]
    fn test_min_plus_of_affine_pieces() {
        let f = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 1)]);
        let g = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 2)]);
        let h = Sequence::convolution(&f, &g, &direct(), &ConvolutionBounds::unbounded()).unwrap();
        assert_eq!(h.elements(), &[pt(0, 0), seg(0, 2, 0, 1), pt(2, 2), seg(2, 4, 2, 2)]);
    }

    #[test]
    fn test_max_plus_of_affine_pieces() {
        let f = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 1)]);
        let g = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 2)]);
        let h = Sequence::max_plus_convolution(&f, &g, &direct(), &ConvolutionBounds::unbounded())
            .unwrap();
        assert_eq!(h.elements(), &[pt(0, 0), seg(0, 2, 0, 2), pt(2, 4), seg(2, 4, 4, 1)]);
    }

    #[test]
    fn test_convolution_is_commutative() {
        let f = Sequence::new(vec![pt(0, 1), seg(0, 1, 1, 0), pt(1, 3), seg(1, 3, 3, 2)]);
        let g = Sequence::new(vec![pt(0, 0), seg(0, 2, 1, 1), pt(2, 4)]);
        let bounds = ConvolutionBounds::unbounded();
        let fg = Sequence::convolution(&f, &g, &direct(), &bounds).unwrap();
        let gf = Sequence::convolution(&g, &f, &direct(), &bounds).unwrap();
        assert!(Sequence::equivalent(&fg, &gf));
        let fg = Sequence::max_plus_convolution(&f, &g, &direct(), &bounds).unwrap();
        let gf = Sequence::max_plus_convolution(&g, &f, &direct(), &bounds).unwrap();
        assert!(Sequence::equivalent(&fg, &gf));
    }

    #[test]
    fn test_end_bound_matches_cut() {
        let f = Sequence::new(vec![pt(0, 0), seg(0, 3, 1, 2), pt(3, 7), seg(3, 6, 7, 0)]);
        let g = Sequence::new(vec![pt(1, 2), seg(1, 5, 2, 1)]);
        let full = Sequence::convolution(&f, &g, &direct(), &ConvolutionBounds::unbounded()).unwrap();

        let open = ConvolutionBounds::unbounded().with_end(q(5), false);
        let bounded = Sequence::convolution(&f, &g, &direct(), &open).unwrap();
        assert!(Sequence::equivalent(&bounded, &full.cut_closed_open(&q(1), &q(5)).unwrap()));

        let closed = ConvolutionBounds::unbounded().with_end(q(5), true);
        let bounded = Sequence::convolution(&f, &g, &direct(), &closed).unwrap();
        assert!(Sequence::equivalent(&bounded, &full.cut(&q(1), &q(5), true, true).unwrap()));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let f = Sequence::constant(q(0), q(2), q(3));
        let bounds = ConvolutionBounds::unbounded().with_end(q(4), false);
        assert!(matches!(
            Sequence::convolution(&f, &f, &direct(), &bounds),
            Err(AlgebraError::ArgumentShape(_))
        ));
    }

    #[test]
    fn test_ceiling_truncation() {
        let stairs = Sequence::new(vec![
            pt(0, 0),
            seg(0, 1, 0, 0),
            pt(1, 1),
            seg(1, 2, 1, 0),
            pt(2, 2),
            seg(2, 3, 2, 0),
        ]);
        let identity = Sequence::new(vec![pt(0, 0)]);

        let included = ConvolutionBounds::unbounded().with_ceiling(q(1), true);
        let h = Sequence::convolution(&stairs, &identity, &direct(), &included).unwrap();
        assert_eq!(h.elements(), &stairs.elements()[..5]);

        let excluded = ConvolutionBounds::unbounded().with_ceiling(q(1), false);
        let h = Sequence::convolution(&stairs, &identity, &direct(), &excluded).unwrap();
        assert_eq!(h.elements(), &stairs.elements()[..3]);

        let high = ConvolutionBounds::unbounded().with_ceiling(q(10), true);
        let h = Sequence::convolution(&stairs, &identity, &direct(), &high).unwrap();
        assert_eq!(h, stairs);
    }

    #[test]
    fn test_ceiling_cuts_at_crossing() {
        let ramp = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 1), pt(2, 3), seg(2, 4, 3, 1)]);

        let truncated = truncate_at_ceiling(ramp.clone(), &q(1), true).unwrap();
        assert_eq!(truncated.elements(), &[pt(0, 0), seg(0, 1, 0, 1), pt(1, 1)]);

        let truncated = truncate_at_ceiling(ramp.clone(), &q(1), false).unwrap();
        assert_eq!(truncated.elements(), &[pt(0, 0), seg(0, 1, 0, 1)]);
        assert!(!truncated.is_right_closed());

        // The value jumps from 2 to 3 at t = 2, so nothing sits at 5/2.
        let truncated = truncate_at_ceiling(ramp, &(q(5) / q(2)), true).unwrap();
        assert_eq!(truncated.elements(), &[pt(0, 0), seg(0, 2, 0, 1), pt(2, 3)]);
    }

    #[test]
    fn test_ceiling_keeps_segment_jumping_past_it() {
        let jump = Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 0), pt(1, 0), seg(1, 2, 2, 1)]);
        let truncated = truncate_at_ceiling(jump.clone(), &q(1), true).unwrap();
        assert_eq!(truncated, jump);

        let landing = Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 1), pt(1, 1), seg(1, 2, 2, 1)]);
        let truncated = truncate_at_ceiling(landing, &q(1), true).unwrap();
        assert_eq!(truncated.elements(), &[pt(0, 0), seg(0, 1, 0, 1), pt(1, 1)]);
    }

    #[test]
    fn test_start_bound_matches_cut() {
        let f = Sequence::new(vec![pt(0, 0), seg(0, 3, 1, 2), pt(3, 7), seg(3, 6, 7, 0)]);
        let g = Sequence::new(vec![pt(1, 2), seg(1, 5, 2, 1)]);
        let full = Sequence::convolution(&f, &g, &direct(), &ConvolutionBounds::unbounded()).unwrap();

        let closed = ConvolutionBounds::unbounded()
            .with_start(q(2), true)
            .with_end(q(5), false);
        let bounded = Sequence::convolution(&f, &g, &direct(), &closed).unwrap();
        assert!(Sequence::equivalent(&bounded, &full.cut(&q(2), &q(5), true, false).unwrap()));

        let open = ConvolutionBounds::unbounded().with_start(q(2), false);
        let bounded = Sequence::max_plus_convolution(&f, &g, &direct(), &open).unwrap();
        let full = Sequence::max_plus_convolution(&f, &g, &direct(), &ConvolutionBounds::unbounded())
            .unwrap();
        assert!(Sequence::equivalent(
            &bounded,
            &full.cut(&q(2), full.defined_until(), false, full.is_right_closed()).unwrap()
        ));
    }

    #[test]
    fn test_start_after_end_of_result_is_rejected() {
        let f = Sequence::constant(q(0), q(0), q(2));
        let bounds = ConvolutionBounds::unbounded().with_start(q(5), true);
        assert!(matches!(
            Sequence::convolution(&f, &f, &direct(), &bounds),
            Err(AlgebraError::ArgumentShape(_))
        ));
    }

    #[test]
    fn test_parallel_fan_out_matches_sequential() {
        let f = Sequence::new(vec![
            pt(0, 0),
            seg(0, 1, 0, 3),
            pt(1, 3),
            seg(1, 2, 3, 0),
            pt(2, 4),
            seg(2, 4, 4, 1),
        ]);
        let g = Sequence::new(vec![pt(0, 1), seg(0, 2, 1, 2), pt(2, 5), seg(2, 3, 6, 0)]);
        let parallel = ComputationSettings::direct()
            .with_parallelism(true)
            .with_parallelism_threshold(1);
        let bounds = ConvolutionBounds::unbounded();
        assert_eq!(
            Sequence::convolution(&f, &g, &parallel, &bounds).unwrap(),
            Sequence::convolution(&f, &g, &direct(), &bounds).unwrap()
        );
        assert_eq!(
            Sequence::max_plus_convolution(&f, &g, &parallel, &bounds).unwrap(),
            Sequence::max_plus_convolution(&f, &g, &direct(), &bounds).unwrap()
        );
    }
}
