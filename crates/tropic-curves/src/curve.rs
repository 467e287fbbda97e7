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

//! # Ultimately Pseudo-Periodic Curves
//!
//! A `Curve` is a function on `[0, +∞)` described by a finite base
//! sequence on `[0, T + d)` and the pseudo-periodic rule
//!
//! ```text
//! f(t + d) = f(t) + c        for every t >= T
//! ```
//!
//! where `T` is the pseudo-periodic start, `d > 0` the period length and
//! `c` the period height. Every query folds a time back into the base
//! sequence and adds the matching multiple of `c`.
//!
//! ## Highlights
//!
//! - **Closed algebra**: minimum, maximum, addition, min-plus and max-plus
//!   convolution and both pseudo-inverses produce curves again. Each
//!   operation bounds the instant from which its result is periodic,
//!   computes the result on one window past that instant and then moves
//!   the periodic start back as far as the window allows.
//! - **Isomorphism**: convolutions of non-decreasing curves may be computed
//!   on their pseudo-inverses when that needs fewer periods, see
//!   [`crate::isomorphism`].
//! - **Lazy breakpoints**: [`Curve::breakpoints`] enumerates breakpoints
//!   without materializing the curve.

use crate::{
    breakpoints::Breakpoints,
    convolution::{ConvolutionBounds, Semiring, truncate_at_ceiling},
    element::Element,
    error::{AlgebraError, AlgebraResult},
    isomorphism,
    sequence::Sequence,
    settings::ComputationSettings,
};
use num_traits::{One, Zero};
use tracing::{debug, trace};
use tropic_core::num::rational::Rational;

/// An ultimately pseudo-periodic piecewise-affine function on `[0, +∞)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Curve {
    base: Sequence,
    pseudo_periodic_start: Rational,
    pseudo_period_length: Rational,
    pseudo_period_height: Rational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extremum {
    Minimum,
    Maximum,
}

impl Curve {
    /// Creates a new `Curve`.
    ///
    /// # Panics
    ///
    /// Panics if the arguments do not describe a valid curve, see
    /// [`Curve::try_new`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::curve::Curve;
    /// # use tropic_curves::element::{Point, Segment};
    /// # use tropic_curves::sequence::Sequence;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// // f(t) = 2t
    /// let base = Sequence::new(vec![
    ///     Point::new(Rational::from(0), Rational::from(0)).into(),
    ///     Segment::new(Rational::from(0), Rational::from(1), Rational::from(0), Rational::from(2)).into(),
    /// ]);
    /// let f = Curve::new(base, Rational::from(0), Rational::from(1), Rational::from(2));
    /// assert_eq!(f.value_at(&Rational::from(7)).unwrap(), Rational::from(14));
    /// ```
    pub fn new(
        base: Sequence,
        pseudo_periodic_start: Rational,
        pseudo_period_length: Rational,
        pseudo_period_height: Rational,
    ) -> Self {
        match Self::try_new(
            base,
            pseudo_periodic_start,
            pseudo_period_length,
            pseudo_period_height,
        ) {
            Ok(curve) => curve,
            Err(e) => panic!("Invalid curve: {}", e),
        }
    }

    /// Creates a new `Curve`.
    ///
    /// # Errors
    ///
    /// Returns `Structure` unless `T` is finite and non-negative, `d` is
    /// finite and positive, `c` is finite and `base` is left-closed at `0`
    /// and right-open at `T + d`.
    pub fn try_new(
        base: Sequence,
        pseudo_periodic_start: Rational,
        pseudo_period_length: Rational,
        pseudo_period_height: Rational,
    ) -> AlgebraResult<Self> {
        if !pseudo_periodic_start.is_finite() || pseudo_periodic_start.is_negative() {
            return Err(AlgebraError::Structure(format!(
                "pseudo-periodic start must be finite and non-negative, got {}",
                pseudo_periodic_start
            )));
        }
        if !pseudo_period_length.is_finite() || !pseudo_period_length.is_positive() {
            return Err(AlgebraError::Structure(format!(
                "pseudo-period length must be finite and positive, got {}",
                pseudo_period_length
            )));
        }
        if !pseudo_period_height.is_finite() {
            return Err(AlgebraError::Structure(format!(
                "pseudo-period height must be finite, got {}",
                pseudo_period_height
            )));
        }
        let end = &pseudo_periodic_start + &pseudo_period_length;
        if !base.defined_from().is_zero()
            || !base.is_left_closed()
            || base.defined_until() != &end
            || !base.is_right_open()
        {
            return Err(AlgebraError::Structure(format!(
                "base sequence must cover [0, {}), got {}",
                end,
                base.domain()
            )));
        }
        Ok(Self {
            base,
            pseudo_periodic_start,
            pseudo_period_length,
            pseudo_period_height,
        })
    }

    /// The constant function `value`.
    pub fn constant(value: Rational) -> Self {
        Self {
            base: Sequence::constant(value, Rational::zero(), Rational::one()),
            pseudo_periodic_start: Rational::zero(),
            pseudo_period_length: Rational::one(),
            pseudo_period_height: Rational::zero(),
        }
    }

    /// Builds a curve from a sequence `window` on (at least) `[0, T + d)`
    /// on which the pseudo-periodic rule is known to hold from `start`.
    ///
    /// The periodic start of the result is the earliest instant of the
    /// window from which the rule holds, so it may be smaller than `start`.
    pub fn from_periodic_window(
        window: Sequence,
        start: Rational,
        length: Rational,
        height: Rational,
    ) -> AlgebraResult<Self> {
        let start = if start.is_positive() {
            earliest_periodic_start(&window, &start, &length, &height)?
        } else {
            start
        };
        let base = window
            .cut_closed_open(&Rational::zero(), &(&start + &length))?
            .optimize();
        trace!(%start, %length, %height, elements = base.len(), "periodic window folded");
        Self::try_new(base, start, length, height)
    }

    #[inline]
    pub fn base_sequence(&self) -> &Sequence {
        &self.base
    }

    /// `T`: the instant from which the curve is pseudo-periodic.
    #[inline]
    pub fn pseudo_periodic_start_time(&self) -> &Rational {
        &self.pseudo_periodic_start
    }

    /// `d`
    #[inline]
    pub fn pseudo_period_length(&self) -> &Rational {
        &self.pseudo_period_length
    }

    /// `c`
    #[inline]
    pub fn pseudo_period_height(&self) -> &Rational {
        &self.pseudo_period_height
    }

    /// `T + d`, the end of the base sequence.
    #[inline]
    pub fn first_pseudo_period_end(&self) -> Rational {
        &self.pseudo_periodic_start + &self.pseudo_period_length
    }

    /// The long-run slope `c / d`.
    #[inline]
    pub fn pseudo_periodic_slope(&self) -> Rational {
        &self.pseudo_period_height / &self.pseudo_period_length
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.base.is_finite()
    }

    #[inline]
    pub fn is_zero_at_zero(&self) -> bool {
        self.base.first().first_value().is_zero()
    }

    pub fn is_non_decreasing(&self) -> bool {
        !self.pseudo_period_height.is_negative()
            && self.base.is_non_decreasing()
            && self.wraps(|value, left| value >= left)
    }

    pub fn is_left_continuous(&self) -> bool {
        self.base.is_left_continuous() && self.wraps(|value, left| value == left)
    }

    pub fn is_right_continuous(&self) -> bool {
        self.base.is_right_continuous()
    }

    /// Compares the value at `T + d` with the left limit there, the one
    /// instant where the base sequence meets its first repetition.
    fn wraps(&self, check: impl Fn(&Rational, &Rational) -> bool) -> bool {
        let end = self.first_pseudo_period_end();
        match (self.value_at(&end), self.base.left_limit_at(&end)) {
            (Ok(value), Ok(left)) => check(&value, &left),
            _ => false,
        }
    }

    /// Splits `time` into a number of periods `k` and an offset inside the
    /// base sequence, such that `f(time) = base(offset) + k·c`.
    fn fold(&self, time: &Rational) -> (Rational, Rational) {
        if time < &self.first_pseudo_period_end() {
            return (Rational::zero(), time.clone());
        }
        let k = ((time - &self.pseudo_periodic_start) / &self.pseudo_period_length).floor();
        let offset = time - &(&k * &self.pseudo_period_length);
        (k, offset)
    }

    fn check_domain(&self, time: &Rational, open_at_zero: bool) -> AlgebraResult<()> {
        if !time.is_finite() || time.is_negative() || (open_at_zero && time.is_zero()) {
            return Err(AlgebraError::OutOfDomain { time: time.clone() });
        }
        Ok(())
    }

    /// Evaluates the curve at `time`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfDomain` for negative or infinite times.
    pub fn value_at(&self, time: &Rational) -> AlgebraResult<Rational> {
        self.check_domain(time, false)?;
        let (k, offset) = self.fold(time);
        Ok(self
            .base
            .value_at(&offset)?
            .checked_add(&(&k * &self.pseudo_period_height))?)
    }

    /// The limit from the left at `time > 0`.
    pub fn left_limit_at(&self, time: &Rational) -> AlgebraResult<Rational> {
        self.check_domain(time, true)?;
        let end = self.first_pseudo_period_end();
        if time <= &end {
            return self.base.left_limit_at(time);
        }
        let k = ((time - &self.pseudo_periodic_start) / &self.pseudo_period_length).ceil()
            - Rational::one();
        let offset = time - &(&k * &self.pseudo_period_length);
        Ok(self
            .base
            .left_limit_at(&offset)?
            .checked_add(&(&k * &self.pseudo_period_height))?)
    }

    /// The limit from the right at `time >= 0`.
    pub fn right_limit_at(&self, time: &Rational) -> AlgebraResult<Rational> {
        self.check_domain(time, false)?;
        let (k, offset) = self.fold(time);
        Ok(self
            .base
            .right_limit_at(&offset)?
            .checked_add(&(&k * &self.pseudo_period_height))?)
    }

    /// Materializes the curve on an interval.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentShape` for an infinite `end` and whatever
    /// [`Sequence::cut`] returns for the interval itself.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::curve::Curve;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let f = Curve::constant(Rational::from(3));
    /// let s = f.cut(&Rational::from(2), &Rational::from(5), true, true).unwrap();
    /// assert_eq!(s.defined_from(), &Rational::from(2));
    /// assert!(s.is_right_closed());
    /// ```
    pub fn cut(
        &self,
        start: &Rational,
        end: &Rational,
        include_start: bool,
        include_end: bool,
    ) -> AlgebraResult<Sequence> {
        if !end.is_finite() {
            return Err(AlgebraError::ArgumentShape(format!(
                "cannot materialize a curve up to {}",
                end
            )));
        }
        self.unroll(end)?.cut(start, end, include_start, include_end)
    }

    #[inline]
    pub fn cut_closed_open(&self, start: &Rational, end: &Rational) -> AlgebraResult<Sequence> {
        self.cut(start, end, true, false)
    }

    /// The curve as one sequence on `[0, T + (k + 1)·d)` with `until` inside.
    fn unroll(&self, until: &Rational) -> AlgebraResult<Sequence> {
        let end = self.first_pseudo_period_end();
        if until < &end {
            return Ok(self.base.clone());
        }
        let periods = ((until - &self.pseudo_periodic_start) / &self.pseudo_period_length).floor();
        let period = self.base.cut_closed_open(&self.pseudo_periodic_start, &end)?;

        let mut elements: Vec<Element> = self.base.elements().to_vec();
        let mut k = Rational::one();
        while k <= periods {
            let shifted = period.translate(
                &(&k * &self.pseudo_period_length),
                &(&k * &self.pseudo_period_height),
            );
            elements.extend(shifted.into_elements());
            k = k + Rational::one();
        }
        Sequence::try_new(elements)
    }

    /// `-f`, with the same periodic start and length.
    pub fn negate(&self) -> Curve {
        Self {
            base: self.base.negate(),
            pseudo_periodic_start: self.pseudo_periodic_start.clone(),
            pseudo_period_length: self.pseudo_period_length.clone(),
            pseudo_period_height: -&self.pseudo_period_height,
        }
    }

    /// Returns `true` if `f` and `g` are the same function.
    ///
    /// Both are compared on `[0, max(T_f, T_g) + lcm(d_f, d_g))`, past
    /// which two curves of equal slope repeat identically.
    pub fn equivalent(f: &Curve, g: &Curve) -> bool {
        if f.pseudo_periodic_slope() != g.pseudo_periodic_slope() {
            return false;
        }
        let Ok(length) = f.pseudo_period_length.lcm(&g.pseudo_period_length) else {
            return false;
        };
        let horizon = f.pseudo_periodic_start.max_ref(&g.pseudo_periodic_start) + &length;
        let zero = Rational::zero();
        match (f.cut_closed_open(&zero, &horizon), g.cut_closed_open(&zero, &horizon)) {
            (Ok(a), Ok(b)) => Sequence::equivalent(&a, &b),
            _ => false,
        }
    }

    /// Pointwise minimum of two curves.
    pub fn minimum(f: &Curve, g: &Curve) -> AlgebraResult<Curve> {
        pointwise_extremum(f, g, Extremum::Minimum)
    }

    /// Pointwise maximum of two curves.
    pub fn maximum(f: &Curve, g: &Curve) -> AlgebraResult<Curve> {
        pointwise_extremum(f, g, Extremum::Maximum)
    }

    /// Pointwise sum of two curves.
    pub fn addition(f: &Curve, g: &Curve) -> AlgebraResult<Curve> {
        let length = f.pseudo_period_length.lcm(&g.pseudo_period_length)?;
        let height = (&length / &f.pseudo_period_length) * &f.pseudo_period_height
            + (&length / &g.pseudo_period_length) * &g.pseudo_period_height;
        let start = f.pseudo_periodic_start.max_ref(&g.pseudo_periodic_start).clone();
        let horizon = &start + &length;
        let zero = Rational::zero();
        let sum = Sequence::addition(
            &f.cut_closed_open(&zero, &horizon)?,
            &g.cut_closed_open(&zero, &horizon)?,
        )?;
        Self::from_periodic_window(sum, start, length, height)
    }

    /// Min-plus convolution of two curves.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::curve::Curve;
    /// # use tropic_curves::settings::ComputationSettings;
    /// # use tropic_curves::staircase::rate_latency;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let f = rate_latency(Rational::from(2), Rational::from(1));
    /// let g = rate_latency(Rational::from(3), Rational::from(2));
    /// let h = Curve::convolution(&f, &g, &ComputationSettings::default()).unwrap();
    /// assert!(Curve::equivalent(&h, &rate_latency(Rational::from(2), Rational::from(3))));
    /// ```
    pub fn convolution(
        f: &Curve,
        g: &Curve,
        settings: &ComputationSettings,
    ) -> AlgebraResult<Curve> {
        if isomorphism::by_curve_applies(f, g, settings, Semiring::MinPlus) {
            debug!("min-plus curve convolution via isomorphism");
            return isomorphism::by_curve_min_plus(f, g, settings);
        }
        convolve_direct(f, g, settings)
    }

    /// Max-plus convolution of two curves, computed as `-((-f) ⊗ (-g))`
    /// unless the isomorphism applies.
    pub fn max_plus_convolution(
        f: &Curve,
        g: &Curve,
        settings: &ComputationSettings,
    ) -> AlgebraResult<Curve> {
        if isomorphism::by_curve_applies(f, g, settings, Semiring::MaxPlus) {
            debug!("max-plus curve convolution via isomorphism");
            return isomorphism::by_curve_max_plus(f, g, settings);
        }
        Ok(convolve_direct(&f.negate(), &g.negate(), settings)?.negate())
    }

    /// Min-plus convolution of two curves, materialized within `bounds`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_curves::convolution::ConvolutionBounds;
    /// # use tropic_curves::curve::Curve;
    /// # use tropic_curves::settings::ComputationSettings;
    /// # use tropic_curves::staircase::rate_latency;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let f = rate_latency(Rational::from(2), Rational::from(1));
    /// let bounds = ConvolutionBounds::unbounded().with_ceiling(Rational::from(3), true);
    /// let h = Curve::convolution_within(&f, &f, &ComputationSettings::default(), &bounds).unwrap();
    /// assert_eq!(h.defined_until(), &Rational::new(7, 2));
    /// ```
    pub fn convolution_within(
        f: &Curve,
        g: &Curve,
        settings: &ComputationSettings,
        bounds: &ConvolutionBounds,
    ) -> AlgebraResult<Sequence> {
        Self::convolution(f, g, settings)?.window(bounds)
    }

    /// Max-plus convolution of two curves, materialized within `bounds`.
    pub fn max_plus_convolution_within(
        f: &Curve,
        g: &Curve,
        settings: &ComputationSettings,
        bounds: &ConvolutionBounds,
    ) -> AlgebraResult<Sequence> {
        Self::max_plus_convolution(f, g, settings)?.window(bounds)
    }

    /// The curve materialized within `bounds`.
    ///
    /// Without an end bound, the window runs until the value passes the
    /// ceiling, which requires a positive pseudo-periodic slope.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentShape` if `bounds` give neither an end nor a
    /// ceiling the curve eventually passes.
    pub fn window(&self, bounds: &ConvolutionBounds) -> AlgebraResult<Sequence> {
        let (end, end_included) = match (bounds.end(), bounds.ceiling()) {
            (Some(end), _) => (end.clone(), bounds.is_end_included()),
            (None, Some(ceiling)) => (self.time_above(ceiling)?, true),
            (None, None) => {
                return Err(AlgebraError::ArgumentShape(
                    "a curve window needs an end or a ceiling".to_string(),
                ));
            }
        };
        let zero = Rational::zero();
        let (start, start_included) = match bounds.start() {
            Some(start) if start >= &zero => (start.clone(), bounds.is_start_included()),
            _ => (zero, true),
        };
        trace!(%start, %end, "materializing curve window");
        let cut = self.cut(&start, &end, start_included, end_included)?;
        match bounds.ceiling() {
            Some(ceiling) => truncate_at_ceiling(cut, ceiling, bounds.is_ceiling_included()),
            None => Ok(cut),
        }
    }

    /// An instant after which the curve stays strictly above `ceiling`.
    fn time_above(&self, ceiling: &Rational) -> AlgebraResult<Rational> {
        let slope = self.pseudo_periodic_slope();
        if !slope.is_positive() || !ceiling.is_finite() {
            return Err(AlgebraError::ArgumentShape(format!(
                "a curve of slope {} never passes the ceiling {}",
                slope, ceiling
            )));
        }
        let (lower, _) = self.affine_offsets(&self.pseudo_periodic_start)?;
        let reach = ceiling.checked_sub(&lower)?.checked_div(&slope)?;
        Ok(reach.max_ref(&self.pseudo_periodic_start) + &self.pseudo_period_length)
    }

    /// The lower pseudo-inverse `inf { t >= 0 : f(t) >= v }` on `v >= 0`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` unless the curve is finite, non-decreasing
    /// and has a positive period height.
    pub fn lower_pseudo_inverse(&self) -> AlgebraResult<Curve> {
        self.pseudo_inverse(true)
    }

    /// The upper pseudo-inverse `sup { t >= 0 : f(t) <= v }` on `v >= 0`.
    pub fn upper_pseudo_inverse(&self) -> AlgebraResult<Curve> {
        self.pseudo_inverse(false)
    }

    fn pseudo_inverse(&self, lower: bool) -> AlgebraResult<Curve> {
        if !self.is_finite() || !self.is_non_decreasing() {
            return Err(AlgebraError::Precondition(
                "pseudo-inverse requires a finite, non-decreasing curve".to_string(),
            ));
        }
        if !self.pseudo_period_height.is_positive() {
            return Err(AlgebraError::Precondition(format!(
                "pseudo-inverse requires a positive period height, got {}",
                self.pseudo_period_height
            )));
        }

        // From the instant `start + d` on, every value is reached only in
        // the periodic part; the inverse repeats from the value there.
        let mut start = self.pseudo_periodic_start.clone();
        let mut value = self.value_at(&(&start + &self.pseudo_period_length))?;
        if value.is_negative() {
            let k = (-&value / &self.pseudo_period_height).ceil();
            start = &start + &(&k * &self.pseudo_period_length);
            value = &value + &(&k * &self.pseudo_period_height);
        }

        let horizon = &start + &(&self.pseudo_period_length * &Rational::from(2));
        let window = self.cut(&Rational::zero(), &horizon, true, true)?;
        let inverse = if lower {
            window.lower_pseudo_inverse(true)?
        } else {
            window.upper_pseudo_inverse(true)?
        };
        Self::from_periodic_window(
            inverse,
            value,
            self.pseudo_period_height.clone(),
            self.pseudo_period_length.clone(),
        )
    }

    /// Enumerates the breakpoints of the curve, without end.
    pub fn breakpoints(&self) -> AlgebraResult<Breakpoints> {
        Breakpoints::new(self, None)
    }

    /// Enumerates the breakpoints at times `<= until`.
    pub fn breakpoints_until(&self, until: Rational) -> AlgebraResult<Breakpoints> {
        Breakpoints::new(self, Some(until))
    }

    /// Bounds `(m, M)` with `ρt + m <= f(t) <= ρt + M` for every `t >= from`,
    /// where `from` is `0` or `T`.
    fn affine_offsets(&self, from: &Rational) -> AlgebraResult<(Rational, Rational)> {
        let slope = self.pseudo_periodic_slope();
        let span = self.cut(from, &self.first_pseudo_period_end(), true, true)?;
        let mut offsets: Vec<Rational> = Vec::with_capacity(span.len() * 2);
        for element in span.elements() {
            match element {
                Element::Point(p) => offsets.push(p.value().checked_sub(&(&slope * p.time()))?),
                Element::Segment(s) => {
                    offsets.push(
                        s.right_limit_at_start_time()
                            .checked_sub(&(&slope * s.start_time()))?,
                    );
                    offsets.push(s.left_limit_at_end_time().checked_sub(&(&slope * s.end_time()))?);
                }
            }
        }
        let lower = offsets.iter().min().cloned().unwrap_or_default();
        let upper = offsets.iter().max().cloned().unwrap_or_default();
        Ok((lower, upper))
    }
}

/// Direct min-plus convolution: bound the periodic start of the result,
/// convolve the operands on one window past it and fold the window.
pub(crate) fn convolve_direct(
    f: &Curve,
    g: &Curve,
    settings: &ComputationSettings,
) -> AlgebraResult<Curve> {
    let length = f.pseudo_period_length.lcm(&g.pseudo_period_length)?;
    let (slope_f, slope_g) = (f.pseudo_periodic_slope(), g.pseudo_periodic_slope());
    let (start, height) = if slope_f == slope_g {
        (
            &(&f.pseudo_periodic_start + &g.pseudo_periodic_start) + &length,
            &length * &slope_f,
        )
    } else {
        let (low, high) = if slope_f < slope_g { (f, g) } else { (g, f) };
        (
            &low.pseudo_periodic_start + &split_bound(low, high)?,
            &length * &low.pseudo_periodic_slope(),
        )
    };
    let horizon = &start + &length;
    debug!(%start, %length, %height, "direct curve convolution");

    let zero = Rational::zero();
    let window = Sequence::convolution(
        &f.cut_closed_open(&zero, &horizon)?,
        &g.cut_closed_open(&zero, &horizon)?,
        settings,
        &ConvolutionBounds::unbounded().with_end(horizon.clone(), false),
    )?;
    Curve::from_periodic_window(window, start, length, height)
}

/// For `low ⊗ high` with `ρ_low < ρ_high`: the largest amount of time the
/// optimal split can give to `high` once `low` is periodic.
///
/// Giving `s` to `high` costs at least `ρ_low·(t - s) + m_low + ρ_high·s +
/// m_high`, while giving nothing costs at most `ρ_low·t + M_low + high(0)`.
fn split_bound(low: &Curve, high: &Curve) -> AlgebraResult<Rational> {
    let zero = Rational::zero();
    let (_, upper_low) = low.affine_offsets(&low.pseudo_periodic_start)?;
    let (lower_low, _) = low.affine_offsets(&zero)?;
    let (lower_high, _) = high.affine_offsets(&zero)?;
    let gap = upper_low
        .checked_add(&high.value_at(&zero)?)?
        .checked_sub(&lower_low)?
        .checked_sub(&lower_high)?;
    if !gap.is_finite() {
        return Err(AlgebraError::Precondition(
            "convolution of curves with different slopes requires finite values".to_string(),
        ));
    }
    let bound = gap / (high.pseudo_periodic_slope() - low.pseudo_periodic_slope());
    Ok(if bound.is_negative() { zero } else { bound })
}

fn pointwise_extremum(f: &Curve, g: &Curve, extremum: Extremum) -> AlgebraResult<Curve> {
    let (slope_f, slope_g) = (f.pseudo_periodic_slope(), g.pseudo_periodic_slope());
    let (start, length, height) = if slope_f == slope_g {
        let length = f.pseudo_period_length.lcm(&g.pseudo_period_length)?;
        let height = &length * &slope_f;
        (
            f.pseudo_periodic_start.max_ref(&g.pseudo_periodic_start).clone(),
            length,
            height,
        )
    } else {
        // Past the crossing bound the smaller slope is the minimum for good.
        let (low, high) = if slope_f < slope_g { (f, g) } else { (g, f) };
        let winner = match extremum {
            Extremum::Minimum => low,
            Extremum::Maximum => high,
        };
        let crossing = crossing_bound(low, high)?;
        (
            winner.pseudo_periodic_start.max_ref(&crossing).clone(),
            winner.pseudo_period_length.clone(),
            winner.pseudo_period_height.clone(),
        )
    };

    let horizon = &start + &length;
    let zero = Rational::zero();
    let a = f.cut_closed_open(&zero, &horizon)?;
    let b = g.cut_closed_open(&zero, &horizon)?;
    let window = match extremum {
        Extremum::Minimum => Sequence::minimum(&a, &b, true)?,
        Extremum::Maximum => Sequence::maximum(&a, &b, true)?,
    };
    Curve::from_periodic_window(window, start, length, height)
}

/// An instant past which `low <= high` holds everywhere, from the affine
/// bounds `low(t) <= ρ_low·t + M_low` and `high(t) >= ρ_high·t + m_high`.
fn crossing_bound(low: &Curve, high: &Curve) -> AlgebraResult<Rational> {
    let zero = Rational::zero();
    let (_, upper_low) = low.affine_offsets(&zero)?;
    let (lower_high, _) = high.affine_offsets(&zero)?;
    let gap = upper_low.checked_sub(&lower_high)?;
    if !gap.is_finite() {
        return Err(AlgebraError::Precondition(
            "extremum of curves with different slopes requires finite values".to_string(),
        ));
    }
    let bound = gap / (high.pseudo_periodic_slope() - low.pseudo_periodic_slope());
    Ok(if bound.is_negative() { zero } else { bound })
}

/// The earliest breakpoint `τ <= start` of `window` such that
/// `window(t + d) = window(t) + c` on `[τ, start)`.
fn earliest_periodic_start(
    window: &Sequence,
    start: &Rational,
    length: &Rational,
    height: &Rational,
) -> AlgebraResult<Rational> {
    let zero = Rational::zero();
    let here = window.cut_closed_open(&zero, start)?;
    let shifted = window
        .cut_closed_open(length, &(start + length))?
        .translate(&-length, &-height);

    let mut times = here.breakpoint_times();
    times.extend(shifted.breakpoint_times());
    times.sort_unstable();
    times.dedup();

    let mut earliest = zero;
    for (i, time) in times.iter().enumerate() {
        if time.is_positive() && here.left_limit_at(time)? != shifted.left_limit_at(time)? {
            earliest = time.clone();
        }
        if let Some(next) = times.get(i + 1)
            && (here.value_at(time)? != shifted.value_at(time)?
                || here.right_limit_at(time)? != shifted.right_limit_at(time)?)
        {
            earliest = next.clone();
        }
    }
    Ok(earliest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        element::{Point, Segment},
        staircase::{horizontal_staircase, rate_latency, stair as stair_curve, vertical_staircase},
    };
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

    /// `rate · t`
    fn ramp(rate: i64) -> Curve {
        Curve::new(Sequence::new(vec![pt(0, 0), seg(0, 1, 0, rate)]), q(0), q(1), q(rate))
    }

    /// 0 at 0, then `ceil(t)`
    fn stair() -> Curve {
        Curve::new(Sequence::new(vec![pt(0, 0), seg(0, 1, 1, 0)]), q(0), q(1), q(1))
    }

    /// `max(0, t - 1)`
    fn delayed_ramp() -> Curve {
        Curve::new(
            Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 0), pt(1, 0), seg(1, 2, 0, 1)]),
            q(1),
            q(1),
            q(1),
        )
    }

    #[test]
    fn test_try_new_validation() {
        let base = || Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 1)]);
        assert!(Curve::try_new(base(), q(0), q(1), q(1)).is_ok());
        assert!(matches!(
            Curve::try_new(base(), q(0), q(0), q(1)),
            Err(AlgebraError::Structure(_))
        ));
        assert!(matches!(
            Curve::try_new(base(), q(-1), q(2), q(1)),
            Err(AlgebraError::Structure(_))
        ));
        assert!(matches!(
            Curve::try_new(base(), q(0), q(2), q(1)),
            Err(AlgebraError::Structure(_))
        ));
        assert!(matches!(
            Curve::try_new(base(), q(0), q(1), Rational::PLUS_INFINITY),
            Err(AlgebraError::Structure(_))
        ));
    }

    #[test]
    #[should_panic(expected = "Invalid curve")]
    fn test_new_panics() {
        Curve::new(Sequence::constant(q(0), q(1), q(2)), q(0), q(2), q(0));
    }

    #[test]
    fn test_value_and_limits() {
        let f = stair();
        assert_eq!(f.value_at(&q(0)).unwrap(), q(0));
        assert_eq!(f.value_at(&Rational::new(1, 2)).unwrap(), q(1));
        assert_eq!(f.value_at(&q(1)).unwrap(), q(1));
        assert_eq!(f.value_at(&Rational::new(5, 2)).unwrap(), q(3));
        assert_eq!(f.left_limit_at(&q(2)).unwrap(), q(2));
        assert_eq!(f.right_limit_at(&q(2)).unwrap(), q(3));
        assert_eq!(f.right_limit_at(&q(0)).unwrap(), q(1));
    }

    #[test]
    fn test_out_of_domain() {
        let f = stair();
        assert!(matches!(f.value_at(&q(-1)), Err(AlgebraError::OutOfDomain { .. })));
        assert!(matches!(f.left_limit_at(&q(0)), Err(AlgebraError::OutOfDomain { .. })));
        assert!(matches!(
            f.value_at(&Rational::PLUS_INFINITY),
            Err(AlgebraError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn test_cut_unrolls_periods() {
        let s = ramp(1).cut(&q(0), &q(3), true, true).unwrap().optimize();
        assert_eq!(s.elements(), &[pt(0, 0), seg(0, 3, 0, 1), pt(3, 3)]);

        let s = stair().cut_closed_open(&q(1), &q(3)).unwrap();
        assert_eq!(s.elements(), &[pt(1, 1), seg(1, 2, 2, 0), pt(2, 2), seg(2, 3, 3, 0)]);
        assert!(stair().cut(&q(0), &Rational::PLUS_INFINITY, true, false).is_err());
    }

    #[test]
    fn test_properties() {
        assert!(stair().is_non_decreasing());
        assert!(stair().is_left_continuous());
        assert!(!stair().is_right_continuous());
        assert!(stair().is_zero_at_zero());
        assert!(ramp(2).is_right_continuous());
        assert!(!ramp(-1).is_non_decreasing());
        assert_eq!(ramp(3).pseudo_periodic_slope(), q(3));
    }

    #[test]
    fn test_equivalent_representations() {
        let long = Curve::new(Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 1)]), q(0), q(2), q(2));
        assert!(Curve::equivalent(&ramp(1), &long));
        assert!(!Curve::equivalent(&ramp(1), &ramp(2)));
        assert!(!Curve::equivalent(&ramp(1), &delayed_ramp()));
    }

    #[test]
    fn test_minimum_with_different_slopes() {
        let h = Curve::minimum(&ramp(1), &Curve::constant(q(1))).unwrap();
        assert_eq!(h.pseudo_periodic_start_time(), &q(1));
        assert_eq!(h.value_at(&Rational::new(1, 2)).unwrap(), Rational::new(1, 2));
        assert_eq!(h.value_at(&q(5)).unwrap(), q(1));
    }

    #[test]
    fn test_maximum_with_different_slopes() {
        let h = Curve::maximum(&ramp(1), &Curve::constant(q(1))).unwrap();
        assert_eq!(h.pseudo_periodic_start_time(), &q(1));
        assert_eq!(h.value_at(&Rational::new(1, 2)).unwrap(), q(1));
        assert_eq!(h.value_at(&q(3)).unwrap(), q(3));
    }

    #[test]
    fn test_addition() {
        let h = Curve::addition(&ramp(1), &Curve::constant(q(1))).unwrap();
        assert_eq!(h.value_at(&q(0)).unwrap(), q(1));
        assert_eq!(h.value_at(&q(4)).unwrap(), q(5));
    }

    #[test]
    fn test_negate() {
        let h = stair().negate();
        assert_eq!(h.value_at(&Rational::new(5, 2)).unwrap(), q(-3));
        assert_eq!(h.pseudo_period_height(), &q(-1));
    }

    #[test]
    fn test_direct_convolution_finds_earliest_start() {
        let h = Curve::convolution(&delayed_ramp(), &delayed_ramp(), &ComputationSettings::direct()).unwrap();
        assert_eq!(h.pseudo_periodic_start_time(), &q(2));
        assert_eq!(h.value_at(&q(1)).unwrap(), q(0));
        assert_eq!(h.value_at(&q(5)).unwrap(), q(3));
    }

    #[test]
    fn test_convolution_with_different_slopes() {
        let h = Curve::convolution(&ramp(1), &Curve::constant(q(0)), &ComputationSettings::direct()).unwrap();
        assert!(Curve::equivalent(&h, &Curve::constant(q(0))));
    }

    #[test]
    fn test_convolution_isomorphism_matches_direct() {
        let direct = Curve::convolution(&stair(), &stair(), &ComputationSettings::direct()).unwrap();
        let iso = isomorphism::by_curve_min_plus(&stair(), &stair(), &ComputationSettings::default()).unwrap();
        assert!(Curve::equivalent(&direct, &iso));
        assert!(Curve::equivalent(&direct, &stair()));
    }

    #[test]
    fn test_max_plus_convolution() {
        let h = Curve::max_plus_convolution(&ramp(1), &ramp(2), &ComputationSettings::default()).unwrap();
        assert_eq!(h.value_at(&q(3)).unwrap(), q(6));
        assert!(Curve::equivalent(&h, &ramp(2)));
    }

    #[test]
    fn test_convolution_with_split_flat_start() {
        // max(0, t - 3) with its flat start stored in two pieces
        let f = Curve::new(
            Sequence::new(vec![
                pt(0, 0),
                seg(0, 1, 0, 0),
                pt(1, 0),
                seg(1, 3, 0, 0),
                pt(3, 0),
                seg(3, 6, 0, 1),
            ]),
            q(3),
            q(3),
            q(3),
        );
        let settings = ComputationSettings::default().with_by_sequence_isomorphism_threshold(0);
        let h = Curve::convolution(&f, &ramp(2), &settings).unwrap();
        let direct = Curve::convolution(&f, &ramp(2), &ComputationSettings::direct()).unwrap();
        assert!(Curve::equivalent(&h, &direct));
        assert!(Curve::equivalent(&h, &f));
    }

    #[test]
    fn test_convolution_within_ceiling() {
        let f = rate_latency(q(2), q(1));
        let settings = ComputationSettings::default();

        let included = ConvolutionBounds::unbounded().with_ceiling(q(3), true);
        let h = Curve::convolution_within(&f, &f, &settings, &included).unwrap();
        assert_eq!(h.defined_until(), &Rational::new(7, 2));
        assert!(h.is_right_closed());
        assert_eq!(h.value_at(&Rational::new(7, 2)).unwrap(), q(3));

        let excluded = ConvolutionBounds::unbounded().with_ceiling(q(3), false);
        let h = Curve::convolution_within(&f, &f, &settings, &excluded).unwrap();
        assert_eq!(h.defined_until(), &Rational::new(7, 2));
        assert!(h.is_right_open());
    }

    #[test]
    fn test_convolution_within_window() {
        let f = rate_latency(q(2), q(1));
        let settings = ComputationSettings::default();
        let bounds = ConvolutionBounds::unbounded()
            .with_start(q(1), true)
            .with_end(q(5), false);
        let h = Curve::convolution_within(&f, &f, &settings, &bounds).unwrap();
        assert_eq!(h.defined_from(), &q(1));
        assert_eq!(h.defined_until(), &q(5));
        assert_eq!(h.value_at(&q(4)).unwrap(), q(4));

        let bounds = ConvolutionBounds::unbounded().with_end(q(4), false);
        let h = Curve::max_plus_convolution_within(&f, &f, &settings, &bounds).unwrap();
        assert_eq!(h.value_at(&q(3)).unwrap(), q(4));
    }

    #[test]
    fn test_window_needs_an_end() {
        let f = Curve::constant(q(1));
        assert!(matches!(
            f.window(&ConvolutionBounds::unbounded()),
            Err(AlgebraError::ArgumentShape(_))
        ));
        let flat_ceiling = ConvolutionBounds::unbounded().with_ceiling(q(2), true);
        assert!(matches!(f.window(&flat_ceiling), Err(AlgebraError::ArgumentShape(_))));
    }

    #[test]
    fn test_pseudo_inverses() {
        let lower = ramp(2).lower_pseudo_inverse().unwrap();
        assert_eq!(lower.value_at(&q(3)).unwrap(), Rational::new(3, 2));
        assert_eq!(lower.value_at(&q(10)).unwrap(), q(5));

        // The upper inverse of the stair is floor.
        let upper = stair().upper_pseudo_inverse().unwrap();
        assert_eq!(upper.value_at(&Rational::new(1, 2)).unwrap(), q(0));
        assert_eq!(upper.value_at(&Rational::new(7, 2)).unwrap(), q(3));
        assert_eq!(upper.value_at(&q(4)).unwrap(), q(4));

        assert!(matches!(
            Curve::constant(q(1)).lower_pseudo_inverse(),
            Err(AlgebraError::Precondition(_))
        ));
    }

    #[test]
    fn test_breakpoints_are_lazy() {
        let times: Vec<Rational> = stair()
            .breakpoints()
            .unwrap()
            .take(4)
            .map(|b| b.time().clone())
            .collect();
        assert_eq!(times, vec![q(0), q(1), q(2), q(3)]);
    }

    fn random_curve(rng: &mut ChaCha8Rng) -> Curve {
        match rng.random_range(0..4) {
            0 => stair_curve(q(rng.random_range(1..=3)), q(rng.random_range(1..=3))),
            1 => rate_latency(q(rng.random_range(1..=4)), q(rng.random_range(0..=3))),
            2 => horizontal_staircase(
                q(rng.random_range(1..=2)),
                q(rng.random_range(1..=2)),
                q(rng.random_range(1..=2)),
                q(rng.random_range(1..=2)),
                q(rng.random_range(0..=2)),
                q(rng.random_range(1..=2)),
            ),
            _ => vertical_staircase(
                q(rng.random_range(1..=2)),
                q(rng.random_range(0..=2)),
                q(rng.random_range(0..=2)),
                q(rng.random_range(1..=2)),
                q(rng.random_range(0..=2)),
                q(rng.random_range(1..=2)),
                q(rng.random_range(1..=2)),
                q(rng.random_range(0..=2)),
            ),
        }
    }

    #[test]
    fn test_settings_do_not_change_results() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let direct = ComputationSettings::direct();
        let eager = ComputationSettings::default()
            .with_parallelism_threshold(1)
            .with_by_sequence_isomorphism_threshold(0);
        for _ in 0..30 {
            let f = random_curve(&mut rng);
            let g = random_curve(&mut rng);

            let expected = Curve::convolution(&f, &g, &direct).unwrap();
            for settings in [ComputationSettings::default(), eager] {
                let actual = Curve::convolution(&f, &g, &settings).unwrap();
                assert!(Curve::equivalent(&expected, &actual), "min-plus of {} and {}", f, g);
            }

            let expected = Curve::max_plus_convolution(&f, &g, &direct).unwrap();
            let actual = Curve::max_plus_convolution(&f, &g, &eager).unwrap();
            assert!(Curve::equivalent(&expected, &actual), "max-plus of {} and {}", f, g);
        }
    }

    #[test]
    fn test_convolution_is_commutative() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let f = random_curve(&mut rng);
            let g = random_curve(&mut rng);
            let settings = ComputationSettings::direct();
            let fg = Curve::convolution(&f, &g, &settings).unwrap();
            let gf = Curve::convolution(&g, &f, &settings).unwrap();
            assert!(Curve::equivalent(&fg, &gf));
            for t in 0..12 {
                let t = Rational::new(t, 2);
                assert!(fg.value_at(&t).unwrap() <= f.value_at(&t).unwrap() + g.value_at(&q(0)).unwrap());
            }
        }
    }
}
