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

//! # Breakpoints
//!
//! Lazy enumeration of the breakpoints of a [`Curve`]. The breakpoints of
//! the base sequence before `T + d` are listed first; after that, the
//! breakpoints of one period are repeated, shifted by `k·d` in time and
//! `k·c` in value. Nothing beyond the current breakpoint is materialized,
//! so an unbounded cursor can be consumed with `take`.

use crate::{curve::Curve, error::AlgebraResult};
use tropic_core::num::rational::Rational;

/// A breakpoint with its limits. The left limit is absent at time `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Breakpoint {
    time: Rational,
    left_limit: Option<Rational>,
    value: Rational,
    right_limit: Rational,
}

impl Breakpoint {
    #[inline]
    pub fn time(&self) -> &Rational {
        &self.time
    }

    #[inline]
    pub fn left_limit(&self) -> Option<&Rational> {
        self.left_limit.as_ref()
    }

    #[inline]
    pub fn value(&self) -> &Rational {
        &self.value
    }

    #[inline]
    pub fn right_limit(&self) -> &Rational {
        &self.right_limit
    }

    /// Returns `true` if the curve is continuous at this breakpoint.
    #[inline]
    pub fn is_continuous(&self) -> bool {
        self.left_limit.as_ref().is_none_or(|l| *l == self.value) && self.value == self.right_limit
    }

    fn shifted(&self, dt: &Rational, dv: &Rational) -> Self {
        Self {
            time: &self.time + dt,
            left_limit: self.left_limit.as_ref().map(|l| l + dv),
            value: &self.value + dv,
            right_limit: &self.right_limit + dv,
        }
    }
}

/// A restartable cursor over the breakpoints of a curve.
///
/// # Examples
///
/// ```rust
/// # use tropic_curves::staircase::stair;
/// # use tropic_core::num::rational::Rational;
///
/// let f = stair(Rational::from(2), Rational::from(1));
/// let mut breakpoints = f.breakpoints_until(Rational::from(4)).unwrap();
/// let times: Vec<Rational> = breakpoints.by_ref().map(|b| b.time().clone()).collect();
/// assert_eq!(times, vec![Rational::from(0), Rational::from(2), Rational::from(4)]);
///
/// breakpoints.restart();
/// assert_eq!(breakpoints.next().unwrap().time(), &Rational::from(0));
/// ```
#[derive(Debug, Clone)]
pub struct Breakpoints {
    transient: Vec<Breakpoint>,
    period: Vec<Breakpoint>,
    length: Rational,
    height: Rational,
    until: Option<Rational>,
    position: usize,
}

impl Breakpoints {
    pub(crate) fn new(curve: &Curve, until: Option<Rational>) -> AlgebraResult<Self> {
        let start = curve.pseudo_periodic_start_time();
        let end = curve.first_pseudo_period_end();
        let length = curve.pseudo_period_length();

        let mut times: Vec<Rational> = curve
            .base_sequence()
            .breakpoint_times()
            .into_iter()
            .filter(|t| t < &end)
            .collect();
        if let Err(i) = times.binary_search(start) {
            times.insert(i, start.clone());
        }

        let at = |time: &Rational| -> AlgebraResult<Breakpoint> {
            Ok(Breakpoint {
                time: time.clone(),
                left_limit: if time.is_positive() {
                    Some(curve.left_limit_at(time)?)
                } else {
                    None
                },
                value: curve.value_at(time)?,
                right_limit: curve.right_limit_at(time)?,
            })
        };
        let transient = times.iter().map(at).collect::<AlgebraResult<Vec<_>>>()?;
        // The first repetition, where limits no longer depend on the transient part.
        let period = times
            .iter()
            .filter(|t| *t >= start)
            .map(|t| at(&(t + length)))
            .collect::<AlgebraResult<Vec<_>>>()?;

        Ok(Self {
            transient,
            period,
            length: length.clone(),
            height: curve.pseudo_period_height().clone(),
            until,
            position: 0,
        })
    }

    /// Rewinds the cursor to the first breakpoint.
    #[inline]
    pub fn restart(&mut self) {
        self.position = 0;
    }
}

impl Iterator for Breakpoints {
    type Item = Breakpoint;

    fn next(&mut self) -> Option<Self::Item> {
        let breakpoint = match self.position.checked_sub(self.transient.len()) {
            None => self.transient[self.position].clone(),
            Some(offset) => {
                let k = Rational::from(offset / self.period.len());
                self.period[offset % self.period.len()].shifted(&(&k * &self.length), &(&k * &self.height))
            }
        };
        if self.until.as_ref().is_some_and(|until| breakpoint.time() > until) {
            return None;
        }
        self.position += 1;
        Some(breakpoint)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        curve::Curve,
        element::{Point, Segment},
        sequence::Sequence,
    };
    use tropic_core::num::rational::Rational;

    fn q(v: i64) -> Rational {
        Rational::from(v)
    }

    /// 0 on [0, 2], then slope 1 with a jump of 1 at every multiple of 2
    fn curve() -> Curve {
        Curve::new(
            Sequence::new(vec![
                Point::new(q(0), q(0)).into(),
                Segment::new(q(0), q(2), q(0), q(0)).into(),
                Point::new(q(2), q(0)).into(),
                Segment::new(q(2), q(4), q(1), q(1)).into(),
            ]),
            q(2),
            q(2),
            q(4),
        )
    }

    #[test]
    fn test_transient_then_periods() {
        let breakpoints: Vec<_> = curve().breakpoints_until(q(6)).unwrap().collect();
        let times: Vec<Rational> = breakpoints.iter().map(|b| b.time().clone()).collect();
        assert_eq!(times, vec![q(0), q(2), q(4), q(6)]);

        assert_eq!(breakpoints[0].left_limit(), None);
        assert_eq!(breakpoints[0].right_limit(), &q(0));
        assert_eq!(breakpoints[1].left_limit(), Some(&q(0)));
        assert_eq!(breakpoints[1].right_limit(), &q(1));
        assert_eq!(breakpoints[2].left_limit(), Some(&q(3)));
        assert_eq!(breakpoints[2].value(), &q(4));
        assert_eq!(breakpoints[2].right_limit(), &q(5));
        assert_eq!(breakpoints[3].left_limit(), Some(&q(7)));
        assert_eq!(breakpoints[3].value(), &q(8));
    }

    #[test]
    fn test_unbounded_cursor() {
        let mut cursor = curve().breakpoints().unwrap();
        let hundredth = cursor.nth(99).unwrap();
        assert_eq!(hundredth.time(), &q(198));
        cursor.restart();
        assert_eq!(cursor.next().unwrap().time(), &q(0));
    }

    #[test]
    fn test_periodic_start_inside_a_segment() {
        let f = Curve::new(
            Sequence::new(vec![Point::new(q(0), q(0)).into(), Segment::new(q(0), q(3), q(0), q(1)).into()]),
            q(1),
            q(2),
            q(2),
        );
        let times: Vec<Rational> = f.breakpoints_until(q(5)).unwrap().map(|b| b.time().clone()).collect();
        assert_eq!(times, vec![q(0), q(1), q(3), q(5)]);
        assert!(f.breakpoints_until(q(5)).unwrap().skip(1).all(|b| b.is_continuous()));
    }
}
