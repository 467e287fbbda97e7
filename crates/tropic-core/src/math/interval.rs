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

//! # Rational Time Intervals
//!
//! `TimeInterval` is an interval over exact `Rational` values whose bounds
//! can each be open or closed. Elements of a piecewise-linear function live
//! on such intervals: a point on `[t, t]`, a segment on `(a, b)`. Cut
//! operations take a window of the same shape.
//!
//! ## Highlights
//!
//! - Validated construction (`new` panics, `try_new` returns `Option`).
//! - Shorthands `closed_open`, `open`, `closed`, `point`.
//! - Membership (`contains`, `contains_interval`) honouring inclusion flags.
//! - `intersection`, which returns `None` when no instant is shared.
//! - `std::ops::RangeBounds<Rational>` so the interval can be used with
//!   range-aware APIs.

use crate::num::rational::Rational;

/// An interval over exact rationals with an inclusion flag per bound.
///
/// This struct describes the domains of curve elements and the windows
/// passed to cut operations. Unlike integer intervals, a rational interval
/// can be open or closed on either side, and the distinction matters: a
/// segment never contains its endpoints while a point is a degenerate
/// closed interval.
///
/// # Invariants
/// `start <= end`, and `start == end` only for the closed degenerate
/// interval `[start, start]` or the empty interval `(start, start)`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    start: Rational,
    end: Rational,
    start_included: bool,
    end_included: bool,
}

impl TimeInterval {
    /// Creates a new `TimeInterval`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_core::math::interval::TimeInterval;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let iv = TimeInterval::new(Rational::from(0), Rational::from(10), true, false);
    /// assert_eq!(iv.len(), Rational::from(10));
    /// ```
    #[inline]
    pub fn new(start: Rational, end: Rational, start_included: bool, end_included: bool) -> Self {
        assert!(
            start <= end,
            "Invalid interval: start must be less than or equal to end"
        );
        Self {
            start,
            end,
            start_included,
            end_included,
        }
    }

    /// Creates a new `TimeInterval` if `start <= end`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_core::math::interval::TimeInterval;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// assert!(TimeInterval::try_new(Rational::from(0), Rational::from(10), true, true).is_some());
    /// assert!(TimeInterval::try_new(Rational::from(10), Rational::from(0), true, true).is_none());
    /// ```
    #[inline]
    pub fn try_new(
        start: Rational,
        end: Rational,
        start_included: bool,
        end_included: bool,
    ) -> Option<Self> {
        if start <= end {
            Some(Self {
                start,
                end,
                start_included,
                end_included,
            })
        } else {
            None
        }
    }

    /// Creates the closed-open interval `[start, end)`.
    #[inline]
    pub fn closed_open(start: Rational, end: Rational) -> Self {
        Self::new(start, end, true, false)
    }

    /// Creates the open interval `(start, end)`, the domain of a segment.
    #[inline]
    pub fn open(start: Rational, end: Rational) -> Self {
        Self::new(start, end, false, false)
    }

    /// Creates the closed interval `[start, end]`.
    #[inline]
    pub fn closed(start: Rational, end: Rational) -> Self {
        Self::new(start, end, true, true)
    }

    /// Creates the degenerate interval `[time, time]`, the domain of a point.
    #[inline]
    pub fn point(time: Rational) -> Self {
        Self::new(time.clone(), time, true, true)
    }

    #[inline]
    pub fn start(&self) -> &Rational {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &Rational {
        &self.end
    }

    #[inline]
    pub fn is_start_included(&self) -> bool {
        self.start_included
    }

    #[inline]
    pub fn is_end_included(&self) -> bool {
        self.end_included
    }

    /// Returns the length of the interval (`end - start`).
    #[inline]
    pub fn len(&self) -> Rational {
        &self.end - &self.start
    }

    /// Returns `true` if no instant belongs to the interval.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_core::math::interval::TimeInterval;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// assert!(!TimeInterval::point(Rational::from(3)).is_empty());
    /// assert!(TimeInterval::closed_open(Rational::from(3), Rational::from(3)).is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end && !(self.start_included && self.end_included)
    }

    /// Returns `true` if the interval is a single instant.
    #[inline]
    pub fn is_point(&self) -> bool {
        self.start == self.end && self.start_included && self.end_included
    }

    /// Returns `true` if `time` belongs to the interval.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_core::math::interval::TimeInterval;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let iv = TimeInterval::closed_open(Rational::from(0), Rational::from(10));
    /// assert!(iv.contains(&Rational::from(0)));
    /// assert!(!iv.contains(&Rational::from(10)));
    /// ```
    pub fn contains(&self, time: &Rational) -> bool {
        let after_start = if self.start_included {
            &self.start <= time
        } else {
            &self.start < time
        };
        let before_end = if self.end_included {
            time <= &self.end
        } else {
            time < &self.end
        };
        after_start && before_end
    }

    /// Returns `true` if every instant of `other` belongs to `self`.
    pub fn contains_interval(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        let start_ok = match self.start.cmp(&other.start) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => self.start_included || !other.start_included,
            std::cmp::Ordering::Greater => false,
        };
        let end_ok = match self.end.cmp(&other.end) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => self.end_included || !other.end_included,
            std::cmp::Ordering::Less => false,
        };
        start_ok && end_ok
    }

    /// Calculates the intersection of two intervals.
    ///
    /// Returns `None` if the intervals share no instant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tropic_core::math::interval::TimeInterval;
    /// # use tropic_core::num::rational::Rational;
    ///
    /// let a = TimeInterval::closed(Rational::from(0), Rational::from(5));
    /// let b = TimeInterval::open(Rational::from(5), Rational::from(8));
    /// assert!(a.intersection(&b).is_none());
    /// ```
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let (start, start_included) = match self.start.cmp(&other.start) {
            std::cmp::Ordering::Less => (other.start.clone(), other.start_included),
            std::cmp::Ordering::Greater => (self.start.clone(), self.start_included),
            std::cmp::Ordering::Equal => (
                self.start.clone(),
                self.start_included && other.start_included,
            ),
        };
        let (end, end_included) = match self.end.cmp(&other.end) {
            std::cmp::Ordering::Less => (self.end.clone(), self.end_included),
            std::cmp::Ordering::Greater => (other.end.clone(), other.end_included),
            std::cmp::Ordering::Equal => (self.end.clone(), self.end_included && other.end_included),
        };
        let result = Self::try_new(start, end, start_included, end_included)?;
        if result.is_empty() { None } else { Some(result) }
    }
}

impl std::fmt::Debug for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeInterval")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("start_included", &self.start_included)
            .field("end_included", &self.end_included)
            .finish()
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.start_included { '[' } else { '(' },
            self.start,
            self.end,
            if self.end_included { ']' } else { ')' }
        )
    }
}

impl std::ops::RangeBounds<Rational> for TimeInterval {
    fn start_bound(&self) -> std::ops::Bound<&Rational> {
        if self.start_included {
            std::ops::Bound::Included(&self.start)
        } else {
            std::ops::Bound::Excluded(&self.start)
        }
    }

    fn end_bound(&self) -> std::ops::Bound<&Rational> {
        if self.end_included {
            std::ops::Bound::Included(&self.end)
        } else {
            std::ops::Bound::Excluded(&self.end)
        }
    }
}
