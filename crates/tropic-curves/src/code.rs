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

//! # Textual Format
//!
//! Every algebra type prints as the expression that rebuilds it, and
//! parses back from the same text:
//!
//! ```text
//! Point(2, 3/4)
//! Segment(0, 2, 1, -1/2)
//! Sequence[Point(0, 0), Segment(0, 2, 0, 1)]
//! Curve(Sequence[Point(0, 0), Segment(0, 1, 1, 0)], 0, 1, 1)
//! ```
//!
//! Rationals use the `n`, `n/d`, `+Inf` and `-Inf` forms. Whitespace
//! between tokens is ignored. Malformed text is reported as
//! [`AlgebraError::Parse`]; well-formed text describing an invalid object
//! yields the error of the matching `try_new`.
//!
//! ```rust
//! # use tropic_curves::sequence::Sequence;
//!
//! let text = "Sequence[Point(0, 0), Segment(0, 2, 0, 1/2)]";
//! let sequence: Sequence = text.parse().unwrap();
//! assert_eq!(sequence.to_string(), text);
//! ```

use crate::{
    curve::Curve,
    element::{Element, Point, Segment},
    error::{AlgebraError, AlgebraResult},
    sequence::Sequence,
};
use std::{fmt, str::FromStr};
use tropic_core::num::rational::Rational;

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.time(), self.value())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment({}, {}, {}, {})",
            self.start_time(),
            self.end_time(),
            self.right_limit_at_start_time(),
            self.slope()
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Point(p) => p.fmt(f),
            Element::Segment(s) => s.fmt(f),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequence[")?;
        for (i, element) in self.elements().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", element)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Curve({}, {}, {}, {})",
            self.base_sequence(),
            self.pseudo_periodic_start_time(),
            self.pseudo_period_length(),
            self.pseudo_period_height()
        )
    }
}

/// A cursor over the text being parsed.
struct Scanner<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn error(&self, reason: impl fmt::Display) -> AlgebraError {
        AlgebraError::Parse {
            input: self.input.to_string(),
            reason: format!("{} at offset {}", reason, self.position),
        }
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.position += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> AlgebraResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format_args!("expected `{}`", token)))
        }
    }

    fn rational(&mut self) -> AlgebraResult<Rational> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest
            .find(|c: char| matches!(c, ',' | ')' | ']') || c.is_whitespace())
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a rational"));
        }
        let token = &rest[..len];
        let value = token
            .parse::<Rational>()
            .map_err(|_| self.error(format_args!("invalid rational `{}`", token)))?;
        self.position += len;
        Ok(value)
    }

    /// Parses `(a, b, ...)` with exactly `N` rationals.
    fn arguments<const N: usize>(&mut self) -> AlgebraResult<[Rational; N]> {
        self.expect("(")?;
        let mut values: [Rational; N] = std::array::from_fn(|_| Rational::default());
        for (i, value) in values.iter_mut().enumerate() {
            if i > 0 {
                self.expect(",")?;
            }
            *value = self.rational()?;
        }
        self.expect(")")?;
        Ok(values)
    }

    fn point(&mut self) -> AlgebraResult<Point> {
        self.expect("Point")?;
        let [time, value] = self.arguments::<2>()?;
        Point::try_new(time, value)
    }

    fn segment(&mut self) -> AlgebraResult<Segment> {
        self.expect("Segment")?;
        let [start, end, right_limit, slope] = self.arguments::<4>()?;
        Segment::try_new(start, end, right_limit, slope)
    }

    fn element(&mut self) -> AlgebraResult<Element> {
        self.skip_whitespace();
        if self.rest().starts_with("Point") {
            Ok(Element::Point(self.point()?))
        } else if self.rest().starts_with("Segment") {
            Ok(Element::Segment(self.segment()?))
        } else {
            Err(self.error("expected `Point` or `Segment`"))
        }
    }

    fn sequence(&mut self) -> AlgebraResult<Sequence> {
        self.expect("Sequence")?;
        self.expect("[")?;
        let mut elements = Vec::new();
        if !self.eat("]") {
            loop {
                elements.push(self.element()?);
                if self.eat("]") {
                    break;
                }
                self.expect(",")?;
            }
        }
        Sequence::try_new(elements)
    }

    fn curve(&mut self) -> AlgebraResult<Curve> {
        self.expect("Curve")?;
        self.expect("(")?;
        let base = self.sequence()?;
        self.expect(",")?;
        let start = self.rational()?;
        self.expect(",")?;
        let length = self.rational()?;
        self.expect(",")?;
        let height = self.rational()?;
        self.expect(")")?;
        Curve::try_new(base, start, length, height)
    }

    fn finish(&mut self) -> AlgebraResult<()> {
        self.skip_whitespace();
        if self.position < self.input.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(())
    }
}

macro_rules! impl_from_str {
    ($type:ty, $method:ident) => {
        impl FromStr for $type {
            type Err = AlgebraError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut scanner = Scanner::new(s);
                let value = scanner.$method()?;
                scanner.finish()?;
                Ok(value)
            }
        }
    };
}

impl_from_str!(Point, point);
impl_from_str!(Segment, segment);
impl_from_str!(Element, element);
impl_from_str!(Sequence, sequence);
impl_from_str!(Curve, curve);
