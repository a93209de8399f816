use num::{Signed, Zero};

use crate::domain::curve::piece::{Element, Piece};
use crate::domain::curve::rational::{Rational, min};

/// Which side of the inserted elements the envelope keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Pointwise infimum, used by convolution.
    Lower,
    /// Pointwise supremum, used by deconvolution.
    Upper,
}

impl Bound {
    /// Whether a candidate that differs from the incumbent by `diff` (candidate - incumbent)
    /// is at least as good as the incumbent.
    fn accepts(&self, diff: &Rational) -> bool {
        match self {
            Bound::Lower => !diff.is_positive(),
            Bound::Upper => !diff.is_negative(),
        }
    }

    fn merge(&self, slot: &mut Option<Rational>, candidate: Rational) {
        let replace = match slot.as_ref() {
            Some(current) => self.accepts(&(&candidate - current)),
            None => true,
        };

        if replace {
            *slot = Some(candidate);
        }
    }
}

/// Running lower or upper envelope of points and open segments over `[0, horizon)`.
///
/// Starts out undefined everywhere; every inserted element is merged in place, splitting
/// intervals at element boundaries and at crossings so that each interval keeps a single
/// winning line.
#[derive(Debug, Clone)]
pub struct Envelope {
    bound: Bound,
    horizon: Rational,
    starts: Vec<Rational>,
    points: Vec<Option<Rational>>,
    lines: Vec<Option<(Rational, Rational)>>,
}

impl Envelope {
    pub fn new(bound: Bound, horizon: Rational) -> Self {
        Self { bound, horizon, starts: vec![Rational::zero()], points: vec![None], lines: vec![None] }
    }

    fn end_of(&self, index: usize) -> Rational {
        self.starts.get(index + 1).unwrap_or(&self.horizon).clone()
    }

    /// Makes sure an interval starts at `t` and returns its index.
    fn split_at(&mut self, t: &Rational) -> usize {
        match self.starts.binary_search(t) {
            Ok(index) => index,
            Err(index) => {
                let (point, line) = match &self.lines[index - 1] {
                    Some((right, slope)) => {
                        let value = right + slope * (t - &self.starts[index - 1]);
                        (Some(value.clone()), Some((value, slope.clone())))
                    }
                    None => (None, None),
                };

                self.starts.insert(index, t.clone());
                self.points.insert(index, point);
                self.lines.insert(index, line);
                index
            }
        }
    }

    pub fn insert(&mut self, element: Element) {
        match element {
            Element::Point { time, value } => self.insert_point(time, value),
            Element::Open { start, end, right, slope } => self.insert_open(start, end, right, slope),
        }
    }

    fn insert_point(&mut self, time: Rational, value: Rational) {
        if time.is_negative() || time >= self.horizon {
            return;
        }

        let index = self.split_at(&time);
        self.bound.merge(&mut self.points[index], value);
    }

    fn insert_open(&mut self, start: Rational, end: Rational, right: Rational, slope: Rational) {
        let end = min(&end, &self.horizon);
        let (start, right) = if start.is_negative() {
            if !end.is_positive() {
                return;
            }
            // The open segment covers the origin itself.
            let at_origin = &right - &slope * &start;
            self.insert_point(Rational::zero(), at_origin.clone());
            (Rational::zero(), at_origin)
        } else {
            (start, right)
        };

        if start >= end {
            return;
        }

        let first = self.split_at(&start);
        let mut last = if end < self.horizon { self.split_at(&end) } else { self.starts.len() };
        let mut index = first;

        while index < last {
            let interval_start = self.starts[index].clone();
            let interval_end = self.end_of(index);
            let value = &right + &slope * (&interval_start - &start);

            if index > first {
                self.bound.merge(&mut self.points[index], value.clone());
            }

            match self.lines[index].clone() {
                None => self.lines[index] = Some((value, slope.clone())),
                Some((old_right, old_slope)) => {
                    let diff_start = &value - &old_right;
                    let diff_end = &diff_start + (&slope - &old_slope) * (&interval_end - &interval_start);

                    let keeps_old = self.bound.accepts(&-&diff_start) && self.bound.accepts(&-&diff_end);
                    let takes_new = self.bound.accepts(&diff_start) && self.bound.accepts(&diff_end);

                    if keeps_old {
                        // nothing to do
                    } else if takes_new {
                        self.lines[index] = Some((value, slope.clone()));
                    } else {
                        // Lines cross strictly inside the interval: split and revisit both halves.
                        let crossing = &interval_start - &diff_start / (&slope - &old_slope);
                        self.split_at(&crossing);
                        last += 1;
                        continue;
                    }
                }
            }

            index += 1;
        }
    }

    /// Converts the envelope into pieces.
    ///
    /// # Returns
    /// Returns `None` if some part of `[0, horizon)` was never covered by an element.
    pub fn into_pieces(self) -> Option<Vec<Piece>> {
        let mut pieces = Vec::with_capacity(self.starts.len());

        for ((start, point), line) in self.starts.into_iter().zip(self.points).zip(self.lines) {
            let (right, slope) = line?;
            pieces.push(Piece::new(start, point?, right, slope));
        }

        Some(pieces)
    }
}
