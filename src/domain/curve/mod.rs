pub mod closed_form;
pub mod deviation;
pub mod envelope;
pub mod min_plus;
pub mod piece;
pub mod rational;

use std::ops::Add;

use num::{Signed, Zero};

use crate::domain::curve::piece::{Piece, merged_starts, refine};
use crate::domain::curve::rational::{Rational, integer, lcm, max, min};

/// Ultimately pseudo-periodic piecewise-linear function over the non-negative time axis.
///
/// The curve is described explicitly on `[0, transient + period)` and repeats afterwards,
/// each repetition shifted up by `increment`: `f(t + period) = f(t) + increment` for every
/// `t >= transient`. All coordinates are exact rationals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    /// Pieces covering `[0, transient + period)`; one of them starts exactly at `transient`.
    pieces: Vec<Piece>,
    transient: Rational,
    period: Rational,
    increment: Rational,
}

impl Curve {
    //---------------------
    // --- Factories ---
    //---------------------

    /// `f(t) = value` for every `t >= 0`, origin included.
    pub fn constant(value: Rational) -> Self {
        Self { pieces: vec![Piece::continuous(Rational::zero(), value, Rational::zero())], transient: Rational::zero(), period: integer(1), increment: Rational::zero() }
    }

    pub fn zero() -> Self {
        Self::constant(Rational::zero())
    }

    /// Sigma-rho curve: `f(0) = 0` and `f(t) = burst + rate * t` for `t > 0`.
    pub fn affine(burst: Rational, rate: Rational) -> Self {
        if burst.is_zero() {
            return Self { pieces: vec![Piece::continuous(Rational::zero(), Rational::zero(), rate.clone())], transient: Rational::zero(), period: integer(1), increment: rate };
        }

        let one = integer(1);
        let pieces = vec![
            Piece::new(Rational::zero(), Rational::zero(), burst.clone(), rate.clone()),
            Piece::continuous(one.clone(), &burst + &rate, rate.clone()),
        ];
        Self::from_pieces(pieces, one.clone(), one, rate)
    }

    /// Rate-latency curve `f(t) = rate * max(0, t - latency)`.
    ///
    /// A non-positive latency yields the pure rate curve.
    pub fn rate_latency(rate: Rational, latency: Rational) -> Self {
        debug_assert!(!latency.is_negative(), "rate-latency curve with negative latency {}", latency);

        if !latency.is_positive() {
            return Self::affine(Rational::zero(), rate);
        }

        let pieces = vec![
            Piece::continuous(Rational::zero(), Rational::zero(), Rational::zero()),
            Piece::continuous(latency.clone(), Rational::zero(), rate.clone()),
        ];
        Self::from_pieces(pieces, latency, integer(1), rate)
    }

    /// Left-continuous staircase `f(t) = height * ceil(t / period)`.
    pub fn stair(height: Rational, period: Rational) -> Self {
        let pieces = vec![Piece::new(Rational::zero(), Rational::zero(), height.clone(), Rational::zero())];
        Self::from_pieces(pieces, Rational::zero(), period, height)
    }

    /// Builds a curve from pieces covering `[0, transient + period)` and normalizes it.
    pub(crate) fn from_pieces(mut pieces: Vec<Piece>, transient: Rational, period: Rational, increment: Rational) -> Self {
        let end = &transient + &period;
        pieces.retain(|piece| piece.start < end);

        let index = pieces.partition_point(|piece| piece.start <= transient) - 1;
        if pieces[index].start != transient {
            let tail = pieces[index].tail_from(&transient);
            pieces.insert(index + 1, tail);
        }

        let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            if let Some(last) = merged.last() {
                let is_collinear = piece.slope == last.slope && piece.value == piece.right && last.line_at(&piece.start) == piece.value;
                if is_collinear && piece.start != transient {
                    continue;
                }
            }
            merged.push(piece);
        }

        let mut curve = Self { pieces: merged, transient, period, increment };
        curve.shrink_affine_tail();
        if !curve.is_ultimately_affine() {
            curve.shrink_periodic_transient();
        }
        curve
    }

    /// Pulls the transient back by whole periods while the period before it already
    /// follows the repeating pattern.
    fn shrink_periodic_transient(&mut self) {
        while self.transient >= self.period {
            let earlier = &self.transient - &self.period;
            let from = self.period_start_index();
            let containing = self.pieces.partition_point(|piece| piece.start <= earlier) - 1;

            let head = &self.pieces[containing];
            let (keep, first) = if head.start == earlier { (containing, head.clone()) } else { (containing + 1, head.tail_from(&earlier)) };
            let mut previous = vec![first];
            previous.extend_from_slice(&self.pieces[containing + 1..from]);

            let periodic = &self.pieces[from..];
            let repeats = previous.len() == periodic.len() && previous.iter().zip(periodic).all(|(piece, next)| piece.shifted(&self.period, &self.increment) == *next);
            if !repeats {
                break;
            }

            self.pieces.truncate(keep);
            self.pieces.extend(previous);
            self.transient = earlier;
        }
    }

    /// Pulls the start of an affine tail back over pieces that already lie on the same line.
    fn shrink_affine_tail(&mut self) {
        while self.pieces.len() > 1 && self.is_ultimately_affine() {
            let tail = &self.pieces[self.pieces.len() - 1];
            let previous = &self.pieces[self.pieces.len() - 2];

            if previous.slope != tail.slope || previous.value != previous.right || previous.line_at(&tail.start) != tail.value {
                break;
            }

            self.transient = previous.start.clone();
            self.pieces.pop();
        }
    }

    //---------------------
    // --- Accessors ---
    //---------------------

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn transient(&self) -> &Rational {
        &self.transient
    }

    pub fn period(&self) -> &Rational {
        &self.period
    }

    pub fn increment(&self) -> &Rational {
        &self.increment
    }

    /// Long-term growth rate `increment / period`.
    pub fn rate(&self) -> Rational {
        &self.increment / &self.period
    }

    /// Whether the periodic part is a single line (so any period length describes it).
    pub fn is_ultimately_affine(&self) -> bool {
        let tail = &self.pieces[self.period_start_index()..];
        tail.len() == 1 && tail[0].value == tail[0].right && &tail[0].slope * &self.period == self.increment
    }

    /// Earliest time from which `f(t + d) >= f(t) + rate * d` for every `d >= 0`.
    ///
    /// That is the transient, unless an affine tail is entered by jumping up onto its line at
    /// the start of the piece before it, as sigma-rho curves do at the origin.
    fn steady_from(&self) -> Rational {
        let count = self.pieces.len();
        if count < 2 || !self.is_ultimately_affine() {
            return self.transient.clone();
        }

        let (previous, tail) = (&self.pieces[count - 2], &self.pieces[count - 1]);
        if previous.slope == tail.slope && previous.value <= previous.right && previous.line_at(&tail.start) == tail.value {
            previous.start.clone()
        } else {
            self.transient.clone()
        }
    }

    fn period_start_index(&self) -> usize {
        self.pieces.partition_point(|piece| piece.start < self.transient)
    }

    fn base_end(&self) -> Rational {
        &self.transient + &self.period
    }

    fn end_of(&self, index: usize) -> Rational {
        self.pieces.get(index + 1).map(|piece| piece.start.clone()).unwrap_or_else(|| self.base_end())
    }

    //---------------------
    // --- Evaluation ---
    //---------------------

    /// Maps `t` into the described range, returning the mapped time and the number of periods removed.
    fn fold(&self, t: &Rational) -> (Rational, Rational) {
        if *t < self.base_end() {
            return (t.clone(), Rational::zero());
        }

        let periods = ((t - &self.transient) / &self.period).floor();
        (t - &periods * &self.period, periods)
    }

    fn piece_at(&self, t: &Rational) -> &Piece {
        &self.pieces[self.pieces.partition_point(|piece| piece.start <= *t) - 1]
    }

    /// `f(t)` for `t >= 0`.
    pub fn value_at(&self, t: &Rational) -> Rational {
        let (folded, periods) = self.fold(t);
        let piece = self.piece_at(&folded);
        let value = if piece.start == folded { piece.value.clone() } else { piece.line_at(&folded) };
        value + periods * &self.increment
    }

    /// `lim f(s)` for `s -> t+`.
    pub fn right_limit_at(&self, t: &Rational) -> Rational {
        let (folded, periods) = self.fold(t);
        self.piece_at(&folded).line_at(&folded) + periods * &self.increment
    }

    /// `lim f(s)` for `s -> t-`, defined for `t > 0`.
    pub fn left_limit_at(&self, t: &Rational) -> Rational {
        let end = self.base_end();
        let (folded, periods) = if *t > end {
            let periods = ((t - &end) / &self.period).ceil();
            (t - &periods * &self.period, periods)
        } else {
            (t.clone(), Rational::zero())
        };

        let index = self.pieces.partition_point(|piece| piece.start < folded) - 1;
        self.pieces[index].line_at(&folded) + periods * &self.increment
    }

    /// Pieces covering `[0, horizon)`, unrolling the periodic part as often as needed.
    ///
    /// An affine tail is never unrolled: its single piece already extends up to `horizon`.
    pub fn pieces_until(&self, horizon: &Rational) -> Vec<Piece> {
        let mut out: Vec<Piece> = self.pieces.iter().take_while(|piece| piece.start < *horizon).cloned().collect();
        if *horizon <= self.base_end() || self.is_ultimately_affine() {
            return out;
        }

        let periodic = &self.pieces[self.period_start_index()..];
        let mut repetition = integer(1);
        loop {
            let dt = &repetition * &self.period;
            let dv = &repetition * &self.increment;

            for piece in periodic {
                let shifted = piece.shifted(&dt, &dv);
                if shifted.start >= *horizon {
                    return out;
                }
                out.push(shifted);
            }

            repetition += integer(1);
        }
    }

    /// Infimum and supremum of `f(t) - rate * t` over all `t >= 0`, with the curve's own rate.
    pub(crate) fn own_rate_offsets(&self) -> (Rational, Rational) {
        let rate = self.rate();
        let mut inf: Option<Rational> = None;
        let mut sup: Option<Rational> = None;

        for (index, piece) in self.pieces.iter().enumerate() {
            let end = self.end_of(index);
            let candidates = [
                &piece.value - &rate * &piece.start,
                &piece.right - &rate * &piece.start,
                piece.line_at(&end) - &rate * &end,
            ];

            for candidate in candidates {
                if inf.as_ref().is_none_or(|current| candidate < *current) {
                    inf = Some(candidate.clone());
                }
                if sup.as_ref().is_none_or(|current| candidate > *current) {
                    sup = Some(candidate);
                }
            }
        }

        (inf.unwrap_or_else(Rational::zero), sup.unwrap_or_else(Rational::zero))
    }

    //---------------------
    // --- Operations ---
    //---------------------

    /// Pointwise sum.
    pub fn add(&self, other: &Curve) -> Curve {
        let period = joint_period(self, other);
        let transient = max(&self.transient, &other.transient);
        let horizon = &transient + &period;

        let a = self.pieces_until(&horizon);
        let b = other.pieces_until(&horizon);
        let starts = merged_starts(&a, &b);

        let pieces = refine(&a, &starts)
            .into_iter()
            .zip(refine(&b, &starts))
            .map(|(x, y)| Piece::new(x.start, x.value + y.value, x.right + y.right, x.slope + y.slope))
            .collect();

        let increment = (self.rate() + other.rate()) * &period;
        Curve::from_pieces(pieces, transient, period, increment)
    }

    /// Sum of any number of curves; the zero curve for an empty input.
    pub fn sum<'a>(curves: impl IntoIterator<Item = &'a Curve>) -> Curve {
        curves.into_iter().fold(Curve::zero(), |acc, curve| acc.add(curve))
    }

    /// Pointwise minimum.
    pub fn minimum(&self, other: &Curve) -> Curve {
        let (own_rate, other_rate) = (self.rate(), other.rate());

        let (transient, period, increment) = if own_rate == other_rate {
            let period = joint_period(self, other);
            let increment = &own_rate * &period;
            (max(&self.transient, &other.transient), period, increment)
        } else {
            let (low, high) = if own_rate < other_rate { (self, other) } else { (other, self) };
            let settled = max(&low.transient, &high.steady_from());
            let joint = joint_period(low, high);
            let checked = &settled + &joint;

            // The gap only widens period over period, so one joint period below is below for good.
            let transient = if low.stays_below(high, &checked, &(&checked + &joint)) {
                checked
            } else {
                let (_, low_sup) = low.own_rate_offsets();
                let (high_inf, _) = high.own_rate_offsets();

                // Past this point the slower curve stays below the faster one for good.
                let crossing = (low_sup - high_inf) / (high.rate() - low.rate());
                max(&settled, &crossing)
            };
            let (period, increment) = trailing_period(low, high);
            (transient, period, increment)
        };

        let horizon = &transient + &period;
        let a = self.pieces_until(&horizon);
        let b = other.pieces_until(&horizon);
        let starts = merged_starts(&a, &b);

        let mut pieces = Vec::with_capacity(starts.len());
        for (index, (x, y)) in refine(&a, &starts).into_iter().zip(refine(&b, &starts)).enumerate() {
            let end = starts.get(index + 1).unwrap_or(&horizon);
            push_lower(x, y, end, &mut pieces);
        }

        Curve::from_pieces(pieces, transient, period, increment)
    }

    /// Whether `self <= other` on `[from, to)`, one-sided limits included.
    fn stays_below(&self, other: &Curve, from: &Rational, to: &Rational) -> bool {
        let a = self.pieces_until(to);
        let b = other.pieces_until(to);
        let mut starts = merged_starts(&a, &b);
        if let Err(index) = starts.binary_search(from) {
            starts.insert(index, from.clone());
        }

        let (a, b) = (refine(&a, &starts), refine(&b, &starts));
        (0..starts.len()).filter(|index| starts[*index] >= *from).all(|index| {
            let end = starts.get(index + 1).unwrap_or(to);
            a[index].value <= b[index].value && a[index].right <= b[index].right && a[index].line_at(end) <= b[index].line_at(end)
        })
    }

    /// Multiplies every value by `factor`.
    pub fn scale(&self, factor: &Rational) -> Curve {
        let pieces = self.pieces.iter().map(|piece| Piece::new(piece.start.clone(), &piece.value * factor, &piece.right * factor, &piece.slope * factor)).collect();
        Curve::from_pieces(pieces, self.transient.clone(), self.period.clone(), &self.increment * factor)
    }

    /// The same curve with `f(0)` forced to zero.
    pub fn with_zero_origin(&self) -> Curve {
        let (mut pieces, transient) = if self.transient.is_zero() {
            // The origin is part of the periodic pattern; move the pattern one period out first.
            (self.pieces_until(&(&self.period + &self.period)), self.period.clone())
        } else {
            (self.pieces.clone(), self.transient.clone())
        };

        pieces[0].value = Rational::zero();
        Curve::from_pieces(pieces, transient, self.period.clone(), self.increment.clone())
    }
}

impl Add for &Curve {
    type Output = Curve;

    fn add(self, other: &Curve) -> Curve {
        Curve::add(self, other)
    }
}

/// Appends the pointwise minimum of two pieces that share their start and `end`.
fn push_lower(x: Piece, y: Piece, end: &Rational, out: &mut Vec<Piece>) {
    let value = min(&x.value, &y.value);
    let diff_start = &x.right - &y.right;
    let diff_end = x.line_at(end) - y.line_at(end);

    let crosses = (diff_start.is_negative() && diff_end.is_positive()) || (diff_start.is_positive() && diff_end.is_negative());
    let x_first = diff_start.is_negative() || (diff_start.is_zero() && !diff_end.is_positive());
    let (first, second) = if x_first { (x, y) } else { (y, x) };

    if crosses {
        let crossing = &first.start + (&second.right - &first.right) / (&first.slope - &second.slope);
        let at_crossing = first.line_at(&crossing);
        out.push(Piece::new(first.start, value, first.right, first.slope));
        out.push(Piece::continuous(crossing, at_crossing, second.slope));
        return;
    }

    out.push(Piece::new(first.start, value, first.right, first.slope));
}

/// Period and increment of a result that ends up following `low`.
///
/// An ultimately affine `low` fits any period, so it borrows `high`'s to keep horizons short.
pub(crate) fn trailing_period(low: &Curve, high: &Curve) -> (Rational, Rational) {
    if low.is_ultimately_affine() && !high.is_ultimately_affine() {
        (high.period.clone(), low.rate() * &high.period)
    } else {
        (low.period.clone(), low.increment.clone())
    }
}

/// Period after which both curves repeat.
pub(crate) fn joint_period(a: &Curve, b: &Curve) -> Rational {
    if a.is_ultimately_affine() {
        b.period.clone()
    } else if b.is_ultimately_affine() {
        a.period.clone()
    } else {
        lcm(&a.period, &b.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::curve::rational::rational;

    #[test]
    fn test_repeated_periods_fold_into_the_pattern() {
        // Two periods of `2 * ceil(t)` described explicitly.
        let pieces = vec![Piece::new(integer(0), integer(0), integer(2), integer(0)), Piece::new(integer(1), integer(2), integer(4), integer(0))];
        let curve = Curve::from_pieces(pieces, integer(1), integer(1), integer(2));

        assert_eq!(curve, Curve::stair(integer(2), integer(1)));
        assert_eq!(*curve.transient(), integer(0));
    }

    #[test]
    fn test_steady_from() {
        assert_eq!(Curve::affine(integer(3), integer(2)).steady_from(), integer(0), "The jump at the origin lands on the tail");
        assert_eq!(Curve::rate_latency(integer(2), integer(5)).steady_from(), integer(5));
        assert_eq!(Curve::stair(integer(1), rational(1, 8)).steady_from(), integer(0));
    }

    #[test]
    fn test_minimum_below_a_sigma_rho_curve_keeps_the_short_pattern() {
        let stair = Curve::stair(integer(1), rational(1, 8));
        let minimum = Curve::affine(integer(100), integer(10)).minimum(&stair);

        assert_eq!(minimum, stair);
        assert_eq!(minimum.pieces().len(), 1);
    }
}
