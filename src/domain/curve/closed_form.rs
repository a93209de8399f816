use num::{Signed, Zero};

use crate::domain::curve::Curve;
use crate::domain::curve::piece::Piece;
use crate::domain::curve::rational::{Rational, integer, max, min};

impl Curve {
    /// `(burst, rate)` if the curve is exactly `Curve::affine(burst, rate)`.
    pub fn as_affine(&self) -> Option<(Rational, Rational)> {
        let first = &self.pieces[0];
        let (burst, rate) = (first.right.clone(), first.slope.clone());
        (*self == Curve::affine(burst.clone(), rate.clone())).then_some((burst, rate))
    }

    /// `(rate, latency)` if the curve is exactly `Curve::rate_latency(rate, latency)`.
    pub fn as_rate_latency(&self) -> Option<(Rational, Rational)> {
        let latency = match self.pieces.as_slice() {
            [_] => Rational::zero(),
            [_, rising] => rising.start.clone(),
            _ => return None,
        };

        let rate = self.rate();
        (*self == Curve::rate_latency(rate.clone(), latency.clone())).then_some((rate, latency))
    }

    /// Whether `f(s) <= f(t)` for all `s <= t`.
    pub fn is_non_decreasing(&self) -> bool {
        if self.increment.is_negative() {
            return false;
        }

        let wrapped = &self.pieces[self.period_start_index()].value + &self.increment;
        self.pieces.iter().enumerate().all(|(index, piece)| {
            let next = self.pieces.get(index + 1).map_or(&wrapped, |next| &next.value);
            !piece.slope.is_negative() && piece.right >= piece.value && *next >= piece.line_at(&self.end_of(index))
        })
    }

    /// `f ⊗ g` for a sigma-rho `g` at least as fast as `f`, in linear time:
    /// `min(f(t), burst + rate * t + inf_{s <= t} (f(s) - rate * s))`.
    pub(crate) fn convolution_with_affine(&self, burst: &Rational, rate: &Rational) -> Curve {
        let lowered = self.add(&Curve::affine(Rational::zero(), -rate));
        let detour = lowered.running_infimum().plus_line(burst, rate);
        self.minimum(&detour)
    }

    /// `f ⊘ g` for a non-decreasing `f` no faster than the rate-latency `g`, in linear time:
    /// `rate * (t + latency) + sup_{s > t + latency} (f(s) - rate * s)`.
    pub(crate) fn deconvolution_by_rate_latency(&self, rate: &Rational, latency: &Rational) -> Curve {
        let lowered = self.add(&Curve::affine(Rational::zero(), -rate));
        lowered.future_supremum().shifted_left(latency).plus_line(&(rate * latency), rate)
    }

    /// `m(t) = inf_{0 <= s <= t} f(s)`.
    ///
    /// The curve must not grow in the long run, otherwise the sweep never settles.
    fn running_infimum(&self) -> Curve {
        debug_assert!(!self.increment.is_positive(), "running infimum of a growing curve");

        let from = self.period_start_index();
        let mut pieces = Vec::with_capacity(self.pieces.len() * 2);
        let mut low = None;

        for index in 0..from {
            low = Some(push_infimum(&self.pieces[index], &self.end_of(index), low, &mut pieces));
        }

        // Each period continues from the infimum of everything before it; once that value
        // repeats shifted by the increment, so does the rest of the sweep.
        let mut repetition = Rational::zero();
        loop {
            let dt = &repetition * &self.period;
            let dv = &repetition * &self.increment;
            let entering = low.clone();

            for index in from..self.pieces.len() {
                let piece = self.pieces[index].shifted(&dt, &dv);
                low = Some(push_infimum(&piece, &(self.end_of(index) + &dt), low, &mut pieces));
            }

            if let (Some(entering), Some(leaving)) = (entering, low.as_ref()) {
                if *leaving == entering + &self.increment {
                    return Curve::from_pieces(pieces, &self.transient + dt, self.period.clone(), self.increment.clone());
                }
            }

            repetition += integer(1);
        }
    }

    /// `S(t) = sup_{s > t} f(s)`.
    ///
    /// The curve must not grow in the long run. `S` then repeats exactly like `f`.
    fn future_supremum(&self) -> Curve {
        debug_assert!(!self.increment.is_positive(), "future supremum of a growing curve");

        let from = self.period_start_index();
        let at_end = &self.pieces[from].value + &self.increment;

        // Supremum over `(transient, transient + period]`.
        let mut first_period = at_end.clone();
        for index in from..self.pieces.len() {
            let piece = &self.pieces[index];
            let mut candidates = vec![piece.right.clone(), piece.line_at(&self.end_of(index))];
            if index > from {
                candidates.push(piece.value.clone());
            }
            for candidate in candidates {
                first_period = max(&first_period, &candidate);
            }
        }

        // `ahead` is the supremum over `[end, infinity)` of the piece being swept.
        let mut ahead = max(&at_end, &(first_period + &self.increment));
        let mut pieces = Vec::with_capacity(self.pieces.len() * 2);

        for index in (0..self.pieces.len()).rev() {
            let piece = &self.pieces[index];
            let at_start = push_supremum_reversed(piece, &self.end_of(index), &ahead, &mut pieces);
            ahead = max(&piece.value, &at_start);
        }

        pieces.reverse();
        Curve::from_pieces(pieces, self.transient.clone(), self.period.clone(), self.increment.clone())
    }

    /// `t -> f(t + by)`.
    fn shifted_left(&self, by: &Rational) -> Curve {
        if by.is_zero() {
            return self.clone();
        }

        let transient = max(&Rational::zero(), &(&self.transient - by));
        let horizon = by + &transient + &self.period;
        let pieces = self.pieces_until(&horizon);
        let first = pieces.partition_point(|piece| piece.start <= *by) - 1;

        let (dt, dv) = (-by, Rational::zero());
        let head = if pieces[first].start == *by { pieces[first].clone() } else { pieces[first].tail_from(by) };
        let shifted = std::iter::once(head.shifted(&dt, &dv)).chain(pieces[first + 1..].iter().map(|piece| piece.shifted(&dt, &dv))).collect();

        Curve::from_pieces(shifted, transient, self.period.clone(), self.increment.clone())
    }

    /// `t -> f(t) + offset + rate * t`.
    fn plus_line(&self, offset: &Rational, rate: &Rational) -> Curve {
        let pieces = self
            .pieces
            .iter()
            .map(|piece| {
                let lift = offset + rate * &piece.start;
                Piece::new(piece.start.clone(), &piece.value + &lift, &piece.right + &lift, &piece.slope + rate)
            })
            .collect();

        Curve::from_pieces(pieces, self.transient.clone(), self.period.clone(), &self.increment + rate * &self.period)
    }
}

/// Extends a running infimum over `piece`, which ends at `end`, given the infimum `low` of
/// everything before it. Returns the infimum up to (not including) `end`.
fn push_infimum(piece: &Piece, end: &Rational, low: Option<Rational>, out: &mut Vec<Piece>) -> Rational {
    let at_start = match low {
        Some(low) => min(&low, &piece.value),
        None => piece.value.clone(),
    };

    if !piece.slope.is_negative() {
        let after = min(&at_start, &piece.right);
        out.push(Piece::new(piece.start.clone(), at_start, after.clone(), Rational::zero()));
        return after;
    }

    let leaving = min(&at_start, &piece.line_at(end));
    if piece.right <= at_start {
        out.push(Piece::new(piece.start.clone(), at_start, piece.right.clone(), piece.slope.clone()));
        return leaving;
    }

    // Flat until the falling line drops below what was already seen.
    let reached = &piece.start + (&piece.right - &at_start) / -&piece.slope;
    out.push(Piece::continuous(piece.start.clone(), at_start.clone(), Rational::zero()));
    if reached < *end {
        out.push(Piece::continuous(reached, at_start, piece.slope.clone()));
    }
    leaving
}

/// Pushes the future supremum over `piece` (ending at `end`), last part first, given the
/// supremum `ahead` over `[end, infinity)`. Returns the value at the piece's start.
fn push_supremum_reversed(piece: &Piece, end: &Rational, ahead: &Rational, out: &mut Vec<Piece>) -> Rational {
    if !piece.slope.is_negative() {
        let level = max(&piece.line_at(end), ahead);
        out.push(Piece::continuous(piece.start.clone(), level.clone(), Rational::zero()));
        return level;
    }

    if piece.right <= *ahead {
        out.push(Piece::continuous(piece.start.clone(), ahead.clone(), Rational::zero()));
        return ahead.clone();
    }

    // The falling line stays on top until it meets `ahead`.
    let reached = &piece.start + (&piece.right - ahead) / -&piece.slope;
    if reached < *end {
        out.push(Piece::continuous(reached, ahead.clone(), Rational::zero()));
    }
    out.push(Piece::continuous(piece.start.clone(), piece.right.clone(), piece.slope.clone()));
    piece.right.clone()
}
