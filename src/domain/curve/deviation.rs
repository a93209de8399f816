use num::{Signed, Zero};

use crate::domain::curve::{Curve, joint_period};
use crate::domain::curve::rational::{Rational, integer, max};

impl Curve {
    /// Largest horizontal distance from `self` to `other`:
    /// `sup_{t >= 0} inf { d >= 0 : self(t) <= other(t + d) }`.
    ///
    /// `other` must be non-decreasing (a service curve).
    ///
    /// # Returns
    /// Returns `None` if the distance is unbounded, i.e. `self` grows faster than `other`
    /// or eventually exceeds every value `other` ever reaches.
    pub fn horizontal_deviation(&self, other: &Curve) -> Option<Rational> {
        let (own_rate, other_rate) = (self.rate(), other.rate());
        if own_rate > other_rate {
            return None;
        }

        let horizon = if own_rate < other_rate {
            match self.settling_time(other) {
                // Past it each period only shortens the distance.
                Some(settled) => max(&self.transient, &settled) + &self.period + &self.period,
                None => {
                    let (_, own_sup) = self.own_rate_offsets();
                    let (other_inf, _) = other.own_rate_offsets();
                    // From here on `other` lies above `self`.
                    let overtaken = (own_sup - other_inf) / (&other_rate - &own_rate);
                    max(&self.transient, &overtaken) + &self.period
                }
            }
        } else if other_rate.is_zero() {
            &self.transient + &self.period
        } else {
            let (own_inf, _) = self.own_rate_offsets();
            let (_, other_transient_sup) = other.value_range(0);
            let settled = (other_transient_sup - own_inf) / &own_rate;
            let period = joint_period(self, other);
            max(&self.transient, &settled) + &period + &period
        };

        let pieces = self.pieces_until(&horizon);
        let mut deviation = Rational::zero();

        for (index, piece) in pieces.iter().enumerate() {
            let end = pieces.get(index + 1).map(|next| next.start.clone()).unwrap_or_else(|| horizon.clone());

            let mut candidates = vec![other.lower_pseudo_inverse(&piece.value)? - &piece.start];

            if piece.slope.is_positive() {
                let end_value = piece.line_at(&end);
                candidates.push(other.upper_pseudo_inverse(&piece.right)? - &piece.start);
                candidates.push(other.lower_pseudo_inverse(&end_value)? - &end);

                for y in other.breakpoint_values_between(&piece.right, &end_value) {
                    let t = &piece.start + (&y - &piece.right) / &piece.slope;
                    candidates.push(other.upper_pseudo_inverse(&y)? - t);
                }
            } else {
                // Flat or falling: the supremum sits right after the start.
                candidates.push(other.lower_pseudo_inverse(&piece.right)? - &piece.start);
            }

            for candidate in candidates {
                if candidate > deviation {
                    deviation = candidate;
                }
            }
        }

        Some(deviation)
    }

    /// Time after which a non-decreasing `self` only takes values that `other` reaches on
    /// its affine tail, so that the distance between them repeats period over period.
    fn settling_time(&self, other: &Curve) -> Option<Rational> {
        if !other.is_ultimately_affine() || !other.rate().is_positive() || !self.is_non_decreasing() {
            return None;
        }
        self.upper_pseudo_inverse(&other.value_at(&other.transient))
    }

    /// Largest vertical distance `sup_{t >= 0} self(t) - other(t)`.
    ///
    /// # Returns
    /// Returns `None` if `self` grows faster than `other`.
    pub fn vertical_deviation(&self, other: &Curve) -> Option<Rational> {
        let difference = self.add(&other.scale(&integer(-1)));
        if difference.rate().is_positive() {
            return None;
        }

        let (_, sup) = difference.value_range(0);
        Some(sup)
    }

    /// `inf { x >= 0 : f(x) >= y }`, `None` if `f` never reaches `y`.
    pub fn lower_pseudo_inverse(&self, y: &Rational) -> Option<Rational> {
        self.pseudo_inverse(y, false)
    }

    /// `inf { x >= 0 : f(x) > y }`, `None` if `f` never exceeds `y`.
    pub fn upper_pseudo_inverse(&self, y: &Rational) -> Option<Rational> {
        self.pseudo_inverse(y, true)
    }

    fn pseudo_inverse(&self, y: &Rational, strict: bool) -> Option<Rational> {
        let reaches = |value: &Rational| if strict { value > y } else { value >= y };
        let last = self.pieces.len() - 1;
        let open_ended = self.is_ultimately_affine();

        let scan = |periods: &Rational, from: usize| -> Option<Rational> {
            let dt = periods * &self.period;
            let dv = periods * &self.increment;

            for index in from..self.pieces.len() {
                let piece = &self.pieces[index];
                let start = &piece.start + &dt;

                if reaches(&(&piece.value + &dv)) || reaches(&(&piece.right + &dv)) {
                    return Some(start);
                }

                if piece.slope.is_positive() {
                    let crossing = &start + (y - &piece.right - &dv) / &piece.slope;
                    // An affine tail keeps rising past the described range.
                    if (open_ended && index == last) || crossing < self.end_of(index) + &dt {
                        return Some(crossing);
                    }
                }
            }
            None
        };

        if let Some(x) = scan(&Rational::zero(), 0) {
            return Some(x);
        }
        if !self.increment.is_positive() {
            return None;
        }

        let from = self.period_start_index();
        let (_, periodic_sup) = self.value_range(from);
        let mut periods = max(&integer(1), &((y - periodic_sup) / &self.increment).ceil());

        loop {
            if let Some(x) = scan(&periods, from) {
                return Some(x);
            }
            periods += integer(1);
        }
    }

    /// Values taken by the curve at its breakpoints (point values and one-sided limits)
    /// that lie strictly between `low` and `high`.
    pub fn breakpoint_values_between(&self, low: &Rational, high: &Rational) -> Vec<Rational> {
        let base: Vec<Rational> = self.breakpoint_values(0);
        let mut values: Vec<Rational> = base.into_iter().filter(|value| value > low && value < high).collect();

        if self.increment.is_positive() && !self.is_ultimately_affine() {
            let from = self.period_start_index();
            let periodic = self.breakpoint_values(from);
            let (periodic_inf, periodic_sup) = self.value_range(from);

            let first = max(&integer(1), &((low - &periodic_sup) / &self.increment).floor());
            let last = ((high - &periodic_inf) / &self.increment).ceil();

            let mut periods = first;
            while periods <= last {
                let dv = &periods * &self.increment;
                values.extend(periodic.iter().map(|value| value + &dv).filter(|value| value > low && value < high));
                periods += integer(1);
            }
        }

        values.sort();
        values.dedup();
        values
    }

    fn breakpoint_values(&self, from: usize) -> Vec<Rational> {
        let mut values = Vec::new();
        for index in from..self.pieces.len() {
            let piece = &self.pieces[index];
            values.push(piece.value.clone());
            values.push(piece.right.clone());
            values.push(piece.line_at(&self.end_of(index)));
        }
        values
    }

    /// Infimum and supremum of the curve over the described range, starting at piece `from`.
    fn value_range(&self, from: usize) -> (Rational, Rational) {
        let values = self.breakpoint_values(from);
        let inf = values.iter().min().cloned().unwrap_or_else(Rational::zero);
        let sup = values.iter().max().cloned().unwrap_or_else(Rational::zero);
        (inf, sup)
    }
}
