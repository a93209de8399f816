use num::{Signed, Zero};

use crate::domain::curve::envelope::{Bound, Envelope};
use crate::domain::curve::piece::{Element, elements};
use crate::domain::curve::rational::{Rational, max};
use crate::domain::curve::{Curve, joint_period, trailing_period};

impl Curve {
    /// Min-plus convolution `(f ⊗ g)(t) = inf_{0 <= s <= t} f(s) + g(t - s)`.
    pub fn convolution(&self, other: &Curve) -> Curve {
        if let Some(convolution) = self.convolution_shortcut(other).or_else(|| other.convolution_shortcut(self)) {
            return convolution;
        }

        let (own_rate, other_rate) = (self.rate(), other.rate());

        let (transient, period, increment) = if own_rate == other_rate {
            let period = joint_period(self, other);
            let transient = &self.transient + &other.transient + &period;
            let increment = &own_rate * &period;
            (transient, period, increment)
        } else {
            let (low, high) = if own_rate < other_rate { (self, other) } else { (other, self) };
            let (low_inf, low_sup) = low.own_rate_offsets();
            let (high_inf, _) = high.own_rate_offsets();

            // Past this much time spent in the faster curve, no split beats putting everything in the slower one.
            let split_bound = (low_sup - low_inf + high.value_at(&Rational::zero()) - high_inf) / (high.rate() - low.rate());
            let transient = &low.transient + max(&Rational::zero(), &split_bound);
            let (period, increment) = trailing_period(low, high);
            (transient, period, increment)
        };

        let horizon = &transient + &period;
        let own = elements(&self.pieces_until(&horizon), &horizon);
        let others = elements(&other.pieces_until(&horizon), &horizon);

        let mut envelope = Envelope::new(Bound::Lower, horizon.clone());
        for a in &own {
            for b in &others {
                if a.start() + b.start() >= horizon {
                    continue;
                }
                for element in convolve_elements(a, b) {
                    envelope.insert(element);
                }
            }
        }

        let pieces = envelope.into_pieces().expect("the origin point of each operand covers the other operand's range");
        Curve::from_pieces(pieces, transient, period, increment)
    }

    /// Min-plus deconvolution `(f ⊘ g)(t) = sup_{u >= 0} f(t + u) - g(u)`.
    ///
    /// # Returns
    /// Returns `None` if `f` grows faster than `g`, in which case the supremum is unbounded.
    pub fn deconvolution(&self, other: &Curve) -> Option<Curve> {
        let (own_rate, other_rate) = (self.rate(), other.rate());
        if own_rate > other_rate {
            return None;
        }

        if let Some((rate, latency)) = other.as_rate_latency() {
            if self.is_non_decreasing() {
                return Some(self.deconvolution_by_rate_latency(&rate, &latency));
            }
        }

        let lookahead = if own_rate < other_rate {
            let (own_inf, own_sup) = self.own_rate_offsets();
            let (other_inf, _) = other.own_rate_offsets();
            let bound = (own_sup - own_inf + other.value_at(&Rational::zero()) - other_inf) / (&other_rate - &own_rate);
            max(&Rational::zero(), &bound)
        } else {
            // Equal rates: beyond both transients the difference repeats every joint period.
            max(&self.transient, &other.transient) + joint_period(self, other)
        };

        let transient = self.transient.clone();
        let period = self.period.clone();
        let increment = self.increment.clone();

        // Offsets `u >= lookahead` never beat `u = 0`, so `other` is only needed on `[0, lookahead)`.
        let horizon = &transient + &period;
        let other_horizon = if lookahead.is_positive() { lookahead } else { other.end_of(0) };
        let own_horizon = &horizon + &other_horizon;

        let own = elements(&self.pieces_until(&own_horizon), &own_horizon);
        let others = elements(&other.pieces_until(&other_horizon), &other_horizon);

        let mut envelope = Envelope::new(Bound::Upper, horizon);
        for a in &own {
            for b in &others {
                for element in deconvolve_elements(a, b) {
                    envelope.insert(element);
                }
            }
        }

        let pieces = envelope.into_pieces()?;
        Some(Curve::from_pieces(pieces, transient, period, increment))
    }

    /// Linear-time convolution with a sigma-rho `other` that is at least as fast.
    fn convolution_shortcut(&self, other: &Curve) -> Option<Curve> {
        let (burst, rate) = other.as_affine()?;
        if burst.is_negative() || rate < self.rate() {
            return None;
        }
        Some(self.convolution_with_affine(&burst, &rate))
    }
}

fn convolve_elements(a: &Element, b: &Element) -> Vec<Element> {
    match (a, b) {
        (Element::Point { time: t1, value: v1 }, Element::Point { time: t2, value: v2 }) => {
            vec![Element::Point { time: t1 + t2, value: v1 + v2 }]
        }
        (Element::Point { time, value }, Element::Open { start, end, right, slope }) | (Element::Open { start, end, right, slope }, Element::Point { time, value }) => {
            vec![Element::Open { start: start + time, end: end + time, right: right + value, slope: slope.clone() }]
        }
        (Element::Open { start: a1, end: b1, right: r1, slope: s1 }, Element::Open { start: a2, end: b2, right: r2, slope: s2 }) => {
            let start = a1 + a2;
            let end = b1 + b2;
            let right = r1 + r2;

            if s1 == s2 {
                return vec![Element::Open { start, end, right, slope: s1.clone() }];
            }

            // The infimum spends time in the flatter segment first.
            let (flat_length, flat_slope, steep_slope) = if s1 < s2 { (b1 - a1, s1, s2) } else { (b2 - a2, s2, s1) };
            let junction = &start + &flat_length;
            let junction_value = &right + flat_slope * &flat_length;

            vec![
                Element::Open { start, end: junction.clone(), right, slope: flat_slope.clone() },
                Element::Point { time: junction.clone(), value: junction_value.clone() },
                Element::Open { start: junction, end, right: junction_value, slope: steep_slope.clone() },
            ]
        }
    }
}

fn deconvolve_elements(a: &Element, b: &Element) -> Vec<Element> {
    match (a, b) {
        (Element::Point { time: tf, value: vf }, Element::Point { time: tg, value: vg }) => {
            vec![Element::Point { time: tf - tg, value: vf - vg }]
        }
        (Element::Point { time, value }, Element::Open { start, end, right, slope }) => {
            let length = end - start;
            vec![Element::Open { start: time - end, end: time - start, right: value - right - slope * length, slope: slope.clone() }]
        }
        (Element::Open { start, end, right, slope }, Element::Point { time, value }) => {
            vec![Element::Open { start: start - time, end: end - time, right: right - value, slope: slope.clone() }]
        }
        (Element::Open { start: a1, end: b1, right: r1, slope: s1 }, Element::Open { start: a2, end: b2, right: r2, slope: s2 }) => {
            let own_length = b1 - a1;
            let other_length = b2 - a2;

            let start = a1 - b2;
            let end = b1 - a2;
            let right = r1 - r2 - s2 * &other_length;

            if s1 == s2 {
                return vec![Element::Open { start, end, right, slope: s1.clone() }];
            }

            // The supremum moves along the steeper of the two directions first.
            let (steep_length, steep_slope, flat_slope) = if s1 > s2 { (own_length, s1, s2) } else { (other_length, s2, s1) };
            let junction = &start + &steep_length;
            let junction_value = &right + steep_slope * &steep_length;

            vec![
                Element::Open { start, end: junction.clone(), right, slope: steep_slope.clone() },
                Element::Point { time: junction.clone(), value: junction_value.clone() },
                Element::Open { start: junction, end, right: junction_value, slope: flat_slope.clone() },
            ]
        }
    }
}

