use num::integer::Integer;
use num::{BigInt, BigRational};

/// Exact rational number used for every time, data and rate value of the analysis.
pub type Rational = BigRational;

/// Builds the rational `numerator / denominator`.
///
/// # Panics
/// Panics if `denominator` is zero.
pub fn rational(numerator: i64, denominator: i64) -> Rational {
    Rational::new(BigInt::from(numerator), BigInt::from(denominator))
}

/// Lifts an integer into a rational.
pub fn integer(value: impl Into<BigInt>) -> Rational {
    Rational::from_integer(value.into())
}

/// Least common multiple of two positive rationals: the smallest rational that is an
/// integer multiple of both.
pub fn lcm(a: &Rational, b: &Rational) -> Rational {
    let numer = a.numer().lcm(b.numer());
    let denom = a.denom().gcd(b.denom());
    Rational::new(numer, denom)
}

pub fn max(a: &Rational, b: &Rational) -> Rational {
    if a >= b { a.clone() } else { b.clone() }
}

pub fn min(a: &Rational, b: &Rational) -> Rational {
    if a <= b { a.clone() } else { b.clone() }
}
