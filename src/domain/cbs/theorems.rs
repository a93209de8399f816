use crate::domain::cbs::avb_class::ShapedClass;
use crate::domain::cbs::link::Link;
use crate::domain::cbs::shaper::ShaperConfiguration;
use crate::domain::curve::Curve;
use crate::domain::curve::rational::Rational;
use crate::error::{Error, Result};

// Closed-form CBS curves (Theorems 3 to 10 of the credit-based shaper analysis).
// Every function requires the class to be provisioned on the link.

/// Guaranteed long-term rate of a class: `idle * C / (idle - send)`.
pub fn class_rate(link: &Link, class: ShapedClass) -> Rational {
    let (idle, send) = (link.idle_slope(class), link.send_slope(class));
    idle * &link.link_speed / (idle - send)
}

/// Rate-latency minimal service curve (Theorems 3, 4, 7, 8).
pub fn minimal_service_curve(link: &Link, shaper: &ShaperConfiguration, class: ShapedClass, is_strict: bool) -> Result<Curve> {
    ensure_provisioned(link, class)?;

    let latency = if is_strict { blocking_latency(link, shaper, class) + credit_latency(link, shaper, class) } else { blocking_latency(link, shaper, class) };

    Ok(Curve::rate_latency(class_rate(link, class), latency))
}

/// Sigma-rho shaper curve bounding the class output (Theorems 5, 9).
pub fn shaper_curve(link: &Link, shaper: &ShaperConfiguration, class: ShapedClass) -> Result<Curve> {
    ensure_provisioned(link, class)?;

    let rate = class_rate(link, class);
    let burst = &rate * (blocking_latency(link, shaper, class) + credit_latency(link, shaper, class));

    Ok(Curve::affine(burst, rate))
}

/// Sigma-rho maximal service curve (Theorems 6, 10).
pub fn maximal_service_curve(link: &Link, shaper: &ShaperConfiguration, class: ShapedClass) -> Result<Curve> {
    ensure_provisioned(link, class)?;

    let rate = class_rate(link, class);
    let burst = &rate * credit_latency(link, shaper, class);

    Ok(Curve::affine(burst, rate))
}

/// Time the class may wait behind frames of other classes.
///
/// A: `M_N / C`; B: `(M_NSR + M_A) / C - M_N * idle_A / (C * send_A)`.
fn blocking_latency(link: &Link, shaper: &ShaperConfiguration, class: ShapedClass) -> Rational {
    let speed = &link.link_speed;

    match class {
        ShapedClass::A => shaper.max_frame_size_n() / speed,
        ShapedClass::B => {
            let idle_a = link.idle_slope(ShapedClass::A);
            let send_a = link.send_slope(ShapedClass::A);
            (shaper.max_frame_size_nsr() + shaper.max_frame_size_a()) / speed - shaper.max_frame_size_n() * idle_a / (speed * send_a)
        }
    }
}

/// Time needed to recover the credit spent on one maximal frame of the class itself:
/// `-M_X * send_X / (idle_X * C)`, positive since the send slope is negative.
fn credit_latency(link: &Link, shaper: &ShaperConfiguration, class: ShapedClass) -> Rational {
    let (idle, send) = (link.idle_slope(class), link.send_slope(class));
    -(shaper.max_frame_size(class) * send / (idle * &link.link_speed))
}

fn ensure_provisioned(link: &Link, class: ShapedClass) -> Result<()> {
    if link.is_provisioned(class) {
        Ok(())
    } else {
        Err(Error::ClassNotProvisioned { link: link.name.clone(), class })
    }
}
