use num::{Signed, Zero};

use crate::api::network_dto::LinkDto;
use crate::domain::cbs::avb_class::ShapedClass;
use crate::domain::curve::rational::Rational;
use crate::domain::utils::id::{LinkName, NodeName};
use crate::error::{Error, TopologyError};

/// Directed edge of the network with its per-class shaper slopes (bit/s).
///
/// A class whose slopes are both zero is not provisioned on the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub name: LinkName,
    pub node_from: NodeName,
    pub node_to: NodeName,
    pub link_speed: Rational,
    idle_slope_a: Rational,
    send_slope_a: Rational,
    idle_slope_b: Rational,
    send_slope_b: Rational,
}

impl Link {
    pub fn new(name: impl Into<LinkName>, node_from: impl Into<NodeName>, node_to: impl Into<NodeName>, link_speed: Rational) -> Self {
        Self {
            name: name.into(),
            node_from: node_from.into(),
            node_to: node_to.into(),
            link_speed,
            idle_slope_a: Rational::zero(),
            send_slope_a: Rational::zero(),
            idle_slope_b: Rational::zero(),
            send_slope_b: Rational::zero(),
        }
    }

    pub fn with_class_a(mut self, idle_slope: Rational, send_slope: Rational) -> Self {
        self.idle_slope_a = idle_slope;
        self.send_slope_a = send_slope;
        self
    }

    pub fn with_class_b(mut self, idle_slope: Rational, send_slope: Rational) -> Self {
        self.idle_slope_b = idle_slope;
        self.send_slope_b = send_slope;
        self
    }

    pub fn idle_slope(&self, class: ShapedClass) -> &Rational {
        match class {
            ShapedClass::A => &self.idle_slope_a,
            ShapedClass::B => &self.idle_slope_b,
        }
    }

    pub fn send_slope(&self, class: ShapedClass) -> &Rational {
        match class {
            ShapedClass::A => &self.send_slope_a,
            ShapedClass::B => &self.send_slope_b,
        }
    }

    pub fn is_provisioned(&self, class: ShapedClass) -> bool {
        !self.idle_slope(class).is_zero()
    }

    /// Checks link speed and slopes.
    ///
    /// # Returns
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if !self.link_speed.is_positive() {
            return Err(TopologyError::InvalidLinkSpeed { link: self.name.clone(), speed: self.link_speed.clone() });
        }

        for class in ShapedClass::ALL {
            let (idle, send) = (self.idle_slope(class), self.send_slope(class));
            let is_unprovisioned = idle.is_zero() && send.is_zero();
            let is_valid = idle.is_positive() && send.is_negative();

            if !is_unprovisioned && !is_valid {
                return Err(TopologyError::InvalidSlopes { link: self.name.clone(), class, idle: idle.clone(), send: send.clone() });
            }
        }

        // The class B theorems divide by the class A slopes.
        if self.is_provisioned(ShapedClass::B) && !self.is_provisioned(ShapedClass::A) {
            return Err(TopologyError::ClassBWithoutClassA(self.name.clone()));
        }

        Ok(())
    }
}

impl TryFrom<LinkDto> for Link {
    type Error = Error;

    fn try_from(dto: LinkDto) -> Result<Self, Self::Error> {
        let link_speed = dto.link_speed.to_rational("linkSpeed")?;

        Ok(Link::new(dto.name, dto.node_from, dto.node_to, link_speed)
            .with_class_a(dto.idle_slope_a.to_rational("idleSlopeA")?, dto.send_slope_a.to_rational("sendSlopeA")?)
            .with_class_b(dto.idle_slope_b.to_rational("idleSlopeB")?, dto.send_slope_b.to_rational("sendSlopeB")?))
    }
}
