use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// Traffic class of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AvbClass {
    A,
    B,
    /// Not stream reserved: best-effort traffic the shaper does not manage.
    Nsr,
}

/// The classes the credit-based shaper actually shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ShapedClass {
    A,
    B,
}

impl ShapedClass {
    pub const ALL: [ShapedClass; 2] = [ShapedClass::A, ShapedClass::B];
}

impl From<ShapedClass> for AvbClass {
    fn from(class: ShapedClass) -> Self {
        match class {
            ShapedClass::A => AvbClass::A,
            ShapedClass::B => AvbClass::B,
        }
    }
}

impl TryFrom<AvbClass> for ShapedClass {
    type Error = Error;

    fn try_from(class: AvbClass) -> Result<Self, Self::Error> {
        match class {
            AvbClass::A => Ok(ShapedClass::A),
            AvbClass::B => Ok(ShapedClass::B),
            AvbClass::Nsr => Err(Error::InvalidClass(class)),
        }
    }
}

impl FromStr for AvbClass {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "A" => Ok(AvbClass::A),
            "B" => Ok(AvbClass::B),
            "NSR" => Ok(AvbClass::Nsr),
            _ => Err(Error::ModelConstructionError(format!("Unknown AVB class '{}', expected one of A, B, NSR", value))),
        }
    }
}

impl fmt::Display for AvbClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvbClass::A => write!(f, "A"),
            AvbClass::B => write!(f, "B"),
            AvbClass::Nsr => write!(f, "NSR"),
        }
    }
}

impl fmt::Display for ShapedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        AvbClass::from(*self).fmt(f)
    }
}
