use thiserror::Error;

use crate::domain::cbs::avb_class::{AvbClass, ShapedClass};
use crate::domain::curve::Curve;
use crate::domain::curve::rational::Rational;
use crate::domain::utils::id::{FlowName, LinkName};

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse network JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to build internal domain model: {0}")]
    ModelConstructionError(String),

    #[error("Invalid network: {0}")]
    Topology(#[from] TopologyError),

    #[error("Class {0} is not shaped by the CBS and has no service, shaper or maximal service curve")]
    InvalidClass(AvbClass),

    #[error("Class {class} is not provisioned on link {link}")]
    ClassNotProvisioned { link: LinkName, class: ShapedClass },

    #[error("Delay of class {class} at link {link} is unbounded: the incoming arrival curve outgrows the minimal service curve")]
    InfiniteDelay { link: LinkName, class: ShapedClass, arrival_curve: Box<Curve>, service_curve: Box<Curve> },

    #[error("Backlog of class {class} at link {link} is unbounded: the incoming arrival curve outgrows the minimal service curve")]
    InfiniteBacklog { link: LinkName, class: ShapedClass },

    #[error("No link named {0}")]
    UnknownLink(LinkName),

    #[error("No flow named {0}")]
    UnknownFlow(FlowName),
}

/// Rejections raised while building a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("Link {0} is defined more than once")]
    DuplicateLink(LinkName),

    #[error("Flow {0} is defined more than once")]
    DuplicateFlow(FlowName),

    #[error("Flow {0} has an empty path")]
    EmptyPath(FlowName),

    #[error("Flow {flow} passes link {link} more than once")]
    RepeatedLink { flow: FlowName, link: LinkName },

    #[error("Flow {flow} references unknown link {link}")]
    UnknownLink { flow: FlowName, link: LinkName },

    #[error("Path of flow {flow} is not contiguous: link {from} does not end where link {to} starts")]
    NonContiguousPath { flow: FlowName, from: LinkName, to: LinkName },

    #[error("Flow paths form a cycle through links [{}]", .0.iter().map(|link| link.to_string()).collect::<Vec<_>>().join(", "))]
    CyclicPredecessors(Vec<LinkName>),

    #[error("Link {link} has invalid class {class} slopes (idle {idle}, send {send}): expected both zero or idle > 0 > send")]
    InvalidSlopes { link: LinkName, class: ShapedClass, idle: Rational, send: Rational },

    #[error("Link {0} provisions class B without class A slopes")]
    ClassBWithoutClassA(LinkName),

    #[error("Flow {flow} of class {class} passes link {link}, which does not provision that class")]
    UnprovisionedClass { flow: FlowName, link: LinkName, class: ShapedClass },

    #[error("Link {link} has non-positive speed {speed}")]
    InvalidLinkSpeed { link: LinkName, speed: Rational },

    #[error("Flow {flow} is invalid: {reason}")]
    InvalidFlow { flow: FlowName, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
