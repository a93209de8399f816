use num::Signed;

use crate::api::network_dto::FlowDto;
use crate::domain::cbs::avb_class::AvbClass;
use crate::domain::curve::Curve;
use crate::domain::curve::rational::{Rational, integer};
use crate::domain::utils::id::{FlowName, LinkName};
use crate::error::{Error, TopologyError};

/// Immutable description of a stream: its route, class and traffic contract.
///
/// The contract allows at most `max_interval_frame` frames of at most `max_frame_size` bytes
/// in every `class_measurement_interval` seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    pub name: FlowName,
    pub path: Vec<LinkName>,
    pub class: AvbClass,
    pub is_periodic: bool,
    pub is_worst_case: bool,
    pub max_frame_size: u64,
    pub class_measurement_interval: Rational,
    pub max_interval_frame: u64,

    /// Whether the report lists the end-to-end delay of this flow.
    pub is_flow_of_interest: bool,
}

impl Flow {
    /// A periodic, non worst-case flow of interest.
    pub fn new(
        name: impl Into<FlowName>,
        path: Vec<LinkName>,
        class: AvbClass,
        max_frame_size: u64,
        class_measurement_interval: Rational,
        max_interval_frame: u64,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            class,
            is_periodic: true,
            is_worst_case: false,
            max_frame_size,
            class_measurement_interval,
            max_interval_frame,
            is_flow_of_interest: true,
        }
    }

    pub fn periodic(mut self, is_periodic: bool) -> Self {
        self.is_periodic = is_periodic;
        self
    }

    pub fn worst_case(mut self, is_worst_case: bool) -> Self {
        self.is_worst_case = is_worst_case;
        self
    }

    pub fn of_interest(mut self, is_flow_of_interest: bool) -> Self {
        self.is_flow_of_interest = is_flow_of_interest;
        self
    }

    pub fn passes(&self, link: &LinkName) -> bool {
        self.path.contains(link)
    }

    pub fn starts_at(&self, link: &LinkName) -> bool {
        self.path.first() == Some(link)
    }

    /// Bits the flow may send per measurement interval: `frames * frame size * 8`.
    pub fn max_data_per_interval(&self) -> Rational {
        integer(self.max_interval_frame) * integer(self.max_frame_size) * integer(8)
    }

    /// Long-term rate in bit/s.
    pub fn rate(&self) -> Rational {
        self.max_data_per_interval() / &self.class_measurement_interval
    }

    /// Arrival curve of the flow where it enters the network, given the speed of its first link.
    pub fn source_arrival_curve(&self, link_speed: &Rational) -> Curve {
        let m = self.max_data_per_interval();
        let line_rate = Curve::affine(integer(0), link_speed.clone());

        match (self.is_periodic, self.is_worst_case) {
            (true, false) => {
                let r = self.rate();
                let b = &m * (integer(1) - &r / link_speed);
                Curve::affine(b, r).minimum(&line_rate)
            }
            (true, true) => Curve::stair(m, self.class_measurement_interval.clone()).convolution(&line_rate),
            (false, false) => {
                let r = self.rate();
                let b = &m * (integer(1) - &r / link_speed);
                Curve::affine(integer(2) * b, r).minimum(&line_rate)
            }
            (false, true) => {
                let frames = Curve::stair(integer(1), self.class_measurement_interval.clone()).add(&Curve::constant(integer(1))).with_zero_origin();
                frames.scale(&m).convolution(&line_rate)
            }
        }
    }

    /// Checks the traffic contract on its own; routing is checked by the network builder.
    pub(crate) fn validate(&self) -> Result<(), TopologyError> {
        let invalid = |reason: &str| TopologyError::InvalidFlow { flow: self.name.clone(), reason: reason.to_string() };

        if !self.class_measurement_interval.is_positive() {
            return Err(invalid("class measurement interval must be positive"));
        }
        if self.max_interval_frame == 0 {
            return Err(invalid("max interval frame must be positive"));
        }

        Ok(())
    }
}

impl TryFrom<FlowDto> for Flow {
    type Error = Error;

    fn try_from(dto: FlowDto) -> Result<Self, Self::Error> {
        let class = dto.avb_class.parse::<AvbClass>()?;
        let interval = dto.class_measurement_interval.to_rational("classMeasurementInterval")?;
        let path = dto.path.into_iter().map(LinkName::new).collect();

        Ok(Flow::new(dto.name, path, class, dto.max_frame_size, interval, dto.max_interval_frame)
            .periodic(dto.is_periodic)
            .worst_case(dto.is_worst_case)
            .of_interest(dto.is_flow_of_interest))
    }
}
