use crate::api::network_dto::ShaperDto;
use crate::domain::cbs::avb_class::ShapedClass;
use crate::domain::curve::rational::{Rational, integer, max};

/// Global credit-based shaper parameters shared by every link of a network.
///
/// Frame sizes are given in bytes and stored in bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaperConfiguration {
    max_frame_size_a: Rational,
    max_frame_size_b: Rational,
    max_frame_size_nsr: Rational,
    max_frame_size_n: Rational,
    pub is_strict: bool,
}

impl ShaperConfiguration {
    pub fn new(max_frame_size_a: u64, max_frame_size_b: u64, max_frame_size_nsr: u64, is_strict: bool) -> Self {
        let max_frame_size_a = integer(max_frame_size_a) * integer(8);
        let max_frame_size_b = integer(max_frame_size_b) * integer(8);
        let max_frame_size_nsr = integer(max_frame_size_nsr) * integer(8);
        let max_frame_size_n = max(&max_frame_size_b, &max_frame_size_nsr);

        Self { max_frame_size_a, max_frame_size_b, max_frame_size_nsr, max_frame_size_n, is_strict }
    }

    /// Largest class A frame, in bits.
    pub fn max_frame_size_a(&self) -> &Rational {
        &self.max_frame_size_a
    }

    pub fn max_frame_size_b(&self) -> &Rational {
        &self.max_frame_size_b
    }

    pub fn max_frame_size_nsr(&self) -> &Rational {
        &self.max_frame_size_nsr
    }

    /// Largest frame that can block class A: `max(M_B, M_NSR)`.
    pub fn max_frame_size_n(&self) -> &Rational {
        &self.max_frame_size_n
    }

    pub fn max_frame_size(&self, class: ShapedClass) -> &Rational {
        match class {
            ShapedClass::A => &self.max_frame_size_a,
            ShapedClass::B => &self.max_frame_size_b,
        }
    }
}

impl Default for ShaperConfiguration {
    fn default() -> Self {
        Self::new(64, 1522, 1522, false)
    }
}

impl From<ShaperDto> for ShaperConfiguration {
    fn from(dto: ShaperDto) -> Self {
        Self::new(dto.max_frame_size_a, dto.max_frame_size_b, dto.max_frame_size_nsr, dto.is_strict)
    }
}
