use std::str::FromStr;

use serde::Deserialize;

use crate::domain::curve::rational::{Rational, integer};
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDto {
    #[serde(default)]
    pub shaper: ShaperDto,
    pub links: Vec<LinkDto>,
    pub flows: Vec<FlowDto>,
}

/// Frame sizes in bytes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaperDto {
    #[serde(default = "default_max_frame_size_a")]
    pub max_frame_size_a: u64,
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size_b: u64,
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size_nsr: u64,
    #[serde(default)]
    pub is_strict: bool,
}

impl Default for ShaperDto {
    fn default() -> Self {
        Self { max_frame_size_a: default_max_frame_size_a(), max_frame_size_b: default_max_frame_size(), max_frame_size_nsr: default_max_frame_size(), is_strict: false }
    }
}

/// Speeds and slopes in bit/s. Omitted slopes leave the class unprovisioned.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDto {
    pub name: String,
    pub node_from: String,
    pub node_to: String,
    pub link_speed: RationalDto,
    #[serde(default)]
    pub idle_slope_a: RationalDto,
    #[serde(default)]
    pub send_slope_a: RationalDto,
    #[serde(default)]
    pub idle_slope_b: RationalDto,
    #[serde(default)]
    pub send_slope_b: RationalDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDto {
    pub name: String,
    pub path: Vec<String>,
    pub avb_class: String,
    #[serde(default = "default_true")]
    pub is_periodic: bool,
    #[serde(default)]
    pub is_worst_case: bool,
    pub max_frame_size: u64,
    pub class_measurement_interval: RationalDto,
    pub max_interval_frame: u64,
    #[serde(default = "default_true")]
    pub is_flow_of_interest: bool,
}

/// Either a JSON integer or a string holding an integer or a fraction such as `"1/100"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RationalDto {
    Integer(i64),
    Text(String),
}

impl Default for RationalDto {
    fn default() -> Self {
        RationalDto::Integer(0)
    }
}

impl RationalDto {
    pub fn to_rational(&self, field: &str) -> Result<Rational> {
        match self {
            RationalDto::Integer(value) => Ok(integer(*value)),
            RationalDto::Text(text) => Rational::from_str(text.trim())
                .map_err(|e| Error::ModelConstructionError(format!("Field '{}' holds '{}', which is not an integer or fraction: {}", field, text, e))),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_frame_size_a() -> u64 {
    64
}

fn default_max_frame_size() -> u64 {
    1522
}
