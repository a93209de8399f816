pub mod cbs;
pub mod curve;
pub mod utils;
