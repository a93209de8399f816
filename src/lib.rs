use std::path::Path;

use crate::api::network_dto::NetworkDto;
use crate::domain::cbs::network::Network;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Reads a network description from a JSON file and builds the validated network.
pub fn load_network(file_path: impl AsRef<Path>) -> Result<Network> {
    let file_path = file_path.as_ref();
    log::info!("Loading network from '{}'.", file_path.display());

    let root_dto: NetworkDto = parse_json_file::<NetworkDto>(file_path)?;
    log::info!("JSON file parsed successfully.");

    let network = Network::from_dto(root_dto)?;
    log::info!("Network constructed successfully.");

    Ok(network)
}
