use std::io::Write;

use cbs_bounds::domain::cbs::avb_class::{AvbClass, ShapedClass};
use cbs_bounds::domain::curve::rational::{integer, rational};
use cbs_bounds::domain::utils::id::{FlowName, LinkName};
use cbs_bounds::error::{Error, TopologyError};
use cbs_bounds::load_network;
use tempfile::NamedTempFile;

fn write_json(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Temp file can be created");
    file.write_all(contents.as_bytes()).expect("Temp file can be written");
    file
}

fn load(file: &NamedTempFile) -> Result<cbs_bounds::domain::cbs::network::Network, Error> {
    load_network(file.path())
}

const MINIMAL_NETWORK: &str = r#"{
    "links": [
        { "name": "L1", "nodeFrom": "X", "nodeTo": "Y", "linkSpeed": 100000000,
          "idleSlopeA": 50000000, "sendSlopeA": -50000000,
          "idleSlopeB": "25000000", "sendSlopeB": "-75000000" },
        { "name": "L2", "nodeFrom": "Y", "nodeTo": "Z", "linkSpeed": "1e8" }
    ],
    "flows": [
        { "name": "F1", "path": ["L1"], "avbClass": "b", "maxFrameSize": 256,
          "classMeasurementInterval": "1/4000", "maxIntervalFrame": 1,
          "isPeriodic": false, "isFlowOfInterest": false }
    ]
}"#;

#[test]
fn test_load_bundled_case_study() {
    let path = format!("{}/data/case_study.json", env!("CARGO_MANIFEST_DIR"));
    let network = load_network(&path).expect("Bundled case study loads");

    assert_eq!(network.num_of_links(), 4);
    assert_eq!(network.num_of_flows(), 20);
    assert!(!network.shaper().is_strict);
}

#[test]
fn test_defaults_and_fractions() {
    let json = MINIMAL_NETWORK.replace(r#""1e8""#, "100000000");
    let file = write_json(&json);
    let network = load(&file).expect("Minimal network loads");

    assert_eq!(*network.shaper().max_frame_size_a(), integer(64 * 8), "Shaper section defaults when omitted");

    let l1 = network.link(network.link_key(&LinkName::new("L1")).unwrap());
    assert_eq!(*l1.send_slope(ShapedClass::B), integer(-75_000_000), "Slopes may be given as strings");

    let l2 = network.link(network.link_key(&LinkName::new("L2")).unwrap());
    assert!(!l2.is_provisioned(ShapedClass::A), "Omitted slopes leave the class unprovisioned");

    let flow = network.flow(network.flow_key(&FlowName::new("F1")).unwrap());
    assert_eq!(flow.class, AvbClass::B, "Class names are case-insensitive");
    assert_eq!(flow.class_measurement_interval, rational(1, 4000));
    assert!(!flow.is_periodic);
    assert!(!flow.is_worst_case);
    assert!(!flow.is_flow_of_interest);
}

#[test]
fn test_unparseable_rational_is_rejected() {
    let file = write_json(MINIMAL_NETWORK);
    assert!(matches!(load(&file), Err(Error::ModelConstructionError(_))), "1e8 is not an integer or fraction");
}

#[test]
fn test_unknown_class_is_rejected() {
    let json = MINIMAL_NETWORK.replace(r#""1e8""#, "100000000").replace(r#""avbClass": "b""#, r#""avbClass": "C""#);
    let file = write_json(&json);

    assert!(matches!(load(&file), Err(Error::ModelConstructionError(_))));
}

#[test]
fn test_invalid_topology_is_reported() {
    let json = MINIMAL_NETWORK.replace(r#""1e8""#, "100000000").replace(r#""path": ["L1"]"#, r#""path": ["L2", "L1"]"#);
    let file = write_json(&json);

    match load(&file) {
        Err(Error::Topology(TopologyError::UnprovisionedClass { link, .. })) => assert_eq!(link, LinkName::new("L2")),
        other => panic!("Expected an unprovisioned class error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_malformed_json_is_rejected() {
    let file = write_json(r#"{ "links": [ { "name": "L1" "#);
    assert!(matches!(load(&file), Err(Error::DeserializationError(_))));

    let file = write_json(r#"{ "links": [], "flows": [ { "name": "F" } ] }"#);
    assert!(matches!(load(&file), Err(Error::DeserializationError(_))), "Missing required fields are rejected");
}

#[test]
fn test_missing_file_is_rejected() {
    let result = load_network("this/file/does/not/exist.json");
    assert!(matches!(result, Err(Error::IoError(_))));
}
