use cbs_bounds::domain::cbs::avb_class::{AvbClass, ShapedClass};
use cbs_bounds::domain::cbs::flow::Flow;
use cbs_bounds::domain::cbs::link::Link;
use cbs_bounds::domain::cbs::network::{Network, NetworkBuilder};
use cbs_bounds::domain::cbs::shaper::ShaperConfiguration;
use cbs_bounds::domain::curve::rational::{integer, rational};
use cbs_bounds::domain::utils::id::{FlowName, LinkName};
use cbs_bounds::error::{Error, TopologyError};

// =========================================================================
// Helpers
// =========================================================================

fn create_link(name: &str, from: &str, to: &str) -> Link {
    Link::new(name, from, to, integer(100_000_000)).with_class_a(integer(75_000_000), integer(-25_000_000))
}

fn create_flow(name: &str, path: &[&str]) -> Flow {
    Flow::new(name, path.iter().map(|link| LinkName::new(*link)).collect(), AvbClass::A, 64, rational(1, 100), 10)
}

fn build(links: Vec<Link>, flows: Vec<Flow>) -> Result<Network, Error> {
    let mut builder = NetworkBuilder::new(ShaperConfiguration::default());
    for link in links {
        builder.add_link(link);
    }
    for flow in flows {
        builder.add_flow(flow);
    }
    builder.build()
}

fn expect_topology_error(result: Result<Network, Error>) -> TopologyError {
    match result {
        Err(Error::Topology(error)) => error,
        Err(other) => panic!("Expected a topology error, got {:?}", other),
        Ok(_) => panic!("Expected a topology error, but the network was built"),
    }
}

/// FC-FS -> FS-BS -> BS-RU and HU-BS -> BS-RU, with two flows merging at BS-RU.
fn create_case_study() -> Network {
    let links = vec![create_link("FC-FS", "FC", "FS"), create_link("FS-BS", "FS", "BS"), create_link("HU-BS", "HU", "BS"), create_link("BS-RU", "BS", "RU")];
    let flows = vec![
        create_flow("FC-RU-1", &["FC-FS", "FS-BS", "BS-RU"]),
        create_flow("FC-RU-2", &["FC-FS", "FS-BS", "BS-RU"]),
        create_flow("HU-RU-1", &["HU-BS", "BS-RU"]),
        create_flow("HU-RU-2", &["HU-BS", "BS-RU"]),
    ];

    build(links, flows).expect("Case study topology is valid")
}

// =========================================================================
// Valid networks
// =========================================================================

#[test]
fn test_case_study_structure() {
    let network = create_case_study();

    assert_eq!(network.num_of_links(), 4);
    assert_eq!(network.num_of_flows(), 4);

    let bs_ru = network.link_key(&LinkName::new("BS-RU")).unwrap();
    let predecessors: Vec<_> = network.predecessors(bs_ru).iter().map(|key| network.link(*key).name.clone()).collect();
    assert_eq!(predecessors, vec![LinkName::new("FS-BS"), LinkName::new("HU-BS")], "Each predecessor is listed once, in order of appearance");

    assert_eq!(network.flows_through(bs_ru).len(), 4);
    assert_eq!(network.flows_starting_at(bs_ru).count(), 0);

    let fc_fs = network.link_key(&LinkName::new("FC-FS")).unwrap();
    assert!(network.predecessors(fc_fs).is_empty());
    assert_eq!(network.flows_starting_at(fc_fs).count(), 2);
}

#[test]
fn test_route_follows_the_path() {
    let network = create_case_study();
    let flow = network.flow_key(&FlowName::new("HU-RU-1")).unwrap();

    let route: Vec<_> = network.route(flow).iter().map(|key| network.link(*key).name.to_string()).collect();
    assert_eq!(route, vec!["HU-BS", "BS-RU"]);
    assert!(network.flow(flow).passes(&LinkName::new("BS-RU")));
    assert!(network.flow(flow).starts_at(&LinkName::new("HU-BS")));
}

#[test]
fn test_unknown_names_are_reported() {
    let network = create_case_study();

    assert!(matches!(network.link_key(&LinkName::new("XX-YY")), Err(Error::UnknownLink(_))));
    assert!(matches!(network.flow_key(&FlowName::new("nope")), Err(Error::UnknownFlow(_))));
}

#[test]
fn test_link_without_flows_is_allowed() {
    let network = build(vec![create_link("FC-FS", "FC", "FS"), create_link("SPARE", "X", "Y")], vec![create_flow("F", &["FC-FS"])]).unwrap();

    let spare = network.link_key(&LinkName::new("SPARE")).unwrap();
    assert!(network.flows_through(spare).is_empty());
    assert!(network.predecessors(spare).is_empty());
}

// =========================================================================
// Rejected networks
// =========================================================================

#[test]
fn test_duplicate_names_are_rejected() {
    let error = expect_topology_error(build(vec![create_link("L", "A", "B"), create_link("L", "B", "C")], vec![]));
    assert_eq!(error, TopologyError::DuplicateLink(LinkName::new("L")));

    let error = expect_topology_error(build(vec![create_link("L", "A", "B")], vec![create_flow("F", &["L"]), create_flow("F", &["L"])]));
    assert_eq!(error, TopologyError::DuplicateFlow(FlowName::new("F")));
}

#[test]
fn test_invalid_paths_are_rejected() {
    let links = || vec![create_link("L1", "A", "B"), create_link("L2", "B", "C"), create_link("L3", "X", "Y")];

    let error = expect_topology_error(build(links(), vec![create_flow("F", &[])]));
    assert_eq!(error, TopologyError::EmptyPath(FlowName::new("F")));

    let error = expect_topology_error(build(links(), vec![create_flow("F", &["L1", "MISSING"])]));
    assert_eq!(error, TopologyError::UnknownLink { flow: FlowName::new("F"), link: LinkName::new("MISSING") });

    let error = expect_topology_error(build(links(), vec![create_flow("F", &["L1", "L1"])]));
    assert_eq!(error, TopologyError::RepeatedLink { flow: FlowName::new("F"), link: LinkName::new("L1") });

    let error = expect_topology_error(build(links(), vec![create_flow("F", &["L1", "L3"])]));
    assert_eq!(error, TopologyError::NonContiguousPath { flow: FlowName::new("F"), from: LinkName::new("L1"), to: LinkName::new("L3") });
}

#[test]
fn test_cyclic_predecessors_are_rejected() {
    let links = vec![create_link("L1", "X", "Y"), create_link("L2", "Y", "X")];
    let flows = vec![create_flow("F1", &["L1", "L2"]), create_flow("F2", &["L2", "L1"])];

    let error = expect_topology_error(build(links, flows));
    assert_eq!(error, TopologyError::CyclicPredecessors(vec![LinkName::new("L1"), LinkName::new("L2")]));
}

#[test]
fn test_invalid_links_are_rejected() {
    let error = expect_topology_error(build(vec![Link::new("L", "A", "B", integer(0))], vec![]));
    assert!(matches!(error, TopologyError::InvalidLinkSpeed { .. }));

    let positive_send = Link::new("L", "A", "B", integer(100)).with_class_a(integer(60), integer(40));
    let error = expect_topology_error(build(vec![positive_send], vec![]));
    assert!(matches!(error, TopologyError::InvalidSlopes { class: ShapedClass::A, .. }));

    let half_provisioned = Link::new("L", "A", "B", integer(100)).with_class_a(integer(60), integer(-40)).with_class_b(integer(0), integer(-40));
    let error = expect_topology_error(build(vec![half_provisioned], vec![]));
    assert!(matches!(error, TopologyError::InvalidSlopes { class: ShapedClass::B, .. }));

    let only_b = Link::new("L", "A", "B", integer(100)).with_class_b(integer(60), integer(-40));
    let error = expect_topology_error(build(vec![only_b], vec![]));
    assert_eq!(error, TopologyError::ClassBWithoutClassA(LinkName::new("L")));
}

#[test]
fn test_unprovisioned_class_on_path_is_rejected() {
    let mut flow = create_flow("F", &["L"]);
    flow.class = AvbClass::B;

    let error = expect_topology_error(build(vec![create_link("L", "A", "B")], vec![flow]));
    assert_eq!(error, TopologyError::UnprovisionedClass { flow: FlowName::new("F"), link: LinkName::new("L"), class: ShapedClass::B });
}

#[test]
fn test_nsr_flows_need_no_provisioning() {
    let mut flow = create_flow("F", &["L"]);
    flow.class = AvbClass::Nsr;

    let network = build(vec![create_link("L", "A", "B")], vec![flow]);
    assert!(network.is_ok(), "NSR traffic is not shaped, so no slopes are required");
}

#[test]
fn test_invalid_traffic_contracts_are_rejected() {
    let mut no_interval = create_flow("F", &["L"]);
    no_interval.class_measurement_interval = integer(0);
    let error = expect_topology_error(build(vec![create_link("L", "A", "B")], vec![no_interval]));
    assert!(matches!(error, TopologyError::InvalidFlow { .. }));

    let mut no_frames = create_flow("F", &["L"]);
    no_frames.max_interval_frame = 0;
    let error = expect_topology_error(build(vec![create_link("L", "A", "B")], vec![no_frames]));
    assert!(matches!(error, TopologyError::InvalidFlow { .. }));

    // 1000 * 1500 B * 8 per 10 ms is 1.2 Gbit/s on a 100 Mbit/s link.
    let too_fast = Flow::new("F", vec![LinkName::new("L")], AvbClass::A, 1500, rational(1, 100), 1000);
    let error = expect_topology_error(build(vec![create_link("L", "A", "B")], vec![too_fast]));
    assert!(matches!(error, TopologyError::InvalidFlow { .. }));
}
