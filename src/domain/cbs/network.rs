use std::collections::{HashMap, HashSet, VecDeque};

use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::api::network_dto::NetworkDto;
use crate::domain::cbs::avb_class::ShapedClass;
use crate::domain::cbs::flow::Flow;
use crate::domain::cbs::link::Link;
use crate::domain::cbs::shaper::ShaperConfiguration;
use crate::domain::utils::id::{FlowName, LinkName};
use crate::error::{Error, Result, TopologyError};

new_key_type! {
    pub struct LinkKey;
    pub struct FlowKey;
}

/// Immutable, validated network: links, the flows routed over them and the shared shaper configuration.
///
/// Built through [`NetworkBuilder`] or [`Network::from_dto`].
#[derive(Debug, Clone)]
pub struct Network {
    shaper: ShaperConfiguration,

    links: SlotMap<LinkKey, Link>,
    flows: SlotMap<FlowKey, Flow>,

    link_index: HashMap<LinkName, LinkKey>,
    flow_index: HashMap<FlowName, FlowKey>,

    routes: SecondaryMap<FlowKey, Vec<LinkKey>>,

    /// Distinct links feeding into each link, in the order the flows list them.
    predecessors: SecondaryMap<LinkKey, Vec<LinkKey>>,

    /// Flows passing each link, any class.
    passing: SecondaryMap<LinkKey, Vec<FlowKey>>,
}

impl Network {
    pub fn from_dto(dto: NetworkDto) -> Result<Self> {
        let mut builder = NetworkBuilder::new(ShaperConfiguration::from(dto.shaper));

        for link_dto in dto.links {
            builder.add_link(Link::try_from(link_dto)?);
        }
        for flow_dto in dto.flows {
            builder.add_flow(Flow::try_from(flow_dto)?);
        }

        builder.build()
    }

    pub fn shaper(&self) -> &ShaperConfiguration {
        &self.shaper
    }

    //---------------------
    // --- Link Methods ---
    //---------------------
    pub fn link(&self, key: LinkKey) -> &Link {
        &self.links[key]
    }

    pub fn link_key(&self, name: &LinkName) -> Result<LinkKey> {
        self.link_index.get(name).copied().ok_or_else(|| Error::UnknownLink(name.clone()))
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkKey, &Link)> {
        self.links.iter()
    }

    pub fn num_of_links(&self) -> usize {
        self.links.len()
    }

    pub fn predecessors(&self, link: LinkKey) -> &[LinkKey] {
        &self.predecessors[link]
    }

    pub fn flows_through(&self, link: LinkKey) -> &[FlowKey] {
        &self.passing[link]
    }

    pub fn flows_starting_at(&self, link: LinkKey) -> impl Iterator<Item = FlowKey> + '_ {
        self.passing[link].iter().copied().filter(move |flow| self.routes[*flow].first() == Some(&link))
    }

    //---------------------
    // --- Flow Methods ---
    //---------------------
    pub fn flow(&self, key: FlowKey) -> &Flow {
        &self.flows[key]
    }

    pub fn flow_key(&self, name: &FlowName) -> Result<FlowKey> {
        self.flow_index.get(name).copied().ok_or_else(|| Error::UnknownFlow(name.clone()))
    }

    pub fn flows(&self) -> impl Iterator<Item = (FlowKey, &Flow)> {
        self.flows.iter()
    }

    pub fn num_of_flows(&self) -> usize {
        self.flows.len()
    }

    /// Links of the flow's path, in order.
    pub fn route(&self, flow: FlowKey) -> &[LinkKey] {
        &self.routes[flow]
    }
}

/// Collects links and flows and validates them into a [`Network`].
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    shaper: ShaperConfiguration,
    links: Vec<Link>,
    flows: Vec<Flow>,
}

impl NetworkBuilder {
    pub fn new(shaper: ShaperConfiguration) -> Self {
        Self { shaper, links: Vec::new(), flows: Vec::new() }
    }

    pub fn add_link(&mut self, link: Link) -> &mut Self {
        self.links.push(link);
        self
    }

    pub fn add_flow(&mut self, flow: Flow) -> &mut Self {
        self.flows.push(flow);
        self
    }

    /// Validates everything collected so far and freezes it into a network.
    ///
    /// # Returns
    /// Returns [`Error::Topology`] with the first violation found: duplicate names, invalid
    /// link speeds or slopes, invalid traffic contracts, empty, repeating, unknown or
    /// non-contiguous paths, and cycles between links.
    pub fn build(self) -> Result<Network> {
        let mut links = SlotMap::with_key();
        let mut link_index = HashMap::new();

        for link in self.links {
            link.validate()?;
            if link_index.contains_key(&link.name) {
                return Err(TopologyError::DuplicateLink(link.name).into());
            }

            let name = link.name.clone();
            let key = links.insert(link);
            link_index.insert(name, key);
        }

        let mut flows = SlotMap::with_key();
        let mut flow_index = HashMap::new();
        let mut routes = SecondaryMap::new();

        for flow in self.flows {
            if flow_index.contains_key(&flow.name) {
                return Err(TopologyError::DuplicateFlow(flow.name).into());
            }

            flow.validate()?;
            let route = resolve_route(&flow, &links, &link_index)?;

            let name = flow.name.clone();
            let key = flows.insert(flow);
            flow_index.insert(name, key);
            routes.insert(key, route);
        }

        let mut predecessors: SecondaryMap<LinkKey, Vec<LinkKey>> = links.keys().map(|key| (key, Vec::new())).collect();
        let mut passing: SecondaryMap<LinkKey, Vec<FlowKey>> = links.keys().map(|key| (key, Vec::new())).collect();

        for (flow, route) in routes.iter() {
            for (position, link) in route.iter().enumerate() {
                passing[*link].push(flow);

                if position > 0 {
                    let previous = route[position - 1];
                    if !predecessors[*link].contains(&previous) {
                        predecessors[*link].push(previous);
                    }
                }
            }
        }

        ensure_acyclic(&links, &predecessors)?;

        log::info!("Network built with {} links and {} flows.", links.len(), flows.len());

        Ok(Network { shaper: self.shaper, links, flows, link_index, flow_index, routes, predecessors, passing })
    }
}

fn resolve_route(flow: &Flow, links: &SlotMap<LinkKey, Link>, link_index: &HashMap<LinkName, LinkKey>) -> std::result::Result<Vec<LinkKey>, TopologyError> {
    if flow.path.is_empty() {
        return Err(TopologyError::EmptyPath(flow.name.clone()));
    }

    let mut seen = HashSet::new();
    let mut route = Vec::with_capacity(flow.path.len());

    for name in &flow.path {
        let Some(key) = link_index.get(name).copied() else {
            return Err(TopologyError::UnknownLink { flow: flow.name.clone(), link: name.clone() });
        };
        if !seen.insert(key) {
            return Err(TopologyError::RepeatedLink { flow: flow.name.clone(), link: name.clone() });
        }
        if let Ok(class) = ShapedClass::try_from(flow.class) {
            if !links[key].is_provisioned(class) {
                return Err(TopologyError::UnprovisionedClass { flow: flow.name.clone(), link: name.clone(), class });
            }
        }

        if let Some(previous) = route.last().copied() {
            let previous: &Link = &links[previous];
            if previous.node_to != links[key].node_from {
                return Err(TopologyError::NonContiguousPath { flow: flow.name.clone(), from: previous.name.clone(), to: name.clone() });
            }
        }

        route.push(key);
    }

    let first = &links[route[0]];
    if flow.rate() > first.link_speed {
        return Err(TopologyError::InvalidFlow {
            flow: flow.name.clone(),
            reason: format!("rate {} bit/s exceeds the speed of its first link {}", flow.rate(), first.name),
        });
    }

    Ok(route)
}

/// Kahn's algorithm over the predecessor relation; whatever cannot be ordered lies on a cycle.
fn ensure_acyclic(links: &SlotMap<LinkKey, Link>, predecessors: &SecondaryMap<LinkKey, Vec<LinkKey>>) -> std::result::Result<(), TopologyError> {
    let mut pending: SecondaryMap<LinkKey, usize> = predecessors.iter().map(|(key, preds)| (key, preds.len())).collect();
    let mut successors: SecondaryMap<LinkKey, Vec<LinkKey>> = links.keys().map(|key| (key, Vec::new())).collect();

    for (link, preds) in predecessors.iter() {
        for pred in preds {
            successors[*pred].push(link);
        }
    }

    let mut ready: VecDeque<LinkKey> = pending.iter().filter(|(_, count)| **count == 0).map(|(key, _)| key).collect();
    let mut ordered = 0;

    while let Some(link) = ready.pop_front() {
        ordered += 1;
        for successor in &successors[link] {
            pending[*successor] -= 1;
            if pending[*successor] == 0 {
                ready.push_back(*successor);
            }
        }
    }

    if ordered == links.len() {
        return Ok(());
    }

    let mut cyclic: Vec<LinkName> = pending.iter().filter(|(_, count)| **count > 0).map(|(key, _)| links[key].name.clone()).collect();
    cyclic.sort();

    log::error!("CyclicTopologyError: links [{}] feed into each other", cyclic.iter().map(|link| link.to_string()).collect::<Vec<_>>().join(", "));
    Err(TopologyError::CyclicPredecessors(cyclic))
}
