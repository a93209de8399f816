use std::collections::HashMap;

use num::Zero;

use crate::domain::cbs::avb_class::{AvbClass, ShapedClass};
use crate::domain::cbs::network::{FlowKey, LinkKey, Network};
use crate::domain::cbs::theorems;
use crate::domain::curve::Curve;
use crate::domain::curve::rational::Rational;
use crate::error::{Error, Result};

/// Every curve involved in the bounds of one class at one link.
#[derive(Debug, Clone)]
pub struct LinkCurves {
    pub shaper: Curve,
    pub minimal_service: Curve,
    pub maximal_service: Curve,
    pub incoming: Curve,
    pub outgoing: Curve,
}

/// Propagation engine computing arrival curves, delays and backlogs over a network.
///
/// Outgoing arrival curves and per-link delays are memoized per `(link, class)` for the
/// lifetime of the analysis; the network itself is never modified.
#[derive(Debug)]
pub struct Analysis<'a> {
    network: &'a Network,
    outgoing: HashMap<(LinkKey, ShapedClass), Curve>,
    delays: HashMap<(LinkKey, ShapedClass), Rational>,
}

impl<'a> Analysis<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self { network, outgoing: HashMap::new(), delays: HashMap::new() }
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// Arrival curve of a flow at its first link.
    pub fn source_arrival_curve(&self, flow: FlowKey) -> Curve {
        let first = self.network.route(flow)[0];
        self.network.flow(flow).source_arrival_curve(&self.network.link(first).link_speed)
    }

    //---------------------
    // --- Service Curves ---
    //---------------------

    /// Minimal service curve in the mode of the network's shaper configuration.
    pub fn minimal_service_curve(&self, link: LinkKey, class: AvbClass) -> Result<Curve> {
        self.minimal_service_curve_with(link, class, self.network.shaper().is_strict)
    }

    /// Minimal service curve with the strict/non-strict mode chosen explicitly.
    pub fn minimal_service_curve_with(&self, link: LinkKey, class: AvbClass, is_strict: bool) -> Result<Curve> {
        let class = ShapedClass::try_from(class)?;
        theorems::minimal_service_curve(self.network.link(link), self.network.shaper(), class, is_strict)
    }

    pub fn maximal_service_curve(&self, link: LinkKey, class: AvbClass) -> Result<Curve> {
        let class = ShapedClass::try_from(class)?;
        theorems::maximal_service_curve(self.network.link(link), self.network.shaper(), class)
    }

    pub fn shaper_curve(&self, link: LinkKey, class: AvbClass) -> Result<Curve> {
        let class = ShapedClass::try_from(class)?;
        theorems::shaper_curve(self.network.link(link), self.network.shaper(), class)
    }

    //---------------------
    // --- Arrival Curves ---
    //---------------------

    /// Sum of the source curves of flows of `class` entering at `link` and the outgoing curves
    /// of every distinct predecessor of `link`.
    ///
    /// Defined for NSR as long as no predecessor forwards NSR traffic, since NSR has no
    /// outgoing curve.
    pub fn incoming_arrival_curve(&mut self, link: LinkKey, class: AvbClass) -> Result<Curve> {
        self.incoming(link, class)
    }

    /// `min(shaper, (incoming ⊗ maximal service) ⊘ minimal service)`, memoized.
    ///
    /// A link that carries no traffic of `class` has the zero curve as output, for NSR too.
    pub fn outgoing_arrival_curve(&mut self, link: LinkKey, class: AvbClass) -> Result<Curve> {
        self.outgoing(link, class)
    }

    fn incoming(&mut self, link: LinkKey, class: AvbClass) -> Result<Curve> {
        let network = self.network;
        let mut incoming = Curve::zero();

        for flow in network.flows_starting_at(link) {
            if network.flow(flow).class == class {
                incoming = incoming.add(&self.source_arrival_curve(flow));
            }
        }

        for predecessor in network.predecessors(link) {
            incoming = incoming.add(&self.outgoing(*predecessor, class)?);
        }

        Ok(incoming)
    }

    fn outgoing(&mut self, link: LinkKey, class: AvbClass) -> Result<Curve> {
        if !self.carries(link, class) {
            return Ok(Curve::zero());
        }

        let shaped = ShapedClass::try_from(class)?;
        if let Some(curve) = self.outgoing.get(&(link, shaped)) {
            log::debug!("OutgoingCurveCacheHit: link {} class {}", self.network.link(link).name, class);
            return Ok(curve.clone());
        }

        let incoming = self.incoming(link, class)?;
        let (shaper, minimal_service, maximal_service) = self.theorem_curves(link, shaped)?;

        // An overloaded queue has no meaningful output, however the curves would combine.
        if incoming.rate() > minimal_service.rate() {
            return Err(self.infinite_delay(link, shaped, incoming, minimal_service));
        }

        let Some(departures) = incoming.convolution(&maximal_service).deconvolution(&minimal_service) else {
            return Err(self.infinite_delay(link, shaped, incoming, minimal_service));
        };
        let curve = shaper.minimum(&departures);

        log::debug!("Computed outgoing arrival curve of class {} at link {} ({} pieces).", class, self.network.link(link).name, curve.pieces().len());
        self.outgoing.insert((link, shaped), curve.clone());
        Ok(curve)
    }

    /// Whether any flow of `class` passes `link`.
    fn carries(&self, link: LinkKey, class: AvbClass) -> bool {
        self.network.flows_through(link).iter().any(|flow| self.network.flow(*flow).class == class)
    }

    fn theorem_curves(&self, link: LinkKey, class: ShapedClass) -> Result<(Curve, Curve, Curve)> {
        let (network_link, shaper) = (self.network.link(link), self.network.shaper());

        Ok((
            theorems::shaper_curve(network_link, shaper, class)?,
            theorems::minimal_service_curve(network_link, shaper, class, shaper.is_strict)?,
            theorems::maximal_service_curve(network_link, shaper, class)?,
        ))
    }

    fn infinite_delay(&self, link: LinkKey, class: ShapedClass, arrival_curve: Curve, service_curve: Curve) -> Error {
        let name = self.network.link(link).name.clone();
        log::warn!(
            "InfiniteDelayError: class {} at link {} receives {} bit/s but is only guaranteed {} bit/s",
            class,
            name,
            arrival_curve.rate(),
            service_curve.rate()
        );

        Error::InfiniteDelay { link: name, class, arrival_curve: Box::new(arrival_curve), service_curve: Box::new(service_curve) }
    }

    //---------------------
    // --- Bounds ---
    //---------------------

    /// Worst-case delay of `class` at `link`: horizontal deviation between the incoming
    /// arrival curve and the minimal service curve. Memoized.
    pub fn delay(&mut self, link: LinkKey, class: AvbClass) -> Result<Rational> {
        let class = ShapedClass::try_from(class)?;

        if let Some(delay) = self.delays.get(&(link, class)) {
            log::debug!("DelayCacheHit: link {} class {}", self.network.link(link).name, class);
            return Ok(delay.clone());
        }

        let incoming = self.incoming(link, AvbClass::from(class))?;
        let minimal_service = theorems::minimal_service_curve(self.network.link(link), self.network.shaper(), class, self.network.shaper().is_strict)?;

        let Some(delay) = incoming.horizontal_deviation(&minimal_service) else {
            return Err(self.infinite_delay(link, class, incoming, minimal_service));
        };

        log::debug!("Delay of class {} at link {}: {} s", class, self.network.link(link).name, delay);
        self.delays.insert((link, class), delay.clone());
        Ok(delay)
    }

    /// Worst-case backlog of `class` at `link`: vertical deviation between the incoming arrival
    /// curve and the minimal service curve, in bits.
    pub fn backlog(&mut self, link: LinkKey, class: AvbClass) -> Result<Rational> {
        let class = ShapedClass::try_from(class)?;

        let incoming = self.incoming(link, AvbClass::from(class))?;
        let minimal_service = theorems::minimal_service_curve(self.network.link(link), self.network.shaper(), class, self.network.shaper().is_strict)?;

        incoming.vertical_deviation(&minimal_service).ok_or_else(|| Error::InfiniteBacklog { link: self.network.link(link).name.clone(), class })
    }

    /// Sum of the per-link delays of the flow's class along its path.
    pub fn end_to_end_delay(&mut self, flow: FlowKey) -> Result<Rational> {
        let network = self.network;
        let class = network.flow(flow).class;
        let mut total = Rational::zero();

        for link in network.route(flow) {
            total += self.delay(*link, class)?;
        }

        Ok(total)
    }

    /// Snapshot of every curve of `class` at `link`.
    pub fn link_curves(&mut self, link: LinkKey, class: AvbClass) -> Result<LinkCurves> {
        let shaped = ShapedClass::try_from(class)?;
        let (shaper, minimal_service, maximal_service) = self.theorem_curves(link, shaped)?;
        let incoming = self.incoming(link, class)?;
        let outgoing = self.outgoing(link, class)?;

        Ok(LinkCurves { shaper, minimal_service, maximal_service, incoming, outgoing })
    }
}
