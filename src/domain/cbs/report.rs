use std::fmt;

use num::ToPrimitive;

use crate::domain::cbs::analysis::Analysis;
use crate::domain::cbs::avb_class::{AvbClass, ShapedClass};
use crate::domain::curve::rational::Rational;
use crate::domain::utils::id::{FlowName, LinkName};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowDelay {
    pub flow: FlowName,
    pub class: ShapedClass,
    /// Seconds.
    pub delay: Rational,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBound {
    pub link: LinkName,
    pub class: ShapedClass,
    /// Seconds.
    pub delay: Rational,
    /// Bits.
    pub backlog: Rational,
}

/// Bounds for every flow of interest and every class provisioned on a used link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    pub flow_delays: Vec<FlowDelay>,
    pub link_bounds: Vec<LinkBound>,
}

impl Analysis<'_> {
    /// Computes the end-to-end delay of every flow of interest, then the delay and backlog of
    /// each provisioned class on every link that some flow passes, links sorted by name.
    ///
    /// NSR flows have no delay bound and are skipped with a warning.
    pub fn report(&mut self) -> Result<AnalysisReport> {
        let network = self.network();
        let mut report = AnalysisReport::default();

        for (key, flow) in network.flows() {
            if !flow.is_flow_of_interest {
                continue;
            }

            let Ok(class) = ShapedClass::try_from(flow.class) else {
                log::warn!("SkippedFlowOfInterest: flow {} is class {} and has no delay bound", flow.name, flow.class);
                continue;
            };

            let delay = self.end_to_end_delay(key)?;
            report.flow_delays.push(FlowDelay { flow: flow.name.clone(), class, delay });
        }

        let mut used_links: Vec<_> = network.links().filter(|(key, _)| !network.flows_through(*key).is_empty()).collect();
        used_links.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name));

        for (key, link) in used_links {
            for class in ShapedClass::ALL.into_iter().filter(|class| link.is_provisioned(*class)) {
                let delay = self.delay(key, AvbClass::from(class))?;
                let backlog = self.backlog(key, AvbClass::from(class))?;
                report.link_bounds.push(LinkBound { link: link.name.clone(), class, delay, backlog });
            }
        }

        log::info!("Report computed: {} flow delays, {} link bounds.", report.flow_delays.len(), report.link_bounds.len());
        Ok(report)
    }
}

fn approx(value: &Rational) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "End-to-end delays:")?;
        for entry in &self.flow_delays {
            writeln!(f, "  {} (class {}): {:.3} us [{} s]", entry.flow, entry.class, approx(&entry.delay) * 1e6, entry.delay)?;
        }

        writeln!(f, "Link bounds:")?;
        for entry in &self.link_bounds {
            writeln!(
                f,
                "  {} class {}: delay {:.3} us [{} s], backlog {:.3} bit [{}]",
                entry.link,
                entry.class,
                approx(&entry.delay) * 1e6,
                entry.delay,
                approx(&entry.backlog),
                entry.backlog
            )?;
        }

        Ok(())
    }
}
