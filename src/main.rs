use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use cbs_bounds::domain::cbs::analysis::Analysis;
use cbs_bounds::domain::utils::id::FlowName;
use cbs_bounds::error::Result;
use cbs_bounds::{load_network, logger};

/// Worst-case delay and backlog bounds for credit-based shaped networks.
#[derive(Debug, Parser)]
#[command(name = "cbs-analysis", version, about)]
struct Cli {
    /// JSON network description.
    #[arg(short, long)]
    file: String,

    /// Only print the end-to-end delay of this flow.
    #[arg(long)]
    flow: Option<String>,

    /// Log at debug level regardless of RUST_LOG.
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> Result<()> {
    let network = load_network(&cli.file)?;
    let mut analysis = Analysis::new(&network);

    match &cli.flow {
        Some(name) => {
            let flow = network.flow_key(&FlowName::new(name.as_str()))?;
            let delay = analysis.end_to_end_delay(flow)?;
            println!("{}: {} s", name, delay);
        }
        None => {
            let report = analysis.report()?;
            print!("{}", report);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose.then_some(LevelFilter::Debug));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
