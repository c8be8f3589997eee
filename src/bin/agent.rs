//! The agent binary: connects to a coordinator, joins, and serves `Task`
//! frames until the coordinator closes the session.

use std::time::Duration;

use clap::Parser;
use its_mpc::agent::Agent;

/// Agent for a three-party MPC session.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Coordinator address to dial, e.g. 127.0.0.1:9000.
    #[arg(short, long)]
    coordinator: std::net::SocketAddr,

    /// Connection timeout in milliseconds. No timeout by default.
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Suppress informational logging; errors still print.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut log_builder = env_logger::Builder::new();
    log_builder.filter_level(if args.quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    });
    log_builder.init();

    let timeout = args.timeout_ms.map(Duration::from_millis);
    let mut agent = Agent::connect(args.coordinator, timeout)?;
    agent.serve().map_err(anyhow::Error::from)
}
