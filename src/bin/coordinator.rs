//! The coordinator binary: binds a listen address, waits for three agents to
//! JOIN, then drives the calculator REPL against them.

use std::path::PathBuf;

use clap::Parser;
use its_mpc::cli::repl;
use its_mpc::coordinator::Coordinator;
use its_mpc::net::config::SessionConfig;

/// Coordinator for a three-party MPC session.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the session configuration file (JSON: listen_addr,
    /// allowed_ips, read_timeout_ms).
    #[arg(short, long)]
    config: PathBuf,

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

    let config = SessionConfig::from_file(&args.config)?;
    let mut coordinator = Coordinator::bind(&config, rand::thread_rng())?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let result = repl::run(&mut coordinator, stdin.lock(), stdout.lock());

    coordinator.close();
    result.map_err(anyhow::Error::from)
}
