//! Kubeadm cluster provider plugin binary.
//!
//! Invoked by the host as `agent-provider-kubeadm <event>` with the event
//! JSON on stdin; writes the response JSON to stdout.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use provider_kubeadm::constants::DEFAULT_LOG_FILE;
use provider_kubeadm::logging;
use provider_kubeadm::plugin::{handle_event, Event};
use provider_kubeadm::SystemProbe;

/// Kubeadm cluster provider.
#[derive(Parser)]
#[command(name = "agent-provider-kubeadm")]
#[command(about = "Render kubeadm boot stages for the host orchestrator", version)]
struct Cli {
    /// Bus event to handle (`cluster.provision`, `cluster.reset`).
    event: String,

    /// Log file (stdout is reserved for the host protocol).
    #[arg(long, env = "PROVIDER_KUBEADM_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_file, cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read event from stdin")?;

    let mut event: Event = if input.trim().is_empty() {
        Event::default()
    } else {
        serde_json::from_str(&input).context("Failed to decode event")?
    };
    if event.name.is_empty() {
        event.name.clone_from(&cli.event);
    }
    info!("handling event {}", event.name);

    let response = handle_event(&event, &SystemProbe)
        .with_context(|| format!("Failed to handle {}", event.name))?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &response).context("Failed to write response")?;
    stdout.flush().context("Failed to flush response")?;
    Ok(())
}
