use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod codec;
mod command;
mod config;
mod daemon;
mod dedup;
mod error;
mod model;
mod net;
mod routing;

use command::CommandReader;
use daemon::Router;
use model::node_id::NodeId;

/// How often the event loop checks peer sockets and stdin for pending
/// work between advertisement checks.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Parser)]
#[command(name = "routingd")]
#[command(about = "Link-state routing daemon core")]
struct Args {
    /// This router's identifier, matching the first column of the
    /// initialization file.
    router_id: String,
    /// File to append structured log output to, in addition to stderr.
    log_filename: PathBuf,
    /// Initialization file listing this router's direct neighbor links.
    init_filename: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args.log_filename)?;

    let self_id = NodeId::new(&args.router_id);
    let links = config::load_links(&args.init_filename, &args.router_id)
        .with_context(|| format!("loading {}", args.init_filename.display()))?;

    let peers = net::connector::connect_all(&links).context("bootstrapping neighbor sockets")?;

    let mut router = Router::new(self_id, links, peers);
    let shutdown = Arc::new(AtomicBool::new(false));
    install_sigint_handler(Arc::clone(&shutdown));

    let commands = CommandReader::spawn();
    info!(router = %self_id, "entering event loop");
    router.run(&commands, POLL_INTERVAL, &shutdown);

    Ok(())
}

/// Wires console (stderr) and file output into one `tracing` subscriber,
/// so the required emissions (initial table, every received LSP, kill
/// notifications, forwarding markers, post-update table) land in both
/// places, matching the reference's `fopen(log_filename, "w+")` plus its
/// `printf` console chatter. The returned guard must stay alive for the
/// process lifetime: dropping it flushes and stops the non-blocking file
/// appender's writer thread.
fn init_logging(log_filename: &PathBuf) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = log_filename
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = log_filename
        .file_name()
        .context("log filename has no file name component")?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let console_layer = tracing_subscriber::fmt::layer().with_target(true);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// On SIGINT, raises `shutdown` so the next loop iteration floods the
/// same kill packet the `exit` stdin command would have sent, then
/// returns. This is a supplement beyond the stdin-driven shutdown the
/// reference implements: a daemon that ignores Ctrl+C would be an odd
/// omission from a process meant to run under a terminal or supervisor.
fn install_sigint_handler(shutdown: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::SeqCst);
    });
    if let Err(err) = result {
        tracing::warn!(error = %err, "failed to install SIGINT handler");
    }
}
