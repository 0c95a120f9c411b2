//! `scribe`: open a text file read-only, unlock it for editing, and have
//! edits autosaved back to it.

mod console;
mod logging;
mod shell;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use console::ConsolePrompt;
use scribe_application::Workbench;
use scribe_infrastructure::{ConfigService, KvRecentFilesRepository, LocalFileHost, ScribePaths};
use shell::Shell;

#[derive(Parser, Debug)]
#[command(name = "scribe", version, about = "A single-file text editor with autosave")]
struct Args {
    /// File to open on startup.
    path: Option<PathBuf>,

    /// Keep configuration, logs and recent files under this directory.
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let paths = ScribePaths::new(args.base_dir);

    let _log_guard = logging::init(&paths.logs_dir()?)?;
    tracing::info!("[Scribe] Starting {}", env!("CARGO_PKG_VERSION"));

    let config = ConfigService::new(paths.config_file()?).get_config();
    let repository = KvRecentFilesRepository::open(&paths.store_dir()?).await;
    let host = LocalFileHost::new(Arc::new(ConsolePrompt));
    let workbench = Workbench::new(Arc::new(host.clone()), Arc::new(repository), &config);

    let shell = Shell::new(workbench, host);
    if let Some(path) = args.path {
        shell.open_path(path).await;
    }
    shell.run().await?;

    tracing::info!("[Scribe] Exiting");
    Ok(())
}
