//! docintake CLI
//!
//! Upload a document to the intake backend, review and edit the fields it
//! extracted, and ask questions about it.

mod cmd_ask;
mod cmd_upload;
mod config;
mod logging;
mod paths;
mod render;
mod shell;

use clap::Parser;
use docintake_client::Backend;
use tracing::info;

use crate::config::{Cli, Command};
use crate::paths::DataDir;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    data_dir.ensure_dirs()?;
    let logging = logging::init_logging(&data_dir.log_dir())?;

    let config = cli.client_config(&data_dir)?;
    info!(
        component = "cli",
        event = "cli.started",
        version = VERSION,
        run_id = %logging.run_id,
        data_dir = %data_dir.root().display(),
        server_url = %config.server_url(),
    );

    let backend = Backend::new(config);
    match cli.command.unwrap_or(Command::Shell) {
        Command::Upload { file, json } => cmd_upload::run(&backend, &file, json).await,
        Command::Ask { file, questions } => cmd_ask::run(&backend, &file, &questions).await,
        Command::Shell => shell::run(&backend).await,
    }
}
