//! Command-line configuration.
//!
//! Values come from flags, then `DOCINTAKE_*` environment variables, then
//! `<data dir>/config.toml`, then built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use docintake_client::{ClientConfig, DEFAULT_SERVER_URL};
use serde::Deserialize;

use crate::paths::DataDir;

#[derive(Debug, Parser)]
#[command(name = "docintake")]
#[command(about = "Upload a document, review the extracted fields and ask questions about it")]
#[command(version)]
pub struct Cli {
    /// Base URL of the document backend
    #[arg(long, env = "DOCINTAKE_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Directory for logs and config.toml (default: ~/.docintake)
    #[arg(long, env = "DOCINTAKE_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Upload a document once and print the extracted fields
    Upload {
        file: PathBuf,
        /// Print the document as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Upload a document, then ask one or more questions about it
    Ask {
        file: PathBuf,
        #[arg(required = true)]
        questions: Vec<String>,
    },
    /// Interactive session (default)
    Shell,
}

/// Optional `config.toml` in the data dir
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server_url: Option<String>,
}

impl FileConfig {
    /// Missing file is not an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                toml::from_str(&text).with_context(|| format!("invalid {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }
}

impl Cli {
    pub fn client_config(&self, data_dir: &DataDir) -> anyhow::Result<ClientConfig> {
        let file = FileConfig::load(&data_dir.config_path())?;
        let url = resolve_server_url(self.server_url.as_deref(), file.server_url.as_deref());
        ClientConfig::new(url).context("invalid server URL")
    }
}

fn resolve_server_url<'a>(cli: Option<&'a str>, file: Option<&'a str>) -> &'a str {
    cli.or(file).unwrap_or(DEFAULT_SERVER_URL)
}
