use std::{fs, path::Path};

use bloodbank::{Config, domain::CONFIG_DIR};
use tracing::instrument;

use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
/// Show or modify configuration
///
/// Configuration is stored in .bbreq/config.toml under the working root.
/// The `BLOODBANK_API_URL` environment variable and the `--api-url` flag
/// override the stored backend URL.
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Create .bbreq/config.toml with default settings
    Init,

    /// Show the effective configuration
    Show,

    /// Store the backend base URL
    ///
    /// Example:
    ///   `bbreq config set-url http://localhost:8000/api`
    SetUrl {
        /// Base URL of the REST backend
        url: String,
    },
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path, explicit: Option<&Path>) -> anyhow::Result<()> {
        let config_path = explicit.map_or_else(|| Config::default_path(root), Path::to_path_buf);

        match self.command {
            ConfigCommand::Init => Self::init(root, &config_path),
            ConfigCommand::Show => Self::show(root, explicit, &config_path),
            ConfigCommand::SetUrl { url } => Self::set_url(&config_path, &url),
        }
    }

    fn init(root: &Path, config_path: &Path) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Already initialized (found existing {})",
                config_path.display()
            );
        }
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_DIR} directory: {e}"))?;
        }

        Config::default()
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!("Initialized configuration in {}", root.display());
        println!("  Created: {}", config_path.display());
        Ok(())
    }

    fn show(root: &Path, explicit: Option<&Path>, config_path: &Path) -> anyhow::Result<()> {
        let config = Config::resolve(root, explicit).map_err(|e| anyhow::anyhow!("{e}"))?;

        let source = if config_path.exists() {
            config_path.display().to_string()
        } else {
            "defaults".dim()
        };

        println!("Configuration ({source}):");
        println!("  api_url:      {}", config.api_url());
        println!("  timeout_secs: {}", config.timeout().as_secs());
        println!("  notice_secs:  {}", config.notice_duration().as_secs());
        Ok(())
    }

    fn set_url(config_path: &Path, url: &str) -> anyhow::Result<()> {
        let trimmed = url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            anyhow::bail!("Invalid URL '{url}': expected an http:// or https:// address");
        }

        let mut config = if config_path.exists() {
            Config::load(config_path).map_err(|e| anyhow::anyhow!("{e}"))?
        } else {
            Config::default()
        };
        config.set_api_url(trimmed);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        config
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        println!(
            "{}",
            format!("✓ api_url set to {}", config.api_url()).success()
        );
        Ok(())
    }
}
