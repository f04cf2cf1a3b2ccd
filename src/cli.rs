use std::{
    path::{Path, PathBuf},
    process,
};

mod allocate;
mod config;
mod dashboard;
mod registry;
mod requests;
mod stock;
mod terminal;

use allocate::Allocate;
use bloodbank::{Config, HttpBackend, Notice, Notifier, RequestLifecycle, Resource};
use chrono::Utc;
use clap::ArgAction;
use dashboard::Dashboard;
use registry::{Banks, Donors, Hospitals, Patients};
use requests::Requests;
use stock::{Allocations, Donate, Inventory, Units};
use terminal::Colorize;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding `.bbreq/config.toml`
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Read configuration from this file instead
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let command = match self.command {
            Some(Command::Config(command)) => {
                return command.run(&self.root, self.config.as_deref());
            }
            Some(Command::Session(command)) => command,
            None => SessionCommand::Dashboard(Dashboard::default()),
        };

        let config =
            Self::load_config(&self.root, self.config.as_deref(), self.api_url.as_deref())?;
        let mut session = Session::new(&config)?;
        command.run(&mut session).await?;

        if session.finish() {
            process::exit(1);
        }
        Ok(())
    }

    fn load_config(
        root: &Path,
        explicit: Option<&Path>,
        api_url: Option<&str>,
    ) -> anyhow::Result<Config> {
        let mut config = Config::resolve(root, explicit).map_err(|e| anyhow::anyhow!("{e}"))?;
        if let Some(url) = api_url {
            config.set_api_url(url);
        }
        tracing::debug!(api_url = config.api_url(), "configuration resolved");
        Ok(config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    #[command(flatten)]
    Session(SessionCommand),

    /// Show or modify configuration settings
    Config(config::Command),
}

/// Commands that talk to the backend.
#[derive(Debug, clap::Subcommand)]
pub enum SessionCommand {
    /// Show dashboard statistics (default)
    Dashboard(Dashboard),

    /// List, create, edit and delete blood requests
    Requests(Requests),

    /// Allocate a blood unit to a pending request
    ///
    /// The unit is reserved and the request approved. If the backend refuses
    /// the allocation, or it fails, the request is denied.
    Allocate(Allocate),

    /// List blood units
    Units(Units),

    /// List allocations
    Allocations(Allocations),

    /// Show available stock per blood bank and blood group
    Inventory(Inventory),

    /// Record a donation
    Donate(Donate),

    /// List, add and edit donors
    Donors(Donors),

    /// List, add and edit patients
    Patients(Patients),

    /// List and add hospitals
    Hospitals(Hospitals),

    /// List and add blood banks
    Banks(Banks),
}

impl SessionCommand {
    async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        match self {
            Self::Dashboard(command) => command.run(session).await?,
            Self::Requests(command) => command.run(session).await?,
            Self::Allocate(command) => command.run(session).await?,
            Self::Units(command) => command.run(session).await?,
            Self::Allocations(command) => command.run(session).await?,
            Self::Inventory(command) => command.run(session).await?,
            Self::Donate(command) => command.run(session).await?,
            Self::Donors(command) => command.run(session).await?,
            Self::Patients(command) => command.run(session).await?,
            Self::Hospitals(command) => command.run(session).await?,
            Self::Banks(command) => command.run(session).await?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// A connection to the backend for the duration of one command.
pub struct Session {
    lifecycle: RequestLifecycle<HttpBackend>,
    notifier: Notifier,
}

impl Session {
    fn new(config: &Config) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(config)?;
        Ok(Self {
            lifecycle: RequestLifecycle::new(backend),
            notifier: Notifier::new(config.notice_duration()),
        })
    }

    pub const fn lifecycle(&self) -> &RequestLifecycle<HttpBackend> {
        &self.lifecycle
    }

    /// Fetches the collections a command reads.
    ///
    /// Returns false, with an error notice raised, if any could not be
    /// fetched.
    pub async fn load(&mut self, resources: &[Resource]) -> bool {
        let failures = self.lifecycle.repository().refresh(resources).await;
        let Some(failure) = failures.first() else {
            return true;
        };
        self.notify(Notice::error(format!(
            "Could not load {}: {}",
            failure.resource, failure.error
        )));
        false
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notifier.show(notice);
    }

    /// Prints the current notice. Returns whether it reports a failure.
    fn finish(&self) -> bool {
        let Some(notice) = self.notifier.current(Utc::now()) else {
            return false;
        };
        terminal::print_notice(notice);
        notice.is_error()
    }
}

/// Renders a value for a table cell.
fn cell(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "–".dim(), |value| value.to_string())
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
