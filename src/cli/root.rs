use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::cli::{audit, navigate, overview, routes};
use crate::client::Client;
use crate::common::debug;
use crate::config::{Config, Initializer, Running};
use crate::core::{Outcome, ResolveOrdering};
use crate::{HrkitError, Result};

/// Hrkit command
#[derive(Parser, Debug)]
#[command(version, propagate_version = true, subcommand_required = true)]
pub struct HrkitCommand {
    /// App options
    #[command(flatten)]
    pub app: AppOptions,
    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// App options
#[derive(Args, Debug)]
pub struct AppOptions {
    /// Configuration file path
    #[arg(long, short = 'C', env = "HRKIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// How authentication changes are resolved into sessions
    #[arg(long, value_enum, env = "HRKIT_SESSION_ORDERING", global = true)]
    pub ordering: Option<Ordering>,
    /// Match landing role labels case-insensitively
    #[arg(long, env = "HRKIT_CASE_INSENSITIVE_ROLES", global = true)]
    pub case_insensitive_roles: Option<bool>,
    /// Sign in with this email before running the command
    #[arg(long, env = "HRKIT_EMAIL", global = true)]
    pub email: Option<String>,
    /// Password for --email
    #[arg(long, env = "HRKIT_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Ordering {
    Overlapping,
    Serialized,
}

impl From<Ordering> for ResolveOrdering {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Overlapping => ResolveOrdering::Overlapping,
            Ordering::Serialized => ResolveOrdering::Serialized,
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the route table
    Routes(routes::RoutesCommand),
    /// Navigate to a path and print the outcome
    Navigate(navigate::NavigateCommand),
    /// Print the audit log
    Audit(audit::AuditCommand),
    /// Print the dashboard counters
    Overview(overview::OverviewCommand),
}

impl Command {
    pub async fn run(self, client: &Client) -> Result<()> {
        match self {
            Command::Routes(cmd) => cmd.run(client),
            Command::Navigate(cmd) => cmd.run(client).await,
            Command::Audit(cmd) => cmd.run(client).await,
            Command::Overview(cmd) => cmd.run(client).await,
        }
    }
}

/// Parse command line args
pub fn parse() -> HrkitCommand {
    HrkitCommand::parse()
}

impl AppOptions {
    /// Launch the app and sign in when credentials were given.
    pub async fn launch(self) -> Result<Running> {
        let AppOptions {
            config,
            ordering,
            case_insensitive_roles,
            email,
            password,
        } = self;

        let mut initializer = match config {
            Some(path) => Initializer::load_config_file(path).await?,
            None => Initializer::from_config(Config::default()),
        };
        initializer.set_ordering(ordering.map(ResolveOrdering::from));
        initializer.set_case_insensitive_roles(case_insensitive_roles);

        debug!("{:?}", initializer);

        let running = initializer.launch().await?;
        let client = running.client();
        client.resolved().await?;

        if let Some(email) = email {
            let password = password.unwrap_or_default();
            match client.sign_in(email.as_str(), password).await? {
                Outcome::Admitted(principal) => debug!(uid=%principal.uid, "Signed in"),
                other => {
                    return Err(HrkitError::InvalidInput(format!(
                        "sign in refused: {:?}",
                        other
                    )))
                }
            }
        }

        Ok(running)
    }
}
