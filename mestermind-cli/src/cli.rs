use clap::{Parser, Subcommand};
use mestermind_forms::FlowVariant;
use std::path::PathBuf;

use crate::commands::{self, AppContext};
use crate::config::MestermindConfig;
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "mestermind")]
#[command(about = "Request quotes from Mestermind professionals")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the configuration
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token; presence counts as being signed in
    #[arg(long, global = true, env = "MESTERMIND_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill in a quote request for a service
    Request {
        #[arg(long)]
        service: i64,

        #[arg(long)]
        place: Option<i64>,

        /// Send the request to one professional
        #[arg(long)]
        mester: Option<i64>,

        #[arg(long, value_enum, default_value_t = VariantArg::Guided)]
        variant: VariantArg,

        /// Page to return to after signing in
        #[arg(long)]
        return_to: Option<String>,
    },

    /// Show the question set a request for a service would use
    QuestionSet {
        #[arg(long)]
        service: i64,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Delete the resumable draft for a service
    Abandon {
        #[arg(long)]
        service: i64,

        #[arg(long)]
        place: Option<i64>,
    },

    /// Show draft and submission state for a service
    Status {
        #[arg(long)]
        service: i64,

        #[arg(long)]
        place: Option<i64>,

        /// Clear the submitted flag after showing it
        #[arg(long)]
        acknowledge: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum VariantArg {
    Guided,
    Preview,
}

impl From<VariantArg> for FlowVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Guided => FlowVariant::Guided,
            VariantArg::Preview => FlowVariant::Preview,
        }
    }
}

impl Cli {
    pub async fn run(&self) -> Result<(), CliError> {
        let (config, config_path) = MestermindConfig::load(self.config.as_deref())?;
        let config = config.with_overrides(self.api_url.as_deref(), self.token.as_deref());

        if let Commands::Config { action } = &self.command {
            return commands::config::handle_config_command(action, &config, &config_path);
        }

        let app = AppContext::from_config(config)?;
        match &self.command {
            Commands::Request {
                service,
                place,
                mester,
                variant,
                return_to,
            } => {
                let mut context = commands::request_context(*service, *place)
                    .with_mester(*mester);
                if let Some(return_to) = return_to {
                    context = context.with_return_to(return_to.clone());
                }
                commands::request::run_request(&app, context, (*variant).into()).await
            }
            Commands::QuestionSet { service, format } => {
                commands::question_set::show_question_set(&app, *service, *format).await
            }
            Commands::Abandon { service, place } => {
                commands::abandon::abandon_draft(&app, commands::request_context(*service, *place))
                    .await
            }
            Commands::Status {
                service,
                place,
                acknowledge,
            } => {
                let context = commands::request_context(*service, *place);
                commands::status::show_status(&app, context, *acknowledge).await
            }
            Commands::Config { .. } => Ok(()),
        }
    }
}
