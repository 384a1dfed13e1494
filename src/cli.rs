//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};

use crate::params::ProfileRequest;

/// Team-scoped Bedrock inference profile gateway.
#[derive(Parser, Debug)]
#[command(name = "profile-gateway", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose (debug) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to bind (defaults to the configured host).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to `PORT`, then the configured port).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one profile operation and print the response envelope.
    Call(CallArgs),

    /// Print provider health, available models and configured registry.
    Health,
}

/// Arguments of `call`, one field per request field.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Owning team.
    #[arg(short, long)]
    pub team: String,

    /// One of create, get, delete, use.
    #[arg(short, long)]
    pub action: String,

    /// Model family, e.g. claude.
    #[arg(short, long)]
    pub model_type: String,

    /// Model version (configured default when omitted).
    #[arg(long = "model-version")]
    pub version: Option<String>,

    /// User message for `use`.
    #[arg(long)]
    pub message: Option<String>,

    /// System prompt for `use`.
    #[arg(long)]
    pub system_prompt: Option<String>,
}

impl CallArgs {
    /// Build the request these arguments describe.
    #[must_use]
    pub fn to_request(&self) -> ProfileRequest {
        ProfileRequest {
            team_tag: Some(self.team.clone()),
            action: Some(self.action.clone()),
            model_type: Some(self.model_type.clone()),
            version: self.version.clone(),
            user_message: self.message.clone(),
            system_prompt: self.system_prompt.clone(),
        }
    }
}
