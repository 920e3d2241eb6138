//
//  devops-client
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod auth;
mod api;
mod build;
mod config;
mod git;
mod completion;

pub use auth::AuthCommand;
pub use api::ApiCommand;
pub use build::BuildCommand;
pub use config::ConfigCommand;
pub use git::GitCommand;
pub use completion::CompletionCommand;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::api::Connection;
use crate::auth::{AuthCredential, KeyringStore};
use crate::config::Config;

/// Work with DevOps platform APIs from the command line
#[derive(Parser, Debug)]
#[command(
    name = "dvo",
    version,
    about = "Work with DevOps platform APIs from the command line",
    long_about = "dvo is a CLI for hosted DevOps organizations and on-premises collections.\n\n\
                  It calls versioned REST resources, negotiating API versions and following \
                  resource-area redirects for you.",
    propagate_version = true,
    after_help = "Use 'dvo <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Options accepted by every command
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Named connection to use (see `dvo auth status`)
    #[arg(long, short = 'c', global = true, env = "DVO_CONNECTION")]
    pub connection: Option<String>,

    /// Project to operate on
    #[arg(long, short = 'p', global = true, env = "DVO_PROJECT")]
    pub project: Option<String>,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Never prompt; fail instead
    #[arg(long, global = true, env = "DVO_NO_PROMPT")]
    pub no_prompt: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage stored credentials
    #[command(visible_alias = "login")]
    Auth(AuthCommand),

    /// Read and write configuration
    Config(ConfigCommand),

    /// Make a versioned call to any resource
    Api(ApiCommand),

    /// Work with builds
    Build(BuildCommand),

    /// Work with Git repositories
    Git(GitCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Show version information
    Version,
}

/// Opens the connection selected by `--connection`, the default one, or the only one.
///
/// The secret is read from the keyring. A connection without a stored secret is
/// opened anonymously, which on-premises servers may accept.
pub(crate) fn open_connection(global: &GlobalOptions) -> Result<(Connection, Config)> {
    let config = Config::load()?;
    let connection = {
        let (name, settings) = config.resolve_connection(global.connection.as_deref())?;
        debug!("Using connection '{}' at {}", name, settings.url);

        let credential = KeyringStore::new()
            .get(&settings.url)?
            .map(|secret| {
                AuthCredential::from_kind(settings.auth, settings.username.as_deref(), secret)
            });
        Connection::connect(&settings.url, credential, config.core.timeout())
            .with_context(|| format!("Could not open connection '{}'", name))?
    };
    Ok((connection, config))
}

/// The project from `--project`, else the connection's default project.
pub(crate) fn resolve_project(global: &GlobalOptions, config: &Config) -> Option<String> {
    global.project.clone().or_else(|| {
        config
            .resolve_connection(global.connection.as_deref())
            .ok()
            .and_then(|(_, settings)| settings.default_project.clone())
    })
}

/// Like [`resolve_project`], but a project is mandatory.
pub(crate) fn require_project(global: &GlobalOptions, config: &Config) -> Result<String> {
    resolve_project(global, config).ok_or_else(|| {
        anyhow::anyhow!(
            "No project given. Pass --project or run `dvo config set <connection>.default_project <name>`."
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_project_falls_back_to_connection_default() {
        let mut config = Config::default();
        config.set("fabrikam.url", "https://dev.azure.com/fabrikam").unwrap();
        config.set("fabrikam.default_project", "Fiber").unwrap();

        let global = GlobalOptions::default();
        assert_eq!(resolve_project(&global, &config).as_deref(), Some("Fiber"));

        let global = GlobalOptions {
            project: Some("Other".to_string()),
            ..Default::default()
        };
        assert_eq!(require_project(&global, &config).unwrap(), "Other");
    }

    #[test]
    fn test_project_required_without_default() {
        let config = Config::default();
        assert!(require_project(&GlobalOptions::default(), &config).is_err());
    }
}
