//
//  devops-client
//  cli/auth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Authentication commands.
//!
//! Credentials are stored per connection: the URL and auth kind go to the
//! configuration file, the secret goes to the system keyring keyed by URL.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::api::routing::{QueryParams, RouteValues};
use crate::api::{Connection, ResourceArea, ResponseShape};
use crate::auth::{
    mask_token, read_token_from_stdin, validate_token, AuthCredential, AuthKind, KeyringStore,
};
use crate::config::{connection_name_for, is_hosted_service, Config, ConnectionConfig};
use crate::interactive::{prompt_confirm_with_default, prompt_input, prompt_password};

use super::GlobalOptions;

/// Manage stored credentials
#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Store credentials for an organization or collection
    Login(LoginArgs),

    /// Remove stored credentials
    Logout(LogoutArgs),

    /// Show configured connections and whether a secret is stored
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Organization or collection URL, e.g. https://dev.azure.com/fabrikam
    pub url: Option<String>,

    /// Name for the connection (defaults to the organization or collection name)
    #[arg(long)]
    pub name: Option<String>,

    /// How the secret is presented to the server
    #[arg(long, default_value = "pat")]
    pub auth: AuthKind,

    /// User name, for basic authentication
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Read the secret from standard input
    #[arg(long)]
    pub with_token: bool,

    /// Store the secret without calling the server
    #[arg(long)]
    pub no_verify: bool,
}

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Connection to log out of (defaults to the selected connection)
    pub name: Option<String>,

    /// Log out of every connection
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show the stored secret, partially masked
    #[arg(long, short = 't')]
    pub show_token: bool,
}

impl AuthCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AuthSubcommand::Login(args) => login(args, global).await,
            AuthSubcommand::Logout(args) => logout(args, global),
            AuthSubcommand::Status(args) => status(args),
        }
    }
}

async fn login(args: &LoginArgs, global: &GlobalOptions) -> Result<()> {
    let allow_prompt = !global.no_prompt;

    let url = match &args.url {
        Some(url) => url.clone(),
        None => prompt_input("Organization or collection URL:", allow_prompt)?,
    };
    let settings = ConnectionConfig {
        auth: args.auth,
        username: args.username.clone(),
        ..ConnectionConfig::new(&url)
    };
    if url::Url::parse(&settings.url).is_err() {
        anyhow::bail!("'{}' is not an absolute URL", url);
    }
    if settings.auth == AuthKind::Basic && settings.username.is_none() {
        anyhow::bail!("Basic authentication needs --username");
    }

    let name = args
        .name
        .clone()
        .unwrap_or_else(|| connection_name_for(&settings.url));

    let keyring = KeyringStore::new();
    if keyring.get(&settings.url)?.is_some()
        && !prompt_confirm_with_default(
            &format!("Already logged in to {}. Replace the stored secret?", settings.url),
            true,
            allow_prompt,
        )?
    {
        return Ok(());
    }

    let secret = if args.with_token {
        read_token_from_stdin()?
    } else {
        if is_hosted_service(&settings.url) && settings.auth == AuthKind::Pat {
            println!();
            println!("To create a Personal Access Token:");
            println!("  1. Go to {}/_usersSettings/tokens", settings.url);
            println!("  2. Click 'New Token' and pick the scopes you need");
            println!("  3. Copy the generated token");
            println!();
        }
        let message = match settings.auth {
            AuthKind::Basic => "Password:",
            AuthKind::Bearer => "Access token:",
            AuthKind::Pat => "Personal Access Token:",
        };
        prompt_password(message, allow_prompt)?
    };

    if !validate_token(&secret) {
        anyhow::bail!("Invalid token format");
    }

    if !args.no_verify {
        println!("Validating credentials...");
        let credential =
            AuthCredential::from_kind(settings.auth, settings.username.as_deref(), secret.clone());
        verify(&settings.url, credential)
            .await
            .with_context(|| format!("Could not authenticate with {}", settings.url))?;
    }

    keyring.store(&settings.url, &secret)?;

    let mut config = Config::load()?;
    let url = settings.url.clone();
    config.connections.insert(name.clone(), settings);
    if config.core.default_connection.is_none() {
        config.core.default_connection = Some(name.clone());
    }
    config.save()?;

    println!("{} Logged in to {} as connection '{}'", style("✓").green(), url, name);
    Ok(())
}

/// Lists one project, which any valid credential may do.
async fn verify(url: &str, credential: AuthCredential) -> Result<()> {
    let connection = Connection::connect(url, Some(credential), None)?;
    let client = connection.resource_client(&ResourceArea::new("core")).await?;
    let request = client
        .request("projects")
        .route_values(RouteValues::new().with_optional::<&str>("projectId", None))
        .query(QueryParams::new().with("$top", 1));
    client.get(request, ResponseShape::RAW).await?;
    Ok(())
}

fn logout(args: &LogoutArgs, global: &GlobalOptions) -> Result<()> {
    let keyring = KeyringStore::new();
    let mut config = Config::load()?;

    if config.connections.is_empty() {
        println!("Not logged in to any connections");
        return Ok(());
    }

    let names: Vec<String> = if args.all {
        config.connections.keys().cloned().collect()
    } else {
        let requested = args.name.as_deref().or(global.connection.as_deref());
        let (name, _) = config.resolve_connection(requested)?;
        vec![name]
    };

    for name in &names {
        if let Some(settings) = config.connections.remove(name) {
            keyring.delete(&settings.url)?;
        }
        if config.core.default_connection.as_deref() == Some(name.as_str()) {
            config.core.default_connection = None;
        }
    }
    config.save()?;

    match names.as_slice() {
        [name] => println!("Logged out of '{}'", name),
        _ => println!("Logged out of {} connection(s)", names.len()),
    }
    Ok(())
}

fn status(args: &StatusArgs) -> Result<()> {
    let keyring = KeyringStore::new();
    let config = Config::load()?;

    if config.connections.is_empty() {
        println!("No connections configured");
        println!();
        println!("Run 'dvo auth login <url>' to authenticate");
        return Ok(());
    }

    for (name, settings) in &config.connections {
        let is_default = config.core.default_connection.as_deref() == Some(name.as_str());
        println!(
            "{}{}",
            style(name).bold(),
            if is_default { " (default)" } else { "" }
        );
        println!("  URL: {}", settings.url);
        println!("  Auth: {}", settings.auth);
        if let Some(ref user) = settings.username {
            println!("  User: {}", user);
        }
        if let Some(ref project) = settings.default_project {
            println!("  Default project: {}", project);
        }

        match keyring.get(&settings.url)? {
            Some(secret) if args.show_token => println!("  Secret: {}", mask_token(&secret)),
            Some(_) => println!("  Secret: {}", style("stored").green()),
            None => println!("  Secret: {}", style("missing").yellow()),
        }
        println!();
    }

    Ok(())
}
