//
//  devops-client
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use devops_client::api::ApiError;
use devops_client::cli::{Cli, Commands};
use devops_client::exit_codes;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    let result = run(cli).await;

    // Handle result and exit
    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code_for(&e));
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("DVO_DEBUG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Maps a failure to the process exit code
fn exit_code_for(error: &anyhow::Error) -> i32 {
    if let Some(dialoguer::Error::IO(e)) = error.downcast_ref::<dialoguer::Error>() {
        if e.kind() == std::io::ErrorKind::Interrupted {
            return exit_codes::CANCELLED;
        }
    }

    let Some(api_error) = error.downcast_ref::<ApiError>() else {
        return exit_codes::ERROR;
    };

    match api_error {
        ApiError::InvalidVersionFormat(_) | ApiError::UnsupportedApiVersion { .. } => {
            exit_codes::USAGE
        }
        ApiError::LocationNotFound { .. } | ApiError::ResourceAreaNotFound { .. } => {
            exit_codes::NOT_FOUND
        }
        ApiError::Transport(transport) => match transport.status_code() {
            Some(401) | Some(403) => exit_codes::AUTH_ERROR,
            Some(404) => exit_codes::NOT_FOUND,
            Some(429) => exit_codes::RATE_LIMIT,
            _ => exit_codes::ERROR,
        },
        _ => exit_codes::ERROR,
    }
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Auth(cmd) => cmd.run(&cli.global).await,
        Commands::Config(cmd) => cmd.run(&cli.global).await,
        Commands::Api(cmd) => cmd.run(&cli.global).await,
        Commands::Build(cmd) => cmd.run(&cli.global).await,
        Commands::Git(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("dvo version {}", devops_client::VERSION);
            Ok(())
        }
    }
}
