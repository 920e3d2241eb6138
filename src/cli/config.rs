//
//  devops-client
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Keys are either core settings (`timeout_secs`, `default_connection`) or
//! per-connection settings written as `<connection>.<field>`.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;

use crate::config::Config;
use crate::output::TableBuilder;

use super::GlobalOptions;

/// Read and write configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print the value of a key
    Get(GetArgs),

    /// Set the value of a key
    Set(SetArgs),

    /// List every key with a value
    #[command(visible_alias = "ls")]
    List,

    /// Print the path of the configuration file
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Key, e.g. `timeout_secs` or `fabrikam.default_project`
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Key, e.g. `timeout_secs` or `fabrikam.default_project`
    pub key: String,

    /// New value
    pub value: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => get(args, global),
            ConfigSubcommand::Set(args) => set(args, global),
            ConfigSubcommand::List => list(global),
            ConfigSubcommand::Path => path(global),
        }
    }
}

fn get(args: &GetArgs, global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(&args.key);

    if global.json {
        let result = serde_json::json!({
            "key": args.key,
            "value": value,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(v) = value {
        println!("{}", v);
    }
    Ok(())
}

fn set(args: &SetArgs, global: &GlobalOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(&args.key, &args.value)?;
    config.save()?;

    if global.json {
        let result = serde_json::json!({
            "success": true,
            "key": args.key,
            "value": args.value,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{} Set {} = {}",
            style("✓").green(),
            style(&args.key).cyan(),
            args.value
        );
    }
    Ok(())
}

fn list(global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;
    let entries = config.entries();

    if global.json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .into_iter()
            .map(|(key, value)| (key, serde_json::Value::String(value)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        TableBuilder::new()
            .headers(["Key", "Value"])
            .rows(entries.into_iter().map(|(key, value)| [key, value]))
            .print();
    }
    Ok(())
}

fn path(global: &GlobalOptions) -> Result<()> {
    let path = Config::config_path()?;
    if global.json {
        let result = serde_json::json!({ "path": path });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
