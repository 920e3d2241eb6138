//
//  devops-client
//  cli/build.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build commands

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use crate::api::build::{Build, BuildApi, BuildQuery, BuildStatus, QueueBuild};
use crate::interactive::prompt_confirm_with_default;
use crate::output::{
    format_status, format_time, print_field, print_header, truncate, write_json, OutputFormat,
    OutputWriter, TableBuilder, TableOutput,
};

use super::{open_connection, require_project, GlobalOptions};

/// Work with builds
#[derive(Args, Debug)]
pub struct BuildCommand {
    #[command(subcommand)]
    pub command: BuildSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BuildSubcommand {
    /// List recent builds
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one build
    View(ViewArgs),

    /// Queue a build of a definition
    Queue(QueueArgs),

    /// Delete a build
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum number of builds
    #[arg(long, short = 'L', default_value = "20")]
    pub limit: u32,

    /// Only builds of these definition ids
    #[arg(long, short = 'd', value_delimiter = ',')]
    pub definition: Vec<u32>,

    /// Only builds in this state
    #[arg(long, short = 's', value_enum)]
    pub status: Option<StatusFilter>,

    /// Only builds of this branch, e.g. refs/heads/main
    #[arg(long, short = 'b')]
    pub branch: Option<String>,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Build id
    pub id: u32,
}

#[derive(Args, Debug)]
pub struct QueueArgs {
    /// Definition id
    #[arg(long, short = 'd')]
    pub definition: u32,

    /// Branch to build (defaults to the definition's default branch)
    #[arg(long, short = 'b')]
    pub branch: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Build id
    pub id: u32,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Build states accepted by `--status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    InProgress,
    Completed,
    Cancelling,
    Postponed,
    NotStarted,
}

impl From<StatusFilter> for BuildStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::InProgress => Self::InProgress,
            StatusFilter::Completed => Self::Completed,
            StatusFilter::Cancelling => Self::Cancelling,
            StatusFilter::Postponed => Self::Postponed,
            StatusFilter::NotStarted => Self::NotStarted,
        }
    }
}

impl BuildCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let (connection, config) = open_connection(global)?;
        let project = require_project(global, &config)?;
        let api = BuildApi::new(&connection).await?;
        let writer = OutputWriter::new(OutputFormat::from_flag(global.json));

        match &self.command {
            BuildSubcommand::List(args) => {
                let mut query = BuildQuery::default()
                    .top(args.limit)
                    .definitions(&args.definition);
                if let Some(status) = args.status {
                    query = query.status(status.into());
                }
                if let Some(branch) = &args.branch {
                    query = query.branch(branch);
                }

                let builds = api.get_builds(&project, &query).await?;
                if global.json {
                    write_json(&builds)
                } else {
                    print_builds(&builds, writer.color_enabled());
                    Ok(())
                }
            }
            BuildSubcommand::View(args) => {
                let build = api.get_build(&project, args.id).await?;
                writer.write(&build)
            }
            BuildSubcommand::Queue(args) => {
                let mut request = QueueBuild::new(args.definition);
                if let Some(branch) = &args.branch {
                    request = request.branch(branch);
                }

                let build = api.queue_build(&project, &request, None).await?;
                writer.write_success(&format!("Queued build {}", build.id));
                writer.write(&build)
            }
            BuildSubcommand::Delete(args) => {
                let confirmed = args.yes
                    || prompt_confirm_with_default(
                        &format!("Delete build {} in {}?", args.id, project),
                        false,
                        !global.no_prompt,
                    )?;
                if !confirmed {
                    anyhow::bail!("Not deleting build {} without confirmation (pass --yes)", args.id);
                }

                api.delete_build(&project, args.id).await?;
                writer.write_success(&format!("Deleted build {}", args.id));
                Ok(())
            }
        }
    }
}

/// The wire token of an enum value, e.g. `inProgress`.
fn token<T: Serialize>(value: Option<T>) -> String {
    value
        .and_then(|v| serde_json::to_value(v).ok())
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "-".to_string())
}

fn print_builds(builds: &[Build], color: bool) {
    if builds.is_empty() {
        println!("No builds found");
        return;
    }

    TableBuilder::new()
        .color(color)
        .headers(["ID", "Number", "Status", "Result", "Definition", "Branch", "Queued"])
        .rows(builds.iter().map(|build| {
            [
                build.id.to_string(),
                build.build_number.clone().unwrap_or_default(),
                format_status(&token(build.status), color),
                format_status(&token(build.result), color),
                build
                    .definition
                    .as_ref()
                    .and_then(|d| d.name.clone())
                    .unwrap_or_default(),
                truncate(
                    build
                        .source_branch
                        .as_deref()
                        .unwrap_or_default()
                        .trim_start_matches("refs/heads/"),
                    40,
                ),
                format_time(build.queue_time.as_ref()),
            ]
        }))
        .print();
}

impl TableOutput for Build {
    fn print_table(&self, color: bool) {
        let title = match &self.build_number {
            Some(number) => format!("Build {} ({})", self.id, number),
            None => format!("Build {}", self.id),
        };
        print_header(&title);

        if let Some(definition) = &self.definition {
            let name = definition.name.as_deref().unwrap_or_default();
            print_field("Definition", &format!("{} ({})", name, definition.id), color);
        }
        print_field("Status", &format_status(&token(self.status), color), color);
        print_field("Result", &format_status(&token(self.result), color), color);
        if let Some(branch) = &self.source_branch {
            print_field("Branch", branch, color);
        }
        if let Some(version) = &self.source_version {
            print_field("Commit", version, color);
        }
        if let Some(identity) = &self.requested_for {
            let who = identity
                .display_name
                .as_deref()
                .or(identity.unique_name.as_deref())
                .unwrap_or_default();
            print_field("Requested for", who, color);
        }
        print_field("Queued", &format_time(self.queue_time.as_ref()), color);
        print_field("Started", &format_time(self.start_time.as_ref()), color);
        print_field("Finished", &format_time(self.finish_time.as_ref()), color);
        if let Some(url) = &self.url {
            print_field("URL", url, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build::BuildResult;

    #[test]
    fn test_wire_tokens() {
        assert_eq!(token(Some(BuildStatus::InProgress)), "inProgress");
        assert_eq!(token(Some(BuildResult::PartiallySucceeded)), "partiallySucceeded");
        assert_eq!(token::<BuildStatus>(None), "-");
    }

    #[test]
    fn test_status_filter_maps_to_status() {
        assert_eq!(BuildStatus::from(StatusFilter::NotStarted), BuildStatus::NotStarted);
    }
}
