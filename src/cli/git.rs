//
//  devops-client
//  cli/git.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Git repository commands

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::api::git::{CommitCriteria, GitApi};
use crate::output::{format_time, truncate, write_json, TableBuilder};

use super::{open_connection, resolve_project, GlobalOptions};

/// Work with Git repositories
#[derive(Args, Debug)]
pub struct GitCommand {
    #[command(subcommand)]
    pub command: GitSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum GitSubcommand {
    /// List repositories of the project, or of the whole collection
    Repos,

    /// List commits of a repository
    Commits(CommitsArgs),
}

#[derive(Args, Debug)]
pub struct CommitsArgs {
    /// Repository name or id
    pub repository: String,

    /// Only commits by this author
    #[arg(long, short = 'a')]
    pub author: Option<String>,

    /// Branch to list, e.g. main
    #[arg(long, short = 'b')]
    pub branch: Option<String>,

    /// Maximum number of commits
    #[arg(long, short = 'L', default_value = "30")]
    pub limit: u32,
}

impl GitCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let (connection, config) = open_connection(global)?;
        let project = resolve_project(global, &config);
        let api = GitApi::new(&connection).await?;
        let color = console::colors_enabled();

        match &self.command {
            GitSubcommand::Repos => {
                let repositories = api.get_repositories(project.as_deref(), None).await?;
                if global.json {
                    return write_json(&repositories);
                }
                if repositories.is_empty() {
                    println!("No repositories found");
                    return Ok(());
                }

                TableBuilder::new()
                    .color(color)
                    .headers(["Name", "Project", "Default branch", "URL"])
                    .rows(repositories.iter().map(|repo| {
                        [
                            repo.name.clone(),
                            repo.project
                                .as_ref()
                                .map(|p| p.name.clone())
                                .unwrap_or_default(),
                            repo.default_branch
                                .as_deref()
                                .unwrap_or("-")
                                .trim_start_matches("refs/heads/")
                                .to_string(),
                            repo.web_url.clone().unwrap_or_default(),
                        ]
                    }))
                    .print();
                Ok(())
            }
            GitSubcommand::Commits(args) => {
                let criteria = CommitCriteria {
                    item_version: args.branch.clone(),
                    author: args.author.clone(),
                    top: Some(args.limit),
                    ..Default::default()
                };
                let commits = api
                    .get_commits(&args.repository, &criteria, project.as_deref())
                    .await?;
                if global.json {
                    return write_json(&commits);
                }
                if commits.is_empty() {
                    println!("No commits found");
                    return Ok(());
                }

                TableBuilder::new()
                    .color(color)
                    .headers(["Commit", "Author", "Date", "Message"])
                    .rows(commits.iter().map(|commit| {
                        let author = commit.author.as_ref();
                        [
                            commit.commit_id.chars().take(8).collect::<String>(),
                            author.and_then(|a| a.name.clone()).unwrap_or_default(),
                            format_time(author.and_then(|a| a.date.as_ref())),
                            truncate(
                                commit
                                    .comment
                                    .as_deref()
                                    .unwrap_or_default()
                                    .lines()
                                    .next()
                                    .unwrap_or_default(),
                                60,
                            ),
                        ]
                    }))
                    .print();
                Ok(())
            }
        }
    }
}
