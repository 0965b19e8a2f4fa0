//! Blacklist CLI commands.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::sqlite::SqliteBlacklistRepository;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{agent_hash, AppType, BlacklistEntry, Config};
use crate::services::{BlacklistService, BlacklistStats, CommitSummary};

use super::open_database;

#[derive(Args, Debug)]
pub struct BlacklistArgs {
    #[command(subcommand)]
    pub command: BlacklistCommands,
}

#[derive(Subcommand, Debug)]
pub enum BlacklistCommands {
    /// Commit agents from a file, one per line
    Commit {
        /// Agent file
        file: PathBuf,

        #[arg(short, long)]
        app_type: AppType,

        /// Attribution tag (defaults to blacklist.default_attribution)
        #[arg(long)]
        attribution: Option<String>,
    },
    /// Show blacklist totals
    Stats,
    /// Check whether an agent string is blacklisted
    Check {
        agent: String,
    },
    /// List the most recently written entries
    Recent {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct CommitOutput {
    pub file: PathBuf,
    pub app_type: AppType,
    pub attribution: String,
    #[serde(flatten)]
    pub summary: CommitSummary,
}

impl CommandOutput for CommitOutput {
    fn to_human(&self) -> String {
        format!(
            "Committed {} unique agent(s) ({} submitted) from {} as {} [{}] in {} chunk(s)",
            self.summary.unique,
            self.summary.submitted,
            self.file.display(),
            self.app_type,
            self.attribution,
            self.summary.chunks
        )
    }
}

#[derive(Debug, serde::Serialize)]
pub struct StatsOutput {
    #[serde(flatten)]
    pub stats: BlacklistStats,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        TableFormatter::new().format_blacklist_stats(&self.stats)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CheckOutput {
    pub hash: String,
    pub blacklisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<BlacklistEntry>,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        match &self.entry {
            Some(entry) => format!(
                "Blacklisted ({}, {}) since {}\nhash: {}",
                entry.app_type,
                entry.attribution,
                entry.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                self.hash
            ),
            None => format!("Not blacklisted\nhash: {}", self.hash),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RecentOutput {
    pub entries: Vec<BlacklistEntry>,
    pub total: usize,
}

impl CommandOutput for RecentOutput {
    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return "Blacklist is empty.".to_string();
        }
        format!(
            "{}\n\nShowing {} entr{}",
            TableFormatter::new().format_blacklist_entries(&self.entries),
            self.total,
            if self.total == 1 { "y" } else { "ies" }
        )
    }
}

/// Non-blank trimmed lines of an agent file.
fn parse_agent_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub async fn execute(args: BlacklistArgs, config: &Config, json_mode: bool) -> Result<()> {
    let repository = Arc::new(SqliteBlacklistRepository::new(open_database(config).await?));
    let service = BlacklistService::with_chunk_size(repository, config.blacklist.chunk_size);

    match args.command {
        BlacklistCommands::Commit {
            file,
            app_type,
            attribution,
        } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let agents = parse_agent_lines(&content);
            if agents.is_empty() {
                bail!("No agents found in {}", file.display());
            }
            let attribution = attribution.unwrap_or_else(|| config.blacklist.default_attribution.clone());
            let summary = service.commit(&agents, app_type, &attribution).await?;
            output(
                &CommitOutput {
                    file,
                    app_type,
                    attribution,
                    summary,
                },
                json_mode,
            );
        }
        BlacklistCommands::Stats => {
            let stats = service.stats().await?;
            output(&StatsOutput { stats }, json_mode);
        }
        BlacklistCommands::Check { agent } => {
            let entry = service.check(&agent).await?;
            output(
                &CheckOutput {
                    hash: agent_hash(&agent),
                    blacklisted: entry.is_some(),
                    entry,
                },
                json_mode,
            );
        }
        BlacklistCommands::Recent { limit } => {
            let entries = service.recent(limit).await?;
            let total = entries.len();
            output(&RecentOutput { entries, total }, json_mode);
        }
    }
    Ok(())
}
