//! Implementation of the `uaforge generate` command.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::sqlite::SqliteBlacklistRepository;
use crate::cli::output::progress::{create_progress_bar, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{
    AppType, BatchOutcome, BatchStatus, Config, FailureTally, GenerationRequest, Platform, StopReason,
};
use crate::services::{BlacklistService, CommitSummary, GenerationEngine};

use super::{open_database, open_pool_store};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Target platform (android, ios)
    #[arg(short, long)]
    pub platform: Platform,

    /// Application grammar (browser, messaging-app-a, messaging-app-b)
    #[arg(short, long)]
    pub app_type: AppType,

    /// Number of distinct agents to produce
    #[arg(short = 'n', long, default_value = "10")]
    pub quantity: usize,

    /// Pin every agent to one device model
    #[arg(short, long)]
    pub device: Option<String>,

    /// Seed for a reproducible batch
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write agents to this file, one per line
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Persist accepted agents to the blacklist
    #[arg(long)]
    pub commit: bool,

    /// Attribution recorded with committed agents
    #[arg(long, requires = "commit")]
    pub attribution: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct GenerateOutput {
    pub batch_id: String,
    pub status: BatchStatus,
    pub requested: usize,
    pub accepted: usize,
    pub attempts: u64,
    pub stop_reason: StopReason,
    pub failures: FailureTally,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committed: Option<CommitSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<String>,
}

impl GenerateOutput {
    fn new(outcome: BatchOutcome, output_file: Option<PathBuf>, committed: Option<CommitSummary>) -> Self {
        let accepted = outcome.accepted();
        Self {
            batch_id: outcome.batch_id.to_string(),
            status: outcome.status,
            requested: outcome.requested,
            accepted,
            attempts: outcome.attempts,
            stop_reason: outcome.stop_reason,
            failures: outcome.failures,
            elapsed_ms: outcome.elapsed_ms,
            // Agents written to a file are not echoed
            agents: if output_file.is_some() { Vec::new() } else { outcome.agents },
            output_file,
            committed,
        }
    }
}

impl CommandOutput for GenerateOutput {
    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self.agents.clone();
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!(
            "Batch {}: {} ({}/{} agents, {} attempts, {} ms)",
            &self.batch_id[..8],
            self.status,
            self.accepted,
            self.requested,
            self.attempts,
            self.elapsed_ms
        ));
        lines.push(format!("Stopped: {}", self.stop_reason));
        if self.failures.total() > 0 {
            lines.push(format!(
                "Rejected attempts: {} duplicate, {} exhausted, {} missing configuration",
                self.failures.duplicates, self.failures.exhausted, self.failures.configuration_missing
            ));
        }
        if let Some(path) = &self.output_file {
            lines.push(format!("Agents written to {}", path.display()));
        }
        if let Some(summary) = &self.committed {
            lines.push(format!(
                "Committed {} unique agent(s) to the blacklist in {} chunk(s)",
                summary.unique, summary.chunks
            ));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: GenerateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut request = GenerationRequest::new(args.platform, args.app_type, args.quantity);
    if let Some(device) = &args.device {
        request = request.with_device(device.clone());
    }
    if let Some(seed) = args.seed {
        request = request.with_seed(seed);
    }

    let store = open_pool_store(config).await?;
    let engine = GenerationEngine::new(store, config.generation.clone());
    engine.validate(&request)?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling batch");
            signal_token.cancel();
        }
    });

    let bar = (!json_mode).then(|| create_progress_bar(request.quantity as u64));
    let outcome = engine
        .generate(request, &cancel, |progress| {
            if let Some(bar) = &bar {
                bar.show_batch(&progress);
            }
        })
        .await;
    signal_task.abort();
    let outcome = outcome?;

    if let Some(bar) = &bar {
        let summary = format!("{} ({}/{})", outcome.status, outcome.accepted(), outcome.requested);
        match outcome.status {
            BatchStatus::Completed => bar.finish_success(summary),
            BatchStatus::PartiallyCompleted => bar.finish_warning(summary),
            _ => bar.finish_error(summary),
        }
    }

    if let Some(path) = &args.output {
        if !outcome.agents.is_empty() {
            let mut body = outcome.agents.join("\n");
            body.push('\n');
            tokio::fs::write(path, body)
                .await
                .with_context(|| format!("Failed to write agents to {}", path.display()))?;
        }
    }

    let committed = if args.commit && !outcome.agents.is_empty() {
        let attribution = args
            .attribution
            .clone()
            .unwrap_or_else(|| config.blacklist.default_attribution.clone());
        let repository = Arc::new(SqliteBlacklistRepository::new(open_database(config).await?));
        let service = BlacklistService::with_chunk_size(repository, config.blacklist.chunk_size);
        let summary = service.commit(&outcome.agents, args.app_type, &attribution).await?;
        info!(unique = summary.unique, "batch committed to blacklist");
        Some(summary)
    } else {
        None
    };

    let status = outcome.status;
    let last_error = outcome.failures.last_error.clone();
    output(&GenerateOutput::new(outcome, args.output, committed), json_mode);

    match status {
        BatchStatus::Failed => bail!(
            "Batch failed: {}",
            last_error.unwrap_or_else(|| "no agent could be produced".to_string())
        ),
        BatchStatus::Cancelled => bail!("Batch cancelled; no agents were kept"),
        _ => Ok(()),
    }
}
