//! Component pool CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::adapters::catalog::{read_catalog, YamlPoolStore};
use crate::adapters::sqlite::SqlitePoolStore;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::create_spinner;
use crate::domain::models::{AppType, CatalogSummary, ComponentPools, Config, Platform, PoolCatalog};

use super::{open_database, open_pool_store};

#[derive(Args, Debug)]
pub struct PoolsArgs {
    #[command(subcommand)]
    pub command: PoolsCommands,
}

#[derive(Subcommand, Debug)]
pub enum PoolsCommands {
    /// Replace the stored pools with a YAML catalog
    Import {
        /// Catalog file
        file: PathBuf,
    },
    /// Show the pools a (platform, app type) batch would use
    Show {
        #[arg(short, long)]
        platform: Platform,

        #[arg(short, long)]
        app_type: AppType,
    },
    /// Write the current catalog as YAML
    Export {
        /// Destination file (stdout when omitted)
        file: Option<PathBuf>,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ImportOutput {
    pub source: PathBuf,
    pub summary: CatalogSummary,
}

impl CommandOutput for ImportOutput {
    fn to_human(&self) -> String {
        format!(
            "Imported {} pool rows from {}\n{}",
            self.summary.total(),
            self.source.display(),
            TableFormatter::new().format_catalog_summary(&self.summary)
        )
    }
}

#[derive(Debug, serde::Serialize)]
pub struct PoolsShowOutput {
    pub pools: ComponentPools,
}

impl CommandOutput for PoolsShowOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut out = format!("Pools for {} / {}\n", self.pools.platform, self.pools.app_type);
        out.push_str(&formatter.format_pool_counts(&self.pools));
        if !self.pools.device_models.is_empty() {
            out.push_str("\n\nDevice models:\n");
            out.push_str(&formatter.format_devices(&self.pools));
        }
        out
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ExportOutput {
    pub destination: PathBuf,
    pub summary: CatalogSummary,
}

impl CommandOutput for ExportOutput {
    fn to_human(&self) -> String {
        format!(
            "Exported {} pool rows to {}",
            self.summary.total(),
            self.destination.display()
        )
    }
}

pub async fn execute(args: PoolsArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        PoolsCommands::Import { file } => {
            let catalog = read_catalog(&file).await?;
            let store = SqlitePoolStore::new(open_database(config).await?);
            let spinner = (!json_mode).then(|| create_spinner(format!("Importing {}", file.display())));
            let imported = store.import_catalog(&catalog).await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            let summary = imported?;
            output(&ImportOutput { source: file, summary }, json_mode);
        }
        PoolsCommands::Show { platform, app_type } => {
            let store = open_pool_store(config).await?;
            let pools = store.load_pools(platform, app_type).await?;
            output(&PoolsShowOutput { pools }, json_mode);
        }
        PoolsCommands::Export { file } => {
            let catalog = current_catalog(config).await?;
            let yaml = serde_yaml::to_string(&catalog).context("Failed to serialize catalog")?;
            match file {
                Some(path) => {
                    tokio::fs::write(&path, yaml)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    output(
                        &ExportOutput {
                            destination: path,
                            summary: catalog.summary(),
                        },
                        json_mode,
                    );
                }
                None => print!("{yaml}"),
            }
        }
    }
    Ok(())
}

async fn current_catalog(config: &Config) -> Result<PoolCatalog> {
    if config.pools.source == "yaml" {
        let store = match &config.pools.catalog_path {
            Some(path) => YamlPoolStore::open(path.clone()).await?,
            None => YamlPoolStore::bundled()?,
        };
        return Ok(store.catalog().clone());
    }
    let store = SqlitePoolStore::new(open_database(config).await?);
    Ok(store.export_catalog().await?)
}
