//! Implementation of the `uaforge init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

use crate::adapters::catalog::{default_catalog, read_catalog};
use crate::adapters::sqlite::{initialize_database, SqlitePoolStore};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::CatalogSummary;
use crate::infrastructure::config::{ConfigLoader, CONFIG_DIR};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,

    /// Catalog file to import instead of the bundled pools
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub directories_created: Vec<String>,
    pub database_initialized: bool,
    pub catalog_source: String,
    pub pools_imported: Option<CatalogSummary>,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.directories_created.is_empty() {
            lines.push("\nCreated directories:".to_string());
            for dir in &self.directories_created {
                lines.push(format!("  - {dir}"));
            }
        }
        if self.database_initialized {
            lines.push(format!("\nDatabase initialized at {CONFIG_DIR}/uaforge.db"));
        }
        if let Some(summary) = &self.pools_imported {
            lines.push(format!(
                "Imported {} pool rows from {} ({} device models)",
                summary.total(),
                self.catalog_source,
                summary.device_models
            ));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir().context("Failed to get current directory")?.join(&args.path)
    };

    let config_dir = target_path.join(CONFIG_DIR);

    if config_dir.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to reinitialize.".to_string(),
            initialized_path: target_path,
            directories_created: vec![],
            database_initialized: false,
            catalog_source: String::new(),
            pools_imported: None,
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    // Read the catalog before touching the filesystem so a bad file leaves nothing behind
    let (catalog, catalog_source) = match &args.catalog {
        Some(path) => (read_catalog(path).await?, path.display().to_string()),
        None => (default_catalog()?, "bundled catalog".to_string()),
    };

    if args.force && config_dir.exists() {
        fs::remove_dir_all(&config_dir)
            .await
            .with_context(|| format!("Failed to remove existing {CONFIG_DIR} directory"))?;
    }

    let mut directories_created = vec![];
    for dir in [config_dir.clone(), config_dir.join("logs")] {
        if !dir.exists() {
            fs::create_dir_all(&dir).await.with_context(|| format!("Failed to create {}", dir.display()))?;
            let relative = dir.strip_prefix(&target_path).unwrap_or(&dir).to_string_lossy().to_string();
            directories_created.push(relative);
        }
    }

    let config_yaml = ConfigLoader::default_yaml()?;
    fs::write(config_dir.join("config.yaml"), config_yaml)
        .await
        .context("Failed to write config.yaml")?;

    let db_url = format!("sqlite:{}", config_dir.join("uaforge.db").display());
    let pool = initialize_database(&db_url, None).await.context("Failed to initialize database")?;
    let summary = SqlitePoolStore::new(pool.clone()).import_catalog(&catalog).await?;
    pool.close().await;
    info!(source = %catalog_source, rows = summary.total(), "component pools imported");

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path,
        directories_created,
        database_initialized: true,
        catalog_source,
        pools_imported: Some(summary),
    };

    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_project_layout() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            force: false,
            catalog: None,
            path: dir.path().to_path_buf(),
        };
        execute(args, true).await.unwrap();

        let config_dir = dir.path().join(CONFIG_DIR);
        assert!(config_dir.join("config.yaml").exists());
        assert!(config_dir.join("logs").is_dir());
        assert!(config_dir.join("uaforge.db").exists());

        let config = ConfigLoader::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.pools.source, "sqlite");
    }

    #[tokio::test]
    async fn test_init_rejects_bad_catalog_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("broken.yaml");
        std::fs::write(&catalog, "android: 42\n").unwrap();

        let args = InitArgs {
            force: false,
            catalog: Some(catalog),
            path: dir.path().to_path_buf(),
        };
        assert!(execute(args, true).await.is_err());
        assert!(!dir.path().join(CONFIG_DIR).exists());
    }
}
