//! CLI type definitions
//!
//! Top-level clap structures. Each subcommand's arguments live next to its
//! implementation under `commands`.

use clap::{Parser, Subcommand};

use super::commands::blacklist::BlacklistArgs;
use super::commands::generate::GenerateArgs;
use super::commands::init::InitArgs;
use super::commands::pools::PoolsArgs;

#[derive(Parser, Debug)]
#[command(name = "uaforge")]
#[command(about = "uaforge - User-agent generation engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration, database and component pools
    Init(InitArgs),

    /// Generate a batch of user agents
    Generate(GenerateArgs),

    /// Inspect and manage component pools
    Pools(PoolsArgs),

    /// Inspect and manage the persistent blacklist
    Blacklist(BlacklistArgs),
}
