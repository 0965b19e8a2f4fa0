//! Command-line interface for uaforge.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

// Re-export commonly used items
pub use output::progress::{create_progress_bar, create_spinner, ProgressBarExt};

/// Print `err` on stderr (as JSON when asked) and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1)
}
