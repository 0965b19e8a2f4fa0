//! Progress bar utilities using indicatif.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::domain::models::BatchProgress;

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg} (ETA: {eta})";
const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";

const PROGRESS_CHARS: &str = "█▓▒░ ";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard progress bar with ETA, drawn on stderr.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .map(|s| s.progress_chars(PROGRESS_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner for operations without a known length.
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .map(|s| s.tick_chars(SPINNER_CHARS))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    fn finish_success(&self, message: impl Into<String>);

    fn finish_error(&self, message: impl Into<String>);

    fn finish_warning(&self, message: impl Into<String>);

    /// Mirror a batch progress event.
    fn show_batch(&self, progress: &BatchProgress);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✗ {}", message.into()));
    }

    fn finish_warning(&self, message: impl Into<String>) {
        self.finish_with_message(format!("! {}", message.into()));
    }

    fn show_batch(&self, progress: &BatchProgress) {
        self.set_position(progress.accepted as u64);
        self.set_message(format!(
            "{} attempts, {:.1}% accepted",
            progress.attempts,
            progress.success_rate * 100.0
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_batch_tracks_accepted() {
        let pb = create_progress_bar(10);
        pb.show_batch(&BatchProgress::new(4, 10, 8));
        assert_eq!(pb.position(), 4);
        assert_eq!(pb.length(), Some(10));
        assert!(pb.message().contains("8 attempts"));
        pb.finish_success("done");
        assert!(pb.is_finished());
    }

    #[test]
    fn test_spinner_message() {
        let spinner = create_spinner("Importing");
        assert_eq!(spinner.message(), "Importing");
        spinner.finish_and_clear();
    }
}
