use crate::extractor::ProcessEvent;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const ARCHIVE_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {pos} archives {msg}";
const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    /// Spinner counting archives; the total is unknown while the walk runs.
    pub fn create_archive_progress(&self) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::with_template(ARCHIVE_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(SPINNER_TICKS),
        );
        pb.set_message("Scanning...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

pub fn update_archive_progress(pb: &ProgressBar, event: &ProcessEvent) {
    if let ProcessEvent::ArchiveStarted { archive, index } = event {
        pb.set_position(*index as u64);
        pb.set_message(archive.filename.clone());
    }
}

pub fn finish_progress(pb: &ProgressBar, total: usize) {
    pb.finish_and_clear();
    tracing::debug!(total, "progress finished");
}
