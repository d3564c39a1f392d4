pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, PathConfig, ScanConfig};
pub use error::{OszError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    ArchiveFailure, ArchiveOutcome, AudioExtractor, FolderProcessor, ProcessEvent, ProcessSummary,
};
pub use scanner::{ArchiveFile, ArchiveScanner, FileFilter};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use std::fs;
use std::path::{Path, PathBuf};

/// Main library interface for osz-extract functionality
pub struct OszExtract {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl OszExtract {
    /// Create a new instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet))
    }

    /// A run is the first one when the input directory does not exist yet.
    pub fn is_first_run(&self) -> bool {
        !self.config.paths.input_dir.exists()
    }

    /// Create the input and output directories, returning their absolute paths.
    pub fn bootstrap_directories(&self) -> Result<(PathBuf, PathBuf)> {
        let input = &self.config.paths.input_dir;
        let output = &self.config.paths.output_dir;

        fs::create_dir_all(input)?;
        extractor::ensure_output_dir(output)?;

        Ok((absolute(input)?, absolute(output)?))
    }

    /// Extract audio from every archive in the configured input folder
    pub fn process(&self) -> Result<ProcessSummary> {
        let input = &self.config.paths.input_dir;
        let output = &self.config.paths.output_dir;

        self.output_formatter.start_operation(&format!(
            "Extracting audio from {} into {}",
            input.display(),
            output.display()
        ));
        self.output_formatter.info(&match self.config.scan.max_depth {
            Some(depth) => format!("Scanning up to {} folder levels deep", depth),
            None => "Scanning all subfolders".to_string(),
        });

        let processor = FolderProcessor::new(&self.config.scan);
        let progress_bar = self.progress_manager.create_archive_progress();
        let printer =
            ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));

        let on_event = |event: &ProcessEvent| {
            ui::progress::update_archive_progress(&progress_bar, event);
            printer.event(event);
        };

        let result = processor.process_with(input, output, Some(&on_event));
        ui::progress::finish_progress(
            &progress_bar,
            result.as_ref().map(|s| s.total).unwrap_or(0),
        );
        let summary = result?;

        if summary.skipped_entries > 0 {
            self.output_formatter.warning(&format!(
                "{} folder entries could not be read and were skipped",
                summary.skipped_entries
            ));
        }

        self.output_formatter.print_process_summary(&summary);

        Ok(summary)
    }

    /// List the archives a run would process
    pub fn plan(&self) -> Result<Vec<ArchiveFile>> {
        let processor = FolderProcessor::new(&self.config.scan);
        let archives = processor.plan(&self.config.paths.input_dir)?;

        let stats = processor.scanner().get_statistics(&archives);
        self.output_formatter.debug(&stats.display_summary());

        Ok(archives)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &OszError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::test_support::write_osz;
    use tempfile::TempDir;

    fn config_for(root: &Path) -> Config {
        let mut config = Config::default();
        config.paths.input_dir = root.join("input");
        config.paths.output_dir = root.join("output");
        config
    }

    #[test]
    fn test_first_run_bootstrap() {
        let temp_dir = TempDir::new().unwrap();
        let app = OszExtract::new(config_for(temp_dir.path()), OutputMode::Plain, 0, true);

        assert!(app.is_first_run());
        let (input, output) = app.bootstrap_directories().unwrap();

        assert!(input.is_absolute() && input.is_dir());
        assert!(output.is_absolute() && output.is_dir());
        assert!(!app.is_first_run());
    }

    #[test]
    fn test_process_reports_counts() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path());
        fs::create_dir(&config.paths.input_dir).unwrap();
        write_osz(&config.paths.input_dir.join("song1.osz"), &[("audio.mp3", "a")]);
        write_osz(&config.paths.input_dir.join("song2.osz"), &[("bg.png", "b")]);

        let app = OszExtract::new(config, OutputMode::Plain, 0, true);
        let summary = app.process().unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.successful, 1);
        assert!(app.config().paths.output_dir.join("song1.mp3").exists());
    }

    #[test]
    fn test_plan_does_not_create_output() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path());
        fs::create_dir(&config.paths.input_dir).unwrap();
        write_osz(&config.paths.input_dir.join("song.osz"), &[("audio.mp3", "a")]);

        let app = OszExtract::new(config, OutputMode::Plain, 0, true);
        let archives = app.plan().unwrap();

        assert_eq!(archives.len(), 1);
        assert!(!app.config().paths.output_dir.exists());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        OszExtract::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[paths]"));
        assert!(content.contains("[scan]"));
    }
}
