use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "osz-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract audio from osu! .osz beatmap archives")]
#[command(
    long_about = "osz-extract scans a folder tree for .osz beatmap archives, pulls out their \
                  .mp3 tracks and stores them flat in an output folder, each one named after \
                  the archive it came from."
)]
#[command(after_help = "EXAMPLES:\n  \
    osz-extract\n  \
    osz-extract -i ~/Downloads/beatmaps -o ~/Music/osu\n  \
    osz-extract --dry-run --output-format plain\n  \
    osz-extract --generate-config --config osz-extract.toml")]
pub struct Cli {
    /// Folder containing .osz files
    #[arg(short, long, value_name = "DIR", help = "Folder with .osz files (default: 'input')")]
    pub input: Option<PathBuf>,

    /// Folder for extracted audio
    #[arg(short, long, value_name = "DIR", help = "Folder for extracted audio (default: 'output')")]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Directories to skip while scanning
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Maximum directory depth to scan
    #[arg(long, help = "Maximum folder depth to scan below the input folder")]
    pub max_depth: Option<usize>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "List the archives that would be processed without extracting")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_input_dir(self.input.clone())
            .with_output_dir(self.output.clone())
            .with_exclude(self.exclude.clone())
            .with_max_depth(self.max_depth)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["osz-extract"]).unwrap();
        assert!(cli.input.is_none());
        assert!(cli.output.is_none());
        assert!(!cli.dry_run);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_directory_flags() {
        let cli = Cli::try_parse_from(["osz-extract", "-i", "maps", "--output", "music"]).unwrap();
        let overrides = cli.create_cli_overrides();

        assert_eq!(overrides.input_dir, Some(PathBuf::from("maps")));
        assert_eq!(overrides.output_dir, Some(PathBuf::from("music")));
    }

    #[test]
    fn test_exclude_list_parsing() {
        let cli = Cli::try_parse_from(["osz-extract", "--exclude", "old,broken"]).unwrap();
        assert_eq!(
            cli.exclude,
            Some(vec!["old".to_string(), "broken".to_string()])
        );
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["osz-extract", "-q", "-v"]).is_err());

        let cli = Cli::try_parse_from(["osz-extract", "-vv"]).unwrap();
        assert_eq!(cli.verbosity_level(), 2);
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let cli = Cli::try_parse_from(["osz-extract", "-i", "maps", "--max-depth", "3"]).unwrap();
        let config = cli.load_config().unwrap();

        assert_eq!(config.paths.input_dir, PathBuf::from("maps"));
        assert_eq!(config.scan.max_depth, Some(3));
    }

    #[test]
    fn test_invalid_depth_rejected() {
        let cli = Cli::try_parse_from(["osz-extract", "--max-depth", "0"]).unwrap();
        assert!(cli.load_config().is_err());
    }
}
