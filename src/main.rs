use clap::Parser;
use osz_extract::{Cli, OszError, OszExtract, OutputFormatter, OutputMode, UserFriendlyError};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level(), cli.quiet);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let app = match OszExtract::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if app.is_first_run() {
        return handle_first_run(&app);
    }

    if cli.dry_run {
        return handle_dry_run(&app);
    }

    // Per-archive failures are part of a normal run and still exit 0.
    match app.process() {
        Ok(_) => 0,
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn handle_first_run(app: &OszExtract) -> i32 {
    match app.bootstrap_directories() {
        Ok((input, output)) => {
            app.output_formatter().print_first_run(&input, &output);
            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn handle_dry_run(app: &OszExtract) -> i32 {
    match app.plan() {
        Ok(archives) => {
            app.output_formatter()
                .print_dry_run(&archives, &app.config().paths.output_dir);
            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "osz-extract.toml".to_string());

    match OszExtract::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  osz-extract --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn exit_code_for(error: &OszError) -> i32 {
    match error {
        OszError::Config { .. } => 2,
        OszError::Permission { .. } => 3,
        _ => 1,
    }
}

fn print_startup_error(error: &OszError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "osz_extract=info",
        (false, 2) => "osz_extract=debug",
        _ => "osz_extract=trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
