//! Dashcam CLI: scripted demo recordings of the classroom dashboard
//!
//! ## Usage
//!
//! ```bash
//! dashcam record                  # Record every feature video
//! dashcam record clock dice       # Record selected scenarios
//! dashcam comparisons qr          # Front/settings comparison shots
//! dashcam demo                    # Live-session demo video
//! dashcam verify                  # Verification screenshots
//! dashcam list                    # Show every suite's scenarios
//! ```

use clap::Parser;
use dashcam_cli::{handlers, logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    logging::init(&config);

    let capture = handlers::load_capture_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Record(args) => handlers::execute_record(&config, capture, &args),
        Commands::Comparisons(args) => handlers::execute_comparisons(&config, capture, &args),
        Commands::Demo(args) => handlers::execute_demo(&config, capture, &args),
        Commands::Verify(args) => handlers::execute_verify(&config, capture, &args),
        Commands::List => handlers::execute_list(&config, &capture),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(color)
}
