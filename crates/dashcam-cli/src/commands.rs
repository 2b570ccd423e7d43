//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Dashcam: scripted demo videos and screenshots of the classroom dashboard
#[derive(Parser, Debug)]
#[command(name = "dashcam")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Capture configuration file (YAML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record feature videos into the video directory
    Record(RecordArgs),

    /// Capture front/settings comparison screenshots of widgets
    Comparisons(ComparisonsArgs),

    /// Record the live-session demo video
    Demo(DemoArgs),

    /// Run verification checks and save their screenshots
    Verify(VerifyArgs),

    /// List every suite and its scenario names
    List,
}

/// Browser and document options shared by capture commands
#[derive(Args, Debug, Clone, Default)]
pub struct BrowserArgs {
    /// Front-end document to load
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the Chromium sandbox (needed in most containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium executable
    #[arg(long, env = "CHROMIUM_PATH", value_name = "PATH")]
    pub chrome: Option<PathBuf>,
}

/// Arguments for the record command
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Scenarios to record (all when omitted)
    pub names: Vec<String>,

    /// Recording frame rate
    #[arg(long)]
    pub fps: Option<u8>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Arguments for the comparisons command
#[derive(Parser, Debug)]
pub struct ComparisonsArgs {
    /// Widget types to capture (all when omitted)
    pub widgets: Vec<String>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Arguments for the demo command
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Session code replied by the stubbed backend
    #[arg(long)]
    pub session_code: Option<String>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Checks to run (all when omitted)
    pub checks: Vec<String>,

    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_record_without_names() {
            let cli = Cli::parse_from(["dashcam", "record"]);
            if let Commands::Record(args) = cli.command {
                assert!(args.names.is_empty());
                assert!(!args.browser.headed);
            } else {
                panic!("expected Record command");
            }
        }

        #[test]
        fn test_parse_record_with_names() {
            let cli = Cli::parse_from(["dashcam", "record", "clock", "dice", "--fps", "30"]);
            if let Commands::Record(args) = cli.command {
                assert_eq!(args.names, vec!["clock", "dice"]);
                assert_eq!(args.fps, Some(30));
            } else {
                panic!("expected Record command");
            }
        }

        #[test]
        fn test_parse_comparisons() {
            let cli = Cli::parse_from(["dashcam", "comparisons", "qr", "--no-sandbox"]);
            if let Commands::Comparisons(args) = cli.command {
                assert_eq!(args.widgets, vec!["qr"]);
                assert!(args.browser.no_sandbox);
            } else {
                panic!("expected Comparisons command");
            }
        }

        #[test]
        fn test_parse_demo_session_code() {
            let cli = Cli::parse_from(["dashcam", "demo", "--session-code", "ABC123"]);
            if let Commands::Demo(args) = cli.command {
                assert_eq!(args.session_code.as_deref(), Some("ABC123"));
            } else {
                panic!("expected Demo command");
            }
        }

        #[test]
        fn test_parse_verify_with_html() {
            let cli =
                Cli::parse_from(["dashcam", "verify", "watermark", "--html", "app/index.html"]);
            if let Commands::Verify(args) = cli.command {
                assert_eq!(args.checks, vec!["watermark"]);
                assert_eq!(args.browser.html, Some(PathBuf::from("app/index.html")));
            } else {
                panic!("expected Verify command");
            }
        }

        #[test]
        fn test_parse_list() {
            let cli = Cli::parse_from(["dashcam", "list"]);
            assert!(matches!(cli.command, Commands::List));
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::parse_from([
                "dashcam", "-vv", "--color", "never", "--config", "dashcam.yaml", "list",
            ]);
            assert_eq!(cli.verbose, 2);
            assert!(matches!(cli.color, ColorArg::Never));
            assert_eq!(cli.config, Some(PathBuf::from("dashcam.yaml")));
        }

        #[test]
        fn test_quiet_after_subcommand() {
            let cli = Cli::parse_from(["dashcam", "record", "-q"]);
            assert!(cli.quiet);
        }
    }
}
