//! CLI command definitions using clap

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use postcheck::LocateStrategy;
use std::path::PathBuf;

use crate::config::ColorChoice;

/// Postcheck: create a CMS post through its web UI and verify it end to end
#[derive(Parser, Debug)]
#[command(name = "postcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors and the final verdict only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in, create and publish a post, then find and verify it.
    ///
    /// Credentials come from APP_USERNAME, APP_PASSWORD and APP_BASE_URL.
    Run(RunArgs),
}

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("draft").required(true).args(["title", "generate"])))]
pub struct RunArgs {
    /// Post title
    #[arg(long, requires_all = ["summary", "body"])]
    pub title: Option<String>,

    /// Post summary
    #[arg(long, requires = "title")]
    pub summary: Option<String>,

    /// Post body
    #[arg(long, requires = "title")]
    pub body: Option<String>,

    /// Generate a unique draft instead of giving title, summary and body
    #[arg(long)]
    pub generate: bool,

    /// Image to attach
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// How to find the post in the listing
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// YAML scenario file (wait bounds, image, strategy, browser)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium binary
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium_path: Option<String>,

    /// Disable the chromium sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,
}

/// Lookup strategy argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// Match the image `src` captured from the form
    Image,
    /// Match the heading text (legacy)
    Title,
}

impl From<StrategyArg> for LocateStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Image => Self::CorrelationKey,
            StrategyArg::Title => Self::Title,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorArg {
    /// Detect from the terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
