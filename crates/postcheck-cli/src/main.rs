//! Postcheck CLI: run the post verification scenario against a live CMS
//!
//! ## Usage
//!
//! ```bash
//! export APP_USERNAME=editor APP_PASSWORD=... APP_BASE_URL=https://cms.example
//! postcheck run --generate
//! postcheck run --title "Alpha Post" --summary "Alpha summary." --body "Alpha body text."
//! postcheck run --generate --strategy title --config postcheck.yaml -v
//! ```

use clap::Parser;
use postcheck::Credentials;
use postcheck_cli::{
    logging, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, Reporter, RunArgs,
    RunPlan, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match run(cli, config, &reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Scenario(failure)) => {
            reporter.failed(&failure);
            ExitCode::FAILURE
        }
        Err(e) => {
            reporter.failure(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
}

fn run(cli: Cli, config: CliConfig, reporter: &Reporter) -> CliResult<()> {
    logging::init(config.verbosity, config.color.should_color())?;

    match cli.command {
        Commands::Run(args) => run_scenario(&args, reporter),
    }
}

fn run_scenario(args: &RunArgs, reporter: &Reporter) -> CliResult<()> {
    // Checked before anything is launched
    let credentials = Credentials::from_env()?;
    let plan = RunPlan::from_args(args)?;
    reporter.info(&format!(
        "creating {:?} on {}",
        plan.draft.title(),
        credentials.base_url()
    ));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(drive(credentials, &plan))?;
    reporter.verified(&report);
    Ok(())
}

#[cfg(feature = "browser")]
async fn drive(
    credentials: Credentials,
    plan: &RunPlan,
) -> CliResult<postcheck::VerificationReport> {
    let driver = postcheck::CdpDriver::launch(&plan.config.browser).await?;
    let outcome = postcheck_cli::execute(&driver, credentials, plan).await;
    if let Err(e) = driver.close().await {
        tracing::warn!(error = %e, "browser did not close cleanly");
    }
    Ok(outcome?)
}

#[cfg(not(feature = "browser"))]
async fn drive(
    _credentials: Credentials,
    _plan: &RunPlan,
) -> CliResult<postcheck::VerificationReport> {
    Err(CliError::config(
        "postcheck was built without the `browser` feature; rebuild with --features browser",
    ))
}
