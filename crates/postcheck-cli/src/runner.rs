//! Scenario runner: turns `run` arguments into a draft and a config, then
//! drives one scenario against a driver.

use postcheck::{
    Credentials, DraftGenerator, PostDraft, Scenario, ScenarioConfig, ScenarioFailure, UiDriver,
    VerificationReport,
};

use crate::commands::RunArgs;
use crate::error::{CliError, CliResult};

/// Everything a run needs besides credentials and a driver
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Draft to submit
    pub draft: PostDraft,
    /// Scenario settings
    pub config: ScenarioConfig,
}

impl RunPlan {
    /// Merge the optional scenario file with command-line overrides
    pub fn from_args(args: &RunArgs) -> CliResult<Self> {
        let mut config = match &args.config {
            Some(path) => ScenarioConfig::load(path)?,
            None => ScenarioConfig::default(),
        };
        if let Some(image) = &args.image {
            config.image_path.clone_from(image);
        }
        if let Some(strategy) = args.strategy {
            config.strategy = strategy.into();
        }
        if args.headed {
            config.browser.headless = false;
        }
        if let Some(path) = &args.chromium_path {
            config.browser.chromium_path = Some(path.clone());
        }
        if args.no_sandbox {
            config.browser.sandbox = false;
        }

        let draft = if args.generate {
            DraftGenerator::new(config.image_path.clone()).generate()
        } else {
            match (&args.title, &args.summary, &args.body) {
                (Some(title), Some(summary), Some(body)) => {
                    PostDraft::new(title, summary, body, config.image_path.clone())
                }
                _ => {
                    return Err(CliError::invalid_argument(
                        "give --title, --summary and --body together, or --generate",
                    ))
                }
            }
        };

        Ok(Self { draft, config })
    }
}

/// Drive one scenario to a verdict
pub async fn execute<D: UiDriver + ?Sized>(
    driver: &D,
    credentials: Credentials,
    plan: &RunPlan,
) -> Result<VerificationReport, ScenarioFailure> {
    Scenario::new(driver, credentials, plan.draft.clone(), &plan.config)
        .run()
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;
    use postcheck::LocateStrategy;
    use std::io::Write;
    use std::path::Path;

    fn run_args(args: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(
            ["postcheck", "run"].into_iter().chain(args.iter().copied()),
        )
        .unwrap();
        match cli.command {
            Commands::Run(args) => args,
        }
    }

    #[test]
    fn test_literal_draft_uses_image_override() {
        let plan = RunPlan::from_args(&run_args(&[
            "--title",
            "Alpha Post",
            "--summary",
            "Alpha summary.",
            "--body",
            "Alpha body text.",
            "--image",
            "/srv/dog.png",
        ]))
        .unwrap();
        assert_eq!(plan.draft.title(), "Alpha Post");
        assert_eq!(plan.draft.image_path(), Path::new("/srv/dog.png"));
        assert_eq!(plan.config.strategy, LocateStrategy::CorrelationKey);
    }

    #[test]
    fn test_generate_flag_builds_draft() {
        let plan = RunPlan::from_args(&run_args(&["--generate"])).unwrap();
        assert!(!plan.draft.title().is_empty());
        assert!(plan.config.browser.headless);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "strategy: correlation_key\nbrowser:\n  sandbox: true").unwrap();
        let path = file.path().display().to_string();
        let plan = RunPlan::from_args(&run_args(&[
            "--generate",
            "--config",
            &path,
            "--strategy",
            "title",
            "--no-sandbox",
            "--headed",
        ]))
        .unwrap();
        assert_eq!(plan.config.strategy, LocateStrategy::Title);
        assert!(!plan.config.browser.sandbox);
        assert!(!plan.config.browser.headless);
    }

    #[test]
    fn test_missing_config_file() {
        let err = RunPlan::from_args(&run_args(&[
            "--generate",
            "--config",
            "/nonexistent/postcheck.yaml",
        ]))
        .unwrap_err();
        assert!(matches!(err, CliError::Check(_)));
    }
}
