//! Scenario catalogue commands

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use booking_driver::app::wait_for_app;
use booking_driver::mock::MockFactory;
use booking_driver::playwright::PlaywrightFactory;
use booking_driver::runner::SuiteResult;
use booking_driver::scenarios::Scenario;
use booking_driver::{ScenarioRunner, SurfaceFactory};

use super::{load_config, mock_wizard, TargetArgs};
use crate::output::{print_list, print_suite, OutputFormat, ScenarioDisplay};

#[derive(Args)]
pub struct ScenariosArgs {
    /// Only run scenarios carrying this tag (smoke, navigation, form, flow, validation)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Only run the named scenario (see `list`)
    #[arg(short, long, conflicts_with = "tag")]
    pub scenario: Option<String>,

    /// Directory receiving scenario-results.json
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(args: ScenariosArgs, target: &TargetArgs, format: OutputFormat) -> Result<bool> {
    let config = load_config(target)?;

    let suite = if target.mock {
        let factory = MockFactory::new(mock_wizard(&config));
        run_suite(ScenarioRunner::new(factory, config)?, &args).await?
    } else {
        let timeout = Duration::from_millis(config.app_startup_timeout_ms);
        wait_for_app(&config.base_url, timeout).await?;
        let factory = PlaywrightFactory::new(config.base_url.clone(), config.browser.clone());
        run_suite(ScenarioRunner::new(factory, config)?, &args).await?
    };

    print_suite(&suite, format);
    Ok(suite.success())
}

async fn run_suite<F: SurfaceFactory>(
    runner: ScenarioRunner<F>,
    args: &ScenariosArgs,
) -> Result<SuiteResult> {
    let runner = match &args.output {
        Some(dir) => runner.with_output_dir(dir),
        None => runner,
    };

    let suite = match (&args.scenario, &args.tag) {
        (Some(name), _) => {
            let result = runner.run_named(name).await?;
            let duration_ms = result.duration_ms;
            SuiteResult::from_results(vec![result], duration_ms)
        }
        (None, Some(tag)) => runner.run_tagged(tag).await,
        (None, None) => runner.run_all().await,
    };

    runner.write_results(&suite)?;
    Ok(suite)
}

/// Print the catalogue
pub fn list(format: OutputFormat) {
    let scenarios: Vec<ScenarioDisplay> = Scenario::ALL.into_iter().map(ScenarioDisplay::from).collect();
    print_list(&scenarios, format);
}
