//! Scenario runner: one fresh session per scenario, results collected into a suite

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::DriverConfig;
use crate::driver::Driver;
use crate::error::{DriverError, DriverResult};
use crate::form::ClientContactData;
use crate::scenarios::{Scenario, ScenarioContext, Verdict};
use crate::surface::SurfaceFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
    /// Failure or skip reason
    pub error: Option<String>,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Result of running a set of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    /// Tally outcomes of already-run scenarios
    pub fn from_results(results: Vec<ScenarioResult>, duration_ms: u64) -> Self {
        let count = |o: Outcome| results.iter().filter(|r| r.outcome == o).count();
        Self {
            total: results.len(),
            passed: count(Outcome::Passed),
            failed: count(Outcome::Failed),
            skipped: count(Outcome::Skipped),
            duration_ms,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs scenarios against sessions produced by a [`SurfaceFactory`]
pub struct ScenarioRunner<F> {
    factory: F,
    config: DriverConfig,
    context: ScenarioContext,
    output_dir: PathBuf,
}

impl<F: SurfaceFactory> ScenarioRunner<F> {
    pub fn new(factory: F, config: DriverConfig) -> DriverResult<Self> {
        config.validate()?;
        let context = ScenarioContext {
            tenant: config.tenant.clone(),
            contact: ClientContactData::try_from(&config.contact)?,
        };
        Ok(Self {
            factory,
            config,
            context,
            output_dir: PathBuf::from("test-results"),
        })
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Run every scenario of the catalogue
    pub async fn run_all(&self) -> SuiteResult {
        self.run_scenarios(&Scenario::ALL).await
    }

    /// Run scenarios carrying `tag`
    pub async fn run_tagged(&self, tag: &str) -> SuiteResult {
        let selected: Vec<Scenario> = Scenario::ALL
            .into_iter()
            .filter(|s| s.has_tag(tag))
            .collect();
        self.run_scenarios(&selected).await
    }

    /// Run a specific scenario by name
    pub async fn run_named(&self, name: &str) -> DriverResult<ScenarioResult> {
        let scenario =
            Scenario::from_name(name).ok_or_else(|| DriverError::ScenarioNotFound(name.to_string()))?;
        Ok(self.run_scenario(scenario).await)
    }

    /// Run a list of scenarios in order; failures do not stop the suite
    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> SuiteResult {
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(*scenario).await;
            match result.outcome {
                Outcome::Passed => info!("✓ {} ({} ms)", result.name, result.duration_ms),
                Outcome::Skipped => warn!(
                    "- {} skipped: {}",
                    result.name,
                    result.error.as_deref().unwrap_or("no reason given")
                ),
                Outcome::Failed => error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                ),
            }
            results.push(result);
        }

        let suite = SuiteResult::from_results(results, start.elapsed().as_millis() as u64);

        info!(
            "Scenario results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );
        suite
    }

    /// Run one scenario on a fresh session
    pub async fn run_scenario(&self, scenario: Scenario) -> ScenarioResult {
        let start = Instant::now();
        debug!("Opening session for {}", scenario);

        let (outcome, error) = match self.factory.open().await {
            Ok(surface) => {
                let mut driver = Driver::new(surface, &self.config);
                let verdict = scenario.run(&mut driver, &self.context).await;
                if let Err(e) = driver.close().await {
                    warn!("Closing session for {} failed: {}", scenario, e);
                }
                match verdict {
                    Ok(Verdict::Passed) => (Outcome::Passed, None),
                    Ok(Verdict::Skipped(reason)) => (Outcome::Skipped, Some(reason)),
                    Err(e) if e.is_ui_failure() => (Outcome::Failed, Some(e.to_string())),
                    Err(e) => (Outcome::Failed, Some(format!("harness error: {}", e))),
                }
            }
            Err(e) => (Outcome::Failed, Some(format!("could not open session: {}", e))),
        };

        ScenarioResult {
            name: scenario.name().to_string(),
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
        }
    }

    /// Write suite results to `scenario-results.json` in the output directory
    pub fn write_results(&self, results: &SuiteResult) -> DriverResult<PathBuf> {
        write_results(&self.output_dir, results)
    }
}

pub fn write_results(output_dir: &Path, results: &SuiteResult) -> DriverResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join("scenario-results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}
