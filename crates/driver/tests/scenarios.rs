//! Scenario catalogue run end to end on the in-memory wizard

mod common;

use booking_driver::mock::{KnownCustomer, MockFactory, MockWizardConfig};
use booking_driver::runner::{write_results, Outcome, SuiteResult};
use booking_driver::scenarios::Scenario;
use booking_driver::{DriverError, ScenarioRunner};

use common::{fast_config, without_locations};

fn runner(config: MockWizardConfig) -> ScenarioRunner<MockFactory> {
    ScenarioRunner::new(MockFactory::new(config), fast_config()).unwrap()
}

fn outcome_of(suite: &SuiteResult, scenario: Scenario) -> Outcome {
    suite
        .results
        .iter()
        .find(|r| r.name == scenario.name())
        .map(|r| r.outcome)
        .unwrap_or_else(|| panic!("{} missing from suite", scenario))
}

#[tokio::test]
async fn full_catalogue_passes() {
    let suite = runner(MockWizardConfig::default()).run_all().await;

    let failures: Vec<_> = suite
        .results
        .iter()
        .filter(|r| !r.passed())
        .map(|r| format!("{}: {:?}", r.name, r.error))
        .collect();
    assert!(failures.is_empty(), "{:#?}", failures);
    assert_eq!(suite.total, Scenario::ALL.len());
    assert_eq!(suite.passed, Scenario::ALL.len());
    assert!(suite.success());
}

#[tokio::test]
async fn catalogue_passes_without_locations() {
    let suite = runner(without_locations()).run_all().await;

    assert!(suite.success(), "{:#?}", suite.results);
    assert_eq!(suite.skipped, 0);
}

#[tokio::test]
async fn short_name_is_skipped_for_returning_customer() {
    let suite = runner(MockWizardConfig {
        known_customers: vec![KnownCustomer {
            phone: "11999999999".to_string(),
            name: "Maria Cliente".to_string(),
            email: None,
        }],
        ..Default::default()
    })
    .run_all()
    .await;

    assert_eq!(outcome_of(&suite, Scenario::RejectsShortName), Outcome::Skipped);
    assert_eq!(outcome_of(&suite, Scenario::CompletesBookingFlow), Outcome::Passed);
    assert_eq!(suite.skipped, 1);
    assert!(suite.success());
}

#[tokio::test]
async fn smoke_tag_selects_its_scenarios() {
    let suite = runner(MockWizardConfig::default()).run_tagged("smoke").await;

    let names: Vec<_> = suite.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "page-loads",
            "service-advances-to-professionals",
            "completes-booking-flow",
            "advance-disabled-initially",
        ]
    );
    assert!(suite.success());
}

#[tokio::test]
async fn unknown_tag_runs_nothing() {
    let suite = runner(MockWizardConfig::default()).run_tagged("nope").await;

    assert_eq!(suite.total, 0);
    assert!(suite.success());
}

#[tokio::test]
async fn named_scenario_runs_alone() {
    let runner = runner(MockWizardConfig::default());

    let result = runner.run_named("back-returns-to-services").await.unwrap();
    assert_eq!(result.outcome, Outcome::Passed);

    let err = runner.run_named("does-not-exist").await.unwrap_err();
    assert!(matches!(err, DriverError::ScenarioNotFound(name) if name == "does-not-exist"));
}

#[tokio::test]
async fn named_result_tallies_like_a_suite() {
    let runner = runner(MockWizardConfig {
        confirm_label: "Finalizar".to_string(),
        ..Default::default()
    });

    let failed = runner.run_named("completes-booking-flow").await.unwrap();
    let suite = SuiteResult::from_results(vec![failed], 7);

    assert_eq!(suite.total, 1);
    assert_eq!(suite.failed, 1);
    assert_eq!(suite.passed + suite.skipped, 0);
    assert_eq!(suite.duration_ms, 7);
    assert!(!suite.success());
}

#[tokio::test]
async fn wrong_confirm_label_fails_the_completion_scenario() {
    let suite = runner(MockWizardConfig {
        confirm_label: "Finalizar".to_string(),
        ..Default::default()
    })
    .run_all()
    .await;

    assert_eq!(outcome_of(&suite, Scenario::CompletesBookingFlow), Outcome::Failed);
    assert_eq!(outcome_of(&suite, Scenario::FillsClientData), Outcome::Passed);
    assert!(!suite.success());
    assert_eq!(suite.failed, 1);
}

#[tokio::test]
async fn unknown_tenant_fails_page_load() {
    let runner = runner(MockWizardConfig {
        tenant: "outro".to_string(),
        ..Default::default()
    });

    let result = runner.run_scenario(Scenario::PageLoads).await;

    assert_eq!(result.outcome, Outcome::Failed);
    let error = result.error.unwrap_or_default();
    assert!(error.contains("service-card-"), "{}", error);
}

#[tokio::test]
async fn invalid_contact_defaults_are_rejected() {
    let mut config = fast_config();
    config.contact.phone = String::new();

    let err = ScenarioRunner::new(MockFactory::default(), config).err();

    assert!(matches!(err, Some(DriverError::InvalidContactData(_))));
}

#[tokio::test]
async fn results_are_written_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(MockWizardConfig::default()).with_output_dir(dir.path().join("out"));
    let suite = runner.run_tagged("validation").await;

    let path = runner.write_results(&suite).unwrap();

    assert_eq!(path, dir.path().join("out").join("scenario-results.json"));
    let parsed: SuiteResult = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.total, 3);
    assert_eq!(parsed.passed, 3);
    assert_eq!(parsed.results[0].name, "advance-disabled-initially");

    // The free function writes to any directory
    let other = write_results(dir.path(), &suite).unwrap();
    assert!(other.exists());
}
