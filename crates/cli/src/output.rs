//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use booking_driver::runner::{Outcome, ScenarioResult, SuiteResult};
use booking_driver::scenarios::Scenario;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for ScenarioResult {
    fn headers() -> Vec<&'static str> {
        vec!["Scenario", "Outcome", "Duration", "Detail"]
    }

    fn row(&self) -> Vec<String> {
        let outcome = match self.outcome {
            Outcome::Passed => "✓ passed".green().to_string(),
            Outcome::Failed => "✗ failed".red().to_string(),
            Outcome::Skipped => "- skipped".yellow().to_string(),
        };
        vec![
            self.name.clone(),
            outcome,
            format!("{}ms", self.duration_ms),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

/// Catalogue entry as printed by `list`
#[derive(Serialize)]
pub struct ScenarioDisplay {
    pub name: &'static str,
    pub tags: Vec<&'static str>,
    pub description: &'static str,
}

impl From<Scenario> for ScenarioDisplay {
    fn from(scenario: Scenario) -> Self {
        Self {
            name: scenario.name(),
            tags: scenario.tags().to_vec(),
            description: scenario.description(),
        }
    }
}

impl TableDisplay for ScenarioDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Tags", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.to_string(),
            self.tags.join(", "),
            self.description.to_string(),
        ]
    }
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            table.add_row(item.row());

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
    }
}

/// Print a suite: per-scenario table followed by the totals
pub fn print_suite(suite: &SuiteResult, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_list(&suite.results, format);
            let summary = format!(
                "{} passed, {} failed, {} skipped in {}ms",
                suite.passed, suite.failed, suite.skipped, suite.duration_ms
            );
            if suite.success() {
                println!("{}", summary.green().bold());
            } else {
                println!("{}", summary.red().bold());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(suite).unwrap_or_default());
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}
