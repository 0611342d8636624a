use crate::commands::Command;
use crate::output::OutputFormatter;
use anyhow::Result;
use clap::Args;
use colored::*;
use docs_index::{IndexManager, SearchContext};

#[derive(Args)]
pub struct SearchCommand {
    /// Search query
    pub query: String,

    /// Maximum number of results to return (1-20)
    #[arg(short, long, default_value = "8")]
    pub limit: usize,

    /// Output format: table, json
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Restrict/prefer a specific docset id
    #[arg(long)]
    pub source_hint: Option<String>,

    /// Caller's language hint (e.g. "python")
    #[arg(long)]
    pub language: Option<String>,
}

impl Command for SearchCommand {
    fn execute(&self, manager: &IndexManager) -> Result<()> {
        let formatter = OutputFormatter::new(&self.format);
        println!("{} Searching for: {}", "🔍".blue(), self.query.cyan().bold());

        let context = SearchContext {
            language: self.language.clone(),
            dependencies: Vec::new(),
            stacktrace: None,
        };
        let response = manager.search(
            &self.query,
            self.source_hint.as_deref(),
            Some(&context),
            Some(self.limit),
        )?;

        if formatter.is_json() {
            let json = serde_json::json!({
                "routing": {
                    "selected_docsets": response.routing.selected_docsets,
                    "reasons": response.routing.reasons,
                },
                "results": response.results,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        if response.results.is_empty() {
            println!("{} No results found for '{}'", "❌".red(), self.query);
            return Ok(());
        }

        formatter.display_search_results(&response.routing, &response.results)?;
        println!("{}", format!("✅ Found {} results", response.results.len()).green());
        Ok(())
    }
}
