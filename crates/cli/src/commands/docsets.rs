use crate::commands::Command;
use crate::output::OutputFormatter;
use anyhow::Result;
use clap::Args;
use colored::*;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use docs_index::IndexManager;

#[derive(Args)]
pub struct DocsetsCommand {
    /// Output format: table, json
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

impl Command for DocsetsCommand {
    fn execute(&self, manager: &IndexManager) -> Result<()> {
        let formatter = OutputFormatter::new(&self.format);
        let docsets = manager.registry_docsets()?;

        if formatter.is_json() {
            println!("{}", serde_json::to_string_pretty(&docsets)?);
            return Ok(());
        }

        println!("{}", "📚 Registered docsets".blue().bold());
        let mut table = Table::new();
        table
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Id").add_attribute(Attribute::Bold),
                Cell::new("Root").add_attribute(Attribute::Bold),
                Cell::new("Tags").add_attribute(Attribute::Bold),
                Cell::new("Enabled").add_attribute(Attribute::Bold),
            ]);
        for docset in &docsets {
            table.add_row(vec![
                Cell::new(&docset.docset_id),
                Cell::new(docset.root_path.display().to_string()),
                Cell::new(docset.tags.join(", ")),
                Cell::new(if docset.enabled { "yes" } else { "no" }),
            ]);
        }
        println!("{table}");
        Ok(())
    }
}
