use crate::commands::Command;
use crate::output::OutputFormatter;
use anyhow::Result;
use clap::Args;
use docs_index::IndexManager;

#[derive(Args)]
pub struct ReindexCommand {
    /// Only rebuild these docset ids; omit to rebuild everything
    #[arg(long)]
    pub docset: Vec<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Output format: table, json
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

impl Command for ReindexCommand {
    fn execute(&self, manager: &IndexManager) -> Result<()> {
        let formatter = OutputFormatter::new(&self.format);

        if !self.yes {
            println!("⚠️  This will rebuild the index from source documents.");
            print!("Are you sure you want to continue? [y/N]: ");
            use std::io::Write;
            std::io::stdout().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            if !input.trim().to_lowercase().starts_with('y') {
                formatter.display_info_message("Reindex cancelled")?;
                return Ok(());
            }
        }

        formatter.display_progress_start("Rebuilding index from source documents")?;
        let started = std::time::Instant::now();
        let docset_ids = if self.docset.is_empty() {
            None
        } else {
            Some(self.docset.as_slice())
        };
        manager.reindex(docset_ids)?;
        let elapsed_ms = started.elapsed().as_millis();

        if formatter.is_json() {
            let json = serde_json::json!({"ok": true, "elapsed_ms": elapsed_ms});
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        formatter.display_success_message(&format!("Reindexed in {elapsed_ms}ms"))?;
        Ok(())
    }
}
