use crate::commands::Command;
use crate::output::OutputFormatter;
use anyhow::Result;
use clap::Args;
use docs_index::IndexManager;

#[derive(Args)]
pub struct OpenCommand {
    /// The doc_ref returned by a prior search
    pub doc_ref: String,

    /// Output format: table, json
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

impl Command for OpenCommand {
    fn execute(&self, manager: &IndexManager) -> Result<()> {
        let formatter = OutputFormatter::new(&self.format);
        let opened = manager.open(&self.doc_ref)?;

        if formatter.is_json() {
            println!("{}", serde_json::to_string_pretty(&opened)?);
            return Ok(());
        }

        formatter.display_opened_section(&opened)
    }
}
