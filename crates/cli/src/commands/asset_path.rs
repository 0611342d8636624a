use crate::commands::Command;
use anyhow::Result;
use clap::Args;
use docs_index::IndexManager;

#[derive(Args)]
pub struct AssetPathCommand {
    /// Docset to resolve the asset within
    pub docset_id: String,

    /// Path relative to the docset root, as recorded on a section's assets
    pub relative_path: String,
}

impl Command for AssetPathCommand {
    fn execute(&self, manager: &IndexManager) -> Result<()> {
        let path = manager.asset_path(&self.docset_id, &self.relative_path)?;
        println!("{}", path.display());
        Ok(())
    }
}
