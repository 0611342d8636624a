pub mod asset_path;
pub mod docsets;
pub mod open;
pub mod reindex;
pub mod search;

use anyhow::Result;
use docs_index::IndexManager;

/// Every subcommand implements this against the in-process index manager;
/// there is no transport layer to go through.
pub trait Command {
    fn execute(&self, manager: &IndexManager) -> Result<()>;
}
