//! Durable persistence of the built [`IndexState`], so a restart can skip
//! a full reindex when nothing relevant changed.

use crate::model::IndexState;
use docsearch_core::{DocsearchError, Result};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::path::Path;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    schema_version: u32,
    signature: String,
    state: IndexState,
}

/// SHA-1 over the absolute registry path, the registry's bytes, and the
/// build parameters that affect chunking/embedding. Any change to these
/// inputs invalidates a saved snapshot.
pub fn snapshot_signature(
    registry_path: &Path,
    embedding_model: &str,
    chunk_words: usize,
    chunk_overlap_words: usize,
) -> Result<String> {
    let absolute = registry_path
        .canonicalize()
        .unwrap_or_else(|_| registry_path.to_path_buf());
    let bytes = std::fs::read(registry_path)?;

    let mut hasher = Sha1::new();
    hasher.update(absolute.display().to_string().as_bytes());
    hasher.update(&bytes);
    hasher.update(format!("|{embedding_model}|{chunk_words}|{chunk_overlap_words}").as_bytes());
    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Outcome of attempting to load a snapshot from disk.
pub enum LoadOutcome {
    Loaded(IndexState),
    Missing,
    Stale,
}

/// Loads the snapshot at `path`, if any. A schema mismatch is always a
/// hard error; a signature mismatch is reported as [`LoadOutcome::Stale`]
/// for the caller to handle per its `auto_index` policy.
pub fn load_snapshot(path: &Path, expected_signature: &str) -> Result<LoadOutcome> {
    if !path.exists() {
        return Ok(LoadOutcome::Missing);
    }
    let bytes = std::fs::read(path)?;
    let snapshot: IndexSnapshot = bincode::deserialize(&bytes)
        .map_err(|e| DocsearchError::internal(format!("snapshot decode failed: {e}")))?;

    if snapshot.schema_version != SCHEMA_VERSION {
        return Err(DocsearchError::internal(format!(
            "index snapshot schema mismatch: expected {SCHEMA_VERSION}, got {}",
            snapshot.schema_version
        )));
    }
    if snapshot.signature != expected_signature {
        return Ok(LoadOutcome::Stale);
    }
    Ok(LoadOutcome::Loaded(snapshot.state))
}

/// Writes `state` to `path` atomically: serialize to `<path>.tmp`, then
/// rename over `path`. The tmp file is removed if anything fails first.
pub fn save_snapshot(path: &Path, state: &IndexState, signature: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let snapshot = IndexSnapshot {
        schema_version: SCHEMA_VERSION,
        signature: signature.to_string(),
        state: state.clone(),
    };
    let tmp_path = path.with_extension("tmp");
    let result = (|| -> Result<()> {
        let bytes = bincode::serialize(&snapshot)
            .map_err(|e| DocsearchError::internal(format!("snapshot encode failed: {e}")))?;
        std::fs::write(&tmp_path, bytes)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() && tmp_path.exists() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}
