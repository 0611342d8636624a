//! Deterministic, content-derived identifiers.
//!
//! Every id here is a function of stable inputs (file path, heading path,
//! chunk index) so that two independent builds of the same docset produce
//! byte-identical `section_ref`/`doc_ref` values.

use sha1::{Digest, Sha1};

/// First `length` hex characters of the SHA-1 digest of `text`.
pub fn sha1_short(text: &str, length: usize) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
    hex[..length.min(hex.len())].to_string()
}

/// Anchor used when a heading has no `id` attribute: `#sec-<12 hex chars>`.
pub fn stable_anchor(file_path: &str, heading_path: &[String]) -> String {
    let key = format!("{file_path}|{}", heading_path.join(" > "));
    format!("#sec-{}", sha1_short(&key, 12))
}

/// `docset_id:<16 hex chars>` derived from file path, anchor, and heading
/// path. Unique within a docset.
pub fn section_ref(docset_id: &str, file_path: &str, anchor: &str, heading_path: &[String]) -> String {
    let key = format!("{file_path}|{anchor}|{}", heading_path.join(">"));
    format!("{docset_id}:{}", sha1_short(&key, 16))
}

/// `docset_id:<16 hex chars>` derived from the owning section and the
/// chunk's 0-based index within it. Globally unique across docsets thanks
/// to the `docset_id:` prefix.
pub fn doc_ref(docset_id: &str, section_ref: &str, chunk_index: usize) -> String {
    let key = format!("{section_ref}:{chunk_index}");
    format!("{docset_id}:{}", sha1_short(&key, 16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_ref_is_deterministic() {
        let heading = vec!["Intro".to_string()];
        let a = section_ref("docs", "guide.html", "#intro", &heading);
        let b = section_ref("docs", "guide.html", "#intro", &heading);
        assert_eq!(a, b);
        assert!(a.starts_with("docs:"));
    }

    #[test]
    fn doc_ref_varies_with_chunk_index() {
        let a = doc_ref("docs", "docs:abc123", 0);
        let b = doc_ref("docs", "docs:abc123", 1);
        assert_ne!(a, b);
    }

    #[test]
    fn stable_anchor_is_hash_derived() {
        let anchor = stable_anchor("guide.html", &["Intro".to_string()]);
        assert!(anchor.starts_with("#sec-"));
        assert_eq!(anchor.len(), "#sec-".len() + 12);
    }
}
