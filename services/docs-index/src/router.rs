//! Scores and selects which docsets a query should be retrieved against.

use crate::model::Docset;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    pub language: Option<String>,
    pub dependencies: Vec<String>,
    pub stacktrace: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub selected_docsets: Vec<String>,
    pub reasons: HashMap<String, String>,
}

/// Scores every docset against `query` (plus optional `source_hint` and
/// `context`), keeps the positively-scored ones in descending-score order
/// (ties broken by registry order), and truncates to `max_k`. Falls back
/// to the first `max_k` registry docsets if nothing scores positively.
pub fn route_docsets(
    docsets: &[Docset],
    query: &str,
    source_hint: Option<&str>,
    context: Option<&SearchContext>,
    max_k: usize,
) -> RoutingDecision {
    let q = query.to_lowercase();
    let deps: Vec<String> = context
        .map(|c| c.dependencies.iter().map(|d| d.to_lowercase()).collect())
        .unwrap_or_default();

    let mut scores: Vec<(String, i64, String)> = Vec::with_capacity(docsets.len());

    for (order, docset) in docsets.iter().enumerate() {
        let mut score = 0i64;
        let mut reason_parts = Vec::new();

        if let Some(hint) = source_hint {
            if hint.to_lowercase() == docset.docset_id.to_lowercase() {
                score += 100;
                reason_parts.push("source_hint".to_string());
            }
        }

        let kw_matches: Vec<&String> = docset
            .keywords
            .iter()
            .filter(|k| q.contains(&k.to_lowercase()))
            .collect();
        if !kw_matches.is_empty() {
            score += 10 * kw_matches.len() as i64;
            let sample: Vec<String> = kw_matches.iter().take(3).map(|s| s.to_string()).collect();
            reason_parts.push(format!("keywords:{}", sample.join(",")));
        }

        let tag_matches: Vec<&String> = docset
            .tags
            .iter()
            .filter(|t| q.contains(&t.to_lowercase()))
            .collect();
        if !tag_matches.is_empty() {
            score += 3 * tag_matches.len() as i64;
            let sample: Vec<String> = tag_matches.iter().take(3).map(|s| s.to_string()).collect();
            reason_parts.push(format!("tags:{}", sample.join(",")));
        }

        let dep_matches: Vec<&String> = docset
            .keywords
            .iter()
            .filter(|k| deps.iter().any(|d| d.contains(&k.to_lowercase())))
            .collect();
        if !dep_matches.is_empty() {
            score += 15 * dep_matches.len() as i64;
            let sample: Vec<String> = dep_matches.iter().take(3).map(|s| s.to_string()).collect();
            reason_parts.push(format!("deps:{}", sample.join(",")));
        }

        let reason = if reason_parts.is_empty() {
            "fallback".to_string()
        } else {
            reason_parts.join(" ")
        };
        scores.push((docset.docset_id.clone(), score, reason));
        let _ = order;
    }

    let mut ordered: Vec<(usize, &(String, i64, String))> = scores.iter().enumerate().collect();
    ordered.sort_by(|a, b| b.1 .1.cmp(&a.1 .1).then(a.0.cmp(&b.0)));

    let mut selected: Vec<String> = ordered
        .iter()
        .filter(|(_, (_, score, _))| *score > 0)
        .take(max_k)
        .map(|(_, (id, _, _))| id.clone())
        .collect();

    let mut reasons: HashMap<String, String> = HashMap::new();
    if selected.is_empty() {
        selected = docsets
            .iter()
            .take(max_k)
            .map(|d| d.docset_id.clone())
            .collect();
        for id in &selected {
            reasons.insert(id.clone(), "fallback".to_string());
        }
    } else {
        for (id, _, reason) in &scores {
            if selected.contains(id) {
                reasons.insert(id.clone(), reason.clone());
            }
        }
    }

    RoutingDecision {
        selected_docsets: selected,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docset(id: &str, tags: &[&str], keywords: &[&str]) -> Docset {
        Docset {
            docset_id: id.to_string(),
            root_path: std::path::PathBuf::from("/tmp"),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            version: None,
            enabled: true,
        }
    }

    #[test]
    fn keyword_match_outranks_tag_match() {
        let docsets = vec![docset("a", &[], &["pandas"]), docset("b", &["python"], &[])];
        let decision = route_docsets(&docsets, "how do I use pandas", None, None, 3);
        assert_eq!(decision.selected_docsets[0], "a");
    }

    #[test]
    fn source_hint_inverts_the_ordering() {
        let docsets = vec![docset("a", &[], &["pandas"]), docset("b", &["python"], &[])];
        let decision = route_docsets(&docsets, "how do I use pandas", Some("b"), None, 3);
        assert_eq!(decision.selected_docsets[0], "b");
    }

    #[test]
    fn no_positive_scores_falls_back_to_registry_order() {
        let docsets = vec![docset("a", &[], &["pandas"]), docset("b", &["python"], &[])];
        let decision = route_docsets(&docsets, "totally unrelated words", None, None, 1);
        assert_eq!(decision.selected_docsets, vec!["a".to_string()]);
        assert_eq!(decision.reasons.get("a").unwrap(), "fallback");
    }

    #[test]
    fn dependency_substring_match_boosts_score() {
        let docsets = vec![docset("a", &[], &["pandas"])];
        let context = SearchContext {
            language: None,
            dependencies: vec!["pandas==2.1".to_string()],
            stacktrace: None,
        };
        let decision = route_docsets(&docsets, "unrelated", None, Some(&context), 3);
        assert_eq!(decision.selected_docsets, vec!["a".to_string()]);
    }
}
