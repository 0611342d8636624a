//! Tokenization, whitespace normalization, and word-window chunking.
//!
//! These are the low-level text utilities shared by the lexical index
//! builder (tokenize) and the per-section chunker (chunk_words).

/// Lowercased maximal runs of `[A-Za-z0-9_./:+-]`.
///
/// This is intentionally permissive: it keeps things like `foo.bar`,
/// `a/b`, `v1.2.3` and `--flag` together as single tokens, which matters
/// for matching code identifiers and CLI flags inside documentation.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if is_token_char(ch) {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '/' | ':' | '+' | '-')
}

/// Collapses 3+ newlines to 2 and strips trailing spaces before a newline,
/// then trims the whole string.
pub fn normalize_whitespace(text: &str) -> String {
    let mut no_trailing_spaces = String::with_capacity(text.len());
    for line in text.split('\n') {
        no_trailing_spaces.push_str(line.trim_end_matches([' ', '\t']));
        no_trailing_spaces.push('\n');
    }
    no_trailing_spaces.pop(); // drop the extra newline introduced by the loop

    let mut collapsed = String::with_capacity(no_trailing_spaces.len());
    let mut newline_run = 0usize;
    for ch in no_trailing_spaces.chars() {
        if ch == '\n' {
            newline_run += 1;
            if newline_run <= 2 {
                collapsed.push(ch);
            }
        } else {
            newline_run = 0;
            collapsed.push(ch);
        }
    }
    collapsed.trim().to_string()
}

/// Splits `text` into overlapping word windows of up to `max_words` words,
/// stepping by `max_words - overlap_words`. Requires `overlap_words < max_words`.
///
/// If the text already fits in one window, a single chunk (the stripped
/// text) is returned instead of performing any windowing.
pub fn chunk_words(text: &str, max_words: usize, overlap_words: usize) -> Vec<String> {
    assert!(
        overlap_words < max_words,
        "overlap_words must be < max_words"
    );

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return vec![text.trim().to_string()];
    }

    let step = max_words - overlap_words;
    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + max_words).min(words.len());
        let chunk = words[start..end].join(" ");
        let chunk = chunk.trim().to_string();
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        if end >= words.len() {
            break;
        }
        start += step;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keeps_identifiers_together() {
        let tokens = tokenize("Use `foo.bar/Baz_1` with --flag=on!");
        assert!(tokens.contains(&"foo.bar/baz_1".to_string()));
        assert!(tokens.contains(&"--flag".to_string()));
        assert!(tokens.contains(&"on".to_string()));
    }

    #[test]
    fn normalize_collapses_blank_runs_and_trailing_spaces() {
        let input = "a  \nb\n\n\n\nc   \n\n";
        assert_eq!(normalize_whitespace(input), "a\nb\n\nc");
    }

    #[test]
    fn chunk_words_single_window_when_short() {
        let text = "one two three";
        assert_eq!(chunk_words(text, 10, 3), vec!["one two three".to_string()]);
    }

    #[test]
    fn chunk_words_overlap_discipline() {
        let words: Vec<String> = (0..25).map(|i| i.to_string()).collect();
        let text = words.join(" ");
        let chunks = chunk_words(&text, 10, 3);
        let starts: Vec<usize> = chunks
            .iter()
            .map(|c| c.split_whitespace().next().unwrap().parse().unwrap())
            .collect();
        let ends: Vec<usize> = chunks
            .iter()
            .map(|c| c.split_whitespace().last().unwrap().parse::<usize>().unwrap() + 1)
            .collect();
        assert_eq!(starts, vec![0, 7, 14, 21]);
        assert_eq!(ends, vec![10, 17, 24, 25]);
    }

    #[test]
    fn chunk_words_never_drops_a_word() {
        let words: Vec<String> = (0..103).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let chunks = chunk_words(&text, 20, 5);
        let mut seen = Vec::new();
        for chunk in &chunks {
            for w in chunk.split_whitespace() {
                seen.push(w.to_string());
            }
        }
        // every word appears at least once, in order, no gaps
        let mut covered = vec![false; words.len()];
        let mut cursor = 0;
        for w in &seen {
            while cursor < words.len() && &words[cursor] != w {
                cursor += 1;
            }
            assert!(cursor < words.len(), "word {w} not found in sequence");
            covered[cursor] = true;
        }
        assert!(covered.iter().all(|&c| c));
    }
}
