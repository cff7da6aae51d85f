//! Heuristic sentence splitting on runs of `.`, `!` and `?`.
//! Not grammar-aware: abbreviations and decimals split too.

use regex::Regex;
use std::sync::OnceLock;

pub const MIN_SENTENCE_CHARS: usize = 20;
pub const DEFAULT_MAX_SENTENCE_CHARS: usize = 200;

fn terminal_punct() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("valid regex"))
}

/// Raw fragments between punctuation runs, untrimmed, empty ones included.
/// `"a. b."` yields `["a", " b", ""]`.
pub fn split_fragments(text: &str) -> Vec<&str> {
    terminal_punct().split(text).collect()
}

/// Candidate sentences: trimmed fragments with `MIN_SENTENCE_CHARS < len < max_chars`
/// (in characters) that do not start with `http` or `www`.
pub fn split_sentences(text: &str, max_chars: usize) -> Vec<String> {
    split_fragments(text)
        .into_iter()
        .map(str::trim)
        .filter(|s| {
            let n = s.chars().count();
            n > MIN_SENTENCE_CHARS && n < max_chars && !looks_like_link(s)
        })
        .map(str::to_string)
        .collect()
}

fn looks_like_link(s: &str) -> bool {
    let head: String = s.chars().take(4).flat_map(char::to_lowercase).collect();
    head.starts_with("http") || head.starts_with("www")
}
