//! Quote extraction: keyword-anchored context windows and keyword-filtered sentences.
//!
//! Quotes never touch the post they come from. Collections are ordered by engagement
//! (descending) and deduplicated on the exact excerpt text.

use crate::classify::LabeledPost;
use crate::config::CodingOptions;
use crate::selector::Selector;
use crate::sentences::{split_fragments, split_sentences};
use ahash::AHashSet;
use serde::Serialize;

pub const DEFAULT_CONTEXT_CHARS: usize = 250;

const ELLIPSIS: &str = "...";

/// Excerpt around the first hit of the highest-priority keyword that occurs at all.
///
/// Keywords are tried in order with a case-insensitive substring search; the first one found
/// wins. The window spans `context_chars` characters either side of the hit. If the window
/// holds at least two punctuation-delimited fragments, the first and last (likely cut off)
/// are dropped and the rest joined with `". "`; with exactly two that leaves an empty
/// excerpt, which the length filter later rejects. A non-empty excerpt gets `"..."` prepended
/// when the window does not start at the beginning of the text and appended when it stops
/// before the end.
///
/// Returns `None` only when no keyword occurs.
pub fn extract_context_quote<S: AsRef<str>>(text: &str, keywords: &[S], context_chars: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();

    // Folded copy plus, for every folded byte, the index of the source char it came from.
    let mut folded = String::with_capacity(text.len());
    let mut origin: Vec<usize> = Vec::with_capacity(text.len());
    for (i, c) in chars.iter().enumerate() {
        for lc in c.to_lowercase() {
            folded.push(lc);
            origin.extend(std::iter::repeat(i).take(lc.len_utf8()));
        }
    }

    let idx = keywords.iter().find_map(|kw| {
        let kw = kw.as_ref().to_lowercase();
        if kw.is_empty() {
            return None;
        }
        folded.find(&kw).map(|b| origin[b])
    })?;

    let start = idx.saturating_sub(context_chars);
    let end = idx.saturating_add(context_chars).min(chars.len());
    let window: String = chars[start..end].iter().collect();
    let snippet = window.trim();

    // Fewer than two fragments: the window is one run of text and is kept whole.
    let fragments = split_fragments(snippet);
    let body = if fragments.len() < 2 {
        snippet.to_string()
    } else {
        fragments[1..fragments.len() - 1].join(". ").trim().to_string()
    };
    if body.is_empty() {
        return Some(body);
    }

    let mut out = String::with_capacity(body.len() + 2 * ELLIPSIS.len());
    if start > 0 {
        out.push_str(ELLIPSIS);
    }
    out.push_str(&body);
    if end < chars.len() {
        out.push_str(ELLIPSIS);
    }
    Some(out)
}

/// An excerpt selected for qualitative review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuoteCandidate {
    pub post_id: String,
    pub theme: String,
    pub quote: String,
    pub score: i64,
    pub engagement: i64,
}

impl QuoteCandidate {
    fn from_post(p: &LabeledPost, theme: &str, quote: String) -> Self {
        Self {
            post_id: p.post.id.clone(),
            theme: theme.to_string(),
            quote,
            score: p.post.score,
            engagement: p.engagement,
        }
    }
}

/// Stable sort by engagement (descending), then keep the first of each exact excerpt.
pub fn dedupe_quotes(mut quotes: Vec<QuoteCandidate>) -> Vec<QuoteCandidate> {
    quotes.sort_by(|a, b| b.engagement.cmp(&a.engagement));
    let mut seen = AHashSet::with_capacity(quotes.len());
    quotes.retain(|q| seen.insert(q.quote.clone()));
    quotes
}

/// True when the trimmed excerpt length (in chars) is strictly inside `(min, max)`.
pub fn quote_len_ok(quote: &str, min_chars: usize, max_chars: usize) -> bool {
    let n = quote.trim().chars().count();
    n > min_chars && n < max_chars
}

/// A themed collection of context quotes.
#[derive(Clone, Debug)]
pub struct ContextQuoteRule {
    pub theme: String,
    pub select: Selector,
    /// Priority order: the extractor anchors on the first keyword found.
    pub keywords: Vec<String>,
    /// Scan at most this many selected posts, in collection order.
    pub post_limit: Option<usize>,
}

impl ContextQuoteRule {
    pub fn new<I, S>(theme: impl Into<String>, select: Selector, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            theme: theme.into(),
            select,
            keywords: keywords.into_iter().map(Into::into).collect(),
            post_limit: None,
        }
    }

    pub fn limit(mut self, n: usize) -> Self { self.post_limit = Some(n); self }

    /// Extract, length-filter, rank and dedupe this theme's quotes.
    pub fn collect(&self, posts: &[LabeledPost], opts: &CodingOptions) -> Vec<QuoteCandidate> {
        let out = posts
            .iter()
            .filter(|p| self.select.test(p))
            .take(self.post_limit.unwrap_or(usize::MAX))
            .filter_map(|p| {
                let q = extract_context_quote(&p.post.full_text(), &self.keywords, opts.context_chars)?;
                quote_len_ok(&q, opts.quote_min_chars, opts.quote_max_chars)
                    .then(|| QuoteCandidate::from_post(p, &self.theme, q.trim().to_string()))
            })
            .collect();
        dedupe_quotes(out)
    }
}

/// Sentence-level quotes: every candidate sentence of a selected post that mentions
/// at least one keyword from each group (plain substring on the folded sentence).
#[derive(Clone, Debug)]
pub struct SentenceQuoteRule {
    pub theme: String,
    pub select: Selector,
    pub require_any: Vec<Vec<String>>,
    /// Only look at the first N candidate sentences of each post.
    pub first_sentences: Option<usize>,
    pub post_limit: Option<usize>,
}

impl SentenceQuoteRule {
    pub fn new(theme: impl Into<String>, select: Selector) -> Self {
        Self { theme: theme.into(), select, require_any: Vec::new(), first_sentences: None, post_limit: None }
    }

    /// Add a keyword group; a sentence must contain one keyword from every group.
    pub fn require_any<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.require_any.push(words.into_iter().map(|w| w.as_ref().to_lowercase()).collect());
        self
    }

    pub fn first_sentences(mut self, n: usize) -> Self { self.first_sentences = Some(n); self }
    pub fn limit(mut self, n: usize) -> Self { self.post_limit = Some(n); self }

    fn accepts(&self, sentence: &str) -> bool {
        let folded = sentence.to_lowercase();
        self.require_any.iter().all(|group| group.iter().any(|w| folded.contains(w.as_str())))
    }

    /// Raw candidates in collection order; no ranking or dedupe.
    pub fn candidates(&self, posts: &[LabeledPost], opts: &CodingOptions) -> Vec<QuoteCandidate> {
        let mut out = Vec::new();
        for p in posts.iter().filter(|p| self.select.test(p)).take(self.post_limit.unwrap_or(usize::MAX)) {
            let sentences = split_sentences(&p.post.full_text(), opts.sentence_max_chars);
            let take = self.first_sentences.unwrap_or(sentences.len());
            for s in sentences.into_iter().take(take) {
                if self.accepts(&s) {
                    out.push(QuoteCandidate::from_post(p, &self.theme, s));
                }
            }
        }
        out
    }
}

/// Merge every rule's sentence candidates, then rank and dedupe across themes.
pub fn collect_sentence_quotes(
    posts: &[LabeledPost],
    rules: &[SentenceQuoteRule],
    opts: &CodingOptions,
) -> Vec<QuoteCandidate> {
    let all = rules.iter().flat_map(|r| r.candidates(posts, opts)).collect();
    dedupe_quotes(all)
}
