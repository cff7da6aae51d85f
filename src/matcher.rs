//! Keyword matching on case-folded text.
//!
//! Two strategies, chosen once when the term is compiled:
//!  - a single token (no space) matches only when neither neighbour is alphanumeric or `_`:
//!    `stress` does not hit `stressed`, `c++` hits `c++ daily` but not `abc++`;
//!  - a phrase (contains a space) is a raw substring, so `therapy app` also hits `therapy apps`
//!    or `therapy appointment`. Existing codebooks rely on that.

use regex::Regex;

#[derive(Clone, Debug)]
pub enum Term {
    /// `re` carries `\b` on word-character edges; `check_before`/`check_after` mark the
    /// symbol edges whose neighbours are checked by hand.
    Token { term: String, re: Regex, check_before: bool, check_after: bool },
    Phrase(String),
}

#[inline]
fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Term {
    /// Compile a term. The input is trimmed and case-folded; regex metacharacters are escaped.
    pub fn new(raw: &str) -> Self {
        let term = raw.trim().to_lowercase();
        if term.is_empty() || term.contains(' ') {
            return Term::Phrase(term);
        }
        let word_start = term.chars().next().is_some_and(is_word);
        let word_end = term.chars().next_back().is_some_and(is_word);
        let pattern = format!(
            "{}{}{}",
            if word_start { r"\b" } else { "" },
            regex::escape(&term),
            if word_end { r"\b" } else { "" },
        );
        let re = Regex::new(&pattern).expect("escaped literal is a valid pattern");
        Term::Token { term, re, check_before: !word_start, check_after: !word_end }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Term::Token { term, .. } => term,
            Term::Phrase(p) => p,
        }
    }

    pub fn is_phrase(&self) -> bool {
        matches!(self, Term::Phrase(_))
    }

    /// Presence in already-folded text.
    #[inline]
    pub fn matches(&self, folded: &str) -> bool {
        match self {
            Term::Token { .. } => self.token_hits(folded, 1) > 0,
            Term::Phrase(p) => !p.is_empty() && folded.contains(p.as_str()),
        }
    }

    /// Non-overlapping occurrences in already-folded text.
    pub fn count(&self, folded: &str) -> usize {
        match self {
            Term::Token { .. } => self.token_hits(folded, usize::MAX),
            Term::Phrase(p) if p.is_empty() => 0,
            Term::Phrase(p) => folded.matches(p.as_str()).count(),
        }
    }

    /// Non-overlapping token hits, up to `limit`. A rejected candidate only skips its first
    /// char, so a hit overlapping it can still be found.
    fn token_hits(&self, folded: &str, limit: usize) -> usize {
        let Term::Token { re, check_before, check_after, .. } = self else { return 0 };
        let mut n = 0;
        let mut pos = 0;
        while n < limit {
            let Some(m) = re.find_at(folded, pos) else { break };
            let clear_before = !check_before || !folded[..m.start()].chars().next_back().is_some_and(is_word);
            let clear_after = !check_after || !folded[m.end()..].chars().next().is_some_and(is_word);
            if clear_before && clear_after {
                n += 1;
                pos = m.end();
            } else {
                pos = m.start() + folded[m.start()..].chars().next().map_or(1, char::len_utf8);
            }
        }
        n
    }
}

/// One-shot form of [`Term::matches`]; compiles the term on every call.
pub fn matches(folded: &str, term: &str) -> bool {
    Term::new(term).matches(folded)
}

/// One-shot form of [`Term::count`]; compiles the term on every call.
pub fn count(folded: &str, term: &str) -> usize {
    Term::new(term).count(folded)
}
