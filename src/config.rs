use crate::quotes::DEFAULT_CONTEXT_CHARS;
use crate::sentences::DEFAULT_MAX_SENTENCE_CHARS;
use std::str::FromStr;

/// Tunables for a coding run, with builder-style setters.
#[derive(Clone, Debug)]
pub struct CodingOptions {
    pub context_chars: usize,        // quote window half-width, in chars
    pub sentence_max_chars: usize,   // exclusive upper bound for candidate sentences
    pub quote_min_chars: usize,      // exclusive
    pub quote_max_chars: usize,      // exclusive
    pub high_engagement_threshold: i64, // strict `>`
    pub substantive_min_body_chars: usize, // strict `>`
    pub top_n: usize,
    pub parallel: bool,              // classify with rayon
    pub min_year: Option<u16>,       // drop older posts at ingestion
}

impl Default for CodingOptions {
    fn default() -> Self {
        Self {
            context_chars: DEFAULT_CONTEXT_CHARS,
            sentence_max_chars: DEFAULT_MAX_SENTENCE_CHARS,
            quote_min_chars: 50,
            quote_max_chars: 300,
            high_engagement_threshold: 20,
            substantive_min_body_chars: 50,
            top_n: 150,
            parallel: true,
            min_year: None,
        }
    }
}

impl CodingOptions {
    /// Defaults overlaid with `CODER_*` environment variables.
    /// - CODER_CONTEXT_CHARS, CODER_QUOTE_MIN, CODER_QUOTE_MAX, CODER_TOP_N, CODER_MIN_YEAR
    /// Values that do not parse are logged and ignored.
    pub fn from_env() -> Self {
        let mut o = Self::default();
        if let Some(v) = env_parse("CODER_CONTEXT_CHARS") { o.context_chars = v; }
        if let Some(v) = env_parse("CODER_QUOTE_MIN") { o.quote_min_chars = v; }
        if let Some(v) = env_parse("CODER_QUOTE_MAX") { o.quote_max_chars = v; }
        if let Some(v) = env_parse("CODER_TOP_N") { o.top_n = v; }
        if let Some(v) = env_parse("CODER_MIN_YEAR") { o.min_year = Some(v); }
        o
    }

    pub fn with_context_chars(mut self, n: usize) -> Self {
        self.context_chars = n;
        self
    }
    pub fn with_sentence_max_chars(mut self, n: usize) -> Self {
        self.sentence_max_chars = n;
        self
    }
    pub fn with_quote_bounds(mut self, min_chars: usize, max_chars: usize) -> Self {
        self.quote_min_chars = min_chars;
        self.quote_max_chars = max_chars.max(min_chars);
        self
    }
    pub fn with_high_engagement_threshold(mut self, t: i64) -> Self {
        self.high_engagement_threshold = t;
        self
    }
    pub fn with_substantive_min_body_chars(mut self, n: usize) -> Self {
        self.substantive_min_body_chars = n;
        self
    }
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }
    pub fn with_parallel(mut self, yes: bool) -> Self {
        self.parallel = yes;
        self
    }
    pub fn with_min_year(mut self, year: Option<u16>) -> Self {
        self.min_year = year;
        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("{} is set but not a valid value: {:?}", key, raw);
            None
        }
    }
}
