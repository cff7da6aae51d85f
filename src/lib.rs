mod config;
mod date;
mod post;
mod source;

mod matcher;
mod codebook;
mod classify;
mod selector;

mod sentences;
mod quotes;
mod aggregate;
mod review;

mod ndjson;
mod pipeline;

pub use crate::config::CodingOptions;
pub use crate::date::{rfc3339_from_epoch, YearMonth};
pub use crate::post::{parse_post, Post, RawPost};
pub use crate::pipeline::{init_tracing_once, CodingRun, QuoteCollection, RunReport};

// Core: matching, codebooks and classification.
pub use crate::matcher::{count, matches, Term};
pub use crate::codebook::{stress_defs, thematic_defs, Category, CategoryDef, Codebook};
pub use crate::classify::{classify, classify_all, classify_text, LabelSet, LabeledPost};
pub use crate::selector::Selector;

// Core: sentences, quotes, statistics and review shortlists.
pub use crate::sentences::{split_fragments, split_sentences, DEFAULT_MAX_SENTENCE_CHARS, MIN_SENTENCE_CHARS};
pub use crate::quotes::{
    collect_sentence_quotes, dedupe_quotes, extract_context_quote, quote_len_ok, ContextQuoteRule,
    QuoteCandidate, SentenceQuoteRule, DEFAULT_CONTEXT_CHARS,
};
pub use crate::aggregate::{
    category_stats, category_summary, co_occurrence, collection_term_groups, count_by_month, count_label,
    keyword_frequencies, percentage, ranked_stats, ratio, stress_term_groups, CategoryStat, CoOccurrence,
    PatternReport, TermGroup, TermGroupCount,
};
pub use crate::review::{build_review_set, substantive, thematic_rules, top_by_engagement, ReviewEntry, SelectionRule};

// Ingestion and export glue.
pub use crate::source::{discover_snapshots, for_each_line, load_posts, load_posts_dir, LoadReport};
pub use crate::ndjson::{export_ndjson, NdjsonWriter};
