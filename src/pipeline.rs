use crate::aggregate::{
    category_summary, co_occurrence, collection_term_groups, count_by_month, keyword_frequencies,
    ranked_stats, stress_term_groups, CategoryStat, CoOccurrence, PatternReport, TermGroup, TermGroupCount,
};
use crate::classify::{classify_all, LabeledPost};
use crate::codebook::Codebook;
use crate::config::CodingOptions;
use crate::date::YearMonth;
use crate::ndjson::export_ndjson;
use crate::post::Post;
use crate::quotes::{collect_sentence_quotes, ContextQuoteRule, QuoteCandidate, SentenceQuoteRule};
use crate::review::{build_review_set, substantive, thematic_rules, ReviewEntry, SelectionRule};
use crate::selector::Selector;
use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`). Only the first call in a
/// process does anything; a subscriber already installed by the host is left alone.
pub fn init_tracing_once() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}

/// One batch coding pass: a codebook plus the analyses to run over its labels.
#[derive(Clone, Debug)]
pub struct CodingRun {
    opts: CodingOptions,
    codebook: Codebook,
    pivot: Option<String>,
    ranked: Vec<String>,
    rules: Vec<SelectionRule>,
    context_quotes: Vec<ContextQuoteRule>,
    sentence_quotes: Vec<SentenceQuoteRule>,
    term_groups: Vec<TermGroup>,
    patterns: bool,
}

impl CodingRun {
    pub fn new(codebook: Codebook) -> Self {
        Self {
            opts: CodingOptions::default(),
            codebook,
            pivot: None,
            ranked: Vec::new(),
            rules: Vec::new(),
            context_quotes: Vec::new(),
            sentence_quotes: Vec::new(),
            term_groups: Vec::new(),
            patterns: false,
        }
    }

    // -------- Builder methods --------
    pub fn options(mut self, opts: CodingOptions) -> Self { self.opts = opts; self }
    pub fn pivot(mut self, category: impl Into<String>) -> Self { self.pivot = Some(category.into()); self }
    pub fn ranked<I, S>(mut self, categories: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> {
        self.ranked = categories.into_iter().map(Into::into).collect(); self
    }
    pub fn rule(mut self, rule: SelectionRule) -> Self { self.rules.push(rule); self }
    pub fn rules(mut self, rules: Vec<SelectionRule>) -> Self { self.rules.extend(rules); self }
    pub fn context_quotes(mut self, rule: ContextQuoteRule) -> Self { self.context_quotes.push(rule); self }
    pub fn sentence_quotes(mut self, rule: SentenceQuoteRule) -> Self { self.sentence_quotes.push(rule); self }
    pub fn term_groups(mut self, groups: Vec<TermGroup>) -> Self { self.term_groups = groups; self }
    pub fn with_patterns(mut self, yes: bool) -> Self { self.patterns = yes; self }

    pub fn codebook(&self) -> &Codebook { &self.codebook }
    pub fn opts(&self) -> &CodingOptions { &self.opts }

    // -------- Presets --------

    /// Thematic pass: app adoption/abandonment, job search, work conditions; priority shortlist
    /// and sentence-level quote candidates.
    pub fn thematic(opts: CodingOptions) -> Self {
        let rules = thematic_rules(opts.high_engagement_threshold);
        Self::new(Codebook::thematic())
            .options(opts)
            .rules(rules)
            .sentence_quotes(
                SentenceQuoteRule::new("wellness_app_abandoned", Selector::label("wellness_app_abandoned"))
                    .require_any(["calm", "headspace", "app"])
                    .require_any(["never", "don't", "haven't", "tired", "time"]),
            )
            .sentence_quotes(
                SentenceQuoteRule::new("job_search", Selector::label("job_search_tech"))
                    .require_any(["indeed", "job", "pay"]),
            )
            .sentence_quotes(
                SentenceQuoteRule::new("burnout", Selector::label("burnout_exhaustion"))
                    .limit(50)
                    .first_sentences(2)
                    .require_any(["tired", "exhausted", "burnout", "can't"]),
            )
            .term_groups(collection_term_groups())
            .with_patterns(true)
    }

    /// Stress deep dive: co-occurrence around `stress_general`, coping strategy ranking and
    /// themed context quotes.
    pub fn stress_deep_dive(opts: CodingOptions) -> Self {
        Self::new(Codebook::stress_deep_dive())
            .options(opts)
            .pivot("stress_general")
            .ranked([
                "coping_mentioned", "social_support", "substance_coping",
                "exercise_hobbies", "leave_quit", "mental_health_explicit",
            ])
            .context_quotes(ContextQuoteRule::new(
                "stress_and_coping",
                Selector::all_of(["stress_general", "coping_mentioned"]),
                ["stress", "cope", "deal with"],
            ))
            .context_quotes(ContextQuoteRule::new(
                "mental_health",
                Selector::any_of(["mental_health_explicit", "mental_health_conditions"]),
                ["mental health", "therapy", "depression", "anxiety"],
            ))
            .context_quotes(
                ContextQuoteRule::new(
                    "peer_support",
                    Selector::label("social_support"),
                    ["support", "relate", "you're not alone", "me too"],
                )
                .limit(30),
            )
            .context_quotes(
                ContextQuoteRule::new("leaving_quitting", Selector::label("leave_quit"), ["quit", "leaving", "last day"])
                    .limit(30),
            )
            .context_quotes(ContextQuoteRule::new(
                "hopelessness",
                Selector::label("no_solution"),
                ["nothing helps", "hopeless", "no point"],
            ))
            .term_groups(stress_term_groups())
    }

    /// Every category name this run reads must exist in the codebook.
    fn validate(&self) -> Result<()> {
        let mut refs: Vec<&str> = Vec::new();
        refs.extend(self.pivot.as_deref());
        refs.extend(self.ranked.iter().map(String::as_str));
        for r in &self.rules {
            refs.extend(r.select.referenced_labels());
        }
        for r in &self.context_quotes {
            refs.extend(r.select.referenced_labels());
        }
        for r in &self.sentence_quotes {
            refs.extend(r.select.referenced_labels());
        }
        if let Some(unknown) = refs.into_iter().find(|n| self.codebook.position(n).is_none()) {
            bail!("run references unknown category {}", unknown);
        }
        Ok(())
    }

    /// Classify `posts` and compute every configured analysis.
    pub fn run(&self, posts: &[Post]) -> Result<RunReport> {
        init_tracing_once();
        self.validate()?;

        let labeled = classify_all(posts, &self.codebook, self.opts.parallel);
        let summary = category_summary(&labeled, &self.codebook);
        for s in &summary {
            tracing::info!("{}: {} posts ({:.1}%)", s.category, s.count, s.percentage);
        }

        let co = self.pivot.as_deref().map(|p| co_occurrence(&labeled, p, &self.codebook));
        if let Some(co) = &co {
            tracing::info!("{} posts labeled {}", co.pivot_count, co.pivot);
        }

        let ranked = ranked_stats(&labeled, &self.ranked, &self.codebook);
        let review = build_review_set(&labeled, &self.rules);
        if !self.rules.is_empty() {
            tracing::info!("Priority review list: {} posts", review.len());
        }

        let quote_collections: Vec<QuoteCollection> = self
            .context_quotes
            .iter()
            .map(|r| QuoteCollection { theme: r.theme.clone(), quotes: r.collect(&labeled, &self.opts) })
            .collect();
        for c in &quote_collections {
            tracing::info!("Quotes {}: {}", c.theme, c.quotes.len());
        }
        let sentence_quotes = collect_sentence_quotes(&labeled, &self.sentence_quotes, &self.opts);
        if !self.sentence_quotes.is_empty() {
            tracing::info!("Sentence quote candidates: {}", sentence_quotes.len());
        }

        let mut top_engaged = substantive(posts, self.opts.substantive_min_body_chars);
        top_engaged.truncate(self.opts.top_n);

        Ok(RunReport {
            patterns: self.patterns.then(|| PatternReport::from_posts(&labeled)),
            term_counts: keyword_frequencies(posts, &self.term_groups),
            by_month: count_by_month(posts),
            labeled,
            summary,
            co_occurrence: co,
            ranked,
            review,
            quote_collections,
            sentence_quotes,
            top_engaged,
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct QuoteCollection {
    pub theme: String,
    pub quotes: Vec<QuoteCandidate>,
}

/// Everything a run produces, as ordered in-memory records.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub labeled: Vec<LabeledPost>,
    pub summary: Vec<CategoryStat>,
    pub co_occurrence: Option<CoOccurrence>,
    pub ranked: Vec<CategoryStat>,
    pub review: Vec<ReviewEntry>,
    pub quote_collections: Vec<QuoteCollection>,
    pub sentence_quotes: Vec<QuoteCandidate>,
    pub patterns: Option<PatternReport>,
    pub term_counts: Vec<TermGroupCount>,
    pub by_month: BTreeMap<YearMonth, u64>,
    pub top_engaged: Vec<Post>,
}

#[derive(Serialize)]
struct MonthCount {
    month: String,
    posts: u64,
}

impl RunReport {
    pub fn quotes(&self, theme: &str) -> Option<&[QuoteCandidate]> {
        self.quote_collections.iter().find(|c| c.theme == theme).map(|c| c.quotes.as_slice())
    }

    /// Write every non-empty artifact as `<dir>/<stem>_<artifact>.ndjson`.
    pub fn export(&self, dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        let mut write = |name: &str, f: &dyn Fn(&Path) -> Result<u64>| -> Result<()> {
            let p = dir.join(format!("{}_{}.ndjson", stem, name));
            f(&p)?;
            out.push(p);
            Ok(())
        };

        write("coded_posts", &|p| export_ndjson(p, &self.labeled))?;
        write("summary", &|p| export_ndjson(p, &self.summary))?;
        if let Some(co) = &self.co_occurrence {
            write("co_occurrence", &|p| export_ndjson(p, &co.rows))?;
        }
        if !self.ranked.is_empty() {
            write("ranked", &|p| export_ndjson(p, &self.ranked))?;
        }
        if !self.review.is_empty() {
            write("priority_review", &|p| export_ndjson(p, &self.review))?;
        }
        for c in self.quote_collections.iter().filter(|c| !c.quotes.is_empty()) {
            write(&format!("quotes_{}", c.theme), &|p| export_ndjson(p, &c.quotes))?;
        }
        if !self.sentence_quotes.is_empty() {
            write("quote_candidates", &|p| export_ndjson(p, &self.sentence_quotes))?;
        }
        if let Some(pat) = &self.patterns {
            write("patterns", &|p| export_ndjson(p, std::iter::once(pat)))?;
        }
        if !self.term_counts.is_empty() {
            write("term_counts", &|p| export_ndjson(p, &self.term_counts))?;
        }
        if !self.by_month.is_empty() {
            let rows: Vec<MonthCount> =
                self.by_month.iter().map(|(ym, n)| MonthCount { month: ym.to_string(), posts: *n }).collect();
            write("by_month", &|p| export_ndjson(p, &rows))?;
        }
        if !self.top_engaged.is_empty() {
            write("top_engaged", &|p| export_ndjson(p, &self.top_engaged))?;
        }
        Ok(out)
    }
}
