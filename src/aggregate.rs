//! Counts, shares, co-occurrence and ratios over labeled posts.
//! Empty denominators never fail: percentages become `0.0`, ratios become `None`.

use crate::classify::LabeledPost;
use crate::codebook::Codebook;
use crate::date::YearMonth;
use crate::matcher::Term;
use crate::post::Post;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub description: String,
    pub count: u64,
    pub percentage: f64,
}

/// `count / total * 100`, or `0.0` for an empty total.
#[inline]
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 { 0.0 } else { count as f64 / total as f64 * 100.0 }
}

/// `num / den`, undefined (`None`) for a zero denominator.
#[inline]
pub fn ratio(num: u64, den: u64) -> Option<f64> {
    if den == 0 { None } else { Some(num as f64 / den as f64) }
}

pub fn count_label<'a>(posts: impl IntoIterator<Item = &'a LabeledPost>, category: &str) -> u64 {
    posts.into_iter().filter(|p| p.has(category)).count() as u64
}

fn stat<'a, I>(posts: I, total: u64, name: &str, codebook: &Codebook) -> CategoryStat
where
    I: IntoIterator<Item = &'a LabeledPost>,
{
    let count = count_label(posts, name);
    CategoryStat {
        category: name.to_string(),
        description: codebook.get(name).map(|c| c.description().to_string()).unwrap_or_default(),
        count,
        percentage: percentage(count, total),
    }
}

/// Stats for the named categories, in the given order.
pub fn category_stats<S: AsRef<str>>(posts: &[LabeledPost], names: &[S], codebook: &Codebook) -> Vec<CategoryStat> {
    let total = posts.len() as u64;
    names.iter().map(|n| stat(posts, total, n.as_ref(), codebook)).collect()
}

/// Stats for every codebook category, in codebook order.
pub fn category_summary(posts: &[LabeledPost], codebook: &Codebook) -> Vec<CategoryStat> {
    let names: Vec<&str> = codebook.names().collect();
    category_stats(posts, &names, codebook)
}

/// Like [`category_stats`] but ordered by count, descending; ties keep the given order.
pub fn ranked_stats<S: AsRef<str>>(posts: &[LabeledPost], names: &[S], codebook: &Codebook) -> Vec<CategoryStat> {
    let mut v = category_stats(posts, names, codebook);
    v.sort_by(|a, b| b.count.cmp(&a.count));
    v
}

/// What posts labeled with `pivot` also talk about.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoOccurrence {
    pub pivot: String,
    pub pivot_count: u64,
    /// Every other codebook category; percentages are shares of the pivot subset.
    pub rows: Vec<CategoryStat>,
}

impl CoOccurrence {
    /// Up to `n` non-zero rows, most frequent first.
    pub fn top(&self, n: usize) -> Vec<&CategoryStat> {
        let mut v: Vec<&CategoryStat> = self.rows.iter().filter(|r| r.count > 0).collect();
        v.sort_by(|a, b| b.count.cmp(&a.count));
        v.truncate(n);
        v
    }
}

pub fn co_occurrence(posts: &[LabeledPost], pivot: &str, codebook: &Codebook) -> CoOccurrence {
    let subset: Vec<&LabeledPost> = posts.iter().filter(|p| p.has(pivot)).collect();
    let total = subset.len() as u64;
    let rows = codebook
        .names()
        .filter(|n| *n != pivot)
        .map(|n| stat(subset.iter().copied(), total, n, codebook))
        .collect();
    CoOccurrence { pivot: pivot.to_string(), pivot_count: total, rows }
}

/// Occurrences of one term group over the whole corpus.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TermGroupCount {
    pub group: String,
    pub total: u64,
    /// Non-zero terms only, in the group's order.
    pub terms: Vec<(String, u64)>,
}

/// A named list of terms counted together.
#[derive(Clone, Debug)]
pub struct TermGroup {
    pub name: String,
    pub terms: Vec<Term>,
}

impl TermGroup {
    pub fn new<I, S>(name: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { name: name.into(), terms: terms.into_iter().map(|t| Term::new(t.as_ref())).collect() }
    }
}

/// Count every term of every group across all posts' folded text, with the matcher's
/// `count` semantics (phrases as substrings, tokens on word boundaries).
pub fn keyword_frequencies(posts: &[Post], groups: &[TermGroup]) -> Vec<TermGroupCount> {
    let corpus = posts.iter().map(Post::folded_text).collect::<Vec<_>>().join(" ");
    groups
        .iter()
        .map(|g| {
            let mut total = 0u64;
            let mut terms = Vec::new();
            for term in &g.terms {
                let n = term.count(&corpus) as u64;
                total += n;
                if n > 0 {
                    terms.push((term.as_str().to_string(), n));
                }
            }
            TermGroupCount { group: g.name.clone(), total, terms }
        })
        .collect()
}

/// Term groups of the stress deep dive's frequency table.
pub fn stress_term_groups() -> Vec<TermGroup> {
    vec![
        TermGroup::new("Stress terms", ["stress", "stressed", "stressful"]),
        TermGroup::new("Mental health", ["mental health", "therapy", "counseling"]),
        TermGroup::new("Depression", ["depression", "depressed"]),
        TermGroup::new("Anxiety", ["anxiety", "anxious"]),
        TermGroup::new("Burnout", ["burnout", "burned out", "burnt out"]),
        TermGroup::new("Exhaustion", ["exhausted", "drained"]),
        TermGroup::new("Coping", ["cope", "coping"]),
        TermGroup::new("Support", ["support", "help"]),
        TermGroup::new("Quit/Leave", ["quit", "quitting", "leave", "leaving"]),
        TermGroup::new("Apps general", ["app", "apps", "application"]),
        TermGroup::new("Wellness apps", ["calm", "headspace", "betterhelp", "meditation app"]),
    ]
}

/// Posts per creation month; posts without a timestamp are not counted.
pub fn count_by_month(posts: &[Post]) -> BTreeMap<YearMonth, u64> {
    let mut m = BTreeMap::new();
    for ym in posts.iter().filter_map(Post::month) {
        *m.entry(ym).or_insert(0) += 1;
    }
    m
}

/// Headline patterns of the thematic codebook.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatternReport {
    pub total_posts: u64,
    pub apps_mentioned: u64,
    pub apps_abandoned: u64,
    /// abandoned / mentioned * 100
    pub abandonment_rate: Option<f64>,
    pub job_search: u64,
    /// job search posts per wellness-app post
    pub job_search_vs_wellness: Option<f64>,
    pub peer_support: u64,
    pub peer_support_pct: f64,
    pub financial: u64,
    pub financial_pct: f64,
    pub scheduling: u64,
    pub burnout: u64,
}

impl PatternReport {
    pub fn from_posts(posts: &[LabeledPost]) -> Self {
        let total = posts.len() as u64;
        let apps_mentioned = count_label(posts, "wellness_app_mentioned");
        let apps_abandoned = count_label(posts, "wellness_app_abandoned");
        let job_search = count_label(posts, "job_search_tech");
        let peer_support = count_label(posts, "peer_support_seeking");
        let financial = count_label(posts, "pay_financial_stress");
        Self {
            total_posts: total,
            apps_mentioned,
            apps_abandoned,
            abandonment_rate: ratio(apps_abandoned, apps_mentioned).map(|r| r * 100.0),
            job_search,
            job_search_vs_wellness: ratio(job_search, apps_mentioned),
            peer_support,
            peer_support_pct: percentage(peer_support, total),
            financial,
            financial_pct: percentage(financial, total),
            scheduling: count_label(posts, "scheduling_issues"),
            burnout: count_label(posts, "burnout_exhaustion"),
        }
    }
}

/// Term groups of the collection-time frequency table.
pub fn collection_term_groups() -> Vec<TermGroup> {
    vec![
        TermGroup::new(
            "Technology General",
            ["app", "apps", "phone", "smartphone", "software", "digital", "online", "website", "tech"],
        ),
        TermGroup::new(
            "Wellness Apps",
            ["calm", "headspace", "meditation", "mindfulness", "betterhelp", "talkspace", "therapy app"],
        ),
        TermGroup::new(
            "Job Search",
            ["indeed", "hiring", "job search", "apply", "application", "resume", "interview"],
        ),
        TermGroup::new(
            "Work/Pay",
            ["wage", "wages", "pay", "salary", "hours", "shift", "schedule", "scheduling", "overtime"],
        ),
        TermGroup::new(
            "Stress/Burnout",
            ["stress", "stressed", "burnout", "exhausted", "tired", "overwhelmed", "anxiety", "anxious",
             "depressed", "depression"],
        ),
        TermGroup::new("Quit/Leave", ["quit", "quitting", "leave", "leaving", "resign", "walk out"]),
    ]
}
