//! Review shortlists: rule-admitted, reason-tagged posts ranked by engagement.

use crate::classify::LabeledPost;
use crate::post::Post;
use crate::selector::Selector;
use ahash::AHashSet;
use serde::Serialize;

/// Admits posts matching `select`, tagging them with `reason`.
#[derive(Clone, Debug)]
pub struct SelectionRule {
    pub reason: String,
    pub select: Selector,
}

impl SelectionRule {
    pub fn new(reason: impl Into<String>, select: Selector) -> Self {
        Self { reason: reason.into(), select }
    }

    /// This rule's subset, in collection order.
    pub fn apply(&self, posts: &[LabeledPost]) -> Vec<ReviewEntry> {
        posts
            .iter()
            .filter(|p| self.select.test(p))
            .map(|p| ReviewEntry { post: p.clone(), priority_reason: self.reason.clone() })
            .collect()
    }
}

/// A shortlisted post and the rule that admitted it.
#[derive(Clone, Debug, Serialize)]
pub struct ReviewEntry {
    #[serde(flatten)]
    pub post: LabeledPost,
    pub priority_reason: String,
}

/// Apply every rule, concatenate the subsets in rule order, stable-sort by engagement
/// (descending) and keep the first entry per post id. A post admitted by several rules at
/// the same engagement keeps the reason of the earliest rule.
pub fn build_review_set(posts: &[LabeledPost], rules: &[SelectionRule]) -> Vec<ReviewEntry> {
    let mut all: Vec<ReviewEntry> = rules.iter().flat_map(|r| r.apply(posts)).collect();
    all.sort_by(|a, b| b.post.engagement.cmp(&a.post.engagement));
    let mut seen = AHashSet::with_capacity(all.len());
    all.retain(|e| seen.insert(e.post.id().to_string()));
    all
}

/// Shortlist rules of the thematic codebook, in priority order.
pub fn thematic_rules(high_engagement_threshold: i64) -> Vec<SelectionRule> {
    vec![
        SelectionRule::new("Wellness app abandonment", Selector::label("wellness_app_abandoned")),
        SelectionRule::new(
            "Job search + wellness/burnout",
            Selector::label("job_search_tech")
                .and(Selector::any_of(["wellness_app_mentioned", "burnout_exhaustion"])),
        ),
        SelectionRule::new(
            "High-engagement peer support",
            Selector::label("peer_support_seeking").and(Selector::engagement_above(high_engagement_threshold)),
        ),
        SelectionRule::new("Employer program mentioned", Selector::label("employer_program")),
    ]
}

/// Posts with a body longer than `min_body_chars` (trimmed, in chars), most engaging first.
pub fn substantive(posts: &[Post], min_body_chars: usize) -> Vec<Post> {
    let mut v: Vec<Post> = posts
        .iter()
        .filter(|p| p.text.trim().chars().count() > min_body_chars)
        .cloned()
        .collect();
    v.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
    v
}

/// The `n` most engaging posts; ties keep collection order.
pub fn top_by_engagement(posts: &[Post], n: usize) -> Vec<Post> {
    let mut v = posts.to_vec();
    v.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
    v.truncate(n);
    v
}
