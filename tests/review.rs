#[path = "common/mod.rs"]
mod common;

use common::*;
use discourse_coder::{
    build_review_set, substantive, thematic_rules, top_by_engagement, CategoryDef, Codebook, Post, SelectionRule,
    Selector,
};

fn ab_codebook() -> Codebook {
    Codebook::new(vec![CategoryDef::new("a", "", ["alpha"]), CategoryDef::new("b", "", ["beta"])]).unwrap()
}

/// A post admitted by two rules appears once, with the earlier rule's reason.
#[test]
fn overlapping_rules_keep_first_reason() {
    let cb = ab_codebook();
    let labeled = label(&[Post::new("p", "", "alpha beta").with_score(10)], &cb);
    let rules = vec![
        SelectionRule::new("A", Selector::label("a")),
        SelectionRule::new("B", Selector::label("b")),
    ];
    let set = build_review_set(&labeled, &rules);
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].priority_reason, "A");
    assert_eq!(set[0].post.engagement, 10);
}

#[test]
fn review_set_is_ranked_by_engagement() {
    let cb = ab_codebook();
    let posts = vec![
        Post::new("low", "", "alpha").with_score(1),
        Post::new("mid", "", "beta").with_score(5),
        Post::new("high", "", "alpha").with_score(3).with_comments(7),
        Post::new("none", "", "gamma").with_score(100),
    ];
    let labeled = label(&posts, &cb);
    let rules = vec![
        SelectionRule::new("A", Selector::label("a")),
        SelectionRule::new("B", Selector::label("b")),
    ];
    let set = build_review_set(&labeled, &rules);
    let ids: Vec<&str> = set.iter().map(|e| e.post.id()).collect();
    assert_eq!(ids, vec!["high", "mid", "low"]);
    assert!(build_review_set(&labeled, &[]).is_empty());
}

/// Engagement exactly at the threshold is not "above" it.
#[test]
fn high_engagement_rule_is_strict() {
    let cb = Codebook::thematic();
    let posts = vec![
        Post::new("at", "", "does anyone else feel this").with_score(15).with_comments(5),
        Post::new("over", "", "does anyone else feel this too").with_score(15).with_comments(6),
    ];
    let labeled = label(&posts, &cb);
    let set = build_review_set(&labeled, &thematic_rules(20));
    let ids: Vec<&str> = set.iter().map(|e| e.post.id()).collect();
    assert_eq!(ids, vec!["over"]);
    assert_eq!(set[0].priority_reason, "High-engagement peer support");
}

#[test]
fn thematic_shortlist_for_sample_posts() {
    let cb = Codebook::thematic();
    let labeled = label(&sample_posts(), &cb);
    let set = build_review_set(&labeled, &thematic_rules(20));
    // Post 2 has job search but neither wellness apps nor burnout.
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].post.id(), "1");
    assert_eq!(set[0].priority_reason, "Wellness app abandonment");
}

#[test]
fn review_entries_serialize_flat() {
    let cb = ab_codebook();
    let labeled = label(&[Post::new("p", "T", "alpha").with_score(2)], &cb);
    let set = build_review_set(&labeled, &[SelectionRule::new("A", Selector::label("a"))]);
    let v = serde_json::to_value(&set[0]).unwrap();
    assert_eq!(v["id"], "p");
    assert_eq!(v["priority_reason"], "A");
    assert_eq!(v["labels"]["a"], true);
    assert_eq!(v["labels"]["b"], false);
    assert_eq!(v["engagement"], 2);
}

#[test]
fn substantive_and_top_lists() {
    let long = "x".repeat(60);
    let posts = vec![
        Post::new("short", "", "too short").with_score(50),
        Post::new("long_low", "", long.clone()).with_score(1),
        Post::new("long_high", "", format!("  {}  ", long)).with_score(2),
        Post::new("exact", "", "y".repeat(50)).with_score(9),
    ];
    let subs = substantive(&posts, 50);
    let ids: Vec<&str> = subs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["long_high", "long_low"]);

    let top = top_by_engagement(&posts, 2);
    let ids: Vec<&str> = top.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["short", "exact"]);
    assert_eq!(top_by_engagement(&posts, 10).len(), 4);
}
