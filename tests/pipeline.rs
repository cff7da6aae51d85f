#[path = "common/mod.rs"]
mod common;

use common::*;
use discourse_coder::{
    init_tracing_once, Codebook, CodingOptions, CodingRun, ContextQuoteRule, Post, SelectionRule, Selector,
};
use tempfile::tempdir;

fn opts() -> CodingOptions {
    CodingOptions::default().with_parallel(false)
}

#[test]
fn thematic_run_on_sample_posts() {
    let report = CodingRun::thematic(opts()).run(&sample_posts()).unwrap();

    assert_eq!(report.labeled.len(), 2);
    assert_eq!(report.summary.len(), 8);
    assert!(report.co_occurrence.is_none());
    assert!(report.ranked.is_empty());

    assert_eq!(report.review.len(), 1);
    assert_eq!(report.review[0].post.id(), "1");

    let patterns = report.patterns.as_ref().unwrap();
    assert_eq!(patterns.total_posts, 2);
    assert_eq!(patterns.abandonment_rate, Some(100.0));

    // Post 1's only sentence matches two themes; one copy survives, from the earlier rule.
    let ids: Vec<&str> = report.sentence_quotes.iter().map(|q| q.post_id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
    assert_eq!(report.sentence_quotes[1].theme, "wellness_app_abandoned");
    assert_eq!(report.sentence_quotes[1].quote, "I downloaded Calm but never open it, too tired");

    assert_eq!(report.term_counts.len(), 6);
    let job = report.term_counts.iter().find(|g| g.group == "Job Search").unwrap();
    assert_eq!(job.total, 1, "\"applying\" is not a hit for \"apply\"");

    // Only post 2 has a body over 50 chars.
    let top: Vec<&str> = report.top_engaged.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(top, vec!["2"]);
    assert!(report.by_month.is_empty());
}

#[test]
fn stress_run_with_context_quotes() {
    let mut posts = stress_posts();
    posts.push(
        Post::new("q", "", "Intro. I have so much stress at work and I do not know how to cope with it anymore. End")
            .with_score(5),
    );
    let report = CodingRun::stress_deep_dive(opts()).run(&posts).unwrap();

    let co = report.co_occurrence.as_ref().unwrap();
    assert_eq!(co.pivot, "stress_general");
    assert_eq!(co.pivot_count, 3);

    assert_eq!(report.ranked.len(), 6);
    assert_eq!(report.ranked[0].category, "coping_mentioned");
    assert_eq!(report.ranked[0].count, 3);

    let quotes = report.quotes("stress_and_coping").unwrap();
    assert_eq!(quotes.len(), 1, "s1 is too short to quote");
    assert_eq!(quotes[0].post_id, "q");
    assert_eq!(quotes[0].quote, "I have so much stress at work and I do not know how to cope with it anymore");
    assert!(report.quotes("hopelessness").unwrap().is_empty());
    assert!(report.quotes("no_such_theme").is_none());

    assert!(report.review.is_empty());
    assert!(report.patterns.is_none());
}

#[test]
fn unknown_category_references_fail() {
    let posts = sample_posts();
    assert!(CodingRun::new(Codebook::thematic()).pivot("nope").run(&posts).is_err());
    assert!(CodingRun::new(Codebook::thematic()).ranked(["burnout_exhaustion", "nope"]).run(&posts).is_err());
    assert!(CodingRun::new(Codebook::thematic())
        .rule(SelectionRule::new("x", Selector::label("a").or(Selector::label("nope").not())))
        .run(&posts)
        .is_err());
    assert!(CodingRun::new(Codebook::thematic())
        .context_quotes(ContextQuoteRule::new("x", Selector::label("nope"), ["calm"]))
        .run(&posts)
        .is_err());
}

#[test]
fn custom_run_with_closure_selector() {
    let run = CodingRun::new(Codebook::thematic())
        .options(opts())
        .rule(SelectionRule::new("Long posts", Selector::by_fn(|p| p.post.text.len() > 50)));
    let report = run.run(&sample_posts()).unwrap();
    assert_eq!(report.review.len(), 1);
    assert_eq!(report.review[0].priority_reason, "Long posts");
    assert!(report.sentence_quotes.is_empty());
}

#[test]
fn export_writes_one_file_per_artifact() {
    let dir = tempdir().unwrap();
    let posts: Vec<Post> = sample_posts().into_iter().map(|p| p.with_created(1_136_073_600)).collect();
    let report = CodingRun::thematic(opts()).run(&posts).unwrap();
    let files = report.export(dir.path(), "thematic").unwrap();

    let names: Vec<String> =
        files.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
    assert_eq!(
        names,
        vec![
            "thematic_coded_posts.ndjson",
            "thematic_summary.ndjson",
            "thematic_priority_review.ndjson",
            "thematic_quote_candidates.ndjson",
            "thematic_patterns.ndjson",
            "thematic_term_counts.ndjson",
            "thematic_by_month.ndjson",
            "thematic_top_engaged.ndjson",
        ]
    );
    assert!(files.iter().all(|p| p.exists()));

    let coded = read_jsonl_values(&files[0]);
    assert_eq!(coded.len(), 2);
    assert_eq!(coded[0]["id"], "1");
    assert_eq!(coded[0]["engagement"], 7);
    assert_eq!(coded[0]["labels"]["wellness_app_abandoned"], true);
    assert_eq!(coded[0]["created_utc"], "2006-01-01T00:00:00Z");

    let review = read_jsonl_values(&files[2]);
    assert_eq!(review[0]["priority_reason"], "Wellness app abandonment");

    let months = read_jsonl_values(&files[6]);
    assert_eq!(months.len(), 1);
    assert_eq!(months[0]["month"], "2006-01");
    assert_eq!(months[0]["posts"], 2);
}

/// Repeated runs share one subscriber; setting it up again is a no-op.
#[test]
fn tracing_setup_is_idempotent() {
    init_tracing_once();
    init_tracing_once();
    let report = CodingRun::thematic(opts()).run(&sample_posts()).unwrap();
    assert_eq!(report.labeled.len(), 2);
}

/// A window with exactly two fragments yields an empty excerpt, which the length filter drops.
#[test]
fn two_fragment_windows_are_not_quoted() {
    let posts = vec![Post::new(
        "w",
        "",
        "I have so much stress at work these days and nothing helps. Then I try to cope by walking",
    )
    .with_score(8)];
    let report = CodingRun::stress_deep_dive(opts()).run(&posts).unwrap();
    assert!(report.labeled[0].has("stress_general") && report.labeled[0].has("coping_mentioned"));
    assert!(report.quotes("stress_and_coping").unwrap().is_empty());
}
