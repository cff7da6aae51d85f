#[path = "common/mod.rs"]
mod common;

use common::*;
use discourse_coder::{
    discover_snapshots, export_ndjson, for_each_line, load_posts, load_posts_dir, parse_post, rfc3339_from_epoch,
    NdjsonWriter, Post,
};
use tempfile::tempdir;

fn s(x: &str) -> String { x.to_string() }

/// Bad lines are counted and skipped; aliases and numeric ids are accepted.
#[test]
fn jsonl_ingestion_boundary() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("posts.jsonl");
    write_lines(
        &path,
        &[
            s(r#"{"id":"a","title":"T","selftext":"body a","score":3,"num_comments":2,"created_utc":1136073600}"#),
            s(r#"{"title":"no id"}"#),
            s("not json"),
            s(""),
            s(r#"{"id":"a","title":"dup"}"#),
            s(r#"{"id":42,"body":"numeric id","score":1.0,"num_comments":-4}"#),
            s(r#"{"id":"   "}"#),
        ],
    );

    let rep = load_posts(&path, None).unwrap();
    assert_eq!(rep.rejected, 3, "missing id, bad JSON, blank id");
    assert_eq!(rep.duplicates, 1);
    assert_eq!(rep.posts.len(), 2);

    let a = &rep.posts[0];
    assert_eq!(a.id, "a");
    assert_eq!(a.title, "T", "first occurrence wins");
    assert_eq!(a.text, "body a");
    assert_eq!(a.engagement(), 5);

    let n = &rep.posts[1];
    assert_eq!(n.id, "42");
    assert_eq!(n.text, "numeric id");
    assert_eq!(n.num_comments, 0, "negative counts clamp to zero");
    assert_eq!(n.created_utc, None);
}

#[test]
fn missing_fields_get_defaults() {
    let p = parse_post(r#"{"id":"x"}"#).unwrap();
    assert_eq!(p, Post::new("x", "", ""));
    assert!(parse_post(r#"{"text":"orphan"}"#).is_err());
}

#[test]
fn zstd_snapshots_and_crlf_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("posts.jsonl.zst");
    write_zst_lines(&path, &[s(r#"{"id":"z1","title":"one"}"#), s("\r"), s(r#"{"id":"z2","title":"two"}"#)]);

    let mut seen = Vec::new();
    for_each_line(&path, |l| seen.push(l.to_string())).unwrap();
    assert_eq!(seen.len(), 2, "blank CR-only line is skipped");

    let rep = load_posts(&path, None).unwrap();
    let ids: Vec<&str> = rep.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["z1", "z2"]);
}

/// Files merge in name order; ids from earlier files win.
#[test]
fn directory_merge_and_min_year() {
    let dir = tempdir().unwrap();
    write_lines(&dir.path().join("a.jsonl"), &[s(r#"{"id":"1","title":"from a","created_utc":1136073600}"#)]);
    write_zst_lines(
        &dir.path().join("b.zst"),
        &[s(r#"{"id":"1","title":"from b"}"#), s(r#"{"id":"2","title":"new","created_utc":1609459200}"#)],
    );
    write_lines(&dir.path().join("notes.txt"), &[s("ignored")]);

    let files = discover_snapshots(dir.path());
    assert_eq!(files.len(), 2);

    let rep = load_posts_dir(dir.path(), None).unwrap();
    assert_eq!(rep.posts.len(), 2);
    assert_eq!(rep.posts[0].title, "from a");
    assert_eq!(rep.duplicates, 1);

    // 2006 post is dropped; undated posts are kept.
    let rep = load_posts_dir(dir.path(), Some(2020)).unwrap();
    let ids: Vec<&str> = rep.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(rep.posts[0].title, "from b");
}

#[test]
fn empty_directory_loads_nothing() {
    let dir = tempdir().unwrap();
    let rep = load_posts_dir(dir.path(), None).unwrap();
    assert!(rep.posts.is_empty());
}

#[test]
fn export_writes_ndjson_with_rfc3339_dates() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("nested").join("posts.ndjson");
    let posts = vec![
        Post::new("a", "t", "b").with_created(1_136_073_600),
        Post::new("b", "", ""),
    ];
    let n = export_ndjson(&dest, &posts).unwrap();
    assert_eq!(n, 2);
    assert!(!dest.with_extension("ndjson.inprogress").exists());

    let rows = read_jsonl_values(&dest);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["created_utc"], "2006-01-01T00:00:00Z");
    assert!(rows[1]["created_utc"].is_null());
    assert!(rows[1].get("url").is_none());
    assert_eq!(rfc3339_from_epoch(1_136_073_600).as_deref(), Some("2006-01-01T00:00:00Z"));

    // Re-export replaces the previous file.
    let mut w = NdjsonWriter::create(&dest).unwrap();
    w.write_record(&posts[1]).unwrap();
    assert_eq!(w.finish().unwrap(), 1);
    assert_eq!(read_jsonl_values(&dest).len(), 1);
}
