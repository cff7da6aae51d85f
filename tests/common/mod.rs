#![allow(dead_code)]

use discourse_coder::{classify_all, Codebook, LabeledPost, Post};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// The two posts of the end-to-end scenario: an abandoned wellness app and a job search.
pub fn sample_posts() -> Vec<Post> {
    vec![
        Post::new("1", "", "I downloaded Calm but never open it, too tired").with_score(5).with_comments(2),
        Post::new("2", "", "Applying on Indeed for a new job, current pay is too low").with_score(10).with_comments(1),
    ]
}

/// A small mixed corpus for the stress codebook:
/// - s1: stress + coping + exercise
/// - s2: stress only
/// - s3: coping only
pub fn stress_posts() -> Vec<Post> {
    vec![
        Post::new("s1", "Long week", "So much stress, I cope by running").with_score(3),
        Post::new("s2", "", "stress at work").with_score(1),
        Post::new("s3", "", "I cope fine").with_score(2),
    ]
}

pub fn label(posts: &[Post], codebook: &Codebook) -> Vec<LabeledPost> {
    classify_all(posts, codebook, false)
}

/// Write plain NDJSON lines.
pub fn write_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Write a zstd-compressed NDJSON file.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Read an NDJSON file into JSON values (skips empty lines).
pub fn read_jsonl_values(path: &Path) -> Vec<serde_json::Value> {
    let f = File::open(path).unwrap();
    BufReader::new(f)
        .lines()
        .map(|l| l.unwrap())
        .filter(|s| !s.is_empty())
        .map(|s| serde_json::from_str(&s).unwrap())
        .collect()
}
