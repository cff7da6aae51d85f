//! Post record and the ingestion-boundary conversion from loosely typed JSON.
//!
//! Everything downstream of `Post` assumes fields are present: missing text is `""`,
//! missing counters are `0`. Records without an identifier never get this far.

use crate::date::{rfc3339_from_epoch, YearMonth};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A collected post. Immutable once built; labels live alongside it, never inside it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub text: String,
    pub score: i64,
    pub num_comments: i64,
    #[serde(serialize_with = "ser_created")]
    pub created_utc: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn ser_created<S: Serializer>(ts: &Option<i64>, s: S) -> Result<S::Ok, S::Error> {
    match ts.and_then(rfc3339_from_epoch) {
        Some(txt) => s.serialize_str(&txt),
        None => s.serialize_none(),
    }
}

impl Post {
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            score: 0,
            num_comments: 0,
            created_utc: None,
            url: None,
        }
    }

    pub fn with_score(mut self, score: i64) -> Self { self.score = score; self }
    pub fn with_comments(mut self, n: i64) -> Self { self.num_comments = n.max(0); self }
    pub fn with_created(mut self, ts: i64) -> Self { self.created_utc = Some(ts); self }

    /// Ranking signal: score plus comment count.
    #[inline]
    pub fn engagement(&self) -> i64 {
        self.score.saturating_add(self.num_comments)
    }

    /// `title + " " + body`, original case. Quotes are cut from this.
    pub fn full_text(&self) -> String {
        let mut s = String::with_capacity(self.title.len() + self.text.len() + 1);
        s.push_str(&self.title);
        s.push(' ');
        s.push_str(&self.text);
        s
    }

    /// Case-folded `full_text`, the haystack for keyword matching.
    pub fn folded_text(&self) -> String {
        self.full_text().to_lowercase()
    }

    pub fn month(&self) -> Option<YearMonth> {
        self.created_utc.and_then(YearMonth::from_epoch)
    }

    /// Convert a raw record, applying defaults. Fails only when the id is missing or blank.
    pub fn try_from_raw(raw: RawPost) -> Result<Self> {
        let id = match raw.id {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        if id.is_empty() {
            bail!("post record has no id");
        }
        Ok(Self {
            id,
            title: raw.title.unwrap_or_default(),
            text: raw.text.unwrap_or_default(),
            score: raw.score.map(|v| v as i64).unwrap_or(0),
            num_comments: raw.num_comments.map(|v| (v as i64).max(0)).unwrap_or(0),
            created_utc: raw.created_utc.map(|v| v as i64),
            url: raw.url.filter(|u| !u.is_empty()),
        })
    }
}

/// Line-level schema of a snapshot record. Every field is optional; unknown fields are ignored.
/// Counters are read as floats so both `12` and `12.0` parse.
#[derive(Debug, Default, Deserialize)]
pub struct RawPost {
    pub id: Option<Value>,
    pub title: Option<String>,
    #[serde(alias = "selftext", alias = "body")]
    pub text: Option<String>,
    pub score: Option<f64>,
    pub num_comments: Option<f64>,
    pub created_utc: Option<f64>,
    #[serde(alias = "permalink")]
    pub url: Option<String>,
}

/// Parse one JSON line into a `Post`.
pub fn parse_post(line: &str) -> Result<Post> {
    let raw: RawPost = serde_json::from_str(line)?;
    Post::try_from_raw(raw)
}
