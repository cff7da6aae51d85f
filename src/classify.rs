//! Post classification: base keyword labels, then dependency gating.

use crate::codebook::Codebook;
use crate::post::Post;
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Boolean label per codebook category, stored in codebook order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
    values: Vec<bool>,
}

impl LabelSet {
    /// Label for `category`; unknown names read as `false`.
    pub fn get(&self, category: &str) -> bool {
        self.names
            .iter()
            .position(|n| n == category)
            .map(|i| self.values[i])
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn any(&self) -> bool { self.values.iter().any(|&v| v) }
}

impl Serialize for LabelSet {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut m = s.serialize_map(Some(self.values.len()))?;
        for (k, v) in self.iter() {
            m.serialize_entry(k, &v)?;
        }
        m.end()
    }
}

/// Classify already-folded text.
pub fn classify_text(folded: &str, codebook: &Codebook) -> LabelSet {
    let cats = codebook.categories();
    let mut values: Vec<bool> = cats.iter().map(|c| c.hits(folded)).collect();

    // Dependencies come before dependents in gate order, so one pass reaches the fixed point.
    for &i in codebook.gate_order() {
        if let Some(dep) = cats[i].requires_idx {
            if !values[dep] {
                values[i] = false;
            }
        }
    }

    LabelSet { names: cats.iter().map(|c| c.name().to_string()).collect(), values }
}

/// Classify a post on its case-folded `title + " " + body`.
pub fn classify(post: &Post, codebook: &Codebook) -> LabelSet {
    classify_text(&post.folded_text(), codebook)
}

/// A post with its labels, the unit every downstream stage consumes.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LabeledPost {
    #[serde(flatten)]
    pub post: Post,
    pub engagement: i64,
    pub labels: LabelSet,
}

impl LabeledPost {
    pub fn new(post: Post, codebook: &Codebook) -> Self {
        let labels = classify(&post, codebook);
        Self { engagement: post.engagement(), post, labels }
    }

    #[inline]
    pub fn has(&self, category: &str) -> bool {
        self.labels.get(category)
    }

    pub fn id(&self) -> &str { &self.post.id }
}

/// Classify a collection. Output keeps input order whether or not rayon is used.
pub fn classify_all(posts: &[Post], codebook: &Codebook, parallel: bool) -> Vec<LabeledPost> {
    if parallel {
        posts.par_iter().map(|p| LabeledPost::new(p.clone(), codebook)).collect()
    } else {
        posts.iter().map(|p| LabeledPost::new(p.clone(), codebook)).collect()
    }
}
