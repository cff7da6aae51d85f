use crate::classify::LabeledPost;
use std::fmt;
use std::sync::Arc;

/// Boolean predicate over a labeled post (labels plus engagement).
///
/// Built from combinators for the common shapes, or from any closure:
///  - `Selector::label("job_search_tech").and(Selector::any_of(["wellness_app_mentioned", "burnout_exhaustion"]))`
///  - `Selector::by_fn(|p| p.post.text.len() > 50)`
#[derive(Clone)]
pub enum Selector {
    All,
    Label(String),
    AnyOf(Vec<String>),
    AllOf(Vec<String>),
    EngagementAbove(i64),
    And(Box<Selector>, Box<Selector>),
    Or(Box<Selector>, Box<Selector>),
    Not(Box<Selector>),
    ByFn(Arc<dyn Fn(&LabeledPost) -> bool + Send + Sync>),
}

impl Selector {
    pub fn all() -> Self { Self::All }
    pub fn label(name: impl Into<String>) -> Self { Self::Label(name.into()) }
    pub fn any_of<I, S>(names: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> {
        Self::AnyOf(names.into_iter().map(Into::into).collect())
    }
    pub fn all_of<I, S>(names: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> {
        Self::AllOf(names.into_iter().map(Into::into).collect())
    }
    /// Strictly greater than `threshold`.
    pub fn engagement_above(threshold: i64) -> Self { Self::EngagementAbove(threshold) }
    pub fn by_fn(f: impl Fn(&LabeledPost) -> bool + Send + Sync + 'static) -> Self {
        Self::ByFn(Arc::new(f))
    }

    pub fn and(self, other: Selector) -> Self { Self::And(Box::new(self), Box::new(other)) }
    pub fn or(self, other: Selector) -> Self { Self::Or(Box::new(self), Box::new(other)) }
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self { Self::Not(Box::new(self)) }

    pub fn test(&self, p: &LabeledPost) -> bool {
        match self {
            Selector::All => true,
            Selector::Label(n) => p.has(n),
            Selector::AnyOf(ns) => ns.iter().any(|n| p.has(n)),
            Selector::AllOf(ns) => ns.iter().all(|n| p.has(n)),
            Selector::EngagementAbove(t) => p.engagement > *t,
            Selector::And(a, b) => a.test(p) && b.test(p),
            Selector::Or(a, b) => a.test(p) || b.test(p),
            Selector::Not(a) => !a.test(p),
            Selector::ByFn(f) => f(p),
        }
    }

    /// Category names this selector reads; used to check rules against a codebook.
    pub fn referenced_labels(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_labels(&mut out);
        out
    }

    fn collect_labels<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Selector::Label(n) => out.push(n),
            Selector::AnyOf(ns) | Selector::AllOf(ns) => out.extend(ns.iter().map(String::as_str)),
            Selector::And(a, b) | Selector::Or(a, b) => {
                a.collect_labels(out);
                b.collect_labels(out);
            }
            Selector::Not(a) => a.collect_labels(out),
            Selector::All | Selector::EngagementAbove(_) | Selector::ByFn(_) => {}
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => write!(f, "All"),
            Selector::Label(n) => write!(f, "Label({n})"),
            Selector::AnyOf(ns) => write!(f, "AnyOf({ns:?})"),
            Selector::AllOf(ns) => write!(f, "AllOf({ns:?})"),
            Selector::EngagementAbove(t) => write!(f, "EngagementAbove({t})"),
            Selector::And(a, b) => write!(f, "And({a:?}, {b:?})"),
            Selector::Or(a, b) => write!(f, "Or({a:?}, {b:?})"),
            Selector::Not(a) => write!(f, "Not({a:?})"),
            Selector::ByFn(_) => write!(f, "ByFn(..)"),
        }
    }
}
