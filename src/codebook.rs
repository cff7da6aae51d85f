//! Category definitions ("codes") and the validated, compiled codebook.
//!
//! A codebook is configuration: it is built once, checked once, and then shared read-only
//! by every classification call. Broken rule sets fail here, before any post is touched.

use crate::matcher::Term;
use ahash::AHashMap;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Declarative rule: any keyword present => true, then AND-gated by `requires`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
}

impl CategoryDef {
    pub fn new<I, S>(name: impl Into<String>, description: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            requires: None,
        }
    }

    pub fn requires(mut self, other: impl Into<String>) -> Self {
        self.requires = Some(other.into());
        self
    }
}

/// A category after validation: compiled terms plus the resolved dependency index.
#[derive(Clone, Debug)]
pub struct Category {
    pub def: CategoryDef,
    pub terms: Vec<Term>,
    pub requires_idx: Option<usize>,
}

impl Category {
    pub fn name(&self) -> &str { &self.def.name }
    pub fn description(&self) -> &str { &self.def.description }

    /// Base label: OR over the keyword list on folded text.
    #[inline]
    pub fn hits(&self, folded: &str) -> bool {
        self.terms.iter().any(|t| t.matches(folded))
    }
}

#[derive(Clone, Debug)]
pub struct Codebook {
    categories: Vec<Category>,
    index: AHashMap<String, usize>,
    // Categories with a dependency, ordered so a dependency is gated before its dependents.
    gate_order: Vec<usize>,
}

impl Codebook {
    /// Validate and compile. Fails on duplicate names, empty or blank keywords,
    /// unknown `requires` targets, and dependency cycles.
    pub fn new(defs: Vec<CategoryDef>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(defs.len());
        for (i, d) in defs.iter().enumerate() {
            let name = d.name.trim();
            if name.is_empty() {
                bail!("category #{} has an empty name", i);
            }
            if index.insert(name.to_string(), i).is_some() {
                bail!("duplicate category name: {}", name);
            }
            if d.keywords.is_empty() {
                bail!("category {} has no keywords", name);
            }
            if d.keywords.iter().any(|k| k.trim().is_empty()) {
                bail!("category {} has a blank keyword", name);
            }
        }

        let mut categories = Vec::with_capacity(defs.len());
        for mut def in defs {
            def.name = def.name.trim().to_string();
            let requires_idx = match def.requires.as_deref() {
                Some(dep) => match index.get(dep.trim()) {
                    Some(&j) => Some(j),
                    None => bail!("category {} requires unknown category {}", def.name, dep),
                },
                None => None,
            };
            let terms = def.keywords.iter().map(|k| Term::new(k)).collect();
            categories.push(Category { def, terms, requires_idx });
        }

        let gate_order = gate_order(&categories)?;
        Ok(Self { categories, index, gate_order })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("open codebook {}", path.display()))?;
        let defs: Vec<CategoryDef> = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse codebook {}", path.display()))?;
        Self::new(defs).with_context(|| format!("invalid codebook {}", path.display()))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let defs: Vec<CategoryDef> = serde_json::from_str(s).context("parse codebook")?;
        Self::new(defs)
    }

    pub fn categories(&self) -> &[Category] { &self.categories }
    pub fn len(&self) -> usize { self.categories.len() }
    pub fn is_empty(&self) -> bool { self.categories.is_empty() }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.categories.iter().map(|c| c.name())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.position(name).map(|i| &self.categories[i])
    }

    pub(crate) fn gate_order(&self) -> &[usize] { &self.gate_order }

    /// Coding scheme of the thematic pass: wellness apps, job search, work conditions, support.
    pub fn thematic() -> Self {
        Self::new(thematic_defs()).expect("built-in thematic codebook is valid")
    }

    /// Coding scheme of the stress deep dive: stress, mental health and coping strategies.
    pub fn stress_deep_dive() -> Self {
        Self::new(stress_defs()).expect("built-in stress codebook is valid")
    }
}

/// Topological order over `requires` links (dependencies first). Errors on cycles.
fn gate_order(categories: &[Category]) -> Result<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark { None, Active, Done }

    let mut marks = vec![Mark::None; categories.len()];
    let mut order = Vec::new();
    for start in 0..categories.len() {
        let mut chain = Vec::new();
        let mut cur = Some(start);
        while let Some(i) = cur {
            match marks[i] {
                Mark::Done => break,
                Mark::Active => bail!("dependency cycle through category {}", categories[i].name()),
                Mark::None => {
                    marks[i] = Mark::Active;
                    chain.push(i);
                    cur = categories[i].requires_idx;
                }
            }
        }
        // Deepest dependency was pushed last.
        for &i in chain.iter().rev() {
            marks[i] = Mark::Done;
            if categories[i].requires_idx.is_some() {
                order.push(i);
            }
        }
    }
    Ok(order)
}

pub fn thematic_defs() -> Vec<CategoryDef> {
    vec![
        CategoryDef::new(
            "wellness_app_mentioned",
            "Mentions wellness/mental health apps",
            ["calm", "headspace", "meditation app", "betterhelp", "talkspace", "mindfulness",
             "wellness app", "self-care app", "therapy app", "insight timer", "gratitude journal",
             "mental health app"],
        ),
        CategoryDef::new(
            "wellness_app_abandoned",
            "Discusses not using wellness apps",
            ["never use", "never open", "don't use", "downloaded but", "sitting on my phone",
             "never log in", "forgot about", "too tired to use", "no time to use", "haven't opened"],
        )
        .requires("wellness_app_mentioned"),
        CategoryDef::new(
            "job_search_tech",
            "Technology use for job searching",
            ["indeed", "job search", "looking for another job", "applying", "job application",
             "resume", "interview", "better paying", "new job", "quit", "leaving this job"],
        ),
        CategoryDef::new(
            "scheduling_issues",
            "Work schedule and time issues",
            ["schedule", "scheduling", "shift", "overtime", "mandatory", "call in", "call out",
             "short staffed", "understaffed", "double shift", "no break", "can't take break"],
        ),
        CategoryDef::new(
            "pay_financial_stress",
            "Financial stress and low wages",
            ["pay", "wage", "salary", "money", "afford", "bills", "rent", "broke", "underpaid",
             "minimum wage", "low pay", "poor", "financial", "second job", "side gig"],
        ),
        CategoryDef::new(
            "burnout_exhaustion",
            "Expressions of burnout and exhaustion",
            ["burnout", "burned out", "exhausted", "tired", "drained", "can't do this",
             "overwhelming", "too much", "breaking down", "mental health", "depressed", "anxiety",
             "stressed"],
        ),
        CategoryDef::new(
            "peer_support_seeking",
            "Seeking support from community",
            ["does anyone else", "am i the only", "how do you", "anyone have", "need advice",
             "what should i do", "help", "is this normal"],
        ),
        CategoryDef::new(
            "employer_program",
            "Mentions employer wellness programs",
            ["eap", "employee assistance", "wellness program", "company offered",
             "employer provided", "work program", "benefits", "mental health benefit"],
        ),
    ]
}

pub fn stress_defs() -> Vec<CategoryDef> {
    vec![
        CategoryDef::new(
            "stress_general",
            "General stress mentions",
            ["stress", "stressed", "stressful", "stress out", "so stressed"],
        ),
        CategoryDef::new(
            "mental_health_explicit",
            "Explicit mental health / professional help",
            ["mental health", "mental illness", "therapy", "therapist", "counseling", "counselor",
             "psychiatrist", "medication", "antidepressant", "anxiety medication"],
        ),
        CategoryDef::new(
            "mental_health_conditions",
            "Mental health conditions mentioned",
            ["depression", "depressed", "anxiety", "anxious", "panic attack", "ptsd", "trauma",
             "suicidal", "mental breakdown"],
        ),
        CategoryDef::new(
            "emotional_exhaustion",
            "Emotional/psychological exhaustion",
            ["exhausted", "drained", "can't do this", "breaking down", "falling apart", "losing it",
             "at my limit", "can't take it"],
        ),
        CategoryDef::new(
            "physical_symptoms",
            "Physical manifestations of stress",
            ["can't sleep", "insomnia", "nightmares", "crying", "panic", "shaking", "heart racing",
             "nausea"],
        ),
        CategoryDef::new(
            "coping_mentioned",
            "Discussing coping strategies",
            ["cope", "coping", "deal with", "handle", "manage", "get through", "survive",
             "make it through"],
        ),
        CategoryDef::new(
            "self_care_language",
            "Self-care language (not app-specific)",
            ["self care", "self-care", "take care of myself", "need to relax", "need a break",
             "time for myself"],
        ),
        CategoryDef::new(
            "social_support",
            "Social support seeking/giving",
            ["talk to", "vent", "rant", "need to talk", "listening", "support", "relate", "same",
             "me too", "you're not alone"],
        ),
        CategoryDef::new(
            "substance_coping",
            "Substance use as coping",
            ["drink", "drinking", "alcohol", "wine", "beer", "weed", "marijuana", "smoke", "vape"],
        ),
        CategoryDef::new(
            "exercise_hobbies",
            "Exercise and hobbies as coping",
            ["exercise", "workout", "gym", "run", "running", "walk", "yoga", "hobby", "hobbies",
             "netflix", "music", "reading"],
        ),
        CategoryDef::new(
            "leave_quit",
            "Leaving as stress response",
            ["quit", "quitting", "leave", "leaving", "resign", "last day", "walked out", "new job",
             "better job"],
        ),
        CategoryDef::new(
            "no_solution",
            "Expressions of hopelessness",
            ["nothing helps", "tried everything", "no point", "what's the point", "hopeless",
             "giving up"],
        ),
    ]
}
