//! Singular/plural lookup used when deriving routes from controller names

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Word inflection collaborator.
pub trait Inflector: Send + Sync {
    fn singularize(&self, word: &str) -> String;
    fn pluralize(&self, word: &str) -> String;
}

static IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("quiz", "quizzes"),
];

static UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "news",
    "data",
    "metadata",
    "feedback",
];

static PLURAL_OF: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| IRREGULAR.iter().copied().collect());

static SINGULAR_OF: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| IRREGULAR.iter().map(|&(s, p)| (p, s)).collect());

/// Rule-based English inflection with a table of irregular and uncountable
/// words. Extra irregular pairs can be registered per instance.
#[derive(Debug, Clone, Default)]
pub struct EnglishInflector {
    extra: Vec<(String, String)>,
}

impl EnglishInflector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_irregular(mut self, singular: &str, plural: &str) -> Self {
        self.extra
            .push((singular.to_lowercase(), plural.to_lowercase()));
        self
    }

    fn is_uncountable(word: &str) -> bool {
        UNCOUNTABLE.iter().any(|w| *w == word)
    }
}

fn ends_with_consonant_y(word: &str) -> bool {
    let mut chars = word.chars().rev();
    matches!(
        (chars.next(), chars.next()),
        (Some('y'), Some(c)) if !"aeiou".contains(c)
    )
}

impl Inflector for EnglishInflector {
    fn singularize(&self, word: &str) -> String {
        let lower = word.to_lowercase();

        if let Some((singular, _)) = self.extra.iter().find(|(_, p)| *p == lower) {
            return singular.clone();
        }
        if let Some(singular) = SINGULAR_OF.get(lower.as_str()) {
            return singular.to_string();
        }
        if Self::is_uncountable(&lower) || PLURAL_OF.contains_key(lower.as_str()) {
            return lower;
        }

        if let Some(stem) = lower.strip_suffix("ies") {
            if !stem.is_empty() {
                return format!("{}y", stem);
            }
        }
        for suffix in ["sses", "xes", "zes", "ches", "shes"] {
            if lower.ends_with(suffix) {
                return lower[..lower.len() - 2].to_string();
            }
        }
        if lower.ends_with('s')
            && !lower.ends_with("ss")
            && !lower.ends_with("us")
            && !lower.ends_with("is")
            && lower.len() > 1
        {
            return lower[..lower.len() - 1].to_string();
        }

        lower
    }

    fn pluralize(&self, word: &str) -> String {
        let lower = word.to_lowercase();

        if let Some((_, plural)) = self.extra.iter().find(|(s, _)| *s == lower) {
            return plural.clone();
        }
        if let Some(plural) = PLURAL_OF.get(lower.as_str()) {
            return plural.to_string();
        }
        if Self::is_uncountable(&lower) || SINGULAR_OF.contains_key(lower.as_str()) {
            return lower;
        }

        if ends_with_consonant_y(&lower) {
            return format!("{}ies", &lower[..lower.len() - 1]);
        }
        if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
            return format!("{}es", lower);
        }

        format!("{}s", lower)
    }
}
