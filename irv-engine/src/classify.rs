//! Event summary classification
//!
//! Maps free-text summaries to a small set of display categories by
//! case-insensitive substring matching. Rules are checked in order and the
//! first matching rule wins; no match means [`Category::OfficerGeneric`].

use irv_common::config::KeywordRuleConfig;
use serde::{Deserialize, Serialize};

/// Display category for an event icon
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    ForcedEntry,
    PropertyCrime,
    AllClear,
    OfficerGeneric,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::ForcedEntry => "forced-entry",
            Category::PropertyCrime => "property-crime",
            Category::AllClear => "all-clear",
            Category::OfficerGeneric => "officer-generic",
        }
    }

    /// Icon name for the presentation layer
    pub fn icon(self) -> &'static str {
        match self {
            Category::ForcedEntry => "door-open",
            Category::PropertyCrime => "exclamation-triangle",
            Category::AllClear => "check-circle",
            Category::OfficerGeneric => "user-shield",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "forced-entry" => Some(Category::ForcedEntry),
            "property-crime" => Some(Category::PropertyCrime),
            "all-clear" => Some(Category::AllClear),
            "officer-generic" => Some(Category::OfficerGeneric),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Keywords that map a summary to a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub category: Category,
    /// Stored lowercased
    keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new<I, S>(category: Category, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            category,
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Ordered keyword rules. Pure: the same text always yields the same category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<KeywordRule>,
}

impl Classifier {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Build from config-file rules, rejecting unknown category names
    pub fn from_config(rules: &[KeywordRuleConfig]) -> irv_common::Result<Self> {
        rules
            .iter()
            .map(|rule| {
                Category::parse(&rule.category)
                    .map(|category| KeywordRule::new(category, &rule.keywords))
                    .ok_or_else(|| {
                        irv_common::Error::InvalidInput(format!(
                            "unknown classifier category '{}'",
                            rule.category
                        ))
                    })
            })
            .collect::<irv_common::Result<Vec<_>>>()
            .map(Self::new)
    }

    pub fn classify(&self, summary: &str) -> Category {
        let lowered = summary.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(Category::OfficerGeneric, |rule| rule.category)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(vec![
            KeywordRule::new(
                Category::ForcedEntry,
                ["forced", "forced entry", "breach", "pried", "kicked", "broke in"],
            ),
            KeywordRule::new(
                Category::PropertyCrime,
                ["ransack", "crime", "burglar", "stolen", "theft", "robbery", "damage"],
            ),
            KeywordRule::new(
                Category::AllClear,
                ["all clear", "cleared", "secured", "code 4", "no suspects"],
            ),
        ])
    }
}
