use regex::Regex;

use crate::error::Result;
use crate::models::skill::{SkillCategory, SkillSet};
use crate::taxonomy::KeywordCatalog;

/// Builds a case-sensitive pattern matching `phrase` as a whole word.
///
/// The phrase may begin or end with punctuation (`c++`, `node.js`), so the
/// boundary is "no word character on either side" rather than `\b`.
/// Callers match it against lowercased text.
pub(crate) fn whole_word(phrase: &str) -> Result<Regex> {
    let pattern = format!(r"(?:^|[^\w])(?:{})(?:[^\w]|$)", regex::escape(phrase));
    Ok(Regex::new(&pattern)?)
}

struct PhraseMatcher {
    category: SkillCategory,
    phrase: String,
    pattern: Regex,
}

pub struct SkillExtractor {
    matchers: Vec<PhraseMatcher>,
}

impl SkillExtractor {
    pub fn new(catalog: &KeywordCatalog) -> Result<Self> {
        let mut matchers = Vec::new();

        for category in SkillCategory::ALL {
            for phrase in catalog.skills(category) {
                matchers.push(PhraseMatcher {
                    category,
                    phrase: phrase.clone(),
                    pattern: whole_word(phrase)?,
                });
            }
        }

        Ok(Self { matchers })
    }

    /// Every catalog phrase present in `text`, grouped by category in
    /// catalog order.
    pub fn extract_skills(&self, text: &str) -> SkillSet {
        let lowered = text.to_lowercase();
        let mut found = SkillSet::default();

        for matcher in &self.matchers {
            if matcher.pattern.is_match(&lowered) {
                found.push(matcher.category, matcher.phrase.clone());
            }
        }

        found
    }
}
