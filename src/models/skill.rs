use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Soft,
    Business,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 3] = [
        SkillCategory::Technical,
        SkillCategory::Soft,
        SkillCategory::Business,
    ];
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillCategory::Technical => write!(f, "Technical"),
            SkillCategory::Soft => write!(f, "Soft"),
            SkillCategory::Business => write!(f, "Business"),
        }
    }
}

/// Catalog phrases found in a text, per category, in catalog order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillSet {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub business: Vec<String>,
}

impl SkillSet {
    pub fn get(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::Technical => &self.technical,
            SkillCategory::Soft => &self.soft,
            SkillCategory::Business => &self.business,
        }
    }

    pub fn push(&mut self, category: SkillCategory, phrase: impl Into<String>) {
        let bucket = match category {
            SkillCategory::Technical => &mut self.technical,
            SkillCategory::Soft => &mut self.soft,
            SkillCategory::Business => &mut self.business,
        };
        bucket.push(phrase.into());
    }

    pub fn contains(&self, category: SkillCategory, phrase: &str) -> bool {
        self.get(category).iter().any(|p| p == phrase)
    }

    pub fn total(&self) -> usize {
        self.technical.len() + self.soft.len() + self.business.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Number of phrases found under the same category in both sets.
    pub fn overlap(&self, other: &SkillSet) -> usize {
        SkillCategory::ALL
            .iter()
            .map(|&category| {
                self.get(category)
                    .iter()
                    .filter(|phrase| other.contains(category, phrase))
                    .count()
            })
            .sum()
    }
}
