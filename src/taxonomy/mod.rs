use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::skill::SkillCategory;

/// Reference vocabulary used by the scoring pipeline.
///
/// Every phrase is stored lowercased and trimmed; order is significant
/// (skills are reported in catalog order and job titles are scanned in
/// catalog order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCatalog {
    technical_skills: Vec<String>,
    soft_skills: Vec<String>,
    business_skills: Vec<String>,
    job_titles: Vec<String>,
    section_headings: Vec<String>,
    required_sections: Vec<String>,
    action_verbs: Vec<String>,
    core_action_verbs: Vec<String>,
    education_keywords: Vec<String>,
    experience_keywords: Vec<String>,
}

impl KeywordCatalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            technical_skills: Vec::new(),
            soft_skills: Vec::new(),
            business_skills: Vec::new(),
            job_titles: Vec::new(),
            section_headings: Vec::new(),
            required_sections: Vec::new(),
            action_verbs: Vec::new(),
            core_action_verbs: Vec::new(),
            education_keywords: Vec::new(),
            experience_keywords: Vec::new(),
        };

        catalog.init_skills();
        catalog.init_job_titles();
        catalog.init_sections();
        catalog.init_action_verbs();
        catalog.init_section_keywords();

        catalog
    }

    /// Loads a catalog from JSON with the same field names as the builtin one.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.normalized()
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loading keyword catalog from {}", path.as_ref().display());
        Self::from_json_str(&content)
    }

    fn init_skills(&mut self) {
        let technical = vec![
            "python", "javascript", "react", "node.js", "typescript", "html", "css",
            "java", "c++", "c#", "sql", "nosql", "mongodb", "postgresql", "mysql",
            "aws", "azure", "gcp", "docker", "kubernetes", "ci/cd", "git", "github",
            "machine learning", "deep learning", "ai", "data science", "data analysis",
            "tensorflow", "pytorch", "keras", "scikit-learn", "pandas", "numpy",
        ];

        let soft = vec![
            "communication", "teamwork", "leadership", "problem solving", "critical thinking",
            "time management", "adaptability", "creativity", "collaboration", "presentation",
            "negotiation", "conflict resolution", "decision making", "emotional intelligence",
        ];

        let business = vec![
            "project management", "agile", "scrum", "kanban", "product management",
            "business analysis", "requirements gathering", "stakeholder management",
            "strategic planning", "market research", "competitive analysis", "budgeting",
            "forecasting", "risk management", "quality assurance", "user experience",
        ];

        self.technical_skills = to_owned(&technical);
        self.soft_skills = to_owned(&soft);
        self.business_skills = to_owned(&business);
    }

    fn init_job_titles(&mut self) {
        let titles = vec![
            "software engineer", "data scientist", "web developer", "frontend developer",
            "backend developer", "full stack developer", "devops engineer", "cloud engineer",
            "machine learning engineer", "ai researcher", "product manager", "project manager",
            "ux designer", "ui designer", "data analyst", "business analyst", "qa engineer",
            "systems administrator", "network engineer", "security engineer",
            "database administrator",
        ];

        self.job_titles = to_owned(&titles);
    }

    fn init_sections(&mut self) {
        self.section_headings = to_owned(&[
            "education", "experience", "skills", "projects", "summary", "objective",
        ]);
        // Headings whose absence is called out in suggestions
        self.required_sections = to_owned(&["education", "experience", "skills", "projects"]);
    }

    fn init_action_verbs(&mut self) {
        self.action_verbs = to_owned(&[
            "achieved", "improved", "developed", "created", "implemented", "managed",
            "led", "designed", "built", "launched", "increased", "decreased", "reduced",
        ]);
        self.core_action_verbs = to_owned(&[
            "achieved", "improved", "developed", "created", "implemented", "managed", "led",
        ]);
    }

    fn init_section_keywords(&mut self) {
        self.education_keywords = to_owned(&[
            "bachelor", "master", "phd", "degree", "university", "college", "school",
        ]);
        self.experience_keywords = to_owned(&["experience", "work", "job", "position", "role"]);
    }

    fn normalized(mut self) -> Result<Self> {
        let lists: [(&str, &mut Vec<String>); 10] = [
            ("technical_skills", &mut self.technical_skills),
            ("soft_skills", &mut self.soft_skills),
            ("business_skills", &mut self.business_skills),
            ("job_titles", &mut self.job_titles),
            ("section_headings", &mut self.section_headings),
            ("required_sections", &mut self.required_sections),
            ("action_verbs", &mut self.action_verbs),
            ("core_action_verbs", &mut self.core_action_verbs),
            ("education_keywords", &mut self.education_keywords),
            ("experience_keywords", &mut self.experience_keywords),
        ];

        for (name, list) in lists {
            let mut seen = std::collections::HashSet::new();
            let mut cleaned = Vec::with_capacity(list.len());
            for phrase in list.iter() {
                let phrase = phrase.trim().to_lowercase();
                if phrase.is_empty() {
                    return Err(Error::Config(format!("empty phrase in catalog list `{}`", name)));
                }
                if seen.insert(phrase.clone()) {
                    cleaned.push(phrase);
                }
            }
            *list = cleaned;
        }

        Ok(self)
    }

    pub fn skills(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::Technical => &self.technical_skills,
            SkillCategory::Soft => &self.soft_skills,
            SkillCategory::Business => &self.business_skills,
        }
    }

    pub fn job_titles(&self) -> &[String] {
        &self.job_titles
    }

    pub fn section_headings(&self) -> &[String] {
        &self.section_headings
    }

    pub fn required_sections(&self) -> &[String] {
        &self.required_sections
    }

    pub fn action_verbs(&self) -> &[String] {
        &self.action_verbs
    }

    pub fn core_action_verbs(&self) -> &[String] {
        &self.core_action_verbs
    }

    pub fn education_keywords(&self) -> &[String] {
        &self.education_keywords
    }

    pub fn experience_keywords(&self) -> &[String] {
        &self.experience_keywords
    }
}

impl Default for KeywordCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_sizes() {
        let catalog = KeywordCatalog::new();
        assert_eq!(catalog.skills(SkillCategory::Technical).len(), 34);
        assert_eq!(catalog.skills(SkillCategory::Soft).len(), 14);
        assert_eq!(catalog.skills(SkillCategory::Business).len(), 16);
        assert_eq!(catalog.job_titles().len(), 21);
        assert_eq!(catalog.section_headings().len(), 6);
        assert_eq!(catalog.action_verbs().len(), 13);
        assert_eq!(catalog.core_action_verbs().len(), 7);
    }

    #[test]
    fn test_json_round_trip_normalizes() {
        let mut json = serde_json::to_value(KeywordCatalog::new()).unwrap();
        json["soft_skills"] = serde_json::json!(["  Empathy ", "empathy", "Grit"]);

        let catalog = KeywordCatalog::from_json_str(&json.to_string()).unwrap();
        assert_eq!(catalog.skills(SkillCategory::Soft), &["empathy", "grit"]);
    }

    #[test]
    fn test_json_rejects_empty_phrase() {
        let mut json = serde_json::to_value(KeywordCatalog::new()).unwrap();
        json["job_titles"] = serde_json::json!(["engineer", "   "]);

        let err = KeywordCatalog::from_json_str(&json.to_string()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
