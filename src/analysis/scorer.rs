use regex::Regex;

use crate::analysis::feedback::{feedback_for, Dimension};
use crate::analysis::section_extractor::SectionExtractor;
use crate::analysis::skill_extractor::{whole_word, SkillExtractor};
use crate::analysis::suggestions::build_suggestions;
use crate::config::ScoringWeights;
use crate::error::Result;
use crate::models::analysis::{clamp_score, AnalysisResult, ScoreComponent};
use crate::models::skill::SkillSet;
use crate::taxonomy::KeywordCatalog;

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
// Optional country code, optional parenthesized area code, 3-3-4 digits
const PHONE_PATTERN: &str = r"(?:\+\d{1,3}[-.\s]?|\b)\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b";
const QUANTIFIABLE_PATTERN: &str =
    r"\b\d+%|\b\d+ percent|\$\d+|\d+ dollars|\d+ users|\d+ customers|\d+ projects|\d+ team";
const BULLET_PATTERN: &str = r"•|\*|-|\d+\.";
const MAX_HEADING_POINTS: u32 = 30;

struct Keyword {
    word: String,
    pattern: Regex,
}

impl Keyword {
    fn compile(words: &[String]) -> Result<Vec<Self>> {
        words
            .iter()
            .map(|word| {
                Ok(Self {
                    word: word.clone(),
                    pattern: whole_word(word)?,
                })
            })
            .collect()
    }
}

/// Stateless rubric scorer. All patterns are compiled once in [`Scorer::new`];
/// every scoring method is a pure function of its input text, so a single
/// instance can be shared across threads.
pub struct Scorer {
    skills: SkillExtractor,
    sections: SectionExtractor,
    email: Regex,
    phone: Regex,
    quantifiable: Regex,
    bullet: Regex,
    headings: Vec<Keyword>,
    required_sections: Vec<Keyword>,
    action_verbs: Vec<Keyword>,
    core_action_verbs: Vec<Keyword>,
    job_titles: Vec<Keyword>,
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(catalog: &KeywordCatalog) -> Result<Self> {
        Self::with_weights(catalog, ScoringWeights::default())
    }

    pub fn with_weights(catalog: &KeywordCatalog, weights: ScoringWeights) -> Result<Self> {
        Ok(Self {
            skills: SkillExtractor::new(catalog)?,
            sections: SectionExtractor::new(catalog)?,
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
            quantifiable: Regex::new(QUANTIFIABLE_PATTERN)?,
            bullet: Regex::new(BULLET_PATTERN)?,
            headings: Keyword::compile(catalog.section_headings())?,
            required_sections: Keyword::compile(catalog.required_sections())?,
            action_verbs: Keyword::compile(catalog.action_verbs())?,
            core_action_verbs: Keyword::compile(catalog.core_action_verbs())?,
            job_titles: Keyword::compile(catalog.job_titles())?,
            weights,
        })
    }

    pub fn with_builtin_catalog() -> Result<Self> {
        Self::new(&KeywordCatalog::new())
    }

    /// Scores a resume and assembles the full result record.
    pub fn analyze(&self, resume_text: &str, job_description: Option<&str>) -> AnalysisResult {
        let job_description = present(job_description);
        let resume_skills = self.extract_skills(resume_text);

        let ats = self.ats_with(resume_text, &resume_skills, job_description);
        let content = self.content_quality_score(resume_text);
        let format = self.format_score(resume_text);
        let skills = self.skills_match_with(&resume_skills, job_description);

        let overall_score = self.overall_score(ats, content, format, skills);
        let suggestions = build_suggestions(
            self,
            resume_text,
            &resume_skills,
            ats,
            content,
            format,
            skills,
        );

        tracing::debug!(
            ats,
            content,
            format,
            skills,
            overall_score,
            "Scored resume ({} words)",
            self.word_count(resume_text)
        );

        AnalysisResult {
            overall_score,
            ats_compatibility: ScoreComponent::new(
                ats as f64,
                feedback_for(Dimension::Ats, ats as f64),
            ),
            content_quality: ScoreComponent::new(
                content as f64,
                feedback_for(Dimension::Content, content as f64),
            ),
            format_structure: ScoreComponent::new(
                format as f64,
                feedback_for(Dimension::Format, format as f64),
            ),
            skills_match: ScoreComponent::new(skills, feedback_for(Dimension::Skills, skills)),
            suggestions,
            skills: resume_skills,
        }
    }

    pub fn extract_skills(&self, text: &str) -> SkillSet {
        self.skills.extract_skills(text)
    }

    pub fn extract_education(&self, text: &str) -> Vec<String> {
        self.sections.extract_education(text)
    }

    pub fn extract_experience(&self, text: &str) -> Vec<String> {
        self.sections.extract_experience(text)
    }

    pub fn ats_score(&self, resume_text: &str, job_description: Option<&str>) -> u8 {
        self.ats_with(resume_text, &self.extract_skills(resume_text), job_description)
    }

    fn ats_with(
        &self,
        resume_text: &str,
        resume_skills: &SkillSet,
        job_description: Option<&str>,
    ) -> u8 {
        let mut score: u32 = 0;

        if self.has_email(resume_text) {
            score += 10;
        }
        if self.has_phone(resume_text) {
            score += 10;
        }

        // Custom catalogs may list more than six headings
        score += (5 * self.heading_count(resume_text) as u32).min(MAX_HEADING_POINTS);

        score += match resume_skills.total() {
            n if n > 15 => 20,
            n if n > 10 => 15,
            n if n > 5 => 10,
            _ => 5,
        };

        if let Some(jd) = present(job_description) {
            if self.shared_job_title(resume_text, jd).is_some() {
                score += 15;
            }
        }

        score.min(100) as u8
    }

    pub fn content_quality_score(&self, resume_text: &str) -> u8 {
        let mut score: u32 = 0;
        let lowered = resume_text.to_lowercase();

        score += match count_present(&self.action_verbs, &lowered) {
            n if n > 10 => 25,
            n if n > 5 => 15,
            _ => 5,
        };

        score += match self.quantifiable_count(resume_text) {
            n if n > 5 => 25,
            n if n > 2 => 15,
            _ => 5,
        };

        if !self.extract_education(resume_text).is_empty() {
            score += 15;
        }

        score += match self.extract_experience(resume_text).len() {
            n if n > 3 => 25,
            n if n > 1 => 15,
            _ => 5,
        };

        score.min(100) as u8
    }

    pub fn format_score(&self, resume_text: &str) -> u8 {
        let mut score: u32 = 0;

        score += match self.heading_count(resume_text) {
            n if n >= 4 => 30,
            n if n >= 2 => 15,
            _ => 5,
        };

        score += match self.bullet_count(resume_text) {
            n if n > 10 => 30,
            n if n > 5 => 15,
            _ => 5,
        };

        score += match self.paragraph_count(resume_text) {
            n if n > 5 => 20,
            n if n > 3 => 10,
            _ => 5,
        };

        score += match self.word_count(resume_text) {
            300..=700 => 20,
            n if n < 300 => 10,
            _ => 5,
        };

        score.min(100) as u8
    }

    /// Percentage of job-description skills also found in the resume, or a
    /// tier lookup on the resume's own skill count when no job description
    /// is given.
    pub fn skills_match_score(&self, resume_text: &str, job_description: Option<&str>) -> f64 {
        self.skills_match_with(&self.extract_skills(resume_text), job_description)
    }

    fn skills_match_with(&self, resume_skills: &SkillSet, job_description: Option<&str>) -> f64 {
        match present(job_description) {
            Some(jd) => {
                let job_skills = self.extract_skills(jd);
                let total = job_skills.total();
                if total == 0 {
                    return 0.0;
                }
                let matching = resume_skills.overlap(&job_skills);
                (matching as f64 / total as f64 * 100.0).min(100.0)
            }
            None => match resume_skills.total() {
                n if n > 15 => 90.0,
                n if n > 10 => 75.0,
                n if n > 5 => 60.0,
                _ => 40.0,
            },
        }
    }

    /// Weighted sum of the sub-scores, truncated toward zero.
    pub fn overall_score(&self, ats: u8, content: u8, format: u8, skills: f64) -> u8 {
        let weighted = ats as f64 * self.weights.ats_weight
            + content as f64 * self.weights.content_weight
            + format as f64 * self.weights.format_weight
            + skills * self.weights.skills_weight;

        clamp_score(weighted)
    }

    pub fn has_email(&self, text: &str) -> bool {
        self.email.is_match(text)
    }

    pub fn has_phone(&self, text: &str) -> bool {
        self.phone.is_match(text)
    }

    /// Number of standard section headings present as whole words.
    pub fn heading_count(&self, text: &str) -> usize {
        count_present(&self.headings, &text.to_lowercase())
    }

    pub fn missing_required_sections(&self, text: &str) -> Vec<&str> {
        let lowered = text.to_lowercase();
        self.required_sections
            .iter()
            .filter(|k| !k.pattern.is_match(&lowered))
            .map(|k| k.word.as_str())
            .collect()
    }

    /// Number of distinct vocabulary verbs present, not total occurrences.
    pub fn action_verb_count(&self, text: &str) -> usize {
        count_present(&self.action_verbs, &text.to_lowercase())
    }

    pub fn core_action_verb_count(&self, text: &str) -> usize {
        count_present(&self.core_action_verbs, &text.to_lowercase())
    }

    pub fn quantifiable_count(&self, text: &str) -> usize {
        self.quantifiable.find_iter(&text.to_lowercase()).count()
    }

    pub fn bullet_count(&self, text: &str) -> usize {
        self.bullet.find_iter(text).count()
    }

    /// Blocks separated by a blank line. Empty text counts as one block.
    pub fn paragraph_count(&self, text: &str) -> usize {
        text.split("\n\n").count()
    }

    pub fn word_count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// First catalog job title (in catalog order) present in both texts.
    pub fn shared_job_title(&self, resume_text: &str, job_description: &str) -> Option<&str> {
        let resume = resume_text.to_lowercase();
        let jd = job_description.to_lowercase();

        self.job_titles
            .iter()
            .find(|t| t.pattern.is_match(&resume) && t.pattern.is_match(&jd))
            .map(|t| t.word.as_str())
    }
}

/// A job description made only of whitespace counts as absent.
fn present(job_description: Option<&str>) -> Option<&str> {
    job_description.filter(|jd| !jd.trim().is_empty())
}

fn count_present(keywords: &[Keyword], lowered: &str) -> usize {
    keywords.iter().filter(|k| k.pattern.is_match(lowered)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> Scorer {
        Scorer::with_builtin_catalog().unwrap()
    }

    const FULL_RESUME: &str = "Jane Roe\njane.roe@example.com\n(555) 123-4567\n\n\
        Summary\nObjective: build things.\n\nEducation\nExperience\nProjects\nSkills\n\
        python, javascript, react, typescript, html, css, sql, docker, kubernetes, git, aws, \
        pandas, numpy, communication, leadership, teamwork, agile, scrum";

    #[test]
    fn test_contact_detection() {
        let scorer = scorer();
        assert!(scorer.has_email("reach me at a.b-c@mail.example.org today"));
        assert!(!scorer.has_email("no at sign here"));
        assert!(scorer.has_phone("(123) 456-7890"));
        assert!(scorer.has_phone("+1 555.123.4567"));
        assert!(scorer.has_phone("call 555 123 4567"));
        assert!(!scorer.has_phone("year 2020"));
    }

    #[test]
    fn test_full_resume_ats_tiers() {
        let scorer = scorer();
        assert!(scorer.extract_skills(FULL_RESUME).total() > 15);
        assert_eq!(scorer.heading_count(FULL_RESUME), 6);
        // email + phone + six headings + top skill tier
        assert_eq!(scorer.ats_score(FULL_RESUME, None), 10 + 10 + 30 + 20);
        assert_eq!(scorer.ats_score(FULL_RESUME, Some("Data Scientist wanted")), 70);
    }

    #[test]
    fn test_empty_text_floor_tiers() {
        let scorer = scorer();
        assert_eq!(scorer.ats_score("", None), 5);
        assert_eq!(scorer.content_quality_score(""), 15);
        assert_eq!(scorer.format_score(""), 25);
        assert_eq!(scorer.skills_match_score("", None), 40.0);
        assert_eq!(scorer.skills_match_score("", Some("")), 40.0);
    }

    #[test]
    fn test_heading_points_capped_for_custom_catalog() {
        let json = serde_json::json!({
            "technical_skills": ["python"],
            "soft_skills": ["teamwork"],
            "business_skills": ["agile"],
            "job_titles": ["software engineer"],
            "section_headings": [
                "education", "experience", "skills", "projects",
                "summary", "objective", "awards", "publications"
            ],
            "required_sections": ["education"],
            "action_verbs": ["led"],
            "core_action_verbs": ["led"],
            "education_keywords": ["degree"],
            "experience_keywords": ["role"]
        });
        let catalog = KeywordCatalog::from_json_str(&json.to_string()).unwrap();
        let scorer = Scorer::new(&catalog).unwrap();

        let text = "Education Experience Skills Projects Summary Objective Awards Publications";
        assert_eq!(scorer.heading_count(text), 8);
        // headings capped at 30, plus the lowest skill tier
        assert_eq!(scorer.ats_score(text, None), 30 + 5);
    }

    #[test]
    fn test_whitespace_job_description_counts_as_absent() {
        let scorer = scorer();

        let resume = "Software Engineer\npython, sql, docker";
        assert_eq!(scorer.ats_score(resume, Some("  ")), scorer.ats_score(resume, None));
        assert_eq!(scorer.ats_score(resume, Some("  ")), 5);
        assert_eq!(scorer.ats_score(resume, Some("software engineer")), 5 + 15);
        assert_eq!(
            scorer.skills_match_score(resume, Some(" \t\n")),
            scorer.skills_match_score(resume, None)
        );

        assert_eq!(
            scorer.analyze(FULL_RESUME, Some("   \n")),
            scorer.analyze(FULL_RESUME, None)
        );
    }

    #[test]
    fn test_analyze_reports_resume_skills() {
        let scorer = scorer();
        let result = scorer.analyze(FULL_RESUME, Some("python and docker"));
        assert_eq!(result.skills, scorer.extract_skills(FULL_RESUME));
        assert_eq!(result.skills_match.score, 100);
    }

    #[test]
    fn test_job_title_bonus_is_single() {
        let scorer = scorer();
        let resume = "Software Engineer and Data Scientist";
        let jd = "Hiring a software engineer or data scientist";
        assert_eq!(scorer.shared_job_title(resume, jd), Some("software engineer"));
        assert_eq!(scorer.ats_score(resume, Some(jd)), 5 + 15);
        assert_eq!(scorer.ats_score(resume, Some("Hiring a baker")), 5);
    }

    #[test]
    fn test_content_tiers() {
        let scorer = scorer();
        let text = "Achieved, improved, developed, created, implemented, managed, led, designed, \
                    built, launched and increased things. Grew revenue 20% and $500 with 40 users, \
                    30 customers, 5 projects and a 9 team. My work. My job. My role. My position.";
        assert_eq!(scorer.action_verb_count(text), 11);
        assert_eq!(scorer.quantifiable_count(text), 6);
        assert!(scorer.extract_experience(text).len() > 3);
        assert_eq!(scorer.content_quality_score(text), 25 + 25 + 25);
    }

    #[test]
    fn test_format_fifty_words_no_structure() {
        let scorer = scorer();
        let text = vec!["word"; 50].join(" ");
        assert_eq!(scorer.heading_count(&text), 0);
        assert_eq!(scorer.bullet_count(&text), 0);
        assert_eq!(scorer.format_score(&text), 5 + 5 + 5 + 10);
    }

    #[test]
    fn test_format_counts() {
        let scorer = scorer();
        let text = "• one\n* two\n- three\n1. four\n\nsecond\n\nthird";
        assert_eq!(scorer.bullet_count(text), 4);
        assert_eq!(scorer.paragraph_count(text), 3);
        assert_eq!(scorer.word_count(text), 10);
    }

    #[test]
    fn test_skills_match_with_job_description() {
        let scorer = scorer();
        let resume = "python, sql, leadership";
        let jd = "python, docker, leadership, agile";
        assert_eq!(scorer.skills_match_score(resume, Some(jd)), 50.0);
        assert_eq!(scorer.skills_match_score(resume, Some("we bake bread")), 0.0);
    }

    #[test]
    fn test_skills_match_tiers_without_job_description() {
        let scorer = scorer();
        assert_eq!(scorer.skills_match_score("python sql docker git aws css", None), 60.0);
        assert_eq!(scorer.skills_match_score(FULL_RESUME, None), 90.0);
    }

    #[test]
    fn test_overall_truncates() {
        let scorer = scorer();
        // 0.3*77 + 0.3*77 + 0.2*77 + 0.2*77.5 = 77.1
        assert_eq!(scorer.overall_score(77, 77, 77, 77.5), 77);
        assert_eq!(scorer.overall_score(100, 100, 100, 100.0), 100);
        assert_eq!(scorer.overall_score(0, 0, 0, 0.0), 0);
        // 0.3*33 + 0.3*33 + 0.2*33 + 0.2*33.3 = 33.06
        assert_eq!(scorer.overall_score(33, 33, 33, 33.3), 33);
    }

    #[test]
    fn test_overall_matches_formula_over_grid() {
        let scorer = scorer();
        for ats in (0..=100u8).step_by(7) {
            for content in (0..=100u8).step_by(11) {
                for format in (0..=100u8).step_by(13) {
                    for skills in [0.0, 33.333, 50.0, 66.6667, 100.0] {
                        let expected = (ats as f64 * 0.3
                            + content as f64 * 0.3
                            + format as f64 * 0.2
                            + skills * 0.2)
                            .floor() as u8;
                        assert_eq!(scorer.overall_score(ats, content, format, skills), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_analyze_full_resume() {
        let result = scorer().analyze(FULL_RESUME, None);
        assert_eq!(result.ats_compatibility.score, 70);
        assert!(result.ats_compatibility.feedback.starts_with("Your resume is compatible"));
        assert_eq!(result.skills_match.score, 90);
        assert!(result.suggestions.len() <= 7);
        assert!(result.skills.soft.contains(&"leadership".to_string()));
    }

    #[test]
    fn test_scores_stay_in_range() {
        let scorer = scorer();
        let long = format!("{} {}", FULL_RESUME, "- led 50% growth. ".repeat(400));
        for text in ["", "x", FULL_RESUME, long.as_str()] {
            let result = scorer.analyze(text, Some("software engineer python"));
            for s in [
                result.overall_score,
                result.ats_compatibility.score,
                result.content_quality.score,
                result.format_structure.score,
                result.skills_match.score,
            ] {
                assert!(s <= 100);
            }
        }
    }
}
