use regex::Regex;

use crate::error::Result;
use crate::taxonomy::KeywordCatalog;

/// Pulls keyword-led sentence fragments (keyword up to the next period)
/// out of free text. Fragments may repeat and are not cleaned up.
pub struct SectionExtractor {
    education: Option<Regex>,
    experience: Option<Regex>,
}

impl SectionExtractor {
    pub fn new(catalog: &KeywordCatalog) -> Result<Self> {
        Ok(Self {
            education: fragment_pattern(catalog.education_keywords())?,
            experience: fragment_pattern(catalog.experience_keywords())?,
        })
    }

    pub fn extract_education(&self, text: &str) -> Vec<String> {
        collect_fragments(self.education.as_ref(), text)
    }

    pub fn extract_experience(&self, text: &str) -> Vec<String> {
        collect_fragments(self.experience.as_ref(), text)
    }
}

fn fragment_pattern(keywords: &[String]) -> Result<Option<Regex>> {
    if keywords.is_empty() {
        return Ok(None);
    }

    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");

    Ok(Some(Regex::new(&format!(r"(?i)(?:{})[^.]*\.", alternation))?))
}

fn collect_fragments(pattern: Option<&Regex>, text: &str) -> Vec<String> {
    match pattern {
        Some(re) => re.find_iter(text).map(|m| m.as_str().to_string()).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SectionExtractor {
        SectionExtractor::new(&KeywordCatalog::new()).unwrap()
    }

    #[test]
    fn test_education_fragments_run_to_period() {
        let text = "Earned a Bachelor of Science. Then a Master of Arts at State University.";
        let found = extractor().extract_education(text);
        assert_eq!(found, vec!["Bachelor of Science.", "Master of Arts at State University."]);
    }

    #[test]
    fn test_experience_keywords_match_inside_words() {
        let found = extractor().extract_experience("Built network tooling. Five years of experience.");
        assert_eq!(found, vec!["work tooling.", "experience."]);
    }

    #[test]
    fn test_fragment_without_terminating_period_is_dropped() {
        assert!(extractor().extract_education("PhD in progress").is_empty());
    }

    #[test]
    fn test_no_keywords_is_empty_not_error() {
        let extractor = extractor();
        assert!(extractor.extract_education("Nothing to see here.").is_empty());
        assert!(extractor.extract_experience("").is_empty());
    }
}
