use serde::{Deserialize, Serialize};
use super::skill::SkillSet;

/// Upper bound on the number of suggestions in a result.
pub const MAX_SUGGESTIONS: usize = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreComponent {
    pub score: u8,
    pub feedback: String,
}

impl ScoreComponent {
    /// Builds a component from a raw score, truncating and clamping to 0..=100.
    pub fn new(score: f64, feedback: impl Into<String>) -> Self {
        Self {
            score: clamp_score(score),
            feedback: feedback.into(),
        }
    }
}

pub fn clamp_score(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.trunc().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(rename = "score")]
    pub overall_score: u8,
    pub ats_compatibility: ScoreComponent,
    pub content_quality: ScoreComponent,
    pub format_structure: ScoreComponent,
    pub skills_match: ScoreComponent,
    pub suggestions: Vec<String>,
    pub skills: SkillSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-3.0), 0);
        assert_eq!(clamp_score(66.9), 66);
        assert_eq!(clamp_score(140.0), 100);
        assert_eq!(clamp_score(f64::NAN), 0);
    }

    #[test]
    fn test_wire_field_names() {
        let component = ScoreComponent::new(50.0, "ok");
        let result = AnalysisResult {
            overall_score: 50,
            ats_compatibility: component.clone(),
            content_quality: component.clone(),
            format_structure: component.clone(),
            skills_match: component,
            suggestions: vec!["one".to_string()],
            skills: SkillSet::default(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["score"], 50);
        assert_eq!(json["atsCompatibility"]["score"], 50);
        assert_eq!(json["contentQuality"]["feedback"], "ok");
        assert!(json["formatStructure"].is_object());
        assert!(json["skillsMatch"].is_object());
        assert!(json["skills"]["soft"].is_array());
        assert!(json.get("overallScore").is_none());
    }
}
