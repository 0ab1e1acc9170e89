use crate::analysis::scorer::Scorer;
use crate::models::analysis::MAX_SUGGESTIONS;
use crate::models::skill::SkillSet;

/// Sub-scores at or above this value suppress that dimension's checks.
const SUGGESTION_GATE: f64 = 80.0;

/// Ordered improvement suggestions: gated checks per dimension (ATS,
/// content, format, skills), then two general tips, capped at
/// [`MAX_SUGGESTIONS`] in generation order.
pub fn generate_suggestions(
    scorer: &Scorer,
    resume_text: &str,
    ats_score: u8,
    content_score: u8,
    format_score: u8,
    skills_score: f64,
) -> Vec<String> {
    let resume_skills = scorer.extract_skills(resume_text);
    build_suggestions(
        scorer,
        resume_text,
        &resume_skills,
        ats_score,
        content_score,
        format_score,
        skills_score,
    )
}

/// Same as [`generate_suggestions`] with the resume's skills already extracted.
pub(crate) fn build_suggestions(
    scorer: &Scorer,
    resume_text: &str,
    resume_skills: &SkillSet,
    ats_score: u8,
    content_score: u8,
    format_score: u8,
    skills_score: f64,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    if (ats_score as f64) < SUGGESTION_GATE {
        if !scorer.has_email(resume_text) {
            suggestions.push("Add your email address to improve contact information.".to_string());
        }

        if !scorer.has_phone(resume_text) {
            suggestions.push("Add your phone number to improve contact information.".to_string());
        }

        let missing = scorer.missing_required_sections(resume_text);
        if !missing.is_empty() {
            suggestions.push(format!(
                "Add standard section headings for: {}.",
                missing.join(", ")
            ));
        }
    }

    if (content_score as f64) < SUGGESTION_GATE {
        if scorer.core_action_verb_count(resume_text) < 5 {
            suggestions.push(
                "Use more action verbs like 'achieved', 'improved', 'developed', etc.".to_string(),
            );
        }

        if scorer.quantifiable_count(resume_text) < 3 {
            suggestions.push(
                "Add metrics to your achievements (e.g., 'Increased sales by 20%' instead of 'Increased sales')."
                    .to_string(),
            );
        }
    }

    if (format_score as f64) < SUGGESTION_GATE {
        if scorer.bullet_count(resume_text) < 5 {
            suggestions.push(
                "Use bullet points to highlight your achievements and responsibilities.".to_string(),
            );
        }

        if scorer.paragraph_count(resume_text) < 4 {
            suggestions
                .push("Improve the structure of your resume with clear section breaks.".to_string());
        }

        let words = scorer.word_count(resume_text);
        if words > 700 {
            suggestions.push(
                "Your resume is too long. Consider shortening it to 1-2 pages for better readability."
                    .to_string(),
            );
        } else if words < 300 {
            suggestions.push(
                "Your resume may be too short. Consider adding more details about your experience and skills."
                    .to_string(),
            );
        }
    }

    if skills_score < SUGGESTION_GATE {
        if resume_skills.total() < 10 {
            suggestions.push(
                "Add more relevant skills to your resume, especially technical and industry-specific ones."
                    .to_string(),
            );
        }

        if resume_skills.soft.len() < 3 {
            suggestions.push(
                "Include more soft skills like communication, teamwork, and problem-solving."
                    .to_string(),
            );
        }
    }

    suggestions.push(
        "Tailor your resume for each job application by matching keywords from the job description."
            .to_string(),
    );
    suggestions.push(
        "Keep your resume format consistent with the same font, bullet style, and heading format throughout."
            .to_string(),
    );

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
