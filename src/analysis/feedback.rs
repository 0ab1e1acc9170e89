/// The four rubric dimensions that carry their own feedback wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Ats,
    Content,
    Format,
    Skills,
}

/// Fixed feedback sentence for a dimension score: >= 80, >= 60, otherwise.
pub fn feedback_for(dimension: Dimension, score: f64) -> &'static str {
    let [strong, moderate, weak] = match dimension {
        Dimension::Ats => [
            "Your resume is highly compatible with ATS systems. It contains all the necessary elements for successful parsing.",
            "Your resume is compatible with most ATS systems, but there's room for improvement in certain areas.",
            "Your resume may have difficulty passing through ATS systems. Consider restructuring with standard section headings and formats.",
        ],
        Dimension::Content => [
            "Your content is strong with good use of action verbs and quantifiable achievements.",
            "Your content is good but could benefit from more action verbs and quantifiable results.",
            "Your content needs improvement. Focus on using action verbs and quantifying your achievements.",
        ],
        Dimension::Format => [
            "Your resume has excellent formatting with clear sections and good use of white space.",
            "Your resume format is good but could be improved with more consistent section headings and bullet points.",
            "Your resume format needs improvement. Consider using standard section headings and bullet points for better readability.",
        ],
        Dimension::Skills => [
            "Your skills align well with industry standards and job requirements.",
            "Your skills are good but could be expanded to better match job requirements.",
            "Consider adding more relevant skills to your resume to better match job requirements.",
        ],
    };

    if score >= 80.0 {
        strong
    } else if score >= 60.0 {
        moderate
    } else {
        weak
    }
}
