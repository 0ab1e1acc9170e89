pub mod pipeline;
pub mod scorer;
pub mod skill_extractor;
pub mod section_extractor;
pub mod feedback;
pub mod suggestions;

pub use pipeline::{AnalysisPipeline, BatchOutcome};
pub use scorer::Scorer;
pub use skill_extractor::SkillExtractor;
pub use section_extractor::SectionExtractor;
pub use feedback::{feedback_for, Dimension};
pub use suggestions::generate_suggestions;
