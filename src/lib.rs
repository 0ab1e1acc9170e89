pub mod config;
pub mod error;
pub mod models;
pub mod taxonomy;
pub mod analysis;
pub mod classifier;
pub mod storage;

pub use config::{ClassifierConfig, Config, ScoringWeights};
pub use error::{Error, Result};
pub use taxonomy::KeywordCatalog;
pub use analysis::{AnalysisPipeline, Scorer};
pub use classifier::{ClassifierStore, TrainingReport};
pub use models::{AnalysisResult, ScoreComponent, SkillCategory, SkillSet};
pub use storage::Storage;
