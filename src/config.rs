use crate::error::{Error, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: String,
    pub database_path: String,
    pub concurrency_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let model_path = env::var("RESUMESCORE_MODEL_PATH")
            .unwrap_or_else(|_| "resume_classifier.json".to_string());

        let database_path = env::var("RESUMESCORE_DATABASE_PATH")
            .unwrap_or_else(|_| "resumescore.db".to_string());

        let concurrency_limit = match env::var("RESUMESCORE_CONCURRENCY") {
            Ok(raw) => parse_concurrency(&raw)?,
            Err(_) => 4,
        };

        Ok(Self {
            model_path,
            database_path,
            concurrency_limit,
        })
    }
}

fn parse_concurrency(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Error::Config(format!(
            "RESUMESCORE_CONCURRENCY must be a positive integer, got {:?}",
            raw
        ))),
    }
}

/// Weights of the four sub-scores in the overall score.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub ats_weight: f64,
    pub content_weight: f64,
    pub format_weight: f64,
    pub skills_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            ats_weight: 0.30,
            content_weight: 0.30,
            format_weight: 0.20,
            skills_weight: 0.20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Vocabulary size cap for the TF-IDF vectorizer.
    pub max_features: usize,
    /// Number of trees in the forest.
    pub n_estimators: usize,
    /// Fraction of the corpus held out for evaluation.
    pub test_size: f64,
    pub random_seed: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            n_estimators: 100,
            test_size: 0.2,
            random_seed: 42,
        }
    }
}
