//! Job-category classifier: TF-IDF features fed to a random forest.
//!
//! Independent of the scoring pipeline. A [`ClassifierStore`] starts
//! untrained, becomes trained through [`ClassifierStore::train`] or
//! [`ClassifierStore::load`], and is persisted as one versioned JSON bundle.
//! The store is not internally synchronized; callers that share one across
//! threads must serialize `train`, `save` and `load` themselves.

pub mod forest;
pub mod metrics;
pub mod preprocess;
pub mod vectorizer;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};

pub use forest::RandomForest;
pub use metrics::{accuracy, classification_report, per_class_metrics, ClassMetrics};
pub use preprocess::TextPreprocessor;
pub use vectorizer::TfidfVectorizer;

/// Bumped whenever the persisted bundle layout changes.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelBundle {
    format_version: u32,
    vectorizer: TfidfVectorizer,
    forest: RandomForest,
}

#[derive(Deserialize)]
struct VersionHeader {
    format_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Accuracy on the held-out split.
    pub accuracy: f64,
    pub report: String,
    pub classes: Vec<ClassMetrics>,
    pub train_size: usize,
    pub test_size: usize,
}

pub struct ClassifierStore {
    config: ClassifierConfig,
    preprocessor: TextPreprocessor,
    model: Option<ModelBundle>,
}

impl ClassifierStore {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            preprocessor: TextPreprocessor::new(),
            model: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Labels the trained model can predict, sorted.
    pub fn classes(&self) -> &[String] {
        self.model
            .as_ref()
            .map(|m| m.forest.classes())
            .unwrap_or(&[])
    }

    /// Fits a fresh vectorizer and forest on `corpus`, evaluating on a seeded
    /// held-out split. The current model is replaced only if training succeeds.
    pub fn train<S: AsRef<str>, L: AsRef<str>>(
        &mut self,
        corpus: &[S],
        labels: &[L],
    ) -> Result<TrainingReport> {
        if corpus.is_empty() || labels.is_empty() {
            return Err(Error::Validation("corpus and labels must not be empty".to_string()));
        }
        if corpus.len() != labels.len() {
            return Err(Error::Validation(format!(
                "corpus has {} documents but {} labels were given",
                corpus.len(),
                labels.len()
            )));
        }
        if !(self.config.test_size > 0.0 && self.config.test_size < 1.0) {
            return Err(Error::Validation(format!(
                "test_size must be between 0 and 1, got {}",
                self.config.test_size
            )));
        }

        let n = corpus.len();
        let test_size = (n as f64 * self.config.test_size).ceil() as usize;
        let train_size = n.saturating_sub(test_size);
        if test_size == 0 || train_size == 0 {
            return Err(Error::Validation(format!(
                "{} documents cannot be split into non-empty train and test sets",
                n
            )));
        }

        tracing::info!("Training classifier on {} documents", n);

        let processed: Vec<String> = corpus
            .iter()
            .map(|doc| self.preprocessor.preprocess(doc.as_ref()))
            .collect();
        let labels: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();

        let mut vectorizer = TfidfVectorizer::new(self.config.max_features);
        let rows = vectorizer.fit_transform(&processed)?;
        tracing::info!("Vocabulary size: {}", vectorizer.vocabulary_size());

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut ChaCha8Rng::seed_from_u64(self.config.random_seed));
        let (test_idx, train_idx) = order.split_at(test_size);

        let pick_rows = |idx: &[usize]| idx.iter().map(|&i| rows[i].clone()).collect::<Vec<_>>();
        let pick_labels = |idx: &[usize]| idx.iter().map(|&i| labels[i].clone()).collect::<Vec<_>>();

        let (x_train, y_train) = (pick_rows(train_idx), pick_labels(train_idx));
        let (x_test, y_test) = (pick_rows(test_idx), pick_labels(test_idx));
        tracing::info!("Split: {} train, {} test", train_size, test_size);

        let mut forest = RandomForest::new(self.config.n_estimators, self.config.random_seed);
        forest.fit(&x_train, &y_train)?;

        let y_pred: Vec<String> = x_test
            .iter()
            .map(|row| forest.predict(row).unwrap_or_default().to_string())
            .collect();

        let report = TrainingReport {
            accuracy: accuracy(&y_test, &y_pred),
            report: classification_report(&y_test, &y_pred),
            classes: per_class_metrics(&y_test, &y_pred),
            train_size,
            test_size,
        };
        tracing::info!("Held-out accuracy: {:.2}", report.accuracy);

        self.model = Some(ModelBundle {
            format_version: MODEL_FORMAT_VERSION,
            vectorizer,
            forest,
        });

        Ok(report)
    }

    pub fn predict(&self, text: &str) -> Result<String> {
        let model = self.model.as_ref().ok_or(Error::ModelNotTrained)?;
        let row = model.vectorizer.transform(&self.preprocessor.preprocess(text));

        model
            .forest
            .predict(&row)
            .map(str::to_string)
            .ok_or(Error::ModelNotTrained)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let model = self.model.as_ref().ok_or(Error::ModelNotTrained)?;
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(model)?;
        std::fs::write(path, content)?;
        tracing::info!("Model saved to {}", path.display());
        Ok(())
    }

    /// Replaces the current model with the bundle at `path`. On any failure
    /// the store keeps whatever model it had before.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let header: VersionHeader = serde_json::from_str(&content)?;
        if header.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::ModelVersion {
                found: header.format_version,
                expected: MODEL_FORMAT_VERSION,
            });
        }

        let bundle: ModelBundle = serde_json::from_str(&content)?;
        bundle.vectorizer.validate()?;
        bundle.forest.validate()?;
        if bundle.forest.n_features() != bundle.vectorizer.vocabulary_size() {
            return Err(Error::Validation(format!(
                "model bundle at {} is inconsistent",
                path.display()
            )));
        }

        self.model = Some(bundle);
        tracing::info!("Model loaded from {}", path.display());
        Ok(())
    }
}

impl Default for ClassifierStore {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}
