use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{Error, Result};

/// TF-IDF vectorizer with a capped vocabulary.
///
/// Tokens are runs of at least two alphanumeric characters. The vocabulary
/// keeps the `max_features` most frequent terms across the fitted corpus
/// (ties broken alphabetically) and indexes them alphabetically. Weights
/// are raw term counts times the smoothed idf `ln((1 + n) / (1 + df)) + 1`,
/// and every row is L2-normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if self.max_features == 0 {
            return Err(Error::Validation("max_features must be at least 1".to_string()));
        }

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc.as_ref());
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();

            for term in unique {
                *doc_frequency.entry(term.to_string()).or_insert(0) += 1;
            }
            for term in tokens {
                *term_counts.entry(term).or_insert(0) += 1;
            }
        }

        if term_counts.is_empty() {
            return Err(Error::Validation(
                "empty vocabulary; documents contain only stop words or no words".to_string(),
            ));
        }

        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let kept: BTreeSet<String> = ranked.into_iter().map(|(term, _)| term).collect();
        let n = documents.len() as f64;

        self.vocabulary = kept
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        self.idf = kept
            .iter()
            .map(|term| {
                let df = doc_frequency.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        Ok(())
    }

    /// Checks that a deserialized vectorizer has one finite idf weight per
    /// term and that term indices cover `0..vocabulary_size()` exactly once.
    pub fn validate(&self) -> Result<()> {
        let size = self.vocabulary.len();
        if size == 0 || self.idf.len() != size {
            return Err(Error::Validation(format!(
                "vectorizer has {} terms but {} idf weights",
                size,
                self.idf.len()
            )));
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err(Error::Validation("vectorizer has non-finite idf weights".to_string()));
        }

        let mut seen = vec![false; size];
        for (term, &index) in &self.vocabulary {
            if index >= size || std::mem::replace(&mut seen[index], true) {
                return Err(Error::Validation(format!(
                    "term {:?} has invalid index {}",
                    term, index
                )));
            }
        }

        Ok(())
    }

    /// Dense TF-IDF row for one document. Unknown terms are ignored; a
    /// document with no known terms yields an all-zero row.
    pub fn transform(&self, document: &str) -> Vec<f64> {
        let mut row = vec![0.0; self.vocabulary.len()];

        for token in tokenize(document) {
            if let Some(&index) = self.vocabulary.get(&token) {
                row[index] += 1.0;
            }
        }

        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in row.iter_mut() {
                *value /= norm;
            }
        }

        row
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<Vec<f64>>> {
        self.fit(documents)?;
        Ok(documents.iter().map(|d| self.transform(d.as_ref())).collect())
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}
