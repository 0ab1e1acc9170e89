use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        /// Class probabilities, indexed like `RandomForest::classes`.
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Fully grown CART tree (Gini impurity). Node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_distribution(&self, row: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Bagged ensemble of decision trees with random feature subsets per split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_estimators: usize,
    seed: u64,
    n_features: usize,
    classes: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            seed,
            n_features: 0,
            classes: Vec::new(),
            trees: Vec::new(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn fit(&mut self, rows: &[Vec<f64>], labels: &[String]) -> Result<()> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(Error::Validation(format!(
                "cannot fit forest on {} rows with {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if self.n_estimators == 0 {
            return Err(Error::Validation("n_estimators must be at least 1".to_string()));
        }

        let n_features = rows[0].len();
        if rows.iter().any(|r| r.len() != n_features) {
            return Err(Error::Validation("feature rows have differing lengths".to_string()));
        }

        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();

        let targets: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or(0))
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let max_features = ((n_features as f64).sqrt() as usize).max(1);
        let n = rows.len();

        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();

            let mut builder = TreeBuilder {
                rows,
                targets: &targets,
                n_classes: classes.len(),
                max_features,
                rng: &mut rng,
                nodes: Vec::new(),
            };
            builder.grow(bootstrap);
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        tracing::debug!(
            "Fitted {} trees on {} rows, {} features, {} classes",
            trees.len(),
            n,
            n_features,
            classes.len()
        );

        self.n_features = n_features;
        self.classes = classes;
        self.trees = trees;
        Ok(())
    }

    /// Checks the structure of a deserialized forest before it is used for
    /// prediction: child indices point forward inside their tree, split
    /// features exist, and leaf distributions cover every class.
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() || self.trees.is_empty() {
            return Err(Error::Validation("forest has no classes or no trees".to_string()));
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(Error::Validation(format!("tree {} has no nodes", t)));
            }

            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Leaf { distribution } => {
                        if distribution.len() != self.classes.len() {
                            return Err(Error::Validation(format!(
                                "tree {} leaf {} has {} probabilities for {} classes",
                                t,
                                i,
                                distribution.len(),
                                self.classes.len()
                            )));
                        }
                    }
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        // Children always follow their parent, which also rules out cycles
                        let in_tree = |c: usize| c > i && c < tree.nodes.len();
                        if *feature >= self.n_features
                            || !threshold.is_finite()
                            || !in_tree(*left)
                            || !in_tree(*right)
                        {
                            return Err(Error::Validation(format!(
                                "tree {} split {} is malformed",
                                t, i
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Mean leaf class distribution across all trees.
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut totals = vec![0.0; self.classes.len()];
        if self.trees.is_empty() {
            return totals;
        }

        for tree in &self.trees {
            for (total, p) in totals.iter_mut().zip(tree.leaf_distribution(row)) {
                *total += p;
            }
        }

        let count = self.trees.len() as f64;
        totals.iter_mut().for_each(|t| *t /= count);
        totals
    }

    /// Most probable class; ties go to the lexicographically first class.
    pub fn predict(&self, row: &[f64]) -> Option<&str> {
        let proba = self.predict_proba(row);
        let mut best: Option<(usize, f64)> = None;

        for (i, p) in proba.into_iter().enumerate() {
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((i, p));
            }
        }

        best.map(|(i, _)| self.classes[i].as_str())
    }
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    targets: &'a [usize],
    n_classes: usize,
    max_features: usize,
    rng: &'a mut ChaCha8Rng,
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, samples: Vec<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });

        let counts = self.class_counts(&samples);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        let split = if pure || samples.len() < 2 {
            None
        } else {
            self.best_split(&samples)
        };

        match split {
            Some(best) => {
                let (left, right): (Vec<usize>, Vec<usize>) = samples
                    .into_iter()
                    .partition(|&s| self.rows[s][best.feature] <= best.threshold);

                let left = self.grow(left);
                let right = self.grow(right);
                self.nodes[index] = Node::Split {
                    feature: best.feature,
                    threshold: best.threshold,
                    left,
                    right,
                };
            }
            None => {
                let total = samples.len().max(1) as f64;
                self.nodes[index] = Node::Leaf {
                    distribution: counts.iter().map(|&c| c as f64 / total).collect(),
                };
            }
        }

        index
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &s in samples {
            counts[self.targets[s]] += 1;
        }
        counts
    }

    /// Searches random features until `max_features` non-constant ones have
    /// been evaluated. Returns `None` when every feature is constant here.
    fn best_split(&mut self, samples: &[usize]) -> Option<BestSplit> {
        let n_features = self.rows[samples[0]].len();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<BestSplit> = None;
        let mut visited = 0;

        for feature in features {
            if visited >= self.max_features {
                break;
            }

            let mut ordered: Vec<(f64, usize)> = samples
                .iter()
                .map(|&s| (self.rows[s][feature], self.targets[s]))
                .collect();
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

            if ordered[0].0 == ordered[ordered.len() - 1].0 {
                continue;
            }
            visited += 1;

            if let Some(candidate) = self.best_threshold(feature, &ordered) {
                if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    fn best_threshold(&self, feature: usize, ordered: &[(f64, usize)]) -> Option<BestSplit> {
        let n = ordered.len();
        let mut right = vec![0usize; self.n_classes];
        for &(_, class) in ordered {
            right[class] += 1;
        }
        let mut left = vec![0usize; self.n_classes];

        let mut best: Option<BestSplit> = None;

        for i in 0..n - 1 {
            let class = ordered[i].1;
            left[class] += 1;
            right[class] -= 1;

            let (value, next) = (ordered[i].0, ordered[i + 1].0);
            if value == next {
                continue;
            }

            let n_left = (i + 1) as f64;
            let n_right = (n - i - 1) as f64;
            let impurity =
                (n_left * gini(&left, n_left) + n_right * gini(&right, n_right)) / n as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = (value + next) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }

        best
    }
}

fn gini(counts: &[usize], total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_data() -> (Vec<Vec<f64>>, Vec<String>) {
        let rows = vec![
            vec![0.9, 0.1, 0.0],
            vec![0.8, 0.0, 0.2],
            vec![0.7, 0.2, 0.1],
            vec![0.1, 0.9, 0.0],
            vec![0.0, 0.8, 0.3],
            vec![0.2, 0.7, 0.1],
        ];
        let labels = ["left", "left", "left", "right", "right", "right"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        (rows, labels)
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4.0), 0.0);
        assert!((gini(&[2, 2], 4.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_forest_separates_clusters() {
        let (rows, labels) = toy_data();
        let mut forest = RandomForest::new(25, 7);
        forest.fit(&rows, &labels).unwrap();

        assert_eq!(forest.classes(), &["left", "right"]);
        assert_eq!(forest.predict(&[0.95, 0.05, 0.0]), Some("left"));
        assert_eq!(forest.predict(&[0.05, 0.95, 0.0]), Some("right"));

        let proba = forest.predict_proba(&[0.95, 0.05, 0.0]);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_model() {
        let (rows, labels) = toy_data();
        let mut a = RandomForest::new(10, 42);
        let mut b = RandomForest::new(10, 42);
        a.fit(&rows, &labels).unwrap();
        b.fit(&rows, &labels).unwrap();

        for sample in [[0.5, 0.5, 0.0], [0.3, 0.6, 0.2], [0.75, 0.15, 0.9]] {
            assert_eq!(a.predict_proba(&sample), b.predict_proba(&sample));
        }
    }

    #[test]
    fn test_single_class_predicts_it() {
        let rows = vec![vec![1.0], vec![2.0]];
        let labels = vec!["only".to_string(), "only".to_string()];
        let mut forest = RandomForest::new(3, 1);
        forest.fit(&rows, &labels).unwrap();
        assert_eq!(forest.predict(&[100.0]), Some("only"));
    }

    #[test]
    fn test_validate_accepts_fitted_forest() {
        let (rows, labels) = toy_data();
        let mut forest = RandomForest::new(5, 3);
        forest.fit(&rows, &labels).unwrap();
        assert!(forest.validate().is_ok());
        assert!(RandomForest::new(5, 3).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_broken_trees() {
        let forest_with = |nodes: Vec<Node>| RandomForest {
            n_estimators: 1,
            seed: 0,
            n_features: 2,
            classes: vec!["a".to_string(), "b".to_string()],
            trees: vec![DecisionTree { nodes }],
        };
        let leaf = || Node::Leaf {
            distribution: vec![1.0, 0.0],
        };
        let split = |feature, left, right| Node::Split {
            feature,
            threshold: 0.5,
            left,
            right,
        };

        assert!(forest_with(vec![split(0, 1, 2), leaf(), leaf()]).validate().is_ok());

        let dangling = forest_with(vec![split(0, 7, 1), leaf()]);
        assert!(matches!(dangling.validate(), Err(Error::Validation(_))));

        let cyclic = forest_with(vec![split(0, 0, 1), leaf()]);
        assert!(matches!(cyclic.validate(), Err(Error::Validation(_))));

        let unknown_feature = forest_with(vec![split(5, 1, 2), leaf(), leaf()]);
        assert!(matches!(unknown_feature.validate(), Err(Error::Validation(_))));

        let short_leaf = forest_with(vec![Node::Leaf {
            distribution: vec![1.0],
        }]);
        assert!(matches!(short_leaf.validate(), Err(Error::Validation(_))));

        assert!(forest_with(Vec::new()).validate().is_err());
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let mut forest = RandomForest::new(3, 1);
        assert!(forest.fit(&[], &[]).is_err());
        assert!(forest.fit(&[vec![1.0]], &[]).is_err());
        assert!(!forest.is_fitted());
    }
}
