use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

pub fn accuracy(y_true: &[String], y_pred: &[String]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Per-label precision, recall and F1 over the union of true and predicted
/// labels, sorted. Undefined ratios (zero denominators) are reported as 0.
pub fn per_class_metrics(y_true: &[String], y_pred: &[String]) -> Vec<ClassMetrics> {
    let labels: BTreeSet<&String> = y_true.iter().chain(y_pred).collect();

    labels
        .into_iter()
        .map(|label| {
            let tp = y_true
                .iter()
                .zip(y_pred)
                .filter(|(t, p)| *t == label && *p == label)
                .count() as f64;
            let predicted = y_pred.iter().filter(|p| *p == label).count() as f64;
            let support = y_true.iter().filter(|t| *t == label).count();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support as f64);
            let f1_score = ratio(2.0 * precision * recall, precision + recall);

            ClassMetrics {
                label: label.clone(),
                precision,
                recall,
                f1_score,
                support,
            }
        })
        .collect()
}

/// Plain-text report in the familiar precision/recall/f1/support layout,
/// followed by accuracy, macro and support-weighted averages.
pub fn classification_report(y_true: &[String], y_pred: &[String]) -> String {
    const WEIGHTED: &str = "weighted avg";

    let metrics = per_class_metrics(y_true, y_pred);
    let width = metrics
        .iter()
        .map(|m| m.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(WEIGHTED.len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n\n",
        "",
        "precision",
        "recall",
        "f1-score",
        "support",
        width = width
    ));

    for m in &metrics {
        out.push_str(&format_row(&m.label, m.precision, m.recall, m.f1_score, m.support, width));
    }
    out.push('\n');

    let total = y_true.len();
    out.push_str(&format!(
        "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy",
        "",
        "",
        accuracy(y_true, y_pred),
        total,
        width = width
    ));

    let n_labels = metrics.len().max(1) as f64;
    let macro_avg = |f: fn(&ClassMetrics) -> f64| metrics.iter().map(f).sum::<f64>() / n_labels;
    out.push_str(&format_row(
        "macro avg",
        macro_avg(|m| m.precision),
        macro_avg(|m| m.recall),
        macro_avg(|m| m.f1_score),
        total,
        width,
    ));

    let weighted_avg = |f: fn(&ClassMetrics) -> f64| {
        ratio(
            metrics.iter().map(|m| f(m) * m.support as f64).sum::<f64>(),
            total as f64,
        )
    };
    out.push_str(&format_row(
        WEIGHTED,
        weighted_avg(|m| m.precision),
        weighted_avg(|m| m.recall),
        weighted_avg(|m| m.f1_score),
        total,
        width,
    ));

    out
}

fn format_row(label: &str, precision: f64, recall: f64, f1: f64, support: usize, width: usize) -> String {
    format!(
        "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
        label,
        precision,
        recall,
        f1,
        support,
        width = width
    )
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
