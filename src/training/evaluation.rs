//! Held-out evaluation metrics

use serde::Serialize;
use std::cmp::Ordering;

/// Fraction of predictions equal to the labels
pub fn accuracy(labels: &[u8], predictions: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(label, predicted)| label == predicted)
        .count();
    correct as f64 / labels.len() as f64
}

/// ROC-AUC via the Mann-Whitney U statistic.
///
/// Tied scores receive their average rank. Returns 0.5 when either class is
/// absent, since the ranking carries no information then.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> f64 {
    let mut ranked: Vec<(f64, u8)> = scores.iter().copied().zip(labels.iter().copied()).collect();
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let positives = ranked.iter().filter(|(_, label)| *label == 1).count();
    let negatives = ranked.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < ranked.len() {
        let mut end = start + 1;
        while end < ranked.len() && ranked[end].0 == ranked[start].0 {
            end += 1;
        }
        // ranks are 1-based; the tie group spans start+1..=end
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let group_positives = ranked[start..end].iter().filter(|(_, l)| *l == 1).count();
        positive_rank_sum += average_rank * group_positives as f64;
        start = end;
    }

    let p = positives as f64;
    let u = positive_rank_sum - p * (p + 1.0) / 2.0;
    u / (p * negatives as f64)
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class breakdown logged after training
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub legitimate: ClassMetrics,
    pub fraud: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(labels: &[u8], predictions: &[u8]) -> Self {
        Self {
            legitimate: class_metrics(labels, predictions, 0),
            fraud: class_metrics(labels, predictions, 1),
        }
    }
}

fn class_metrics(labels: &[u8], predictions: &[u8], class: u8) -> ClassMetrics {
    let mut true_positive = 0usize;
    let mut false_positive = 0usize;
    let mut false_negative = 0usize;
    for (&label, &predicted) in labels.iter().zip(predictions) {
        match (label == class, predicted == class) {
            (true, true) => true_positive += 1,
            (false, true) => false_positive += 1,
            (true, false) => false_negative += 1,
            (false, false) => {}
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(true_positive, true_positive + false_positive);
    let recall = ratio(true_positive, true_positive + false_negative);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    ClassMetrics {
        precision,
        recall,
        f1,
        support: true_positive + false_negative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1, 0, 1, 0], &[1, 0, 0, 0]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_perfect_and_inverted_ranking() {
        let labels = [0, 0, 1, 1];
        assert_eq!(roc_auc(&labels, &[0.1, 0.2, 0.8, 0.9]), 1.0);
        assert_eq!(roc_auc(&labels, &[0.9, 0.8, 0.2, 0.1]), 0.0);
    }

    #[test]
    fn test_ties_count_half() {
        assert_eq!(roc_auc(&[0, 1], &[0.5, 0.5]), 0.5);
        // pairs: (0.1,0.4) win, (0.1,0.8) win, (0.4,0.4) tie, (0.4,0.8) win
        let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.4, 0.4, 0.8]);
        assert!((auc - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_auc() {
        assert_eq!(roc_auc(&[1, 1, 1], &[0.2, 0.4, 0.9]), 0.5);
    }

    #[test]
    fn test_classification_report() {
        let report = ClassificationReport::new(&[1, 1, 0, 0, 0], &[1, 0, 1, 0, 0]);
        assert_eq!(report.fraud.support, 2);
        assert_eq!(report.fraud.precision, 0.5);
        assert_eq!(report.fraud.recall, 0.5);
        assert_eq!(report.legitimate.support, 3);
        assert!((report.legitimate.recall - 2.0 / 3.0).abs() < 1e-12);
    }
}
