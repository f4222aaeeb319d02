//! Quality Metrics module
//!
//! Precision, recall and F1 for recognized titles against a hand-labelled
//! gold list, overall and per grammar rule.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use reel_core::{unjoin_title, MatchResult};

// ============================================================================
// Title Metrics
// ============================================================================

/// Counts for title recognition evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMetrics {
    /// Recognized titles present in the gold list
    pub true_positives: usize,
    /// Recognized titles absent from the gold list
    pub false_positives: usize,
    /// Gold titles that were missed
    pub false_negatives: usize,
    /// Distinct titles in the gold list
    pub gold_total: usize,
    /// Distinct titles recognized
    pub predicted_total: usize,
}

impl TitleMetrics {
    /// Calculate precision (TP / (TP + FP))
    pub fn precision(&self) -> f32 {
        if self.true_positives + self.false_positives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_positives) as f32
        }
    }

    /// Calculate recall (TP / (TP + FN))
    pub fn recall(&self) -> f32 {
        if self.true_positives + self.false_negatives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_negatives) as f32
        }
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    fn add(&mut self, other: &TitleMetrics) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.gold_total += other.gold_total;
        self.predicted_total += other.predicted_total;
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluator for recognized titles
#[derive(Debug, Clone)]
pub struct Evaluator {
    /// Compare titles ignoring case (rule output is lowercase for joined titles)
    ignore_case: bool,
}

impl Evaluator {
    /// Create a new evaluator comparing titles case-insensitively
    pub fn new() -> Self {
        Self { ignore_case: true }
    }

    /// Require exact case
    pub fn case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }

    fn normalize(&self, title: &str) -> String {
        let title = unjoin_title(title.trim());
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.ignore_case {
            title.to_lowercase()
        } else {
            title
        }
    }

    fn title_set<'a, I>(&self, titles: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        titles
            .into_iter()
            .map(|t| self.normalize(t))
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Evaluate recognized titles for one transcript
    pub fn evaluate<P, G>(&self, predicted: &[P], gold: &[G]) -> TitleMetrics
    where
        P: AsRef<str>,
        G: AsRef<str>,
    {
        let predicted_set = self.title_set(predicted.iter().map(|p| p.as_ref()));
        let gold_set = self.title_set(gold.iter().map(|g| g.as_ref()));

        let true_positives = predicted_set.intersection(&gold_set).count();

        TitleMetrics {
            true_positives,
            false_positives: predicted_set.len() - true_positives,
            false_negatives: gold_set.len() - true_positives,
            gold_total: gold_set.len(),
            predicted_total: predicted_set.len(),
        }
    }

    /// Evaluate each rule's extractions on its own, keyed by rule id
    pub fn evaluate_rules<G>(
        &self,
        matches: &[MatchResult],
        gold: &[G],
    ) -> BTreeMap<String, TitleMetrics>
    where
        G: AsRef<str>,
    {
        let mut by_rule: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for m in matches {
            by_rule
                .entry(m.rule_id.clone())
                .or_default()
                .push(m.extracted_text.as_str());
        }

        by_rule
            .into_iter()
            .map(|(rule, predicted)| (rule, self.evaluate(&predicted, gold)))
            .collect()
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Evaluation Report
// ============================================================================

/// Aggregate metrics over several transcripts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub metrics: TitleMetrics,
    pub num_transcripts: usize,
}

impl EvaluationReport {
    /// Add one transcript's metrics
    pub fn add(&mut self, metrics: &TitleMetrics) {
        self.metrics.add(metrics);
        self.num_transcripts += 1;
    }

    /// Render a summary report
    pub fn report(&self) -> String {
        format!(
            "=== Title Recognition Report ===\n\n\
             Transcripts evaluated: {}\n\n\
               Precision: {:.1}%\n\
               Recall:    {:.1}%\n\
               F1 Score:  {:.1}%\n\
               Gold: {} | Predicted: {} | TP: {} | FP: {} | FN: {}\n",
            self.num_transcripts,
            self.metrics.precision() * 100.0,
            self.metrics.recall() * 100.0,
            self.metrics.f1_score() * 100.0,
            self.metrics.gold_total,
            self.metrics.predicted_total,
            self.metrics.true_positives,
            self.metrics.false_positives,
            self.metrics.false_negatives,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
