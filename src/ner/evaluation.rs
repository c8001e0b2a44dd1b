// src/ner/evaluation.rs
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::ner::dataset::Document;
use crate::ner::features::sentence_features;
use crate::ner::labels::{tags_to_spans, EntityLabel, TokenSpan};
use crate::ner::perceptron::SequenceModel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl LabelCounts {
    fn add(&mut self, other: LabelCounts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Exact-match entity scores on held-out documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub documents: usize,
    pub per_label: BTreeMap<EntityLabel, LabelCounts>,
}

impl EvaluationReport {
    pub fn overall(&self) -> LabelCounts {
        let mut total = LabelCounts::default();
        for counts in self.per_label.values() {
            total.add(*counts);
        }
        total
    }

    fn record(&mut self, gold: &[TokenSpan], predicted: &[TokenSpan]) {
        let gold: HashSet<&TokenSpan> = gold.iter().collect();
        let predicted: HashSet<&TokenSpan> = predicted.iter().collect();
        for span in &predicted {
            let counts = self.per_label.entry(span.label).or_default();
            if gold.contains(span) {
                counts.true_positives += 1;
            } else {
                counts.false_positives += 1;
            }
        }
        for span in gold.difference(&predicted) {
            self.per_label.entry(span.label).or_default().false_negatives += 1;
        }
    }
}

pub fn evaluate(model: &SequenceModel, documents: &[Document]) -> EvaluationReport {
    let mut report = EvaluationReport {
        documents: documents.len(),
        per_label: EntityLabel::ALL.iter().map(|l| (*l, LabelCounts::default())).collect(),
    };
    for doc in documents {
        let predicted = tags_to_spans(&model.decode(&sentence_features(&doc.tokens)));
        report.record(&doc.entities, &predicted);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, label: EntityLabel) -> TokenSpan {
        TokenSpan { start, end, label }
    }

    #[test]
    fn test_counts_and_scores() {
        let mut report = EvaluationReport::default();
        let gold = vec![span(0, 2, EntityLabel::Block), span(3, 4, EntityLabel::Area)];
        let predicted = vec![span(0, 2, EntityLabel::Block), span(3, 5, EntityLabel::Area)];
        report.record(&gold, &predicted);

        let block = report.per_label[&EntityLabel::Block];
        assert_eq!(block.true_positives, 1);
        assert_eq!(block.f1(), 1.0);

        let area = report.per_label[&EntityLabel::Area];
        assert_eq!((area.false_positives, area.false_negatives), (1, 1));
        assert_eq!(area.precision(), 0.0);

        let overall = report.overall();
        assert_eq!(overall.precision(), 0.5);
        assert_eq!(overall.recall(), 0.5);
    }

    #[test]
    fn test_training_documents_score_perfectly() {
        use crate::correction::tokenizer::Tokenizer;
        use crate::ner::dataset::build_documents;
        use crate::ner::test_support::corpus;
        use crate::ner::trainer::{train, TrainingOptions};

        let docs = build_documents(&corpus(), &Tokenizer::new());
        let (model, _) = train(&docs, TrainingOptions::default(), |_| {}).unwrap();
        let report = evaluate(&model, &docs);
        assert_eq!(report.documents, 5);
        assert_eq!(report.per_label.len(), 5);
        assert_eq!(report.overall().true_positives, 25);
        assert_eq!(report.overall().f1(), 1.0);
    }

    #[test]
    fn test_empty_counts_score_zero() {
        let counts = LabelCounts::default();
        assert_eq!(counts.precision(), 0.0);
        assert_eq!(counts.f1(), 0.0);
    }
}
