// src/ner/trainer.rs
use anyhow::{bail, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::ner::dataset::Document;
use crate::ner::features::sentence_features;
use crate::ner::labels::Tag;
use crate::ner::perceptron::{PerceptronLearner, SequenceModel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOptions {
    pub epochs: usize,
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self { epochs: 10, seed: 42 }
    }
}

/// Loss for one pass over the training documents: the number of mistagged tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochLoss {
    pub epoch: usize,
    pub loss: usize,
    pub documents: usize,
}

struct Prepared {
    features: Vec<Vec<String>>,
    gold: Vec<Tag>,
}

/// Trains a sequence model from scratch. Every document is presented exactly once per
/// epoch, in an order reshuffled each epoch from `options.seed`. `on_epoch` is called
/// after each epoch with that epoch's loss; there is no early stopping.
pub fn train<F>(
    documents: &[Document],
    options: TrainingOptions,
    mut on_epoch: F,
) -> Result<(SequenceModel, Vec<EpochLoss>)>
where
    F: FnMut(&EpochLoss),
{
    if documents.is_empty() {
        bail!("Cannot train an entity model without training documents");
    }

    let prepared: Vec<Prepared> = documents
        .iter()
        .filter(|d| !d.tokens.is_empty())
        .map(|d| Prepared {
            features: sentence_features(&d.tokens),
            gold: d.tags(),
        })
        .collect();
    let skipped = documents.len() - prepared.len();
    if skipped > 0 {
        debug!("Skipping {} documents with no tokens", skipped);
    }
    info!(
        "🧠 Training on {} documents for {} epochs (seed {})",
        prepared.len(),
        options.epochs,
        options.seed
    );

    let mut learner = PerceptronLearner::new();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut order: Vec<usize> = (0..prepared.len()).collect();
    let mut losses = Vec::with_capacity(options.epochs);

    for epoch in 1..=options.epochs {
        order.shuffle(&mut rng);
        let loss = order.iter().fold(0usize, |acc, &idx| {
            let doc = &prepared[idx];
            acc + learner.learn(&doc.features, &doc.gold)
        });
        let record = EpochLoss {
            epoch,
            loss,
            documents: prepared.len(),
        };
        on_epoch(&record);
        losses.push(record);
    }

    Ok((learner.finish(), losses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::tokenizer::Tokenizer;
    use crate::ner::dataset::{build_documents, LabeledRecord, RawAnnotation};
    use crate::ner::labels::{tags_to_spans, EntityLabel};
    use crate::ner::test_support::corpus;

    #[test]
    fn test_empty_training_set_is_an_error() {
        assert!(train(&[], TrainingOptions::default(), |_| {}).is_err());
    }

    #[test]
    fn test_reports_every_epoch_and_loss_drops() {
        let docs = build_documents(&corpus(), &Tokenizer::new());
        let mut seen = Vec::new();
        let (_, losses) = train(&docs, TrainingOptions { epochs: 10, seed: 42 }, |l| seen.push(l.epoch)).unwrap();
        assert_eq!(seen, (1..=10).collect::<Vec<_>>());
        assert_eq!(losses.len(), 10);
        assert!(losses[0].loss > 0);
        assert!(losses[9].loss < losses[0].loss);
        assert!(losses.iter().all(|l| l.documents == 5));
    }

    #[test]
    fn test_recognizes_training_sentence() {
        let docs = build_documents(&corpus(), &Tokenizer::new());
        let (model, _) = train(&docs, TrainingOptions { epochs: 10, seed: 7 }, |_| {}).unwrap();
        let doc = &docs[0];
        let predicted = tags_to_spans(&model.decode(&sentence_features(&doc.tokens)));
        let labels: Vec<EntityLabel> = predicted.iter().map(|s| s.label).collect();
        assert_eq!(labels, EntityLabel::ALL.to_vec());
        assert_eq!(predicted, doc.entities);
    }

    #[test]
    fn test_bad_spans_do_not_abort_training() {
        let mut records = corpus();
        records.push(LabeledRecord {
            text: "Block 5".to_string(),
            annotations: vec![
                RawAnnotation { start: 7, end: 2, label: "BLOCK".to_string() },
                RawAnnotation { start: 0, end: 99, label: "BLOCK".to_string() },
            ],
        });
        let docs = build_documents(&records, &Tokenizer::new());
        assert!(docs[5].entities.is_empty());
        let (_, losses) = train(&docs, TrainingOptions { epochs: 2, seed: 1 }, |_| {}).unwrap();
        assert_eq!(losses[0].documents, 6);
    }

    #[test]
    fn test_same_seed_same_model() {
        let docs = build_documents(&corpus(), &Tokenizer::new());
        let options = TrainingOptions { epochs: 3, seed: 11 };
        let (a, la) = train(&docs, options, |_| {}).unwrap();
        let (b, lb) = train(&docs, options, |_| {}).unwrap();
        assert_eq!(la, lb);
        assert_eq!(a, b);
    }
}
