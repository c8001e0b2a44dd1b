// src/ner/dataset.rs
//! Labeled address data: loading, span validation, and the train/test split.
use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::correction::tokenizer::{Token, Tokenizer};
use crate::ner::labels::{spans_to_tags, EntityLabel, Tag, TokenSpan};
use crate::utils::persistence::read_bytes;

/// One annotation as found in the input file. Offsets are character offsets and are
/// kept signed so a bad record is rejected per span instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnnotation {
    pub start: i64,
    pub end: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub text: String,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

/// Why an annotation did not make it into its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanRejection {
    /// start >= end, or a negative offset
    Inverted { start: i64, end: i64 },
    OutOfBounds { end: i64, text_chars: usize },
    UnknownLabel(String),
    /// No whole token fits inside the character range.
    Misaligned { start: i64, end: i64 },
    /// Shares a token with an earlier accepted span.
    Overlap { start: i64, end: i64 },
}

/// Tokenized text with token-level entities; the unit the trainer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub tokens: Vec<Token>,
    pub entities: Vec<TokenSpan>,
}

impl Document {
    pub fn tags(&self) -> Vec<Tag> {
        spans_to_tags(self.tokens.len(), &self.entities)
    }

    pub fn entity_text(&self, span: &TokenSpan) -> &str {
        match (self.tokens.get(span.start), span.end.checked_sub(1).and_then(|i| self.tokens.get(i))) {
            (Some(first), Some(last)) => &self.text[first.start..last.end],
            _ => "",
        }
    }
}

/// Result of turning one record into a document.
#[derive(Debug, Clone)]
pub struct DocumentBuild {
    pub document: Document,
    pub rejected: Vec<SpanRejection>,
}

pub fn load_labeled_records(path: &Path) -> Result<Vec<LabeledRecord>> {
    let bytes = read_bytes(path)?;
    let records: Vec<LabeledRecord> = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse labeled records from {}", path.display()))?;
    info!("📊 Loaded {} labeled address records from {}", records.len(), path.display());
    Ok(records)
}

/// Tokenizes `record.text` and keeps every annotation that is in bounds, has a known
/// label, covers at least one whole token, and does not overlap an earlier kept span.
/// Partially covered edge tokens are dropped from the span.
pub fn build_document(record: &LabeledRecord, tokenizer: &Tokenizer) -> DocumentBuild {
    let tokens = tokenizer.tokenize(&record.text);
    let text_chars = record.text.chars().count();
    let mut entities: Vec<TokenSpan> = Vec::new();
    let mut rejected = Vec::new();

    for ann in &record.annotations {
        match align_annotation(ann, &record.text, text_chars, &tokens) {
            Ok(span) => {
                if entities.iter().any(|kept| kept.overlaps(&span)) {
                    rejected.push(SpanRejection::Overlap { start: ann.start, end: ann.end });
                } else {
                    entities.push(span);
                }
            }
            Err(reason) => rejected.push(reason),
        }
    }
    entities.sort_by_key(|s| s.start);

    if !rejected.is_empty() {
        debug!(
            "Dropped {} of {} spans for '{}': {:?}",
            rejected.len(),
            record.annotations.len(),
            record.text,
            rejected
        );
    }

    DocumentBuild {
        document: Document {
            text: record.text.clone(),
            tokens,
            entities,
        },
        rejected,
    }
}

/// Builds documents for all records, logging a summary of dropped spans.
pub fn build_documents(records: &[LabeledRecord], tokenizer: &Tokenizer) -> Vec<Document> {
    let mut dropped = 0usize;
    let documents: Vec<Document> = records
        .iter()
        .map(|record| {
            let build = build_document(record, tokenizer);
            dropped += build.rejected.len();
            build.document
        })
        .collect();
    if dropped > 0 {
        warn!(
            "⚠️  Dropped {} malformed spans across {} records (documents kept)",
            dropped,
            records.len()
        );
    }
    documents
}

fn align_annotation(
    ann: &RawAnnotation,
    text: &str,
    text_chars: usize,
    tokens: &[Token],
) -> std::result::Result<TokenSpan, SpanRejection> {
    if ann.start < 0 || ann.end < 0 || ann.start >= ann.end {
        return Err(SpanRejection::Inverted { start: ann.start, end: ann.end });
    }
    if ann.end as usize > text_chars {
        return Err(SpanRejection::OutOfBounds { end: ann.end, text_chars });
    }
    let label: EntityLabel = ann
        .label
        .parse()
        .map_err(|_| SpanRejection::UnknownLabel(ann.label.clone()))?;

    let byte_start = char_to_byte(text, ann.start as usize);
    let byte_end = char_to_byte(text, ann.end as usize);

    let mut covered = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.start >= byte_start && t.end <= byte_end)
        .map(|(i, _)| i);
    let first = covered
        .next()
        .ok_or(SpanRejection::Misaligned { start: ann.start, end: ann.end })?;
    let last = covered.last().unwrap_or(first);

    Ok(TokenSpan {
        start: first,
        end: last + 1,
        label,
    })
}

fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(b, _)| b)
}

/// Seeded shuffle, then `ceil(n * test_size)` items go to the test side. At least one
/// item stays on the training side whenever there is more than one item.
pub fn train_test_split<T>(items: Vec<T>, test_size: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let n = items.len();
    let test_size = test_size.clamp(0.0, 1.0);
    let n_test = ((n as f64) * test_size).ceil() as usize;
    let n_test = n_test.min(n.saturating_sub(1));

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut test = Vec::with_capacity(n_test);
    let mut train = Vec::with_capacity(n - n_test);
    for (rank, idx) in order.into_iter().enumerate() {
        if let Some(item) = slots[idx].take() {
            if rank < n_test {
                test.push(item);
            } else {
                train.push(item);
            }
        }
    }
    (train, test)
}
