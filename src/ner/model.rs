// src/ner/model.rs
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::correction::tokenizer::Tokenizer;
use crate::ner::features::sentence_features;
use crate::ner::labels::{tags_to_spans, EntityLabel};
use crate::ner::perceptron::SequenceModel;
use crate::ner::trainer::EpochLoss;
use crate::utils::persistence::{read_bytes, write_atomically};

pub const WEIGHTS_FILE: &str = "model.bin";
pub const META_FILE: &str = "meta.json";

/// A recognized entity. Offsets are byte offsets into the tagged text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Anything that can find address entities in free text.
pub trait EntityRecognizer {
    fn recognize(&self, text: &str) -> Vec<EntitySpan>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub labels: Vec<EntityLabel>,
    pub epochs: usize,
    pub losses: Vec<EpochLoss>,
    pub train_documents: usize,
    pub test_documents: usize,
    pub feature_count: usize,
    pub weights_sha256: String,
}

/// Trained weights plus the tokenizer they were trained against.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    meta: ModelMeta,
    model: SequenceModel,
    tokenizer: Tokenizer,
}

fn weights_bytes(model: &SequenceModel) -> Result<Vec<u8>> {
    bincode::serialize(model).context("Failed to serialize model weights")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl TrainedModel {
    pub fn new(
        model: SequenceModel,
        losses: Vec<EpochLoss>,
        train_documents: usize,
        test_documents: usize,
    ) -> Result<Self> {
        let weights_sha256 = sha256_hex(&weights_bytes(&model)?);
        let meta = ModelMeta {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            labels: EntityLabel::ALL.to_vec(),
            epochs: losses.len(),
            losses,
            train_documents,
            test_documents,
            feature_count: model.feature_count(),
            weights_sha256,
        };
        Ok(Self {
            meta,
            model,
            tokenizer: Tokenizer::new(),
        })
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let weights = weights_bytes(&self.model)?;
        let meta_json =
            serde_json::to_vec_pretty(&self.meta).context("Failed to serialize model metadata")?;
        write_atomically(&dir.join(WEIGHTS_FILE), &weights)?;
        write_atomically(&dir.join(META_FILE), &meta_json)?;
        info!(
            "💾 Saved model {} ({} features) to {}",
            self.meta.model_id,
            self.meta.feature_count,
            dir.display()
        );
        Ok(())
    }

    /// Loads a bundle written by `save`, rejecting weights whose checksum does not match.
    pub fn load(dir: &Path) -> Result<Self> {
        let meta_path = dir.join(META_FILE);
        let meta: ModelMeta = serde_json::from_slice(&read_bytes(&meta_path)?)
            .with_context(|| format!("Failed to parse {}", meta_path.display()))?;

        let weights_path = dir.join(WEIGHTS_FILE);
        let weights = read_bytes(&weights_path)?;
        let actual = sha256_hex(&weights);
        if actual != meta.weights_sha256 {
            bail!(
                "Checksum mismatch for {}: expected {}, found {}",
                weights_path.display(),
                meta.weights_sha256,
                actual
            );
        }
        let model: SequenceModel = bincode::deserialize(&weights)
            .with_context(|| format!("Failed to deserialize {}", weights_path.display()))?;

        info!(
            "📦 Loaded model {} trained at {} ({} epochs)",
            meta.model_id, meta.trained_at, meta.epochs
        );
        Ok(Self {
            meta,
            model,
            tokenizer: Tokenizer::new(),
        })
    }
}

impl EntityRecognizer for TrainedModel {
    fn recognize(&self, text: &str) -> Vec<EntitySpan> {
        let tokens = self.tokenizer.tokenize(text);
        if tokens.is_empty() {
            return Vec::new();
        }
        let tags = self.model.decode(&sentence_features(&tokens));
        tags_to_spans(&tags)
            .into_iter()
            .map(|span| {
                let start = tokens[span.start].start;
                let end = tokens[span.end - 1].end;
                EntitySpan {
                    label: span.label,
                    start,
                    end,
                    text: text[start..end].to_string(),
                }
            })
            .collect()
    }
}

/// Process-wide, read-only model handle. Readers clone the inner `Arc`; a reload
/// replaces it whole, so in-flight readers keep the model they started with.
#[derive(Debug)]
pub struct ModelHandle {
    inner: RwLock<Arc<TrainedModel>>,
}

impl ModelHandle {
    pub fn new(model: TrainedModel) -> Self {
        Self {
            inner: RwLock::new(Arc::new(model)),
        }
    }

    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self::new(TrainedModel::load(dir)?))
    }

    pub fn current(&self) -> Arc<TrainedModel> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Installs `model` and returns the one it replaced.
    pub fn swap(&self, model: TrainedModel) -> Arc<TrainedModel> {
        let next = Arc::new(model);
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Model handle lock was poisoned; replacing model anyway");
                poisoned.into_inner()
            }
        };
        std::mem::replace(&mut *guard, next)
    }

    /// Loads a new bundle from disk and swaps it in. On failure the current model stays.
    pub fn reload(&self, dir: &Path) -> Result<Arc<TrainedModel>> {
        let model = TrainedModel::load(dir)?;
        Ok(self.swap(model))
    }
}

impl EntityRecognizer for ModelHandle {
    fn recognize(&self, text: &str) -> Vec<EntitySpan> {
        self.current().recognize(text)
    }
}
