// src/ner/docbin.rs
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ner::dataset::Document;
use crate::utils::persistence::{read_bytes, write_atomically};

/// Serialized collection of annotated documents, written once per split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBin {
    pub documents: Vec<Document>,
}

impl DocBin {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.documents.iter().map(|d| d.entities.len()).sum()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serialize(self).context("Failed to serialize document bin")?;
        write_atomically(path, &bytes)?;
        info!(
            "💾 Saved {} documents ({} entities) to {}",
            self.len(),
            self.entity_count(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = read_bytes(path)?;
        bincode::deserialize(&bytes)
            .with_context(|| format!("Failed to deserialize document bin {}", path.display()))
    }
}
