// src/ner/mod.rs
pub mod dataset;
pub mod docbin;
pub mod evaluation;
pub mod features;
pub mod labels;
pub mod model;
pub mod perceptron;
pub mod tagger;
pub mod trainer;

pub use dataset::{build_documents, load_labeled_records, train_test_split, Document, LabeledRecord};
pub use docbin::DocBin;
pub use labels::EntityLabel;
pub use model::{EntityRecognizer, EntitySpan, ModelHandle, TrainedModel};
pub use tagger::{format_address, tag_address, StructuredAddress, TagOutcome};
pub use trainer::{train, EpochLoss, TrainingOptions};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::ner::dataset::{LabeledRecord, RawAnnotation};

    /// "gov, area, block, street, building" with one annotation per part.
    pub fn address_record(parts: [&str; 5]) -> LabeledRecord {
        let labels = ["GOV", "AREA", "BLOCK", "STREET", "BUILDING"];
        let mut text = String::new();
        let mut annotations = Vec::new();
        for (part, label) in parts.iter().zip(labels) {
            if !text.is_empty() {
                text.push_str(", ");
            }
            let start = text.chars().count() as i64;
            text.push_str(part);
            annotations.push(RawAnnotation {
                start,
                end: text.chars().count() as i64,
                label: label.to_string(),
            });
        }
        LabeledRecord { text, annotations }
    }

    pub fn corpus() -> Vec<LabeledRecord> {
        vec![
            address_record(["Kuwait City", "Hawalli", "Block 5", "Street 10", "Building 3"]),
            address_record(["Capital Governorate", "Salmiya", "Block 12", "Street 4", "Building 22"]),
            address_record(["Ahmadi Governorate", "Fahaheel", "Block 2", "Street 7", "Building 9"]),
            address_record(["Jahra Governorate", "Qasr", "Block 8", "Street 15", "Building 1"]),
            address_record(["Farwaniya Governorate", "Khaitan", "Block 3", "Street 21", "Building 40"]),
        ]
    }
}
