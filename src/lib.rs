// src/lib.rs
pub mod api;
pub mod correction;
pub mod ner;
pub mod utils;

pub use correction::address::AddressNormalizer;
pub use correction::corrections::CorrectionTable;
pub use correction::phone::{extract_phone, PhoneExtraction};
pub use ner::model::{ModelHandle, TrainedModel};
pub use ner::tagger::{format_address, TagOutcome};
