// src/correction/mod.rs
pub mod address;
pub mod corrections;
pub mod phone;
pub mod tokenizer;

pub use address::{AddressNormalizer, NormalizedAddress};
pub use corrections::CorrectionTable;
pub use phone::{extract_phone, PhoneExtraction};
pub use tokenizer::{Token, TokenKind, Tokenizer};
