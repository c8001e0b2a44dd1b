// src/api/mod.rs
//! Request/response contracts for the address endpoints. Transport is left to the
//! caller; each handler is a plain function over a shared normalizer.

pub mod handlers;

pub use handlers::{correct_address, correct_contact, tag_text};

use serde::{Deserialize, Serialize};

/// Endpoint A request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectAddressRequest {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectAddressResponse {
    pub corrected_address: String,
}

/// Endpoint B request: address text with an optional embedded phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub input_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub phone_number: Option<String>,
    pub corrected_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResponse {
    pub complete: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub missing: Vec<String>,
}
