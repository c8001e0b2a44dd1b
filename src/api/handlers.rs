// src/api/handlers.rs
use log::debug;

use crate::api::{
    ContactRequest, ContactResponse, CorrectAddressRequest, CorrectAddressResponse, TagRequest,
    TagResponse,
};
use crate::correction::address::AddressNormalizer;
use crate::correction::phone::extract_phone;
use crate::ner::model::EntityRecognizer;
use crate::ner::tagger::{tag_address, TagOutcome};

/// Endpoint A: normalize a bare address.
pub fn correct_address(normalizer: &AddressNormalizer, request: &CorrectAddressRequest) -> CorrectAddressResponse {
    CorrectAddressResponse {
        corrected_address: normalizer.correct_address_format(&request.address),
    }
}

/// Endpoint B: split off the first Kuwait mobile number, then normalize what is left.
pub fn correct_contact(normalizer: &AddressNormalizer, request: &ContactRequest) -> ContactResponse {
    let extraction = extract_phone(&request.input_text);
    let corrected_address = normalizer.correct_address_format(&extraction.address);
    debug!(
        "Contact correction: phone={:?} address='{}'",
        extraction.phone, corrected_address
    );
    ContactResponse {
        phone_number: extraction.phone,
        corrected_address,
    }
}

pub fn tag_text<R: EntityRecognizer + ?Sized>(recognizer: &R, request: &TagRequest) -> TagResponse {
    let outcome = tag_address(recognizer, &request.text);
    let missing = match &outcome {
        TagOutcome::Complete(_) => Vec::new(),
        TagOutcome::Incomplete { missing } => missing.iter().map(|l| l.to_string()).collect(),
    };
    TagResponse {
        complete: outcome.is_complete(),
        message: outcome.message(),
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::corrections::CorrectionTable;
    use crate::ner::labels::EntityLabel;
    use crate::ner::model::EntitySpan;
    use crate::ner::tagger::INCOMPLETE_ADDRESS_MESSAGE;

    fn normalizer() -> AddressNormalizer {
        AddressNormalizer::new(CorrectionTable::kuwait()).unwrap()
    }

    #[test]
    fn test_endpoint_a() {
        let response = correct_address(
            &normalizer(),
            &CorrectAddressRequest { address: "blk5 st10 hawalli".to_string() },
        );
        assert_eq!(response.corrected_address, "Block 5 Street 10 Hawalli");
    }

    #[test]
    fn test_endpoint_b_with_phone() {
        let response = correct_contact(
            &normalizer(),
            &ContactRequest { input_text: "+965 98765432 blk 5".to_string() },
        );
        assert_eq!(response.phone_number.as_deref(), Some("+965 98765432"));
        assert_eq!(response.corrected_address, "Block 5");
    }

    #[test]
    fn test_endpoint_b_without_phone() {
        let response = correct_contact(
            &normalizer(),
            &ContactRequest { input_text: "  salmiya st 4 ".to_string() },
        );
        assert_eq!(response.phone_number, None);
        assert_eq!(response.corrected_address, "Salmiya Street 4");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["phone_number"].is_null());
    }

    #[test]
    fn test_request_json_shape() {
        let request: ContactRequest = serde_json::from_str(r#"{"input_text": "blk 1"}"#).unwrap();
        assert_eq!(request.input_text, "blk 1");
        let request: CorrectAddressRequest = serde_json::from_str(r#"{"address": "blk 1"}"#).unwrap();
        assert_eq!(correct_address(&normalizer(), &request).corrected_address, "Block 1");
    }

    struct NoEntities;

    impl EntityRecognizer for NoEntities {
        fn recognize(&self, _text: &str) -> Vec<EntitySpan> {
            Vec::new()
        }
    }

    #[test]
    fn test_tag_rejection_lists_missing_labels() {
        let response = tag_text(&NoEntities, &TagRequest { text: "Hawalli".to_string() });
        assert!(!response.complete);
        assert_eq!(response.message, INCOMPLETE_ADDRESS_MESSAGE);
        assert_eq!(response.missing.len(), EntityLabel::ALL.len());
        assert_eq!(response.missing[0], "GOV");
    }
}
