// src/correction/phone.rs
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kuwait mobile: optional "+965"/"965" (optionally followed by one literal space),
/// then 8 digits starting with 9, 6, 5 or 4.
static KUWAIT_MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\+?965 ?)?[9654][0-9]{7}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneExtraction {
    pub phone: Option<String>,
    /// Input with the matched phone removed, trimmed.
    pub address: String,
}

/// Pulls the first Kuwait mobile number out of a combined "phone + address" string.
///
/// Later numbers are left inside `address` untouched.
pub fn extract_phone(input: &str) -> PhoneExtraction {
    match KUWAIT_MOBILE.find(input) {
        Some(m) => {
            let phone = m.as_str().trim().to_string();
            let address = format!("{}{}", &input[..m.start()], &input[m.end()..])
                .trim()
                .to_string();
            debug!("Extracted phone '{}' leaving address '{}'", phone, address);
            PhoneExtraction {
                phone: Some(phone),
                address,
            }
        }
        None => PhoneExtraction {
            phone: None,
            address: input.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_with_space() {
        let out = extract_phone("+965 98765432 Block 5");
        assert_eq!(out.phone.as_deref(), Some("+965 98765432"));
        assert_eq!(out.address, "Block 5");
    }

    #[test]
    fn test_country_code_variants() {
        assert_eq!(
            extract_phone("96555123456 Salmiya").phone.as_deref(),
            Some("96555123456")
        );
        assert_eq!(
            extract_phone("Salmiya +96566123456").phone.as_deref(),
            Some("+96566123456")
        );
        assert_eq!(extract_phone("Salmiya +96566123456").address, "Salmiya");
    }

    #[test]
    fn test_bare_local_number_in_the_middle() {
        let out = extract_phone("Block 5 41234567 Street 2");
        assert_eq!(out.phone.as_deref(), Some("41234567"));
        assert_eq!(out.address, "Block 5  Street 2");
    }

    #[test]
    fn test_no_phone_returns_trimmed_input() {
        let out = extract_phone("  Block 5 Street 10  ");
        assert_eq!(out.phone, None);
        assert_eq!(out.address, "Block 5 Street 10");
    }

    #[test]
    fn test_invalid_leading_digit_is_not_a_phone() {
        let out = extract_phone("+965 12345678 Block 5");
        assert_eq!(out.phone, None);
        assert_eq!(out.address, "+965 12345678 Block 5");
    }

    #[test]
    fn test_country_code_joins_only_across_a_space() {
        let out = extract_phone("965\n98765432 Block 5");
        assert_eq!(out.phone.as_deref(), Some("98765432"));
        assert_eq!(out.address, "965\n Block 5");

        let out = extract_phone("965\t98765432");
        assert_eq!(out.phone.as_deref(), Some("98765432"));
    }

    #[test]
    fn test_only_first_match_is_extracted() {
        let out = extract_phone("99998888 Block 1 66667777");
        assert_eq!(out.phone.as_deref(), Some("99998888"));
        assert_eq!(out.address, "Block 1 66667777");
    }
}
