// src/correction/address.rs
use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::fmt;

use crate::correction::corrections::CorrectionTable;
use crate::correction::tokenizer::{contains_digit, Tokenizer};

static NON_DIGIT_THEN_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\D)(\d)").unwrap());
static DIGIT_THEN_NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)(\D)").unwrap());
static NON_SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// Corrected tokens in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedAddress {
    tokens: Vec<String>,
}

impl NormalizedAddress {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_string(self) -> String {
        self.tokens.join(" ")
    }
}

impl fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Rule-based address corrector built around an immutable `CorrectionTable`.
///
/// Construct once at startup and share behind an `Arc`; `normalize` takes `&self`
/// and touches no shared mutable state.
#[derive(Debug, Clone)]
pub struct AddressNormalizer {
    table: CorrectionTable,
    /// `(\w)(key1|key2|...)\b`, case-insensitive; `None` for an empty table.
    glued_abbreviation: Option<Regex>,
    /// Whole-chunk keys that contain digits ("r0d") and must survive digit spacing.
    digit_keys: HashSet<String>,
    tokenizer: Tokenizer,
}

impl AddressNormalizer {
    pub fn new(table: CorrectionTable) -> Result<Self> {
        let glued_abbreviation = if table.is_empty() {
            None
        } else {
            let alternation = table
                .keys()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"(?i)(\w)({})\b", alternation);
            Some(
                Regex::new(&pattern)
                    .with_context(|| format!("Failed to compile abbreviation pattern for {} keys", table.len()))?,
            )
        };
        let digit_keys = table
            .keys()
            .filter(|k| contains_digit(k))
            .map(str::to_string)
            .collect();
        let tokenizer = Tokenizer::with_exceptions(table.keys());

        Ok(Self {
            table,
            glued_abbreviation,
            digit_keys,
            tokenizer,
        })
    }

    pub fn table(&self) -> &CorrectionTable {
        &self.table
    }

    /// Runs the full pipeline: digit spacing, abbreviation splitting,
    /// tokenization, per-token correction.
    pub fn normalize(&self, address: &str) -> NormalizedAddress {
        let spaced = self.space_digits(address);
        let split = self.split_glued_abbreviations(&spaced);

        let tokens = self
            .tokenizer
            .tokenize(&split)
            .into_iter()
            .map(|token| self.correct_token(token.text.trim()))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>();

        debug!("Normalized '{}' into {} tokens", address, tokens.len());
        NormalizedAddress { tokens }
    }

    /// Convenience wrapper returning the joined string.
    pub fn correct_address_format(&self, address: &str) -> String {
        self.normalize(address).into_string()
    }

    // "st1" -> "st 1", "1st" -> "1 st". Applied per whitespace-delimited chunk so that
    // digit-bearing table keys standing alone are left intact.
    fn space_digits(&self, text: &str) -> String {
        NON_SPACE_RUN
            .replace_all(text, |caps: &Captures| {
                let chunk = &caps[0];
                if self.digit_keys.contains(&chunk.to_lowercase()) {
                    return chunk.to_string();
                }
                let first = NON_DIGIT_THEN_DIGIT.replace_all(chunk, "${1} ${2}");
                DIGIT_THEN_NON_DIGIT
                    .replace_all(&first, "${1} ${2}")
                    .into_owned()
            })
            .into_owned()
    }

    // "Hawallist" -> "Hawalli st"
    fn split_glued_abbreviations(&self, text: &str) -> String {
        match &self.glued_abbreviation {
            Some(re) => re.replace_all(text, "${1} ${2}").into_owned(),
            None => text.to_string(),
        }
    }

    fn correct_token(&self, word: &str) -> String {
        let word = self.table.lookup(word).unwrap_or(word);
        if contains_digit(word) {
            word.to_string()
        } else {
            capitalize(word)
        }
    }
}

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
