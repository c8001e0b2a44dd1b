// src/correction/tokenizer.rs
//! Word/number/punctuation tokenizer shared by the normalizer and the entity model.
//!
//! Rules:
//! - whitespace separates tokens and never becomes a token itself
//! - every punctuation character is its own token (hyphens and slashes included)
//! - English clitics are split off: "Ali's" -> ["Ali", "'s"], "don't" -> ["do", "n't"]
//! - a period stays attached when the word plus period is a registered exception
//!   ("stre." with the default correction table) or when it sits between digits
//!
//! Offsets are byte offsets into the input, so `&text[t.start..t.end] == t.text`
//! holds for every emitted token.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const CLITICS: &[&str] = &["s", "re", "ll", "ve", "d", "m"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Word,
    Number,
    Punctuation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    fn new(text: &str, start: usize) -> Self {
        Self {
            text: text.to_string(),
            kind: classify(text),
            start,
            end: start + text.len(),
        }
    }

    pub fn has_digit(&self) -> bool {
        contains_digit(&self.text)
    }
}

/// Digit test shared by tokenization and correction. Unicode-aware, like the `\d`
/// class used for digit spacing.
pub fn contains_digit(text: &str) -> bool {
    text.chars().any(char::is_numeric)
}

fn classify(text: &str) -> TokenKind {
    if !text.is_empty() && text.chars().all(|c| c.is_numeric() || c == '.') && text.chars().any(char::is_numeric) {
        TokenKind::Number
    } else if text.chars().any(char::is_alphanumeric) {
        TokenKind::Word
    } else {
        TokenKind::Punctuation
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    /// Lowercase tokens ending in '.' that must not lose their period.
    exceptions: HashSet<String>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers period-terminated exceptions; entries without a trailing '.' are ignored.
    pub fn with_exceptions<I, S>(exceptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exceptions = exceptions
            .into_iter()
            .map(|e| e.as_ref().to_lowercase())
            .filter(|e| e.len() > 1 && e.ends_with('.'))
            .collect();
        Self { exceptions }
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut tokens = Vec::new();
        // Byte range of the word being accumulated.
        let mut word_start: Option<usize> = None;
        let mut i = 0;

        while i < chars.len() {
            let (pos, ch) = chars[i];

            if ch.is_alphanumeric() {
                if word_start.is_none() {
                    word_start = Some(pos);
                }
                i += 1;
                continue;
            }

            if ch.is_whitespace() {
                flush(&mut tokens, text, &mut word_start, pos);
                i += 1;
                continue;
            }

            // A clitic already split off by an earlier pass ("Ali 's") stays one token.
            if (ch == '\'' || ch == '\u{2019}') && word_start.is_none() {
                let suffix_begin = i + 1;
                let mut suffix_end = suffix_begin;
                while suffix_end < chars.len() && chars[suffix_end].1.is_alphanumeric() {
                    suffix_end += 1;
                }
                let suffix_begin_byte = byte_at(&chars, suffix_begin, text.len());
                let suffix_end_byte = byte_at(&chars, suffix_end, text.len());
                let suffix = text[suffix_begin_byte..suffix_end_byte].to_lowercase();
                if CLITICS.contains(&suffix.as_str()) {
                    tokens.push(Token::new(&text[pos..suffix_end_byte], pos));
                    i = suffix_end;
                    continue;
                }
            }

            if (ch == '\'' || ch == '\u{2019}') && word_start.is_some() {
                let suffix_begin = i + 1;
                let mut suffix_end = suffix_begin;
                while suffix_end < chars.len() && chars[suffix_end].1.is_alphanumeric() {
                    suffix_end += 1;
                }
                if suffix_end > suffix_begin {
                    let suffix_end_byte = byte_at(&chars, suffix_end, text.len());
                    let suffix_begin_byte = byte_at(&chars, suffix_begin, text.len());
                    let suffix = text[suffix_begin_byte..suffix_end_byte].to_lowercase();
                    let start = word_start.unwrap_or(pos);
                    let stem = &text[start..pos];

                    if suffix == "t" && stem.len() > 1 && stem.ends_with(|c: char| c == 'n' || c == 'N') {
                        let split = pos - 1;
                        tokens.push(Token::new(&text[start..split], start));
                        tokens.push(Token::new(&text[split..suffix_end_byte], split));
                        word_start = None;
                    } else if CLITICS.contains(&suffix.as_str()) {
                        tokens.push(Token::new(stem, start));
                        tokens.push(Token::new(&text[pos..suffix_end_byte], pos));
                        word_start = None;
                    } else {
                        // O'Brien style names stay whole; keep accumulating.
                        i = suffix_end;
                        continue;
                    }
                    i = suffix_end;
                    continue;
                }
            }

            if ch == '.' {
                if let Some(start) = word_start {
                    let word = &text[start..pos];
                    let next_is_digit = chars.get(i + 1).map_or(false, |(_, c)| c.is_ascii_digit());
                    let candidate = format!("{}.", word.to_lowercase());
                    if word.chars().all(|c| c.is_ascii_digit()) && next_is_digit {
                        i += 1;
                        continue;
                    }
                    if self.exceptions.contains(&candidate) {
                        tokens.push(Token::new(&text[start..pos + 1], start));
                        word_start = None;
                        i += 1;
                        continue;
                    }
                }
            }

            flush(&mut tokens, text, &mut word_start, pos);
            tokens.push(Token::new(&text[pos..pos + ch.len_utf8()], pos));
            i += 1;
        }

        flush(&mut tokens, text, &mut word_start, text.len());
        tokens
    }
}

fn byte_at(chars: &[(usize, char)], idx: usize, text_len: usize) -> usize {
    chars.get(idx).map_or(text_len, |(b, _)| *b)
}

fn flush(tokens: &mut Vec<Token>, text: &str, word_start: &mut Option<usize>, end: usize) {
    if let Some(start) = word_start.take() {
        if end > start {
            tokens.push(Token::new(&text[start..end], start));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_words_numbers_and_punctuation() {
        let tokens = Tokenizer::new().tokenize("Block 5, Hawalli, Street X, Building 10");
        assert_eq!(
            texts(&tokens),
            vec!["Block", "5", ",", "Hawalli", ",", "Street", "X", ",", "Building", "10"]
        );
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[2].kind, TokenKind::Punctuation);
        assert_eq!(tokens[0].kind, TokenKind::Word);
    }

    #[test]
    fn test_offsets_slice_back_to_text() {
        let text = "  Salmiya   Blk 12 - Jaber  Al-Ahmad St. ";
        for token in Tokenizer::new().tokenize(text) {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_whitespace_never_becomes_a_token() {
        let tokens = Tokenizer::new().tokenize("Block  5 \t Street");
        assert_eq!(texts(&tokens), vec!["Block", "5", "Street"]);
    }

    #[test]
    fn test_clitics_are_split() {
        let tokens = Tokenizer::new().tokenize("Ali's house don't O'Brien");
        assert_eq!(texts(&tokens), vec!["Ali", "'s", "house", "do", "n't", "O'Brien"]);
    }

    #[test]
    fn test_split_clitic_stays_whole() {
        let tokens = Tokenizer::new().tokenize("Ali 's house 'll");
        assert_eq!(texts(&tokens), vec!["Ali", "'s", "house", "'ll"]);
        assert_eq!(texts(&Tokenizer::new().tokenize("' x")), vec!["'", "x"]);
    }

    #[test]
    fn test_period_exceptions() {
        let plain = Tokenizer::new().tokenize("stre. 4");
        assert_eq!(texts(&plain), vec!["stre", ".", "4"]);

        let with_exception = Tokenizer::with_exceptions(["stre.", "st"]).tokenize("Stre. 4");
        assert_eq!(texts(&with_exception), vec!["Stre.", "4"]);
    }

    #[test]
    fn test_decimal_numbers_stay_whole() {
        let tokens = Tokenizer::new().tokenize("Plot 1.5.");
        assert_eq!(texts(&tokens), vec!["Plot", "1.5", "."]);
    }

    #[test]
    fn test_hyphen_is_split() {
        let tokens = Tokenizer::new().tokenize("Al-Salam");
        assert_eq!(texts(&tokens), vec!["Al", "-", "Salam"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(Tokenizer::new().tokenize("").is_empty());
    }
}
