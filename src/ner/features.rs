// src/ner/features.rs
//! Sparse string features per token position for the sequence model.

use crate::correction::tokenizer::Token;

/// Collapsed character shape: "Block" -> "Xx", "12" -> "d", "5A" -> "dX".
pub fn word_shape(word: &str) -> String {
    let mut shape = String::new();
    let mut last = None;
    for c in word.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() {
            'x'
        } else if c.is_numeric() {
            'd'
        } else {
            c
        };
        if last != Some(class) {
            shape.push(class);
            last = Some(class);
        }
    }
    shape
}

fn affix(word: &str, n: usize, suffix: bool) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= n {
        return word.to_string();
    }
    if suffix {
        chars[chars.len() - n..].iter().collect()
    } else {
        chars[..n].iter().collect()
    }
}

fn lower_at(tokens: &[Token], idx: isize) -> String {
    if idx < 0 {
        return "<BOS>".to_string();
    }
    match tokens.get(idx as usize) {
        Some(t) => t.text.to_lowercase(),
        None => "<EOS>".to_string(),
    }
}

/// Feature strings for `tokens[i]`. Always includes "bias".
pub fn token_features(tokens: &[Token], i: usize) -> Vec<String> {
    let Some(token) = tokens.get(i) else {
        return vec!["bias".to_string()];
    };
    let word = &token.text;
    let lower = word.to_lowercase();
    let i = i as isize;

    let mut feats = Vec::with_capacity(16);
    feats.push("bias".to_string());
    feats.push(format!("w={}", lower));
    feats.push(format!("shape={}", word_shape(word)));
    feats.push(format!("pre3={}", affix(&lower, 3, false)));
    feats.push(format!("suf3={}", affix(&lower, 3, true)));
    if token.has_digit() {
        feats.push("has_digit".to_string());
    }
    if word.chars().all(|c| !c.is_alphanumeric()) {
        feats.push("is_punct".to_string());
    }
    if word.chars().next().is_some_and(char::is_uppercase) {
        feats.push("is_title".to_string());
    }
    if i == 0 {
        feats.push("BOS".to_string());
    }
    if i as usize + 1 == tokens.len() {
        feats.push("EOS".to_string());
    }

    feats.push(format!("w-1={}", lower_at(tokens, i - 1)));
    feats.push(format!("w-2={}", lower_at(tokens, i - 2)));
    feats.push(format!("w+1={}", lower_at(tokens, i + 1)));
    feats.push(format!("w+2={}", lower_at(tokens, i + 2)));
    feats.push(format!("w-1|w={}|{}", lower_at(tokens, i - 1), lower));
    feats.push(format!("w|w+1={}|{}", lower, lower_at(tokens, i + 1)));

    if let Some(prev) = i.checked_sub(1).filter(|p| *p >= 0).and_then(|p| tokens.get(p as usize)) {
        feats.push(format!("shape-1={}", word_shape(&prev.text)));
    }
    if let Some(next) = tokens.get(i as usize + 1) {
        feats.push(format!("shape+1={}", word_shape(&next.text)));
    }
    feats
}

/// Features for every position of a tokenized sentence.
pub fn sentence_features(tokens: &[Token]) -> Vec<Vec<String>> {
    (0..tokens.len()).map(|i| token_features(tokens, i)).collect()
}
