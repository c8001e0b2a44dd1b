// src/correction/corrections.rs
use std::collections::HashMap;

/// Abbreviation/misspelling -> canonical word, in the order the entries were added.
///
/// Keys are stored lowercase. Order matters: the pre-splitting pattern in
/// `AddressNormalizer` tries keys as an alternation in this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

// (variant, canonical)
const KUWAIT_ADDRESS_CORRECTIONS: &[(&str, &str)] = &[
    // Street variations
    ("st", "Street"),
    ("str", "Street"),
    ("stre", "Street"),
    ("stre.", "Street"),
    ("ste", "Street"),
    ("stt", "Street"),
    ("strt", "Street"),
    ("stree", "Street"),
    ("stret", "Street"),
    ("street", "Street"),
    // Block variations
    ("blk", "Block"),
    ("blok", "Block"),
    ("bock", "Block"),
    ("blck", "Block"),
    // Building variations
    ("bldg", "Building"),
    ("bld", "Building"),
    ("bldgg", "Building"),
    ("bldng", "Building"),
    ("blding", "Building"),
    ("bldn", "Building"),
    // Government variations
    ("gov", "Government"),
    ("govt", "Government"),
    ("gvt", "Government"),
    ("govenment", "Government"),
    ("governmnt", "Government"),
    ("government", "Government"),
    // Area variations
    ("area", "Area"),
    ("ar", "Area"),
    ("aera", "Area"),
    // Road variations
    ("rd", "Road"),
    ("rdd", "Road"),
    ("r0d", "Road"),
    ("roaad", "Road"),
    ("raod", "Road"),
    ("rood", "Road"),
    // Governorate variations
    ("govr", "Governorate"),
    ("govrt", "Governorate"),
    ("governor", "Governorate"),
    ("governrt", "Governorate"),
    ("governorate", "Governorate"),
];

impl CorrectionTable {
    /// Builds a table from `(variant, canonical)` pairs. Variants are lowercased;
    /// a repeated variant keeps its first position and takes the last canonical value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (variant, canonical) in pairs {
            let key = variant.as_ref().trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            let canonical = canonical.into();
            match index.get(&key) {
                Some(&pos) => entries[pos].1 = canonical,
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push((key, canonical));
                }
            }
        }
        Self { entries, index }
    }

    /// The fixed table used for Kuwait addresses.
    pub fn kuwait() -> Self {
        Self::from_pairs(KUWAIT_ADDRESS_CORRECTIONS.iter().copied())
    }

    /// Case-insensitive whole-token lookup.
    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.index
            .get(&token.to_lowercase())
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CorrectionTable {
    fn default() -> Self {
        Self::kuwait()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = CorrectionTable::kuwait();
        assert_eq!(table.lookup("st"), Some("Street"));
        assert_eq!(table.lookup("ST"), Some("Street"));
        assert_eq!(table.lookup("St"), Some("Street"));
        assert_eq!(table.lookup("Blk"), Some("Block"));
        assert_eq!(table.lookup("hawalli"), None);
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let table = CorrectionTable::kuwait();
        let keys: Vec<&str> = table.keys().take(4).collect();
        assert_eq!(keys, vec!["st", "str", "stre", "stre."]);
        assert_eq!(table.len(), KUWAIT_ADDRESS_CORRECTIONS.len());
    }

    #[test]
    fn test_duplicate_variant_keeps_position() {
        let table = CorrectionTable::from_pairs(vec![("Rd", "Rd"), ("ave", "Avenue"), ("rd", "Road")]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("RD"), Some("Road"));
        assert_eq!(table.keys().next(), Some("rd"));
    }

    #[test]
    fn test_canonical_forms_map_to_themselves() {
        let table = CorrectionTable::kuwait();
        assert_eq!(table.lookup("Street"), Some("Street"));
        assert_eq!(table.lookup("GOVERNORATE"), Some("Governorate"));
    }
}
