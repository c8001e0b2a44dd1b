// src/utils/config.rs
use log::debug;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_PATH: &str = "labeled_address_data.json";
pub const DEFAULT_TRAIN_DOCS: &str = "train.docbin";
pub const DEFAULT_TEST_DOCS: &str = "test.docbin";
pub const DEFAULT_MODEL_DIR: &str = "address_ner_model";
pub const DEFAULT_EPOCHS: usize = 10;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Settings for the offline training job.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub data_path: PathBuf,
    pub train_docs_path: PathBuf,
    pub test_docs_path: PathBuf,
    pub model_dir: PathBuf,
    pub epochs: usize,
    pub seed: u64,
    pub test_size: f64,
    pub show_progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            train_docs_path: PathBuf::from(DEFAULT_TRAIN_DOCS),
            test_docs_path: PathBuf::from(DEFAULT_TEST_DOCS),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            epochs: DEFAULT_EPOCHS,
            seed: DEFAULT_SEED,
            test_size: DEFAULT_TEST_SIZE,
            show_progress: true,
        }
    }
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Accepts true/false, 1/0, yes/no and on/off in any case.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn flag_var(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn path_var(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

impl TrainingConfig {
    /// Reads `ADDRESS_NER_*` variables. Unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        let test_size: f64 = parsed_var("ADDRESS_NER_TEST_SIZE", DEFAULT_TEST_SIZE);
        let config = Self {
            data_path: path_var("ADDRESS_NER_DATA", DEFAULT_DATA_PATH),
            train_docs_path: path_var("ADDRESS_NER_TRAIN_DOCS", DEFAULT_TRAIN_DOCS),
            test_docs_path: path_var("ADDRESS_NER_TEST_DOCS", DEFAULT_TEST_DOCS),
            model_dir: path_var("ADDRESS_NER_MODEL_DIR", DEFAULT_MODEL_DIR),
            epochs: parsed_var("ADDRESS_NER_EPOCHS", DEFAULT_EPOCHS),
            seed: parsed_var("ADDRESS_NER_SEED", DEFAULT_SEED),
            test_size: if (0.0..1.0).contains(&test_size) {
                test_size
            } else {
                DEFAULT_TEST_SIZE
            },
            show_progress: flag_var("ADDRESS_NER_PROGRESS", true),
        };
        debug!("Training config: {:?}", config);
        config
    }
}
