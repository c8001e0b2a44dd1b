// src/bin/train_address_ner.rs
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::PathBuf;
use uuid::Uuid;

use address_lib::correction::tokenizer::Tokenizer;
use address_lib::ner::dataset::{build_documents, load_labeled_records, train_test_split};
use address_lib::ner::docbin::DocBin;
use address_lib::ner::evaluation::evaluate;
use address_lib::ner::model::TrainedModel;
use address_lib::ner::tagger::tag_address;
use address_lib::ner::trainer::{train, TrainingOptions};
use address_lib::utils::config::TrainingConfig;
use address_lib::utils::env::load_env;
use address_lib::utils::logging::TrainingLogger;

const SAMPLE_ADDRESS: &str = "Block 5, Hawalli, Street X, Building 10";

/// Train the address entity model from labeled JSON records.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct TrainArgs {
    /// Labeled records (JSON array of {text, annotations})
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output path for the training document bin
    #[arg(long)]
    train_docs: Option<PathBuf>,

    /// Output path for the held-out document bin
    #[arg(long)]
    test_docs: Option<PathBuf>,

    /// Output directory for the model bundle
    #[arg(long)]
    model_dir: Option<PathBuf>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of records held out for evaluation
    #[arg(long)]
    test_size: Option<f64>,

    /// Disable the epoch progress bar
    #[arg(long)]
    no_progress: bool,
}

impl TrainArgs {
    fn apply(self, mut config: TrainingConfig) -> TrainingConfig {
        if let Some(data) = self.data {
            config.data_path = data;
        }
        if let Some(path) = self.train_docs {
            config.train_docs_path = path;
        }
        if let Some(path) = self.test_docs {
            config.test_docs_path = path;
        }
        if let Some(dir) = self.model_dir {
            config.model_dir = dir;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(test_size) = self.test_size.filter(|t| (0.0..1.0).contains(t)) {
            config.test_size = test_size;
        }
        if self.no_progress {
            config.show_progress = false;
        }
        config
    }
}

fn epoch_bar(config: &TrainingConfig) -> Result<ProgressBar> {
    if !config.show_progress {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(config.epochs as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn main() -> Result<()> {
    load_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TrainArgs::parse().apply(TrainingConfig::from_env());
    let logger = TrainingLogger::new("ADDRESS_NER");
    let run_id = Uuid::new_v4().to_string();
    logger.log_start(&run_id, config.epochs, config.seed);

    logger.log_phase("Loading labeled data", Some(&config.data_path.display().to_string()));
    let records = load_labeled_records(&config.data_path)?;
    let tokenizer = Tokenizer::new();
    let documents = build_documents(&records, &tokenizer);

    let (train_docs, test_docs) = train_test_split(documents, config.test_size, config.seed);
    info!(
        "📊 Split {} documents into {} train / {} test",
        records.len(),
        train_docs.len(),
        test_docs.len()
    );

    logger.log_phase("Writing document bins", None);
    let train_bin = DocBin::new(train_docs);
    let test_bin = DocBin::new(test_docs);
    train_bin.save(&config.train_docs_path)?;
    test_bin.save(&config.test_docs_path)?;

    logger.log_phase("Training", None);
    let pb = epoch_bar(&config)?;
    let options = TrainingOptions {
        epochs: config.epochs,
        seed: config.seed,
    };
    let (model, losses) = train(&train_bin.documents, options, |loss| {
        logger.log_epoch(loss);
        pb.set_message(format!("loss {}", loss.loss));
        pb.inc(1);
    })?;
    pb.finish_with_message("done");

    if test_bin.is_empty() {
        warn!("⚠️  No held-out documents; skipping evaluation");
    } else {
        logger.log_phase("Evaluating", None);
        logger.log_evaluation(&evaluate(&model, &test_bin.documents));
    }

    let trained = TrainedModel::new(model, losses, train_bin.len(), test_bin.len())?;
    trained.save(&config.model_dir)?;

    let outcome = tag_address(&trained, SAMPLE_ADDRESS);
    info!("🧪 Sample '{}' -> {}", SAMPLE_ADDRESS, outcome);

    let meta = serde_json::to_string_pretty(trained.meta()).context("Failed to render model summary")?;
    println!("{}", meta);

    logger.log_complete(&config.model_dir.display().to_string());
    Ok(())
}
