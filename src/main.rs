// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use address_lib::api::{
    correct_address, correct_contact, tag_text, ContactRequest, CorrectAddressRequest, TagRequest,
};
use address_lib::correction::address::AddressNormalizer;
use address_lib::correction::corrections::CorrectionTable;
use address_lib::ner::model::ModelHandle;
use address_lib::utils::config::DEFAULT_MODEL_DIR;
use address_lib::utils::env::load_env;

/// Kuwait address correction and address entity tagging.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize an address (endpoint A)
    Correct { address: String },
    /// Extract a phone number and normalize the remaining address (endpoint B)
    Contact { input_text: String },
    /// Tag address fields with a trained model and format them
    Tag {
        text: String,
        /// Model bundle directory; defaults to ADDRESS_NER_MODEL_DIR or address_ner_model
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize response")?
    );
    Ok(())
}

fn main() -> Result<()> {
    load_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Correct { address } => {
            let normalizer = AddressNormalizer::new(CorrectionTable::kuwait())?;
            print_json(&correct_address(&normalizer, &CorrectAddressRequest { address }))
        }
        Command::Contact { input_text } => {
            let normalizer = AddressNormalizer::new(CorrectionTable::kuwait())?;
            print_json(&correct_contact(&normalizer, &ContactRequest { input_text }))
        }
        Command::Tag { text, model_dir } => {
            let model_dir = model_dir
                .or_else(|| std::env::var("ADDRESS_NER_MODEL_DIR").ok().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));
            info!("Loading model from {}", model_dir.display());
            let handle = ModelHandle::load(&model_dir)
                .with_context(|| format!("Failed to load model from {}", model_dir.display()))?;
            print_json(&tag_text(&handle, &TagRequest { text }))
        }
    }
}
