// src/utils/env.rs
use log::{info, warn};
use std::path::Path;

const ENV_PATHS: [&str; 3] = [".env", ".env.local", "../.env"];

/// Loads the first `.env` file found. Variables already set in the process win.
pub fn load_env() {
    for path in ENV_PATHS.iter().map(Path::new) {
        if !path.exists() {
            continue;
        }
        match dotenv::from_path(path) {
            Ok(()) => {
                info!("Loaded environment variables from {}", path.display());
                return;
            }
            Err(e) => warn!("Failed to load environment from {}: {}", path.display(), e),
        }
    }
    info!("No .env file found, using environment variables from system");
}
