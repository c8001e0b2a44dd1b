// src/utils/logging.rs
use log::info;
use std::time::Instant;

use crate::ner::evaluation::EvaluationReport;
use crate::ner::trainer::EpochLoss;

/// Consistent, timestamped log lines for the training job.
pub struct TrainingLogger {
    job_name: &'static str,
    start_time: Instant,
}

impl TrainingLogger {
    pub fn new(job_name: &'static str) -> Self {
        Self {
            job_name,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, run_id: &str, epochs: usize, seed: u64) {
        info!(
            "[{}] 🚀 Starting training run {} ({} epochs, seed {})",
            self.job_name, run_id, epochs, seed
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        match details {
            Some(details) => info!(
                "[{}] 🔄 Phase: {} - {} [+{:.1}s]",
                self.job_name, phase, details, elapsed
            ),
            None => info!("[{}] 🔄 Phase: {} [+{:.1}s]", self.job_name, phase, elapsed),
        }
    }

    pub fn log_epoch(&self, loss: &EpochLoss) {
        info!(
            "[{}] 📉 Epoch {}: loss={} over {} documents",
            self.job_name, loss.epoch, loss.loss, loss.documents
        );
    }

    pub fn log_evaluation(&self, report: &EvaluationReport) {
        for (label, counts) in &report.per_label {
            info!(
                "[{}] 🎯 {:<8} P={:.3} R={:.3} F1={:.3}",
                self.job_name,
                label,
                counts.precision(),
                counts.recall(),
                counts.f1()
            );
        }
        let overall = report.overall();
        info!(
            "[{}] 🎯 overall  P={:.3} R={:.3} F1={:.3} on {} held-out documents",
            self.job_name,
            overall.precision(),
            overall.recall(),
            overall.f1(),
            report.documents
        );
    }

    pub fn log_complete(&self, model_dir: &str) {
        info!(
            "[{}] ✅ Training completed in {:.2?}; model saved to {}",
            self.job_name,
            self.start_time.elapsed(),
            model_dir
        );
    }
}
