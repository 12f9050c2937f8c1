//! Fine-tuning configuration
//!
//! Step arithmetic matches BERT-style fine-tuning: the total step count is
//! derived from epochs, dataset size, batch size, and device count, and the
//! warmup span is a fixed proportion of that total.

use serde::{Deserialize, Serialize};

/// Configuration for a fine-tuning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinetuneConfig {
    /// Number of passes over the training set
    pub num_epoch: usize,
    /// Examples per optimization step (per device)
    pub batch_size: usize,
    /// Fraction of total steps spent ramping the learning rate up from zero
    pub warmup_proportion: f32,
    /// Target (peak) learning rate
    pub learning_rate: f32,
    /// Decoupled weight-decay coefficient; `<= 0` disables decay entirely
    pub weight_decay: f32,
    /// Learning-rate scheduler kind: `"noam_decay"` or `"linear_warmup_decay"`
    pub scheduler: String,
}

impl Default for FinetuneConfig {
    fn default() -> Self {
        Self {
            num_epoch: 3,
            batch_size: 32,
            warmup_proportion: 0.1,
            learning_rate: 5e-5,
            weight_decay: 0.01,
            scheduler: "linear_warmup_decay".to_string(),
        }
    }
}

impl FinetuneConfig {
    /// Total optimization steps for a data-parallel run.
    ///
    /// `num_epoch * num_examples / batch_size / dev_count`, integer division.
    /// Accounting for `dev_count` keeps the warmup and decay curves correct
    /// when each device consumes its own batches.
    #[must_use]
    pub fn max_train_steps(&self, num_examples: usize, dev_count: usize) -> usize {
        self.num_epoch * num_examples / self.batch_size / dev_count
    }

    /// Steps spent in warmup: `floor(max_train_steps * warmup_proportion)`.
    #[must_use]
    pub fn warmup_steps(&self, num_examples: usize, dev_count: usize) -> usize {
        let max_steps = self.max_train_steps(num_examples, dev_count);
        (max_steps as f32 * self.warmup_proportion) as usize
    }
}
