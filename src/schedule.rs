//! Learning rate schedules for fine-tuning
//!
//! Two warmup-based schedules plus a constant fallback:
//! - `LinearWarmupDecay` - linear ramp to the target rate, then linear decay to zero
//! - `NoamDecay` - inverse-square-root decay scaled so the peak lands at the
//!   target rate when warmup ends (the transformer recipe)
//! - `Constant` - used whenever no warmup is configured; no schedule at all
//!
//! A schedule is a pure function of the step index. Stepping happens in the
//! caller's training loop; nothing here carries a counter.

use crate::error::OptimError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recognized scheduler kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    NoamDecay,
    LinearWarmupDecay,
}

impl FromStr for ScheduleKind {
    type Err = OptimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "noam_decay" => Ok(Self::NoamDecay),
            "linear_warmup_decay" => Ok(Self::LinearWarmupDecay),
            other => Err(OptimError::InvalidScheduler { got: other.to_string() }),
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoamDecay => write!(f, "noam_decay"),
            Self::LinearWarmupDecay => write!(f, "linear_warmup_decay"),
        }
    }
}

/// A learning rate as a function of the training step index.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledLr {
    /// Fixed rate, returned unconditionally.
    Constant { lr: f32 },
    /// Linear ramp from 0 to `target_lr` over `warmup_steps`, then linear
    /// decay to 0 at `total_steps`.
    LinearWarmupDecay { target_lr: f32, warmup_steps: usize, total_steps: usize },
    /// `d_model^-0.5 * min(step^-0.5, step * warmup_steps^-1.5)` with
    /// `d_model = 1 / (warmup_steps * target_lr^2)`, which places the peak
    /// exactly at `target_lr` when `step == warmup_steps`.
    NoamDecay { warmup_steps: usize, d_model: f32 },
}

impl ScheduledLr {
    /// Build the schedule for a fine-tuning run.
    ///
    /// When `warmup_steps` is zero, scheduling is bypassed entirely and the
    /// constant target rate is returned.
    #[must_use]
    pub fn build(
        target_lr: f32,
        warmup_steps: usize,
        total_steps: usize,
        kind: ScheduleKind,
    ) -> Self {
        if warmup_steps == 0 {
            return Self::Constant { lr: target_lr };
        }
        match kind {
            ScheduleKind::NoamDecay => {
                let d_model = 1.0 / (warmup_steps as f32 * target_lr * target_lr);
                Self::NoamDecay { warmup_steps, d_model }
            }
            ScheduleKind::LinearWarmupDecay => {
                Self::LinearWarmupDecay { target_lr, warmup_steps, total_steps }
            }
        }
    }

    /// The learning rate at a given step index.
    #[must_use]
    pub fn lr_at(&self, step: usize) -> f32 {
        match *self {
            Self::Constant { lr } => lr,
            Self::LinearWarmupDecay { target_lr, warmup_steps, total_steps } => {
                if step < warmup_steps {
                    return target_lr * step as f32 / warmup_steps as f32;
                }
                let decay_span = total_steps.saturating_sub(warmup_steps);
                if decay_span == 0 || step >= total_steps {
                    return 0.0;
                }
                let remaining = (total_steps - step) as f32;
                target_lr * remaining / decay_span as f32
            }
            Self::NoamDecay { warmup_steps, d_model } => {
                // The inverse-sqrt curve is singular at step 0; the first
                // evaluated step is 1, matching the reference schedule.
                let step = step.max(1) as f32;
                let warmup = warmup_steps as f32;
                d_model.powf(-0.5) * step.powf(-0.5).min(step * warmup.powf(-1.5))
            }
        }
    }

    /// The peak (target) learning rate this schedule ramps toward.
    #[must_use]
    pub fn target_lr(&self) -> f32 {
        match *self {
            Self::Constant { lr } => lr,
            Self::LinearWarmupDecay { target_lr, .. } => target_lr,
            Self::NoamDecay { warmup_steps, d_model } => {
                // Invert d_model = 1 / (warmup * lr^2).
                (1.0 / (d_model * warmup_steps as f32)).sqrt()
            }
        }
    }
}
