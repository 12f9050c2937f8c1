//! Fine-tuning optimizer configuration
//!
//! The single configuration pass for a fine-tuning run: derive the step
//! counts from the config, build the learning-rate schedule, and attach an
//! Adam optimizer with global gradient clipping and decoupled weight decay.
//! Construction is atomic: an unrecognized scheduler kind fails before any
//! optimizer state exists.
//!
//! # Example
//!
//! ```
//! use afinar::{attach_adam_with_decay, FinetuneConfig, Param, ParamSet};
//! use ndarray::arr1;
//!
//! let config = FinetuneConfig::default();
//! let mut step = attach_adam_with_decay(&config, 1000, 1).unwrap();
//!
//! let mut params = ParamSet::new();
//! params.push(Param::new("fc.w_0", arr1(&[0.5, -0.5])));
//!
//! // Per training step: the framework writes gradients, then:
//! params.iter_mut().next().unwrap().set_grad(arr1(&[0.1, -0.1]));
//! let lr_used = step.step(&mut params, 1);
//! assert!(lr_used >= 0.0);
//! ```

use crate::config::FinetuneConfig;
use crate::error::Result;
use crate::optim::{apply_weight_decay, clip_grad_norm, Adam};
use crate::param::ParamSet;
use crate::schedule::{ScheduleKind, ScheduledLr};

/// Fixed global-norm clipping threshold applied before every update.
pub const CLIP_NORM_THRESHOLD: f32 = 1.0;

/// The per-step update rule produced by [`attach_adam_with_decay`].
///
/// Owns the schedule, the Adam state, and the decay coefficient. Each call
/// to [`FinetuneStep::step`] runs clip, then the Adam update, then decoupled
/// weight decay against the pre-update snapshot, in that order.
#[derive(Debug, Clone)]
pub struct FinetuneStep {
    scheduled_lr: ScheduledLr,
    optimizer: Adam,
    weight_decay: f32,
}

impl FinetuneStep {
    /// The learning-rate schedule, for logging and inspection.
    #[must_use]
    pub fn scheduled_lr(&self) -> &ScheduledLr {
        &self.scheduled_lr
    }

    /// The decoupled weight-decay coefficient.
    #[must_use]
    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }

    /// Apply one optimization step at `step_index`.
    ///
    /// Expects gradients already written into `params` by the caller's
    /// backward pass. Returns the learning rate used, for logging. The
    /// snapshot is taken before the Adam update so decay subtracts from the
    /// pre-update values.
    pub fn step(&mut self, params: &mut ParamSet, step_index: usize) -> f32 {
        let lr = self.scheduled_lr.lr_at(step_index);
        let snapshot = params.snapshot();

        clip_grad_norm(params, CLIP_NORM_THRESHOLD);
        self.optimizer.step(params, lr);
        apply_weight_decay(params, &snapshot, self.weight_decay, lr);

        lr
    }
}

/// Configure the fine-tuning optimizer for a run.
///
/// Computes `max_train_steps` and `warmup_steps` from the config, dataset
/// size, and device count, validates the scheduler kind, and builds the
/// schedule and optimizer. With zero warmup steps the constant target rate is
/// used and no schedule curve is constructed.
///
/// # Errors
///
/// [`crate::OptimError::InvalidScheduler`] when `config.scheduler` is neither
/// `"noam_decay"` nor `"linear_warmup_decay"`. Nothing is constructed in
/// that case.
pub fn attach_adam_with_decay(
    config: &FinetuneConfig,
    num_examples: usize,
    dev_count: usize,
) -> Result<FinetuneStep> {
    let max_train_steps = config.max_train_steps(num_examples, dev_count);
    let warmup_steps = config.warmup_steps(num_examples, dev_count);

    // Validate the kind before building any optimizer state.
    let kind: ScheduleKind = config.scheduler.parse()?;
    let scheduled_lr =
        ScheduledLr::build(config.learning_rate, warmup_steps, max_train_steps, kind);

    Ok(FinetuneStep {
        scheduled_lr,
        optimizer: Adam::default_params(),
        weight_decay: config.weight_decay,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptimError;
    use crate::param::Param;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    fn config_with(scheduler: &str) -> FinetuneConfig {
        FinetuneConfig { scheduler: scheduler.to_string(), ..FinetuneConfig::default() }
    }

    #[test]
    fn test_attach_builds_linear_schedule() {
        let step = attach_adam_with_decay(&config_with("linear_warmup_decay"), 1000, 1).unwrap();
        // 93 total steps, 9 warmup
        assert_eq!(
            *step.scheduled_lr(),
            ScheduledLr::LinearWarmupDecay { target_lr: 5e-5, warmup_steps: 9, total_steps: 93 }
        );
    }

    #[test]
    fn test_attach_builds_noam_schedule() {
        let step = attach_adam_with_decay(&config_with("noam_decay"), 1000, 1).unwrap();
        assert!(matches!(step.scheduled_lr(), ScheduledLr::NoamDecay { warmup_steps: 9, .. }));
    }

    #[test]
    fn test_attach_rejects_bogus_scheduler() {
        let err = attach_adam_with_decay(&config_with("bogus"), 1000, 1).unwrap_err();
        assert_eq!(err, OptimError::InvalidScheduler { got: "bogus".to_string() });
    }

    #[test]
    fn test_attach_constant_rate_without_warmup() {
        let config =
            FinetuneConfig { warmup_proportion: 0.0, ..config_with("linear_warmup_decay") };
        let step = attach_adam_with_decay(&config, 1000, 1).unwrap();
        assert_eq!(*step.scheduled_lr(), ScheduledLr::Constant { lr: 5e-5 });
    }

    #[test]
    fn test_step_returns_scheduled_rate() {
        let mut step = attach_adam_with_decay(&config_with("linear_warmup_decay"), 1000, 1).unwrap();
        let expected = step.scheduled_lr().lr_at(3);

        let mut params = ParamSet::new();
        let mut p = Param::new("fc.w_0", arr1(&[1.0]));
        p.set_grad(arr1(&[0.5]));
        params.push(p);

        let used = step.step(&mut params, 3);
        assert_abs_diff_eq!(used, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_step_order_decay_reads_pre_update_snapshot() {
        // With a large decay coefficient the subtraction is visible and must
        // be exactly snapshot * wd * lr, independent of the Adam update.
        let config = FinetuneConfig {
            weight_decay: 0.5,
            warmup_proportion: 0.0, // constant lr = 5e-5
            ..config_with("linear_warmup_decay")
        };
        let mut with_decay = attach_adam_with_decay(&config, 1000, 1).unwrap();

        let no_decay_config = FinetuneConfig { weight_decay: 0.0, ..config.clone() };
        let mut without_decay = attach_adam_with_decay(&no_decay_config, 1000, 1).unwrap();

        let make_params = || {
            let mut params = ParamSet::new();
            let mut p = Param::new("fc.w_0", arr1(&[2.0]));
            p.set_grad(arr1(&[0.5]));
            params.push(p);
            params
        };

        let mut decayed = make_params();
        let mut raw = make_params();
        let lr = with_decay.step(&mut decayed, 1);
        without_decay.step(&mut raw, 1);

        let expected = raw.get("fc.w_0").unwrap().data()[0] - 2.0 * 0.5 * lr;
        assert_abs_diff_eq!(decayed.get("fc.w_0").unwrap().data()[0], expected, epsilon = 1e-7);
    }
}
