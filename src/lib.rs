//! Fine-tuning optimization for pretrained transformer models
//!
//! Configures the gradient-descent side of a fine-tuning run:
//!
//! - **Learning-rate schedules**: linear warmup + linear decay, or noam
//!   (inverse-square-root) decay, with a constant-rate bypass when no warmup
//!   is configured ([`schedule`])
//! - **Adam optimizer** with bias-corrected moments, driven by the schedule
//!   ([`optim::Adam`])
//! - **Global-norm gradient clipping** at a fixed threshold of 1.0
//!   ([`optim::clip_grad_norm`])
//! - **Decoupled weight decay** that excludes bias and layer-norm parameters
//!   and decays against a pre-update snapshot ([`optim::apply_weight_decay`])
//!
//! The external training framework owns forward/backward passes and writes
//! gradients into a [`ParamSet`]; this crate owns the per-step update rule.
//!
//! # Quick Start
//!
//! ```
//! use afinar::{attach_adam_with_decay, FinetuneConfig, Param, ParamSet};
//! use ndarray::arr1;
//!
//! let config = FinetuneConfig {
//!     num_epoch: 3,
//!     batch_size: 32,
//!     warmup_proportion: 0.1,
//!     ..FinetuneConfig::default()
//! };
//!
//! // One configuration pass per run: schedule + optimizer + decay rule.
//! let mut finetune = attach_adam_with_decay(&config, 1000, 1).unwrap();
//!
//! let mut params = ParamSet::new();
//! params.push(Param::new("encoder.w_0", arr1(&[0.1, -0.2, 0.3])));
//!
//! // Inside the training loop, after backward:
//! for p in params.iter_mut() {
//!     p.set_grad(arr1(&[0.01, 0.02, -0.01]));
//! }
//! let lr = finetune.step(&mut params, 1);
//! println!("step used lr = {lr}");
//! ```

pub mod config;
pub mod error;
pub mod finetune;
pub mod optim;
pub mod param;
pub mod schedule;

pub use config::FinetuneConfig;
pub use error::{OptimError, Result};
pub use finetune::{attach_adam_with_decay, FinetuneStep, CLIP_NORM_THRESHOLD};
pub use optim::{apply_weight_decay, clip_grad_norm, exclude_from_weight_decay, Adam};
pub use param::{Param, ParamSet, ParamSnapshot};
pub use schedule::{ScheduleKind, ScheduledLr};
