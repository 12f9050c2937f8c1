//! Optimization primitives for the fine-tuning step

mod adam;
mod clip;
mod decay;

pub use adam::Adam;
pub use clip::clip_grad_norm;
pub use decay::{apply_weight_decay, exclude_from_weight_decay};
