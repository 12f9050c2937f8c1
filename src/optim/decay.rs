//! Decoupled weight decay with bias/normalization exclusion
//!
//! Decay is applied to parameter values directly, after the optimizer's own
//! update, using the pre-update snapshot as the reference. Folding it into
//! the gradient instead would let the adaptive moments rescale it.

use crate::param::{ParamSet, ParamSnapshot};

/// Suffixes that mark bias parameters, exempt from weight decay.
const BIAS_SUFFIXES: [&str; 3] = ["_bias", "_b", ".b_0"];

/// Whether a parameter is exempt from weight decay.
///
/// Layer-norm scales/offsets and biases are excluded: decaying them toward
/// zero hurts rather than regularizes.
#[must_use]
pub fn exclude_from_weight_decay(name: &str) -> bool {
    if name.contains("layer_norm") {
        return true;
    }
    BIAS_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Subtract `snapshot * weight_decay * scheduled_lr` from every non-excluded
/// trainable parameter that took part in the gradient update.
///
/// Must run after the optimizer step: the subtraction reads the pre-update
/// snapshot, not the post-update value, so decay does not compound through
/// the optimizer's own update. A no-op when `weight_decay <= 0`.
pub fn apply_weight_decay(
    params: &mut ParamSet,
    snapshot: &ParamSnapshot,
    weight_decay: f32,
    scheduled_lr: f32,
) {
    if weight_decay <= 0.0 {
        return;
    }

    for param in params.iter_mut() {
        if !param.is_trainable() || param.grad().is_none() {
            continue;
        }
        if exclude_from_weight_decay(param.name()) {
            continue;
        }
        if let Some(reference) = snapshot.get(param.name()) {
            let decayed = param.data() - &(reference * (weight_decay * scheduled_lr));
            *param.data_mut() = decayed;
        }
    }
}
