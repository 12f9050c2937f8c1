//! Adam optimizer
//!
//! First-order adaptive optimizer with bias-corrected moment estimates
//! (Kingma & Ba, 2015). Weight decay is intentionally NOT part of this
//! update: the fine-tuning step applies decoupled decay separately, against
//! a pre-step snapshot, so decay never flows through the moment buffers.

use crate::param::ParamSet;
use ndarray::Array1;

/// Adam optimizer with externally scheduled learning rate.
///
/// The rate is passed to every `step` call rather than stored, because the
/// schedule is a function of the step index owned by the caller.
#[derive(Debug, Clone)]
pub struct Adam {
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>, // First moment
    v: Vec<Option<Array1<f32>>>, // Second moment
}

impl Adam {
    /// Create a new Adam optimizer.
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self { beta1, beta2, epsilon, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Adam with the standard defaults (beta1=0.9, beta2=0.999, eps=1e-8).
    pub fn default_params() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }

    /// Number of completed optimization steps.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    /// Perform one update over every trainable parameter that has a gradient.
    ///
    /// Moment buffers are keyed by parameter index, so the parameter set must
    /// keep a stable order across steps.
    pub fn step(&mut self, params: &mut ParamSet, lr: f32) {
        if self.m.len() < params.len() {
            self.m.resize(params.len(), None);
            self.v.resize(params.len(), None);
        }
        self.t += 1;

        // Bias correction folded into the step size
        let lr_t = lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)));

        for (i, param) in params.iter_mut().enumerate() {
            if !param.is_trainable() {
                continue;
            }
            let Some(grad) = param.grad() else { continue };

            // m_t = β1 * m_{t-1} + (1 - β1) * g
            let m_t = if let Some(m) = &self.m[i] {
                m * self.beta1 + grad * (1.0 - self.beta1)
            } else {
                grad * (1.0 - self.beta1)
            };

            // v_t = β2 * v_{t-1} + (1 - β2) * g²
            let grad_sq = grad * grad;
            let v_t = if let Some(v) = &self.v[i] {
                v * self.beta2 + &grad_sq * (1.0 - self.beta2)
            } else {
                grad_sq * (1.0 - self.beta2)
            };

            // θ_t = θ_{t-1} - lr_t * m_t / (√v_t + ε)
            let update = &m_t / &(v_t.mapv(f32::sqrt) + self.epsilon) * lr_t;
            *param.data_mut() = param.data() - &update;

            self.m[i] = Some(m_t);
            self.v[i] = Some(v_t);
        }
    }
}
