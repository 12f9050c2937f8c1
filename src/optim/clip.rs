//! Gradient clipping utilities

use crate::param::ParamSet;

/// Clip gradients by global norm
///
/// Computes the global norm over every trainable parameter's gradient and
/// scales all gradients down jointly if the norm exceeds `max_norm`. This is
/// a process-wide policy: relative magnitudes across parameters are
/// preserved.
///
/// Algorithm:
/// 1. global_norm = sqrt(sum of all gradient squared norms)
/// 2. If global_norm > max_norm:
///    - clip_coef = max_norm / global_norm
///    - For each gradient: grad *= clip_coef
///
/// Returns the global norm before clipping.
pub fn clip_grad_norm(params: &mut ParamSet, max_norm: f32) -> f32 {
    let mut total_norm_sq = 0.0;

    for param in params.iter() {
        if !param.is_trainable() {
            continue;
        }
        if let Some(grad) = param.grad() {
            let grad_norm_sq: f32 = grad.iter().map(|&g| g * g).sum();
            total_norm_sq += grad_norm_sq;
        }
    }

    let global_norm = total_norm_sq.sqrt();

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;

        for param in params.iter_mut() {
            if !param.is_trainable() {
                continue;
            }
            if let Some(grad) = param.grad() {
                let clipped = grad * clip_coef;
                param.set_grad(clipped);
            }
        }
    }

    global_norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Param;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, Array1};

    fn params_with_grads(grads: &[&[f32]]) -> ParamSet {
        let mut params = ParamSet::new();
        for (i, g) in grads.iter().enumerate() {
            let mut p = Param::new(format!("w_{i}"), arr1(&vec![1.0; g.len()]));
            p.set_grad(Array1::from(g.to_vec()));
            params.push(p);
        }
        params
    }

    #[test]
    fn test_clip_grad_norm_no_clipping() {
        let mut params = params_with_grads(&[&[0.1, 0.2], &[0.1]]);

        // Global norm = sqrt(0.1² + 0.2² + 0.1²) = sqrt(0.06) ≈ 0.245
        let global_norm = clip_grad_norm(&mut params, 1.0);
        assert_abs_diff_eq!(global_norm, 0.245, epsilon = 1e-3);

        // Gradients unchanged below the threshold
        assert_abs_diff_eq!(params.get("w_0").unwrap().grad().unwrap()[0], 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(params.get("w_0").unwrap().grad().unwrap()[1], 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(params.get("w_1").unwrap().grad().unwrap()[0], 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_with_clipping() {
        let mut params = params_with_grads(&[&[3.0, 4.0], &[0.0]]);

        // Global norm = sqrt(3² + 4² + 0²) = 5.0
        let global_norm = clip_grad_norm(&mut params, 1.0);
        assert_abs_diff_eq!(global_norm, 5.0, epsilon = 1e-6);

        // Scaled by clip_coef = 1/5
        assert_abs_diff_eq!(params.get("w_0").unwrap().grad().unwrap()[0], 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(params.get("w_0").unwrap().grad().unwrap()[1], 0.8, epsilon = 1e-6);
        assert_abs_diff_eq!(params.get("w_1").unwrap().grad().unwrap()[0], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_exactly_at_threshold() {
        let mut params = params_with_grads(&[&[3.0, 4.0]]);

        let global_norm = clip_grad_norm(&mut params, 5.0);
        assert_abs_diff_eq!(global_norm, 5.0, epsilon = 1e-6);

        // norm == max_norm, not >: no clipping
        assert_abs_diff_eq!(params.get("w_0").unwrap().grad().unwrap()[0], 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(params.get("w_0").unwrap().grad().unwrap()[1], 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_preserves_relative_magnitudes() {
        let mut params = params_with_grads(&[&[10.0], &[5.0]]);

        let _global_norm = clip_grad_norm(&mut params, 1.0);

        let grad0 = params.get("w_0").unwrap().grad().unwrap()[0];
        let grad1 = params.get("w_1").unwrap().grad().unwrap()[0];
        assert_abs_diff_eq!(grad0 / grad1, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_clip_grad_norm_no_gradients() {
        let mut params = ParamSet::new();
        params.push(Param::new("w_0", arr1(&[1.0, 2.0])));

        let global_norm = clip_grad_norm(&mut params, 1.0);
        assert_abs_diff_eq!(global_norm, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_ignores_frozen_params() {
        let mut params = ParamSet::new();
        let mut frozen = Param::frozen("embedding", arr1(&[1.0]));
        frozen.set_grad(arr1(&[100.0]));
        params.push(frozen);

        let mut live = Param::new("w_0", arr1(&[1.0]));
        live.set_grad(arr1(&[3.0]));
        params.push(live);

        // Frozen gradient does not count toward the global norm
        let global_norm = clip_grad_norm(&mut params, 10.0);
        assert_abs_diff_eq!(global_norm, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_zero_max_norm() {
        let mut params = params_with_grads(&[&[5.0]]);

        let global_norm = clip_grad_norm(&mut params, 0.0);
        assert_abs_diff_eq!(global_norm, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(params.get("w_0").unwrap().grad().unwrap()[0], 0.0, epsilon = 1e-6);
    }
}
