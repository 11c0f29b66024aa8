//! Mean squared error, the training loss of the output layer.

/// MSE over the outputs of one example.
pub fn mse_loss(pred: &[f64], target: &[f64]) -> f64 {
    debug_assert_eq!(pred.len(), target.len(), "pred and target size mismatch");
    pred.iter()
        .zip(target)
        .map(|(&p, &t)| (p - t).powi(2))
        .sum::<f64>()
        / pred.len() as f64
}

/// dMSE/dpred for one example.
pub fn mse_deriv(pred: &[f64], target: &[f64]) -> Vec<f64> {
    let n = pred.len() as f64;
    pred.iter()
        .zip(target)
        .map(|(&p, &t)| 2.0 * (p - t) / n)
        .collect()
}
