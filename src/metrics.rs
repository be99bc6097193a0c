//! Regression evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics for regression model evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// R-squared
    pub r2: f64,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Compute regression metrics from true and predicted values.
    ///
    /// The inputs must be non-empty and of equal length. A zero-variance
    /// target yields an R² of 0.0 rather than NaN.
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let mse: f64 = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae: f64 = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean = y_true.mean().unwrap_or(0.0);
        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();

        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
            n_samples: y_true.len(),
        }
    }
}
