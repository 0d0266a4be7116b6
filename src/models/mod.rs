//! Machine learning models module
//!
//! The [`Regressor`] trait is the only thing the forecasting pipeline knows
//! about a model. [`RandomForest`] is the implementation shipped with the
//! crate; [`DecisionTree`] is its base learner.

mod decision_tree;
mod random_forest;

pub use decision_tree::{DecisionTree, TreeConfig, TreeNode};
pub use random_forest::{ForestConfig, RandomForest};

use crate::data::Dataset;
use thiserror::Error;

/// Errors raised while fitting a regressor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelFitError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("row {row} has {found} features, expected {expected}")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{features} feature rows but {labels} labels")]
    LabelCountMismatch { features: usize, labels: usize },

    #[error("non-finite value in row {row}")]
    NonFinite { row: usize },

    #[error("every feature column is constant, no split is possible")]
    Degenerate,
}

/// Capability interface for next-close regressors
pub trait Regressor {
    /// Fit the model to `dataset`'s features and labels
    fn fit(&mut self, dataset: &Dataset) -> Result<(), ModelFitError>;

    /// Predict one row of features (same column order as training)
    fn predict_one(&self, features: &[f64]) -> f64;

    /// Predict many rows
    fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }
}

/// Reject training sets no regressor can learn from.
pub fn validate_training_set(dataset: &Dataset) -> Result<(), ModelFitError> {
    if dataset.is_empty() {
        return Err(ModelFitError::EmptyTrainingSet);
    }

    if dataset.labels.len() != dataset.n_samples() {
        return Err(ModelFitError::LabelCountMismatch {
            features: dataset.n_samples(),
            labels: dataset.labels.len(),
        });
    }

    let expected = dataset.n_features();
    for (row, (features, label)) in dataset.features.iter().zip(&dataset.labels).enumerate() {
        if features.len() != expected {
            return Err(ModelFitError::ShapeMismatch {
                row,
                expected,
                found: features.len(),
            });
        }
        if !label.is_finite() || features.iter().any(|v| !v.is_finite()) {
            return Err(ModelFitError::NonFinite { row });
        }
    }

    let first = &dataset.features[0];
    let all_constant = (0..expected).all(|j| dataset.features.iter().all(|row| row[j] == first[j]));
    if all_constant && dataset.n_samples() > 1 {
        return Err(ModelFitError::Degenerate);
    }

    Ok(())
}

/// Mean absolute error between predictions and actual values
pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / predicted.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_mean_absolute_error() {
        let mae = mean_absolute_error(&[1.0, 2.0, 3.0], &[2.0, 2.0, 1.0]);
        assert!((mae - 1.0).abs() < 1e-12);
        assert_eq!(mean_absolute_error(&[], &[]), 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_sets() {
        let empty = Dataset::new(vec!["x".to_string()]);
        assert_eq!(
            validate_training_set(&empty),
            Err(ModelFitError::EmptyTrainingSet)
        );

        let now = Utc::now();
        let ragged = Dataset::from_data(
            vec![vec![1.0], vec![1.0, 2.0]],
            vec![1.0, 2.0],
            vec!["x".to_string()],
            vec![now, now],
        );
        assert!(matches!(
            validate_training_set(&ragged),
            Err(ModelFitError::ShapeMismatch { row: 1, .. })
        ));

        let nan = Dataset::from_data(
            vec![vec![1.0], vec![f64::NAN]],
            vec![1.0, 2.0],
            vec!["x".to_string()],
            vec![now, now],
        );
        assert_eq!(
            validate_training_set(&nan),
            Err(ModelFitError::NonFinite { row: 1 })
        );

        let constant = Dataset::from_data(
            vec![vec![3.0, 1.0]; 5],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec!["x".to_string(), "y".to_string()],
            vec![now; 5],
        );
        assert_eq!(
            validate_training_set(&constant),
            Err(ModelFitError::Degenerate)
        );
    }
}
