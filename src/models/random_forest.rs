//! Random Forest regressor

use super::decision_tree::{DecisionTree, TreeConfig};
use super::{validate_training_set, ModelFitError, Regressor};
use crate::data::Dataset;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random Forest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (all if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random Forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Create a new random forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Get feature names with importances, sorted by importance
    pub fn feature_importance_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .feature_names
            .iter()
            .zip(self.feature_importances.iter())
            .map(|(n, &i)| (n.as_str(), i))
            .collect();

        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl Regressor for RandomForest {
    fn fit(&mut self, dataset: &Dataset) -> Result<(), ModelFitError> {
        validate_training_set(dataset)?;

        self.feature_names = dataset.feature_names.clone();
        let n_features = dataset.n_features();
        let config = &self.config;

        // Build trees in parallel; each tree owns its seed
        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed.wrapping_add(i as u64);
                let mut tree = DecisionTree::new(TreeConfig {
                    max_depth: config.max_depth,
                    min_samples_split: config.min_samples_split,
                    min_samples_leaf: config.min_samples_leaf,
                    max_features: config.max_features,
                    seed,
                });

                if config.bootstrap {
                    tree.fit_indices(dataset, &dataset.bootstrap_indices(seed));
                } else {
                    tree.fit(dataset);
                }

                tree
            })
            .collect();

        self.trees = trees;

        // Aggregate feature importances
        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        debug!(
            "Fitted {} trees on {} samples",
            self.trees.len(),
            dataset.n_samples()
        );

        Ok(())
    }

    /// Mean of the tree predictions
    fn predict_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        self.trees
            .iter()
            .map(|t| t.predict_one(features))
            .sum::<f64>()
            / self.trees.len() as f64
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.par_iter().map(|row| self.predict_one(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn regression_dataset() -> Dataset {
        let mut dataset = Dataset::new(vec!["x1".to_string(), "x2".to_string()]);
        let now = Utc::now();

        for i in 0..200 {
            let x1 = (i as f64) / 20.0;
            let x2 = ((i as f64) / 10.0).sin();
            let y = x1 + x2 * 2.0 + 0.1 * (i as f64 % 5.0);
            dataset.add_sample(vec![x1, x2], y, now);
        }

        dataset
    }

    #[test]
    fn test_random_forest_regression() {
        let dataset = regression_dataset();
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 10,
            max_depth: 5,
            ..Default::default()
        });

        forest.fit(&dataset).unwrap();

        assert_eq!(forest.n_trees(), 10);
        assert_eq!(forest.feature_importances().len(), 2);
        let total: f64 = forest.feature_importances().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);

        let predictions = forest.predict(&dataset.features);
        let mae = crate::models::mean_absolute_error(&predictions, &dataset.labels);
        assert!(mae < 1.0, "in-sample MAE too large: {}", mae);
    }

    #[test]
    fn test_random_forest_is_deterministic() {
        let dataset = regression_dataset();
        let config = ForestConfig {
            n_trees: 8,
            max_depth: 4,
            ..Default::default()
        };

        let mut a = RandomForest::new(config.clone());
        let mut b = RandomForest::new(config);
        a.fit(&dataset).unwrap();
        b.fit(&dataset).unwrap();

        assert_eq!(a.predict(&dataset.features), b.predict(&dataset.features));
    }

    #[test]
    fn test_ranking_is_sorted() {
        let mut forest = RandomForest::new(ForestConfig {
            n_trees: 5,
            ..Default::default()
        });
        forest.fit(&regression_dataset()).unwrap();

        let ranking = forest.feature_importance_ranking();
        assert_eq!(ranking.len(), 2);
        assert!(ranking[0].1 >= ranking[1].1);
    }

    #[test]
    fn test_degenerate_input_fails() {
        let now = Utc::now();
        let dataset = Dataset::from_data(
            vec![vec![1.0, 1.0]; 10],
            (0..10).map(|i| i as f64).collect(),
            vec!["a".to_string(), "b".to_string()],
            vec![now; 10],
        );

        let mut forest = RandomForest::default();
        assert_eq!(forest.fit(&dataset), Err(ModelFitError::Degenerate));
        assert_eq!(forest.n_trees(), 0);
    }
}
