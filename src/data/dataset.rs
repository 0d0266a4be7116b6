//! Supervised dataset: feature rows paired with next-close labels

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Dataset for machine learning with features and labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub features: Vec<Vec<f64>>,
    /// Target labels
    pub labels: Vec<f64>,
    /// Feature names, in column order
    pub feature_names: Vec<String>,
    /// Timestamp of each sample
    pub timestamps: Vec<DateTime<Utc>>,
}

/// Train/test split result
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    /// Create a new empty dataset
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            feature_names,
            timestamps: Vec::new(),
        }
    }

    /// Create dataset from raw data
    pub fn from_data(
        features: Vec<Vec<f64>>,
        labels: Vec<f64>,
        feature_names: Vec<String>,
        timestamps: Vec<DateTime<Utc>>,
    ) -> Self {
        Self {
            features,
            labels,
            feature_names,
            timestamps,
        }
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Add a sample
    pub fn add_sample(&mut self, features: Vec<f64>, label: f64, timestamp: DateTime<Utc>) {
        assert_eq!(features.len(), self.feature_names.len());
        self.features.push(features);
        self.labels.push(label);
        self.timestamps.push(timestamp);
    }

    /// Seeded shuffle split.
    ///
    /// The test subset holds `ceil(test_ratio * n)` samples. Both subsets are
    /// returned in chronological (original) order.
    pub fn random_split(&self, test_ratio: f64, seed: u64) -> Split {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);

        let test_size = ((test_ratio.clamp(0.0, 1.0) * n as f64).ceil() as usize).min(n);
        let (test_indices, train_indices) = indices.split_at(test_size);

        let mut train_indices = train_indices.to_vec();
        let mut test_indices = test_indices.to_vec();
        train_indices.sort_unstable();
        test_indices.sort_unstable();

        Split {
            train: self.subset(&train_indices),
            test: self.subset(&test_indices),
        }
    }

    /// Create a subset of the dataset by indices
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
            timestamps: indices.iter().map(|&i| self.timestamps[i]).collect(),
        }
    }

    /// Indices of a bootstrap sample (with replacement)
    pub fn bootstrap_indices(&self, seed: u64) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_dataset(n: usize) -> Dataset {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut dataset = Dataset::new(vec!["Close".to_string(), "Volume".to_string()]);
        for i in 0..n {
            dataset.add_sample(
                vec![i as f64, 1_000.0 + i as f64],
                i as f64 + 1.0,
                start + Duration::days(i as i64),
            );
        }
        dataset
    }

    #[test]
    fn test_dataset_operations() {
        let dataset = sample_dataset(3);
        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.n_features(), 2);
        assert_eq!(dataset.labels, vec![1.0, 2.0, 3.0]);
        assert!(!dataset.is_empty());
    }

    #[test]
    fn test_random_split_sizes() {
        let split = sample_dataset(100).random_split(0.2, 42);
        assert_eq!(split.train.n_samples(), 80);
        assert_eq!(split.test.n_samples(), 20);
    }

    #[test]
    fn test_random_split_is_reproducible() {
        let dataset = sample_dataset(100);
        let a = dataset.random_split(0.2, 42);
        let b = dataset.random_split(0.2, 42);
        assert_eq!(a.test.timestamps, b.test.timestamps);
        assert_eq!(a.train.labels, b.train.labels);

        let c = dataset.random_split(0.2, 7);
        assert_ne!(a.test.timestamps, c.test.timestamps);
    }

    #[test]
    fn test_random_split_is_disjoint_and_chronological() {
        let split = sample_dataset(50).random_split(0.2, 42);
        for ts in &split.test.timestamps {
            assert!(!split.train.timestamps.contains(ts));
        }
        assert!(split.test.timestamps.windows(2).all(|w| w[0] < w[1]));
        assert!(split.train.timestamps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(split.train.n_samples() + split.test.n_samples(), 50);
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let split = sample_dataset(10).random_split(0.25, 1);
        assert_eq!(split.test.n_samples(), 3);
        assert_eq!(split.train.n_samples(), 7);
    }

    #[test]
    fn test_bootstrap_indices() {
        let dataset = sample_dataset(30);
        let indices = dataset.bootstrap_indices(3);
        assert_eq!(indices.len(), 30);
        assert!(indices.iter().all(|&i| i < 30));
        assert_eq!(indices, dataset.bootstrap_indices(3));
        assert_eq!(dataset.subset(&indices).n_samples(), 30);
    }
}
