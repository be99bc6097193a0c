//! Training engine for the fare regression pipeline
//!
//! Gradient-boosted tree fitting is delegated to the xgboost library; this
//! module wires the feature pipeline output into a `DMatrix` and records
//! training metadata.

use crate::error::{Result, TaxiFareError};
use crate::metrics::RegressionMetrics;
use crate::model::{FareModel, ModelMetadata};
use crate::pipeline::FeaturePipeline;
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use xgboost::parameters::learning::{LearningTaskParametersBuilder, Objective};
use xgboost::parameters::tree::TreeBoosterParametersBuilder;
use xgboost::parameters::{BoosterParametersBuilder, BoosterType, TrainingParametersBuilder};
use xgboost::{Booster, DMatrix};

/// Hyperparameters for the tree booster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of boosting rounds (trees)
    pub boost_rounds: u32,
    /// Maximum tree depth
    pub max_depth: u32,
    /// Learning rate (shrinkage)
    pub learning_rate: f32,
    /// Row subsample ratio per tree
    pub subsample: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            boost_rounds: 100,
            max_depth: 6,
            learning_rate: 0.3,
            subsample: 1.0,
        }
    }
}

impl TrainingConfig {
    pub fn with_boost_rounds(mut self, rounds: u32) -> Self {
        self.boost_rounds = rounds;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_learning_rate(mut self, eta: f32) -> Self {
        self.learning_rate = eta;
        self
    }
}

/// Trains a `FareModel` from a labeled trip DataFrame
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Fit the full pipeline: encode categoricals, concatenate features,
    /// and boost regression trees against the fare labels.
    pub fn fit(&self, df: &DataFrame) -> Result<FareModel> {
        if df.height() == 0 {
            return Err(TaxiFareError::TrainingError(
                "training dataset is empty".to_string(),
            ));
        }

        let start = Instant::now();

        let mut pipeline = FeaturePipeline::new();
        let x = pipeline.fit_transform(df)?;
        let y = pipeline.labels(df)?;

        tracing::info!(
            rows = x.nrows(),
            features = x.ncols(),
            rounds = self.config.boost_rounds,
            "training gradient boosted trees"
        );

        let x_f32: Vec<f32> = x.iter().map(|&v| v as f32).collect();
        let y_f32: Vec<f32> = y.iter().map(|&v| v as f32).collect();

        let mut dtrain = DMatrix::from_dense(&x_f32, x.nrows())
            .map_err(|e| TaxiFareError::TrainingError(e.to_string()))?;
        dtrain
            .set_labels(&y_f32)
            .map_err(|e| TaxiFareError::TrainingError(e.to_string()))?;

        let booster = self.train_booster(&dtrain)?;

        // Training-set metrics, recorded in the artifact metadata
        let train_preds = booster
            .predict(&dtrain)
            .map_err(|e| TaxiFareError::TrainingError(e.to_string()))?;
        let y_pred: Array1<f64> = train_preds.iter().map(|&p| p as f64).collect();
        let metrics = RegressionMetrics::compute(&y, &y_pred);

        let elapsed = start.elapsed().as_secs_f64();
        tracing::info!(
            rmse = metrics.rmse,
            r2 = metrics.r2,
            elapsed_secs = elapsed,
            "training complete"
        );

        let metadata = ModelMetadata::new("taxi-fare")
            .with_features(pipeline.feature_names().to_vec())
            .add_hyperparameter("boost_rounds", self.config.boost_rounds.to_string())
            .add_hyperparameter("max_depth", self.config.max_depth.to_string())
            .add_hyperparameter("learning_rate", self.config.learning_rate.to_string())
            .add_metric("train_rmse", metrics.rmse)
            .add_metric("train_r2", metrics.r2);

        Ok(FareModel::new(pipeline, booster, metadata))
    }

    fn train_booster(&self, dtrain: &DMatrix) -> Result<Booster> {
        let tree_params = TreeBoosterParametersBuilder::default()
            .max_depth(self.config.max_depth)
            .eta(self.config.learning_rate)
            .subsample(self.config.subsample)
            .build()
            .map_err(|e| TaxiFareError::TrainingError(e.to_string()))?;

        let learning_params = LearningTaskParametersBuilder::default()
            .objective(Objective::RegLinear)
            .build()
            .map_err(|e| TaxiFareError::TrainingError(e.to_string()))?;

        let booster_params = BoosterParametersBuilder::default()
            .booster_type(BoosterType::Tree(tree_params))
            .learning_params(learning_params)
            .verbose(false)
            .build()
            .map_err(|e| TaxiFareError::TrainingError(e.to_string()))?;

        let training_params = TrainingParametersBuilder::default()
            .dtrain(dtrain)
            .boost_rounds(self.config.boost_rounds)
            .booster_params(booster_params)
            .build()
            .map_err(|e| TaxiFareError::TrainingError(e.to_string()))?;

        Booster::train(&training_params)
            .map_err(|e| TaxiFareError::TrainingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.boost_rounds, 100);
        assert_eq!(config.max_depth, 6);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = TrainingConfig::default()
            .with_boost_rounds(25)
            .with_learning_rate(0.1);

        let json = serde_json::to_string(&config).unwrap();
        let restored: TrainingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.boost_rounds, 25);
        assert_eq!(restored.learning_rate, 0.1);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        use crate::data::TaxiTrip;

        let df = TaxiTrip::to_dataframe(&[]).unwrap();
        let engine = TrainEngine::new(TrainingConfig::default());
        let err = engine.fit(&df).unwrap_err();
        assert!(matches!(err, TaxiFareError::TrainingError(_)));
    }
}
