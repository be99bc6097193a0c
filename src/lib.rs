//! Taxi fare prediction - a minimal end-to-end regression pipeline
//!
//! Trains a gradient-boosted tree regressor to predict taxi fares from trip
//! records, evaluates it on a held-out set, and round-trips the fitted
//! pipeline through a serialized artifact for inference.
//!
//! # Modules
//!
//! - [`data`] - Trip record types and CSV loading
//! - [`pipeline`] - One-hot encoding and feature concatenation
//! - [`training`] - Gradient-boosted tree training (delegated to xgboost)
//! - [`model`] - Fitted model: predict, evaluate, serialize
//! - [`metrics`] - RMSE / R² regression metrics

// Core error handling
pub mod error;

// Data loading and transformation
pub mod data;
pub mod pipeline;

// Training and inference
pub mod training;
pub mod model;
pub mod metrics;

pub use error::{Result, TaxiFareError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{TaxiTrip, TaxiTripFarePrediction, TripDataLoader};
    pub use crate::error::{Result, TaxiFareError};
    pub use crate::metrics::RegressionMetrics;
    pub use crate::model::{FareModel, ModelMetadata};
    pub use crate::pipeline::{FeaturePipeline, OneHotEncoder};
    pub use crate::training::{TrainEngine, TrainingConfig};
}
