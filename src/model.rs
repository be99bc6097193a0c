//! Fitted fare model: prediction, evaluation, and artifact persistence

use crate::data::{TaxiTrip, TaxiTripFarePrediction, FARE_AMOUNT};
use crate::error::{Result, TaxiFareError};
use crate::metrics::RegressionMetrics;
use crate::pipeline::FeaturePipeline;
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use xgboost::{Booster, DMatrix};

/// Metadata stored alongside the fitted pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub version: String,
    /// Training timestamp (RFC 3339)
    pub trained_at: String,
    pub feature_names: Vec<String>,
    pub target_name: String,
    pub model_type: String,
    pub hyperparameters: HashMap<String, String>,
    pub metrics: HashMap<String, f64>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: "taxi-fare".to_string(),
            version: "1.0.0".to_string(),
            trained_at: String::new(),
            feature_names: Vec::new(),
            target_name: FARE_AMOUNT.to_string(),
            model_type: "gradient-boosted-trees".to_string(),
            hyperparameters: HashMap::new(),
            metrics: HashMap::new(),
        }
    }
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trained_at: chrono::Utc::now().to_rfc3339(),
            ..Default::default()
        }
    }

    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.feature_names = features;
        self
    }

    pub fn add_hyperparameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hyperparameters.insert(key.into(), value.into());
        self
    }

    pub fn add_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }
}

/// On-disk artifact envelope. The booster payload is opaque library bytes;
/// the envelope guards it with magic bytes, a format version, and a checksum.
#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    magic: [u8; 4],
    format_version: u32,
    checksum: u64,
    metadata: ModelMetadata,
    pipeline: FeaturePipeline,
    booster_bytes: Vec<u8>,
}

impl ModelArtifact {
    const MAGIC: [u8; 4] = *b"TXFM";
    const VERSION: u32 = 1;

    /// FNV-1a over the booster payload
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}

/// A fitted fare regression pipeline: encoders plus trained booster
pub struct FareModel {
    pipeline: FeaturePipeline,
    booster: Booster,
    metadata: ModelMetadata,
}

impl std::fmt::Debug for FareModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FareModel")
            .field("pipeline", &self.pipeline)
            .field("metadata", &self.metadata)
            .field("booster", &"<opaque>")
            .finish()
    }
}

impl FareModel {
    pub(crate) fn new(pipeline: FeaturePipeline, booster: Booster, metadata: ModelMetadata) -> Self {
        Self {
            pipeline,
            booster,
            metadata,
        }
    }

    /// Predict fares for every row of a trip DataFrame
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<f32>> {
        let x = self.pipeline.transform(df)?;
        let x_f32: Vec<f32> = x.iter().map(|&v| v as f32).collect();

        let dmatrix = DMatrix::from_dense(&x_f32, x.nrows())
            .map_err(|e| TaxiFareError::InferenceError(e.to_string()))?;
        self.booster
            .predict(&dmatrix)
            .map_err(|e| TaxiFareError::InferenceError(e.to_string()))
    }

    /// Predict the fare for a single trip; the record's own `fare_amount`
    /// plays no part in the prediction.
    pub fn predict_one(&self, trip: &TaxiTrip) -> Result<TaxiTripFarePrediction> {
        let df = TaxiTrip::to_dataframe(std::slice::from_ref(trip))?;
        let predictions = self.predict(&df)?;
        let fare = predictions
            .first()
            .copied()
            .ok_or_else(|| TaxiFareError::InferenceError("empty prediction output".to_string()))?;

        Ok(TaxiTripFarePrediction {
            fare_amount: fare as f64,
        })
    }

    /// Compute held-out regression metrics for a labeled DataFrame
    pub fn evaluate(&self, df: &DataFrame) -> Result<RegressionMetrics> {
        let y_true = self.pipeline.labels(df)?;
        let predictions = self.predict(df)?;
        let y_pred: Array1<f64> = predictions.iter().map(|&p| p as f64).collect();

        Ok(RegressionMetrics::compute(&y_true, &y_pred))
    }

    /// Persist the fitted pipeline to a single binary artifact file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        // The booster only serializes through the library's file API, so
        // round-trip it through a temp file to get the raw bytes.
        let tmp = tempfile::NamedTempFile::new()
            .map_err(|e| TaxiFareError::SerializationError(e.to_string()))?;
        self.booster
            .save(tmp.path())
            .map_err(|e| TaxiFareError::SerializationError(e.to_string()))?;
        let booster_bytes = std::fs::read(tmp.path())
            .map_err(|e| TaxiFareError::SerializationError(e.to_string()))?;

        let artifact = ModelArtifact {
            magic: ModelArtifact::MAGIC,
            format_version: ModelArtifact::VERSION,
            checksum: ModelArtifact::compute_checksum(&booster_bytes),
            metadata: self.metadata.clone(),
            pipeline: self.pipeline.clone(),
            booster_bytes,
        };

        let bytes = bincode::serialize(&artifact)
            .map_err(|e| TaxiFareError::SerializationError(e.to_string()))?;

        let file = File::create(path.as_ref())
            .map_err(|e| TaxiFareError::DataError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&bytes)
            .map_err(|e| TaxiFareError::DataError(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), bytes = bytes.len(), "model artifact written");
        Ok(())
    }

    /// Load a previously persisted artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TaxiFareError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path).map_err(|e| TaxiFareError::DataError(e.to_string()))?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| TaxiFareError::DataError(e.to_string()))?;

        let artifact: ModelArtifact = bincode::deserialize(&bytes)
            .map_err(|e| TaxiFareError::SerializationError(e.to_string()))?;

        if artifact.magic != ModelArtifact::MAGIC {
            return Err(TaxiFareError::SerializationError(
                "not a taxi fare model artifact".to_string(),
            ));
        }
        if artifact.format_version != ModelArtifact::VERSION {
            return Err(TaxiFareError::SerializationError(format!(
                "unsupported artifact format version {}",
                artifact.format_version
            )));
        }
        if ModelArtifact::compute_checksum(&artifact.booster_bytes) != artifact.checksum {
            return Err(TaxiFareError::SerializationError(
                "checksum verification failed - artifact may be corrupted".to_string(),
            ));
        }

        let booster = Booster::load_buffer(&artifact.booster_bytes)
            .map_err(|e| TaxiFareError::SerializationError(e.to_string()))?;

        Ok(Self {
            pipeline: artifact.pipeline,
            booster,
            metadata: artifact.metadata,
        })
    }

    /// Metadata recorded at training time
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Feature names in matrix column order
    pub fn feature_names(&self) -> &[String] {
        self.pipeline.feature_names()
    }
}
