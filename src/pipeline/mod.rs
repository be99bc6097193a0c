//! Feature pipeline: label copy, one-hot encoding, column concatenation
//!
//! The fixed transformation chain between a loaded trip DataFrame and the
//! numeric matrix the regressor consumes.

mod encoder;

pub use encoder::OneHotEncoder;

use crate::data::{CATEGORICAL_COLUMNS, FARE_AMOUNT, NUMERIC_COLUMNS};
use crate::error::{Result, TaxiFareError};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted column pipeline: one-hot encoded categoricals concatenated with the
/// numeric trip columns into a single row-major feature matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePipeline {
    encoder: OneHotEncoder,
    numeric_columns: Vec<String>,
    feature_names: Vec<String>,
    is_fitted: bool,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturePipeline {
    /// Create an unfitted pipeline over the canonical trip columns
    pub fn new() -> Self {
        Self {
            encoder: OneHotEncoder::new(&CATEGORICAL_COLUMNS),
            numeric_columns: NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect(),
            feature_names: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the pipeline to a training DataFrame
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.encoder.fit(df)?;

        // Numeric columns must exist and be castable up front, not at transform
        for name in &self.numeric_columns {
            let col = df
                .column(name)
                .map_err(|_| TaxiFareError::FeatureNotFound(name.clone()))?;
            col.as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| TaxiFareError::DataError(e.to_string()))?;
        }

        self.feature_names = self.encoder.feature_names();
        self.feature_names.extend(self.numeric_columns.iter().cloned());
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a DataFrame into the fitted feature matrix layout
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(TaxiFareError::ModelNotFitted);
        }

        let mut combined = self.encoder.transform(df)?;
        for name in &self.numeric_columns {
            let series = df
                .column(name)
                .map_err(|_| TaxiFareError::FeatureNotFound(name.clone()))?
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| TaxiFareError::DataError(e.to_string()))?;
            combined
                .with_column(series)
                .map_err(|e| TaxiFareError::DataError(e.to_string()))?;
        }

        columns_to_array2(&combined, &self.feature_names)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Copy the fare column out as the label vector
    pub fn labels(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let series = df
            .column(FARE_AMOUNT)
            .map_err(|_| TaxiFareError::FeatureNotFound(FARE_AMOUNT.to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| TaxiFareError::DataError(e.to_string()))?;

        if series.null_count() > 0 {
            return Err(TaxiFareError::DataError(format!(
                "label column '{FARE_AMOUNT}' contains null values"
            )));
        }

        let values: Vec<f64> = series
            .f64()
            .map_err(|e| TaxiFareError::DataError(e.to_string()))?
            .into_iter()
            .flatten()
            .collect();
        Ok(Array1::from_vec(values))
    }

    /// Feature names in matrix column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of features the fitted pipeline produces
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Whether the pipeline has been fitted
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`.
/// Null values are rejected rather than silently imputed.
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| TaxiFareError::FeatureNotFound(col_name.clone()))?;
            let series = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| TaxiFareError::DataError(e.to_string()))?;

            if series.null_count() > 0 {
                return Err(TaxiFareError::DataError(format!(
                    "column '{col_name}' contains null values"
                )));
            }

            let values: Vec<f64> = series
                .f64()
                .map_err(|e| TaxiFareError::DataError(e.to_string()))?
                .into_iter()
                .flatten()
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}
