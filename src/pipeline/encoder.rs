//! One-hot encoding of categorical columns
//!
//! The encoding itself is delegated to polars `to_dummies`; this type only
//! records which indicator columns training produced so that transform-time
//! output always lines up with the fitted layout.

use crate::error::{Result, TaxiFareError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted one-hot encoder over a fixed set of categorical columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    /// Indicator column names per source column, in fit order
    dummy_names: Vec<Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create an encoder for the given categorical columns
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            dummy_names: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoder: run the dummy expansion on training data and record
    /// the indicator columns it produces.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.dummy_names.clear();

        for col_name in &self.columns {
            let series = df
                .column(col_name)
                .map_err(|_| TaxiFareError::FeatureNotFound(col_name.clone()))?
                .as_materialized_series();

            let dummies = series
                .to_dummies(None, false)
                .map_err(|e| TaxiFareError::DataError(e.to_string()))?;

            let names: Vec<String> = dummies
                .get_column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect();
            self.dummy_names.push(names);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform categorical columns into indicator columns aligned with the
    /// fitted layout. Categories unseen during fit contribute nothing; fitted
    /// categories missing from the input become all-zero columns.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(TaxiFareError::ModelNotFitted);
        }

        let height = df.height();
        let mut out_columns: Vec<Column> = Vec::new();

        for (col_name, names) in self.columns.iter().zip(self.dummy_names.iter()) {
            let series = df
                .column(col_name)
                .map_err(|_| TaxiFareError::FeatureNotFound(col_name.clone()))?
                .as_materialized_series();

            let dummies = series
                .to_dummies(None, false)
                .map_err(|e| TaxiFareError::DataError(e.to_string()))?;

            for name in names {
                let indicator = match dummies.column(name) {
                    Ok(col) => col
                        .as_materialized_series()
                        .cast(&DataType::Float64)
                        .map_err(|e| TaxiFareError::DataError(e.to_string()))?,
                    Err(_) => Series::new(name.as_str().into(), vec![0.0f64; height]),
                };
                out_columns.push(indicator.into_column());
            }
        }

        DataFrame::new(out_columns).map_err(|e| TaxiFareError::DataError(e.to_string()))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// All indicator column names in output order
    pub fn feature_names(&self) -> Vec<String> {
        self.dummy_names.iter().flatten().cloned().collect()
    }

    /// Whether the encoder has been fitted
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
