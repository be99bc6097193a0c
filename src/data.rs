//! Taxi trip records and CSV loading

use crate::error::{Result, TaxiFareError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

pub const VENDOR_ID: &str = "vendor_id";
pub const RATE_CODE: &str = "rate_code";
pub const PASSENGER_COUNT: &str = "passenger_count";
pub const TRIP_DISTANCE: &str = "trip_distance";
pub const PAYMENT_TYPE: &str = "payment_type";
pub const FARE_AMOUNT: &str = "fare_amount";

/// Expected CSV column order
pub const CSV_COLUMNS: [&str; 6] = [
    VENDOR_ID,
    RATE_CODE,
    PASSENGER_COUNT,
    TRIP_DISTANCE,
    PAYMENT_TYPE,
    FARE_AMOUNT,
];

/// Categorical feature columns (one-hot encoded)
pub const CATEGORICAL_COLUMNS: [&str; 3] = [VENDOR_ID, RATE_CODE, PAYMENT_TYPE];

/// Numeric feature columns (passed through as-is)
pub const NUMERIC_COLUMNS: [&str; 2] = [PASSENGER_COUNT, TRIP_DISTANCE];

/// A single taxi trip record.
///
/// `fare_amount` is the label during training and is ignored (conventionally
/// zero) when the record is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxiTrip {
    pub vendor_id: String,
    pub rate_code: String,
    pub passenger_count: i64,
    pub trip_distance: f64,
    pub payment_type: String,
    pub fare_amount: f64,
}

impl TaxiTrip {
    /// The fixed reference trip used by the demo binary (actual fare 29.5).
    pub fn sample() -> Self {
        Self {
            vendor_id: "VTS".to_string(),
            rate_code: "1".to_string(),
            passenger_count: 1,
            trip_distance: 10.33,
            payment_type: "CSH".to_string(),
            fare_amount: 0.0,
        }
    }

    /// Convert a slice of trips into a DataFrame with the canonical schema.
    pub fn to_dataframe(trips: &[TaxiTrip]) -> Result<DataFrame> {
        let df = df!(
            VENDOR_ID => trips.iter().map(|t| t.vendor_id.clone()).collect::<Vec<_>>(),
            RATE_CODE => trips.iter().map(|t| t.rate_code.clone()).collect::<Vec<_>>(),
            PASSENGER_COUNT => trips.iter().map(|t| t.passenger_count).collect::<Vec<_>>(),
            TRIP_DISTANCE => trips.iter().map(|t| t.trip_distance).collect::<Vec<_>>(),
            PAYMENT_TYPE => trips.iter().map(|t| t.payment_type.clone()).collect::<Vec<_>>(),
            FARE_AMOUNT => trips.iter().map(|t| t.fare_amount).collect::<Vec<_>>(),
        )?;
        Ok(df)
    }
}

/// Predicted fare for a single trip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxiTripFarePrediction {
    pub fare_amount: f64,
}

/// Basic information about a trip CSV file
#[derive(Debug, Clone)]
pub struct TripFileInfo {
    pub path: String,
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<String>,
}

/// Loader for headered, comma-separated trip files
pub struct TripDataLoader;

impl TripDataLoader {
    /// Dtypes forced on the CSV reader. `rate_code` looks numeric in the raw
    /// files but is a category, so inference alone would mistype it.
    fn csv_schema() -> Schema {
        Schema::from_iter([
            Field::new(VENDOR_ID.into(), DataType::String),
            Field::new(RATE_CODE.into(), DataType::String),
            Field::new(PASSENGER_COUNT.into(), DataType::Int64),
            Field::new(TRIP_DISTANCE.into(), DataType::Float64),
            Field::new(PAYMENT_TYPE.into(), DataType::String),
            Field::new(FARE_AMOUNT.into(), DataType::Float64),
        ])
    }

    /// Load a trip CSV and validate it against the canonical schema.
    ///
    /// Fails loudly on a missing file, wrong columns, unparsable values, or
    /// null fields; a degenerate dataset is never returned silently.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TaxiFareError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)
            .map_err(|e| TaxiFareError::DataError(e.to_string()))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_schema_overwrite(Some(Arc::new(Self::csv_schema())))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| TaxiFareError::DataError(e.to_string()))?;

        Self::validate_schema(&df)?;
        Ok(df)
    }

    /// Check column names and order, then reject nulls in any column.
    pub fn validate_schema(df: &DataFrame) -> Result<()> {
        let actual: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        if actual != CSV_COLUMNS {
            return Err(TaxiFareError::SchemaMismatch {
                expected: CSV_COLUMNS.join(", "),
                actual: actual.join(", "),
            });
        }

        for col in df.get_columns() {
            if col.null_count() > 0 {
                return Err(TaxiFareError::DataError(format!(
                    "column '{}' contains {} null value(s)",
                    col.name(),
                    col.null_count()
                )));
            }
        }

        Ok(())
    }

    /// Get row/column counts without a full parse.
    pub fn file_info(path: impl AsRef<Path>) -> Result<TripFileInfo> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TaxiFareError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)
            .map_err(|e| TaxiFareError::DataError(e.to_string()))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header = lines
            .next()
            .transpose()
            .map_err(|e| TaxiFareError::DataError(e.to_string()))?
            .unwrap_or_default();

        let columns: Vec<String> = header.split(',').map(|s| s.trim().to_string()).collect();
        let n_cols = columns.len();
        let n_rows = lines.count();

        Ok(TripFileInfo {
            path: path.display().to_string(),
            n_rows,
            n_cols,
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_trip_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "vendor_id,rate_code,passenger_count,trip_distance,payment_type,fare_amount").unwrap();
        writeln!(file, "CMT,1,1,3.8,CRD,17.5").unwrap();
        writeln!(file, "VTS,1,2,1.1,CSH,6.0").unwrap();
        writeln!(file, "VTS,2,1,18.0,CRD,52.0").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_trip_csv();
        let df = TripDataLoader::load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 6);
        // rate_code must come back as a string category, not an integer
        assert_eq!(df.column(RATE_CODE).unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_load_missing_file() {
        let err = TripDataLoader::load_csv("no/such/file.csv").unwrap_err();
        assert!(matches!(err, TaxiFareError::FileNotFound(_)));
    }

    #[test]
    fn test_wrong_columns_rejected() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "vendor_id,rate_code,passenger_count").unwrap();
        writeln!(file, "CMT,1,1").unwrap();

        let err = TripDataLoader::load_csv(file.path()).unwrap_err();
        assert!(matches!(err, TaxiFareError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_null_field_rejected() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "vendor_id,rate_code,passenger_count,trip_distance,payment_type,fare_amount").unwrap();
        writeln!(file, "CMT,1,,3.8,CRD,17.5").unwrap();

        let err = TripDataLoader::load_csv(file.path()).unwrap_err();
        assert!(matches!(err, TaxiFareError::DataError(_)));
    }

    #[test]
    fn test_file_info() {
        let file = create_trip_csv();
        let info = TripDataLoader::file_info(file.path()).unwrap();

        assert_eq!(info.n_rows, 3);
        assert_eq!(info.n_cols, 6);
        assert_eq!(info.columns[0], VENDOR_ID);
    }

    #[test]
    fn test_trips_to_dataframe() {
        let trips = vec![TaxiTrip::sample()];
        let df = TaxiTrip::to_dataframe(&trips).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 6);
        TripDataLoader::validate_schema(&df).unwrap();
    }
}
