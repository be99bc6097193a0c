//! Integration test: full pipeline (load → encode → train → evaluate → save → load → predict)

use taxi_fare_prediction::data::{TaxiTrip, TripDataLoader};
use taxi_fare_prediction::error::TaxiFareError;
use taxi_fare_prediction::model::FareModel;
use taxi_fare_prediction::training::{TrainEngine, TrainingConfig};

use polars::prelude::*;
use std::io::Write;

const VENDORS: [&str; 2] = ["CMT", "VTS"];
const RATE_CODES: [&str; 2] = ["1", "2"];
const PAYMENTS: [&str; 2] = ["CRD", "CSH"];

/// Deterministic synthetic trips: fare follows a fixed meter curve so the
/// regressor has clean signal to recover.
fn synthetic_fare(distance: f64, passengers: i64) -> f64 {
    2.5 + 2.57 * distance + 0.4 * passengers as f64
}

fn synthetic_trips(n: usize) -> Vec<TaxiTrip> {
    (0..n)
        .map(|i| {
            let distance = 0.5 + (i % 40) as f64 * 0.5;
            let passengers = 1 + (i % 4) as i64;
            TaxiTrip {
                vendor_id: VENDORS[i % 2].to_string(),
                rate_code: RATE_CODES[(i / 2) % 2].to_string(),
                passenger_count: passengers,
                trip_distance: distance,
                payment_type: PAYMENTS[(i / 3) % 2].to_string(),
                fare_amount: synthetic_fare(distance, passengers),
            }
        })
        .collect()
}

fn train_dataset() -> DataFrame {
    TaxiTrip::to_dataframe(&synthetic_trips(320)).unwrap()
}

fn holdout_dataset() -> DataFrame {
    // Offset slice of the same curve, unseen row-for-row during training
    let trips: Vec<TaxiTrip> = synthetic_trips(400).into_iter().skip(320).collect();
    TaxiTrip::to_dataframe(&trips).unwrap()
}

fn quick_config() -> TrainingConfig {
    TrainingConfig::default()
        .with_boost_rounds(40)
        .with_max_depth(4)
}

#[test]
fn test_train_and_predict_sample_trip() {
    let df = train_dataset();
    let engine = TrainEngine::new(TrainingConfig::default().with_boost_rounds(80));
    let model = engine.fit(&df).unwrap();

    // The reference trip sits inside the training distance range, so the
    // prediction should land near the meter curve value (~29.5).
    let prediction = model.predict_one(&TaxiTrip::sample()).unwrap();
    let expected = synthetic_fare(10.33, 1);
    assert!(
        (prediction.fare_amount - expected).abs() < 3.0,
        "predicted {} but meter curve gives {}",
        prediction.fare_amount,
        expected
    );
}

#[test]
fn test_evaluation_metrics_are_finite() {
    let engine = TrainEngine::new(quick_config());
    let model = engine.fit(&train_dataset()).unwrap();

    let metrics = model.evaluate(&holdout_dataset()).unwrap();
    assert!(metrics.rmse >= 0.0 && metrics.rmse.is_finite());
    assert!(metrics.mse >= 0.0 && metrics.mse.is_finite());
    assert!(metrics.r2.is_finite());
    assert!(metrics.r2 > 0.5, "model should explain held-out variance, r2 = {}", metrics.r2);
}

#[test]
fn test_artifact_round_trip_matches_in_memory() {
    let df = train_dataset();
    let engine = TrainEngine::new(quick_config());
    let model = engine.fit(&df).unwrap();

    let holdout = holdout_dataset();
    let in_memory = model.predict(&holdout).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    model.save(&path).unwrap();

    let restored = FareModel::load(&path).unwrap();
    let from_disk = restored.predict(&holdout).unwrap();

    assert_eq!(in_memory, from_disk, "round-tripped model must predict identically");
    assert_eq!(restored.feature_names(), model.feature_names());
}

#[test]
fn test_missing_artifact_fails() {
    let err = FareModel::load("data/does-not-exist.bin").unwrap_err();
    assert!(matches!(err, TaxiFareError::FileNotFound(_)));
}

#[test]
fn test_corrupted_artifact_fails() {
    let engine = TrainEngine::new(quick_config());
    let model = engine.fit(&train_dataset()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    model.save(&path).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    assert!(FareModel::load(&path).is_err(), "corrupted artifact must not load");
}

#[test]
fn test_unseen_category_scores_without_error() {
    let engine = TrainEngine::new(quick_config());
    let model = engine.fit(&train_dataset()).unwrap();

    let trip = TaxiTrip {
        vendor_id: "DDS".to_string(), // never seen during training
        ..TaxiTrip::sample()
    };
    let prediction = model.predict_one(&trip).unwrap();
    assert!(prediction.fare_amount.is_finite());
}

#[test]
fn test_malformed_csv_fails_loudly() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "vendor_id,rate_code,fare_amount").unwrap();
    writeln!(file, "CMT,1,12.0").unwrap();

    let err = TripDataLoader::load_csv(file.path()).unwrap_err();
    assert!(matches!(err, TaxiFareError::SchemaMismatch { .. }));
}

#[test]
fn test_csv_to_training_end_to_end() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "vendor_id,rate_code,passenger_count,trip_distance,payment_type,fare_amount").unwrap();
    for trip in synthetic_trips(120) {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            trip.vendor_id,
            trip.rate_code,
            trip.passenger_count,
            trip.trip_distance,
            trip.payment_type,
            trip.fare_amount
        )
        .unwrap();
    }

    let df = TripDataLoader::load_csv(file.path()).unwrap();
    assert_eq!(df.height(), 120);

    let engine = TrainEngine::new(quick_config());
    let model = engine.fit(&df).unwrap();
    let metrics = model.evaluate(&df).unwrap();
    assert!(metrics.rmse.is_finite());
}
