//! Taxi fare prediction - demo entry point
//!
//! Trains on the bundled trip data, prints held-out metrics, persists the
//! model artifact, then reloads it to predict the fixed reference trip.

use anyhow::Context;
use taxi_fare_prediction::data::{TaxiTrip, TripDataLoader};
use taxi_fare_prediction::model::FareModel;
use taxi_fare_prediction::training::{TrainEngine, TrainingConfig};

const TRAIN_DATA_PATH: &str = "data/taxi-fare-train.csv";
const TEST_DATA_PATH: &str = "data/taxi-fare-test.csv";
const MODEL_PATH: &str = "data/model.bin";

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taxi_fare_prediction=info".into()),
        )
        .init();

    let train_df = TripDataLoader::load_csv(TRAIN_DATA_PATH).context("loading training data")?;
    tracing::info!(rows = train_df.height(), path = TRAIN_DATA_PATH, "loaded training data");

    let engine = TrainEngine::new(TrainingConfig::default());
    let model = engine.fit(&train_df).context("training fare model")?;

    let test_df = TripDataLoader::load_csv(TEST_DATA_PATH).context("loading held-out data")?;
    let metrics = model.evaluate(&test_df).context("evaluating fare model")?;
    println!("Rms = {}", metrics.rmse);
    println!("RSquared = {}", metrics.r2);

    model.save(MODEL_PATH).context("saving model artifact")?;

    // Predict from the persisted artifact, as an inference process would
    let restored = FareModel::load(MODEL_PATH).context("loading model artifact")?;
    let prediction = restored
        .predict_one(&TaxiTrip::sample())
        .context("predicting sample trip")?;
    println!("Predicted fare: {:.2}, actual fare: 29.5", prediction.fare_amount);

    Ok(())
}
