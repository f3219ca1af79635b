pub mod backtest;
pub mod config;
pub mod continuation;
pub mod coupling;
pub mod csv_table;
pub mod day_state;
pub mod events;
pub mod export;
pub mod manual_log;
pub mod model;
pub mod null_model;
pub mod predictor;
pub mod reliability;
pub mod simulation;
pub mod zodiac;

pub use config::ModelConfig;
pub use model::{ModelTables, build_model};
pub use predictor::{PredictError, Prediction, predict, predict_prior_only};
pub use zodiac::Zodiac;
