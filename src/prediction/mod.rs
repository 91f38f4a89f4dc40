pub mod models;
pub mod repository;

pub use models::{Choice, Prediction};
pub use repository::{
    InMemoryPredictionRepository, PostgresPredictionRepository, PredictionRepository,
};
