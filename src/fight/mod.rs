// Public API - what other modules can use
pub use handlers::upcoming_fights;
pub use models::Fight;
pub use repository::{FightFilter, FightRepository, InMemoryFightRepository, PostgresFightRepository};
pub use seed::{load_fight_card, seed_fights, SeedError};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod seed;
