pub use handlers::leaderboard;
pub use service::{LeaderboardEntry, LeaderboardService};

mod handlers;
pub mod service;
