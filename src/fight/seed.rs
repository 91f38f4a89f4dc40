use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::{models::Fight, repository::FightRepository};
use crate::shared::AppError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read fight card file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse fight card file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] AppError),
}

/// Reads a JSON array of fights
pub async fn load_fight_card(path: impl AsRef<Path>) -> Result<Vec<Fight>, SeedError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Inserts every fight whose id is not stored yet, returning how many were added
#[instrument(skip_all, fields(fights = fights.len()))]
pub async fn seed_fights(
    repository: &(dyn FightRepository + Send + Sync),
    fights: Vec<Fight>,
) -> Result<usize, SeedError> {
    let mut inserted = 0;
    for fight in fights {
        if repository.get_fight(fight.id).await?.is_some() {
            debug!(fight_id = fight.id, "Fight already stored, skipping");
            continue;
        }
        repository.insert_fight(&fight).await?;
        inserted += 1;
    }

    info!(inserted, "Fight card seeded");
    Ok(inserted)
}
