use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::Fight;
use crate::shared::AppError;

/// Which fights a scan should return
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FightFilter {
    /// Still taking predictions: deadline after the instant, no winner recorded
    OpenAt(DateTime<Utc>),
    Unresolved,
    Resolved,
}

impl FightFilter {
    pub fn matches(&self, fight: &Fight) -> bool {
        match self {
            FightFilter::OpenAt(now) => fight.is_open_at(*now) && !fight.is_resolved(),
            FightFilter::Unresolved => !fight.is_resolved(),
            FightFilter::Resolved => fight.is_resolved(),
        }
    }
}

/// Trait for fight repository operations
#[async_trait]
pub trait FightRepository {
    async fn insert_fight(&self, fight: &Fight) -> Result<(), AppError>;
    async fn get_fight(&self, fight_id: i64) -> Result<Option<Fight>, AppError>;

    /// Returns matching fights ordered by id
    async fn find_fights(&self, filter: FightFilter) -> Result<Vec<Fight>, AppError>;

    /// Sets the winner of a fight, inserting the fight itself if the id is not stored yet
    async fn upsert_winner(&self, fight: &Fight, winner: &str) -> Result<(), AppError>;
}

/// In-memory implementation of FightRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryFightRepository {
    fights: RwLock<HashMap<i64, Fight>>,
}

impl InMemoryFightRepository {
    pub fn new() -> Self {
        Self {
            fights: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated fights
    pub fn with_fights(fights: Vec<Fight>) -> Self {
        let fights = fights.into_iter().map(|fight| (fight.id, fight)).collect();
        Self {
            fights: RwLock::new(fights),
        }
    }
}

#[async_trait]
impl FightRepository for InMemoryFightRepository {
    #[instrument(skip(self, fight))]
    async fn insert_fight(&self, fight: &Fight) -> Result<(), AppError> {
        debug!(fight_id = fight.id, name = %fight.name, "Inserting fight in memory");

        let mut fights = self.fights.write().await;
        if fights.contains_key(&fight.id) {
            warn!(fight_id = fight.id, "Fight already exists in memory");
            return Err(AppError::DatabaseError("Fight already exists".to_string()));
        }
        fights.insert(fight.id, fight.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_fight(&self, fight_id: i64) -> Result<Option<Fight>, AppError> {
        let fights = self.fights.read().await;
        Ok(fights.get(&fight_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_fights(&self, filter: FightFilter) -> Result<Vec<Fight>, AppError> {
        let fights = self.fights.read().await;
        let mut matching: Vec<Fight> = fights
            .values()
            .filter(|fight| filter.matches(fight))
            .cloned()
            .collect();
        matching.sort_by_key(|fight| fight.id);

        debug!(count = matching.len(), "Fights listed from memory");
        Ok(matching)
    }

    #[instrument(skip(self, fight))]
    async fn upsert_winner(&self, fight: &Fight, winner: &str) -> Result<(), AppError> {
        debug!(fight_id = fight.id, winner = %winner, "Recording winner in memory");

        let mut fights = self.fights.write().await;
        fights
            .entry(fight.id)
            .or_insert_with(|| fight.clone())
            .winner = Some(winner.to_string());
        Ok(())
    }
}

/// PostgreSQL implementation of fight repository
pub struct PostgresFightRepository {
    pool: PgPool,
}

impl PostgresFightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn fight_from_row(row: &sqlx::postgres::PgRow) -> Fight {
    Fight {
        id: row.get("id"),
        name: row.get("name"),
        bots: row.get("bots"),
        deadline: row.get("deadline"),
        winner: row.get("winner"),
        points: row.get("points"),
    }
}

#[async_trait]
impl FightRepository for PostgresFightRepository {
    #[instrument(skip(self, fight))]
    async fn insert_fight(&self, fight: &Fight) -> Result<(), AppError> {
        debug!(fight_id = fight.id, name = %fight.name, "Inserting fight in database");

        sqlx::query(
            "INSERT INTO fights (id, name, bots, deadline, winner, points) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(fight.id)
        .bind(&fight.name)
        .bind(&fight.bots)
        .bind(fight.deadline)
        .bind(&fight.winner)
        .bind(fight.points)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, fight_id = fight.id, "Failed to insert fight in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_fight(&self, fight_id: i64) -> Result<Option<Fight>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, bots, deadline, winner, points FROM fights WHERE id = $1",
        )
        .bind(fight_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, fight_id, "Failed to fetch fight from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(fight_from_row))
    }

    #[instrument(skip(self))]
    async fn find_fights(&self, filter: FightFilter) -> Result<Vec<Fight>, AppError> {
        let clause = match filter {
            FightFilter::OpenAt(_) => "WHERE deadline > $1 AND winner IS NULL",
            FightFilter::Unresolved => "WHERE winner IS NULL",
            FightFilter::Resolved => "WHERE winner IS NOT NULL",
        };
        let sql = format!(
            "SELECT id, name, bots, deadline, winner, points FROM fights {} ORDER BY id",
            clause
        );

        let mut query = sqlx::query(&sql);
        if let FightFilter::OpenAt(now) = filter {
            query = query.bind(now);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            warn!(error = %e, ?filter, "Failed to list fights from database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(count = rows.len(), "Fights listed from database");
        Ok(rows.iter().map(fight_from_row).collect())
    }

    #[instrument(skip(self, fight))]
    async fn upsert_winner(&self, fight: &Fight, winner: &str) -> Result<(), AppError> {
        debug!(fight_id = fight.id, winner = %winner, "Recording winner in database");

        sqlx::query(
            "INSERT INTO fights (id, name, bots, deadline, winner, points) VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET winner = EXCLUDED.winner",
        )
        .bind(fight.id)
        .bind(&fight.name)
        .bind(&fight.bots)
        .bind(fight.deadline)
        .bind(winner)
        .bind(fight.points)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, fight_id = fight.id, "Failed to record winner in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
