use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bracket::BRACKET_MARKER;

/// Database model for the fights table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fight {
    pub id: i64,
    pub name: String,
    pub bots: Vec<String>, // Contestant names, seed order
    pub deadline: DateTime<Utc>,
    pub winner: Option<String>, // None until a result is recorded
    pub points: Option<i32>,    // Overrides the name-based default score
}

impl Fight {
    /// Creates an unresolved fight with the default scoring rule
    pub fn new(id: i64, name: impl Into<String>, bots: Vec<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            bots,
            deadline,
            winner: None,
            points: None,
        }
    }

    pub fn is_bracket_definition(&self) -> bool {
        self.name.contains(BRACKET_MARKER)
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }

    /// Checks whether predictions for this fight are still accepted at `now`
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline > now
    }

    /// Points awarded for a correct prediction on this fight
    pub fn points_value(&self) -> i32 {
        match self.points {
            Some(points) => points,
            None if self.name.contains("Rumble") => 2,
            None => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fight(name: &str) -> Fight {
        Fight::new(
            1,
            name,
            vec!["Tombstone".to_string(), "Minotaur".to_string()],
            Utc::now() + Duration::hours(1),
        )
    }

    #[test]
    fn test_points_default_to_one() {
        assert_eq!(fight("Week 1").points_value(), 1);
    }

    #[test]
    fn test_rumble_fights_score_double() {
        assert_eq!(fight("Heavyweight Rumble").points_value(), 2);
    }

    #[test]
    fn test_points_override_wins_over_name() {
        let mut rumble = fight("Heavyweight Rumble");
        rumble.points = Some(5);
        assert_eq!(rumble.points_value(), 5);
    }

    #[test]
    fn test_open_until_deadline() {
        let fight = fight("Week 1");
        assert!(fight.is_open_at(Utc::now()));
        assert!(!fight.is_open_at(fight.deadline + Duration::seconds(1)));
    }

    #[test]
    fn test_bracket_marker_detection() {
        assert!(fight("Giant Nut Bracket Definition").is_bracket_definition());
        assert!(!fight("Giant Nut Final").is_bracket_definition());
    }
}
