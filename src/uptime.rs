use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::shared::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uptime {
    pub seconds: u64,
    pub display: String,
}

/// GET /uptime
pub async fn uptime(State(state): State<AppState>) -> Json<Uptime> {
    let elapsed = state.started_at.elapsed();
    Json(Uptime {
        seconds: elapsed.as_secs(),
        display: format!("🕒 Uptime: {}", format_duration(elapsed)),
    })
}

/// Renders the non-zero units, e.g. "1 day, 2 hours, 5 seconds"
pub fn format_duration(duration: Duration) -> String {
    const UNITS: [(&str, u64); 4] = [("day", 86_400), ("hour", 3_600), ("minute", 60), ("second", 1)];

    let mut remaining = duration.as_secs();
    let parts: Vec<String> = UNITS
        .iter()
        .filter_map(|(unit, size)| {
            let value = remaining / size;
            remaining %= size;
            match value {
                0 => None,
                1 => Some(format!("1 {}", unit)),
                n => Some(format!("{} {}s", n, unit)),
            }
        })
        .collect();

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0 seconds")]
    #[case(1, "1 second")]
    #[case(61, "1 minute, 1 second")]
    #[case(3_600, "1 hour")]
    #[case(93_784, "1 day, 2 hours, 3 minutes, 4 seconds")]
    fn test_format_duration(#[case] secs: u64, #[case] expected: &str) {
        assert_eq!(format_duration(Duration::from_secs(secs)), expected);
    }
}
