use serde::{Deserialize, Serialize};
use std::fmt;

/// A user's pick for one fight
///
/// Persisted as the bot name, or as the empty string for an abstention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Choice {
    Bot(String),
    Abstain,
}

impl Choice {
    pub fn as_str(&self) -> &str {
        match self {
            Choice::Bot(name) => name,
            Choice::Abstain => "",
        }
    }

    pub fn is_abstain(&self) -> bool {
        matches!(self, Choice::Abstain)
    }

    /// Returns true if this choice names `bot`
    pub fn picks(&self, bot: &str) -> bool {
        matches!(self, Choice::Bot(name) if name == bot)
    }
}

impl From<String> for Choice {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Choice::Abstain
        } else {
            Choice::Bot(value)
        }
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Choice::from(value.to_string())
    }
}

impl From<Choice> for String {
    fn from(value: Choice) -> Self {
        match value {
            Choice::Bot(name) => name,
            Choice::Abstain => String::new(),
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Bot(name) => f.write_str(name),
            Choice::Abstain => f.write_str("(abstain)"),
        }
    }
}

/// Database model for the predictions table, keyed by `(user, fight)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub user: String,
    pub fight: i64,
    pub choice: Choice,
}

impl Prediction {
    pub fn new(user: impl Into<String>, fight: i64, choice: Choice) -> Self {
        Self {
            user: user.into(),
            fight,
            choice,
        }
    }
}
