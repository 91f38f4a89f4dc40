//! Bracket expansion and round synthesis.
//!
//! A fight whose name contains [`BRACKET_MARKER`] describes a single-elimination
//! sub-tournament. [`expand_bracket`] turns it into the first round of paired
//! fights; once every one of those has a choice, [`synthesize_next_round`]
//! builds the fight the winners advance into. Both are pure functions over
//! [`Fight`](crate::fight::Fight) values, so sub-fight ids follow a fixed offset
//! scheme from the parent id rather than being allocated by the store.

pub mod expander;
pub mod synthesizer;

pub use expander::expand_bracket;
pub use synthesizer::{synthesize_next_round, RoundLabel};

use thiserror::Error;

/// Name segment that marks a fight as a bracket definition
pub const BRACKET_MARKER: &str = "Bracket Definition";

#[derive(Debug, Error, PartialEq)]
pub enum BracketError {
    #[error("fight {fight_id} is not a bracket definition")]
    NotABracket { fight_id: i64 },

    #[error("bracket {fight_id} has {count} contestants; brackets need an even number of at least two")]
    UnevenBracket { fight_id: i64, count: usize },

    #[error("bracket {fight_id} cannot advance: no choice recorded for fight {missing}")]
    MissingChoice { fight_id: i64, missing: i64 },
}
