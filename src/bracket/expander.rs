use std::collections::VecDeque;

use super::{BracketError, BRACKET_MARKER};
use crate::fight::Fight;

/// Expands a bracket definition into its first-round fights
///
/// Seeds are paired from both ends of the list (1 vs N, 2 vs N-1, ...). Sub-fight
/// `i` gets id `bracket.id + i + 1` and the bracket's name with the marker removed,
/// suffixed with `i + 1` unless the bracket is a single pairing. Every sub-fight
/// keeps both contestants as paired, including empty names left by abstentions.
pub fn expand_bracket(bracket: &Fight) -> Result<Vec<Fight>, BracketError> {
    let marker_at = bracket
        .name
        .find(BRACKET_MARKER)
        .ok_or(BracketError::NotABracket {
            fight_id: bracket.id,
        })?;

    let count = bracket.bots.len();
    if count < 2 || count % 2 != 0 {
        return Err(BracketError::UnevenBracket {
            fight_id: bracket.id,
            count,
        });
    }

    let base = bracket.name[..marker_at].trim_end();
    let mut remaining: VecDeque<&String> = bracket.bots.iter().collect();
    let mut fights = Vec::with_capacity(count / 2);

    while let (Some(front), Some(back)) = (remaining.pop_front(), remaining.pop_back()) {
        let number = fights.len() + 1;
        let name = match (count, base.is_empty()) {
            (2, _) => base.to_string(),
            (_, true) => number.to_string(),
            (_, false) => format!("{} {}", base, number),
        };
        fights.push(Fight::new(
            bracket.id + number as i64,
            name,
            vec![front.clone(), back.clone()],
            bracket.deadline,
        ));
    }

    Ok(fights)
}
