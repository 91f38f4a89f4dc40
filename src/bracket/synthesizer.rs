use std::collections::BTreeMap;
use std::fmt;

use super::{BracketError, BRACKET_MARKER};
use crate::fight::Fight;
use crate::prediction::Choice;

/// Name of the round a bracket's winners advance into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundLabel {
    RoundOf(usize),
    Quarterfinals,
    Semifinals,
    Final,
    Bounty,
}

impl RoundLabel {
    /// Label for a round entered by `advancing` contestants
    pub fn for_advancing(advancing: usize) -> Self {
        match advancing {
            n if n >= 16 => RoundLabel::RoundOf(n),
            8 => RoundLabel::Quarterfinals,
            4 => RoundLabel::Semifinals,
            2 => RoundLabel::Final,
            _ => RoundLabel::Bounty,
        }
    }
}

impl fmt::Display for RoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundLabel::RoundOf(n) => write!(f, "Round of {}", n),
            RoundLabel::Quarterfinals => f.write_str("Quarterfinals"),
            RoundLabel::Semifinals => f.write_str("Semifinals"),
            RoundLabel::Final => f.write_str("Final"),
            RoundLabel::Bounty => f.write_str("Bounty"),
        }
    }
}

/// Builds the fight that a resolved bracket round feeds into
///
/// Returns `None` for a single-pairing bracket, which is already the last fight.
/// The next round takes id `bracket.id + ceil(n / 2) + 1` and the choices of
/// sub-fights `bracket.id + 1 ..= bracket.id + n / 2` as its bots. It stays a
/// bracket definition while an even number greater than two advance; otherwise
/// the marker is dropped and it is presented as a single fight.
pub fn synthesize_next_round(
    bracket: &Fight,
    choices: &BTreeMap<i64, Choice>,
) -> Result<Option<Fight>, BracketError> {
    let count = bracket.bots.len();
    if count <= 2 {
        return Ok(None);
    }

    let pairings = count.div_ceil(2) as i64;
    let bots = (1..=pairings)
        .map(|offset| {
            let fight_id = bracket.id + offset;
            choices
                .get(&fight_id)
                .map(|choice| choice.as_str().to_string())
                .ok_or(BracketError::MissingChoice {
                    fight_id: bracket.id,
                    missing: fight_id,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let advancing = count / 2;
    let label = RoundLabel::for_advancing(advancing);
    let keeps_marker = advancing > 2 && advancing % 2 == 0;

    Ok(Some(Fight::new(
        bracket.id + pairings + 1,
        next_round_name(&bracket.name, label, keeps_marker),
        bots,
        bracket.deadline,
    )))
}

/// Replaces the round word before the marker with the round label
fn next_round_name(name: &str, label: RoundLabel, keeps_marker: bool) -> String {
    let Some(marker_at) = name.find(BRACKET_MARKER) else {
        return format!("{} {}", name, label);
    };

    let prefix = name[..marker_at].trim_end();
    let suffix = &name[marker_at + BRACKET_MARKER.len()..];
    let kept = without_round_word(prefix);

    let mut parts = Vec::with_capacity(3);
    if !kept.is_empty() {
        parts.push(kept.to_string());
    }
    parts.push(label.to_string());
    if keeps_marker {
        parts.push(BRACKET_MARKER.to_string());
    }

    format!("{}{}", parts.join(" "), suffix)
}

/// Drops the trailing round word, treating "Round of <n>" as one word
fn without_round_word(prefix: &str) -> &str {
    if let Some(at) = prefix.rfind("Round of ") {
        let size = &prefix[at + "Round of ".len()..];
        if !size.is_empty() && size.chars().all(|c| c.is_ascii_digit()) {
            return prefix[..at].trim_end();
        }
    }
    prefix.rfind(' ').map(|space| &prefix[..space]).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn bracket(id: i64, name: &str, count: usize) -> Fight {
        Fight::new(
            id,
            name,
            (1..=count).map(|seed| format!("Bot {}", seed)).collect(),
            Utc::now(),
        )
    }

    fn winners(parent: &Fight) -> BTreeMap<i64, Choice> {
        (1..=(parent.bots.len() / 2) as i64)
            .map(|offset| {
                (
                    parent.id + offset,
                    Choice::from(format!("Winner {}", offset)),
                )
            })
            .collect()
    }

    #[rstest]
    #[case(2, "Final")]
    #[case(4, "Semifinals")]
    #[case(8, "Quarterfinals")]
    #[case(16, "Round of 16")]
    #[case(32, "Round of 32")]
    #[case(3, "Bounty")]
    #[case(6, "Bounty")]
    fn test_round_labels(#[case] advancing: usize, #[case] expected: &str) {
        assert_eq!(RoundLabel::for_advancing(advancing).to_string(), expected);
    }

    #[test]
    fn test_four_bot_bracket_advances_to_final() {
        let parent = bracket(10, "R1 Bracket Definition", 4);
        let mut choices = BTreeMap::new();
        choices.insert(11, Choice::from("A"));
        choices.insert(12, Choice::from("B"));

        let next = synthesize_next_round(&parent, &choices).unwrap().unwrap();

        assert_eq!(next.id, 13);
        assert_eq!(next.name, "Final");
        assert_eq!(next.bots, vec!["A", "B"]);
        assert_eq!(next.deadline, parent.deadline);
        assert!(!next.is_bracket_definition());
    }

    #[test]
    fn test_larger_rounds_stay_brackets() {
        let parent = bracket(100, "Giant Nut Round of 32 Bracket Definition", 16);
        let next = synthesize_next_round(&parent, &winners(&parent)).unwrap().unwrap();

        assert_eq!(next.id, 109);
        assert_eq!(next.name, "Giant Nut Quarterfinals Bracket Definition");
        assert_eq!(next.bots.len(), 8);
        assert!(next.is_bracket_definition());
    }

    #[test]
    fn test_round_word_is_replaced() {
        let parent = bracket(1, "Giant Nut R1 Bracket Definition", 8);
        let next = synthesize_next_round(&parent, &winners(&parent)).unwrap().unwrap();
        assert_eq!(next.name, "Giant Nut Semifinals Bracket Definition");
        assert_eq!(next.bots, vec!["Winner 1", "Winner 2", "Winner 3", "Winner 4"]);
    }

    #[test]
    fn test_odd_advancing_count_becomes_bounty_fight() {
        let parent = bracket(20, "Rumble R1 Bracket Definition", 6);
        let next = synthesize_next_round(&parent, &winners(&parent)).unwrap().unwrap();

        assert_eq!(next.id, 24);
        assert_eq!(next.name, "Rumble Bounty");
        assert_eq!(next.bots.len(), 3);
        assert!(!next.is_bracket_definition());
    }

    #[test]
    fn test_single_pairing_has_no_next_round() {
        let parent = bracket(10, "Final Bracket Definition", 2);
        assert_eq!(synthesize_next_round(&parent, &BTreeMap::new()), Ok(None));
    }

    #[test]
    fn test_abstention_advances_as_empty_name() {
        let parent = bracket(10, "R1 Bracket Definition", 4);
        let mut choices = BTreeMap::new();
        choices.insert(11, Choice::Abstain);
        choices.insert(12, Choice::from("B"));

        let next = synthesize_next_round(&parent, &choices).unwrap().unwrap();
        assert_eq!(next.bots, vec!["", "B"]);
    }

    #[test]
    fn test_missing_choice_is_rejected() {
        let parent = bracket(10, "R1 Bracket Definition", 4);
        let mut choices = BTreeMap::new();
        choices.insert(11, Choice::from("A"));

        assert_eq!(
            synthesize_next_round(&parent, &choices),
            Err(BracketError::MissingChoice {
                fight_id: 10,
                missing: 12
            })
        );
    }
}
