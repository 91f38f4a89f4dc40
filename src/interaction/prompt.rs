use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::fight::Fight;
use crate::prediction::Choice;

pub const ABSTAIN_MARKER: &str = "❌";
pub const SELECTED_ARROW: &str = "⬅️";

/// Option markers shown next to each contestant; their count caps a fight's size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum OptionMarker {
    #[strum(to_string = "🇦")]
    A,
    #[strum(to_string = "🇧")]
    B,
    #[strum(to_string = "🇨")]
    C,
    #[strum(to_string = "🇩")]
    D,
    #[strum(to_string = "🇪")]
    E,
    #[strum(to_string = "🇫")]
    F,
}

impl OptionMarker {
    pub fn capacity() -> usize {
        OptionMarker::iter().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptOption {
    pub marker: String,
    pub bot: String,
    pub selected: bool,
}

/// One fight as presented to the user, with the current choice marked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightPrompt {
    pub fight_id: i64,
    pub title: String,
    pub options: Vec<PromptOption>,
    pub abstain_selected: bool,
}

impl FightPrompt {
    /// Returns `None` if the fight has more contestants than there are markers
    pub fn new(fight: &Fight, current: Option<&Choice>) -> Option<Self> {
        if fight.bots.len() > OptionMarker::capacity() {
            return None;
        }

        let options = OptionMarker::iter()
            .zip(&fight.bots)
            .map(|(marker, bot)| PromptOption {
                marker: marker.to_string(),
                bot: bot.clone(),
                selected: current.is_some_and(|choice| choice.picks(bot)),
            })
            .collect();

        Some(Self {
            fight_id: fight.id,
            title: format!("Who will win {}?", fight.name),
            options,
            abstain_selected: current.map_or(true, Choice::is_abstain),
        })
    }

    /// Marks `choice` as the selected option
    pub fn with_choice(mut self, choice: &Choice) -> Self {
        for option in &mut self.options {
            option.selected = choice.picks(&option.bot);
        }
        self.abstain_selected = choice.is_abstain();
        self
    }

    /// Maps a selected option index back to a choice
    pub fn choice_for(&self, option: Option<usize>) -> Option<Choice> {
        match option {
            None => Some(Choice::Abstain),
            Some(index) => self
                .options
                .get(index)
                .map(|option| Choice::from(option.bot.clone())),
        }
    }

    /// Plain-text body, one line per option plus the abstain line
    pub fn description(&self) -> String {
        let mut lines: Vec<String> = self
            .options
            .iter()
            .map(|option| {
                let arrow = if option.selected { SELECTED_ARROW } else { "" };
                format!("{} {} {}", option.marker, option.bot, arrow)
                    .trim_end()
                    .to_string()
            })
            .collect();

        let arrow = if self.abstain_selected {
            format!(" {}", SELECTED_ARROW)
        } else {
            String::new()
        };
        lines.push(format!("{} Abstain (automatic 0){}", ABSTAIN_MARKER, arrow));
        lines.join("\n")
    }
}
