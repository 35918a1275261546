//! Core domain types for the word-chain game.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator};
use tracing::instrument;

/// Topic a session is played under.
///
/// Fixed when the session starts and never changes afterwards.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Theme {
    /// Any standard word is acceptable.
    #[default]
    #[display("Bebas")]
    Any,
    /// Animals.
    #[display("Hewan")]
    Animals,
    /// Fruits and vegetables.
    #[display("Buah & Sayur")]
    FruitsVegetables,
    /// Countries and cities.
    #[display("Negara & Kota")]
    Places,
    /// Inanimate objects.
    #[display("Benda Mati")]
    Objects,
    /// Jobs and professions.
    #[display("Pekerjaan/Profesi")]
    Jobs,
}

impl Theme {
    /// Returns every theme in menu order.
    pub fn all() -> Vec<Theme> {
        Theme::iter().collect()
    }

    /// Returns the theme after this one, wrapping around.
    pub fn next(self) -> Self {
        Theme::iter()
            .cycle()
            .skip_while(|t| *t != self)
            .nth(1)
            .unwrap_or_default()
    }

    /// Returns the theme before this one, wrapping around.
    pub fn previous(self) -> Self {
        Theme::iter()
            .rev()
            .cycle()
            .skip_while(|t| *t != self)
            .nth(1)
            .unwrap_or_default()
    }

    /// True for the unrestricted theme.
    pub fn is_open(self) -> bool {
        self == Theme::Any
    }
}

/// A participant slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum PlayerId {
    /// First human; always moves first.
    #[display("Player 1")]
    Human1,
    /// Second human in pass-and-play.
    #[display("Player 2")]
    Human2,
    /// The oracle-backed opponent.
    #[display("AI")]
    Machine,
}

impl PlayerId {
    /// True if this slot is driven by the oracle.
    pub fn is_machine(self) -> bool {
        self == PlayerId::Machine
    }
}

/// Which participants play and how turns alternate.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Mode {
    /// No session in progress.
    #[default]
    #[display("Menu")]
    Menu,
    /// Two humans sharing one input.
    #[display("Local Duel")]
    #[strum(serialize = "local", serialize = "local-two-player")]
    LocalTwoPlayer,
    /// One human against the machine.
    #[display("AI Challenger")]
    #[strum(serialize = "versus-machine", serialize = "ai")]
    VersusMachine,
}

impl Mode {
    /// True for modes that describe a playable session.
    pub fn is_playable(self) -> bool {
        self != Mode::Menu
    }

    /// The player who opens a session in this mode.
    pub fn first_player(self) -> PlayerId {
        PlayerId::Human1
    }

    /// The player who moves after `player`, or `None` if `player` does not
    /// take part in this mode.
    #[instrument]
    pub fn next_player(self, player: PlayerId) -> Option<PlayerId> {
        match (self, player) {
            (Mode::LocalTwoPlayer, PlayerId::Human1) => Some(PlayerId::Human2),
            (Mode::LocalTwoPlayer, PlayerId::Human2) => Some(PlayerId::Human1),
            (Mode::VersusMachine, PlayerId::Human1) => Some(PlayerId::Machine),
            (Mode::VersusMachine, PlayerId::Machine) => Some(PlayerId::Human1),
            _ => None,
        }
    }

    /// The player who wins when `player` loses. With two participants per
    /// mode this is the same as [`Mode::next_player`].
    pub fn opponent_of(self, player: PlayerId) -> Option<PlayerId> {
        self.next_player(player)
    }

    /// Whether `player` takes part in this mode.
    pub fn includes(self, player: PlayerId) -> bool {
        self.next_player(player).is_some()
    }
}

/// Creation-ordered identifier of a committed move, unique within a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{}", _0)]
pub struct MoveId(pub u64);

/// A committed word in the chain. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MoveRecord {
    /// Sequence id.
    id: MoveId,
    /// Normalized lowercase token.
    word: String,
    /// Who played it.
    author: PlayerId,
    /// When it was committed.
    created_at: DateTime<Utc>,
}

impl MoveRecord {
    /// Creates a record stamped with the current time.
    pub fn new(id: MoveId, word: impl Into<String>, author: PlayerId) -> Self {
        Self {
            id,
            word: word.into(),
            author,
            created_at: Utc::now(),
        }
    }

    /// Final character of the word, lowercased.
    pub fn last_letter(&self) -> Option<char> {
        last_letter(&self.word)
    }
}

/// Lowercased final character of `word`.
pub fn last_letter(word: &str) -> Option<char> {
    word.chars().last().and_then(|c| c.to_lowercase().next())
}

/// Lowercased first character of `word`.
pub fn first_letter(word: &str) -> Option<char> {
    word.chars().next().and_then(|c| c.to_lowercase().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_versus_machine_alternates_with_human() {
        let mode = Mode::VersusMachine;
        assert_eq!(mode.first_player(), PlayerId::Human1);
        assert_eq!(mode.next_player(PlayerId::Human1), Some(PlayerId::Machine));
        assert_eq!(mode.next_player(PlayerId::Machine), Some(PlayerId::Human1));
        assert_eq!(mode.next_player(PlayerId::Human2), None);
    }

    #[test]
    fn test_local_mode_has_no_machine() {
        let mode = Mode::LocalTwoPlayer;
        assert_eq!(mode.opponent_of(PlayerId::Human2), Some(PlayerId::Human1));
        assert!(!mode.includes(PlayerId::Machine));
        assert!(!Mode::Menu.includes(PlayerId::Human1));
        assert!(Mode::VersusMachine.includes(PlayerId::Machine));
    }

    #[test]
    fn test_theme_cycle_wraps() {
        assert_eq!(Theme::Jobs.next(), Theme::Any);
        assert_eq!(Theme::Any.previous(), Theme::Jobs);
        assert_eq!(Theme::all().len(), 6);
    }

    #[test]
    fn test_theme_cycle_visits_every_theme_in_menu_order() {
        let mut forward = vec![Theme::Any];
        let mut backward = vec![Theme::Any];
        for _ in 0..5 {
            forward.push(forward[forward.len() - 1].next());
            backward.push(backward[backward.len() - 1].previous());
        }
        assert_eq!(forward, Theme::all());
        backward[1..].reverse();
        assert_eq!(backward, Theme::all());
        assert_eq!(Theme::Places.next().previous(), Theme::Places);
    }

    #[test]
    fn test_slugs_parse() {
        assert_eq!(Theme::from_str("fruits-vegetables").unwrap(), Theme::FruitsVegetables);
        assert_eq!(Theme::from_str("Animals").unwrap(), Theme::Animals);
        assert_eq!(Mode::from_str("local").unwrap(), Mode::LocalTwoPlayer);
        assert_eq!(Mode::from_str("versus-machine").unwrap(), Mode::VersusMachine);
        assert!(Theme::from_str("dinosaurs").is_err());
    }

    #[test]
    fn test_letters_are_lowercased() {
        assert_eq!(last_letter("KucinG"), Some('g'));
        assert_eq!(first_letter("Gajah"), Some('g'));
        assert_eq!(last_letter(""), None);
    }
}
