//! Game-over classification shared by all backends.

use crate::Color;
use std::fmt;

/// Result of the game at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl Outcome {
    /// The decisive outcome in favour of `winner`.
    pub const fn win_for(winner: Color) -> Self {
        match winner {
            Color::White => Outcome::WhiteWins,
            Color::Black => Outcome::BlackWins,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Outcome::WhiteWins => "white_wins",
            Outcome::BlackWins => "black_wins",
            Outcome::Draw => "draw",
            Outcome::Ongoing => "ongoing",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a game ended, from a fixed vocabulary every backend reports in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    /// Halfmove clock reached 100.
    FiftyMoveRule,
    /// The position occurred for the third time.
    Repetition,
    /// A draw with no more specific reason.
    Draw,
    Ongoing,
}

impl TerminalReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            TerminalReason::Checkmate => "checkmate",
            TerminalReason::Stalemate => "stalemate",
            TerminalReason::InsufficientMaterial => "insufficient_material",
            TerminalReason::FiftyMoveRule => "fifty_move_rule",
            TerminalReason::Repetition => "repetition",
            TerminalReason::Draw => "draw",
            TerminalReason::Ongoing => "ongoing",
        }
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal classification of a position.
///
/// The constructors only build consistent pairs: a win is always a
/// checkmate, a draw always carries a draw reason, and "ongoing" goes with
/// "ongoing". [`is_terminal`](TerminalInfo::is_terminal) is derived from the
/// outcome, so it cannot disagree with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerminalInfo {
    outcome: Outcome,
    reason: TerminalReason,
}

impl TerminalInfo {
    pub const ONGOING: TerminalInfo = TerminalInfo {
        outcome: Outcome::Ongoing,
        reason: TerminalReason::Ongoing,
    };

    /// The side to move is mated; `winner` is the other side.
    pub const fn checkmate(winner: Color) -> Self {
        TerminalInfo {
            outcome: Outcome::win_for(winner),
            reason: TerminalReason::Checkmate,
        }
    }

    /// A drawn position. Non-draw reasons collapse to the generic
    /// [`TerminalReason::Draw`].
    pub const fn draw(reason: TerminalReason) -> Self {
        let reason = match reason {
            TerminalReason::Checkmate | TerminalReason::Ongoing => TerminalReason::Draw,
            other => other,
        };
        TerminalInfo {
            outcome: Outcome::Draw,
            reason,
        }
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self.outcome, Outcome::Ongoing)
    }

    #[inline]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[inline]
    pub const fn reason(&self) -> TerminalReason {
        self.reason
    }
}

impl Default for TerminalInfo {
    fn default() -> Self {
        Self::ONGOING
    }
}

impl fmt::Display for TerminalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.outcome, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ongoing_is_not_terminal() {
        let info = TerminalInfo::ONGOING;
        assert!(!info.is_terminal());
        assert_eq!(info.reason(), TerminalReason::Ongoing);
        assert_eq!(TerminalInfo::default(), info);
    }

    #[test]
    fn checkmate_names_the_winner() {
        let info = TerminalInfo::checkmate(Color::Black);
        assert!(info.is_terminal());
        assert_eq!(info.outcome(), Outcome::BlackWins);
        assert_eq!(info.reason().as_str(), "checkmate");
    }

    #[test]
    fn draw_never_carries_a_win_reason() {
        assert_eq!(
            TerminalInfo::draw(TerminalReason::Checkmate).reason(),
            TerminalReason::Draw
        );
        assert_eq!(
            TerminalInfo::draw(TerminalReason::Ongoing).reason(),
            TerminalReason::Draw
        );
        let info = TerminalInfo::draw(TerminalReason::Repetition);
        assert!(info.is_terminal());
        assert_eq!(info.outcome(), Outcome::Draw);
    }

    #[test]
    fn vocabulary_strings() {
        let reasons = [
            TerminalReason::Checkmate,
            TerminalReason::Stalemate,
            TerminalReason::InsufficientMaterial,
            TerminalReason::FiftyMoveRule,
            TerminalReason::Repetition,
            TerminalReason::Draw,
            TerminalReason::Ongoing,
        ];
        let names: Vec<&str> = reasons.iter().map(|r| r.as_str()).collect();
        assert_eq!(
            names,
            [
                "checkmate",
                "stalemate",
                "insufficient_material",
                "fifty_move_rule",
                "repetition",
                "draw",
                "ongoing"
            ]
        );
        assert_eq!(
            TerminalInfo::checkmate(Color::White).to_string(),
            "white_wins (checkmate)"
        );
    }
}
