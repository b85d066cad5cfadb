//! Cross-checking two backends against a battery of reference positions.
//!
//! The checker only reports. Every disagreement becomes a [`Divergence`];
//! nothing is reconciled or retried.

use std::collections::HashSet;
use std::fmt;

use chess_core::{Move, Position, TerminalInfo, STARTPOS};
use tracing::{debug, info};

use crate::EngineAdapter;

/// A position reached by playing `moves` from `notation`.
///
/// Positions that need history (threefold repetition) are described by the
/// moves leading to them rather than by notation alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencePosition {
    pub name: &'static str,
    pub notation: &'static str,
    pub moves: &'static [&'static str],
}

impl ReferencePosition {
    const fn at(name: &'static str, notation: &'static str) -> Self {
        ReferencePosition {
            name,
            notation,
            moves: &[],
        }
    }
}

const REFERENCE_POSITIONS: &[ReferencePosition] = &[
    ReferencePosition::at("start", STARTPOS),
    ReferencePosition {
        name: "after e2e4",
        notation: STARTPOS,
        moves: &["e2e4"],
    },
    ReferencePosition::at(
        "kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ),
    ReferencePosition::at("perft position 3", "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"),
    ReferencePosition::at(
        "perft position 4",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    ),
    ReferencePosition::at(
        "perft position 5",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ),
    ReferencePosition::at(
        "castling",
        "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1",
    ),
    ReferencePosition::at(
        "en passant",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
    ),
    ReferencePosition::at("promotion", "3r3k/4P3/8/8/8/8/8/K7 w - - 0 1"),
    ReferencePosition::at(
        "fool's mate",
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
    ),
    ReferencePosition::at("stalemate", "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"),
    ReferencePosition::at("bare kings", "8/8/8/4k3/8/8/8/4K3 w - - 0 1"),
    ReferencePosition::at("king and knight", "8/8/4k3/8/8/3N4/8/4K3 w - - 0 1"),
    // c1 and e5 are both dark squares
    ReferencePosition::at("same-colour bishops", "4k3/8/8/4b3/8/8/8/2B1K3 w - - 0 1"),
    ReferencePosition::at("knight versus rook", "4k3/3r4/8/8/8/8/8/3NK3 w - - 0 1"),
    ReferencePosition::at("fifty-move rule", "4k3/8/8/8/8/8/8/R3K3 w Q - 100 80"),
    ReferencePosition {
        name: "threefold repetition",
        notation: STARTPOS,
        moves: &[
            "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
        ],
    },
];

/// The standard battery: start, one ply in, perft positions, special moves
/// and every kind of game end.
pub fn reference_positions() -> &'static [ReferencePosition] {
    REFERENCE_POSITIONS
}

/// One way two backends disagreed about a reference position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// One backend could not set the position up at all.
    Setup {
        position: String,
        left: Result<(), String>,
        right: Result<(), String>,
    },
    Notation {
        position: String,
        left: String,
        right: String,
    },
    MoveCount {
        position: String,
        left: usize,
        right: usize,
    },
    MoveSet {
        position: String,
        only_left: Vec<Move>,
        only_right: Vec<Move>,
    },
    /// The same move led to different successor notations.
    Successor {
        position: String,
        mv: Move,
        left: String,
        right: String,
    },
    Terminal {
        position: String,
        left: TerminalInfo,
        right: TerminalInfo,
    },
    Perft {
        position: String,
        depth: u32,
        left: u64,
        right: u64,
    },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Divergence::Setup {
                position,
                left,
                right,
            } => write!(f, "{position}: setup {left:?} vs {right:?}"),
            Divergence::Notation {
                position,
                left,
                right,
            } => write!(f, "{position}: notation '{left}' vs '{right}'"),
            Divergence::MoveCount {
                position,
                left,
                right,
            } => write!(f, "{position}: {left} legal moves vs {right}"),
            Divergence::MoveSet {
                position,
                only_left,
                only_right,
            } => write!(
                f,
                "{position}: moves only left {only_left:?}, only right {only_right:?}"
            ),
            Divergence::Successor {
                position,
                mv,
                left,
                right,
            } => write!(f, "{position}: after {mv} '{left}' vs '{right}'"),
            Divergence::Terminal {
                position,
                left,
                right,
            } => write!(f, "{position}: outcome {left} vs {right}"),
            Divergence::Perft {
                position,
                depth,
                left,
                right,
            } => write!(f, "{position}: perft({depth}) {left} vs {right}"),
        }
    }
}

/// Result of a parity run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityReport {
    pub left: &'static str,
    pub right: &'static str,
    pub positions_checked: usize,
    pub divergences: Vec<Divergence>,
}

impl ParityReport {
    pub fn is_clean(&self) -> bool {
        self.divergences.is_empty()
    }
}

impl fmt::Display for ParityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} vs {}: {} positions, {} divergences",
            self.left,
            self.right,
            self.positions_checked,
            self.divergences.len()
        )?;
        for divergence in &self.divergences {
            writeln!(f, "  {divergence}")?;
        }
        Ok(())
    }
}

/// Compares two backends position by position.
pub struct ParityChecker<'a> {
    left: &'a dyn EngineAdapter,
    right: &'a dyn EngineAdapter,
    perft_depth: u32,
}

impl<'a> ParityChecker<'a> {
    /// A checker comparing perft up to depth 2.
    pub fn new(left: &'a dyn EngineAdapter, right: &'a dyn EngineAdapter) -> Self {
        ParityChecker {
            left,
            right,
            perft_depth: 2,
        }
    }

    /// Compares perft at every depth from 1 to `depth`; 0 skips perft.
    pub fn with_perft_depth(mut self, depth: u32) -> Self {
        self.perft_depth = depth;
        self
    }

    /// Checks the standard battery.
    pub fn check_battery(&self) -> ParityReport {
        self.run(reference_positions())
    }

    pub fn run(&self, positions: &[ReferencePosition]) -> ParityReport {
        let divergences: Vec<Divergence> = positions
            .iter()
            .flat_map(|reference| self.check_position(reference))
            .collect();

        info!(
            left = self.left.name(),
            right = self.right.name(),
            positions = positions.len(),
            divergences = divergences.len(),
            "parity run finished"
        );

        ParityReport {
            left: self.left.name(),
            right: self.right.name(),
            positions_checked: positions.len(),
            divergences,
        }
    }

    /// Every divergence found at one reference position.
    pub fn check_position(&self, reference: &ReferencePosition) -> Vec<Divergence> {
        let name = reference.name.to_string();
        let left = setup(self.left, reference);
        let right = setup(self.right, reference);

        let (left, right) = match (left, right) {
            (Ok(left), Ok(right)) => (left, right),
            (left, right) => {
                let divergence = Divergence::Setup {
                    position: name,
                    left: left.map(|_| ()),
                    right: right.map(|_| ()),
                };
                return report(vec![divergence]);
            }
        };

        let mut divergences = Vec::new();

        let left_notation = self.left.to_notation(&left);
        let right_notation = self.right.to_notation(&right);
        if left_notation != right_notation {
            divergences.push(Divergence::Notation {
                position: name.clone(),
                left: left_notation,
                right: right_notation,
            });
        }

        self.compare_moves(&name, &left, &right, &mut divergences);

        match (self.left.outcome(&left), self.right.outcome(&right)) {
            (Ok(l), Ok(r)) if l == r => {}
            (Ok(l), Ok(r)) => divergences.push(Divergence::Terminal {
                position: name.clone(),
                left: l,
                right: r,
            }),
            (l, r) => divergences.push(Divergence::Setup {
                position: name.clone(),
                left: l.map(|_| ()).map_err(|e| e.to_string()),
                right: r.map(|_| ()).map_err(|e| e.to_string()),
            }),
        }

        for depth in 1..=self.perft_depth {
            match (self.left.perft(&left, depth), self.right.perft(&right, depth)) {
                (Ok(l), Ok(r)) if l != r => divergences.push(Divergence::Perft {
                    position: name.clone(),
                    depth,
                    left: l,
                    right: r,
                }),
                (Ok(_), Ok(_)) => {}
                (l, r) => {
                    divergences.push(Divergence::Setup {
                        position: name.clone(),
                        left: l.map(|_| ()).map_err(|e| e.to_string()),
                        right: r.map(|_| ()).map_err(|e| e.to_string()),
                    });
                    break;
                }
            }
        }

        report(divergences)
    }

    fn compare_moves(
        &self,
        name: &str,
        left: &Position,
        right: &Position,
        divergences: &mut Vec<Divergence>,
    ) {
        let (Ok(left_moves), Ok(right_moves)) =
            (self.left.legal_moves(left), self.right.legal_moves(right))
        else {
            divergences.push(Divergence::Setup {
                position: name.to_string(),
                left: self.left.legal_moves(left).map(|_| ()).map_err(|e| e.to_string()),
                right: self.right.legal_moves(right).map(|_| ()).map_err(|e| e.to_string()),
            });
            return;
        };

        if left_moves.len() != right_moves.len() {
            divergences.push(Divergence::MoveCount {
                position: name.to_string(),
                left: left_moves.len(),
                right: right_moves.len(),
            });
        }

        let left_set: HashSet<Move> = left_moves.iter().copied().collect();
        let right_set: HashSet<Move> = right_moves.iter().copied().collect();
        if left_set != right_set {
            divergences.push(Divergence::MoveSet {
                position: name.to_string(),
                only_left: sorted(left_set.difference(&right_set)),
                only_right: sorted(right_set.difference(&left_set)),
            });
        }

        for mv in sorted(left_set.intersection(&right_set)) {
            let l = self.left.apply_move(left, mv).map(|p| self.left.to_notation(&p));
            let r = self.right.apply_move(right, mv).map(|p| self.right.to_notation(&p));
            let (l, r) = match (l, r) {
                (Ok(l), Ok(r)) => (l, r),
                (l, r) => (
                    l.unwrap_or_else(|e| e.to_string()),
                    r.unwrap_or_else(|e| e.to_string()),
                ),
            };
            if l != r {
                divergences.push(Divergence::Successor {
                    position: name.to_string(),
                    mv,
                    left: l,
                    right: r,
                });
            }
        }
    }
}

/// Loads the reference notation and plays its moves on one backend.
fn setup(adapter: &dyn EngineAdapter, reference: &ReferencePosition) -> Result<Position, String> {
    let mut position = adapter
        .from_notation(reference.notation)
        .map_err(|err| err.to_string())?;
    for uci in reference.moves {
        let mv = Move::from_uci(uci).ok_or_else(|| format!("bad move '{uci}'"))?;
        position = adapter
            .apply_move(&position, mv)
            .map_err(|err| err.to_string())?;
    }
    Ok(position)
}

fn sorted<'m>(moves: impl Iterator<Item = &'m Move>) -> Vec<Move> {
    let mut moves: Vec<Move> = moves.copied().collect();
    moves.sort_by_key(|m| m.to_uci());
    moves
}

fn report(divergences: Vec<Divergence>) -> Vec<Divergence> {
    for divergence in &divergences {
        debug!(%divergence, "parity divergence");
    }
    divergences
}
