//! Backend backed by the `shakmaty` rules library.

use chess_core::{Color, Move, Notation, Piece, Position, Square, TerminalInfo, TerminalReason};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position as _, Role};
use tracing::debug;

use crate::{AdapterError, EngineAdapter};

/// Adapter over [`shakmaty`].
///
/// Notation goes through the shared strict parser before shakmaty sees it,
/// so both backends reject the same malformed strings. Moves are applied by
/// looking up shakmaty's own legal move with the requested squares and
/// promotion, never by constructing a library move directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShakmatyAdapter;

impl ShakmatyAdapter {
    pub const NAME: &'static str = "third-party";

    pub fn new() -> Self {
        ShakmatyAdapter
    }

    fn load(&self, notation: &str) -> Result<Chess, AdapterError> {
        self.try_load(notation).map_err(|reason| {
            debug!(backend = Self::NAME, notation, %reason, "rejected notation");
            AdapterError::malformed(notation, reason)
        })
    }

    fn try_load(&self, notation: &str) -> Result<Chess, String> {
        Notation::parse(notation).map_err(|err| err.to_string())?;
        let fen = notation.parse::<Fen>().map_err(|err| err.to_string())?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|err| err.to_string())
    }

    fn legal_pairs(pos: &Chess) -> Vec<(Move, shakmaty::Move)> {
        pos.legal_moves()
            .into_iter()
            .filter_map(|m| to_core_move(&m).map(|core| (core, m)))
            .collect()
    }
}

/// The notation shakmaty writes for `pos`. The en-passant square is kept
/// after every double push, as the native engine does.
fn to_notation(pos: &Chess) -> String {
    Fen::from_position(pos.clone(), EnPassantMode::Always).to_string()
}

fn to_core_square(sq: shakmaty::Square) -> Option<Square> {
    Square::from_index(sq as u8)
}

fn to_core_color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn to_core_piece(role: Role) -> Piece {
    match role {
        Role::Pawn => Piece::Pawn,
        Role::Knight => Piece::Knight,
        Role::Bishop => Piece::Bishop,
        Role::Rook => Piece::Rook,
        Role::Queen => Piece::Queen,
        Role::King => Piece::King,
    }
}

/// Converts a library move to its long-algebraic form. Castling comes out
/// as the king's two-square step.
fn to_core_move(m: &shakmaty::Move) -> Option<Move> {
    match m.to_uci(CastlingMode::Standard) {
        UciMove::Normal {
            from,
            to,
            promotion,
        } => Some(Move::new(
            to_core_square(from)?,
            to_core_square(to)?,
            promotion.map(to_core_piece),
        )),
        _ => None,
    }
}

fn perft_count(pos: &Chess, depth: u32) -> u64 {
    shakmaty::perft(pos, depth)
}

impl EngineAdapter for ShakmatyAdapter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn initial_state(&self) -> Position {
        Position::from_notation(&to_notation(&Chess::default()))
            .unwrap_or_else(|_| Position::startpos())
    }

    fn legal_moves(&self, position: &Position) -> Result<Vec<Move>, AdapterError> {
        let pos = self.load(position.notation())?;
        Ok(Self::legal_pairs(&pos).into_iter().map(|(m, _)| m).collect())
    }

    fn apply_move(&self, position: &Position, mv: Move) -> Result<Position, AdapterError> {
        let pos = self.load(position.notation())?;
        let found = Self::legal_pairs(&pos).into_iter().find(|(m, _)| *m == mv);
        let Some((_, library_move)) = found else {
            debug!(backend = Self::NAME, notation = position.notation(), uci = %mv, "illegal move");
            return Err(AdapterError::illegal(mv, position.notation()));
        };

        let next = pos
            .play(&library_move)
            .map_err(|_| AdapterError::illegal(mv, position.notation()))?;
        let notation = to_notation(&next);
        let successor = position
            .successor(&notation)
            .map_err(|err| AdapterError::malformed(&notation, err))?;
        let moves: Vec<Move> = Self::legal_pairs(&next)
            .into_iter()
            .map(|(m, _)| m)
            .collect();
        Ok(successor.with_legal_moves(moves))
    }

    fn outcome(&self, position: &Position) -> Result<TerminalInfo, AdapterError> {
        let pos = self.load(position.notation())?;

        let info = if pos.is_checkmate() {
            TerminalInfo::checkmate(to_core_color(pos.turn()).opposite())
        } else if pos.is_stalemate() {
            TerminalInfo::draw(TerminalReason::Stalemate)
        } else if pos.is_insufficient_material() {
            TerminalInfo::draw(TerminalReason::InsufficientMaterial)
        } else if pos.halfmoves() >= 100 {
            TerminalInfo::draw(TerminalReason::FiftyMoveRule)
        } else if position.repetition_count() >= 3 {
            TerminalInfo::draw(TerminalReason::Repetition)
        } else {
            TerminalInfo::ONGOING
        };
        Ok(info)
    }

    fn from_notation(&self, notation: &str) -> Result<Position, AdapterError> {
        let pos = self.load(notation)?;
        Position::from_notation(&to_notation(&pos))
            .map_err(|err| AdapterError::malformed(notation, err))
    }

    fn perft(&self, position: &Position, depth: u32) -> Result<u64, AdapterError> {
        Ok(perft_count(&self.load(position.notation())?, depth))
    }

    fn perft_divide(
        &self,
        position: &Position,
        depth: u32,
    ) -> Result<Vec<(Move, u64)>, AdapterError> {
        if depth == 0 {
            return Ok(Vec::new());
        }
        let pos = self.load(position.notation())?;
        let mut results = Vec::new();
        for (mv, library_move) in Self::legal_pairs(&pos) {
            let next = pos
                .clone()
                .play(&library_move)
                .map_err(|_| AdapterError::illegal(mv, position.notation()))?;
            results.push((mv, perft_count(&next, depth - 1)));
        }
        results.sort_by_key(|(m, _)| m.to_uci());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::STARTPOS;

    #[test]
    fn start_position() {
        let adapter = ShakmatyAdapter::new();
        let start = adapter.initial_state();
        assert_eq!(start.notation(), STARTPOS);
        assert_eq!(adapter.legal_moves(&start).unwrap().len(), 20);
    }

    #[test]
    fn castling_is_reported_as_king_step() {
        let position = ShakmatyAdapter
            .from_notation("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .unwrap();
        let moves: Vec<String> = ShakmatyAdapter
            .legal_moves(&position)
            .unwrap()
            .iter()
            .map(|m| m.to_uci())
            .collect();
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
        assert!(!moves.contains(&"e1h1".to_string()));
    }

    #[test]
    fn en_passant_square_is_always_written() {
        let next = ShakmatyAdapter
            .apply_move(&Position::startpos(), Move::from_uci("e2e4").unwrap())
            .unwrap();
        assert_eq!(
            next.notation(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn strict_field_count() {
        // shakmaty alone would accept the short form
        assert!(matches!(
            ShakmatyAdapter.from_notation("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"),
            Err(AdapterError::MalformedNotation { .. })
        ));
    }

    #[test]
    fn checkmate_winner() {
        let position = ShakmatyAdapter
            .from_notation("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        assert_eq!(
            ShakmatyAdapter.outcome(&position).unwrap(),
            TerminalInfo::checkmate(Color::Black)
        );
    }
}
