//! Game-over detection.

use crate::movegen::{generate_moves, is_king_attacked};
use crate::{Bitboard, Board};
use chess_core::{Color, Piece, TerminalInfo, TerminalReason};

/// Halfmove clock value at which the fifty-move rule ends the game.
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Occurrences of the same position that end the game by repetition.
pub const REPETITION_LIMIT: usize = 3;

/// Classifies `board`, given how many times it has occurred in the game.
///
/// Checks run in a fixed order and the first that applies wins:
/// checkmate, stalemate, insufficient material, the fifty-move rule,
/// repetition.
pub fn classify(board: &Board, occurrences: usize) -> TerminalInfo {
    let us = board.side_to_move;

    if generate_moves(board).is_empty() {
        return if is_king_attacked(board, us) {
            TerminalInfo::checkmate(us.opposite())
        } else {
            TerminalInfo::draw(TerminalReason::Stalemate)
        };
    }

    if is_insufficient_material(board) {
        TerminalInfo::draw(TerminalReason::InsufficientMaterial)
    } else if board.halfmove_clock >= FIFTY_MOVE_HALFMOVES {
        TerminalInfo::draw(TerminalReason::FiftyMoveRule)
    } else if occurrences >= REPETITION_LIMIT {
        TerminalInfo::draw(TerminalReason::Repetition)
    } else {
        TerminalInfo::ONGOING
    }
}

/// Whether neither side can ever deliver mate.
pub fn is_insufficient_material(board: &Board) -> bool {
    has_insufficient_material(board, Color::White) && has_insufficient_material(board, Color::Black)
}

/// Whether `color` lacks the material to mate, whatever the opponent does.
///
/// Pawns, rooks and queens are always enough. Knights are not when the
/// side has at most two pieces in total and the opponent has nothing but
/// king and queens. Bishops alone are not when all of them stand on one
/// square colour and no pawns or knights remain on the board.
pub fn has_insufficient_material(board: &Board, color: Color) -> bool {
    let ours = board.colors[color.index()];
    let theirs = board.colors[color.opposite().index()];
    let of_kind = |piece: Piece| board.pieces[piece.index()];
    let kings = of_kind(Piece::King);
    let queens = of_kind(Piece::Queen);

    if (ours & (of_kind(Piece::Pawn) | of_kind(Piece::Rook) | queens)).is_not_empty() {
        return false;
    }

    if (ours & of_kind(Piece::Knight)).is_not_empty() {
        return ours.count() <= 2 && (theirs & !kings & !queens).is_empty();
    }

    let bishops = of_kind(Piece::Bishop);
    if (ours & bishops).is_not_empty() {
        let same_colour = (bishops & Bitboard::DARK_SQUARES).is_empty()
            || (bishops & Bitboard::LIGHT_SQUARES).is_empty();
        return same_colour && (of_kind(Piece::Pawn) | of_kind(Piece::Knight)).is_empty();
    }

    true
}
