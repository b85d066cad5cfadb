//! Move generation.
//!
//! Moves are generated pseudo-legally and then filtered by playing each one
//! and checking whether the mover's king is left attacked.

mod attacks;
pub mod perft;

use crate::{Bitboard, Board, MoveFlag, PackedMove};
use chess_core::{Color, Move, Piece, Rank, Square};

pub use attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so a fixed-size array
/// avoids heap allocation during generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [PackedMove; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const MAX_MOVES: usize = 256;

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [PackedMove::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: PackedMove) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[PackedMove] {
        &self.moves[..self.len]
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&PackedMove) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }

    /// The moves as plain [`Move`] values, in generation order.
    pub fn to_moves(&self) -> Vec<Move> {
        self.as_slice().iter().map(|m| m.to_move()).collect()
    }

    /// Finds the generated move `m` describes.
    pub fn find(&self, m: Move) -> Option<PackedMove> {
        self.as_slice().iter().copied().find(|p| p.matches(m))
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = PackedMove;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a PackedMove;
    type IntoIter = std::slice::Iter<'a, PackedMove>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all legal moves for the given board.
pub fn generate_moves(board: &Board) -> MoveList {
    let mut moves = MoveList::new();

    generate_pawn_moves(board, &mut moves);
    generate_piece_moves(board, &mut moves);
    generate_castling_moves(board, &mut moves);

    let us = board.side_to_move;
    moves.retain(|m| !is_king_attacked(&make_move(board, *m), us));

    moves
}

/// Pushes the four promotions, or the plain move when `to` is not on the
/// last rank.
fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, promo_rank: Rank) {
    if to.rank() == promo_rank {
        for flag in MoveFlag::PROMOTIONS {
            moves.push(PackedMove::new(from, to, flag));
        }
    } else {
        moves.push(PackedMove::normal(from, to));
    }
}

fn generate_pawn_moves(board: &Board, moves: &mut MoveList) {
    let us = board.side_to_move;
    let their_pieces = board.colors[us.opposite().index()];
    let empty = !board.occupied();
    let pawns = board.pieces_of(Piece::Pawn, us);

    let (forward, promo_rank, start_rank) = match us {
        Color::White => (1i8, Rank::R8, Bitboard::RANK_2),
        Color::Black => (-1i8, Rank::R1, Bitboard::RANK_7),
    };
    let advance = |bb: Bitboard| match us {
        Color::White => bb.north(),
        Color::Black => bb.south(),
    };

    let single_pushes = advance(pawns) & empty;
    for to in single_pushes {
        if let Some(from) = to.offset_rank(-forward) {
            push_pawn_move(moves, from, to, promo_rank);
        }
    }

    let double_pushes = advance(advance(pawns & start_rank) & empty) & empty;
    for to in double_pushes {
        if let Some(from) = to.offset_rank(-2 * forward) {
            moves.push(PackedMove::new(from, to, MoveFlag::DoublePush));
        }
    }

    for from in pawns {
        for to in pawn_attacks(from, us) & their_pieces {
            push_pawn_move(moves, from, to, promo_rank);
        }
    }

    if let Some(ep_square) = board.en_passant {
        for from in pawns {
            if pawn_attacks(from, us).contains(ep_square) {
                moves.push(PackedMove::new(from, ep_square, MoveFlag::EnPassant));
            }
        }
    }
}

/// Knight, bishop, rook, queen and king moves, castling excluded.
fn generate_piece_moves(board: &Board, moves: &mut MoveList) {
    let us = board.side_to_move;
    let not_ours = !board.colors[us.index()];
    let occupied = board.occupied();

    for piece in [
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ] {
        for from in board.pieces_of(piece, us) {
            let targets = match piece {
                Piece::Knight => knight_attacks(from),
                Piece::Bishop => bishop_attacks(from, occupied),
                Piece::Rook => rook_attacks(from, occupied),
                Piece::Queen => queen_attacks(from, occupied),
                _ => king_attacks(from),
            };
            for to in targets & not_ours {
                moves.push(PackedMove::normal(from, to));
            }
        }
    }
}

/// Castling moves whose path is empty and not attacked. The king's
/// destination is checked by the legality filter.
fn generate_castling_moves(board: &Board, moves: &mut MoveList) {
    let us = board.side_to_move;
    let them = us.opposite();

    if is_king_attacked(board, us) {
        return;
    }

    let rank = us.back_rank();
    let on_rank = |file: u8| Square::from_index_masked(rank * 8 + file);
    let king_start = on_rank(4);
    let occupied = board.occupied();

    if board.castling.can_castle_kingside(us) {
        let between = Bitboard::from_squares(&[on_rank(5), on_rank(6)]);
        if (occupied & between).is_empty() && !is_square_attacked(board, on_rank(5), them) {
            moves.push(PackedMove::new(
                king_start,
                on_rank(6),
                MoveFlag::CastleKingside,
            ));
        }
    }

    if board.castling.can_castle_queenside(us) {
        let between = Bitboard::from_squares(&[on_rank(1), on_rank(2), on_rank(3)]);
        if (occupied & between).is_empty() && !is_square_attacked(board, on_rank(3), them) {
            moves.push(PackedMove::new(
                king_start,
                on_rank(2),
                MoveFlag::CastleQueenside,
            ));
        }
    }
}

/// Returns true if `sq` is attacked by a piece of `by_color`.
pub fn is_square_attacked(board: &Board, sq: Square, by_color: Color) -> bool {
    let occupied = board.occupied();
    let theirs = |piece: Piece| board.pieces_of(piece, by_color);

    (pawn_attacks(sq, by_color.opposite()) & theirs(Piece::Pawn)).is_not_empty()
        || (knight_attacks(sq) & theirs(Piece::Knight)).is_not_empty()
        || (king_attacks(sq) & theirs(Piece::King)).is_not_empty()
        || (bishop_attacks(sq, occupied) & (theirs(Piece::Bishop) | theirs(Piece::Queen)))
            .is_not_empty()
        || (rook_attacks(sq, occupied) & (theirs(Piece::Rook) | theirs(Piece::Queen)))
            .is_not_empty()
}

/// Pieces of `by_color` attacking `sq`, with sliders blocked by
/// `occupied` rather than by the board's own occupancy.
pub fn attackers_to(board: &Board, sq: Square, by_color: Color, occupied: Bitboard) -> Bitboard {
    let theirs = |piece: Piece| board.pieces_of(piece, by_color);

    (pawn_attacks(sq, by_color.opposite()) & theirs(Piece::Pawn))
        | (knight_attacks(sq) & theirs(Piece::Knight))
        | (king_attacks(sq) & theirs(Piece::King))
        | (bishop_attacks(sq, occupied) & (theirs(Piece::Bishop) | theirs(Piece::Queen)))
        | (rook_attacks(sq, occupied) & (theirs(Piece::Rook) | theirs(Piece::Queen)))
}

/// Returns true if the king of `king_color` is in check. A side without a
/// king is never in check.
pub fn is_king_attacked(board: &Board, king_color: Color) -> bool {
    board
        .king_square(king_color)
        .is_some_and(|king_sq| is_square_attacked(board, king_sq, king_color.opposite()))
}

/// Plays a generated move and returns the new board.
///
/// `m` must come from [`generate_moves`] (or its pseudo-legal stages) for
/// this board; an empty origin square leaves the board unchanged apart from
/// the side to move and clocks.
pub fn make_move(board: &Board, m: PackedMove) -> Board {
    let mut next = board.clone();
    let us = board.side_to_move;
    let them = us.opposite();
    let from = m.from();
    let to = m.to();
    let flag = m.flag();

    let moved = board.piece_at(from).map(|(piece, _)| piece);
    let mut is_capture = false;

    if let Some(piece) = moved {
        next.remove(from, piece, us);

        if let Some((captured, _)) = board.piece_at(to) {
            next.remove(to, captured, them);
            is_capture = true;
        }

        if flag == MoveFlag::EnPassant {
            let behind = match us {
                Color::White => -1,
                Color::Black => 1,
            };
            if let Some(captured_sq) = to.offset_rank(behind) {
                next.remove(captured_sq, Piece::Pawn, them);
                is_capture = true;
            }
        }

        next.put(to, flag.promotion_piece().unwrap_or(piece), us);

        if flag.is_castling() {
            let rank = us.back_rank();
            let (rook_from, rook_to) = if flag == MoveFlag::CastleKingside {
                (7, 5)
            } else {
                (0, 3)
            };
            next.remove(Square::from_index_masked(rank * 8 + rook_from), Piece::Rook, us);
            next.put(Square::from_index_masked(rank * 8 + rook_to), Piece::Rook, us);
        }

        if piece == Piece::King {
            next.castling.remove_color(us);
        }
    }

    // Any move from or to a rook's home square ends that right.
    for sq in [from, to] {
        match sq {
            Square::H1 => next.castling.remove_kingside(Color::White),
            Square::A1 => next.castling.remove_queenside(Color::White),
            Square::H8 => next.castling.remove_kingside(Color::Black),
            Square::A8 => next.castling.remove_queenside(Color::Black),
            _ => {}
        }
    }

    next.en_passant = if flag == MoveFlag::DoublePush {
        to.offset_rank(match us {
            Color::White => -1,
            Color::Black => 1,
        })
    } else {
        None
    };

    if moved == Some(Piece::Pawn) || is_capture {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    }

    if us == Color::Black {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }

    next.side_to_move = them;
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn uci_moves(board: &Board) -> Vec<String> {
        generate_moves(board)
            .as_slice()
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    #[test]
    fn movelist_push_and_retain() {
        let mut list = MoveList::new();
        assert!(list.is_empty());
        list.push(PackedMove::normal(sq("e2"), sq("e3")));
        list.push(PackedMove::new(sq("e2"), sq("e4"), MoveFlag::DoublePush));
        list.push(PackedMove::normal(sq("d2"), sq("d3")));
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].flag(), MoveFlag::DoublePush);

        list.retain(|m| m.from() == sq("e2"));
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.find(Move::normal(sq("e2"), sq("e4"))).map(|m| m.flag()),
            Some(MoveFlag::DoublePush)
        );
        assert_eq!(list.find(Move::normal(sq("d2"), sq("d3"))), None);
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let moves = generate_moves(&Board::startpos());
        assert_eq!(moves.len(), 20);
        let plain = moves.to_moves();
        assert!(plain.contains(&Move::from_uci("e2e4").unwrap()));
        assert!(plain.contains(&Move::from_uci("g1f3").unwrap()));
    }

    #[test]
    fn double_push_sets_en_passant_square() {
        let board = Board::startpos();
        let m = PackedMove::new(sq("e2"), sq("e4"), MoveFlag::DoublePush);
        let next = make_move(&board, m);
        assert_eq!(next.side_to_move, Color::Black);
        assert_eq!(next.piece_at(sq("e4")), Some((Piece::Pawn, Color::White)));
        assert!(next.piece_at(sq("e2")).is_none());
        assert_eq!(next.en_passant, Some(sq("e3")));
        assert_eq!(
            next.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn knight_move_ticks_halfmove_clock() {
        let next = make_move(&Board::startpos(), PackedMove::normal(Square::G1, sq("f3")));
        assert_eq!(next.piece_at(sq("f3")), Some((Piece::Knight, Color::White)));
        assert_eq!(next.halfmove_clock, 1);
        assert_eq!(next.fullmove_number, 1);
    }

    #[test]
    fn clocks_saturate_at_their_maximum() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 4294967295 1").unwrap();
        let next = make_move(&board, PackedMove::normal(Square::E1, sq("f1")));
        assert_eq!(next.halfmove_clock, u32::MAX);
        assert_eq!(generate_moves(&next).len(), 5);

        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R b K - 0 4294967295").unwrap();
        let next = make_move(&board, PackedMove::normal(Square::E8, sq("d8")));
        assert_eq!(next.fullmove_number, u32::MAX);
        assert_eq!(next.halfmove_clock, 1);
    }

    #[test]
    fn attackers_respect_occupancy() {
        // rook a1 and knight d3 both attack e1
        let board = Board::from_fen("k7/8/8/8/8/3n4/8/r3K3 w - - 0 1").unwrap();
        let occupied = board.occupied();
        let attackers = attackers_to(&board, Square::E1, Color::Black, occupied);
        assert_eq!(attackers.count(), 2);
        assert!(attackers.contains(Square::A1));
        assert!(attackers.contains(sq("d3")));

        let blocked = occupied | Bitboard::from_square(sq("c1"));
        let attackers = attackers_to(&board, Square::E1, Color::Black, blocked);
        assert_eq!(attackers, Bitboard::from_square(sq("d3")));
    }

    #[test]
    fn attacks_in_start_position() {
        let board = Board::startpos();
        assert!(is_square_attacked(&board, sq("e3"), Color::White));
        assert!(!is_square_attacked(&board, sq("e4"), Color::White));
        assert!(!is_king_attacked(&board, Color::White));
        assert!(!is_king_attacked(&board, Color::Black));
    }

    #[test]
    fn castling_both_sides() {
        let board = Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let moves = uci_moves(&board);
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        let castled = make_move(
            &board,
            PackedMove::new(Square::E1, Square::G1, MoveFlag::CastleKingside),
        );
        assert_eq!(castled.piece_at(Square::F1), Some((Piece::Rook, Color::White)));
        assert!(castled.piece_at(Square::H1).is_none());
        assert_eq!(castled.castling.to_field(), "kq");
    }

    #[test]
    fn no_castling_through_attacked_square() {
        // white is in check from the e5 rook
        let board = Board::from_fen("r3k2r/pppp1ppp/8/4r3/8/8/PPPP1PPP/R3K2R w KQkq - 0 1").unwrap();
        let moves = uci_moves(&board);
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));

        // a bishop covering f1 blocks only the kingside
        let board = Board::from_fen("r3k2r/pppppppp/8/8/8/7b/PPPPP2P/R3K2R w KQkq - 0 1").unwrap();
        let moves = uci_moves(&board);
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn capturing_a_rook_removes_castling_right() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let next = make_move(&board, PackedMove::normal(Square::A1, Square::A8));
        assert_eq!(next.castling.to_field(), "Kk");
        assert_eq!(next.halfmove_clock, 0);
    }

    #[test]
    fn en_passant_capture() {
        let board =
            Board::from_fen("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3").unwrap();
        let moves = generate_moves(&board);
        let ep = moves
            .as_slice()
            .iter()
            .copied()
            .find(|m| m.flag() == MoveFlag::EnPassant);
        assert_eq!(ep.map(|m| m.to_string()), Some("f5e6".to_string()));

        let next = make_move(&board, ep.unwrap());
        assert!(next.piece_at(sq("e5")).is_none());
        assert_eq!(next.piece_at(sq("e6")), Some((Piece::Pawn, Color::White)));
    }

    #[test]
    fn promotions_are_generated_queen_first() {
        let board = Board::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let promotions: Vec<String> = uci_moves(&board)
            .into_iter()
            .filter(|m| m.len() == 5)
            .collect();
        assert_eq!(promotions, ["a7a8q", "a7a8r", "a7a8b", "a7a8n"]);
    }

    #[test]
    fn pinned_piece_cannot_move() {
        // the e2 knight is pinned by the e8 rook
        let board = Board::from_fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(uci_moves(&board).iter().all(|m| !m.starts_with("e2")));
    }
}
