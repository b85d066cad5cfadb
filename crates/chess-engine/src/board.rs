//! Board state as the move generator sees it.

use chess_core::{Color, File, Notation, NotationError, Piece, Rank, Square};
use thiserror::Error;

use crate::movegen::{attackers_to, is_king_attacked};
use crate::Bitboard;

/// Reasons a syntactically valid notation does not describe a playable
/// position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error("{0} must have exactly one king, found {1}")]
    KingCount(Color, u32),

    #[error("pawn on the first or eighth rank at {0}")]
    PawnOnBackRank(Square),

    #[error("the side not to move ({0}) is in check")]
    OpponentInCheck(Color),

    #[error("castling right '{0}' without king and rook on their home squares")]
    CastlingWithoutPieces(char),

    #[error("en passant square {0} is not behind a pawn that just moved two squares")]
    EnPassantWithoutPawn(Square),

    #[error("{0} has more pieces than promotions could produce")]
    TooMuchMaterial(Color),

    #[error("{0} is in a check that no legal move could have given")]
    ImpossibleCheck(Color),
}

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// Parses the castling field of a notation that has already been
    /// validated ("-" or a subset of "KQkq").
    pub fn from_field(field: &str) -> Self {
        let flags = field.chars().fold(0u8, |acc, c| {
            acc | match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => 0,
            }
        });
        CastlingRights::new(flags)
    }

    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        (self.0 & Self::kingside_flag(color)) != 0
    }

    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        (self.0 & Self::queenside_flag(color)) != 0
    }

    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.0 &= !(Self::kingside_flag(color) | Self::queenside_flag(color));
    }

    #[inline]
    pub fn remove_kingside(&mut self, color: Color) {
        self.0 &= !Self::kingside_flag(color);
    }

    #[inline]
    pub fn remove_queenside(&mut self, color: Color) {
        self.0 &= !Self::queenside_flag(color);
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    const fn kingside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    const fn queenside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    /// The castling field in canonical `KQkq` order, or "-".
    pub fn to_field(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ]
        .iter()
        .filter(|(flag, _)| self.0 & flag != 0)
        .map(|&(_, c)| c)
        .collect()
    }
}

/// Complete board state: pieces, side to move, rights and clocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Bitboards for each piece type, indexed by [`Piece::index`].
    pub pieces: [Bitboard; 6],

    /// Bitboards for each color's pieces.
    pub colors: [Bitboard; 2],

    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,

    /// Halfmoves since the last capture or pawn move.
    pub halfmove_clock: u32,

    /// Starts at 1 and increments after Black's move.
    pub fullmove_number: u32,
}

impl Board {
    pub fn empty() -> Self {
        Board {
            pieces: [Bitboard::EMPTY; 6],
            colors: [Bitboard::EMPTY; 2],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn startpos() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, &piece) in File::ALL.iter().zip(back_rank.iter()) {
            board.put(Square::new(*file, Rank::R1), piece, Color::White);
            board.put(Square::new(*file, Rank::R2), Piece::Pawn, Color::White);
            board.put(Square::new(*file, Rank::R7), Piece::Pawn, Color::Black);
            board.put(Square::new(*file, Rank::R8), piece, Color::Black);
        }
        board.castling = CastlingRights::ALL;
        board
    }

    /// Loads a board from notation and checks that it is playable.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let board = Self::from_notation(&Notation::parse(fen)?);
        board.validate()?;
        Ok(board)
    }

    /// Loads a board from parsed notation without semantic checks.
    pub fn from_notation(notation: &Notation) -> Self {
        let mut board = Board::empty();

        for (rank_idx, rank_str) in notation.placement.split('/').enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                    board.put(Square::from_index_masked(rank * 8 + file), piece, color);
                    file += 1;
                }
            }
        }

        board.side_to_move = notation.side_to_move;
        board.castling = CastlingRights::from_field(&notation.castling);
        board.en_passant = notation.en_passant;
        board.halfmove_clock = notation.halfmove_clock;
        board.fullmove_number = notation.fullmove_number;
        board
    }

    /// Rejects boards that cannot arise in a game: wrong king count, more
    /// material than promotions allow, pawns on the back ranks, the side not
    /// to move in check, castling rights without their pieces, an
    /// en-passant square with no pawn behind it, or a check no move could
    /// have delivered.
    pub fn validate(&self) -> Result<(), BoardError> {
        for color in [Color::White, Color::Black] {
            let kings = self.pieces_of(Piece::King, color).count();
            if kings != 1 {
                return Err(BoardError::KingCount(color, kings));
            }
            if !self.has_standard_material(color) {
                return Err(BoardError::TooMuchMaterial(color));
            }
        }

        let back_ranks = Bitboard::RANK_1 | Bitboard::RANK_8;
        if let Some(sq) = (self.pieces[Piece::Pawn.index()] & back_ranks).lsb() {
            return Err(BoardError::PawnOnBackRank(sq));
        }

        let them = self.side_to_move.opposite();
        if is_king_attacked(self, them) {
            return Err(BoardError::OpponentInCheck(them));
        }

        self.validate_castling()?;
        self.validate_en_passant()?;
        self.validate_checkers()
    }

    /// Every piece beyond the starting set must be a promoted pawn, so
    /// pawns plus extra pieces never exceed eight. Bishops count per square
    /// colour.
    fn has_standard_material(&self, color: Color) -> bool {
        let ours = self.colors[color.index()];
        let count = |bb: Bitboard| (bb & ours).count();
        let extra = |bb: Bitboard, initial: u32| count(bb).saturating_sub(initial);
        let bishops = self.pieces[Piece::Bishop.index()];

        let promoted = extra(self.pieces[Piece::Queen.index()], 1)
            + extra(self.pieces[Piece::Rook.index()], 2)
            + extra(self.pieces[Piece::Knight.index()], 2)
            + extra(bishops & Bitboard::LIGHT_SQUARES, 1)
            + extra(bishops & Bitboard::DARK_SQUARES, 1);
        count(self.pieces[Piece::Pawn.index()]) + promoted <= 8
    }

    /// Checks on the side to move must be explainable by the last move.
    ///
    /// Without an en-passant square: at most two checkers, and two checkers
    /// never on one line through the king. After a double push: the pushed
    /// pawn gives check itself or uncovers a single checker that was
    /// blocked by the pawn's origin square.
    fn validate_checkers(&self) -> Result<(), BoardError> {
        let us = self.side_to_move;
        let them = us.opposite();
        let Some(king) = self.king_square(us) else {
            return Ok(());
        };
        let occupied = self.occupied();
        let checkers = attackers_to(self, king, them, occupied);
        let (Some(first), Some(last)) = (checkers.lsb(), checkers.msb()) else {
            return Ok(());
        };

        let impossible = match self.en_passant {
            Some(ep) => {
                let forward = match us {
                    Color::White => -1,
                    Color::Black => 1,
                };
                match (ep.offset_rank(forward), ep.offset_rank(-forward)) {
                    (Some(pushed), Some(origin)) => {
                        let before = (occupied & !Bitboard::from_square(pushed))
                            | Bitboard::from_square(origin);
                        first != last
                            || (first != pushed
                                && attackers_to(self, king, them, before).is_not_empty())
                    }
                    _ => false,
                }
            }
            None => first != last && (checkers.count() > 2 || aligned(first, king, last)),
        };

        if impossible {
            return Err(BoardError::ImpossibleCheck(us));
        }
        Ok(())
    }

    fn validate_castling(&self) -> Result<(), BoardError> {
        let rights = [
            ('K', Color::White, Square::E1, Square::H1),
            ('Q', Color::White, Square::E1, Square::A1),
            ('k', Color::Black, Square::E8, Square::H8),
            ('q', Color::Black, Square::E8, Square::A8),
        ];
        for (c, color, king, rook) in rights {
            let granted = match c {
                'K' | 'k' => self.castling.can_castle_kingside(color),
                _ => self.castling.can_castle_queenside(color),
            };
            if granted
                && (self.piece_at(king) != Some((Piece::King, color))
                    || self.piece_at(rook) != Some((Piece::Rook, color)))
            {
                return Err(BoardError::CastlingWithoutPieces(c));
            }
        }
        Ok(())
    }

    fn validate_en_passant(&self) -> Result<(), BoardError> {
        let Some(ep) = self.en_passant else {
            return Ok(());
        };
        let us = self.side_to_move;
        let them = us.opposite();
        // The pawn that moved stands one rank past `ep`; it came from one
        // rank before it.
        let (expected_rank, forward) = match us {
            Color::White => (Rank::R6, -1),
            Color::Black => (Rank::R3, 1),
        };
        let pushed = ep.offset_rank(forward);
        let origin = ep.offset_rank(-forward);
        let consistent = ep.rank() == expected_rank
            && self.piece_at(ep).is_none()
            && origin.is_some_and(|sq| self.piece_at(sq).is_none())
            && pushed.is_some_and(|sq| self.piece_at(sq) == Some((Piece::Pawn, them)));
        if consistent {
            Ok(())
        } else {
            Err(BoardError::EnPassantWithoutPawn(ep))
        }
    }

    /// Serializes the board, castling rights in canonical order.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8u8).rev() {
            let mut empty_count = 0;
            for file in 0..8u8 {
                match self.piece_at(Square::from_index_masked(rank * 8 + file)) {
                    Some((piece, color)) => {
                        if empty_count > 0 {
                            placement.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        placement.push(piece.to_fen_char(color));
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                placement.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let en_passant = match self.en_passant {
            Some(sq) => sq.to_algebraic(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement,
            self.side_to_move.token(),
            self.castling.to_field(),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Returns the piece and color at the given square, if any.
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        let color = if self.colors[Color::White.index()].contains(sq) {
            Color::White
        } else if self.colors[Color::Black.index()].contains(sq) {
            Color::Black
        } else {
            return None;
        };

        Piece::ALL
            .into_iter()
            .find(|piece| self.pieces[piece.index()].contains(sq))
            .map(|piece| (piece, color))
    }

    #[inline]
    pub fn put(&mut self, sq: Square, piece: Piece, color: Color) {
        self.pieces[piece.index()].set(sq);
        self.colors[color.index()].set(sq);
    }

    #[inline]
    pub fn remove(&mut self, sq: Square, piece: Piece, color: Color) {
        self.pieces[piece.index()].clear(sq);
        self.colors[color.index()].clear(sq);
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[piece.index()] & self.colors[color.index()]
    }

    /// The king square of `color`, if there is a king.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(Piece::King, color).lsb()
    }
}

/// Whether `c` lies on the rank, file or diagonal through `a` and `b`.
fn aligned(a: Square, b: Square, c: Square) -> bool {
    let coords = |sq: Square| (i32::from(sq.index() % 8), i32::from(sq.index() / 8));
    let ((af, ar), (bf, br), (cf, cr)) = (coords(a), coords(b), coords(c));
    let (df, dr) = (bf - af, br - ar);
    let on_line = (df, dr) != (0, 0) && (df == 0 || dr == 0 || df.abs() == dr.abs());
    on_line && (cf - af) * dr == (cr - ar) * df
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}
