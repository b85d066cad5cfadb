//! Attack tables for every piece type.
//!
//! Leapers (knight, king, pawn) use tables computed at compile time. Sliders
//! use per-direction ray tables: the attack along a ray stops at the first
//! blocker, found with a bit scan toward or away from a1 depending on the
//! direction.

use crate::Bitboard;
use chess_core::{Color, Square};

const KNIGHT_ATTACKS: [Bitboard; 64] = compute_leaper_attacks(&[
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
]);

const KING_ATTACKS: [Bitboard; 64] = compute_leaper_attacks(&[
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
]);

/// Pawn attack tables, [color][square].
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    compute_leaper_attacks(&[(1, 1), (1, -1)]),
    compute_leaper_attacks(&[(-1, 1), (-1, -1)]),
];

/// Ray directions as (rank delta, file delta). The first four point away
/// from a1 (higher square indices), the last four toward it.
const DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (0, 1),
    (1, 1),
    (1, -1),
    (-1, 0),
    (0, -1),
    (-1, -1),
    (-1, 1),
];

const NORTH: usize = 0;
const EAST: usize = 1;
const NORTH_EAST: usize = 2;
const NORTH_WEST: usize = 3;
const SOUTH: usize = 4;
const WEST: usize = 5;
const SOUTH_WEST: usize = 6;
const SOUTH_EAST: usize = 7;

/// Empty-board rays, [direction][square].
const RAYS: [[Bitboard; 64]; 8] = compute_rays();

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Squares a pawn of `color` on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, NORTH_EAST)
        | ray_attacks(sq, occupied, NORTH_WEST)
        | ray_attacks(sq, occupied, SOUTH_EAST)
        | ray_attacks(sq, occupied, SOUTH_WEST)
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    ray_attacks(sq, occupied, NORTH)
        | ray_attacks(sq, occupied, EAST)
        | ray_attacks(sq, occupied, SOUTH)
        | ray_attacks(sq, occupied, WEST)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Attacks along one ray, up to and including the first blocker.
#[inline]
fn ray_attacks(sq: Square, occupied: Bitboard, direction: usize) -> Bitboard {
    let ray = RAYS[direction][sq.index() as usize];
    let blockers = ray & occupied;
    let nearest = if direction < SOUTH {
        blockers.lsb()
    } else {
        blockers.msb()
    };
    match nearest {
        Some(blocker) => Bitboard(ray.0 & !RAYS[direction][blocker.index() as usize].0),
        None => ray,
    }
}

/// Builds a table of single-step attacks for the given offsets.
const fn compute_leaper_attacks(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0i8;
    while sq < 64 {
        let mut bb = 0u64;
        let mut i = 0;
        while i < offsets.len() {
            let rank = sq / 8 + offsets[i].0;
            let file = sq % 8 + offsets[i].1;
            if rank >= 0 && rank < 8 && file >= 0 && file < 8 {
                bb |= 1u64 << (rank * 8 + file);
            }
            i += 1;
        }
        attacks[sq as usize] = Bitboard(bb);
        sq += 1;
    }
    attacks
}

const fn compute_rays() -> [[Bitboard; 64]; 8] {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    let mut dir = 0;
    while dir < 8 {
        let (dr, df) = DIRECTIONS[dir];
        let mut sq = 0i8;
        while sq < 64 {
            let mut bb = 0u64;
            let mut rank = sq / 8 + dr;
            let mut file = sq % 8 + df;
            while rank >= 0 && rank < 8 && file >= 0 && file < 8 {
                bb |= 1u64 << (rank * 8 + file);
                rank += dr;
                file += df;
            }
            rays[dir][sq as usize] = Bitboard(bb);
            sq += 1;
        }
        dir += 1;
    }
    rays
}
