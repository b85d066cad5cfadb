//! Behaviour every backend must show through the adapter contract.
//!
//! Each test runs against every backend kind.

use chess_core::{action, Color, Move, Outcome, Position, TerminalInfo, TerminalReason, STARTPOS};
use engine_adapter::{AdapterError, Backend, BackendKind, EngineAdapter};
use proptest::prelude::*;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";

fn backends() -> Vec<Backend> {
    BackendKind::ALL.into_iter().map(BackendKind::build).collect()
}

fn mv(uci: &str) -> Move {
    Move::from_uci(uci).unwrap()
}

/// Plays `choices` as indices into each position's legal moves, stopping at
/// the end of the game. Returns every position reached, the start included.
fn playout(adapter: &dyn EngineAdapter, choices: &[usize]) -> Vec<Position> {
    let mut positions = vec![adapter.initial_state()];
    for &choice in choices {
        let current = positions.last().unwrap();
        if adapter.is_terminal(current).unwrap() {
            break;
        }
        let moves = adapter.legal_moves(current).unwrap();
        let next = adapter
            .apply_move(current, moves[choice % moves.len()])
            .unwrap();
        positions.push(next);
    }
    positions
}

#[test]
fn initial_state_has_twenty_moves() {
    for adapter in backends() {
        let start = adapter.initial_state();
        assert_eq!(adapter.to_notation(&start), STARTPOS, "{}", adapter.name());
        assert_eq!(adapter.legal_moves(&start).unwrap().len(), 20, "{}", adapter.name());
    }
}

#[test]
fn e2e4_gives_the_same_notation_everywhere() {
    for adapter in backends() {
        let next = adapter
            .apply_move(&adapter.initial_state(), mv("e2e4"))
            .unwrap();
        assert_eq!(adapter.to_notation(&next), AFTER_E4, "{}", adapter.name());
        assert_eq!(next.side_to_move(), Color::Black);
    }
}

#[test]
fn notation_round_trips() {
    let samples = [
        STARTPOS,
        AFTER_E4,
        KIWIPETE,
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "4k3/8/8/8/8/8/8/R3K3 w Q - 100 80",
    ];
    for adapter in backends() {
        for notation in samples {
            let position = adapter.from_notation(notation).unwrap();
            assert_eq!(adapter.to_notation(&position), notation, "{}", adapter.name());
        }
    }
}

#[test]
fn illegal_move_leaves_position_untouched() {
    for adapter in backends() {
        let start = adapter.initial_state();
        let before = adapter.to_notation(&start);
        for uci in ["e2e5", "e1g1", "a1a1", "e7e5", "g1g3"] {
            match adapter.apply_move(&start, mv(uci)) {
                Err(AdapterError::IllegalMove { mv: got, notation }) => {
                    assert_eq!(got, mv(uci));
                    assert_eq!(notation, STARTPOS);
                }
                other => panic!("{}: {uci} gave {other:?}", adapter.name()),
            }
        }
        assert_eq!(adapter.to_notation(&start), before);
        assert_eq!(adapter.legal_moves(&start).unwrap().len(), 20);
    }
}

#[test]
fn malformed_notation_is_reported_not_panicked() {
    let bad = [
        "",
        "not a position",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
        "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -",
        // no kings
        "8/8/8/8/8/8/8/8 w - - 0 1",
        // side not to move is in check
        "4k3/4Q3/8/8/8/8/8/4K3 w - - 0 1",
        // pawn on the back rank
        "P3k3/8/8/8/8/8/8/4K3 w - - 0 1",
    ];
    for adapter in backends() {
        for notation in bad {
            assert!(
                matches!(
                    adapter.from_notation(notation),
                    Err(AdapterError::MalformedNotation { .. })
                ),
                "{} accepted {notation:?}",
                adapter.name()
            );
        }
    }
}

#[test]
fn is_terminal_agrees_with_outcome() {
    let positions = [
        STARTPOS,
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1",
        "8/8/8/4k3/8/8/8/4K3 w - - 0 1",
        "4k3/8/8/8/8/8/8/R3K3 w Q - 100 80",
    ];
    for adapter in backends() {
        for notation in positions {
            let position = adapter.from_notation(notation).unwrap();
            let info = adapter.outcome(&position).unwrap();
            assert_eq!(adapter.is_terminal(&position).unwrap(), info.is_terminal());
            assert_eq!(info.is_terminal(), info.outcome() != Outcome::Ongoing);
        }
    }
}

#[test]
fn checkmate_outranks_fifty_move_rule() {
    // back-rank mate with the clock already past 100
    let notation = "R5k1/5ppp/8/8/8/8/8/6K1 b - - 120 90";
    for adapter in backends() {
        let position = adapter.from_notation(notation).unwrap();
        assert_eq!(
            adapter.outcome(&position).unwrap(),
            TerminalInfo::checkmate(Color::White),
            "{}",
            adapter.name()
        );
    }
}

#[test]
fn clocks_saturate_instead_of_overflowing() {
    let cases = [
        (
            "4k3/8/8/8/8/8/8/4K2R w K - 4294967295 1",
            "e1f1",
            "4k3/8/8/8/8/8/8/5K1R b - - 4294967295 1",
        ),
        (
            "4k3/8/8/8/8/8/8/4K2R b K - 0 4294967295",
            "e8d8",
            "3k4/8/8/8/8/8/8/4K2R w K - 1 4294967295",
        ),
    ];
    for adapter in backends() {
        for (before, uci, after) in cases {
            let position = adapter.from_notation(before).unwrap();
            let next = adapter.apply_move(&position, mv(uci)).unwrap();
            assert_eq!(adapter.to_notation(&next), after, "{}", adapter.name());
            assert!(!adapter.legal_moves(&next).unwrap().is_empty());
        }
    }
}

#[test]
fn perft_small_depths() {
    for adapter in backends() {
        let start = adapter.initial_state();
        assert_eq!(adapter.perft(&start, 0).unwrap(), 1);
        assert_eq!(adapter.perft(&start, 1).unwrap(), 20);
        assert_eq!(adapter.perft(&start, 2).unwrap(), 400);

        let kiwipete = adapter.from_notation(KIWIPETE).unwrap();
        assert_eq!(adapter.perft(&kiwipete, 2).unwrap(), 2039, "{}", adapter.name());
    }
}

#[test]
fn perft_divide_sums_to_perft() {
    for adapter in backends() {
        let kiwipete = adapter.from_notation(KIWIPETE).unwrap();
        let divide = adapter.perft_divide(&kiwipete, 2).unwrap();
        assert_eq!(divide.len(), 48);
        assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 2039);
        let ucis: Vec<String> = divide.iter().map(|(m, _)| m.to_uci()).collect();
        let mut sorted = ucis.clone();
        sorted.sort();
        assert_eq!(ucis, sorted);
    }
}

#[test]
fn decode_action_prefers_queen_promotion() {
    let notation = "3r3k/4P3/8/8/8/8/8/K7 w - - 0 1";
    let push = action::encode(mv("e7e8"));
    let capture = action::encode(mv("e7d8"));
    for adapter in backends() {
        let position = adapter.from_notation(notation).unwrap();
        assert_eq!(adapter.decode_action(&position, push).unwrap(), mv("e7e8q"));
        assert_eq!(adapter.decode_action(&position, capture).unwrap(), mv("e7d8q"));

        let mask = adapter.action_mask(&position).unwrap();
        assert!(mask[push]);
        assert!(mask[capture]);
        // four promotions each on two squares plus three king moves
        assert_eq!(adapter.legal_moves(&position).unwrap().len(), 11);
        assert_eq!(mask.iter().filter(|&&b| b).count(), 5);
    }
}

#[test]
fn decode_action_errors() {
    for adapter in backends() {
        let start = adapter.initial_state();
        assert!(matches!(
            adapter.decode_action(&start, 4096),
            Err(AdapterError::ActionIndexOutOfRange(4096))
        ));
        let index = action::encode(mv("e2e5"));
        match adapter.decode_action(&start, index) {
            Err(AdapterError::UnmatchedAction { index: got, decoded }) => {
                assert_eq!(got, index);
                assert_eq!(decoded, mv("e2e5"));
            }
            other => panic!("{}: {other:?}", adapter.name()),
        }
    }
}

#[test]
fn threads_share_one_adapter() {
    for adapter in backends() {
        let script =
            |seed: usize| -> Vec<usize> { (0..40).map(|ply| seed * 31 + ply * 7).collect() };
        let expected: Vec<String> = (0..4)
            .map(|seed| {
                let positions = playout(&adapter, &script(seed));
                adapter.to_notation(positions.last().unwrap())
            })
            .collect();

        let adapter = &adapter;
        let got: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|seed| {
                    scope.spawn(move || {
                        let positions = playout(adapter, &script(seed));
                        adapter.to_notation(positions.last().unwrap())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(got, expected, "{}", adapter.name());
    }
}

#[test]
fn repetition_is_detected_after_two_cycles() {
    for adapter in backends() {
        let mut position = adapter.initial_state();
        for (ply, uci) in ["g1f3", "g8f6", "f3g1", "f6g8"].repeat(2).into_iter().enumerate() {
            assert!(!adapter.is_terminal(&position).unwrap(), "ply {ply}");
            position = adapter.apply_move(&position, mv(uci)).unwrap();
        }
        assert_eq!(
            adapter.outcome(&position).unwrap(),
            TerminalInfo::draw(TerminalReason::Repetition)
        );
        // notation alone carries no history
        let reparsed = adapter.from_notation(&adapter.to_notation(&position)).unwrap();
        assert!(!adapter.is_terminal(&reparsed).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn stale_cache_is_never_trusted(
        choices in prop::collection::vec(0usize..256, 1..30),
        other in prop::collection::vec(0usize..256, 1..30),
    ) {
        for adapter in backends() {
            let here = playout(&adapter, &choices).pop().unwrap();
            let elsewhere = playout(&adapter, &other).pop().unwrap();
            let wrong = adapter.legal_moves(&elsewhere).unwrap();
            let stale = here.with_legal_moves(wrong.clone());

            let truth = adapter.legal_moves(&here).unwrap();
            prop_assert_eq!(&adapter.legal_moves(&stale).unwrap(), &truth);
            prop_assert_eq!(adapter.outcome(&stale).unwrap(), adapter.outcome(&here).unwrap());

            for m in wrong.iter().filter(|m| !truth.contains(m)) {
                let illegal = matches!(
                    adapter.apply_move(&stale, *m),
                    Err(AdapterError::IllegalMove { .. })
                );
                prop_assert!(illegal);
            }
        }
    }

    #[test]
    fn playout_notation_round_trips_and_encodes(
        choices in prop::collection::vec(0usize..256, 0..60),
    ) {
        for adapter in backends() {
            for position in playout(&adapter, &choices) {
                let notation = adapter.to_notation(&position);
                let reparsed = adapter.from_notation(&notation).unwrap();
                prop_assert_eq!(adapter.to_notation(&reparsed), notation);

                for m in adapter.legal_moves(&position).unwrap() {
                    let decoded = action::decode(action::encode(m)).unwrap();
                    prop_assert!(decoded.same_squares(m));
                }
            }
        }
    }
}
