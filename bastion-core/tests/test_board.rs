use bastion_core::{Board, Color::*, Error, Move, Square};

fn board(fen: &str) -> Board {
    Board::from_fen(fen).unwrap()
}

fn mv(text: &str) -> Move {
    text.parse().unwrap()
}

fn sq(text: &str) -> Square {
    Square::from_notation(text).unwrap()
}

#[test]
fn making_a_move_leaves_the_original_untouched() {
    let original = board("3BG3/7/7/7/7/7/r22RG3 r");
    let copy = original;

    let next = original.make_move(&mv("A1-B1-1")).unwrap();
    assert_eq!(copy, original);
    assert_ne!(next, original);
    assert_eq!(Blue, next.turn_color());
}

#[test]
fn splitting_a_tower_leaves_the_rest_behind() {
    let start = board("3BG3/7/7/7/7/7/r22RG3 r");

    let next = start.make_move(&mv("A1-B1-1")).unwrap();
    assert_eq!(1, next.height(Red, sq("A1")));
    assert_eq!(1, next.height(Red, sq("B1")));

    let all = start.make_move(&mv("A1-C1-2")).unwrap();
    assert_eq!(0, all.height(Red, sq("A1")));
    assert_eq!(2, all.height(Red, sq("C1")));
    assert!(!all.towers(Red).contains(sq("A1")));
}

#[test]
fn landing_on_a_friendly_tower_stacks() {
    let start = board("3BG3/7/7/7/r16/7/r32RG3 r");

    let next = start.make_move(&mv("A1-A3-2")).unwrap();
    assert_eq!(1, next.height(Red, sq("A1")));
    assert_eq!(3, next.height(Red, sq("A3")));
}

#[test]
fn capturing_removes_the_enemy_stack_entirely() {
    let start = board("3BG3/7/7/3b23/3r23/7/3RG3 r");

    let next = start.make_move(&mv("D3-D4-1")).unwrap();
    assert_eq!(Some(Red), next.color_on(sq("D4")));
    assert_eq!(1, next.height(Red, sq("D4")));
    assert_eq!(0, next.height(Blue, sq("D4")));
    assert!(next.towers(Blue).is_empty());
}

#[test]
fn capturing_the_guard_ends_the_game() {
    let start = board("3BG3/7/7/3r33/7/7/RG6 r");
    assert_eq!(None, start.is_terminal());

    let next = start.make_move(&mv("D4-D7-3")).unwrap();
    assert_eq!(Some(Red), next.is_terminal());
    assert!(next.guard(Blue).is_empty());
    assert!(next.legal_moves().is_empty());
}

#[test]
fn reaching_the_castle_ends_the_game() {
    let start = board("7/3RG3/7/3BG3/7/7/7 r");

    let next = start.make_move(&mv("D6-D7-1")).unwrap();
    assert_eq!(Some(Red), next.is_terminal());

    // And symmetrically for blue
    let start = board("7/3RG3/7/7/7/3BG3/7 b");
    let next = start.make_move(&mv("D2-D1-1")).unwrap();
    assert_eq!(Some(Blue), next.is_terminal());
}

#[test]
fn guards_capture_guards() {
    let start = board("7/7/7/3BG3/3RG3/7/7 r");

    let next = start.make_move(&mv("D3-D4-1")).unwrap();
    assert_eq!(Some(Red), next.is_terminal());
    assert_eq!(Some(sq("D4")), next.guard_square(Red));
}

#[test]
fn null_moves_only_flip_the_side() {
    let start = board("3BG3/7/7/3b23/3r23/7/3RG3 r");
    let nulled = start.make_null_move();

    assert_eq!(Blue, nulled.turn_color());
    assert_eq!(start.all_pieces(), nulled.all_pieces());
    assert_ne!(start.zobrist_key(), nulled.zobrist_key());
    assert_eq!(start.zobrist_key(), nulled.make_null_move().zobrist_key());
}

#[test]
fn invariant_breaks_are_reported() {
    let start = board("3BG3/7/7/7/r16/7/r32RG3 r");

    let bad_moves = [
        Move::new(sq("B2"), sq("B3"), 1), // nothing on the source square
        Move::new(sq("A1"), sq("A5"), 4), // amount larger than the tower
        Move::new(sq("A1"), sq("B2"), 1), // diagonal tower move
        Move::new(sq("A1"), sq("C1"), 1), // distance does not match amount
        Move::new(sq("A1"), sq("D1"), 3), // tower landing on its own guard
        Move::new(sq("D1"), sq("D3"), 1), // guard stepping two squares
        Move::new(sq("D1"), sq("D2"), 2), // guard moving more than one piece
    ];

    for bad in bad_moves {
        match start.make_move(&bad) {
            Err(Error::IllegalMove { .. }) => {}
            Err(other) => panic!("{bad} raised the wrong error kind: {other}"),
            Ok(_) => panic!("{bad} was accepted"),
        }
    }
}

#[test]
fn guard_danger_spots_reachable_towers() {
    // A blue tower three squares up the file, tall enough to reach
    assert!(board("3BG3/7/7/3b33/7/7/3RG3 r").guard_in_danger(Red));

    // Too short to cover the distance
    assert!(!board("3BG3/7/7/3b23/7/7/3RG3 r").guard_in_danger(Red));

    // Tall enough, but a friendly tower blocks the line
    assert!(!board("3BG3/7/7/3b33/3r13/7/3RG3 r").guard_in_danger(Red));

    // An adjacent enemy guard is always a threat, to both sides
    let contact = board("7/7/7/3BG3/3RG3/7/7 r");
    assert!(contact.guard_in_danger(Red));
    assert!(contact.guard_in_danger(Blue));

    // Distant guards threaten nobody
    assert!(!board("3BG3/7/7/7/7/7/3RG3 r").guard_in_danger(Red));
    assert!(!board("3BG3/7/7/7/7/7/3RG3 r").guard_in_danger(Blue));
}

#[test]
fn guard_danger_needs_the_exact_split() {
    // A tower reaches the guard iff it can split off exactly as many
    // pieces as the distance, so a giant next door is a threat but a
    // single tile two squares away is not
    assert!(board("3BG3/7/7/7/7/3b93/3RG3 r").guard_in_danger(Red));
    assert!(!board("3BG3/7/7/7/3b13/7/3RG3 r").guard_in_danger(Red));
}
