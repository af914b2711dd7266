//! The turn-order engine.
//!
//! Pure functions over a combatant list that has been sorted by
//! [`sort_by_initiative`]. Nothing here touches the store: handlers read a
//! snapshot, compute the next cursor and write it back.

use tabletop_core::record::RecordId;

use super::records::Combatant;

/// Which way a turn change walks the initiative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Next combatant; wrapping to the top starts a new round.
    Forward,
    /// Previous combatant; wrapping to the bottom goes back a round.
    Backward,
}

/// Position in the initiative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnCursor {
    /// Current round, never below 1.
    pub round: u32,
    /// Index into the sorted combatant list.
    pub index: usize,
}

/// Where the encounter's turn pointer should sit after the combatant list
/// changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPointer {
    /// The acting combatant, `None` while unpinned.
    pub active_combatant_id: Option<RecordId>,
    /// The acting combatant's index, `0` for an empty list.
    pub current_turn: usize,
}

/// Sorts combatants by initiative, highest first. Ties keep the order the
/// store returned them in.
pub fn sort_by_initiative(combatants: &mut [Combatant]) {
    combatants.sort_by(|a, b| b.initiative.cmp(&a.initiative));
}

/// One plain step, ignoring death.
#[must_use]
pub fn step(cursor: TurnCursor, len: usize, direction: Direction) -> TurnCursor {
    if len == 0 {
        return cursor;
    }
    match direction {
        Direction::Forward => {
            let index = (cursor.index + 1) % len;
            let round = if index == 0 {
                cursor.round.saturating_add(1)
            } else {
                cursor.round
            };
            TurnCursor { round, index }
        }
        Direction::Backward if cursor.index == 0 => TurnCursor {
            round: if cursor.round > 1 {
                cursor.round - 1
            } else {
                cursor.round
            },
            index: len - 1,
        },
        Direction::Backward => TurnCursor {
            round: cursor.round,
            index: cursor.index - 1,
        },
    }
}

/// Moves the cursor to the next living combatant in `direction`.
///
/// Steps at most `dead.len()` times. When every landing spot is dead the
/// cursor takes a single plain step from where it started instead. An empty
/// list leaves the cursor where it is.
#[must_use]
pub fn advance(cursor: TurnCursor, dead: &[bool], direction: Direction) -> TurnCursor {
    let len = dead.len();
    if len == 0 {
        return cursor;
    }
    let start = TurnCursor {
        round: cursor.round.max(1),
        index: cursor.index.min(len - 1),
    };

    let mut next = start;
    for _ in 0..len {
        next = step(next, len, direction);
        if !dead[next.index] {
            return next;
        }
    }
    step(start, len, direction)
}

/// Resolves whose turn it is in a sorted list.
///
/// A pinned combatant that is still present wins. Otherwise the stored
/// index is used, clamped to the last position. Returns `None` for an empty
/// list.
#[must_use]
pub fn resolve_index(
    active: Option<&RecordId>,
    stored: usize,
    order: &[Combatant],
) -> Option<usize> {
    if order.is_empty() {
        return None;
    }
    active
        .and_then(|id| order.iter().position(|c| &c.id == id))
        .or(Some(stored.min(order.len() - 1)))
}

fn first_living_from(start: usize, order: &[Combatant]) -> usize {
    (0..order.len())
        .map(|offset| (start + offset) % order.len())
        .find(|&index| !order[index].is_dead)
        .unwrap_or(start)
}

/// Recomputes the turn pointer after combatants were added, removed or
/// re-ordered.
///
/// - A pinned combatant that is still present keeps the turn at its new
///   index.
/// - A pinned combatant that was removed hands the turn to the first living
///   combatant from its old index onward (wrapping, clamped to the last
///   position). If everyone is dead the clamped index keeps the turn. The
///   round is not touched.
/// - An unpinned pointer stays unpinned with its index clamped.
/// - An empty list resets the pointer to `(None, 0)`.
#[must_use]
pub fn realign(
    active: Option<&RecordId>,
    stored: usize,
    before: &[Combatant],
    after: &[Combatant],
) -> TurnPointer {
    let Some(last) = after.len().checked_sub(1) else {
        return TurnPointer {
            active_combatant_id: None,
            current_turn: 0,
        };
    };

    let Some(id) = active else {
        return TurnPointer {
            active_combatant_id: None,
            current_turn: stored.min(last),
        };
    };

    if let Some(index) = after.iter().position(|c| &c.id == id) {
        return TurnPointer {
            active_combatant_id: Some(id.clone()),
            current_turn: index,
        };
    }

    let old_index = before
        .iter()
        .position(|c| &c.id == id)
        .unwrap_or(stored);
    let index = first_living_from(old_index.min(last), after);
    TurnPointer {
        active_combatant_id: Some(after[index].id.clone()),
        current_turn: index,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::records::CombatantKind;

    fn combatant(id: &str, initiative: u32) -> Combatant {
        Combatant {
            id: RecordId::from(id),
            encounter_id: RecordId::from("enc_1"),
            name: id.to_owned(),
            initiative,
            hp: 10,
            max_hp: 10,
            ac: 10,
            is_npc: false,
            kind: CombatantKind::Character,
            is_hostile: false,
            is_dead: false,
            attacks: String::new(),
            conditions: Vec::new(),
            notes: String::new(),
            image_data: String::new(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            version: 1,
        }
    }

    fn cursor(round: u32, index: usize) -> TurnCursor {
        TurnCursor { round, index }
    }

    #[test]
    fn test_sort_by_initiative_is_descending_and_stable() {
        let mut list = vec![
            combatant("a", 18),
            combatant("c", 5),
            combatant("b", 18),
            combatant("d", 20),
        ];

        sort_by_initiative(&mut list);

        let ids: Vec<&str> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_forward_wrap_increments_round() {
        let dead = [false, false, false];

        assert_eq!(advance(cursor(1, 1), &dead, Direction::Forward), cursor(1, 2));
        assert_eq!(advance(cursor(1, 2), &dead, Direction::Forward), cursor(2, 0));
    }

    #[test]
    fn test_backward_wrap_decrements_round_but_not_below_one() {
        let dead = [false, false, false];

        assert_eq!(advance(cursor(3, 0), &dead, Direction::Backward), cursor(2, 2));
        assert_eq!(advance(cursor(1, 0), &dead, Direction::Backward), cursor(1, 2));
        assert_eq!(advance(cursor(1, 2), &dead, Direction::Backward), cursor(1, 1));
    }

    #[test]
    fn test_forward_skips_dead_and_counts_wrap() {
        // order: 0 alive, 1 dead, 2 dead
        let dead = [false, true, true];

        assert_eq!(advance(cursor(4, 0), &dead, Direction::Forward), cursor(5, 0));
    }

    #[test]
    fn test_backward_skips_dead() {
        let dead = [false, true, false, true];

        assert_eq!(advance(cursor(2, 2), &dead, Direction::Backward), cursor(2, 0));
        assert_eq!(advance(cursor(2, 0), &dead, Direction::Backward), cursor(1, 2));
    }

    #[test]
    fn test_all_dead_falls_back_to_single_plain_step() {
        let dead = [true, true, true];

        assert_eq!(advance(cursor(1, 0), &dead, Direction::Forward), cursor(1, 1));
        assert_eq!(advance(cursor(1, 2), &dead, Direction::Forward), cursor(2, 0));
        assert_eq!(advance(cursor(2, 0), &dead, Direction::Backward), cursor(1, 2));
    }

    #[test]
    fn test_single_combatant_forward_always_increments_round() {
        let dead = [false];

        let mut current = cursor(1, 0);
        for expected_round in 2..6 {
            current = advance(current, &dead, Direction::Forward);
            assert_eq!(current, cursor(expected_round, 0));
        }
    }

    #[test]
    fn test_full_pass_over_living_returns_to_start_with_one_round() {
        let dead = [false, true, false, false, true];
        let living = dead.iter().filter(|d| !**d).count();
        let start = cursor(3, 2);

        let mut current = start;
        for _ in 0..living {
            current = advance(current, &dead, Direction::Forward);
        }

        assert_eq!(current, cursor(4, 2));
    }

    #[test]
    fn test_forward_then_backward_restores_cursor() {
        let dead = [false, false, false, false];

        for index in 0..dead.len() {
            for round in 1..4 {
                let start = cursor(round, index);
                let there = advance(start, &dead, Direction::Forward);
                let back = advance(there, &dead, Direction::Backward);
                assert_eq!(back, start);
            }
        }
    }

    #[test]
    fn test_empty_list_leaves_cursor_unchanged() {
        assert_eq!(advance(cursor(2, 0), &[], Direction::Forward), cursor(2, 0));
        assert_eq!(step(cursor(2, 0), 0, Direction::Backward), cursor(2, 0));
    }

    #[test]
    fn test_stale_index_is_clamped_before_stepping() {
        let dead = [false, false];

        assert_eq!(advance(cursor(1, 7), &dead, Direction::Forward), cursor(2, 0));
    }

    #[test]
    fn test_resolve_index_prefers_pinned_combatant() {
        let order = vec![combatant("a", 20), combatant("b", 10)];

        assert_eq!(resolve_index(Some(&RecordId::from("b")), 0, &order), Some(1));
        assert_eq!(resolve_index(Some(&RecordId::from("gone")), 5, &order), Some(1));
        assert_eq!(resolve_index(None, 0, &order), Some(0));
        assert_eq!(resolve_index(None, 0, &[]), None);
    }

    #[test]
    fn test_realign_keeps_acting_combatant_when_other_removed() {
        let before = vec![combatant("a", 20), combatant("b", 15), combatant("c", 10)];
        let after = vec![combatant("b", 15), combatant("c", 10)];

        let pointer = realign(Some(&RecordId::from("b")), 1, &before, &after);

        assert_eq!(pointer.active_combatant_id, Some(RecordId::from("b")));
        assert_eq!(pointer.current_turn, 0);
    }

    #[test]
    fn test_realign_hands_turn_to_next_in_place_when_acting_removed() {
        let before = vec![combatant("a", 20), combatant("b", 15), combatant("c", 10)];
        let after = vec![combatant("a", 20), combatant("c", 10)];

        let pointer = realign(Some(&RecordId::from("b")), 1, &before, &after);

        assert_eq!(pointer.active_combatant_id, Some(RecordId::from("c")));
        assert_eq!(pointer.current_turn, 1);
    }

    #[test]
    fn test_realign_skips_dead_successor_when_acting_removed() {
        let mut c = combatant("c", 10);
        c.is_dead = true;
        let before = vec![combatant("a", 20), combatant("b", 15), c.clone()];
        let after = vec![combatant("a", 20), c];

        let pointer = realign(Some(&RecordId::from("b")), 1, &before, &after);

        assert_eq!(pointer.active_combatant_id, Some(RecordId::from("a")));
        assert_eq!(pointer.current_turn, 0);
    }

    #[test]
    fn test_realign_all_dead_keeps_clamped_index() {
        let mut a = combatant("a", 20);
        a.is_dead = true;
        let mut c = combatant("c", 10);
        c.is_dead = true;
        let before = vec![a.clone(), combatant("b", 15), c.clone()];
        let after = vec![a, c];

        let pointer = realign(Some(&RecordId::from("b")), 1, &before, &after);

        assert_eq!(pointer.active_combatant_id, Some(RecordId::from("c")));
        assert_eq!(pointer.current_turn, 1);
    }

    #[test]
    fn test_realign_clamps_when_last_acting_removed() {
        let before = vec![combatant("a", 20), combatant("b", 15)];
        let after = vec![combatant("a", 20)];

        let pointer = realign(Some(&RecordId::from("b")), 1, &before, &after);

        assert_eq!(pointer.active_combatant_id, Some(RecordId::from("a")));
        assert_eq!(pointer.current_turn, 0);
    }

    #[test]
    fn test_realign_empty_list_resets_pointer() {
        let before = vec![combatant("a", 20)];

        let pointer = realign(Some(&RecordId::from("a")), 0, &before, &[]);

        assert_eq!(
            pointer,
            TurnPointer {
                active_combatant_id: None,
                current_turn: 0,
            }
        );
    }

    #[test]
    fn test_realign_follows_pinned_combatant_after_reorder() {
        let before = vec![combatant("a", 20), combatant("b", 15)];
        let after = vec![combatant("new", 25), combatant("a", 20), combatant("b", 15)];

        let pointer = realign(Some(&RecordId::from("b")), 1, &before, &after);

        assert_eq!(pointer.current_turn, 2);
    }
}
