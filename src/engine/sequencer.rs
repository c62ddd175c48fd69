//! Turn-sequence generation.
//!
//! Runs exactly once, when the host starts the game. The resulting flat list
//! of (team, player) turns is stored on the game record and consumed strictly
//! in order for all three rounds; only the cursor ever changes afterwards.

use indexmap::IndexMap;
use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::dao::models::TurnRef;

/// Number of full round-robin laps baked into the sequence. Three laps cover
/// the whole game because the cursor wraps modulo the sequence length and
/// team membership is frozen once the lobby closes.
const SUPER_ROUNDS: usize = 3;

/// Build the full turn ordering for a game.
///
/// `rosters` maps each team to its players in a fixed (arbitrary) order and
/// must contain at least one player per team; the verification gate rejects
/// game start before this is ever called with an empty roster.
///
/// Team order is shuffled once and reused for every lap. Within a lap each
/// team keeps an independent cursor into its roster, wrapping when exhausted,
/// so a smaller team cycles its players faster instead of stalling the
/// rotation. Each lap runs `max_team_size * team_count` steps, giving every
/// player on the largest team one turn per lap.
pub fn generate(rosters: &IndexMap<Uuid, Vec<Uuid>>, rng: &mut impl Rng) -> Vec<TurnRef> {
    let mut team_ids: Vec<Uuid> = rosters.keys().copied().collect();
    team_ids.shuffle(rng);

    let max_team_size = rosters.values().map(Vec::len).max().unwrap_or(0);
    let steps_per_lap = max_team_size * team_ids.len();

    let mut turns = Vec::with_capacity(SUPER_ROUNDS * steps_per_lap);
    for _ in 0..SUPER_ROUNDS {
        let mut cursors: IndexMap<Uuid, usize> =
            team_ids.iter().map(|team_id| (*team_id, 0)).collect();
        for step in 0..steps_per_lap {
            let team_id = team_ids[step % team_ids.len()];
            let roster = &rosters[&team_id];
            let cursor = cursors[&team_id];
            turns.push(TurnRef {
                team_id,
                player_id: roster[cursor % roster.len()],
            });
            cursors[&team_id] = cursor + 1;
        }
    }

    turns
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn roster(sizes: &[usize]) -> IndexMap<Uuid, Vec<Uuid>> {
        sizes
            .iter()
            .map(|&size| (Uuid::new_v4(), (0..size).map(|_| Uuid::new_v4()).collect()))
            .collect()
    }

    #[test]
    fn sequence_length_is_three_laps_of_max_team_size_times_teams() {
        let rosters = roster(&[2, 3]);
        let turns = generate(&rosters, &mut rand::rng());
        assert_eq!(turns.len(), 3 * 3 * 2);
    }

    #[test]
    fn every_player_appears_in_the_sequence() {
        let rosters = roster(&[2, 2, 4]);
        let turns = generate(&rosters, &mut rand::rng());

        let scheduled: HashSet<Uuid> = turns.iter().map(|turn| turn.player_id).collect();
        let all_players: HashSet<Uuid> =
            rosters.values().flatten().copied().collect();
        assert_eq!(scheduled, all_players);
    }

    #[test]
    fn teams_alternate_within_a_lap() {
        let rosters = roster(&[2, 2]);
        let turns = generate(&rosters, &mut rand::rng());

        for pair in turns.windows(2) {
            assert_ne!(
                pair[0].team_id, pair[1].team_id,
                "two consecutive turns for the same team"
            );
        }
    }

    #[test]
    fn smaller_team_repeats_players_more_often() {
        let rosters = roster(&[1, 3]);
        let turns = generate(&rosters, &mut rand::rng());
        let (small_team, small_players) =
            rosters.iter().find(|(_, players)| players.len() == 1).unwrap();

        let small_turns: Vec<&TurnRef> = turns
            .iter()
            .filter(|turn| turn.team_id == *small_team)
            .collect();
        // One lap schedules the small team max_team_size times, always with
        // its only player.
        assert_eq!(small_turns.len(), 3 * 3);
        assert!(small_turns.iter().all(|turn| turn.player_id == small_players[0]));
    }

    #[test]
    fn scheduled_players_belong_to_their_team() {
        let rosters = roster(&[2, 3, 2]);
        let turns = generate(&rosters, &mut rand::rng());
        for turn in turns {
            assert!(rosters[&turn.team_id].contains(&turn.player_id));
        }
    }
}
