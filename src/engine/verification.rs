//! Start-of-game verification gate.
//!
//! A pure predicate over freshly read records. The turn service re-derives
//! these facts from the store inside the StartGame transition instead of
//! trusting any client-side cached result, since membership can change
//! between a client's last read and its start request.

use crate::dao::models::{PlayerEntity, TeamEntity, WordEntity};

/// Minimum number of teams required to start.
pub const MIN_TEAMS: usize = 2;
/// Minimum number of players per team required to start.
pub const MIN_PLAYERS_PER_TEAM: usize = 2;

/// Evaluate every start rule and report one diagnostic per violation, in a
/// fixed order. All rules are checked independently so the caller can show a
/// complete checklist rather than the first failure.
pub fn violations(
    requester: &PlayerEntity,
    teams: &[TeamEntity],
    players: &[PlayerEntity],
    words: &[WordEntity],
    word_limit: u32,
) -> Vec<String> {
    let mut problems = Vec::new();

    if !requester.is_host {
        problems.push("only the host can start the game".to_string());
    }

    if teams.len() < MIN_TEAMS {
        problems.push(format!(
            "at least {MIN_TEAMS} teams are required (currently {})",
            teams.len()
        ));
    }

    for team in teams {
        let member_count = players
            .iter()
            .filter(|player| player.team_id == Some(team.id))
            .count();
        if member_count < MIN_PLAYERS_PER_TEAM {
            problems.push(format!(
                "team \"{}\" needs at least {MIN_PLAYERS_PER_TEAM} players (currently {member_count})",
                team.name
            ));
        }
    }

    for player in players {
        let submitted = words
            .iter()
            .filter(|word| word.submitted_by_player_id == player.id)
            .count();
        // Checked as "at least": the word pool quota already prevents excess
        // submissions.
        if (submitted as u32) < word_limit {
            problems.push(format!(
                "player \"{}\" has submitted {submitted} of {word_limit} words",
                player.name
            ));
        }
    }

    problems
}

/// Whether the game may leave the lobby.
pub fn can_start(
    requester: &PlayerEntity,
    teams: &[TeamEntity],
    players: &[PlayerEntity],
    words: &[WordEntity],
    word_limit: u32,
) -> bool {
    violations(requester, teams, players, words, word_limit).is_empty()
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use uuid::Uuid;

    use super::*;

    fn player(game_id: Uuid, team_id: Option<Uuid>, name: &str, is_host: bool) -> PlayerEntity {
        PlayerEntity {
            id: Uuid::new_v4(),
            game_id,
            team_id,
            name: name.into(),
            is_host,
            joined_at: SystemTime::now(),
        }
    }

    fn team(game_id: Uuid, name: &str) -> TeamEntity {
        TeamEntity {
            id: Uuid::new_v4(),
            game_id,
            name: name.into(),
            score: 0,
        }
    }

    fn words_for(game_id: Uuid, player_id: Uuid, count: usize) -> Vec<WordEntity> {
        (0..count)
            .map(|index| WordEntity {
                id: Uuid::new_v4(),
                game_id,
                text: format!("word-{index}"),
                submitted_by_player_id: player_id,
                guessed_in_round1: None,
                guessed_in_round2: None,
                guessed_in_round3: None,
            })
            .collect()
    }

    fn ready_game() -> (PlayerEntity, Vec<TeamEntity>, Vec<PlayerEntity>, Vec<WordEntity>) {
        let game_id = Uuid::new_v4();
        let teams = vec![team(game_id, "Red"), team(game_id, "Blue")];
        let mut players = vec![
            player(game_id, Some(teams[0].id), "ada", true),
            player(game_id, Some(teams[0].id), "bob", false),
            player(game_id, Some(teams[1].id), "cal", false),
            player(game_id, Some(teams[1].id), "dot", false),
        ];
        let words: Vec<WordEntity> = players
            .iter()
            .flat_map(|p| words_for(game_id, p.id, 5))
            .collect();
        let host = players.remove(0);
        players.insert(0, host.clone());
        (host, teams, players, words)
    }

    #[test]
    fn complete_lobby_can_start() {
        let (host, teams, players, words) = ready_game();
        let problems = violations(&host, &teams, &players, &words, 5);
        assert!(problems.is_empty(), "unexpected problems: {problems:?}");
        assert!(can_start(&host, &teams, &players, &words, 5));
    }

    #[test]
    fn non_host_requester_is_rejected() {
        let (_, teams, players, words) = ready_game();
        let guest = players.iter().find(|p| !p.is_host).unwrap();
        let problems = violations(guest, &teams, &players, &words, 5);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("host"));
    }

    #[test]
    fn undersized_team_is_named_exactly_once() {
        let game_id = Uuid::new_v4();
        let teams = vec![team(game_id, "Solo"), team(game_id, "Duo")];
        let players = vec![
            player(game_id, Some(teams[0].id), "ada", true),
            player(game_id, Some(teams[1].id), "bob", false),
            player(game_id, Some(teams[1].id), "cal", false),
        ];
        let words: Vec<WordEntity> = players
            .iter()
            .flat_map(|p| words_for(game_id, p.id, 5))
            .collect();

        let problems = violations(&players[0], &teams, &players, &words, 5);
        let naming_solo: Vec<&String> =
            problems.iter().filter(|p| p.contains("Solo")).collect();
        assert_eq!(naming_solo.len(), 1);
        assert!(problems.iter().all(|p| !p.contains("Duo")));
    }

    #[test]
    fn all_violations_are_reported_together() {
        let game_id = Uuid::new_v4();
        let teams = vec![team(game_id, "Only")];
        let players = vec![player(game_id, Some(teams[0].id), "ada", false)];
        let words = Vec::new();

        let problems = violations(&players[0], &teams, &players, &words, 5);
        // Not host, too few teams, undersized team, missing words.
        assert_eq!(problems.len(), 4);
    }

    #[test]
    fn excess_words_still_satisfy_the_quota_rule() {
        let (host, teams, players, mut words) = ready_game();
        words.extend(words_for(host.game_id, host.id, 2));
        assert!(can_start(&host, &teams, &players, &words, 5));
    }
}
