//! Score ledger: read-modify-write of team scores, invoked synchronously
//! from the guess path.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    dao::{game_store::GameStore, models::TeamEntity},
    error::ServiceError,
};

/// Add points to a team's score. Scores are monotonic during a game; no
/// caller in this design passes a delta that would decrease one.
pub(crate) async fn add_points(
    store: &Arc<dyn GameStore>,
    game_id: Uuid,
    team_id: Uuid,
    delta: u32,
) -> Result<TeamEntity, ServiceError> {
    let mut team = store
        .find_team(team_id)
        .await?
        .filter(|team| team.game_id == game_id)
        .ok_or_else(|| ServiceError::NotFound(format!("team `{team_id}` not found")))?;

    team.score += delta;
    store.save_team(team.clone()).await?;
    Ok(team)
}
