use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness plus whether the storage backend answers a probe.
///
/// The endpoint itself always responds 200; degradation is expressed in the
/// body so load balancers keep routing while operators see the storage state.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = match state.require_game_store().await {
        Ok(store) => store,
        Err(_) => {
            warn!("storage unavailable (degraded mode)");
            return HealthResponse::degraded();
        }
    };

    if let Err(err) = store.health_check().await {
        warn!(error = %err, "storage health check failed");
        return HealthResponse::degraded();
    }

    HealthResponse::ok()
}
