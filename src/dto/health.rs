use serde::Serialize;
use utoipa::ToSchema;

/// Overall service status reported by `/healthcheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Fully operational.
    Ok,
    /// Running without a usable storage backend.
    Degraded,
}

/// Health response body.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Whether the storage backend answered the last probe.
    pub storage_reachable: bool,
}

impl HealthResponse {
    /// Response for a fully operational service.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
            storage_reachable: true,
        }
    }

    /// Response for a service running in degraded mode.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
            storage_reachable: false,
        }
    }
}
