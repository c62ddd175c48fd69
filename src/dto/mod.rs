//! Request/response types for the HTTP surface.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Game bootstrap and lobby DTOs.
pub mod game;
/// Health check DTOs.
pub mod health;
/// Server-sent events payloads.
pub mod sse;
/// Turn and round action DTOs.
pub mod turn;
/// Custom field validators.
pub mod validation;
/// Word pool DTOs.
pub mod word;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
