//! Pure orchestration core: no storage, no clocks of its own.
//!
//! Services feed these functions fresh snapshots and server timestamps and
//! persist the results; keeping the rules pure is what makes them testable
//! and rerunnable under concurrent clients.

/// Turn timing derivations.
pub mod clock;
/// Join-code generation and normalization.
pub mod codes;
/// Round/turn state machine transitions.
pub mod machine;
/// Turn-sequence generation.
pub mod sequencer;
/// Start-of-game verification gate.
pub mod verification;
