/// Storage port and the concrete store adapters.
pub mod game_store;
/// Persisted record definitions shared across adapters.
pub mod models;
/// Backend-agnostic storage error taxonomy.
pub mod storage;
