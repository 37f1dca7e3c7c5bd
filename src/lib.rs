pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::TrackerConfig;
pub use state::AppState;
pub use storage::{FileMedium, KeyValueMedium, MemoryMedium, PersistentStore};
pub use tracker::{CompletionTracker, ToggleOutcome};
