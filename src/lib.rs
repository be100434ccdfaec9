// Library crate for the kumite judge console and bracket server
// This file exposes the public API for the binary and integration tests

pub mod bout;
pub mod bracket;
pub mod config;
pub mod event;
pub mod identity;
pub mod matches;
pub mod ranking;
pub mod routes;
pub mod scoring;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use bout::{BoutController, BoutService};
pub use bracket::{BracketEngine, BracketService};
pub use event::{CompetitionEvent, EventBus};
pub use routes::build_router;
pub use shared::{AppError, AppState};
