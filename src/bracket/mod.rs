// Single-elimination bracket: slots, manual and drawn assignment, match
// creation, and reconcile against the match store

pub use engine::{
    Advancement, BracketConfig, BracketEngine, BracketSnapshot, ReconcileReport, MAX_ROUNDS,
};
pub use errors::BracketError;
pub use handlers::{
    assign_competitor, assign_judge, create_match, draw, get_bracket, open_bracket, refresh,
    reset,
};
pub use observer::{MatchObserver, PollingMatchObserver};
pub use poll_task::{start_poll_task, PollConfig};
pub use refresh_handler::BracketRefreshHandler;
pub use service::BracketService;
pub use slot::{BracketSlot, SlotState};

mod engine;
mod errors;
mod handlers;
mod observer;
mod poll_task;
mod refresh_handler;
mod service;
mod slot;
pub mod types;
