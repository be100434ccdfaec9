// Live bouts: one controller per match owning the session state, the clock
// ticker and the finalize write-back

pub use controller::{BoutController, BoutDependencies};
pub use errors::BoutError;
pub use handlers::{
    add_point, cast_ballot, confirm_hantei, declare_winner, finalize, get_bout, open_bout,
    pause_clock, reset_clock, resolve, set_category, set_hantei_override, set_penalty,
    start_clock, subtract_point, toggle_clock, withdraw,
};
pub use service::BoutService;
pub use session::{BoutParticipants, BoutPhase, BoutSessionState, ResolveOutcome};
pub use ticker::ClockTicker;
pub use types::{BoutResponse, OpenBoutRequest, ResolveResponse};

mod controller;
mod errors;
mod handlers;
mod service;
pub mod session;
mod ticker;
pub mod types;
