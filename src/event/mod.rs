// Competition event plumbing
//
// A bout finalization is published here; the bracket and any scoreboard
// listeners subscribe per competition.

pub use bus::EventBus;
pub use competition_handler::{CompetitionEventError, CompetitionEventHandler};
pub use competition_subscription::CompetitionSubscription;
pub use events::CompetitionEvent;

mod bus;
mod competition_handler;
mod competition_subscription;
mod events;
