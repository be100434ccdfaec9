// Match store: the persisted bout records shared by the judge console and
// the bracket view

pub use models::{MatchFilter, MatchRecord, MatchResultUpdate, MatchState, NewMatch, SlotKey};
pub use postgres::PostgresMatchStore;
pub use repository::{InMemoryMatchStore, MatchStore, StoreError};

mod models;
mod postgres;
mod repository;
