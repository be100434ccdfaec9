// Public standings, updated after every finalized bout

pub use handlers::list_rankings;
pub use models::RankingEntry;
pub use repository::{InMemoryRankingStore, RankingStore};

mod handlers;
pub mod models;
pub mod repository;
