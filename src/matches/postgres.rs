use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

use super::models::{MatchFilter, MatchRecord, MatchResultUpdate, MatchState, NewMatch, SlotKey};
use super::repository::{MatchStore, StoreError};
use crate::scoring::ResultReason;

const MATCH_COLUMNS: &str = "id, competition_id, bracket_round, bracket_position, \
     competitor1_id, competitor2_id, judge_id, category, duration_seconds, state, \
     winner_id, result_reason, score1, score2, scheduled_at";

/// PostgreSQL implementation of MatchStore (see `migrations/`)
pub struct PostgresMatchStore {
    pool: PgPool,
}

impl PostgresMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

fn row_to_record(row: &PgRow) -> Result<MatchRecord, StoreError> {
    let id: String = row.try_get("id").map_err(db_error)?;
    let corrupt = |reason: String| StoreError::Corrupt {
        id: id.clone(),
        reason,
    };

    let state: String = row.try_get("state").map_err(db_error)?;
    let state = MatchState::from_str(&state).map_err(|_| corrupt(format!("state '{state}'")))?;

    let result_reason: Option<String> = row.try_get("result_reason").map_err(db_error)?;
    let result_reason = result_reason
        .map(|reason| {
            ResultReason::from_str(&reason).map_err(|_| corrupt(format!("reason '{reason}'")))
        })
        .transpose()?;

    let round: Option<i32> = row.try_get("bracket_round").map_err(db_error)?;
    let position: Option<i32> = row.try_get("bracket_position").map_err(db_error)?;
    let slot = match (round, position) {
        (Some(round), Some(position)) => Some(SlotKey::new(
            u32::try_from(round).map_err(|_| corrupt("negative round".into()))?,
            u32::try_from(position).map_err(|_| corrupt("negative position".into()))?,
        )),
        _ => None,
    };

    let non_negative = |column: &str| -> Result<u32, StoreError> {
        let value: i32 = row.try_get(column).map_err(db_error)?;
        u32::try_from(value).map_err(|_| corrupt(format!("negative {column}")))
    };

    Ok(MatchRecord {
        competition_id: row.try_get("competition_id").map_err(db_error)?,
        slot,
        competitor1_id: row.try_get("competitor1_id").map_err(db_error)?,
        competitor2_id: row.try_get("competitor2_id").map_err(db_error)?,
        judge_id: row.try_get("judge_id").map_err(db_error)?,
        category: row.try_get("category").map_err(db_error)?,
        duration_seconds: non_negative("duration_seconds")?,
        state,
        winner_id: row.try_get("winner_id").map_err(db_error)?,
        result_reason,
        score1: non_negative("score1")?,
        score2: non_negative("score2")?,
        scheduled_at: row
            .try_get::<DateTime<Utc>, _>("scheduled_at")
            .map_err(db_error)?,
        id,
    })
}

#[async_trait]
impl MatchStore for PostgresMatchStore {
    #[instrument(skip(self, new_match))]
    async fn create_match(&self, new_match: NewMatch) -> Result<MatchRecord, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        debug!(match_id = %id, "Inserting match into database");

        let query = format!(
            "INSERT INTO matches (id, competition_id, bracket_round, bracket_position, \
             competitor1_id, competitor2_id, judge_id, category, duration_seconds, state, \
             score1, score2, scheduled_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, 0, $11) \
             RETURNING {MATCH_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(&id)
            .bind(&new_match.competition_id)
            .bind(new_match.slot.map(|s| s.round as i32))
            .bind(new_match.slot.map(|s| s.position as i32))
            .bind(&new_match.competitor1_id)
            .bind(&new_match.competitor2_id)
            .bind(&new_match.judge_id)
            .bind(&new_match.category)
            .bind(new_match.duration_seconds as i32)
            .bind(MatchState::Scheduled.as_ref())
            .bind(new_match.scheduled_at)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        row_to_record(&row)
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchRecord>, StoreError> {
        let query = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    #[instrument(skip(self, filter))]
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchRecord>, StoreError> {
        let query = format!(
            "SELECT {MATCH_COLUMNS} FROM matches \
             WHERE ($1::TEXT IS NULL OR competition_id = $1) \
               AND ($2::TEXT IS NULL OR state = $2) \
             ORDER BY scheduled_at, id \
             OFFSET $3 LIMIT $4"
        );

        let rows = sqlx::query(&query)
            .bind(&filter.competition_id)
            .bind(filter.state.map(|s| s.to_string()))
            .bind(filter.offset as i64)
            .bind(filter.limit.map(|l| l as i64))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter().map(row_to_record).collect()
    }

    #[instrument(skip(self))]
    async fn update_state(&self, match_id: &str, state: MatchState) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE matches SET state = $2 WHERE id = $1")
            .bind(match_id)
            .bind(state.as_ref())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            warn!(match_id = %match_id, "Match not found for state update");
            return Err(StoreError::NotFound(match_id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_category(
        &self,
        match_id: &str,
        category: &str,
        duration_seconds: u32,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE matches SET category = $2, duration_seconds = $3 WHERE id = $1")
                .bind(match_id)
                .bind(category)
                .bind(duration_seconds as i32)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;

        if result.rows_affected() == 0 {
            warn!(match_id = %match_id, "Match not found for category update");
            return Err(StoreError::NotFound(match_id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, result))]
    async fn record_result(
        &self,
        match_id: &str,
        result: &MatchResultUpdate,
    ) -> Result<(), StoreError> {
        let outcome = sqlx::query(
            "UPDATE matches SET state = $2, winner_id = $3, result_reason = $4, \
             score1 = $5, score2 = $6 WHERE id = $1",
        )
        .bind(match_id)
        .bind(MatchState::Finalized.as_ref())
        .bind(&result.winner_id)
        .bind(result.result_reason.as_ref())
        .bind(result.score1 as i32)
        .bind(result.score2 as i32)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if outcome.rows_affected() == 0 {
            warn!(match_id = %match_id, "Match not found for result update");
            return Err(StoreError::NotFound(match_id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_competition_matches(&self, competition_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM matches WHERE competition_id = $1")
            .bind(competition_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected())
    }
}
