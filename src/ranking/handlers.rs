use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::models::RankingEntry;
use crate::shared::{AppError, AppState};

/// GET /rankings
///
/// Public standings ordered by position
#[instrument(name = "list_rankings", skip(state))]
pub async fn list_rankings(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankingEntry>>, AppError> {
    let standings = state.ranking_store.standings().await?;
    info!(entries = standings.len(), "Rankings listed");
    Ok(Json(standings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{InMemoryRankingStore, RankingStore};
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_list_rankings_handler() {
        let ranking = Arc::new(InMemoryRankingStore::new());
        ranking.record_result("aka", "ao").await.unwrap();
        ranking.recalculate_positions().await.unwrap();

        let app = Router::new()
            .route("/rankings", axum::routing::get(list_rankings))
            .with_state(AppStateBuilder::new().with_ranking_store(ranking).build());

        let request = Request::builder()
            .uri("/rankings")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let standings: Vec<RankingEntry> = serde_json::from_slice(&body).unwrap();
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].competitor_id, "aka");
        assert_eq!(standings[0].position, 1);
        assert_eq!(standings[1].losses, 1);
    }
}
