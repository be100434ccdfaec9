use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;

use kumite::identity::StaticIdentityProvider;
use kumite::matches::{InMemoryMatchStore, MatchStore};
use kumite::scoring::WinnerResolver;
use kumite::{build_router, AppState};

use super::mocks::{CountingRankingStore, FlakyMatchStore};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    pub router: Router,
    pub records: Arc<InMemoryMatchStore>,
    pub ranking: Arc<CountingRankingStore>,
}

pub struct TestSetupBuilder {
    failing_result_writes: usize,
    judge_id: Option<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            failing_result_writes: 0,
            judge_id: None,
        }
    }

    /// The next `count` result writes to the match store fail
    pub fn with_failing_result_writes(mut self, count: usize) -> Self {
        self.failing_result_writes = count;
        self
    }

    pub fn with_judge(mut self, judge_id: &str) -> Self {
        self.judge_id = Some(judge_id.to_string());
        self
    }

    pub fn build(self) -> TestSetup {
        let records = Arc::new(InMemoryMatchStore::new());
        let ranking = Arc::new(CountingRankingStore::new());

        let match_store: Arc<dyn MatchStore> = if self.failing_result_writes > 0 {
            Arc::new(FlakyMatchStore::new(
                records.clone(),
                self.failing_result_writes,
            ))
        } else {
            records.clone()
        };

        let state = AppState::new(
            match_store,
            ranking.clone(),
            Arc::new(StaticIdentityProvider::new(self.judge_id)),
            WinnerResolver::default(),
        );

        TestSetup {
            router: build_router(state.clone()),
            state,
            records,
            ranking,
        }
    }
}

impl TestSetup {
    /// Sends a request through the full router. `body` of `None` sends a GET.
    pub async fn call(&self, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().uri(uri);
        let request = match body {
            Some(body) => builder
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.method("GET").body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    pub async fn call_ok<T: DeserializeOwned>(&self, uri: &str, body: Option<&str>) -> T {
        let (status, value) = self.call(uri, body).await;
        assert_eq!(status, StatusCode::OK, "{uri} failed: {value}");
        serde_json::from_value(value).unwrap()
    }
}
