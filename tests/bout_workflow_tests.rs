use axum::http::StatusCode;
use std::time::Duration;

use kumite::bout::{BoutPhase, BoutResponse, ResolveResponse};
use kumite::matches::{MatchState, MatchStore};
use kumite::ranking::RankingEntry;
use kumite::scoring::{ClockState, ResultReason};
use kumite::CompetitionEvent;

mod utils;

use utils::*;

async fn open_bout(setup: &TestSetup, competition: Option<&str>) -> BoutResponse {
    let competition = competition
        .map(|c| format!(r#""competition_id": "{c}","#))
        .unwrap_or_default();
    setup
        .call_ok(
            "/bouts",
            Some(&format!(
                r#"{{{competition} "competitor1_id": "aka", "competitor2_id": "ao", "category": "senior"}}"#
            )),
        )
        .await
}

#[tokio::test]
async fn test_bout_won_on_points_updates_store_and_rankings() {
    let setup = TestSetupBuilder::new().with_judge("judge-7").build();
    let bout = open_bout(&setup, Some("spring-cup")).await;
    let mut events = setup.state.event_bus.subscribe("spring-cup").await;

    for technique in ["ippon", "yuko"] {
        setup
            .call_ok::<BoutResponse>(
                &format!("/bouts/{}/points", bout.id),
                Some(&format!(r#"{{"side": "competitor2", "technique": "{technique}"}}"#)),
            )
            .await;
    }
    setup
        .call_ok::<BoutResponse>(
            &format!("/bouts/{}/points", bout.id),
            Some(r#"{"side": "competitor1", "technique": "wazaari"}"#),
        )
        .await;

    let undone: BoutResponse = setup
        .call_ok(
            &format!("/bouts/{}/points/undo", bout.id),
            Some(r#"{"side": "competitor2"}"#),
        )
        .await;
    assert_eq!(undone.competitor2.total, 1);
    assert_eq!(undone.competitor2.score.ippon, 0);

    let resolved: ResolveResponse = setup
        .call_ok(&format!("/bouts/{}/resolve", bout.id), Some("{}"))
        .await;
    assert_eq!(resolved.bout.phase, BoutPhase::Finalized);
    let result = resolved.bout.result.unwrap();
    assert_eq!(result.winner_id(), Some("aka"));
    assert_eq!(result.final_score(), (2, 1));

    let record = setup.records.get_match(&bout.id).await.unwrap().unwrap();
    assert_eq!(record.state, MatchState::Finalized);
    assert_eq!(record.result_reason, Some(ResultReason::ByPoints));
    assert_eq!((record.score1, record.score2), (2, 1));

    match events.recv().await.unwrap() {
        CompetitionEvent::BoutFinalized { recorded_by, .. } => {
            assert_eq!(recorded_by.as_deref(), Some("judge-7"));
        }
        other => panic!("unexpected event {other:?}"),
    }

    let standings: Vec<RankingEntry> = setup.call_ok("/rankings", None).await;
    assert_eq!(standings[0].competitor_id, "aka");
    assert_eq!(standings[0].wins, 1);
    assert_eq!(standings[1].losses, 1);
}

#[tokio::test]
async fn test_store_failure_keeps_result_pending_until_retry() {
    let setup = TestSetupBuilder::new()
        .with_failing_result_writes(1)
        .build();
    let bout = open_bout(&setup, None).await;

    let (status, body) = setup
        .call(
            &format!("/bouts/{}/winner", bout.id),
            Some(r#"{"side": "competitor2", "reason": "by_direct_decision"}"#),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("connection reset"));

    let pending: BoutResponse = setup.call_ok(&format!("/bouts/{}", bout.id), None).await;
    assert_eq!(pending.phase, BoutPhase::AwaitingConfirmation);
    assert!(pending.last_error.is_some());
    assert_eq!(setup.ranking.recorded(), 0);

    // Score is frozen while the result waits
    let (status, _) = setup
        .call(
            &format!("/bouts/{}/points", bout.id),
            Some(r#"{"side": "competitor1", "technique": "yuko"}"#),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let finalized: BoutResponse = setup
        .call_ok(&format!("/bouts/{}/finalize", bout.id), Some("{}"))
        .await;
    assert_eq!(finalized.phase, BoutPhase::Finalized);
    assert!(finalized.last_error.is_none());
    assert_eq!(setup.ranking.recorded(), 1);

    // A second finalize is a no-op
    setup
        .call_ok::<BoutResponse>(&format!("/bouts/{}/finalize", bout.id), Some("{}"))
        .await;
    assert_eq!(setup.ranking.recorded(), 1);
}

#[tokio::test]
async fn test_withdrawn_result_resumes_scoring() {
    let setup = TestSetupBuilder::new()
        .with_failing_result_writes(1)
        .build();
    let bout = open_bout(&setup, None).await;

    setup
        .call(
            &format!("/bouts/{}/winner", bout.id),
            Some(r#"{"side": "competitor1"}"#),
        )
        .await;

    let withdrawn: BoutResponse = setup
        .call_ok(&format!("/bouts/{}/withdraw", bout.id), Some("{}"))
        .await;
    assert_eq!(withdrawn.phase, BoutPhase::Scoring);

    let scored: BoutResponse = setup
        .call_ok(
            &format!("/bouts/{}/points", bout.id),
            Some(r#"{"side": "competitor1", "technique": "yuko"}"#),
        )
        .await;
    assert_eq!(scored.competitor1.total, 1);
}

#[tokio::test]
async fn test_tied_bout_goes_to_hantei_and_can_be_revoted() {
    let setup = TestSetupBuilder::new().build();
    let bout = open_bout(&setup, None).await;

    let resolved: ResolveResponse = setup
        .call_ok(&format!("/bouts/{}/resolve", bout.id), Some("{}"))
        .await;
    assert_eq!(resolved.bout.phase, BoutPhase::Hantei);
    assert_eq!(resolved.bout.hantei.as_ref().unwrap().ballots().len(), 5);

    for (index, ballot) in [(0, "competitor1"), (1, "competitor2")] {
        setup
            .call_ok::<BoutResponse>(
                &format!("/bouts/{}/hantei/ballots", bout.id),
                Some(&format!(r#"{{"judge_index": {index}, "ballot": "{ballot}"}}"#)),
            )
            .await;
    }

    let tied: ResolveResponse = setup
        .call_ok(&format!("/bouts/{}/hantei/confirm", bout.id), Some("{}"))
        .await;
    assert_eq!(tied.bout.phase, BoutPhase::Hantei);
    assert!(tied.bout.result.is_none());
    assert_eq!(setup.ranking.recorded(), 0);

    let (status, _) = setup
        .call(
            &format!("/bouts/{}/hantei/ballots", bout.id),
            Some(r#"{"judge_index": 5, "ballot": "competitor1"}"#),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    setup
        .call_ok::<BoutResponse>(
            &format!("/bouts/{}/hantei/ballots", bout.id),
            Some(r#"{"judge_index": 4, "ballot": "competitor2"}"#),
        )
        .await;

    let decided: ResolveResponse = setup
        .call_ok(&format!("/bouts/{}/hantei/confirm", bout.id), Some("{}"))
        .await;
    let result = decided.bout.result.unwrap();
    assert_eq!(result.winner_id(), Some("ao"));
    assert_eq!(result.reason(), ResultReason::ByHanteiDecision);
    assert_eq!(result.final_score(), (0, 0));
}

#[tokio::test]
async fn test_override_beats_ballot_majority() {
    let setup = TestSetupBuilder::new().build();
    let bout = open_bout(&setup, None).await;
    setup
        .call_ok::<ResolveResponse>(&format!("/bouts/{}/resolve", bout.id), Some("{}"))
        .await;

    for index in 0..3 {
        setup
            .call_ok::<BoutResponse>(
                &format!("/bouts/{}/hantei/ballots", bout.id),
                Some(&format!(r#"{{"judge_index": {index}, "ballot": "competitor2"}}"#)),
            )
            .await;
    }
    setup
        .call_ok::<BoutResponse>(
            &format!("/bouts/{}/hantei/override", bout.id),
            Some(r#"{"side": "competitor1", "value": true}"#),
        )
        .await;

    let decided: ResolveResponse = setup
        .call_ok(&format!("/bouts/{}/hantei/confirm", bout.id), Some("{}"))
        .await;
    let result = decided.bout.result.unwrap();
    assert_eq!(result.winner_id(), Some("aka"));
    assert_eq!(result.reason(), ResultReason::ByDirectDecision);
}

#[tokio::test(start_paused = true)]
async fn test_clock_counts_down_and_pauses() {
    let setup = TestSetupBuilder::new().build();
    let bout = open_bout(&setup, None).await;

    let started: BoutResponse = setup
        .call_ok(&format!("/bouts/{}/clock/start", bout.id), Some("{}"))
        .await;
    assert_eq!(started.clock.state, ClockState::Running);

    let record = setup.records.get_match(&bout.id).await.unwrap().unwrap();
    assert_eq!(record.state, MatchState::InProgress);

    tokio::time::sleep(Duration::from_millis(5500)).await;

    let paused: BoutResponse = setup
        .call_ok(&format!("/bouts/{}/clock/pause", bout.id), Some("{}"))
        .await;
    assert_eq!(paused.clock.state, ClockState::Paused);
    assert_eq!(paused.clock.remaining_seconds, 175);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let still: BoutResponse = setup.call_ok(&format!("/bouts/{}", bout.id), None).await;
    assert_eq!(still.clock.remaining_seconds, 175);

    let reset: BoutResponse = setup
        .call_ok(
            &format!("/bouts/{}/clock/reset", bout.id),
            Some(r#"{"duration_seconds": 60}"#),
        )
        .await;
    assert_eq!(reset.clock.state, ClockState::Idle);
    assert_eq!(reset.clock.remaining_seconds, 60);
}

#[tokio::test]
async fn test_penalties_are_recorded_but_do_not_score() {
    let setup = TestSetupBuilder::new().build();
    let bout = open_bout(&setup, None).await;

    let penalised: BoutResponse = setup
        .call_ok(
            &format!("/bouts/{}/penalties", bout.id),
            Some(r#"{"side": "competitor1", "category": "category2", "flag": "hansoku_chui", "value": true}"#),
        )
        .await;

    assert!(penalised.competitor1.penalties.category2.hansoku_chui);
    assert!(!penalised.competitor1.penalties.category1.hansoku_chui);
    assert_eq!(penalised.competitor1.total, 0);
    assert_eq!(penalised.competitor2.total, 0);
}

#[tokio::test]
async fn test_decided_bout_is_released_and_stays_finalized() {
    let setup = TestSetupBuilder::new().build();
    let bout = open_bout(&setup, None).await;
    assert_eq!(setup.state.bout_service.active_count().await, 1);

    // Kiken before the clock ever ran
    setup
        .call_ok::<BoutResponse>(
            &format!("/bouts/{}/winner", bout.id),
            Some(r#"{"side": "competitor1"}"#),
        )
        .await;
    assert_eq!(setup.state.bout_service.active_count().await, 0);

    let (status, _) = setup
        .call(&format!("/bouts/{}/clock/start", bout.id), Some("{}"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let record = setup.records.get_match(&bout.id).await.unwrap().unwrap();
    assert_eq!(record.state, MatchState::Finalized);
    assert_eq!(record.winner_id.as_deref(), Some("aka"));

    let reread: BoutResponse = setup.call_ok(&format!("/bouts/{}", bout.id), None).await;
    assert_eq!(reread.phase, BoutPhase::Finalized);
    assert_eq!(reread.result.unwrap().winner_id(), Some("aka"));
    assert_eq!(setup.state.bout_service.active_count().await, 0);
}
