//! End-to-end scenarios from §8 of the coordination spec, driven directly
//! against the `Arbiter` API in place of HTTP fixtures (SPEC_FULL.md §8).

use std::collections::HashMap;

use arbiter_core::{ErrorKind, SessionStatus, StateDoc};
use arbiter_runtime::{Arbiter, ArbiterConfig};

async fn claimed_agent(arbiter: &Arbiter) -> (arbiter_core::AgentId, String) {
    let (agent_id, claim_secret) = arbiter.register_agent().await;
    let bearer = arbiter
        .claim_agent(&agent_id, &claim_secret)
        .await
        .expect("claim should succeed for a freshly registered agent");
    (agent_id, bearer)
}

#[tokio::test]
async fn scholars_mate_ends_the_session_in_seven_moves() {
    let arbiter = Arbiter::new(ArbiterConfig::default());
    let (white_id, white_bearer) = claimed_agent(&arbiter).await;
    let (black_id, _black_bearer) = claimed_agent(&arbiter).await;

    let mut participants = HashMap::new();
    participants.insert("white".to_string(), Some(white_id.clone()));
    participants.insert("black".to_string(), Some(black_id.clone()));
    let created = arbiter
        .create_session(&white_id, "chess.v1", participants)
        .await
        .expect("both roles bound up front, so the session starts active");
    assert_eq!(created.status, SessionStatus::Active);

    let moves = ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"];
    let bearers = [&white_bearer, &_black_bearer];
    let mut tick = arbiter_core::Tick::ZERO;
    let mut last_status = SessionStatus::Active;
    for (i, mv) in moves.iter().enumerate() {
        let bearer = bearers[i % 2];
        let outcome = arbiter
            .submit_action(bearer, &created.session_id, mv, Some(tick))
            .await
            .unwrap_or_else(|e| panic!("move {mv} at step {i} should be accepted: {e}"));
        tick = outcome.tick;
        last_status = outcome.status;
    }

    assert_eq!(tick.0, 7);
    assert_eq!(last_status, SessionStatus::Completed);

    let log = arbiter.read_log(&created.session_id, &white_id).await.unwrap();
    assert_eq!(log.len(), 7);
}

#[tokio::test]
async fn chess_rejects_an_out_of_turn_move() {
    let arbiter = Arbiter::new(ArbiterConfig::default());
    let (white_id, _white_bearer) = claimed_agent(&arbiter).await;
    let (black_id, black_bearer) = claimed_agent(&arbiter).await;

    let mut participants = HashMap::new();
    participants.insert("white".to_string(), Some(white_id.clone()));
    participants.insert("black".to_string(), Some(black_id));
    let created = arbiter
        .create_session(&white_id, "chess.v1", participants)
        .await
        .unwrap();

    let err = arbiter
        .submit_action(&black_bearer, &created.session_id, "e7e5", Some(arbiter_core::Tick::ZERO))
        .await
        .expect_err("black cannot move before white on the opening position");
    assert_eq!(err.kind(), ErrorKind::InvalidAction);

    let view = arbiter.read_session(&created.session_id, &white_id).await.unwrap();
    assert_eq!(view.tick.0, 0);
}

#[tokio::test]
async fn chess_rejects_a_stale_expected_tick() {
    let arbiter = Arbiter::new(ArbiterConfig::default());
    let (white_id, white_bearer) = claimed_agent(&arbiter).await;
    let (black_id, _black_bearer) = claimed_agent(&arbiter).await;

    let mut participants = HashMap::new();
    participants.insert("white".to_string(), Some(white_id.clone()));
    participants.insert("black".to_string(), Some(black_id));
    let created = arbiter
        .create_session(&white_id, "chess.v1", participants)
        .await
        .unwrap();

    let first = arbiter
        .submit_action(&white_bearer, &created.session_id, "e2e4", Some(arbiter_core::Tick::ZERO))
        .await
        .expect("first move with tick 0 succeeds");
    assert_eq!(first.tick.0, 1);

    let err = arbiter
        .submit_action(&white_bearer, &created.session_id, "d2d4", Some(arbiter_core::Tick::ZERO))
        .await
        .expect_err("resubmitting against the stale tick must conflict");
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn rps_happy_path_resolves_on_the_second_submission() {
    let arbiter = Arbiter::new(ArbiterConfig::default());
    let (p1_id, p1_bearer) = claimed_agent(&arbiter).await;
    let (p2_id, p2_bearer) = claimed_agent(&arbiter).await;

    let mut participants = HashMap::new();
    participants.insert("player_1".to_string(), Some(p1_id.clone()));
    participants.insert("player_2".to_string(), Some(p2_id.clone()));
    let created = arbiter
        .create_session(&p1_id, "rps.v1", participants)
        .await
        .unwrap();

    let after_p1 = arbiter
        .submit_action(&p1_bearer, &created.session_id, "rock", None)
        .await
        .unwrap();
    assert_eq!(after_p1.status, SessionStatus::Active);

    let p2_view = arbiter.read_session(&created.session_id, &p2_id).await.unwrap();
    let StateDoc::RpsV1(state) = &p2_view.state else {
        panic!("rps session should carry an RpsV1 state document");
    };
    assert_eq!(
        state.player_1,
        arbiter_core::template::rps::ChoiceSlot::Hidden
    );

    let after_p2 = arbiter
        .submit_action(&p2_bearer, &created.session_id, "scissors", None)
        .await
        .unwrap();
    assert_eq!(after_p2.status, SessionStatus::Completed);

    let log = arbiter.read_log(&created.session_id, &p1_id).await.unwrap();
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn rps_rejects_a_second_submission_from_the_same_role() {
    let arbiter = Arbiter::new(ArbiterConfig::default());
    let (p1_id, p1_bearer) = claimed_agent(&arbiter).await;
    let (p2_id, _p2_bearer) = claimed_agent(&arbiter).await;

    let mut participants = HashMap::new();
    participants.insert("player_1".to_string(), Some(p1_id.clone()));
    participants.insert("player_2".to_string(), Some(p2_id.clone()));
    let created = arbiter
        .create_session(&p1_id, "rps.v1", participants)
        .await
        .unwrap();

    arbiter
        .submit_action(&p1_bearer, &created.session_id, "rock", None)
        .await
        .unwrap();

    let err = arbiter
        .submit_action(&p1_bearer, &created.session_id, "paper", None)
        .await
        .expect_err("player_1 already committed this phase");
    assert_eq!(err.kind(), ErrorKind::AlreadyActed);

    let p2_view = arbiter.read_session(&created.session_id, &p2_id).await.unwrap();
    let StateDoc::RpsV1(state) = &p2_view.state else {
        panic!("rps session should carry an RpsV1 state document");
    };
    assert_eq!(
        state.player_1,
        arbiter_core::template::rps::ChoiceSlot::Hidden,
        "the rejected resubmission must not have changed the committed choice"
    );
}

#[tokio::test]
async fn join_by_link_activates_a_waiting_session() {
    let arbiter = Arbiter::new(ArbiterConfig::default());
    let (creator_id, _creator_bearer) = claimed_agent(&arbiter).await;
    let (joiner_id, joiner_bearer) = claimed_agent(&arbiter).await;
    let (outsider_id, outsider_bearer) = claimed_agent(&arbiter).await;

    let mut participants = HashMap::new();
    participants.insert("player_1".to_string(), Some(creator_id.clone()));
    participants.insert("player_2".to_string(), None);
    let created = arbiter
        .create_session(&creator_id, "rps.v1", participants)
        .await
        .expect("creator is a listed participant even with one open slot");
    assert_eq!(created.status, SessionStatus::Waiting);

    let err = arbiter
        .submit_action(&outsider_bearer, &created.session_id, "rock", None)
        .await
        .expect_err("an outsider with no binding cannot act");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let _ = outsider_id;

    let joined = arbiter
        .join_session(&created.session_id, &joiner_id, "player_2")
        .await
        .expect("the open slot accepts any agent naming it");
    assert_eq!(joined.status, SessionStatus::Active);

    let outcome = arbiter
        .submit_action(&joiner_bearer, &created.session_id, "rock", None)
        .await
        .expect("the newly-bound role can now act");
    assert_eq!(outcome.status, SessionStatus::Active);
}

#[tokio::test]
async fn unresolvable_bearer_secret_is_always_unauthorized() {
    let arbiter = Arbiter::new(ArbiterConfig::default());
    let (p1_id, p1_bearer) = claimed_agent(&arbiter).await;
    let (p2_id, _p2_bearer) = claimed_agent(&arbiter).await;

    let mut participants = HashMap::new();
    participants.insert("player_1".to_string(), Some(p1_id.clone()));
    participants.insert("player_2".to_string(), Some(p2_id));
    let created = arbiter
        .create_session(&p1_id, "rps.v1", participants)
        .await
        .unwrap();
    let _ = p1_bearer;

    let err = arbiter
        .submit_action(
            "not-a-real-bearer-secret",
            &created.session_id,
            "rock",
            None,
        )
        .await
        .expect_err("an unresolvable bearer secret must never authorize a submission");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn claim_is_single_use_through_the_arbiter_api() {
    let arbiter = Arbiter::new(ArbiterConfig::default());
    let (agent_id, claim_secret) = arbiter.register_agent().await;

    arbiter
        .claim_agent(&agent_id, &claim_secret)
        .await
        .expect("the first claim with a valid secret succeeds");

    let err = arbiter
        .claim_agent(&agent_id, &claim_secret)
        .await
        .expect_err("a repeat claim with the same one-time secret must fail");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn log_ticks_form_a_contiguous_prefix() {
    let arbiter = Arbiter::new(ArbiterConfig::default());
    let (white_id, white_bearer) = claimed_agent(&arbiter).await;
    let (black_id, black_bearer) = claimed_agent(&arbiter).await;

    let mut participants = HashMap::new();
    participants.insert("white".to_string(), Some(white_id.clone()));
    participants.insert("black".to_string(), Some(black_id));
    let created = arbiter
        .create_session(&white_id, "chess.v1", participants)
        .await
        .unwrap();

    arbiter
        .submit_action(&white_bearer, &created.session_id, "e2e4", Some(arbiter_core::Tick::ZERO))
        .await
        .unwrap();
    arbiter
        .submit_action(
            &black_bearer,
            &created.session_id,
            "e7e5",
            Some(arbiter_core::Tick(1)),
        )
        .await
        .unwrap();

    let log = arbiter.read_log(&created.session_id, &white_id).await.unwrap();
    let ticks: Vec<u64> = log.iter().map(|entry| entry.tick.0).collect();
    assert_eq!(ticks, vec![0, 1]);
}
