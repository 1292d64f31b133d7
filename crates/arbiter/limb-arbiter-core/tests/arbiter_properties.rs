use std::sync::Arc;

use limb_arbiter_core::{
    AcceptAllSink, AnimationState, AnimationStateRegistry, AppendageId, Arbiter, ArbiterError,
    CatalogSink, Completion, LockClass, PlaybackError, PlaybackSink, RegistryConfig, RejectKind,
    TransitionRequest,
};
use AnimationState::*;

const L: AppendageId = AppendageId::LEFT;
const R: AppendageId = AppendageId::RIGHT;

fn default_arbiter() -> Arbiter {
    Arbiter::new(Arc::new(AnimationStateRegistry::default()), 0.0)
}

fn req(appendage: AppendageId, state: AnimationState, t: f64) -> TransitionRequest {
    TransitionRequest::new(appendage, state, t)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-6
}

/// it should let a strictly higher priority preempt unlocked and soft-locked states, and nothing else
#[test]
fn priority_preemption_over_unlocked_and_soft_pairs() {
    let registry = Arc::new(AnimationStateRegistry::default());
    let mut soft_origins = 0;
    for (from, spec) in registry.states() {
        if spec.lock == LockClass::Hard {
            continue;
        }
        if spec.lock == LockClass::Soft {
            soft_origins += 1;
        }
        for to in AnimationState::ALL {
            if to == from {
                continue;
            }
            let mut arbiter = Arbiter::new(Arc::clone(&registry), 0.0);
            let mut sink = AcceptAllSink;
            if from != Idle {
                arbiter
                    .request_transition(req(L, from, 0.1), &mut sink)
                    .unwrap_or_else(|e| panic!("enter {from}: {e}"));
            }

            let result = arbiter.request_transition(req(L, to, 0.2), &mut sink);
            let (pf, pt) = (spec.priority, registry.priority(to));
            if pt > pf {
                assert!(result.is_ok(), "{from} -> {to} should preempt: {result:?}");
                continue;
            }
            if spec.lock == LockClass::Soft {
                assert!(
                    matches!(result, Err(ArbiterError::RejectedByLock { .. })),
                    "{from} -> {to} should be held by the soft lock: {result:?}"
                );
                assert_eq!(arbiter.current(L).unwrap(), from);
            } else if pt < pf && !registry.shares_settling_tier(from, to) {
                assert!(
                    matches!(result, Err(ArbiterError::RejectedByPriority { .. })),
                    "{from} -> {to} should be rejected by priority: {result:?}"
                );
                assert_eq!(arbiter.current(L).unwrap(), from);
            }
        }
    }
    // Jump, TakeOff, Land, Slide, Dive, ArmorPlate
    assert_eq!(soft_origins, 6);
}

/// it should reject everything but a retrigger while a hard lock is held
#[test]
fn hard_lock_containment() {
    let mut arbiter = default_arbiter();
    let mut sink = AcceptAllSink;
    arbiter.request_transition(req(L, Ability, 0.0), &mut sink).unwrap();
    assert_eq!(arbiter.lock_status(L).unwrap(), LockClass::Hard);

    for state in AnimationState::ALL {
        let err = arbiter
            .request_transition(req(L, state, 0.5), &mut sink)
            .unwrap_err();
        if state == Ability {
            // not retriggerable in the default table
            assert_eq!(err.kind(), RejectKind::RejectedAsNoOp);
        } else {
            assert_eq!(err.kind(), RejectKind::RejectedByLock, "{state}");
        }
    }
    assert_eq!(arbiter.current(L).unwrap(), Ability);
}

/// it should allow a retriggerable hard-locked state to replay itself
#[test]
fn hard_lock_allows_configured_retrigger() {
    let json = limb_arbiter_fixtures::registries::json("retriggerable-ability").unwrap();
    let registry = AnimationStateRegistry::from_json_str(&json).unwrap();
    let mut arbiter = Arbiter::new(Arc::new(registry), 0.0);
    let mut sink = AcceptAllSink;

    arbiter.request_transition(req(L, Ability, 0.0), &mut sink).unwrap();
    let again = arbiter.request_transition(req(L, Ability, 0.2), &mut sink).unwrap();
    assert!(again.retrigger);
    assert!(approx(again.blend_time, 0.0));
    assert_eq!(
        arbiter
            .request_transition(req(L, ArmorPlate, 0.3), &mut sink)
            .unwrap_err()
            .kind(),
        RejectKind::RejectedByLock
    );
}

/// it should keep counting a lock's age across retriggers so a looping hard lock still reads as stuck
#[test]
fn retriggered_lock_still_goes_stuck() {
    let json = limb_arbiter_fixtures::registries::json("retriggerable-ability").unwrap();
    let registry = AnimationStateRegistry::from_json_str(&json).unwrap();
    assert_eq!(registry.max_lock_seconds(Ability), 4.0);
    let mut arbiter = Arbiter::new(Arc::new(registry), 0.0);
    let mut sink = AcceptAllSink;

    arbiter.request_transition(req(L, Ability, 0.0), &mut sink).unwrap();
    for i in 1..=12 {
        let acc = arbiter
            .request_transition(req(L, Ability, i as f64), &mut sink)
            .unwrap();
        assert!(acc.retrigger);
    }
    let m = arbiter.machine(L).unwrap();
    assert_eq!(m.state().started_at, 12.0);
    assert_eq!(m.lock_age(12.5), Some(12.5));
    assert!(arbiter.is_stuck(L, 12.5).unwrap());

    // completion ends the episode; the next Ability starts a fresh one
    arbiter.notify_complete(L, Ability).unwrap();
    assert!(!arbiter.is_stuck(L, 12.5).unwrap());
    arbiter.request_transition(req(L, Ability, 13.0), &mut sink).unwrap();
    assert!(!arbiter.is_stuck(L, 16.0).unwrap());
    assert!(arbiter.is_stuck(L, 17.5).unwrap());
}

/// it should treat a repeated Idle request as a no-op and never call the sink
#[test]
fn idle_is_idempotent() {
    let mut arbiter = default_arbiter();
    let mut sink = CatalogSink::complete();
    for i in 0..5 {
        let err = arbiter
            .request_transition(req(R, Idle, i as f64), &mut sink)
            .unwrap_err();
        assert_eq!(err.kind(), RejectKind::RejectedAsNoOp);
    }
    assert!(sink.played().is_empty());
    let m = arbiter.machine(R).unwrap();
    assert_eq!(m.current(), Idle);
    assert_eq!(m.state().started_at, 0.0);
}

/// it should settle Sprint -> Walk -> Idle without any completion signal
#[test]
fn locomotion_tier_settles_downward() {
    let mut arbiter = default_arbiter();
    let mut sink = CatalogSink::complete();
    for (t, state) in [(0.0, Sprint), (1.0, Walk), (2.0, Idle)] {
        let acc = arbiter.request_transition(req(L, state, t), &mut sink).unwrap();
        assert!(approx(acc.blend_time, 0.25));
    }
    assert_eq!(arbiter.current(L).unwrap(), Idle);
    assert_eq!(arbiter.machine(L).unwrap().previous(), Walk);
    assert_eq!(sink.played().len(), 3);
}

/// it should not let flight settle into locomotion while unlocked
#[test]
fn flight_tier_does_not_settle() {
    let mut arbiter = default_arbiter();
    let mut sink = AcceptAllSink;
    arbiter.request_transition(req(L, FlyUp, 0.0), &mut sink).unwrap();
    let err = arbiter.request_transition(req(L, Sprint, 0.1), &mut sink).unwrap_err();
    assert_eq!(err.kind(), RejectKind::RejectedByPriority);
    // lateral moves inside flight are fine
    arbiter.request_transition(req(L, Hover, 0.2), &mut sink).unwrap();
}

/// it should hold a Dive until completion, then allow Idle
#[test]
fn dive_lock_round_trip() {
    let mut arbiter = default_arbiter();
    let mut sink = AcceptAllSink;
    arbiter.request_transition(req(L, Dive, 0.0), &mut sink).unwrap();
    assert_eq!(
        arbiter.request_transition(req(L, Idle, 0.1), &mut sink).unwrap_err().kind(),
        RejectKind::RejectedByLock
    );
    assert_eq!(arbiter.notify_complete(L, Dive).unwrap(), Completion::Released);
    assert_eq!(arbiter.lock_status(L).unwrap(), LockClass::None);
    let acc = arbiter.request_transition(req(L, Idle, 0.6), &mut sink).unwrap();
    assert_eq!(acc.from, Dive);
    assert_eq!(arbiter.current(L).unwrap(), Idle);
}

/// it should restart Shotgun on every shot with a zero blend
#[test]
fn rapid_shotgun_retrigger() {
    let mut arbiter = default_arbiter();
    let mut sink = CatalogSink::complete();
    let first = arbiter.request_transition(req(R, Shotgun, 0.0), &mut sink).unwrap();
    assert!(!first.retrigger);
    assert!(approx(first.blend_time, 0.02));

    for i in 1..=10 {
        let t = i as f64 * 0.03;
        let acc = arbiter.request_transition(req(R, Shotgun, t), &mut sink).unwrap();
        assert!(acc.retrigger);
        assert!(acc.blend_time <= 0.02);
        assert_eq!(arbiter.machine(R).unwrap().state().started_at, t);
    }
    assert_eq!(sink.played().len(), 11);
    assert_eq!(arbiter.current(L).unwrap(), Idle);
}

/// it should keep everything out while an emote plays, and let Sprint in once it completes
#[test]
fn emote_lock_exclusivity() {
    let mut arbiter = default_arbiter();
    let mut sink = AcceptAllSink;
    for a in AppendageId::ALL {
        arbiter.request_transition(req(a, Emote, 0.0), &mut sink).unwrap();
    }
    for a in AppendageId::ALL {
        for state in [Sprint, Shotgun, Ability, Dive, Hover] {
            assert_eq!(
                arbiter.request_transition(req(a, state, 1.0), &mut sink).unwrap_err().kind(),
                RejectKind::RejectedByLock
            );
        }
    }
    // a 5s emote is not stuck under its own 30s threshold
    assert!(!arbiter.is_stuck(L, 5.0).unwrap());

    for a in AppendageId::ALL {
        assert_eq!(arbiter.notify_complete(a, Emote).unwrap(), Completion::Released);
        arbiter.request_transition(req(a, Sprint, 5.1), &mut sink).unwrap();
        assert_eq!(arbiter.current(a).unwrap(), Sprint);
    }
}

/// it should roll back nothing and mutate nothing when the Land clip is missing
#[test]
fn missing_asset_leaves_state_untouched() {
    let mut arbiter = default_arbiter();
    let mut sink = CatalogSink::complete();
    sink.remove(Land);

    arbiter.request_transition(req(L, Jump, 1.0), &mut sink).unwrap();
    let before = arbiter.machine(L).unwrap().state().clone();

    let err = arbiter.request_transition(req(L, Land, 1.4), &mut sink).unwrap_err();
    match err {
        ArbiterError::RejectedByMissingAsset {
            appendage,
            requested,
            ..
        } => {
            assert_eq!(appendage, L);
            assert_eq!(requested, Land);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(arbiter.machine(L).unwrap().state(), &before);
    assert_eq!(sink.played().len(), 1);
    assert_eq!(sink.played()[0].state, Jump);
}

/// Sink whose playback backend is offline.
struct OfflineSink;

impl PlaybackSink for OfflineSink {
    fn try_play(
        &mut self,
        _appendage: AppendageId,
        _state: AnimationState,
        _blend_time: f32,
    ) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unavailable {
            reason: "animator not ready".into(),
        })
    }
}

/// it should reject with the sink's reason when playback is unavailable
#[test]
fn unavailable_sink_rejects_with_reason() {
    let mut arbiter = default_arbiter();
    let err = arbiter
        .request_transition(req(R, Walk, 0.5), &mut OfflineSink)
        .unwrap_err();
    assert_eq!(err.kind(), RejectKind::RejectedByMissingAsset);
    match err {
        ArbiterError::RejectedByMissingAsset { reason, .. } => {
            assert!(reason.contains("animator not ready"), "{reason}");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(arbiter.current(R).unwrap(), Idle);
    assert_eq!(arbiter.machine(R).unwrap().state().started_at, 0.0);
}

/// it should validate registry JSON with the same rules as the builtin table
#[test]
fn fixture_registry_matches_builtin_default() {
    let cfg: RegistryConfig = limb_arbiter_fixtures::registries::load("default").unwrap();
    assert_eq!(cfg, RegistryConfig::default());
    assert!(AnimationStateRegistry::new(cfg).is_ok());
}
