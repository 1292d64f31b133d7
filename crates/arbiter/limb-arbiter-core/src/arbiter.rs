//! Transition arbiter: the single source of truth for transition rules.
//!
//! `decide` is a pure function of the registry, the appendage's state and the
//! requested state. `Arbiter` wraps it with the one permitted mutation path:
//! decide, ask the sink to play, and only then commit.

use std::sync::Arc;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::ArbiterError;
use crate::ids::{AppendageId, SourceId};
use crate::machine::{AppendageState, AppendageStateMachine, Completion};
use crate::registry::AnimationStateRegistry;
use crate::sink::PlaybackSink;
use crate::state::{AnimationState, LockClass};

/// One request to move an appendage into a state.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub appendage: AppendageId,
    pub state: AnimationState,
    /// Host clock in seconds.
    pub timestamp: f64,
    #[serde(default)]
    pub source: Option<SourceId>,
}

impl TransitionRequest {
    pub fn new(appendage: AppendageId, state: AnimationState, timestamp: f64) -> Self {
        Self {
            appendage,
            state,
            timestamp,
            source: None,
        }
    }

    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = Some(source);
        self
    }
}

/// Why `decide` turned a request down.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    NoOp,
    Lock(LockClass),
    Priority { current: i32, requested: i32 },
}

/// Outcome of the pure decision step, before playback.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Decision {
    Accept { blend_time: f32, retrigger: bool },
    Reject(RejectReason),
}

/// Decide whether `current` may transition into `requested`.
///
/// Rules, in order: retrigger, hard lock, soft lock, priority with
/// settling-tier exemption. A released state holds no claim, so anything
/// (including the same state, played fresh) is accepted.
pub fn decide(
    registry: &AnimationStateRegistry,
    current: &AppendageState,
    requested: AnimationState,
) -> Decision {
    let from = current.current;
    let blend_time = registry.blend_time(from, requested);

    if current.released {
        return Decision::Accept {
            blend_time,
            retrigger: false,
        };
    }

    if requested == from {
        return if registry.is_retriggerable(requested) {
            Decision::Accept {
                blend_time,
                retrigger: true,
            }
        } else {
            Decision::Reject(RejectReason::NoOp)
        };
    }

    let current_priority = registry.priority(from);
    let requested_priority = registry.priority(requested);

    let accepted = match current.lock {
        LockClass::Hard => return Decision::Reject(RejectReason::Lock(LockClass::Hard)),
        LockClass::Soft => {
            if requested_priority > current_priority {
                true
            } else {
                return Decision::Reject(RejectReason::Lock(LockClass::Soft));
            }
        }
        LockClass::None => {
            requested_priority >= current_priority
                || registry.shares_settling_tier(from, requested)
        }
    };

    if accepted {
        Decision::Accept {
            blend_time,
            retrigger: false,
        }
    } else {
        Decision::Reject(RejectReason::Priority {
            current: current_priority,
            requested: requested_priority,
        })
    }
}

/// A committed transition.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Accepted {
    pub appendage: AppendageId,
    pub from: AnimationState,
    pub to: AnimationState,
    pub blend_time: f32,
    pub retrigger: bool,
}

/// Owns both appendage machines and funnels every mutation through `decide`.
#[derive(Debug, Clone)]
pub struct Arbiter {
    registry: Arc<AnimationStateRegistry>,
    machines: [AppendageStateMachine; 2],
}

impl Arbiter {
    /// Both appendages start in Idle, unlocked, at `timestamp`.
    pub fn new(registry: Arc<AnimationStateRegistry>, timestamp: f64) -> Self {
        Self {
            registry,
            machines: AppendageId::ALL.map(|id| AppendageStateMachine::new(id, timestamp)),
        }
    }

    pub fn registry(&self) -> &Arc<AnimationStateRegistry> {
        &self.registry
    }

    pub fn machine(&self, appendage: AppendageId) -> Result<&AppendageStateMachine, ArbiterError> {
        appendage
            .index()
            .map(|i| &self.machines[i])
            .ok_or(ArbiterError::InvalidAppendageId(appendage))
    }

    fn machine_mut(
        &mut self,
        appendage: AppendageId,
    ) -> Result<&mut AppendageStateMachine, ArbiterError> {
        appendage
            .index()
            .map(|i| &mut self.machines[i])
            .ok_or(ArbiterError::InvalidAppendageId(appendage))
    }

    pub fn current(&self, appendage: AppendageId) -> Result<AnimationState, ArbiterError> {
        self.machine(appendage).map(|m| m.current())
    }

    pub fn lock_status(&self, appendage: AppendageId) -> Result<LockClass, ArbiterError> {
        self.machine(appendage).map(|m| m.lock_status())
    }

    pub fn machines(&self) -> impl Iterator<Item = &AppendageStateMachine> {
        self.machines.iter()
    }

    /// Evaluate one request; on acceptance play it through `sink` and commit.
    pub fn request_transition(
        &mut self,
        request: TransitionRequest,
        sink: &mut dyn PlaybackSink,
    ) -> Result<Accepted, ArbiterError> {
        let TransitionRequest {
            appendage,
            state: requested,
            timestamp,
            source,
        } = request;

        let registry = Arc::clone(&self.registry);
        let machine = self.machine_mut(appendage)?;
        let from = machine.current();

        let (blend_time, retrigger) = match decide(&registry, machine.state(), requested) {
            Decision::Accept {
                blend_time,
                retrigger,
            } => (blend_time, retrigger),
            Decision::Reject(reason) => {
                let err = match reason {
                    RejectReason::NoOp => ArbiterError::RejectedAsNoOp {
                        appendage,
                        state: requested,
                    },
                    RejectReason::Lock(lock) => ArbiterError::RejectedByLock {
                        appendage,
                        current: from,
                        requested,
                        lock,
                    },
                    RejectReason::Priority {
                        current,
                        requested: requested_priority,
                    } => ArbiterError::RejectedByPriority {
                        appendage,
                        current: from,
                        requested,
                        current_priority: current,
                        requested_priority,
                    },
                };
                trace!("{err}");
                return Err(err);
            }
        };

        if let Err(e) = sink.try_play(appendage, requested, blend_time) {
            warn!("{appendage}: {from} -> {requested} dropped, sink refused: {e}");
            return Err(ArbiterError::RejectedByMissingAsset {
                appendage,
                requested,
                reason: e.to_string(),
            });
        }

        machine.apply_transition(requested, registry.lock_class(requested), timestamp, source);
        debug!("{appendage}: {from} -> {requested} (blend {blend_time}s, retrigger {retrigger})");

        Ok(Accepted {
            appendage,
            from,
            to: requested,
            blend_time,
            retrigger,
        })
    }

    /// Completion signal from the subsystem that requested `state`.
    pub fn notify_complete(
        &mut self,
        appendage: AppendageId,
        state: AnimationState,
    ) -> Result<Completion, ArbiterError> {
        let settling = self.registry.in_settling_tier(state);
        let machine = self.machine_mut(appendage)?;
        let outcome = machine.release(state, settling);
        match outcome {
            Completion::Released => debug!("{appendage}: {state} released"),
            other => trace!("{appendage}: completion of {state} ignored ({other:?})"),
        }
        Ok(outcome)
    }

    /// Recovery: reset both appendages to Idle, clearing every lock.
    pub fn force_idle(&mut self, timestamp: f64) {
        for machine in &mut self.machines {
            machine.force_idle(timestamp);
        }
        debug!("forced idle on all appendages");
    }

    pub fn force_idle_appendage(
        &mut self,
        appendage: AppendageId,
        timestamp: f64,
    ) -> Result<(), ArbiterError> {
        self.machine_mut(appendage)?.force_idle(timestamp);
        debug!("{appendage}: forced idle");
        Ok(())
    }

    /// A lock has outlived its configured maximum without a completion signal.
    pub fn is_stuck(&self, appendage: AppendageId, now: f64) -> Result<bool, ArbiterError> {
        let machine = self.machine(appendage)?;
        let limit = self.registry.max_lock_seconds(machine.current());
        Ok(machine.lock_age(now).is_some_and(|age| age > limit))
    }
}
