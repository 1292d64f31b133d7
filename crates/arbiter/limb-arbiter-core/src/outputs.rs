//! Output contracts from the engine.
//!
//! Outputs carry the semantic events of this tick plus a snapshot of both
//! appendages. Hosts use them for logging, analytics and recovery policy.

use serde::{Deserialize, Serialize};

use crate::error::RejectKind;
use crate::ids::{AppendageId, SourceId};
use crate::machine::AppendageState;
use crate::state::AnimationState;

/// Discrete signals emitted during a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ArbiterEvent {
    TransitionAccepted {
        appendage: AppendageId,
        from: AnimationState,
        to: AnimationState,
        blend_time: f32,
        retrigger: bool,
        source: Option<SourceId>,
    },
    TransitionRejected {
        appendage: AppendageId,
        requested: AnimationState,
        kind: RejectKind,
        source: Option<SourceId>,
    },
    /// The owning source signalled completion; the state no longer holds the appendage.
    StateReleased {
        appendage: AppendageId,
        state: AnimationState,
    },
    /// A completion came from a source that does not own the current state.
    CompletionIgnored {
        appendage: AppendageId,
        state: AnimationState,
        source: Option<SourceId>,
        owner: Option<SourceId>,
    },
    /// Reported once per lock episode; never corrected by the engine.
    StuckLock {
        appendage: AppendageId,
        state: AnimationState,
        held_for: f64,
    },
    ForcedIdle {
        appendage: AppendageId,
        from: AnimationState,
    },
}

impl ArbiterEvent {
    #[inline]
    pub fn appendage(&self) -> AppendageId {
        match self {
            Self::TransitionAccepted { appendage, .. }
            | Self::TransitionRejected { appendage, .. }
            | Self::StateReleased { appendage, .. }
            | Self::CompletionIgnored { appendage, .. }
            | Self::StuckLock { appendage, .. }
            | Self::ForcedIdle { appendage, .. } => *appendage,
        }
    }
}

/// Outputs returned by `Engine::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<ArbiterEvent>,
    /// State of every appendage after the tick, in `AppendageId` order.
    #[serde(default)]
    pub appendages: Vec<AppendageState>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
        self.appendages.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: ArbiterEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Accepted transitions of this tick.
    pub fn accepted(&self) -> impl Iterator<Item = &ArbiterEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, ArbiterEvent::TransitionAccepted { .. }))
    }

    pub fn rejections(&self) -> impl Iterator<Item = (AppendageId, AnimationState, RejectKind)> + '_ {
        self.events.iter().filter_map(|e| match e {
            ArbiterEvent::TransitionRejected {
                appendage,
                requested,
                kind,
                ..
            } => Some((*appendage, *requested, *kind)),
            _ => None,
        })
    }

    pub fn current(&self, appendage: AppendageId) -> Option<AnimationState> {
        appendage
            .index()
            .and_then(|i| self.appendages.get(i))
            .map(|s| s.current)
    }
}
