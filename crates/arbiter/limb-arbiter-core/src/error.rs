//! Error types for arbitration and registry construction.

use serde::{Deserialize, Serialize};

use crate::ids::AppendageId;
use crate::state::{AnimationState, LockClass};

/// Why a transition request did not take effect.
///
/// Every variant is recoverable; the appendage keeps its prior valid state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArbiterError {
    /// A hard or soft lock blocked the request
    #[error("{appendage}: {requested} blocked by {lock:?} lock held by {current}")]
    RejectedByLock {
        appendage: AppendageId,
        current: AnimationState,
        requested: AnimationState,
        lock: LockClass,
    },

    /// Requested priority insufficient to preempt the current state
    #[error(
        "{appendage}: {requested} (priority {requested_priority}) cannot preempt \
         {current} (priority {current_priority})"
    )]
    RejectedByPriority {
        appendage: AppendageId,
        current: AnimationState,
        requested: AnimationState,
        current_priority: i32,
        requested_priority: i32,
    },

    /// The playback sink could not play the state; nothing was mutated
    #[error("{appendage}: playback of {requested} failed: {reason}")]
    RejectedByMissingAsset {
        appendage: AppendageId,
        requested: AnimationState,
        reason: String,
    },

    /// Re-request of the current, non-retriggerable state
    #[error("{appendage}: already in {state}")]
    RejectedAsNoOp {
        appendage: AppendageId,
        state: AnimationState,
    },

    #[error("invalid appendage id {0:?}")]
    InvalidAppendageId(AppendageId),
}

/// Serializable reason kind, for telemetry and host-side policies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectKind {
    RejectedByLock,
    RejectedByPriority,
    RejectedByMissingAsset,
    RejectedAsNoOp,
    InvalidAppendageId,
}

impl ArbiterError {
    #[inline]
    pub fn kind(&self) -> RejectKind {
        match self {
            Self::RejectedByLock { .. } => RejectKind::RejectedByLock,
            Self::RejectedByPriority { .. } => RejectKind::RejectedByPriority,
            Self::RejectedByMissingAsset { .. } => RejectKind::RejectedByMissingAsset,
            Self::RejectedAsNoOp { .. } => RejectKind::RejectedAsNoOp,
            Self::InvalidAppendageId(_) => RejectKind::InvalidAppendageId,
        }
    }

    /// True for arbitration outcomes, false for caller mistakes.
    #[inline]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::InvalidAppendageId(_))
    }
}

/// Registry configuration problems, reported when building the registry.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("registry json parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no entry for state {0}")]
    MissingState(AnimationState),

    #[error("state {state} references unknown tier '{tier}'")]
    UnknownTier { state: AnimationState, tier: String },

    #[error("blend time '{name}' must be finite and non-negative, got {value}")]
    InvalidBlendTime { name: &'static str, value: f32 },

    #[error("lock threshold for {scope} must be finite and positive, got {value}")]
    InvalidLockThreshold { scope: String, value: f64 },

    #[error("Idle must be unlocked, configured as {0:?}")]
    LockedIdle(LockClass),
}
