//! Input contracts for the engine.
//!
//! Each gameplay subsystem hands the engine a typed snapshot of its state for
//! the current tick. Adapters read only their own snapshot; nothing reaches
//! into another subsystem's internals.

use serde::{Deserialize, Serialize};

use crate::ids::AppendageId;
use crate::state::AnimationState;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(default)]
    pub movement: Option<MovementSnapshot>,
    #[serde(default)]
    pub flight: Option<FlightSnapshot>,
    #[serde(default)]
    pub combat: Option<CombatSnapshot>,
    #[serde(default)]
    pub ability: Option<AbilitySnapshot>,
    #[serde(default)]
    pub emote: Option<EmoteSnapshot>,
    /// Raw signals from the host, processed after every registered source.
    #[serde(default)]
    pub direct: Vec<SourceSignal>,
    /// Recovery request (death, scene reset, detected stuck lock).
    #[serde(default)]
    pub force_idle: bool,
}

/// Ground movement as reported by the character controller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementSnapshot {
    /// Horizontal speed in metres per second.
    pub speed: f32,
    #[serde(default)]
    pub airborne: bool,
    #[serde(default)]
    pub landing: bool,
    #[serde(default)]
    pub diving: bool,
    #[serde(default)]
    pub sliding: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightSnapshot {
    pub flying: bool,
    #[serde(default)]
    pub taking_off: bool,
    /// Steering input: x = strafe (right +), y = vertical (up +), z = forward (+).
    #[serde(default)]
    pub input: [f32; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    /// Appendage holding the weapon.
    pub hand: AppendageId,
    /// A shotgun shot went off this tick.
    #[serde(default)]
    pub shotgun_fired: bool,
    #[serde(default)]
    pub beam_held: bool,
    #[serde(default)]
    pub armor_plate_held: bool,
}

impl Default for CombatSnapshot {
    fn default() -> Self {
        Self {
            hand: AppendageId::RIGHT,
            shotgun_fired: false,
            beam_held: false,
            armor_plate_held: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilitySnapshot {
    pub active: bool,
    /// Appendages the ability animates.
    #[serde(default = "both_appendages")]
    pub appendages: Vec<AppendageId>,
}

impl Default for AbilitySnapshot {
    fn default() -> Self {
        Self {
            active: false,
            appendages: both_appendages(),
        }
    }
}

fn both_appendages() -> Vec<AppendageId> {
    AppendageId::ALL.to_vec()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmoteSnapshot {
    pub playing: bool,
}

/// What a source asks of an appendage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSignal {
    Request {
        appendage: AppendageId,
        state: AnimationState,
    },
    Complete {
        appendage: AppendageId,
        state: AnimationState,
    },
}

impl SourceSignal {
    #[inline]
    pub fn appendage(&self) -> AppendageId {
        match *self {
            Self::Request { appendage, .. } | Self::Complete { appendage, .. } => appendage,
        }
    }

    #[inline]
    pub fn state(&self) -> AnimationState {
        match *self {
            Self::Request { state, .. } | Self::Complete { state, .. } => state,
        }
    }
}
