use bevy::prelude::*;
use limb_arbiter_core::{AnimationState, AppendageId, ArbiterEvent};

/// A committed transition the renderer should play on `appendage`.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct AppendagePlayback {
    pub entity: Entity,
    pub appendage: AppendageId,
    pub state: AnimationState,
    pub blend_time: f32,
}

/// Every semantic event an avatar's engine produced this tick.
#[derive(Event, Clone, Debug)]
pub struct ArbiterReport {
    pub entity: Entity,
    pub event: ArbiterEvent,
}

/// Recovery: reset both appendages of `entity` to Idle on the next tick.
#[derive(Event, Clone, Copy, Debug)]
pub struct ForceIdleAvatar {
    pub entity: Entity,
}
