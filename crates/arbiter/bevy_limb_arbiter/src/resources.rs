use std::collections::HashSet;
use std::sync::Arc;

use bevy::prelude::*;
use limb_arbiter_core::{AnimationState, AnimationStateRegistry, EngineConfig, SourcesConfig};

/// Validated registry shared by every avatar's engine.
#[derive(Resource, Clone, Debug)]
pub struct SharedRegistry(pub Arc<AnimationStateRegistry>);

/// Clips the renderer can actually play. Playback of anything else is refused,
/// which the arbiter reports as a missing asset and leaves the avatar unchanged.
#[derive(Resource, Clone, Debug)]
pub struct AvailableClips {
    states: HashSet<AnimationState>,
}

impl Default for AvailableClips {
    fn default() -> Self {
        Self {
            states: AnimationState::ALL.into_iter().collect(),
        }
    }
}

impl AvailableClips {
    pub fn empty() -> Self {
        Self {
            states: HashSet::new(),
        }
    }

    pub fn insert(&mut self, state: AnimationState) {
        self.states.insert(state);
    }

    pub fn remove(&mut self, state: AnimationState) {
        self.states.remove(&state);
    }

    #[inline]
    pub fn contains(&self, state: AnimationState) -> bool {
        self.states.contains(&state)
    }
}

/// Settings applied to engines created through `AvatarArbiterBundle`.
#[derive(Resource, Clone, Debug, Default)]
pub struct ArbiterSettings {
    pub engine: EngineConfig,
    pub sources: SourcesConfig,
}
