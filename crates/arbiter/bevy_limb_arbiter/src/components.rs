use bevy::prelude::*;
use limb_arbiter_core::{Engine, Inputs};

use crate::resources::{ArbiterSettings, SharedRegistry};

/// Per-avatar arbitration engine.
#[derive(Component, Debug)]
pub struct AvatarArbiter(pub Engine);

/// Subsystem snapshots for the next tick. Gameplay systems write these.
///
/// Snapshots persist between frames; `direct` signals and `force_idle` are
/// consumed by the tick that sees them.
#[derive(Component, Debug, Default, Clone)]
pub struct AvatarInputs(pub Inputs);

#[derive(Bundle)]
pub struct AvatarArbiterBundle {
    pub arbiter: AvatarArbiter,
    pub inputs: AvatarInputs,
}

impl AvatarArbiterBundle {
    /// Engine with the built-in sources, starting Idle at host time `now`.
    pub fn new(registry: &SharedRegistry, settings: &ArbiterSettings, now: f64) -> Self {
        Self {
            arbiter: AvatarArbiter(Engine::with_default_sources(
                registry.0.clone(),
                settings.engine.clone(),
                &settings.sources,
                now,
            )),
            inputs: AvatarInputs::default(),
        }
    }
}
