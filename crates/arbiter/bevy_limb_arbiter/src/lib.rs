use std::sync::Arc;

use bevy::prelude::*;
use limb_arbiter_core::{AnimationStateRegistry, ConfigError, RegistryConfig};

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;

pub use components::{AvatarArbiter, AvatarArbiterBundle, AvatarInputs};
pub use events::{AppendagePlayback, ArbiterReport, ForceIdleAvatar};
pub use resources::{ArbiterSettings, AvailableClips, SharedRegistry};

/// Systems that tick avatar engines. Order input-writing systems before it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LimbArbiterSet;

#[derive(Default)]
pub struct LimbArbiterPlugin {
    pub registry: RegistryConfig,
}

impl LimbArbiterPlugin {
    /// Plugin over a designer-authored registry table.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let registry = RegistryConfig::from_json_str(json)?;
        // validate up front so a bad table fails here rather than at build
        AnimationStateRegistry::new(registry.clone())?;
        Ok(Self { registry })
    }
}

impl Plugin for LimbArbiterPlugin {
    fn build(&self, app: &mut App) {
        let registry = match AnimationStateRegistry::new(self.registry.clone()) {
            Ok(registry) => registry,
            Err(e) => {
                error!("limb arbiter registry rejected, using built-in table: {e}");
                AnimationStateRegistry::default()
            }
        };

        app.insert_resource(SharedRegistry(Arc::new(registry)))
            .init_resource::<AvailableClips>()
            .init_resource::<ArbiterSettings>()
            .add_event::<AppendagePlayback>()
            .add_event::<ArbiterReport>()
            .add_event::<ForceIdleAvatar>()
            .add_systems(
                Update,
                (systems::force_idle_system, systems::arbitrate_system)
                    .chain()
                    .in_set(LimbArbiterSet),
            );
    }
}
