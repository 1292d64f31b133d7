//! Limb Arbiter Core (engine-agnostic)
//!
//! Resolves competing animation requests for an avatar's two appendages into
//! one state per appendage. Priorities, locks, tiers and blend times come from
//! a data-driven registry; the arbiter is the only path that mutates an
//! appendage, and only after the playback sink confirms the state can play.
//!
//! Hosts either drive `Arbiter` directly or feed typed subsystem snapshots to
//! `Engine::update` once per tick.

pub mod adapters;
pub mod arbiter;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod machine;
pub mod outputs;
pub mod registry;
pub mod sink;
pub mod state;

// Re-exports for consumers (adapters)
pub use adapters::{
    AbilityAdapter, CombatAdapter, CombatConfig, EmoteAdapter, FlightAdapter, FlightConfig,
    MovementAdapter, MovementConfig, SourcesConfig, StateSource,
};
pub use arbiter::{decide, Accepted, Arbiter, Decision, RejectReason, TransitionRequest};
pub use config::{BlendTimes, EngineConfig, RegistryConfig, StateSpec, TierSpec};
pub use engine::Engine;
pub use error::{ArbiterError, ConfigError, RejectKind};
pub use ids::{AppendageId, SourceId};
pub use inputs::{
    AbilitySnapshot, CombatSnapshot, EmoteSnapshot, FlightSnapshot, Inputs, MovementSnapshot,
    SourceSignal,
};
pub use machine::{AppendageState, AppendageStateMachine, Completion};
pub use outputs::{ArbiterEvent, Outputs};
pub use registry::AnimationStateRegistry;
pub use sink::{AcceptAllSink, CatalogSink, PlayCommand, PlaybackError, PlaybackSink};
pub use state::{AnimationState, BlendClass, LockClass};
