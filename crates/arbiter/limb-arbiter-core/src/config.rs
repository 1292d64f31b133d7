//! Designer-facing configuration for the registry and engine.
//!
//! `RegistryConfig` is plain serde data so the priority, lock, tier and blend
//! tables can be authored as JSON and loaded without touching code.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::{AnimationState, BlendClass, LockClass};

/// Per-state row of the registry table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    pub priority: i32,
    #[serde(default)]
    pub lock: LockClass,
    /// Re-requesting this state while in it replays it instead of being a no-op.
    #[serde(default)]
    pub retriggerable: bool,
    /// Name of the tier this state belongs to, if any.
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub blend: BlendClass,
    /// Overrides `RegistryConfig::max_lock_seconds` for this state.
    #[serde(default)]
    pub max_lock_seconds: Option<f64>,
}

impl StateSpec {
    fn new(priority: i32, lock: LockClass, blend: BlendClass) -> Self {
        Self {
            priority,
            lock,
            retriggerable: false,
            tier: None,
            blend,
            max_lock_seconds: None,
        }
    }

    fn in_tier(mut self, tier: &str) -> Self {
        self.tier = Some(tier.to_string());
        self
    }

    fn retriggerable(mut self) -> Self {
        self.retriggerable = true;
        self
    }
}

/// A named priority band.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    /// Lateral and downward transitions inside a settling tier are always allowed.
    #[serde(default)]
    pub settling: bool,
}

/// Blend durations in seconds, one per policy step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlendTimes {
    pub retrigger: f32,
    pub combat: f32,
    pub one_shot: f32,
    pub movement: f32,
    pub cinematic: f32,
    pub default: f32,
}

impl Default for BlendTimes {
    fn default() -> Self {
        Self {
            retrigger: 0.0,
            combat: 0.02,
            one_shot: 0.08,
            movement: 0.25,
            cinematic: 0.6,
            default: 0.2,
        }
    }
}

impl BlendTimes {
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> {
        [
            ("retrigger", self.retrigger),
            ("combat", self.combat),
            ("one_shot", self.one_shot),
            ("movement", self.movement),
            ("cinematic", self.cinematic),
            ("default", self.default),
        ]
        .into_iter()
    }
}

/// Full registry table. Validated when turned into an `AnimationStateRegistry`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub states: HashMap<AnimationState, StateSpec>,
    #[serde(default)]
    pub tiers: HashMap<String, TierSpec>,
    #[serde(default)]
    pub blend: BlendTimes,
    /// Lock age after which `is_stuck` reports true, unless overridden per state.
    #[serde(default = "default_max_lock_seconds")]
    pub max_lock_seconds: f64,
}

fn default_max_lock_seconds() -> f64 {
    10.0
}

pub const LOCOMOTION_TIER: &str = "locomotion";
pub const FLIGHT_TIER: &str = "flight";

impl Default for RegistryConfig {
    fn default() -> Self {
        use AnimationState::*;
        use BlendClass as B;
        use LockClass as L;

        let mut states = HashMap::new();
        states.insert(Idle, StateSpec::new(0, L::None, B::Movement).in_tier(LOCOMOTION_TIER));
        states.insert(Walk, StateSpec::new(10, L::None, B::Movement).in_tier(LOCOMOTION_TIER));
        states.insert(Sprint, StateSpec::new(20, L::None, B::Movement).in_tier(LOCOMOTION_TIER));

        let mut emote = StateSpec::new(25, L::Hard, B::Cinematic);
        emote.max_lock_seconds = Some(30.0);
        states.insert(Emote, emote);

        for fly in [Hover, FlyForward, FlyBackward, FlyLeft, FlyRight, FlyUp, FlyDown] {
            states.insert(fly, StateSpec::new(30, L::None, B::Movement).in_tier(FLIGHT_TIER));
        }

        states.insert(Jump, StateSpec::new(40, L::Soft, B::OneShot));
        states.insert(TakeOff, StateSpec::new(40, L::Soft, B::OneShot));
        states.insert(Land, StateSpec::new(45, L::Soft, B::OneShot));
        states.insert(Slide, StateSpec::new(50, L::Soft, B::OneShot));
        states.insert(Dive, StateSpec::new(55, L::Soft, B::OneShot));

        states.insert(Shotgun, StateSpec::new(70, L::None, B::Combat).retriggerable());
        states.insert(Beam, StateSpec::new(70, L::None, B::Combat));
        states.insert(ArmorPlate, StateSpec::new(80, L::Soft, B::Combat));
        states.insert(Ability, StateSpec::new(90, L::Hard, B::Default));

        let mut tiers = HashMap::new();
        tiers.insert(LOCOMOTION_TIER.to_string(), TierSpec { settling: true });
        tiers.insert(FLIGHT_TIER.to_string(), TierSpec { settling: false });

        Self {
            states,
            tiers,
            blend: BlendTimes::default(),
            max_lock_seconds: default_max_lock_seconds(),
        }
    }
}

impl RegistryConfig {
    /// Parse a designer-authored JSON table.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Engine behaviour toggles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Steady-state re-requests of the current state are dropped silently unless set.
    #[serde(default)]
    pub report_noop_rejections: bool,
    /// Emit a `StuckLock` event the first tick a lock exceeds its threshold.
    #[serde(default = "default_true")]
    pub report_stuck_locks: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            report_noop_rejections: false,
            report_stuck_locks: true,
        }
    }
}
