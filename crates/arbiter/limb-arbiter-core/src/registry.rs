//! Read-only registry: priorities, lock classes, tiers and blend policy.
//!
//! All per-state knowledge lives here so the arbiter never branches on a
//! concrete `AnimationState`.

use hashbrown::HashMap;

use crate::config::{BlendTimes, RegistryConfig, StateSpec, TierSpec};
use crate::error::ConfigError;
use crate::state::{AnimationState, BlendClass, LockClass};

#[derive(Debug, Clone)]
pub struct AnimationStateRegistry {
    states: HashMap<AnimationState, StateSpec>,
    tiers: HashMap<String, TierSpec>,
    blend: BlendTimes,
    max_lock_seconds: f64,
}

impl AnimationStateRegistry {
    /// Validate a config and freeze it into a registry.
    pub fn new(cfg: RegistryConfig) -> Result<Self, ConfigError> {
        for state in AnimationState::ALL {
            let spec = cfg
                .states
                .get(&state)
                .ok_or(ConfigError::MissingState(state))?;
            if let Some(tier) = &spec.tier {
                if !cfg.tiers.contains_key(tier) {
                    return Err(ConfigError::UnknownTier {
                        state,
                        tier: tier.clone(),
                    });
                }
            }
            if let Some(secs) = spec.max_lock_seconds {
                check_threshold(state.name().to_string(), secs)?;
            }
        }

        let idle_lock = cfg.states[&AnimationState::Idle].lock;
        if idle_lock.is_locked() {
            return Err(ConfigError::LockedIdle(idle_lock));
        }

        for (name, value) in cfg.blend.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidBlendTime { name, value });
            }
        }
        check_threshold("max_lock_seconds".to_string(), cfg.max_lock_seconds)?;

        Ok(Self {
            states: cfg.states,
            tiers: cfg.tiers,
            blend: cfg.blend,
            max_lock_seconds: cfg.max_lock_seconds,
        })
    }

    /// Parse and validate a JSON table in one step.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::new(RegistryConfig::from_json_str(json)?)
    }

    // Construction guarantees a row for every state.
    #[inline]
    fn spec(&self, state: AnimationState) -> &StateSpec {
        &self.states[&state]
    }

    #[inline]
    pub fn priority(&self, state: AnimationState) -> i32 {
        self.spec(state).priority
    }

    #[inline]
    pub fn lock_class(&self, state: AnimationState) -> LockClass {
        self.spec(state).lock
    }

    #[inline]
    pub fn is_retriggerable(&self, state: AnimationState) -> bool {
        self.spec(state).retriggerable
    }

    #[inline]
    pub fn blend_class(&self, state: AnimationState) -> BlendClass {
        self.spec(state).blend
    }

    pub fn tier(&self, state: AnimationState) -> Option<&str> {
        self.spec(state).tier.as_deref()
    }

    /// True when the state's tier allows settling (lateral/downward moves).
    pub fn in_settling_tier(&self, state: AnimationState) -> bool {
        self.tier(state)
            .and_then(|t| self.tiers.get(t))
            .is_some_and(|t| t.settling)
    }

    /// Both states sit in the same settling tier.
    pub fn shares_settling_tier(&self, a: AnimationState, b: AnimationState) -> bool {
        match (self.tier(a), self.tier(b)) {
            (Some(ta), Some(tb)) if ta == tb => self.in_settling_tier(a),
            _ => false,
        }
    }

    /// Blend duration in seconds for `from -> to`, first matching rule wins.
    pub fn blend_time(&self, from: AnimationState, to: AnimationState) -> f32 {
        if from == to {
            return self.blend.retrigger;
        }
        match (self.blend_class(from), self.blend_class(to)) {
            (_, BlendClass::Combat) => self.blend.combat,
            (_, BlendClass::OneShot) => self.blend.one_shot,
            (BlendClass::Movement, BlendClass::Movement) => self.blend.movement,
            (_, BlendClass::Cinematic) => self.blend.cinematic,
            _ => self.blend.default,
        }
    }

    /// Lock age in seconds after which the state counts as stuck.
    pub fn max_lock_seconds(&self, state: AnimationState) -> f64 {
        self.spec(state)
            .max_lock_seconds
            .unwrap_or(self.max_lock_seconds)
    }

    pub fn states(&self) -> impl Iterator<Item = (AnimationState, &StateSpec)> {
        AnimationState::ALL.into_iter().map(|s| (s, self.spec(s)))
    }

    /// Export back into an editable config (e.g. for tooling round-trips).
    pub fn to_config(&self) -> RegistryConfig {
        RegistryConfig {
            states: self.states.clone(),
            tiers: self.tiers.clone(),
            blend: self.blend.clone(),
            max_lock_seconds: self.max_lock_seconds,
        }
    }
}

impl Default for AnimationStateRegistry {
    fn default() -> Self {
        let cfg = RegistryConfig::default();
        Self {
            states: cfg.states,
            tiers: cfg.tiers,
            blend: cfg.blend,
            max_lock_seconds: cfg.max_lock_seconds,
        }
    }
}

fn check_threshold(scope: String, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidLockThreshold { scope, value })
    }
}
