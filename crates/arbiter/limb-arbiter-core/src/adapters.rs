//! State sources: translate subsystem snapshots into requests and completions.
//!
//! Held states (locomotion, flight, beam, ability, emote, ...) are requested
//! every tick while desired, so a request blocked by a lock is retried, and
//! completed on the first tick they are no longer desired. Shotgun is a pulse:
//! one request per shot, completed once no shot landed for `shot_hold_seconds`.

use serde::{Deserialize, Serialize};

use crate::ids::{AppendageId, APPENDAGE_COUNT};
use crate::inputs::{CombatSnapshot, Inputs, SourceSignal};
use crate::state::AnimationState;

/// An upstream subsystem that wants to influence the appendages.
pub trait StateSource: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Append this tick's signals to `out`.
    fn poll(&mut self, now: f64, inputs: &Inputs, out: &mut Vec<SourceSignal>);
}

/// Tracks the held state a source currently wants on each appendage.
#[derive(Debug, Default, Clone)]
struct Held {
    desired: [Option<AnimationState>; APPENDAGE_COUNT],
}

impl Held {
    fn update(
        &mut self,
        appendage: AppendageId,
        desired: Option<AnimationState>,
        out: &mut Vec<SourceSignal>,
    ) {
        if let Some(i) = appendage.index() {
            if let Some(prev) = self.desired[i].filter(|p| Some(*p) != desired) {
                out.push(SourceSignal::Complete {
                    appendage,
                    state: prev,
                });
            }
            self.desired[i] = desired;
        }
        // Invalid ids are still forwarded so the engine can report them.
        if let Some(state) = desired {
            out.push(SourceSignal::Request { appendage, state });
        }
    }

    fn update_all(&mut self, desired: Option<AnimationState>, out: &mut Vec<SourceSignal>) {
        for appendage in AppendageId::ALL {
            self.update(appendage, desired, out);
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Speed (m/s) at or above which the avatar walks.
    pub walk_speed: f32,
    /// Speed (m/s) at or above which the avatar sprints.
    pub sprint_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 0.2,
            sprint_speed: 4.5,
        }
    }
}

/// Ground locomotion and tactical movement, on both appendages.
#[derive(Debug, Default)]
pub struct MovementAdapter {
    cfg: MovementConfig,
    held: Held,
}

impl MovementAdapter {
    pub fn new(cfg: MovementConfig) -> Self {
        Self {
            cfg,
            held: Held::default(),
        }
    }
}

impl StateSource for MovementAdapter {
    fn name(&self) -> &str {
        "movement"
    }

    fn poll(&mut self, _now: f64, inputs: &Inputs, out: &mut Vec<SourceSignal>) {
        let desired = inputs.movement.as_ref().map(|m| {
            if m.diving {
                AnimationState::Dive
            } else if m.sliding {
                AnimationState::Slide
            } else if m.landing {
                AnimationState::Land
            } else if m.airborne {
                AnimationState::Jump
            } else if m.speed >= self.cfg.sprint_speed {
                AnimationState::Sprint
            } else if m.speed >= self.cfg.walk_speed {
                AnimationState::Walk
            } else {
                AnimationState::Idle
            }
        });
        self.held.update_all(desired, out);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlightConfig {
    /// Steering magnitude below which the avatar hovers.
    pub dead_zone: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self { dead_zone: 0.2 }
    }
}

/// Flight: take-off and direction variants, on both appendages.
#[derive(Debug, Default)]
pub struct FlightAdapter {
    cfg: FlightConfig,
    held: Held,
}

impl FlightAdapter {
    pub fn new(cfg: FlightConfig) -> Self {
        Self {
            cfg,
            held: Held::default(),
        }
    }

    /// Dominant steering axis; ties prefer forward/back, then strafe, then vertical.
    fn direction(&self, [x, y, z]: [f32; 3]) -> AnimationState {
        let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
        let peak = ax.max(ay).max(az);
        if peak < self.cfg.dead_zone {
            AnimationState::Hover
        } else if az == peak {
            if z > 0.0 {
                AnimationState::FlyForward
            } else {
                AnimationState::FlyBackward
            }
        } else if ax == peak {
            if x > 0.0 {
                AnimationState::FlyRight
            } else {
                AnimationState::FlyLeft
            }
        } else if y > 0.0 {
            AnimationState::FlyUp
        } else {
            AnimationState::FlyDown
        }
    }
}

impl StateSource for FlightAdapter {
    fn name(&self) -> &str {
        "flight"
    }

    fn poll(&mut self, _now: f64, inputs: &Inputs, out: &mut Vec<SourceSignal>) {
        let desired = inputs.flight.as_ref().and_then(|f| {
            if f.taking_off {
                Some(AnimationState::TakeOff)
            } else if f.flying {
                Some(self.direction(f.input))
            } else {
                None
            }
        });
        self.held.update_all(desired, out);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Seconds without a new shot before Shotgun is reported complete.
    pub shot_hold_seconds: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            shot_hold_seconds: 0.35,
        }
    }
}

/// Ranged combat on the weapon hand.
#[derive(Debug, Default)]
pub struct CombatAdapter {
    cfg: CombatConfig,
    held: Held,
    /// Time and hand of the most recent shot still holding Shotgun.
    last_shot: Option<(f64, AppendageId)>,
}

impl CombatAdapter {
    pub fn new(cfg: CombatConfig) -> Self {
        Self {
            cfg,
            held: Held::default(),
            last_shot: None,
        }
    }
}

impl StateSource for CombatAdapter {
    fn name(&self) -> &str {
        "combat"
    }

    fn poll(&mut self, now: f64, inputs: &Inputs, out: &mut Vec<SourceSignal>) {
        let combat = inputs.combat.as_ref();

        match (combat.filter(|c| c.shotgun_fired), self.last_shot) {
            (Some(c), previous) => {
                if let Some((_, hand)) = previous.filter(|(_, hand)| *hand != c.hand) {
                    out.push(SourceSignal::Complete {
                        appendage: hand,
                        state: AnimationState::Shotgun,
                    });
                }
                out.push(SourceSignal::Request {
                    appendage: c.hand,
                    state: AnimationState::Shotgun,
                });
                self.last_shot = Some((now, c.hand));
            }
            (None, Some((at, hand)))
                if combat.is_none() || now - at >= self.cfg.shot_hold_seconds =>
            {
                out.push(SourceSignal::Complete {
                    appendage: hand,
                    state: AnimationState::Shotgun,
                });
                self.last_shot = None;
            }
            _ => {}
        }

        for appendage in AppendageId::ALL {
            let desired = combat
                .filter(|c| c.hand == appendage)
                .and_then(held_combat_state);
            self.held.update(appendage, desired, out);
        }
        if let Some(c) = combat.filter(|c| !c.hand.is_valid()) {
            self.held.update(c.hand, held_combat_state(c), out);
        }
    }
}

fn held_combat_state(c: &CombatSnapshot) -> Option<AnimationState> {
    if c.armor_plate_held {
        Some(AnimationState::ArmorPlate)
    } else if c.beam_held {
        Some(AnimationState::Beam)
    } else {
        None
    }
}

/// Abilities: hard-locked on the appendages the ability names.
#[derive(Debug, Default)]
pub struct AbilityAdapter {
    held: Held,
}

impl AbilityAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateSource for AbilityAdapter {
    fn name(&self) -> &str {
        "ability"
    }

    fn poll(&mut self, _now: f64, inputs: &Inputs, out: &mut Vec<SourceSignal>) {
        let active = inputs.ability.as_ref().filter(|a| a.active);
        for appendage in AppendageId::ALL {
            let desired = active
                .filter(|a| a.appendages.contains(&appendage))
                .map(|_| AnimationState::Ability);
            self.held.update(appendage, desired, out);
        }
    }
}

/// Expressive emotes on both appendages.
#[derive(Debug, Default)]
pub struct EmoteAdapter {
    held: Held,
}

impl EmoteAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateSource for EmoteAdapter {
    fn name(&self) -> &str {
        "emote"
    }

    fn poll(&mut self, _now: f64, inputs: &Inputs, out: &mut Vec<SourceSignal>) {
        let desired = inputs
            .emote
            .as_ref()
            .filter(|e| e.playing)
            .map(|_| AnimationState::Emote);
        self.held.update_all(desired, out);
    }
}

/// Configuration for the built-in sources.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub flight: FlightConfig,
    #[serde(default)]
    pub combat: CombatConfig,
}

/// The five built-in sources, in poll order.
pub fn default_sources(cfg: &SourcesConfig) -> Vec<Box<dyn StateSource>> {
    vec![
        Box::new(MovementAdapter::new(cfg.movement.clone())),
        Box::new(FlightAdapter::new(cfg.flight.clone())),
        Box::new(CombatAdapter::new(cfg.combat.clone())),
        Box::new(AbilityAdapter::new()),
        Box::new(EmoteAdapter::new()),
    ]
}
