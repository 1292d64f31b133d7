//! Animation states, lock classes and blend classes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of animation states an appendage can display.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnimationState {
    Idle,
    Walk,
    Sprint,
    Jump,
    Land,
    TakeOff,
    Dive,
    Slide,
    Hover,
    FlyForward,
    FlyBackward,
    FlyLeft,
    FlyRight,
    FlyUp,
    FlyDown,
    Shotgun,
    Beam,
    ArmorPlate,
    Ability,
    Emote,
}

impl AnimationState {
    pub const ALL: [AnimationState; 20] = [
        Self::Idle,
        Self::Walk,
        Self::Sprint,
        Self::Jump,
        Self::Land,
        Self::TakeOff,
        Self::Dive,
        Self::Slide,
        Self::Hover,
        Self::FlyForward,
        Self::FlyBackward,
        Self::FlyLeft,
        Self::FlyRight,
        Self::FlyUp,
        Self::FlyDown,
        Self::Shotgun,
        Self::Beam,
        Self::ArmorPlate,
        Self::Ability,
        Self::Emote,
    ];

    /// Get the name of this state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walk => "Walk",
            Self::Sprint => "Sprint",
            Self::Jump => "Jump",
            Self::Land => "Land",
            Self::TakeOff => "TakeOff",
            Self::Dive => "Dive",
            Self::Slide => "Slide",
            Self::Hover => "Hover",
            Self::FlyForward => "FlyForward",
            Self::FlyBackward => "FlyBackward",
            Self::FlyLeft => "FlyLeft",
            Self::FlyRight => "FlyRight",
            Self::FlyUp => "FlyUp",
            Self::FlyDown => "FlyDown",
            Self::Shotgun => "Shotgun",
            Self::Beam => "Beam",
            Self::ArmorPlate => "ArmorPlate",
            Self::Ability => "Ability",
            Self::Emote => "Emote",
        }
    }
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown animation state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for AnimationState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// How strongly a state holds its appendage once entered.
///
/// Ordered: `None < Soft < Hard`.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LockClass {
    #[default]
    None,
    /// Only strictly higher priority (or a retrigger) may preempt.
    Soft,
    /// Only a retrigger of the same state may preempt.
    Hard,
}

impl LockClass {
    #[inline]
    pub fn is_locked(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Category used by the blend-time policy when a state is the transition target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendClass {
    /// Weapons and defensive actions; near-zero blend for responsiveness.
    Combat,
    /// One-shot movement (jump, land, take-off, dive, slide).
    OneShot,
    /// Continuous movement; smooth blend between movement states.
    Movement,
    /// Slow, cinematic blend (emotes).
    Cinematic,
    #[default]
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("flyleft".parse::<AnimationState>(), Ok(AnimationState::FlyLeft));
        assert_eq!("Shotgun".parse::<AnimationState>(), Ok(AnimationState::Shotgun));
        assert!("Moonwalk".parse::<AnimationState>().is_err());
    }

    #[test]
    fn all_names_round_trip() {
        for state in AnimationState::ALL {
            assert_eq!(state.name().parse::<AnimationState>(), Ok(state));
        }
    }

    #[test]
    fn lock_class_ordering() {
        assert!(LockClass::None < LockClass::Soft);
        assert!(LockClass::Soft < LockClass::Hard);
        assert!(!LockClass::None.is_locked());
        assert!(LockClass::Hard.is_locked());
    }
}
