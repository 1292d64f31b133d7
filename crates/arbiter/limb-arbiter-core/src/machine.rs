//! Per-appendage state record and its state machine.
//!
//! The machine never decides anything on its own; the arbiter is the only
//! caller of the mutating methods (apart from recovery via `force_idle`).

use serde::{Deserialize, Serialize};

use crate::ids::{AppendageId, SourceId};
use crate::state::{AnimationState, LockClass};

/// Live state of one appendage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppendageState {
    pub current: AnimationState,
    pub previous: AnimationState,
    /// Host clock (seconds) at which `current` was entered.
    pub started_at: f64,
    /// Lock in effect; cleared by completion or recovery.
    pub lock: LockClass,
    /// When the current lock episode began. Retriggers keep it.
    #[serde(default)]
    pub locked_since: Option<f64>,
    /// The owning subsystem signalled completion of `current`.
    pub released: bool,
    /// Source that requested `current`, if it came through a registered source.
    pub owner: Option<SourceId>,
}

impl AppendageState {
    fn idle(timestamp: f64) -> Self {
        Self {
            current: AnimationState::Idle,
            previous: AnimationState::Idle,
            started_at: timestamp,
            lock: LockClass::None,
            locked_since: None,
            released: false,
            owner: None,
        }
    }
}

/// Result of a completion signal against the current state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Lock cleared and the state no longer holds priority.
    Released,
    /// The signal names a state the appendage already left.
    Stale,
    AlreadyReleased,
    /// Settling-tier states never complete; they settle through lower requests.
    Settling,
}

#[derive(Clone, Debug)]
pub struct AppendageStateMachine {
    id: AppendageId,
    state: AppendageState,
}

impl AppendageStateMachine {
    pub fn new(id: AppendageId, timestamp: f64) -> Self {
        Self {
            id,
            state: AppendageState::idle(timestamp),
        }
    }

    #[inline]
    pub fn id(&self) -> AppendageId {
        self.id
    }

    #[inline]
    pub fn current(&self) -> AnimationState {
        self.state.current
    }

    #[inline]
    pub fn previous(&self) -> AnimationState {
        self.state.previous
    }

    #[inline]
    pub fn lock_status(&self) -> LockClass {
        self.state.lock
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.state.released
    }

    #[inline]
    pub fn owner(&self) -> Option<SourceId> {
        self.state.owner
    }

    pub fn state(&self) -> &AppendageState {
        &self.state
    }

    /// Seconds the current lock has been held, `None` when unlocked.
    /// Measured from the start of the lock episode, not the last retrigger.
    pub fn lock_age(&self, now: f64) -> Option<f64> {
        if !self.state.lock.is_locked() {
            return None;
        }
        self.state.locked_since.map(|since| (now - since).max(0.0))
    }

    /// Commit an accepted, confirmed-playable transition.
    pub(crate) fn apply_transition(
        &mut self,
        state: AnimationState,
        lock: LockClass,
        timestamp: f64,
        owner: Option<SourceId>,
    ) {
        let same_episode =
            state == self.state.current && !self.state.released && self.state.lock.is_locked();
        if !same_episode {
            self.state.locked_since = lock.is_locked().then_some(timestamp);
        }
        self.state.previous = self.state.current;
        self.state.current = state;
        self.state.started_at = timestamp;
        self.state.lock = lock;
        self.state.released = false;
        self.state.owner = owner;
    }

    /// Mark `state` complete if it is still current.
    pub(crate) fn release(&mut self, state: AnimationState, settling: bool) -> Completion {
        if self.state.current != state {
            return Completion::Stale;
        }
        if settling {
            return Completion::Settling;
        }
        if self.state.released {
            return Completion::AlreadyReleased;
        }
        self.state.lock = LockClass::None;
        self.state.locked_since = None;
        self.state.released = true;
        Completion::Released
    }

    /// Unconditional reset to Idle, bypassing all rules. Recovery only.
    pub fn force_idle(&mut self, timestamp: f64) {
        let previous = self.state.current;
        self.state = AppendageState::idle(timestamp);
        self.state.previous = previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_unlocked() {
        let m = AppendageStateMachine::new(AppendageId::LEFT, 0.0);
        assert_eq!(m.current(), AnimationState::Idle);
        assert_eq!(m.previous(), AnimationState::Idle);
        assert_eq!(m.lock_status(), LockClass::None);
        assert_eq!(m.lock_age(5.0), None);
    }

    #[test]
    fn apply_then_release() {
        let mut m = AppendageStateMachine::new(AppendageId::LEFT, 0.0);
        m.apply_transition(AnimationState::Dive, LockClass::Soft, 1.0, Some(SourceId(3)));
        assert_eq!(m.previous(), AnimationState::Idle);
        assert_eq!(m.lock_age(3.5), Some(2.5));
        assert_eq!(m.owner(), Some(SourceId(3)));

        assert_eq!(m.release(AnimationState::Slide, false), Completion::Stale);
        assert_eq!(m.release(AnimationState::Dive, false), Completion::Released);
        assert_eq!(m.lock_status(), LockClass::None);
        assert!(m.is_released());
        assert_eq!(m.release(AnimationState::Dive, false), Completion::AlreadyReleased);
        assert_eq!(m.state().locked_since, None);
    }

    #[test]
    fn retrigger_keeps_lock_episode() {
        let mut m = AppendageStateMachine::new(AppendageId::LEFT, 0.0);
        m.apply_transition(AnimationState::Ability, LockClass::Hard, 1.0, None);
        m.apply_transition(AnimationState::Ability, LockClass::Hard, 4.0, None);
        assert_eq!(m.state().started_at, 4.0);
        assert_eq!(m.lock_age(6.0), Some(5.0));

        // a new state, or the same one after release, starts a new episode
        m.apply_transition(AnimationState::ArmorPlate, LockClass::Soft, 7.0, None);
        assert_eq!(m.lock_age(8.0), Some(1.0));
        m.release(AnimationState::ArmorPlate, false);
        m.apply_transition(AnimationState::ArmorPlate, LockClass::Soft, 9.0, None);
        assert_eq!(m.lock_age(9.5), Some(0.5));
    }

    #[test]
    fn force_idle_clears_everything_but_history() {
        let mut m = AppendageStateMachine::new(AppendageId::RIGHT, 0.0);
        m.apply_transition(AnimationState::Emote, LockClass::Hard, 1.0, Some(SourceId(0)));
        m.force_idle(2.0);
        let s = m.state();
        assert_eq!(s.current, AnimationState::Idle);
        assert_eq!(s.previous, AnimationState::Emote);
        assert_eq!(s.lock, LockClass::None);
        assert_eq!(s.started_at, 2.0);
        assert_eq!(s.locked_since, None);
        assert!(!s.released);
        assert_eq!(s.owner, None);
    }
}
