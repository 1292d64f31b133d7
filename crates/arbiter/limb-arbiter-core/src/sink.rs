//! Playback sink contract.
//!
//! Hosts implement `PlaybackSink` to actually start the chosen animation. The
//! arbiter only commits a transition after `try_play` succeeds.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::ids::AppendageId;
use crate::state::AnimationState;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("no clip available for {0}")]
    MissingAsset(AnimationState),
    #[error("playback unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Plays the animation an appendage should display.
pub trait PlaybackSink {
    fn try_play(
        &mut self,
        appendage: AppendageId,
        state: AnimationState,
        blend_time: f32,
    ) -> Result<(), PlaybackError>;
}

/// A play command as issued to a sink.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayCommand {
    pub appendage: AppendageId,
    pub state: AnimationState,
    pub blend_time: f32,
}

/// Sink that accepts everything and plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllSink;

impl PlaybackSink for AcceptAllSink {
    fn try_play(&mut self, _: AppendageId, _: AnimationState, _: f32) -> Result<(), PlaybackError> {
        Ok(())
    }
}

/// Sink backed by a set of playable states; records every successful play.
#[derive(Debug, Default, Clone)]
pub struct CatalogSink {
    available: HashSet<AnimationState>,
    played: Vec<PlayCommand>,
}

impl CatalogSink {
    pub fn new(available: impl IntoIterator<Item = AnimationState>) -> Self {
        Self {
            available: available.into_iter().collect(),
            played: Vec::new(),
        }
    }

    /// Catalog containing every state.
    pub fn complete() -> Self {
        Self::new(AnimationState::ALL)
    }

    pub fn insert(&mut self, state: AnimationState) {
        self.available.insert(state);
    }

    pub fn remove(&mut self, state: AnimationState) {
        self.available.remove(&state);
    }

    pub fn played(&self) -> &[PlayCommand] {
        &self.played
    }

    pub fn take_played(&mut self) -> Vec<PlayCommand> {
        std::mem::take(&mut self.played)
    }
}

impl PlaybackSink for CatalogSink {
    fn try_play(
        &mut self,
        appendage: AppendageId,
        state: AnimationState,
        blend_time: f32,
    ) -> Result<(), PlaybackError> {
        if !self.available.contains(&state) {
            return Err(PlaybackError::MissingAsset(state));
        }
        self.played.push(PlayCommand {
            appendage,
            state,
            blend_time,
        });
        Ok(())
    }
}
