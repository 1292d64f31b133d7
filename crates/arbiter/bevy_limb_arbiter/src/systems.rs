use bevy::prelude::*;
use limb_arbiter_core::{AnimationState, AppendageId, ArbiterEvent, PlaybackError, PlaybackSink};

use crate::components::{AvatarArbiter, AvatarInputs};
use crate::events::{AppendagePlayback, ArbiterReport, ForceIdleAvatar};
use crate::resources::AvailableClips;

/// Playback sink over the clip catalog. Accepted plays are staged and sent as
/// `AppendagePlayback` events once the engine tick is done.
struct EcsSink<'a> {
    entity: Entity,
    clips: &'a AvailableClips,
    staged: &'a mut Vec<AppendagePlayback>,
}

impl PlaybackSink for EcsSink<'_> {
    fn try_play(
        &mut self,
        appendage: AppendageId,
        state: AnimationState,
        blend_time: f32,
    ) -> Result<(), PlaybackError> {
        if !self.clips.contains(state) {
            return Err(PlaybackError::MissingAsset(state));
        }
        self.staged.push(AppendagePlayback {
            entity: self.entity,
            appendage,
            state,
            blend_time,
        });
        Ok(())
    }
}

/// Route recovery requests into the avatar's next tick.
pub fn force_idle_system(
    mut requests: EventReader<ForceIdleAvatar>,
    mut avatars: Query<&mut AvatarInputs>,
) {
    for ForceIdleAvatar { entity } in requests.read() {
        match avatars.get_mut(*entity) {
            Ok(mut inputs) => inputs.0.force_idle = true,
            Err(_) => warn!("force idle: {:?} has no arbiter inputs", entity),
        }
    }
}

/// Tick every avatar's engine at the app clock and publish its outputs.
pub fn arbitrate_system(
    time: Res<Time>,
    clips: Res<AvailableClips>,
    mut avatars: Query<(Entity, &mut AvatarArbiter, &mut AvatarInputs)>,
    mut playback: EventWriter<AppendagePlayback>,
    mut reports: EventWriter<ArbiterReport>,
) {
    let now = time.elapsed_seconds_f64();
    let mut staged = Vec::new();

    for (entity, mut arbiter, mut inputs) in avatars.iter_mut() {
        let tick = inputs.0.clone();
        inputs.0.direct.clear();
        inputs.0.force_idle = false;

        let mut sink = EcsSink {
            entity,
            clips: &clips,
            staged: &mut staged,
        };
        let out = arbiter.0.update(now, tick, &mut sink);

        for event in &out.events {
            match event {
                ArbiterEvent::TransitionAccepted { appendage, from, to, .. } => {
                    debug!("arbiter: {:?} {} {} -> {}", entity, appendage, from, to);
                }
                ArbiterEvent::StuckLock {
                    appendage,
                    state,
                    held_for,
                } => {
                    warn!(
                        "arbiter: {:?} {} stuck in {} for {:.2}s",
                        entity, appendage, state, held_for
                    );
                }
                _ => {}
            }
        }
        reports.send_batch(
            out.events
                .iter()
                .cloned()
                .map(|event| ArbiterReport { entity, event }),
        );
    }

    playback.send_batch(staged);
}
