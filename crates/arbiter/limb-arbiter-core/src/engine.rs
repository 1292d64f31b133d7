//! Engine: per-avatar tick glue around the arbiter.
//!
//! Each `update` polls the registered sources, applies completions, collapses
//! competing requests to one per appendage and hands that to the arbiter.
//!
//! Recovery (`force_idle`) also suppresses the locked state it cleared: sources
//! that keep requesting it are ignored until they stop asking for one tick.
//! Host-direct requests are never suppressed.

use std::sync::Arc;

use log::{trace, warn};

use crate::adapters::{default_sources, SourcesConfig, StateSource};
use crate::arbiter::{Arbiter, TransitionRequest};
use crate::config::EngineConfig;
use crate::error::{ArbiterError, RejectKind};
use crate::ids::{AppendageId, IdAllocator, SourceId, APPENDAGE_COUNT};
use crate::inputs::{Inputs, SourceSignal};
use crate::machine::Completion;
use crate::outputs::{ArbiterEvent, Outputs};
use crate::registry::AnimationStateRegistry;
use crate::sink::PlaybackSink;
use crate::state::AnimationState;

#[derive(Debug)]
struct RegisteredSource {
    id: SourceId,
    source: Box<dyn StateSource>,
}

#[derive(Debug)]
pub struct Engine {
    cfg: EngineConfig,
    ids: IdAllocator,
    arbiter: Arbiter,
    sources: Vec<RegisteredSource>,
    stuck_reported: [bool; APPENDAGE_COUNT],
    /// Locked state cleared by recovery, per appendage.
    suppressed: [Option<AnimationState>; APPENDAGE_COUNT],

    // Per-tick scratch
    polled: Vec<SourceSignal>,
    signals: Vec<(Option<SourceId>, SourceSignal)>,
    outputs: Outputs,
}

impl Engine {
    /// Engine with no sources; signals arrive through `Inputs::direct` only.
    pub fn new(registry: Arc<AnimationStateRegistry>, cfg: EngineConfig, now: f64) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            arbiter: Arbiter::new(registry, now),
            sources: Vec::new(),
            stuck_reported: [false; APPENDAGE_COUNT],
            suppressed: [None; APPENDAGE_COUNT],
            polled: Vec::new(),
            signals: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    /// Engine with the movement, flight, combat, ability and emote sources registered.
    pub fn with_default_sources(
        registry: Arc<AnimationStateRegistry>,
        cfg: EngineConfig,
        sources: &SourcesConfig,
        now: f64,
    ) -> Self {
        let mut engine = Self::new(registry, cfg, now);
        for source in default_sources(sources) {
            engine.register_source(source);
        }
        engine
    }

    /// Register a source once; it is polled every tick in registration order.
    pub fn register_source(&mut self, source: Box<dyn StateSource>) -> SourceId {
        let id = self.ids.alloc_source();
        trace!("registered source '{}' as {:?}", source.name(), id);
        self.sources.push(RegisteredSource { id, source });
        id
    }

    pub fn source_id(&self, name: &str) -> Option<SourceId> {
        self.sources
            .iter()
            .find(|s| s.source.name() == name)
            .map(|s| s.id)
    }

    pub fn source_name(&self, id: SourceId) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.source.name())
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    /// Direct access for hosts that drive the arbiter outside of `update`.
    pub fn arbiter_mut(&mut self) -> &mut Arbiter {
        &mut self.arbiter
    }

    pub fn current(&self, appendage: AppendageId) -> Result<AnimationState, ArbiterError> {
        self.arbiter.current(appendage)
    }

    pub fn is_stuck(&self, appendage: AppendageId, now: f64) -> Result<bool, ArbiterError> {
        self.arbiter.is_stuck(appendage, now)
    }

    /// Recovery: reset both appendages to Idle. A locked state cleared here is
    /// not re-entered from a registered source that is still holding it.
    pub fn force_idle(&mut self, now: f64) {
        for (slot, machine) in self.suppressed.iter_mut().zip(self.arbiter.machines()) {
            *slot = machine
                .lock_status()
                .is_locked()
                .then_some(machine.current());
        }
        self.arbiter.force_idle(now);
        self.stuck_reported = [false; APPENDAGE_COUNT];
    }

    /// Step one tick at host time `now`.
    pub fn update(&mut self, now: f64, inputs: Inputs, sink: &mut dyn PlaybackSink) -> &Outputs {
        self.outputs.clear();

        // 1) Recovery first so this tick's requests act on the reset state
        if inputs.force_idle {
            for machine in self.arbiter.machines() {
                self.outputs.push_event(ArbiterEvent::ForcedIdle {
                    appendage: machine.id(),
                    from: machine.current(),
                });
            }
            self.force_idle(now);
        }

        // 2) Gather signals: sources in registration order, then host-direct
        let mut polled = std::mem::take(&mut self.polled);
        let mut signals = std::mem::take(&mut self.signals);
        signals.clear();
        for registered in &mut self.sources {
            polled.clear();
            registered.source.poll(now, &inputs, &mut polled);
            signals.extend(polled.drain(..).map(|s| (Some(registered.id), s)));
        }
        self.drop_suppressed(&mut signals);
        signals.extend(inputs.direct.iter().map(|s| (None, *s)));

        // 3) Completions before requests
        for (source, signal) in &signals {
            if let SourceSignal::Complete { appendage, state } = *signal {
                self.complete(*source, appendage, state);
            }
        }

        // 4) Collapse to the highest-priority request per appendage
        let mut winners: [Option<(Option<SourceId>, AnimationState)>; APPENDAGE_COUNT] =
            [None; APPENDAGE_COUNT];
        for (source, signal) in &signals {
            let SourceSignal::Request { appendage, state } = *signal else {
                continue;
            };
            match appendage.index() {
                Some(i) => {
                    let registry = self.arbiter.registry();
                    let beats = winners[i]
                        .map_or(true, |(_, w)| registry.priority(state) > registry.priority(w));
                    if beats {
                        winners[i] = Some((*source, state));
                    }
                }
                None => self.arbitrate(now, *source, appendage, state, sink),
            }
        }

        // 5) One arbiter call per appendage
        for (appendage, winner) in AppendageId::ALL.into_iter().zip(winners) {
            if let Some((source, state)) = winner {
                self.arbitrate(now, source, appendage, state, sink);
            }
        }

        // 6) Health
        if self.cfg.report_stuck_locks {
            self.report_stuck(now);
        }

        self.outputs.appendages = self
            .arbiter
            .machines()
            .map(|m| m.state().clone())
            .collect();

        self.polled = polled;
        self.signals = signals;
        &self.outputs
    }

    /// Drop source requests for a state cleared by recovery. The suppression
    /// lifts on the first tick no source asks for that state.
    fn drop_suppressed(&mut self, signals: &mut Vec<(Option<SourceId>, SourceSignal)>) {
        let suppressed = self.suppressed;
        let mut asked = [false; APPENDAGE_COUNT];
        signals.retain(|(source, signal)| {
            if !matches!(signal, SourceSignal::Request { .. }) {
                return true;
            }
            let (appendage, state) = (signal.appendage(), signal.state());
            match appendage.index() {
                Some(i) if suppressed[i] == Some(state) => {
                    trace!("{appendage}: {state} from {source:?} suppressed after recovery");
                    asked[i] = true;
                    false
                }
                _ => true,
            }
        });
        for (slot, asked) in self.suppressed.iter_mut().zip(asked) {
            if !asked {
                *slot = None;
            }
        }
    }

    fn complete(&mut self, source: Option<SourceId>, appendage: AppendageId, state: AnimationState) {
        let machine = match self.arbiter.machine(appendage) {
            Ok(m) => m,
            Err(e) => {
                warn!("completion of {state} dropped: {e}");
                return;
            }
        };
        if machine.current() == state {
            if let (Some(src), Some(owner)) = (source, machine.owner()) {
                if src != owner {
                    trace!("{appendage}: {state} completion from {src:?} ignored, owned by {owner:?}");
                    self.outputs.push_event(ArbiterEvent::CompletionIgnored {
                        appendage,
                        state,
                        source,
                        owner: Some(owner),
                    });
                    return;
                }
            }
        }
        if let Ok(Completion::Released) = self.arbiter.notify_complete(appendage, state) {
            self.outputs
                .push_event(ArbiterEvent::StateReleased { appendage, state });
        }
    }

    fn arbitrate(
        &mut self,
        now: f64,
        source: Option<SourceId>,
        appendage: AppendageId,
        state: AnimationState,
        sink: &mut dyn PlaybackSink,
    ) {
        let mut request = TransitionRequest::new(appendage, state, now);
        request.source = source;
        match self.arbiter.request_transition(request, sink) {
            Ok(accepted) => {
                if let Some(i) = appendage.index() {
                    self.stuck_reported[i] = false;
                }
                self.outputs.push_event(ArbiterEvent::TransitionAccepted {
                    appendage,
                    from: accepted.from,
                    to: accepted.to,
                    blend_time: accepted.blend_time,
                    retrigger: accepted.retrigger,
                    source,
                });
            }
            Err(e) => {
                let kind = e.kind();
                if kind == RejectKind::RejectedAsNoOp && !self.cfg.report_noop_rejections {
                    return;
                }
                self.outputs.push_event(ArbiterEvent::TransitionRejected {
                    appendage,
                    requested: state,
                    kind,
                    source,
                });
            }
        }
    }

    fn report_stuck(&mut self, now: f64) {
        for (i, appendage) in AppendageId::ALL.into_iter().enumerate() {
            let stuck = self.arbiter.is_stuck(appendage, now).unwrap_or(false);
            if !stuck {
                self.stuck_reported[i] = false;
                continue;
            }
            if self.stuck_reported[i] {
                continue;
            }
            self.stuck_reported[i] = true;
            if let Ok(machine) = self.arbiter.machine(appendage) {
                let held_for = machine.lock_age(now).unwrap_or_default();
                warn!(
                    "{appendage}: {} lock held for {held_for:.2}s without completion",
                    machine.current()
                );
                self.outputs.push_event(ArbiterEvent::StuckLock {
                    appendage,
                    state: machine.current(),
                    held_for,
                });
            }
        }
    }
}
