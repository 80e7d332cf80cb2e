//! Engine composition.
//!
//! [`ErosionEngine`] owns the single [`EngineState`] of one artifact for the
//! life of a page. It is constructed explicitly (merging persisted state with
//! defaults), driven by [`ErosionEngine::handle`] for input and
//! [`ErosionEngine::tick`] once per animation frame, and closed by
//! [`ErosionEngine::teardown`], which always writes.
//!
//! Within a tick the score is computed before the planner and the render
//! output consume it. Every relief read or write decays relief first.

use erosion_core::config::EngineConfig;
use erosion_core::error::EngineError;
use erosion_core::traits::Clipboard;
use erosion_core::types::{EngineState, FragmentPlan, TargetId, Timestamp};
use erosion_decay::{ErosionModel, FragmentPlanner, SessionClock};
use erosion_store::{FallbackStore, FlushScheduler, StateStore};
use tracing::{debug, info};

use crate::binding::ArtifactBinding;
use crate::copy::{CopyController, CopyStatus};
use crate::interaction::{Effect, InteractionContext, InteractionEvent, InteractionListener};
use crate::render::{Counters, Frame, copy_label, fragment_visuals, pulse, pulse_phase};
use crate::visibility::{ObservationMode, VisibilityTracker};

/// Why the page is going away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// Navigation away or tab close.
    Unload,
    /// Lifecycle hide; the page may come back or be discarded without notice.
    Hidden,
}

pub struct ErosionEngine {
    binding: ArtifactBinding,
    config: EngineConfig,
    model: ErosionModel,
    planner: FragmentPlanner,
    plans: Vec<FragmentPlan>,
    state: EngineState,
    session: SessionClock,
    store: StateStore,
    flush: FlushScheduler,
    listener: InteractionListener,
    visibility: VisibilityTracker,
    copy: CopyController,
    frame_idx: u64,
    last_score: f64,
    writes: u64,
}

impl ErosionEngine {
    /// Build the engine for `binding`, resuming persisted state if any.
    ///
    /// Only an invalid configuration or manifest fails; storage problems
    /// degrade silently.
    pub fn start(
        binding: ArtifactBinding,
        config: EngineConfig,
        backend: FallbackStore,
        mode: ObservationMode,
        now: Timestamp,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let binding = binding.normalized()?;
        let artifact_id = binding.artifact_id.clone();

        let mut store = StateStore::new(
            backend,
            config.persistence.clone(),
            config.erosion.relief_cap,
        );
        let mut state = match store.load(&artifact_id) {
            Some(stored) => {
                let gap_ms = (now.wall_ms - stored.last_seen_ms).max(0.0);
                info!(
                    artifact = %artifact_id,
                    gap_ms,
                    elapsed_ms = stored.total_elapsed_ms,
                    relief = stored.relief_units,
                    "resuming session"
                );
                stored
            }
            None => {
                debug!(artifact = %artifact_id, "no usable stored state, starting fresh");
                EngineState::fresh(now.wall_ms)
            }
        };

        let model = ErosionModel::new(config.erosion.clone());
        // Relief keeps decaying while the page is closed.
        model.decay_relief(&mut state, now.wall_ms);
        state.last_seen_ms = now.wall_ms;

        let planner = FragmentPlanner::new(config.planner.clone());
        let plans = planner.plan_all(&artifact_id, binding.fragment_total);

        let mut listener = InteractionListener::new(config.interaction.clone());
        for zone in &binding.zones {
            listener.add_zone(zone.id.clone(), zone.resistance);
        }

        let mut visibility = VisibilityTracker::new(config.visibility.clone(), mode);
        for target in &binding.reveal_targets {
            visibility.register(target.id.clone(), target.delay_ms, now.mono_ms);
        }

        let copy = CopyController::new(binding.copy_source.clone(), config.render.copy_indicator_ms);

        Ok(Self {
            session: SessionClock::start(state.total_elapsed_ms, now.mono_ms),
            flush: FlushScheduler::new(config.persistence.debounce_ms),
            last_score: model.score_for(state.total_elapsed_ms, state.relief_units),
            binding,
            config,
            model,
            planner,
            plans,
            state,
            store,
            listener,
            visibility,
            copy,
            frame_idx: 0,
            writes: 0,
        })
    }

    /// Apply one input event. State-changing events schedule a debounced write.
    pub fn handle(&mut self, event: &InteractionEvent, now: Timestamp) -> Effect {
        let mut ctx = InteractionContext {
            state: &mut self.state,
            model: &self.model,
            now,
        };
        let effect = self.listener.dispatch(event, &mut ctx);
        if effect.accepted {
            self.state.last_seen_ms = now.wall_ms;
            self.flush.request(now.mono_ms);
        }
        effect
    }

    /// Advance one animation frame.
    pub fn tick(&mut self, now: Timestamp) -> Frame {
        self.frame_idx += 1;

        let elapsed_ms = self.sync_elapsed(now);
        let score = self.model.erosion_score(&mut self.state, elapsed_ms, now.wall_ms);
        self.last_score = score;

        let erosion = self.planner.erode(&self.plans, score);
        let revealed = self.visibility.tick(now.mono_ms);

        let phase = pulse_phase(now.mono_ms, self.config.render.pulse_period_ms);
        let fragments = fragment_visuals(&self.binding, &erosion, phase);
        let copy_indicator = copy_label(self.copy.indicator(now.mono_ms));

        let flushed = if self.flush.take_due(now.mono_ms) {
            self.persist();
            true
        } else {
            false
        };

        Frame {
            frame_idx: self.frame_idx,
            score,
            elapsed_ms,
            relief_units: self.state.relief_units,
            pulse: pulse(phase),
            trace_count: self.state.pointer_trace.len(),
            counters: Counters::format(
                &self.state,
                elapsed_ms,
                self.model.relief_fraction(self.state.relief_units),
            ),
            fragments,
            revealed,
            copy_indicator,
            flushed,
        }
    }

    /// Enter/exit transition for a duration-gated target.
    pub fn set_visibility(&mut self, id: &TargetId, visible: bool, now: Timestamp) {
        self.visibility.set_visible(id, visible, now.mono_ms);
    }

    /// Copy the artifact source; the status shows in subsequent frames.
    pub fn copy_source(
        &mut self,
        primary: Option<&mut dyn Clipboard>,
        fallback: &mut dyn Clipboard,
        now: Timestamp,
    ) -> CopyStatus {
        self.copy.copy(primary, fallback, now.mono_ms)
    }

    /// Show the outcome of a copy the host performed itself.
    pub fn report_copy(&mut self, status: CopyStatus, now: Timestamp) {
        self.copy.report(status, now.mono_ms);
    }

    /// Write now regardless of the debounce. Used on unload and lifecycle hide.
    pub fn teardown(&mut self, reason: Teardown, now: Timestamp) {
        self.sync_elapsed(now);
        self.model.decay_relief(&mut self.state, now.wall_ms);
        let coalesced = self.flush.coalesced();
        let was_pending = self.flush.force();
        debug!(
            artifact = %self.binding.artifact_id,
            ?reason,
            was_pending,
            coalesced,
            "forced flush"
        );
        self.persist();
    }

    fn sync_elapsed(&mut self, now: Timestamp) -> f64 {
        let elapsed = self
            .session
            .total_elapsed_now(now.mono_ms)
            .max(self.state.total_elapsed_ms);
        self.state.total_elapsed_ms = elapsed;
        if now.wall_ms.is_finite() {
            self.state.last_seen_ms = now.wall_ms;
        }
        elapsed
    }

    fn persist(&mut self) {
        self.store.save(&self.binding.artifact_id, &self.state);
        self.writes += 1;
    }

    pub fn artifact_id(&self) -> &str {
        &self.binding.artifact_id
    }

    pub fn binding(&self) -> &ArtifactBinding {
        &self.binding
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn plans(&self) -> &[FragmentPlan] {
        &self.plans
    }

    /// Score computed by the most recent tick (or at start).
    pub fn score(&self) -> f64 {
        self.last_score
    }

    pub fn listener(&self) -> &InteractionListener {
        &self.listener
    }

    pub fn visibility(&self) -> &VisibilityTracker {
        &self.visibility
    }

    /// Monotonic deadline of the pending debounced write, for hosts that arm a timer.
    pub fn flush_deadline(&self) -> Option<f64> {
        self.flush.deadline()
    }

    /// Writes issued since start.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn is_storage_degraded(&self) -> bool {
        self.store.backend().is_degraded()
    }
}
