//! Erosion replay harness.
//!
//! Feeds a recorded interaction trace through the engine with simulated
//! animation frames and file-backed persistence, then prints a JSON summary.
//! Running it twice against the same data directory replays a reload.

mod settings;
mod trace;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use erosion_core::traits::Clock;
use erosion_core::types::{TargetId, Timestamp};
use erosion_engine::{
    ArtifactBinding, ErosionEngine, Frame, ObservationMode, SystemClock, Teardown,
};
use erosion_store::{FallbackStore, FileStore};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::settings::ReplaySettings;
use crate::trace::{TeardownReason, TraceAction, TraceLine, parse_trace};

/// Replay a page interaction trace against the erosion engine.
#[derive(Parser, Debug)]
#[command(name = "erosion-replay", version, about)]
struct Args {
    /// Artifact manifest JSON (as embedded in the rendered page)
    #[arg(long)]
    manifest: PathBuf,

    /// Interaction trace, one JSON object per line
    #[arg(long)]
    trace: PathBuf,

    /// Replay settings file (JSON/TOML/YAML), overridable by EROSION__* env vars
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Engine config JSON; overrides `engine_config` from settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for persisted state; overrides `data_dir` from settings
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Frame spacing in ms; overrides `frame_ms` from settings
    #[arg(long)]
    frame_ms: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text")]
    log_format: String,
}

impl Args {
    fn into_settings(self) -> Result<(ReplaySettings, PathBuf, PathBuf)> {
        let mut settings = ReplaySettings::load(self.settings.as_deref())?;
        if let Some(config) = self.config {
            settings.engine_config = Some(config);
        }
        if let Some(dir) = self.data_dir {
            settings.data_dir = Some(dir);
        }
        if let Some(frame_ms) = self.frame_ms {
            settings.frame_ms = frame_ms;
        }
        Ok((settings, self.manifest, self.trace))
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Summary {
    artifact_id: String,
    frames: u64,
    final_score: f64,
    elapsed_ms: f64,
    clicks: u64,
    scroll_intensity: f64,
    move_distance_px: f64,
    relief_units: f64,
    erased_fragments: usize,
    fragment_total: u32,
    revealed: Vec<TargetId>,
    moves_dropped: u64,
    writes: u64,
    storage_degraded: bool,
}

/// Drives the engine on a simulated frame clock.
struct Replay {
    engine: ErosionEngine,
    wall_origin_ms: f64,
    frame_ms: f64,
    next_frame_ms: f64,
    frames: u64,
    last_frame: Option<Frame>,
    revealed: Vec<TargetId>,
}

impl Replay {
    fn at(&self, mono_ms: f64) -> Timestamp {
        Timestamp::new(self.wall_origin_ms + mono_ms, mono_ms)
    }

    /// Run every frame due at or before `until_ms`.
    fn frames_until(&mut self, until_ms: f64) {
        while self.next_frame_ms <= until_ms {
            let now = self.at(self.next_frame_ms);
            let frame = self.engine.tick(now);
            self.revealed.extend(frame.revealed.iter().cloned());
            self.frames += 1;
            self.last_frame = Some(frame);
            self.next_frame_ms += self.frame_ms;
        }
    }

    fn apply(&mut self, line: &TraceLine) -> bool {
        self.frames_until(line.at_ms);
        let now = self.at(line.at_ms);
        match &line.action {
            TraceAction::Event(event) => {
                self.engine.handle(event, now);
            }
            TraceAction::Visible(change) => {
                self.engine
                    .set_visibility(&TargetId(change.id.clone()), change.visible, now);
            }
            TraceAction::Copy(outcome) => self.engine.report_copy((*outcome).into(), now),
            TraceAction::Teardown(reason) => {
                let reason = match reason {
                    TeardownReason::Unload => Teardown::Unload,
                    TeardownReason::Hidden => Teardown::Hidden,
                };
                self.engine.teardown(reason, now);
                return reason == Teardown::Unload;
            }
        }
        false
    }

    fn summary(&self) -> Summary {
        let state = self.engine.state();
        let erased = self
            .last_frame
            .as_ref()
            .map_or(0, |f| f.fragments.iter().filter(|v| v.erased).count());
        Summary {
            artifact_id: self.engine.artifact_id().to_string(),
            frames: self.frames,
            final_score: self.engine.score(),
            elapsed_ms: state.total_elapsed_ms,
            clicks: state.click_count,
            scroll_intensity: state.scroll_intensity,
            move_distance_px: state.move_distance_px,
            relief_units: state.relief_units,
            erased_fragments: erased,
            fragment_total: self.engine.binding().fragment_total,
            revealed: self.revealed.clone(),
            moves_dropped: self.engine.listener().moves_dropped(),
            writes: self.engine.writes(),
            storage_degraded: self.engine.is_storage_degraded(),
        }
    }
}

fn run(settings: ReplaySettings, manifest: PathBuf, trace_path: PathBuf) -> Result<Summary> {
    let manifest_json = std::fs::read_to_string(&manifest)
        .with_context(|| format!("reading manifest {}", manifest.display()))?;
    let binding = ArtifactBinding::from_json(&manifest_json).context("parsing manifest")?;
    let config = settings.engine_config()?;
    let trace_text = std::fs::read_to_string(&trace_path)
        .with_context(|| format!("reading trace {}", trace_path.display()))?;
    let lines = parse_trace(&trace_text)?;

    let data_dir = settings.resolved_data_dir();
    let backend = match FileStore::open(&data_dir) {
        Ok(store) => FallbackStore::new(Box::new(store)),
        Err(e) => {
            warn!(dir = %data_dir.display(), error = %e, "state directory unusable, replaying in memory");
            FallbackStore::memory_only()
        }
    };

    let wall_origin_ms = settings
        .wall_origin_ms
        .unwrap_or_else(|| SystemClock::new().now().wall_ms);
    let mode = if settings.observe {
        ObservationMode::Observed
    } else {
        ObservationMode::AlwaysVisible
    };
    let frame_ms = if settings.frame_ms.is_finite() && settings.frame_ms > 0.0 {
        settings.frame_ms
    } else {
        warn!(frame_ms = settings.frame_ms, "invalid frame spacing, using 16ms");
        16.0
    };

    let engine = ErosionEngine::start(
        binding,
        config,
        backend,
        mode,
        Timestamp::new(wall_origin_ms, 0.0),
    )?;
    info!(
        artifact = engine.artifact_id(),
        events = lines.len(),
        data_dir = %data_dir.display(),
        "replaying trace"
    );

    let mut replay = Replay {
        engine,
        wall_origin_ms,
        frame_ms,
        next_frame_ms: 0.0,
        frames: 0,
        last_frame: None,
        revealed: Vec::new(),
    };

    let mut unloaded = false;
    for line in &lines {
        if replay.apply(line) {
            unloaded = true;
            break;
        }
    }
    if !unloaded {
        let end_ms = lines.last().map_or(0.0, |l| l.at_ms);
        replay.frames_until(end_ms);
        let now = replay.at(end_ms);
        replay.engine.teardown(Teardown::Unload, now);
    }
    Ok(replay.summary())
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level, &args.log_format);

    let result = args
        .into_settings()
        .and_then(|(settings, manifest, trace)| run(settings, manifest, trace))
        .and_then(|summary| serde_json::to_string_pretty(&summary).map_err(Into::into));

    match result {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("replay failed: {e:#}");
            process::exit(1);
        }
    }
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// `RUST_LOG` takes precedence over `level_str`.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
