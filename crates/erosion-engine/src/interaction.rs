//! Interaction listener.
//!
//! Host events are routed through an explicit table from [`EventKind`] to a
//! handler. Each handler mutates counters, grants relief through the
//! [`ErosionModel`] (which decays first), and reports an [`Effect`] the engine
//! uses to schedule persistence and the host uses to apply damped scrolling.
//!
//! | event        | counters                         | relief                               |
//! |--------------|----------------------------------|--------------------------------------|
//! | pointer-down | `click_count += 1`, trace append | fixed `pointer_down_relief`          |
//! | wheel        | `scroll_intensity += |dy|`       | `wheel_relief_per_notch * |dy|/120`  |
//! | scroll       | `scroll_intensity += |dy|`       | same rate as wheel                   |
//! | pointer-move | `move_distance_px += d` (mouse)  | `move_relief_per_px * d`, rate-limited |

use std::collections::HashMap;

use erosion_core::config::InteractionConfig;
use erosion_core::constants::WHEEL_NOTCH_UNITS;
use erosion_core::types::{EngineState, PointerKind, PointerSample, Timestamp, ZoneId};
use erosion_decay::{ErosionModel, clamp01};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// An input event reported by the host page. Coordinates are CSS pixels.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InteractionEvent {
    PointerDown {
        x: f64,
        y: f64,
        viewport_width: f64,
        viewport_height: f64,
        #[serde(default)]
        pointer: PointerKind,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        pointer: PointerKind,
    },
    Wheel {
        delta_y: f64,
        /// Resistance zone under the pointer, if any.
        #[serde(default)]
        zone: Option<ZoneId>,
    },
    Scroll {
        delta_y: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    PointerMove,
    Wheel,
    Scroll,
}

impl InteractionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::PointerMove { .. } => EventKind::PointerMove,
            Self::Wheel { .. } => EventKind::Wheel,
            Self::Scroll { .. } => EventKind::Scroll,
        }
    }
}

/// How the host should scroll in response to a wheel event.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrollDirective {
    /// Delta to apply, already damped by any zone resistance.
    pub applied_delta: f64,
    /// Cancel the native scroll and apply `applied_delta` instead.
    pub suppress_native: bool,
}

/// Result of handling one event.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    /// The event changed state (and should be persisted).
    pub accepted: bool,
    pub relief_granted: f64,
    pub scroll: Option<ScrollDirective>,
}

impl Effect {
    fn ignored() -> Self {
        Self::default()
    }
}

/// Mutable view a handler works against.
pub struct InteractionContext<'a> {
    pub state: &'a mut EngineState,
    pub model: &'a ErosionModel,
    pub now: Timestamp,
}

pub type Handler = fn(&mut InteractionListener, &InteractionEvent, &mut InteractionContext<'_>) -> Effect;

/// Event kind → handler. Kept as data so the mapping is auditable.
const HANDLERS: [(EventKind, Handler); 4] = [
    (EventKind::PointerDown, on_pointer_down),
    (EventKind::PointerMove, on_pointer_move),
    (EventKind::Wheel, on_wheel),
    (EventKind::Scroll, on_scroll),
];

/// Handler registered for `kind`.
pub fn handler_for(kind: EventKind) -> Handler {
    HANDLERS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, h)| *h)
        .unwrap_or(ignore)
}

fn ignore(_: &mut InteractionListener, _: &InteractionEvent, _: &mut InteractionContext<'_>) -> Effect {
    Effect::ignored()
}

/// Session-scoped listener state. Nothing here is persisted.
#[derive(Debug, Clone)]
pub struct InteractionListener {
    config: InteractionConfig,
    zones: HashMap<ZoneId, f64>,
    last_position: Option<(f64, f64)>,
    last_sample_mono_ms: Option<f64>,
    moves_accepted: u64,
    moves_dropped: u64,
}

impl InteractionListener {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            zones: HashMap::new(),
            last_position: None,
            last_sample_mono_ms: None,
            moves_accepted: 0,
            moves_dropped: 0,
        }
    }

    /// Register a resistance zone. The factor is clamped to `[0, max_resistance]`.
    pub fn add_zone(&mut self, id: ZoneId, resistance: f64) {
        let r = if resistance.is_finite() {
            resistance.clamp(0.0, self.config.max_resistance)
        } else {
            0.0
        };
        debug!(zone = %id, resistance = r, "registered resistance zone");
        self.zones.insert(id, r);
    }

    pub fn resistance(&self, zone: &ZoneId) -> f64 {
        self.zones.get(zone).copied().unwrap_or(0.0)
    }

    /// Pointer-move samples that counted toward distance.
    pub fn moves_accepted(&self) -> u64 {
        self.moves_accepted
    }

    /// Pointer-move samples dropped by the rate limit.
    pub fn moves_dropped(&self) -> u64 {
        self.moves_dropped
    }

    /// Route one event through the handler table.
    pub fn dispatch(&mut self, event: &InteractionEvent, ctx: &mut InteractionContext<'_>) -> Effect {
        let handler = handler_for(event.kind());
        handler(self, event, ctx)
    }

    fn scroll_relief(&self, delta: f64) -> f64 {
        self.config.wheel_relief_per_notch * delta.abs() / WHEEL_NOTCH_UNITS
    }
}

fn on_pointer_down(
    listener: &mut InteractionListener,
    event: &InteractionEvent,
    ctx: &mut InteractionContext<'_>,
) -> Effect {
    let InteractionEvent::PointerDown {
        x,
        y,
        viewport_width,
        viewport_height,
        ..
    } = *event
    else {
        return Effect::ignored();
    };
    if !(x.is_finite() && y.is_finite()) {
        return Effect::ignored();
    }
    ctx.state.click_count = ctx.state.click_count.saturating_add(1);
    let relief = ctx
        .model
        .add_relief(ctx.state, listener.config.pointer_down_relief, ctx.now.wall_ms);
    ctx.state.push_trace(
        PointerSample {
            x: normalize(x, viewport_width),
            y: normalize(y, viewport_height),
            t: ctx.now.wall_ms,
        },
        listener.config.trace_capacity,
    );
    Effect {
        accepted: true,
        relief_granted: relief,
        scroll: None,
    }
}

fn on_pointer_move(
    listener: &mut InteractionListener,
    event: &InteractionEvent,
    ctx: &mut InteractionContext<'_>,
) -> Effect {
    let InteractionEvent::PointerMove { x, y, pointer } = *event else {
        return Effect::ignored();
    };
    // Touch and pen motion also scrolls; counting it here would double-count.
    if !pointer.tracks_motion() || !(x.is_finite() && y.is_finite()) {
        return Effect::ignored();
    }

    let previous = listener.last_position.replace((x, y));
    let mono = ctx.now.mono_ms;
    if let Some(last) = listener.last_sample_mono_ms {
        if mono - last < listener.config.move_sample_interval_ms {
            listener.moves_dropped += 1;
            trace!(dt = mono - last, "pointer-move sample dropped");
            return Effect::ignored();
        }
    }
    listener.last_sample_mono_ms = Some(mono);
    listener.moves_accepted += 1;

    let distance = previous.map_or(0.0, |(px, py)| (x - px).hypot(y - py));
    ctx.state.move_distance_px += distance;
    let relief = ctx.model.add_relief(
        ctx.state,
        distance * listener.config.move_relief_per_px,
        ctx.now.wall_ms,
    );
    Effect {
        accepted: distance > 0.0,
        relief_granted: relief,
        scroll: None,
    }
}

fn on_wheel(
    listener: &mut InteractionListener,
    event: &InteractionEvent,
    ctx: &mut InteractionContext<'_>,
) -> Effect {
    let InteractionEvent::Wheel { delta_y, ref zone } = *event else {
        return Effect::ignored();
    };
    if !delta_y.is_finite() || delta_y == 0.0 {
        return Effect::ignored();
    }
    ctx.state.scroll_intensity += delta_y.abs();
    let relief = ctx
        .model
        .add_relief(ctx.state, listener.scroll_relief(delta_y), ctx.now.wall_ms);

    let resistance = zone.as_ref().map_or(0.0, |z| listener.resistance(z));
    let scroll = if resistance > 0.0 {
        ScrollDirective {
            applied_delta: delta_y * (1.0 - resistance),
            suppress_native: true,
        }
    } else {
        ScrollDirective {
            applied_delta: delta_y,
            suppress_native: false,
        }
    };
    Effect {
        accepted: true,
        relief_granted: relief,
        scroll: Some(scroll),
    }
}

fn on_scroll(
    listener: &mut InteractionListener,
    event: &InteractionEvent,
    ctx: &mut InteractionContext<'_>,
) -> Effect {
    let InteractionEvent::Scroll { delta_y } = *event else {
        return Effect::ignored();
    };
    if !delta_y.is_finite() || delta_y == 0.0 {
        return Effect::ignored();
    }
    ctx.state.scroll_intensity += delta_y.abs();
    let relief = ctx
        .model
        .add_relief(ctx.state, listener.scroll_relief(delta_y), ctx.now.wall_ms);
    Effect {
        accepted: true,
        relief_granted: relief,
        scroll: None,
    }
}

fn normalize(value: f64, extent: f64) -> f64 {
    if extent.is_finite() && extent > 0.0 {
        clamp01(value / extent)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erosion_core::constants::MAX_TRACE_LEN;

    struct Rig {
        listener: InteractionListener,
        state: EngineState,
        model: ErosionModel,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                listener: InteractionListener::new(InteractionConfig::default()),
                state: EngineState::default(),
                model: ErosionModel::default(),
            }
        }

        fn send(&mut self, event: InteractionEvent, at_ms: f64) -> Effect {
            let mut ctx = InteractionContext {
                state: &mut self.state,
                model: &self.model,
                now: Timestamp::new(at_ms, at_ms),
            };
            self.listener.dispatch(&event, &mut ctx)
        }
    }

    fn down(x: f64, y: f64) -> InteractionEvent {
        InteractionEvent::PointerDown {
            x,
            y,
            viewport_width: 1_000.0,
            viewport_height: 800.0,
            pointer: PointerKind::Mouse,
        }
    }

    fn mouse_move(x: f64, y: f64) -> InteractionEvent {
        InteractionEvent::PointerMove {
            x,
            y,
            pointer: PointerKind::Mouse,
        }
    }

    #[test]
    fn table_covers_every_kind() {
        for kind in [
            EventKind::PointerDown,
            EventKind::PointerMove,
            EventKind::Wheel,
            EventKind::Scroll,
        ] {
            assert!(HANDLERS.iter().any(|(k, _)| *k == kind), "{kind:?} unrouted");
        }
    }

    #[test]
    fn pointer_down_counts_relieves_and_traces() {
        let mut rig = Rig::new();
        let effect = rig.send(down(250.0, 200.0), 1_000.0);
        assert!(effect.accepted);
        assert_eq!(effect.relief_granted, 16.0);
        assert_eq!(rig.state.click_count, 1);
        assert_eq!(rig.state.relief_units, 16.0);
        let p = rig.state.pointer_trace.back().copied().unwrap();
        assert_eq!((p.x, p.y, p.t), (0.25, 0.25, 1_000.0));
    }

    #[test]
    fn trace_is_bounded() {
        let mut rig = Rig::new();
        for i in 0..40 {
            rig.send(down(10.0, 10.0), i as f64 * 100.0);
        }
        assert_eq!(rig.state.pointer_trace.len(), MAX_TRACE_LEN);
        assert_eq!(rig.state.click_count, 40);
    }

    #[test]
    fn touch_pointer_down_still_counts() {
        let mut rig = Rig::new();
        rig.send(
            InteractionEvent::PointerDown {
                x: 1.0,
                y: 1.0,
                viewport_width: 10.0,
                viewport_height: 10.0,
                pointer: PointerKind::Touch,
            },
            0.0,
        );
        assert_eq!(rig.state.click_count, 1);
    }

    #[test]
    fn zero_viewport_normalizes_to_origin() {
        let mut rig = Rig::new();
        rig.send(
            InteractionEvent::PointerDown {
                x: 50.0,
                y: 50.0,
                viewport_width: 0.0,
                viewport_height: f64::NAN,
                pointer: PointerKind::Mouse,
            },
            0.0,
        );
        let p = rig.state.pointer_trace[0];
        assert_eq!((p.x, p.y), (0.0, 0.0));
    }

    #[test]
    fn wheel_relief_is_per_notch() {
        let mut rig = Rig::new();
        let effect = rig.send(
            InteractionEvent::Wheel {
                delta_y: -240.0,
                zone: None,
            },
            0.0,
        );
        assert_eq!(effect.relief_granted, 8.0);
        assert_eq!(rig.state.scroll_intensity, 240.0);
        assert_eq!(
            effect.scroll,
            Some(ScrollDirective {
                applied_delta: -240.0,
                suppress_native: false,
            })
        );
    }

    #[test]
    fn wheel_in_resistance_zone_is_damped() {
        let mut rig = Rig::new();
        rig.listener.add_zone(ZoneId("artifact".into()), 0.75);
        let effect = rig.send(
            InteractionEvent::Wheel {
                delta_y: 100.0,
                zone: Some(ZoneId("artifact".into())),
            },
            0.0,
        );
        let scroll = effect.scroll.unwrap();
        assert!(scroll.suppress_native);
        assert!((scroll.applied_delta - 25.0).abs() < 1e-12);
        // Intensity and relief follow the raw input, not the damped delta.
        assert_eq!(rig.state.scroll_intensity, 100.0);
    }

    #[test]
    fn unknown_zone_has_no_resistance() {
        let mut rig = Rig::new();
        let effect = rig.send(
            InteractionEvent::Wheel {
                delta_y: 50.0,
                zone: Some(ZoneId("nowhere".into())),
            },
            0.0,
        );
        assert!(!effect.scroll.unwrap().suppress_native);
    }

    #[test]
    fn zone_resistance_is_clamped() {
        let mut l = InteractionListener::new(InteractionConfig::default());
        l.add_zone(ZoneId("a".into()), 4.0);
        l.add_zone(ZoneId("b".into()), -1.0);
        l.add_zone(ZoneId("c".into()), f64::NAN);
        assert_eq!(l.resistance(&ZoneId("a".into())), 0.95);
        assert_eq!(l.resistance(&ZoneId("b".into())), 0.0);
        assert_eq!(l.resistance(&ZoneId("c".into())), 0.0);
    }

    #[test]
    fn scroll_event_counts_without_directive() {
        let mut rig = Rig::new();
        let effect = rig.send(InteractionEvent::Scroll { delta_y: 120.0 }, 0.0);
        assert_eq!(effect.relief_granted, 4.0);
        assert_eq!(effect.scroll, None);
        assert_eq!(rig.state.scroll_intensity, 120.0);
    }

    #[test]
    fn zero_or_bad_deltas_are_ignored() {
        let mut rig = Rig::new();
        for d in [0.0, f64::NAN, f64::INFINITY] {
            assert!(!rig.send(InteractionEvent::Scroll { delta_y: d }, 0.0).accepted);
            assert!(!rig.send(InteractionEvent::Wheel { delta_y: d, zone: None }, 0.0).accepted);
        }
        assert_eq!(rig.state.scroll_intensity, 0.0);
    }

    #[test]
    fn mouse_moves_accumulate_distance() {
        let mut rig = Rig::new();
        rig.send(mouse_move(0.0, 0.0), 0.0);
        rig.send(mouse_move(30.0, 40.0), 100.0);
        rig.send(mouse_move(30.0, 140.0), 200.0);
        assert_eq!(rig.state.move_distance_px, 150.0);
        // 2 + 4 units granted 100 ms apart; the first has decayed slightly.
        assert!(rig.state.relief_units > 5.9 && rig.state.relief_units < 6.0);
        assert_eq!(rig.listener.moves_accepted(), 3);
    }

    #[test]
    fn touch_and_pen_moves_are_excluded() {
        let mut rig = Rig::new();
        for (i, kind) in [PointerKind::Touch, PointerKind::Pen].into_iter().enumerate() {
            rig.send(
                InteractionEvent::PointerMove {
                    x: 0.0,
                    y: 0.0,
                    pointer: kind,
                },
                i as f64 * 100.0,
            );
            rig.send(
                InteractionEvent::PointerMove {
                    x: 500.0,
                    y: 0.0,
                    pointer: kind,
                },
                i as f64 * 100.0 + 50.0,
            );
        }
        assert_eq!(rig.state.move_distance_px, 0.0);
        assert_eq!(rig.state.relief_units, 0.0);
        assert_eq!(rig.listener.moves_accepted(), 0);
    }

    #[test]
    fn burst_of_moves_is_rate_limited() {
        let mut rig = Rig::new();
        rig.send(mouse_move(0.0, 0.0), 0.0);
        // 25 moves 1 ms apart, 10 px each.
        for i in 0..25 {
            rig.send(mouse_move(10.0 * (i + 1) as f64, 0.0), 100.0 + i as f64);
        }
        assert_eq!(rig.listener.moves_accepted(), 2);
        assert_eq!(rig.listener.moves_dropped(), 24);
        assert_eq!(rig.state.move_distance_px, 10.0);
    }

    #[test]
    fn sample_after_interval_measures_from_last_seen_position() {
        let mut rig = Rig::new();
        rig.send(mouse_move(0.0, 0.0), 0.0);
        rig.send(mouse_move(100.0, 0.0), 10.0); // dropped
        rig.send(mouse_move(110.0, 0.0), 40.0);
        assert_eq!(rig.state.move_distance_px, 10.0);
    }

    #[test]
    fn handler_for_routes_by_kind() {
        let mut rig = Rig::new();
        let handler = handler_for(EventKind::Scroll);
        let mut ctx = InteractionContext {
            state: &mut rig.state,
            model: &rig.model,
            now: Timestamp::default(),
        };
        let effect = handler(
            &mut rig.listener,
            &InteractionEvent::Scroll { delta_y: 60.0 },
            &mut ctx,
        );
        assert!(effect.accepted);
    }

    #[test]
    fn mismatched_handler_ignores_event() {
        let mut rig = Rig::new();
        let mut ctx = InteractionContext {
            state: &mut rig.state,
            model: &rig.model,
            now: Timestamp::default(),
        };
        let effect = on_wheel(&mut rig.listener, &down(1.0, 1.0), &mut ctx);
        assert_eq!(effect, Effect::default());
    }

    #[test]
    fn events_deserialize_from_host_json() {
        let e: InteractionEvent = serde_json::from_str(
            r#"{"type":"pointerDown","x":5,"y":6,"viewportWidth":10,"viewportHeight":12,"pointer":"touch"}"#,
        )
        .unwrap();
        assert_eq!(e.kind(), EventKind::PointerDown);
        let w: InteractionEvent =
            serde_json::from_str(r#"{"type":"wheel","deltaY":-3,"zone":"artifact"}"#).unwrap();
        assert_eq!(
            w,
            InteractionEvent::Wheel {
                delta_y: -3.0,
                zone: Some(ZoneId("artifact".into())),
            }
        );
        let m: InteractionEvent = serde_json::from_str(r#"{"type":"pointerMove","x":1,"y":2}"#).unwrap();
        assert_eq!(
            m,
            InteractionEvent::PointerMove {
                x: 1.0,
                y: 2.0,
                pointer: PointerKind::Mouse,
            }
        );
    }
}
