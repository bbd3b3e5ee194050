//! The pointer session: one object that owns hover state, the input backend
//! and the listener table, advanced once per rendered frame.

use crate::click::ClickTrigger;
use crate::config::PointerConfig;
use crate::error::PointerError;
use crate::events::{
    DispatchReport, EventDispatcher, HandlerFailure, PointerEvent, PointerEventKind,
};
use crate::hover::{HoverEvent, HoverTracker};
use crate::raycaster::{RaycastHit, Raycaster};
use crate::scene::SceneIndex;
use crate::source::{source_for, DeviceCaps, Frame, InputMode, InputSource};
use raypoint_core::{FrameTick, ObjectId, Ray};
use tracing::{debug, info, trace, warn};

/// What one call to [`Pointer::tick`] did.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Frame counter after this tick.
    pub tick: FrameTick,
    /// Ray used for hit-testing, if the input source produced one.
    pub ray: Option<Ray>,
    /// Nearest hit, if any.
    pub hit: Option<RaycastHit>,
    /// Events emitted, in delivery order.
    pub events: Vec<PointerEvent>,
    /// Handlers that failed while those events were delivered.
    pub failures: Vec<HandlerFailure>,
}

/// A pointer interaction session.
///
/// Construct it once the scene is set up, register listeners through
/// [`Pointer::events`], then call [`Pointer::tick`] at most once per frame.
pub struct Pointer {
    config: PointerConfig,
    source: Box<dyn InputSource>,
    raycaster: Raycaster,
    hover: HoverTracker,
    clicks: ClickTrigger,
    events: EventDispatcher,
    tick: FrameTick,
    last_time_ms: f64,
    last_ray: Option<Ray>,
    ended: bool,
}

impl std::fmt::Debug for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pointer")
            .field("mode", &self.source.mode())
            .field("hovered", &self.hover.current())
            .field("tick", &self.tick)
            .field("ended", &self.ended)
            .finish()
    }
}

impl Pointer {
    /// Start a session.
    ///
    /// The input backend is chosen here from `caps` and the configuration and
    /// stays fixed for the lifetime of the session.
    pub fn new(config: PointerConfig, caps: DeviceCaps) -> Result<Self, PointerError> {
        config.settings.validate()?;

        let mode = InputMode::select(caps, &config.settings);
        if config.settings.camera_follow_mouse && mode != InputMode::ScreenPointer {
            warn!(
                mode = mode.as_str(),
                "camera_follow_mouse only applies to the screen pointer; ignoring"
            );
        }
        info!(mode = mode.as_str(), filter = ?config.filter, "Pointer session started");

        let raycaster = config
            .settings
            .max_distance
            .map(Raycaster::with_max_distance)
            .unwrap_or_default();

        Ok(Self {
            source: source_for(mode, &config.settings),
            config,
            raycaster,
            hover: HoverTracker::new(),
            clicks: ClickTrigger::new(),
            events: EventDispatcher::new(),
            tick: FrameTick::ZERO,
            last_time_ms: 0.0,
            last_ray: None,
            ended: false,
        })
    }

    /// Backend selected for this session.
    pub fn mode(&self) -> InputMode {
        self.source.mode()
    }

    /// Currently hovered object.
    pub fn hovered(&self) -> Option<ObjectId> {
        self.hover.current()
    }

    /// Ray used by the most recent tick.
    pub fn last_ray(&self) -> Option<Ray> {
        self.last_ray
    }

    /// Frames processed so far.
    pub fn frame(&self) -> FrameTick {
        self.tick
    }

    /// Clicks delivered so far.
    pub fn click_count(&self) -> u64 {
        self.clicks.clicks()
    }

    /// Session configuration.
    pub fn config(&self) -> &PointerConfig {
        &self.config
    }

    /// Listener table for attaching `enter`/`exit`/`click` handlers.
    ///
    /// The returned handle shares state with the session; clones may be
    /// moved into handlers.
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Shorthand for `events().on(..)`.
    pub fn on<F>(&self, target: ObjectId, kind: PointerEventKind, handler: F) -> crate::ListenerId
    where
        F: Fn(&PointerEvent) -> anyhow::Result<()> + 'static,
    {
        self.events.on(target, kind, handler)
    }

    /// Process one frame of interaction.
    ///
    /// Polls the pose, casts the ray, diffs hover state and dispatches
    /// `exit`/`enter`, then turns an activation edge into a `click` on the
    /// hovered object. Skipping a frame simply processes nothing for it.
    pub fn tick<S>(&mut self, time_ms: f64, scene: &S, frame: Frame<'_>) -> TickReport
    where
        S: SceneIndex + ?Sized,
    {
        if self.ended {
            warn!("Pointer ticked after end_session; ignoring");
            return TickReport {
                tick: self.tick,
                ..Default::default()
            };
        }

        self.tick = self.tick.advance(1);
        self.last_time_ms = time_ms;
        let mut report = TickReport {
            tick: self.tick,
            ..Default::default()
        };

        if self.config.settings.camera_follow_mouse && self.mode() == InputMode::ScreenPointer {
            let (dx, dy) = frame.input.mouse_delta;
            if dx != 0.0 || dy != 0.0 {
                let sensitivity = f64::from(self.config.settings.mouse_sensitivity);
                frame
                    .camera
                    .rotate((-dx * sensitivity) as f32, (-dy * sensitivity) as f32);
            }
        }

        if let Some(stale) = self.hover.evict_stale(|id| scene.contains(id)) {
            debug!(?stale, "Hovered object left the scene");
            self.deliver_hover(stale, &mut report);
        }

        let ray = self.source.ray(&frame);
        self.last_ray = ray;
        report.ray = ray;
        match ray {
            Some(ray) => {
                let hit = self.raycaster.cast(scene, &ray, &self.config.filter);
                trace!(origin = ?ray.origin, direction = ?ray.direction, hit = ?hit, "Pointer raycast");
                report.hit = hit;
                for transition in self.hover.update(hit.map(|hit| hit.object)) {
                    debug!(?transition, "Hover transition");
                    self.deliver_hover(transition, &mut report);
                }
            }
            None => trace!("No pointer ray this frame"),
        }

        let edge = self.source.activation_edge(&frame);
        if let Some(target) = self.clicks.resolve(edge, self.hover.current()) {
            debug!(%target, "Click");
            self.deliver(PointerEventKind::Click, target, &mut report);
        }

        report
    }

    /// End the session, emitting the pending `exit` for the hovered object.
    /// The returned report lists that event.
    ///
    /// Calling it again is a no-op.
    pub fn end_session(&mut self) -> DispatchReport {
        let mut dispatch = DispatchReport::default();
        if self.ended {
            return dispatch;
        }
        self.ended = true;

        if let Some(HoverEvent::Exit(target)) = self.hover.clear() {
            let event = self.event(PointerEventKind::Exit, target);
            dispatch = self.events.emit(&event);
        }
        info!(
            frames = self.tick.0,
            clicks = self.clicks.clicks(),
            ignored_activations = self.clicks.ignored(),
            "Pointer session ended"
        );
        dispatch
    }

    fn event(&self, kind: PointerEventKind, target: ObjectId) -> PointerEvent {
        PointerEvent {
            kind,
            target,
            tick: self.tick,
            time_ms: self.last_time_ms,
        }
    }

    fn deliver_hover(&self, transition: HoverEvent, report: &mut TickReport) {
        match transition {
            HoverEvent::Exit(target) => self.deliver(PointerEventKind::Exit, target, report),
            HoverEvent::Enter(target) => self.deliver(PointerEventKind::Enter, target, report),
        }
    }

    fn deliver(&self, kind: PointerEventKind, target: ObjectId, report: &mut TickReport) {
        let event = self.event(kind, target);
        let dispatch = self.events.emit(&event);
        report.events.push(event);
        report.failures.extend(dispatch.failures);
    }
}

impl Drop for Pointer {
    fn drop(&mut self) {
        if !self.ended {
            self.end_session();
        }
    }
}
