use crate::config::AppConfig;
use crate::demo::DemoScene;
use crate::scripted_input::ScriptedInputPlayer;
use anyhow::{Context, Result};
use raypoint_input::InputState;
use raypoint_pointer::{
    DeviceCaps, Frame, HandlerFailure, Pointer, PointerEvent, PointerEventKind,
};
use raypoint_testkit::{EventRecord, JsonlSink};
use std::path::PathBuf;
use tracing::{info, warn};

const TICK_SECONDS: f32 = 1.0 / 60.0;

pub struct HeadlessConfig {
    pub app: AppConfig,
    pub scripted_input: Option<PathBuf>,
    pub event_log: Option<PathBuf>,
    pub max_ticks: Option<u64>,
}

/// Counts reported at the end of a headless run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessSummary {
    pub ticks: u64,
    pub enters: u64,
    pub exits: u64,
    pub clicks: u64,
    pub handler_failures: u64,
}

impl HeadlessSummary {
    fn count(&mut self, event: &PointerEvent) {
        match event.kind {
            PointerEventKind::Enter => self.enters += 1,
            PointerEventKind::Exit => self.exits += 1,
            PointerEventKind::Click => self.clicks += 1,
        }
    }
}

pub fn run(cfg: HeadlessConfig) -> Result<HeadlessSummary> {
    let mut player = match &cfg.scripted_input {
        Some(path) => ScriptedInputPlayer::from_path(path)
            .with_context(|| format!("failed to load scripted input {}", path.display()))?,
        None => ScriptedInputPlayer::builtin(),
    };
    let mut sink = cfg.event_log.as_ref().map(JsonlSink::create).transpose()?;

    let mut demo = DemoScene::build(&cfg.app);
    let mut camera = DemoScene::camera(&cfg.app);
    let mut input = InputState::with_viewport(cfg.app.window_width, cfg.app.window_height);
    let caps = DeviceCaps {
        tracked_controller: player.uses_controller(),
    };
    let mut pointer = Pointer::new(DemoScene::pointer_config(&cfg.app), caps)?;
    demo.attach(&pointer);

    let mut summary = HeadlessSummary::default();
    let mut time_ms = 0.0_f64;
    loop {
        if let Some(max) = cfg.max_ticks {
            if summary.ticks >= max {
                break;
            }
        } else if player.finished() {
            break;
        }

        let controller = player.advance(TICK_SECONDS, &mut input);
        let report = pointer.tick(
            time_ms,
            &demo.scene,
            Frame {
                camera: &mut camera,
                input: &input,
                controller: controller.as_ref(),
            },
        );
        record(
            &report.events,
            &report.failures,
            &demo,
            &mut sink,
            &mut summary,
        )?;

        input.begin_frame();
        demo.animate();
        summary.ticks += 1;
        time_ms += f64::from(TICK_SECONDS) * 1000.0;
    }

    let teardown = pointer.end_session();
    record(
        &teardown.events,
        &teardown.failures,
        &demo,
        &mut sink,
        &mut summary,
    )?;

    info!(
        ticks = summary.ticks,
        enters = summary.enters,
        exits = summary.exits,
        clicks = summary.clicks,
        colour = demo.cube_colour().as_str(),
        "Headless run finished"
    );
    Ok(summary)
}

fn record(
    events: &[PointerEvent],
    failures: &[HandlerFailure],
    demo: &DemoScene,
    sink: &mut Option<JsonlSink>,
    summary: &mut HeadlessSummary,
) -> Result<()> {
    for event in events {
        summary.count(event);
        if let Some(sink) = sink.as_mut() {
            sink.write(&EventRecord::from_event(event, demo.name_of(event.target)))?;
        }
    }
    for failure in failures {
        warn!(listener = ?failure.listener, error = %failure.error, "Handler failed");
    }
    summary.handler_failures += failures.len() as u64;
    Ok(())
}
