use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec2;

use crate::camera::Camera;
use crate::disposal::{DisposalCheck, FxSink, LogFxSink};
use crate::drag::{DragController, DragParams};
use crate::engine::{MissionConfig, MissionRunner, MissionStatus, StartError};
use crate::events::{EventSink, LogEventSink};
use crate::hint::{HintSurface, LogHintSurface};
use crate::input::{InputState, MouseButton, PointerEvent};
use crate::scene::Scene;
use crate::world::World;

/// One running game: the world plus every gameplay collaborator, ticked
/// cooperatively by the embedder. Each tick drains input edges, runs the
/// mission engine, moves the dragged prop and sweeps for disposals.
pub struct Session {
    world: World,
    camera: Camera,
    input: Arc<InputState>,
    drag: DragController,
    runner: MissionRunner,
    disposal: Option<DisposalCheck>,
    hints: Box<dyn HintSurface>,
    events: Box<dyn EventSink>,
    fx: Box<dyn FxSink>,
    pointer: Vec2,
}

impl Session {
    /// Parses the scene XML and builds a session with logging surfaces.
    pub fn new(xml: &str, width: f32, height: f32) -> Result<Self> {
        let scene = Scene::from_xml(xml).context("failed to load scene")?;
        Ok(Self::from_scene(&scene, width, height))
    }

    pub fn from_scene(scene: &Scene, width: f32, height: f32) -> Self {
        Self::with_sinks(
            scene,
            width,
            height,
            Box::new(LogHintSurface),
            Box::new(LogEventSink),
            Box::new(LogFxSink),
        )
    }

    /// Builds a session with embedder-provided presentation sinks.
    pub fn with_sinks(
        scene: &Scene,
        width: f32,
        height: f32,
        hints: Box<dyn HintSurface>,
        events: Box<dyn EventSink>,
        fx: Box<dyn FxSink>,
    ) -> Self {
        Self {
            world: World::from_scene(scene),
            camera: Camera::from_scene(scene, width, height),
            input: Arc::new(InputState::new()),
            drag: DragController::new(DragParams::default()),
            runner: MissionRunner::new(),
            disposal: DisposalCheck::from_scene(scene),
            hints,
            events,
            fx,
            pointer: Vec2::ZERO,
        }
    }

    /// Shared handle the embedder's event loop feeds.
    pub fn input(&self) -> Arc<InputState> {
        Arc::clone(&self.input)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn mission_active(&self) -> bool {
        self.runner.mission_active()
    }

    pub fn mission_status(&self) -> Option<MissionStatus> {
        self.runner.status()
    }

    pub fn start_mission(&mut self, config: MissionConfig, now: Instant) -> Result<(), StartError> {
        self.runner.start(
            config,
            now,
            &self.world,
            &mut self.drag,
            self.hints.as_ref(),
        )
    }

    pub fn reset_mission(&mut self) {
        self.runner
            .reset(&self.world, &mut self.drag, self.hints.as_ref());
    }

    /// One cooperative pass over the whole game.
    pub fn tick(&mut self, now: Instant) {
        let mut pointer_moved = false;
        for event in self.input.drain_events() {
            match event {
                PointerEvent::Pressed { button, position } if button == MouseButton::LEFT => {
                    self.pointer = position;
                    self.drag.try_pick(&self.world, &self.camera, position);
                }
                PointerEvent::Released { button, .. } if button == MouseButton::LEFT => {
                    self.drag.release(&self.world);
                }
                PointerEvent::Moved { position } => {
                    self.pointer = position;
                    pointer_moved = true;
                }
                PointerEvent::Wheel { delta, position } => {
                    self.drag.scroll(&self.world, &self.camera, position, delta);
                }
                _ => {}
            }
        }

        self.runner.tick(
            now,
            &self.world,
            &mut self.drag,
            self.hints.as_ref(),
            self.events.as_ref(),
        );

        if pointer_moved {
            self.drag.update_drag(&self.world, &self.camera, self.pointer);
        }

        if let Some(disposal) = &self.disposal {
            disposal.tick(&self.world, &mut self.drag, self.fx.as_ref());
        }
    }
}
