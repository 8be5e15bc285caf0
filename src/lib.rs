//! Gameplay-logic core for a browser-embedded 3D exploration puzzle.
//!
//! The crate owns missions, pointer dragging, hints and disposal; the
//! renderer, the physics integrator and the host page stay outside,
//! behind small traits, so the whole game loop runs headless in tests
//! and tools.

pub mod camera;
pub mod campaign;
pub mod disposal;
pub mod drag;
pub mod engine;
pub mod events;
pub mod hint;
pub mod input;
pub mod scene;
pub mod session;
pub mod spatial;
#[cfg(target_arch = "wasm32")]
pub mod web;
pub mod world;

pub use camera::Camera;
pub use campaign::{investigation_mission, DEMO_SCENE};
pub use disposal::{DisposalCheck, FxSink, LogFxSink};
pub use drag::{DragController, DragParams, DragSession};
pub use engine::{
    ActionConfig, Hook, MissionConfig, MissionRunner, MissionStatus, Predicate, StartError,
    StepConfig, TickView,
};
pub use events::{EventSink, GameEvent, LogEventSink, MemoryEventSink};
pub use hint::{
    HintScheduler, HintSurface, LogHintSurface, MemoryHintSurface, DEFAULT_HINT_DELAY,
};
pub use input::{InputState, MouseButton, PointerEvent};
pub use scene::{BodyKind, Scene, SceneObject};
pub use session::Session;
pub use spatial::{OverlapHit, RayHit, SpatialQuery};
pub use world::{Prop, RigidBody, World};
