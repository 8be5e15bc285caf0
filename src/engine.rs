use std::time::{Duration, Instant};

use log::{debug, info};
use thiserror::Error;

use crate::drag::DragController;
use crate::events::{EventSink, GameEvent};
use crate::hint::{HintScheduler, HintSurface, DEFAULT_HINT_DELAY};
use crate::world::World;

/// Read-only view of the game handed to completion predicates each tick.
pub struct TickView<'a> {
    pub world: &'a World,
    pub dragged: Option<&'a str>,
    pub whitelist: &'a [String],
}

pub type Predicate = Box<dyn Fn(&TickView<'_>) -> bool>;
pub type Hook = Box<dyn Fn(&World)>;

/// One objective the player works on. An action owns the drag whitelist
/// and the hint while it is current.
pub struct ActionConfig {
    pub target: String,
    pub hint_text: String,
    pub hint_delay: Duration,
    pub draggable: Vec<String>,
    pub complete_when: Predicate,
    pub hide_hint_when: Option<Predicate>,
    pub on_enter: Option<Hook>,
    pub on_exit: Option<Hook>,
}

impl ActionConfig {
    pub fn new(
        target: impl Into<String>,
        hint_text: impl Into<String>,
        complete_when: Predicate,
    ) -> Self {
        Self {
            target: target.into(),
            hint_text: hint_text.into(),
            hint_delay: DEFAULT_HINT_DELAY,
            draggable: Vec::new(),
            complete_when,
            hide_hint_when: None,
            on_enter: None,
            on_exit: None,
        }
    }

    pub fn draggable(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.draggable = names.into_iter().collect();
        self
    }

    pub fn hint_delay(mut self, delay: Duration) -> Self {
        self.hint_delay = delay;
        self
    }

    pub fn hide_hint_when(mut self, predicate: Predicate) -> Self {
        self.hide_hint_when = Some(predicate);
        self
    }

    pub fn on_enter(mut self, hook: Hook) -> Self {
        self.on_enter = Some(hook);
        self
    }

    pub fn on_exit(mut self, hook: Hook) -> Self {
        self.on_exit = Some(hook);
        self
    }
}

/// A sequence of actions; finishing the last one finishes the step and
/// optionally opens a follow-up task on the host page.
pub struct StepConfig {
    pub actions: Vec<ActionConfig>,
    pub task: Option<String>,
    pub on_enter: Option<Hook>,
    pub on_exit: Option<Hook>,
}

impl StepConfig {
    pub fn new(actions: Vec<ActionConfig>) -> Self {
        Self {
            actions,
            task: None,
            on_enter: None,
            on_exit: None,
        }
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn on_enter(mut self, hook: Hook) -> Self {
        self.on_enter = Some(hook);
        self
    }

    pub fn on_exit(mut self, hook: Hook) -> Self {
        self.on_exit = Some(hook);
        self
    }
}

/// A full quest line.
pub struct MissionConfig {
    pub id: String,
    pub steps: Vec<StepConfig>,
    pub on_start: Option<Hook>,
    pub on_complete: Option<Hook>,
}

impl MissionConfig {
    pub fn new(id: impl Into<String>, steps: Vec<StepConfig>) -> Self {
        Self {
            id: id.into(),
            steps,
            on_start: None,
            on_complete: None,
        }
    }

    pub fn on_start(mut self, hook: Hook) -> Self {
        self.on_start = Some(hook);
        self
    }

    pub fn on_complete(mut self, hook: Hook) -> Self {
        self.on_complete = Some(hook);
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("mission `{0}` has no steps")]
    EmptyMission(String),
    #[error("mission `{mission}` step {step} has no actions")]
    EmptyStep { mission: String, step: usize },
    #[error("mission `{active}` is already running")]
    MissionActive { active: String },
}

/// Position inside the running mission, for status displays and drivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionStatus {
    pub mission: String,
    pub step: usize,
    pub action: usize,
    pub target: String,
    pub draggable: Vec<String>,
}

struct ActiveMission {
    config: MissionConfig,
    step: usize,
    action: usize,
}

/// Drives one mission at a time: polls the current action's predicate
/// every tick and walks the explicit `{step, action}` cursor forward.
/// At most one action completes per tick; a freshly entered action is
/// first evaluated on the next tick.
#[derive(Default)]
pub struct MissionRunner {
    active: Option<ActiveMission>,
    hints: HintScheduler,
}

impl MissionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mission_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn status(&self) -> Option<MissionStatus> {
        let active = self.active.as_ref()?;
        let action = &active.config.steps[active.step].actions[active.action];
        Some(MissionStatus {
            mission: active.config.id.clone(),
            step: active.step,
            action: active.action,
            target: action.target.clone(),
            draggable: action.draggable.clone(),
        })
    }

    pub fn hints(&self) -> &HintScheduler {
        &self.hints
    }

    /// Validates and starts a mission. Fails if one is already running;
    /// call [`reset`](Self::reset) first to replace it.
    pub fn start(
        &mut self,
        config: MissionConfig,
        now: Instant,
        world: &World,
        drag: &mut DragController,
        surface: &dyn HintSurface,
    ) -> Result<(), StartError> {
        if let Some(active) = &self.active {
            return Err(StartError::MissionActive {
                active: active.config.id.clone(),
            });
        }
        if config.steps.is_empty() {
            return Err(StartError::EmptyMission(config.id));
        }
        for (index, step) in config.steps.iter().enumerate() {
            if step.actions.is_empty() {
                return Err(StartError::EmptyStep {
                    mission: config.id,
                    step: index,
                });
            }
        }

        info!("mission {} started", config.id);
        if let Some(hook) = &config.on_start {
            hook(world);
        }
        if let Some(hook) = &config.steps[0].on_enter {
            hook(world);
        }
        begin_action(&mut self.hints, &config.steps[0].actions[0], now, world, drag, surface);
        self.active = Some(ActiveMission {
            config,
            step: 0,
            action: 0,
        });
        Ok(())
    }

    /// One cooperative pass: hint bookkeeping, then the current action's
    /// completion predicate, then advancement if it held.
    pub fn tick(
        &mut self,
        now: Instant,
        world: &World,
        drag: &mut DragController,
        surface: &dyn HintSurface,
        events: &dyn EventSink,
    ) {
        let hints = &mut self.hints;
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let completed = {
            let action = &active.config.steps[active.step].actions[active.action];
            let view = TickView {
                world,
                dragged: drag.dragged(),
                whitelist: drag.whitelist(),
            };
            if hints.is_visible() {
                if let Some(predicate) = &action.hide_hint_when {
                    if predicate(&view) {
                        hints.cancel(surface);
                    }
                }
            }
            hints.poll(now, surface);
            (action.complete_when)(&view)
        };
        if !completed {
            return;
        }

        debug!(
            "mission {} action {}/{} completed",
            active.config.id, active.step, active.action
        );
        hints.cancel(surface);
        drag.release(world);
        drag.set_whitelist(std::iter::empty());
        {
            let action = &active.config.steps[active.step].actions[active.action];
            if let Some(hook) = &action.on_exit {
                hook(world);
            }
        }

        active.action += 1;
        if active.action < active.config.steps[active.step].actions.len() {
            let action = &active.config.steps[active.step].actions[active.action];
            begin_action(hints, action, now, world, drag, surface);
            return;
        }

        // step finished
        {
            let step = &active.config.steps[active.step];
            if let Some(hook) = &step.on_exit {
                hook(world);
            }
            if let Some(task) = &step.task {
                events.emit(&GameEvent::TaskOpened { task: task.clone() });
            }
        }
        active.step += 1;
        active.action = 0;

        if active.step < active.config.steps.len() {
            let step = &active.config.steps[active.step];
            if let Some(hook) = &step.on_enter {
                hook(world);
            }
            begin_action(hints, &step.actions[0], now, world, drag, surface);
            return;
        }

        // mission finished
        if let Some(finished) = self.active.take() {
            if let Some(hook) = &finished.config.on_complete {
                hook(world);
            }
            info!("mission {} completed", finished.config.id);
            events.emit(&GameEvent::MissionCompleted {
                mission: finished.config.id,
            });
        }
    }

    /// Tears the running mission down: pending hint, drag session and
    /// whitelist included. The world keeps whatever state it reached.
    pub fn reset(
        &mut self,
        world: &World,
        drag: &mut DragController,
        surface: &dyn HintSurface,
    ) {
        self.hints.cancel(surface);
        drag.release(world);
        drag.set_whitelist(std::iter::empty());
        if let Some(active) = self.active.take() {
            info!("mission {} reset", active.config.id);
        }
    }
}

fn begin_action(
    hints: &mut HintScheduler,
    action: &ActionConfig,
    now: Instant,
    world: &World,
    drag: &mut DragController,
    surface: &dyn HintSurface,
) {
    hints.cancel(surface);
    drag.set_whitelist(action.draggable.iter().cloned());
    if let Some(hook) = &action.on_enter {
        hook(world);
    }
    hints.schedule(now, action.hint_delay, &action.target, &action.hint_text);
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::drag::{DragController, DragParams};
    use crate::events::MemoryEventSink;
    use crate::hint::MemoryHintSurface;

    fn flag_action(target: &str, flag: &Arc<AtomicBool>) -> ActionConfig {
        let flag = Arc::clone(flag);
        ActionConfig::new(
            target,
            format!("do the {target} thing"),
            Box::new(move |_| flag.load(Ordering::SeqCst)),
        )
    }

    fn harness() -> (World, DragController, MemoryHintSurface, MemoryEventSink) {
        (
            World::new(),
            DragController::new(DragParams::default()),
            MemoryHintSurface::new(),
            MemoryEventSink::new(),
        )
    }

    #[test]
    fn mission_walks_steps_and_completes_exactly_once() {
        let (world, mut drag, surface, events) = harness();
        let mut runner = MissionRunner::new();
        let first = Arc::new(AtomicBool::new(false));
        let second = Arc::new(AtomicBool::new(false));

        let mission = MissionConfig::new(
            "1",
            vec![
                StepConfig::new(vec![flag_action("a", &first)]).with_task("task1"),
                StepConfig::new(vec![flag_action("b", &second)]).with_task("task2"),
            ],
        );
        let now = Instant::now();
        runner.start(mission, now, &world, &mut drag, &surface).unwrap();
        assert!(runner.mission_active());

        runner.tick(now, &world, &mut drag, &surface, &events);
        assert_eq!(runner.status().unwrap().step, 0);

        first.store(true, Ordering::SeqCst);
        runner.tick(now, &world, &mut drag, &surface, &events);
        assert_eq!(runner.status().unwrap().step, 1);
        assert_eq!(
            events.events(),
            vec![GameEvent::TaskOpened {
                task: "task1".to_string()
            }]
        );

        second.store(true, Ordering::SeqCst);
        runner.tick(now, &world, &mut drag, &surface, &events);
        assert!(!runner.mission_active());

        // further ticks are inert
        runner.tick(now, &world, &mut drag, &surface, &events);
        let completed: Vec<_> = events
            .events()
            .into_iter()
            .filter(|event| event.kind() == "mission:completed")
            .collect();
        assert_eq!(
            completed,
            vec![GameEvent::MissionCompleted {
                mission: "1".to_string()
            }]
        );
    }

    #[test]
    fn task_opens_only_when_the_last_action_of_a_step_ends() {
        let (world, mut drag, surface, events) = harness();
        let mut runner = MissionRunner::new();
        let first = Arc::new(AtomicBool::new(false));
        let second = Arc::new(AtomicBool::new(false));

        let mission = MissionConfig::new(
            "1",
            vec![StepConfig::new(vec![
                flag_action("a", &first),
                flag_action("b", &second),
            ])
            .with_task("task1")],
        );
        let now = Instant::now();
        runner.start(mission, now, &world, &mut drag, &surface).unwrap();

        first.store(true, Ordering::SeqCst);
        runner.tick(now, &world, &mut drag, &surface, &events);
        assert!(events.events().is_empty());

        second.store(true, Ordering::SeqCst);
        runner.tick(now, &world, &mut drag, &surface, &events);
        assert!(events
            .events()
            .contains(&GameEvent::TaskOpened {
                task: "task1".to_string()
            }));
    }

    #[test]
    fn at_most_one_action_completes_per_tick() {
        let (world, mut drag, surface, events) = harness();
        let mut runner = MissionRunner::new();
        let always = Arc::new(AtomicBool::new(true));

        let mission = MissionConfig::new(
            "1",
            vec![StepConfig::new(vec![
                flag_action("a", &always),
                flag_action("b", &always),
            ])],
        );
        let now = Instant::now();
        runner.start(mission, now, &world, &mut drag, &surface).unwrap();

        runner.tick(now, &world, &mut drag, &surface, &events);
        assert_eq!(runner.status().unwrap().action, 1);
        assert!(runner.mission_active());

        runner.tick(now, &world, &mut drag, &surface, &events);
        assert!(!runner.mission_active());
    }

    #[test]
    fn whitelist_follows_the_current_action() {
        let (world, mut drag, surface, events) = harness();
        let mut runner = MissionRunner::new();
        let first = Arc::new(AtomicBool::new(false));
        let second = Arc::new(AtomicBool::new(false));

        let mission = MissionConfig::new(
            "1",
            vec![StepConfig::new(vec![
                flag_action("a", &first).draggable(["itemA".to_string()]),
                flag_action("b", &second).draggable(["itemB".to_string()]),
            ])],
        );
        let now = Instant::now();
        runner.start(mission, now, &world, &mut drag, &surface).unwrap();
        assert_eq!(drag.whitelist(), ["itemA".to_string()]);

        first.store(true, Ordering::SeqCst);
        runner.tick(now, &world, &mut drag, &surface, &events);
        assert_eq!(drag.whitelist(), ["itemB".to_string()]);

        second.store(true, Ordering::SeqCst);
        runner.tick(now, &world, &mut drag, &surface, &events);
        assert!(drag.whitelist().is_empty());
    }

    #[test]
    fn starting_twice_is_rejected_until_reset() {
        let (world, mut drag, surface, _events) = harness();
        let mut runner = MissionRunner::new();
        let flag = Arc::new(AtomicBool::new(false));
        let now = Instant::now();

        let build = |id: &str| {
            MissionConfig::new(id, vec![StepConfig::new(vec![flag_action("a", &flag)])])
        };
        runner.start(build("1"), now, &world, &mut drag, &surface).unwrap();
        assert_eq!(
            runner.start(build("2"), now, &world, &mut drag, &surface),
            Err(StartError::MissionActive {
                active: "1".to_string()
            })
        );

        runner.reset(&world, &mut drag, &surface);
        assert!(!runner.mission_active());
        runner.start(build("2"), now, &world, &mut drag, &surface).unwrap();
    }

    #[test]
    fn degenerate_missions_are_rejected_up_front() {
        let (world, mut drag, surface, _events) = harness();
        let mut runner = MissionRunner::new();
        let now = Instant::now();

        assert_eq!(
            runner.start(
                MissionConfig::new("empty", vec![]),
                now,
                &world,
                &mut drag,
                &surface
            ),
            Err(StartError::EmptyMission("empty".to_string()))
        );
        assert_eq!(
            runner.start(
                MissionConfig::new("holey", vec![StepConfig::new(vec![])]),
                now,
                &world,
                &mut drag,
                &surface
            ),
            Err(StartError::EmptyStep {
                mission: "holey".to_string(),
                step: 0
            })
        );
        assert!(!runner.mission_active());
    }

    #[test]
    fn completing_an_action_cancels_its_pending_hint() {
        let (world, mut drag, surface, events) = harness();
        let mut runner = MissionRunner::new();
        let flag = Arc::new(AtomicBool::new(false));

        let mission = MissionConfig::new(
            "1",
            vec![StepConfig::new(vec![flag_action("a", &flag)])],
        );
        let start = Instant::now();
        runner.start(mission, start, &world, &mut drag, &surface).unwrap();

        flag.store(true, Ordering::SeqCst);
        runner.tick(start + Duration::from_secs(1), &world, &mut drag, &surface, &events);
        assert!(!runner.mission_active());

        // nothing ever reached the surface, including after the delay
        assert!(surface.entries().is_empty());
    }

    #[test]
    fn visible_hint_is_torn_down_by_its_hide_condition() {
        let (world, mut drag, surface, events) = harness();
        let mut runner = MissionRunner::new();
        let done = Arc::new(AtomicBool::new(false));
        let near = Arc::new(AtomicBool::new(false));

        let near_clone = Arc::clone(&near);
        let done_clone = Arc::clone(&done);
        let action = ActionConfig::new(
            "shoes",
            "Check the shoes",
            Box::new(move |_| done_clone.load(Ordering::SeqCst)),
        )
        .hint_delay(Duration::from_secs(5))
        .hide_hint_when(Box::new(move |_| near_clone.load(Ordering::SeqCst)));

        let mission = MissionConfig::new("1", vec![StepConfig::new(vec![action])]);
        let start = Instant::now();
        runner.start(mission, start, &world, &mut drag, &surface).unwrap();

        // hide condition true before the hint fires has no effect
        near.store(true, Ordering::SeqCst);
        near.store(false, Ordering::SeqCst);
        runner.tick(start + Duration::from_secs(5), &world, &mut drag, &surface, &events);
        assert!(runner.hints().is_visible());

        near.store(true, Ordering::SeqCst);
        runner.tick(start + Duration::from_secs(6), &world, &mut drag, &surface, &events);
        assert!(!runner.hints().is_visible());
        assert!(surface
            .entries()
            .contains(&"marker-hidden:shoes".to_string()));
    }

    #[test]
    fn step_hooks_run_on_entry() {
        let (world, mut drag, surface, events) = harness();
        let mut runner = MissionRunner::new();
        let flag = Arc::new(AtomicBool::new(false));
        let entered = Arc::new(AtomicUsize::new(0));

        let entered_clone = Arc::clone(&entered);
        let mission = MissionConfig::new(
            "1",
            vec![
                StepConfig::new(vec![flag_action("a", &flag)]),
                StepConfig::new(vec![flag_action("b", &flag)]).on_enter(Box::new(move |_| {
                    entered_clone.fetch_add(1, Ordering::SeqCst);
                })),
            ],
        );
        let now = Instant::now();
        runner.start(mission, now, &world, &mut drag, &surface).unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 0);

        flag.store(true, Ordering::SeqCst);
        runner.tick(now, &world, &mut drag, &surface, &events);
        assert_eq!(entered.load(Ordering::SeqCst), 1);
    }
}
