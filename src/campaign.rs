use anyhow::{bail, Result};
use glam::Vec3;
use log::warn;

use crate::engine::{ActionConfig, MissionConfig, StepConfig, TickView};
use crate::scene::BodyKind;
use crate::world::World;

/// The room shipped with the crate.
pub const DEMO_SCENE: &str = include_str!("../scenes/room.xml");

const PAINTING_MOUNT_OFFSET: Vec3 = Vec3::new(-0.03, 0.3, -0.05);
const PAINTING_PLACE_RADIUS: f32 = 0.35;
const PAINTING_HINT_DISMISS_RADIUS: f32 = 1.0;
const SHOE_KICK_STRENGTH: f32 = 25.0;

const TRASH_ITEMS: [&str; 5] = ["trash1", "trash2", "trash3", "trash4", "trash5"];
const BOOKS: [&str; 5] = ["book1", "book2", "book3", "book4", "book5"];

/// Builds the shipped investigation mission against the loaded room.
/// Steps whose props are missing from the scene are skipped with a
/// warning so edited rooms still run the rest of the quest.
pub fn investigation_mission(world: &World) -> Result<MissionConfig> {
    let steps: Vec<StepConfig> = [
        trash_step(world),
        painting_step(world),
        books_step(world),
        shoes_step(world),
    ]
    .into_iter()
    .flatten()
    .collect();

    if steps.is_empty() {
        bail!("scene contains none of the mission props");
    }
    Ok(MissionConfig::new("1", steps))
}

fn present(world: &World, names: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for name in names {
        if world.is_alive(name) {
            found.push(name.to_string());
        } else {
            warn!("mission prop {name} is missing from the scene");
        }
    }
    found
}

fn require(world: &World, step: &str, name: &str) -> Option<Vec3> {
    let position = world.position(name);
    if position.is_none() {
        warn!("skipping {step} step, {name} is missing from the scene");
    }
    position
}

/// Step 1: clear the rubbish, then grab the note it was covering.
fn trash_step(world: &World) -> Option<StepConfig> {
    require(world, "trash", "trashHole")?;
    let items = present(world, &TRASH_ITEMS);
    if items.is_empty() {
        warn!("skipping trash step, no rubbish in the scene");
        return None;
    }

    let watched = items.clone();
    let registered = items.clone();
    let dispose = ActionConfig::new(
        "trashHole",
        "Tidy up first: drag the rubbish into the waste hole",
        Box::new(move |view: &TickView<'_>| {
            watched.iter().all(|item| !view.world.is_alive(item))
        }),
    )
    .hide_hint_when(Box::new(move |view: &TickView<'_>| {
        registered.iter().any(|item| !view.world.is_alive(item))
    }))
    .draggable(items);

    let mut actions = vec![dispose];
    actions.extend(pickup_action(
        world,
        "sticker1",
        "There was a note under the rubbish, pick it up",
    ));
    Some(StepConfig::new(actions).with_task("task1"))
}

/// Step 2: notice the painting, hang it on the shelf, then grab the
/// note behind it.
fn painting_step(world: &World) -> Option<StepConfig> {
    require(world, "painting", "painting")?;
    let shelf = require(world, "painting", "shelf")?;
    let mount = shelf + PAINTING_MOUNT_OFFSET;

    let find = ActionConfig::new(
        "painting",
        "Why is the painting on the floor?",
        Box::new(|view: &TickView<'_>| view.dragged == Some("painting")),
    )
    .draggable(["painting".to_string()]);

    let hang = ActionConfig::new(
        "shelf",
        "Put the painting on the top shelf",
        Box::new(move |view: &TickView<'_>| {
            view.world
                .position("painting")
                .is_some_and(|position| position.distance(shelf) < PAINTING_PLACE_RADIUS)
        }),
    )
    .draggable(["painting".to_string()])
    .hide_hint_when(Box::new(move |view: &TickView<'_>| {
        view.world
            .position("painting")
            .is_some_and(|position| position.distance(shelf) < PAINTING_HINT_DISMISS_RADIUS)
    }))
    .on_exit(Box::new(move |world: &World| {
        world.teleport("painting", mount);
        world.set_body_kind("painting", BodyKind::Kinematic);
        world.set_material("painting", "painting_material_hint");
    }));

    let mut actions = vec![find, hang];
    actions.extend(pickup_action(
        world,
        "sticker2",
        "The painting was hiding a note, pick it up",
    ));
    Some(StepConfig::new(actions).with_task("task2"))
}

/// Step 3: the books come loose; the note is underneath them.
fn books_step(world: &World) -> Option<StepConfig> {
    require(world, "books", "sticker3")?;
    let books = present(world, &BOOKS);
    if books.is_empty() {
        warn!("skipping books step, no books in the scene");
        return None;
    }

    let mut draggable = books.clone();
    draggable.push("sticker3".to_string());
    let rummage = ActionConfig::new(
        "sticker3",
        "Look under the books",
        Box::new(|view: &TickView<'_>| view.dragged == Some("sticker3")),
    )
    .draggable(draggable);

    let freed = books;
    let step = StepConfig::new(vec![rummage])
        .with_task("task3")
        .on_enter(Box::new(move |world: &World| {
            for book in &freed {
                world.update(book, |prop| {
                    prop.body.kind = BodyKind::Dynamic;
                    prop.body.mass = 1.0;
                    prop.body.restitution = 0.2;
                    prop.body.friction = 0.5;
                });
            }
        }));
    Some(step)
}

/// Step 4: check the shoes (kicked aside on completion) and grab the
/// flash drive they were hiding.
fn shoes_step(world: &World) -> Option<StepConfig> {
    require(world, "shoes", "Shoes")?;

    let inspect = ActionConfig::new(
        "Shoes",
        "Check the shoes",
        Box::new(|view: &TickView<'_>| view.dragged == Some("Shoes")),
    )
    .draggable(["Shoes".to_string()])
    .on_exit(Box::new(|world: &World| {
        world.update("Shoes", |prop| {
            prop.body.kind = BodyKind::Dynamic;
            prop.body.mass = 1.0;
            prop.body.restitution = 0.2;
            prop.body.friction = 0.5;
        });
        world.apply_impulse(
            "Shoes",
            Vec3::new(1.0, 5.0, 5.0).normalize() * SHOE_KICK_STRENGTH,
        );
    }));

    let mut actions = vec![inspect];
    actions.extend(pickup_action(
        world,
        "flashDrive",
        "The shoes were hiding a flash drive, pick it up",
    ));
    Some(StepConfig::new(actions).with_task("task4"))
}

fn pickup_action(world: &World, sticker: &str, hint: &str) -> Option<ActionConfig> {
    if !world.is_alive(sticker) {
        warn!("mission prop {sticker} is missing from the scene");
        return None;
    }
    let name = sticker.to_string();
    let grabbed = name.clone();
    Some(
        ActionConfig::new(
            name.clone(),
            hint,
            Box::new(move |view: &TickView<'_>| view.dragged == Some(grabbed.as_str())),
        )
        .draggable([name]),
    )
}
