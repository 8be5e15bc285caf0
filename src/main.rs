use std::env;
use std::fs;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use log::debug;

use quest_runtime::{
    investigation_mission, MissionStatus, MouseButton, Scene, Session, World,
};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let xml = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read scene {}", options.path))?;
    let scene = Scene::from_xml(&xml).context("failed to parse scene XML")?;

    println!("Loaded scene with {} objects", scene.objects.len());
    for object in &scene.objects {
        println!(" - {} ({})", object.name, object.object_type);
    }

    if options.summary_only {
        return Ok(());
    }

    let mut session = Session::from_scene(&scene, 1280.0, 720.0);
    if options.autoplay {
        let mission = investigation_mission(session.world())?;
        session.start_mission(mission, Instant::now())?;

        let mut autoplay = Autoplay::default();
        let mut ticks = 0u32;
        while session.mission_active() {
            if ticks >= options.max_ticks {
                bail!("mission did not complete within {} ticks", options.max_ticks);
            }
            autoplay.drive(&session);
            session.tick(Instant::now());
            ticks += 1;
        }
        println!("Mission 1 completed after {ticks} ticks");
    }

    print_final_state(session.world());
    Ok(())
}

fn print_final_state(world: &World) {
    println!("Final object states:");
    for prop in world.snapshot() {
        println!(
            " - {} pos=({:.2}, {:.2}, {:.2}){}",
            prop.name,
            prop.position.x,
            prop.position.y,
            prop.position.z,
            if prop.alive { "" } else { " [removed]" }
        );
    }
}

/// Scripted player: solves the current objective by either dropping the
/// relevant prop where it belongs or clicking the objective's target
/// through the real pointer pipeline.
#[derive(Debug, Default)]
struct Autoplay {
    pressed: bool,
}

impl Autoplay {
    fn drive(&mut self, session: &Session) {
        let Some(status) = session.mission_status() else {
            return;
        };
        let input = session.input();
        if self.pressed {
            input.set_button_up(MouseButton::LEFT);
            self.pressed = false;
            return;
        }

        match status.target.as_str() {
            "trashHole" => self.feed_receptacle(session, &status),
            "shelf" => self.hang_painting(session),
            target => {
                let Some(position) = session.world().position(target) else {
                    return;
                };
                let Some(screen) = session.camera().world_to_screen(position) else {
                    return;
                };
                debug!("autoplay clicks {target} at {screen}");
                input.set_pointer_position(screen);
                input.set_button_down(MouseButton::LEFT);
                self.pressed = true;
            }
        }
    }

    fn feed_receptacle(&self, session: &Session, status: &MissionStatus) {
        let world = session.world();
        let Some(bin) = world.position("trashHole") else {
            return;
        };
        if let Some(item) = status.draggable.iter().find(|item| world.is_alive(item)) {
            debug!("autoplay drops {item} into the receptacle");
            world.teleport(item, bin);
        }
    }

    fn hang_painting(&self, session: &Session) {
        let world = session.world();
        let Some(shelf) = world.position("shelf") else {
            return;
        };
        world.teleport("painting", shelf + Vec3::new(0.0, 0.2, 0.1));
    }
}

struct CliOptions {
    path: String,
    autoplay: bool,
    summary_only: bool,
    max_ticks: u32,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(path) = args.next() else {
            return Err(anyhow!(
                "Usage: quest-runtime <scene.xml> [--autoplay] [--summary-only] [--max-ticks N]"
            ));
        };
        let mut autoplay = false;
        let mut summary_only = false;
        let mut max_ticks = 2000;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--autoplay" => autoplay = true,
                "--summary-only" => summary_only = true,
                "--max-ticks" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--max-ticks expects a number"))?;
                    max_ticks = value
                        .parse()
                        .with_context(|| format!("invalid tick count: {value}"))?;
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --autoplay, --summary-only or --max-ticks"
                    ));
                }
            }
        }
        Ok(Self {
            path,
            autoplay,
            summary_only,
            max_ticks,
        })
    }
}
