/// Entry point and simulation loop.

mod agent;
mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use agent::Agent;
use config::SimConfig;
use sim::event::SimEvent;
use sim::level::load_world;
use sim::world::World;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Speed-control bounds for the +/- keys.
const MIN_TICK: Duration = Duration::from_millis(5);
const MAX_TICK: Duration = Duration::from_millis(640);

// ── Key Constants ──

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_STEP: &[KeyCode] = &[KeyCode::Char('.')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_FASTER: &[KeyCode] = &[KeyCode::Char('+'), KeyCode::Char('=')];
const KEYS_SLOWER: &[KeyCode] = &[KeyCode::Char('-')];

struct Session {
    world: World,
    agent: Agent,
    paused: bool,
    message: String,
    tick_rate: Duration,
    gave_up: bool,
}

fn main() {
    let config = SimConfig::load();

    let world = match load_world(&config) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Maze error: {e}");
            std::process::exit(1);
        }
    };

    let mut session = Session {
        world,
        agent: Agent::new(config.map_side),
        paused: false,
        message: String::new(),
        tick_rate: Duration::from_millis(config.tick_rate_ms),
        gave_up: false,
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = run_loop(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Simulation error: {e}");
    }

    println!();
    if session.world.complete {
        println!("Treasure reached in {} turns.", session.world.turn);
    } else if session.gave_up {
        println!("Gave up after {} turns.", session.world.turn);
    } else {
        println!("Stopped after {} turns.", session.world.turn);
    }
}

fn run_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    config: &SimConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        if kb.any_pressed(KEYS_PAUSE) {
            session.paused = !session.paused;
        }
        if kb.any_pressed(KEYS_RESTART) {
            session.world.restart();
            session.agent = Agent::new(config.map_side);
            session.message.clear();
            session.gave_up = false;
        }
        if kb.any_pressed(KEYS_FASTER) {
            session.tick_rate = (session.tick_rate / 2).max(MIN_TICK);
        }
        if kb.any_pressed(KEYS_SLOWER) {
            session.tick_rate = (session.tick_rate * 2).min(MAX_TICK);
        }

        if session.paused {
            // Single-step through turns while paused.
            if kb.any_pressed(KEYS_STEP) {
                step(session, config);
            }
        } else if last_tick.elapsed() >= session.tick_rate {
            step(session, config);
            last_tick = Instant::now();
        }

        renderer.render(
            &session.world,
            &session.agent,
            config.show_knowledge,
            session.paused,
            &session.message,
        )?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// One troll turn: observe, decide, resolve.
fn step(session: &mut Session, config: &SimConfig) {
    if session.world.complete || session.gave_up {
        return;
    }
    if session.world.turn >= config.max_turns {
        session.gave_up = true;
        session.message = format!("No treasure after {} turns", session.world.turn);
        return;
    }

    let obs = session.world.observe();
    let action = session.agent.turn(&obs);
    for event in session.world.apply(action) {
        match event {
            SimEvent::GoalReached { turn } => {
                session.message = format!("Treasure reached in {turn} turns!");
            }
            SimEvent::MoveBlocked { dir } => {
                session.message = format!("Bumped a wall heading {dir:?}");
            }
            SimEvent::PickUpFailed => {
                session.message = "Nothing to pick up here".to_string();
            }
            SimEvent::DropFailed => {
                session.message = "Nothing to drop".to_string();
            }
            SimEvent::BlockPicked { .. } | SimEvent::BlockDropped { .. } => {}
        }
    }
}
