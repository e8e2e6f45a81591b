// crates/zombie_demo/src/main.rs
//! Headless scripted session: loads config and models, builds the main
//! level and plays a short fixed input script against it.

use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context};
use engine_core::{init_logging, App, Headless, InputDefaults, InputEvent, InputPoller, ModelManager};
use engine_ecs::{Damageable, FrameClock};
use engine_shared::{text_ids, InputState};
use tracing::{info, warn};
use zombie_game::components::animation::ZOMBIE_MODEL;
use zombie_game::components::gun::GUN_MODEL;
use zombie_game::components::mystery_box::BOX_MODEL;
use zombie_game::components::ZOMBIE;
use zombie_game::{make_main_level, GameConfig, PlayerController, SpawnerManager};

const DT: f32 = 1.0 / 64.0;
const SESSION: Duration = Duration::from_secs(60);

fn load_models(assets: &Path) -> ModelManager {
    let mut models = ModelManager::models();
    for name in [ZOMBIE_MODEL, GUN_MODEL, BOX_MODEL] {
        models.register(name, assets.join("models").join(format!("{name}.ron")));
    }
    let report = models.load_all();
    if report.degraded {
        warn!(failed = ?report.failed, "running with placeholder models");
    }
    models
}

/// Input script: seconds into the session, then the event.
fn script() -> Vec<(f32, InputEvent)> {
    let key = |k: &str| k.to_string();
    let mut events = vec![
        (0.5, InputEvent::KeyDown(key("w"))),
        (1.5, InputEvent::KeyUp(key("w"))),
        (2.0, InputEvent::KeyDown(key("ArrowLeft"))),
        (2.5, InputEvent::KeyUp(key("ArrowLeft"))),
        (3.0, InputEvent::PointerDown),
        (3.1, InputEvent::PointerMoved { dx: 40.0 }),
        (3.2, InputEvent::PointerUp),
    ];
    // Tap the trigger once a second, reloading every tenth shot.
    for i in 0..50u16 {
        let at = 8.0 + f32::from(i);
        let button = if i % 10 == 9 { "r" } else { " " };
        events.push((at, InputEvent::KeyDown(key(button))));
        events.push((at + 0.25, InputEvent::KeyUp(key(button))));
    }
    events.push((45.0, InputEvent::FocusLost));
    events
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let mut args = env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let assets = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("assets"));

    let cfg = GameConfig::load_or_default(config_path.as_deref());
    cfg.validate().context("invalid game config")?;
    if !assets.is_dir() {
        bail!("asset directory {} does not exist", assets.display());
    }

    let models = Rc::new(load_models(&assets));
    let headless = Headless::new();
    let input = InputState::shared();
    let poller = InputPoller::new(InputDefaults::input_map(), input.clone());
    let level = make_main_level(headless.services(), FrameClock::system(), input, models, &cfg);

    let mut app = App::new(level, poller);
    app.start();

    let mut pending = script().into_iter().peekable();
    let end = app.level().now() + SESSION;
    while app.level().now() < end {
        let now = app.level().now().as_secs_f32();
        while let Some((_, event)) = pending.next_if(|(at, _)| *at <= now) {
            app.handle_event(&event);
        }
        app.step(DT);
    }

    let level = app.level();
    let round = level
        .find_with::<SpawnerManager>()
        .and_then(|id| level.component::<SpawnerManager>(id))
        .map_or(0, SpawnerManager::round);
    let (score, health) = level
        .player()
        .and_then(|p| level.component::<PlayerController>(p))
        .map_or((0, 0), |c| (c.score(), c.health()));
    info!(
        frames = app.frames(),
        round,
        score,
        health,
        zombies = level.count_by_name_prefix(ZOMBIE),
        shots = headless.audio.borrow().count("gunFire"),
        round_text = %headless.text(text_ids::ROUND),
        "session over"
    );
    Ok(())
}
