//! Gembreaker entry point
//!
//! Runs a headless session with an autopilot paddle. Windowing, input and
//! audio playback belong to a platform front-end; this binary exercises the
//! whole game loop without one.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use gembreaker::audio::{AudioManager, LogAudio};
    use gembreaker::render::Framebuffer;
    use gembreaker::sim::{StepOutcome, TickInput};
    use gembreaker::{Game, LevelCatalog, Settings, assets::MemoryAssets, consts::*};

    const SETTINGS_PATH: &str = "gembreaker.json";
    const BUILTIN_LEVELS: &str = include_str!("../data/levels.json");
    /// Two minutes of game time
    const MAX_TICKS: u32 = 120 * 1000 / UPDATE_PERIOD_MSEC;

    env_logger::init();
    log::info!("Gembreaker (headless) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x6e6d_6272);
    let settings = Settings::load_or_default(SETTINGS_PATH);
    let catalog = match LevelCatalog::load(&settings.assets.levels) {
        Ok(catalog) => catalog,
        Err(e) => {
            log::info!("Using built-in levels ({e})");
            match LevelCatalog::from_json(BUILTIN_LEVELS) {
                Ok(catalog) => catalog,
                Err(e) => {
                    log::error!("Built-in levels are broken: {e}");
                    std::process::exit(1);
                }
            }
        }
    };
    let assets = MemoryAssets::procedural(&settings, &catalog);
    let mut audio = AudioManager::new(LogAudio, &settings);

    let mut game = match Game::new(catalog, assets, settings, seed) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Cannot start: {e}");
            std::process::exit(1);
        }
    };

    let mut ticks = 0;
    let mut outcome = StepOutcome::Continue;
    while ticks < MAX_TICKS {
        let input = autopilot(&game);
        outcome = game.tick(&input, &mut audio);
        ticks += 1;
        match outcome {
            StepOutcome::Continue => {}
            StepOutcome::LevelComplete => {
                log::info!("{} after {} ticks", game.hud().level_info, ticks);
            }
            StepOutcome::GameOver(_) => break,
        }
    }

    let hud = game.hud();
    log::info!(
        "Stopped after {ticks} ticks: {outcome:?}, {} pickups {}, {} lives",
        hud.level_info,
        hud.pickups_label(),
        hud.lives
    );

    let mut frame = Framebuffer::new(RESOLUTION_X as u32, RESOLUTION_Y as u32);
    game.draw(&mut frame);
    let lit = frame.image().pixels().iter().filter(|p| p.a != 0).count();
    log::info!("Final frame: {lit} opaque pixels");

    /// Keep the paddle under the ball and launch as soon as it is glued
    fn autopilot<L, A>(game: &Game<L, A>) -> TickInput
    where
        L: gembreaker::level::LevelSource,
        A: gembreaker::assets::AssetSource,
    {
        let world = game.world();
        let mut input = TickInput {
            launch: world.ball_glued,
            ..TickInput::default()
        };
        if let (Some(ball), Some(paddle)) = (world.body(world.ball), world.body(world.paddle)) {
            let dx = ball.center().x - paddle.center().x;
            let direction = if dx.abs() < PADDLE_WIDTH / 4.0 { 0.0 } else { dx.signum() };
            input.paddle_velocity = game.settings().paddle_velocity(direction);
        }
        input
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // A browser front-end drives `Game::tick` from its own frame loop
}
