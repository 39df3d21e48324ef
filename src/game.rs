//! Game session
//!
//! Wraps a [`World`] with everything the simulation step deliberately leaves
//! out: the level catalog, sprite assets, the launch RNG, pause, and the
//! level-to-level progression.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::assets::AssetSource;
use crate::audio::{AudioManager, AudioSink, SoundEffect};
use crate::level::{LevelError, LevelSource, load_level};
use crate::render::{Canvas, Hud, draw_world};
use crate::settings::Settings;
use crate::sim::physics::deviate_vector;
use crate::sim::state::World;
use crate::sim::tick::{GameOverReason, StepOutcome, TickInput, step};

/// One run through the level catalog
pub struct Game<L: LevelSource, A: AssetSource> {
    world: World,
    levels: L,
    assets: A,
    settings: Settings,
    rng: Pcg32,
    paused: bool,
    /// Set once the run has ended; further ticks do nothing
    over: Option<GameOverReason>,
}

impl<L: LevelSource, A: AssetSource> Game<L, A> {
    /// Start a run at level 1
    pub fn new(levels: L, assets: A, settings: Settings, seed: u64) -> Result<Self, LevelError> {
        let mut world = World::new(settings.play_area(), settings.lives_max);
        load_level(&mut world, 1, &levels, &assets, &settings)?;
        log::info!("New game, seed {seed}, {} levels", levels.level_count());
        Ok(Self {
            world,
            levels,
            assets,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            paused: false,
            over: None,
        })
    }

    /// Run one fixed tick and forward the resulting sound cues. The music
    /// loop runs from the first tick until the run ends, pauses included.
    pub fn tick<S: AudioSink>(
        &mut self,
        input: &TickInput,
        audio: &mut AudioManager<S>,
    ) -> StepOutcome {
        if let Some(reason) = self.over {
            return StepOutcome::GameOver(reason);
        }
        audio.start_music();

        if input.pause {
            self.paused = !self.paused;
            log::debug!("paused: {}", self.paused);
        }
        if self.paused {
            return StepOutcome::Continue;
        }

        // Debug cheats; the next step sees a completed level
        if input.skip_level {
            self.world.collected = self.world.required;
        }
        if input.previous_level {
            return self.go_to_level(self.world.level.saturating_sub(1).max(1), audio);
        }

        self.world
            .set_paddle_velocity(input.paddle_velocity.clamp_length_max(self.settings.paddle_speed));
        if input.launch && self.world.ball_glued {
            let velocity = deviate_vector(
                self.settings.launch_velocity(),
                self.settings.launch_max_deviation,
                &mut self.rng,
            );
            if self.world.launch_ball(velocity) {
                audio.play(SoundEffect::Launch);
            }
        }

        let outcome = step(&mut self.world, &self.settings);
        audio.play_events(&self.world.drain_events());

        let outcome = match outcome {
            StepOutcome::LevelComplete => self.advance(audio),
            other => other,
        };
        if let StepOutcome::GameOver(reason) = outcome {
            self.end(reason, audio);
        }
        outcome
    }

    /// Load the next level after a completed one
    fn advance<S: AudioSink>(&mut self, audio: &mut AudioManager<S>) -> StepOutcome {
        let next = self.world.level + 1;
        match self.go_to_level(next, audio) {
            StepOutcome::Continue => StepOutcome::LevelComplete,
            other => other,
        }
    }

    /// Reload with full lives. A load failure ends the run.
    fn go_to_level<S: AudioSink>(&mut self, index: u32, audio: &mut AudioManager<S>) -> StepOutcome {
        match load_level(&mut self.world, index, &self.levels, &self.assets, &self.settings) {
            Ok(()) => {
                self.world.lives = self.settings.lives_max;
                log::info!("Now on level {index}");
                StepOutcome::Continue
            }
            Err(LevelError::OutOfRange { .. }) if index as usize > self.levels.level_count() => {
                log::info!("All {} levels cleared", self.levels.level_count());
                self.end(GameOverReason::CampaignComplete, audio);
                StepOutcome::GameOver(GameOverReason::CampaignComplete)
            }
            Err(e) => {
                log::error!("Failed to load level {index}: {e}");
                self.end(GameOverReason::LevelLoadFailed, audio);
                StepOutcome::GameOver(GameOverReason::LevelLoadFailed)
            }
        }
    }

    fn end<S: AudioSink>(&mut self, reason: GameOverReason, audio: &mut AudioManager<S>) {
        if self.over.is_none() {
            log::info!("Game over: {reason:?}");
            audio.stop_music();
            audio.play(SoundEffect::GameOver);
            self.over = Some(reason);
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> Option<GameOverReason> {
        self.over
    }

    pub fn hud(&self) -> Hud {
        Hud::from_world(&self.world, self.paused)
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        draw_world(&self.world, canvas);
    }
}
