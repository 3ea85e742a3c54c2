/// One game session: owns the world and wires the per-frame pipeline.
///
/// Each frame runs, in order: input → movement → phase tick → HUD →
/// throttled render.  Movement comes first so the phase logic reads this
/// frame's position, and the phase tick finishes before the renderer reads
/// any entity state.

use rand::Rng;
use tracing::info;

use crate::config::GameConfig;
use crate::entities::Pose;
use crate::grid::Grid;
use crate::hud::{Hud, HudText};
use crate::movement::{Controller, FootstepCadence, KeyState};
use crate::phase::{GameState, Phase, PhaseMachine, World};
use crate::render::{Renderer, Scene};
use crate::scheduler::FrameScheduler;
use crate::sound::SoundSink;
use crate::sprites::SpriteCache;
use crate::surface::Surface;

pub struct Game {
    grid: Grid,
    cache: SpriteCache,
    pose: Pose,
    keys: KeyState,
    controller: Controller,
    footsteps: FootstepCadence,
    machine: PhaseMachine,
    renderer: Renderer,
    scheduler: FrameScheduler,
    sound: SoundSink,
    hud: Hud,
    escape_duration_ms: u64,
}

impl Game {
    /// Start a session at `now`.  `rng` places the pumpkins and the guide
    /// and seeds the star field.
    pub fn new(
        grid: Grid,
        config: &GameConfig,
        sound: SoundSink,
        mut hud: Hud,
        rng: &mut impl Rng,
        now: u64,
    ) -> Self {
        let (sx, sy) = grid.find_spawn();
        info!(x = sx, y = sy, width = grid.width(), height = grid.height(), "player spawned");

        let world = World::populate(&grid, config, (sx, sy), rng);
        let machine = PhaseMachine::new(config, world, now);
        if sound.is_present() {
            hud.set_sound_enabled(true);
        }

        Game {
            cache: SpriteCache::from_grid(&grid),
            grid,
            pose: Pose::new(sx, sy, 0.0),
            keys: KeyState::new(),
            controller: Controller::new(&config.player),
            footsteps: FootstepCadence::new(config.player.footstep_interval_ms),
            machine,
            renderer: Renderer::new(&config.render, rng.gen()),
            scheduler: FrameScheduler::new(config.render.target_fps),
            sound,
            hud,
            escape_duration_ms: config.rules.escape_duration_ms,
        }
    }

    pub fn keys_mut(&mut self) -> &mut KeyState {
        &mut self.keys
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn pose_mut(&mut self) -> &mut Pose {
        &mut self.pose
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn state(&self) -> &GameState {
        &self.machine.state
    }

    pub fn world(&self) -> &World {
        &self.machine.world
    }

    pub fn machine_mut(&mut self) -> &mut PhaseMachine {
        &mut self.machine
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Surface dimensions changed: drop every size-bound cache and draw on
    /// the next frame.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.renderer.resize(width, height);
        self.scheduler.invalidate();
    }

    /// Run the simulation for `now` and render into `surface` if a frame is
    /// due.  Returns whether a render happened.
    pub fn frame(&mut self, now: u64, surface: &mut impl Surface) -> bool {
        self.tick(now);
        if !self.scheduler.should_render(now) {
            return false;
        }
        let scene = Scene {
            grid: &self.grid,
            pose: &self.pose,
            cache: &self.cache,
            state: &self.machine.state,
            world: &self.machine.world,
        };
        self.renderer.render(surface, &scene, now);
        true
    }

    /// Everything except drawing.
    pub fn tick(&mut self, now: u64) {
        self.apply_input(now);
        self.machine
            .tick(now, (self.pose.x, self.pose.y), &self.grid, &mut self.sound);
        self.hud
            .update(HudText::compose(&self.machine.state, now, self.escape_duration_ms));
    }

    fn apply_input(&mut self, now: u64) {
        if self.keys.take_pressed() {
            self.sound.resume_audio();
        }

        let toggles = self.keys.take_toggles();
        if toggles.sound {
            if let Some(enabled) = self.sound.toggle_sound() {
                info!(enabled, "sound toggled");
                self.hud.set_sound_enabled(enabled);
            }
        }
        if toggles.ambient {
            self.sound.toggle_ambient();
        }

        let moved = self.controller.update(&mut self.pose, &self.keys, &self.grid);
        if self.machine.phase() != Phase::GameOver && self.footsteps.step(now, moved) {
            self.sound.play_footstep(true);
        }
    }
}
