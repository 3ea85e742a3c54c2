/// Player input and movement.
///
/// Input is modelled as held flags (press sets, release clears) that the
/// controller reads once per tick.  Movement is all-or-nothing per key: a
/// rejected step does not slide.  After input, an unconditional bounds
/// check clamps the pose back inside the map and pulls it out of any wall.

use std::f64::consts::PI;

use crate::config::PlayerConfig;
use crate::entities::Pose;
use crate::grid::{Grid, WALL};

/// Inward margin a proposed step must keep from the grid edge.
const MOVE_MARGIN: f64 = 0.2;
/// Clamp margin for the recovery check.
const BOUNDS_MARGIN: f64 = 0.5;
/// Extra pull-back applied when clamping against the far edge.
const FAR_EDGE_NUDGE: f64 = 0.1;
/// Largest ring searched for a safe spot when stuck inside a wall.
const UNSTUCK_RADIUS: i64 = 3;
/// A pose change smaller than this on both axes is not a step.
const MOVED_EPSILON: f64 = 0.01;

// ── Keys ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    TurnLeft,
    TurnRight,
    Forward,
    Back,
    ToggleSound,
    ToggleAmbient,
}

/// Toggles fired since they were last taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Toggles {
    pub sound: bool,
    pub ambient: bool,
}

impl Toggles {
    pub fn any(self) -> bool {
        self.sound || self.ambient
    }
}

/// Held-key state.  Directional actions are level-triggered; the two
/// toggles are edge-triggered so holding the key fires once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    turn_left: bool,
    turn_right: bool,
    forward: bool,
    back: bool,
    sound_down: bool,
    ambient_down: bool,
    pending: Toggles,
    /// Set by any fresh press; cleared by `take_pressed`.
    pressed: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `action` as down or up.
    pub fn set(&mut self, action: Action, down: bool) {
        let was_down = self.is_held(action);
        if down && !was_down {
            self.pressed = true;
        }
        match action {
            Action::TurnLeft => self.turn_left = down,
            Action::TurnRight => self.turn_right = down,
            Action::Forward => self.forward = down,
            Action::Back => self.back = down,
            Action::ToggleSound => {
                if down && !self.sound_down {
                    self.pending.sound = true;
                }
                self.sound_down = down;
            }
            Action::ToggleAmbient => {
                if down && !self.ambient_down {
                    self.pending.ambient = true;
                }
                self.ambient_down = down;
            }
        }
    }

    pub fn press(&mut self, action: Action) {
        self.set(action, true);
    }

    pub fn release(&mut self, action: Action) {
        self.set(action, false);
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::TurnLeft => self.turn_left,
            Action::TurnRight => self.turn_right,
            Action::Forward => self.forward,
            Action::Back => self.back,
            Action::ToggleSound => self.sound_down,
            Action::ToggleAmbient => self.ambient_down,
        }
    }

    pub fn release_all(&mut self) {
        *self = KeyState {
            pending: self.pending,
            pressed: self.pressed,
            ..KeyState::default()
        };
    }

    /// Toggles fired since the last call.
    pub fn take_toggles(&mut self) -> Toggles {
        std::mem::take(&mut self.pending)
    }

    /// Whether any key went down since the last call.
    pub fn take_pressed(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Normalise an angle into (−π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Controller {
    pub move_speed: f64,
    pub rot_speed: f64,
}

impl Controller {
    pub fn new(config: &PlayerConfig) -> Self {
        Controller {
            move_speed: config.move_speed,
            rot_speed: config.rot_speed,
        }
    }

    /// Apply one tick of held input to `pose`, then run the bounds check.
    /// Returns whether the position changed.
    pub fn update(&self, pose: &mut Pose, keys: &KeyState, grid: &Grid) -> bool {
        let before = (pose.x, pose.y);

        if keys.is_held(Action::TurnLeft) {
            pose.angle -= self.rot_speed;
        }
        if keys.is_held(Action::TurnRight) {
            pose.angle += self.rot_speed;
        }
        pose.angle = normalize_angle(pose.angle);

        let (sin_a, cos_a) = pose.angle.sin_cos();
        if keys.is_held(Action::Forward) {
            self.try_step(pose, cos_a * self.move_speed, sin_a * self.move_speed, grid);
        }
        if keys.is_held(Action::Back) {
            self.try_step(pose, -cos_a * self.move_speed, -sin_a * self.move_speed, grid);
        }

        check_bounds(pose, grid);

        (pose.x - before.0).abs() > MOVED_EPSILON || (pose.y - before.1).abs() > MOVED_EPSILON
    }

    fn try_step(&self, pose: &mut Pose, dx: f64, dy: f64, grid: &Grid) {
        let (nx, ny) = (pose.x + dx, pose.y + dy);
        if can_move_to(grid, nx, ny) {
            pose.x = nx;
            pose.y = ny;
        }
    }
}

/// A step to `(x, y)` is allowed inside the edge margin and off walls.
pub fn can_move_to(grid: &Grid, x: f64, y: f64) -> bool {
    let w = grid.width() as f64;
    let h = grid.height() as f64;
    if x < MOVE_MARGIN || x >= w - MOVE_MARGIN || y < MOVE_MARGIN || y >= h - MOVE_MARGIN {
        return false;
    }
    grid.cell(x.floor() as i64, y.floor() as i64) != Some(WALL)
}

/// Clamp `pose` into the map and, if it ended up inside a wall, move it to
/// the first open spot found by searching rings of radius 1..=3 of whole
/// cell offsets.  Left unchanged if nothing is found.
pub fn check_bounds(pose: &mut Pose, grid: &Grid) {
    let w = grid.width() as f64;
    let h = grid.height() as f64;

    pose.x = clamp_axis(pose.x, w);
    pose.y = clamp_axis(pose.y, h);

    if grid.cell(pose.x.floor() as i64, pose.y.floor() as i64) != Some(WALL) {
        return;
    }

    if let Some((x, y)) = find_safe_position(grid, pose.x, pose.y) {
        tracing::debug!(from_x = pose.x, from_y = pose.y, x, y, "player unstuck");
        pose.x = x;
        pose.y = y;
    }
}

fn clamp_axis(value: f64, dim: f64) -> f64 {
    if value < BOUNDS_MARGIN {
        BOUNDS_MARGIN
    } else if value >= dim - BOUNDS_MARGIN {
        dim - BOUNDS_MARGIN - FAR_EDGE_NUDGE
    } else {
        value
    }
}

fn find_safe_position(grid: &Grid, x: f64, y: f64) -> Option<(f64, f64)> {
    let w = grid.width() as f64;
    let h = grid.height() as f64;
    for radius in 1..=UNSTUCK_RADIUS {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let nx = x + dx as f64;
                let ny = y + dy as f64;
                let in_range = nx >= BOUNDS_MARGIN
                    && nx < w - BOUNDS_MARGIN
                    && ny >= BOUNDS_MARGIN
                    && ny < h - BOUNDS_MARGIN;
                if in_range && grid.cell(nx.floor() as i64, ny.floor() as i64) != Some(WALL) {
                    return Some((nx, ny));
                }
            }
        }
    }
    None
}

// ── Footsteps ─────────────────────────────────────────────────────────────────

/// Rate limiter for footstep cues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FootstepCadence {
    interval_ms: u64,
    last: Option<u64>,
}

impl FootstepCadence {
    pub fn new(interval_ms: u64) -> Self {
        FootstepCadence {
            interval_ms,
            last: None,
        }
    }

    /// Whether a footstep should sound at `now` given that the player
    /// `moved` this tick.  Records the step when it returns true.
    pub fn step(&mut self, now: u64, moved: bool) -> bool {
        if !moved {
            return false;
        }
        let due = self
            .last
            .map_or(true, |last| now.saturating_sub(last) >= self.interval_ms);
        if due {
            self.last = Some(now);
        }
        due
    }
}
