/// Game progression: the phase state machine and everything it owns.
///
/// ```text
/// INTRO ─▶ COLLECT ─▶ RETURN ─▶ BETRAYAL ─▶ ESCAPE ─┬▶ VICTORY
///                                                   └▶ GAMEOVER
/// ```
///
/// Every transition is detected by polling once per tick against the
/// monotonic `now` passed in by the caller.  Phases only move forward;
/// the only way back is building a fresh machine (a full restart).

use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{EnemyConfig, GameConfig, RulesConfig};
use crate::entities::{
    distance, Arena, Burst, CellKey, Enemy, EnemyKind, Hazard, HazardKind, Projectile, Pumpkin,
    BURST_LIFETIME_MS,
};
use crate::grid::Grid;
use crate::sound::{Cue, SoundSink};

/// Centred INTRO message before it shrinks to a hint.
pub const INTRO_OVERLAY_MS: u64 = 3500;
/// Guide's line right after the collection starts.
pub const COLLECT_BANNER_MS: u64 = 2000;
pub const RETURN_BANNER_MS: u64 = 3500;
pub const ESCAPE_BANNER_MS: u64 = 3500;

/// Enemies stop closing in once this near.
const ENEMY_STOP_DISTANCE: f64 = 0.1;
const SIDESTEP_FACTOR: f64 = 0.8;

// ── Phase ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Intro,
    Collect,
    Return,
    Betrayal,
    Escape,
    GameOver,
    Victory,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Victory)
    }

    /// Whether `next` is the documented successor of `self`.
    pub fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Intro, Phase::Collect)
                | (Phase::Collect, Phase::Return)
                | (Phase::Return, Phase::Betrayal)
                | (Phase::Betrayal, Phase::Escape)
                | (Phase::Escape, Phase::Victory)
                | (Phase::Escape, Phase::GameOver)
        )
    }

    /// Roaming enemies are live (and drawn from the dynamic list) from the
    /// escape onwards.
    pub fn enemies_roaming(self) -> bool {
        matches!(self, Phase::Escape | Phase::GameOver | Phase::Victory)
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

/// Named deadlines and timestamps, all in milliseconds of the session clock.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timers {
    pub game_start: u64,
    pub intro_overlay_until: u64,
    pub collect_start: Option<u64>,
    pub collect_banner_until: u64,
    pub return_banner_until: u64,
    pub betrayal_until: u64,
    pub escape_start: Option<u64>,
    pub escape_banner_until: u64,
    /// When VICTORY or GAMEOVER was entered.
    pub ended_at: Option<u64>,
    pub last_damage: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub phase: Phase,
    pub collected: HashSet<CellKey>,
    pub used_lanterns: HashSet<CellKey>,
    pub exploded_bats: HashSet<CellKey>,
    pub hp: i32,
    pub max_hp: i32,
    pub total_pumpkins: usize,
    pub timers: Timers,
    /// Seconds from the start of COLLECT to VICTORY; set once.
    pub final_time_secs: Option<f64>,
    pub cats_turned: bool,
    pub guide_hostile: bool,
}

impl GameState {
    pub fn new(max_hp: i32, total_pumpkins: usize, now: u64) -> Self {
        GameState {
            phase: Phase::Intro,
            collected: HashSet::new(),
            used_lanterns: HashSet::new(),
            exploded_bats: HashSet::new(),
            hp: max_hp,
            max_hp,
            total_pumpkins,
            timers: Timers {
                game_start: now,
                intro_overlay_until: now + INTRO_OVERLAY_MS,
                ..Timers::default()
            },
            final_time_secs: None,
            cats_turned: false,
            guide_hostile: false,
        }
    }

    /// Milliseconds since the escape began, 0 before it.
    pub fn escape_elapsed(&self, now: u64) -> u64 {
        self.timers
            .escape_start
            .map(|start| now.saturating_sub(start))
            .unwrap_or(0)
    }

    /// Apply one point of damage unless still inside the invincibility
    /// window of the previous hit.  Returns whether damage was applied.
    pub fn try_damage(&mut self, now: u64, invincible_ms: u64) -> bool {
        let vulnerable = self
            .timers
            .last_damage
            .map_or(true, |last| now.saturating_sub(last) > invincible_ms);
        if vulnerable {
            self.hp -= 1;
            self.timers.last_damage = Some(now);
        }
        vulnerable
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Mutable entity lists owned by the state machine.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub pumpkins: Vec<Pumpkin>,
    pub guide: Option<(f64, f64)>,
    pub enemies: Arena<Enemy>,
    /// Cats wait here until they turn on the player.
    pub dormant_cats: Vec<Enemy>,
    pub lanterns: Vec<Hazard>,
    pub bats: Vec<Hazard>,
    pub projectiles: Arena<Projectile>,
    pub bursts: Vec<Burst>,
}

impl World {
    /// Seed a world from the grid markers and place the pumpkins and the
    /// guide on random interior floor cells (never the spawn cell, never
    /// two on one cell).
    pub fn populate(
        grid: &Grid,
        config: &GameConfig,
        spawn: (f64, f64),
        rng: &mut impl Rng,
    ) -> World {
        let spawn_cell = CellKey::from_pos(spawn.0, spawn.1);
        let mut candidates: Vec<(usize, usize)> = grid
            .open_interior_cells()
            .into_iter()
            .filter(|&(x, y)| CellKey { x: x as i64, y: y as i64 } != spawn_cell)
            .collect();

        let mut world = World::default();

        for _ in 0..config.rules.pumpkin_count {
            if candidates.is_empty() {
                warn!(
                    wanted = config.rules.pumpkin_count,
                    placed = world.pumpkins.len(),
                    "not enough open cells for every pumpkin"
                );
                break;
            }
            let (x, y) = candidates.swap_remove(rng.gen_range(0..candidates.len()));
            world.pumpkins.push(Pumpkin {
                x: x as f64 + 0.5,
                y: y as f64 + 0.5,
            });
        }

        if !candidates.is_empty() {
            let (x, y) = candidates[rng.gen_range(0..candidates.len())];
            world.guide = Some((x as f64 + 0.5, y as f64 + 0.5));
        } else {
            warn!("no open cell left for the guide");
        }

        let speeds = &config.enemies;
        for (x, y, code) in grid.markers() {
            let (cx, cy) = (x as f64 + 0.5, y as f64 + 0.5);
            if let Some(kind) = EnemyKind::from_code(code) {
                world.enemies.insert(Enemy::new(kind, cx, cy, base_speed(kind, speeds)));
                continue;
            }
            match code {
                4 => world.lanterns.push(Hazard {
                    kind: HazardKind::Lantern,
                    x: cx,
                    y: cy,
                }),
                8 => world.bats.push(Hazard {
                    kind: HazardKind::Bat,
                    x: cx,
                    y: cy,
                }),
                9 => world
                    .dormant_cats
                    .push(Enemy::new(EnemyKind::Cat, cx, cy, speeds.cat_speed)),
                _ => {}
            }
        }

        info!(
            pumpkins = world.pumpkins.len(),
            enemies = world.enemies.len(),
            cats = world.dormant_cats.len(),
            lanterns = world.lanterns.len(),
            bats = world.bats.len(),
            "world populated"
        );
        world
    }
}

pub fn base_speed(kind: EnemyKind, speeds: &EnemyConfig) -> f64 {
    match kind {
        EnemyKind::Ghost => speeds.ghost_speed,
        EnemyKind::Witch => speeds.witch_speed,
        EnemyKind::Skeleton => speeds.skeleton_speed,
        EnemyKind::Cat => speeds.cat_speed,
        EnemyKind::Guide => speeds.guide_speed,
    }
}

/// Difficulty multiplier for `elapsed` escape time: the highest tier whose
/// threshold has been reached, 1.0 before the first.
pub fn speed_multiplier(elapsed: u64, tiers: &[(u64, f64)]) -> f64 {
    tiers
        .iter()
        .filter(|(threshold, _)| elapsed >= *threshold)
        .max_by_key(|(threshold, _)| *threshold)
        .map(|&(_, multiplier)| multiplier)
        .unwrap_or(1.0)
}

/// Move `enemy` one step towards `target`.
///
/// Ghosts go straight through walls.  Everyone else tries the direct step,
/// then X-only, then Y-only, and finally a small sidestep along the
/// tangent whose sign comes from `sin(now * 0.005 + index)`, so enemies
/// pressed against the same wall do not all freeze in place.
pub fn step_towards(enemy: &mut Enemy, target: (f64, f64), grid: &Grid, now: u64, index: usize) {
    let dx = target.0 - enemy.x;
    let dy = target.1 - enemy.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= ENEMY_STOP_DISTANCE {
        return;
    }

    let move_x = dx / dist * enemy.speed;
    let move_y = dy / dist * enemy.speed;

    if enemy.kind.passes_walls() {
        enemy.x += move_x;
        enemy.y += move_y;
        return;
    }

    if grid.is_walkable_at(enemy.x + move_x, enemy.y + move_y) {
        enemy.x += move_x;
        enemy.y += move_y;
    } else if grid.is_walkable_at(enemy.x + move_x, enemy.y) {
        enemy.x += move_x;
    } else if grid.is_walkable_at(enemy.x, enemy.y + move_y) {
        enemy.y += move_y;
    } else {
        let tx = -dy / dist;
        let ty = dx / dist;
        let sign = if (now as f64 * 0.005 + index as f64).sin() > 0.0 {
            1.0
        } else {
            -1.0
        };
        let sidestep = enemy.speed * SIDESTEP_FACTOR * sign;
        let sx = enemy.x + tx * sidestep;
        let sy = enemy.y + ty * sidestep;
        if grid.is_walkable_at(sx, sy) {
            enemy.x = sx;
            enemy.y = sy;
        }
    }
}

// ── Machine ───────────────────────────────────────────────────────────────────

pub struct PhaseMachine {
    pub state: GameState,
    pub world: World,
    rules: RulesConfig,
    enemy_rules: EnemyConfig,
}

impl PhaseMachine {
    pub fn new(config: &GameConfig, world: World, now: u64) -> Self {
        let state = GameState::new(config.rules.max_hp, world.pumpkins.len(), now);
        PhaseMachine {
            state,
            world,
            rules: config.rules.clone(),
            enemy_rules: config.enemies.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn enemy_rules(&self) -> &EnemyConfig {
        &self.enemy_rules
    }

    /// Move to `next` if it is the documented successor; anything else is
    /// refused and logged.
    fn advance(&mut self, next: Phase, now: u64) -> bool {
        let current = self.state.phase;
        if !current.can_advance_to(next) {
            warn!(?current, ?next, "refused phase transition");
            return false;
        }
        info!(from = ?current, to = ?next, now, "phase transition");
        self.state.phase = next;
        true
    }

    /// Advance the simulation by one tick with the player at `player`.
    pub fn tick(&mut self, now: u64, player: (f64, f64), grid: &Grid, sound: &mut SoundSink) {
        self.world
            .bursts
            .retain(|burst| now.saturating_sub(burst.created_at) < BURST_LIFETIME_MS);

        match self.state.phase {
            Phase::Intro => {
                if self.guide_within_reach(player) && self.advance(Phase::Collect, now) {
                    self.state.timers.collect_start = Some(now);
                    self.state.timers.collect_banner_until = now + COLLECT_BANNER_MS;
                    sound.play(Cue::Door);
                }
            }
            Phase::Collect => {
                self.collect_pumpkins(player, sound);
                if self.state.collected.len() >= self.state.total_pumpkins
                    && self.advance(Phase::Return, now)
                {
                    self.state.timers.return_banner_until = now + RETURN_BANNER_MS;
                    sound.play(Cue::Jump);
                }
            }
            Phase::Return => {
                if self.guide_within_reach(player) && self.advance(Phase::Betrayal, now) {
                    self.state.timers.betrayal_until = now + self.rules.betrayal_ms;
                    sound.play(Cue::Ghost);
                }
            }
            Phase::Betrayal => {
                if now >= self.state.timers.betrayal_until && self.advance(Phase::Escape, now) {
                    self.state.timers.escape_start = Some(now);
                    self.state.timers.escape_banner_until = now + ESCAPE_BANNER_MS;
                    sound.play(Cue::Door);
                }
            }
            Phase::Escape => self.tick_escape(now, player, grid, sound),
            Phase::GameOver | Phase::Victory => {}
        }
    }

    fn guide_within_reach(&self, player: (f64, f64)) -> bool {
        self.world
            .guide
            .is_some_and(|(gx, gy)| distance(gx, gy, player.0, player.1) < self.rules.guide_radius)
    }

    fn collect_pumpkins(&mut self, player: (f64, f64), sound: &mut SoundSink) {
        for pumpkin in &self.world.pumpkins {
            let key = pumpkin.key();
            if self.state.collected.contains(&key) {
                continue;
            }
            if distance(pumpkin.x, pumpkin.y, player.0, player.1) < self.rules.pickup_radius {
                self.state.collected.insert(key);
                sound.play(Cue::Pumpkin);
                info!(
                    %key,
                    collected = self.state.collected.len(),
                    total = self.state.total_pumpkins,
                    "pumpkin collected"
                );
            }
        }
    }

    // ── Escape ────────────────────────────────────────────────────────────────

    fn tick_escape(&mut self, now: u64, player: (f64, f64), grid: &Grid, sound: &mut SoundSink) {
        let elapsed = self.state.escape_elapsed(now);
        let remaining = self.rules.escape_duration_ms.saturating_sub(elapsed);

        self.escalate(now, elapsed, remaining, sound);
        let (closest, closest_cat) = self.update_enemies(now, elapsed, player, grid, sound);
        self.update_projectiles(now, player, sound);
        self.use_lanterns(player, sound);
        self.trigger_bats(now, player, sound);

        sound.update_enemy_proximity(closest);
        sound.update_cat_proximity(closest_cat);

        if self.state.hp <= 0 {
            if self.advance(Phase::GameOver, now) {
                self.state.timers.ended_at = Some(now);
                sound.stop_heartbeat();
                sound.stop_warning();
            }
        } else if elapsed >= self.rules.escape_duration_ms && self.advance(Phase::Victory, now) {
            self.state.timers.ended_at = Some(now);
            if self.state.final_time_secs.is_none() {
                let start = self.state.timers.collect_start.unwrap_or(self.state.timers.game_start);
                self.state.final_time_secs = Some(now.saturating_sub(start) as f64 / 1000.0);
            }
            sound.play(Cue::Victory);
            sound.stop_heartbeat();
            sound.stop_warning();
        }
    }

    /// One-shot escalations: cats turning and the guide joining the chase.
    fn escalate(&mut self, now: u64, elapsed: u64, remaining: u64, sound: &mut SoundSink) {
        if !self.state.cats_turned && remaining <= self.enemy_rules.cats_turn_remaining_ms {
            self.state.cats_turned = true;
            let cats = std::mem::take(&mut self.world.dormant_cats);
            info!(count = cats.len(), remaining, "cats turned");
            for cat in cats {
                self.world.enemies.insert(cat);
            }
            sound.play(Cue::Ghost);
        }

        if !self.state.guide_hostile && elapsed >= self.enemy_rules.guide_turns_after_ms {
            if let Some((gx, gy)) = self.world.guide {
                self.state.guide_hostile = true;
                self.world.enemies.insert(Enemy::new(
                    EnemyKind::Guide,
                    gx,
                    gy,
                    self.enemy_rules.guide_speed,
                ));
                info!(now, "guide turned hostile");
                sound.play(Cue::WitchLaugh);
            }
        }
    }

    /// Move, shoot and collide every active enemy.  Returns the distance to
    /// the closest enemy and to the closest cat.
    fn update_enemies(
        &mut self,
        now: u64,
        elapsed: u64,
        player: (f64, f64),
        grid: &Grid,
        sound: &mut SoundSink,
    ) -> (f64, f64) {
        let multiplier = speed_multiplier(elapsed, &self.enemy_rules.speed_tiers);
        let mut closest = f64::INFINITY;
        let mut closest_cat = f64::INFINITY;
        let mut launches = Vec::new();

        for (id, enemy) in self.world.enemies.iter_mut() {
            enemy.speed = enemy.base_speed * multiplier;

            let dx = player.0 - enemy.x;
            let dy = player.1 - enemy.y;
            let dist = (dx * dx + dy * dy).sqrt();
            closest = closest.min(dist);
            if enemy.kind == EnemyKind::Cat {
                closest_cat = closest_cat.min(dist);
            }

            step_towards(enemy, player, grid, now, id.index());

            if enemy.kind == EnemyKind::Guide && dist < self.enemy_rules.magic_range {
                let ready = enemy.last_attack.map_or(true, |last| {
                    now.saturating_sub(last) > self.enemy_rules.magic_interval_ms
                });
                if ready {
                    enemy.last_attack = Some(now);
                    let angle = dy.atan2(dx);
                    launches.push(Projectile {
                        x: enemy.x,
                        y: enemy.y,
                        vx: angle.cos() * self.enemy_rules.magic_speed,
                        vy: angle.sin() * self.enemy_rules.magic_speed,
                        created_at: now,
                    });
                }
            }

            if dist < self.rules.contact_radius && self.state.try_damage(now, self.rules.invincible_ms) {
                info!(hp = self.state.hp, kind = ?enemy.kind, "caught by enemy");
                sound.play(Cue::Ghost);
            }
        }

        for projectile in launches {
            debug!(x = projectile.x, y = projectile.y, "magic launched");
            self.world.projectiles.insert(projectile);
            sound.play(Cue::Magic);
        }

        (closest, closest_cat)
    }

    fn update_projectiles(&mut self, now: u64, player: (f64, f64), sound: &mut SoundSink) {
        let lifetime = self.enemy_rules.magic_lifetime_ms;
        self.world
            .projectiles
            .retain(|p| now.saturating_sub(p.created_at) < lifetime);

        let mut hits = Vec::new();
        for (id, projectile) in self.world.projectiles.iter_mut() {
            projectile.x += projectile.vx;
            projectile.y += projectile.vy;
            if distance(projectile.x, projectile.y, player.0, player.1) < self.rules.contact_radius {
                hits.push(id);
            }
        }

        for id in hits {
            self.world.projectiles.remove(id);
            if self.state.try_damage(now, self.rules.invincible_ms) {
                info!(hp = self.state.hp, "hit by magic");
                sound.play(Cue::Ghost);
            }
        }
    }

    fn use_lanterns(&mut self, player: (f64, f64), sound: &mut SoundSink) {
        for lantern in &self.world.lanterns {
            if self.state.hp >= self.state.max_hp {
                return;
            }
            let key = lantern.key();
            if self.state.used_lanterns.contains(&key) {
                continue;
            }
            if distance(lantern.x, lantern.y, player.0, player.1) < self.rules.pickup_radius {
                self.state.used_lanterns.insert(key);
                self.state.hp = (self.state.hp + 1).min(self.state.max_hp);
                sound.play(Cue::Heal);
                info!(%key, hp = self.state.hp, "lantern used");
            }
        }
    }

    fn trigger_bats(&mut self, now: u64, player: (f64, f64), sound: &mut SoundSink) {
        for bat in &self.world.bats {
            let key = bat.key();
            if self.state.exploded_bats.contains(&key) {
                continue;
            }
            if distance(bat.x, bat.y, player.0, player.1) < self.rules.bat_radius {
                self.state.exploded_bats.insert(key);
                self.world.bursts.push(Burst {
                    x: bat.x,
                    y: bat.y,
                    created_at: now,
                });
                let damaged = self.state.try_damage(now, self.rules.invincible_ms);
                info!(%key, damaged, hp = self.state.hp, "bat exploded");
                sound.play(Cue::Explosion);
            }
        }
    }
}
