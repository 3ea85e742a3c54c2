use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use pumpkin_maze::config::GameConfig;
use pumpkin_maze::entities::{CellKey, Enemy, EnemyKind, Hazard, HazardKind, Pumpkin};
use pumpkin_maze::grid::{Grid, FLOOR, WALL};
use pumpkin_maze::phase::*;
use pumpkin_maze::sound::{Cue, SoundPort, SoundSink};

// ── Helpers ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Play(Cue),
    StopHeartbeat,
    StopWarning,
}

/// Sound port that writes every call into a shared log.
struct Recorder(Rc<RefCell<Vec<Call>>>);

impl SoundPort for Recorder {
    fn play(&mut self, cue: Cue) {
        self.0.borrow_mut().push(Call::Play(cue));
    }
    fn play_footstep(&mut self, _moving: bool) {}
    fn resume_audio(&mut self) {}
    fn toggle_sound(&mut self) -> bool {
        true
    }
    fn toggle_ambient(&mut self) {}
    fn update_enemy_proximity(&mut self, _distance: f64) {}
    fn update_cat_proximity(&mut self, _distance: f64) {}
    fn stop_heartbeat(&mut self) {
        self.0.borrow_mut().push(Call::StopHeartbeat);
    }
    fn stop_warning(&mut self) {
        self.0.borrow_mut().push(Call::StopWarning);
    }
}

fn recorder() -> (SoundSink, Rc<RefCell<Vec<Call>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    (SoundSink::new(Box::new(Recorder(Rc::clone(&log)))), log)
}

fn count(log: &Rc<RefCell<Vec<Call>>>, cue: Cue) -> usize {
    log.borrow().iter().filter(|c| **c == Call::Play(cue)).count()
}

fn room(w: usize, h: usize) -> Grid {
    let rows = (0..h)
        .map(|y| {
            (0..w)
                .map(|x| if x == 0 || y == 0 || x == w - 1 || y == h - 1 { WALL } else { FLOOR })
                .collect()
        })
        .collect();
    Grid::from_rows(rows).unwrap()
}

const GUIDE: (f64, f64) = (2.5, 2.5);
const FAR: (f64, f64) = (10.5, 10.5);

fn world_with_guide() -> World {
    World {
        guide: Some(GUIDE),
        ..World::default()
    }
}

fn machine(world: World) -> PhaseMachine {
    PhaseMachine::new(&GameConfig::default(), world, 0)
}

/// Walk a machine without pumpkins through to the escape.  Returns the
/// escape start time.
fn run_to_escape(m: &mut PhaseMachine, grid: &Grid, sound: &mut SoundSink) -> u64 {
    m.tick(100, GUIDE, grid, sound);
    m.tick(200, GUIDE, grid, sound);
    m.tick(300, GUIDE, grid, sound);
    m.tick(3300, FAR, grid, sound);
    assert_eq!(m.phase(), Phase::Escape);
    3300
}

fn enemy_of(m: &PhaseMachine, kind: EnemyKind) -> Option<Enemy> {
    m.world
        .enemies
        .iter()
        .find(|(_, e)| e.kind == kind)
        .map(|(_, e)| e.clone())
}

// ── Successors ────────────────────────────────────────────────────────────────

#[test]
fn phases_only_move_forward() {
    use Phase::*;
    assert!(Intro.can_advance_to(Collect));
    assert!(Escape.can_advance_to(Victory));
    assert!(Escape.can_advance_to(GameOver));
    assert!(!Intro.can_advance_to(Return));
    assert!(!Collect.can_advance_to(Intro));
    assert!(!Victory.can_advance_to(GameOver));
    assert!(!GameOver.can_advance_to(Victory));
    for next in [Intro, Collect, Return, Betrayal, Escape, GameOver, Victory] {
        assert!(!Victory.can_advance_to(next));
        assert!(!GameOver.can_advance_to(next));
    }
    assert!(Victory.is_terminal() && GameOver.is_terminal());
    assert!(!Escape.is_terminal());
}

// ── Damage ────────────────────────────────────────────────────────────────────

#[test]
fn damage_respects_invincibility_window() {
    let mut state = GameState::new(3, 0, 0);
    assert!(state.try_damage(100, 1000));
    assert!(!state.try_damage(600, 1000));
    assert!(!state.try_damage(1100, 1000));
    assert!(state.try_damage(1101, 1000));
    assert_eq!(state.hp, 1);
    assert_eq!(state.timers.last_damage, Some(1101));
}

// ── Story phases ──────────────────────────────────────────────────────────────

#[test]
fn intro_waits_for_the_guide() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut m = machine(world_with_guide());

    m.tick(50, (5.5, 5.5), &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Intro);

    m.tick(100, (3.5, 2.5), &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Collect);
    assert_eq!(m.state.timers.collect_start, Some(100));
    assert_eq!(m.state.timers.collect_banner_until, 100 + COLLECT_BANNER_MS);
    assert_eq!(count(&log, Cue::Door), 1);
}

#[test]
fn without_a_guide_the_game_stays_in_intro() {
    let grid = room(12, 12);
    let mut sound = SoundSink::none();
    let mut m = machine(World::default());
    for now in (0..5000).step_by(500) {
        m.tick(now, GUIDE, &grid, &mut sound);
    }
    assert_eq!(m.phase(), Phase::Intro);
}

#[test]
fn pumpkins_are_ignored_before_collecting() {
    let grid = room(12, 12);
    let mut sound = SoundSink::none();
    let mut world = world_with_guide();
    world.pumpkins.push(Pumpkin { x: 5.5, y: 5.5 });
    let mut m = machine(world);

    m.tick(100, (5.5, 5.5), &grid, &mut sound);
    assert!(m.state.collected.is_empty());
    assert_eq!(m.state.total_pumpkins, 1);
}

#[test]
fn full_story_from_intro_to_escape() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut world = world_with_guide();
    world.pumpkins.push(Pumpkin { x: 5.5, y: 5.5 });
    world.pumpkins.push(Pumpkin { x: 8.5, y: 8.5 });
    let mut m = machine(world);

    m.tick(100, GUIDE, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Collect);

    m.tick(200, (5.5, 5.6), &grid, &mut sound);
    m.tick(300, (5.5, 5.6), &grid, &mut sound);
    assert_eq!(m.state.collected.len(), 1);
    assert!(m.state.collected.contains(&CellKey { x: 5, y: 5 }));
    assert_eq!(count(&log, Cue::Pumpkin), 1);
    assert_eq!(m.phase(), Phase::Collect);

    m.tick(400, (8.4, 8.5), &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Return);
    assert_eq!(m.state.timers.return_banner_until, 400 + RETURN_BANNER_MS);
    assert_eq!(count(&log, Cue::Jump), 1);

    m.tick(500, FAR, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Return);
    m.tick(600, GUIDE, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Betrayal);
    assert_eq!(m.state.timers.betrayal_until, 3600);

    m.tick(3599, GUIDE, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Betrayal);
    m.tick(3600, GUIDE, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Escape);
    assert_eq!(m.state.timers.escape_start, Some(3600));
    assert_eq!(m.state.timers.escape_banner_until, 3600 + ESCAPE_BANNER_MS);
}

#[test]
fn zero_pumpkins_skip_straight_to_return() {
    let grid = room(12, 12);
    let mut sound = SoundSink::none();
    let mut m = machine(world_with_guide());
    m.tick(100, GUIDE, &grid, &mut sound);
    m.tick(200, FAR, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Return);
}

// ── Escape ────────────────────────────────────────────────────────────────────

#[test]
fn victory_exactly_at_the_escape_duration() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut m = machine(world_with_guide());
    let start = run_to_escape(&mut m, &grid, &mut sound);

    m.tick(start + 59_999, FAR, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Escape);
    assert_eq!(m.state.final_time_secs, None);

    m.tick(start + 60_000, FAR, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Victory);
    assert_eq!(m.state.timers.ended_at, Some(start + 60_000));
    let secs = m.state.final_time_secs.unwrap();
    assert!((secs - (start + 60_000 - 100) as f64 / 1000.0).abs() < 1e-9);
    assert!(log.borrow().contains(&Call::StopHeartbeat));
    assert!(log.borrow().contains(&Call::StopWarning));

    m.tick(start + 70_000, FAR, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::Victory);
    assert_eq!(m.state.final_time_secs, Some(secs));
    assert_eq!(count(&log, Cue::Victory), 1);
}

#[test]
fn three_separated_hits_end_the_game() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut world = world_with_guide();
    world.enemies.insert(Enemy::new(EnemyKind::Skeleton, 6.5, 6.5, 0.012));
    let mut m = machine(world);
    let start = run_to_escape(&mut m, &grid, &mut sound);
    log.borrow_mut().clear();

    let player = (6.5, 6.5);
    m.tick(start + 100, player, &grid, &mut sound);
    assert_eq!(m.state.hp, 2);
    m.tick(start + 600, player, &grid, &mut sound);
    assert_eq!(m.state.hp, 2);
    m.tick(start + 1101, player, &grid, &mut sound);
    assert_eq!(m.state.hp, 1);
    assert_eq!(m.phase(), Phase::Escape);

    m.tick(start + 2102, player, &grid, &mut sound);
    assert_eq!(m.state.hp, 0);
    assert_eq!(m.phase(), Phase::GameOver);
    assert_eq!(m.state.timers.ended_at, Some(start + 2102));
    assert_eq!(count(&log, Cue::Ghost), 3);
    assert!(log.borrow().contains(&Call::StopHeartbeat));

    m.tick(start + 60_000, player, &grid, &mut sound);
    assert_eq!(m.phase(), Phase::GameOver);
    assert_eq!(m.state.final_time_secs, None);
}

#[test]
fn game_over_wins_a_tie_with_victory() {
    let grid = room(12, 12);
    let mut sound = SoundSink::none();
    let mut world = world_with_guide();
    world.enemies.insert(Enemy::new(EnemyKind::Skeleton, 6.5, 6.5, 0.012));
    let mut m = machine(world);
    let start = run_to_escape(&mut m, &grid, &mut sound);

    m.state.hp = 1;
    m.tick(start + 60_000, (6.5, 6.5), &grid, &mut sound);
    assert_eq!(m.phase(), Phase::GameOver);
    assert_eq!(m.state.final_time_secs, None);
}

#[test]
fn cats_turn_exactly_once() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut world = world_with_guide();
    world.dormant_cats.push(Enemy::new(EnemyKind::Cat, 9.5, 2.5, 0.018));
    let mut m = machine(world);
    let start = run_to_escape(&mut m, &grid, &mut sound);

    m.tick(start + 29_999, FAR, &grid, &mut sound);
    assert!(!m.state.cats_turned);
    assert!(enemy_of(&m, EnemyKind::Cat).is_none());
    log.borrow_mut().clear();

    m.tick(start + 30_000, FAR, &grid, &mut sound);
    assert!(m.state.cats_turned);
    assert!(m.world.dormant_cats.is_empty());
    assert!(enemy_of(&m, EnemyKind::Cat).is_some());
    assert_eq!(count(&log, Cue::Ghost), 1);

    m.tick(start + 30_016, FAR, &grid, &mut sound);
    m.tick(start + 30_032, FAR, &grid, &mut sound);
    assert_eq!(count(&log, Cue::Ghost), 1);
    assert_eq!(
        m.world.enemies.iter().filter(|(_, e)| e.kind == EnemyKind::Cat).count(),
        1
    );
}

#[test]
fn guide_turns_hostile_after_ten_seconds() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut m = machine(world_with_guide());
    let start = run_to_escape(&mut m, &grid, &mut sound);

    m.tick(start + 9_999, FAR, &grid, &mut sound);
    assert!(!m.state.guide_hostile);

    m.tick(start + 10_000, FAR, &grid, &mut sound);
    assert!(m.state.guide_hostile);
    assert!(enemy_of(&m, EnemyKind::Guide).is_some());

    m.tick(start + 10_016, FAR, &grid, &mut sound);
    assert_eq!(count(&log, Cue::WitchLaugh), 1);
}

#[test]
fn hostile_guide_fires_magic_that_hurts() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut m = machine(world_with_guide());
    let start = run_to_escape(&mut m, &grid, &mut sound);

    let player = (3.2, 2.5);
    m.tick(start + 10_000, player, &grid, &mut sound);
    assert_eq!(m.world.projectiles.len(), 1);
    assert_eq!(count(&log, Cue::Magic), 1);

    for i in 1..6 {
        m.tick(start + 10_000 + i * 16, player, &grid, &mut sound);
    }
    assert_eq!(m.state.hp, 2);
    assert!(m.world.projectiles.is_empty());
    assert_eq!(count(&log, Cue::Magic), 1);
}

#[test]
fn enemy_speed_follows_the_tiers() {
    let grid = room(12, 12);
    let mut sound = SoundSink::none();
    let mut world = world_with_guide();
    world.enemies.insert(Enemy::new(EnemyKind::Skeleton, 9.5, 2.5, 0.012));
    let mut m = machine(world);
    let start = run_to_escape(&mut m, &grid, &mut sound);

    m.tick(start + 1_000, FAR, &grid, &mut sound);
    let skeleton = enemy_of(&m, EnemyKind::Skeleton).unwrap();
    assert!((skeleton.speed - 0.012).abs() < 1e-12);

    m.tick(start + 30_000, FAR, &grid, &mut sound);
    let skeleton = enemy_of(&m, EnemyKind::Skeleton).unwrap();
    assert!((skeleton.speed - 0.018).abs() < 1e-12);

    m.tick(start + 45_000, FAR, &grid, &mut sound);
    let skeleton = enemy_of(&m, EnemyKind::Skeleton).unwrap();
    assert!((skeleton.speed - 0.024).abs() < 1e-12);
}

#[test]
fn lanterns_heal_once_and_only_when_hurt() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut world = world_with_guide();
    world.lanterns.push(Hazard {
        kind: HazardKind::Lantern,
        x: 6.5,
        y: 6.5,
    });
    let mut m = machine(world);
    let start = run_to_escape(&mut m, &grid, &mut sound);

    m.tick(start + 100, (6.5, 6.5), &grid, &mut sound);
    assert!(m.state.used_lanterns.is_empty());
    assert_eq!(m.state.hp, 3);

    m.state.hp = 1;
    m.tick(start + 200, (6.5, 6.6), &grid, &mut sound);
    assert_eq!(m.state.hp, 2);
    assert!(m.state.used_lanterns.contains(&CellKey { x: 6, y: 6 }));

    m.tick(start + 300, FAR, &grid, &mut sound);
    m.tick(start + 400, (6.5, 6.5), &grid, &mut sound);
    assert_eq!(m.state.hp, 2);
    assert_eq!(count(&log, Cue::Heal), 1);
}

#[test]
fn bats_explode_once() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut world = world_with_guide();
    world.bats.push(Hazard {
        kind: HazardKind::Bat,
        x: 6.5,
        y: 6.5,
    });
    let mut m = machine(world);
    let start = run_to_escape(&mut m, &grid, &mut sound);

    let near = (6.5, 7.2);
    m.tick(start + 100, near, &grid, &mut sound);
    assert_eq!(m.state.hp, 2);
    assert!(m.state.exploded_bats.contains(&CellKey { x: 6, y: 6 }));
    assert_eq!(m.world.bursts.len(), 1);

    m.tick(start + 2000, near, &grid, &mut sound);
    assert_eq!(m.state.hp, 2);
    assert_eq!(count(&log, Cue::Explosion), 1);
    assert!(m.world.bursts.is_empty());
}

#[test]
fn bat_inside_invincibility_is_spent_without_damage() {
    let grid = room(12, 12);
    let (mut sound, log) = recorder();
    let mut world = world_with_guide();
    world.bats.push(Hazard {
        kind: HazardKind::Bat,
        x: 6.5,
        y: 6.5,
    });
    let mut m = machine(world);
    let start = run_to_escape(&mut m, &grid, &mut sound);
    m.state.timers.last_damage = Some(start + 50);

    let near = (6.5, 7.2);
    m.tick(start + 100, near, &grid, &mut sound);
    assert_eq!(m.state.hp, 3);
    assert!(m.state.exploded_bats.contains(&CellKey { x: 6, y: 6 }));
    assert_eq!(m.world.bursts.len(), 1);
    assert_eq!(count(&log, Cue::Explosion), 1);

    m.tick(start + 2000, near, &grid, &mut sound);
    assert_eq!(m.state.hp, 3);
    assert_eq!(count(&log, Cue::Explosion), 1);
}

// ── Population ────────────────────────────────────────────────────────────────

fn marked_room() -> Grid {
    let mut rows: Vec<Vec<u8>> = (0..12)
        .map(|y| {
            (0..12)
                .map(|x| if x == 0 || y == 0 || x == 11 || y == 11 { WALL } else { FLOOR })
                .collect()
        })
        .collect();
    for (x, code) in [(2, 2), (3, 7), (4, 10), (5, 4), (6, 8), (7, 9), (8, 3), (9, 11)] {
        rows[2][x] = code;
    }
    Grid::from_rows(rows).unwrap()
}

#[test]
fn populate_places_pumpkins_on_distinct_free_cells() {
    let grid = marked_room();
    let spawn = grid.find_spawn();
    let mut rng = StdRng::seed_from_u64(7);
    let world = World::populate(&grid, &GameConfig::default(), spawn, &mut rng);

    assert_eq!(world.pumpkins.len(), 5);
    let keys: Vec<CellKey> = world.pumpkins.iter().map(|p| p.key()).collect();
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(grid.cell(key.x, key.y), Some(FLOOR));
        assert_ne!(*key, CellKey::from_pos(spawn.0, spawn.1));
        assert!(!keys[i + 1..].contains(key), "duplicate pumpkin at {key}");
    }

    let (gx, gy) = world.guide.unwrap();
    let guide = CellKey::from_pos(gx, gy);
    assert!(!keys.contains(&guide));
    assert_ne!(guide, CellKey::from_pos(spawn.0, spawn.1));
}

#[test]
fn populate_seeds_entities_from_markers() {
    let grid = marked_room();
    let mut rng = StdRng::seed_from_u64(1);
    let world = World::populate(&grid, &GameConfig::default(), grid.find_spawn(), &mut rng);

    let mut kinds: Vec<EnemyKind> = world.enemies.iter().map(|(_, e)| e.kind).collect();
    kinds.sort_by_key(|k| format!("{k:?}"));
    assert_eq!(kinds, vec![EnemyKind::Ghost, EnemyKind::Skeleton, EnemyKind::Witch]);
    assert_eq!(world.dormant_cats.len(), 1);
    assert_eq!(world.lanterns.len(), 1);
    assert_eq!(world.bats.len(), 1);
    assert_eq!((world.bats[0].x, world.bats[0].y), (6.5, 2.5));
}

#[test]
fn populate_is_deterministic_per_seed() {
    let grid = marked_room();
    let config = GameConfig::default();
    let a = World::populate(&grid, &config, grid.find_spawn(), &mut StdRng::seed_from_u64(42));
    let b = World::populate(&grid, &config, grid.find_spawn(), &mut StdRng::seed_from_u64(42));
    assert_eq!(a.pumpkins, b.pumpkins);
    assert_eq!(a.guide, b.guide);
}

#[test]
fn populate_stops_when_cells_run_out() {
    let grid = Grid::parse("1,1,1,1,1\n1,0,0,0,1\n1,1,1,1,1\n").unwrap();
    let spawn = grid.find_spawn();
    let mut rng = StdRng::seed_from_u64(3);
    let world = World::populate(&grid, &GameConfig::default(), spawn, &mut rng);

    assert_eq!(world.pumpkins.len(), 2);
    assert_eq!(world.guide, None);
    let m = PhaseMachine::new(&GameConfig::default(), world, 0);
    assert_eq!(m.state.total_pumpkins, 2);
}

// ── Enemy steering ────────────────────────────────────────────────────────────

#[test]
fn speed_multiplier_picks_highest_reached_tier() {
    let tiers = [(45_000, 2.0), (30_000, 1.5)];
    assert_eq!(speed_multiplier(0, &tiers), 1.0);
    assert_eq!(speed_multiplier(29_999, &tiers), 1.0);
    assert_eq!(speed_multiplier(30_000, &tiers), 1.5);
    assert_eq!(speed_multiplier(45_000, &tiers), 2.0);
    assert_eq!(speed_multiplier(90_000, &[]), 1.0);
}

#[test]
fn ghosts_drift_through_walls() {
    let mut rows = vec![vec![FLOOR; 6]; 3];
    rows[1][3] = WALL;
    let grid = Grid::from_rows(rows).unwrap();

    let mut ghost = Enemy::new(EnemyKind::Ghost, 2.99, 1.5, 0.015);
    step_towards(&mut ghost, (5.5, 1.5), &grid, 0, 0);
    assert!((ghost.x - 3.005).abs() < 1e-9);
    assert_eq!(grid.cell(3, 1), Some(WALL));
}

#[test]
fn walkers_slide_along_walls() {
    let mut rows = vec![vec![FLOOR; 8]; 8];
    for row in rows.iter_mut() {
        row[3] = WALL;
    }
    let grid = Grid::from_rows(rows).unwrap();

    let mut skeleton = Enemy::new(EnemyKind::Skeleton, 2.995, 2.5, 0.012);
    step_towards(&mut skeleton, (5.5, 4.5), &grid, 0, 0);
    assert_eq!(skeleton.x, 2.995);
    assert!(skeleton.y > 2.5);
}

#[test]
fn enemies_stop_next_to_the_target() {
    let grid = room(6, 6);
    let mut witch = Enemy::new(EnemyKind::Witch, 2.55, 2.5, 0.015);
    step_towards(&mut witch, (2.5, 2.5), &grid, 0, 0);
    assert_eq!((witch.x, witch.y), (2.55, 2.5));
}

#[test]
fn cornered_walker_holds_position() {
    let grid = room(6, 6);
    let mut cat = Enemy::new(EnemyKind::Cat, 1.005, 1.005, 0.018);
    step_towards(&mut cat, (-5.0, -5.0), &grid, 1234, 2);
    assert_eq!((cat.x, cat.y), (1.005, 1.005));
}

#[test]
fn sidestep_direction_follows_the_clock() {
    let grid = room(6, 6);

    // Sidestep towards the wall is refused.
    let mut held = Enemy::new(EnemyKind::Cat, 1.05, 1.02, 0.1);
    step_towards(&mut held, (-5.0, -1.0), &grid, 100, 0);
    assert_eq!((held.x, held.y), (1.05, 1.02));

    // The other way slides along the wall into open floor.
    let mut slid = Enemy::new(EnemyKind::Cat, 1.05, 1.02, 0.1);
    step_towards(&mut slid, (-5.0, -1.0), &grid, 1000, 0);
    assert!(slid.x < 1.05);
    assert!(slid.y > 1.02);
    assert!((slid.x - 1.0247).abs() < 1e-3);
    assert!((slid.y - 1.0959).abs() < 1e-3);

    // The enemy index shifts the phase of the same clock.
    let mut other = Enemy::new(EnemyKind::Cat, 1.05, 1.02, 0.1);
    step_towards(&mut other, (-5.0, -1.0), &grid, 1000, 2);
    assert_eq!((other.x, other.y), (1.05, 1.02));
}
