/// Billboard sprites: which entities are drawn this frame, where, and in
/// what order.
///
/// The pipeline is gather → place → occlude → sort far-to-near → draw.
/// Placement and occlusion only read the pose and the depth buffer filled
/// by the raycaster; they never touch the grid.

use std::cmp::Ordering;

use crate::art;
use crate::entities::{CellKey, Pose, SpriteKind, BURST_LIFETIME_MS};
use crate::grid::Grid;
use crate::movement::normalize_angle;
use crate::phase::{GameState, World};
use crate::raycast::DepthBuffer;
use crate::surface::{Rgb, Surface};

/// Squared distance under which a sprite is too close to place sanely.
const MIN_DISTANCE_SQ: f64 = 0.25;
/// Sprite height as a fraction of the screen height at distance 1.
const SIZE_FACTOR: f64 = 0.8;
const ASPECT: f64 = 0.8;
const OCCLUSION_SAMPLES: usize = 5;
/// A sample counts as visible while the sprite is at most this far behind
/// the wall recorded for its column.
const OCCLUSION_TOLERANCE: f64 = 0.1;

const HALO: Rgb = Rgb::new(255, 0, 0);

/// One entity the compositor may draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteSource {
    pub kind: SpriteKind,
    pub x: f64,
    pub y: f64,
    /// Chasing the player right now; hostile sprites get a red halo.
    pub hostile: bool,
}

// ── Static cache ──────────────────────────────────────────────────────────────

/// Marker sprites scanned once from the grid.
#[derive(Clone, Debug, Default)]
pub struct SpriteCache {
    statics: Vec<SpriteSource>,
}

impl SpriteCache {
    pub fn from_grid(grid: &Grid) -> Self {
        let statics = grid
            .markers()
            .filter_map(|(x, y, code)| {
                SpriteKind::from_code(code).map(|kind| SpriteSource {
                    kind,
                    x: x as f64 + 0.5,
                    y: y as f64 + 0.5,
                    hostile: kind.is_roaming_enemy(),
                })
            })
            .collect();
        SpriteCache { statics }
    }

    pub fn statics(&self) -> &[SpriteSource] {
        &self.statics
    }
}

/// Collect every live sprite for this frame into `out` (cleared first).
///
/// Consumed pickups are dropped.  Once enemies roam, their static markers
/// give way to the moving copies, and likewise for the cats and the guide
/// once they have turned.
pub fn gather(
    cache: &SpriteCache,
    state: &GameState,
    world: &World,
    now: u64,
    out: &mut Vec<SpriteSource>,
) {
    out.clear();
    let roaming = state.phase.enemies_roaming();

    for sprite in cache.statics() {
        let key = CellKey::from_pos(sprite.x, sprite.y);
        let hidden = match sprite.kind {
            kind if kind.is_roaming_enemy() => roaming,
            SpriteKind::Cat => state.cats_turned,
            SpriteKind::Lantern => state.used_lanterns.contains(&key),
            SpriteKind::Bat => state.exploded_bats.contains(&key),
            _ => false,
        };
        if !hidden {
            out.push(*sprite);
        }
    }

    for pumpkin in &world.pumpkins {
        if !state.collected.contains(&pumpkin.key()) {
            out.push(SpriteSource {
                kind: SpriteKind::Pumpkin,
                x: pumpkin.x,
                y: pumpkin.y,
                hostile: false,
            });
        }
    }

    if let Some((x, y)) = world.guide {
        if !state.guide_hostile {
            out.push(SpriteSource {
                kind: SpriteKind::Guide,
                x,
                y,
                hostile: false,
            });
        }
    }

    if roaming {
        out.extend(world.enemies.iter().map(|(_, enemy)| SpriteSource {
            kind: enemy.kind.sprite(),
            x: enemy.x,
            y: enemy.y,
            hostile: true,
        }));
    }

    out.extend(world.projectiles.iter().map(|(_, p)| SpriteSource {
        kind: SpriteKind::Magic,
        x: p.x,
        y: p.y,
        hostile: false,
    }));

    out.extend(
        world
            .bursts
            .iter()
            .filter(|b| now.saturating_sub(b.created_at) < BURST_LIFETIME_MS)
            .map(|b| SpriteSource {
                kind: SpriteKind::Burst,
                x: b.x,
                y: b.y,
                hostile: false,
            }),
    );
}

// ── Placement ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteView {
    pub fov: f64,
    /// Sprites at or beyond this distance are not drawn.
    pub radius: f64,
    pub width: usize,
    pub height: usize,
}

/// Screen-space placement of one sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub kind: SpriteKind,
    pub hostile: bool,
    /// Bearing from the view direction, in (−π, π].
    pub bearing: f64,
    pub distance: f64,
    pub screen_x: f64,
    pub screen_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Project `sprite` for `pose`.  `None` when it is out of range, too
/// close, or outside the field of view.
pub fn place(sprite: &SpriteSource, pose: &Pose, view: &SpriteView) -> Option<Placement> {
    let dx = sprite.x - pose.x;
    let dy = sprite.y - pose.y;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq >= view.radius * view.radius || dist_sq <= MIN_DISTANCE_SQ {
        return None;
    }

    let bearing = normalize_angle(dy.atan2(dx) - pose.angle);
    let half = view.fov / 2.0;
    if bearing <= -half || bearing >= half {
        return None;
    }

    let distance = dist_sq.sqrt();
    let height = view.height as f64 / distance * SIZE_FACTOR;
    Some(Placement {
        kind: sprite.kind,
        hostile: sprite.hostile,
        bearing,
        distance,
        screen_x: (bearing / view.fov + 0.5) * view.width as f64,
        screen_y: view.height as f64 / 2.0,
        width: height * ASPECT,
        height,
    })
}

/// Whether walls hide `placement`: fewer than half of the samples spread
/// across its footprint lie in front of the recorded wall depth.
pub fn is_occluded(placement: &Placement, depth: &DepthBuffer) -> bool {
    let columns = depth.len() as i64;
    if columns == 0 {
        return false;
    }
    let left = ((placement.screen_x - placement.width / 2.0).floor() as i64).max(0);
    let right = ((placement.screen_x + placement.width / 2.0).floor() as i64).min(columns - 1);

    let visible = (0..OCCLUSION_SAMPLES)
        .filter(|&i| {
            let t = i as f64 / (OCCLUSION_SAMPLES - 1) as f64;
            let column = (left as f64 + (right - left) as f64 * t).floor() as i64;
            column >= 0
                && column < columns
                && depth
                    .get(column as usize)
                    .is_some_and(|wall| placement.distance < wall + OCCLUSION_TOLERANCE)
        })
        .count();

    (visible as f64) < OCCLUSION_SAMPLES as f64 / 2.0
}

/// Place, occlude and sort `sources`, farthest first.
pub fn visible_sprites(
    sources: &[SpriteSource],
    pose: &Pose,
    view: &SpriteView,
    depth: &DepthBuffer,
) -> Vec<Placement> {
    let mut placed: Vec<Placement> = sources
        .iter()
        .filter_map(|sprite| place(sprite, pose, view))
        .filter(|p| !is_occluded(p, depth))
        .collect();
    placed.sort_by(|a, b| b.distance.partial_cmp(&a.distance).unwrap_or(Ordering::Equal));
    placed
}

// ── Drawing ───────────────────────────────────────────────────────────────────

/// Draw already sorted placements back to front.  `time` drives the
/// per-kind animation.
pub fn draw_sprites(surface: &mut impl Surface, placements: &[Placement], radius: f64, time: u64) {
    for placement in placements {
        if placement.hostile {
            let alpha = (1.0 - placement.distance / radius).max(0.15) * 0.5;
            draw_halo(surface, placement, alpha);
        }
        art::draw(surface, placement, time);
    }
}

fn draw_halo(surface: &mut impl Surface, placement: &Placement, alpha: f64) {
    let r = placement.width * 0.6;
    surface.blend_ellipse(placement.screen_x, placement.screen_y, r, r, HALO, alpha);
}
