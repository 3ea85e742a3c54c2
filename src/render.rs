/// Frame renderer.
///
/// Owns every buffer sized to the surface: depth buffer, wall columns, sky
/// and ground gradients, star field.  A size change (explicit `resize` or
/// a mismatch noticed at render time) rebuilds all of them together.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::RenderConfig;
use crate::entities::Pose;
use crate::grid::Grid;
use crate::phase::{GameState, Phase, World};
use crate::raycast::{cast_view, ColumnHit, DepthBuffer, RayParams};
use crate::sprites::{self, SpriteCache, SpriteSource, SpriteView};
use crate::surface::{Rgb, Surface};

const SKY_TOP: Rgb = Rgb::new(0x0a, 0x0e, 0x27);
const SKY_HORIZON: Rgb = Rgb::new(0x1a, 0x1f, 0x3a);
const GROUND_HORIZON: Rgb = Rgb::new(0x3d, 0x28, 0x17);
const GROUND_BOTTOM: Rgb = Rgb::new(0x1a, 0x0f, 0x05);
const MOON: Rgb = Rgb::new(0xff, 0xfa, 0xcd);
const MOON_GLOW: Rgb = Rgb::new(255, 255, 200);
const CRATER: Rgb = Rgb::new(200, 200, 180);
const WINDOW_LIGHT: Rgb = Rgb::new(0xff, 0xcc, 0x00);
const WINDOW_FRAME: Rgb = Rgb::new(0x1a, 0x1a, 0x1a);

const STAR_COUNT: usize = 40;
/// Windows are only drawn on walls nearer than this.
const WINDOW_DISTANCE: f64 = 10.0;
const VICTORY_FADE_MS: f64 = 2500.0;

/// Everything a frame shows.
pub struct Scene<'a> {
    pub grid: &'a Grid,
    pub pose: &'a Pose,
    pub cache: &'a SpriteCache,
    pub state: &'a GameState,
    pub world: &'a World,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Star {
    x: f64,
    y: f64,
    size: f64,
    twinkle_speed: f64,
    twinkle_offset: f64,
}

pub struct Renderer {
    params: RayParams,
    sprite_radius: f64,
    star_seed: u64,
    size: (usize, usize),
    depth: DepthBuffer,
    columns: Vec<ColumnHit>,
    sources: Vec<SpriteSource>,
    sky: Vec<Rgb>,
    ground: Vec<Rgb>,
    stars: Vec<Star>,
}

impl Renderer {
    pub fn new(config: &RenderConfig, star_seed: u64) -> Self {
        Renderer {
            params: RayParams {
                fov: config.fov(),
                step: config.ray_step,
                max_depth: config.max_depth,
                max_rays: config.max_rays,
            },
            sprite_radius: config.sprite_radius,
            star_seed,
            size: (0, 0),
            depth: DepthBuffer::default(),
            columns: Vec::new(),
            sources: Vec::new(),
            sky: Vec::new(),
            ground: Vec::new(),
            stars: Vec::new(),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    /// Depth buffer of the last rendered frame.
    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn columns(&self) -> &[ColumnHit] {
        &self.columns
    }

    /// Rebuild every surface-sized cache for `width`×`height`.
    pub fn resize(&mut self, width: usize, height: usize) {
        debug!(width, height, "renderer resized");
        self.size = (width, height);
        self.depth.reset(width, self.params.max_depth);
        self.columns.clear();

        let half = height / 2;
        self.sky = gradient(SKY_TOP, SKY_HORIZON, half);
        self.ground = gradient(GROUND_HORIZON, GROUND_BOTTOM, height - half);

        let mut rng = StdRng::seed_from_u64(self.star_seed ^ ((width as u64) << 32 | height as u64));
        self.stars = (0..STAR_COUNT)
            .map(|_| Star {
                x: rng.gen::<f64>() * width as f64,
                y: rng.gen::<f64>() * half as f64,
                size: rng.gen::<f64>() * 1.5 + 0.5,
                twinkle_speed: rng.gen::<f64>() * 0.002 + 0.001,
                twinkle_offset: rng.gen::<f64>() * std::f64::consts::TAU,
            })
            .collect();
    }

    pub fn render(&mut self, surface: &mut impl Surface, scene: &Scene<'_>, now: u64) {
        let (width, height) = (surface.width(), surface.height());
        if (width, height) != self.size {
            self.resize(width, height);
        }
        if width == 0 || height == 0 {
            return;
        }

        self.draw_sky(surface, now);
        self.draw_ground(surface);

        cast_view(
            scene.grid,
            scene.pose,
            &self.params,
            width,
            height,
            &mut self.depth,
            &mut self.columns,
        );
        self.draw_walls(surface);

        sprites::gather(scene.cache, scene.state, scene.world, now, &mut self.sources);
        let view = SpriteView {
            fov: self.params.fov,
            radius: self.sprite_radius,
            width,
            height,
        };
        let placements = sprites::visible_sprites(&self.sources, scene.pose, &view, &self.depth);
        sprites::draw_sprites(surface, &placements, self.sprite_radius, now);

        if scene.state.phase == Phase::Victory {
            if let Some(ended) = scene.state.timers.ended_at {
                let progress = (now.saturating_sub(ended) as f64 / VICTORY_FADE_MS).min(1.0);
                draw_victory_fade(surface, progress);
            }
        }
    }

    // ── Layers ────────────────────────────────────────────────────────────────

    fn draw_sky(&self, surface: &mut impl Surface, now: u64) {
        let width = surface.width() as f64;
        let height = surface.height() as f64;
        for (row, &color) in self.sky.iter().enumerate() {
            surface.fill_rect(0.0, row as f64, width, 1.0, color);
        }

        let (mx, my, mr) = (width * 0.85, height * 0.15, height * 0.08);
        surface.blend_ellipse(mx, my, mr * 2.0, mr * 2.0, MOON_GLOW, 0.15);
        surface.fill_ellipse(mx, my, mr, mr, MOON);
        for (fx, fy, fr) in [(-0.3, -0.2, 0.2), (0.2, 0.3, 0.15), (0.1, -0.4, 0.1)] {
            surface.blend_ellipse(mx + mr * fx, my + mr * fy, mr * fr, mr * fr, CRATER, 0.3);
        }

        let t = now as f64;
        for star in &self.stars {
            let twinkle = ((t * star.twinkle_speed + star.twinkle_offset).sin() + 1.0) * 0.5;
            let opacity = 0.3 + twinkle * 0.7;
            let r = star.size / 2.0;
            surface.blend_rect(star.x - r, star.y - r, star.size, star.size, Rgb::WHITE, opacity);
        }
    }

    fn draw_ground(&self, surface: &mut impl Surface) {
        let width = surface.width() as f64;
        let top = self.sky.len();
        for (i, &color) in self.ground.iter().enumerate() {
            surface.fill_rect(0.0, (top + i) as f64, width, 1.0, color);
        }
    }

    fn draw_walls(&self, surface: &mut impl Surface) {
        let height = surface.height() as f64;
        for col in &self.columns {
            let Some((cx, cy)) = col.cell else {
                continue;
            };
            let top = height / 2.0 - col.wall_height / 2.0;
            let (x, w, h) = (col.x as f64, col.width as f64, col.wall_height);
            surface.fill_rect(x, top, w, h, wall_color(cx, cy).scale(col.brightness));

            if has_window(cx, cy) && col.corrected < WINDOW_DISTANCE && h > height * 0.15 {
                let size = (h * 0.15).max(1.0);
                let light = WINDOW_LIGHT.scale((col.brightness * 1.8).min(1.0));
                let frame = WINDOW_FRAME.scale(col.brightness);
                surface.fill_rect(x, top + h * 0.25, w, size, light);
                surface.fill_rect(x, top + h * 0.25 + size / 2.0, w, 1.0, frame);
                if h > height * 0.3 && (cx + cy) % 3 == 0 {
                    surface.fill_rect(x, top + h * 0.6, w, size, light);
                    surface.fill_rect(x, top + h * 0.6 + size / 2.0, w, 1.0, frame);
                }
            }
        }
    }
}

/// Base wall colour for the district a cell lies in.
pub fn wall_color(cx: i64, cy: i64) -> Rgb {
    match (cx, cy) {
        (1..=8, 1..=8) => Rgb::new(0x2a, 0x1a, 0x4a),
        (17..=23, 1..=8) => Rgb::new(0x1a, 0x3a, 0x1a),
        (1..=8, 16..=23) => Rgb::new(0x4a, 0x4a, 0x4a),
        (9..=23, 18..=23) => Rgb::new(0x5a, 0x30, 0x10),
        _ => Rgb::new(0x3a, 0x1f, 0x0f),
    }
}

/// Fixed per-cell window pattern.
pub fn has_window(cx: i64, cy: i64) -> bool {
    (cx * 7 + cy * 13).rem_euclid(5) == 0
}

fn gradient(from: Rgb, to: Rgb, rows: usize) -> Vec<Rgb> {
    (0..rows)
        .map(|row| from.mix(to, row as f64 / rows.max(2).saturating_sub(1) as f64))
        .collect()
}

/// Darken everything outside a shrinking circle around the centre, with a
/// short white flash at the start.
fn draw_victory_fade(surface: &mut impl Surface, progress: f64) {
    let (w, h) = (surface.width() as f64, surface.height() as f64);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let hole = (cx * cx + cy * cy).sqrt() * (1.0 - progress);
    let alpha = (0.9 * progress).min(1.0);

    for row in 0..surface.height() {
        let dy = row as f64 + 0.5 - cy;
        let half = if dy.abs() < hole {
            (hole * hole - dy * dy).sqrt()
        } else {
            0.0
        };
        if half <= 0.0 {
            surface.blend_rect(0.0, row as f64, w, 1.0, Rgb::BLACK, alpha);
        } else {
            surface.blend_rect(0.0, row as f64, cx - half, 1.0, Rgb::BLACK, alpha);
            surface.blend_rect(cx + half, row as f64, w - (cx + half), 1.0, Rgb::BLACK, alpha);
        }
    }

    if progress < 0.08 {
        let flash = 1.0 - progress / 0.08;
        surface.blend_rect(0.0, 0.0, w, h, Rgb::WHITE, 0.6 * flash);
    }
}
