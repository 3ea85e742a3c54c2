/// Column ray casting against the grid.
///
/// One ray is marched per column group across the field of view.  Each ray
/// yields the fisheye-corrected distance to the first wall, which sets the
/// wall slice height and is written into the depth buffer for sprite
/// occlusion.

use crate::entities::Pose;
use crate::grid::{Grid, WALL};

// ── Depth buffer ──────────────────────────────────────────────────────────────

/// Perpendicular wall distance per screen column.
#[derive(Clone, Debug, Default)]
pub struct DepthBuffer {
    depths: Vec<f64>,
}

impl DepthBuffer {
    pub fn new(width: usize, max_depth: f64) -> Self {
        DepthBuffer {
            depths: vec![max_depth; width],
        }
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<f64> {
        self.depths.get(column).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.depths
    }

    /// Reset every column to `max_depth`, resizing to `width` if needed.
    pub fn reset(&mut self, width: usize, max_depth: f64) {
        self.depths.clear();
        self.depths.resize(width, max_depth);
    }

    fn fill(&mut self, start: usize, end: usize, depth: f64) {
        let end = end.min(self.depths.len());
        if start < end {
            self.depths[start..end].fill(depth);
        }
    }
}

// ── Single rays ───────────────────────────────────────────────────────────────

/// Result of marching one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the ray, before fisheye correction.
    pub distance: f64,
    /// Wall cell that stopped the ray; `None` when the ray left the grid or
    /// ran out of range.
    pub cell: Option<(i64, i64)>,
}

/// March from `(x, y)` along `ray_angle` in increments of `step` until a
/// wall or `max_depth`.  The ray ignores the cell it starts in unless that
/// cell is itself a wall.  Leaving the grid counts as a hit at `max_depth`.
pub fn cast_ray(grid: &Grid, x: f64, y: f64, ray_angle: f64, step: f64, max_depth: f64) -> RayHit {
    let (sin_a, cos_a) = ray_angle.sin_cos();
    let own_cell = (x.floor() as i64, y.floor() as i64);
    let width = grid.width() as f64;
    let height = grid.height() as f64;

    let mut distance = 0.0;
    let mut test_x = x;
    let mut test_y = y;

    while distance < max_depth {
        distance += step;
        test_x += cos_a * step;
        test_y += sin_a * step;

        if test_x < 0.0 || test_x >= width || test_y < 0.0 || test_y >= height {
            return RayHit {
                distance: max_depth,
                cell: None,
            };
        }

        let cell = (test_x.floor() as i64, test_y.floor() as i64);
        let code = grid.cell(cell.0, cell.1);
        if cell == own_cell && code != Some(WALL) {
            continue;
        }
        if code == Some(WALL) {
            return RayHit {
                distance,
                cell: Some(cell),
            };
        }
    }

    RayHit {
        distance: max_depth,
        cell: None,
    }
}

/// Remove the fisheye bow: project the hit onto the view direction.
pub fn correct_fisheye(raw: f64, ray_angle: f64, view_angle: f64) -> f64 {
    raw * (ray_angle - view_angle).cos()
}

// ── Whole frame ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayParams {
    pub fov: f64,
    pub step: f64,
    pub max_depth: f64,
    pub max_rays: usize,
}

impl RayParams {
    /// Rays cast for a surface `width` pixels wide: half the width, capped
    /// at `max_rays`, never zero.
    pub fn ray_count(&self, width: usize) -> usize {
        (width / 2).min(self.max_rays).max(1)
    }
}

/// One wall slice, covering `width` pixel columns starting at `x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnHit {
    pub x: usize,
    pub width: usize,
    pub ray_angle: f64,
    pub raw: f64,
    pub corrected: f64,
    pub cell: Option<(i64, i64)>,
    pub wall_height: f64,
    pub brightness: f64,
}

/// Minimum wall brightness, so distant walls never go fully black.
pub const MIN_BRIGHTNESS: f64 = 0.1;

/// Cast every ray for a `width`×`height` view.  Fills `depth` (resized to
/// `width`) and `columns` (cleared first), reusing their allocations.
pub fn cast_view(
    grid: &Grid,
    pose: &Pose,
    params: &RayParams,
    width: usize,
    height: usize,
    depth: &mut DepthBuffer,
    columns: &mut Vec<ColumnHit>,
) {
    depth.reset(width, params.max_depth);
    columns.clear();
    if width == 0 {
        return;
    }

    let ray_count = params.ray_count(width);
    let ray_width = width.div_ceil(ray_count);

    for ray in 0..ray_count {
        let ray_angle = pose.angle - params.fov / 2.0 + (ray as f64 / ray_count as f64) * params.fov;
        let hit = cast_ray(grid, pose.x, pose.y, ray_angle, params.step, params.max_depth);

        let raw = hit.distance.min(params.max_depth);
        let corrected = correct_fisheye(raw, ray_angle, pose.angle);
        let wall_height = height as f64 / corrected * 0.5;
        let brightness = (1.0 - corrected / params.max_depth).max(MIN_BRIGHTNESS);

        let x = ray * width / ray_count;
        depth.fill(x, x + ray_width, corrected);

        columns.push(ColumnHit {
            x,
            width: ray_width.min(width - x),
            ray_angle,
            raw,
            corrected,
            cell: hit.cell,
            wall_height,
            brightness,
        });
    }
}
