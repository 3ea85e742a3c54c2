/// 2D drawing surface the renderer paints onto, plus the software
/// framebuffer the terminal front end presents.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Multiply every channel by `factor`, saturating at 255.
    pub fn scale(self, factor: f64) -> Rgb {
        let f = factor.max(0.0);
        let ch = |c: u8| (c as f64 * f).min(255.0) as u8;
        Rgb::new(ch(self.r), ch(self.g), ch(self.b))
    }

    /// Linear blend towards `other`; `t = 0` keeps `self`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(ch(self.r, other.r), ch(self.g, other.g), ch(self.b, other.b))
    }
}

/// Anything pixels can be painted onto.  Coordinates are in pixels with the
/// origin top-left; out-of-range parts of a shape are clipped.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb);

    /// Blend `color` over a rectangle with opacity `alpha`.
    fn blend_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb, alpha: f64);

    /// Filled ellipse, drawn as one rectangle per pixel row.
    fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, color: Rgb) {
        for (x, y, w) in ellipse_rows(cx, cy, rx, ry) {
            self.fill_rect(x, y, w, 1.0, color);
        }
    }

    fn blend_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, color: Rgb, alpha: f64) {
        for (x, y, w) in ellipse_rows(cx, cy, rx, ry) {
            self.blend_rect(x, y, w, 1.0, color, alpha);
        }
    }
}

/// Row spans `(x, y, width)` covering an ellipse.
fn ellipse_rows(cx: f64, cy: f64, rx: f64, ry: f64) -> impl Iterator<Item = (f64, f64, f64)> {
    let (top, bottom) = if rx > 0.0 && ry > 0.0 {
        ((cy - ry).floor() as i64, (cy + ry).ceil() as i64)
    } else {
        (0, 0)
    };
    (top..bottom).filter_map(move |row| {
        let dy = (row as f64 + 0.5 - cy) / ry;
        if dy.abs() > 1.0 {
            return None;
        }
        let half = rx * (1.0 - dy * dy).sqrt();
        Some((cx - half, row as f64, half * 2.0))
    })
}

// ── Framebuffer ───────────────────────────────────────────────────────────────

/// Row-major RGB pixel buffer.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Framebuffer {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
        }
    }

    /// Change dimensions; contents are cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, Rgb::BLACK);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Pixel-space bounds of a rectangle after clipping, as half-open ranges.
    fn clip(&self, x: f64, y: f64, w: f64, h: f64) -> Option<(usize, usize, usize, usize)> {
        if !(w > 0.0 && h > 0.0) {
            return None;
        }
        let x0 = x.round().max(0.0);
        let y0 = y.round().max(0.0);
        let x1 = (x + w).round().min(self.width as f64);
        let y1 = (y + h).round().min(self.height as f64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

impl Surface for Framebuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) {
            for row in y0..y1 {
                let start = row * self.width;
                self.pixels[start + x0..start + x1].fill(color);
            }
        }
    }

    fn blend_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb, alpha: f64) {
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) {
            for row in y0..y1 {
                let start = row * self.width;
                for px in &mut self.pixels[start + x0..start + x1] {
                    *px = px.mix(color, alpha);
                }
            }
        }
    }
}
