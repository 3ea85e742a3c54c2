/// Per-kind sprite drawings.
///
/// Every routine is handed the sprite's screen centre and size and builds
/// the figure out of rectangles and ellipses, dimmed with distance and
/// animated off the session clock.

use crate::entities::SpriteKind;
use crate::sprites::Placement;
use crate::surface::{Rgb, Surface};

/// Distance at which figures reach their dimmest.
const FADE_DISTANCE: f64 = 15.0;
const MIN_SHADE: f64 = 0.2;

fn shade(distance: f64) -> f64 {
    (1.0 - distance / FADE_DISTANCE).max(MIN_SHADE)
}

/// Dispatch on `placement.kind`.
pub fn draw(surface: &mut impl Surface, placement: &Placement, time: u64) {
    let fig = Figure::new(placement, time);
    match placement.kind {
        SpriteKind::Ghost => ghost(surface, &fig),
        SpriteKind::Pumpkin => pumpkin(surface, &fig),
        SpriteKind::Lantern => lantern(surface, &fig),
        SpriteKind::Sign => sign(surface, &fig),
        SpriteKind::Gravestone => gravestone(surface, &fig),
        SpriteKind::Witch => witch(surface, &fig),
        SpriteKind::Bat => bat(surface, &fig),
        SpriteKind::Cat => cat(surface, &fig),
        SpriteKind::Skeleton => skeleton(surface, &fig),
        SpriteKind::Guide => guide(surface, &fig),
        SpriteKind::Magic => magic(surface, &fig),
        SpriteKind::Burst => burst(surface, &fig),
    }
}

/// Shared drawing context for one sprite.
struct Figure {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    shade: f64,
    /// Milliseconds as a float, for the `sin` animations.
    t: f64,
}

impl Figure {
    fn new(p: &Placement, time: u64) -> Self {
        Figure {
            x: p.screen_x,
            y: p.screen_y,
            w: p.width,
            h: p.height,
            shade: shade(p.distance),
            t: time as f64,
        }
    }

    fn color(&self, r: u8, g: u8, b: u8) -> Rgb {
        Rgb::new(r, g, b).scale(self.shade)
    }

    fn glow(&self, r: u8, g: u8, b: u8, boost: f64) -> Rgb {
        Rgb::new(r, g, b).scale((self.shade * boost).min(1.0))
    }

    /// Rectangle in figure-relative units: offsets and sizes are fractions
    /// of the sprite width and height, measured from the centre.
    fn rect(&self, s: &mut impl Surface, fx: f64, fy: f64, fw: f64, fh: f64, c: Rgb) {
        s.fill_rect(self.x + self.w * fx, self.y + self.h * fy, self.w * fw, self.h * fh, c);
    }

    fn oval(&self, s: &mut impl Surface, fx: f64, fy: f64, rx: f64, ry: f64, c: Rgb) {
        s.fill_ellipse(self.x + self.w * fx, self.y + self.h * fy, self.w * rx, self.h * ry, c);
    }
}

fn ghost(s: &mut impl Surface, f: &Figure) {
    let bob = (f.t * 0.002 + f.x * 0.01).sin() * 0.08;
    let body = f.color(0x8a, 0x2b, 0xe2);
    s.blend_ellipse(f.x, f.y + f.h * bob, f.w * 0.5, f.h * 0.6, body, 0.85);
    for i in 0..5 {
        let fx = -0.4 + 0.2 * i as f64;
        f.oval(s, fx, 0.4 + bob, 0.1, 0.1 * f.w / f.h.max(1.0), body);
    }
    let eye = f.color(0xff, 0xff, 0xff);
    let pupil = f.color(0, 0, 0);
    for side in [-0.15, 0.15] {
        f.oval(s, side, -0.15 + bob, 0.12, 0.15, eye);
        f.oval(s, side, -0.15 + bob, 0.05, 0.05, pupil);
    }
    f.oval(s, 0.0, 0.15 + bob, 0.1, 0.12, pupil);
}

fn pumpkin(s: &mut impl Surface, f: &Figure) {
    let pulse = 1.0 + (f.t * 0.003).sin() * 0.1;
    f.oval(s, 0.0, 0.0, 0.45 * pulse, 0.45 * pulse, f.color(0xff, 0x6d, 0x00));
    let groove = f.color(0xcc, 0x55, 0x00);
    for i in [-1.0, 0.0, 1.0] {
        f.rect(s, 0.15 * pulse * i - 0.01, -0.35 * pulse, 0.02, 0.7 * pulse, groove);
    }
    f.rect(s, -0.08 * pulse, -0.55 * pulse, 0.16 * pulse, 0.12 * pulse, f.color(0x22, 0x8b, 0x22));
    let face = f.color(0, 0, 0);
    f.rect(s, -0.25 * pulse, -0.2 * pulse, 0.15 * pulse, 0.1 * pulse, face);
    f.rect(s, 0.1 * pulse, -0.2 * pulse, 0.15 * pulse, 0.1 * pulse, face);
    for i in 0..6 {
        let dip = if i % 2 == 0 { 0.0 } else { 0.05 };
        f.rect(s, (-0.3 + 0.1 * i as f64) * pulse, (0.1 + dip) * pulse, 0.1 * pulse, 0.08 * pulse, face);
    }
    if f.shade > 1.0 - 10.0 / FADE_DISTANCE {
        let c = Rgb::new(255, 200, 0);
        s.blend_ellipse(f.x, f.y, f.w * 0.35 * pulse, f.h * 0.35 * pulse, c, 0.3 * f.shade);
    }
}

fn lantern(s: &mut impl Surface, f: &Figure) {
    let sway = (f.t * 0.002).sin() * 0.03;
    let flicker = 0.85 + (f.t * 0.01).sin() * 0.1 + (f.t * 0.027).sin() * 0.05;
    f.rect(s, -0.02 + sway, -0.5, 0.04, 0.15, f.color(0x3a, 0x3a, 0x3a));
    f.rect(s, -0.2 + sway, -0.35, 0.4, 0.08, f.color(0x8b, 0x73, 0x55));
    f.rect(s, -0.18 + sway, -0.27, 0.36, 0.45, f.color(0x6b, 0x55, 0x44));
    f.oval(s, sway, -0.05, 0.13, 0.17, f.glow(0xff, 0xcc, 0x00, flicker));
    f.oval(s, sway, -0.05, 0.06, 0.08, f.glow(0xff, 0xff, 0xcc, flicker));
    f.rect(s, -0.2 + sway, 0.18, 0.4, 0.07, f.color(0x8b, 0x73, 0x55));
}

fn sign(s: &mut impl Surface, f: &Figure) {
    f.rect(s, -0.45, -0.35, 0.9, 0.5, f.color(0x4a, 0x25, 0x11));
    f.rect(s, -0.4, -0.3, 0.8, 0.4, f.color(0x8b, 0x45, 0x13));
    f.rect(s, -0.05, -0.05, 0.1, 0.5, f.color(0x6b, 0x44, 0x23));
    // Blocky "BOO!" lettering stand-in.
    let ink = f.glow(0xff, 0x45, 0x00, 1.2);
    for i in 0..4 {
        f.rect(s, -0.3 + 0.16 * i as f64, -0.18, 0.1, 0.14, ink);
    }
}

fn gravestone(s: &mut impl Surface, f: &Figure) {
    f.rect(s, -0.3, -0.4, 0.6, 0.8, f.color(0x5a, 0x5a, 0x5a));
    f.oval(s, 0.0, -0.4, 0.3, 0.1, f.color(0x5a, 0x5a, 0x5a));
    let cross = f.color(0, 0, 0);
    f.rect(s, -0.05, -0.2, 0.1, 0.3, cross);
    f.rect(s, -0.15, -0.1, 0.3, 0.08, cross);
}

fn witch(s: &mut impl Surface, f: &Figure) {
    let bob = (f.t * 0.0015).sin() * 0.06;
    f.rect(s, -0.05, -0.75 + bob, 0.1, 0.2, f.color(0x2a, 0x0a, 0x4c));
    f.rect(s, -0.15, -0.55 + bob, 0.3, 0.15, f.color(0x2a, 0x0a, 0x4c));
    f.rect(s, -0.35, -0.42 + bob, 0.7, 0.05, f.color(0x2a, 0x0a, 0x4c));
    f.rect(s, -0.15, -0.42 + bob, 0.3, 0.04, f.color(0xff, 0x98, 0x00));
    f.oval(s, 0.0, -0.25 + bob, 0.15, 0.12, f.color(0xd4, 0xa5, 0x74));
    let eye = f.color(0, 0, 0);
    f.rect(s, -0.08, -0.28 + bob, 0.04, 0.03, eye);
    f.rect(s, 0.04, -0.28 + bob, 0.04, 0.03, eye);
    f.rect(s, -0.25, -0.12 + bob, 0.5, 0.6, f.color(0x4a, 0x14, 0x8c));
    f.rect(s, -0.45, 0.5 + bob, 0.9, 0.05, f.color(0x8b, 0x45, 0x13));
    f.rect(s, 0.35, 0.45 + bob, 0.15, 0.15, f.color(0xda, 0xa5, 0x20));
}

fn bat(s: &mut impl Surface, f: &Figure) {
    let flap = (f.t * 0.02).sin();
    let fly = (f.t * 0.003 + f.x * 0.02).sin() * 0.12;
    let body = f.color(0x1a, 0x1a, 0x1a);
    let wing = f.color(0x2a, 0x2a, 0x2a);
    f.oval(s, 0.0, fly, 0.12, 0.15, body);
    let span = 0.2 + 0.1 * flap.abs();
    let lift = -0.1 * flap;
    f.rect(s, -0.12 - span, fly + lift - 0.05, span, 0.1, wing);
    f.rect(s, 0.12, fly + lift - 0.05, span, 0.1, wing);
    let eye = f.glow(0xff, 0, 0, 1.5);
    f.rect(s, -0.06, fly - 0.06, 0.04, 0.03, eye);
    f.rect(s, 0.02, fly - 0.06, 0.04, 0.03, eye);
}

fn cat(s: &mut impl Surface, f: &Figure) {
    let sway = (f.t * 0.003).sin() * 0.3;
    let fur = f.color(0x0a, 0x0a, 0x0a);
    f.oval(s, 0.0, 0.2, 0.3, 0.22, fur);
    f.oval(s, 0.0, -0.1, 0.2, 0.17, fur);
    f.rect(s, -0.18, -0.3, 0.1, 0.12, fur);
    f.rect(s, 0.08, -0.3, 0.1, 0.12, fur);
    f.rect(s, 0.28, 0.0 + sway * 0.2, 0.06, 0.3, fur);
    let blink = if (f.t * 0.002).sin() > 0.95 { 0.3 } else { 1.0 };
    let eye = f.glow(0xff, 0xff, 0x00, 1.5);
    f.oval(s, -0.08, -0.12, 0.05, 0.04 * blink, eye);
    f.oval(s, 0.08, -0.12, 0.05, 0.04 * blink, eye);
    f.rect(s, -0.02, -0.05, 0.04, 0.02, f.color(0xff, 0x69, 0xb4));
}

fn skeleton(s: &mut impl Surface, f: &Figure) {
    let rattle = (f.t * 0.01).sin() * 0.02;
    let bone = f.color(0xe8, 0xe8, 0xe8);
    let dark = f.color(0x1a, 0x1a, 0x1a);
    f.oval(s, rattle, -0.3, 0.18, 0.14, bone);
    f.oval(s, rattle - 0.07, -0.32, 0.05, 0.04, dark);
    f.oval(s, rattle + 0.07, -0.32, 0.05, 0.04, dark);
    let glint = f.glow(0, 0xff, 0, 1.5);
    f.rect(s, rattle - 0.08, -0.33, 0.02, 0.02, glint);
    f.rect(s, rattle + 0.06, -0.33, 0.02, 0.02, glint);
    f.rect(s, -0.03, -0.16, 0.06, 0.4, f.color(0xd0, 0xd0, 0xd0));
    for i in 0..4 {
        f.rect(s, -0.15, -0.12 + 0.07 * i as f64, 0.3, 0.03, bone);
    }
    f.rect(s, -0.25 - rattle, -0.12, 0.04, 0.35, bone);
    f.rect(s, 0.21 + rattle, -0.12, 0.04, 0.35, bone);
    f.rect(s, -0.12, 0.24, 0.04, 0.3, bone);
    f.rect(s, 0.08, 0.24, 0.04, 0.3, bone);
}

fn guide(s: &mut impl Surface, f: &Figure) {
    let bob = (f.t * 0.002).sin() * 0.08;
    f.rect(s, -0.45, 0.35 + bob, 0.9, 0.05, f.color(0x8b, 0x45, 0x13));
    f.rect(s, 0.35, 0.3 + bob, 0.15, 0.15, f.color(0xda, 0xa5, 0x20));
    f.rect(s, -0.2, -0.1 + bob, 0.4, 0.45, f.color(0x4a, 0x14, 0x8c));
    f.rect(s, -0.2, 0.3 + bob, 0.4, 0.04, f.color(0xff, 0x98, 0x00));
    f.oval(s, 0.0, -0.22 + bob, 0.14, 0.12, f.color(0xff, 0xd4, 0xb3));
    f.rect(s, -0.18, -0.3 + bob, 0.06, 0.25, f.color(0x8b, 0x69, 0x14));
    f.rect(s, 0.12, -0.3 + bob, 0.06, 0.25, f.color(0x8b, 0x69, 0x14));
    f.rect(s, -0.3, -0.38 + bob, 0.6, 0.05, f.color(0x4a, 0x14, 0x8c));
    f.rect(s, -0.1, -0.6 + bob, 0.2, 0.22, f.color(0x4a, 0x14, 0x8c));
    let blink = if (f.t * 0.002).sin() > 0.98 { 0.2 } else { 1.0 };
    let eye = f.color(0x30, 0x20, 0x10);
    f.oval(s, -0.05, -0.22 + bob, 0.03, 0.03 * blink, eye);
    f.oval(s, 0.05, -0.22 + bob, 0.03, 0.03 * blink, eye);
}

fn magic(s: &mut impl Surface, f: &Figure) {
    let pulse = 1.0 + (f.t * 0.02).sin() * 0.2;
    s.blend_ellipse(f.x, f.y, f.w * 0.3 * pulse, f.h * 0.3 * pulse, Rgb::new(200, 80, 255), 0.5);
    f.oval(s, 0.0, 0.0, 0.12 * pulse, 0.12 * pulse, f.glow(0xff, 0xcc, 0xff, 1.3));
}

fn burst(s: &mut impl Surface, f: &Figure) {
    let flicker = 0.8 + (f.t * 0.05).sin() * 0.2;
    s.blend_ellipse(f.x, f.y, f.w * 0.6, f.h * 0.6, Rgb::new(255, 120, 0), 0.6 * flicker);
    f.oval(s, 0.0, 0.0, 0.25, 0.25, f.glow(0xff, 0xee, 0x88, 1.4));
}
