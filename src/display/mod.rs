/// Terminal presentation: everything that writes to the terminal lives here.
///
/// The 3D view is a software framebuffer shown with half-block glyphs, two
/// pixel rows per terminal row, in 24-bit colour.  Row 0 carries the HUD,
/// the last row the controls or hint, and the rows between them the view.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use pumpkin_maze::hud::{Tone, UiSink};
use pumpkin_maze::surface::{Framebuffer, Rgb, Surface};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_BG: Color = Color::Rgb { r: 0x12, g: 0x0a, b: 0x1e };
const C_COLLECTED: Color = Color::Rgb { r: 0xff, g: 0x8c, b: 0x00 };
const C_TIMER: Color = Color::Rgb { r: 0xff, g: 0xeb, b: 0x3b };
const C_SOUND: Color = Color::Grey;
const C_HINT: Color = Color::DarkGrey;
const C_TITLE: Color = Color::Rgb { r: 0xff, g: 0x6d, b: 0x00 };

/// HUD rows around the view: one above, one below.
const CHROME_ROWS: u16 = 2;

/// Framebuffer size for a `cols`×`rows` terminal.
pub fn view_size(cols: u16, rows: u16) -> (usize, usize) {
    (cols as usize, rows.saturating_sub(CHROME_ROWS) as usize * 2)
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

fn tone_colors(tone: Tone) -> (Color, Color) {
    match tone {
        Tone::Info => (Color::White, Color::Rgb { r: 138, g: 43, b: 226 }),
        Tone::Progress => (Color::White, Color::Rgb { r: 255, g: 140, b: 0 }),
        Tone::Danger => (Color::White, Color::Rgb { r: 139, g: 0, b: 0 }),
        Tone::Triumph => (Color::Black, Color::Rgb { r: 255, g: 235, b: 59 }),
    }
}

// ── HUD panel ─────────────────────────────────────────────────────────────────

/// Latest HUD text as pushed by the game.
#[derive(Clone, Debug, Default)]
pub struct Panel {
    pub collected: String,
    pub timer: String,
    pub message: Option<String>,
    pub tone: Tone,
    pub hint: Option<String>,
    pub sound: Option<bool>,
}

/// [`UiSink`] writing into a [`Panel`] shared with the draw loop.
pub struct PanelSink(pub Rc<RefCell<Panel>>);

impl UiSink for PanelSink {
    fn set_collected(&mut self, text: &str) {
        self.0.borrow_mut().collected = text.to_string();
    }

    fn set_timer(&mut self, text: &str) {
        self.0.borrow_mut().timer = text.to_string();
    }

    fn set_message(&mut self, text: Option<&str>, tone: Tone) {
        let mut panel = self.0.borrow_mut();
        panel.message = text.map(str::to_string);
        panel.tone = tone;
    }

    fn set_hint(&mut self, text: Option<&str>) {
        self.0.borrow_mut().hint = text.map(str::to_string);
    }

    fn set_sound_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().sound = Some(enabled);
    }
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// Draw one complete frame: HUD row, view, banner, bottom row.
pub fn draw_frame<W: Write>(
    out: &mut W,
    fb: &Framebuffer,
    panel: &Panel,
    cols: u16,
    rows: u16,
    ended: bool,
) -> std::io::Result<()> {
    draw_hud(out, panel, cols)?;
    draw_view(out, fb, 1)?;
    if let Some(message) = &panel.message {
        draw_banner(out, message, panel.tone, cols, rows)?;
    }
    draw_bottom(out, panel, cols, rows, ended)?;

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()
}

fn draw_hud<W: Write>(out: &mut W, panel: &Panel, cols: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(style::SetBackgroundColor(C_HUD_BG))?;
    out.queue(Print(" ".repeat(cols as usize)))?;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_COLLECTED))?;
    out.queue(Print(format!("Pumpkins {}", panel.collected)))?;

    let timer = format!("⏱ {}", panel.timer);
    let tx = (cols / 2).saturating_sub(timer.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(tx, 0))?;
    out.queue(style::SetForegroundColor(C_TIMER))?;
    out.queue(Print(&timer))?;

    let sound = match panel.sound {
        Some(true) => "Sound: on",
        Some(false) => "Sound: off",
        None => "Sound: n/a",
    };
    let sx = cols.saturating_sub(sound.len() as u16 + 1);
    out.queue(cursor::MoveTo(sx, 0))?;
    out.queue(style::SetForegroundColor(C_SOUND))?;
    out.queue(Print(sound))?;
    out.queue(style::ResetColor)?;
    Ok(())
}

/// Present `fb` starting at terminal row `top`.  Runs of cells sharing the
/// same colour pair are printed together.
fn draw_view<W: Write>(out: &mut W, fb: &Framebuffer, top: u16) -> std::io::Result<()> {
    let mut run = String::new();
    for row in 0..fb.height() / 2 {
        out.queue(cursor::MoveTo(0, top + row as u16))?;
        let mut current: Option<(Rgb, Rgb)> = None;
        for x in 0..fb.width() {
            let upper = fb.pixel(x, row * 2).unwrap_or(Rgb::BLACK);
            let lower = fb.pixel(x, row * 2 + 1).unwrap_or(Rgb::BLACK);
            if current != Some((upper, lower)) {
                if !run.is_empty() {
                    out.queue(Print(&run))?;
                    run.clear();
                }
                out.queue(style::SetForegroundColor(rgb(upper)))?;
                out.queue(style::SetBackgroundColor(rgb(lower)))?;
                current = Some((upper, lower));
            }
            run.push('▀');
        }
        if !run.is_empty() {
            out.queue(Print(&run))?;
            run.clear();
        }
    }
    out.queue(style::ResetColor)?;
    Ok(())
}

fn draw_banner<W: Write>(
    out: &mut W,
    message: &str,
    tone: Tone,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let (fg, bg) = tone_colors(tone);
    let text: String = format!("  {message}  ").chars().take(cols as usize).collect();
    let width = text.chars().count() as u16;
    let x = (cols / 2).saturating_sub(width / 2);
    let y = rows / 2;

    out.queue(style::SetForegroundColor(fg))?;
    out.queue(style::SetBackgroundColor(bg))?;
    for (dy, line) in [(0, " ".repeat(width as usize)), (1, text), (2, " ".repeat(width as usize))] {
        out.queue(cursor::MoveTo(x, (y + dy).saturating_sub(1)))?;
        out.queue(Print(line))?;
    }
    out.queue(style::ResetColor)?;
    Ok(())
}

fn draw_bottom<W: Write>(
    out: &mut W,
    panel: &Panel,
    cols: u16,
    rows: u16,
    ended: bool,
) -> std::io::Result<()> {
    let row = rows.saturating_sub(1);
    out.queue(cursor::MoveTo(0, row))?;
    out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
    out.queue(cursor::MoveTo(1, row))?;
    let text = if ended {
        "R : Play again   Q : Quit".to_string()
    } else if let Some(hint) = &panel.hint {
        hint.clone()
    } else {
        "← → : Turn   ↑ ↓ : Move   S : Sound   A : Ambient   Q : Quit".to_string()
    };
    out.queue(style::SetForegroundColor(C_HINT))?;
    let visible: String = text.chars().take(cols.saturating_sub(2) as usize).collect();
    out.queue(Print(visible))?;
    Ok(())
}

// ── Title screen ──────────────────────────────────────────────────────────────

pub fn draw_title<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let cx = cols / 2;
    let cy = rows / 2;

    let lines: &[(&str, Color)] = &[
        ("🎃  PUMPKIN  MAZE  🎃", C_TITLE),
        ("", Color::Reset),
        ("The little witch needs pumpkins for tonight's festival.", Color::White),
        ("Find her, gather every pumpkin, and bring them back.", Color::White),
        ("Then... run.", Color::Red),
        ("", Color::Reset),
        ("ENTER : Start   Q : Quit", Color::Grey),
        ("← → : Turn   ↑ ↓ : Move   S : Sound   A : Ambient", C_HINT),
    ];

    let start = cy.saturating_sub(lines.len() as u16 / 2);
    for (i, (text, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*text))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()
}

/// Clear the whole terminal, e.g. after a resize.
pub fn clear<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.flush()
}

