/// HUD text: what the collected counter, timer, banner and hint should
/// say for the current state, and the optional sink that displays it.

use crate::phase::{GameState, Phase};

/// Colour class of the banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Info,
    Progress,
    Danger,
    Triumph,
}

/// Display targets for the HUD.  Layout belongs to the implementor.
pub trait UiSink {
    fn set_collected(&mut self, text: &str);
    fn set_timer(&mut self, text: &str);
    /// `None` hides the banner.
    fn set_message(&mut self, text: Option<&str>, tone: Tone);
    fn set_hint(&mut self, text: Option<&str>);
    fn set_sound_enabled(&mut self, enabled: bool);
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HudText {
    pub collected: String,
    pub timer: String,
    pub message: Option<String>,
    pub tone: Tone,
    pub hint: Option<String>,
}

const FIND_GUIDE: &str = "Find the little witch and walk up to her!";

impl HudText {
    pub fn compose(state: &GameState, now: u64, escape_duration_ms: u64) -> Self {
        let timers = &state.timers;

        let collected = match state.phase {
            Phase::Escape | Phase::GameOver => hearts(state.hp, state.max_hp),
            _ => format!("{} / {}", state.collected.len(), state.total_pumpkins),
        };

        let timer = match state.phase {
            Phase::Escape => {
                let left = escape_duration_ms.saturating_sub(state.escape_elapsed(now));
                format!("{:.1}s left", left as f64 / 1000.0)
            }
            Phase::Collect | Phase::Return => {
                let start = timers.collect_start.unwrap_or(timers.game_start);
                format!("{:.1}s", now.saturating_sub(start) as f64 / 1000.0)
            }
            Phase::Victory => match state.final_time_secs {
                Some(secs) => format!("Time {secs:.2}s"),
                None => "-".to_string(),
            },
            _ => "-".to_string(),
        };

        let mut hint = None;
        let (message, tone) = match state.phase {
            Phase::Intro if now < timers.intro_overlay_until => {
                (Some(FIND_GUIDE.to_string()), Tone::Info)
            }
            Phase::Intro => {
                hint = Some(FIND_GUIDE.to_string());
                (None, Tone::Info)
            }
            Phase::Collect if now < timers.collect_banner_until => (
                Some("Witch: Bring me every pumpkin in town!".to_string()),
                Tone::Info,
            ),
            Phase::Return if now < timers.return_banner_until => (
                Some("All pumpkins collected! Head back to the witch!".to_string()),
                Tone::Progress,
            ),
            Phase::Betrayal => (
                Some("Witch: Heh heh... you were the sacrifice all along! Get them!".to_string()),
                Tone::Danger,
            ),
            Phase::Escape if now < timers.escape_banner_until => (
                Some(format!(
                    "Run! Survive the chase for {} seconds!",
                    escape_duration_ms / 1000
                )),
                Tone::Danger,
            ),
            Phase::GameOver => (
                Some("Game over. The monsters caught you... Press R to retry".to_string()),
                Tone::Danger,
            ),
            Phase::Victory => {
                let secs = state.final_time_secs.unwrap_or_else(|| {
                    let start = timers.collect_start.unwrap_or(timers.game_start);
                    now.saturating_sub(start) as f64 / 1000.0
                });
                (
                    Some(format!("Victory! You escaped the ritual! Time: {secs:.2}s")),
                    Tone::Triumph,
                )
            }
            _ => (None, Tone::Info),
        };

        HudText {
            collected,
            timer,
            message,
            tone,
            hint,
        }
    }
}

/// One filled heart per HP left, one hollow heart per HP lost.
pub fn hearts(hp: i32, max_hp: i32) -> String {
    let full = hp.clamp(0, max_hp.max(0)) as usize;
    let empty = max_hp.max(0) as usize - full;
    format!("{}{}", "♥".repeat(full), "♡".repeat(empty))
}

// ── Optional sink ─────────────────────────────────────────────────────────────

/// Presence-checked [`UiSink`] that only forwards fields that changed.
#[derive(Default)]
pub struct Hud {
    sink: Option<Box<dyn UiSink>>,
    last: Option<HudText>,
    sound_enabled: Option<bool>,
}

impl Hud {
    pub fn new(sink: Box<dyn UiSink>) -> Self {
        Hud {
            sink: Some(sink),
            last: None,
            sound_enabled: None,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_present(&self) -> bool {
        self.sink.is_some()
    }

    /// Most recent text, whether or not a sink is attached.
    pub fn current(&self) -> Option<&HudText> {
        self.last.as_ref()
    }

    pub fn update(&mut self, text: HudText) {
        if let Some(sink) = self.sink.as_mut() {
            let prev = self.last.as_ref();
            if prev.map(|p| &p.collected) != Some(&text.collected) {
                sink.set_collected(&text.collected);
            }
            if prev.map(|p| &p.timer) != Some(&text.timer) {
                sink.set_timer(&text.timer);
            }
            if prev.map(|p| (&p.message, p.tone)) != Some((&text.message, text.tone)) {
                sink.set_message(text.message.as_deref(), text.tone);
            }
            if prev.map(|p| &p.hint) != Some(&text.hint) {
                sink.set_hint(text.hint.as_deref());
            }
        }
        self.last = Some(text);
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = Some(enabled);
        if let Some(sink) = self.sink.as_mut() {
            sink.set_sound_enabled(enabled);
        }
    }

    pub fn sound_enabled(&self) -> Option<bool> {
        self.sound_enabled
    }
}
