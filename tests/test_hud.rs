use std::cell::RefCell;
use std::rc::Rc;

use pumpkin_maze::hud::*;
use pumpkin_maze::phase::{GameState, Phase, INTRO_OVERLAY_MS};

const ESCAPE_MS: u64 = 60_000;

fn collecting(collect_start: u64) -> GameState {
    let mut state = GameState::new(3, 5, 0);
    state.phase = Phase::Collect;
    state.timers.collect_start = Some(collect_start);
    state.timers.collect_banner_until = collect_start + 2000;
    state
}

#[test]
fn hearts_show_hp_left_and_lost() {
    assert_eq!(hearts(3, 3), "♥♥♥");
    assert_eq!(hearts(1, 3), "♥♡♡");
    assert_eq!(hearts(0, 3), "♡♡♡");
    assert_eq!(hearts(-2, 3), "♡♡♡");
}

#[test]
fn intro_message_shrinks_to_a_hint() {
    let state = GameState::new(3, 5, 0);
    let early = HudText::compose(&state, 100, ESCAPE_MS);
    assert!(early.message.is_some());
    assert_eq!(early.hint, None);
    assert_eq!(early.collected, "0 / 5");
    assert_eq!(early.timer, "-");

    let late = HudText::compose(&state, INTRO_OVERLAY_MS, ESCAPE_MS);
    assert_eq!(late.message, None);
    assert_eq!(late.hint, early.message);
}

#[test]
fn collect_counts_pumpkins_and_time() {
    let mut state = collecting(1000);
    state.collected.insert(pumpkin_maze::entities::CellKey { x: 1, y: 1 });
    let text = HudText::compose(&state, 2500, ESCAPE_MS);
    assert_eq!(text.collected, "1 / 5");
    assert_eq!(text.timer, "1.5s");
    assert!(text.message.is_some());

    let later = HudText::compose(&state, 3000, ESCAPE_MS);
    assert_eq!(later.message, None);
}

#[test]
fn escape_shows_hearts_and_countdown() {
    let mut state = GameState::new(3, 5, 0);
    state.phase = Phase::Escape;
    state.hp = 2;
    state.timers.escape_start = Some(10_000);
    state.timers.escape_banner_until = 13_500;

    let text = HudText::compose(&state, 11_000, ESCAPE_MS);
    assert_eq!(text.collected, "♥♥♡");
    assert_eq!(text.timer, "59.0s left");
    assert_eq!(text.tone, Tone::Danger);
    assert!(text.message.unwrap().contains("60"));

    let quiet = HudText::compose(&state, 20_000, ESCAPE_MS);
    assert_eq!(quiet.message, None);
    assert_eq!(quiet.timer, "50.0s left");
}

#[test]
fn endings_have_their_own_banners() {
    let mut state = GameState::new(3, 5, 0);
    state.phase = Phase::Victory;
    state.final_time_secs = Some(63.2);
    let won = HudText::compose(&state, 99_000, ESCAPE_MS);
    assert_eq!(won.timer, "Time 63.20s");
    assert_eq!(won.tone, Tone::Triumph);
    assert!(won.message.unwrap().contains("63.20"));

    state.phase = Phase::GameOver;
    state.hp = 0;
    let lost = HudText::compose(&state, 99_000, ESCAPE_MS);
    assert_eq!(lost.collected, "♡♡♡");
    assert_eq!(lost.tone, Tone::Danger);
    assert!(lost.message.is_some());
}

// ── Sink ──────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Calls {
    collected: usize,
    timer: usize,
    message: usize,
    hint: usize,
    sound: Vec<bool>,
}

struct Recorder(Rc<RefCell<Calls>>);

impl UiSink for Recorder {
    fn set_collected(&mut self, _text: &str) {
        self.0.borrow_mut().collected += 1;
    }
    fn set_timer(&mut self, _text: &str) {
        self.0.borrow_mut().timer += 1;
    }
    fn set_message(&mut self, _text: Option<&str>, _tone: Tone) {
        self.0.borrow_mut().message += 1;
    }
    fn set_hint(&mut self, _text: Option<&str>) {
        self.0.borrow_mut().hint += 1;
    }
    fn set_sound_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().sound.push(enabled);
    }
}

#[test]
fn hud_pushes_only_changed_fields() {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let mut hud = Hud::new(Box::new(Recorder(Rc::clone(&calls))));
    let state = collecting(0);

    hud.update(HudText::compose(&state, 100, ESCAPE_MS));
    hud.update(HudText::compose(&state, 100, ESCAPE_MS));
    {
        let c = calls.borrow();
        assert_eq!((c.collected, c.timer, c.message, c.hint), (1, 1, 1, 1));
    }

    hud.update(HudText::compose(&state, 1100, ESCAPE_MS));
    let c = calls.borrow();
    assert_eq!(c.timer, 2);
    assert_eq!(c.collected, 1);
    assert_eq!(c.message, 1);
}

#[test]
fn hud_without_sink_still_tracks_text() {
    let mut hud = Hud::none();
    assert!(!hud.is_present());
    hud.update(HudText::compose(&collecting(0), 100, ESCAPE_MS));
    assert_eq!(hud.current().unwrap().collected, "0 / 5");
    hud.set_sound_enabled(false);
    assert_eq!(hud.sound_enabled(), Some(false));
}

#[test]
fn sound_state_is_forwarded() {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let mut hud = Hud::new(Box::new(Recorder(Rc::clone(&calls))));
    hud.set_sound_enabled(true);
    hud.set_sound_enabled(false);
    assert_eq!(calls.borrow().sound, vec![true, false]);
}
