/// Sound collaborator port.
///
/// The game only ever notifies the sound system; it never waits on it and
/// only reads back the on/off state after a toggle.  A session without a
/// sound system uses an empty [`SoundSink`] and every call becomes a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Named one-shot cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Footstep,
    Door,
    Ghost,
    Pumpkin,
    Jump,
    Victory,
    WitchLaugh,
    Magic,
    Heal,
    Explosion,
}

impl Cue {
    pub fn as_str(self) -> &'static str {
        match self {
            Cue::Footstep => "footstep",
            Cue::Door => "door",
            Cue::Ghost => "ghost",
            Cue::Pumpkin => "pumpkin",
            Cue::Jump => "jump",
            Cue::Victory => "victory",
            Cue::WitchLaugh => "witchLaugh",
            Cue::Magic => "magic",
            Cue::Heal => "heal",
            Cue::Explosion => "explosion",
        }
    }
}

pub trait SoundPort {
    fn play(&mut self, cue: Cue);
    fn play_footstep(&mut self, moving: bool);
    fn resume_audio(&mut self);
    /// Flip sound on/off and report the new state.
    fn toggle_sound(&mut self) -> bool;
    fn toggle_ambient(&mut self);
    /// Distance to the closest chasing enemy (`f64::INFINITY` when none).
    fn update_enemy_proximity(&mut self, distance: f64);
    fn update_cat_proximity(&mut self, distance: f64);
    fn stop_heartbeat(&mut self);
    fn stop_warning(&mut self);
}

// ── Optional sink ─────────────────────────────────────────────────────────────

/// Presence-checked handle on an optional [`SoundPort`].
#[derive(Default)]
pub struct SoundSink {
    port: Option<Box<dyn SoundPort>>,
}

impl SoundSink {
    pub fn new(port: Box<dyn SoundPort>) -> Self {
        SoundSink { port: Some(port) }
    }

    pub fn none() -> Self {
        SoundSink { port: None }
    }

    pub fn is_present(&self) -> bool {
        self.port.is_some()
    }

    pub fn play(&mut self, cue: Cue) {
        if let Some(port) = self.port.as_mut() {
            port.play(cue);
        }
    }

    pub fn play_footstep(&mut self, moving: bool) {
        if let Some(port) = self.port.as_mut() {
            port.play_footstep(moving);
        }
    }

    pub fn resume_audio(&mut self) {
        if let Some(port) = self.port.as_mut() {
            port.resume_audio();
        }
    }

    /// `None` when no sound system is attached.
    pub fn toggle_sound(&mut self) -> Option<bool> {
        self.port.as_mut().map(|port| port.toggle_sound())
    }

    pub fn toggle_ambient(&mut self) {
        if let Some(port) = self.port.as_mut() {
            port.toggle_ambient();
        }
    }

    pub fn update_enemy_proximity(&mut self, distance: f64) {
        if let Some(port) = self.port.as_mut() {
            port.update_enemy_proximity(distance);
        }
    }

    pub fn update_cat_proximity(&mut self, distance: f64) {
        if let Some(port) = self.port.as_mut() {
            port.update_cat_proximity(distance);
        }
    }

    pub fn stop_heartbeat(&mut self) {
        if let Some(port) = self.port.as_mut() {
            port.stop_heartbeat();
        }
    }

    pub fn stop_warning(&mut self) {
        if let Some(port) = self.port.as_mut() {
            port.stop_warning();
        }
    }
}

// ── Terminal implementation ───────────────────────────────────────────────────

/// Distance under which the heartbeat cue runs.
const HEARTBEAT_RANGE: f64 = 3.0;
/// Distance under which the warning cue joins the heartbeat.
const WARNING_RANGE: f64 = 1.5;

/// Sound port for a terminal without an audio device: tracks the on/off
/// and continuous-cue state, logs every cue, and rings the terminal bell
/// for cues that signal danger.
#[derive(Debug)]
pub struct LogSound {
    enabled: bool,
    ambient: bool,
    heartbeat: bool,
    warning: bool,
    /// Pending bell, shared with the front end that rings it.
    bell: Arc<AtomicBool>,
}

impl Default for LogSound {
    fn default() -> Self {
        LogSound {
            enabled: true,
            ambient: false,
            heartbeat: false,
            warning: false,
            bell: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl LogSound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn heartbeat(&self) -> bool {
        self.heartbeat
    }

    pub fn warning(&self) -> bool {
        self.warning
    }

    /// Flag raised whenever a danger cue plays; the holder swaps it back
    /// to `false` when it rings the bell.
    pub fn bell_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.bell)
    }
}

impl SoundPort for LogSound {
    fn play(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        debug!(cue = cue.as_str(), "sound");
        if matches!(cue, Cue::Ghost | Cue::Explosion | Cue::Magic) {
            self.bell.store(true, Ordering::Relaxed);
        }
    }

    fn play_footstep(&mut self, moving: bool) {
        if moving {
            self.play(Cue::Footstep);
        }
    }

    fn resume_audio(&mut self) {}

    fn toggle_sound(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.ambient = false;
            self.heartbeat = false;
            self.warning = false;
        }
        debug!(enabled = self.enabled, "sound toggled");
        self.enabled
    }

    fn toggle_ambient(&mut self) {
        if self.enabled {
            self.ambient = !self.ambient;
            debug!(ambient = self.ambient, "ambient toggled");
        }
    }

    fn update_enemy_proximity(&mut self, distance: f64) {
        if !self.enabled {
            self.heartbeat = false;
            self.warning = false;
            return;
        }
        self.heartbeat = distance < HEARTBEAT_RANGE;
        self.warning = distance < WARNING_RANGE;
    }

    fn update_cat_proximity(&mut self, distance: f64) {
        if self.enabled && distance < WARNING_RANGE {
            debug!(distance, "cat nearby");
        }
    }

    fn stop_heartbeat(&mut self) {
        self.heartbeat = false;
    }

    fn stop_warning(&mut self) {
        self.warning = false;
    }
}
