/// All game entity types: pure data, no logic beyond small accessors.

use std::fmt;

// ── Pose ──────────────────────────────────────────────────────────────────────

/// Player position in cell units and heading in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Pose { x, y, angle }
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        distance(self.x, self.y, x, y)
    }
}

pub fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = bx - ax;
    let dy = by - ay;
    (dx * dx + dy * dy).sqrt()
}

// ── Cell keys ─────────────────────────────────────────────────────────────────

/// Identity of a pickup: the grid cell it originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub x: i64,
    pub y: i64,
}

impl CellKey {
    pub fn from_pos(x: f64, y: f64) -> Self {
        CellKey {
            x: x.floor() as i64,
            y: y.floor() as i64,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

// ── Sprite kinds ──────────────────────────────────────────────────────────────

/// Everything the compositor knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Ghost,
    Pumpkin,
    Lantern,
    Sign,
    Gravestone,
    Witch,
    Bat,
    Cat,
    Skeleton,
    Guide,
    /// Magic projectile fired by the hostile guide.
    Magic,
    /// Bat detonation flash.
    Burst,
}

impl SpriteKind {
    /// Map a grid marker code (2..=11) to its sprite.
    pub fn from_code(code: u8) -> Option<SpriteKind> {
        match code {
            2 => Some(SpriteKind::Ghost),
            3 => Some(SpriteKind::Pumpkin),
            4 => Some(SpriteKind::Lantern),
            5 => Some(SpriteKind::Sign),
            6 => Some(SpriteKind::Gravestone),
            7 => Some(SpriteKind::Witch),
            8 => Some(SpriteKind::Bat),
            9 => Some(SpriteKind::Cat),
            10 => Some(SpriteKind::Skeleton),
            11 => Some(SpriteKind::Guide),
            _ => None,
        }
    }

    /// Kinds that roam and chase once the escape begins.
    pub fn is_roaming_enemy(self) -> bool {
        matches!(self, SpriteKind::Ghost | SpriteKind::Witch | SpriteKind::Skeleton)
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Ghost,
    Witch,
    Skeleton,
    Cat,
    /// The guide after the betrayal.
    Guide,
}

impl EnemyKind {
    /// Roaming enemy seeded from a grid marker.  Cats are handled
    /// separately because they start out friendly.
    pub fn from_code(code: u8) -> Option<EnemyKind> {
        match code {
            2 => Some(EnemyKind::Ghost),
            7 => Some(EnemyKind::Witch),
            10 => Some(EnemyKind::Skeleton),
            _ => None,
        }
    }

    pub fn sprite(self) -> SpriteKind {
        match self {
            EnemyKind::Ghost => SpriteKind::Ghost,
            EnemyKind::Witch => SpriteKind::Witch,
            EnemyKind::Skeleton => SpriteKind::Skeleton,
            EnemyKind::Cat => SpriteKind::Cat,
            EnemyKind::Guide => SpriteKind::Guide,
        }
    }

    /// Only ghosts drift through walls.
    pub fn passes_walls(self) -> bool {
        self == EnemyKind::Ghost
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub x: f64,
    pub y: f64,
    pub base_speed: f64,
    /// `base_speed` scaled by the current difficulty tier.
    pub speed: f64,
    /// Last ranged attack, for kinds that have one.
    pub last_attack: Option<u64>,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f64, y: f64, base_speed: f64) -> Self {
        Enemy {
            kind,
            x,
            y,
            base_speed,
            speed: base_speed,
            last_attack: None,
        }
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Straight-flying magic bolt.  Velocity is fixed at launch.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub created_at: u64,
}

// ── Pickups & hazards ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Pumpkin {
    pub x: f64,
    pub y: f64,
}

impl Pumpkin {
    pub fn key(&self) -> CellKey {
        CellKey::from_pos(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HazardKind {
    /// Heals one HP when touched.
    Lantern,
    /// Detonates when approached.
    Bat,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hazard {
    pub kind: HazardKind,
    pub x: f64,
    pub y: f64,
}

impl Hazard {
    pub fn key(&self) -> CellKey {
        CellKey::from_pos(self.x, self.y)
    }
}

/// Short-lived detonation visual left by a bat.
#[derive(Clone, Debug, PartialEq)]
pub struct Burst {
    pub x: f64,
    pub y: f64,
    pub created_at: u64,
}

pub const BURST_LIFETIME_MS: u64 = 600;

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Index into an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Id(usize);

impl Id {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Slot list for dynamic entities.  Removal frees a slot for reuse instead
/// of shifting later entries, so ids stay stable while an entity lives.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> Id {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                Id(index)
            }
            None => {
                self.slots.push(Some(value));
                Id(self.slots.len() - 1)
            }
        }
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: Id) -> Option<T> {
        let taken = self.slots.get_mut(id.0).and_then(Option::take);
        if taken.is_some() {
            self.free.push(id.0);
            self.live -= 1;
        }
        taken
    }

    /// Drop every entity for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|value| !keep(value)) {
                *slot = None;
                self.free.push(index);
                self.live -= 1;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|value| (Id(i), value)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Id, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|value| (Id(i), value)))
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
