//! Static level description (loadable from JSON) and the runtime lists the
//! world mutates: enemies, pickups and background layers.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::animation::SpriteId;
use crate::collision::{Body, Inset, Rect};
use crate::endboss::{self, Endboss};
use crate::enemy::Enemy;
use crate::sim::{Ctx, VIEW_HEIGHT, VIEW_WIDTH};
use crate::sprites;

/// Background segments overlap by one unit to hide seams.
pub const SEGMENT_STRIDE: f32 = VIEW_WIDTH - 1.0;

pub const COIN_SIZE: f32 = 100.0;
pub const COIN_OFFSET: Inset = Inset::new(35.0, 35.0, 70.0, 70.0);
pub const AMMO_SIZE: f32 = 80.0;
pub const AMMO_OFFSET: Inset = Inset::new(20.0, 20.0, 40.0, 40.0);
const BOB_STEP: f32 = 0.08;
const BOB_AMPLITUDE: f32 = 4.0;

// ── Level data ────────────────────────────────────────────────────────────────

/// An orc in the roster. Without an explicit `x` the world picks one
/// inside the level's spawn band.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrcSpawn {
    #[serde(default)]
    pub x: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickupSpawn {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default = "default_level_end_x")]
    pub level_end_x: f32,
    #[serde(default = "default_boss_x")]
    pub boss_x: f32,
    #[serde(default = "default_boss_trigger_x")]
    pub boss_trigger_x: f32,
    #[serde(default = "default_orc_band")]
    pub orc_band: (f32, f32),
    #[serde(default = "default_orc_min_gap")]
    pub orc_min_gap: f32,
    #[serde(default = "default_background_segments")]
    pub background_segments: u32,
    #[serde(default)]
    pub orcs: Vec<OrcSpawn>,
    #[serde(default)]
    pub coins: Vec<PickupSpawn>,
    #[serde(default)]
    pub ammo: Vec<PickupSpawn>,
}

fn default_level_end_x() -> f32 {
    4400.0
}

fn default_boss_x() -> f32 {
    endboss::SPAWN_X
}

fn default_boss_trigger_x() -> f32 {
    3500.0
}

fn default_orc_band() -> (f32, f32) {
    (700.0, 3000.0)
}

fn default_orc_min_gap() -> f32 {
    120.0
}

fn default_background_segments() -> u32 {
    8
}

impl LevelData {
    /// Level geometry with no enemies and no pickups.
    pub fn empty() -> Self {
        Self {
            level_end_x: default_level_end_x(),
            boss_x: default_boss_x(),
            boss_trigger_x: default_boss_trigger_x(),
            orc_band: default_orc_band(),
            orc_min_gap: default_orc_min_gap(),
            background_segments: default_background_segments(),
            orcs: Vec::new(),
            coins: Vec::new(),
            ammo: Vec::new(),
        }
    }

    /// The built-in first level.
    pub fn level_one() -> Self {
        let coin = |x, y| PickupSpawn { x, y };
        Self {
            orcs: vec![OrcSpawn::default(); 10],
            coins: vec![
                coin(450.0, 300.0),
                coin(800.0, 150.0),
                coin(1100.0, 300.0),
                coin(1450.0, 150.0),
                coin(1750.0, 300.0),
                coin(2100.0, 150.0),
                coin(2400.0, 300.0),
                coin(2700.0, 150.0),
                coin(3000.0, 300.0),
                coin(3300.0, 150.0),
            ],
            ammo: [600.0, 950.0, 1300.0, 1600.0, 1950.0, 2300.0, 2650.0, 3200.0]
                .into_iter()
                .map(|x| PickupSpawn { x, y: 350.0 })
                .collect(),
            ..Self::empty()
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl Default for LevelData {
    fn default() -> Self {
        Self::level_one()
    }
}

// ── Runtime pieces ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundLayer {
    pub sprite: SpriteId,
    pub x: f32,
}

impl BackgroundLayer {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, 0.0, VIEW_WIDTH, VIEW_HEIGHT)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupKind {
    Coin,
    Ammo,
}

#[derive(Clone, Debug)]
pub struct Pickup {
    pub kind: PickupKind,
    body: Body,
    base_y: f32,
    phase: f32,
}

impl Pickup {
    pub fn new(kind: PickupKind, x: f32, y: f32) -> Self {
        let body = match kind {
            PickupKind::Coin => Body::new(x, y, COIN_SIZE, COIN_SIZE, COIN_OFFSET, sprites::COIN[0]),
            PickupKind::Ammo => Body::new(x, y, AMMO_SIZE, AMMO_SIZE, AMMO_OFFSET, sprites::AMMO[0]),
        };
        // Start phase from x so neighbouring pickups don't bob in lockstep.
        Self { kind, body, base_y: y, phase: x * 0.01 }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn hitbox(&self) -> Rect {
        self.body.hitbox()
    }

    pub fn bob(&mut self) {
        self.phase += BOB_STEP;
        self.body.y = self.base_y + self.phase.sin() * BOB_AMPLITUDE;
        if self.kind == PickupKind::Coin {
            let frame = (self.phase / std::f32::consts::PI) as usize % sprites::COIN.len();
            self.body.sprite = sprites::COIN[frame];
        }
    }
}

/// Runtime state of the level being played.
#[derive(Clone, Debug)]
pub struct Level {
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Pickup>,
    pub ammo: Vec<Pickup>,
    pub backgrounds: Vec<BackgroundLayer>,
    end_x: f32,
    boss_x: f32,
    boss_trigger_x: f32,
    boss_spawned: bool,
}

impl Level {
    /// Builds pickups and backgrounds. Enemies are spawned by the world,
    /// which owns the clock and the orc registry.
    pub fn new(data: &LevelData) -> Self {
        let backgrounds = (0..data.background_segments)
            .flat_map(|segment| {
                let x = (segment as f32 - 1.0) * SEGMENT_STRIDE;
                sprites::BACKGROUND_LAYERS
                    .iter()
                    .map(move |&sprite| BackgroundLayer { sprite, x })
            })
            .collect();
        Self {
            enemies: Vec::new(),
            coins: data.coins.iter().map(|p| Pickup::new(PickupKind::Coin, p.x, p.y)).collect(),
            ammo: data.ammo.iter().map(|p| Pickup::new(PickupKind::Ammo, p.x, p.y)).collect(),
            backgrounds,
            end_x: data.level_end_x,
            boss_x: data.boss_x,
            boss_trigger_x: data.boss_trigger_x,
            boss_spawned: false,
        }
    }

    pub fn end_x(&self) -> f32 {
        self.end_x
    }

    pub fn boss_trigger_x(&self) -> f32 {
        self.boss_trigger_x
    }

    pub fn is_boss_spawned(&self) -> bool {
        self.boss_spawned
    }

    /// Appends the boss the first time the character passes the trigger.
    pub fn try_spawn_boss(&mut self, character_x: f32, ctx: &mut Ctx) -> bool {
        if self.boss_spawned || character_x <= self.boss_trigger_x {
            return false;
        }
        self.boss_spawned = true;
        self.enemies.push(Enemy::Endboss(Endboss::spawn(self.boss_x, ctx)));
        info!(boss_x = self.boss_x, character_x, "boss_spawned");
        true
    }
}
