//! Sprite-sequence tables. Pure data; the front end decides how an id is
//! actually painted.

use crate::animation::Sequence;

macro_rules! frames {
    ($prefix:literal; $($n:literal),+) => {
        &[$(concat!($prefix, "_", $n)),+]
    };
}

// ── Character ─────────────────────────────────────────────────────────────────

pub const CHARACTER_IDLE: Sequence = frames!("character/idle"; 0, 1, 2, 3, 4, 5, 6, 7, 8, 9);
pub const CHARACTER_LONG_IDLE: Sequence =
    frames!("character/long_idle"; 0, 1, 2, 3, 4, 5, 6, 7, 8, 9);
pub const CHARACTER_WALK: Sequence = frames!("character/walk"; 0, 1, 2, 3, 4, 5);
pub const CHARACTER_JUMP: Sequence = frames!("character/jump"; 0, 1, 2, 3, 4, 5, 6, 7, 8);
pub const CHARACTER_HURT: Sequence = frames!("character/hurt"; 0, 1, 2);
pub const CHARACTER_DEAD: Sequence = frames!("character/dead"; 0, 1, 2, 3, 4, 5, 6);
pub const CHARACTER_MELEE: Sequence = frames!("character/melee"; 0, 1, 2, 3, 4);
pub const CHARACTER_THROW: Sequence = frames!("character/throw"; 0, 1, 2, 3, 4);

// ── Orc ───────────────────────────────────────────────────────────────────────

pub const ORC_WALK: Sequence = frames!("orc/walk"; 0, 1, 2, 3, 4, 5);
pub const ORC_DEAD: Sequence = frames!("orc/dead"; 0, 1, 2, 3, 4, 5);

// ── Endboss ───────────────────────────────────────────────────────────────────

pub const BOSS_IDLE: Sequence = frames!("endboss/idle"; 0, 1, 2, 3);
pub const BOSS_ALERT: Sequence = frames!("endboss/alert"; 0, 1, 2, 3, 4, 5, 6, 7);
pub const BOSS_WALK: Sequence = frames!("endboss/walk"; 0, 1, 2, 3);
pub const BOSS_ATTACK: Sequence = frames!("endboss/attack"; 0, 1, 2, 3, 4, 5, 6, 7, 8, 9);
pub const BOSS_HURT: Sequence = frames!("endboss/hurt"; 0, 1, 2);
pub const BOSS_DEAD: Sequence = frames!("endboss/dead"; 0, 1, 2);

// ── Projectiles, pickups, effects ─────────────────────────────────────────────

pub const PROJECTILE_SPIN: Sequence = frames!("projectile/spin"; 0, 1, 2, 3);
pub const SPLASH: Sequence = frames!("effect/splash"; 0, 1, 2, 3, 4, 5);
pub const COIN: Sequence = frames!("pickup/coin"; 0, 1);
pub const AMMO: Sequence = frames!("pickup/ammo"; 0);

// ── Background ────────────────────────────────────────────────────────────────

/// Parallax layers of one background segment, back to front.
pub const BACKGROUND_LAYERS: Sequence = &[
    "background/sky",
    "background/clouds",
    "background/hills",
    "background/ground",
];
