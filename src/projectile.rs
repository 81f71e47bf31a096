//! Thrown projectiles and their impact splash.

use crate::animation::{Animation, OneShot};
use crate::collision::{Body, Inset, Rect};
use crate::sim::{Ctx, EffectId, ProjectileId, Task};
use crate::sprites;
use crate::timers::TimerId;

pub const FLIGHT_MS: u64 = 25;
pub const WIDTH: f32 = 50.0;
pub const HEIGHT: f32 = 60.0;
pub const OFFSET: Inset = Inset::new(5.0, 5.0, 10.0, 10.0);
const SPEED_X: f32 = 10.0;
const ARC_SPEED_Y: f32 = 4.0;
const ARC_GRAVITY: f32 = 1.0;
/// Flight ticks spent on the rise-and-fall arc before flying level.
const ARC_TICKS: u32 = 8;

#[derive(Clone, Debug)]
pub struct Projectile {
    id: ProjectileId,
    body: Body,
    speed_y: f32,
    arc_ticks_left: u32,
    spin: Animation,
    timer: TimerId,
}

impl Projectile {
    pub fn launch(id: ProjectileId, x: f32, y: f32, ctx: &mut Ctx) -> Self {
        let timer = ctx.every(FLIGHT_MS, Task::ProjectileFlight(id));
        Self {
            id,
            body: Body::new(x, y, WIDTH, HEIGHT, OFFSET, sprites::PROJECTILE_SPIN[0]),
            speed_y: ARC_SPEED_Y,
            arc_ticks_left: ARC_TICKS,
            spin: Animation::new(),
            timer,
        }
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn hitbox(&self) -> Rect {
        self.body.hitbox()
    }

    pub fn timer(&self) -> TimerId {
        self.timer
    }

    pub fn fly(&mut self) {
        self.body.x += SPEED_X;
        if self.arc_ticks_left > 0 {
            self.body.y -= self.speed_y;
            self.speed_y -= ARC_GRAVITY;
            self.arc_ticks_left -= 1;
        }
        if let Some(sprite) = self.spin.advance(sprites::PROJECTILE_SPIN) {
            self.body.sprite = sprite;
        }
    }
}

// ── Impact effect ─────────────────────────────────────────────────────────────

pub const SPLASH_FRAME_MS: u64 = 60;

#[derive(Clone, Debug)]
pub struct Splash {
    id: EffectId,
    body: Body,
    frames: OneShot,
    timer: TimerId,
}

impl Splash {
    pub fn spawn(id: EffectId, at: &Body, ctx: &mut Ctx) -> Self {
        let timer = ctx.every(SPLASH_FRAME_MS, Task::EffectFrame(id));
        let mut body = at.clone();
        body.sprite = sprites::SPLASH[0];
        let mut frames = OneShot::new();
        frames.advance_once(sprites::SPLASH);
        Self { id, body, frames, timer }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn timer(&self) -> TimerId {
        self.timer
    }

    /// Advances one frame; true once the final frame has been shown.
    pub fn advance(&mut self) -> bool {
        if let Some(sprite) = self.frames.advance_once(sprites::SPLASH) {
            self.body.sprite = sprite;
        }
        self.frames.is_finished()
    }
}
