//! The endboss: proximity activation, chase/attack decisions, a
//! double-gated damage window, and hurt/death sequencing.

use tracing::{debug, info};

use crate::animation::{Animation, OneShot, Sequence};
use crate::audio::Cue;
use crate::collision::{Body, Inset, Rect};
use crate::sim::{Ctx, Task, ANIMATION_MS, FRAME_MS};
use crate::sprites;
use crate::timers::TimerId;

pub const SPAWN_X: f32 = 3850.0;
pub const SPAWN_Y: f32 = 130.0;
pub const WIDTH: f32 = 250.0;
pub const HEIGHT: f32 = 300.0;
pub const OFFSET: Inset = Inset::new(40.0, 70.0, 70.0, 90.0);

/// Activation distance between the boss and the character, in world x.
pub const VIEW_DISTANCE: f32 = 300.0;
const SPEED: f32 = 1.2;
/// Hitbox gap at which the boss stops walking and swings.
pub const ATTACK_RANGE: f32 = 60.0;
const ATTACK_REACH: f32 = 90.0;

pub const MAX_ENERGY: u32 = 100;
pub const HIT_DAMAGE: u32 = 20;
pub const HIT_COOLDOWN_MS: u64 = 500;
pub const ATTACK_COOLDOWN_MS: u64 = 1800;
pub const DAMAGE_COOLDOWN_MS: u64 = 1200;
pub const ATTACK_DAMAGE: u32 = 25;
pub const TOUCH_DAMAGE: u32 = 15;

const DAMAGE_WINDOW_FIRST_FRAME: usize = 4;
const DAMAGE_WINDOW_LAST_FRAME: usize = 5;
const HURT_OFFSET_Y: f32 = 10.0;
const DEATH_OFFSET_Y: f32 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossPhase {
    Dormant,
    Alert,
    Walking,
    /// `frame` is the attack frame currently shown.
    Attacking { frame: usize },
    Hurt,
    Dying,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossEvent {
    Activated,
}

#[derive(Clone, Debug)]
pub struct Endboss {
    body: Body,
    energy: u32,
    activated: bool,
    phase: BossPhase,
    speed: f32,
    last_hit_at: Option<u64>,
    last_attack_at: Option<u64>,
    last_damage_at: Option<u64>,
    animation: Animation,
    hurt: OneShot,
    death: OneShot,
    hurt_variant: u8,
    death_sound_played: bool,
    sprite_offset_y: f32,
    brain_timer: TimerId,
    animation_timer: TimerId,
}

impl Endboss {
    pub fn spawn(x: f32, ctx: &mut Ctx) -> Self {
        let brain_timer = ctx.every(FRAME_MS, Task::BossBrain);
        let animation_timer = ctx.every(ANIMATION_MS, Task::BossAnimation);
        Self {
            body: Body::new(x, SPAWN_Y, WIDTH, HEIGHT, OFFSET, sprites::BOSS_IDLE[0]),
            energy: MAX_ENERGY,
            activated: false,
            phase: BossPhase::Dormant,
            speed: SPEED,
            last_hit_at: None,
            last_attack_at: None,
            last_damage_at: None,
            animation: Animation::new(),
            hurt: OneShot::new(),
            death: OneShot::new(),
            hurt_variant: 0,
            death_sound_played: false,
            sprite_offset_y: 0.0,
            brain_timer,
            animation_timer,
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn hitbox(&self) -> Rect {
        self.body.hitbox()
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.phase, BossPhase::Dying | BossPhase::Dead)
    }

    pub fn is_collidable(&self) -> bool {
        !self.is_dead()
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.phase, BossPhase::Attacking { .. })
    }

    pub fn attack_frame(&self) -> Option<usize> {
        match self.phase {
            BossPhase::Attacking { frame } => Some(frame),
            _ => None,
        }
    }

    /// The swing can only hurt during a narrow slice of the animation.
    pub fn is_attack_window(&self) -> bool {
        self.attack_frame()
            .map_or(false, |f| (DAMAGE_WINDOW_FIRST_FRAME..=DAMAGE_WINDOW_LAST_FRAME).contains(&f))
    }

    /// Area in front of (left of) the boss hit by the swing.
    pub fn attack_hitbox(&self) -> Rect {
        let hitbox = self.hitbox();
        Rect::new(
            hitbox.x - ATTACK_REACH,
            hitbox.y + hitbox.height * 0.2,
            ATTACK_REACH + hitbox.width * 0.25,
            hitbox.height * 0.6,
        )
    }

    // ── Brain ─────────────────────────────────────────────────────────────────

    pub fn think(&mut self, character: &Body, intro_active: bool, ctx: &mut Ctx) -> Option<BossEvent> {
        if self.is_dead() {
            return None;
        }
        if !self.activated {
            if (self.body.x - character.x).abs() <= VIEW_DISTANCE {
                self.activated = true;
                self.phase = BossPhase::Alert;
                info!(x = self.body.x, character_x = character.x, "boss_activated");
                return Some(BossEvent::Activated);
            }
            return None;
        }
        if intro_active || matches!(self.phase, BossPhase::Attacking { .. } | BossPhase::Hurt) {
            return None;
        }

        let gap = self.hitbox().x - character.hitbox().right();
        if gap <= ATTACK_RANGE {
            self.phase = BossPhase::Alert;
            self.try_start_attack(ctx);
        } else {
            self.body.x -= self.speed;
            self.phase = BossPhase::Walking;
        }
        None
    }

    pub fn try_start_attack(&mut self, ctx: &mut Ctx) -> bool {
        if self.is_dead() || self.is_attacking() {
            return false;
        }
        if ctx.since(self.last_attack_at).map_or(false, |ms| ms < ATTACK_COOLDOWN_MS) {
            return false;
        }
        self.phase = BossPhase::Attacking { frame: 0 };
        self.body.sprite = sprites::BOSS_ATTACK[0];
        self.last_attack_at = Some(ctx.now);
        ctx.audio.play(Cue::BossAttack);
        true
    }

    /// Damage-output gate, separate from the attack-start cooldown.
    pub fn try_deal_damage(&mut self, now: u64) -> bool {
        if self.is_dead() {
            return false;
        }
        if let Some(at) = self.last_damage_at {
            if now.saturating_sub(at) < DAMAGE_COOLDOWN_MS {
                return false;
            }
        }
        self.last_damage_at = Some(now);
        true
    }

    // ── Animation ─────────────────────────────────────────────────────────────

    pub fn animate(&mut self, ctx: &mut Ctx) {
        match self.phase {
            BossPhase::Dormant => self.cycle(sprites::BOSS_IDLE),
            BossPhase::Alert => self.cycle(sprites::BOSS_ALERT),
            BossPhase::Walking => self.cycle(sprites::BOSS_WALK),
            BossPhase::Attacking { frame } => {
                let next = frame + 1;
                if next >= sprites::BOSS_ATTACK.len() {
                    self.phase = BossPhase::Alert;
                    self.cycle(sprites::BOSS_ALERT);
                } else {
                    self.phase = BossPhase::Attacking { frame: next };
                    self.body.sprite = sprites::BOSS_ATTACK[next];
                }
            }
            BossPhase::Hurt => {
                if let Some(sprite) = self.hurt.advance_once(sprites::BOSS_HURT) {
                    self.body.sprite = sprite;
                }
                if self.hurt.is_finished() {
                    self.phase = BossPhase::Alert;
                    self.sprite_offset_y = 0.0;
                }
            }
            BossPhase::Dying => {
                if let Some(sprite) = self.death.advance_once(sprites::BOSS_DEAD) {
                    self.body.sprite = sprite;
                }
                if self.death.is_finished() {
                    self.phase = BossPhase::Dead;
                    ctx.timers.cancel(self.animation_timer);
                }
            }
            BossPhase::Dead => {}
        }
    }

    fn cycle(&mut self, sequence: Sequence) {
        if let Some(sprite) = self.animation.advance(sequence) {
            self.body.sprite = sprite;
        }
    }

    // ── Damage & death ────────────────────────────────────────────────────────

    /// Returns whether the hit was accepted. Hits closer together than
    /// `HIT_COOLDOWN_MS` are ignored.
    pub fn hit(&mut self, ctx: &mut Ctx) -> bool {
        if self.is_dead() {
            return false;
        }
        if ctx.since(self.last_hit_at).map_or(false, |ms| ms < HIT_COOLDOWN_MS) {
            return false;
        }
        self.last_hit_at = Some(ctx.now);
        self.energy = self.energy.saturating_sub(HIT_DAMAGE);
        debug!(energy = self.energy, "boss_hit");

        if self.energy == 0 {
            self.die(ctx);
            return true;
        }

        ctx.audio.play(Cue::BossHurt(self.hurt_variant));
        self.hurt_variant = (self.hurt_variant + 1) % 2;
        // A running swing keeps its frames; only an idle boss flinches.
        if !self.is_attacking() {
            self.phase = BossPhase::Hurt;
            self.hurt.reset();
            if let Some(sprite) = self.hurt.advance_once(sprites::BOSS_HURT) {
                self.body.sprite = sprite;
            }
            self.sprite_offset_y = HURT_OFFSET_Y;
        }
        true
    }

    fn die(&mut self, ctx: &mut Ctx) {
        self.phase = BossPhase::Dying;
        ctx.timers.cancel(self.brain_timer);
        self.death.reset();
        if let Some(sprite) = self.death.advance_once(sprites::BOSS_DEAD) {
            self.body.sprite = sprite;
        }
        self.sprite_offset_y = DEATH_OFFSET_Y;
        if !self.death_sound_played {
            self.death_sound_played = true;
            ctx.audio.play(Cue::BossDeath);
        }
        info!(x = self.body.x, "boss_defeated");
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn render_scale(&self) -> f32 {
        match self.phase {
            BossPhase::Attacking { .. } => 1.5,
            BossPhase::Hurt | BossPhase::Dying | BossPhase::Dead => 1.15,
            _ => 1.0,
        }
    }

    /// Scaled draw box, centred horizontally and bottom-aligned so the boss
    /// keeps standing on the same ground line.
    pub fn render_rect(&self) -> Rect {
        let scale = self.render_scale();
        let width = self.body.width * scale;
        let height = self.body.height * scale;
        Rect::new(
            self.body.x - (width - self.body.width) / 2.0,
            self.body.y + self.body.height - height + self.sprite_offset_y,
            width,
            height,
        )
    }
}
