//! The player character: input-driven movement, jump/gravity, the melee and
//! thrown attack state machine, and hurt/death sequencing.

use tracing::debug;

use crate::animation::{Animation, OneShot, Sequence};
use crate::audio::Cue;
use crate::collision::{Body, Inset, Rect};
use crate::input::{Key, Keyboard};
use crate::sim::{Ctx, Task, ANIMATION_MS, FRAME_MS, GRAVITY_MS};
use crate::sprites;
use crate::timers::TimerId;

pub const MAX_ENERGY: u32 = 100;
pub const SPAWN_X: f32 = 100.0;
/// Resting `y` of the character's top edge.
pub const GROUND_Y: f32 = 180.0;
pub const WIDTH: f32 = 100.0;
pub const HEIGHT: f32 = 250.0;
pub const OFFSET: Inset = Inset::new(20.0, 110.0, 40.0, 120.0);

/// Horizontal pixels per motion tick.
pub const SPEED: f32 = 5.0;
const JUMP_SPEED: f32 = 25.0;
const GRAVITY: f32 = 2.5;

pub const HURT_WINDOW_MS: u64 = 1000;
pub const MELEE_COOLDOWN_MS: u64 = 250;
pub const THROW_COOLDOWN_MS: u64 = 150;
pub const ATTACK_FRAME_MS: u64 = 60;
pub const DEATH_FRAME_MS: u64 = 180;
const LONG_IDLE_MS: u64 = 10_000;

const MELEE_REACH: f32 = 70.0;
const MELEE_FIRST_STRIKE_FRAME: usize = 2;
const MELEE_LAST_STRIKE_FRAME: usize = 3;
const THROW_RELEASE_FRAME: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackKind {
    Melee,
    Thrown,
}

impl AttackKind {
    fn sequence(self) -> Sequence {
        match self {
            AttackKind::Melee => sprites::CHARACTER_MELEE,
            AttackKind::Thrown => sprites::CHARACTER_THROW,
        }
    }
}

/// Highest-priority state first: a dead character is never "attacking".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterState {
    Dead,
    Attacking(AttackKind),
    Hurt,
    Jumping,
    Walking,
    Idle,
}

/// What an attack frame asks the world to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackEffect {
    /// Test this rectangle against the enemy list.
    Strike(Rect),
    /// Spawn a projectile.
    Release,
}

/// Per-tick facts the character needs from the world.
#[derive(Clone, Copy, Debug)]
pub struct MotionInput {
    /// Boss intro or hard freeze in effect.
    pub frozen: bool,
    pub ammo: u32,
    pub level_end_x: f32,
    /// Hitbox the character may not walk into from the left.
    pub blocker: Option<Rect>,
}

#[derive(Clone, Debug)]
struct Attack {
    kind: AttackKind,
    frame: usize,
    /// Set once a melee strike has connected with an enemy.
    landed: bool,
    timer: TimerId,
}

#[derive(Clone, Debug)]
pub struct Character {
    body: Body,
    energy: u32,
    speed: f32,
    speed_y: f32,
    facing_left: bool,
    walking: bool,
    attack: Option<Attack>,
    last_attack_at: Option<u64>,
    last_throw_at: Option<u64>,
    last_hit_at: Option<u64>,
    last_input_at: u64,
    animation: Animation,
    death: OneShot,
    death_timer: Option<TimerId>,
    death_sound_played: bool,
}

impl Character {
    /// Creates the character at its spawn point and registers its motion,
    /// gravity and animation loops.
    pub fn spawn(ctx: &mut Ctx) -> Self {
        ctx.every(FRAME_MS, Task::CharacterMotion);
        ctx.every(GRAVITY_MS, Task::CharacterGravity);
        ctx.every(ANIMATION_MS, Task::CharacterAnimation);
        Self {
            body: Body::new(SPAWN_X, GROUND_Y, WIDTH, HEIGHT, OFFSET, sprites::CHARACTER_IDLE[0]),
            energy: MAX_ENERGY,
            speed: SPEED,
            speed_y: 0.0,
            facing_left: false,
            walking: false,
            attack: None,
            last_attack_at: None,
            last_throw_at: None,
            last_hit_at: None,
            last_input_at: ctx.now,
            animation: Animation::new(),
            death: OneShot::new(),
            death_timer: None,
            death_sound_played: false,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

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

    pub fn is_dead(&self) -> bool {
        self.energy == 0
    }

    pub fn is_hurt(&self, now: u64) -> bool {
        self.last_hit_at
            .map_or(false, |at| now.saturating_sub(at) < HURT_WINDOW_MS)
    }

    pub fn is_above_ground(&self) -> bool {
        self.body.y < GROUND_Y
    }

    pub fn is_attacking(&self) -> bool {
        self.attack.is_some()
    }

    pub fn attack_kind(&self) -> Option<AttackKind> {
        self.attack.as_ref().map(|a| a.kind)
    }

    pub fn is_facing_left(&self) -> bool {
        self.facing_left
    }

    pub fn is_walking(&self) -> bool {
        self.walking
    }

    pub fn state(&self, now: u64) -> CharacterState {
        if self.is_dead() {
            CharacterState::Dead
        } else if let Some(attack) = &self.attack {
            CharacterState::Attacking(attack.kind)
        } else if self.is_hurt(now) {
            CharacterState::Hurt
        } else if self.is_above_ground() {
            CharacterState::Jumping
        } else if self.walking {
            CharacterState::Walking
        } else {
            CharacterState::Idle
        }
    }

    /// Forward strike area: adjacent to the hitbox on the facing side,
    /// spanning the middle 60% of the character's height.
    pub fn melee_hitbox(&self) -> Rect {
        let hitbox = self.hitbox();
        let x = if self.facing_left {
            hitbox.x - MELEE_REACH
        } else {
            hitbox.right()
        };
        Rect::new(x, self.body.y + self.body.height * 0.2, MELEE_REACH, self.body.height * 0.6)
    }

    // ── Motion tick ───────────────────────────────────────────────────────────

    pub fn motion(&mut self, keyboard: &mut Keyboard, input: &MotionInput, ctx: &mut Ctx) {
        let melee = keyboard.take_press(Key::Attack);
        let throw = keyboard.take_press(Key::Throw);

        if self.is_dead() || input.frozen {
            self.walking = false;
            ctx.audio.stop_loop(Cue::Walk);
            return;
        }
        if keyboard.any_down() || melee || throw {
            self.last_input_at = ctx.now;
        }

        let mut walking = false;
        // Flinching lifts the attack lock on movement, but never on attacks.
        if !self.is_attacking() || self.is_hurt(ctx.now) {
            if keyboard.is_down(Key::Right) && self.body.x < input.level_end_x {
                self.move_right(input.blocker);
                self.facing_left = false;
                walking = true;
            }
            if keyboard.is_down(Key::Left) && self.body.x > 0.0 {
                self.body.x = (self.body.x - self.speed).max(0.0);
                self.facing_left = true;
                walking = true;
            }
            if (keyboard.is_down(Key::Space) || keyboard.is_down(Key::Up)) && !self.is_above_ground() {
                self.jump(ctx);
            }
        }

        if melee {
            self.try_start_melee(ctx);
        } else if throw {
            self.try_start_throw(input.ammo, ctx);
        }

        self.walking = walking;
        if walking && !self.is_above_ground() {
            ctx.audio.start_loop(Cue::Walk);
        } else {
            ctx.audio.stop_loop(Cue::Walk);
        }
    }

    /// Steps right one unit at a time and stops at the last position that
    /// does not overlap `blocker`.
    fn move_right(&mut self, blocker: Option<Rect>) {
        let Some(wall) = blocker else {
            self.body.x += self.speed;
            return;
        };
        let start = self.body.x;
        let steps = self.speed.ceil() as u32;
        for step in 1..=steps {
            let dx = (step as f32).min(self.speed);
            let mut next = self.body.hitbox();
            next.x = start + self.body.offset.x + dx;
            if next.intersects(&wall) {
                break;
            }
            self.body.x = start + dx;
        }
    }

    fn jump(&mut self, ctx: &mut Ctx) {
        self.speed_y = JUMP_SPEED;
        ctx.audio.play(Cue::Jump);
    }

    pub fn apply_gravity(&mut self) {
        if self.is_above_ground() || self.speed_y > 0.0 {
            self.body.y -= self.speed_y;
            self.speed_y -= GRAVITY;
            if self.body.y >= GROUND_Y {
                self.body.y = GROUND_Y;
                self.speed_y = 0.0;
            }
        }
    }

    // ── Attacks ───────────────────────────────────────────────────────────────

    pub fn try_start_melee(&mut self, ctx: &mut Ctx) -> bool {
        if self.is_dead() || self.is_attacking() {
            return false;
        }
        if ctx.since(self.last_attack_at).map_or(false, |ms| ms < MELEE_COOLDOWN_MS) {
            return false;
        }
        self.start_attack(AttackKind::Melee, ctx);
        true
    }

    /// Throwing needs ammo and only works facing right.
    pub fn try_start_throw(&mut self, ammo: u32, ctx: &mut Ctx) -> bool {
        if self.is_dead() || self.is_attacking() || ammo == 0 || self.facing_left {
            return false;
        }
        if ctx.since(self.last_throw_at).map_or(false, |ms| ms < THROW_COOLDOWN_MS) {
            return false;
        }
        self.start_attack(AttackKind::Thrown, ctx);
        true
    }

    fn start_attack(&mut self, kind: AttackKind, ctx: &mut Ctx) {
        let timer = ctx.every(ATTACK_FRAME_MS, Task::CharacterAttackFrame);
        self.attack = Some(Attack { kind, frame: 0, landed: false, timer });
        self.body.sprite = kind.sequence()[0];
        self.last_attack_at = Some(ctx.now);
        if kind == AttackKind::Thrown {
            self.last_throw_at = Some(ctx.now);
        }
        debug!(?kind, at = ctx.now, "attack_started");
    }

    /// Advances the running attack by one frame.
    pub fn attack_frame(&mut self, ctx: &mut Ctx) -> Option<AttackEffect> {
        let attack = self.attack.as_mut()?;
        attack.frame += 1;
        let (kind, frame, landed, timer) = (attack.kind, attack.frame, attack.landed, attack.timer);

        let sequence = kind.sequence();
        if frame >= sequence.len() {
            ctx.timers.cancel(timer);
            self.attack = None;
            return None;
        }
        self.body.sprite = sequence[frame];

        match kind {
            AttackKind::Melee
                if !landed && (MELEE_FIRST_STRIKE_FRAME..=MELEE_LAST_STRIKE_FRAME).contains(&frame) =>
            {
                Some(AttackEffect::Strike(self.melee_hitbox()))
            }
            AttackKind::Thrown if frame == THROW_RELEASE_FRAME => Some(AttackEffect::Release),
            _ => None,
        }
    }

    /// One melee swing damages at most one enemy.
    pub fn mark_strike_landed(&mut self) {
        if let Some(attack) = self.attack.as_mut() {
            attack.landed = true;
        }
    }

    // ── Damage & death ────────────────────────────────────────────────────────

    pub fn hit(&mut self, damage: u32, ctx: &mut Ctx) {
        if self.is_dead() {
            return;
        }
        let before = self.energy;
        self.energy = self.energy.saturating_sub(damage);
        if self.energy == 0 {
            self.die(ctx);
        } else if self.energy < before {
            self.last_hit_at = Some(ctx.now);
            ctx.audio.play(Cue::Hurt);
        }
        debug!(damage, energy = self.energy, "character_hit");
    }

    fn die(&mut self, ctx: &mut Ctx) {
        if let Some(attack) = self.attack.take() {
            ctx.timers.cancel(attack.timer);
        }
        self.walking = false;
        ctx.audio.stop_loop(Cue::Walk);
        self.death.reset();
        if let Some(sprite) = self.death.advance_once(sprites::CHARACTER_DEAD) {
            self.body.sprite = sprite;
        }
        self.death_timer = Some(ctx.every(DEATH_FRAME_MS, Task::CharacterDeathFrame));
        if !self.death_sound_played {
            self.death_sound_played = true;
            ctx.audio.play(Cue::Death);
        }
    }

    pub fn death_frame(&mut self, ctx: &mut Ctx) {
        if let Some(sprite) = self.death.advance_once(sprites::CHARACTER_DEAD) {
            self.body.sprite = sprite;
        }
        if self.death.is_finished() {
            if let Some(timer) = self.death_timer.take() {
                ctx.timers.cancel(timer);
            }
        }
    }

    /// Continuous animation; attacks and death drive their own frames.
    pub fn animate(&mut self, now: u64) {
        let sequence = match self.state(now) {
            CharacterState::Dead | CharacterState::Attacking(_) => return,
            CharacterState::Hurt => sprites::CHARACTER_HURT,
            CharacterState::Jumping => sprites::CHARACTER_JUMP,
            CharacterState::Walking => sprites::CHARACTER_WALK,
            CharacterState::Idle if now.saturating_sub(self.last_input_at) >= LONG_IDLE_MS => {
                sprites::CHARACTER_LONG_IDLE
            }
            CharacterState::Idle => sprites::CHARACTER_IDLE,
        };
        if let Some(sprite) = self.animation.advance(sequence) {
            self.body.sprite = sprite;
        }
    }
}
