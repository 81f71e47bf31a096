//! The world orchestrator: owns every entity and the timer scope, runs the
//! fixed logic tick, paints frames through a `Canvas`, and sequences the
//! end of the game.
//!
//! All mutation happens inside `advance`, which replays due timers in
//! order. There is no other clock.

use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::audio::{Audio, Cue};
use crate::character::{AttackEffect, Character, MotionInput};
use crate::collision::Rect;
use crate::endboss::{self, BossEvent, Endboss};
use crate::enemy::{self, Enemy};
use crate::hud::{percent_of, Hud};
use crate::input::Keyboard;
use crate::level::{Level, LevelData, Pickup};
use crate::orc::{self, Orc, OrcRegistry, VOICE_BASE_MS};
use crate::projectile::{Projectile, Splash};
use crate::render::{Canvas, RenderLoop};
use crate::sim::{Ctx, EffectId, OrcId, ProjectileId, Task, WorldTimers, FRAME_MS, VIEW_WIDTH};

pub const MAX_AMMO: u32 = 5;
pub const INTRO_MS: u64 = 2000;
pub const OVERLAY_DELAY_MS: u64 = 1500;
pub const VICTORY_FREEZE_MS: u64 = 4000;
pub const DEFEAT_FREEZE_MS: u64 = 2500;
/// Screen x at which the camera keeps the character.
pub const CAMERA_ANCHOR_X: f32 = 100.0;
const THROW_OFFSET_X: f32 = 60.0;
const THROW_OFFSET_Y: f32 = 130.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

impl Outcome {
    fn freeze_delay(self) -> u64 {
        match self {
            Outcome::Victory => VICTORY_FREEZE_MS,
            Outcome::Defeat => DEFEAT_FREEZE_MS,
        }
    }
}

pub struct World {
    character: Character,
    level: Level,
    projectiles: Vec<Projectile>,
    effects: Vec<Splash>,
    camera_x: f32,
    hud: Hud,
    keyboard: Keyboard,
    audio: Audio,
    timers: WorldTimers,
    rng: StdRng,
    registry: OrcRegistry,
    now: u64,
    ammo: u32,
    coins_collected: u32,
    coins_total: u32,
    next_projectile: u32,
    next_effect: u32,
    boss_intro_active: bool,
    game_ending: bool,
    game_ended: bool,
    outcome: Option<Outcome>,
    overlay: Option<Outcome>,
    render_loop: RenderLoop,
}

impl World {
    pub fn new(data: LevelData, rng: StdRng) -> Self {
        let mut timers = WorldTimers::new();
        let mut audio = Audio::new();
        timers.every(0, FRAME_MS, Task::LogicTick);
        let character = Character::spawn(&mut Ctx::new(0, &mut timers, &mut audio));
        timers.after(0, VOICE_BASE_MS, Task::OrcVoice);

        let level = Level::new(&data);
        let coins_total = level.coins.len() as u32;
        let mut render_loop = RenderLoop::new();
        render_loop.start();

        let mut world = Self {
            character,
            level,
            projectiles: Vec::new(),
            effects: Vec::new(),
            camera_x: CAMERA_ANCHOR_X - crate::character::SPAWN_X,
            hud: Hud::default(),
            keyboard: Keyboard::new(),
            audio,
            timers,
            rng,
            registry: OrcRegistry::new(),
            now: 0,
            ammo: 0,
            coins_collected: 0,
            coins_total,
            next_projectile: 0,
            next_effect: 0,
            boss_intro_active: false,
            game_ending: false,
            game_ended: false,
            outcome: None,
            overlay: None,
            render_loop,
        };
        for spawn in &data.orcs {
            let x = spawn
                .x
                .unwrap_or_else(|| world.registry.place(data.orc_band, data.orc_min_gap, &mut world.rng));
            world.spawn_orc(x);
        }
        info!(
            orcs = data.orcs.len(),
            coins = coins_total,
            ammo = data.ammo.len(),
            "world_created"
        );
        world
    }

    // ── Clock ─────────────────────────────────────────────────────────────────

    /// Runs every timer due within the next `dt_ms` milliseconds.
    pub fn advance(&mut self, dt_ms: u64) {
        let target = self.now.saturating_add(dt_ms);
        while let Some((at, task)) = self.timers.pop_due(target) {
            self.now = at;
            self.run(task);
        }
        self.now = target;
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::LogicTick => self.logic_tick(),
            Task::CharacterMotion => self.character_motion(),
            Task::CharacterGravity => self.character.apply_gravity(),
            Task::CharacterAnimation => self.character.animate(self.now),
            Task::CharacterAttackFrame => self.character_attack_frame(),
            Task::CharacterDeathFrame => {
                let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
                self.character.death_frame(&mut ctx);
            }
            Task::OrcMove(id) => {
                let paused = self.is_frozen();
                if let Some(orc) = enemy::find_orc_mut(&mut self.level.enemies, id) {
                    orc.step(paused);
                }
            }
            Task::OrcAnimate(id) => {
                let paused = self.is_frozen();
                if let Some(orc) = enemy::find_orc_mut(&mut self.level.enemies, id) {
                    orc.animate(paused);
                }
            }
            Task::OrcDeathFrame(id) => {
                let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
                if let Some(orc) = enemy::find_orc_mut(&mut self.level.enemies, id) {
                    orc.death_frame(&mut ctx);
                }
            }
            Task::OrcVoice => self.orc_voice(),
            Task::BossBrain => self.boss_brain(),
            Task::BossAnimation => {
                let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
                if let Some(boss) = enemy::find_boss_mut(&mut self.level.enemies) {
                    boss.animate(&mut ctx);
                }
            }
            Task::ProjectileFlight(id) => self.projectile_flight(id),
            Task::EffectFrame(id) => self.effect_frame(id),
            Task::EndIntro => {
                self.boss_intro_active = false;
                info!(at = self.now, "boss_intro_ended");
            }
            Task::ShowOverlay => {
                self.overlay = self.outcome;
                info!(outcome = ?self.overlay, "overlay_shown");
            }
            Task::HardFreeze => self.hard_freeze(),
        }
    }

    /// Character and AI movement stop during the boss intro and after the
    /// hard freeze.
    pub fn is_frozen(&self) -> bool {
        self.boss_intro_active || self.game_ended
    }

    // ── Logic tick ────────────────────────────────────────────────────────────

    fn logic_tick(&mut self) {
        if self.game_ended || self.game_ending || self.boss_intro_active {
            return;
        }
        for pickup in self.level.coins.iter_mut().chain(self.level.ammo.iter_mut()) {
            pickup.bob();
        }
        self.resolve_enemy_contacts();
        self.resolve_projectile_hits();
        self.collect_pickups();
        self.check_boss_spawn();
        self.check_outcome();
    }

    fn resolve_enemy_contacts(&mut self) {
        let now = self.now;
        for enemy in self.level.enemies.iter_mut() {
            if self.character.is_dead() {
                return;
            }
            if !enemy.is_hittable() {
                continue;
            }
            let hitbox = self.character.hitbox();
            let hurt = self.character.is_hurt(now);
            let damage = match enemy {
                Enemy::Orc(orc) => (!hurt && orc.hitbox().intersects(&hitbox)).then_some(orc::CONTACT_DAMAGE),
                Enemy::Endboss(boss) => {
                    if boss.is_attack_window()
                        && boss.attack_hitbox().intersects(&hitbox)
                        && boss.try_deal_damage(now)
                    {
                        Some(endboss::ATTACK_DAMAGE)
                    } else if !hurt && boss.hitbox().intersects(&hitbox) && boss.try_deal_damage(now) {
                        Some(endboss::TOUCH_DAMAGE)
                    } else {
                        None
                    }
                }
            };
            if let Some(damage) = damage {
                let mut ctx = Ctx::new(now, &mut self.timers, &mut self.audio);
                self.character.hit(damage, &mut ctx);
                self.hud.health.set_percentage(self.character.energy() as f32);
            }
        }
    }

    /// Each projectile is consumed by the first hittable enemy it overlaps.
    fn resolve_projectile_hits(&mut self) {
        for index in (0..self.projectiles.len()).rev() {
            let area = self.projectiles[index].hitbox();
            let Some(target) = self
                .level
                .enemies
                .iter_mut()
                .find(|enemy| enemy.is_hittable() && enemy.hitbox().intersects(&area))
            else {
                continue;
            };

            let projectile = self.projectiles.remove(index);
            let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
            ctx.timers.cancel(projectile.timer());
            match target {
                Enemy::Endboss(boss) => {
                    if boss.hit(&mut ctx) {
                        self.hud.boss.set_percentage(boss.energy() as f32);
                    }
                }
                Enemy::Orc(orc) => {
                    orc.die(&mut ctx);
                    self.registry.untrack(orc.id());
                }
            }
            let effect = EffectId(self.next_effect);
            self.next_effect += 1;
            self.effects.push(Splash::spawn(effect, projectile.body(), &mut ctx));
            ctx.audio.play(Cue::Splash);
            debug!(id = projectile.id().0, x = projectile.body().x, "projectile_hit");
        }
    }

    fn collect_pickups(&mut self) {
        let hitbox = self.character.hitbox();

        let coins = take_touching(&mut self.level.coins, &hitbox);
        if coins > 0 {
            for _ in 0..coins {
                self.audio.play_pooled(Cue::Coin);
            }
            self.coins_collected += coins;
            self.hud.coins.set_percentage(percent_of(self.coins_collected, self.coins_total));
        }

        let ammo = take_touching(&mut self.level.ammo, &hitbox);
        if ammo > 0 {
            self.ammo = (self.ammo + ammo).min(MAX_AMMO);
            self.hud.ammo.set_percentage(percent_of(self.ammo, MAX_AMMO));
        }
    }

    fn check_boss_spawn(&mut self) {
        let x = self.character.body().x;
        let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
        if self.level.try_spawn_boss(x, &mut ctx) {
            self.hud.boss.set_percentage(endboss::MAX_ENERGY as f32);
        }
    }

    fn check_outcome(&mut self) {
        if self.character.is_dead() {
            self.start_end_sequence(Outcome::Defeat);
        } else if enemy::find_boss(&self.level.enemies).map_or(false, Endboss::is_dead) {
            self.start_end_sequence(Outcome::Victory);
        }
    }

    // ── Character ─────────────────────────────────────────────────────────────

    fn character_motion(&mut self) {
        let blocker = enemy::find_boss(&self.level.enemies)
            .filter(|boss| boss.is_collidable())
            .map(Endboss::hitbox);
        let input = MotionInput {
            frozen: self.is_frozen(),
            ammo: self.ammo,
            level_end_x: self.level.end_x(),
            blocker,
        };
        let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
        self.character.motion(&mut self.keyboard, &input, &mut ctx);
        self.camera_x = CAMERA_ANCHOR_X - self.character.body().x;
    }

    fn character_attack_frame(&mut self) {
        let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
        match self.character.attack_frame(&mut ctx) {
            Some(AttackEffect::Strike(area)) => self.resolve_strike(area),
            Some(AttackEffect::Release) => self.release_projectile(),
            None => {}
        }
    }

    /// A melee strike lands on the first hittable enemy in list order.
    fn resolve_strike(&mut self, area: Rect) {
        let Some(target) = self
            .level
            .enemies
            .iter_mut()
            .find(|enemy| enemy.is_hittable() && enemy.hitbox().intersects(&area))
        else {
            return;
        };
        let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
        match target {
            Enemy::Endboss(boss) => {
                if boss.hit(&mut ctx) {
                    self.hud.boss.set_percentage(boss.energy() as f32);
                }
            }
            Enemy::Orc(orc) => {
                orc.die(&mut ctx);
                self.registry.untrack(orc.id());
            }
        }
        ctx.audio.play(Cue::Hit);
        self.character.mark_strike_landed();
    }

    fn release_projectile(&mut self) {
        if self.ammo == 0 {
            return;
        }
        let id = ProjectileId(self.next_projectile);
        self.next_projectile += 1;
        let body = self.character.body();
        let (x, y) = (body.x + THROW_OFFSET_X, body.y + THROW_OFFSET_Y);
        let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
        self.projectiles.push(Projectile::launch(id, x, y, &mut ctx));
        ctx.audio.play(Cue::Throw);
        self.ammo -= 1;
        self.hud.ammo.set_percentage(percent_of(self.ammo, MAX_AMMO));
        debug!(id = id.0, ammo = self.ammo, "projectile_released");
    }

    /// Applies damage from outside the contact rules and refreshes the
    /// health bar.
    pub fn hit_character(&mut self, damage: u32) {
        let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
        self.character.hit(damage, &mut ctx);
        self.hud.health.set_percentage(self.character.energy() as f32);
    }

    // ── Enemies ───────────────────────────────────────────────────────────────

    /// Spawns an orc at `x` and tracks it in the registry.
    pub fn spawn_orc(&mut self, x: f32) -> OrcId {
        let id = self.registry.allocate_id();
        self.registry.track(id, x);
        let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
        let orc = Orc::spawn(id, x, &mut self.rng, &mut ctx);
        self.level.enemies.push(Enemy::Orc(orc));
        id
    }

    fn boss_brain(&mut self) {
        let character = self.character.body().clone();
        let frozen = self.is_frozen();
        let mut ctx = Ctx::new(self.now, &mut self.timers, &mut self.audio);
        let Some(boss) = enemy::find_boss_mut(&mut self.level.enemies) else {
            return;
        };
        if boss.think(&character, frozen, &mut ctx) == Some(BossEvent::Activated) {
            self.begin_intro();
        }
    }

    fn begin_intro(&mut self) {
        self.boss_intro_active = true;
        self.audio.play(Cue::BossAlert);
        self.timers.after(self.now, INTRO_MS, Task::EndIntro);
        info!(at = self.now, "boss_intro_started");
    }

    /// Counts orcs on screen, voices one of them, and reschedules itself
    /// sooner the more orcs are chasing.
    fn orc_voice(&mut self) {
        let left = -self.camera_x;
        let right = left + VIEW_WIDTH;
        let chasing = self
            .level
            .enemies
            .iter()
            .filter_map(Enemy::as_orc)
            .filter(|orc| !orc.is_dying() && orc.body().right() >= left && orc.body().x <= right)
            .count();
        if chasing > 0 && !self.boss_intro_active {
            let clip = self.registry.next_clip();
            let pitch = OrcRegistry::voice_pitch(&mut self.rng);
            self.audio.play_pitched(Cue::OrcVoice(clip), pitch);
        }
        let delay = self.registry.voice_delay(chasing);
        self.timers.after(self.now, delay, Task::OrcVoice);
    }

    // ── Projectiles & effects ─────────────────────────────────────────────────

    fn projectile_flight(&mut self, id: ProjectileId) {
        if self.is_frozen() {
            return;
        }
        let limit = self.level.end_x() + VIEW_WIDTH;
        let Some(index) = self.projectiles.iter().position(|p| p.id() == id) else {
            return;
        };
        self.projectiles[index].fly();
        if self.projectiles[index].body().x > limit {
            let projectile = self.projectiles.remove(index);
            self.timers.cancel(projectile.timer());
            debug!(id = id.0, "projectile_out_of_level");
        }
    }

    fn effect_frame(&mut self, id: EffectId) {
        let Some(index) = self.effects.iter().position(|e| e.id() == id) else {
            return;
        };
        if self.effects[index].advance() {
            let effect = self.effects.remove(index);
            self.timers.cancel(effect.timer());
        }
    }

    // ── End of game ───────────────────────────────────────────────────────────

    /// Starts the two-phase ending: input and audio stop at once, the
    /// overlay follows after a short delay, and the hard freeze after a
    /// longer, outcome-dependent one. Only the first call has any effect.
    pub fn start_end_sequence(&mut self, outcome: Outcome) {
        if self.game_ending || self.game_ended {
            return;
        }
        self.game_ending = true;
        self.outcome = Some(outcome);
        self.keyboard.reset();
        self.audio.pause_all();
        if outcome == Outcome::Victory {
            self.audio.play(Cue::Win);
        }
        self.timers.after(self.now, OVERLAY_DELAY_MS, Task::ShowOverlay);
        self.timers.after(self.now, outcome.freeze_delay(), Task::HardFreeze);
        info!(?outcome, at = self.now, "game_ending");
    }

    fn hard_freeze(&mut self) {
        self.game_ended = true;
        self.timers.cancel_all();
        self.render_loop.stop();
        info!(outcome = ?self.outcome, at = self.now, "hard_freeze");
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Paints one frame if one is pending and schedules the next. Returns
    /// false once the render loop has been stopped.
    pub fn render(&mut self, canvas: &mut impl Canvas) -> bool {
        if !self.render_loop.take() {
            return false;
        }
        self.draw(canvas);
        self.render_loop.schedule();
        true
    }

    /// Back to front: backgrounds, effects, projectiles, pickups, enemies,
    /// character, then the fixed HUD and overlay.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        canvas.clear();
        canvas.translate(self.camera_x);

        for layer in &self.level.backgrounds {
            canvas.draw_image(layer.sprite, layer.rect(), false);
        }
        for effect in &self.effects {
            canvas.draw_image(effect.body().sprite, effect.body().rect(), false);
        }
        for projectile in &self.projectiles {
            canvas.draw_image(projectile.body().sprite, projectile.body().rect(), false);
        }
        for pickup in self.level.coins.iter().chain(&self.level.ammo) {
            canvas.draw_image(pickup.body().sprite, pickup.body().rect(), false);
        }
        for enemy in &self.level.enemies {
            let rect = match enemy {
                Enemy::Endboss(boss) => boss.render_rect(),
                Enemy::Orc(orc) => orc.body().rect(),
            };
            canvas.draw_image(enemy.body().sprite, rect, false);
        }
        let body = self.character.body();
        canvas.draw_image(body.sprite, body.rect(), self.character.is_facing_left());

        canvas.translate(-self.camera_x);

        canvas.draw_bar(&self.hud.health);
        canvas.draw_bar(&self.hud.coins);
        canvas.draw_bar(&self.hud.ammo);
        if self.level.is_boss_spawned() {
            canvas.draw_bar(&self.hud.boss);
        }
        if let Some(outcome) = self.overlay {
            canvas.draw_overlay(outcome);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.level.enemies
    }

    pub fn registry(&self) -> &OrcRegistry {
        &self.registry
    }

    pub fn boss(&self) -> Option<&Endboss> {
        enemy::find_boss(&self.level.enemies)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn effects(&self) -> &[Splash] {
        &self.effects
    }

    pub fn camera_x(&self) -> f32 {
        self.camera_x
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Sets the ammo pool (capped) and refreshes its bar.
    pub fn set_ammo(&mut self, ammo: u32) {
        self.ammo = ammo.min(MAX_AMMO);
        self.hud.ammo.set_percentage(percent_of(self.ammo, MAX_AMMO));
    }

    pub fn coins_collected(&self) -> u32 {
        self.coins_collected
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut Audio {
        &mut self.audio
    }

    pub fn timers(&self) -> &WorldTimers {
        &self.timers
    }

    pub fn is_boss_intro_active(&self) -> bool {
        self.boss_intro_active
    }

    pub fn is_game_ending(&self) -> bool {
        self.game_ending
    }

    pub fn is_game_ended(&self) -> bool {
        self.game_ended
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn overlay(&self) -> Option<Outcome> {
        self.overlay
    }
}

/// Removes every pickup touching `hitbox` and returns how many went.
fn take_touching(pickups: &mut Vec<Pickup>, hitbox: &Rect) -> u32 {
    let before = pickups.len();
    pickups.retain(|pickup| !pickup.hitbox().intersects(hitbox));
    (before - pickups.len()) as u32
}
