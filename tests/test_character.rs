use brawler::audio::{Audio, Cue};
use brawler::character::*;
use brawler::collision::Rect;
use brawler::input::{Key, Keyboard};
use brawler::sim::{Ctx, WorldTimers};
use brawler::sprites;

/// Clock, timer scope and audio for driving a character without a world.
struct Rig {
    now: u64,
    timers: WorldTimers,
    audio: Audio,
}

impl Rig {
    fn new() -> Self {
        Self { now: 0, timers: WorldTimers::new(), audio: Audio::new() }
    }

    fn ctx(&mut self) -> Ctx<'_> {
        Ctx::new(self.now, &mut self.timers, &mut self.audio)
    }
}

fn spawn() -> (Rig, Character) {
    let mut rig = Rig::new();
    let character = Character::spawn(&mut rig.ctx());
    (rig, character)
}

fn open_field() -> MotionInput {
    MotionInput { frozen: false, ammo: 0, level_end_x: 4400.0, blocker: None }
}

// ── Spawn ─────────────────────────────────────────────────────────────────────

#[test]
fn spawn_registers_motion_gravity_and_animation() {
    let (rig, c) = spawn();
    assert_eq!(rig.timers.len(), 3);
    assert_eq!(c.body().x, SPAWN_X);
    assert_eq!(c.body().y, GROUND_Y);
    assert_eq!(c.energy(), MAX_ENERGY);
    assert_eq!(c.state(0), CharacterState::Idle);
}

// ── Damage & death ────────────────────────────────────────────────────────────

#[test]
fn lethal_hit_after_damage_kills_once() {
    let (mut rig, mut c) = spawn();
    c.hit(80, &mut rig.ctx());
    assert_eq!(c.energy(), 20);
    assert_eq!(rig.audio.count_pending(Cue::Hurt), 1);

    c.hit(20, &mut rig.ctx());
    assert_eq!(c.energy(), 0);
    assert!(c.is_dead());
    assert_eq!(rig.audio.count_pending(Cue::Death), 1);

    c.hit(20, &mut rig.ctx());
    assert_eq!(c.energy(), 0);
    assert_eq!(rig.audio.count_pending(Cue::Death), 1);
    assert_eq!(rig.audio.count_pending(Cue::Hurt), 1);
}

#[test]
fn energy_floors_at_zero() {
    let (mut rig, mut c) = spawn();
    c.hit(250, &mut rig.ctx());
    assert_eq!(c.energy(), 0);
    assert_eq!(c.state(0), CharacterState::Dead);
}

#[test]
fn hurt_window_lasts_one_second() {
    let (mut rig, mut c) = spawn();
    rig.now = 1000;
    c.hit(10, &mut rig.ctx());
    assert!(c.is_hurt(1000));
    assert!(c.is_hurt(1999));
    assert!(!c.is_hurt(2000));
    assert_eq!(c.state(1500), CharacterState::Hurt);
    assert_eq!(c.state(2500), CharacterState::Idle);
}

#[test]
fn zero_damage_does_not_flinch() {
    let (mut rig, mut c) = spawn();
    c.hit(0, &mut rig.ctx());
    assert!(!c.is_hurt(0));
    assert_eq!(rig.audio.count_pending(Cue::Hurt), 0);
}

#[test]
fn lethal_hit_does_not_open_hurt_window() {
    let (mut rig, mut c) = spawn();
    c.hit(100, &mut rig.ctx());
    assert!(!c.is_hurt(0));
    assert_eq!(rig.audio.count_pending(Cue::Hurt), 0);
}

#[test]
fn death_sequence_freezes_on_last_frame() {
    let (mut rig, mut c) = spawn();
    c.hit(100, &mut rig.ctx());
    assert_eq!(rig.timers.len(), 4);
    for _ in 0..12 {
        c.death_frame(&mut rig.ctx());
    }
    assert_eq!(c.body().sprite, *sprites::CHARACTER_DEAD.last().unwrap());
    assert_eq!(rig.timers.len(), 3);
}

#[test]
fn dying_cancels_running_attack() {
    let (mut rig, mut c) = spawn();
    assert!(c.try_start_melee(&mut rig.ctx()));
    c.hit(100, &mut rig.ctx());
    assert!(!c.is_attacking());
    assert_eq!(c.state(0), CharacterState::Dead);
}

// ── Melee ─────────────────────────────────────────────────────────────────────

#[test]
fn melee_strikes_on_frames_two_and_three() {
    let (mut rig, mut c) = spawn();
    assert!(c.try_start_melee(&mut rig.ctx()));
    assert_eq!(c.attack_kind(), Some(AttackKind::Melee));
    assert_eq!(c.body().sprite, sprites::CHARACTER_MELEE[0]);

    let effects: Vec<_> = (0..5).map(|_| c.attack_frame(&mut rig.ctx())).collect();
    let area = c.melee_hitbox();
    assert_eq!(effects[0], None);
    assert_eq!(effects[1], Some(AttackEffect::Strike(area)));
    assert_eq!(effects[2], Some(AttackEffect::Strike(area)));
    assert_eq!(effects[3], None);
    assert_eq!(effects[4], None);
    assert!(!c.is_attacking());
}

#[test]
fn landed_strike_is_not_repeated() {
    let (mut rig, mut c) = spawn();
    c.try_start_melee(&mut rig.ctx());
    c.attack_frame(&mut rig.ctx());
    assert!(matches!(c.attack_frame(&mut rig.ctx()), Some(AttackEffect::Strike(_))));
    c.mark_strike_landed();
    assert_eq!(c.attack_frame(&mut rig.ctx()), None);
}

#[test]
fn melee_hitbox_sits_on_facing_side() {
    let (mut rig, mut c) = spawn();
    let hitbox = c.hitbox();
    let right = c.melee_hitbox();
    assert_eq!(right.x, hitbox.right());
    assert_eq!(right.y, c.body().y + c.body().height * 0.2);
    assert_eq!(right.height, c.body().height * 0.6);

    let mut keyboard = Keyboard::new().with_down(Key::Left);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert!(c.is_facing_left());
    let left = c.melee_hitbox();
    assert_eq!(left.right(), c.hitbox().x);
}

#[test]
fn melee_cooldown_runs_from_attack_start() {
    let (mut rig, mut c) = spawn();
    assert!(c.try_start_melee(&mut rig.ctx()));
    for _ in 0..5 {
        c.attack_frame(&mut rig.ctx());
    }
    rig.now = MELEE_COOLDOWN_MS - 1;
    assert!(!c.try_start_melee(&mut rig.ctx()));
    rig.now = MELEE_COOLDOWN_MS;
    assert!(c.try_start_melee(&mut rig.ctx()));
}

#[test]
fn only_one_attack_at_a_time() {
    let (mut rig, mut c) = spawn();
    assert!(c.try_start_melee(&mut rig.ctx()));
    rig.now = 1000;
    assert!(!c.try_start_melee(&mut rig.ctx()));
    assert!(!c.try_start_throw(3, &mut rig.ctx()));
}

// ── Throw ─────────────────────────────────────────────────────────────────────

#[test]
fn throw_needs_ammo() {
    let (mut rig, mut c) = spawn();
    assert!(!c.try_start_throw(0, &mut rig.ctx()));
    assert!(c.try_start_throw(1, &mut rig.ctx()));
    assert_eq!(c.attack_kind(), Some(AttackKind::Thrown));
}

#[test]
fn throw_only_facing_right() {
    let (mut rig, mut c) = spawn();
    let mut keyboard = Keyboard::new().with_down(Key::Left);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert!(!c.try_start_throw(5, &mut rig.ctx()));
}

#[test]
fn throw_releases_on_frame_three() {
    let (mut rig, mut c) = spawn();
    c.try_start_throw(1, &mut rig.ctx());
    let effects: Vec<_> = (0..5).map(|_| c.attack_frame(&mut rig.ctx())).collect();
    assert_eq!(effects[2], Some(AttackEffect::Release));
    assert_eq!(effects.iter().filter(|e| e.is_some()).count(), 1);
}

// ── Motion ────────────────────────────────────────────────────────────────────

#[test]
fn walking_right_moves_by_speed() {
    let (mut rig, mut c) = spawn();
    let mut keyboard = Keyboard::new().with_down(Key::Right);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert_eq!(c.body().x, SPAWN_X + SPEED);
    assert!(c.is_walking());
    assert!(rig.audio.is_looping(Cue::Walk));

    keyboard.release(Key::Right);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert!(!c.is_walking());
    assert!(!rig.audio.is_looping(Cue::Walk));
}

#[test]
fn walking_left_stops_at_zero() {
    let (mut rig, mut c) = spawn();
    c.body_mut().x = 3.0;
    let mut keyboard = Keyboard::new().with_down(Key::Left);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert_eq!(c.body().x, 0.0);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert_eq!(c.body().x, 0.0);
}

#[test]
fn right_edge_of_level_stops_walking() {
    let (mut rig, mut c) = spawn();
    c.body_mut().x = 4400.0;
    let mut keyboard = Keyboard::new().with_down(Key::Right);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert_eq!(c.body().x, 4400.0);
}

#[test]
fn soft_wall_stops_before_boss() {
    let (mut rig, mut c) = spawn();
    c.body_mut().x = 3790.0;
    // Boss at x 3850 with its collision inset.
    let input = MotionInput {
        blocker: Some(Rect::new(3890.0, 200.0, 180.0, 210.0)),
        ..open_field()
    };
    let mut keyboard = Keyboard::new().with_down(Key::Right);
    for _ in 0..20 {
        c.motion(&mut keyboard, &input, &mut rig.ctx());
    }
    assert_eq!(c.body().x, 3810.0);
    assert!(!c.hitbox().intersects(&input.blocker.unwrap()));
}

#[test]
fn left_movement_ignores_blocker() {
    let (mut rig, mut c) = spawn();
    c.body_mut().x = 3810.0;
    let input = MotionInput {
        blocker: Some(Rect::new(3700.0, 200.0, 50.0, 210.0)),
        ..open_field()
    };
    let mut keyboard = Keyboard::new().with_down(Key::Left);
    c.motion(&mut keyboard, &input, &mut rig.ctx());
    assert_eq!(c.body().x, 3805.0);
}

#[test]
fn frozen_world_blocks_motion_and_attacks() {
    let (mut rig, mut c) = spawn();
    let input = MotionInput { frozen: true, ..open_field() };
    let mut keyboard = Keyboard::new().with_down(Key::Right);
    keyboard.press(Key::Attack);
    c.motion(&mut keyboard, &input, &mut rig.ctx());
    assert_eq!(c.body().x, SPAWN_X);
    assert!(!c.is_attacking());
    // The press was consumed, not deferred.
    assert!(!keyboard.take_press(Key::Attack));
}

#[test]
fn attacking_blocks_movement() {
    let (mut rig, mut c) = spawn();
    let mut keyboard = Keyboard::new().with_down(Key::Right);
    keyboard.press(Key::Attack);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    let x = c.body().x;
    assert!(c.is_attacking());

    rig.now = FRAME_STEP;
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert_eq!(c.body().x, x);
}

#[test]
fn hurt_lifts_attack_movement_lock() {
    let (mut rig, mut c) = spawn();
    let mut keyboard = Keyboard::new().with_down(Key::Right);
    assert!(c.try_start_melee(&mut rig.ctx()));
    c.hit(10, &mut rig.ctx());
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert_eq!(c.body().x, SPAWN_X + SPEED);
    assert!(c.is_attacking());
}

#[test]
fn held_attack_key_does_not_retrigger() {
    let (mut rig, mut c) = spawn();
    let mut keyboard = Keyboard::new();
    keyboard.press(Key::Attack);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    for _ in 0..5 {
        c.attack_frame(&mut rig.ctx());
    }
    assert!(!c.is_attacking());

    rig.now = 1000;
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert!(!c.is_attacking());
}

const FRAME_STEP: u64 = 16;

// ── Jump & gravity ────────────────────────────────────────────────────────────

#[test]
fn jump_rises_and_lands_on_ground() {
    let (mut rig, mut c) = spawn();
    let mut keyboard = Keyboard::new().with_down(Key::Space);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert_eq!(rig.audio.count_pending(Cue::Jump), 1);

    let mut peak = GROUND_Y;
    for _ in 0..100 {
        c.apply_gravity();
        peak = peak.min(c.body().y);
        if !c.is_above_ground() {
            break;
        }
    }
    assert!(peak < GROUND_Y);
    assert_eq!(c.body().y, GROUND_Y);
}

#[test]
fn no_double_jump_in_the_air() {
    let (mut rig, mut c) = spawn();
    let mut keyboard = Keyboard::new().with_down(Key::Up);
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    c.apply_gravity();
    assert!(c.is_above_ground());
    c.motion(&mut keyboard, &open_field(), &mut rig.ctx());
    assert_eq!(rig.audio.count_pending(Cue::Jump), 1);
    assert_eq!(c.state(0), CharacterState::Jumping);
}

// ── Animation ─────────────────────────────────────────────────────────────────

#[test]
fn long_idle_after_ten_seconds() {
    let (_, mut c) = spawn();
    c.animate(9_999);
    assert!(c.body().sprite.starts_with("character/idle"));
    c.animate(10_000);
    assert!(c.body().sprite.starts_with("character/long_idle"));
}

#[test]
fn attack_frames_are_not_overridden_by_animation() {
    let (mut rig, mut c) = spawn();
    c.try_start_melee(&mut rig.ctx());
    c.animate(0);
    assert_eq!(c.body().sprite, sprites::CHARACTER_MELEE[0]);
}
