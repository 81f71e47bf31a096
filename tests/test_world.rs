use brawler::animation::SpriteId;
use brawler::audio::{AudioEvent, Cue};
use brawler::collision::Rect;
use brawler::hud::{BarKind, StatusBar};
use brawler::input::Key;
use brawler::level::{LevelData, PickupSpawn};
use brawler::render::Canvas;
use brawler::world::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn empty_world() -> World {
    World::new(LevelData::empty(), StdRng::seed_from_u64(42))
}

fn world_with(data: LevelData) -> World {
    World::new(data, StdRng::seed_from_u64(42))
}

fn place_character(world: &mut World, x: f32) {
    world.character_mut().body_mut().x = x;
}

fn dying_orcs(world: &World) -> usize {
    world
        .enemies()
        .iter()
        .filter_map(|e| e.as_orc())
        .filter(|orc| orc.is_dying())
        .count()
}

fn count_orc_voices(world: &World) -> usize {
    world
        .audio()
        .pending()
        .iter()
        .filter(|e| matches!(e, AudioEvent::Play { cue: Cue::OrcVoice(_), .. }))
        .count()
}

#[derive(Debug, PartialEq)]
enum Op {
    Clear,
    Translate(f32),
    Image(SpriteId, bool),
    Bar(BarKind),
    Overlay(Outcome),
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
}

impl Canvas for Recorder {
    fn clear(&mut self) {
        self.ops.push(Op::Clear);
    }

    fn translate(&mut self, dx: f32) {
        self.ops.push(Op::Translate(dx));
    }

    fn draw_image(&mut self, sprite: SpriteId, _rect: Rect, mirrored: bool) {
        self.ops.push(Op::Image(sprite, mirrored));
    }

    fn draw_bar(&mut self, bar: &StatusBar) {
        self.ops.push(Op::Bar(bar.kind));
    }

    fn draw_overlay(&mut self, outcome: Outcome) {
        self.ops.push(Op::Overlay(outcome));
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn level_one_spawns_its_roster() {
    let world = world_with(LevelData::level_one());
    assert_eq!(world.enemies().len(), 10);
    assert!(world.boss().is_none());
    assert_eq!(world.level().coins.len(), 10);
    assert_eq!(world.level().ammo.len(), 8);
    assert_eq!(world.level().backgrounds.len(), 8 * 4);
    for orc in world.enemies().iter().filter_map(|e| e.as_orc()) {
        assert!((700.0..3000.0).contains(&orc.body().x));
    }
}

#[test]
fn same_seed_same_world() {
    let a = world_with(LevelData::level_one());
    let b = world_with(LevelData::level_one());
    let xs = |w: &World| w.enemies().iter().map(|e| e.body().x).collect::<Vec<_>>();
    assert_eq!(xs(&a), xs(&b));
}

#[test]
fn explicit_orc_positions_are_kept() {
    let mut data = LevelData::empty();
    data.orcs = vec![brawler::level::OrcSpawn { x: Some(1234.0) }];
    let world = world_with(data);
    assert_eq!(world.enemies()[0].body().x, 1234.0);
}

// ── Camera & motion ───────────────────────────────────────────────────────────

#[test]
fn camera_follows_character() {
    let mut world = empty_world();
    assert_eq!(world.camera_x(), 0.0);
    world.keyboard_mut().set_down(Key::Right, true);
    world.advance(160);
    assert_eq!(world.character().body().x, 150.0);
    assert_eq!(world.camera_x(), CAMERA_ANCHOR_X - 150.0);
}

// ── Boss spawn & intro ────────────────────────────────────────────────────────

#[test]
fn boss_spawns_once_past_trigger() {
    let mut world = empty_world();
    place_character(&mut world, 3400.0);
    world.advance(100);
    assert!(world.boss().is_none());

    place_character(&mut world, 3501.0);
    world.advance(16);
    assert!(world.boss().is_some());
    assert!(world.level().is_boss_spawned());

    for x in [3400.0, 3510.0, 3300.0, 3520.0] {
        place_character(&mut world, x);
        world.advance(50);
    }
    let bosses = world.enemies().iter().filter(|e| e.as_boss().is_some()).count();
    assert_eq!(bosses, 1);
}

#[test]
fn boss_activation_runs_intro() {
    let mut world = empty_world();
    place_character(&mut world, 3560.0);
    world.advance(32);
    assert!(world.boss().map_or(false, |b| b.is_activated()));
    assert!(world.is_boss_intro_active());
    assert!(world.is_frozen());
    assert_eq!(world.audio().count_pending(Cue::BossAlert), 1);

    // Movement is frozen for the whole intro.
    world.keyboard_mut().set_down(Key::Right, true);
    world.advance(500);
    assert_eq!(world.character().body().x, 3560.0);
    world.keyboard_mut().set_down(Key::Right, false);

    world.advance(INTRO_MS);
    assert!(!world.is_boss_intro_active());
    assert!(!world.is_frozen());
}

#[test]
fn boss_stays_active_after_character_retreats() {
    let mut world = empty_world();
    place_character(&mut world, 3560.0);
    world.advance(32 + INTRO_MS);
    place_character(&mut world, 500.0);
    world.advance(500);
    assert!(world.boss().map_or(false, |b| b.is_activated()));
    assert_eq!(world.audio().count_pending(Cue::BossAlert), 1);
}

// ── Combat ────────────────────────────────────────────────────────────────────

#[test]
fn projectile_kills_only_one_stacked_orc() {
    let mut world = empty_world();
    world.spawn_orc(400.0);
    world.spawn_orc(400.0);
    world.set_ammo(1);
    world.keyboard_mut().press(Key::Throw);
    world.advance(1000);

    assert_eq!(dying_orcs(&world), 1);
    assert!(world.projectiles().is_empty());
    assert_eq!(world.ammo(), 0);
    assert_eq!(world.audio().count_pending(Cue::Throw), 1);
    assert_eq!(world.audio().count_pending(Cue::Splash), 1);
    assert_eq!(world.audio().count_pending(Cue::OrcDeath), 1);
}

#[test]
fn ammo_limits_throws() {
    let mut world = empty_world();
    world.set_ammo(2);
    for _ in 0..3 {
        world.keyboard_mut().press(Key::Throw);
        world.advance(400);
    }
    assert_eq!(world.audio().count_pending(Cue::Throw), 2);
    assert_eq!(world.ammo(), 0);
    assert_eq!(world.hud().ammo.percentage(), 0.0);
}

#[test]
fn stray_projectile_leaves_the_level() {
    let mut world = empty_world();
    world.set_ammo(1);
    world.keyboard_mut().press(Key::Throw);
    world.advance(400);
    assert_eq!(world.projectiles().len(), 1);
    world.advance(15_000);
    assert!(world.projectiles().is_empty());
    assert_eq!(world.audio().count_pending(Cue::Splash), 0);
}

#[test]
fn splash_effect_plays_out_and_disappears() {
    let mut world = empty_world();
    world.spawn_orc(400.0);
    world.set_ammo(1);
    world.keyboard_mut().press(Key::Throw);
    world.advance(1000);
    world.advance(1000);
    assert!(world.effects().is_empty());
}

#[test]
fn melee_hits_exactly_one_of_three() {
    let mut world = empty_world();
    for _ in 0..3 {
        world.spawn_orc(200.0);
    }
    world.keyboard_mut().press(Key::Attack);
    world.advance(400);
    assert_eq!(dying_orcs(&world), 1);
    assert_eq!(world.audio().count_pending(Cue::Hit), 1);
}

#[test]
fn killed_orc_leaves_the_registry() {
    let mut world = empty_world();
    world.spawn_orc(200.0);
    world.spawn_orc(2000.0);
    assert_eq!(world.registry().tracked(), 2);
    world.keyboard_mut().press(Key::Attack);
    world.advance(400);
    assert_eq!(dying_orcs(&world), 1);
    assert_eq!(world.registry().tracked(), 1);
}

#[test]
fn orc_contact_hurts_character() {
    let mut world = empty_world();
    world.spawn_orc(110.0);
    world.advance(16);
    assert_eq!(world.character().energy(), 90);
    assert_eq!(world.hud().health.percentage(), 90.0);
    // Grace window: no further contact damage for a second.
    world.advance(500);
    assert_eq!(world.character().energy(), 90);
}

#[test]
fn hit_character_updates_health_bar() {
    let mut world = empty_world();
    world.hit_character(30);
    assert_eq!(world.character().energy(), 70);
    assert_eq!(world.hud().health.percentage(), 70.0);
}

// ── Boss fight ────────────────────────────────────────────────────────────────

/// Character parked against the boss's soft wall with the intro over.
fn boss_fight() -> World {
    let mut world = empty_world();
    place_character(&mut world, 3810.0);
    world.advance(32 + INTRO_MS);
    assert!(world.boss().map_or(false, |b| b.is_activated()));
    assert!(!world.is_boss_intro_active());
    world
}

#[test]
fn boss_swing_hits_once_per_damage_cooldown() {
    let mut world = boss_fight();
    assert_eq!(world.character().energy(), 100);

    world.advance(1200);
    assert_eq!(world.character().energy(), 75);
    assert_eq!(world.hud().health.percentage(), 75.0);

    // The next swing cannot start before the attack cooldown runs out.
    world.advance(500);
    assert_eq!(world.character().energy(), 75);

    world.advance(1000);
    assert_eq!(world.character().energy(), 50);
}

#[test]
fn projectile_hit_lowers_boss_bar() {
    let mut world = boss_fight();
    world.set_ammo(1);
    world.keyboard_mut().press(Key::Throw);
    world.advance(400);

    assert!(world.projectiles().is_empty());
    assert_eq!(world.boss().map(|b| b.energy()), Some(80));
    assert_eq!(world.hud().boss.percentage(), 80.0);
    assert_eq!(world.audio().count_pending(Cue::Splash), 1);
}

#[test]
fn killing_the_boss_wins() {
    let mut world = boss_fight();
    world.set_ammo(MAX_AMMO);
    for _ in 0..MAX_AMMO {
        world.keyboard_mut().press(Key::Throw);
        world.advance(600);
    }

    assert!(world.boss().map_or(false, |b| b.is_dead()));
    assert_eq!(world.hud().boss.percentage(), 0.0);
    assert!(!world.character().is_dead());
    assert!(world.is_game_ending());
    assert_eq!(world.outcome(), Some(Outcome::Victory));
    assert_eq!(world.audio().count_pending(Cue::BossDeath), 1);
    assert_eq!(world.audio().count_pending(Cue::Win), 1);

    world.advance(VICTORY_FREEZE_MS);
    assert!(world.is_game_ended());
    assert_eq!(world.overlay(), Some(Outcome::Victory));
}

// ── Pickups ───────────────────────────────────────────────────────────────────

#[test]
fn touching_pickups_are_collected() {
    let mut data = LevelData::empty();
    data.coins = vec![PickupSpawn { x: 100.0, y: 250.0 }, PickupSpawn { x: 2000.0, y: 250.0 }];
    data.ammo = vec![PickupSpawn { x: 110.0, y: 330.0 }];
    let mut world = world_with(data);
    world.advance(16);

    assert_eq!(world.coins_collected(), 1);
    assert_eq!(world.level().coins.len(), 1);
    assert_eq!(world.hud().coins.percentage(), 50.0);
    assert_eq!(world.audio().count_pending(Cue::Coin), 1);
    assert_eq!(world.ammo(), 1);
    assert!((world.hud().ammo.percentage() - 20.0).abs() < 1e-3);
}

#[test]
fn ammo_is_capped() {
    let mut data = LevelData::empty();
    data.ammo = vec![PickupSpawn { x: 110.0, y: 330.0 }; MAX_AMMO as usize + 2];
    let mut world = world_with(data);
    world.advance(16);
    assert_eq!(world.ammo(), MAX_AMMO);
    assert!(world.level().ammo.is_empty());
    assert_eq!(world.hud().ammo.percentage(), 100.0);
}

// ── Orc voices ────────────────────────────────────────────────────────────────

#[test]
fn visible_orc_speaks() {
    let mut world = empty_world();
    world.spawn_orc(600.0);
    world.advance(6100);
    assert_eq!(count_orc_voices(&world), 1);
}

#[test]
fn muted_world_stays_silent() {
    let mut world = empty_world();
    world.spawn_orc(600.0);
    world.audio_mut().set_muted(true);
    world.advance(6100);
    assert_eq!(count_orc_voices(&world), 0);
}

#[test]
fn offscreen_orcs_stay_quiet() {
    let mut world = empty_world();
    world.spawn_orc(3000.0);
    world.advance(6100);
    assert_eq!(count_orc_voices(&world), 0);
}

// ── End of game ───────────────────────────────────────────────────────────────

#[test]
fn defeat_sequence_timing() {
    let mut world = empty_world();
    world.hit_character(100);
    world.advance(16);
    assert!(world.is_game_ending());
    assert_eq!(world.outcome(), Some(Outcome::Defeat));
    assert!(world.audio().pending().contains(&AudioEvent::PauseAll));
    assert_eq!(world.audio().count_pending(Cue::Death), 1);

    world.advance(OVERLAY_DELAY_MS - 1);
    assert_eq!(world.overlay(), None);
    world.advance(1);
    assert_eq!(world.overlay(), Some(Outcome::Defeat));

    world.advance(DEFEAT_FREEZE_MS - OVERLAY_DELAY_MS - 1);
    assert!(!world.is_game_ended());
    world.advance(1);
    assert!(world.is_game_ended());
    assert!(world.timers().is_empty());
    assert!(world.timers().is_closed());
}

#[test]
fn victory_waits_longer_and_plays_win() {
    let mut world = empty_world();
    world.start_end_sequence(Outcome::Victory);
    assert_eq!(world.audio().count_pending(Cue::Win), 1);
    world.advance(DEFEAT_FREEZE_MS);
    assert!(!world.is_game_ended());
    world.advance(VICTORY_FREEZE_MS - DEFEAT_FREEZE_MS);
    assert!(world.is_game_ended());
    assert_eq!(world.overlay(), Some(Outcome::Victory));
}

#[test]
fn end_sequence_starts_once() {
    let mut world = empty_world();
    world.start_end_sequence(Outcome::Victory);
    world.start_end_sequence(Outcome::Defeat);
    assert_eq!(world.outcome(), Some(Outcome::Victory));
    assert_eq!(world.audio().count_pending(Cue::Win), 1);
}

#[test]
fn ending_drops_input_and_logic() {
    let mut data = LevelData::empty();
    data.coins = vec![PickupSpawn { x: 100.0, y: 250.0 }];
    let mut world = world_with(data);
    world.keyboard_mut().set_down(Key::Right, true);
    world.start_end_sequence(Outcome::Defeat);
    assert!(!world.keyboard_mut().is_down(Key::Right));
    world.advance(100);
    assert_eq!(world.coins_collected(), 0);
}

#[test]
fn frozen_world_stops_moving() {
    let mut world = empty_world();
    world.spawn_orc(900.0);
    world.start_end_sequence(Outcome::Defeat);
    world.advance(DEFEAT_FREEZE_MS);
    let x = world.enemies()[0].body().x;
    world.keyboard_mut().set_down(Key::Right, true);
    world.advance(5000);
    assert_eq!(world.enemies()[0].body().x, x);
    assert_eq!(world.character().body().x, 100.0);
}

// ── Rendering ─────────────────────────────────────────────────────────────────

#[test]
fn render_stops_after_freeze() {
    let mut world = empty_world();
    let mut canvas = Recorder::default();
    assert!(world.render(&mut canvas));
    assert!(world.render(&mut canvas));
    world.start_end_sequence(Outcome::Defeat);
    world.advance(DEFEAT_FREEZE_MS);
    canvas.ops.clear();
    assert!(!world.render(&mut canvas));
    assert!(canvas.ops.is_empty());
}

#[test]
fn draw_order_back_to_front() {
    let mut data = LevelData::empty();
    data.coins = vec![PickupSpawn { x: 1000.0, y: 250.0 }];
    data.ammo = vec![PickupSpawn { x: 1200.0, y: 330.0 }];
    let mut world = world_with(data);
    world.spawn_orc(900.0);

    let mut canvas = Recorder::default();
    world.draw(&mut canvas);
    let ops = &canvas.ops;

    assert_eq!(ops[0], Op::Clear);
    assert_eq!(ops[1], Op::Translate(0.0));
    let images: Vec<SpriteId> = ops
        .iter()
        .filter_map(|op| match op {
            Op::Image(sprite, _) => Some(*sprite),
            _ => None,
        })
        .collect();
    assert_eq!(images.len(), 32 + 4);
    assert!(images[..32].iter().all(|s| s.starts_with("background/")));
    assert!(images[32].starts_with("pickup/coin"));
    assert!(images[33].starts_with("pickup/ammo"));
    assert!(images[34].starts_with("orc/"));
    assert!(images[35].starts_with("character/"));

    let tail = &ops[ops.len() - 4..];
    assert_eq!(
        tail,
        &[Op::Translate(-0.0), Op::Bar(BarKind::Health), Op::Bar(BarKind::Coins), Op::Bar(BarKind::Ammo)]
    );
}

#[test]
fn boss_bar_and_overlay_are_drawn_last() {
    let mut world = empty_world();
    place_character(&mut world, 3501.0);
    world.advance(16);
    world.start_end_sequence(Outcome::Victory);
    world.advance(OVERLAY_DELAY_MS);

    let mut canvas = Recorder::default();
    world.draw(&mut canvas);
    let tail = &canvas.ops[canvas.ops.len() - 2..];
    assert_eq!(tail, &[Op::Bar(BarKind::Boss), Op::Overlay(Outcome::Victory)]);
}

#[test]
fn character_mirrored_when_facing_left() {
    let mut world = empty_world();
    world.keyboard_mut().set_down(Key::Left, true);
    world.advance(16);
    world.keyboard_mut().set_down(Key::Left, false);
    assert!(world.character().is_facing_left());

    let mut canvas = Recorder::default();
    world.draw(&mut canvas);
    let last_image = canvas.ops.iter().rev().find_map(|op| match op {
        Op::Image(_, mirrored) => Some(*mirrored),
        _ => None,
    });
    assert_eq!(last_image, Some(true));
    assert_eq!(canvas.ops[1], Op::Translate(CAMERA_ANCHOR_X - 95.0));
}
