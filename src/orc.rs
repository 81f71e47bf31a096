//! Regular enemies: leftward drift, walk cycle, one-shot death, and the
//! per-world registry that declusters spawns and schedules their voices.

use rand::Rng;
use tracing::debug;

use crate::animation::{Animation, OneShot};
use crate::audio::Cue;
use crate::collision::{Body, Inset, Rect};
use crate::sim::{Ctx, OrcId, Task, ANIMATION_MS, FRAME_MS};
use crate::sprites;
use crate::timers::TimerId;

pub const WIDTH: f32 = 100.0;
pub const HEIGHT: f32 = 110.0;
pub const GROUND_Y: f32 = 320.0;
pub const OFFSET: Inset = Inset::new(15.0, 15.0, 30.0, 25.0);
pub const MIN_SPEED: f32 = 0.3;
pub const MAX_SPEED: f32 = 0.8;
pub const DEATH_FRAME_MS: u64 = 90;
pub const CONTACT_DAMAGE: u32 = 10;

#[derive(Clone, Debug)]
pub struct Orc {
    id: OrcId,
    body: Body,
    speed: f32,
    dying: bool,
    collidable: bool,
    walk: Animation,
    death: OneShot,
    move_timer: TimerId,
    animate_timer: TimerId,
    death_timer: Option<TimerId>,
}

impl Orc {
    pub fn spawn(id: OrcId, x: f32, rng: &mut impl Rng, ctx: &mut Ctx) -> Self {
        let speed = rng.gen_range(MIN_SPEED..MAX_SPEED);
        let move_timer = ctx.every(FRAME_MS, Task::OrcMove(id));
        let animate_timer = ctx.every(ANIMATION_MS, Task::OrcAnimate(id));
        Self {
            id,
            body: Body::new(x, GROUND_Y, WIDTH, HEIGHT, OFFSET, sprites::ORC_WALK[0]),
            speed,
            dying: false,
            collidable: true,
            walk: Animation::new(),
            death: OneShot::new(),
            move_timer,
            animate_timer,
            death_timer: None,
        }
    }

    pub fn id(&self) -> OrcId {
        self.id
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

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_dying(&self) -> bool {
        self.dying
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn step(&mut self, paused: bool) {
        if paused || self.dying {
            return;
        }
        self.body.x -= self.speed;
    }

    pub fn animate(&mut self, paused: bool) {
        if paused || self.dying {
            return;
        }
        if let Some(sprite) = self.walk.advance(sprites::ORC_WALK) {
            self.body.sprite = sprite;
        }
    }

    /// Starts the death sequence. Repeated calls do nothing.
    pub fn die(&mut self, ctx: &mut Ctx) {
        if self.dying {
            return;
        }
        self.dying = true;
        self.speed = 0.0;
        ctx.timers.cancel(self.move_timer);
        ctx.timers.cancel(self.animate_timer);

        // Corpse sprite is wider and flatter; keep its feet on the ground.
        let height = self.body.height * 0.8;
        self.body.y += self.body.height - height;
        self.body.width *= 1.4;
        self.body.height = height;

        ctx.audio.play(Cue::OrcDeath);
        self.death.reset();
        if let Some(sprite) = self.death.advance_once(sprites::ORC_DEAD) {
            self.body.sprite = sprite;
        }
        self.death_timer = Some(ctx.every(DEATH_FRAME_MS, Task::OrcDeathFrame(self.id)));
        debug!(id = self.id.0, x = self.body.x, "orc_died");
    }

    /// The last death frame turns the orc into a non-collidable corpse.
    pub fn death_frame(&mut self, ctx: &mut Ctx) {
        if let Some(sprite) = self.death.advance_once(sprites::ORC_DEAD) {
            self.body.sprite = sprite;
        }
        if self.death.is_finished() {
            self.collidable = false;
            if let Some(timer) = self.death_timer.take() {
                ctx.timers.cancel(timer);
            }
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

pub const PLACEMENT_ATTEMPTS: u32 = 30;
pub const VOICE_BASE_MS: u64 = 6000;
pub const VOICE_FLOOR_MS: u64 = 1500;
pub const VOICE_CLIPS: u8 = 3;
const VOICE_PITCH_MIN: f32 = 0.92;
const VOICE_PITCH_MAX: f32 = 1.08;

/// Orc bookkeeping owned by one world: spawn positions for declustering and
/// the round-robin voice rotation.
#[derive(Clone, Debug, Default)]
pub struct OrcRegistry {
    placed: Vec<(OrcId, f32)>,
    next_id: u32,
    next_clip: u8,
}

impl OrcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> OrcId {
        let id = OrcId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn track(&mut self, id: OrcId, x: f32) {
        self.placed.push((id, x));
    }

    /// Frees a dead orc's spawn position for later placements.
    pub fn untrack(&mut self, id: OrcId) {
        self.placed.retain(|&(other, _)| other != id);
    }

    pub fn tracked(&self) -> usize {
        self.placed.len()
    }

    /// Picks an x inside `band` at least `min_gap` away from every tracked
    /// orc. After `PLACEMENT_ATTEMPTS` misses any x in the band is accepted.
    pub fn place(&self, band: (f32, f32), min_gap: f32, rng: &mut impl Rng) -> f32 {
        let (low, high) = band;
        if !(low < high) {
            return low;
        }
        for _ in 0..PLACEMENT_ATTEMPTS {
            let x = rng.gen_range(low..high);
            if self.placed.iter().all(|&(_, other)| (other - x).abs() >= min_gap) {
                return x;
            }
        }
        rng.gen_range(low..high)
    }

    /// Delay until the next voice line: shorter with more orcs on screen.
    pub fn voice_delay(&self, chasing: usize) -> u64 {
        if chasing == 0 {
            return VOICE_BASE_MS;
        }
        (VOICE_BASE_MS / chasing as u64).max(VOICE_FLOOR_MS)
    }

    pub fn next_clip(&mut self) -> u8 {
        let clip = self.next_clip;
        self.next_clip = (clip + 1) % VOICE_CLIPS;
        clip
    }

    pub fn voice_pitch(rng: &mut impl Rng) -> f32 {
        rng.gen_range(VOICE_PITCH_MIN..VOICE_PITCH_MAX)
    }
}
