//! Scheduling vocabulary shared by the world and its entities.

use crate::audio::Audio;
use crate::timers::{TimerId, TimerScope};

/// Logic tick and per-entity motion rate: 60 Hz.
pub const FRAME_MS: u64 = 1000 / 60;
/// Continuous (walk / idle / hurt) animation rate: 10 fps.
pub const ANIMATION_MS: u64 = 100;
/// Gravity step: 25 Hz.
pub const GRAVITY_MS: u64 = 1000 / 25;

/// Visible slice of the world.
pub const VIEW_WIDTH: f32 = 720.0;
pub const VIEW_HEIGHT: f32 = 480.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrcId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u32);

/// Every action that can be scheduled in a world's `TimerScope`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    LogicTick,
    CharacterMotion,
    CharacterGravity,
    CharacterAnimation,
    CharacterAttackFrame,
    CharacterDeathFrame,
    OrcMove(OrcId),
    OrcAnimate(OrcId),
    OrcDeathFrame(OrcId),
    OrcVoice,
    BossBrain,
    BossAnimation,
    ProjectileFlight(ProjectileId),
    EffectFrame(EffectId),
    EndIntro,
    ShowOverlay,
    HardFreeze,
}

pub type WorldTimers = TimerScope<Task>;

/// Collaborators handed to an entity for the duration of one callback.
pub struct Ctx<'a> {
    pub now: u64,
    pub timers: &'a mut WorldTimers,
    pub audio: &'a mut Audio,
}

impl<'a> Ctx<'a> {
    pub fn new(now: u64, timers: &'a mut WorldTimers, audio: &'a mut Audio) -> Self {
        Self { now, timers, audio }
    }

    pub fn every(&mut self, period_ms: u64, task: Task) -> TimerId {
        self.timers.every(self.now, period_ms, task)
    }

    pub fn after(&mut self, delay_ms: u64, task: Task) -> TimerId {
        self.timers.after(self.now, delay_ms, task)
    }

    /// Milliseconds since `at`, or `None` if it never happened.
    pub fn since(&self, at: Option<u64>) -> Option<u64> {
        at.map(|t| self.now.saturating_sub(t))
    }
}
