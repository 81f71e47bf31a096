//! The drawing collaborator and the render-tick scheduling guard.

use crate::animation::SpriteId;
use crate::collision::Rect;
use crate::hud::StatusBar;
use crate::world::Outcome;

/// What the world needs from a display surface. Coordinates are world
/// units; `translate` shifts everything drawn afterwards.
pub trait Canvas {
    fn clear(&mut self);
    fn translate(&mut self, dx: f32);
    /// Draws `sprite` into `rect`, mirrored around the rect's own width
    /// when `mirrored` is set.
    fn draw_image(&mut self, sprite: SpriteId, rect: Rect, mirrored: bool);
    fn draw_bar(&mut self, bar: &StatusBar);
    fn draw_overlay(&mut self, outcome: Outcome);
}

/// Self-rescheduling render tick. At most one frame is ever pending, and
/// nothing is scheduled once the loop is stopped.
#[derive(Clone, Debug, Default)]
pub struct RenderLoop {
    running: bool,
    scheduled: bool,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
        self.schedule();
    }

    /// Returns false when a frame is already pending or the loop stopped.
    pub fn schedule(&mut self) -> bool {
        if !self.running || self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Consumes the pending frame, if any.
    pub fn take(&mut self) -> bool {
        let due = self.running && self.scheduled;
        self.scheduled = false;
        due
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.scheduled = false;
    }
}
