//! Entity base geometry and the axis-aligned overlap test.
//!
//! Every drawn, moving thing carries a `Body`: its nominal box (what the
//! renderer paints) plus an `Inset` that shrinks the box before any
//! collision check, so transparent sprite margins never register hits.

use crate::animation::SpriteId;

// ── Rectangles ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// A rectangle with no positive area never overlaps anything.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Collision inset: `x`/`y` move the left/top edge in, `width`/`height`
/// are the total reduction of the box size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Inset {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Inset {
    pub const NONE: Inset = Inset { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

// ── Entity base ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub offset: Inset,
    /// Sprite currently shown for this entity.
    pub sprite: SpriteId,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32, offset: Inset, sprite: SpriteId) -> Self {
        Self { x, y, width, height, offset, sprite }
    }

    /// Nominal box, as drawn.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Box used for hit detection.
    pub fn hitbox(&self) -> Rect {
        Rect::new(
            self.x + self.offset.x,
            self.y + self.offset.y,
            self.width - self.offset.width,
            self.height - self.offset.height,
        )
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Do the inset boxes of `a` and `b` intersect?
pub fn overlaps(a: &Body, b: &Body) -> bool {
    a.hitbox().intersects(&b.hitbox())
}
