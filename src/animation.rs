//! Sprite-sequence animation drivers.

/// Identifier of a single sprite frame, e.g. `"orc/walk_2"`.
pub type SpriteId = &'static str;

/// An ordered list of frames played as one animation.
pub type Sequence = &'static [SpriteId];

/// Cyclic driver. One counter per entity is shared by every sequence the
/// entity plays, so switching sequences does not restart the cycle.
#[derive(Clone, Debug, Default)]
pub struct Animation {
    counter: usize,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `sequence[counter % len]` and bumps the counter.
    /// An empty sequence yields nothing and leaves the counter alone.
    pub fn advance(&mut self, sequence: Sequence) -> Option<SpriteId> {
        if sequence.is_empty() {
            return None;
        }
        let frame = sequence[self.counter % sequence.len()];
        self.counter = self.counter.wrapping_add(1);
        Some(frame)
    }

    pub fn counter(&self) -> usize {
        self.counter
    }
}

/// One-shot driver: walks a sequence once and then keeps returning the
/// final frame. Used for death and hurt sequences that must never wrap.
#[derive(Clone, Debug, Default)]
pub struct OneShot {
    index: usize,
    finished: bool,
}

impl OneShot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_once(&mut self, sequence: Sequence) -> Option<SpriteId> {
        let last = sequence.len().checked_sub(1)?;
        let i = self.index.min(last);
        if i == last {
            self.finished = true;
        } else {
            self.index = i + 1;
        }
        Some(sequence[i])
    }

    /// True once the final frame has been returned.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.finished = false;
    }
}
