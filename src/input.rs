//! Shared input state: held flags plus press edges.
//!
//! The front end sets held flags every frame and calls `press` only for a
//! fresh key-down, never for key-repeat. Attacks consume edges with
//! `take_press`, so holding a key cannot chain attacks.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Attack,
    Throw,
}

impl Key {
    pub const ALL: [Key; 7] = [
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Space,
        Key::Attack,
        Key::Throw,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, Default)]
pub struct Keyboard {
    held: [bool; 7],
    pressed: [bool; 7],
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_down(mut self, key: Key) -> Self {
        self.set_down(key, true);
        self
    }

    pub fn set_down(&mut self, key: Key, down: bool) {
        self.held[key.index()] = down;
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held[key.index()]
    }

    pub fn any_down(&self) -> bool {
        self.held.iter().any(|&h| h)
    }

    /// Fresh key-down: marks the key held and latches a press edge.
    pub fn press(&mut self, key: Key) {
        self.held[key.index()] = true;
        self.pressed[key.index()] = true;
    }

    pub fn release(&mut self, key: Key) {
        self.held[key.index()] = false;
    }

    /// Consumes the press edge for `key`, if any.
    pub fn take_press(&mut self, key: Key) -> bool {
        std::mem::replace(&mut self.pressed[key.index()], false)
    }

    /// Zeroes every flag and edge.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
