//! Fixed-position percentage bars.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BarKind {
    Health,
    Coins,
    Ammo,
    Boss,
}

/// Number of discrete fill steps a bar can show.
pub const BAR_STEPS: usize = 6;

/// Maps a 0–100 percentage onto one of the six fill steps by flooring to
/// the nearest band of 20.
pub fn resolve_image_index(percentage: f32) -> usize {
    if percentage >= 100.0 {
        5
    } else if percentage >= 80.0 {
        4
    } else if percentage >= 60.0 {
        3
    } else if percentage >= 40.0 {
        2
    } else if percentage >= 20.0 {
        1
    } else {
        0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusBar {
    pub kind: BarKind,
    pub x: f32,
    pub y: f32,
    percentage: f32,
}

impl StatusBar {
    pub fn new(kind: BarKind, x: f32, y: f32, percentage: f32) -> Self {
        let mut bar = Self { kind, x, y, percentage: 0.0 };
        bar.set_percentage(percentage);
        bar
    }

    /// Out-of-range values are clamped, never rejected.
    pub fn set_percentage(&mut self, percentage: f32) {
        self.percentage = if percentage.is_nan() {
            0.0
        } else {
            percentage.clamp(0.0, 100.0)
        };
    }

    pub fn percentage(&self) -> f32 {
        self.percentage
    }

    pub fn image_index(&self) -> usize {
        resolve_image_index(self.percentage)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub health: StatusBar,
    pub coins: StatusBar,
    pub ammo: StatusBar,
    pub boss: StatusBar,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            health: StatusBar::new(BarKind::Health, 20.0, 0.0, 100.0),
            coins: StatusBar::new(BarKind::Coins, 20.0, 45.0, 0.0),
            ammo: StatusBar::new(BarKind::Ammo, 20.0, 90.0, 0.0),
            boss: StatusBar::new(BarKind::Boss, 500.0, 0.0, 100.0),
        }
    }
}

/// `part / whole` as a percentage; an empty whole reads as 0%.
pub fn percent_of(part: u32, whole: u32) -> f32 {
    if whole == 0 {
        0.0
    } else {
        part as f32 / whole as f32 * 100.0
    }
}
