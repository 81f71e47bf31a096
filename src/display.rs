/// Rendering layer — all terminal I/O lives here.
///
/// `TerminalCanvas` implements the world's `Canvas` by rasterising sprites
/// into a cell buffer scaled from the 720×480 world view to the terminal.
/// `present` then writes the buffer, border, hints and sound captions.
/// No game logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use brawler::animation::SpriteId;
use brawler::audio::Cue;
use brawler::collision::Rect;
use brawler::hud::{BarKind, StatusBar, BAR_STEPS};
use brawler::render::Canvas;
use brawler::sim::{VIEW_HEIGHT, VIEW_WIDTH};
use brawler::world::Outcome;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_GROUND: Color = Color::DarkGreen;
const C_CLOUD: Color = Color::DarkGrey;
const C_CHARACTER: Color = Color::White;
const C_CHARACTER_HURT: Color = Color::Red;
const C_ORC: Color = Color::Green;
const C_CORPSE: Color = Color::DarkGrey;
const C_BOSS: Color = Color::Magenta;
const C_BOSS_ATTACK: Color = Color::Red;
const C_PROJECTILE: Color = Color::Cyan;
const C_SPLASH: Color = Color::Blue;
const C_COIN: Color = Color::Yellow;
const C_AMMO: Color = Color::Cyan;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_COINS: Color = Color::Yellow;
const C_HUD_AMMO: Color = Color::Cyan;
const C_HUD_BOSS: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;
const C_CAPTION: Color = Color::Yellow;

/// Play area: inside the border, between the HUD row and the hint row.
const TOP: u16 = 2;
const BOTTOM_MARGIN: u16 = 2;

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Color,
}

pub struct TerminalCanvas {
    width: u16,
    height: u16,
    cells: Vec<Option<Cell>>,
    bars: Vec<(BarKind, usize)>,
    overlay: Option<Outcome>,
    offset_x: f32,
}

impl TerminalCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            bars: Vec::new(),
            overlay: None,
            offset_x: 0.0,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    fn play_cols(&self) -> f32 {
        self.width.saturating_sub(2).max(1) as f32
    }

    fn play_rows(&self) -> f32 {
        self.height.saturating_sub(TOP + BOTTOM_MARGIN).max(1) as f32
    }

    fn col(&self, x: f32) -> i32 {
        1 + ((x + self.offset_x) * self.play_cols() / VIEW_WIDTH).floor() as i32
    }

    fn row(&self, y: f32) -> i32 {
        TOP as i32 + (y * self.play_rows() / VIEW_HEIGHT).floor() as i32
    }

    fn put(&mut self, col: i32, row: i32, ch: char, color: Color) {
        let inside = col >= 1
            && col < self.width as i32 - 1
            && row >= TOP as i32
            && row < (self.height.saturating_sub(BOTTOM_MARGIN)) as i32;
        if inside && ch != ' ' {
            let index = row as usize * self.width as usize + col as usize;
            self.cells[index] = Some(Cell { ch, color });
        }
    }

    /// Stamps `rows` bottom-aligned and horizontally centred on `rect`.
    fn stamp(&mut self, rect: Rect, rows: &[&str], color: Color, mirrored: bool) {
        let centre = self.col(rect.x + rect.width / 2.0);
        let bottom = self.row(rect.bottom()) - 1;
        let first = bottom - rows.len() as i32 + 1;
        for (i, line) in rows.iter().enumerate() {
            let glyphs: Vec<char> = if mirrored {
                line.chars().rev().map(mirror_char).collect()
            } else {
                line.chars().collect()
            };
            let left = centre - glyphs.len() as i32 / 2;
            for (j, ch) in glyphs.into_iter().enumerate() {
                self.put(left + j as i32, first + i as i32, ch, color);
            }
        }
    }

    fn fill_row(&mut self, rect: Rect, y: f32, ch: char, color: Color) {
        let row = self.row(y);
        for col in self.col(rect.x)..self.col(rect.right()) {
            self.put(col, row, ch, color);
        }
    }

    // ── Output ────────────────────────────────────────────────────────────────

    /// Writes the rasterised frame plus `captions` (recent sound cues).
    pub fn present<W: Write>(&self, out: &mut W, captions: &[&str], muted: bool) -> std::io::Result<()> {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        self.draw_border(out)?;
        self.draw_cells(out)?;
        self.draw_bars(out)?;
        draw_hint_line(out, self.height, captions, muted)?;
        if let Some(outcome) = self.overlay {
            self.draw_overlay_box(out, outcome)?;
        }
        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, self.height.saturating_sub(1)))?;
        out.flush()?;
        Ok(())
    }

    fn draw_border<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let w = self.width as usize;
        let h = self.height;
        out.queue(style::SetForegroundColor(C_BORDER))?;
        out.queue(cursor::MoveTo(0, 1))?;
        out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;
        out.queue(cursor::MoveTo(0, h.saturating_sub(BOTTOM_MARGIN)))?;
        out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;
        for row in TOP..h.saturating_sub(BOTTOM_MARGIN) {
            out.queue(cursor::MoveTo(0, row))?;
            out.queue(Print("│"))?;
            out.queue(cursor::MoveTo(self.width.saturating_sub(1), row))?;
            out.queue(Print("│"))?;
        }
        Ok(())
    }

    /// One `Print` per same-coloured run keeps the command stream short.
    fn draw_cells<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let width = self.width as usize;
        for (row, line) in self.cells.chunks(width.max(1)).enumerate() {
            let mut col = 0;
            while col < line.len() {
                let Some(cell) = line[col] else {
                    col += 1;
                    continue;
                };
                let start = col;
                let mut run = String::new();
                while let Some(Some(next)) = line.get(col) {
                    if next.color != cell.color {
                        break;
                    }
                    run.push(next.ch);
                    col += 1;
                }
                out.queue(cursor::MoveTo(start as u16, row as u16))?;
                out.queue(style::SetForegroundColor(cell.color))?;
                out.queue(Print(run))?;
            }
        }
        Ok(())
    }

    fn draw_bars<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for &(kind, step) in &self.bars {
            let (label, color, col) = match kind {
                BarKind::Health => ("HP", C_HUD_HEALTH, 1),
                BarKind::Coins => ("$ ", C_HUD_COINS, 16),
                BarKind::Ammo => ("AM", C_HUD_AMMO, 31),
                BarKind::Boss => ("BOSS", C_HUD_BOSS, self.width.saturating_sub(17)),
            };
            let filled = "█".repeat(step);
            let empty = "░".repeat(BAR_STEPS - 1 - step.min(BAR_STEPS - 1));
            out.queue(cursor::MoveTo(col, 0))?;
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(format!("{label}[{filled}{empty}]")))?;
        }
        Ok(())
    }

    fn draw_overlay_box<W: Write>(&self, out: &mut W, outcome: Outcome) -> std::io::Result<()> {
        let (title, color) = match outcome {
            Outcome::Victory => ("║     VICTORY!       ║", Color::Yellow),
            Outcome::Defeat => ("║    GAME  OVER      ║", Color::Red),
        };
        let lines: [(&str, Color); 4] = [
            ("╔════════════════════╗", color),
            (title, color),
            ("╚════════════════════╝", color),
            ("R - Play Again  Q - Quit", Color::White),
        ];
        let cx = self.width / 2;
        let start_row = (self.height / 2).saturating_sub(lines.len() as u16 / 2);
        for (i, (msg, color)) in lines.iter().enumerate() {
            let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
            out.queue(cursor::MoveTo(col, start_row + i as u16))?;
            out.queue(style::SetForegroundColor(*color))?;
            out.queue(Print(*msg))?;
        }
        Ok(())
    }
}

impl Canvas for TerminalCanvas {
    fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.bars.clear();
        self.overlay = None;
        self.offset_x = 0.0;
    }

    fn translate(&mut self, dx: f32) {
        self.offset_x += dx;
    }

    fn draw_image(&mut self, sprite: SpriteId, rect: Rect, mirrored: bool) {
        let (entity, state) = split_sprite(sprite);
        match entity {
            "background" => match state {
                "ground" => self.fill_row(rect, 430.0, '▀', C_GROUND),
                "clouds" => {
                    for x in [80.0, 330.0, 560.0] {
                        let cloud = Rect::new(rect.x + x, 40.0, 0.0, 40.0);
                        self.stamp(cloud, &["~~~"], C_CLOUD, false);
                    }
                }
                _ => {}
            },
            "character" => {
                let (rows, color): (&[&str], Color) = match state {
                    "hurt" => (&[" O ", "\\|/", "/ \\"], C_CHARACTER_HURT),
                    "dead" => (&["__O__"], C_CHARACTER_HURT),
                    "melee" => (&[" O  ", "/|--", "/ \\ "], C_CHARACTER),
                    "throw" => (&[" O  ", "/|-o", "/ \\ "], C_CHARACTER),
                    "jump" => (&["\\O/", " | ", "/ \\"], C_CHARACTER),
                    _ => (&[" O ", "/|>", "/ \\"], C_CHARACTER),
                };
                self.stamp(rect, rows, color, mirrored);
            }
            "orc" => match state {
                "dead" => self.stamp(rect, &["_x_x_"], C_CORPSE, mirrored),
                _ => self.stamp(rect, &["(oo)", "<##\\"], C_ORC, mirrored),
            },
            "endboss" => {
                let (rows, color): (&[&str], Color) = match state {
                    "attack" => (&["  /\\_/\\ ", "<=(@ @) ", "  |###| ", "  /   \\ "], C_BOSS_ATTACK),
                    "dead" => (&["___XX___"], C_CORPSE),
                    _ => (&[" /\\_/\\ ", "( @ @ )", " |###| ", " /   \\ "], C_BOSS),
                };
                self.stamp(rect, rows, color, mirrored);
            }
            "projectile" => self.stamp(rect, &["*"], C_PROJECTILE, mirrored),
            "effect" => self.stamp(rect, &["\\|/", "-*-", "/|\\"], C_SPLASH, false),
            "pickup" => match state {
                "coin" => self.stamp(rect, &["$"], C_COIN, false),
                _ => self.stamp(rect, &["!"], C_AMMO, false),
            },
            _ => {}
        }
    }

    fn draw_bar(&mut self, bar: &StatusBar) {
        self.bars.push((bar.kind, bar.image_index()));
    }

    fn draw_overlay(&mut self, outcome: Outcome) {
        self.overlay = Some(outcome);
    }
}

/// `"orc/walk_3"` → `("orc", "walk")`.
fn split_sprite(sprite: SpriteId) -> (&'static str, &'static str) {
    let (entity, frame) = sprite.split_once('/').unwrap_or((sprite, ""));
    let state = frame.rsplit_once('_').map_or(frame, |(state, _)| state);
    (entity, state)
}

fn mirror_char(ch: char) -> char {
    match ch {
        '<' => '>',
        '>' => '<',
        '/' => '\\',
        '\\' => '/',
        '(' => ')',
        ')' => '(',
        other => other,
    }
}

// ── Hint line (last row) ──────────────────────────────────────────────────────

fn draw_hint_line<W: Write>(out: &mut W, height: u16, captions: &[&str], muted: bool) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → : Move  SPACE/↑ : Jump  F : Attack  D : Throw  M : Mute  Q : Quit"))?;
    if muted {
        out.queue(Print("  [muted]"))?;
    } else if !captions.is_empty() {
        out.queue(style::SetForegroundColor(C_CAPTION))?;
        out.queue(Print(format!("  ♪ {}", captions.join(" · "))))?;
    }
    Ok(())
}

/// Short caption shown for a sound cue.
pub fn cue_caption(cue: Cue) -> &'static str {
    match cue {
        Cue::Walk => "steps",
        Cue::Hit => "thwack",
        Cue::Jump => "hup",
        Cue::Hurt => "ouch",
        Cue::Death => "aargh",
        Cue::Throw => "whoosh",
        Cue::Splash => "splash",
        Cue::OrcDeath => "orc falls",
        Cue::OrcVoice(_) => "grunt",
        Cue::BossAlert => "ROAR",
        Cue::BossAttack => "swing",
        Cue::BossHurt(_) => "boss groans",
        Cue::BossDeath => "boss collapses",
        Cue::Coin => "clink",
        Cue::Win => "fanfare",
    }
}
