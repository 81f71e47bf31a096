//! The level's enemy list holds regular orcs and, once spawned, the boss.

use crate::collision::{Body, Rect};
use crate::endboss::Endboss;
use crate::orc::Orc;
use crate::sim::OrcId;

#[derive(Clone, Debug)]
pub enum Enemy {
    Orc(Orc),
    Endboss(Endboss),
}

impl Enemy {
    pub fn body(&self) -> &Body {
        match self {
            Enemy::Orc(orc) => orc.body(),
            Enemy::Endboss(boss) => boss.body(),
        }
    }

    pub fn hitbox(&self) -> Rect {
        self.body().hitbox()
    }

    pub fn is_collidable(&self) -> bool {
        match self {
            Enemy::Orc(orc) => orc.is_collidable(),
            Enemy::Endboss(boss) => boss.is_collidable(),
        }
    }

    pub fn is_dying(&self) -> bool {
        match self {
            Enemy::Orc(orc) => orc.is_dying(),
            Enemy::Endboss(boss) => boss.is_dead(),
        }
    }

    /// Can this enemy still be hit or hurt anyone?
    pub fn is_hittable(&self) -> bool {
        self.is_collidable() && !self.is_dying()
    }

    pub fn as_orc(&self) -> Option<&Orc> {
        match self {
            Enemy::Orc(orc) => Some(orc),
            Enemy::Endboss(_) => None,
        }
    }

    pub fn as_boss(&self) -> Option<&Endboss> {
        match self {
            Enemy::Endboss(boss) => Some(boss),
            Enemy::Orc(_) => None,
        }
    }
}

pub fn find_orc_mut(enemies: &mut [Enemy], id: OrcId) -> Option<&mut Orc> {
    enemies.iter_mut().find_map(|enemy| match enemy {
        Enemy::Orc(orc) if orc.id() == id => Some(orc),
        _ => None,
    })
}

pub fn find_boss(enemies: &[Enemy]) -> Option<&Endboss> {
    enemies.iter().find_map(Enemy::as_boss)
}

pub fn find_boss_mut(enemies: &mut [Enemy]) -> Option<&mut Endboss> {
    enemies.iter_mut().find_map(|enemy| match enemy {
        Enemy::Endboss(boss) => Some(boss),
        Enemy::Orc(_) => None,
    })
}
