use std::fmt;

use rand::Rng;

/// Falling item variants and their spawn weights out of 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Diamond,
    MoneyBag,
    Rock,
}

impl ItemKind {
    const DIAMOND_WEIGHT: u32 = 35;
    const MONEY_BAG_WEIGHT: u32 = 25;

    /// Maps a roll in `0..100` onto a kind: 35% diamond, 25% money bag, 40% rock.
    pub fn from_roll(roll: u32) -> Self {
        if roll < Self::DIAMOND_WEIGHT {
            ItemKind::Diamond
        } else if roll < Self::DIAMOND_WEIGHT + Self::MONEY_BAG_WEIGHT {
            ItemKind::MoneyBag
        } else {
            ItemKind::Rock
        }
    }

    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_roll(rng.gen_range(0..100))
    }

    pub fn is_obstacle(self) -> bool {
        matches!(self, ItemKind::Rock)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemKind::Diamond => "diamond",
            ItemKind::MoneyBag => "money bag",
            ItemKind::Rock => "rock",
        };
        f.write_str(label)
    }
}

/// Axis-aligned rectangle in normalized screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl HitBox {
    /// Strict overlap; rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &HitBox) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameItem {
    pub id: u64,
    pub kind: ItemKind,
    pub x: f64,
    pub y: f64,
    /// Cleared after the item has collided once.
    pub active: bool,
}

impl GameItem {
    const HALF_EXTENT: f64 = 0.05;

    pub fn hit_box(&self) -> HitBox {
        HitBox {
            x: self.x - Self::HALF_EXTENT,
            y: self.y - Self::HALF_EXTENT,
            width: Self::HALF_EXTENT * 2.0,
            height: Self::HALF_EXTENT * 2.0,
        }
    }
}
