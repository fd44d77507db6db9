use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

mod action;
mod ai;
mod battle;
mod board;
mod config;
mod deck;
mod encounter;
mod error;
mod event;
mod game;
mod unit;

pub use action::*;
pub use ai::*;
pub use battle::*;
pub use board::*;
pub use config::*;
pub use deck::*;
pub use encounter::*;
pub use error::*;
pub use event::*;
pub use game::*;
pub use unit::*;

pub type UnitID = u64;
pub type ListenerID = u64;
pub type Steps = usize;

#[derive(
    Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// 斜向也算一步的距離
    pub fn chebyshev(self, other: Pos) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn offset(self, dx: isize, dy: isize) -> Option<Pos> {
        Some(Pos {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}
