use std::fmt;

use serde::Serialize;

pub const MAX_PIP: u8 = 6;
pub const DOUBLE_SIX: Tile = Tile { left: MAX_PIP, right: MAX_PIP };

// Which half of a tile matched a pip value
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Side {
    Left,
    Right,
}

/// A domino with two pip values. The orientation (which value is on the left)
/// matters once the tile is on the board.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Tile {
    left: u8,
    right: u8,
}

impl Tile {
    pub fn new(left: u8, right: u8) -> Self {
        debug_assert!(left <= MAX_PIP && right <= MAX_PIP);
        Self { left, right }
    }

    pub fn pips(&self) -> (u8, u8) {
        (self.left, self.right)
    }

    pub fn flip(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
    }

    pub fn flipped(mut self) -> Self {
        self.flip();
        self
    }

    // Report the side showing `value`. A double reports its left side, so
    // callers that care about both ends have to check `is_double` themselves.
    pub fn matches(&self, value: u8) -> Option<Side> {
        if self.left == value {
            Some(Side::Left)
        } else if self.right == value {
            Some(Side::Right)
        } else {
            None
        }
    }

    pub fn has(&self, value: u8) -> bool {
        self.matches(value).is_some()
    }

    pub fn is_double(&self) -> bool {
        self.left == self.right
    }

    pub fn reverse_str(&self) -> String {
        format!("{}-{}", self.right, self.left)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.left, self.right)
    }
}
