use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use super::tile::{Side, Tile, DOUBLE_SIX};

// Extremity of the chain a tile was attached to
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum End {
    Left,
    Right,
}

/// The line of tiles on the table. Every tile's left pip equals the right pip
/// of its left neighbour, so only the two outer pips are open for play.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct Chain {
    tiles: VecDeque<Tile>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    // Every game opens with the double-six already down
    pub fn new() -> Self {
        Self {
            tiles: VecDeque::from([DOUBLE_SIX]),
        }
    }

    pub fn left_end(&self) -> u8 {
        self.tiles.front().map_or(DOUBLE_SIX.pips().0, |t| t.pips().0)
    }

    pub fn right_end(&self) -> u8 {
        self.tiles.back().map_or(DOUBLE_SIX.pips().1, |t| t.pips().1)
    }

    pub fn is_playable(&self, tile: &Tile) -> bool {
        tile.matches(self.left_end()).is_some() || tile.matches(self.right_end()).is_some()
    }

    // Whether the tile could go on either end. `Tile::matches` only reports
    // one side, so this is the test to use before asking for a side.
    pub fn matches_both_ends(&self, tile: &Tile) -> bool {
        tile.has(self.left_end()) && tile.has(self.right_end())
    }

    /// Attach `tile` to the chain, turning it around so the touching pips
    /// agree. The left end is tried first unless `right_only` is set.
    ///
    /// This does not check that the tile fits. A tile matching neither end is
    /// silently dropped and `None` is returned, so callers must test
    /// `is_playable` before handing a tile over.
    pub fn add(&mut self, tile: Tile, right_only: bool) -> Option<End> {
        let left = tile.matches(self.left_end());
        let right = tile.matches(self.right_end());

        match (right_only, left, right) {
            (false, Some(Side::Left), _) => {
                self.tiles.push_front(tile.flipped());
                Some(End::Left)
            },
            (false, Some(Side::Right), _) => {
                self.tiles.push_front(tile);
                Some(End::Left)
            },
            (_, _, Some(Side::Left)) => {
                self.tiles.push_back(tile);
                Some(End::Right)
            },
            (_, _, Some(Side::Right)) => {
                self.tiles.push_back(tile.flipped());
                Some(End::Right)
            },
            _ => None,
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tiles: Vec<String> = self.tiles.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", tiles.join(","))
    }
}
