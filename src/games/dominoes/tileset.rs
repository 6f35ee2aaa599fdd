use anyhow::{anyhow, Result};
use rand::{seq::SliceRandom, Rng};

use super::tile::{Tile, MAX_PIP};

pub const HAND_SIZE: usize = 7;
pub const SET_SIZE: usize = 28;

/// The double-six set, shuffled once on creation and then dealt out.
#[derive(Clone, Debug)]
pub struct TileSet {
    tiles: Vec<Tile>,
}

impl TileSet {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut tiles = Vec::with_capacity(SET_SIZE);
        for a in 0..=MAX_PIP {
            for b in a..=MAX_PIP {
                tiles.push(Tile::new(a, b));
            }
        }
        tiles.shuffle(rng);

        Self { tiles }
    }

    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }

    // Take a hand off the top of the shuffled pool. Nothing is removed if the
    // pool can't fill a whole hand.
    pub fn deal(&mut self) -> Result<Vec<Tile>> {
        if self.tiles.len() < HAND_SIZE {
            return Err(anyhow!(
                "Cannot deal {} tiles, only {} left in the set",
                HAND_SIZE,
                self.tiles.len()
            ));
        }

        let at = self.tiles.len() - HAND_SIZE;
        Ok(self.tiles.split_off(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn normalized(tile: &Tile) -> (u8, u8) {
        let (a, b) = tile.pips();
        (a.min(b), a.max(b))
    }

    #[test]
    fn test_new_set_is_complete() {
        for seed in 0..10 {
            let set = TileSet::new(&mut StdRng::seed_from_u64(seed));
            assert_eq!(set.remaining(), SET_SIZE);

            let unique: HashSet<(u8, u8)> = set.tiles.iter().map(normalized).collect();
            assert_eq!(unique.len(), SET_SIZE);
            for a in 0..=MAX_PIP {
                for b in a..=MAX_PIP {
                    assert!(unique.contains(&(a, b)));
                }
            }
        }
    }

    #[test]
    fn test_four_deals_cover_the_set() {
        let mut set = TileSet::new(&mut StdRng::seed_from_u64(7));
        let mut seen = HashSet::new();

        for _ in 0..4 {
            let hand = set.deal().unwrap();
            assert_eq!(hand.len(), HAND_SIZE);
            for tile in &hand {
                assert!(seen.insert(normalized(tile)));
            }
        }

        assert_eq!(seen.len(), SET_SIZE);
        assert_eq!(set.remaining(), 0);
    }

    #[test]
    fn test_deal_underflow() {
        let mut set = TileSet::new(&mut StdRng::seed_from_u64(1));
        for _ in 0..4 {
            set.deal().unwrap();
        }
        assert!(set.deal().is_err());
        assert_eq!(set.remaining(), 0);
    }

    #[test]
    fn test_shuffle_depends_on_seed() {
        let a = TileSet::new(&mut StdRng::seed_from_u64(3));
        let b = TileSet::new(&mut StdRng::seed_from_u64(3));
        let c = TileSet::new(&mut StdRng::seed_from_u64(4));
        assert_eq!(a.tiles, b.tiles);
        assert_ne!(a.tiles, c.tiles);
    }
}
