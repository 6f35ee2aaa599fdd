use std::fmt;

use anyhow::{anyhow, Result};
use rand::{rngs::StdRng, seq::IndexedRandom, SeedableRng};

use super::chain::{Chain, End};
use super::console::{parse_hand_input, parse_side_input, HandInput, Operator};
use super::tile::{Tile, DOUBLE_SIX};

// A decision about the hand, made without touching it
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Move {
    Pass,
    Play { index: usize, right_only: bool },
}

// What actually happened on a turn
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Turn {
    Played { tile: Tile, end: End },
    Passed,
}

impl Turn {
    pub fn is_pass(&self) -> bool {
        matches!(self, Turn::Passed)
    }
}

pub trait Strategy {
    fn choose(&mut self, hand: &[Tile], chain: &Chain) -> Result<Move>;
}

// Plays a uniformly random playable tile, passing only when nothing fits.
pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Strategy for RandomStrategy {
    fn choose(&mut self, hand: &[Tile], chain: &Chain) -> Result<Move> {
        let playable: Vec<usize> = (0..hand.len())
            .filter(|&i| chain.is_playable(&hand[i]))
            .collect();

        Ok(match playable.choose(&mut self.rng) {
            Some(&index) => Move::Play { index, right_only: false },
            None => Move::Pass,
        })
    }
}

/// Asks an operator for every decision. Bad answers are reported back and the
/// question is asked again, so the only errors coming out of here are I/O
/// failures of the operator itself.
pub struct HumanStrategy<O> {
    operator: O,
}

impl<O: Operator> HumanStrategy<O> {
    pub fn new(operator: O) -> Self {
        Self { operator }
    }

    #[cfg(test)]
    pub fn into_operator(self) -> O {
        self.operator
    }

    fn ask_index(&mut self, hand: &[Tile], chain: &Chain) -> Result<Option<usize>> {
        loop {
            let line = self.operator.read_line("Which do you want to play? Enter p to pass. ")?;
            match parse_hand_input(&line) {
                HandInput::Pass => return Ok(None),
                HandInput::Index(i) if i >= hand.len() => {
                    self.operator.notify("Invalid domino number!")?;
                },
                HandInput::Index(i) if !chain.is_playable(&hand[i]) => {
                    self.operator.notify("That domino is not playable!")?;
                },
                HandInput::Index(i) => return Ok(Some(i)),
                HandInput::Unknown => {},
            }
        }
    }

    fn ask_right_only(&mut self) -> Result<bool> {
        self.operator.notify("That domino matches both sides of the chain.")?;
        loop {
            let line = self.operator.read_line("Which side do you want to play it on? (Type l or r) ")?;
            if let Some(right_only) = parse_side_input(&line) {
                return Ok(right_only);
            }
        }
    }
}

impl<O: Operator> Strategy for HumanStrategy<O> {
    fn choose(&mut self, hand: &[Tile], chain: &Chain) -> Result<Move> {
        self.operator.show_table(chain, hand)?;

        let Some(index) = self.ask_index(hand, chain)? else {
            return Ok(Move::Pass);
        };

        let right_only = if chain.matches_both_ends(&hand[index]) {
            self.ask_right_only()?
        } else {
            false
        };

        Ok(Move::Play { index, right_only })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayerKind {
    Human,
    Computer,
}

pub struct Player {
    pub kind: PlayerKind,
    hand: Vec<Tile>,
    strategy: Box<dyn Strategy>,
}

impl Player {
    pub fn new(kind: PlayerKind, hand: Vec<Tile>, strategy: Box<dyn Strategy>) -> Self {
        Self { kind, hand, strategy }
    }

    pub fn hand(&self) -> &[Tile] {
        &self.hand
    }

    // The double-six is already on the table when the chain is created, so
    // its holder just gives it up.
    pub fn goes_first(&mut self) -> bool {
        match self.hand.iter().position(|t| *t == DOUBLE_SIX) {
            Some(i) => {
                self.hand.remove(i);
                true
            },
            None => false,
        }
    }

    pub fn has_won(&self) -> bool {
        self.hand.is_empty()
    }

    pub fn take_turn(&mut self, chain: &mut Chain) -> Result<Turn> {
        let (index, right_only) = match self.strategy.choose(&self.hand, chain)? {
            Move::Pass => return Ok(Turn::Passed),
            Move::Play { index, right_only } => (index, right_only),
        };

        let tile = *self.hand
            .get(index)
            .ok_or_else(|| anyhow!("Hand index {} out of range ({} tiles)", index, self.hand.len()))?;
        if !chain.is_playable(&tile) || (right_only && !tile.has(chain.right_end())) {
            return Err(anyhow!("Tile {} does not fit chain {}", tile, chain));
        }

        self.hand.remove(index);
        let end = chain
            .add(tile, right_only)
            .ok_or_else(|| anyhow!("Tile {} was not placed on chain {}", tile, chain))?;

        Ok(Turn::Played { tile, end })
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PlayerKind::Human => write!(f, "You have {} dominoes", self.hand.len()),
            PlayerKind::Computer => write!(f, "A computer player has {} dominoes", self.hand.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::games::dominoes::console::Console;

    // Replays a fixed list of moves
    struct Scripted(Vec<Move>);

    impl Strategy for Scripted {
        fn choose(&mut self, _hand: &[Tile], _chain: &Chain) -> Result<Move> {
            Ok(self.0.remove(0))
        }
    }

    fn computer(hand: Vec<Tile>, seed: u64) -> Player {
        Player::new(PlayerKind::Computer, hand, Box::new(RandomStrategy::new(seed)))
    }

    fn human_choice(input: &str, hand: &[Tile], chain: &Chain) -> (Move, String) {
        let mut human = HumanStrategy::new(Console::new(Cursor::new(input.to_string()), Vec::new()));
        let choice = human.choose(hand, chain).unwrap();
        let output = String::from_utf8(human.into_operator().into_output()).unwrap();
        (choice, output)
    }

    #[test]
    fn test_goes_first() {
        let mut holder = computer(vec![Tile::new(1, 2), DOUBLE_SIX, Tile::new(0, 5)], 0);
        let mut other = computer(vec![Tile::new(1, 2), Tile::new(6, 5)], 0);

        assert!(holder.goes_first());
        assert_eq!(holder.hand(), &[Tile::new(1, 2), Tile::new(0, 5)]);

        assert!(!other.goes_first());
        assert_eq!(other.hand(), &[Tile::new(1, 2), Tile::new(6, 5)]);
    }

    #[test]
    fn test_random_strategy_plays_playable() {
        let hand = vec![Tile::new(1, 2), Tile::new(3, 6), Tile::new(0, 4)];
        for seed in 0..10 {
            let mut player = computer(hand.clone(), seed);
            let mut chain = Chain::new();
            let turn = player.take_turn(&mut chain).unwrap();

            assert_eq!(turn, Turn::Played { tile: Tile::new(3, 6), end: End::Left });
            assert_eq!(player.hand(), &[Tile::new(1, 2), Tile::new(0, 4)]);
            assert_eq!(chain.to_string(), "3-6,6-6");
        }
    }

    #[test]
    fn test_random_strategy_passes() {
        let mut player = computer(vec![Tile::new(1, 2), Tile::new(0, 4)], 3);
        let mut chain = Chain::new();

        assert!(player.take_turn(&mut chain).unwrap().is_pass());
        assert_eq!(player.hand().len(), 2);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_random_strategy_covers_choices() {
        let hand = [Tile::new(6, 1), Tile::new(6, 2), Tile::new(0, 4)];
        let mut strategy = RandomStrategy::new(11);
        let chain = Chain::new();
        let mut picked = [false; 3];

        for _ in 0..100 {
            match strategy.choose(&hand, &chain).unwrap() {
                Move::Play { index, right_only: false } => picked[index] = true,
                other => panic!("Unexpected move {:?}", other),
            }
        }

        assert_eq!(picked, [true, true, false]);
    }

    #[test]
    fn test_has_won() {
        let mut player = computer(vec![Tile::new(6, 2)], 0);
        assert!(!player.has_won());
        player.take_turn(&mut Chain::new()).unwrap();
        assert!(player.has_won());
        assert_eq!(player.to_string(), "A computer player has 0 dominoes");
    }

    #[test]
    fn test_human_reprompts() {
        let chain = Chain::new();
        let hand = [Tile::new(1, 2), Tile::new(5, 6)];
        let (choice, output) = human_choice("7\nx\n0\n1\nq\nR\n", &hand, &chain);

        assert_eq!(choice, Move::Play { index: 1, right_only: true });
        assert!(output.contains("Invalid domino number!"));
        assert!(output.contains("That domino is not playable!"));
        assert!(output.contains("That domino matches both sides of the chain."));
    }

    #[test]
    fn test_human_left_side() {
        let chain = Chain::new();
        let (choice, _) = human_choice("0\nl\n", &[Tile::new(5, 6)], &chain);
        assert_eq!(choice, Move::Play { index: 0, right_only: false });
    }

    #[test]
    fn test_human_single_side_and_pass() {
        let mut chain = Chain::new();
        chain.add(Tile::new(6, 3), true);
        let hand = [Tile::new(3, 1), Tile::new(6, 6)];

        let (choice, output) = human_choice("0\n", &hand, &chain);
        assert_eq!(choice, Move::Play { index: 0, right_only: false });
        assert!(!output.contains("both sides"));

        let (choice, _) = human_choice("P\n", &hand, &chain);
        assert_eq!(choice, Move::Pass);
    }

    #[test]
    fn test_human_input_closed() {
        let mut human = HumanStrategy::new(Console::new(Cursor::new("9\n"), Vec::new()));
        assert!(human.choose(&[Tile::new(6, 1)], &Chain::new()).is_err());
    }

    #[test]
    fn test_human_turn_right_side() {
        let input = Cursor::new("0\nr\n");
        let strategy = HumanStrategy::new(Console::new(input, std::io::sink()));
        let mut player = Player::new(PlayerKind::Human, vec![Tile::new(6, 4)], Box::new(strategy));
        let mut chain = Chain::new();

        let turn = player.take_turn(&mut chain).unwrap();
        assert_eq!(turn, Turn::Played { tile: Tile::new(6, 4), end: End::Right });
        assert_eq!(chain.to_string(), "6-6,6-4");
        assert!(player.has_won());
        assert_eq!(player.to_string(), "You have 0 dominoes");
    }

    #[test]
    fn test_bad_moves_leave_hand_alone() {
        let hand = vec![Tile::new(1, 2), Tile::new(6, 0)];
        let mut player = Player::new(
            PlayerKind::Computer,
            hand.clone(),
            Box::new(Scripted(vec![
                Move::Play { index: 5, right_only: false },
                Move::Play { index: 0, right_only: false },
            ])),
        );
        let mut chain = Chain::new();

        assert!(player.take_turn(&mut chain).is_err());
        assert!(player.take_turn(&mut chain).is_err());
        assert_eq!(player.hand(), hand.as_slice());
        assert_eq!(chain.len(), 1);
    }
}
