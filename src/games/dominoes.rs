use super::{GameState, Validate};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::{anyhow, Result};
use rand::{rngs::StdRng, SeedableRng};

pub mod chain;
pub mod console;
pub mod player;
pub mod tile;
pub mod tileset;

use chain::Chain;
use player::{Player, PlayerKind, Strategy, Turn};
use tileset::{TileSet, HAND_SIZE, SET_SIZE};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = SET_SIZE / HAND_SIZE;

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub n_players: usize,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self { n_players: MAX_PLAYERS, seed: 0 }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<()> {
        if self.n_players < MIN_PLAYERS || self.n_players > MAX_PLAYERS {
            return Err(anyhow!(
                "Number of players ({}) outside the bound [{}, {}]",
                self.n_players, MIN_PLAYERS, MAX_PLAYERS
            ));
        }

        Ok(())
    }
}

// Derive the seed of one stream of a game seed, so the shuffle and every
// computer player draw from separate streams. Hashing keeps forks of forks
// apart as well.
pub fn fork_seed(seed: u64, stream: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    stream.hash(&mut hasher);
    hasher.finish()
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Win { seat: usize },
    // Nobody could move for a whole round. The seat is whoever made the last
    // pass.
    Stalemate { seat: usize },
}

impl Outcome {
    pub fn seat(&self) -> usize {
        match *self {
            Outcome::Win { seat } | Outcome::Stalemate { seat } => seat,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    DetermineStarter,
    InProgress,
    Finished(Outcome),
}

// One turn as seen from outside
#[derive(Clone, Debug)]
pub struct Ply {
    pub ply_id: usize,
    pub seat: usize,
    pub kind: PlayerKind,
    pub turn: Turn,
    pub hand_left: usize,
    pub passes: usize,
}

pub struct Game {
    chain: Chain,
    players: Vec<Player>,
    current_player: usize,
    passes: usize,
    plies: usize,
    phase: Phase,
}

impl Game {
    // Shuffle a fresh set and deal a hand to every seat, in seat order
    pub fn new(config: &Config, seats: Vec<(PlayerKind, Box<dyn Strategy>)>) -> Result<Self> {
        config.validate()?;
        if seats.len() != config.n_players {
            return Err(anyhow!("Expected {} players, got {}", config.n_players, seats.len()));
        }

        let mut rng = StdRng::seed_from_u64(fork_seed(config.seed, 0));
        let mut tiles = TileSet::new(&mut rng);

        let mut players = Vec::with_capacity(seats.len());
        for (kind, strategy) in seats {
            players.push(Player::new(kind, tiles.deal()?, strategy));
        }
        log::debug!("Dealt {} hands, {} tiles left over", players.len(), tiles.remaining());

        Ok(Self {
            chain: Chain::new(),
            players,
            current_player: 0,
            passes: 0,
            plies: 0,
            phase: Phase::DetermineStarter,
        })
    }

    // Set up an arbitrary position with `first` to move
    #[cfg(test)]
    pub fn from_parts(chain: Chain, players: Vec<Player>, first: usize) -> Result<Self> {
        if first >= players.len() {
            return Err(anyhow!("First seat {} out of range for {} players", first, players.len()));
        }

        Ok(Self {
            chain,
            players,
            current_player: first,
            passes: 0,
            plies: 0,
            phase: Phase::InProgress,
        })
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Find who holds the double-six. That player has in effect made the
    /// opening move, so the turn passes to the next seat. Returns the seat of
    /// the holder.
    pub fn determine_starter(&mut self) -> Result<usize> {
        if self.phase != Phase::DetermineStarter {
            return Err(anyhow!("Starter has already been determined"));
        }

        let starter = self.players
            .iter_mut()
            .position(|p| p.goes_first())
            .ok_or_else(|| anyhow!("No player holds the double-six"))?;

        self.current_player = (starter + 1) % self.players.len();
        self.phase = Phase::InProgress;
        log::info!("P{} went first by placing 6-6", starter);

        Ok(starter)
    }

    pub fn step(&mut self) -> Result<Ply> {
        if self.phase != Phase::InProgress {
            return Err(anyhow!("Game is not in progress ({:?})", self.phase));
        }

        let seat = self.current_player;
        let player = &mut self.players[seat];
        let turn = player.take_turn(&mut self.chain)?;

        if turn.is_pass() {
            self.passes += 1;
        } else {
            self.passes = 0;
        }

        let ply = Ply {
            ply_id: self.plies,
            seat,
            kind: player.kind,
            turn,
            hand_left: player.hand().len(),
            passes: self.passes,
        };
        self.plies += 1;
        log::debug!("Ply {}: P{} {:?}, chain {}", ply.ply_id, seat, turn, self.chain);

        if player.has_won() {
            self.phase = Phase::Finished(Outcome::Win { seat });
        } else if self.passes == self.players.len() {
            self.phase = Phase::Finished(Outcome::Stalemate { seat });
        } else {
            self.current_player = (seat + 1) % self.players.len();
        }

        Ok(ply)
    }

    // Play until someone wins or nobody can move. `on_ply` sees every turn
    // along with the chain it left behind.
    pub fn run<F: FnMut(&Ply, &Chain)>(&mut self, mut on_ply: F) -> Result<Outcome> {
        if self.phase == Phase::DetermineStarter {
            self.determine_starter()?;
        }

        while !self.is_game_over() {
            let ply = self.step()?;
            on_ply(&ply, &self.chain);
        }

        let outcome = self.outcome().ok_or_else(|| anyhow!("Game ended without an outcome"))?;
        log::info!("Game over after {} plies: {:?}", self.plies, outcome);
        Ok(outcome)
    }
}

impl GameState for Game {
    fn current_player(&self) -> usize {
        self.current_player
    }

    fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }
}
