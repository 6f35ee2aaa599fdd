use anyhow::Result;

pub mod dominoes;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

// A game state for sequential games with n players taking plys in seat order.
pub trait GameState {
    // Seat of the player who acts next.
    fn current_player(&self) -> usize;

    // Tell if the game is over, either by a win or because nobody can move.
    fn is_game_over(&self) -> bool;
}
