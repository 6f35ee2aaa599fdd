use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use games::dominoes::chain::{Chain, End};
use games::dominoes::console::{Console, Operator};
use games::dominoes::player::{HumanStrategy, PlayerKind, RandomStrategy, Strategy, Turn};
use games::dominoes::{fork_seed, Config, Game, Outcome, Ply};
use games::Validate;
use tui::TuiOperator;

mod games;
mod tui;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play computer-only games and log every ply
    Simulate {
        #[arg(short)]
        log_file: PathBuf,
        #[arg(short = 'n', long, default_value_t = 100)]
        games: usize,
        #[arg(short, long, default_value_t = 4)]
        players: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play against three computer players
    Interactive {
        #[arg(long)]
        seed: Option<u64>,
        /// Use the full screen terminal interface
        #[arg(long)]
        tui: bool,
    },
}

// One ply in the game log. `state` is the chain serialized after the ply.
#[derive(Debug, Clone, serde::Serialize)]
struct PlayLogPly {
    game_id: usize,
    ply_id: i32,
    player_id: usize,
    action: String,
    tile: Option<String>,
    end: Option<End>,
    hand_left: usize,
    passes: usize,
    state: String,
}

type PlayLog = Vec<PlayLogPly>;

impl PlayLogPly {
    fn from_ply(game_id: usize, ply: &Ply, chain: &Chain) -> Result<Self> {
        let (action, tile, end) = match ply.turn {
            Turn::Played { tile, end } => ("play", Some(tile.to_string()), Some(end)),
            Turn::Passed => ("pass", None, None),
        };

        Ok(PlayLogPly {
            game_id,
            ply_id: ply.ply_id as i32,
            player_id: ply.seat,
            action: action.to_string(),
            tile,
            end,
            hand_left: ply.hand_left,
            passes: ply.passes,
            state: serde_json::to_string(chain)?,
        })
    }
}

fn write_play_log(play_log: &PlayLog, file: &PathBuf) -> Result<()> {
    let file = File::create(file)?;
    let mut writer = BufWriter::new(file);
    for item in play_log {
        jsonl::write(&mut writer, item).map_err(|err| anyhow!("Failed to write play log: {:?}", err))?;
    }
    writer.flush()?;
    Ok(())
}

fn report(outcomes: &[Outcome], n_players: usize) {
    let total_games = outcomes.len();
    let mut win_counts = vec![0; n_players];
    let mut stalemates = 0;

    for outcome in outcomes {
        match outcome {
            Outcome::Win { seat } => win_counts[*seat] += 1,
            Outcome::Stalemate { .. } => stalemates += 1,
        }
    }

    for i in 0..n_players {
        println!("Win Count for P{}: {}/{}, ratio: {}", i, win_counts[i], total_games, (win_counts[i] as f64 / total_games as f64));
    }
    println!("Stalemates: {}/{}, ratio: {}", stalemates, total_games, (stalemates as f64 / total_games as f64));
}

fn computer_seat(seed: u64, seat: usize) -> (PlayerKind, Box<dyn Strategy>) {
    let strategy: Box<dyn Strategy> = Box::new(RandomStrategy::new(fork_seed(seed, seat as u64 + 1)));
    (PlayerKind::Computer, strategy)
}

fn simulate_game(game_id: usize, config: &Config) -> Result<(Outcome, PlayLog)> {
    let seats = (0..config.n_players).map(|i| computer_seat(config.seed, i)).collect();
    let mut game = Game::new(config, seats)?;
    let mut play_log: PlayLog = Vec::new();

    let starter = game.determine_starter()?;
    play_log.push(PlayLogPly {
        game_id,
        ply_id: -1,
        player_id: starter,
        action: "start".to_string(),
        tile: Some(games::dominoes::tile::DOUBLE_SIX.to_string()),
        end: None,
        hand_left: game.players()[starter].hand().len(),
        passes: 0,
        state: serde_json::to_string(game.chain())?,
    });

    let mut log_error = None;
    let outcome = game.run(|ply, chain| {
        match PlayLogPly::from_ply(game_id, ply, chain) {
            Ok(item) => play_log.push(item),
            Err(err) => { log_error.get_or_insert(err); },
        }
    })?;

    if let Some(err) = log_error {
        return Err(err);
    }

    log::info!("Game {} finished: {:?}", game_id, outcome);
    Ok((outcome, play_log))
}

fn simulate(log_file: &PathBuf, n_sims: usize, n_players: usize, seed: u64) -> Result<()> {
    Config { n_players, seed }.validate()?;
    log::info!("Running {} simulations for {} players, seed {}", n_sims, n_players, seed);

    let results: Vec<(Outcome, PlayLog)> = (0..n_sims).into_par_iter().map(|game_idx| {
        let config = Config { n_players, seed: fork_seed(seed, game_idx as u64) };
        simulate_game(game_idx, &config)
    }).collect::<Result<_>>()?;

    let outcomes: Vec<Outcome> = results.iter().map(|(outcome, _)| *outcome).collect();
    report(&outcomes, n_players);

    let play_log: PlayLog = results.into_iter().flat_map(|(_, plies)| plies).collect();
    write_play_log(&play_log, log_file)
}

// Table talk for a finished turn. The human sees their own moves already.
// Played tiles are shown the way round they were laid on the chain.
fn narrate(ply: &Ply, chain: &Chain) -> Option<String> {
    match (ply.kind, ply.turn) {
        (PlayerKind::Human, _) => None,
        (PlayerKind::Computer, Turn::Played { tile, end }) => {
            let laid = match end {
                End::Left => chain.tiles().next(),
                End::Right => chain.tiles().last(),
            };
            let shown = if laid == Some(&tile) { tile.to_string() } else { tile.reverse_str() };
            Some(format!("Computer player plays {}, has {} dominoes remaining.", shown, ply.hand_left))
        },
        (PlayerKind::Computer, Turn::Passed) => {
            Some(format!("Computer player passes, has {} dominoes remaining.", ply.hand_left))
        },
    }
}

// One human in seat 0 against three computer players
fn play_solo<O: Operator + 'static>(seed: u64, operator: Rc<RefCell<O>>) -> Result<Outcome> {
    let config = Config { n_players: 4, seed };
    let human: Box<dyn Strategy> = Box::new(HumanStrategy::new(Rc::clone(&operator)));
    let mut seats = vec![(PlayerKind::Human, human)];
    seats.extend((1..config.n_players).map(|i| computer_seat(seed, i)));

    let mut game = Game::new(&config, seats)?;
    let mut table = Rc::clone(&operator);

    let starter = game.determine_starter()?;
    table.notify(match game.players()[starter].kind {
        PlayerKind::Human => "You went first by placing 6-6.",
        PlayerKind::Computer => "A computer player went first by placing 6-6.",
    })?;

    let outcome = game.run(|ply, chain| {
        if let Some(message) = narrate(ply, chain) {
            if let Err(err) = table.notify(&message) {
                log::warn!("Could not show message: {}", err);
            }
        }
    })?;

    table.notify(match outcome {
        Outcome::Win { seat: 0 } => "You won!",
        Outcome::Win { .. } => "Sorry, a computer player won.",
        Outcome::Stalemate { .. } => "Nobody can play. The game ends in a stalemate.",
    })?;

    Ok(outcome)
}

fn run_interactive(seed: Option<u64>, use_tui: bool) -> Result<()> {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    log::info!("Interactive game with seed {}", seed);

    if use_tui {
        color_eyre::install().map_err(|err| anyhow!("{}", err))?;
        let operator = Rc::new(RefCell::new(TuiOperator::new()?));
        play_solo(seed, Rc::clone(&operator))?;
        operator.borrow_mut().wait_for_exit()?;
    } else {
        let operator = Rc::new(RefCell::new(Console::new(io::stdin().lock(), io::stdout())));
        play_solo(seed, operator)?;
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.commands {
        Commands::Simulate { log_file, games, players, seed } => {
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            simulate(&log_file, games, players, seed)
        },
        Commands::Interactive { seed, tui } => run_interactive(seed, tui),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_simulate_game_log() {
        let config = Config { n_players: 4, seed: 5 };
        let (outcome, play_log) = simulate_game(3, &config).unwrap();

        assert_eq!(play_log[0].action, "start");
        assert_eq!(play_log[0].state, "[{\"left\":6,\"right\":6}]");
        assert!(play_log.iter().all(|p| p.game_id == 3));
        assert_eq!(play_log.last().unwrap().player_id, outcome.seat());
        assert!(play_log[1..].iter().all(|p| p.action == "play" || p.action == "pass"));
    }

    #[test]
    fn test_narrate() {
        let tile = games::dominoes::tile::Tile::new(6, 1);
        let ply = Ply {
            ply_id: 0,
            seat: 2,
            kind: PlayerKind::Computer,
            turn: Turn::Played { tile, end: End::Left },
            hand_left: 5,
            passes: 0,
        };

        // Flipped onto the left end
        let mut chain = Chain::new();
        chain.add(tile, false);
        assert_eq!(narrate(&ply, &chain).unwrap(), "Computer player plays 1-6, has 5 dominoes remaining.");

        // Laid as held on the right end
        let mut chain = Chain::new();
        chain.add(tile, true);
        let ply = Ply { turn: Turn::Played { tile, end: End::Right }, ..ply };
        assert_eq!(narrate(&ply, &chain).unwrap(), "Computer player plays 6-1, has 5 dominoes remaining.");

        let passed = Ply { turn: Turn::Passed, ..ply.clone() };
        assert_eq!(narrate(&passed, &chain).unwrap(), "Computer player passes, has 5 dominoes remaining.");
        assert!(narrate(&Ply { kind: PlayerKind::Human, ..ply }, &chain).is_none());
    }

    #[test]
    fn test_play_solo_human_always_passes() {
        let input = "p\n".repeat(40);
        let operator = Rc::new(RefCell::new(Console::new(Cursor::new(input), Vec::new())));
        let outcome = play_solo(17, Rc::clone(&operator)).unwrap();

        assert_ne!(outcome, Outcome::Win { seat: 0 });
        let console = Rc::try_unwrap(operator).ok().unwrap().into_inner();
        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains("went first by placing 6-6."));
        assert!(output.contains("Sorry, a computer player won.") || output.contains("stalemate"));
    }
}
