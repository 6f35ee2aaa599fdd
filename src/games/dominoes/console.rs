use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use anyhow::{anyhow, Result};

use super::chain::Chain;
use super::tile::Tile;

// The person sitting at the table. Human turns block on `read_line` until the
// operator answers.
pub trait Operator {
    fn show_table(&mut self, chain: &Chain, hand: &[Tile]) -> Result<()>;

    fn read_line(&mut self, prompt: &str) -> Result<String>;

    fn notify(&mut self, message: &str) -> Result<()>;
}

// Lets the table loop keep talking to the operator a human strategy owns
impl<O: Operator> Operator for Rc<RefCell<O>> {
    fn show_table(&mut self, chain: &Chain, hand: &[Tile]) -> Result<()> {
        self.borrow_mut().show_table(chain, hand)
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.borrow_mut().read_line(prompt)
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        self.borrow_mut().notify(message)
    }
}

// What a line typed at the hand prompt means
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandInput {
    Pass,
    Index(usize),
    Unknown,
}

pub fn parse_hand_input(line: &str) -> HandInput {
    let line = line.trim();
    if line.eq_ignore_ascii_case("p") {
        return HandInput::Pass;
    }

    if !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()) {
        // Digits too long for usize still mean an index, just not a valid one
        return HandInput::Index(line.parse().unwrap_or(usize::MAX));
    }

    HandInput::Unknown
}

// `Some(true)` for the right side, `Some(false)` for the left one
pub fn parse_side_input(line: &str) -> Option<bool> {
    match line.trim() {
        "r" | "R" => Some(true),
        "l" | "L" => Some(false),
        _ => None,
    }
}

pub fn format_hand(hand: &[Tile]) -> String {
    hand.iter()
        .enumerate()
        .map(|(i, t)| format!("{}: {}", i, t))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Line oriented operator over any reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Operator for Console<R, W> {
    fn show_table(&mut self, chain: &Chain, hand: &[Tile]) -> Result<()> {
        writeln!(self.output, "It's your turn.")?;
        writeln!(self.output, "The current chain:")?;
        writeln!(self.output, "{}", chain)?;
        writeln!(self.output, "Your hand:")?;
        writeln!(self.output, "{}", format_hand(hand))?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(anyhow!("Input closed while waiting for a move"));
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}
