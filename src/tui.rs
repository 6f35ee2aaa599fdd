use anyhow::{anyhow, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{self, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{List, Wrap};
use ratatui::DefaultTerminal;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    symbols::border,
    text::{Line, Text},
    widgets::{Block, Paragraph, Widget},
};

use crate::games::dominoes::chain::Chain;
use crate::games::dominoes::console::Operator;
use crate::games::dominoes::tile::Tile;

#[derive(Clone, Default)]
pub struct TableView {
    pub chain: Chain,
    pub hand: Vec<Tile>,
    pub feed: Vec<String>,
    pub prompt: String,
    pub input: String,
    pub game_over: bool,
}

// Format a hand entry, greyed out when it can't go on the chain
fn hand_line(tile: &Tile, idx: usize, chain: &Chain) -> Line<'static> {
    let tile_style = if chain.is_playable(tile) {
        Style::default().fg(style::Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(style::Color::Gray)
    };

    Line::from(vec![
        Span::styled(format!(" {:>2}. ", idx), Style::default()),
        Span::styled(format!("[{}]", tile), tile_style),
    ])
}

impl Widget for TableView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(9),
                Constraint::Length(3),
            ])
            .split(area);

        let header_text = Text::from(vec![Line::from(vec![
            " ".into(),
            if self.game_over {
                Span::styled(" GAME OVER ", Style::default().fg(style::Color::Red)).bold().add_modifier(Modifier::REVERSED)
            } else {
                Span::styled(" GAME RUNNING ", Style::default().fg(style::Color::Blue)).bold().add_modifier(Modifier::REVERSED)
            },
            format!(" Chain: {} tiles, ", self.chain.len()).into(),
            format!("Open ends: {} and {}, ", self.chain.left_end(), self.chain.right_end()).into(),
            format!("In hand: {}", self.hand.len()).into(),
        ])]);

        Paragraph::new(header_text)
            .block(Block::bordered().border_set(border::THICK))
            .render(layout[0], buf);

        let chain_spans: Vec<Span> = self.chain
            .tiles()
            .map(|t| Span::styled(format!("[{}]", t), Style::default().fg(style::Color::Yellow)))
            .collect();

        Paragraph::new(Line::from(chain_spans))
            .wrap(Wrap { trim: true })
            .block(Block::bordered().title(" Chain "))
            .render(layout[1], buf);

        let body_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(30)])
            .split(layout[2]);

        let hand = List::new(self.hand.iter().enumerate().map(|(idx, tile)| hand_line(tile, idx, &self.chain)))
            .block(Block::bordered().title(Line::from(" Your Hand ".bold())));
        Widget::render(hand, body_layout[0], buf);

        // Only the latest messages that fit inside the borders
        let visible = body_layout[1].height.saturating_sub(2) as usize;
        let feed_lines: Vec<Line> = self.feed
            .iter()
            .skip(self.feed.len().saturating_sub(visible))
            .map(|m| Line::from(format!(" {}", m)))
            .collect();

        Paragraph::new(feed_lines)
            .block(Block::bordered().title(Line::from(" Table ".bold())))
            .render(body_layout[1], buf);

        let prompt_line = Line::from(vec![
            Span::styled(format!(" {}", self.prompt), Style::default().add_modifier(Modifier::BOLD)),
            self.input.into(),
            Span::styled("_", Style::default().fg(style::Color::Blue)),
        ]);

        let block = Block::bordered()
            .title_bottom(Line::from(vec![
                " Submit ".into(),
                "<RET> ".blue().bold(),
                " Quit ".into(),
                "<ESC> ".blue().bold(),
            ]).right_aligned());

        Paragraph::new(prompt_line)
            .block(block)
            .render(layout[3], buf);
    }
}

/// Operator that plays through a full screen terminal. Typed characters are
/// collected until enter, so it answers the same prompts the console does.
pub struct TuiOperator {
    terminal: DefaultTerminal,
    view: TableView,
}

impl TuiOperator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: ratatui::try_init()?,
            view: TableView::default(),
        })
    }

    fn draw(&mut self) -> Result<()> {
        let view = self.view.clone();
        self.terminal.draw(|frame| {
            frame.render_widget(view, frame.area());
        })?;
        Ok(())
    }

    // Keep the final table on screen until the user leaves
    pub fn wait_for_exit(&mut self) -> Result<()> {
        self.view.game_over = true;
        self.view.prompt = "Press q to quit.".to_string();
        self.view.input.clear();

        loop {
            self.draw()?;
            if let Event::Key(key_event) = event::read()? {
                match key_event.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}

impl Drop for TuiOperator {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

impl Operator for TuiOperator {
    fn show_table(&mut self, chain: &Chain, hand: &[Tile]) -> Result<()> {
        self.view.chain = chain.clone();
        self.view.hand = hand.to_vec();
        self.view.feed.push("It's your turn.".to_string());
        self.draw()
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.view.prompt = prompt.to_string();
        self.view.input.clear();

        loop {
            self.draw()?;

            let key_event = match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => key_event,
                _ => continue,
            };

            match key_event.code {
                KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(anyhow!("Game abandoned"));
                },
                KeyCode::Esc => return Err(anyhow!("Game abandoned")),
                KeyCode::Char(c) => self.view.input.push(c),
                KeyCode::Backspace => {
                    self.view.input.pop();
                },
                KeyCode::Enter => {
                    let line = std::mem::take(&mut self.view.input);
                    self.view.feed.push(format!("> {}", line));
                    self.view.prompt.clear();
                    return Ok(line);
                },
                _ => {}
            }
        }
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        self.view.feed.push(message.to_string());
        self.draw()
    }
}
