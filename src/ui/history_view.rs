use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::history::ColorHistory;
use crate::sampler::SampledColor;
use crate::shared::constants;
use crate::utils::{clipboard, logger};

type UiTerminal = Terminal<CrosstermBackend<io::Stderr>>;

pub enum HistoryOutcome {
    BackToWatch,
    Quit,
}

struct HistoryApp {
    entries: Vec<String>,
    selected: usize,
    status: String,
    status_at: Option<Instant>,
    outcome: Option<HistoryOutcome>,
}

impl HistoryApp {
    fn load(history: &Arc<Mutex<ColorHistory>>) -> Self {
        let entries = match history.lock() {
            Ok(guard) => guard.list().to_vec(),
            Err(poisoned) => poisoned.into_inner().list().to_vec(),
        };

        Self {
            entries,
            selected: 0,
            status: String::from("Enter copies the selected color"),
            status_at: None,
            outcome: None,
        }
    }

    fn on_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('h') => {
                self.outcome = Some(HistoryOutcome::BackToWatch);
            }
            KeyCode::Char('q') => {
                self.outcome = Some(HistoryOutcome::Quit);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => self.copy_selected(),
            _ => {}
        }
    }

    fn copy_selected(&mut self) {
        let Some(hex) = self.entries.get(self.selected) else {
            return;
        };

        match clipboard::copy(hex) {
            Ok(()) => {
                self.status = format!("Color {} copied to clipboard", hex);
            }
            Err(e) => {
                logger::error(&format!("Clipboard copy failed: {}", e));
                self.status = format!("Could not copy {} (no clipboard utility)", hex);
            }
        }
        self.status_at = Some(Instant::now());
    }

    fn tick(&mut self) {
        if let Some(at) = self.status_at {
            if at.elapsed() >= Duration::from_millis(constants::NOTICE_DURATION_MS) {
                self.status = String::from("Enter copies the selected color");
                self.status_at = None;
            }
        }
    }
}

/// Saved-colors screen: most recent first, Enter copies, Esc returns to the
/// live view. The list is a snapshot of the store taken on entry; the watch
/// loop is stopped while this screen is up, so nothing mutates it meanwhile.
pub fn run(history: &Arc<Mutex<ColorHistory>>) -> Result<HistoryOutcome> {
    let mut app = HistoryApp::load(history);

    let mut terminal = setup_terminal()?;
    let run_result = run_app(&mut terminal, &mut app);
    let restore_result = restore_terminal(&mut terminal);

    if let Err(err) = restore_result {
        logger::error(&format!("Failed to restore terminal from history view: {}", err));
    }

    run_result?;

    Ok(app.outcome.unwrap_or(HistoryOutcome::Quit))
}

fn setup_terminal() -> Result<UiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;

    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen, Hide).context("failed to switch to alternate screen")?;

    let backend = CrosstermBackend::new(stderr);
    let terminal = Terminal::new(backend).context("failed to initialize terminal backend")?;

    Ok(terminal)
}

fn restore_terminal(terminal: &mut UiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

fn run_app(terminal: &mut UiTerminal, app: &mut HistoryApp) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|frame| draw_history(frame, app))?;

        if app.outcome.is_some() {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }
    }

    Ok(())
}

fn draw_history(frame: &mut Frame<'_>, app: &HistoryApp) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    if app.entries.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("No colors saved yet."),
            Line::from(""),
            Line::from("Press Space in the live view to capture one."),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Saved colors"));

        frame.render_widget(empty, layout[0]);
    } else {
        let items: Vec<ListItem<'_>> = app
            .entries
            .iter()
            .map(|hex| {
                let mut spans = Vec::new();
                if let Some(color) = SampledColor::from_hex(hex) {
                    spans.push(Span::styled(
                        "████ ",
                        Style::default().fg(Color::Rgb(color.red, color.green, color.blue)),
                    ));
                }
                spans.push(Span::raw(hex.clone()));
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Saved colors"))
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(app.selected));
        frame.render_stateful_widget(list, layout[0], &mut state);
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            "[↑↓/j,k] move  [Enter] copy  [Esc/h] back  [q] quit  ",
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(&app.status, Style::default().fg(Color::White)),
    ]))
    .alignment(Alignment::Left);

    frame.render_widget(footer, layout[1]);
}
