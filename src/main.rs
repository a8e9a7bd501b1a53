use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use euro24_terminal::config::SimConfig;
use euro24_terminal::controller::GameController;
use euro24_terminal::feed::{FeedMsg, ThreadScheduler};
use euro24_terminal::logging;
use euro24_terminal::simulation::RngDice;
use euro24_terminal::state::{GameStatus, Match, TournamentState};

type Controller = GameController<RngDice<StdRng>, ThreadScheduler>;

struct App {
    controller: Controller,
    should_quit: bool,
    help_overlay: bool,
}

impl App {
    fn new(config: SimConfig, tx: mpsc::Sender<FeedMsg>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut controller =
            GameController::new(config, RngDice(rng), ThreadScheduler::new(tx));
        controller.request_load();
        Self {
            controller,
            should_quit: false,
            help_overlay: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Err(err) = self.controller.press_button() {
                    self.controller.push_log(format!("[WARN] {err}"));
                }
            }
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            KeyCode::Esc => self.help_overlay = false,
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let config = SimConfig::from_env();
    if let Some(path) = config.log_file.as_deref() {
        if let Err(err) = logging::init_file(path) {
            eprintln!("warning: {err:#}");
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let mut app = App::new(config, tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<FeedMsg>,
) -> io::Result<()> {
    let frame_rate = Duration::from_millis(100);
    let mut last_frame = Instant::now();

    loop {
        while let Ok(msg) = rx.try_recv() {
            app.controller.handle(msg);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = frame_rate
            .checked_sub(last_frame.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_frame.elapsed() >= frame_rate {
            last_frame = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = app.controller.state();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let button = Paragraph::new(format!("[ {} ]", state.button_label))
        .alignment(Alignment::Center)
        .style(button_style(state.status))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, centered_width(30, chunks[1]));

    render_matches(frame, chunks[2], state);

    let totals = Paragraph::new(totals_text(state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(totals, chunks[3]);

    let console = Paragraph::new(console_text(app))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[4]);

    let footer = Paragraph::new("Space/Enter Button | ? Help | q Quit");
    frame.render_widget(footer, chunks[5]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &TournamentState) -> String {
    let line1 = format!("  .-.  {}", state.title.to_uppercase());
    let line2 = format!(" (   ) {}", status_label(state.status));
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn render_matches(frame: &mut Frame, area: Rect, state: &TournamentState) {
    let block = Block::default().title("Matches").borders(Borders::ALL);
    if state.load_error {
        let msg = Paragraph::new("Failed to load matches. Restart to try again.")
            .style(Style::default().fg(Color::Red))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }
    if state.matches.is_empty() {
        let msg = Paragraph::new("Loading matches...").block(block);
        frame.render_widget(msg, area);
        return;
    }

    let lines: Vec<Line> = state.matches.iter().map(match_line).collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn match_line(m: &Match) -> Line<'static> {
    let style = if m.active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{} vs {}", m.home.name, m.away.name), style),
        Span::raw("  "),
        Span::styled(m.scoreline(), style.add_modifier(Modifier::BOLD)),
    ])
}

fn totals_text(state: &TournamentState) -> String {
    format!(
        "Total goals: {}\nTime left: {}",
        state.total_goals,
        state.clock_label()
    )
}

fn console_text(app: &App) -> String {
    let logs = app.controller.logs();
    if logs.is_empty() {
        return "No events yet".to_string();
    }
    let skip = logs.len().saturating_sub(4);
    logs.iter().skip(skip).cloned().collect::<Vec<_>>().join("\n")
}

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::BeforeStart => "BEFORE START",
        GameStatus::Ongoing => "LIVE",
        GameStatus::Stopped => "STOPPED",
        GameStatus::Finished => "FULL TIME",
    }
}

fn button_style(status: GameStatus) -> Style {
    let color = match status {
        GameStatus::BeforeStart => Color::Green,
        GameStatus::Ongoing => Color::Red,
        GameStatus::Stopped | GameStatus::Finished => Color::Cyan,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Euro24 Terminal - Help",
        "",
        "  Space / Enter  Start game, finish, restart",
        "  ?              Toggle help",
        "  Esc            Close help",
        "  q              Quit",
        "",
        "Goals are drawn every tick while the game is live.",
        "Restarting reloads the tournament data.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_width(width: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
