use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use cricket_oracle::config::{self, AppConfig, flag_values};
use cricket_oracle::dataset::Dataset;
use cricket_oracle::http_cache::app_cache_dir;
use cricket_oracle::logging;
use cricket_oracle::ocr::TesseractCli;
use cricket_oracle::predict::{
    DecisionBasis, PredictionOutcome, PredictionRequest, Strategy, TeamReport,
};
use cricket_oracle::squad::IplRosterSource;
use cricket_oracle::state::{AppState, Delta, PickerSide, WorkerCommand, apply_delta};
use cricket_oracle::summary::DatasetSummary;
use cricket_oracle::teams::IPL_TEAMS;
use cricket_oracle::worker::spawn_prediction_worker;

const LOG_FILE: &str = "cricket_oracle.log";
const PLAYER_LINES: usize = 8;

struct App {
    state: AppState,
    summary: Arc<DatasetSummary>,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<WorkerCommand>>,
}

impl App {
    fn new(summary: Arc<DatasetSummary>, cmd_tx: Option<mpsc::Sender<WorkerCommand>>) -> Self {
        Self {
            state: AppState::new(),
            summary,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            KeyCode::Tab
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Char('h')
            | KeyCode::Char('l') => self.state.toggle_focus(),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(true),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(false),
            KeyCode::Enter | KeyCode::Char(' ') => self.state.select_focused(),
            KeyCode::Char('c') => {
                self.state.clear_selection();
                self.state.push_log("[INFO] Selection cleared");
            }
            KeyCode::Char('p') => {
                let request = self.state.squad_request();
                self.send_request(request);
            }
            KeyCode::Char('o') => {
                let request = self.state.image_request();
                self.send_request(request);
            }
            _ => {}
        }
    }

    fn send_request(&mut self, request: PredictionRequest) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Prediction worker unavailable");
            return;
        };
        if !self.state.begin_request() {
            return;
        }
        if tx.send(WorkerCommand::Predict(request)).is_err() {
            self.state.pending = false;
            self.state.push_log("[WARN] Prediction request failed");
        } else {
            self.state.push_log("[INFO] Prediction request sent");
        }
    }
}

fn main() -> Result<()> {
    config::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = AppConfig::from_env().with_args(&args);

    if let Some(dir) = app_cache_dir()
        && let Err(err) = logging::init_file(&dir.join(LOG_FILE))
    {
        eprintln!("logging disabled: {err:#}");
    }

    let dataset = Dataset::load(&cfg.matches_path, &cfg.deliveries_path)
        .context("failed to load match datasets")?;
    let summary = Arc::new(DatasetSummary::build(&dataset));
    drop(dataset);

    let roster = IplRosterSource::from_config(&cfg)?;
    let ocr = TesseractCli::from_config(&cfg);

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_prediction_worker(
        Arc::clone(&summary),
        Box::new(roster),
        Box::new(ocr),
        tx,
        cmd_rx,
    );

    let mut app = App::new(summary, Some(cmd_tx));
    app.state.images = flag_values(&args, "--image")
        .into_iter()
        .map(PathBuf::from)
        .collect();
    if !app.summary.has_wicket_data {
        app.state
            .push_log("[INFO] No dismissal column in deliveries; bowler stats unavailable");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    render_dashboard(frame, body[0], &app.summary);
    render_prediction(frame, body[1], &app.state);

    let footer = Paragraph::new(footer_text()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let status = if state.pending {
        "PREDICTING..."
    } else if state.error.is_some() {
        "ERROR"
    } else if state.prediction.is_some() {
        "RESULT"
    } else {
        "READY"
    };
    let images = if state.images.is_empty() {
        "no images".to_string()
    } else {
        format!("{} image(s)", state.images.len())
    };
    format!("  ( )  IPL ORACLE | {status} | OCR: {images}\n  /|\\\n  / \\")
}

fn footer_text() -> &'static str {
    concat!(
        "Tab Side | j/k/↑/↓ Move | Enter Select | p Predict squads | ",
        "o Predict from images | c Clear | ? Help | q Quit"
    )
}

fn render_dashboard(frame: &mut Frame, area: Rect, summary: &DatasetSummary) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(rows[1]);

    let seasons = summary
        .matches_per_season
        .iter()
        .map(|r| (r.season.clone(), r.matches))
        .collect::<Vec<_>>();
    render_chart(frame, rows[0], "Matches per season", &seasons, Direction::Vertical);

    let teams = summary
        .team_wins
        .iter()
        .map(|r| (r.team.clone(), r.wins))
        .collect::<Vec<_>>();
    render_chart(frame, bottom[0], "Team wins", &teams, Direction::Horizontal);

    let batters = summary
        .top_batters
        .iter()
        .map(|r| (r.batter.clone(), r.runs))
        .collect::<Vec<_>>();
    render_chart(frame, bottom[1], "Top batters (runs)", &batters, Direction::Horizontal);

    if summary.top_bowlers.is_empty() {
        let empty = Paragraph::new("No dismissal data")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Top bowlers (wickets)").borders(Borders::ALL));
        frame.render_widget(empty, bottom[2]);
        return;
    }
    let bowlers = summary
        .top_bowlers
        .iter()
        .map(|r| (r.bowler.clone(), r.wickets))
        .collect::<Vec<_>>();
    render_chart(frame, bottom[2], "Top bowlers (wickets)", &bowlers, Direction::Horizontal);
}

fn render_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[(String, u64)],
    direction: Direction,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if rows.is_empty() {
        let empty = Paragraph::new("No data")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let label_len = match direction {
        Direction::Vertical => 4,
        Direction::Horizontal => 12,
    };
    let bars = rows
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value(*value)
                .label(Line::from(short_label(label, label_len)))
                .text_value(value.to_string())
                .style(Style::default().fg(Color::Cyan))
        })
        .collect::<Vec<_>>();

    let (bar_width, bar_gap) = match direction {
        Direction::Vertical => (4, 1),
        Direction::Horizontal => (1, 0),
    };
    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .direction(direction)
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, area);
}

/// Seasons like "2007/08" keep their leading year; names keep their tail.
fn short_label(raw: &str, max: usize) -> String {
    let count = raw.chars().count();
    if count <= max {
        return raw.to_string();
    }
    if max == 4 {
        return raw.chars().take(max).collect();
    }
    let tail = raw.chars().skip(count - (max - 1)).collect::<String>();
    format!("…{tail}")
}

fn render_prediction(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(IPL_TEAMS.len() as u16 + 2),
            Constraint::Min(5),
            Constraint::Length(5),
        ])
        .split(area);

    let pickers = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    render_picker(frame, pickers[0], state, PickerSide::Team1);
    render_picker(frame, pickers[1], state, PickerSide::Team2);

    let result_style = if state.error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let result = Paragraph::new(result_text(state))
        .style(result_style)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Prediction").borders(Borders::ALL));
    frame.render_widget(result, rows[1]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn render_picker(frame: &mut Frame, area: Rect, state: &AppState, side: PickerSide) {
    let title = match side {
        PickerSide::Team1 => "Team 1",
        PickerSide::Team2 => "Team 2",
    };
    let focused = state.focus == side;
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let cursor = state.cursor_for(side);
    let chosen = state.selected_for(side);
    let lines = IPL_TEAMS
        .iter()
        .enumerate()
        .map(|(idx, team)| {
            let marker = if chosen == Some(team) { "*" } else { " " };
            let prefix = if idx == cursor && focused { ">" } else { " " };
            let text = format!("{prefix}{marker} {}", team.name);
            if idx == cursor {
                Line::styled(text, Style::default().add_modifier(Modifier::BOLD))
            } else {
                Line::from(text)
            }
        })
        .collect::<Vec<_>>();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn result_text(state: &AppState) -> String {
    if state.pending {
        return "Predicting...".to_string();
    }
    if let Some(err) = &state.error {
        return err.clone();
    }
    let Some(outcome) = &state.prediction else {
        return "Select two teams and press p, or press o to read the --image files.".to_string();
    };
    outcome_text(outcome)
}

fn outcome_text(outcome: &PredictionOutcome) -> String {
    let mut lines = Vec::new();
    let label = match outcome.strategy {
        Strategy::Squad => "squad strength",
        Strategy::Ocr => "historical wins",
    };
    lines.push(format!("Compared by {label}"));
    lines.push(String::new());
    team_lines(&mut lines, &outcome.team1);
    lines.push(String::new());
    team_lines(&mut lines, &outcome.team2);
    lines.push(String::new());
    let basis = match outcome.basis {
        DecisionBasis::Strength => "higher strength",
        DecisionBasis::HistoricalWins => "tie broken on historical wins",
    };
    lines.push(format!("Winner: {} ({basis})", outcome.winner));
    lines.join("\n")
}

fn team_lines(lines: &mut Vec<String>, team: &TeamReport) {
    lines.push(format!(
        "{}  strength {}  (wins {})",
        team.name, team.strength, team.historical_wins
    ));
    for p in team.players.iter().take(PLAYER_LINES) {
        lines.push(format!(
            "  {:<22} R {:>5}  W {:>3}  = {}",
            p.name, p.runs, p.wickets, p.combined_score
        ));
    }
    if team.players.len() > PLAYER_LINES {
        lines.push(format!("  +{} more", team.players.len() - PLAYER_LINES));
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "IPL Oracle - Help",
        "",
        "Teams:",
        "  Tab / h / l  Switch side",
        "  j/k or ↑/↓   Move",
        "  Enter/Space  Select team",
        "  c            Clear selection",
        "",
        "Predict:",
        "  p            Compare current squads",
        "  o            Read teams from --image files",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
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
