use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use wc26_draw::presets::{self, CompetitionPreset};
use wc26_draw::schedule;
use wc26_draw::settings::Settings;
use wc26_draw::state::{AppState, BoardGroup, Screen, confed_label, format_label};

struct App {
    state: AppState,
    preset_id: Option<&'static str>,
    should_quit: bool,
}

impl App {
    fn new(state: AppState) -> Self {
        Self {
            state,
            preset_id: None,
            should_quit: false,
        }
    }

    fn load_preset(&mut self, preset: &'static CompetitionPreset) {
        if self.state.load_preset(preset).is_ok() {
            self.preset_id = Some(preset.id);
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Tab => self.state.toggle_screen(),
            KeyCode::Char('1') => self.state.screen = Screen::Groups,
            KeyCode::Char('2') => self.state.screen = Screen::Schedule,
            KeyCode::Char('d') | KeyCode::Char(' ') => {
                if self.state.is_revealing() {
                    self.state.skip_playback();
                } else {
                    let _ = self.state.start_draw(&mut rand::thread_rng());
                }
            }
            KeyCode::Char('s') => self.state.skip_playback(),
            KeyCode::Char('r') => self.state.reset_draw(),
            KeyCode::Char('h') => self.state.toggle_home_away(),
            KeyCode::Char('p') => {
                let next = presets::next_preset(self.preset_id.unwrap_or(""));
                self.load_preset(next);
            }
            KeyCode::Char('e') => {
                let _ = self.state.export_draw(chrono::Local::now().naive_local());
            }
            KeyCode::Right | KeyCode::Char(']') => self.state.next_matchday(),
            KeyCode::Left | KeyCode::Char('[') => self.state.prev_matchday(),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let settings = Settings::from_env();
    let registry = settings.load_registry().context("unable to load nation registry")?;
    let import_path = parse_path_arg("--import");
    let preset_id = parse_str_arg("--preset").unwrap_or_else(|| settings.preset_id.clone());

    let mut app = App::new(AppState::new(registry, settings));
    match import_path {
        Some(path) => app
            .state
            .import_file(&path)
            .with_context(|| format!("import {}", path.display()))?,
        None => {
            let preset =
                presets::find_preset(&preset_id).ok_or_else(|| anyhow!("unknown preset '{preset_id}'"))?;
            app.load_preset(preset);
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

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

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(50);

    loop {
        app.state.tick(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
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
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Groups => render_groups(frame, chunks[1], &app.state),
        Screen::Schedule => render_schedule(frame, chunks[1], &app.state),
    }

    let logs = Paragraph::new(log_text(&app.state, chunks[2].height.saturating_sub(2)))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Log").borders(Borders::ALL));
    frame.render_widget(logs, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let format = state
        .setup
        .as_ref()
        .map(|s| format_label(s.format))
        .unwrap_or("Imported");
    let status = match (&state.outcome, state.is_revealing()) {
        (_, true) => format!("Drawing... {} to go", state.playback.len()),
        (Some(outcome), false) if outcome.success => "Draw complete".to_string(),
        (Some(_), false) => "Draw failed: re-run with d".to_string(),
        (None, false) if state.setup.is_some() => "Ready to draw".to_string(),
        (None, false) => format!("{} groups", state.final_groups.len()),
    };
    let mode = if state.home_away { "H/A" } else { "Single" };
    format!(
        "  WC26 DRAW | {} | {} | {} | Schedule: {}\n  {}",
        state.comp_name,
        format,
        state.comp_type.as_str(),
        mode,
        status
    )
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Groups => {
            "d Draw/Skip | r Reset | p Preset | e Export | Tab Schedule | ? Help | q Quit".to_string()
        }
        Screen::Schedule => {
            "←/→ [/] Matchday | h Home/Away | Tab Groups | ? Help | q Quit".to_string()
        }
    }
}

fn log_text(state: &AppState, lines: u16) -> String {
    let skip = state.logs.len().saturating_sub(lines as usize);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_groups(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.board.is_empty() {
        let empty = Paragraph::new("No competition loaded")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let cols = if state.board.len() >= 8 { 4 } else { 3 };
    let rows = state.board.len().div_ceil(cols);
    let slot_rows = state.board.iter().map(|g| g.slots.len()).max().unwrap_or(0) as u16;

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(slot_rows + 2); rows])
        .split(area);

    for (row_idx, chunk) in state.board.chunks(cols).enumerate() {
        let Some(row_area) = row_areas.get(row_idx) else {
            break;
        };
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
            .split(*row_area);
        for (group, cell) in chunk.iter().zip(col_areas.iter()) {
            let widget = Paragraph::new(group_lines(state, group)).block(
                Block::default()
                    .title(format!("Group {}", group.name))
                    .borders(Borders::ALL),
            );
            frame.render_widget(widget, *cell);
        }
    }
}

fn group_lines(state: &AppState, group: &BoardGroup) -> Vec<Line<'static>> {
    group
        .slots
        .iter()
        .enumerate()
        .map(|(pos, slot)| match slot {
            Some(name) => {
                let confed = state
                    .registry
                    .get(name)
                    .map(|n| confed_label(n.confed))
                    .unwrap_or("");
                let is_host = state
                    .setup
                    .as_ref()
                    .is_some_and(|s| s.hosts().any(|h| &h.name == name));
                let style = if is_host {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{} ", pos + 1)),
                    Span::styled(name.clone(), style),
                    Span::styled(format!(" {confed}"), Style::default().fg(Color::DarkGray)),
                ])
            }
            None => Line::from(Span::styled(
                format!("{} -", pos + 1),
                Style::default().fg(Color::DarkGray),
            )),
        })
        .collect()
}

fn render_schedule(frame: &mut Frame, area: Rect, state: &AppState) {
    let total = state.total_matchdays();
    if total == 0 {
        let empty = Paragraph::new("No schedule yet: complete a draw or import a competition")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let mut lines = Vec::new();
    let mut last_group = String::new();
    for (group, fixture) in schedule::matches_for_matchday(&state.schedule, state.matchday) {
        if group != last_group {
            if !last_group.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                format!("Group {group}"),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            last_group = group;
        }
        lines.push(Line::from(format!(
            "  {:<24} v  {}",
            fixture.home, fixture.away
        )));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(format!("Matchday {}/{}", state.matchday, total))
            .borders(Borders::ALL),
    );
    frame.render_widget(widget, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "WC26 Draw - Help",
        "",
        "Global:",
        "  Tab / 1 / 2  Groups / Schedule",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Groups:",
        "  d / Space    Run draw (skip reveal while drawing)",
        "  s            Skip reveal",
        "  r            Reset draw",
        "  p            Next preset",
        "  e            Export draw to json",
        "",
        "Schedule:",
        "  ←/→ or [/]   Previous/next matchday",
        "  h            Toggle home and away",
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

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    parse_str_arg(name).map(PathBuf::from)
}

fn parse_str_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(val) = arg.strip_prefix(&prefix) {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
