use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use toplines_terminal::config::Config;
use toplines_terminal::filters::{FilterPatch, FilterStore};
use toplines_terminal::http_client::init_http_client;
use toplines_terminal::provider::spawn_provider;
use toplines_terminal::records::{Game, Player};
use toplines_terminal::source::source_for_root;
use toplines_terminal::state::{
    AppState, Delta, ProviderCommand, Screen, apply_delta, screen_label,
};
use toplines_terminal::views;

const POSITIONS: [&str; 4] = ["", "G", "F", "C"];

struct App {
    state: AppState,
    store: FilterStore,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(config: &Config, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let store = FilterStore::new(config.filters_path.clone());
        let prefs = store.load();
        Self {
            state: AppState::new(config, prefs),
            store,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                self.state.set_screen(Screen::ALL[idx]);
                self.request_loads(false);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_loads(true),
            KeyCode::Char('g') | KeyCode::Char('G') => {
                self.state.toggle_gender();
                self.state
                    .push_log(format!("[INFO] Switched to {}", self.state.gender));
                self.request_loads(true);
            }
            KeyCode::Char('[') => self.shift_date(-1),
            KeyCode::Char(']') => self.shift_date(1),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('f') => {
                let featured_only = !self.state.prefs.featured_only;
                self.save_filters(FilterPatch {
                    featured_only: Some(featured_only),
                    ..FilterPatch::default()
                });
            }
            KeyCode::Char('o') => {
                let rsci_only = !self.state.prefs.rsci_only;
                self.save_filters(FilterPatch {
                    rsci_only: Some(rsci_only),
                    ..FilterPatch::default()
                });
            }
            KeyCode::Char('s') => {
                let sort_desc = !self.state.prefs.sort_desc;
                self.save_filters(FilterPatch {
                    sort_desc: Some(sort_desc),
                    ..FilterPatch::default()
                });
            }
            KeyCode::Char('c') => self.cycle_class(),
            KeyCode::Char('p') => self.cycle_position(),
            KeyCode::Char('n') => self.cycle_conference(),
            KeyCode::Char('a') if self.state.screen == Screen::Voting => self.vote(true),
            KeyCode::Char('b') if self.state.screen == Screen::Voting => self.vote(false),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn request_loads(&mut self, force: bool) {
        let cmds = self.state.load_commands(force);
        for cmd in cmds {
            self.send(cmd);
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Data provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Data provider stopped");
        }
    }

    fn shift_date(&mut self, days: i64) {
        if !self.state.shift_date(days) {
            return;
        }
        if self.state.screen == Screen::Schedule {
            let date = self.state.schedule_date.clone();
            self.save_filters(FilterPatch {
                schedule_date: Some(Some(date)),
                ..FilterPatch::default()
            });
        }
        self.request_loads(false);
    }

    fn save_filters(&mut self, patch: FilterPatch) {
        self.store.save_into(&mut self.state.prefs, patch);
        self.state.clamp_selection();
    }

    fn cycle_class(&mut self) {
        let players = match self.state.screen {
            Screen::Rankings => &self.state.rankings.data.players,
            _ => &self.state.daily.data.players,
        };
        let classes = views::distinct_classes(players);
        let current = self.state.prefs.selected_classes.first().cloned();
        let next = next_in_cycle(&classes, current.as_deref());
        self.save_filters(FilterPatch {
            selected_classes: Some(next.into_iter().collect()),
            ..FilterPatch::default()
        });
    }

    fn cycle_position(&mut self) {
        let current = self.state.prefs.selected_position.as_str();
        let idx = POSITIONS.iter().position(|p| *p == current).unwrap_or(0);
        let next = POSITIONS[(idx + 1) % POSITIONS.len()].to_string();
        self.save_filters(FilterPatch {
            selected_position: Some(next),
            ..FilterPatch::default()
        });
    }

    fn cycle_conference(&mut self) {
        let confs = self.state.conferences.data.clone();
        let current = self.state.prefs.selected_conferences.first().cloned();
        let next = next_in_cycle(&confs, current.as_deref());
        self.save_filters(FilterPatch {
            selected_conferences: Some(next.into_iter().collect()),
            ..FilterPatch::default()
        });
    }

    fn vote(&mut self, pick_first: bool) {
        match self.state.vote_for(pick_first) {
            Some(cmd) => self.send(cmd),
            None => self.state.push_log("[INFO] No matchup to vote on"),
        }
    }
}

/// None -> first -> ... -> last -> None.
fn next_in_cycle(options: &[String], current: Option<&str>) -> Option<String> {
    let Some(current) = current else {
        return options.first().cloned();
    };
    let idx = options.iter().position(|o| o == current)?;
    options.get(idx + 1).cloned()
}

fn main() -> io::Result<()> {
    let config = Config::from_env();
    if let Err(err) = init_http_client(config.http_timeout_secs) {
        eprintln!("warning: {err:#}");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let source = source_for_root(&config.data_base);
    spawn_provider(source, config.api_base.clone(), tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    app.request_loads(false);
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
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
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
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Daily | Screen::Rankings => render_players(frame, chunks[1], &app.state),
        Screen::Schedule => render_schedule(frame, chunks[1], &app.state),
        Screen::Voting => render_voting(frame, chunks[1], &app.state),
        Screen::Glossary => render_glossary(frame, chunks[1]),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let date = match state.screen {
        Screen::Daily => format!("{} ({}d)", state.report_date, state.days),
        Screen::Rankings => state.report_date.clone(),
        Screen::Schedule => state.schedule_date.clone(),
        Screen::Voting | Screen::Glossary => String::new(),
    };
    let line1 = format!(
        "TOPLINES | {} | {} | {}",
        screen_label(state.screen),
        state.gender.as_str().to_uppercase(),
        date
    );
    let line2 = format!("{}  {}", state.screen.path(), filters_summary(state));
    format!("{line1}\n{line2}")
}

fn filters_summary(state: &AppState) -> String {
    let prefs = &state.prefs;
    let mut parts = Vec::new();
    if !prefs.selected_classes.is_empty() {
        parts.push(format!("class={}", prefs.selected_classes.join(",")));
    }
    if !prefs.selected_position.is_empty() {
        parts.push(format!("pos={}", prefs.selected_position));
    }
    if !prefs.selected_conferences.is_empty() {
        parts.push(format!("conf={}", prefs.selected_conferences.join(",")));
    }
    if prefs.rsci_only {
        parts.push("rsci".to_string());
    }
    if prefs.featured_only {
        parts.push("featured".to_string());
    }
    parts.push(if prefs.sort_desc { "sort=desc" } else { "sort=asc" }.to_string());
    parts.join(" | ")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Daily | Screen::Rankings => {
            "1-5 Screens | [/] Date | j/k Move | c Class | p Pos | n Conf | o RSCI | s Sort | g Gender | r Reload | ? Help | q Quit".to_string()
        }
        Screen::Schedule => {
            "1-5 Screens | [/] Date | j/k Game | f Featured only | g Gender | r Reload | ? Help | q Quit".to_string()
        }
        Screen::Voting => "1-5 Screens | a Vote left | b Vote right | r Reload | ? Help | q Quit".to_string(),
        Screen::Glossary => "1-5 Screens | ? Help | q Quit".to_string(),
    }
}

fn status_line(loading: bool, error: Option<&str>) -> Option<(String, Style)> {
    if loading {
        return Some(("Loading...".to_string(), Style::default().fg(Color::Yellow)));
    }
    error.map(|err| (format!("Error: {err}"), Style::default().fg(Color::Red)))
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let slot = match state.screen {
        Screen::Rankings => &state.rankings,
        _ => &state.daily,
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    if let Some((text, style)) = status_line(slot.loading, slot.error.as_deref()) {
        frame.render_widget(Paragraph::new(text).style(style), sections[0]);
    } else {
        let header = format!(
            "{:>4}  {:<26} {:<4} {:<22} {:<12} {:<10}",
            "RSCI", "Player", "Pos", "Team", "Conf", "Class"
        );
        frame.render_widget(
            Paragraph::new(header).style(Style::default().add_modifier(Modifier::BOLD)),
            sections[0],
        );
    }

    let players = state.visible_players();
    if players.is_empty() {
        let msg = if slot.loading { "" } else { "No players match these filters" };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            sections[1],
        );
        return;
    }

    let visible = sections[1].height as usize;
    let (start, end) = visible_range(state.selected, players.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let style = if idx == state.selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(player_row(players[idx]), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), sections[1]);
}

fn player_row(p: &Player) -> String {
    let rank = p
        .rsci_rank
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>4}  {:<26} {:<4} {:<22} {:<12} {:<10}",
        rank,
        truncate(p.display_name(), 26),
        truncate(p.position.as_deref().unwrap_or("-"), 4),
        truncate(p.team.as_deref().unwrap_or("-"), 22),
        truncate(p.conference.as_deref().unwrap_or("-"), 12),
        p.class_label()
    )
}

fn render_schedule(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let games = state.visible_games();
    let list_text = if let Some((text, _)) =
        status_line(state.schedule.loading, state.schedule.error.as_deref())
    {
        text
    } else if games.is_empty() {
        "No games for this date".to_string()
    } else {
        let visible = columns[0].height.saturating_sub(2) as usize;
        let (start, end) = visible_range(state.selected, games.len(), visible);
        (start..end)
            .map(|idx| {
                let g = games[idx];
                let prefix = if idx == state.selected { "> " } else { "  " };
                format!(
                    "{prefix}{} [{}] {}",
                    game_title(g),
                    g.status.as_deref().unwrap_or("-"),
                    if g.featured_players.is_empty() {
                        String::new()
                    } else {
                        format!("*{}", g.featured_players.len())
                    }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let list = Paragraph::new(list_text)
        .block(Block::default().title("Games").borders(Borders::ALL));
    frame.render_widget(list, columns[0]);

    let mut lines = Vec::new();
    for merged in state.selected_game_players() {
        let p = &merged.player;
        let rank = merged
            .display_rank
            .map(|r| format!("#{r}"))
            .unwrap_or_else(|| "  ".to_string());
        lines.push(format!(
            "{rank:>4} {} ({}, {})",
            p.display_name(),
            p.position.as_deref().unwrap_or("-"),
            p.class_label()
        ));
    }
    if lines.is_empty() {
        lines.push("No featured players".to_string());
    }
    let toplines = state.selected_game_toplines();
    lines.push(String::new());
    lines.push(format!("Toplines: {}", toplines.len()));
    let detail = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Featured").borders(Borders::ALL));
    frame.render_widget(detail, columns[1]);
}

fn game_title(game: &Game) -> String {
    let away = game.extra_str("away_team").or_else(|| game.extra_str("away"));
    let home = game.extra_str("home_team").or_else(|| game.extra_str("home"));
    match (away, home) {
        (Some(a), Some(h)) => format!("{a} @ {h}"),
        _ => game
            .extra_str("name")
            .map(str::to_string)
            .unwrap_or_else(|| format!("Game {}", game.game_id.unwrap_or(0))),
    }
}

fn render_voting(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    match state.voting_pair() {
        Some((a, b)) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(rows[0]);
            for (col, (key, player)) in columns.iter().zip([("a", a), ("b", b)]) {
                let card = Paragraph::new(player_card(player))
                    .block(Block::default().title(format!("[{key}]")).borders(Borders::ALL));
                frame.render_widget(card, *col);
            }
        }
        None => {
            let msg = if state.rankings.loading {
                "Loading rankings..."
            } else {
                "Not enough ranked players to vote"
            };
            frame.render_widget(
                Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
                rows[0],
            );
        }
    }

    let status = if state.voting.submitting {
        "Submitting...".to_string()
    } else if let Some(result) = &state.voting.last_result {
        result.clone()
    } else {
        match &state.voting.api_status {
            Some(Ok(())) => "Voting API online".to_string(),
            Some(Err(err)) => format!("Voting API unavailable: {err}"),
            None => String::new(),
        }
    };
    frame.render_widget(
        Paragraph::new(status).block(Block::default().borders(Borders::ALL)),
        rows[1],
    );
}

fn player_card(p: &Player) -> String {
    [
        p.display_name().to_string(),
        format!("Team: {}", p.team.as_deref().unwrap_or("-")),
        format!("Conference: {}", p.conference.as_deref().unwrap_or("-")),
        format!("Position: {}", p.position.as_deref().unwrap_or("-")),
        format!("Class: {}", p.class_label()),
        format!(
            "RSCI: {}",
            p.rsci_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
    ]
    .join("\n")
}

fn render_glossary(frame: &mut Frame, area: Rect) {
    let text = [
        "Daily report",
        "  Player data aggregated over a trailing window of days ending on a date.",
        "",
        "Season rankings",
        "  Player rankings as of a date, not windowed.",
        "",
        "Topline",
        "  A per-game statistical summary for a player.",
        "",
        "Featured player",
        "  A player highlighted in a schedule entry, enriched with season data.",
        "",
        "RSCI rank",
        "  The recruit's externally sourced ranking number.",
    ]
    .join("\n");
    let glossary = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Glossary").borders(Borders::ALL));
    frame.render_widget(glossary, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let mut lines: Vec<String> = state.logs.iter().rev().take(3).cloned().collect();
    lines.reverse();
    lines.join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        return raw.to_string();
    }
    let mut out: String = raw.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Toplines Terminal - Help",
        "",
        "Screens:",
        "  1  Daily reports      2  Schedule",
        "  3  Season rankings    4  Prospect voting",
        "  5  Glossary",
        "",
        "Global:",
        "  [ / ]        Previous / next date",
        "  g            Men / women",
        "  r            Reload",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Filters (saved between sessions):",
        "  c  Class   p  Position   n  Conference",
        "  o  RSCI only   s  Sort direction   f  Featured games only",
        "",
        "Voting:",
        "  a / b        Pick the left / right player",
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
