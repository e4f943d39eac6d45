use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use star_desk::config::ApiConfig;
use star_desk::location::{Route, route_label};
use star_desk::provider;
use star_desk::state::{
    AlertKind, AppState, DateField, Delta, LoadStatus, ProviderCommand, apply_delta,
};

const DEFAULT_LOCATION: &str = "/star-assignment";

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    export_dir: PathBuf,
}

impl App {
    fn new(
        state: AppState,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
            export_dir,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_alert();
            }
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Down => self.state.select_next(),
            KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter => {
                let today = Local::now().date_naive();
                if let Some(cmd) = self.state.prepare_submit(today) {
                    self.send(cmd);
                }
            }
            _ if self.state.has_date_inputs() => self.on_date_key(key),
            _ => self.on_assignment_key(key),
        }
    }

    fn on_assignment_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') => self.state.select_next(),
            KeyCode::Char('k') => self.state.select_prev(),
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                self.state.toggle_current();
            }
            KeyCode::Char('s') => {
                let today = Local::now().date_naive();
                if let Some(cmd) = self.state.prepare_submit(today) {
                    self.send(cmd);
                }
            }
            KeyCode::Char('r') => {
                if let Some(cmd) = self.state.reload_command() {
                    self.send(cmd);
                }
            }
            _ => {}
        }
    }

    fn on_date_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => self.state.cycle_focus(),
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Char('w') if self.state.route == Some(Route::TeamStarReport) => {
                if let Some(cmd) = self.state.export_command(self.export_dir.clone()) {
                    self.send(cmd);
                }
            }
            KeyCode::Char(ch) => self.state.type_char(ch),
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.in_flight = false;
            self.state.push_log("[INFO] Request worker unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.in_flight = false;
            self.state.push_log("[WARN] Request worker stopped");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut cfg = ApiConfig::from_env();
    if let Some(dir) = parse_flag_arg("--export-dir") {
        cfg.export_dir = PathBuf::from(dir);
    }
    let location = parse_location_arg().unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    let state = AppState::open(&location);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let export_dir = cfg.export_dir.clone();
    provider::spawn_provider(cfg, tx, cmd_rx);

    let mut app = App::new(state, Some(cmd_tx), export_dir);
    if let Some(cmd) = app.state.initial_command() {
        app.send(cmd);
    }
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn parse_location_arg() -> Option<String> {
    if let Some(loc) = parse_flag_arg("--location") {
        return Some(loc);
    }
    std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .map(|arg| arg.trim().to_string())
        .filter(|arg| !arg.is_empty())
}

fn parse_flag_arg(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            let trimmed = next.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
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
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &app.state.status {
        LoadStatus::Loading => {
            frame.render_widget(Paragraph::new("Loading..."), chunks[1]);
        }
        LoadStatus::Error(msg) => {
            let err = Paragraph::new(format!("Error: {msg}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(err, chunks[1]);
        }
        LoadStatus::Ready => match app.state.route {
            Some(Route::StarAssignment) => render_assignment(frame, chunks[1], &app.state),
            Some(Route::TeamStarReport) => render_report(frame, chunks[1], &app.state),
            Some(Route::BallCollection) => render_date_inputs(frame, chunks[1], &app.state),
            None => {}
        },
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    if app.state.alert.is_some() {
        render_alert(frame, frame.size(), &app.state);
    }
}

fn header_text(state: &AppState) -> String {
    let Some(route) = state.route else {
        return format!("STAR DESK | {}", state.location);
    };
    let subject = match route {
        Route::StarAssignment => match &state.session {
            Some(session) => format!("Star Assignment for: {}", session.name),
            None => "Star Assignment".to_string(),
        },
        Route::TeamStarReport => format!(
            "Team Stars Report for Team ID: {}",
            state.team_id.as_deref().unwrap_or("-")
        ),
        Route::BallCollection => format!(
            "Ball Collection Report for Team ID: {}",
            state.team_id.as_deref().unwrap_or("-")
        ),
    };
    let busy = if state.in_flight { " | working..." } else { "" };
    format!("{} | {subject}{busy}", route_label(route))
}

fn footer_text(state: &AppState) -> String {
    match state.route {
        Some(Route::StarAssignment) => {
            "j/k/↑/↓ Move | Space/x Toggle | Enter/s Submit | r Reload | ? Help | q Quit"
                .to_string()
        }
        Some(Route::TeamStarReport) => {
            "Tab Field | 0-9/- Type | Enter Send | ↑/↓ Scroll | w Save | ? Help | q/Esc Quit"
                .to_string()
        }
        Some(Route::BallCollection) => {
            "Tab Field | 0-9/- Type | Enter Send | ? Help | q/Esc Quit".to_string()
        }
        None => "q Quit".to_string(),
    }
}

fn render_assignment(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let session_date = state
        .session
        .as_ref()
        .map(|s| s.session_date.as_str())
        .unwrap_or("-");
    let summary = format!(
        "Select Team Members | {} of {} selected | Session date: {session_date}",
        state.selection.selected_count(),
        state.selection.len()
    );
    frame.render_widget(
        Paragraph::new(summary).style(Style::default().add_modifier(Modifier::BOLD)),
        sections[0],
    );

    let list_area = sections[1];
    if state.members.is_empty() {
        let empty = Paragraph::new("No team members").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.cursor, state.members.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let member = &state.members[idx];
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let mark = if state.selection.is_selected(&member.id) {
            "[x]"
        } else {
            "[ ]"
        };
        let line = if member.email.is_empty() {
            format!("{mark} {}", member.name)
        } else {
            format!("{mark} {}  <{}>", member.name, member.email)
        };
        let style = if idx == state.cursor {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        frame.render_widget(Paragraph::new(line).style(style), row_area);
    }
}

fn render_date_inputs(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Length(24), Constraint::Min(0)])
        .split(Rect {
            height: area.height.min(3),
            ..area
        });
    render_date_field(frame, cols[0], "Start Date", &state.start_date, state.focus == DateField::Start);
    render_date_field(frame, cols[1], "End Date", &state.end_date, state.focus == DateField::End);
}

fn render_date_field(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let shown = if value.is_empty() && !focused {
        "YYYY-MM-DD".to_string()
    } else if focused {
        format!("{value}_")
    } else {
        value.to_string()
    };
    let field = Paragraph::new(shown).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(field, area);
}

fn render_report(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);
    render_date_inputs(frame, sections[0], state);

    let block = Block::default().title("Report").borders(Borders::ALL);
    let Some(report) = &state.report else {
        let empty = Paragraph::new("No report yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, sections[1]);
        return;
    };
    if report.table.is_empty() {
        let empty = Paragraph::new("Report is empty")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, sections[1]);
        return;
    }

    let columns = report.table.column_count().max(1);
    let widths = vec![Constraint::Ratio(1, columns as u32); columns];
    let header = Row::new(
        report
            .table
            .header()
            .unwrap_or_default()
            .iter()
            .map(|cell| Cell::from(cell.clone())),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = report
        .table
        .body()
        .iter()
        .skip(state.report_scroll)
        .map(|row| Row::new(row.iter().map(|cell| Cell::from(cell.clone()))));
    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(format!(
            "Report {} to {}",
            report.range.start_param(),
            report.range.end_param()
        )));
    frame.render_widget(table, sections[1]);
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

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_alert(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(alert) = &state.alert else {
        return;
    };
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let (title, color) = match alert.kind {
        AlertKind::Info => ("Notice", Color::Cyan),
        AlertKind::Error => ("Error", Color::Red),
    };
    let text = format!("{}\n\n[Enter] OK", alert.message);
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Star Desk - Help",
        "",
        "Star assignment:",
        "  j/k or ↑/↓   Move",
        "  Space / x    Toggle member",
        "  Enter / s    Submit assignments",
        "  r            Reload session and members",
        "",
        "Reports:",
        "  Tab          Switch start/end field",
        "  0-9 and -    Type a YYYY-MM-DD date",
        "  Enter        Send request",
        "  ↑/↓          Scroll report rows",
        "  w            Save report as CSV and XLSX",
        "",
        "  ?            Toggle help",
        "  q / Esc      Quit",
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
