use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use nebula_terminal::board::BoardEntry;
use nebula_terminal::config::Config;
use nebula_terminal::feed_worker::spawn_feed_worker;
use nebula_terminal::state::{apply_delta, AppState, Delta, ProviderCommand, ALL_LEAGUES};

const ROW_HEIGHT: u16 = 4;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(config: &Config, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::with_config(config),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('l') | KeyCode::Right => self.state.cycle_league_next(),
            KeyCode::Char('L') | KeyCode::Left => self.state.cycle_league_prev(),
            KeyCode::Char('h') | KeyCode::Char('H') => self.state.toggle_hide_old_games(),
            KeyCode::Char('j') | KeyCode::Down => {
                let total = self.state.visible_entries().len();
                self.state.scroll_down(total);
            }
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_load(true),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn request_load(&mut self, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Feed loading unavailable");
            }
            return;
        };
        if tx.send(ProviderCommand::LoadFeeds).is_err() {
            self.state.push_log("[WARN] Feed request failed");
        } else {
            self.state.loading = true;
            if announce {
                self.state.push_log("[INFO] Reload requested");
            }
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = Config::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_feed_worker(config.clone(), tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    app.request_load(false);
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

fn ui(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let entries = app.state.visible_entries();

    let header = Paragraph::new(header_text(&app.state, entries.len()))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(chunks[1]);
    render_leagues(frame, body[0], &app.state);
    render_entries(frame, body[1], &mut app.state, &entries);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState, shown: usize) -> String {
    let toggle = if state.hide_old_games {
        "Hiding old games (ON)"
    } else {
        "Showing all games (OFF)"
    };
    let status = if state.loading {
        "loading...".to_string()
    } else {
        match state.loaded_at {
            Some(at) => format!("updated {}", at.format("%H:%M:%S")),
            None => "not loaded".to_string(),
        }
    };
    let line1 = format!(
        "  *   NEBULA | First Half Goals | {} | {}",
        state.league_label(),
        toggle
    );
    let line2 = format!(
        " *.*  {shown} of {} games | times in {} | {status}",
        state.records.len(),
        state.viewer.label()
    );
    format!("{line1}\n{line2}")
}

fn footer_text() -> &'static str {
    "l/L League | h Old games | j/k/↑/↓ Scroll | r Reload | ? Help | q Quit"
}

fn render_leagues(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut lines = Vec::with_capacity(state.league_options.len() + 1);
    let all_selected = state.selected_league.is_empty();
    lines.push(league_line(ALL_LEAGUES, all_selected));
    for league in &state.league_options {
        lines.push(league_line(league, *league == state.selected_league));
    }

    let list = Paragraph::new(lines)
        .block(Block::default().title("Leagues").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn league_line(label: &str, selected: bool) -> Line<'static> {
    if selected {
        Line::styled(
            format!("> {label}"),
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Line::raw(format!("  {label}"))
    }
}

fn render_entries(frame: &mut Frame, area: Rect, state: &mut AppState, entries: &[BoardEntry]) {
    let block = Block::default().title("Games").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = (inner.height / ROW_HEIGHT).max(1) as usize;
    state.set_page_rows(visible, entries.len());

    if entries.is_empty() {
        let msg = if state.loading && state.records.is_empty() {
            "Loading feeds..."
        } else {
            "No games for this selection"
        };
        let empty = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    if inner.height < ROW_HEIGHT - 1 {
        let empty = Paragraph::new("Game list needs more height")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let (start, end) = visible_range(state.scroll, entries.len(), visible);

    for (i, entry) in entries[start..end].iter().enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + (i as u16) * ROW_HEIGHT,
            width: inner.width,
            height: (ROW_HEIGHT - 1).min(inner.height),
        };
        let label = Style::default().fg(Color::DarkGray);
        let lines = vec![
            Line::from(vec![
                Span::styled("Teams: ", label),
                Span::styled(
                    format!("{} vs. {}", entry.home, entry.away),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![Span::styled("League: ", label), Span::raw(entry.league.clone())]),
            Line::from(vec![
                Span::styled("Start Time: ", label),
                Span::styled(entry.start_time.clone(), Style::default().fg(Color::Green)),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), row_area);
    }
}

/// Window of `visible` rows starting at `scroll`, pulled back so the last
/// page stays full.
fn visible_range(scroll: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }
    let start = scroll.min(total - visible);
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

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Nebula - Help",
        "",
        "Shows 'Over' picks that have a reference row.",
        "Start times are published in US Eastern and",
        "shown in your time zone (anchored to today).",
        "",
        "  l / →        Next league",
        "  L / ←        Previous league",
        "  h            Hide/show games started 45+ min ago",
        "  j/k or ↑/↓   Scroll",
        "  r            Reload both feeds",
        "  ? / Esc      Toggle help",
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
