use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        Event,
        EventStream,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use futures::StreamExt;
use ratatui::{
    prelude::*,
    widgets::*,
};
use roulette_client::{
    controls::{
        Controls,
        Intent,
        TARGET_PROMPT,
        resolve_target,
    },
    session::{
        Action,
        AdminCommand,
    },
    view::{
        GameView,
        ItemTags,
        NO_ITEMS_PLACEHOLDER,
        PlayerCard,
        RESTRAINED_MARKER,
    },
};
use std::io::stdout;
use tracing::info;
use unicode_width::UnicodeWidthStr;

pub type InputEventReceiver = EventStream;

pub enum UserEvent {
    Quit,
    Redraw,
    /// Fetch state now instead of waiting for the next poll.
    Refresh,
    Send(Action),
    /// Already past its confirmation gate.
    Admin(AdminCommand),
}

#[derive(Debug)]
pub struct UiState {
    mode: Mode,
    focus: Focus,
    target_idx: usize,
    item_idx: usize,
    controls: Controls,
    /// Notices that arrived while an input or confirmation modal was open.
    pending_notices: Vec<String>,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            mode: Mode::Normal,
            focus: Focus::Targets,
            target_idx: 0,
            item_idx: 0,
            controls: Controls::default(),
            pending_notices: Vec::new(),
            terminal: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    Confirm(AdminCommand),
    TargetInput {
        item_name: String,
        input: String,
    },
    MessageInput(String),
    Notice(Vec<String>),
    QuitModal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Focus {
    #[default]
    Targets,
    Items,
}

/// Footer facts that do not come from the snapshot.
pub struct StatusView<'a> {
    pub session: &'a str,
    pub server: &'a str,
    pub last_sync: Option<&'a str>,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn input_event_stream() -> InputEventReceiver {
    EventStream::new()
}

pub async fn next_raw_event(events: &mut InputEventReceiver) -> Result<Event> {
    match events.next().await {
        Some(Ok(event)) => Ok(event),
        Some(Err(err)) => Err(err.into()),
        None => Err(eyre!("terminal input stream closed")),
    }
}

/// Queues a blocking notification; it stays until a key is pressed.
///
/// An open confirmation or text input is not interrupted: the notice is held
/// back and shown once that modal closes.
pub fn show_notice(state: &mut UiState, text: String) {
    match &mut state.mode {
        Mode::Notice(lines) => lines.push(text),
        Mode::Confirm(_) | Mode::TargetInput { .. } | Mode::MessageInput(_) => {
            state.pending_notices.push(text)
        }
        _ => state.mode = Mode::Notice(vec![text]),
    }
}

fn close_input(state: &mut UiState) {
    state.mode = if state.pending_notices.is_empty() {
        Mode::Normal
    } else {
        Mode::Notice(std::mem::take(&mut state.pending_notices))
    };
}

pub fn draw(
    state: &mut UiState,
    view: Option<&GameView>,
    status: &StatusView<'_>,
) -> Result<()> {
    if let Some(view) = view {
        state.controls = view.controls.clone();
        state.target_idx = clamp_index(state.target_idx, state.controls.targets.len());
        state.item_idx = clamp_index(state.item_idx, state.controls.items.len());
    }
    if let Some(mut term) = state.terminal.take() {
        let res = term.draw(|f| ui(f, state, view, status)).map(|_| ());
        state.terminal = Some(term);
        res?;
    }
    Ok(())
}

fn clamp_index(idx: usize, len: usize) -> usize {
    idx.min(len.saturating_sub(1))
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let Event::Key(key) = event else {
        return match event {
            Event::Resize(..) => Some(UserEvent::Redraw),
            _ => None,
        };
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(UserEvent::Quit);
    }
    if state.mode == Mode::Normal {
        return interpret_normal(state, key);
    }
    match &mut state.mode {
        Mode::Normal => None,
        Mode::Confirm(command) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                let command = command.clone();
                close_input(state);
                Some(UserEvent::Admin(command))
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                info!(?command, "confirmation declined");
                close_input(state);
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::TargetInput { item_name, input } => match key.code {
            KeyCode::Esc => {
                close_input(state);
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let action = resolve_target(item_name, Some(input.as_str()));
                if action.is_none() {
                    info!(item = %item_name, answer = %input, "no target given; item not used");
                }
                close_input(state);
                Some(action.map_or(UserEvent::Redraw, UserEvent::Send))
            }
            KeyCode::Backspace => {
                input.pop();
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(c) => {
                input.push(c);
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::MessageInput(input) => match key.code {
            KeyCode::Esc => {
                close_input(state);
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let message = std::mem::take(input);
                close_input(state);
                if message.is_empty() {
                    Some(UserEvent::Redraw)
                } else {
                    Some(UserEvent::Admin(AdminCommand::Message(message)))
                }
            }
            KeyCode::Backspace => {
                input.pop();
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(c) => {
                input.push(c);
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::Notice(_) => {
            state.mode = Mode::Normal;
            Some(UserEvent::Redraw)
        }
        Mode::QuitModal => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
    }
}

fn interpret_normal(state: &mut UiState, key: KeyEvent) -> Option<UserEvent> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            Some(UserEvent::Redraw)
        }
        KeyCode::Tab | KeyCode::BackTab => {
            state.focus = match state.focus {
                Focus::Targets => Focus::Items,
                Focus::Items => Focus::Targets,
            };
            Some(UserEvent::Redraw)
        }
        KeyCode::Right | KeyCode::Char('l') => {
            match state.focus {
                Focus::Targets => {
                    let len = state.controls.targets.len();
                    state.target_idx = clamp_index(state.target_idx + 1, len);
                }
                Focus::Items => {
                    let len = state.controls.items.len();
                    state.item_idx = clamp_index(state.item_idx + 1, len);
                }
            }
            Some(UserEvent::Redraw)
        }
        KeyCode::Left | KeyCode::Char('h') => {
            match state.focus {
                Focus::Targets => state.target_idx = state.target_idx.saturating_sub(1),
                Focus::Items => state.item_idx = state.item_idx.saturating_sub(1),
            }
            Some(UserEvent::Redraw)
        }
        KeyCode::Enter | KeyCode::Char(' ') => match state.focus {
            Focus::Targets => state
                .controls
                .targets
                .get(state.target_idx)
                .map(|target| UserEvent::Send(target.activate())),
            Focus::Items => {
                let control = state.controls.items.get(state.item_idx)?;
                match control.activate() {
                    Intent::Send(action) => Some(UserEvent::Send(action)),
                    Intent::NeedsTarget { item_name } => {
                        state.mode = Mode::TargetInput {
                            item_name,
                            input: String::new(),
                        };
                        Some(UserEvent::Redraw)
                    }
                }
            }
        },
        KeyCode::Char('m') => {
            state.mode = Mode::MessageInput(String::new());
            Some(UserEvent::Redraw)
        }
        KeyCode::Char('g') => Some(UserEvent::Refresh),
        KeyCode::Char('x') => Some(gate(state, AdminCommand::Terminate)),
        KeyCode::Char('r') => Some(gate(state, AdminCommand::Reset)),
        KeyCode::Char('u') => Some(gate(state, AdminCommand::Undo)),
        _ => None,
    }
}

fn gate(state: &mut UiState, command: AdminCommand) -> UserEvent {
    if command.confirmation_prompt().is_some() {
        state.mode = Mode::Confirm(command);
        UserEvent::Redraw
    } else {
        UserEvent::Admin(command)
    }
}

fn ui(f: &mut Frame, state: &UiState, view: Option<&GameView>, status: &StatusView<'_>) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header + shotgun
            Constraint::Min(8),    // players + log
            Constraint::Length(3), // turn
            Constraint::Length(3), // shoot targets
            Constraint::Length(3), // items
            Constraint::Length(3), // status + help
        ])
        .split(f.area());

    match view {
        Some(view) => {
            draw_top(f, chunks[0], view, status);
            draw_middle(f, chunks[1], view);
            draw_turn(f, chunks[2], view);
            draw_targets(f, chunks[3], state);
            draw_items(f, chunks[4], state);
        }
        None => {
            let waiting = Paragraph::new(format!(
                "Connecting to session {} at {}...",
                status.session, status.server
            ))
            .block(Block::default().borders(Borders::ALL).title("Roulette"));
            f.render_widget(waiting, chunks[1]);
        }
    }
    draw_bottom(f, chunks[5], status);
    draw_modals(f, state);
}

fn draw_top(f: &mut Frame, area: Rect, view: &GameView, status: &StatusView<'_>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let mut header = vec![Span::raw(format!(
        "Session: {} | Round: {}",
        status.session, view.header.round
    ))];
    if view.header.terminated {
        header.push(Span::raw(" "));
        header.push(Span::styled(
            "TERMINATED",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    let header = Paragraph::new(Line::from(header))
        .block(Block::default().borders(Borders::ALL).title("Game"));
    f.render_widget(header, cols[0]);

    let status_style = if view.shotgun.emphasized {
        Style::default()
            .fg(Color::Rgb(0xff, 0x33, 0x33))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Rgb(0xe0, 0xe0, 0xe0))
    };
    let shotgun = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Live: {}", view.shotgun.live_shells),
            Style::default().fg(Color::Red),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Blank: {}", view.shotgun.blank_shells),
            Style::default().fg(Color::Blue),
        ),
        Span::raw(" | "),
        Span::styled(view.shotgun.status, status_style),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Shotgun"));
    f.render_widget(shotgun, cols[1]);
}

fn draw_middle(f: &mut Frame, area: Rect, view: &GameView) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut lines = Vec::new();
    if view.roster.is_empty() {
        lines.push(Line::styled("No players", Style::default().fg(Color::DarkGray)));
    }
    for card in &view.roster {
        lines.extend(player_lines(card));
    }
    let roster = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Players"));
    f.render_widget(roster, cols[0]);

    let block = Block::default().borders(Borders::ALL).title("Log");
    let inner = block.inner(cols[1]);
    let lines: Vec<Line> = view
        .log
        .lines
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("[{}]", entry.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::raw(entry.message.as_str()),
            ])
        })
        .collect();
    let offset = if view.log.follow_newest {
        bottom_scroll_offset(lines.len(), inner.height)
    } else {
        0
    };
    let log = Paragraph::new(lines).block(block).scroll((offset, 0));
    f.render_widget(log, cols[1]);
}

fn player_lines(card: &PlayerCard) -> Vec<Line<'static>> {
    let mut name_style = Style::default().add_modifier(Modifier::BOLD);
    if card.active {
        name_style = name_style.fg(Color::Yellow);
    }
    if card.dead {
        name_style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    let marker = if card.active {
        " (TURN)"
    } else if card.dead {
        " (DEAD)"
    } else {
        ""
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{}{}", card.name, marker), name_style),
        Span::raw("  "),
        Span::styled(card.lives.clone(), Style::default().fg(Color::Yellow)),
    ])];

    let items = match &card.items {
        ItemTags::Empty => Line::styled(
            format!("  {NO_ITEMS_PLACEHOLDER}"),
            Style::default().fg(Color::DarkGray),
        ),
        ItemTags::Tags(tags) => {
            let mut spans = vec![Span::raw("  ")];
            for tag in tags {
                spans.push(Span::styled(
                    format!("[{tag}]"),
                    Style::default().fg(Color::Cyan),
                ));
                spans.push(Span::raw(" "));
            }
            Line::from(spans)
        }
    };
    lines.push(items);
    if card.restrained {
        lines.push(Line::styled(
            format!("  {RESTRAINED_MARKER}"),
            Style::default().fg(Color::Rgb(0xff, 0xa5, 0x00)),
        ));
    }
    lines
}

/// Scroll offset that puts the last of `total` lines on the bottom row.
fn bottom_scroll_offset(total: usize, visible: u16) -> u16 {
    let hidden = total.saturating_sub(usize::from(visible));
    u16::try_from(hidden).unwrap_or(u16::MAX)
}

fn draw_turn(f: &mut Frame, area: Rect, view: &GameView) {
    let turn = Paragraph::new(view.turn.as_str())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Turn"));
    f.render_widget(turn, area);
}

fn draw_targets(f: &mut Frame, area: Rect, state: &UiState) {
    let labels: Vec<String> = state
        .controls
        .targets
        .iter()
        .map(|t| t.label.to_string())
        .collect();
    let focused = state.focus == Focus::Targets;
    draw_button_row(f, area, "Shoot", &labels, state.target_idx, focused);
}

fn draw_items(f: &mut Frame, area: Rect, state: &UiState) {
    let labels: Vec<String> = state
        .controls
        .items
        .iter()
        .map(|i| i.name.clone())
        .collect();
    let focused = state.focus == Focus::Items;
    draw_button_row(f, area, "Items", &labels, state.item_idx, focused);
}

fn draw_button_row(
    f: &mut Frame,
    area: Rect,
    title: &str,
    labels: &[String],
    selected: usize,
    focused: bool,
) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title.to_string());
    let inner = block.inner(area);
    let line = if labels.is_empty() {
        Line::styled("None", Style::default().fg(Color::DarkGray))
    } else {
        let buttons: Vec<String> = labels.iter().map(|l| format!(" {l} ")).collect();
        let widths: Vec<usize> = buttons.iter().map(|b| b.width() + 1).collect();
        let (start, end) = button_window(&widths, selected, usize::from(inner.width));
        let mut spans = Vec::new();
        for (idx, button) in buttons.iter().enumerate().take(end).skip(start) {
            let style = if idx == selected && focused {
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };
            spans.push(Span::styled(button.clone(), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    };
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(line), inner);
}

/// Range of buttons to show so that `selected` stays on screen.
fn button_window(widths: &[usize], selected: usize, available: usize) -> (usize, usize) {
    let mut start = 0;
    let fits = |start: usize, end: usize| widths[start..end].iter().sum::<usize>() <= available;
    let selected = selected.min(widths.len().saturating_sub(1));
    while start < selected && !fits(start, selected + 1) {
        start += 1;
    }
    let mut end = selected + 1;
    while end < widths.len() && fits(start, end + 1) {
        end += 1;
    }
    (start, end.min(widths.len()))
}

fn draw_bottom(f: &mut Frame, area: Rect, status: &StatusView<'_>) {
    let synced = match status.last_sync {
        Some(at) => format!("Last sync {at}"),
        None => "Not synced yet".to_string(),
    };
    let help = Paragraph::new(format!(
        "{synced} | Tab focus | ←/→ select | Enter activate | m message | g refresh | u undo | r reset | x terminate | q quit"
    ))
    .style(Style::default().fg(Color::Green))
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    let (title, lines, style) = match &state.mode {
        Mode::Normal => return,
        Mode::Confirm(command) => (
            "Confirm",
            vec![
                command.confirmation_prompt().unwrap_or_default().to_string(),
                String::new(),
                "y/Enter=confirm n/Esc=cancel".to_string(),
            ],
            Style::default().fg(Color::Red),
        ),
        Mode::TargetInput { input, .. } => (
            "Handcuffs",
            vec![
                TARGET_PROMPT.to_string(),
                format!("> {input}"),
                "Enter=confirm Esc=cancel".to_string(),
            ],
            Style::default(),
        ),
        Mode::MessageInput(input) => (
            "Admin Message",
            vec![format!("> {input}"), "Enter=send Esc=cancel".to_string()],
            Style::default(),
        ),
        Mode::Notice(notices) => {
            let mut lines = notices.clone();
            lines.push(String::new());
            lines.push("Press any key".to_string());
            ("Notice", lines, Style::default().fg(Color::Yellow))
        }
        Mode::QuitModal => (
            "Quit",
            vec!["Leave the control panel? (y/n)".to_string()],
            Style::default(),
        ),
    };
    let area = centered_rect(60, 30, f.area());
    let block = Block::default().borders(Borders::ALL).title(title);
    let p = Paragraph::new(lines.into_iter().map(Line::from).collect::<Vec<_>>())
        .style(style)
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(block.clone(), area);
    f.render_widget(p, block.inner(area));
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}
