//! TUI views and rendering

use chrono::{DateTime, TimeDelta, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap};

use super::state::{AppState, FEATURES, InteractionMode, SortColumn, View};
use crate::explorer::FetchStatus;
use crate::sorter::{Category, Item};

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Cyan;
    pub const ACTIVE_TAB: Color = Color::Yellow;
    pub const KEY: Color = Color::Cyan;
    pub const DIM: Color = Color::DarkGray;
    pub const SELECTED_BG: Color = Color::DarkGray;
    pub const FOCUS_BORDER: Color = Color::Yellow;
    pub const FRUIT: Color = Color::Red;
    pub const VEGETABLE: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const LOADING: Color = Color::Yellow;
}

const BAR_WIDTH: usize = 10;

/// Main render function
pub fn render(state: &AppState, frame: &mut Frame, now: DateTime<Utc>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);

    match state.current_view {
        View::Home => render_home(state, frame, chunks[1]),
        View::Sorter => render_sorter(state, frame, chunks[1], now),
        View::Explorer => render_explorer(state, frame, chunks[1]),
    }

    render_footer(state, frame, chunks[2]);

    if state.interaction_mode == InteractionMode::Help {
        render_help_overlay(frame, chunks[1]);
    }
}

fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        "demodeck ",
        Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
    )];
    for view in View::ALL {
        spans.push(Span::raw("│ "));
        let style = if view == state.current_view {
            Style::default().fg(colors::ACTIVE_TAB).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::DIM)
        };
        spans.push(Span::styled(view.display_name(), style));
        spans.push(Span::raw(" "));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_home(state: &AppState, frame: &mut Frame, area: Rect) {
    let constraints: Vec<Constraint> = FEATURES
        .iter()
        .map(|_| Constraint::Length(5))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, feature) in FEATURES.iter().enumerate() {
        let selected = i == state.home_selection.selected_index;
        let border = if selected {
            Style::default().fg(colors::FOCUS_BORDER)
        } else {
            Style::default()
        };
        let card = Paragraph::new(vec![
            Line::from(Span::styled(feature.title, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(feature.description, Style::default().fg(colors::DIM))),
        ])
        .block(Block::default().borders(Borders::ALL).border_style(border))
        .wrap(Wrap { trim: true });
        frame.render_widget(card, rows[i]);
    }
}

fn render_sorter(state: &AppState, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let window = state.board.window();
    for (column, area) in SortColumn::ALL.into_iter().zip(columns.iter()) {
        let focused = column == state.sort_focus;
        let selected = state.column_selection(column).selected_index;
        let items: Vec<ListItem> = state
            .column_items(column)
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let line = match column {
                    SortColumn::Pool => pool_line(item),
                    SortColumn::Category(_) => category_line(item, now, window),
                };
                if focused && i == selected {
                    ListItem::new(line).style(Style::default().bg(colors::SELECTED_BG))
                } else {
                    ListItem::new(line)
                }
            })
            .collect();

        let title = match column {
            SortColumn::Pool => format!(" Items ({}) ", state.board.pool().len()),
            SortColumn::Category(category) => {
                format!(" {} ({}) ", category.label(), state.board.list(category).len())
            }
        };
        let border = if focused {
            Style::default().fg(colors::FOCUS_BORDER)
        } else {
            Style::default()
        };
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title).border_style(border));
        frame.render_widget(list, *area);
    }
}

fn category_color(category: Category) -> ratatui::style::Color {
    match category {
        Category::Fruit => colors::FRUIT,
        Category::Vegetable => colors::VEGETABLE,
    }
}

fn pool_line(item: &Item) -> Line<'static> {
    Line::from(vec![
        Span::styled("● ", Style::default().fg(category_color(item.kind))),
        Span::raw(item.name.clone()),
    ])
}

fn category_line(item: &Item, now: DateTime<Utc>, window: TimeDelta) -> Line<'static> {
    let remaining = item.remaining_time(now);
    Line::from(vec![
        Span::raw(format!("{:<12} ", item.name)),
        Span::styled(progress_bar(remaining, window), Style::default().fg(colors::DIM)),
        Span::raw(format!(" {}", format_remaining(remaining))),
    ])
}

/// Seconds with one decimal, e.g. "3.2s"
pub fn format_remaining(remaining: TimeDelta) -> String {
    let secs = remaining.num_milliseconds().max(0) as f64 / 1000.0;
    format!("{:.1}s", secs)
}

/// Fixed-width bar showing the fraction of the window still left
pub fn progress_bar(remaining: TimeDelta, window: TimeDelta) -> String {
    let total = window.num_milliseconds();
    let filled = if total <= 0 {
        0
    } else {
        let ratio = remaining.num_milliseconds().clamp(0, total) as f64 / total as f64;
        (ratio * BAR_WIDTH as f64).round() as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn render_explorer(state: &AppState, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(0),    // Table
            Constraint::Length(1), // Status
        ])
        .split(area);

    let explorer = &state.explorer;
    let searching = state.interaction_mode == InteractionMode::Search;
    let search_style = if searching {
        Style::default().fg(colors::FOCUS_BORDER)
    } else {
        Style::default()
    };
    let mut search_text = explorer.search().to_string();
    if searching {
        search_text.push('_');
    }
    let search = Paragraph::new(search_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search (/) ")
            .border_style(search_style),
    );
    frame.render_widget(search, chunks[0]);

    let users = explorer.filtered_users();
    if users.is_empty() {
        let message = match explorer.status() {
            FetchStatus::Idle | FetchStatus::Loading => "Loading...",
            _ if explorer.users().is_empty() => "No users",
            _ => "No users match the search",
        };
        let empty = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Users "));
        frame.render_widget(empty, chunks[1]);
    } else {
        let header = Row::new(["ID", "Name", "Email", "Username", "Age", "Company"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = users
            .iter()
            .enumerate()
            .map(|(i, user)| {
                let company = user.company.as_ref().map(|c| c.name.clone()).unwrap_or_default();
                let row = Row::new(vec![
                    Cell::from(user.id.to_string()),
                    Cell::from(user.full_name()),
                    Cell::from(user.email.clone()),
                    Cell::from(user.username.clone()),
                    Cell::from(user.age.to_string()),
                    Cell::from(company),
                ]);
                if i == state.explorer_selection.selected_index {
                    row.style(Style::default().bg(colors::SELECTED_BG))
                } else {
                    row
                }
            })
            .collect();
        let widths = [
            Constraint::Length(5),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
            Constraint::Percentage(15),
            Constraint::Length(4),
            Constraint::Min(10),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(" Users "));
        frame.render_widget(table, chunks[1]);
    }

    frame.render_widget(Paragraph::new(explorer_status_line(state)), chunks[2]);
}

fn explorer_status_line(state: &AppState) -> Line<'static> {
    let explorer = &state.explorer;
    let page = format!(
        " Page {} of {} │ {} users ",
        explorer.current_page(),
        explorer.total_pages().max(1),
        explorer.total()
    );
    let mut spans = vec![Span::raw(page)];
    match explorer.status() {
        FetchStatus::Loading => {
            spans.push(Span::styled("│ Loading...", Style::default().fg(colors::LOADING)));
        }
        FetchStatus::Failed(message) => {
            spans.push(Span::styled(
                format!("│ {} (press r to retry)", message),
                Style::default().fg(colors::ERROR),
            ));
        }
        FetchStatus::Idle | FetchStatus::Loaded => {}
    }
    Line::from(spans)
}

fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let hints: &[(&str, &str)] = match (state.interaction_mode, state.current_view) {
        (InteractionMode::Search, _) => &[("type", "Filter"), ("Enter", "Apply"), ("Esc", "Clear")],
        (_, View::Home) => &[("q", "Quit"), ("?", "Help"), ("↑↓", "Navigate"), ("Enter", "Open")],
        (_, View::Sorter) => &[
            ("q", "Quit"),
            ("←→", "Column"),
            ("↑↓", "Navigate"),
            ("Enter", "Move"),
            ("Esc", "Home"),
        ],
        (_, View::Explorer) => &[
            ("q", "Quit"),
            ("/", "Search"),
            ("n/p", "Page"),
            ("r", "Reload"),
            ("Esc", "Home"),
        ],
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(
            format!(" {}", key),
            Style::default().fg(colors::KEY).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {} ", label)));
    }
    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn help_line(key: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<11}", key), Style::default().fg(colors::KEY)),
        Span::raw(action),
    ])
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)));
    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
        help_line("q, Ctrl+c", "Quit"),
        help_line("?, F1", "Toggle help"),
        help_line("Esc, b", "Back to home"),
        Line::from(""),
        section("Sorter"),
        help_line("←/→, Tab", "Switch column"),
        help_line("↑/↓, j/k", "Move cursor"),
        help_line("Enter", "Sort item / send it back"),
        Line::from(""),
        section("Explorer"),
        help_line("/", "Search this page"),
        help_line("n, →", "Next page"),
        help_line("p, ←", "Previous page"),
        help_line("r", "Reload / retry"),
    ];

    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: true });
    frame.render_widget(help, popup_area);
}

/// Helper to create a centered rect
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
