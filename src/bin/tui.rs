mod tui_app;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use serde_json::json;
use tui_app::{
    grade_label, next_grade, order_label, price_label, slide_label, truncate, AppState,
    ConnectionStatus, InputMode,
};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url);

    // Initial fetch before rendering
    app.refresh(&client).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut card_table_state = TableState::default();
    card_table_state.select(if app.page.cards.is_empty() { None } else { Some(0) });

    let result = run_loop(&mut terminal, &mut app, &client, &mut card_table_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    card_state: &mut TableState,
) -> io::Result<()> {
    // Carousels auto-advance every 7s; poll often enough to see it.
    let refresh_interval = Duration::from_secs(1);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app, card_state))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if let InputMode::Search(buf) = &mut app.mode {
                    match key.code {
                        KeyCode::Enter => {
                            let query = std::mem::take(buf);
                            app.mode = InputMode::Normal;
                            app.search(client, &query).await;
                        }
                        KeyCode::Esc => app.mode = InputMode::Normal,
                        KeyCode::Backspace => {
                            buf.pop();
                        }
                        KeyCode::Char(c) => buf.push(c),
                        _ => {}
                    }
                    continue;
                }

                let selected = app.card(card_state.selected()).map(|c| c.id.clone());
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        app.refresh(client).await;
                        last_tick = std::time::Instant::now();
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        let max = app.page.cards.len().saturating_sub(1);
                        let next = card_state.selected().map_or(0, |i| (i + 1).min(max));
                        card_state.select(Some(next));
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        let prev = card_state.selected().map_or(0, |i| i.saturating_sub(1));
                        card_state.select(Some(prev));
                    }
                    KeyCode::Char('g') => {
                        let grade = app
                            .card(card_state.selected())
                            .and_then(|c| c.grade_select.as_ref())
                            .and_then(next_grade);
                        if let (Some(id), Some(grade)) = (selected, grade) {
                            app.post(client, &format!("/cards/{id}/grade"), Some(json!({ "grade": grade })))
                                .await;
                        }
                    }
                    KeyCode::Char('n') | KeyCode::Right => {
                        if let Some(id) = selected {
                            app.post(client, &format!("/cards/{id}/carousel"), Some(json!({ "action": "next" })))
                                .await;
                        }
                    }
                    KeyCode::Char('p') | KeyCode::Left => {
                        if let Some(id) = selected {
                            app.post(client, &format!("/cards/{id}/carousel"), Some(json!({ "action": "prev" })))
                                .await;
                        }
                    }
                    KeyCode::Char('x') => app.post(client, "/banner/dismiss", None).await,
                    KeyCode::Char('u') => app.post(client, "/banner/restore", None).await,
                    KeyCode::Char('m') => app.post(client, "/nav/toggle", None).await,
                    KeyCode::Char('/') => {
                        app.mode = InputMode::Search(app.page.query.clone().unwrap_or_default());
                    }
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, card_state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | body | notice | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // notice / last error
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_cards_table(f, app, card_state, chunks[1]);
    render_notice(f, app, chunks[2]);
    render_footer(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let prices = &app.page.prices;
    let (prices_text, prices_color) = match prices.state.as_str() {
        "loaded" => (format!("prices: {} products", prices.products.unwrap_or(0)), Color::Green),
        "unavailable" => ("prices unavailable".to_string(), Color::Red),
        _ => ("prices loading".to_string(), Color::Yellow),
    };

    let banner_text = match &app.page.banner {
        Some(b) if b.state == "visible" => "banner shown".to_string(),
        Some(b) if b.restore_button.is_some() => "banner hidden ⟲".to_string(),
        Some(_) => "banner hidden".to_string(),
        None => "no banner".to_string(),
    };
    let nav_text = match &app.page.nav {
        Some(n) if n.open => format!("menu open ({} links)", n.link_count),
        Some(_) => "menu closed".to_string(),
        None => "no menu".to_string(),
    };

    let title_spans = vec![
        Span::styled(
            " Storefront  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(prices_text, Style::default().fg(prices_color)),
        Span::raw("  │  "),
        Span::styled(banner_text, Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(nav_text, Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(format!("lang={}", app.page.lang), Style::default().fg(Color::DarkGray)),
    ];

    let paragraph = Paragraph::new(Line::from(title_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(paragraph, area);
}

fn render_cards_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let header_cells = ["#", "Product", "Price", "Order", "Grade", "Slide", "Weight"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .page
        .cards
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let title = c.title.as_deref().unwrap_or(&c.id);
            let price_color = match &c.price {
                Some(p) if p.unavailable => Color::Red,
                Some(p) if p.skeleton => Color::DarkGray,
                _ => Color::White,
            };
            let order = order_label(c);
            let order_color = match order {
                "order" => Color::Green,
                "pick grade" => Color::Yellow,
                _ => Color::DarkGray,
            };
            let row_style = if c.visible {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
            };

            Row::new(vec![
                Cell::from(format!("{}", i + 1)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(title, 28)),
                Cell::from(price_label(c)).style(Style::default().fg(price_color)),
                Cell::from(order).style(Style::default().fg(order_color)),
                Cell::from(truncate(&grade_label(c), 14)),
                Cell::from(slide_label(c)).style(Style::default().fg(Color::Cyan)),
                Cell::from(truncate(c.weight_label.as_deref().unwrap_or("—"), 16)),
            ])
            .style(row_style)
        })
        .collect();

    let title = match &app.page.query {
        Some(q) => format!(" PRODUCTS · search \"{}\" ", truncate(q, 24)),
        None => " PRODUCTS ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(24),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                title,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(table, area, state);
}

fn render_notice(f: &mut Frame, app: &AppState, area: Rect) {
    let line = match (&app.last_error, &app.page.notice) {
        (Some(err), _) => Line::from(Span::styled(format!(" {err}"), Style::default().fg(Color::Red))),
        (None, Some(notice)) => Line::from(Span::styled(format!(" {notice}"), Style::default().fg(Color::Yellow))),
        (None, None) => Line::default(),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let line = match &app.mode {
        InputMode::Search(buf) => Line::from(vec![
            Span::styled(" search: ", Style::default().fg(Color::Yellow)),
            Span::raw(buf.clone()),
            Span::styled("▏  [enter] apply  [esc] cancel", Style::default().fg(Color::DarkGray)),
        ]),
        InputMode::Normal => Line::from(vec![
            Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
            Span::raw("quit  "),
            Span::styled("[r] ", Style::default().fg(Color::Yellow)),
            Span::raw("refresh  "),
            Span::styled("[j k] ", Style::default().fg(Color::Yellow)),
            Span::raw("select  "),
            Span::styled("[g] ", Style::default().fg(Color::Yellow)),
            Span::raw("grade  "),
            Span::styled("[n p] ", Style::default().fg(Color::Yellow)),
            Span::raw("slide  "),
            Span::styled("[x u] ", Style::default().fg(Color::Yellow)),
            Span::raw("banner  "),
            Span::styled("[m] ", Style::default().fg(Color::Yellow)),
            Span::raw("menu  "),
            Span::styled("[/] ", Style::default().fg(Color::Yellow)),
            Span::raw("search"),
        ]),
    };
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
