use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph},
};
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, WhichUse};

use crate::app::App;
use crate::clock::Clock;
use crate::model::{AccountStatus, AppScreen, FieldId};
use crate::otp::format_code;
use crate::presentation::RenderState;

/// Draw router
pub fn draw_ui<C: Clock>(f: &mut Frame<'_>, app: &mut App<C>) {
    match app.screen {
        AppScreen::Loading => draw_loading_screen(f, app),
        AppScreen::Accounts => draw_accounts_screen(f, app),
        AppScreen::Detail => {
            draw_accounts_screen(f, app);
            let note = app.selected_account().and_then(|a| a.description.clone());
            if let Some(state) = app.presentation.render_state() {
                draw_detail_modal(f, &state, note.as_deref());
            }
        }
    }
}

fn draw_loading_screen<C: Clock>(f: &mut Frame<'_>, app: &mut App<C>) {
    let area = f.area();
    let block = Block::default()
        .borders(Borders::ALL)
        .title("ShareKey")
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.loading {
        let throbber = Throbber::default()
            .label(" Loading accounts...")
            .style(Style::default().fg(Color::Yellow))
            .throbber_set(BRAILLE_SIX)
            .use_type(WhichUse::Spin);
        let spinner_area = Rect {
            x: inner.x + 2,
            y: inner.y + inner.height / 2,
            width: inner.width.saturating_sub(4).min(28),
            height: 1,
        };
        f.render_stateful_widget(throbber, spinner_area, &mut app.throbber_state);
    } else if let Some(msg) = &app.message {
        let p = Paragraph::new(msg.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red));
        f.render_widget(p, inner);
    }
}

fn status_style(status: AccountStatus) -> Style {
    match status {
        AccountStatus::Working => Style::default().fg(Color::Green),
        AccountStatus::Busy => Style::default().fg(Color::Yellow),
        AccountStatus::Dead => Style::default().fg(Color::Red),
    }
}

fn draw_accounts_screen<C: Clock>(f: &mut Frame<'_>, app: &mut App<C>) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .split(area);

    let header = Paragraph::new("🔑 ShareKey | [q: quit] [↑/↓: move] [Enter: open]")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title("Header"));
    f.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = if app.accounts.is_empty() {
        vec![ListItem::new("No accounts...")]
    } else {
        app.accounts
            .iter()
            .map(|a| {
                let mut spans = vec![
                    Span::styled(
                        format!("{:<8}", a.kind.to_string()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(" "),
                    Span::styled(format!("{:<8}", a.status.to_string()), status_style(a.status)),
                    Span::raw(" "),
                    Span::raw(a.display_name().to_string()),
                ];
                if a.can_show_code() {
                    spans.push(Span::styled(" [2FA]", Style::default().fg(Color::Blue)));
                }
                spans.push(Span::styled(
                    format!("  ({})", a.last_updated),
                    Style::default().fg(Color::DarkGray),
                ));
                if !a.tags.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", a.tags.join(", ")),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Accounts"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_stateful_widget(list, chunks[1], &mut app.list_state);

    let footer = Paragraph::new(app.message.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title("Message"));
    f.render_widget(footer, chunks[2]);
}

fn copy_marker(state: &RenderState, field: FieldId) -> Span<'static> {
    if state.is_acknowledged(field) {
        Span::styled(" ✓ Copied", Style::default().fg(Color::Green))
    } else {
        Span::raw("")
    }
}

fn draw_detail_modal(f: &mut Frame<'_>, state: &RenderState, note: Option<&str>) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Account")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Length(3), // Code
            Constraint::Length(3), // Countdown
            Constraint::Min(1),    // Help text
        ])
        .split(inner);

    let email = Paragraph::new(Line::from(vec![
        Span::raw(state.label.clone()),
        copy_marker(state, FieldId::Email),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Email"));
    f.render_widget(email, chunks[0]);

    let password_text = state
        .password_display
        .clone()
        .unwrap_or_else(|| "(none)".to_string());
    let password_title = if state.visible { "Password (shown)" } else { "Password" };
    let password = Paragraph::new(Line::from(vec![
        Span::raw(password_text),
        copy_marker(state, FieldId::Password),
    ]))
    .block(Block::default().borders(Borders::ALL).title(password_title));
    f.render_widget(password, chunks[1]);

    match &state.code {
        Some(code) => {
            let code_line = Paragraph::new(Line::from(vec![
                Span::styled(
                    format_code(code),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                copy_marker(state, FieldId::Code),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("2FA code"));
            f.render_widget(code_line, chunks[2]);

            let color = if state.urgent { Color::Red } else { Color::Blue };
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("Refreshes in"))
                .gauge_style(Style::default().fg(color))
                .ratio(state.progress.clamp(0.0, 1.0))
                .label(format!("{}s", state.remaining_secs));
            f.render_widget(gauge, chunks[3]);
        }
        None => {
            let none = Paragraph::new("No verification code for this account")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("2FA code"));
            f.render_widget(none, chunks[2]);
        }
    }

    let help_text = "e: copy email | p: copy password | c: copy code | v: show/hide | Esc: close";
    let mut lines = vec![Line::from(help_text)];
    if let Some(note) = note {
        lines.insert(
            0,
            Line::styled(note.to_string(), Style::default().add_modifier(Modifier::ITALIC)),
        );
    }
    let p_help = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(p_help, chunks[4]);
}

/// Helper to center a rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::demo_accounts;
    use crate::clipboard::fake::FakeClipboard;
    use crate::clock::ManualClock;
    use crossterm::event::KeyCode;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_detail_modal_renders_code_and_ack() {
        // window 1000, 20 seconds left
        let clock = ManualClock::at_unix(30 * 1000 + 10);
        let mut app = App::new(clock, Box::new(FakeClipboard::default()));
        app.accounts_loaded(demo_accounts().unwrap());
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('c'));

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| draw_ui(f, &mut app)).unwrap();
        let text = screen_text(&terminal);

        let code = crate::otp::derive_code("JBSWY3DPEHPK3PXP", 1000);
        assert!(text.contains(&format_code(&code)));
        assert!(text.contains("20s"));
        assert!(text.contains("✓ Copied"));
        assert!(!text.contains("Password123!"));
    }

    #[test]
    fn test_accounts_header_lists_keys() {
        let clock = ManualClock::at_unix(30 * 1000);
        let mut app = App::new(clock, Box::new(FakeClipboard::default()));
        app.accounts_loaded(demo_accounts().unwrap());

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| draw_ui(f, &mut app)).unwrap();
        let text = screen_text(&terminal);

        assert!(text.contains("ShareKey | [q: quit]"));
        assert!(!text.contains('—'));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 40, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
    }
}
