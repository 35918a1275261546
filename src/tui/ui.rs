//! Stateless UI rendering for the three screens.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use sambung_rules::{Mode, Phase, Theme};

use super::app::App;

/// Renders whichever screen matches the session phase.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(10),   // Body
            Constraint::Length(3), // Help
        ])
        .split(area);

    let title = Paragraph::new("Sambung Kata")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, chunks[0]);

    let help = match app.snapshot().phase() {
        Phase::Menu => "←/→ tema   ↑/↓ mode   Enter mulai   q keluar",
        Phase::Active => "Enter kirim   Backspace hapus   Esc menu",
        Phase::GameOver => "Enter Main Lagi   m Kembali ke Menu   q keluar",
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[2]);

    match app.snapshot().phase() {
        Phase::Menu => draw_menu(frame, chunks[1], app),
        Phase::Active => draw_game(frame, chunks[1], app),
        Phase::GameOver => draw_game_over(frame, chunks[1], app),
    }
}

fn draw_menu(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let themes: Vec<ListItem> = Theme::all()
        .into_iter()
        .map(|theme| selectable(theme.to_string(), theme == *app.theme()))
        .collect();
    frame.render_widget(
        List::new(themes).block(Block::default().title(" Pilih Tema ").borders(Borders::ALL)),
        columns[0],
    );

    let modes: Vec<ListItem> = [Mode::VersusMachine, Mode::LocalTwoPlayer]
        .into_iter()
        .map(|mode| selectable(mode.to_string(), mode == *app.mode()))
        .collect();
    frame.render_widget(
        List::new(modes).block(Block::default().title(" Mode ").borders(Borders::ALL)),
        columns[1],
    );
}

fn selectable(label: String, selected: bool) -> ListItem<'static> {
    if selected {
        ListItem::new(format!("> {}", label)).style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ListItem::new(format!("  {}", label))
    }
}

fn draw_game(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.snapshot();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Turn, clock, streak
            Constraint::Min(4),    // History
            Constraint::Length(1), // Notice
            Constraint::Length(3), // Input
        ])
        .split(area);

    let remaining = state.remaining_secs();
    let clock_style = if state.clock().is_urgent() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let header = Line::from(vec![
        Span::styled(
            app.turn_label(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(format!("{}s", remaining), clock_style),
        Span::raw(format!("   Streak: {}   Tema: {}", state.streak(), state.theme())),
    ]);
    frame.render_widget(
        Paragraph::new(header)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        rows[0],
    );

    let words: Vec<ListItem> = state
        .history()
        .iter()
        .rev()
        .map(|record| {
            let color = if record.author().is_machine() {
                Color::Magenta
            } else {
                Color::White
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<9}", record.author().to_string()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(record.word().clone(), Style::default().fg(color)),
            ]))
        })
        .collect();
    let history_title = match state.required_letter() {
        Some(letter) => format!(" Kata berikutnya dimulai huruf '{}' ", letter.to_uppercase()),
        None => " Mulai dengan kata apa saja ".to_string(),
    };
    frame.render_widget(
        List::new(words).block(Block::default().title(history_title).borders(Borders::ALL)),
        rows[1],
    );

    let notice = match (app.waiting_label(), state.notice()) {
        (Some(waiting), _) => Span::styled(waiting, Style::default().fg(Color::Yellow)),
        (None, Some(notice)) if notice.is_rejection() => {
            Span::styled(notice.to_string(), Style::default().fg(Color::Red))
        }
        (None, Some(notice)) => Span::styled(notice.to_string(), Style::default().fg(Color::Green)),
        (None, None) => Span::raw(""),
    };
    frame.render_widget(
        Paragraph::new(Line::from(notice))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[2],
    );

    let input_style = if app.accepts_input() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(format!("{}_", app.input()))
            .style(input_style)
            .block(Block::default().title(" Kata ").borders(Borders::ALL)),
        rows[3],
    );
}

fn draw_game_over(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.snapshot();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            app.winner_label(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(app.reason_label()),
        Line::from(""),
        Line::from(format!("Total Streak: {}", state.streak())),
        Line::from(match state.last_word() {
            Some(word) => format!("Kata terakhir: {}", word),
            None => String::new(),
        }),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title(" Permainan Selesai ").borders(Borders::ALL)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use sambung_rules::{GameSession, SessionEvent};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).expect("terminal");
        terminal.draw(|f| draw(f, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_menu_lists_themes() {
        let app = App::new(None, Theme::Animals, GameSession::default().state().clone());
        let screen = render(&app);
        assert!(screen.contains("Pilih Tema"));
        assert!(screen.contains("> Hewan"));
        assert!(screen.contains("AI Challenger"));
    }

    #[test]
    fn test_game_screen_shows_clock_and_turn() {
        let step = GameSession::default().apply(SessionEvent::StartGame {
            mode: Mode::VersusMachine,
            theme: Theme::Any,
        });
        let app = App::new(None, Theme::Any, step.session.state().clone());
        let screen = render(&app);
        assert!(screen.contains("Giliran Kamu"));
        assert!(screen.contains("30s"));
    }
}
