use crate::tui::state::{AppState, Screen, OPTION_LABELS};
use crate::tui::theme::*;
use ankiquiz_core::DeckSession;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.size());

    if let Some(n) = &state.notice {
        let p = Paragraph::new(format!(" {n}  (x/Esc dismiss)")).style(notice_style());
        f.render_widget(p, chunks[0]);
    }

    match &state.screen {
        Screen::Blocked { message } => draw_blocked(f, chunks[1], message),
        Screen::DeckList { sel } => draw_decks(f, chunks[1], &state.decks, *sel),
        Screen::Options { deck, sel } => draw_options(f, chunks[1], deck, *sel),
        Screen::ExportPath { deck, input } => draw_export(f, chunks[1], deck, input),
        Screen::Question {
            session,
            cursor,
            checked,
        } => draw_question(f, chunks[1], session, *cursor, checked),
        Screen::Score { session } => draw_score(f, chunks[1], session),
    }

    let foot = Paragraph::new(footer_hint(&state.screen)).style(footer_style());
    f.render_widget(foot, chunks[2]);
}

fn footer_hint(screen: &Screen) -> &'static str {
    match screen {
        Screen::Blocked { .. } => " q quit ",
        Screen::DeckList { .. } => " ↑/k ↓/j select   Enter open   q quit ",
        Screen::Options { .. } => " ↑/k ↓/j select   Enter confirm   Esc back   q quit ",
        Screen::ExportPath { .. } => " type a path   Enter save   Esc cancel ",
        Screen::Question { .. } => " ↑/k ↓/j move   space tick   Enter submit   Esc abandon   q quit ",
        Screen::Score { .. } => " Enter/Esc back to decks   q quit ",
    }
}

fn boxed(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(title, title_style()))
        .borders(Borders::ALL)
}

fn draw_blocked(f: &mut Frame, area: Rect, message: &str) {
    let p = Paragraph::new(message)
        .style(wrong_style())
        .wrap(Wrap { trim: true })
        .block(boxed("AnkiQuiz"));
    f.render_widget(p, area);
}

fn draw_decks(f: &mut Frame, area: Rect, decks: &[String], sel: usize) {
    if decks.is_empty() {
        let p = Paragraph::new("No decks to show.")
            .style(hint_style())
            .block(boxed("Decks"));
        f.render_widget(p, area);
        return;
    }
    let items: Vec<_> = decks
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let item = ListItem::new(d.as_str());
            if i == sel {
                item.style(selected_style())
            } else {
                item
            }
        })
        .collect();
    f.render_widget(List::new(items).block(boxed("Decks")), area);
}

fn draw_options(f: &mut Frame, area: Rect, deck: &str, sel: usize) {
    let items: Vec<_> = OPTION_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let item = ListItem::new(*label);
            if i == sel {
                item.style(selected_style())
            } else {
                item
            }
        })
        .collect();
    f.render_widget(List::new(items).block(boxed(deck)), area);
}

fn draw_export(f: &mut Frame, area: Rect, deck: &str, input: &str) {
    let text = vec![
        Line::from(Span::styled(format!("Export \"{deck}\" to:"), hint_style())),
        Line::from(""),
        Line::from(format!("{input}_")),
    ];
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(boxed("Save as"));
    f.render_widget(p, area);
}

fn draw_question(f: &mut Frame, area: Rect, session: &DeckSession, cursor: usize, checked: &[bool]) {
    let header = format!("{}/{} Question:", session.position() + 1, session.len());
    let mut lines: Vec<Line> = session.question().lines().map(Line::from).collect();
    for (i, _) in session.images().iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("[image {}]", i + 1),
            hint_style(),
        )));
    }
    lines.push(Line::from(""));
    for (i, answer) in session.answers().iter().enumerate() {
        let mark = if checked.get(i).copied().unwrap_or(false) { "[x]" } else { "[ ]" };
        let text = format!("{mark} {}", answer.replace('\n', " "));
        lines.push(if i == cursor {
            Line::styled(text, selected_style())
        } else {
            Line::from(text)
        });
    }
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(boxed(&header));
    f.render_widget(p, area);
}

fn draw_score(f: &mut Frame, area: Rect, session: &DeckSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let label = format!(
        "Score: {}/{} ({}%)",
        session.score(),
        session.max_score(),
        session.percentage()
    );
    let gauge = Gauge::default()
        .block(boxed(session.name()))
        .gauge_style(gauge_style())
        .ratio((session.percentage() / 100.0).clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, chunks[0]);

    let items: Vec<_> = session
        .wrong_questions()
        .iter()
        .enumerate()
        .map(|(i, q)| ListItem::new(format!("{} {}", i + 1, q.replace('\n', " "))))
        .collect();
    let list = List::new(items)
        .style(wrong_style())
        .block(boxed("Wrong answers:"));
    f.render_widget(list, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::inputs::Action;
    use ankiquiz_core::{Collection, MemoryCollection};
    use ankiquiz_docx::ExportOptions;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn screen_text(state: &AppState) -> String {
        let mut term = Terminal::new(TestBackend::new(80, 20)).unwrap();
        term.draw(|f| draw(f, state)).unwrap();
        let buf = term.backend().buffer().clone();
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[tokio::test]
    async fn renders_deck_list_and_question() {
        let mut c = MemoryCollection::default();
        c.add_question("Geo", &["Capital of France?", "Paris", "Rome", "A"]);
        let c: Arc<dyn Collection> = Arc::new(c);
        let mut state = AppState::new(Ok(c), ExportOptions::default());
        state.init().await;

        assert!(screen_text(&state).contains("Geo"));

        state.handle(Action::Enter).await;
        state.handle(Action::Enter).await;
        let text = screen_text(&state);
        assert!(text.contains("1/1 Question:"));
        assert!(text.contains("Capital of France?"));
        assert!(text.contains("[ ] "));
    }

    #[test]
    fn renders_blocked_message() {
        let state = AppState::new(
            Err(ankiquiz_core::CoreError::StoreNotFound),
            ExportOptions::default(),
        );
        let text = screen_text(&state);
        assert!(text.contains("Cannot find Anki database"));
    }
}
