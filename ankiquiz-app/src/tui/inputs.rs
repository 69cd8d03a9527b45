use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Enter,
    Toggle,
    Back,
    Dismiss,
    Char(char),
    Backspace,
    None,
}

/// `text_input` routes printable keys to [`Action::Char`] for the path prompt.
pub fn map_event(ev: Event, text_input: bool) -> Action {
    let Event::Key(KeyEvent {
        code, modifiers, kind, ..
    }) = ev
    else {
        return Action::None;
    };
    if kind == KeyEventKind::Release {
        return Action::None;
    }
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (code, modifiers) {
        return Action::Quit;
    }
    if text_input {
        return match code {
            KeyCode::Esc => Action::Back,
            KeyCode::Enter => Action::Enter,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Char(c) => Action::Char(c),
            _ => Action::None,
        };
    }
    match code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc | KeyCode::Char('b') => Action::Back,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter => Action::Enter,
        KeyCode::Char(' ') => Action::Toggle,
        KeyCode::Char('x') => Action::Dismiss,
        _ => Action::None,
    }
}
