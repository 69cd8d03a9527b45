use crate::tui::inputs::Action;
use ankiquiz_core::{Collection, CoreError, DeckSession};
use ankiquiz_docx::{default_file_name, export_deck, ExportOptions};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

pub const OPTION_LABELS: [&str; 3] = ["Back to deck list", "Start test", "Export to file"];

/// Exactly one screen is live; handlers build the next one and swap it in.
pub enum Screen {
    /// The collection could not be opened; nothing else is reachable.
    Blocked { message: String },
    DeckList { sel: usize },
    Options { deck: String, sel: usize },
    ExportPath { deck: String, input: String },
    Question { session: DeckSession, cursor: usize, checked: Vec<bool> },
    Score { session: DeckSession },
}

impl Screen {
    pub fn takes_text(&self) -> bool {
        matches!(self, Screen::ExportPath { .. })
    }
}

pub struct AppState {
    collection: Option<Arc<dyn Collection>>,
    export_opts: ExportOptions,
    pub decks: Vec<String>,
    pub screen: Screen,
    pub notice: Option<String>,
    pub quit: bool,
}

impl AppState {
    pub fn new(collection: Result<Arc<dyn Collection>, CoreError>, export_opts: ExportOptions) -> Self {
        let (collection, screen) = match collection {
            Ok(c) => (Some(c), Screen::DeckList { sel: 0 }),
            Err(e) => {
                warn!(error = %e, "collection unavailable");
                (None, Screen::Blocked { message: e.notice() })
            }
        };
        Self {
            collection,
            export_opts,
            decks: Vec::new(),
            screen,
            notice: None,
            quit: false,
        }
    }

    /// Loads the deck list. Store errors block the deck list; others become a notice.
    pub async fn init(&mut self) {
        let Some(c) = self.collection.clone() else {
            return;
        };
        match c.deck_names().await {
            Ok(names) => self.decks = names,
            Err(e) if e.is_fatal() => {
                self.screen = Screen::Blocked { message: e.notice() };
            }
            Err(e) => {
                self.decks.clear();
                self.notice = Some(e.notice());
            }
        }
    }

    pub async fn handle(&mut self, action: Action) {
        if action == Action::Quit {
            self.quit = true;
            return;
        }
        if self.notice.is_some() && matches!(action, Action::Dismiss | Action::Back) {
            self.notice = None;
            return;
        }
        let Some(collection) = self.collection.clone() else {
            return;
        };

        let current = std::mem::replace(&mut self.screen, Screen::DeckList { sel: 0 });
        self.screen = match current {
            Screen::Blocked { message } => Screen::Blocked { message },
            Screen::DeckList { sel } => self.on_decks(sel, action),
            Screen::Options { deck, sel } => self.on_options(&*collection, deck, sel, action).await,
            Screen::ExportPath { deck, input } => {
                self.on_export_path(&*collection, deck, input, action).await
            }
            Screen::Question { session, cursor, checked } => {
                self.on_question(session, cursor, checked, action)
            }
            Screen::Score { session } => match action {
                Action::Back | Action::Enter => self.deck_list_at(session.name()),
                _ => Screen::Score { session },
            },
        };
    }

    fn on_decks(&mut self, sel: usize, action: Action) -> Screen {
        let last = self.decks.len().saturating_sub(1);
        match action {
            Action::Up => Screen::DeckList { sel: sel.saturating_sub(1) },
            Action::Down => Screen::DeckList { sel: (sel + 1).min(last) },
            Action::Enter => match self.decks.get(sel) {
                Some(deck) => Screen::Options { deck: deck.clone(), sel: 1 },
                None => Screen::DeckList { sel },
            },
            _ => Screen::DeckList { sel },
        }
    }

    async fn on_options(&mut self, c: &dyn Collection, deck: String, sel: usize, action: Action) -> Screen {
        match action {
            Action::Up => Screen::Options { deck, sel: sel.saturating_sub(1) },
            Action::Down => Screen::Options { deck, sel: (sel + 1).min(OPTION_LABELS.len() - 1) },
            Action::Back => self.deck_list_at(&deck),
            Action::Enter => match sel {
                0 => self.deck_list_at(&deck),
                1 => self.start_test(c, deck).await,
                _ => {
                    let input = default_file_name(&deck);
                    Screen::ExportPath { deck, input }
                }
            },
            _ => Screen::Options { deck, sel },
        }
    }

    async fn start_test(&mut self, c: &dyn Collection, deck: String) -> Screen {
        let mut session = DeckSession::new(&deck);
        if let Err(e) = session.load(c).await {
            self.notice = Some(e.notice());
            return self.deck_list_at(&deck);
        }
        session.shuffle_current();
        let checked = vec![false; session.answers().len()];
        Screen::Question { session, cursor: 0, checked }
    }

    async fn on_export_path(&mut self, c: &dyn Collection, deck: String, mut input: String, action: Action) -> Screen {
        match action {
            Action::Char(ch) => {
                input.push(ch);
                Screen::ExportPath { deck, input }
            }
            Action::Backspace => {
                input.pop();
                Screen::ExportPath { deck, input }
            }
            Action::Back => Screen::Options { deck, sel: 2 },
            Action::Enter => {
                let path = input.trim();
                if path.is_empty() {
                    self.notice = Some("No file selected".into());
                } else {
                    self.notice = Some(self.export(c, &deck, PathBuf::from(path)).await);
                }
                self.deck_list_at(&deck)
            }
            _ => Screen::ExportPath { deck, input },
        }
    }

    /// Exports a freshly loaded session, independent of any running test.
    async fn export(&self, c: &dyn Collection, deck: &str, path: PathBuf) -> String {
        let mut session = DeckSession::new(deck);
        if let Err(e) = session.load(c).await {
            return e.notice();
        }
        match export_deck(&session, &path, &self.export_opts) {
            Ok(summary) => format!("Exported {} questions to {}", summary.questions, path.display()),
            Err(e) => e.notice(),
        }
    }

    fn on_question(&mut self, mut session: DeckSession, cursor: usize, mut checked: Vec<bool>, action: Action) -> Screen {
        let last = checked.len().saturating_sub(1);
        match action {
            Action::Up => Screen::Question { session, cursor: cursor.saturating_sub(1), checked },
            Action::Down => Screen::Question { session, cursor: (cursor + 1).min(last), checked },
            Action::Toggle => {
                if let Some(c) = checked.get_mut(cursor) {
                    *c = !*c;
                }
                Screen::Question { session, cursor, checked }
            }
            Action::Back => self.deck_list_at(session.name()),
            Action::Enter => {
                let selected: BTreeSet<usize> = checked
                    .iter()
                    .enumerate()
                    .filter(|(_, on)| **on)
                    .map(|(i, _)| i)
                    .collect();
                if let Err(e) = session.record_answer(&selected) {
                    self.notice = Some(e.notice());
                    return self.deck_list_at(session.name());
                }
                match session.advance() {
                    Ok(()) => {
                        session.shuffle_current();
                        let checked = vec![false; session.answers().len()];
                        Screen::Question { session, cursor: 0, checked }
                    }
                    Err(CoreError::Exhausted) => {
                        debug!(deck = session.name(), score = session.score(), "test finished");
                        Screen::Score { session }
                    }
                    Err(e) => {
                        self.notice = Some(e.notice());
                        self.deck_list_at(session.name())
                    }
                }
            }
            _ => Screen::Question { session, cursor, checked },
        }
    }

    fn deck_list_at(&self, deck: &str) -> Screen {
        let sel = self.decks.iter().position(|d| d == deck).unwrap_or(0);
        Screen::DeckList { sel }
    }
}
