use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("path to Anki not found")]
    PathNotFound,
    #[error("cannot find Anki database")]
    StoreNotFound,
    #[error("cannot open Anki database: {0}")]
    StoreOpen(String),
    #[error("no decks use note type \"{0}\"")]
    NoSupportedDecks(String),
    #[error("deck not found: {0}")]
    DeckNotFound(String),
    #[error("deck is empty: {0}")]
    DeckEmpty(String),
    #[error("deck is not loaded")]
    NotLoaded,
    #[error("question index out of range")]
    OutOfRange,
    #[error("no more questions")]
    Exhausted,
    #[error("question already answered")]
    AlreadyAnswered,
    #[error("write failed: {0}")]
    WriteFailed(String),
}

impl CoreError {
    /// Short message suitable for an inline notice.
    pub fn notice(&self) -> String {
        match self {
            CoreError::PathNotFound => "Path to Anki not found".into(),
            CoreError::StoreNotFound => "Cannot find Anki database".into(),
            CoreError::StoreOpen(_) => "Close Anki before running this program".into(),
            CoreError::NoSupportedDecks(t) => format!("No decks use the \"{t}\" note type"),
            CoreError::DeckNotFound(_) => "Deck not found".into(),
            CoreError::DeckEmpty(_) => "Deck is empty".into(),
            CoreError::NotLoaded => "Deck is not loaded".into(),
            CoreError::OutOfRange => "No question at this position".into(),
            CoreError::Exhausted => "No more questions".into(),
            CoreError::AlreadyAnswered => "Question already answered".into(),
            CoreError::WriteFailed(_) => "Error while saving file".into(),
        }
    }

    /// Store failures that keep the deck list from being shown at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::PathNotFound | CoreError::StoreNotFound | CoreError::StoreOpen(_)
        )
    }
}
