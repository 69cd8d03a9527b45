use crate::{CoreError, Note};
use async_trait::async_trait;

pub mod memory;

/// Read-only view of a flashcard collection, passed explicitly to sessions.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Name of the note type treated as quiz questions.
    fn template(&self) -> &str;

    // Decks
    async fn deck_names(&self) -> Result<Vec<String>, CoreError>;
    async fn deck_notes(&self, deck: &str) -> Result<Vec<Note>, CoreError>;

    // Media
    async fn media(&self, reference: &str) -> Option<Vec<u8>>;
}

/// True when `deck` is `parent` itself or one of its subdecks.
pub fn in_deck_tree(deck: &str, parent: &str) -> bool {
    deck == parent
        || deck
            .strip_prefix(parent)
            .map(|rest| rest.starts_with("::"))
            .unwrap_or(false)
}
