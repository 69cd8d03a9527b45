use crate::collection::{in_deck_tree, Collection};
use crate::{CoreError, Note, DEFAULT_TEMPLATE};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};

/// In-memory collection for tests and demos.
pub struct MemoryCollection {
    template: String,
    decks: BTreeMap<String, Vec<Note>>,
    media: BTreeMap<String, Vec<u8>>,
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl MemoryCollection {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            decks: BTreeMap::new(),
            media: BTreeMap::new(),
        }
    }

    pub fn add_deck(&mut self, name: impl Into<String>) -> &mut Self {
        self.decks.entry(name.into()).or_default();
        self
    }

    pub fn add_note(&mut self, deck: &str, note: Note) -> &mut Self {
        self.decks.entry(deck.to_string()).or_default().push(note);
        self
    }

    /// Adds a note of this collection's template with the given fields.
    pub fn add_question(&mut self, deck: &str, fields: &[&str]) -> &mut Self {
        let id = self.decks.values().map(Vec::len).sum::<usize>() as i64 + 1;
        let note = Note::new(
            id,
            self.template.clone(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        self.add_note(deck, note)
    }

    pub fn add_media(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.media.insert(file_name.into(), bytes);
        self
    }

    fn matching<'a>(&'a self, deck: &'a str) -> impl Iterator<Item = &'a Note> + 'a {
        self.decks
            .iter()
            .filter(move |(name, _)| in_deck_tree(name, deck))
            .flat_map(|(_, notes)| notes.iter())
            .filter(|n| n.notetype == self.template)
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    fn template(&self) -> &str {
        &self.template
    }

    async fn deck_names(&self) -> Result<Vec<String>, CoreError> {
        let names: Vec<String> = self
            .decks
            .keys()
            .filter(|d| self.matching(d).next().is_some())
            .cloned()
            .collect();
        if names.is_empty() {
            return Err(CoreError::NoSupportedDecks(self.template.clone()));
        }
        Ok(names)
    }

    async fn deck_notes(&self, deck: &str) -> Result<Vec<Note>, CoreError> {
        if !self.decks.contains_key(deck) {
            return Err(CoreError::DeckNotFound(deck.to_string()));
        }
        let mut seen = HashSet::new();
        let notes: Vec<Note> = self
            .matching(deck)
            .filter(|n| seen.insert(n.id))
            .cloned()
            .collect();
        if notes.is_empty() {
            return Err(CoreError::DeckEmpty(deck.to_string()));
        }
        Ok(notes)
    }

    async fn media(&self, reference: &str) -> Option<Vec<u8>> {
        self.media
            .iter()
            .find(|(name, _)| name.ends_with(reference))
            .map(|(_, bytes)| bytes.clone())
    }
}
