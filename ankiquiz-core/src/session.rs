use crate::collection::Collection;
use crate::html::find_images;
use crate::{CoreError, Question};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Quiz state for one deck: parsed questions, position, score and wrong answers.
#[derive(Clone, Debug)]
pub struct DeckSession {
    name: String,
    entries: Vec<Question>,
    answered: Vec<bool>,
    index: usize,
    score: u32,
    wrong: Vec<String>,
    errors: Vec<String>,
    loaded: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoreReport {
    pub deck: String,
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub wrong_questions: Vec<String>,
}

impl DeckSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            answered: Vec::new(),
            index: 0,
            score: 0,
            wrong: Vec::new(),
            errors: Vec::new(),
            loaded: false,
        }
    }

    /// Fetches the deck's notes and parses them into questions.
    ///
    /// Malformed notes are skipped and listed in [`DeckSession::errors`];
    /// if none survive the load fails with `DeckEmpty`.
    pub async fn load(&mut self, collection: &dyn Collection) -> Result<(), CoreError> {
        *self = Self::new(std::mem::take(&mut self.name));

        let notes = collection.deck_notes(&self.name).await?;
        debug!(deck = %self.name, notes = notes.len(), "loading deck");

        let mut media: HashMap<String, Vec<u8>> = HashMap::new();
        for note in &notes {
            let raw = note.fields.first().map(String::as_str).unwrap_or("");
            for reference in find_images(raw).1 {
                if media.contains_key(&reference) {
                    continue;
                }
                match collection.media(&reference).await {
                    Some(bytes) => {
                        media.insert(reference, bytes);
                    }
                    None => debug!(%reference, "media not found"),
                }
            }
        }

        for note in &notes {
            match Question::from_note(note, |r| media.get(r).cloned()) {
                Ok(q) => self.entries.push(q),
                Err(diag) => {
                    warn!(note = note.id, "skipping malformed note");
                    self.errors.push(diag);
                }
            }
        }

        if self.entries.is_empty() {
            return Err(CoreError::DeckEmpty(self.name.clone()));
        }
        self.answered = vec![false; self.entries.len()];
        self.loaded = true;
        info!(
            deck = %self.name,
            questions = self.entries.len(),
            skipped = self.errors.len(),
            "deck loaded"
        );
        Ok(())
    }

    /// Builds an already loaded session from parsed questions.
    pub fn from_questions(name: impl Into<String>, entries: Vec<Question>) -> Result<Self, CoreError> {
        let mut s = Self::new(name);
        if entries.is_empty() {
            return Err(CoreError::DeckEmpty(s.name));
        }
        s.answered = vec![false; entries.len()];
        s.entries = entries;
        s.loaded = true;
        Ok(s)
    }

    pub fn shuffle_current(&mut self) {
        self.shuffle_current_with(&mut rand::thread_rng());
    }

    /// Permutes the current options, carrying the correct marks along.
    pub fn shuffle_current_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.loaded {
            return;
        }
        let Some(q) = self.entries.get_mut(self.index) else {
            return;
        };
        let correct = std::mem::take(&mut q.correct);
        let mut tagged: Vec<(String, bool)> = std::mem::take(&mut q.answers)
            .into_iter()
            .enumerate()
            .map(|(i, a)| (a, correct.contains(&i)))
            .collect();
        tagged.shuffle(rng);

        // Indices past the option list can never be matched by a selection; keep them.
        let stale: BTreeSet<usize> = correct
            .iter()
            .copied()
            .filter(|&i| i >= tagged.len())
            .collect();
        q.correct = tagged
            .iter()
            .enumerate()
            .filter(|(_, (_, ok))| *ok)
            .map(|(i, _)| i)
            .chain(stale)
            .collect();
        q.answers = tagged.into_iter().map(|(a, _)| a).collect();
    }

    pub fn advance(&mut self) -> Result<(), CoreError> {
        if !self.loaded {
            return Err(CoreError::NotLoaded);
        }
        if self.index + 1 >= self.entries.len() {
            return Err(CoreError::Exhausted);
        }
        self.index += 1;
        Ok(())
    }

    /// Scores the current question: a point only for an exact match of the correct set.
    pub fn record_answer(&mut self, selected: &BTreeSet<usize>) -> Result<bool, CoreError> {
        if !self.loaded {
            return Err(CoreError::NotLoaded);
        }
        let Some(q) = self.entries.get(self.index) else {
            return Err(CoreError::OutOfRange);
        };
        if self.answered[self.index] {
            return Err(CoreError::AlreadyAnswered);
        }
        self.answered[self.index] = true;

        let hit = *selected == q.correct;
        if hit {
            self.score += 1;
        } else {
            self.wrong.push(q.text.clone());
        }
        debug!(index = self.index, hit, "answer recorded");
        Ok(hit)
    }

    fn current(&self) -> Option<&Question> {
        if !self.loaded {
            return None;
        }
        self.entries.get(self.index)
    }

    pub fn question(&self) -> &str {
        self.current().map(|q| q.text.as_str()).unwrap_or("")
    }

    pub fn answers(&self) -> &[String] {
        self.current().map(|q| q.answers.as_slice()).unwrap_or(&[])
    }

    pub fn images(&self) -> &[String] {
        self.current()
            .and_then(|q| q.images.as_deref())
            .unwrap_or(&[])
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Score as a percentage rounded to two decimals.
    pub fn percentage(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let raw = self.score as f64 / self.entries.len() as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }

    pub fn wrong_questions(&self) -> &[String] {
        &self.wrong
    }

    /// Diagnostics for notes skipped during load.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The last question has been answered.
    pub fn is_finished(&self) -> bool {
        self.loaded && self.answered.last().copied().unwrap_or(false)
    }

    pub fn entries(&self) -> &[Question] {
        &self.entries
    }

    pub fn report(&self) -> ScoreReport {
        ScoreReport {
            deck: self.name.clone(),
            score: self.score,
            max_score: self.max_score(),
            percentage: self.percentage(),
            wrong_questions: self.wrong.clone(),
        }
    }
}
