use crate::html::{clear_string, find_images};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type NoteId = i64;

/// Note type the quiz understands unless told otherwise.
pub const DEFAULT_TEMPLATE: &str = "Test by MX";

/// Diagnostic recorded for a note whose question text could not be recovered.
pub const UNKNOWN_QUESTION: &str = "Unknown, cannot show question";

/// A raw note as stored in the collection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub notetype: String,
    pub fields: Vec<String>,
}

impl Note {
    pub fn new(id: NoteId, notetype: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            id,
            notetype: notetype.into(),
            fields,
        }
    }
}

/// One parsed multiple-choice question.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub answers: Vec<String>,
    pub correct: BTreeSet<usize>,
    /// Base64 payloads of the referenced images; `None` when nothing resolved.
    pub images: Option<Vec<String>>,
}

impl Question {
    /// Parses a note laid out as `question, option..., letters`.
    ///
    /// Empty option fields are dropped before letters are mapped, so `C`
    /// points at the third *non-empty* option. On rejection the error holds
    /// the text to show in diagnostics.
    pub fn from_note<F>(note: &Note, mut resolve: F) -> Result<Self, String>
    where
        F: FnMut(&str) -> Option<Vec<u8>>,
    {
        let raw_question = note.fields.first().map(String::as_str).unwrap_or("");
        let (question, refs) = find_images(raw_question);

        let n = note.fields.len();
        let options: Vec<&String> = if n > 2 {
            note.fields[1..n - 1].iter().filter(|f| !f.is_empty()).collect()
        } else {
            Vec::new()
        };
        let correct_field = if n > 1 { note.fields[n - 1].as_str() } else { "" };

        let correct = parse_correct(correct_field);
        if question.is_empty() || correct_field.is_empty() || options.is_empty() || correct.is_empty() {
            return Err(if question.is_empty() {
                UNKNOWN_QUESTION.to_string()
            } else {
                clear_string(&question)
            });
        }

        let encoded: Vec<String> = refs
            .iter()
            .filter_map(|r| resolve(r))
            .map(|bytes| BASE64.encode(bytes))
            .collect();

        Ok(Self {
            text: clear_string(&question),
            answers: options.into_iter().map(|o| clear_string(o)).collect(),
            correct,
            images: if encoded.is_empty() { None } else { Some(encoded) },
        })
    }

    pub fn is_correct(&self, idx: usize) -> bool {
        self.correct.contains(&idx)
    }

    /// Decoded image bytes; payloads that fail to decode are skipped.
    pub fn image_bytes(&self) -> Vec<Vec<u8>> {
        self.images
            .iter()
            .flatten()
            .filter_map(|b| BASE64.decode(b).ok())
            .collect()
    }
}

/// Maps answer letters to option indices: `"a c"` -> `{0, 2}`.
/// Characters outside `A..=Z` are ignored; indices are not range-checked.
pub fn parse_correct(field: &str) -> BTreeSet<usize> {
    field
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .map(|c| (c as u8 - b'A') as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(fields: &[&str]) -> Note {
        Note::new(1, DEFAULT_TEMPLATE, fields.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn letters_to_indices() {
        assert_eq!(parse_correct("A"), BTreeSet::from([0]));
        assert_eq!(parse_correct(" a C "), BTreeSet::from([0, 2]));
        assert_eq!(parse_correct("ABCgEf"), BTreeSet::from([0, 1, 2, 4, 5, 6]));
        assert_eq!(parse_correct("BB"), BTreeSet::from([1]));
        assert!(parse_correct("  ").is_empty());
    }

    #[test]
    fn parses_well_formed_note() {
        let q = Question::from_note(&note(&["2 &gt; 1?", "yes", "", "no", "A"]), |_| None).unwrap();
        assert_eq!(q.text, "2 > 1?");
        assert_eq!(q.answers, vec!["yes".to_string(), "no".to_string()]);
        assert_eq!(q.correct, BTreeSet::from([0]));
        assert_eq!(q.images, None);
    }

    #[test]
    fn empty_options_shift_letters() {
        let q = Question::from_note(&note(&["q", "", "first", "second", "B"]), |_| None).unwrap();
        assert_eq!(q.answers[1], "second");
        assert!(q.is_correct(1));
    }

    #[test]
    fn rejects_malformed_notes() {
        assert_eq!(
            Question::from_note(&note(&["", "a", "A"]), |_| None).unwrap_err(),
            UNKNOWN_QUESTION
        );
        assert_eq!(
            Question::from_note(&note(&["q&amp;", "a", ""]), |_| None).unwrap_err(),
            "q&"
        );
        assert_eq!(
            Question::from_note(&note(&["q", "", "", "A"]), |_| None).unwrap_err(),
            "q"
        );
        assert!(Question::from_note(&note(&["q", "a", "1"]), |_| None).is_err());
        assert!(Question::from_note(&note(&["q"]), |_| None).is_err());
    }

    #[test]
    fn resolves_images() {
        let n = note(&[r#"Look <img src="cat.png">"#, "cat", "dog", "A"]);
        let q = Question::from_note(&n, |r| (r == "cat.png").then(|| vec![1, 2, 3])).unwrap();
        assert_eq!(q.text, "Look ");
        assert_eq!(q.images.as_ref().map(Vec::len), Some(1));
        assert_eq!(q.image_bytes(), vec![vec![1, 2, 3]]);

        let missing = Question::from_note(&n, |_| None).unwrap();
        assert_eq!(missing.images, None);
    }
}
