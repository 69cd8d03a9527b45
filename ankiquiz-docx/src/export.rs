use crate::document::DocxDocument;
use ankiquiz_core::{CoreError, DeckSession};
use std::path::Path;
use tracing::info;

#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Follow each highlighted correct option with a plain copy of it.
    pub duplicate_correct_plain: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            duplicate_correct_plain: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub questions: usize,
    pub pictures: usize,
}

/// Builds the document for a loaded session without writing it.
pub fn render_deck(session: &DeckSession, opts: &ExportOptions) -> Result<DocxDocument, CoreError> {
    if !session.is_loaded() {
        return Err(CoreError::NotLoaded);
    }
    let mut doc = DocxDocument::new(session.name());
    for q in session.entries() {
        doc.add_heading(&q.text, 1);
        for bytes in q.image_bytes() {
            doc.add_picture(bytes);
        }
        for (i, answer) in q.answers.iter().enumerate() {
            if q.is_correct(i) {
                doc.add_paragraph_correct(answer);
                if !opts.duplicate_correct_plain {
                    continue;
                }
            }
            doc.add_paragraph(answer);
        }
    }
    Ok(doc)
}

/// Writes every question of `session` to a `.docx` at `path`.
pub fn export_deck(
    session: &DeckSession,
    path: &Path,
    opts: &ExportOptions,
) -> Result<ExportSummary, CoreError> {
    let doc = render_deck(session, opts)?;
    doc.save(path)?;
    let summary = ExportSummary {
        questions: session.len(),
        pictures: doc.picture_count(),
    };
    info!(deck = session.name(), path = %path.display(), questions = summary.questions, "deck exported");
    Ok(summary)
}

/// `My Deck/Sub` -> `My_Deck_Sub.docx`.
pub fn default_file_name(deck: &str) -> String {
    let safe: String = deck
        .chars()
        .map(|c| if matches!(c, ' ' | '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}.docx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_sanitised() {
        assert_eq!(default_file_name("My Deck/Sub\\x"), "My_Deck_Sub_x.docx");
        assert_eq!(default_file_name("Geo::Europe"), "Geo::Europe.docx");
    }

    #[test]
    fn unloaded_session_is_refused() {
        let s = DeckSession::new("Geo");
        assert!(matches!(
            render_deck(&s, &ExportOptions::default()),
            Err(CoreError::NotLoaded)
        ));
    }
}
