pub mod document;
pub mod export;
pub mod image_info;
mod parts;

pub use document::DocxDocument;
pub use export::{default_file_name, export_deck, render_deck, ExportOptions, ExportSummary};
