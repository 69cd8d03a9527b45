use crate::image_info::{sniff, ImageInfo};
use crate::parts;
use ankiquiz_core::CoreError;
use chrono::Utc;
use quick_xml::escape::escape;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const EMU_PER_PX: u64 = 9525;
const MAX_PICTURE_WIDTH_EMU: u64 = 5 * 914_400;
const MAX_PICTURE_HEIGHT_EMU: u64 = 8 * 914_400;

struct Media {
    file_name: String,
    bytes: Vec<u8>,
}

/// In-memory Word document, written out in one go by [`DocxDocument::save`].
#[derive(Default)]
pub struct DocxDocument {
    title: String,
    body: String,
    media: Vec<Media>,
}

impl DocxDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Levels are clamped to `Heading1..=Heading9`.
    pub fn add_heading(&mut self, text: &str, level: u8) {
        let level = level.clamp(1, 9);
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr>{}</w:p>"#,
            run(text, "")
        ));
    }

    pub fn add_paragraph(&mut self, text: &str) {
        self.body.push_str(&format!("<w:p>{}</w:p>", run(text, "")));
    }

    /// Bold, yellow-highlighted paragraph.
    pub fn add_paragraph_correct(&mut self, text: &str) {
        self.body.push_str(&format!(
            "<w:p>{}</w:p>",
            run(text, r#"<w:rPr><w:b/><w:highlight w:val="yellow"/></w:rPr>"#)
        ));
    }

    /// Embeds a picture at 96 DPI, scaled down to five inches wide.
    /// Returns false when the format is not recognised.
    pub fn add_picture(&mut self, bytes: Vec<u8>) -> bool {
        let Some(info) = sniff(&bytes) else {
            warn!(len = bytes.len(), "skipping picture in unknown format");
            return false;
        };
        let index = self.media.len();
        let file_name = format!("image{}.{}", index + 1, info.kind.extension());
        let (cx, cy) = extent(&info);
        let id = index + 1;
        self.body.push_str(&format!(
            concat!(
                r#"<w:p><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{id}" name="Picture {id}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
                r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
            ),
            cx = cx,
            cy = cy,
            id = id,
            name = file_name,
            rid = parts::image_rel_id(index)
        ));
        debug!(file = %file_name, width = info.width, height = info.height, "picture added");
        self.media.push(Media { file_name, bytes });
        true
    }

    pub fn picture_count(&self) -> usize {
        self.media.len()
    }

    pub fn document_xml(&self) -> String {
        format!(
            "{}<w:document {}><w:body>{}{}</w:body></w:document>",
            parts::XML_HEADER,
            parts::NS_DOCUMENT,
            self.body,
            parts::SECTION
        )
    }

    /// Writes the package to a temp file next to `path`, then moves it into place.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        write_atomic(self, path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "error while saving file");
            CoreError::WriteFailed(e.to_string())
        })?;
        info!(path = %path.display(), pictures = self.media.len(), "document saved");
        Ok(())
    }
}

/// Vertical tab and form feed become line breaks; other control characters are dropped.
fn run(text: &str, props: &str) -> String {
    let text = parts::xml_text(&text.replace(|c: char| c == '\u{b}' || c == '\u{c}', "\n"));
    let mut s = format!("<w:r>{props}");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            s.push_str("<w:br/>");
        }
        s.push_str(&format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape(line)));
    }
    s.push_str("</w:r>");
    s
}

/// Size in EMU, keeping the aspect ratio within the width and height caps.
/// Header dimensions are untrusted, so the arithmetic runs in `u128`.
fn extent(info: &ImageInfo) -> (u64, u64) {
    let (max_w, max_h) = (u128::from(MAX_PICTURE_WIDTH_EMU), u128::from(MAX_PICTURE_HEIGHT_EMU));
    let mut cx = u128::from(info.width.max(1)) * u128::from(EMU_PER_PX);
    let mut cy = u128::from(info.height.max(1)) * u128::from(EMU_PER_PX);
    if cx > max_w {
        cy = cy * max_w / cx;
        cx = max_w;
    }
    if cy > max_h {
        cx = cx * max_h / cy;
        cy = max_h;
    }
    let emu = |v: u128, max: u64| u64::try_from(v.max(1)).unwrap_or(max).min(max);
    (emu(cx, MAX_PICTURE_WIDTH_EMU), emu(cy, MAX_PICTURE_HEIGHT_EMU))
}

fn write_atomic(doc: &DocxDocument, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    let mut zip = ZipWriter::new(tmp);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let media_names: Vec<String> = doc.media.iter().map(|m| m.file_name.clone()).collect();
    let xml_parts = [
        ("[Content_Types].xml", parts::content_types()),
        ("_rels/.rels", parts::package_rels()),
        ("docProps/core.xml", parts::core_props(&doc.title, Utc::now())),
        ("docProps/app.xml", parts::app_props()),
        ("word/document.xml", doc.document_xml()),
        ("word/styles.xml", parts::styles()),
        ("word/_rels/document.xml.rels", parts::document_rels(&media_names)),
    ];
    for (name, xml) in xml_parts {
        zip.start_file(name, options)?;
        zip.write_all(xml.as_bytes())?;
    }
    for m in &doc.media {
        zip.start_file(format!("word/media/{}", m.file_name), options)?;
        zip.write_all(&m.bytes)?;
    }

    let mut tmp = zip.finish()?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}
