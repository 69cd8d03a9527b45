use ankiquiz_core::{DeckSession, MemoryCollection};
use ankiquiz_docx::{export_deck, ExportOptions};
use std::io::Read;
use std::path::Path;

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut v = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    v.extend_from_slice(&width.to_be_bytes());
    v.extend_from_slice(&height.to_be_bytes());
    v.extend_from_slice(&[8, 6, 0, 0, 0]);
    v
}

async fn loaded() -> DeckSession {
    let mut c = MemoryCollection::default();
    c.add_media("map.png", png(100, 50))
        .add_question("Geo", &[r#"Capital of France?<img src="map.png">"#, "Paris", "Rome", "A"])
        .add_question("Geo", &["Rivers & lakes?", "Vistula", "Alps", "Oder", "AC"]);
    let mut s = DeckSession::new("Geo");
    s.load(&c).await.unwrap();
    s
}

fn read_bytes(path: &Path, name: &str) -> Vec<u8> {
    let f = std::fs::File::open(path).unwrap();
    let mut zip = zip::ZipArchive::new(f).unwrap();
    let mut part = zip.by_name(name).unwrap();
    let mut buf = Vec::new();
    part.read_to_end(&mut buf).unwrap();
    buf
}

fn read_part(path: &Path, name: &str) -> String {
    String::from_utf8(read_bytes(path, name)).unwrap()
}

#[tokio::test]
async fn headings_in_source_order_with_highlighted_answers() {
    let s = loaded().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("geo.docx");

    let summary = export_deck(&s, &out, &ExportOptions::default()).unwrap();
    assert_eq!(summary.questions, 2);
    assert_eq!(summary.pictures, 1);

    let xml = read_part(&out, "word/document.xml");
    let first = xml.find("Capital of France?").unwrap();
    let second = xml.find("Rivers &amp; lakes?").unwrap();
    assert!(first < second);
    assert_eq!(xml.matches(r#"<w:pStyle w:val="Heading1"/>"#).count(), 2);

    // three correct options, each highlighted once and repeated plain
    assert_eq!(xml.matches(r#"<w:highlight w:val="yellow"/>"#).count(), 3);
    assert_eq!(xml.matches(">Paris<").count(), 2);
    assert_eq!(xml.matches(">Rome<").count(), 1);

    let rels = read_part(&out, "word/_rels/document.xml.rels");
    assert!(rels.contains(r#"Target="media/image1.png""#));
    assert_eq!(read_bytes(&out, "word/media/image1.png"), png(100, 50));
}

#[tokio::test]
async fn without_duplicate_plain_lines() {
    let s = loaded().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("geo.docx");
    let opts = ExportOptions {
        duplicate_correct_plain: false,
    };
    export_deck(&s, &out, &opts).unwrap();

    let xml = read_part(&out, "word/document.xml");
    assert_eq!(xml.matches(">Paris<").count(), 1);
    assert_eq!(xml.matches(">Vistula<").count(), 1);
    assert_eq!(xml.matches(">Alps<").count(), 1);
}

#[tokio::test]
async fn overwrites_existing_file() {
    let s = loaded().await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("geo.docx");
    std::fs::write(&out, b"old").unwrap();
    export_deck(&s, &out, &ExportOptions::default()).unwrap();
    assert!(read_part(&out, "[Content_Types].xml").contains("wordprocessingml"));
}

#[tokio::test]
async fn control_characters_never_reach_the_package() {
    let mut c = MemoryCollection::default();
    c.add_question("Pasted", &["Copied\u{b}from Word?", "yes\u{1}", "no", "A"]);
    let mut s = DeckSession::new("Pasted");
    s.load(&c).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pasted.docx");
    export_deck(&s, &out, &ExportOptions::default()).unwrap();

    let xml = read_part(&out, "word/document.xml");
    assert!(!xml.chars().any(|ch| ch < ' ' && !matches!(ch, '\t' | '\n' | '\r')));
    assert!(xml.contains("Copied</w:t><w:br/>"));
    assert_eq!(xml.matches(">yes<").count(), 2);
}
