use regex::Regex;
use std::sync::OnceLock;

const LINE_BREAKS: [&str; 4] = ["<br>", "<br/>", "<br />", "<br >"];

/// Replacement order matters: `&amp;lt;` decodes to `&lt;`, not `<`.
const ENTITIES: [(&str, &str); 25] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&cent;", "\u{a2}"),
    ("&pound;", "\u{a3}"),
    ("&yen;", "\u{a5}"),
    ("&euro;", "\u{20ac}"),
    ("&copy;", "\u{a9}"),
    ("&reg;", "\u{ae}"),
    ("&trade;", "\u{2122}"),
    ("&times;", "\u{d7}"),
    ("&divide;", "\u{f7}"),
    ("&ndash;", "\u{2013}"),
    ("&mdash;", "\u{2014}"),
    ("&lsquo;", "\u{2018}"),
    ("&rsquo;", "\u{2019}"),
    ("&sbquo;", "\u{201a}"),
    ("&ldquo;", "\u{201c}"),
    ("&rdquo;", "\u{201d}"),
    ("&bdquo;", "\u{201e}"),
    ("&laquo;", "\u{ab}"),
    ("&raquo;", "\u{bb}"),
];

/// Turns `<br>` variants into newlines and decodes the known entity table.
/// Any other markup is left as-is.
pub fn clear_string(s: &str) -> String {
    let mut out = s.to_string();
    for br in LINE_BREAKS {
        out = out.replace(br, "\n");
    }
    for (entity, literal) in ENTITIES {
        out = out.replace(entity, literal);
    }
    out
}

fn img_src_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<img src="([^"]+)""#).expect("valid regex"))
}

fn media_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<img[^>]*>|\[sound:[^\]]+\]").expect("valid regex"))
}

/// Collects `<img src="...">` references in order and returns the text with
/// media references removed.
pub fn find_images(raw: &str) -> (String, Vec<String>) {
    let images = img_src_re()
        .captures_iter(raw)
        .map(|c| c[1].to_string())
        .collect();
    let stripped = media_ref_re().replace_all(raw, "").into_owned();
    (stripped, images)
}
