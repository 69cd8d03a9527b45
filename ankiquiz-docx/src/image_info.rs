/// Picture formats Word can embed directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
}

/// Reads format and pixel size from the file header.
pub fn sniff(bytes: &[u8]) -> Option<ImageInfo> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some(ImageInfo {
            kind: ImageKind::Png,
            width: be32(bytes, 16)?,
            height: be32(bytes, 20)?,
        });
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(ImageInfo {
            kind: ImageKind::Gif,
            width: le16(bytes, 6)? as u32,
            height: le16(bytes, 8)? as u32,
        });
    }
    if bytes.starts_with(b"BM") {
        let w = le32(bytes, 18)? as i32;
        let h = le32(bytes, 22)? as i32;
        return Some(ImageInfo {
            kind: ImageKind::Bmp,
            width: w.unsigned_abs(),
            height: h.unsigned_abs(),
        });
    }
    if bytes.starts_with(&[0xFF, 0xD8]) {
        return jpeg(bytes);
    }
    None
}

fn jpeg(b: &[u8]) -> Option<ImageInfo> {
    let mut i = 2;
    while i + 3 < b.len() {
        if b[i] != 0xFF {
            return None;
        }
        let marker = b[i + 1];
        match marker {
            0xFF => {
                i += 1;
                continue;
            }
            0x01 | 0xD0..=0xD9 => {
                i += 2;
                continue;
            }
            // SOFn, minus DHT / JPG / DAC
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return Some(ImageInfo {
                    kind: ImageKind::Jpeg,
                    height: be16(b, i + 5)? as u32,
                    width: be16(b, i + 7)? as u32,
                });
            }
            _ => {
                let len = be16(b, i + 2)? as usize;
                i += 2 + len;
            }
        }
    }
    None
}

fn be16(b: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(b.get(at..at + 2)?.try_into().ok()?))
}

fn be32(b: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(b.get(at..at + 4)?.try_into().ok()?))
}

fn le16(b: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(b.get(at..at + 2)?.try_into().ok()?))
}

fn le32(b: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(b.get(at..at + 4)?.try_into().ok()?))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Header-only PNG, enough for size sniffing.
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let mut v = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
        v.extend_from_slice(&width.to_be_bytes());
        v.extend_from_slice(&height.to_be_bytes());
        v.extend_from_slice(&[8, 6, 0, 0, 0]);
        v
    }

    #[test]
    fn png_size() {
        assert_eq!(
            sniff(&png(640, 480)),
            Some(ImageInfo { kind: ImageKind::Png, width: 640, height: 480 })
        );
    }

    #[test]
    fn gif_size() {
        let mut g = b"GIF89a".to_vec();
        g.extend_from_slice(&[0x20, 0x01, 0x10, 0x00]);
        assert_eq!(
            sniff(&g),
            Some(ImageInfo { kind: ImageKind::Gif, width: 288, height: 16 })
        );
    }

    #[test]
    fn jpeg_size_after_app0() {
        let mut j = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00];
        j.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x64, 0x00, 0xC8, 0x03]);
        assert_eq!(
            sniff(&j),
            Some(ImageInfo { kind: ImageKind::Jpeg, width: 200, height: 100 })
        );
    }

    #[test]
    fn unknown_or_truncated() {
        assert_eq!(sniff(b"hello"), None);
        assert_eq!(sniff(b"\x89PNG\r\n\x1a\n\0\0"), None);
    }
}
