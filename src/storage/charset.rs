//! Single-byte and UTF-8 text decoding for table content

use std::fmt;

/// Character encoding of a table's text and memo fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// UTF-8, invalid sequences replaced
    Utf8,
    /// ISO-8859-1
    Latin1,
    /// Windows code page 1252
    #[default]
    Windows1252,
}

/// Code points for 0x80..=0x9F in code page 1252; undefined bytes map to
/// the same C1 control code point, as Latin-1 would.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

impl Charset {
    /// Parses a configured charset name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Charset::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Some(Charset::Latin1),
            "windows-1252" | "cp1252" => Some(Charset::Windows1252),
            _ => None,
        }
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Latin1 => "latin1",
            Charset::Windows1252 => "windows-1252",
        }
    }

    /// Decodes raw bytes into a string
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Charset::Windows1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
                    _ => char::from(b),
                })
                .collect(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Charset::from_name("UTF-8"), Some(Charset::Utf8));
        assert_eq!(Charset::from_name("cp1252"), Some(Charset::Windows1252));
        assert_eq!(Charset::from_name("ebcdic"), None);
    }

    #[test]
    fn test_decode_high_bytes() {
        let raw = [b'a', 0x80, 0xE9];
        assert_eq!(Charset::Windows1252.decode(&raw), "a\u{20AC}\u{E9}");
        assert_eq!(Charset::Latin1.decode(&raw), "a\u{80}\u{E9}");
    }

    #[test]
    fn test_utf8_lossy() {
        assert_eq!(Charset::Utf8.decode("né".as_bytes()), "né");
        assert_eq!(Charset::Utf8.decode(&[0xFF]), "\u{FFFD}");
    }
}
