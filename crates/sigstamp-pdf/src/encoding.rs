//! Single-byte font encodings.
//!
//! WinAnsi is the base for every simple font: Latin-1 except for the
//! 0x80-0x9F block, which holds curly quotes, dashes and a few letters.
//! A `/Differences` array then overrides individual codes by glyph name.

use lopdf::{Dictionary, Document, Object};

/// WinAnsi codes 0x80..=0x9F. `None` marks the five undefined codes.
const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Glyph names for 0xA0..=0xFF, where the code equals the Unicode scalar.
#[rustfmt::skip]
const LATIN1_NAMES: [&str; 96] = [
    "nbspace", "exclamdown", "cent", "sterling", "currency", "yen", "brokenbar", "section",
    "dieresis", "copyright", "ordfeminine", "guillemotleft", "logicalnot", "sfthyphen", "registered", "macron",
    "degree", "plusminus", "twosuperior", "threesuperior", "acute", "mu", "paragraph", "periodcentered",
    "cedilla", "onesuperior", "ordmasculine", "guillemotright", "onequarter", "onehalf", "threequarters", "questiondown",
    "Agrave", "Aacute", "Acircumflex", "Atilde", "Adieresis", "Aring", "AE", "Ccedilla",
    "Egrave", "Eacute", "Ecircumflex", "Edieresis", "Igrave", "Iacute", "Icircumflex", "Idieresis",
    "Eth", "Ntilde", "Ograve", "Oacute", "Ocircumflex", "Otilde", "Odieresis", "multiply",
    "Oslash", "Ugrave", "Uacute", "Ucircumflex", "Udieresis", "Yacute", "Thorn", "germandbls",
    "agrave", "aacute", "acircumflex", "atilde", "adieresis", "aring", "ae", "ccedilla",
    "egrave", "eacute", "ecircumflex", "edieresis", "igrave", "iacute", "icircumflex", "idieresis",
    "eth", "ntilde", "ograve", "oacute", "ocircumflex", "otilde", "odieresis", "divide",
    "oslash", "ugrave", "uacute", "ucircumflex", "udieresis", "yacute", "thorn", "ydieresis",
];

/// Named glyphs outside Latin-1 letters.
const GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '),
    ("exclam", '!'),
    ("quotedbl", '"'),
    ("numbersign", '#'),
    ("dollar", '$'),
    ("percent", '%'),
    ("ampersand", '&'),
    ("quotesingle", '\''),
    ("parenleft", '('),
    ("parenright", ')'),
    ("asterisk", '*'),
    ("plus", '+'),
    ("comma", ','),
    ("hyphen", '-'),
    ("period", '.'),
    ("slash", '/'),
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("colon", ':'),
    ("semicolon", ';'),
    ("less", '<'),
    ("equal", '='),
    ("greater", '>'),
    ("question", '?'),
    ("at", '@'),
    ("bracketleft", '['),
    ("backslash", '\\'),
    ("bracketright", ']'),
    ("asciicircum", '^'),
    ("underscore", '_'),
    ("grave", '`'),
    ("braceleft", '{'),
    ("bar", '|'),
    ("braceright", '}'),
    ("asciitilde", '~'),
    ("Euro", '\u{20AC}'),
    ("quotesinglbase", '\u{201A}'),
    ("florin", '\u{0192}'),
    ("quotedblbase", '\u{201E}'),
    ("ellipsis", '\u{2026}'),
    ("dagger", '\u{2020}'),
    ("daggerdbl", '\u{2021}'),
    ("circumflex", '\u{02C6}'),
    ("perthousand", '\u{2030}'),
    ("Scaron", '\u{0160}'),
    ("guilsinglleft", '\u{2039}'),
    ("OE", '\u{0152}'),
    ("Zcaron", '\u{017D}'),
    ("quoteleft", '\u{2018}'),
    ("quoteright", '\u{2019}'),
    ("quotedblleft", '\u{201C}'),
    ("quotedblright", '\u{201D}'),
    ("bullet", '\u{2022}'),
    ("endash", '\u{2013}'),
    ("emdash", '\u{2014}'),
    ("tilde", '\u{02DC}'),
    ("trademark", '\u{2122}'),
    ("scaron", '\u{0161}'),
    ("guilsinglright", '\u{203A}'),
    ("oe", '\u{0153}'),
    ("zcaron", '\u{017E}'),
    ("Ydieresis", '\u{0178}'),
    ("dotlessi", '\u{0131}'),
    ("Lslash", '\u{0141}'),
    ("lslash", '\u{0142}'),
    ("fraction", '\u{2044}'),
    ("minus", '\u{2212}'),
    ("fi", '\u{FB01}'),
    ("fl", '\u{FB02}'),
];

fn win_ansi(code: u8) -> Option<char> {
    match code {
        0x80..=0x9F => WIN_ANSI_HIGH[usize::from(code - 0x80)],
        0x7F => None,
        _ => Some(char::from(code)),
    }
}

/// Unicode for an Adobe glyph name: single letters, `uniXXXX`, `uXXXX[XX]`
/// and the common Latin names.
pub(crate) fn glyph_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            return Some(c);
        }
    }
    let hex = name
        .strip_prefix("uni")
        .filter(|h| h.len() == 4)
        .or_else(|| name.strip_prefix('u').filter(|h| (4..=6).contains(&h.len())));
    if let Some(code) = hex.and_then(|h| u32::from_str_radix(h, 16).ok()) {
        return char::from_u32(code);
    }
    if let Some(i) = LATIN1_NAMES.iter().position(|n| *n == name) {
        return char::from_u32(0xA0 + i as u32);
    }
    GLYPH_NAMES.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

/// Code-to-character table of a simple font.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SimpleEncoding {
    table: [Option<char>; 256],
}

impl SimpleEncoding {
    pub fn win_ansi() -> Self {
        let mut table = [None; 256];
        for (code, slot) in (0u8..=255).zip(table.iter_mut()) {
            *slot = win_ansi(code);
        }
        Self { table }
    }

    /// Encoding of a font dictionary: WinAnsi with any `/Differences`
    /// applied. Other base encodings are read as WinAnsi.
    pub fn from_font(doc: &Document, font: &Dictionary) -> Self {
        let mut encoding = Self::win_ansi();
        let differences = font
            .get(b"Encoding")
            .ok()
            .map(|o| crate::content::resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"Differences").ok())
            .map(|o| crate::content::resolve(doc, o))
            .and_then(|o| o.as_array().ok());
        if let Some(differences) = differences {
            encoding.apply_differences(differences);
        }
        encoding
    }

    /// `[code /name /name ... code /name ...]`: each number restarts the
    /// run, each name takes the next code. Codes outside 0..=255 end the
    /// run until the next number.
    fn apply_differences(&mut self, differences: &[Object]) {
        let mut code: Option<usize> = None;
        for item in differences {
            match item {
                Object::Integer(n) => code = usize::try_from(*n).ok().filter(|c| *c < 256),
                Object::Name(name) => {
                    if let Some(c) = code {
                        if let Some(ch) = glyph_char(&String::from_utf8_lossy(name)) {
                            self.table[c] = Some(ch);
                        }
                        code = Some(c + 1).filter(|c| *c < 256);
                    }
                }
                _ => {}
            }
        }
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        self.table[usize::from(code)]
    }
}
