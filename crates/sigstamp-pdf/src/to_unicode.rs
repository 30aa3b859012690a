//! ToUnicode CMap parsing.
//!
//! Only the `bfchar` and `bfrange` sections matter for text search; code
//! space ranges and CID mappings are ignored.

use std::collections::HashMap;

/// Character code to Unicode text mapping from a `/ToUnicode` stream.
#[derive(Debug, Clone, Default)]
pub struct ToUnicode {
    map: HashMap<u32, String>,
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Hex(&'a str),
    Open,
    Close,
}

/// Hex strings and array brackets of a section, other tokens dropped.
fn tokens(section: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut rest = section;
    while let Some(pos) = rest.find(['<', '[', ']']) {
        match rest.as_bytes()[pos] {
            b'[' => {
                out.push(Token::Open);
                rest = &rest[pos + 1..];
            }
            b']' => {
                out.push(Token::Close);
                rest = &rest[pos + 1..];
            }
            _ => match rest[pos + 1..].find('>') {
                Some(end) => {
                    out.push(Token::Hex(rest[pos + 1..pos + 1 + end].trim()));
                    rest = &rest[pos + 2 + end..];
                }
                None => break,
            },
        }
    }
    out
}

fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(begin) {
        let body = &rest[start + begin.len()..];
        match body.find(end) {
            Some(stop) => {
                out.push(&body[..stop]);
                rest = &body[stop + end.len()..];
            }
            None => break,
        }
    }
    out
}

fn code(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex, 16).ok()
}

/// UTF-16BE hex to text; one- and two-digit values are taken as a code point.
fn utf16_text(hex: &str) -> Option<String> {
    if hex.len() <= 2 {
        return code(hex).and_then(char::from_u32).map(String::from);
    }
    let units: Option<Vec<u16>> = hex
        .as_bytes()
        .chunks(4)
        .map(|c| std::str::from_utf8(c).ok().and_then(|s| u16::from_str_radix(s, 16).ok()))
        .collect();
    String::from_utf16(&units?).ok()
}

/// Increment the last UTF-16 unit of `base` by `offset`.
fn offset_text(base: &str, offset: u32) -> Option<String> {
    let mut units: Vec<u16> = base.encode_utf16().collect();
    let last = units.last_mut()?;
    *last = u16::try_from(u32::from(*last) + offset).ok()?;
    String::from_utf16(&units).ok()
}

impl ToUnicode {
    pub fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        let mut map = HashMap::new();

        for section in sections(&text, "beginbfchar", "endbfchar") {
            let toks = tokens(section);
            for pair in toks.chunks(2) {
                if let [Token::Hex(src), Token::Hex(dst)] = pair {
                    if let (Some(c), Some(t)) = (code(src), utf16_text(dst)) {
                        map.insert(c, t);
                    }
                }
            }
        }

        for section in sections(&text, "beginbfrange", "endbfrange") {
            let toks = tokens(section);
            let mut i = 0;
            while i + 2 < toks.len() {
                let (Token::Hex(lo), Token::Hex(hi)) = (&toks[i], &toks[i + 1]) else {
                    i += 1;
                    continue;
                };
                let (Some(lo), Some(hi)) = (code(lo), code(hi)) else {
                    i += 3;
                    continue;
                };
                match &toks[i + 2] {
                    Token::Hex(dst) => {
                        if let Some(base) = utf16_text(dst) {
                            for c in lo..=hi.min(lo.saturating_add(0xFFFF)) {
                                if let Some(t) = offset_text(&base, c - lo) {
                                    map.insert(c, t);
                                }
                            }
                        }
                        i += 3;
                    }
                    Token::Open => {
                        let mut j = i + 3;
                        let mut c = lo;
                        while let Some(Token::Hex(dst)) = toks.get(j) {
                            if c <= hi {
                                if let Some(t) = utf16_text(dst) {
                                    map.insert(c, t);
                                }
                            }
                            c += 1;
                            j += 1;
                        }
                        // skip the closing bracket
                        i = j + 1;
                    }
                    Token::Close => i += 3,
                }
            }
        }

        Self { map }
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bfchar_mappings() {
        let cmap = ToUnicode::parse(b"2 beginbfchar\n<01> <0046>\n<02> <0069> endbfchar");
        assert_eq!(cmap.get(1), Some("F"));
        assert_eq!(cmap.get(2), Some("i"));
        assert_eq!(cmap.get(3), None);
    }

    #[test]
    fn bfchar_ligature() {
        let cmap = ToUnicode::parse(b"beginbfchar <0005> <00660069> endbfchar");
        assert_eq!(cmap.get(5), Some("fi"));
    }

    #[test]
    fn bfrange_offsets_destination() {
        let cmap = ToUnicode::parse(b"1 beginbfrange\n<0020> <0022> <0041>\nendbfrange");
        assert_eq!(cmap.get(0x20), Some("A"));
        assert_eq!(cmap.get(0x22), Some("C"));
        assert_eq!(cmap.len(), 3);
    }

    #[test]
    fn bfrange_array_destination() {
        let cmap = ToUnicode::parse(b"beginbfrange <10> <11> [<0058> <0059>] <20> <20> <005A> endbfrange");
        assert_eq!(cmap.get(0x10), Some("X"));
        assert_eq!(cmap.get(0x11), Some("Y"));
        assert_eq!(cmap.get(0x20), Some("Z"));
    }

    #[test]
    fn surrogate_pair() {
        let cmap = ToUnicode::parse(b"beginbfchar <01> <D83DDE00> endbfchar");
        assert_eq!(cmap.get(1), Some("\u{1F600}"));
    }

    #[test]
    fn multiple_sections_and_boilerplate() {
        let data = b"/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
            1 begincodespacerange <00> <FF> endcodespacerange\n\
            1 beginbfchar <41> <0061> endbfchar\n\
            1 beginbfchar <42> <0062> endbfchar\nendcmap";
        let cmap = ToUnicode::parse(data);
        assert_eq!(cmap.get(0x41), Some("a"));
        assert_eq!(cmap.get(0x42), Some("b"));
    }

    #[test]
    fn empty_input() {
        assert!(ToUnicode::parse(b"").is_empty());
    }
}
