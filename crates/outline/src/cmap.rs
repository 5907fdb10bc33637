// ABOUTME: Minimal ToUnicode CMap parsing: bfchar/bfrange mappings to text.
// ABOUTME: Only what span extraction needs; not a full CMap grammar.

use std::collections::HashMap;

/// Code-to-text mapping parsed from a font's ToUnicode stream.
#[derive(Debug, Default, Clone)]
pub struct ToUnicodeMap {
    map: HashMap<u32, String>,
    /// Code width in bytes, taken from the codespace range.
    code_len: usize,
}

enum Token {
    Hex(String),
    Open,
    Close,
}

impl ToUnicodeMap {
    /// Parses the bfchar/bfrange sections of a ToUnicode stream. Sections
    /// that fail to parse are skipped; the result may be empty.
    pub fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        let mut map = HashMap::new();

        // Exported transcripts use 2-byte CID codes; the codespace range
        // overrides when present.
        let mut code_len = 2;
        if let Some(range) = sections(&text, "begincodespacerange", "endcodespacerange")
            .into_iter()
            .next()
        {
            if let Some(first) = hex_tokens(range).first() {
                code_len = (first.len() / 2).clamp(1, 4);
            }
        }

        for body in sections(&text, "beginbfchar", "endbfchar") {
            let tokens = hex_tokens(body);
            for pair in tokens.chunks(2) {
                if let [src, dst] = pair {
                    if let (Some(code), Some(text)) = (hex_u32(src), hex_utf16(dst)) {
                        map.insert(code, text);
                    }
                }
            }
        }

        for body in sections(&text, "beginbfrange", "endbfrange") {
            parse_bfrange(body, &mut map);
        }

        Self { map, code_len }
    }

    /// Decodes a PDF string's bytes through this map; unmapped codes are
    /// dropped.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut out = String::new();
        for chunk in bytes.chunks(self.code_len) {
            let code = chunk.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
            if let Some(mapped) = self.map.get(&code) {
                out.push_str(mapped);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Either `<lo> <hi> <dst>` with consecutive destinations, or
/// `<lo> <hi> [<d0> <d1> ...]` with one destination per code.
fn parse_bfrange(body: &str, map: &mut HashMap<u32, String>) {
    let tokens = tokenize(body);
    let mut i = 0;

    while i + 1 < tokens.len() {
        let (Token::Hex(lo), Token::Hex(hi)) = (&tokens[i], &tokens[i + 1]) else {
            break;
        };
        let (Some(lo), Some(hi)) = (hex_u32(lo), hex_u32(hi)) else {
            break;
        };

        match tokens.get(i + 2) {
            Some(Token::Hex(dst)) => {
                if dst.len() <= 4 {
                    if let Some(base) = hex_u32(dst) {
                        for (offset, code) in (lo..=hi).enumerate() {
                            if let Some(ch) = char::from_u32(base + offset as u32) {
                                map.insert(code, ch.to_string());
                            }
                        }
                    }
                } else if let Some(text) = hex_utf16(dst) {
                    // multi-unit destination; only the range start is usable
                    map.insert(lo, text);
                }
                i += 3;
            }
            Some(Token::Open) => {
                let mut j = i + 3;
                let mut code = lo;
                while let Some(Token::Hex(dst)) = tokens.get(j) {
                    if code > hi {
                        break;
                    }
                    if let Some(text) = hex_utf16(dst) {
                        map.insert(code, text);
                    }
                    code += 1;
                    j += 1;
                }
                while !matches!(tokens.get(j), None | Some(Token::Close)) {
                    j += 1;
                }
                i = j + 1;
            }
            _ => break,
        }
    }
}

fn tokenize(body: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut rest = body;

    while let Some(idx) = rest.find(|c| c == '<' || c == '[' || c == ']') {
        match rest.as_bytes()[idx] {
            b'[' => {
                out.push(Token::Open);
                rest = &rest[idx + 1..];
            }
            b']' => {
                out.push(Token::Close);
                rest = &rest[idx + 1..];
            }
            _ => {
                let after = &rest[idx + 1..];
                let Some(end) = after.find('>') else {
                    break;
                };
                out.push(Token::Hex(after[..end].trim().to_string()));
                rest = &after[end + 1..];
            }
        }
    }
    out
}

fn hex_tokens(body: &str) -> Vec<String> {
    tokenize(body)
        .into_iter()
        .filter_map(|token| match token {
            Token::Hex(hex) => Some(hex),
            _ => None,
        })
        .collect()
}

fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(begin) {
        let after = &rest[start + begin.len()..];
        let Some(stop) = after.find(end) else {
            break;
        };
        out.push(&after[..stop]);
        rest = &after[stop + end.len()..];
    }
    out
}

fn hex_u32(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex, 16).ok()
}

/// Destination hex strings encode UTF-16BE code units.
fn hex_utf16(hex: &str) -> Option<String> {
    if hex.len() % 4 != 0 || hex.is_empty() {
        return None;
    }
    let units: Option<Vec<u16>> = (0..hex.len())
        .step_by(4)
        .map(|i| u16::from_str_radix(&hex[i..i + 4], 16).ok())
        .collect();
    String::from_utf16(&units?).ok()
}
